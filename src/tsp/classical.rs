//! Classical permutation formulation of the TSP.
//!
//! A solution is a [`Tour`]: the order in which city indices are visited.
//! The cost is the closed tour length.

use super::cities::CitySet;
use super::distance::DistanceTable;
use crate::error::AnnealError;
use crate::random::distinct_pair;
use crate::sa::SaProblem;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Visiting order of city indices.
pub type Tour = Vec<usize>;

/// Local move used to derive a neighbor tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeighborOperator {
    /// Reverse the segment between two distinct random indices (inclusive).
    #[default]
    TwoOpt,
    /// Exchange the cities at two distinct random indices.
    Swap,
    /// Reverse a short window: random start, length between 2 and half the tour.
    Reverse,
    /// Move one city to another position.
    Insert,
    /// Pick one of the four operators above uniformly per call.
    Mixed,
}

impl NeighborOperator {
    const CONCRETE: [NeighborOperator; 4] = [
        NeighborOperator::TwoOpt,
        NeighborOperator::Swap,
        NeighborOperator::Reverse,
        NeighborOperator::Insert,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NeighborOperator::TwoOpt => "2opt",
            NeighborOperator::Swap => "swap",
            NeighborOperator::Reverse => "reverse",
            NeighborOperator::Insert => "insert",
            NeighborOperator::Mixed => "mixed",
        }
    }

    /// Applies the operator to a copy of `tour`.
    pub fn apply<R: Rng>(&self, tour: &[usize], rng: &mut R) -> Tour {
        let mut next = tour.to_vec();
        match self {
            NeighborOperator::TwoOpt => two_opt_move(&mut next, rng),
            NeighborOperator::Swap => swap_move(&mut next, rng),
            NeighborOperator::Reverse => reverse_move(&mut next, rng),
            NeighborOperator::Insert => insert_move(&mut next, rng),
            NeighborOperator::Mixed => {
                let op = Self::CONCRETE[rng.random_range(0..Self::CONCRETE.len())];
                return op.apply(tour, rng);
            }
        }
        next
    }
}

impl fmt::Display for NeighborOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NeighborOperator {
    type Err = AnnealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2opt" | "2-opt" | "two_opt" => Ok(NeighborOperator::TwoOpt),
            "swap" => Ok(NeighborOperator::Swap),
            "reverse" => Ok(NeighborOperator::Reverse),
            "insert" => Ok(NeighborOperator::Insert),
            "mixed" => Ok(NeighborOperator::Mixed),
            _ => Err(AnnealError::UnknownOperator(s.to_string())),
        }
    }
}

/// How the initial tour is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitialTour {
    /// Uniformly random permutation.
    #[default]
    Random,
    /// Greedy nearest-neighbor tour from a random start city.
    NearestNeighbor,
}

impl InitialTour {
    /// Produces a starting tour over the cities of `distances`.
    pub fn build<R: Rng>(&self, distances: &DistanceTable, rng: &mut R) -> Tour {
        let n = distances.len();
        match self {
            _ if n == 0 => Vec::new(),
            InitialTour::Random => {
                let mut tour: Tour = (0..n).collect();
                tour.shuffle(rng);
                tour
            }
            InitialTour::NearestNeighbor => distances.nearest_neighbor_tour(rng.random_range(0..n)),
        }
    }
}

/// 2-opt: reverse `tour[i..=j]` for distinct random `i < j`.
/// Tours shorter than 4 are left unchanged.
fn two_opt_move<R: Rng>(tour: &mut [usize], rng: &mut R) {
    let n = tour.len();
    if n < 4 {
        return;
    }
    let (a, b) = distinct_pair(n, rng);
    let (i, j) = if a < b { (a, b) } else { (b, a) };
    tour[i..=j].reverse();
}

fn swap_move<R: Rng>(tour: &mut [usize], rng: &mut R) {
    let n = tour.len();
    if n < 2 {
        return;
    }
    let (i, j) = distinct_pair(n, rng);
    tour.swap(i, j);
}

fn reverse_move<R: Rng>(tour: &mut [usize], rng: &mut R) {
    let n = tour.len();
    if n < 3 {
        return;
    }
    let start = rng.random_range(0..=n - 2);
    let max_len = (n / 2).max(2).min(n - start);
    let len = rng.random_range(2..=max_len);
    tour[start..start + len].reverse();
}

fn insert_move<R: Rng>(tour: &mut Tour, rng: &mut R) {
    let n = tour.len();
    if n < 3 {
        return;
    }
    let from = rng.random_range(0..n);
    let to = rng.random_range(0..n);
    if from != to {
        let city = tour.remove(from);
        tour.insert(to, city);
    }
}

/// Summary of a tour.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TourInfo {
    pub cost: f64,
    pub valid: bool,
    pub num_cities: usize,
    pub mean_segment: f64,
    pub min_segment: f64,
    pub max_segment: f64,
    pub route: Vec<String>,
    pub segments: Vec<f64>,
}

/// The TSP over permutations of a city set.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::{SaConfig, SaRunner};
/// use u_anneal::tsp::{CitySet, ClassicalTsp, NeighborOperator};
///
/// let cities = CitySet::new([
///     ("A", (0.0, 0.0)),
///     ("B", (0.0, 1.0)),
///     ("C", (1.0, 1.0)),
///     ("D", (1.0, 0.0)),
/// ])
/// .unwrap();
/// let problem = ClassicalTsp::new(cities, NeighborOperator::TwoOpt);
/// let config = SaConfig::default()
///     .with_initial_temperature(10.0)
///     .with_final_temperature(0.01)
///     .with_seed(1);
///
/// let result = SaRunner::run(&problem, &config).unwrap();
/// assert!(problem.validate_tour(&result.best));
/// ```
#[derive(Debug, Clone)]
pub struct ClassicalTsp {
    cities: CitySet,
    distances: DistanceTable,
    operator: NeighborOperator,
    initial: InitialTour,
}

impl ClassicalTsp {
    pub fn new(cities: CitySet, operator: NeighborOperator) -> Self {
        let distances = DistanceTable::build(&cities);
        Self {
            cities,
            distances,
            operator,
            initial: InitialTour::default(),
        }
    }

    pub fn with_initial_tour(mut self, initial: InitialTour) -> Self {
        self.initial = initial;
        self
    }

    pub fn cities(&self) -> &CitySet {
        &self.cities
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn operator(&self) -> NeighborOperator {
        self.operator
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Closed tour length.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        self.distances.tour_length(tour)
    }

    /// Whether `tour` visits every city exactly once.
    pub fn validate_tour(&self, tour: &[usize]) -> bool {
        self.cities.is_permutation(tour)
    }

    /// City names in visiting order.
    pub fn route_names(&self, tour: &[usize]) -> Vec<String> {
        self.cities.names_of(tour)
    }

    /// Greedy nearest-neighbor tour starting at `start`.
    pub fn nearest_neighbor_tour(&self, start: usize) -> Tour {
        self.distances.nearest_neighbor_tour(start)
    }

    /// Deterministic 2-opt descent.
    ///
    /// Scans reversals `tour[i..=j]` for all `i < j`, applies the first one
    /// that shortens the tour and restarts the scan, until no improving
    /// reversal exists or `max_improvements` reversals have been applied.
    pub fn local_search_2opt(&self, tour: &[usize], max_improvements: usize) -> Tour {
        let mut current = tour.to_vec();
        let n = current.len();
        if n < 4 {
            return current;
        }

        let mut improvements = 0;
        'search: while improvements < max_improvements {
            for i in 0..n - 1 {
                for j in (i + 1)..n {
                    // Reversing the whole tour changes nothing.
                    if i == 0 && j == n - 1 {
                        continue;
                    }
                    if self.two_opt_delta(&current, i, j) < -IMPROVEMENT_EPS {
                        current[i..=j].reverse();
                        improvements += 1;
                        continue 'search;
                    }
                }
            }
            break;
        }
        current
    }

    /// Change in tour length caused by reversing `tour[i..=j]`, where
    /// `0 < j - i < n - 1`.
    fn two_opt_delta(&self, tour: &[usize], i: usize, j: usize) -> f64 {
        let n = tour.len();
        let before = tour[(i + n - 1) % n];
        let first = tour[i];
        let last = tour[j];
        let after = tour[(j + 1) % n];
        let d = |a, b| self.distances.get(a, b);
        d(before, last) + d(first, after) - d(before, first) - d(last, after)
    }

    /// Cost, validity and segment statistics of `tour`.
    pub fn tour_info(&self, tour: &[usize]) -> TourInfo {
        let segments = self.distances.segment_lengths(tour);
        let (mean_segment, min_segment, max_segment) = if segments.is_empty() {
            (0.0, 0.0, 0.0)
        } else {
            (
                segments.iter().sum::<f64>() / segments.len() as f64,
                segments.iter().copied().fold(f64::INFINITY, f64::min),
                segments.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            )
        };
        let valid = self.validate_tour(tour);
        TourInfo {
            cost: self.tour_length(tour),
            valid,
            num_cities: tour.len(),
            mean_segment,
            min_segment,
            max_segment,
            route: if valid { self.route_names(tour) } else { Vec::new() },
            segments,
        }
    }
}

const IMPROVEMENT_EPS: f64 = 1e-10;

impl SaProblem for ClassicalTsp {
    type Solution = Tour;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Tour {
        self.initial.build(&self.distances, rng)
    }

    fn cost(&self, tour: &Tour) -> f64 {
        self.tour_length(tour)
    }

    fn neighbor<R: Rng>(&self, tour: &Tour, rng: &mut R) -> Tour {
        self.operator.apply(tour, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::create_rng;
    use crate::sa::{SaConfig, SaRunner};

    fn square() -> CitySet {
        CitySet::new([
            ("A", (0.0, 0.0)),
            ("B", (0.0, 1.0)),
            ("C", (1.0, 1.0)),
            ("D", (1.0, 0.0)),
        ])
        .unwrap()
    }

    fn grid(side: usize) -> CitySet {
        CitySet::new((0..side * side).map(|k| {
            (
                format!("G{k}"),
                ((k % side) as f64 * 10.0, (k / side) as f64 * 10.0),
            )
        }))
        .unwrap()
    }

    fn is_perm(tour: &[usize], n: usize) -> bool {
        let mut sorted = tour.to_vec();
        sorted.sort_unstable();
        sorted == (0..n).collect::<Vec<_>>()
    }

    #[test]
    fn test_operator_parse() {
        assert_eq!("2opt".parse::<NeighborOperator>().unwrap(), NeighborOperator::TwoOpt);
        assert_eq!("Swap".parse::<NeighborOperator>().unwrap(), NeighborOperator::Swap);
        assert_eq!(" mixed ".parse::<NeighborOperator>().unwrap(), NeighborOperator::Mixed);
        assert!(matches!(
            "3opt".parse::<NeighborOperator>(),
            Err(AnnealError::UnknownOperator(_))
        ));
        for op in NeighborOperator::CONCRETE {
            assert_eq!(op.to_string().parse::<NeighborOperator>().unwrap(), op);
        }
    }

    #[test]
    fn test_cost_empty_and_single() {
        let empty = ClassicalTsp::new(CitySet::default(), NeighborOperator::TwoOpt);
        assert_eq!(empty.cost(&vec![]), 0.0);

        let single = ClassicalTsp::new(
            CitySet::new([("A", (5.0, 5.0))]).unwrap(),
            NeighborOperator::TwoOpt,
        );
        assert_eq!(single.cost(&vec![0]), 0.0);
    }

    #[test]
    fn test_cost_square() {
        let problem = ClassicalTsp::new(square(), NeighborOperator::TwoOpt);
        assert!((problem.cost(&vec![0, 1, 2, 3]) - 4.0).abs() < 1e-12);
        assert!((problem.cost(&vec![3, 2, 1, 0]) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_two_opt_reverses_segment() {
        let mut rng = create_rng(5);
        let tour: Tour = (0..8).collect();
        for _ in 0..100 {
            let next = NeighborOperator::TwoOpt.apply(&tour, &mut rng);
            let changed: Vec<usize> = (0..8).filter(|&k| next[k] != tour[k]).collect();
            if let (Some(&i), Some(&j)) = (changed.first(), changed.last()) {
                let mut expected = tour.clone();
                expected[i..=j].reverse();
                assert_eq!(next, expected);
            }
        }
    }

    #[test]
    fn test_small_tours_unchanged() {
        let mut rng = create_rng(1);
        assert_eq!(NeighborOperator::TwoOpt.apply(&[0, 1, 2], &mut rng), vec![0, 1, 2]);
        assert_eq!(NeighborOperator::Swap.apply(&[0], &mut rng), vec![0]);
        assert_eq!(NeighborOperator::Reverse.apply(&[0, 1], &mut rng), vec![0, 1]);
        assert_eq!(NeighborOperator::Insert.apply(&[1, 0], &mut rng), vec![1, 0]);
        assert!(NeighborOperator::Mixed.apply(&[], &mut rng).is_empty());
    }

    #[test]
    fn test_reverse_on_three_cities() {
        let mut rng = create_rng(2);
        for _ in 0..50 {
            let next = NeighborOperator::Reverse.apply(&[0, 1, 2], &mut rng);
            assert!(is_perm(&next, 3));
        }
    }

    #[test]
    fn test_swap_changes_exactly_two() {
        let mut rng = create_rng(3);
        let tour: Tour = (0..6).collect();
        for _ in 0..50 {
            let next = NeighborOperator::Swap.apply(&tour, &mut rng);
            assert_eq!((0..6).filter(|&k| next[k] != tour[k]).count(), 2);
        }
    }

    #[test]
    fn test_neighbor_does_not_mutate_input() {
        let problem = ClassicalTsp::new(grid(3), NeighborOperator::Mixed);
        let mut rng = create_rng(8);
        let tour = problem.initial_solution(&mut rng);
        let snapshot = tour.clone();
        for _ in 0..20 {
            let _ = problem.neighbor(&tour, &mut rng);
        }
        assert_eq!(tour, snapshot);
    }

    #[test]
    fn test_initial_solution_is_permutation() {
        let problem = ClassicalTsp::new(grid(4), NeighborOperator::TwoOpt);
        let mut rng = create_rng(4);
        let tour = problem.initial_solution(&mut rng);
        assert!(problem.validate_tour(&tour));
    }

    #[test]
    fn test_nearest_neighbor_on_line() {
        let cities = CitySet::new([
            ("A", (0.0, 0.0)),
            ("B", (10.0, 0.0)),
            ("C", (1.0, 0.0)),
            ("D", (3.0, 0.0)),
        ])
        .unwrap();
        let problem = ClassicalTsp::new(cities, NeighborOperator::TwoOpt)
            .with_initial_tour(InitialTour::NearestNeighbor);
        assert_eq!(problem.nearest_neighbor_tour(0), vec![0, 2, 3, 1]);

        let mut rng = create_rng(0);
        assert!(problem.validate_tour(&problem.initial_solution(&mut rng)));
    }

    #[test]
    fn test_local_search_uncrosses_square() {
        let problem = ClassicalTsp::new(square(), NeighborOperator::TwoOpt);
        let crossed = vec![0, 2, 1, 3];
        assert!(problem.cost(&crossed) > 4.5);

        let polished = problem.local_search_2opt(&crossed, 100);
        assert!(problem.validate_tour(&polished));
        assert!((problem.cost(&polished) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_local_search_adjacent_exchange() {
        // The first improving reversal in scan order is the adjacent pair (1, 2).
        let cities = CitySet::new([
            ("A", (0.0, 0.0)),
            ("B", (2.0, 0.0)),
            ("C", (1.0, 0.0)),
            ("D", (3.0, 0.0)),
            ("E", (3.0, 5.0)),
            ("F", (0.0, 5.0)),
        ])
        .unwrap();
        let problem = ClassicalTsp::new(cities, NeighborOperator::TwoOpt);
        let tour = vec![0, 1, 2, 3, 4, 5];

        let polished = problem.local_search_2opt(&tour, 1);
        assert_eq!(polished, vec![0, 2, 1, 3, 4, 5]);
        assert!(problem.cost(&polished) < problem.cost(&tour));
    }

    #[test]
    fn test_local_search_never_worse_and_capped() {
        let problem = ClassicalTsp::new(grid(4), NeighborOperator::TwoOpt);
        let mut rng = create_rng(12);
        let tour = problem.initial_solution(&mut rng);

        let polished = problem.local_search_2opt(&tour, 1000);
        assert!(problem.validate_tour(&polished));
        assert!(problem.cost(&polished) <= problem.cost(&tour) + 1e-9);

        let untouched = problem.local_search_2opt(&tour, 0);
        assert_eq!(untouched, tour);
    }

    #[test]
    fn test_two_opt_delta_matches_recomputation() {
        let problem = ClassicalTsp::new(grid(3), NeighborOperator::TwoOpt);
        let mut rng = create_rng(21);
        let tour = problem.initial_solution(&mut rng);
        let n = tour.len();
        for i in 0..n - 1 {
            for j in (i + 1)..n {
                if i == 0 && j == n - 1 {
                    continue;
                }
                let mut next = tour.clone();
                next[i..=j].reverse();
                let expected = problem.cost(&next) - problem.cost(&tour);
                assert!((problem.two_opt_delta(&tour, i, j) - expected).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_tour_info() {
        let problem = ClassicalTsp::new(square(), NeighborOperator::TwoOpt);
        let info = problem.tour_info(&[0, 1, 2, 3]);
        assert!(info.valid);
        assert_eq!(info.num_cities, 4);
        assert!((info.cost - 4.0).abs() < 1e-12);
        assert!((info.mean_segment - 1.0).abs() < 1e-12);
        assert_eq!(info.min_segment, 1.0);
        assert_eq!(info.max_segment, 1.0);
        assert_eq!(info.route, ["A", "B", "C", "D"]);

        let broken = problem.tour_info(&[0, 0, 2, 3]);
        assert!(!broken.valid);
        assert!(broken.route.is_empty());
    }

    #[test]
    fn test_square_reaches_perimeter() {
        let problem = ClassicalTsp::new(square(), NeighborOperator::TwoOpt);
        let mut optimal = 0;
        for seed in 0..10 {
            let config = SaConfig::default()
                .with_initial_temperature(10.0)
                .with_final_temperature(0.01)
                .with_cooling_rate(0.995)
                .with_seed(seed);
            let result = SaRunner::run(&problem, &config).unwrap();
            assert!(problem.validate_tour(&result.best));
            if (result.best_cost - 4.0).abs() < 1e-9 {
                optimal += 1;
            }
        }
        assert!(optimal >= 9, "only {optimal}/10 runs reached the perimeter");
    }

    #[test]
    fn test_grid_anneal_with_polish() {
        let problem = ClassicalTsp::new(grid(4), NeighborOperator::Mixed);
        let config = SaConfig::default()
            .with_initial_temperature(100.0)
            .with_final_temperature(0.01)
            .with_cooling_rate(0.999)
            .with_seed(42);

        let result = SaRunner::run(&problem, &config).unwrap();
        let polished = problem.local_search_2opt(&result.best, 100);

        // 4x4 grid with spacing 10: the optimal tour has length 160.
        assert!(problem.validate_tour(&polished));
        assert!(problem.cost(&polished) <= result.best_cost + 1e-9);
        assert!(problem.cost(&polished) < 220.0, "got {}", problem.cost(&polished));
        assert!(result.stats.improvement() > 0.0);
    }
}

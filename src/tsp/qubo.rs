//! QUBO formulation of the TSP.
//!
//! A solution is a [`BinaryAssignment`]; its cost is the QUBO energy, which
//! mixes tour distance with one-hot constraint penalties. Use
//! [`QuboTsp::tour_cost`] or [`QuboTsp::solution_info`] to judge the tour
//! itself.

use super::assignment::BinaryAssignment;
use super::cities::CitySet;
use super::classical::{InitialTour, Tour};
use super::distance::DistanceTable;
use super::qubo_matrix::{build_tsp_qubo, QuboMatrix};
use crate::error::AnnealError;
use crate::random::distinct_pair;
use crate::sa::SaProblem;
use rand::Rng;

/// Move applied to an assignment matrix to derive a neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QuboMove {
    /// Exchange two columns (two tour positions).
    SwapPositions,
    /// Exchange two rows (two cities).
    SwapCities,
    /// Rotate a random window of at least two columns right by one.
    CycleShift,
    /// Flip a single cell. Leaves the feasible region.
    BitFlip,
    /// Pick one of `SwapPositions`, `SwapCities`, `CycleShift` per call.
    #[default]
    Mixed,
}

impl QuboMove {
    const FEASIBLE: [QuboMove; 3] = [
        QuboMove::SwapPositions,
        QuboMove::SwapCities,
        QuboMove::CycleShift,
    ];

    /// Whether the move maps one-hot matrices to one-hot matrices.
    pub fn preserves_feasibility(&self) -> bool {
        !matches!(self, QuboMove::BitFlip)
    }

    /// Applies the move to a copy of `solution`.
    pub fn apply<R: Rng>(&self, solution: &BinaryAssignment, rng: &mut R) -> BinaryAssignment {
        let mut next = solution.clone();
        let n = next.size();
        match self {
            QuboMove::SwapPositions if n >= 2 => {
                let (a, b) = distinct_pair(n, rng);
                next.swap_columns(a, b);
            }
            QuboMove::SwapCities if n >= 2 => {
                let (a, b) = distinct_pair(n, rng);
                next.swap_rows(a, b);
            }
            QuboMove::CycleShift if n >= 2 => {
                let start = rng.random_range(0..=n - 2);
                let len = rng.random_range(2..=n - start);
                next.rotate_columns_right(start, start + len);
            }
            QuboMove::BitFlip if n >= 1 => {
                next.flip(rng.random_range(0..n), rng.random_range(0..n));
            }
            QuboMove::Mixed => {
                let op = Self::FEASIBLE[rng.random_range(0..Self::FEASIBLE.len())];
                return op.apply(solution, rng);
            }
            _ => {}
        }
        next
    }
}

/// Configuration of the QUBO formulation.
///
/// The effective penalty weight is `penalty_factor * constraint_weight`. It
/// must be large relative to typical distances so that no constraint
/// violation is ever cheaper than a feasible improvement; it is not derived
/// automatically.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuboConfig {
    pub penalty_factor: f64,
    pub constraint_weight: f64,
    pub moves: QuboMove,
    pub initial: InitialTour,
}

impl Default for QuboConfig {
    fn default() -> Self {
        Self {
            penalty_factor: 1000.0,
            constraint_weight: 1.0,
            moves: QuboMove::default(),
            initial: InitialTour::default(),
        }
    }
}

impl QuboConfig {
    pub fn with_penalty_factor(mut self, penalty: f64) -> Self {
        self.penalty_factor = penalty;
        self
    }

    pub fn with_constraint_weight(mut self, weight: f64) -> Self {
        self.constraint_weight = weight;
        self
    }

    pub fn with_moves(mut self, moves: QuboMove) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_initial_tour(mut self, initial: InitialTour) -> Self {
        self.initial = initial;
        self
    }

    /// Effective one-hot penalty weight λ.
    pub fn penalty_weight(&self) -> f64 {
        self.penalty_factor * self.constraint_weight
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), AnnealError> {
        if !self.penalty_factor.is_finite() || self.penalty_factor <= 0.0 {
            return Err(AnnealError::config(format!(
                "penalty_factor must be positive and finite, got {}",
                self.penalty_factor
            )));
        }
        if !self.constraint_weight.is_finite() || self.constraint_weight <= 0.0 {
            return Err(AnnealError::config(format!(
                "constraint_weight must be positive and finite, got {}",
                self.constraint_weight
            )));
        }
        Ok(())
    }
}

/// Number of violated one-hot constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintViolations {
    /// Cities not assigned to exactly one position.
    pub cities: usize,
    /// Positions not holding exactly one city.
    pub positions: usize,
}

impl ConstraintViolations {
    pub fn total(&self) -> usize {
        self.cities + self.positions
    }
}

/// Breakdown of a QUBO solution.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QuboSolutionInfo {
    /// `x^T Q x + c`.
    pub qubo_energy: f64,
    /// Closed tour length, `None` when the matrix does not decode to a tour.
    pub tour_cost: Option<f64>,
    /// One-hot penalty part of the energy, `λ Σ (sum - 1)^2` over rows and columns.
    pub penalty_cost: f64,
    pub is_valid: bool,
    pub violations: ConstraintViolations,
    /// City names in tour order, `None` when not decodable.
    pub route: Option<Vec<String>>,
    pub num_ones: usize,
    pub expected_ones: usize,
}

/// The TSP as a QUBO over a city-by-position assignment matrix.
///
/// # Examples
///
/// ```
/// use u_anneal::tsp::{BinaryAssignment, CitySet, QuboConfig, QuboTsp};
///
/// let cities = CitySet::new([("A", (0.0, 0.0)), ("B", (0.0, 1.0)), ("C", (1.0, 1.0))]).unwrap();
/// let problem = QuboTsp::new(cities, QuboConfig::default()).unwrap();
///
/// let x = problem.route_to_solution(&[2, 0, 1]);
/// assert_eq!(problem.solution_to_route(&x), Some(vec![2, 0, 1]));
/// assert!(problem.validate_solution(&x));
///
/// let empty = BinaryAssignment::zeros(3);
/// assert_eq!(problem.solution_to_route(&empty), None);
/// assert_eq!(problem.constraint_violations(&empty).total(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct QuboTsp {
    cities: CitySet,
    distances: DistanceTable,
    qubo: QuboMatrix,
    config: QuboConfig,
}

impl QuboTsp {
    /// Builds the instance and its QUBO matrix.
    ///
    /// # Errors
    ///
    /// Returns [`AnnealError::InvalidConfig`] for a non-positive penalty.
    pub fn new(cities: CitySet, config: QuboConfig) -> Result<Self, AnnealError> {
        config.validate()?;
        let distances = DistanceTable::build(&cities);
        let qubo = build_tsp_qubo(&distances, config.penalty_weight());
        Ok(Self {
            cities,
            distances,
            qubo,
            config,
        })
    }

    pub fn cities(&self) -> &CitySet {
        &self.cities
    }

    pub fn distances(&self) -> &DistanceTable {
        &self.distances
    }

    pub fn qubo(&self) -> &QuboMatrix {
        &self.qubo
    }

    pub fn config(&self) -> &QuboConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// QUBO energy of `solution`, or infinity when its size does not match
    /// the instance.
    pub fn energy(&self, solution: &BinaryAssignment) -> f64 {
        if solution.size() != self.len() {
            return f64::INFINITY;
        }
        self.qubo.assignment_energy(solution)
    }

    /// Decodes `solution` into a tour. `None` is an expected outcome for
    /// infeasible matrices.
    pub fn solution_to_route(&self, solution: &BinaryAssignment) -> Option<Tour> {
        if solution.size() != self.len() {
            return None;
        }
        solution.to_tour()
    }

    /// One-hot encoding of `tour`.
    pub fn route_to_solution(&self, tour: &[usize]) -> BinaryAssignment {
        BinaryAssignment::from_tour(tour)
    }

    /// Closed tour length of the decoded tour, without penalties.
    pub fn tour_cost(&self, solution: &BinaryAssignment) -> Option<f64> {
        self.solution_to_route(solution)
            .map(|tour| self.distances.tour_length(&tour))
    }

    /// Whether the matrix has the right size, 0/1 cells and unit row and
    /// column sums.
    pub fn validate_solution(&self, solution: &BinaryAssignment) -> bool {
        solution.size() == self.len() && solution.is_one_hot()
    }

    /// Counts rows and columns whose sum differs from 1. A matrix of the
    /// wrong size violates every row and column.
    pub fn constraint_violations(&self, solution: &BinaryAssignment) -> ConstraintViolations {
        let n = solution.size();
        if n != self.len() {
            let all = n.max(self.len());
            return ConstraintViolations {
                cities: all,
                positions: all,
            };
        }
        ConstraintViolations {
            cities: (0..n).filter(|&i| solution.row_sum(i) != 1).count(),
            positions: (0..n).filter(|&k| solution.column_sum(k) != 1).count(),
        }
    }

    /// Penalty part of the energy: `λ Σ (row_sum - 1)^2 + λ Σ (column_sum - 1)^2`.
    /// Infinite for a matrix of the wrong size, like [`energy`](Self::energy).
    pub fn penalty_cost(&self, solution: &BinaryAssignment) -> f64 {
        let n = solution.size();
        if n != self.len() {
            return f64::INFINITY;
        }
        let squared = |sum: usize| {
            let d = sum as f64 - 1.0;
            d * d
        };
        let rows: f64 = (0..n).map(|i| squared(solution.row_sum(i))).sum();
        let columns: f64 = (0..n).map(|k| squared(solution.column_sum(k))).sum();
        self.config.penalty_weight() * (rows + columns)
    }

    /// Energy, tour cost, penalty, validity and decoded route of `solution`.
    pub fn solution_info(&self, solution: &BinaryAssignment) -> QuboSolutionInfo {
        let tour = self.solution_to_route(solution);
        QuboSolutionInfo {
            qubo_energy: self.energy(solution),
            tour_cost: tour.as_ref().map(|t| self.distances.tour_length(t)),
            penalty_cost: self.penalty_cost(solution),
            is_valid: self.validate_solution(solution),
            violations: self.constraint_violations(solution),
            route: tour.map(|t| self.cities.names_of(&t)),
            num_ones: solution.count_ones(),
            expected_ones: self.len(),
        }
    }
}

impl SaProblem for QuboTsp {
    type Solution = BinaryAssignment;

    fn initial_solution<R: Rng>(&self, rng: &mut R) -> BinaryAssignment {
        let tour = self.config.initial.build(&self.distances, rng);
        BinaryAssignment::from_tour(&tour)
    }

    fn cost(&self, solution: &BinaryAssignment) -> f64 {
        self.energy(solution)
    }

    fn neighbor<R: Rng>(&self, solution: &BinaryAssignment, rng: &mut R) -> BinaryAssignment {
        self.config.moves.apply(solution, rng)
    }
}

//! Euclidean distances and the precomputed distance table.

use super::cities::{CitySet, Point};

/// Euclidean distance between two points.
pub fn euclidean(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Dense symmetric table of pairwise city distances.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    n: usize,
    data: Vec<f64>,
}

impl DistanceTable {
    /// Computes all pairwise distances of `cities`. O(n^2) time and space.
    pub fn build(cities: &CitySet) -> Self {
        Self::from_points(&cities.positions())
    }

    /// Computes all pairwise distances of `points`.
    pub fn from_points(points: &[Point]) -> Self {
        let n = points.len();
        let mut data = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = euclidean(points[i], points[j]);
                data[i * n + j] = d;
                data[j * n + i] = d;
            }
        }
        Self { n, data }
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.n
    }

    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    /// Length of the closed tour `tour` (last city connects back to the
    /// first). Zero for tours with fewer than two cities.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        if tour.len() < 2 {
            return 0.0;
        }
        let closing = self.get(tour[tour.len() - 1], tour[0]);
        tour.windows(2)
            .map(|w| self.get(w[0], w[1]))
            .sum::<f64>()
            + closing
    }

    /// Length of each edge of the closed tour, starting with
    /// `tour[0] -> tour[1]` and ending with the closing edge.
    pub fn segment_lengths(&self, tour: &[usize]) -> Vec<f64> {
        let n = tour.len();
        if n < 2 {
            return Vec::new();
        }
        (0..n).map(|k| self.get(tour[k], tour[(k + 1) % n])).collect()
    }

    /// Greedy nearest-neighbor tour starting at `start`, ties broken by
    /// lowest index. Empty for an empty table.
    pub fn nearest_neighbor_tour(&self, start: usize) -> Vec<usize> {
        let n = self.n;
        if n == 0 {
            return Vec::new();
        }
        let mut visited = vec![false; n];
        let mut tour = Vec::with_capacity(n);
        let mut current = start;
        visited[current] = true;
        tour.push(current);
        while tour.len() < n {
            let mut next = None;
            let mut next_dist = f64::INFINITY;
            for (city, &seen) in visited.iter().enumerate() {
                if !seen && self.get(current, city) < next_dist {
                    next = Some(city);
                    next_dist = self.get(current, city);
                }
            }
            let Some(city) = next else { break };
            visited[city] = true;
            tour.push(city);
            current = city;
        }
        tour
    }
}

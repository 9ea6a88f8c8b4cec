//! QUBO energy matrix for the TSP.
//!
//! Variables `x[i, k]` (city `i` at position `k`) are linearized as
//! `i * n + k`. The energy of an assignment is `E(x) = x^T Q x + c`.
//!
//! Q is assembled per term family, each expressed through two primitives:
//!
//! - [`QuboMatrix::add_coupling`]: a weight on the product `x[a] * x[b]`,
//!   kept symmetric by splitting off-diagonal weights across `Q[a][b]` and
//!   `Q[b][a]`.
//! - [`QuboMatrix::add_one_hot_penalty`]: `λ (Σ_{a ∈ G} x[a] - 1)^2` over a
//!   group `G`, expanded with `x^2 = x` into `-λ` on the diagonal, `+λ` on
//!   each ordered off-diagonal pair and `+λ` on the constant.
//!
//! The storage is dense; only these primitives and [`QuboMatrix::energy`]
//! touch it.

use super::assignment::BinaryAssignment;
use super::distance::DistanceTable;

/// Linear index of variable `x[city, position]` for an `n`-city instance.
#[inline]
pub fn var_index(n: usize, city: usize, position: usize) -> usize {
    city * n + position
}

/// A symmetric quadratic form plus a constant offset.
#[derive(Debug, Clone, PartialEq)]
pub struct QuboMatrix {
    dim: usize,
    coefficients: Vec<f64>,
    constant: f64,
}

impl QuboMatrix {
    /// A `dim x dim` zero matrix with zero offset.
    pub fn zeros(dim: usize) -> Self {
        Self {
            dim,
            coefficients: vec![0.0; dim * dim],
            constant: 0.0,
        }
    }

    /// Number of binary variables.
    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, a: usize, b: usize) -> f64 {
        self.coefficients[a * self.dim + b]
    }

    pub fn constant(&self) -> f64 {
        self.constant
    }

    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// Adds `weight * x[a] * x[b]` to the energy.
    pub fn add_coupling(&mut self, a: usize, b: usize, weight: f64) {
        let dim = self.dim;
        if a == b {
            self.coefficients[a * dim + a] += weight;
        } else {
            self.coefficients[a * dim + b] += weight / 2.0;
            self.coefficients[b * dim + a] += weight / 2.0;
        }
    }

    /// Adds `weight * (Σ_{a ∈ group} x[a] - 1)^2` to the energy.
    ///
    /// `group` must not contain duplicates.
    pub fn add_one_hot_penalty(&mut self, group: &[usize], weight: f64) {
        let dim = self.dim;
        for &a in group {
            self.coefficients[a * dim + a] -= weight;
            for &b in group {
                if a != b {
                    self.coefficients[a * dim + b] += weight;
                }
            }
        }
        self.add_constant(weight);
    }

    /// `E(x) = x^T Q x + c` over the non-zero entries of `x`.
    ///
    /// Cost is quadratic in the number of non-zero entries, not in `dim`.
    pub fn energy<I>(&self, active: I) -> f64
    where
        I: IntoIterator<Item = (usize, f64)>,
    {
        let active: Vec<(usize, f64)> = active.into_iter().collect();
        let mut energy = self.constant;
        for &(a, xa) in &active {
            let row = &self.coefficients[a * self.dim..(a + 1) * self.dim];
            for &(b, xb) in &active {
                energy += xa * xb * row[b];
            }
        }
        energy
    }

    /// Energy of an assignment matrix whose size matches this matrix.
    pub fn assignment_energy(&self, assignment: &BinaryAssignment) -> f64 {
        self.energy(assignment.active())
    }

    /// Whether `|Q[a][b] - Q[b][a]| <= tolerance` for all pairs.
    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        (0..self.dim).all(|a| {
            ((a + 1)..self.dim).all(|b| (self.get(a, b) - self.get(b, a)).abs() <= tolerance)
        })
    }
}

/// Builds the TSP QUBO for `distances` with one-hot penalty weight
/// `penalty`. O(n^3) couplings on an `n^2 x n^2` matrix.
///
/// - tour term: `d(i, j)` on `x[i, k] * x[j, (k + 1) mod n]` for `i != j`
/// - one penalty per city row and per position column
///
/// For a valid one-hot assignment the energy equals the closed tour length;
/// the constant is `2 * n * penalty`.
pub fn build_tsp_qubo(distances: &DistanceTable, penalty: f64) -> QuboMatrix {
    let n = distances.len();
    let mut q = QuboMatrix::zeros(n * n);
    add_tour_terms(&mut q, distances);

    for city in 0..n {
        let row: Vec<usize> = (0..n).map(|k| var_index(n, city, k)).collect();
        q.add_one_hot_penalty(&row, penalty);
    }
    for position in 0..n {
        let column: Vec<usize> = (0..n).map(|i| var_index(n, i, position)).collect();
        q.add_one_hot_penalty(&column, penalty);
    }
    q
}

/// Couples each position block with its cyclic successor block through the
/// distance table.
fn add_tour_terms(q: &mut QuboMatrix, distances: &DistanceTable) {
    let n = distances.len();
    for k in 0..n {
        let next = (k + 1) % n;
        for i in 0..n {
            for j in (0..n).filter(|&j| j != i) {
                q.add_coupling(var_index(n, i, k), var_index(n, j, next), distances.get(i, j));
            }
        }
    }
}

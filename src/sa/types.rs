//! Core trait for Simulated Annealing.

use rand::Rng;

/// Defines a Simulated Annealing problem.
///
/// The user implements initial-solution generation, neighbor generation and
/// cost evaluation over their own solution representation. The SA engine
/// handles temperature management, acceptance and best-solution tracking,
/// and never looks inside a solution.
///
/// All randomness must come from the `rng` argument so that runs are
/// reproducible under a fixed seed.
///
/// # Minimization
///
/// SA minimizes the cost function. For maximization, negate the cost.
///
/// # Examples
///
/// ```
/// use rand::Rng;
/// use rand::seq::SliceRandom;
/// use u_anneal::sa::SaProblem;
///
/// struct SortProblem { n: usize }
///
/// impl SaProblem for SortProblem {
///     type Solution = Vec<usize>;
///
///     fn initial_solution<R: Rng>(&self, rng: &mut R) -> Vec<usize> {
///         let mut perm: Vec<usize> = (0..self.n).collect();
///         perm.shuffle(rng);
///         perm
///     }
///
///     fn cost(&self, perm: &Vec<usize>) -> f64 {
///         perm.iter().enumerate().filter(|&(i, &v)| i != v).count() as f64
///     }
///
///     fn neighbor<R: Rng>(&self, perm: &Vec<usize>, rng: &mut R) -> Vec<usize> {
///         let mut new = perm.clone();
///         new.swap(rng.random_range(0..self.n), rng.random_range(0..self.n));
///         new
///     }
/// }
/// ```
pub trait SaProblem: Send + Sync {
    /// The solution representation type.
    type Solution: Clone + Send;

    /// Creates a starting solution.
    fn initial_solution<R: Rng>(&self, rng: &mut R) -> Self::Solution;

    /// Computes the cost of a solution. Lower is better.
    fn cost(&self, solution: &Self::Solution) -> f64;

    /// Generates a neighbor of `solution` by one local move.
    ///
    /// Must not modify the input.
    fn neighbor<R: Rng>(&self, solution: &Self::Solution, rng: &mut R) -> Self::Solution;

    /// Returns a copy of `solution` that shares no state with it.
    fn copy_solution(&self, solution: &Self::Solution) -> Self::Solution {
        solution.clone()
    }
}

//! SA execution loop.

use super::config::SaConfig;
use super::types::SaProblem;
use crate::error::AnnealError;
use crate::random::rng_from_option;
use rand::Rng;
use tracing::{debug, trace};

const HISTORY_PREALLOC_LIMIT: usize = 1 << 20;

/// Statistics of a single Simulated Annealing run.
///
/// History vectors hold one entry per iteration, recorded after the
/// acceptance decision and before cooling.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStatistics {
    /// Total number of iterations (neighbor evaluations).
    pub iterations: usize,

    /// Number of accepted moves.
    pub accepted_moves: usize,

    /// Number of rejected moves.
    pub rejected_moves: usize,

    /// Temperature when the run stopped.
    pub final_temperature: f64,

    /// Cost of the initial solution.
    pub initial_cost: f64,

    /// Cost of the best solution found.
    pub best_cost: f64,

    /// Cost of the current solution at each iteration.
    pub cost_history: Vec<f64>,

    /// Best cost seen so far at each iteration. Non-increasing.
    pub best_cost_history: Vec<f64>,

    /// Temperature at which each iteration was evaluated. Non-increasing.
    pub temperature_history: Vec<f64>,
}

impl RunStatistics {
    /// Accepted moves as a percentage of all moves (0 when no moves were made).
    pub fn acceptance_rate(&self) -> f64 {
        let total = self.accepted_moves + self.rejected_moves;
        if total == 0 {
            0.0
        } else {
            self.accepted_moves as f64 / total as f64 * 100.0
        }
    }

    /// Relative improvement of the best cost over the initial cost, in percent.
    ///
    /// Returns 0 when the initial cost is zero.
    pub fn improvement(&self) -> f64 {
        if self.initial_cost == 0.0 {
            0.0
        } else {
            (self.initial_cost - self.best_cost) / self.initial_cost * 100.0
        }
    }
}

/// Result of a Simulated Annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S: Clone> {
    /// The best solution found.
    pub best: S,

    /// Cost of the best solution.
    pub best_cost: f64,

    /// Run statistics.
    pub stats: RunStatistics,
}

/// Metropolis acceptance probability for moving from `current_cost` to
/// `neighbor_cost` at `temperature`.
///
/// Strict improvements are always accepted. At non-positive temperature a
/// move that is not an improvement is never accepted.
pub fn acceptance_probability(current_cost: f64, neighbor_cost: f64, temperature: f64) -> f64 {
    if neighbor_cost < current_cost {
        return 1.0;
    }
    if temperature <= 0.0 {
        return 0.0;
    }
    (-(neighbor_cost - current_cost) / temperature).exp()
}

/// Executes the Simulated Annealing algorithm.
pub struct SaRunner;

impl SaRunner {
    /// Runs SA with a generator seeded from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`AnnealError::InvalidConfig`] before doing any work if the
    /// configuration is invalid.
    pub fn run<P: SaProblem>(
        problem: &P,
        config: &SaConfig,
    ) -> Result<SaResult<P::Solution>, AnnealError> {
        config.validate()?;
        let mut rng = rng_from_option(config.seed);
        Ok(anneal(problem, config, &mut rng))
    }

    /// Runs SA drawing from a caller-supplied random source.
    ///
    /// `config.seed` is ignored. Sharing one generator across calls keeps a
    /// sequence of runs reproducible as long as the call order is fixed.
    pub fn run_with_rng<P: SaProblem, R: Rng>(
        problem: &P,
        config: &SaConfig,
        rng: &mut R,
    ) -> Result<SaResult<P::Solution>, AnnealError> {
        config.validate()?;
        Ok(anneal(problem, config, rng))
    }
}

fn anneal<P: SaProblem, R: Rng>(
    problem: &P,
    config: &SaConfig,
    rng: &mut R,
) -> SaResult<P::Solution> {
    debug!(
        initial_temperature = config.initial_temperature,
        final_temperature = config.final_temperature,
        cooling_rate = config.cooling_rate,
        max_iterations = ?config.max_iterations,
        "starting simulated annealing"
    );

    let mut current = problem.initial_solution(rng);
    let mut current_cost = problem.cost(&current);
    let mut best = problem.copy_solution(&current);
    let mut best_cost = current_cost;

    let capacity = config.estimated_iterations().saturating_add(1).min(HISTORY_PREALLOC_LIMIT);
    let mut stats = RunStatistics {
        initial_cost: current_cost,
        cost_history: Vec::with_capacity(capacity),
        best_cost_history: Vec::with_capacity(capacity),
        temperature_history: Vec::with_capacity(capacity),
        ..RunStatistics::default()
    };

    let mut temperature = config.initial_temperature;
    let mut iterations = 0usize;

    while !should_terminate(config, temperature, iterations) {
        let neighbor = problem.neighbor(&current, rng);
        let neighbor_cost = problem.cost(&neighbor);

        let probability = acceptance_probability(current_cost, neighbor_cost, temperature);
        let draw: f64 = rng.random();

        if draw < probability {
            current = neighbor;
            current_cost = neighbor_cost;
            stats.accepted_moves += 1;

            if current_cost < best_cost {
                best = problem.copy_solution(&current);
                best_cost = current_cost;
            }
        } else {
            stats.rejected_moves += 1;
        }

        stats.cost_history.push(current_cost);
        stats.best_cost_history.push(best_cost);
        stats.temperature_history.push(temperature);

        temperature *= config.cooling_rate;
        iterations += 1;

        if config.progress_interval > 0 && iterations.is_multiple_of(config.progress_interval) {
            trace!(
                iterations,
                temperature,
                current_cost,
                best_cost,
                acceptance_rate = stats.acceptance_rate(),
                "annealing progress"
            );
        }
    }

    stats.iterations = iterations;
    stats.final_temperature = temperature;
    stats.best_cost = best_cost;

    debug!(
        iterations,
        final_temperature = temperature,
        initial_cost = stats.initial_cost,
        best_cost,
        acceptance_rate = stats.acceptance_rate(),
        improvement = stats.improvement(),
        "simulated annealing finished"
    );

    SaResult {
        best,
        best_cost,
        stats,
    }
}

fn should_terminate(config: &SaConfig, temperature: f64, iterations: usize) -> bool {
    if temperature <= config.final_temperature {
        return true;
    }
    matches!(config.max_iterations, Some(cap) if iterations >= cap)
}

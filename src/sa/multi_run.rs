//! Repeated independent SA runs with aggregate statistics.

use super::config::SaConfig;
use super::runner::{SaResult, SaRunner};
use super::types::SaProblem;
use crate::error::AnnealError;
use crate::random::rng_from_option;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info};

/// Configuration for [`MultiRunner`].
///
/// # Examples
///
/// ```
/// use u_anneal::sa::MultiRunConfig;
///
/// let config = MultiRunConfig::default().with_runs(10).with_seed(7);
/// assert_eq!(config.runs, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MultiRunConfig {
    /// Number of independent runs.
    pub runs: usize,

    /// Master seed. Each run receives its own seed drawn from a generator
    /// seeded with this value.
    pub seed: Option<u64>,

    /// Whether to execute runs on the rayon pool.
    ///
    /// Only honored with the `parallel` cargo feature; results are the same
    /// as for sequential execution.
    pub parallel: bool,
}

impl Default for MultiRunConfig {
    fn default() -> Self {
        Self {
            runs: 5,
            seed: None,
            parallel: false,
        }
    }
}

impl MultiRunConfig {
    pub fn with_runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), AnnealError> {
        if self.runs == 0 {
            return Err(AnnealError::config("runs must be positive"));
        }
        Ok(())
    }
}

/// Aggregated outcome of several independent runs.
#[derive(Debug, Clone)]
pub struct MultiRunResult<S: Clone> {
    /// Individual run results, in run order.
    pub runs: Vec<SaResult<S>>,

    /// Best solution over all runs.
    pub best: S,

    /// Lowest best-cost over all runs.
    pub best_cost: f64,

    /// Highest best-cost over all runs.
    pub worst_cost: f64,

    /// Mean of the per-run best costs.
    pub mean_cost: f64,

    /// Population standard deviation of the per-run best costs.
    pub std_cost: f64,

    /// Mean improvement percentage.
    pub mean_improvement: f64,

    /// Population standard deviation of the improvement percentages.
    pub std_improvement: f64,
}

impl<S: Clone> MultiRunResult<S> {
    /// Per-run best costs, in run order.
    pub fn costs(&self) -> Vec<f64> {
        self.runs.iter().map(|r| r.best_cost).collect()
    }
}

/// Runs SA repeatedly on the same problem and aggregates the outcomes.
pub struct MultiRunner;

impl MultiRunner {
    /// Performs `multi.runs` independent runs of `config` on `problem`.
    ///
    /// `config.seed` is replaced per run by a seed drawn from `multi.seed`,
    /// so every run uses its own random source.
    pub fn run<P: SaProblem>(
        problem: &P,
        config: &SaConfig,
        multi: &MultiRunConfig,
    ) -> Result<MultiRunResult<P::Solution>, AnnealError> {
        config.validate()?;
        multi.validate()?;

        let mut master = rng_from_option(multi.seed);
        let run_configs: Vec<SaConfig> = (0..multi.runs)
            .map(|_| config.clone().with_seed(master.random()))
            .collect();

        let runs = execute(problem, &run_configs, multi.parallel)?;

        for (index, run) in runs.iter().enumerate() {
            debug!(
                run = index + 1,
                best_cost = run.best_cost,
                improvement = run.stats.improvement(),
                "multi-run: run finished"
            );
        }

        let result = aggregate(problem, runs);
        info!(
            runs = result.runs.len(),
            best_cost = result.best_cost,
            worst_cost = result.worst_cost,
            mean_cost = result.mean_cost,
            std_cost = result.std_cost,
            mean_improvement = result.mean_improvement,
            "multi-run finished"
        );
        Ok(result)
    }
}

#[cfg(feature = "parallel")]
fn execute<P: SaProblem>(
    problem: &P,
    configs: &[SaConfig],
    parallel: bool,
) -> Result<Vec<SaResult<P::Solution>>, AnnealError> {
    if parallel {
        configs
            .par_iter()
            .map(|config| SaRunner::run(problem, config))
            .collect()
    } else {
        configs
            .iter()
            .map(|config| SaRunner::run(problem, config))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn execute<P: SaProblem>(
    problem: &P,
    configs: &[SaConfig],
    _parallel: bool,
) -> Result<Vec<SaResult<P::Solution>>, AnnealError> {
    configs
        .iter()
        .map(|config| SaRunner::run(problem, config))
        .collect()
}

/// Requires a non-empty `runs`.
fn aggregate<P: SaProblem>(
    problem: &P,
    runs: Vec<SaResult<P::Solution>>,
) -> MultiRunResult<P::Solution> {
    let costs: Vec<f64> = runs.iter().map(|r| r.best_cost).collect();
    let improvements: Vec<f64> = runs.iter().map(|r| r.stats.improvement()).collect();

    let best_index = costs
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let worst_cost = costs.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let (mean_cost, std_cost) = mean_and_std(&costs);
    let (mean_improvement, std_improvement) = mean_and_std(&improvements);

    MultiRunResult {
        best: problem.copy_solution(&runs[best_index].best),
        best_cost: costs[best_index],
        worst_cost,
        mean_cost,
        std_cost,
        mean_improvement,
        std_improvement,
        runs,
    }
}

/// Mean and population standard deviation. Both are 0 for an empty slice.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

//! SA configuration and the geometric cooling schedule.

use crate::error::AnnealError;

/// Configuration for the Simulated Annealing engine.
///
/// Temperature follows a geometric schedule, `T_{k+1} = cooling_rate * T_k`,
/// starting from `initial_temperature`. The run stops as soon as the
/// temperature drops to `final_temperature` or `max_iterations` is reached.
///
/// # Examples
///
/// ```
/// use u_anneal::sa::SaConfig;
///
/// let config = SaConfig::default()
///     .with_initial_temperature(10.0)
///     .with_final_temperature(0.01)
///     .with_cooling_rate(0.995)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.estimated_iterations(), 1379);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SaConfig {
    /// Initial temperature. Higher values allow more exploration.
    pub initial_temperature: f64,

    /// The run stops once the temperature is at or below this value.
    pub final_temperature: f64,

    /// Multiplicative cooling factor in (0, 1). Higher = slower cooling.
    pub cooling_rate: f64,

    /// Optional hard iteration budget.
    pub max_iterations: Option<usize>,

    /// Random seed for reproducibility.
    pub seed: Option<u64>,

    /// Emit a `trace` progress event every this many iterations (0 = never).
    pub progress_interval: usize,
}

impl Default for SaConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            final_temperature: 0.1,
            cooling_rate: 0.995,
            max_iterations: None,
            seed: None,
            progress_interval: 5000,
        }
    }
}

impl SaConfig {
    pub fn with_initial_temperature(mut self, t: f64) -> Self {
        self.initial_temperature = t;
        self
    }

    pub fn with_final_temperature(mut self, t: f64) -> Self {
        self.final_temperature = t;
        self
    }

    pub fn with_cooling_rate(mut self, alpha: f64) -> Self {
        self.cooling_rate = alpha;
        self
    }

    pub fn with_max_iterations(mut self, n: usize) -> Self {
        self.max_iterations = Some(n);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_progress_interval(mut self, n: usize) -> Self {
        self.progress_interval = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), AnnealError> {
        if !self.initial_temperature.is_finite() || self.initial_temperature <= 0.0 {
            return Err(AnnealError::config(format!(
                "initial_temperature must be positive and finite, got {}",
                self.initial_temperature
            )));
        }
        if self.final_temperature.is_nan() || self.final_temperature <= 0.0 {
            return Err(AnnealError::config(format!(
                "final_temperature must be positive, got {}",
                self.final_temperature
            )));
        }
        if self.final_temperature >= self.initial_temperature {
            return Err(AnnealError::config(
                "final_temperature must be less than initial_temperature",
            ));
        }
        if self.cooling_rate.is_nan() || self.cooling_rate <= 0.0 || self.cooling_rate >= 1.0 {
            return Err(AnnealError::config(format!(
                "cooling_rate must be in (0, 1), got {}",
                self.cooling_rate
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(AnnealError::config("max_iterations must be positive"));
        }
        Ok(())
    }

    /// Number of iterations the schedule needs to cool from the initial to
    /// the final temperature, `ceil(ln(T_f / T_0) / ln(alpha))`, capped by
    /// `max_iterations`.
    ///
    /// Floating-point rounding in the repeated multiplication can add one
    /// more iteration, so a run performs at most `estimated_iterations() + 1`
    /// iterations. Only meaningful for a valid configuration.
    pub fn estimated_iterations(&self) -> usize {
        let steps = (self.final_temperature / self.initial_temperature).ln()
            / self.cooling_rate.ln();
        let steps = steps.ceil().max(0.0) as usize;
        match self.max_iterations {
            Some(cap) => steps.min(cap),
            None => steps,
        }
    }
}

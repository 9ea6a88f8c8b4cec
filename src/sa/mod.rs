//! Simulated Annealing (SA).
//!
//! A single-solution trajectory metaheuristic inspired by the physical
//! annealing process. Accepts worsening moves with a probability that
//! decreases over time (temperature), allowing the search to escape
//! local optima.
//!
//! The engine ([`SaRunner`]) is generic over [`SaProblem`] and knows
//! nothing about the solution representation. [`MultiRunner`] repeats
//! independent runs and aggregates their outcomes.
//!
//! # References
//!
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"
//! - Cerny (1985), "Thermodynamical Approach to the Travelling Salesman Problem"
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"

mod config;
mod multi_run;
mod runner;
mod types;

pub use config::SaConfig;
pub use multi_run::{MultiRunConfig, MultiRunResult, MultiRunner};
pub use runner::{acceptance_probability, RunStatistics, SaResult, SaRunner};
pub use types::SaProblem;

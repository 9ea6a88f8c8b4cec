//! Simulated annealing with classical and QUBO formulations of the TSP.
//!
//! - **Simulated Annealing (SA)**: a generic engine over any
//!   [`SaProblem`](sa::SaProblem) with Metropolis acceptance, geometric
//!   cooling and full run statistics, plus a multi-run aggregator.
//! - **Classical TSP**: permutation tours with 2-opt, swap, reverse,
//!   insert and mixed neighborhoods, and a deterministic 2-opt polish.
//! - **QUBO TSP**: one-hot city/position matrices scored by a QUBO energy
//!   that adds constraint penalties to the tour length.
//!
//! # Architecture
//!
//! The engine in [`sa`] knows nothing about cities or tours. The [`tsp`]
//! module supplies problem adapters that implement its trait. Randomness
//! flows through a caller-visible seed ([`random`]) so runs are
//! reproducible.

pub mod error;
pub mod random;
pub mod sa;
pub mod tsp;

pub use error::AnnealError;

//! Traveling Salesman Problem formulations for the annealing engine.
//!
//! Two [`SaProblem`](crate::sa::SaProblem) adapters share the same city
//! model and distance table:
//!
//! - [`ClassicalTsp`]: the solution is a tour (a permutation of city
//!   indices) and the cost is the closed tour length.
//! - [`QuboTsp`]: the solution is an `n x n` [`BinaryAssignment`] and the
//!   cost is the energy of the [`QuboMatrix`] built by [`build_tsp_qubo`].
//!
//! # Examples
//!
//! ```
//! use u_anneal::sa::{SaConfig, SaRunner};
//! use u_anneal::tsp::{CitySet, ClassicalTsp, NeighborOperator};
//!
//! let cities = CitySet::new([
//!     ("A", (0.0, 0.0)),
//!     ("B", (0.0, 1.0)),
//!     ("C", (1.0, 1.0)),
//!     ("D", (1.0, 0.0)),
//! ])
//! .unwrap();
//! let problem = ClassicalTsp::new(cities, NeighborOperator::TwoOpt);
//! let config = SaConfig::default()
//!     .with_initial_temperature(10.0)
//!     .with_final_temperature(0.01)
//!     .with_seed(7);
//!
//! let result = SaRunner::run(&problem, &config).unwrap();
//! assert!(problem.validate_tour(&result.best));
//! assert!(result.best_cost <= result.stats.initial_cost);
//! ```

pub mod assignment;
pub mod cities;
pub mod classical;
pub mod distance;
pub mod qubo;
pub mod qubo_matrix;

pub use assignment::BinaryAssignment;
pub use cities::{City, CitySet, Point};
pub use classical::{ClassicalTsp, InitialTour, NeighborOperator, Tour, TourInfo};
pub use distance::{euclidean, DistanceTable};
pub use qubo::{ConstraintViolations, QuboConfig, QuboMove, QuboSolutionInfo, QuboTsp};
pub use qubo_matrix::{build_tsp_qubo, var_index, QuboMatrix};

//! TSP Heuristics Library
//!
//! Approximate solvers for the symmetric Traveling Salesman Problem on
//! TSPLIB instances.
//!
//! # Features
//!
//! - TSPLIB parsing: `EUC_2D`, `CEIL_2D`, `GEO` coordinates and `EXPLICIT`
//!   distance matrices
//! - Nearest Neighbor construction
//! - Population-based methods (Genetic Algorithm, Ant Colony Optimization)
//! - Benchmarking and visualization tools
//!
//! # Example
//!
//! ```no_run
//! use tsp_heuristics::instance::Instance;
//! use tsp_heuristics::heuristics::aco::{AntColonyOptimization, ACOConfig};
//!
//! // Load instance
//! let instance = Instance::from_file("berlin52.tsp").unwrap();
//!
//! let mut aco = AntColonyOptimization::new(instance.clone(), ACOConfig::default()).unwrap();
//! let run = aco.run();
//!
//! println!("Best route: {}", run.route_ids().join(" -> "));
//! println!("Solution cost: {:.2}", run.best.cost);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod benchmark;
pub mod visualization;

pub use error::{Result, TspError};
pub use instance::Instance;
pub use solution::Solution;

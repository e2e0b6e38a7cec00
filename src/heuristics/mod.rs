//! Heuristics module for the TSP.
//!
//! This module exports the constructive heuristic and the two
//! population-based metaheuristics.

pub mod construction;
pub mod genetic;
pub mod aco;

pub use construction::*;
pub use genetic::*;
pub use aco::*;

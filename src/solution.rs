//! Solution representation for the TSP.
//!
//! A solution is an open tour of node indices (the closing edge back to
//! the first node is implicit) together with its cost and some
//! bookkeeping about the run that produced it.

use crate::instance::Instance;
use serde::{Deserialize, Serialize};

/// Represents a solution to the TSP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of node indices, implicitly closed
    pub tour: Vec<usize>,
    /// Total tour length including the closing edge
    pub cost: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Number of iterations/generations (if applicable)
    pub iterations: Option<usize>,
}

impl Solution {
    /// Create a new empty solution
    pub fn new() -> Self {
        Solution {
            tour: Vec::new(),
            cost: f64::INFINITY,
            algorithm: String::new(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Create a solution from a tour
    pub fn from_tour(instance: &Instance, tour: Vec<usize>, algorithm: &str) -> Self {
        let cost = instance.tour_length(&tour);

        Solution {
            tour,
            cost,
            algorithm: algorithm.to_string(),
            computation_time: 0.0,
            iterations: None,
        }
    }

    /// Check if all nodes are visited exactly once
    pub fn is_complete(&self, instance: &Instance) -> bool {
        instance.is_permutation(&self.tour)
    }

    /// External ids of the closed route, start node repeated at the end
    pub fn route_ids<'a>(&self, instance: &'a Instance) -> Vec<&'a str> {
        let mut ids: Vec<&str> = self.tour.iter().map(|&n| instance.node_id(n)).collect();
        if let Some(&first) = self.tour.first() {
            ids.push(instance.node_id(first));
        }
        ids
    }

    /// Route rendered as `1 -> 2 -> ... -> 1`
    pub fn format_route(&self, instance: &Instance) -> String {
        self.route_ids(instance).join(" -> ")
    }
}

impl Default for Solution {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Solution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution ({})", self.algorithm)?;
        writeln!(f, "  Cost: {:.2}", self.cost)?;
        writeln!(f, "  Time: {:.2} ms", self.computation_time * 1000.0)?;
        if let Some(iter) = self.iterations {
            writeln!(f, "  Iterations: {}", iter)?;
        }
        writeln!(f, "  Tour: {:?}", self.tour)
    }
}

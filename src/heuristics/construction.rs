//! Construction heuristics for the TSP.

use crate::instance::Instance;
use crate::solution::Solution;

pub trait ConstructionHeuristic {
    fn construct(&self, instance: &Instance) -> Solution;
    fn name(&self) -> &str;
}

/// Nearest Neighbor Heuristic
///
/// Builds a tour by repeatedly visiting the nearest unvisited node.
/// Ties go to the node that comes first in the instance's node order,
/// so the result is fully determined by the instance and the start node.
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighborHeuristic {
    /// Index of the first node of the tour
    pub start: usize,
}

impl NearestNeighborHeuristic {
    pub fn new() -> Self {
        NearestNeighborHeuristic { start: 0 }
    }

    pub fn starting_at(start: usize) -> Self {
        NearestNeighborHeuristic { start }
    }

    fn find_nearest(&self, instance: &Instance, current: usize, visited: &[bool]) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;

        for candidate in 0..instance.dimension() {
            if visited[candidate] {
                continue;
            }
            let d = instance.distance(current, candidate);
            // strict comparison: the first node at minimum distance wins
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((candidate, d));
            }
        }

        best.map(|(node, _)| node)
    }
}

impl Default for NearestNeighborHeuristic {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructionHeuristic for NearestNeighborHeuristic {
    fn construct(&self, instance: &Instance) -> Solution {
        let start_time = std::time::Instant::now();
        let n = instance.dimension();

        if self.start >= n {
            log::warn!("start index {} outside instance of {} nodes", self.start, n);
            let mut solution = Solution::new();
            solution.algorithm = self.name().to_string();
            return solution;
        }

        let mut tour = Vec::with_capacity(n);
        tour.push(self.start);
        let mut visited = vec![false; n];
        visited[self.start] = true;

        let mut current = self.start;

        while tour.len() < n {
            match self.find_nearest(instance, current, &visited) {
                Some(next) => {
                    tour.push(next);
                    visited[next] = true;
                    current = next;
                }
                None => break,
            }
        }

        // A short tour means the walk stopped early; callers check
        // `Solution::is_complete` before trusting the result.
        let mut solution = Solution::from_tour(instance, tour, self.name());
        solution.computation_time = start_time.elapsed().as_secs_f64();
        log::debug!(
            "{} from node {}: cost {:.3}",
            self.name(),
            instance.node_id(self.start),
            solution.cost
        );
        solution
    }

    fn name(&self) -> &str {
        "NearestNeighbor"
    }
}

/// Nearest-neighbor tour from the first node of the instance
pub fn nearest_neighbor(instance: &Instance) -> Solution {
    NearestNeighborHeuristic::new().construct(instance)
}

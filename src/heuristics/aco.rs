//! Ant Colony Optimization for the TSP.
//!
//! This module implements the classic Ant System: every ant builds a tour
//! by roulette over pheromone and inverse distance, then all ants deposit
//! on the edges they used after a global evaporation step.

use crate::error::{Result, TspError};
use crate::instance::Instance;
use crate::solution::Solution;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Visibility used for an off-diagonal pair at distance zero
const ZERO_DISTANCE_VISIBILITY: f64 = 1e6;

/// ACO configuration parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ACOConfig {
    /// Number of ants
    pub num_ants: usize,
    /// Number of iterations
    pub max_iterations: usize,
    /// Pheromone importance (alpha)
    pub alpha: f64,
    /// Heuristic importance (beta)
    pub beta: f64,
    /// Evaporation rate (rho)
    pub evaporation_rate: f64,
    /// Pheromone deposit factor
    pub q: f64,
    /// Random seed
    pub seed: u64,
    /// Optional time limit in seconds, checked between iterations
    pub time_limit: Option<f64>,
}

impl Default for ACOConfig {
    fn default() -> Self {
        ACOConfig {
            num_ants: 20,
            max_iterations: 100,
            alpha: 1.0,
            beta: 2.0,
            evaporation_rate: 0.5,
            q: 100.0,
            seed: 42,
            time_limit: None,
        }
    }
}

impl ACOConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_ants == 0 {
            return Err(TspError::InvalidParameter("at least one ant is required".to_string()));
        }
        if self.max_iterations == 0 {
            return Err(TspError::InvalidParameter(
                "at least one iteration is required".to_string(),
            ));
        }
        for (name, value) in [("alpha", self.alpha), ("beta", self.beta), ("q", self.q)] {
            if !value.is_finite() || value < 0.0 {
                return Err(TspError::InvalidParameter(format!(
                    "{} must be finite and non-negative, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.evaporation_rate) {
            return Err(TspError::InvalidParameter(format!(
                "evaporation rate must be in [0, 1], got {}",
                self.evaporation_rate
            )));
        }
        if let Some(limit) = self.time_limit {
            if limit.is_nan() || limit < 0.0 {
                return Err(TspError::InvalidParameter(format!(
                    "time limit must be non-negative, got {}",
                    limit
                )));
            }
        }
        Ok(())
    }
}

/// Result of a full ACO run
#[derive(Debug, Clone)]
pub struct AcoRun {
    /// Best tour over all ants and iterations
    pub best: Solution,
    /// External id of every node index used in `best.tour`
    pub node_ids: Vec<String>,
}

impl AcoRun {
    /// Best route as external ids, start node repeated at the end
    pub fn route_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.best.tour.iter().map(|&i| self.node_ids[i].as_str()).collect();
        if let Some(&first) = self.best.tour.first() {
            ids.push(self.node_ids[first].as_str());
        }
        ids
    }
}

/// `1 / (n * mean(D))` over all `n²` entries; 1 when every distance is zero
pub fn initial_pheromone(distances: &[Vec<f64>]) -> f64 {
    let n = distances.len();
    if n == 0 {
        return 1.0;
    }
    let total: f64 = distances.iter().map(|row| row.iter().sum::<f64>()).sum();
    let mean = total / (n * n) as f64;
    if mean > 0.0 && mean.is_finite() {
        1.0 / (n as f64 * mean)
    } else {
        1.0
    }
}

/// Ant Colony Optimization solver
pub struct AntColonyOptimization {
    config: ACOConfig,
    instance: Instance,
    pheromone: Vec<Vec<f64>>,
    heuristic: Vec<Vec<f64>>,
    best_tour: Vec<usize>,
    best_cost: f64,
    rng: ChaCha8Rng,
    iteration: usize,
    fallbacks: usize,
}

impl AntColonyOptimization {
    pub fn new(instance: Instance, config: ACOConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(instance, config, rng)
    }

    /// Use a caller-supplied generator instead of seeding from the config
    pub fn with_rng(instance: Instance, config: ACOConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        let n = instance.dimension();
        let distances = instance.distance_matrix();

        let tau0 = initial_pheromone(&distances);
        let pheromone = vec![vec![tau0; n]; n];

        // Initialize heuristic information (inverse distance)
        let mut heuristic = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    let dist = distances[i][j];
                    heuristic[i][j] = if dist > 0.0 { 1.0 / dist } else { ZERO_DISTANCE_VISIBILITY };
                }
            }
        }

        log::debug!("[ACO] tau0 = {:.6e} for {} nodes", tau0, n);

        Ok(AntColonyOptimization {
            config,
            instance,
            pheromone,
            heuristic,
            best_tour: Vec::new(),
            best_cost: f64::INFINITY,
            rng,
            iteration: 0,
            fallbacks: 0,
        })
    }

    /// Row-normalized transition probabilities for the current pheromone.
    ///
    /// The diagonal is always zero. A row whose scores sum to zero (or
    /// overflow) becomes uniform over the other nodes.
    pub fn transition_probabilities(&mut self) -> Vec<Vec<f64>> {
        let n = self.instance.dimension();
        let mut probabilities = vec![vec![0.0; n]; n];

        for (i, row) in probabilities.iter_mut().enumerate() {
            for (j, p) in row.iter_mut().enumerate() {
                if i != j {
                    *p = self.pheromone[i][j].powf(self.config.alpha)
                        * self.heuristic[i][j].powf(self.config.beta);
                }
            }

            let total: f64 = row.iter().sum();
            if total > 0.0 && total.is_finite() {
                for p in row.iter_mut() {
                    *p /= total;
                }
            } else {
                self.fallbacks += 1;
                let uniform = 1.0 / (n - 1) as f64;
                for (j, p) in row.iter_mut().enumerate() {
                    *p = if i == j { 0.0 } else { uniform };
                }
            }
        }

        probabilities
    }

    /// Construct a tour for one ant
    fn construct_tour(&mut self, probabilities: &[Vec<f64>]) -> Vec<usize> {
        let n = self.instance.dimension();
        let start = self.rng.gen_range(0..n);

        let mut tour = Vec::with_capacity(n);
        tour.push(start);
        let mut visited = vec![false; n];
        visited[start] = true;

        let mut current = start;
        while tour.len() < n {
            match self.select_next_node(&probabilities[current], &visited) {
                Some(next) => {
                    tour.push(next);
                    visited[next] = true;
                    current = next;
                }
                None => break,
            }
        }

        tour
    }

    /// Roulette over the unvisited columns of `row`
    fn select_next_node(&mut self, row: &[f64], visited: &[bool]) -> Option<usize> {
        let candidates: Vec<usize> = (0..row.len()).filter(|&j| !visited[j]).collect();
        if candidates.is_empty() {
            return None;
        }

        let total: f64 = candidates.iter().map(|&j| row[j]).sum();
        if total > 0.0 && total.is_finite() {
            let r = self.rng.gen_range(0.0..=total);
            let mut accumulated = 0.0;
            for &j in &candidates {
                accumulated += row[j];
                if r <= accumulated {
                    return Some(j);
                }
            }
        }

        self.fallbacks += 1;
        candidates.choose(&mut self.rng).copied()
    }

    /// Evaporate everywhere, then every ant deposits `q / cost` on its edges
    fn update_pheromone(&mut self, tours: &[(Vec<usize>, f64)]) {
        let retention = 1.0 - self.config.evaporation_rate;
        for row in self.pheromone.iter_mut() {
            for tau in row.iter_mut() {
                *tau *= retention;
            }
        }

        for (tour, cost) in tours {
            if *cost <= 0.0 {
                continue;
            }
            let delta = self.config.q / cost;

            let m = tour.len();
            for i in 0..m {
                let from = tour[i];
                let to = tour[(i + 1) % m];
                if from == to {
                    continue;
                }
                self.pheromone[from][to] += delta;
                self.pheromone[to][from] += delta;
            }
        }
    }

    /// One colony iteration. Returns the best cost among this iteration's ants.
    pub fn iterate(&mut self) -> f64 {
        let probabilities = self.transition_probabilities();

        let mut tours = Vec::with_capacity(self.config.num_ants);
        let mut iteration_best = f64::INFINITY;

        for _ in 0..self.config.num_ants {
            let tour = self.construct_tour(&probabilities);
            let cost = self.instance.tour_length(&tour);

            if cost < self.best_cost {
                self.best_cost = cost;
                self.best_tour = tour.clone();
            }
            iteration_best = iteration_best.min(cost);
            tours.push((tour, cost));
        }

        self.update_pheromone(&tours);
        self.iteration += 1;

        iteration_best
    }

    /// Run ACO algorithm
    pub fn run(&mut self) -> AcoRun {
        let start = std::time::Instant::now();

        log::info!(
            "[ACO] {} ants, {} iterations on {} nodes",
            self.config.num_ants,
            self.config.max_iterations,
            self.instance.dimension()
        );

        while self.iteration < self.config.max_iterations {
            if let Some(limit) = self.config.time_limit {
                if self.iteration > 0 && start.elapsed().as_secs_f64() >= limit {
                    log::info!("[ACO] time limit reached at iteration {}", self.iteration);
                    break;
                }
            }

            let iteration_best = self.iterate();

            log::debug!(
                "[ACO] Iter {}  Iteration best {:.3}  Best cost {:.3}",
                self.iteration,
                iteration_best,
                self.best_cost
            );
        }

        if self.fallbacks > 0 {
            log::warn!("[ACO] {} uniform fallback(s) during the run", self.fallbacks);
        }

        let mut best = self.best_solution().unwrap_or_else(|| {
            let mut empty = Solution::new();
            empty.algorithm = "ACO".to_string();
            empty
        });
        best.computation_time = start.elapsed().as_secs_f64();
        best.iterations = Some(self.iteration);

        log::info!(
            "[ACO] finished {} iterations, best cost {:.3}",
            self.iteration,
            best.cost
        );

        AcoRun {
            best,
            node_ids: self.instance.node_ids().to_vec(),
        }
    }

    /// Run and keep only the best solution
    pub fn solve(&mut self) -> Solution {
        self.run().best
    }

    /// Get best solution found
    pub fn best_solution(&self) -> Option<Solution> {
        if self.best_tour.is_empty() {
            return None;
        }
        Some(Solution::from_tour(&self.instance, self.best_tour.clone(), "ACO"))
    }

    pub fn pheromone(&self) -> &[Vec<f64>] {
        &self.pheromone
    }

    pub fn current_iteration(&self) -> usize {
        self.iteration
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_instance() -> Instance {
        Instance::euclidean(&[
            (0.0, 0.0),
            (1.0, 0.0),
            (2.0, 0.0),
            (1.0, 1.0),
            (4.0, 2.0),
            (0.0, 3.0),
        ])
        .unwrap()
    }

    fn three_node_matrix() -> Instance {
        Instance::from_matrix(vec![
            vec![0.0, 1.0, 2.0],
            vec![1.0, 0.0, 1.0],
            vec![2.0, 1.0, 0.0],
        ])
        .unwrap()
    }

    fn assert_symmetric_non_negative(pheromone: &[Vec<f64>]) {
        for (i, row) in pheromone.iter().enumerate() {
            for (j, &tau) in row.iter().enumerate() {
                assert!(tau >= 0.0, "negative pheromone at ({}, {})", i, j);
                assert_eq!(tau, pheromone[j][i]);
            }
        }
    }

    #[test]
    fn test_aco() {
        let instance = create_test_instance();
        let config = ACOConfig {
            num_ants: 5,
            max_iterations: 10,
            ..Default::default()
        };

        let mut aco = AntColonyOptimization::new(instance.clone(), config).unwrap();
        let run = aco.run();

        assert!(run.best.is_complete(&instance));
        assert!((run.best.cost - instance.tour_length(&run.best.tour)).abs() < 1e-9);
        assert_eq!(run.best.iterations, Some(10));
        assert_eq!(run.node_ids, instance.node_ids());
    }

    #[test]
    fn test_single_ant_single_iteration() {
        let instance = three_node_matrix();
        let config = ACOConfig {
            num_ants: 1,
            max_iterations: 1,
            ..Default::default()
        };

        let run = AntColonyOptimization::new(instance.clone(), config).unwrap().run();

        assert!(run.best.is_complete(&instance));
        assert_eq!(run.best.cost, 4.0);
        let ids = run.route_ids();
        assert_eq!(ids.len(), 4);
        assert_eq!(ids.first(), ids.last());
    }

    #[test]
    fn test_initial_pheromone() {
        let instance = three_node_matrix();
        // sum 8 over 9 entries: tau0 = 1 / (3 * 8 / 9)
        assert!((initial_pheromone(&instance.distance_matrix()) - 0.375).abs() < 1e-12);
        assert_eq!(initial_pheromone(&[vec![0.0, 0.0], vec![0.0, 0.0]]), 1.0);

        let aco = AntColonyOptimization::new(instance, ACOConfig::default()).unwrap();
        assert!(aco.pheromone().iter().flatten().all(|&tau| (tau - 0.375).abs() < 1e-12));
    }

    #[test]
    fn test_full_evaporation_leaves_only_deposits() {
        let instance = three_node_matrix();
        let config = ACOConfig {
            num_ants: 1,
            max_iterations: 1,
            evaporation_rate: 1.0,
            ..Default::default()
        };
        let mut aco = AntColonyOptimization::new(instance, config).unwrap();
        aco.iterate();

        // the single 3-cycle uses every edge and costs 4: 100 / 4 each way
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 0.0 } else { 25.0 };
                assert_eq!(aco.pheromone()[i][j], expected);
            }
        }
    }

    #[test]
    fn test_probability_rows() {
        let mut aco = AntColonyOptimization::new(create_test_instance(), ACOConfig::default()).unwrap();
        let probabilities = aco.transition_probabilities();

        for (i, row) in probabilities.iter().enumerate() {
            assert_eq!(row[i], 0.0);
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_distance_between_distinct_nodes() {
        let instance = Instance::euclidean(&[(0.0, 0.0), (0.0, 0.0), (3.0, 4.0), (6.0, 0.0)]).unwrap();
        let config = ACOConfig {
            num_ants: 4,
            max_iterations: 5,
            ..Default::default()
        };
        let mut aco = AntColonyOptimization::new(instance.clone(), config).unwrap();

        for row in aco.transition_probabilities() {
            assert!(row.iter().all(|p| p.is_finite()));
        }
        let run = aco.run();
        assert!(run.best.is_complete(&instance));
    }

    fn all_zero_instance(n: usize) -> Instance {
        Instance::from_matrix(vec![vec![0.0; n]; n]).unwrap()
    }

    fn assert_uniform_rows(probabilities: &[Vec<f64>]) {
        let n = probabilities.len();
        for (i, row) in probabilities.iter().enumerate() {
            for (j, &p) in row.iter().enumerate() {
                let expected = if i == j { 0.0 } else { 1.0 / (n - 1) as f64 };
                assert_eq!(p, expected, "row {} column {}", i, j);
            }
        }
    }

    #[test]
    fn test_overflowing_row_becomes_uniform() {
        // 1e6^100 overflows to infinity on every off-diagonal entry
        let instance = all_zero_instance(4);
        let config = ACOConfig {
            num_ants: 3,
            max_iterations: 2,
            beta: 100.0,
            ..Default::default()
        };
        let mut aco = AntColonyOptimization::new(instance.clone(), config).unwrap();

        assert_uniform_rows(&aco.transition_probabilities());
        assert_eq!(aco.fallbacks, 4);

        let run = aco.run();
        assert!(run.best.is_complete(&instance));
        assert_eq!(run.best.cost, 0.0);
    }

    #[test]
    fn test_zero_pheromone_row_becomes_uniform() {
        // full evaporation and zero-cost routes leave no pheromone at all
        let instance = all_zero_instance(4);
        let config = ACOConfig {
            num_ants: 2,
            max_iterations: 3,
            evaporation_rate: 1.0,
            ..Default::default()
        };
        let mut aco = AntColonyOptimization::new(instance.clone(), config).unwrap();
        aco.iterate();
        assert!(aco.pheromone().iter().flatten().all(|&tau| tau == 0.0));

        let before = aco.fallbacks;
        assert_uniform_rows(&aco.transition_probabilities());
        assert_eq!(aco.fallbacks - before, 4);

        let run = aco.run();
        assert!(run.best.is_complete(&instance));
    }

    #[test]
    fn test_zero_local_sum_picks_an_unvisited_node() {
        let mut aco = AntColonyOptimization::new(create_test_instance(), ACOConfig::default()).unwrap();
        // all remaining mass sits on visited columns
        let row = [0.0, 0.0, 0.5, 0.0, 0.5, 0.0];
        let visited = [true, false, true, false, true, false];

        for _ in 0..20 {
            let next = aco.select_next_node(&row, &visited).unwrap();
            assert!([1, 3, 5].contains(&next));
        }
        assert_eq!(aco.fallbacks, 20);

        assert_eq!(aco.select_next_node(&row, &[true; 6]), None);
    }

    #[test]
    fn test_same_seed_same_result() {
        let instance = create_test_instance();
        let config = ACOConfig {
            num_ants: 6,
            max_iterations: 15,
            seed: 9,
            ..Default::default()
        };

        let a = AntColonyOptimization::new(instance.clone(), config.clone()).unwrap().solve();
        let b = AntColonyOptimization::new(instance, config).unwrap().solve();
        assert_eq!(a.tour, b.tour);
        assert_eq!(a.cost, b.cost);
    }

    #[test]
    fn test_invalid_config() {
        let instance = create_test_instance();
        for config in [
            ACOConfig { num_ants: 0, ..Default::default() },
            ACOConfig { max_iterations: 0, ..Default::default() },
            ACOConfig { evaporation_rate: 1.5, ..Default::default() },
            ACOConfig { alpha: f64::NAN, ..Default::default() },
            ACOConfig { q: -1.0, ..Default::default() },
        ] {
            assert!(matches!(
                AntColonyOptimization::new(instance.clone(), config),
                Err(TspError::InvalidParameter(_))
            ));
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn pheromone_stays_symmetric(
            rho in 0.0f64..=1.0,
            alpha in 0.0f64..3.0,
            beta in 0.0f64..5.0,
            seed in any::<u64>(),
        ) {
            let config = ACOConfig {
                num_ants: 4,
                max_iterations: 6,
                alpha,
                beta,
                evaporation_rate: rho,
                seed,
                ..Default::default()
            };
            let mut aco = AntColonyOptimization::new(create_test_instance(), config).unwrap();
            for _ in 0..6 {
                aco.iterate();
                assert_symmetric_non_negative(aco.pheromone());
            }
        }
    }
}

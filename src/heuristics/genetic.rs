//! Genetic Algorithm for the TSP.
//!
//! This module implements a generational genetic algorithm with:
//! - Roulette wheel parent selection without replacement
//! - Single-point crossover with a cut shared by the whole generation
//! - Swap mutation
//! - Permutation repair of the offspring
//! - Random truncation back to the target population size

use crate::error::{Result, TspError};
use crate::instance::Instance;
use crate::solution::Solution;
use ordered_float::OrderedFloat;
use rand::prelude::*;
use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Smallest cost used as a divisor when weighting individuals
const MIN_WEIGHT_COST: f64 = 1e-12;

/// Individual in the genetic algorithm population
#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    /// The tour representation
    pub tour: Vec<usize>,
    /// Closed tour length
    pub cost: f64,
}

impl Individual {
    pub fn new(tour: Vec<usize>, instance: &Instance) -> Self {
        let cost = instance.tour_length(&tour);
        Individual { tour, cost }
    }
}

/// Individuals kept sorted by ascending cost
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Population {
    individuals: Vec<Individual>,
}

impl Population {
    pub fn from_individuals(individuals: Vec<Individual>) -> Self {
        let mut population = Population { individuals };
        population.sort();
        population
    }

    /// Lowest-cost individual
    pub fn best(&self) -> Option<&Individual> {
        self.individuals.first()
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    /// Stable sort, so equal-cost individuals keep their relative order
    fn sort(&mut self) {
        self.individuals.sort_by_key(|ind| OrderedFloat(ind.cost));
    }

    fn merge(&mut self, children: Vec<Individual>) {
        self.individuals.extend(children);
        self.sort();
    }

    /// Relative fitness of each individual: total cost divided by its cost
    pub fn fitness_weights(&self) -> Vec<f64> {
        let total: f64 = self.individuals.iter().map(|ind| ind.cost).sum();
        if total <= 0.0 {
            return vec![1.0; self.individuals.len()];
        }
        self.individuals
            .iter()
            .map(|ind| total / ind.cost.max(MIN_WEIGHT_COST))
            .collect()
    }

    /// Remove uniformly random individuals until `size` remain.
    ///
    /// The removed positions are sampled without replacement up front, so
    /// the survivors keep their sorted order.
    fn truncate_random<R: Rng + ?Sized>(&mut self, size: usize, rng: &mut R) {
        let len = self.individuals.len();
        if len <= size {
            return;
        }

        let mut removed = vec![false; len];
        for i in index::sample(rng, len, len - size) {
            removed[i] = true;
        }

        let mut position = 0;
        self.individuals.retain(|_| {
            let keep = !removed[position];
            position += 1;
            keep
        });
    }
}

/// Running sums of `weights`, by position
pub fn cumulative_weights(weights: &[f64]) -> Vec<f64> {
    weights
        .iter()
        .scan(0.0, |acc, &w| {
            *acc += w;
            Some(*acc)
        })
        .collect()
}

/// Single-point crossover: heads swap at `cut`
pub fn single_point_crossover(parent1: &[usize], parent2: &[usize], cut: usize) -> (Vec<usize>, Vec<usize>) {
    let mut child1 = parent1[..cut].to_vec();
    child1.extend_from_slice(&parent2[cut..]);
    let mut child2 = parent2[..cut].to_vec();
    child2.extend_from_slice(&parent1[cut..]);
    (child1, child2)
}

/// Turn a crossover child back into a permutation of `parent`'s nodes.
///
/// Every position holding a node already seen earlier in the child is a
/// duplicate slot. Slots are filled in position order with the nodes
/// missing from the child, taken in the order they appear in `parent`.
pub fn repair(parent: &[usize], child: &mut [usize]) {
    let n = parent.len();
    let mut present = vec![false; n];
    for &node in child.iter() {
        present[node] = true;
    }
    let mut missing = parent.iter().copied().filter(|&node| !present[node]);

    let mut seen = vec![false; n];
    for slot in child.iter_mut() {
        if seen[*slot] {
            if let Some(node) = missing.next() {
                *slot = node;
            }
        } else {
            seen[*slot] = true;
        }
    }
}

/// Genetic Algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GAConfig {
    /// Population size
    pub population_size: usize,
    /// Share of the population paired for reproduction, in percent
    pub reproduction_rate: f64,
    /// Probability of a swap mutation per child
    pub mutation_prob: f64,
    /// Number of generations
    pub max_generations: usize,
    /// Random seed
    pub seed: u64,
    /// Optional time limit in seconds, checked between generations
    pub time_limit: Option<f64>,
}

impl Default for GAConfig {
    fn default() -> Self {
        GAConfig {
            population_size: 10,
            reproduction_rate: 60.0,
            mutation_prob: 0.5,
            max_generations: 80,
            seed: 42,
            time_limit: None,
        }
    }
}

impl GAConfig {
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(TspError::InvalidParameter(
                "population size must be at least 1".to_string(),
            ));
        }
        if !self.reproduction_rate.is_finite() || self.reproduction_rate < 0.0 {
            return Err(TspError::InvalidParameter(format!(
                "reproduction rate must be a non-negative percentage, got {}",
                self.reproduction_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_prob) {
            return Err(TspError::InvalidParameter(format!(
                "mutation probability must be in [0, 1], got {}",
                self.mutation_prob
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

    /// Number of parent pairs drawn each generation
    pub fn pair_count(&self) -> usize {
        (self.population_size as f64 * self.reproduction_rate / 2.0 / 100.0).floor() as usize
    }
}

/// Genetic Algorithm implementation
pub struct GeneticAlgorithm {
    config: GAConfig,
    instance: Instance,
    population: Population,
    rng: ChaCha8Rng,
    generation: usize,
}

impl GeneticAlgorithm {
    pub fn new(instance: Instance, config: GAConfig) -> Result<Self> {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self::with_rng(instance, config, rng)
    }

    /// Use a caller-supplied generator instead of seeding from the config
    pub fn with_rng(instance: Instance, config: GAConfig, rng: ChaCha8Rng) -> Result<Self> {
        config.validate()?;

        Ok(GeneticAlgorithm {
            config,
            instance,
            population: Population::default(),
            rng,
            generation: 0,
        })
    }

    /// Initialize population with uniformly random permutations
    fn initialize_population(&mut self) {
        let individuals = (0..self.config.population_size)
            .map(|_| {
                let tour = self.random_tour();
                Individual::new(tour, &self.instance)
            })
            .collect();
        self.population = Population::from_individuals(individuals);
        self.generation = 0;

        log::debug!(
            "[GA] Initialized population: {} (best cost {:.3})",
            self.population.len(),
            self.population.best().map_or(f64::INFINITY, |b| b.cost)
        );
    }

    fn random_tour(&mut self) -> Vec<usize> {
        let mut tour: Vec<usize> = (0..self.instance.dimension()).collect();
        tour.shuffle(&mut self.rng);
        tour
    }

    /// Draw one individual from `pool` by roulette and remove it from the pool
    fn roulette_draw(&mut self, pool: &mut Vec<usize>, weights: &[f64]) -> usize {
        let pool_weights: Vec<f64> = pool.iter().map(|&i| weights[i]).collect();
        let cumulative = cumulative_weights(&pool_weights);
        let total = cumulative.last().copied().unwrap_or(0.0);

        let pointer = if total > 0.0 {
            self.rng.gen_range(0.0..=total)
        } else {
            0.0
        };

        // first interval whose cumulative weight reaches the pointer
        let position = cumulative
            .partition_point(|&c| c < pointer)
            .min(pool.len() - 1);
        pool.remove(position)
    }

    /// Roulette selection of parent pairs.
    ///
    /// The pool is shared by every pair of the generation, so an
    /// individual is a parent at most once. Pairs that cannot be completed
    /// once the pool runs dry are skipped.
    fn select_parents(&mut self, weights: &[f64]) -> Vec<(usize, usize)> {
        let pairs = self.config.pair_count();
        let mut pool: Vec<usize> = (0..self.population.len()).collect();
        let mut selected = Vec::with_capacity(pairs.min(pool.len() / 2));

        for _ in 0..pairs {
            if pool.len() < 2 {
                log::debug!("[GA] selection pool exhausted after {} pairs", selected.len());
                break;
            }
            let first = self.roulette_draw(&mut pool, weights);
            let second = self.roulette_draw(&mut pool, weights);
            selected.push((first, second));
        }

        selected
    }

    /// Swap two distinct random positions with probability `mutation_prob`
    fn mutate(&mut self, tour: &mut [usize]) {
        if tour.len() < 2 {
            return;
        }
        if self.rng.gen::<f64>() < self.config.mutation_prob {
            let picked = index::sample(&mut self.rng, tour.len(), 2);
            tour.swap(picked.index(0), picked.index(1));
        }
    }

    /// Create new generation
    fn evolve(&mut self) {
        let weights = self.population.fitness_weights();
        let parents = self.select_parents(&weights);

        if !parents.is_empty() {
            let cut = self.rng.gen_range(1..self.instance.dimension());
            let mut children = Vec::with_capacity(parents.len() * 2);

            for (a, b) in parents {
                let parent1 = self.population.individuals[a].tour.clone();
                let parent2 = self.population.individuals[b].tour.clone();

                let (mut child1, mut child2) = single_point_crossover(&parent1, &parent2, cut);
                self.mutate(&mut child1);
                self.mutate(&mut child2);
                repair(&parent1, &mut child1);
                repair(&parent2, &mut child2);

                debug_assert!(self.instance.is_permutation(&child1));
                debug_assert!(self.instance.is_permutation(&child2));

                children.push(Individual::new(child1, &self.instance));
                children.push(Individual::new(child2, &self.instance));
            }

            self.population.merge(children);
            self.population
                .truncate_random(self.config.population_size, &mut self.rng);
        }

        self.generation += 1;
    }

    /// Run the genetic algorithm and return the final population
    pub fn run(&mut self) -> Population {
        let start = std::time::Instant::now();

        log::info!(
            "[GA] population {}, {} generations on {} nodes",
            self.config.population_size,
            self.config.max_generations,
            self.instance.dimension()
        );

        self.initialize_population();

        while self.generation < self.config.max_generations {
            if let Some(limit) = self.config.time_limit {
                if start.elapsed().as_secs_f64() >= limit {
                    log::info!("[GA] time limit reached at generation {}", self.generation);
                    break;
                }
            }

            self.evolve();

            if let Some(best) = self.population.best() {
                log::debug!(
                    "[GA] Gen {}  Best cost {:.3}  Elapsed {:.2}s",
                    self.generation,
                    best.cost,
                    start.elapsed().as_secs_f64()
                );
            }
        }

        self.population.clone()
    }

    /// Run the genetic algorithm and report its best individual
    pub fn solve(&mut self) -> Solution {
        let start = std::time::Instant::now();
        let population = self.run();

        let mut solution = match population.best() {
            Some(best) => Solution::from_tour(&self.instance, best.tour.clone(), "GeneticAlgorithm"),
            None => Solution::new(),
        };
        solution.computation_time = start.elapsed().as_secs_f64();
        solution.iterations = Some(self.generation);

        log::info!(
            "[GA] finished {} generations, best cost {:.3}",
            self.generation,
            solution.cost
        );
        solution
    }

    /// Get current best solution
    pub fn best_solution(&self) -> Option<Solution> {
        self.population
            .best()
            .map(|ind| Solution::from_tour(&self.instance, ind.tour.clone(), "GeneticAlgorithm"))
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    /// Get current generation
    pub fn current_generation(&self) -> usize {
        self.generation
    }
}

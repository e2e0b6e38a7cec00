//! Benchmarking and experimentation module for the TSP heuristics.
//!
//! Runs every engine repeatedly on one or more instances, collects the
//! per-run results and aggregates them per instance and algorithm.

use crate::error::Result;
use crate::heuristics::aco::{ACOConfig, AntColonyOptimization};
use crate::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
use crate::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use crate::instance::{DistanceMode, Instance};
use crate::solution::Solution;

use indicatif::{ProgressBar, ProgressStyle};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution, Max, Min};
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Result of running a single algorithm on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmResult {
    /// Algorithm name
    pub algorithm: String,
    /// Instance name
    pub instance: String,
    /// Instance dimension
    pub dimension: usize,
    /// Seed of the run, for stochastic engines
    pub seed: Option<u64>,
    /// Solution cost
    pub cost: f64,
    /// Whether the route visits every node exactly once
    pub complete: bool,
    /// Computation time in seconds
    pub time: f64,
    /// Number of iterations (if applicable)
    pub iterations: Option<usize>,
}

/// Aggregated statistics for an algorithm on one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlgorithmStatistics {
    pub instance: String,
    pub algorithm: String,
    /// Number of recorded runs
    pub num_runs: usize,
    /// Runs that produced a complete route
    pub num_complete: usize,
    pub best_cost: f64,
    pub avg_cost: f64,
    pub worst_cost: f64,
    /// Sample standard deviation of cost, 0 for a single run
    pub std_cost: f64,
    pub avg_time: f64,
    pub total_time: f64,
}

/// Benchmark configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Number of runs per stochastic algorithm, seeded `0..num_runs`
    pub num_runs: usize,
    /// Base GA parameters; the seed is overridden per run
    pub ga: GAConfig,
    /// Base ACO parameters; the seed is overridden per run
    pub aco: ACOConfig,
    /// Draw a progress bar on stderr
    pub show_progress: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 10,
            ga: GAConfig::default(),
            aco: ACOConfig::default(),
            show_progress: true,
        }
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<AlgorithmResult>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Self {
        Benchmark {
            config,
            results: Vec::new(),
        }
    }

    fn progress_bar(&self, len: u64, instance: &Instance) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len);
        if let Ok(style) =
            ProgressStyle::with_template("{msg:>12} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len}")
        {
            pb.set_style(style.progress_chars("=> "));
        }
        pb.set_message(instance.name.clone());
        pb
    }

    /// Nearest neighbor once, then GA and ACO once per seed
    pub fn run_instance(&mut self, instance: &Instance) -> Result<()> {
        log::info!("Running benchmark on instance: {}", instance.name);

        let runs = self.config.num_runs;
        let pb = self.progress_bar(1 + 2 * runs as u64, instance);

        let nn = NearestNeighborHeuristic::new().construct(instance);
        self.record_result(instance, &nn, None);
        pb.inc(1);

        for seed in 0..runs as u64 {
            let config = GAConfig {
                seed,
                ..self.config.ga.clone()
            };
            let solution = GeneticAlgorithm::new(instance.clone(), config)?.solve();
            self.record_result(instance, &solution, Some(seed));
            pb.inc(1);
        }

        for seed in 0..runs as u64 {
            let config = ACOConfig {
                seed,
                ..self.config.aco.clone()
            };
            let solution = AntColonyOptimization::new(instance.clone(), config)?.solve();
            self.record_result(instance, &solution, Some(seed));
            pb.inc(1);
        }

        pb.finish_and_clear();
        Ok(())
    }

    /// Run benchmark on multiple instances
    pub fn run_on_instances(&mut self, instances: &[Instance]) -> Result<()> {
        for instance in instances {
            self.run_instance(instance)?;
        }
        Ok(())
    }

    /// Record a result
    fn record_result(&mut self, instance: &Instance, solution: &Solution, seed: Option<u64>) {
        self.results.push(AlgorithmResult {
            algorithm: solution.algorithm.clone(),
            instance: instance.name.clone(),
            dimension: instance.dimension(),
            seed,
            cost: solution.cost,
            complete: solution.is_complete(instance),
            time: solution.computation_time,
            iterations: solution.iterations,
        });
    }

    /// Compute statistics for each instance and algorithm
    pub fn compute_statistics(&self) -> Vec<AlgorithmStatistics> {
        let mut groups: HashMap<(&str, &str), Vec<&AlgorithmResult>> = HashMap::new();
        for result in &self.results {
            groups
                .entry((result.instance.as_str(), result.algorithm.as_str()))
                .or_default()
                .push(result);
        }

        let mut statistics = Vec::new();

        for ((instance, algorithm), results) in groups {
            let complete: Vec<_> = results.iter().filter(|r| r.complete).collect();
            if complete.is_empty() {
                continue;
            }

            let costs = Data::new(complete.iter().map(|r| r.cost).collect::<Vec<f64>>());
            let times: Vec<f64> = complete.iter().map(|r| r.time).collect();
            let total_time: f64 = times.iter().sum();

            let std_cost = if complete.len() > 1 {
                costs.std_dev().unwrap_or(0.0)
            } else {
                0.0
            };

            statistics.push(AlgorithmStatistics {
                instance: instance.to_string(),
                algorithm: algorithm.to_string(),
                num_runs: results.len(),
                num_complete: complete.len(),
                best_cost: costs.min(),
                avg_cost: costs.mean().unwrap_or(f64::NAN),
                worst_cost: costs.max(),
                std_cost,
                avg_time: total_time / times.len() as f64,
                total_time,
            });
        }

        statistics.sort_by(|a, b| {
            a.instance
                .cmp(&b.instance)
                .then(OrderedFloat(a.avg_cost).cmp(&OrderedFloat(b.avg_cost)))
        });

        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for stat in self.compute_statistics() {
            writer.serialize(stat)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Generate summary report
    pub fn generate_report(&self) -> String {
        let mut report = String::new();

        report.push_str("========================================\n");
        report.push_str("        TSP Heuristics Benchmark\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Generated: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        ));
        report.push_str(&format!("Runs per stochastic algorithm: {}\n\n", self.config.num_runs));

        let stats = self.compute_statistics();
        report.push_str(&statistics_table(&stats));

        report.push_str("\nBest Solutions per Instance:\n");

        let mut instance_best: HashMap<&str, &AlgorithmResult> = HashMap::new();
        for result in self.results.iter().filter(|r| r.complete) {
            let entry = instance_best.entry(result.instance.as_str()).or_insert(result);
            if result.cost < entry.cost {
                *entry = result;
            }
        }

        let mut best: Vec<_> = instance_best.into_iter().collect();
        best.sort_by_key(|(name, _)| *name);
        for (instance, result) in best {
            report.push_str(&format!("  {}: {:.2} ({})\n", instance, result.cost, result.algorithm));
        }

        report
    }

    /// Get all results
    pub fn results(&self) -> &[AlgorithmResult] {
        &self.results
    }
}

/// Fixed-width table of aggregated statistics
pub fn statistics_table(stats: &[AlgorithmStatistics]) -> String {
    let mut table = String::new();
    let rule = "-".repeat(100);

    table.push_str(&rule);
    table.push('\n');
    table.push_str(&format!(
        "{:<16} {:<18} {:>6} {:>12} {:>12} {:>12} {:>10} {:>10}\n",
        "Instance", "Algorithm", "Runs", "Best", "Avg", "Worst", "Std", "Avg ms"
    ));
    table.push_str(&rule);
    table.push('\n');

    for stat in stats {
        table.push_str(&format!(
            "{:<16} {:<18} {:>6} {:>12.2} {:>12.2} {:>12.2} {:>10.2} {:>10.3}\n",
            stat.instance,
            stat.algorithm,
            format!("{}/{}", stat.num_complete, stat.num_runs),
            stat.best_cost,
            stat.avg_cost,
            stat.worst_cost,
            stat.std_cost,
            stat.avg_time * 1000.0
        ));
    }

    table.push_str(&rule);
    table.push('\n');
    table
}

/// Instance files of `dir` (extension `.tsp`), sorted by file name
pub fn list_instance_files<P: AsRef<Path>>(dir: P) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_tsp = path
            .extension()
            .map_or(false, |e| e.eq_ignore_ascii_case("tsp"));
        if path.is_file() && is_tsp {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Helper function to load instances from a directory.
///
/// Files that fail to parse are logged and skipped.
pub fn load_instances_from_dir<P: AsRef<Path>>(
    dir: P,
    mode: DistanceMode,
) -> std::io::Result<Vec<Instance>> {
    let mut instances = Vec::new();

    for path in list_instance_files(dir)? {
        match Instance::from_file_with(&path, mode) {
            Ok(instance) => instances.push(instance),
            Err(e) => log::warn!("skipping {}: {}", path.display(), e),
        }
    }

    // Sort by dimension
    instances.sort_by_key(|i| i.dimension());

    Ok(instances)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(runs: usize) -> BenchmarkConfig {
        BenchmarkConfig {
            num_runs: runs,
            ga: GAConfig {
                max_generations: 5,
                ..Default::default()
            },
            aco: ACOConfig {
                num_ants: 3,
                max_iterations: 5,
                ..Default::default()
            },
            show_progress: false,
        }
    }

    fn pentagon() -> Instance {
        let mut instance = Instance::euclidean(&[
            (0.0, 0.0),
            (2.0, 0.0),
            (3.0, 2.0),
            (1.0, 3.0),
            (-1.0, 2.0),
        ])
        .unwrap();
        instance.name = "pentagon".to_string();
        instance
    }

    #[test]
    fn test_benchmark_config() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.num_runs, 10);
        assert_eq!(config.ga.population_size, 10);
        assert_eq!(config.aco.num_ants, 20);
    }

    #[test]
    fn test_run_instance_records_every_run() {
        let mut benchmark = Benchmark::new(quick_config(3));
        benchmark.run_instance(&pentagon()).unwrap();

        // one nearest neighbor run plus three seeds for each engine
        assert_eq!(benchmark.results().len(), 7);
        assert!(benchmark.results().iter().all(|r| r.complete));

        let stats = benchmark.compute_statistics();
        assert_eq!(stats.len(), 3);
        for stat in &stats {
            assert!(stat.best_cost <= stat.avg_cost + 1e-9);
            assert!(stat.avg_cost <= stat.worst_cost + 1e-9);
            assert!(stat.std_cost >= 0.0);
        }
        let nn = stats.iter().find(|s| s.algorithm == "NearestNeighbor").unwrap();
        assert_eq!(nn.num_runs, 1);
        assert_eq!(nn.std_cost, 0.0);
    }

    #[test]
    fn test_report_lists_instance() {
        let mut benchmark = Benchmark::new(quick_config(1));
        benchmark.run_instance(&pentagon()).unwrap();
        let report = benchmark.generate_report();
        assert!(report.contains("pentagon"));
        assert!(report.contains("Generated:"));
    }

    #[test]
    fn test_invalid_engine_config_is_reported() {
        let mut config = quick_config(1);
        config.ga.population_size = 0;
        let mut benchmark = Benchmark::new(config);
        assert!(benchmark.run_instance(&pentagon()).is_err());
    }
}

//! TSP Heuristics - Command Line Interface
//!
//! Approximate TSP solving on TSPLIB instances with nearest neighbor,
//! a genetic algorithm and ant colony optimization.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tsp_heuristics::benchmark::{
    list_instance_files, load_instances_from_dir, statistics_table, Benchmark, BenchmarkConfig,
};
use tsp_heuristics::heuristics::aco::{ACOConfig, AntColonyOptimization};
use tsp_heuristics::heuristics::construction::{ConstructionHeuristic, NearestNeighborHeuristic};
use tsp_heuristics::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use tsp_heuristics::instance::{DistanceMode, Instance};
use tsp_heuristics::visualization::Visualizer;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tsp-heuristics")]
#[command(version = "1.0")]
#[command(about = "Approximate TSP solver: nearest neighbor, genetic algorithm, ant colony")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Round CEIL_2D up and measure GEO in kilometres (TSP-LIB rules)
    #[arg(long, global = true)]
    tsplib_distances: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance with one algorithm
    Solve {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Algorithm to use
        #[arg(short, long, value_enum, default_value = "aco")]
        algorithm: Algorithm,

        #[command(flatten)]
        engine: EngineArgs,

        /// Random seed
        #[arg(short, long, default_value = "42")]
        seed: u64,

        /// Start node id for nearest neighbor (first node by default)
        #[arg(long)]
        start: Option<String>,

        /// Output solution to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write an SVG plot of the route
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Write node coordinates and the route as plain text for plotting
        #[arg(long)]
        plot_data: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// List instance files of a directory
    List {
        /// Directory containing instance files
        #[arg(short, long, default_value = "tsp")]
        dir: PathBuf,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },

    /// Compare algorithms on an instance
    Compare {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Number of seeded runs per stochastic algorithm
        #[arg(short, long, default_value = "10")]
        runs: usize,

        #[command(flatten)]
        engine: EngineArgs,

        /// Output CSV file with every run
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run benchmarks on a directory of instances
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of seeded runs per stochastic algorithm
        #[arg(short, long, default_value = "10")]
        runs: usize,

        #[command(flatten)]
        engine: EngineArgs,

        /// Maximum instance size
        #[arg(long)]
        max_size: Option<usize>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Algorithm {
    /// Nearest Neighbor construction
    Nn,
    /// Genetic Algorithm
    Ga,
    /// Ant Colony Optimization
    Aco,
}

/// Engine parameters shared by every subcommand that runs GA or ACO
#[derive(Args, Debug, Clone)]
struct EngineArgs {
    /// GA population size
    #[arg(long, default_value = "10")]
    population_size: usize,

    /// GA reproduction rate in percent
    #[arg(long, default_value = "60")]
    reproduction_rate: f64,

    /// GA mutation probability
    #[arg(long, default_value = "0.5")]
    mutation_prob: f64,

    /// GA number of generations
    #[arg(long, default_value = "80")]
    generations: usize,

    /// ACO number of ants
    #[arg(long, default_value = "20")]
    ants: usize,

    /// ACO number of iterations
    #[arg(long, default_value = "100")]
    iterations: usize,

    /// ACO pheromone weight
    #[arg(long, default_value = "1.0")]
    alpha: f64,

    /// ACO heuristic weight
    #[arg(long, default_value = "2.0")]
    beta: f64,

    /// ACO evaporation rate
    #[arg(long, default_value = "0.5")]
    rho: f64,

    /// ACO deposit constant
    #[arg(long, default_value = "100.0")]
    q: f64,

    /// Time limit per run in seconds
    #[arg(short, long)]
    time_limit: Option<f64>,
}

impl EngineArgs {
    fn ga_config(&self, seed: u64) -> GAConfig {
        GAConfig {
            population_size: self.population_size,
            reproduction_rate: self.reproduction_rate,
            mutation_prob: self.mutation_prob,
            max_generations: self.generations,
            seed,
            time_limit: self.time_limit,
        }
    }

    fn aco_config(&self, seed: u64) -> ACOConfig {
        ACOConfig {
            num_ants: self.ants,
            max_iterations: self.iterations,
            alpha: self.alpha,
            beta: self.beta,
            evaporation_rate: self.rho,
            q: self.q,
            seed,
            time_limit: self.time_limit,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mode = if cli.tsplib_distances {
        DistanceMode::Tsplib
    } else {
        DistanceMode::Euclidean
    };

    match cli.command {
        Commands::Solve {
            instance,
            algorithm,
            engine,
            seed,
            start,
            output,
            svg,
            plot_data,
            verbose,
        } => solve_instance(
            &instance, mode, algorithm, &engine, seed, start, output, svg, plot_data, verbose,
        ),

        Commands::List { dir } => list_instances(&dir),

        Commands::Analyze { instance } => analyze_instance(&instance, mode),

        Commands::Compare {
            instance,
            runs,
            engine,
            output,
        } => compare_algorithms(&instance, mode, runs, &engine, output),

        Commands::Benchmark {
            dir,
            output,
            runs,
            engine,
            max_size,
        } => run_benchmark(&dir, mode, &output, runs, &engine, max_size),
    }
}

fn load_instance(path: &Path, mode: DistanceMode) -> Result<Instance> {
    match Instance::from_file_with(path, mode) {
        Ok(instance) => Ok(instance),
        Err(e) => {
            log::error!("failed to load {}: {}", path.display(), e);
            Err(e).with_context(|| format!("Error loading instance {}", path.display()))
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_instance(
    path: &Path,
    mode: DistanceMode,
    algorithm: Algorithm,
    engine: &EngineArgs,
    seed: u64,
    start: Option<String>,
    output: Option<PathBuf>,
    svg: Option<PathBuf>,
    plot_data: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    println!("Loading instance from {:?}...", path);
    let instance = load_instance(path, mode)?;

    if verbose {
        println!("{}", instance.statistics());
    }

    println!("Solving with {:?} algorithm...", algorithm);

    let solution = match algorithm {
        Algorithm::Nn => {
            let start = match start {
                Some(id) => instance
                    .index_of(&id)
                    .with_context(|| format!("unknown start node {:?}", id))?,
                None => 0,
            };
            NearestNeighborHeuristic::starting_at(start).construct(&instance)
        }

        Algorithm::Ga => {
            let mut ga = GeneticAlgorithm::new(instance.clone(), engine.ga_config(seed))?;
            let solution = ga.solve();
            if verbose {
                println!("\nFinal population:");
                for (rank, ind) in ga.population().individuals().iter().enumerate() {
                    println!("  #{:<3} cost {:.2}", rank + 1, ind.cost);
                }
            }
            solution
        }

        Algorithm::Aco => {
            let mut aco = AntColonyOptimization::new(instance.clone(), engine.aco_config(seed))?;
            aco.solve()
        }
    };

    if !solution.is_complete(&instance) {
        bail!("{} returned an incomplete route", solution.algorithm);
    }

    println!("\n========== Results ==========");
    println!("Best route: {}", solution.format_route(&instance));
    println!("Cost: {}", solution.cost);
    println!("Time: {:.3} ms", solution.computation_time * 1000.0);
    if let Some(iter) = solution.iterations {
        println!("Iterations: {}", iter);
    }

    if verbose {
        println!("\n{}", solution);
    }

    if let Some(out_path) = output {
        let json = serde_json::to_string_pretty(&solution)?;
        std::fs::write(&out_path, json)
            .with_context(|| format!("Failed to write output {:?}", out_path))?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(svg_path) = svg {
        let viz = Visualizer::new();
        let svg = viz.generate_svg(&instance, &solution)?;
        viz.save_svg(&svg, &svg_path)
            .with_context(|| format!("Failed to save SVG {:?}", svg_path))?;
        println!("Visualization saved to {:?}", svg_path);
    }

    if let Some(data_path) = plot_data {
        let data = Visualizer::new().export_plot_data(&instance, &solution);
        std::fs::write(&data_path, data)
            .with_context(|| format!("Failed to write plot data {:?}", data_path))?;
        println!("Plot data saved to {:?}", data_path);
    }

    Ok(())
}

fn list_instances(dir: &Path) -> Result<()> {
    let files = list_instance_files(dir)
        .with_context(|| format!("Failed to read directory {:?}", dir))?;

    if files.is_empty() {
        println!("No instance files in {:?}", dir);
        return Ok(());
    }

    println!("Available TSP files:");
    for (i, path) in files.iter().enumerate() {
        let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("{} - {}", i + 1, name);
    }
    Ok(())
}

fn analyze_instance(path: &Path, mode: DistanceMode) -> Result<()> {
    let instance = load_instance(path, mode)?;

    println!("========== Instance Analysis ==========\n");
    println!("{}", instance.statistics());

    if !instance.comment.is_empty() {
        println!("Comment: {}", instance.comment);
    }

    let nn = NearestNeighborHeuristic::new().construct(&instance);

    println!("\nQuick Solution Estimate:");
    println!(
        "  Nearest Neighbor: {:.2} ({:.3} ms)",
        nn.cost,
        nn.computation_time * 1000.0
    );
    Ok(())
}

fn compare_algorithms(
    path: &Path,
    mode: DistanceMode,
    runs: usize,
    engine: &EngineArgs,
    output: Option<PathBuf>,
) -> Result<()> {
    let instance = load_instance(path, mode)?;

    println!(
        "Comparing algorithms on {} (n={}, {} runs)...\n",
        instance.name,
        instance.dimension(),
        runs
    );

    let config = BenchmarkConfig {
        num_runs: runs,
        ga: engine.ga_config(0),
        aco: engine.aco_config(0),
        show_progress: true,
    };
    let mut benchmark = Benchmark::new(config);
    benchmark.run_instance(&instance)?;

    println!("{}", statistics_table(&benchmark.compute_statistics()));

    if let Some(out_path) = output {
        benchmark
            .export_to_csv(&out_path)
            .with_context(|| format!("Failed to write CSV {:?}", out_path))?;
        println!("\nResults exported to {:?}", out_path);
    }
    Ok(())
}

fn run_benchmark(
    dir: &Path,
    mode: DistanceMode,
    output: &Path,
    runs: usize,
    engine: &EngineArgs,
    max_size: Option<usize>,
) -> Result<()> {
    println!("Loading instances from {:?}...", dir);

    let mut instances = load_instances_from_dir(dir, mode)
        .with_context(|| format!("Failed to read directory {:?}", dir))?;

    if let Some(max) = max_size {
        instances.retain(|i| i.dimension() <= max);
    }

    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        bail!("No instances found in {:?}", dir);
    }

    std::fs::create_dir_all(output)
        .with_context(|| format!("Failed to create output directory {:?}", output))?;

    let config = BenchmarkConfig {
        num_runs: runs,
        ga: engine.ga_config(0),
        aco: engine.aco_config(0),
        show_progress: true,
    };

    let mut benchmark = Benchmark::new(config);

    for (i, instance) in instances.iter().enumerate() {
        println!(
            "\n[{}/{}] Processing {} (n={})...",
            i + 1,
            instances.len(),
            instance.name,
            instance.dimension()
        );

        benchmark.run_instance(instance)?;
    }

    let results_path = output.join("results.csv");
    benchmark
        .export_to_csv(&results_path)
        .context("Failed to export results")?;
    println!("\nResults exported to {:?}", results_path);

    let stats_path = output.join("statistics.csv");
    benchmark
        .export_statistics_csv(&stats_path)
        .context("Failed to export statistics")?;
    println!("Statistics exported to {:?}", stats_path);

    let report = benchmark.generate_report();
    println!("\n{}", report);

    let report_path = output.join("report.txt");
    std::fs::write(&report_path, &report).context("Failed to save report")?;
    println!("Report saved to {:?}", report_path);

    Ok(())
}

//! TSP GA Solver - Command Line Interface
//!
//! Approximates the Traveling Salesman Problem with a genetic algorithm.

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tsp_ga_solver::benchmark::{load_instances_from_dir, Benchmark, BenchmarkConfig};
use tsp_ga_solver::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use tsp_ga_solver::instance::TspInstance;
use tsp_ga_solver::visualization::Visualizer;
use tsp_ga_solver::Result;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "tsp-ga-solver")]
#[command(author = "M2 AI2D Student")]
#[command(version = "1.0")]
#[command(about = "A genetic algorithm solver for the Traveling Salesman Problem")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Genetic algorithm parameters shared by `solve` and `benchmark`
#[derive(Args, Clone, Debug)]
struct GaArgs {
    /// Population size
    #[arg(short, long, default_value = "100")]
    population: usize,

    /// Number of generations
    #[arg(short, long, default_value = "50")]
    generations: usize,

    /// Number of tours drawn per tournament
    #[arg(long, default_value = "5")]
    tournament_size: usize,

    /// Probability of mutating each child
    #[arg(long, default_value = "0.1")]
    mutation_rate: f64,
}

impl GaArgs {
    fn to_config(&self, seed: u64) -> GAConfig {
        GAConfig {
            population_size: self.population,
            generations: self.generations,
            tournament_size: self.tournament_size,
            mutation_rate: self.mutation_rate,
            seed,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Solve one instance (from a file, or random cities)
    Solve {
        /// Path to a TSPLIB (.tsp) or CSV (.csv) instance
        #[arg(short, long, conflicts_with = "random")]
        instance: Option<PathBuf>,

        /// Number of random cities to generate when no instance is given
        #[arg(long)]
        random: Option<usize>,

        /// Coordinates of random cities are drawn from [0, extent)
        #[arg(long, default_value = "100")]
        extent: u32,

        #[command(flatten)]
        ga: GaArgs,

        /// Random seed (defaults to the current time)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output solution to a JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the tour and convergence curve as SVG
        #[arg(long)]
        svg: Option<PathBuf>,

        /// Print the best route after every generation
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run the GA over several seeds on a directory of instances
    Benchmark {
        /// Directory containing instance files
        #[arg(short, long)]
        dir: PathBuf,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        /// Number of runs (seeds) per instance
        #[arg(short, long, default_value = "5")]
        runs: usize,

        /// Seed of the first run
        #[arg(long, default_value = "0")]
        base_seed: u64,

        #[command(flatten)]
        ga: GaArgs,
    },

    /// Analyze an instance
    Analyze {
        /// Path to the instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

const DEFAULT_RANDOM_CITIES: usize = 10;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Solve {
            instance,
            random,
            extent,
            ga,
            seed,
            output,
            svg,
            verbose,
        } => solve_instance(
            instance.as_deref(),
            random,
            extent,
            &ga,
            seed,
            output,
            svg,
            verbose,
        ),

        Commands::Benchmark {
            dir,
            output,
            runs,
            base_seed,
            ga,
        } => run_benchmark(&dir, &output, runs, base_seed, &ga),

        Commands::Analyze { instance } => analyze_instance(&instance),
    };

    if let Err(e) = outcome {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn wall_clock_seed() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

fn progress_bar(len: u64, template: &str) -> ProgressBar {
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template(template).unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

#[allow(clippy::too_many_arguments)]
fn solve_instance(
    path: Option<&Path>,
    random: Option<usize>,
    extent: u32,
    ga_args: &GaArgs,
    seed: Option<u64>,
    output: Option<PathBuf>,
    svg: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    let seed = seed.unwrap_or_else(wall_clock_seed);
    log::info!("Using seed {}", seed);

    let instance = match path {
        Some(path) => {
            println!("Loading instance from {:?}...", path);
            TspInstance::load(path)?
        }
        None => TspInstance::random(random.unwrap_or(DEFAULT_RANDOM_CITIES), extent, seed)?,
    };

    for (i, city) in instance.cities.iter().enumerate() {
        println!("City {}: ({}, {})", i, city.x, city.y);
    }

    let config = ga_args.to_config(seed);
    let mut ga = GeneticAlgorithm::new(instance, config)?;

    println!("\nRunning Genetic Algorithm...");

    let solution = if verbose {
        ga.run_with_observer(|report| {
            println!(
                "Generation {}: Best distance = {:.4}",
                report.generation, report.best_distance
            );
            let route: Vec<String> = report.best_tour.iter().map(|c| c.to_string()).collect();
            println!("Route: {}", route.join(" "));
        })
    } else {
        let bar = progress_bar(
            ga.config().generations as u64,
            "{bar:40.cyan/blue} {pos}/{len} generations  {msg}",
        );
        let solution = ga.run_with_observer(|report| {
            bar.set_message(format!("best {:.2}", report.best_distance));
            bar.inc(1);
        });
        bar.finish();
        solution
    };

    println!("\n========== Results ==========");
    println!("Best route found:");
    println!("{}", solution.route_string());
    println!("Total distance: {:.4}", solution.distance);
    println!("Generations: {}", solution.generations);
    println!("Seed: {}", seed);
    println!("Time: {:.4}s", solution.computation_time);

    if let Some(out_path) = output {
        solution.save_json(&out_path)?;
        println!("\nSolution saved to {:?}", out_path);
    }

    if let Some(svg_path) = svg {
        let viz = Visualizer::new();
        viz.save_svg(&viz.generate_svg(ga.instance(), &solution), &svg_path)?;
        let curve_path = svg_path.with_extension("convergence.svg");
        viz.save_svg(&viz.generate_convergence_svg(&solution), &curve_path)?;
        println!("Visualization saved to {:?} and {:?}", svg_path, curve_path);
    }

    Ok(())
}

fn run_benchmark(
    dir: &Path,
    output: &Path,
    runs: usize,
    base_seed: u64,
    ga_args: &GaArgs,
) -> Result<()> {
    let config = BenchmarkConfig {
        num_runs: runs,
        base_seed,
        ga: ga_args.to_config(base_seed),
    };
    let mut benchmark = Benchmark::new(config)?;

    println!("Loading instances from {:?}...", dir);

    let instances = load_instances_from_dir(dir)?;
    println!("Found {} instances", instances.len());

    if instances.is_empty() {
        eprintln!("No instances found!");
        return Ok(());
    }

    std::fs::create_dir_all(output)?;

    let bar = progress_bar(
        (instances.len() * runs) as u64,
        "{bar:40.green/white} {pos}/{len} runs  {msg}",
    );
    for instance in &instances {
        for seed in benchmark.seeds() {
            bar.set_message(format!("{} seed {}", instance.name, seed));
            benchmark.run_once(instance, seed)?;
            bar.inc(1);
        }
    }
    bar.finish_and_clear();

    benchmark.export_to_csv(output.join("results.csv"))?;
    benchmark.export_statistics_csv(output.join("statistics.csv"))?;

    let report = benchmark.generate_report();
    std::fs::write(output.join("report.txt"), &report)?;
    println!("{}", report);
    println!("Results saved to {:?}", output);

    Ok(())
}

fn analyze_instance(path: &Path) -> Result<()> {
    let instance = TspInstance::load(path)?;
    println!("{}", instance.statistics());
    Ok(())
}

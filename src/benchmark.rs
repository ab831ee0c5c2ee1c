//! Benchmarking and experimentation module for the TSP genetic algorithm.
//!
//! Runs the GA over several seeds per instance, collects statistics,
//! and exports the results as CSV or a plain-text report.

use crate::error::{Result, SolverError};
use crate::heuristics::genetic::{GAConfig, GeneticAlgorithm};
use crate::instance::TspInstance;

use chrono::{DateTime, Utc};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::HashMap;
use std::fs::File;
use std::ops::Range;
use std::path::Path;

/// Result of a single GA run on an instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    /// Instance name
    pub instance: String,
    /// Number of cities
    pub num_cities: usize,
    /// Seed of the run
    pub seed: u64,
    /// Population size
    pub population_size: usize,
    /// Number of generations
    pub generations: usize,
    /// Best tour distance found
    pub distance: f64,
    /// Computation time in seconds
    pub time: f64,
    /// Gap to best known, in percent (if available)
    pub gap_to_best: Option<f64>,
}

/// Aggregated statistics over all runs on one instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceSummary {
    pub instance: String,
    pub num_runs: usize,
    pub avg_distance: f64,
    pub std_distance: f64,
    pub best_distance: f64,
    pub worst_distance: f64,
    /// Seed that produced the best distance
    pub best_seed: u64,
    pub avg_time: f64,
    pub avg_gap: Option<f64>,
}

/// Benchmark configuration
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Number of runs per instance, one seed each
    pub num_runs: usize,
    /// Seed of the first run; later runs use consecutive seeds
    pub base_seed: u64,
    /// GA parameters shared by every run (its seed is overridden)
    pub ga: GAConfig,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            num_runs: 5,
            base_seed: 0,
            ga: GAConfig::default(),
        }
    }
}

impl BenchmarkConfig {
    /// Reject invalid GA parameters and seed ranges that overflow `u64`
    pub fn validate(&self) -> Result<()> {
        self.ga.validate()?;
        self.end_seed().ok_or_else(|| {
            SolverError::invalid_config(
                "base_seed",
                format!(
                    "{} plus {} runs overflows the seed range",
                    self.base_seed, self.num_runs
                ),
            )
        })?;
        Ok(())
    }

    fn end_seed(&self) -> Option<u64> {
        u64::try_from(self.num_runs)
            .ok()
            .and_then(|runs| self.base_seed.checked_add(runs))
    }
}

/// Benchmarking engine
pub struct Benchmark {
    config: BenchmarkConfig,
    results: Vec<RunResult>,
    best_known: HashMap<String, f64>,
    started_at: DateTime<Utc>,
}

impl Benchmark {
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;

        Ok(Benchmark {
            config,
            results: Vec::new(),
            best_known: HashMap::new(),
            started_at: Utc::now(),
        })
    }

    /// Set best known solution for an instance
    pub fn set_best_known(&mut self, instance_name: &str, distance: f64) {
        self.best_known.insert(instance_name.to_string(), distance);
    }

    /// Seeds used for each instance
    pub fn seeds(&self) -> Range<u64> {
        let end = self.config.end_seed().unwrap_or(self.config.base_seed);
        self.config.base_seed..end
    }

    /// Run the GA once on `instance` with `seed`
    pub fn run_once(&mut self, instance: &TspInstance, seed: u64) -> Result<&RunResult> {
        let config = GAConfig {
            seed,
            ..self.config.ga.clone()
        };
        let mut ga = GeneticAlgorithm::new(instance.clone(), config)?;
        let solution = ga.run();

        let gap_to_best = self
            .best_known
            .get(&instance.name)
            .filter(|&&best| best > 0.0)
            .map(|&best| (solution.distance - best) / best * 100.0);

        self.results.push(RunResult {
            instance: instance.name.clone(),
            num_cities: instance.num_cities(),
            seed,
            population_size: self.config.ga.population_size,
            generations: solution.generations,
            distance: solution.distance,
            time: solution.computation_time,
            gap_to_best,
        });

        let recorded = &self.results[self.results.len() - 1];
        log::info!(
            "{} seed {}: distance {:.2} in {:.3}s",
            recorded.instance,
            recorded.seed,
            recorded.distance,
            recorded.time
        );
        Ok(recorded)
    }

    /// Run the GA on `instance` once per configured seed
    pub fn run_instance(&mut self, instance: &TspInstance) -> Result<()> {
        log::info!("Running benchmark on instance: {}", instance.name);

        for seed in self.seeds() {
            self.run_once(instance, seed)?;
        }
        Ok(())
    }

    /// Compute statistics for each instance
    pub fn compute_statistics(&self) -> Vec<InstanceSummary> {
        let mut by_instance: HashMap<&str, Vec<&RunResult>> = HashMap::new();

        for result in &self.results {
            by_instance
                .entry(result.instance.as_str())
                .or_default()
                .push(result);
        }

        let mut statistics: Vec<InstanceSummary> = by_instance
            .into_iter()
            .filter_map(|(instance, runs)| {
                let best_run = runs.iter().min_by_key(|r| OrderedFloat(r.distance))?;
                let worst_run = runs.iter().max_by_key(|r| OrderedFloat(r.distance))?;

                let distances: Vec<f64> = runs.iter().map(|r| r.distance).collect();
                let times: Vec<f64> = runs.iter().map(|r| r.time).collect();
                let gaps: Vec<f64> = runs.iter().filter_map(|r| r.gap_to_best).collect();

                let std_distance = if distances.len() > 1 {
                    distances.iter().std_dev()
                } else {
                    0.0
                };

                Some(InstanceSummary {
                    instance: instance.to_string(),
                    num_runs: runs.len(),
                    avg_distance: distances.iter().mean(),
                    std_distance,
                    best_distance: best_run.distance,
                    worst_distance: worst_run.distance,
                    best_seed: best_run.seed,
                    avg_time: times.iter().mean(),
                    avg_gap: (!gaps.is_empty()).then(|| gaps.iter().mean()),
                })
            })
            .collect();

        statistics.sort_by(|a, b| a.instance.cmp(&b.instance));
        statistics
    }

    /// Export results to CSV
    pub fn export_to_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = csv::Writer::from_writer(file);

        for result in &self.results {
            writer.serialize(result)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export statistics to CSV
    pub fn export_statistics_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
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
        report.push_str("        TSP GA Benchmark Report\n");
        report.push_str("========================================\n");
        report.push_str(&format!(
            "Started: {}\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        report.push_str(&format!(
            "Population: {}  Generations: {}  Tournament: {}  Mutation: {:.2}  Runs: {}\n\n",
            self.config.ga.population_size,
            self.config.ga.generations,
            self.config.ga.tournament_size,
            self.config.ga.mutation_rate,
            self.config.num_runs
        ));

        report.push_str("-".repeat(80).as_str());
        report.push('\n');
        report.push_str(&format!(
            "{:<20} {:>6} {:>12} {:>10} {:>12} {:>8} {:>8}\n",
            "Instance", "Runs", "Avg Dist", "Std", "Best Dist", "Gap%", "Avg Time"
        ));
        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        for stat in self.compute_statistics() {
            let gap_str = stat
                .avg_gap
                .map(|g| format!("{:.2}%", g))
                .unwrap_or_else(|| "-".to_string());

            report.push_str(&format!(
                "{:<20} {:>6} {:>12.2} {:>10.2} {:>12.2} {:>8} {:>8.4}\n",
                stat.instance,
                stat.num_runs,
                stat.avg_distance,
                stat.std_distance,
                stat.best_distance,
                gap_str,
                stat.avg_time
            ));
        }

        report.push_str("-".repeat(80).as_str());
        report.push('\n');

        report
    }

    /// Get all results
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    /// Best known distances registered per instance name
    pub fn best_known(&self) -> &HashMap<String, f64> {
        &self.best_known
    }
}

/// Helper function to load instances from a directory
///
/// Files that fail to parse are skipped with a warning; a directory that
/// cannot be read is an error.
pub fn load_instances_from_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<TspInstance>> {
    let mut instances = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let supported = path
            .extension()
            .map(|e| e == "tsp" || e == "csv")
            .unwrap_or(false);
        if !supported {
            continue;
        }
        match TspInstance::load(&path) {
            Ok(instance) => instances.push(instance),
            Err(e) => log::warn!("Skipping {:?}: {}", path, e),
        }
    }

    instances.sort_by_key(|i| i.num_cities());

    Ok(instances)
}

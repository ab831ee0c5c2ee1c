//! Genetic Algorithm for the TSP.
//!
//! A plain generational GA over permutation tours:
//! - Random initial population (independent shuffles)
//! - Tournament selection of both parents
//! - Order crossover (OX) producing one child per pair
//! - Swap mutation applied to the child
//! - Full replacement of the population every generation
//!
//! The best tour ever produced is tracked on the side and only ever improves.
//! There is no elitism and no early stopping: a run always evolves exactly the
//! configured number of generations.

use crate::error::{Result, SolverError};
use crate::heuristics::operators::{
    initialize_population, order_crossover, swap_mutation, tournament_select, Population,
    DEFAULT_MUTATION_RATE, DEFAULT_TOURNAMENT_SIZE,
};
use crate::instance::{tour_distance, City, TspInstance};
use crate::solution::{Solution, Tour};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Genetic Algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GAConfig {
    /// Population size
    pub population_size: usize,
    /// Number of generations
    pub generations: usize,
    /// Tournament size for selection
    pub tournament_size: usize,
    /// Probability of mutating a child
    pub mutation_rate: f64,
    /// Random seed
    pub seed: u64,
}

impl Default for GAConfig {
    fn default() -> Self {
        GAConfig {
            population_size: 100,
            generations: 50,
            tournament_size: DEFAULT_TOURNAMENT_SIZE,
            mutation_rate: DEFAULT_MUTATION_RATE,
            seed: 42,
        }
    }
}

impl GAConfig {
    /// Reject parameter values the algorithm cannot run with.
    ///
    /// Zero generations is accepted: the run then returns the initial seed tour.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(SolverError::invalid_config(
                "population_size",
                "must be positive",
            ));
        }
        if self.tournament_size == 0 {
            return Err(SolverError::invalid_config(
                "tournament_size",
                "must be positive",
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SolverError::invalid_config(
                "mutation_rate",
                format!("must lie in [0, 1], got {}", self.mutation_rate),
            ));
        }
        Ok(())
    }
}

/// Best tour seen so far and its length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestTour {
    pub tour: Tour,
    pub distance: f64,
}

impl BestTour {
    /// Seed the record from the first member of the population.
    ///
    /// The initial population is deliberately not scanned for its true
    /// minimum; the first generation's children correct it.
    fn seed(population: &[Tour], cities: &[City]) -> Self {
        let tour = population[0].clone();
        let distance = tour_distance(&tour, cities);
        BestTour { tour, distance }
    }

    /// Take a copy of `tour` if it is strictly shorter. Returns whether it was taken.
    fn offer(&mut self, tour: &[usize], distance: f64) -> bool {
        if distance < self.distance {
            self.tour = tour.to_vec();
            self.distance = distance;
            true
        } else {
            false
        }
    }
}

/// State published after each completed generation
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// 1-based generation number
    pub generation: usize,
    /// Best-so-far distance
    pub best_distance: f64,
    /// Best-so-far tour
    pub best_tour: Tour,
}

/// Produce the next generation from `population`.
///
/// Selection and crossover only ever read the previous generation; children
/// are collected in a fresh population that the caller swaps in afterwards.
fn breed_generation<R: Rng + ?Sized>(
    population: &[Tour],
    cities: &[City],
    config: &GAConfig,
    best: &mut BestTour,
    rng: &mut R,
) -> Population {
    let mut next_population = Vec::with_capacity(config.population_size);

    for _ in 0..config.population_size {
        let parent1 = tournament_select(population, cities, config.tournament_size, rng);
        let parent2 = tournament_select(population, cities, config.tournament_size, rng);

        let mut child = order_crossover(&parent1, &parent2, rng);
        swap_mutation(&mut child, config.mutation_rate, rng);

        let child_distance = tour_distance(&child, cities);
        if best.offer(&child, child_distance) {
            log::trace!("[GA] New best distance {:.3}", child_distance);
        }

        next_population.push(child);
    }

    next_population
}

/// Evolve a population over `cities` and return the best tour found.
///
/// Uses the default tournament size and mutation rate. With
/// `generations == 0` the initial seed tour (first population member) is
/// returned.
///
/// # Panics
/// Panics if `cities` is empty or `population_size` is zero.
pub fn run_evolution<R: Rng + ?Sized>(
    cities: &[City],
    population_size: usize,
    generations: usize,
    rng: &mut R,
) -> Tour {
    assert!(!cities.is_empty(), "cities must not be empty");
    assert!(population_size > 0, "population size must be positive");

    let config = GAConfig {
        population_size,
        generations,
        ..Default::default()
    };

    let mut population = initialize_population(population_size, cities.len(), rng);
    let mut best = BestTour::seed(&population, cities);

    for _ in 0..generations {
        population = breed_generation(&population, cities, &config, &mut best, rng);
    }

    best.tour
}

/// Genetic Algorithm implementation
pub struct GeneticAlgorithm {
    config: GAConfig,
    instance: TspInstance,
    population: Population,
    best: BestTour,
    rng: ChaCha8Rng,
    generation: usize,
    convergence: Vec<f64>,
}

impl GeneticAlgorithm {
    /// Validate the inputs and build the initial population.
    pub fn new(instance: TspInstance, config: GAConfig) -> Result<Self> {
        config.validate()?;
        if instance.cities.is_empty() {
            return Err(SolverError::EmptyInstance);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let population =
            initialize_population(config.population_size, instance.num_cities(), &mut rng);
        let best = BestTour::seed(&population, &instance.cities);

        Ok(GeneticAlgorithm {
            config,
            instance,
            population,
            best,
            rng,
            generation: 0,
            convergence: Vec::new(),
        })
    }

    /// Create new generation
    fn evolve(&mut self) {
        let next_population = breed_generation(
            &self.population,
            &self.instance.cities,
            &self.config,
            &mut self.best,
            &mut self.rng,
        );

        self.population = next_population;
        self.generation += 1;
        self.convergence.push(self.best.distance);
    }

    /// Run the genetic algorithm
    pub fn run(&mut self) -> Solution {
        self.run_with_observer(|_| {})
    }

    /// Run the genetic algorithm, calling `observer` after every generation
    pub fn run_with_observer<F>(&mut self, mut observer: F) -> Solution
    where
        F: FnMut(&GenerationReport),
    {
        let start = Instant::now();

        log::info!(
            "[GA] {}: {} cities, population {}, {} generations, seed {}",
            self.instance.name,
            self.instance.num_cities(),
            self.config.population_size,
            self.config.generations,
            self.config.seed
        );

        while self.generation < self.config.generations {
            self.evolve();

            log::debug!(
                "[GA] Gen {}  Best distance {:.3}  Diversity {:.2}",
                self.generation,
                self.best.distance,
                self.population_diversity()
            );

            observer(&GenerationReport {
                generation: self.generation,
                best_distance: self.best.distance,
                best_tour: self.best.tour.clone(),
            });
        }

        let elapsed = start.elapsed().as_secs_f64();
        log::info!(
            "[GA] Finished after {} generations: best distance {:.3} in {:.3}s",
            self.generation,
            self.best.distance,
            elapsed
        );

        let mut solution = self.best_solution();
        solution.computation_time = elapsed;
        solution
    }

    /// Get current best solution
    pub fn best_solution(&self) -> Solution {
        let mut solution =
            Solution::from_tour(&self.instance, self.best.tour.clone(), "GeneticAlgorithm");
        solution.seed = Some(self.config.seed);
        solution.generations = self.generation;
        solution.convergence = self.convergence.clone();
        solution
    }

    /// Best-so-far record
    pub fn best(&self) -> &BestTour {
        &self.best
    }

    /// Current population
    pub fn population(&self) -> &[Tour] {
        &self.population
    }

    /// Get current generation
    pub fn current_generation(&self) -> usize {
        self.generation
    }

    /// Best-so-far distance after each completed generation
    pub fn convergence(&self) -> &[f64] {
        &self.convergence
    }

    /// Parameters the run was configured with
    pub fn config(&self) -> &GAConfig {
        &self.config
    }

    /// Instance being solved
    pub fn instance(&self) -> &TspInstance {
        &self.instance
    }

    /// Get population diversity (average number of differing positions
    /// between pairs of the first 20 tours)
    pub fn population_diversity(&self) -> f64 {
        let sample = self.population.len().min(20);
        if sample < 2 {
            return 0.0;
        }

        let mut total_diff = 0.0;
        let mut count = 0;

        for i in 0..sample {
            for j in i + 1..sample {
                let diff = self.population[i]
                    .iter()
                    .zip(self.population[j].iter())
                    .filter(|(a, b)| a != b)
                    .count();
                total_diff += diff as f64;
                count += 1;
            }
        }

        total_diff / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solution::is_permutation;

    fn unit_square() -> TspInstance {
        TspInstance::new(
            "square",
            vec![
                City::new(0.0, 0.0),
                City::new(0.0, 1.0),
                City::new(1.0, 1.0),
                City::new(1.0, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_genetic_algorithm() {
        let instance = TspInstance::random(10, 100, 1).unwrap();
        let config = GAConfig {
            population_size: 100,
            generations: 50,
            ..Default::default()
        };

        let mut ga = GeneticAlgorithm::new(instance.clone(), config).unwrap();
        let solution = ga.run();

        assert!(solution.is_valid_permutation(10));
        assert_eq!(solution.generations, 50);
        assert_eq!(ga.config().generations, 50);
        assert_eq!(ga.instance().num_cities(), 10);
        assert_eq!(solution.convergence.len(), 50);
        assert!((solution.distance - instance.tour_length(&solution.tour)).abs() < 1e-9);
    }

    #[test]
    fn test_unit_square_converges_to_perimeter() {
        let config = GAConfig {
            population_size: 30,
            generations: 40,
            seed: 42,
            ..Default::default()
        };

        let mut ga = GeneticAlgorithm::new(unit_square(), config).unwrap();
        let solution = ga.run();

        assert!((solution.distance - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_best_distance_is_monotonic() {
        let instance = TspInstance::random(15, 100, 3).unwrap();
        let config = GAConfig {
            population_size: 40,
            generations: 60,
            ..Default::default()
        };

        let mut ga = GeneticAlgorithm::new(instance, config).unwrap();
        let seed_distance = ga.best().distance;
        let mut reported = Vec::new();
        ga.run_with_observer(|report| reported.push((report.generation, report.best_distance)));

        assert_eq!(reported.len(), 60);
        assert_eq!(reported.first().map(|r| r.0), Some(1));
        assert!(reported[0].1 <= seed_distance);
        assert!(reported.windows(2).all(|w| w[1].1 <= w[0].1));
        assert!(ga.convergence().windows(2).all(|w| w[1] <= w[0]));
    }

    #[test]
    fn test_best_bounds_final_population() {
        let instance = TspInstance::random(12, 100, 9).unwrap();
        let config = GAConfig {
            population_size: 25,
            generations: 10,
            ..Default::default()
        };

        let mut ga = GeneticAlgorithm::new(instance.clone(), config).unwrap();
        ga.run();

        assert_eq!(ga.population().len(), 25);
        for tour in ga.population() {
            assert!(is_permutation(tour, 12));
            assert!(ga.best().distance <= instance.tour_length(tour));
        }
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let instance = TspInstance::random(12, 100, 5).unwrap();
        let config = GAConfig {
            population_size: 30,
            generations: 20,
            seed: 1234,
            ..Default::default()
        };

        let mut a = GeneticAlgorithm::new(instance.clone(), config.clone()).unwrap();
        let mut b = GeneticAlgorithm::new(instance, config).unwrap();
        let sa = a.run();
        let sb = b.run();

        assert_eq!(sa.tour, sb.tour);
        assert_eq!(sa.convergence, sb.convergence);
        assert_eq!(a.population(), b.population());
    }

    #[test]
    fn test_zero_generations_returns_seed_tour() {
        let instance = TspInstance::random(8, 100, 2).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let best = run_evolution(&instance.cities, 10, 0, &mut rng);

        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let population = initialize_population(10, 8, &mut rng);
        assert_eq!(best, population[0]);

        let config = GAConfig {
            population_size: 10,
            generations: 0,
            ..Default::default()
        };
        let mut ga = GeneticAlgorithm::new(instance, config).unwrap();
        let seed = ga.population()[0].clone();
        let solution = ga.run();
        assert_eq!(solution.tour, seed);
        assert!(solution.convergence.is_empty());
    }

    #[test]
    fn test_run_evolution_matches_engine() {
        let instance = TspInstance::random(10, 100, 4).unwrap();
        let config = GAConfig {
            population_size: 20,
            generations: 15,
            seed: 99,
            ..Default::default()
        };

        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let free = run_evolution(&instance.cities, 20, 15, &mut rng);
        let mut ga = GeneticAlgorithm::new(instance, config).unwrap();

        assert_eq!(free, ga.run().tour);
    }

    #[test]
    fn test_single_city_instance() {
        let instance = TspInstance::new("one", vec![City::new(2.0, 2.0)]).unwrap();
        let mut ga = GeneticAlgorithm::new(instance, GAConfig::default()).unwrap();
        let solution = ga.run();

        assert_eq!(solution.tour, vec![0]);
        assert_eq!(solution.distance, 0.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad = [
            GAConfig {
                population_size: 0,
                ..Default::default()
            },
            GAConfig {
                tournament_size: 0,
                ..Default::default()
            },
            GAConfig {
                mutation_rate: 1.5,
                ..Default::default()
            },
            GAConfig {
                mutation_rate: f64::NAN,
                ..Default::default()
            },
        ];

        for config in bad {
            assert!(matches!(
                GeneticAlgorithm::new(unit_square(), config),
                Err(SolverError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn test_empty_instance_rejected() {
        let instance = TspInstance {
            name: "empty".to_string(),
            cities: Vec::new(),
        };
        assert!(matches!(
            GeneticAlgorithm::new(instance, GAConfig::default()),
            Err(SolverError::EmptyInstance)
        ));
    }
}

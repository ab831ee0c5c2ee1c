//! TSP Genetic Algorithm Solver Library
//!
//! Approximates the Euclidean Traveling Salesman Problem with a generational
//! genetic algorithm over city-index permutations.
//!
//! # Features
//!
//! - TSPLIB and CSV instance loading, seeded random instance generation
//! - Tournament selection, order crossover (OX) and swap mutation
//! - Reproducible runs from a single seeded random source
//! - Multi-seed benchmarking with CSV export
//! - SVG rendering of tours and convergence curves
//!
//! # Example
//!
//! ```no_run
//! use tsp_ga_solver::instance::TspInstance;
//! use tsp_ga_solver::heuristics::genetic::{GAConfig, GeneticAlgorithm};
//!
//! let instance = TspInstance::random(10, 100, 7).unwrap();
//!
//! let config = GAConfig { population_size: 100, generations: 50, ..Default::default() };
//! let mut ga = GeneticAlgorithm::new(instance, config).unwrap();
//! let solution = ga.run();
//!
//! println!("Best route: {}", solution.route_string());
//! println!("Total distance: {:.2}", solution.distance);
//! ```

pub mod error;
pub mod instance;
pub mod solution;
pub mod heuristics;
pub mod benchmark;
pub mod visualization;

pub use error::{Result, SolverError};
pub use heuristics::genetic::{run_evolution, GAConfig, GeneticAlgorithm};
pub use heuristics::operators::initialize_population;
pub use instance::{distance, tour_distance, City, TspInstance};
pub use solution::{Solution, Tour};

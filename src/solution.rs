//! Solution representation for the TSP.
//!
//! A tour is a permutation of city indices; the solution record carries the
//! tour together with how and when it was found.

use crate::instance::TspInstance;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Closed visiting order as a permutation of city indices
pub type Tour = Vec<usize>;

/// Represents a solution to the TSP
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution {
    /// The tour as a sequence of city indices
    pub tour: Tour,
    /// Total closed tour length
    pub distance: f64,
    /// Algorithm that generated this solution
    pub algorithm: String,
    /// Seed of the random source used for the run
    pub seed: Option<u64>,
    /// Number of generations evolved
    pub generations: usize,
    /// Computation time in seconds
    pub computation_time: f64,
    /// Best-so-far distance after each generation
    pub convergence: Vec<f64>,
}

impl Solution {
    /// Create a solution from a tour
    pub fn from_tour(instance: &TspInstance, tour: Tour, algorithm: &str) -> Self {
        let distance = instance.tour_length(&tour);

        Solution {
            tour,
            distance,
            algorithm: algorithm.to_string(),
            seed: None,
            generations: 0,
            computation_time: 0.0,
            convergence: Vec::new(),
        }
    }

    /// Check that every city in `0..num_cities` appears exactly once
    pub fn is_valid_permutation(&self, num_cities: usize) -> bool {
        is_permutation(&self.tour, num_cities)
    }

    /// The closed route, e.g. `2 -> 0 -> 1 -> 2`
    pub fn route_string(&self) -> String {
        let mut route: Vec<String> = self.tour.iter().map(|c| c.to_string()).collect();
        if let Some(first) = self.tour.first() {
            route.push(first.to_string());
        }
        route.join(" -> ")
    }

    /// Write the solution as pretty-printed JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// Check that `tour` contains each index of `0..num_cities` exactly once
pub fn is_permutation(tour: &[usize], num_cities: usize) -> bool {
    if tour.len() != num_cities {
        return false;
    }

    let mut seen = vec![false; num_cities];
    for &city in tour {
        if city >= num_cities || seen[city] {
            return false;
        }
        seen[city] = true;
    }
    true
}

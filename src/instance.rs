//! Module for parsing and representing TSP instances.
//!
//! Cities are plain 2D points identified by their index in the instance.
//! Instances can be read from TSPLIB-style coordinate files or from CSV,
//! or generated at random for quick experiments.

use crate::error::{Result, SolverError};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// A city as an immutable 2D coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl City {
    pub fn new(x: f64, y: f64) -> Self {
        City { x, y }
    }
}

/// Euclidean distance between two cities.
#[inline]
pub fn distance(a: &City, b: &City) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

/// Total length of the closed tour visiting `cities` in `tour` order.
///
/// The last city connects back to the first. The tour is trusted to be a
/// permutation of `0..cities.len()`; only its length is checked.
///
/// # Panics
/// Panics if the tour is empty or its length differs from the number of cities.
pub fn tour_distance(tour: &[usize], cities: &[City]) -> f64 {
    assert!(!tour.is_empty(), "tour must visit at least one city");
    assert_eq!(
        tour.len(),
        cities.len(),
        "tour length must match the number of cities"
    );

    let open: f64 = tour
        .windows(2)
        .map(|pair| distance(&cities[pair[0]], &cities[pair[1]]))
        .sum();
    let closing = distance(&cities[tour[tour.len() - 1]], &cities[tour[0]]);

    open + closing
}

/// Sections of a TSPLIB file that carry data lines
#[derive(Debug, Clone, Copy, PartialEq)]
enum Section {
    Header,
    Coords,
    Ignored,
}

/// Represents a complete TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TspInstance {
    /// Name of the instance
    pub name: String,
    /// Cities, identified by their index
    pub cities: Vec<City>,
}

impl TspInstance {
    /// Build an instance from a non-empty list of cities
    pub fn new(name: impl Into<String>, cities: Vec<City>) -> Result<Self> {
        if cities.is_empty() {
            return Err(SolverError::EmptyInstance);
        }

        Ok(TspInstance {
            name: name.into(),
            cities,
        })
    }

    /// Generate `num_cities` cities with integer coordinates in `[0, extent)`.
    pub fn random(num_cities: usize, extent: u32, seed: u64) -> Result<Self> {
        if extent == 0 {
            return Err(SolverError::invalid_config("extent", "must be positive"));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let cities = (0..num_cities)
            .map(|_| {
                let x = rng.gen_range(0..extent) as f64;
                let y = rng.gen_range(0..extent) as f64;
                City::new(x, y)
            })
            .collect();

        Self::new(format!("random{}-seed{}", num_cities, seed), cities)
    }

    /// Load an instance, choosing the format from the file extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let is_csv = path
            .as_ref()
            .extension()
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            Self::from_csv(path)
        } else {
            Self::from_file(path)
        }
    }

    /// Parse an instance from a TSPLIB-style coordinate file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        let reader = BufReader::new(file);

        let mut name = instance_name(path.as_ref());
        let mut dimension: Option<usize> = None;
        let mut cities = Vec::new();
        let mut section = Section::Header;

        for (index, line) in reader.lines().enumerate() {
            let line_no = index + 1;
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line == "EOF" {
                continue;
            }

            if line.starts_with("NODE_COORD_SECTION") {
                section = Section::Coords;
                continue;
            }
            if line.ends_with("_SECTION") {
                section = Section::Ignored;
                continue;
            }

            if let Some((key, value)) = line.split_once(':') {
                let value = value.trim();
                match key.trim() {
                    "NAME" => name = value.to_string(),
                    "DIMENSION" => {
                        dimension = Some(
                            value
                                .parse()
                                .map_err(|_| SolverError::parse(line_no, "invalid dimension"))?,
                        );
                    }
                    _ => {}
                }
                continue;
            }

            if section != Section::Coords {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 3 {
                return Err(SolverError::parse(line_no, "expected `id x y`"));
            }
            let x: f64 = parts[1]
                .parse()
                .map_err(|_| SolverError::parse(line_no, "invalid x coordinate"))?;
            let y: f64 = parts[2]
                .parse()
                .map_err(|_| SolverError::parse(line_no, "invalid y coordinate"))?;
            cities.push(City::new(x, y));
        }

        if let Some(expected) = dimension {
            if expected != cities.len() {
                log::warn!(
                    "{}: DIMENSION says {} but {} coordinates were read",
                    name,
                    expected,
                    cities.len()
                );
            }
        }

        Self::new(name, cities)
    }

    /// Parse an instance from a CSV file with an `x,y` header
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let name = instance_name(path.as_ref());
        let mut reader = csv::Reader::from_path(&path)?;

        let mut cities = Vec::new();
        for record in reader.deserialize() {
            let city: City = record?;
            cities.push(city);
        }

        Self::new(name, cities)
    }

    /// Number of cities
    #[inline]
    pub fn num_cities(&self) -> usize {
        self.cities.len()
    }

    /// Distance between the cities at indices `i` and `j`
    #[inline]
    pub fn distance(&self, i: usize, j: usize) -> f64 {
        distance(&self.cities[i], &self.cities[j])
    }

    /// Length of a closed tour over this instance
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        tour_distance(tour, &self.cities)
    }

    /// Get statistics about the instance
    pub fn statistics(&self) -> InstanceStatistics {
        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for city in &self.cities {
            min_x = min_x.min(city.x);
            max_x = max_x.max(city.x);
            min_y = min_y.min(city.y);
            max_y = max_y.max(city.y);
        }

        let n = self.num_cities();
        let mut total = 0.0;
        let mut max_distance: f64 = 0.0;
        let mut pairs = 0usize;
        for i in 0..n {
            for j in i + 1..n {
                let d = self.distance(i, j);
                total += d;
                max_distance = max_distance.max(d);
                pairs += 1;
            }
        }
        let avg_distance = if pairs > 0 { total / pairs as f64 } else { 0.0 };

        InstanceStatistics {
            name: self.name.clone(),
            num_cities: n,
            min_x,
            max_x,
            min_y,
            max_y,
            avg_distance,
            max_distance,
        }
    }
}

fn instance_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unnamed".to_string())
}

/// Statistics about a TSP instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstanceStatistics {
    pub name: String,
    pub num_cities: usize,
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub avg_distance: f64,
    pub max_distance: f64,
}

impl std::fmt::Display for InstanceStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instance: {}", self.name)?;
        writeln!(f, "  Cities: {}", self.num_cities)?;
        writeln!(f, "  X range: [{:.2}, {:.2}]", self.min_x, self.max_x)?;
        writeln!(f, "  Y range: [{:.2}, {:.2}]", self.min_y, self.max_y)?;
        writeln!(f, "  Avg distance: {:.2}", self.avg_distance)?;
        writeln!(f, "  Max distance: {:.2}", self.max_distance)
    }
}

//! Heuristics module for the TSP.
//!
//! This module exports the genetic algorithm and its permutation operators.

pub mod genetic;
pub mod operators;

pub use genetic::*;
pub use operators::*;

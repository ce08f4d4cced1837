//! Genetic search for output-file storage tier assignments.
//!
//! `engines::storage` models a hierarchy of tiers and predicts read/write
//! times under capacity pressure. `engines::generation` evolves bit-string
//! genomes that decode into one tier per decision slot, scoring them through
//! an `engines::evaluation::Evaluator`.

pub mod config;
pub mod engines;
pub mod error;
pub mod types;

pub use error::{Result, TierbiasError};
pub use types::{Assignment, OptimizationResult, PlacementRecord, TierIndex};

use serde::{Deserialize, Serialize};

/// Index of a storage tier inside a `StorageManager`. Lower is faster.
pub type TierIndex = usize;

/// One tier index per decision slot, in slot order.
pub type Assignment = Vec<TierIndex>;

/// Outcome of a single `StorageManager::add_file` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    pub requested: TierIndex,
    pub tier: TierIndex,
    pub write_time: f64,
}

impl PlacementRecord {
    pub fn fell_back(&self) -> bool {
        self.tier != self.requested
    }
}

/// Final output of an optimization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub assignment: Assignment,
    pub fitness: f64,
    pub elapsed: f64,
    pub generation_found: usize,
    /// Tiers the evaluator actually used, when it reported them
    pub placements: Option<Assignment>,
}

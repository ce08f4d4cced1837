use super::tier::{check_size, TierModel};
use crate::config::StorageConfig;
use crate::error::{Result, TierbiasError};
use crate::types::{PlacementRecord, TierIndex};
use log::debug;

/// Ordered set of tiers, fastest first.
///
/// Placement uses a forward-only fallback: a file goes to the requested tier
/// or the first tier after it with room. Tiers before the requested one are
/// never tried and files are never moved once placed.
#[derive(Debug, Clone)]
pub struct StorageManager {
    tiers: Vec<TierModel>,
}

impl StorageManager {
    pub fn new(tiers: Vec<TierModel>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(TierbiasError::Configuration(
                "Storage manager needs at least one tier".to_string(),
            ));
        }
        Ok(Self { tiers })
    }

    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let tiers = config
            .tiers
            .iter()
            .map(TierModel::from_spec)
            .collect::<Result<Vec<_>>>()?;
        Self::new(tiers)
    }

    pub fn tier_count(&self) -> usize {
        self.tiers.len()
    }

    pub fn tier(&self, index: TierIndex) -> Result<&TierModel> {
        self.tiers.get(index).ok_or(TierbiasError::UnknownTier(index))
    }

    pub fn tiers(&self) -> &[TierModel] {
        &self.tiers
    }

    pub fn available_space(&self, index: TierIndex) -> Result<f64> {
        Ok(self.tier(index)?.available_space())
    }

    pub fn total_used(&self) -> f64 {
        self.tiers.iter().map(TierModel::used).sum()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.locate(file_name).is_some()
    }

    pub fn locate(&self, file_name: &str) -> Option<TierIndex> {
        self.tiers.iter().position(|tier| tier.contains(file_name))
    }

    /// Places a file, starting at `preferred` and moving towards slower tiers.
    ///
    /// Fails without touching any tier when the size is negative or not
    /// finite, the name is already stored, or no tier from `preferred` onward
    /// has room.
    pub fn add_file(
        &mut self,
        file_name: &str,
        size: f64,
        preferred: TierIndex,
    ) -> Result<PlacementRecord> {
        if preferred >= self.tiers.len() {
            return Err(TierbiasError::UnknownTier(preferred));
        }
        check_size(file_name, size)?;
        if self.contains(file_name) {
            return Err(TierbiasError::DuplicateFile(file_name.to_string()));
        }

        let index = (preferred..self.tiers.len())
            .find(|&i| self.tiers[i].reserve(size))
            .ok_or_else(|| TierbiasError::Capacity {
                file: file_name.to_string(),
                size,
                preferred,
            })?;

        let write_time = self.tiers[index].add_reserved_file(file_name, size)?;
        if index != preferred {
            debug!(
                "{} ({} units) fell back from {} to {}",
                file_name,
                size,
                self.tiers[preferred].name(),
                self.tiers[index].name()
            );
        }

        Ok(PlacementRecord {
            requested: preferred,
            tier: index,
            write_time,
        })
    }

    /// Removes a file wherever it lives, returning its tier and delete time.
    pub fn delete_file(&mut self, file_name: &str) -> Option<(TierIndex, f64)> {
        let index = self.locate(file_name)?;
        self.tiers[index]
            .delete_file(file_name)
            .map(|time| (index, time))
    }

    pub fn predict_write_time(&self, size: f64, index: TierIndex) -> Result<f64> {
        Ok(self.tier(index)?.predict_write_time(size))
    }

    pub fn predict_read_time(&self, size: f64, index: TierIndex) -> Result<f64> {
        Ok(self.tier(index)?.predict_read_time(size))
    }

    /// Empties every tier so the manager can serve an independent evaluation.
    pub fn reset(&mut self) {
        for tier in &mut self.tiers {
            tier.clear();
        }
    }
}

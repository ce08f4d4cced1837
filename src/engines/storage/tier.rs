use crate::config::TierSpec;
use crate::error::{Result, TierbiasError};
use std::collections::HashMap;

/// Capacity and timing model for a single storage tier.
///
/// Capacity, latency and transfer rate are fixed at construction. Only the
/// used space changes, through `add_file` and `delete_file`, and it never
/// exceeds the capacity.
#[derive(Debug, Clone)]
pub struct TierModel {
    name: String,
    capacity: f64,
    used: f64,
    latency: f64,
    max_transfer_rate: f64,
    files: HashMap<String, f64>,
}

impl TierModel {
    pub fn new(name: &str, capacity: f64, latency: f64, max_transfer_rate: f64) -> Result<Self> {
        if capacity < 0.0 || latency < 0.0 {
            return Err(TierbiasError::Configuration(format!(
                "Tier {} needs non-negative capacity and latency",
                name
            )));
        }
        if max_transfer_rate <= 0.0 {
            return Err(TierbiasError::Configuration(format!(
                "Tier {} needs a positive transfer rate",
                name
            )));
        }

        Ok(Self {
            name: name.to_string(),
            capacity,
            used: 0.0,
            latency,
            max_transfer_rate,
            files: HashMap::new(),
        })
    }

    pub fn from_spec(spec: &TierSpec) -> Result<Self> {
        Self::new(&spec.name, spec.capacity, spec.latency, spec.max_transfer_rate)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn used(&self) -> f64 {
        self.used
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    pub fn max_transfer_rate(&self) -> f64 {
        self.max_transfer_rate
    }

    pub fn available_space(&self) -> f64 {
        self.capacity - self.used
    }

    pub fn is_full(&self) -> bool {
        self.available_space() <= 0.0
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.files.contains_key(file_name)
    }

    pub fn file_size(&self, file_name: &str) -> Option<f64> {
        self.files.get(file_name).copied()
    }

    pub fn file_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        names
    }

    /// Checks that `size` fits. Does not touch the used space.
    pub fn reserve(&self, size: f64) -> bool {
        is_valid_size(size) && size <= self.available_space()
    }

    /// Stores a file and returns its predicted write time, taken before the
    /// space is committed.
    pub fn add_file(&mut self, file_name: &str, size: f64) -> Result<f64> {
        check_size(file_name, size)?;
        if !self.reserve(size) {
            return Err(TierbiasError::TierFull {
                tier: self.name.clone(),
                size,
                available: self.available_space(),
            });
        }
        self.add_reserved_file(file_name, size)
    }

    /// Commits a file whose size already passed `reserve`.
    pub fn add_reserved_file(&mut self, file_name: &str, size: f64) -> Result<f64> {
        check_size(file_name, size)?;
        if self.files.contains_key(file_name) {
            return Err(TierbiasError::DuplicateFile(file_name.to_string()));
        }
        let time = self.predict_write_time(size);
        self.used = (self.used + size).min(self.capacity);
        self.files.insert(file_name.to_string(), size);
        Ok(time)
    }

    /// Removes a file and returns the time to do so, or `None` if absent.
    pub fn delete_file(&mut self, file_name: &str) -> Option<f64> {
        let size = self.files.remove(file_name)?;
        self.used = (self.used - size).max(0.0);
        Some(self.latency + size / self.max_transfer_rate)
    }

    pub fn clear(&mut self) {
        self.files.clear();
        self.used = 0.0;
    }

    /// Predicted time to write `size` units given the space left right now.
    ///
    /// A write larger than the free space is split in two: the part that fits
    /// runs at the full rate, the overflow runs at half rate while the tier
    /// moves data out of the way. Latency is paid once per part.
    pub fn predict_write_time(&self, size: f64) -> f64 {
        let available = self.available_space();
        if size <= available {
            return self.latency + size / self.max_transfer_rate;
        }

        let available = available.max(0.0);
        let spill = size - available;
        2.0 * self.latency + available / self.max_transfer_rate + spill / (self.max_transfer_rate / 2.0)
    }

    pub fn predict_read_time(&self, size: f64) -> f64 {
        self.latency + size / self.max_transfer_rate
    }
}

fn is_valid_size(size: f64) -> bool {
    size.is_finite() && size >= 0.0
}

/// Rejects sizes that would corrupt the used-space accounting.
pub(crate) fn check_size(file_name: &str, size: f64) -> Result<()> {
    if is_valid_size(size) {
        Ok(())
    } else {
        Err(TierbiasError::InvalidFileSize {
            file: file_name.to_string(),
            size,
        })
    }
}

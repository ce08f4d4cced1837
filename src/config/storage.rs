use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::TierbiasError;
use serde::{Deserialize, Serialize};

/// Static description of one storage tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierSpec {
    pub name: String,
    pub capacity: f64,
    /// Seconds charged per access
    pub latency: f64,
    /// Size units per second
    pub max_transfer_rate: f64,
}

impl TierSpec {
    pub fn new(name: &str, capacity: f64, latency: f64, max_transfer_rate: f64) -> Self {
        Self {
            name: name.to_string(),
            capacity,
            latency,
            max_transfer_rate,
        }
    }
}

/// What to do with a decoded slot value that names no tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecodePolicy {
    /// Map it onto the slowest (last) tier
    Clamp,
    /// Treat the candidate as invalid
    Reject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub tiers: Vec<TierSpec>,
    pub decode_policy: DecodePolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            tiers: vec![
                TierSpec::new("Ramdisk", 10_000.0, 0.0, 1200.0),
                TierSpec::new("LocalFS", 20_000.0, 0.0001, 800.0),
                TierSpec::new("Lustre", 1_000_000.0, 0.01, 600.0),
            ],
            decode_policy: DecodePolicy::Clamp,
        }
    }
}

impl ConfigSection for StorageConfig {
    fn section_name() -> &'static str {
        "storage"
    }

    fn validate(&self) -> Result<(), TierbiasError> {
        if self.tiers.is_empty() {
            return Err(TierbiasError::Configuration(
                "At least one storage tier is required".to_string()
            ));
        }
        for tier in &self.tiers {
            if tier.capacity < 0.0 {
                return Err(TierbiasError::Configuration(format!(
                    "Tier {} has negative capacity",
                    tier.name
                )));
            }
            if tier.latency < 0.0 {
                return Err(TierbiasError::Configuration(format!(
                    "Tier {} has negative latency",
                    tier.name
                )));
            }
            if tier.max_transfer_rate <= 0.0 {
                return Err(TierbiasError::Configuration(format!(
                    "Tier {} must have a positive transfer rate",
                    tier.name
                )));
            }
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Storage".to_string(),
            fields: vec![
                FieldManifest::new(
                    "tiers",
                    "array",
                    serde_json::to_value(&StorageConfig::default().tiers)
                        .unwrap_or(serde_json::Value::Null),
                    Some(1.0),
                    None,
                    "Ordered tiers, fastest first",
                ),
                FieldManifest::new(
                    "decode_policy",
                    "enum",
                    serde_json::json!("Clamp"),
                    None,
                    None,
                    "Clamp or Reject decoded values past the last tier",
                ),
            ],
        }
    }
}

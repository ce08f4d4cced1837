pub mod traits;
pub mod evolution;
pub mod storage;
pub mod manager;

pub use manager::{AppConfig, ConfigManager};
pub use evolution::EvolutionConfig;
pub use storage::{DecodePolicy, StorageConfig, TierSpec};
pub use traits::{ConfigManifest, ConfigSection};

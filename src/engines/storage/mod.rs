pub mod tier;
pub mod manager;

pub use manager::StorageManager;
pub use tier::TierModel;

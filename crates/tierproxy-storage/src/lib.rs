pub mod error;
pub mod favorites;
pub mod runtime_config;
pub mod usage;

pub use error::StorageError;
pub use favorites::{FavoriteEntry, FavoritesStore};
pub use runtime_config::{ConfigStore, RuntimeConfig, RuntimeConfigPatch, TierRoute};
pub use usage::{BucketStats, UsageRecord, UsageStats, UsageTracker};

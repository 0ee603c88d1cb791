pub mod config;
pub mod domain;
pub mod fs;
pub mod logring;
pub mod time;

pub use config::GlobalConfig;
pub use domain::{BackendType, Tier};
pub use logring::{LogEntry, LogRing};

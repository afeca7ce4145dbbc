// Infrastructure for ThunderBird tree inspection: worker pools, configuration
// and snapshot encoding.

pub mod concurrency;
pub mod config;
pub mod snapshot;

pub use concurrency::build_pool;
pub use config::{DumpFormat, InspectConfig};

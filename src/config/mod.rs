//! Configuration types
//!
//! - `BackupConfig` - the folders and naming rules of one managed backup set
//! - `BackupConfigBuilder` - fluent construction with `~` expansion

mod types;

pub use types::{BackupConfig, BackupConfigBuilder};

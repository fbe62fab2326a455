//! Example application configured through typedconf
//!
//! Each module declares the settings it needs as a `#[config_type]` trait.
//! The build script merges them into [`GlobalConfig`], included below.

mod database;
mod features;
mod limits;
mod server;

pub use database::{Credentials, DatabaseConfig, Mode, PoolMapper, PoolSize, ReplicaCheck};
pub use features::{AppConfig, FeatureConfig};
pub use limits::LimitsConfig;
pub use server::{Port, ServerConfig};

typedconf::include_config!();

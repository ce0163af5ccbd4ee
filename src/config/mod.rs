mod config;

pub use config::{ConfigError, LoopyConfig, ShellConfig, StoreConfig};

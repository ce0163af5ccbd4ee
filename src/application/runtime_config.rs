use std::path::PathBuf;

use crate::cli::Cli;

/// Settings of one run, taken from the command line
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub root: PathBuf,
    pub config_file: Option<PathBuf>,
    pub store_file: Option<PathBuf>,
    pub compression_level: Option<i32>,
    pub command: Option<String>,
}

impl From<Cli> for RuntimeConfig {
    fn from(cli: Cli) -> Self {
        Self {
            root: cli.root,
            config_file: cli.config,
            store_file: cli.file,
            compression_level: cli.compress,
            command: cli.command,
        }
    }
}

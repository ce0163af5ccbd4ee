use std::io;

use loopy::Tree;
use loopy::config::{ConfigError, LoopyConfig, StoreConfig};
use loopy::shell::Shell;
use loopy::store::{FileStore, StoreError, TreeStore};
use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info};

use crate::application::{Repl, RuntimeConfig};

pub struct Application;

impl Application {
    pub fn run(runtime_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let runtime_config: RuntimeConfig = runtime_config.into();
        let config = Self::read_config(&runtime_config).context(ConfigSnafu)?;
        debug!("Loaded config: {:?}", config);

        let store = Self::store(&runtime_config, &config.store);
        let mut tree = match &store {
            Some(store) => store.load().context(StoreSnafu)?,
            None => {
                info!("No store file configured, changes are kept in memory only");
                Tree::new()
            }
        };
        if let Some(store) = &store {
            tree.set_hook(store.sync_hook());
        }

        let mut repl = Repl::new(Shell::with_config(config.shell), tree);
        match runtime_config.command {
            Some(line) => {
                let status = repl
                    .run_line(&line, &mut io::stdout(), &mut io::stderr())
                    .context(TerminalSnafu)?;
                ensure!(status == 0, CommandFailedSnafu { status });
            }
            None => repl
                .run(io::stdin().lock(), io::stdout(), io::stderr())
                .context(TerminalSnafu)?,
        }

        Ok(())
    }

    fn read_config(runtime_config: &RuntimeConfig) -> Result<LoopyConfig, ConfigError> {
        match &runtime_config.config_file {
            Some(path) => LoopyConfig::from_path(path),
            None => LoopyConfig::read(&runtime_config.root),
        }
    }

    /// The store named on the command line, or else in the config file
    fn store(runtime_config: &RuntimeConfig, config: &StoreConfig) -> Option<FileStore> {
        let path = match (&runtime_config.store_file, &config.path) {
            (Some(path), _) => path.clone(),
            (None, Some(path)) => runtime_config.root.join(path),
            (None, None) => return None,
        };

        let store = FileStore::new(path);
        Some(
            match runtime_config
                .compression_level
                .or(config.compression_level)
            {
                Some(level) => store.with_compression(level),
                None => store,
            },
        )
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Critical failure encountered during configuration stage"))]
    ConfigError { source: ConfigError },
    #[snafu(display("Failed to load the tree"))]
    StoreError { source: StoreError },
    #[snafu(display("Failed to talk to the terminal"))]
    TerminalError { source: io::Error },
    #[snafu(display("Command failed with status {}", status))]
    CommandFailedError { status: i32 },
}

use std::path::PathBuf;

use clap::Parser;

use crate::application::data::LogLevel;

/// A shell over a virtual filesystem kept in one markup string
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Cli {
    #[clap(long, short, default_value = "warn", value_enum)]
    pub log_level: LogLevel,

    /// The directory holding loopy.yaml
    #[clap(long, short, default_value = ".")]
    pub root: PathBuf,

    /// Config file to read instead of <ROOT>/loopy.yaml
    #[clap(long)]
    pub config: Option<PathBuf>,

    /// Store file to load the tree from and save every change to
    #[clap(long, short)]
    pub file: Option<PathBuf>,

    /// Compress the store file at this zstd level
    #[clap(long, requires = "file")]
    pub compress: Option<i32>,

    /// Run one command line and exit with its status
    #[clap(short = 'c', long = "command")]
    pub command: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_every_flag() {
        let cli = Cli::try_parse_from([
            "loopy",
            "--log-level",
            "debug",
            "--root",
            "/tmp",
            "--file",
            "tree.lpy",
            "--compress",
            "5",
            "-c",
            "ls /",
        ])
        .unwrap();
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert_eq!(cli.root, PathBuf::from("/tmp"));
        assert_eq!(cli.file, Some(PathBuf::from("tree.lpy")));
        assert_eq!(cli.compress, Some(5));
        assert_eq!(cli.command.as_deref(), Some("ls /"));
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["loopy"]).unwrap();
        assert!(matches!(cli.log_level, LogLevel::Warn));
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(cli.command.is_none());
    }
}

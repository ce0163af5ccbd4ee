use std::{
    borrow::Cow,
    fs,
    path::{Path, PathBuf},
};

use hashlink::LinkedHashMap;
use saphyr::{LoadableYamlNode, Scalar, Yaml};
use snafu::prelude::*;
use tracing::{debug, info};

use crate::ext::BestEffortPathExt;

const CONFIG_FILE_NAME: &str = "loopy.yaml";

const DEFAULT_PROMPT: &str = "loopy> ";
const DEFAULT_PREVIEW_LINES: usize = 10;

fn get_config_file_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Settings of the `loopy` binary, read from `loopy.yaml`.
///
/// ```yaml
/// shell:
///   prompt: "> "
///   head_lines: 5
///   tail_lines: 5
/// store:
///   path: tree.lpy
///   compression_level: 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoopyConfig {
    pub shell: ShellConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub prompt: String,
    /// Lines printed by `head` without `-n`
    pub head_lines: usize,
    /// Lines printed by `tail` without `-n`
    pub tail_lines: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_owned(),
            head_lines: DEFAULT_PREVIEW_LINES,
            tail_lines: DEFAULT_PREVIEW_LINES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreConfig {
    /// Store file, relative paths are taken from the root directory
    pub path: Option<PathBuf>,
    pub compression_level: Option<i32>,
}

impl LoopyConfig {
    /// Reads `loopy.yaml` from `root`, falling back to defaults when the
    /// file does not exist.
    pub fn read(root: &Path) -> Result<Self, ConfigError> {
        let path = get_config_file_path(root);
        if !path.exists() {
            info!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Opening config file: {}", path.best_effort_path_display());
        let contents = fs::read_to_string(path).context(ReadSnafu {
            file_path: path.best_effort_path_display(),
        })?;
        debug!("Successfully read config file: {} bytes", contents.len());
        contents.as_str().try_into()
    }

    fn parse_shell(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<ShellConfig, ConfigError> {
        let mut shell = ShellConfig::default();
        let Some(section) = section(top_level, "shell")? else {
            return Ok(shell);
        };

        if let Some(value) = entry(section, "prompt") {
            shell.prompt = value
                .as_str()
                .context(InvalidValueSnafu {
                    key: "shell.prompt",
                    expected: "a string",
                })?
                .to_owned();
        }
        if let Some(value) = entry(section, "head_lines") {
            shell.head_lines = line_count(value, "shell.head_lines")?;
        }
        if let Some(value) = entry(section, "tail_lines") {
            shell.tail_lines = line_count(value, "shell.tail_lines")?;
        }
        Ok(shell)
    }

    fn parse_store(top_level: &LinkedHashMap<Yaml, Yaml>) -> Result<StoreConfig, ConfigError> {
        let mut store = StoreConfig::default();
        let Some(section) = section(top_level, "store")? else {
            return Ok(store);
        };

        if let Some(value) = entry(section, "path") {
            let path = value.as_str().context(InvalidValueSnafu {
                key: "store.path",
                expected: "a string",
            })?;
            store.path = Some(PathBuf::from(path));
        }
        if let Some(value) = entry(section, "compression_level") {
            let level = value
                .as_integer()
                .and_then(|level| i32::try_from(level).ok())
                .filter(|level| zstd::compression_level_range().contains(level))
                .context(InvalidValueSnafu {
                    key: "store.compression_level",
                    expected: "a zstd compression level",
                })?;
            store.compression_level = Some(level);
        }
        Ok(store)
    }
}

impl TryFrom<&str> for LoopyConfig {
    type Error = ConfigError;

    fn try_from(contents: &str) -> Result<Self, Self::Error> {
        let contents_vec = Yaml::load_from_str(contents).context(ParseSnafu)?;
        let contents = contents_vec.first().context(MalformedConfigSnafu)?;

        let top_level = contents.as_mapping().context(TopLevelNotMapSnafu)?;

        Ok(LoopyConfig {
            shell: Self::parse_shell(top_level)?,
            store: Self::parse_store(top_level)?,
        })
    }
}

fn key(name: &'static str) -> Yaml<'static> {
    Yaml::Value(Scalar::String(Cow::Borrowed(name)))
}

/// A present, non-null value
fn entry<'a, 'y>(
    map: &'a LinkedHashMap<Yaml<'y>, Yaml<'y>>,
    name: &'static str,
) -> Option<&'a Yaml<'y>> {
    map.get(&key(name)).filter(|value| !value.is_null())
}

fn section<'a, 'y>(
    top_level: &'a LinkedHashMap<Yaml<'y>, Yaml<'y>>,
    name: &'static str,
) -> Result<Option<&'a LinkedHashMap<Yaml<'y>, Yaml<'y>>>, ConfigError> {
    entry(top_level, name)
        .map(|value| value.as_mapping().context(SectionNotMapSnafu { section: name }))
        .transpose()
}

fn line_count(value: &Yaml, key: &'static str) -> Result<usize, ConfigError> {
    value
        .as_integer()
        .and_then(|count| usize::try_from(count).ok())
        .context(InvalidValueSnafu {
            key,
            expected: "a non-negative integer",
        })
}

#[derive(Debug, Snafu)]
pub enum ConfigError {
    #[snafu(display("Failed to read the config file: {}", file_path))]
    ReadError {
        file_path: String,
        source: std::io::Error,
    },
    #[snafu(display("Failed to parse the config file"))]
    ParseError { source: saphyr::ScanError },
    #[snafu(display("Improperly formatted config file"))]
    MalformedConfig,
    #[snafu(display("Top level of config should be a map"))]
    TopLevelNotMap,
    #[snafu(display("Section '{}' should be a map", section))]
    SectionNotMap { section: &'static str },
    #[snafu(display("'{}' should be {}", key, expected))]
    InvalidValue {
        key: &'static str,
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[test]
    fn config_returns_error_on_nonexistent_file() {
        let result = LoopyConfig::from_path(Path::new("nonexistent.yaml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn config_defaults_when_root_has_no_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(LoopyConfig::read(dir.path()).unwrap(), LoopyConfig::default());
    }

    #[test]
    fn config_reads_file_from_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE_NAME), "shell:\n  head_lines: 3\n").unwrap();

        let config = LoopyConfig::read(dir.path()).unwrap();
        assert_eq!(config.shell.head_lines, 3);
        assert_eq!(config.shell.tail_lines, DEFAULT_PREVIEW_LINES);
    }

    #[test]
    fn config_parses_every_key() {
        let yaml = r#"
shell:
  prompt: "vfs$ "
  head_lines: 5
  tail_lines: 2
store:
  path: data/tree.lpy
  compression_level: 9
"#;
        let config: LoopyConfig = yaml.try_into().unwrap();
        assert_eq!(
            config,
            LoopyConfig {
                shell: ShellConfig {
                    prompt: "vfs$ ".to_owned(),
                    head_lines: 5,
                    tail_lines: 2,
                },
                store: StoreConfig {
                    path: Some(PathBuf::from("data/tree.lpy")),
                    compression_level: Some(9),
                },
            }
        );
    }

    #[rstest]
    #[case("other_config: value")]
    #[case("shell:\nstore:")]
    #[case("shell: {}\nstore: {}")]
    fn config_handles_missing_or_empty_sections(#[case] yaml: &str) {
        let config: LoopyConfig = yaml.try_into().unwrap();
        assert_eq!(config, LoopyConfig::default());
    }

    #[test]
    fn config_returns_error_on_invalid_yaml() {
        let result: Result<LoopyConfig, _> = "invalid: yaml: content: [unclosed".try_into();
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn config_returns_error_on_empty_file() {
        let result: Result<LoopyConfig, _> = "".try_into();
        assert!(matches!(result, Err(ConfigError::MalformedConfig)));
    }

    #[rstest]
    #[case("- item1\n- item2")]
    #[case("just a string")]
    fn config_returns_error_when_top_level_is_not_map(#[case] yaml: &str) {
        let result: Result<LoopyConfig, _> = yaml.try_into();
        assert!(matches!(result, Err(ConfigError::TopLevelNotMap)));
    }

    #[test]
    fn config_returns_error_when_section_is_not_map() {
        let result: Result<LoopyConfig, _> = "store:\n  - tree.lpy".try_into();
        assert!(matches!(
            result,
            Err(ConfigError::SectionNotMap { section: "store" })
        ));
    }

    #[rstest]
    #[case("shell:\n  head_lines: -1", "shell.head_lines")]
    #[case("shell:\n  tail_lines: many", "shell.tail_lines")]
    #[case("shell:\n  prompt: [a]", "shell.prompt")]
    #[case("store:\n  path: 12", "store.path")]
    #[case("store:\n  compression_level: 1000", "store.compression_level")]
    fn config_returns_error_on_invalid_value(#[case] yaml: &str, #[case] expected_key: &str) {
        let result: Result<LoopyConfig, _> = yaml.try_into();
        match result {
            Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

//!
//! This module defines the configuration structures and loading logic for runblock.
//! Supports TOML (`.runblock.toml`) and the JSON `config.json` layout with a `runblock` section.

use crate::dispatch::LanguageTable;
use crate::dispatch::shell::WINDOWS_SHELL_CANDIDATES;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Deadline for one block when nothing else is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Interpreter used for python blocks when none is configured
pub const DEFAULT_PYTHON: &str = "python";

/// Shell tried first when none is configured
pub const DEFAULT_SHELL: &str = "bash";

/// Environment variable naming a config file
pub const CONFIG_ENV_VAR: &str = "RUNBLOCK_CONFIG";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = ".runblock.toml";

/// Per-user interpreter and command choices.
///
/// Blank values count as unset. The short key names (`python_bin`, `shell`, `sql_cmd`)
/// are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutionConfig {
    #[serde(default, alias = "python_bin", skip_serializing_if = "Option::is_none")]
    pub python_interpreter: Option<String>,

    #[serde(default, alias = "shell", skip_serializing_if = "Option::is_none")]
    pub shell_path: Option<String>,

    /// Command that receives sql blocks on stdin; sql is unsupported without it
    #[serde(default, alias = "sql_cmd", skip_serializing_if = "Option::is_none")]
    pub sql_command: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ExecutionConfig {
    /// Configured interpreter, or `python`.
    pub fn python_interpreter(&self) -> &str {
        non_blank(&self.python_interpreter).unwrap_or(DEFAULT_PYTHON)
    }

    /// Configured shell, if any. The shell backend adds its own fallbacks.
    pub fn shell_path(&self) -> Option<&str> {
        non_blank(&self.shell_path)
    }

    pub fn sql_command(&self) -> Option<&str> {
        non_blank(&self.sql_command)
    }

    /// Fill blank interpreter and shell with the defaults. The sql command stays unset.
    pub fn with_defaults(mut self) -> Self {
        if non_blank(&self.python_interpreter).is_none() {
            self.python_interpreter = Some(DEFAULT_PYTHON.to_string());
        }
        if non_blank(&self.shell_path).is_none() {
            self.shell_path = Some(DEFAULT_SHELL.to_string());
        }
        self
    }
}

/// Limits and routing shared by every run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct RunnerSettings {
    /// Deadline per block in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms", rename = "timeout")]
    pub timeout_ms: u64,

    /// Language tags per backend
    #[serde(default)]
    pub languages: LanguageTable,

    /// Shells tried after `bash` and `sh` on Windows hosts
    #[serde(default = "default_windows_shells")]
    pub windows_shells: Vec<String>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_windows_shells() -> Vec<String> {
    WINDOWS_SHELL_CANDIDATES.iter().map(|s| s.to_string()).collect()
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            languages: LanguageTable::default(),
            windows_shells: default_windows_shells(),
        }
    }
}

impl RunnerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }
}

/// Complete configuration file. Unknown sections are ignored so a shared notes config works.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub runblock: ExecutionConfig,

    #[serde(default)]
    pub runner: RunnerSettings,
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {}: {source}", .path.display())]
    IoError { source: io::Error, path: PathBuf },

    /// Failed to parse the configuration content (TOML or JSON)
    #[error("Failed to parse config at {}: {message}", .path.display())]
    ParseError { path: PathBuf, message: String },
}

impl Config {
    /// Parse TOML configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<Config>(content).map(Config::with_defaults)
    }

    /// Parse JSON configuration text.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Config>(content).map(Config::with_defaults)
    }

    fn with_defaults(mut self) -> Self {
        self.runblock = self.runblock.with_defaults();
        self
    }

    /// Load configuration and report the path it came from.
    ///
    /// An explicit path (argument, then `$RUNBLOCK_CONFIG`) must exist. Without one,
    /// `.runblock.toml` in the working directory is used when present, defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::load_file(&path).map(|config| (config, path)),
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load_file(&path).map(|config| (config, path))
                } else {
                    log::debug!("No {DEFAULT_CONFIG_FILE} found; using defaults");
                    Ok((Self::default().with_defaults(), path))
                }
            }
        }
    }

    /// Load one file, choosing the format from its extension (`.json`, otherwise TOML).
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            source,
            path: path.to_path_buf(),
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_json {
            Self::from_json_str(&content).map_err(|e| e.to_string())
        } else {
            Self::from_toml_str(&content).map_err(|e| e.to_string())
        };

        let config = parsed.map_err(|message| ConfigError::ParseError {
            path: path.to_path_buf(),
            message,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.runner.timeout(), Duration::from_secs(30));
        assert_eq!(config.runblock.python_interpreter(), "python");
        assert_eq!(config.runblock.shell_path(), None);
        assert_eq!(config.runblock.sql_command(), None);
        assert_eq!(config.runner.windows_shells.len(), WINDOWS_SHELL_CANDIDATES.len());
    }

    #[test]
    fn test_deserialize_toml() {
        let toml = r#"
[runblock]
python_interpreter = "python3"
shell_path = "/bin/zsh"
sql_command = "sqlite3 -batch notes.db"

[runner]
timeout = 5000
windows-shells = ["pwsh.exe"]

[runner.languages]
shell = ["bash", "zsh"]
"#;

        let config = Config::from_toml_str(toml).expect("Failed to parse TOML");

        assert_eq!(config.runblock.python_interpreter(), "python3");
        assert_eq!(config.runblock.shell_path(), Some("/bin/zsh"));
        assert_eq!(config.runblock.sql_command(), Some("sqlite3 -batch notes.db"));
        assert_eq!(config.runner.timeout(), Duration::from_secs(5));
        assert_eq!(config.runner.windows_shells, vec!["pwsh.exe"]);
        assert_eq!(config.runner.languages.shell, vec!["bash", "zsh"]);
        assert_eq!(config.runner.languages.script, vec!["python", "py"]);
    }

    #[test]
    fn test_shared_json_layout() {
        let json = r#"{
            "search_paths": ["scratch"],
            "autosave_interval_seconds": 5,
            "runblock": {"python_bin": "", "shell": "", "sql_cmd": "psql -X"}
        }"#;

        let config = Config::from_json_str(json).expect("Failed to parse JSON");

        // Blank values fall back to defaults
        assert_eq!(config.runblock.python_interpreter.as_deref(), Some("python"));
        assert_eq!(config.runblock.shell_path.as_deref(), Some("bash"));
        assert_eq!(config.runblock.sql_command(), Some("psql -X"));
        assert_eq!(config.runner, RunnerSettings::default());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let config = ExecutionConfig {
            python_interpreter: Some("  ".to_string()),
            shell_path: Some(String::new()),
            sql_command: Some(" ".to_string()),
        };
        assert_eq!(config.python_interpreter(), "python");
        assert_eq!(config.shell_path(), None);
        assert_eq!(config.sql_command(), None);
    }

    #[test]
    fn test_with_timeout() {
        let settings = RunnerSettings::default().with_timeout(Duration::from_millis(1500));
        assert_eq!(settings.timeout_ms, 1500);
    }

    #[test]
    fn test_load_file_picks_format_by_extension() {
        let temp_dir = tempdir().unwrap();

        let json_path = temp_dir.path().join("config.json");
        fs::write(&json_path, r#"{"runblock": {"shell": "sh"}}"#).unwrap();
        let config = Config::load_file(&json_path).unwrap();
        assert_eq!(config.runblock.shell_path(), Some("sh"));

        let toml_path = temp_dir.path().join("runblock.toml");
        fs::write(&toml_path, "[runblock]\nshell = \"dash\"\n").unwrap();
        let config = Config::load_file(&toml_path).unwrap();
        assert_eq!(config.runblock.shell_path(), Some("dash"));
    }

    #[test]
    fn test_load_file_errors() {
        let temp_dir = tempdir().unwrap();

        let missing = temp_dir.path().join("missing.toml");
        assert!(matches!(Config::load_file(&missing), Err(ConfigError::IoError { .. })));

        let broken = temp_dir.path().join("broken.toml");
        fs::write(&broken, "[runner]\ntimeout = \"soon\"\n").unwrap();
        let err = Config::load_file(&broken).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("broken.toml"), "{err}");
    }

    #[test]
    #[serial]
    fn test_load_explicit_path_must_exist() {
        let temp_dir = tempdir().unwrap();
        let missing = temp_dir.path().join("nope.toml");
        assert!(Config::load(Some(missing.as_path())).is_err());
    }

    #[test]
    #[serial]
    fn test_load_from_env_var() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("env.toml");
        fs::write(&path, "[runner]\ntimeout = 1234\n").unwrap();

        // SAFETY: serialized with the other tests that touch the environment
        unsafe { std::env::set_var(CONFIG_ENV_VAR, &path) };
        let loaded = Config::load(None);
        unsafe { std::env::remove_var(CONFIG_ENV_VAR) };

        let (config, source) = loaded.unwrap();
        assert_eq!(source, path);
        assert_eq!(config.runner.timeout_ms, 1234);
    }
}

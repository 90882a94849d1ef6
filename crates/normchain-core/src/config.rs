//! Configuration types for normchain.
//!
//! [`Config::load`] reads `~/.config/normchain/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::from_path`] layers
//! an explicit file over the defaults. [`Config::defaults`] returns the same
//! defaults without touching the filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[step]
trace_directives = true

[output]
pretty = true
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `~/.config/normchain/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub step: StepConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// `[step]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    /// Emit a debug event for every message the normalization step rewrites.
    #[serde(default = "default_trace_directives")]
    pub trace_directives: bool,
}

fn default_trace_directives() -> bool { true }

impl Default for StepConfig {
    fn default() -> Self {
        Self {
            trace_directives: default_trace_directives(),
        }
    }
}

/// `[output]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON written by the CLI.
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool { true }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: default_pretty(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/normchain/config.toml`, layered on top of the
    /// built-in defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
            tracing::debug!(path = %path.display(), "wrote default config");
        }

        Self::from_path(&path)
    }

    /// Load an explicit file, layered on top of the built-in defaults.
    /// The file must exist.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .add_source(config::File::from(path).required(true))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_CONFIG, config::FileFormat::Toml))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("normchain")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_load() {
        let cfg = Config::defaults();
        assert!(cfg.step.trace_directives);
        assert!(cfg.output.pretty);
    }

    #[test]
    fn file_overrides_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[output]\npretty = false").unwrap();

        let cfg = Config::from_path(file.path()).unwrap();
        assert!(!cfg.output.pretty);
        assert!(cfg.step.trace_directives, "untouched sections keep defaults");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_path(&dir.path().join("absent.toml")).is_err());
    }
}

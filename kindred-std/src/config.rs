//! # Configuration
//!
//! Runtime knobs for the extension registry, the dispatcher and logging.
//!
//! Values are layered with the `config` crate: an optional file (format
//! picked from its extension), then `KINDRED`-prefixed environment variables
//! with `__` as the nesting separator.
//!
//! ```toml
//! [extensions]
//! accept_late_registration = true
//! enrichment = "concurrent"
//!
//! [log]
//! level = "debug"
//! format = "json"
//! ```
//!
//! `KINDRED__LOG__LEVEL=trace` overrides `log.level` from the file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "KINDRED";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or did not deserialize.
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The values parsed but make no sense together.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindredConfig {
    /// Extension registry and view settings.
    pub extensions: ExtensionConfig,
    /// Logging settings.
    pub log: LogConfig,
}

/// How `invoke_all` drives the extensions of a kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrichmentMode {
    /// One after another, in registration order.
    #[default]
    Sequential,
    /// All at once; results still come back in registration order.
    Concurrent,
}

/// Extension registry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionConfig {
    /// Accept registrations after the registry has been sealed.
    pub accept_late_registration: bool,
    /// Let a registrant replace its own extension instead of failing.
    pub allow_overrides: bool,
    /// Serve `registrant~name` path segments as extension views.
    pub expose_views: bool,
    /// Execution mode for collaborative invocation.
    pub enrichment: EnrichmentMode,
}

impl Default for ExtensionConfig {
    fn default() -> Self {
        Self {
            accept_late_registration: false,
            allow_overrides: false,
            expose_views: true,
            enrichment: EnrichmentMode::Sequential,
        }
    }
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging settings. `RUST_LOG` wins over `level` when set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default filter directive, e.g. `info` or `kindred_std=debug`.
    pub level: String,
    /// Line format.
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: LogFormat::Pretty,
        }
    }
}

/// `KINDRED__SECTION__KEY` variables, with `true`/`false` and numbers parsed.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

impl KindredConfig {
    /// Load from an optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_layered(path, environment())
    }

    fn load_layered(path: Option<&Path>, env: config::Environment) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder.add_source(env).build()?;
        Self::finish(config)
    }

    /// Parse TOML text, ignoring the environment.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?;
        Self::finish(config)
    }

    fn finish(config: config::Config) -> Result<Self, ConfigError> {
        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.log.level.trim().is_empty() {
            return Err(ConfigError::Invalid("log.level must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = KindredConfig::default();
        assert!(!config.extensions.accept_late_registration);
        assert!(!config.extensions.allow_overrides);
        assert!(config.extensions.expose_views);
        assert_eq!(config.extensions.enrichment, EnrichmentMode::Sequential);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = KindredConfig::from_toml_str(
            r#"
            [extensions]
            enrichment = "concurrent"

            [log]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.extensions.enrichment, EnrichmentMode::Concurrent);
        assert!(config.extensions.expose_views);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_empty_level_rejected() {
        let err = KindredConfig::from_toml_str("[log]\nlevel = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let raw = "[extensions]\nenrichment = \"sometimes\"";
        let err = KindredConfig::from_toml_str(raw).unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("kindred-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[extensions]\naccept_late_registration = true").unwrap();
        drop(file);

        let config = KindredConfig::load(Some(&path)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(config.extensions.accept_late_registration);
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = std::env::temp_dir().join(format!("kindred-env-{}.toml", std::process::id()));
        std::fs::write(
            &path,
            "[extensions]\naccept_late_registration = false\n\n[log]\nlevel = \"warn\"\n",
        )
        .unwrap();

        let vars: config::Map<String, String> = [
            ("KINDRED__LOG__LEVEL", "debug"),
            ("KINDRED__EXTENSIONS__ACCEPT_LATE_REGISTRATION", "true"),
            ("KINDRED__EXTENSIONS__ENRICHMENT", "concurrent"),
            ("OTHER__LOG__LEVEL", "trace"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();

        let loaded = KindredConfig::load_layered(Some(&path), environment().source(Some(vars)));
        std::fs::remove_file(&path).unwrap();

        let config = loaded.unwrap();
        assert_eq!(config.log.level, "debug");
        assert!(config.extensions.accept_late_registration);
        assert_eq!(config.extensions.enrichment, EnrichmentMode::Concurrent);
        assert!(config.extensions.expose_views);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("kindred-config-does-not-exist.toml");
        assert!(matches!(
            KindredConfig::load(Some(&path)),
            Err(ConfigError::Load(_))
        ));
    }
}

//! Configuration loading for the Name Value server.
//!
//! The configuration lives in `namevalue-config.yaml` next to the binary
//! (or wherever `NAMEVALUE_CONFIG` points). Every section is optional and
//! falls back to defaults, so an empty file is a valid configuration.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 8080
//! storage:
//!   backend: file
//!   data_dir: data
//! ledger:
//!   match_policy: permissive_name   # or strict_identity
//!   leaderboard_size: 15
//!   country_board_size: 8
//! dispatcher:
//!   accept_unrecognized_countries: true
//!   announce_joins: false
//! announcer:
//!   synthesis:
//!     timeout_ms: 8000
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use namevalue_announcer::AnnouncerConfig;
use namevalue_db::StorageConfig;
use namevalue_ledger::LedgerConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "namevalue-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration, mirroring `namevalue-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct NameValueConfig {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Durable store selection.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Ledger matching and leaderboard sizes.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Speech synthesis, playback, and fallback voice.
    #[serde(default)]
    pub announcer: AnnouncerConfig,

    /// Event routing options.
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
}

impl NameValueConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    ///
    /// - `NAMEVALUE_PORT` overrides `server.port`
    /// - `DRAGONFLY_URL` overrides `storage.dragonfly_url`
    /// - `NAMEVALUE_DATA_DIR` overrides `storage.data_dir`
    /// - `TTS_API_KEY`, `GEMINI_API_KEY`, or `API_KEY` sets
    ///   `announcer.synthesis.api_key`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply every environment override.
    pub fn apply_env_overrides(&mut self) {
        self.server.apply_env_overrides();
        self.storage.apply_env_overrides();
        self.announcer.apply_env_overrides();
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Override the port with `NAMEVALUE_PORT` when it holds a valid port.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("NAMEVALUE_PORT") {
            match val.parse() {
                Ok(port) => self.port = port,
                Err(e) => warn!(value = %val, error = %e, "ignoring invalid NAMEVALUE_PORT"),
            }
        }
    }

    /// `host:port`, ready for a TCP bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Event routing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Store comment text that matches no known country as the country
    /// code itself.
    pub accept_unrecognized_countries: bool,
    /// Speak a routine welcome when a viewer joins.
    pub announce_joins: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            accept_unrecognized_countries: true,
            announce_joins: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use namevalue_db::StorageBackend;
    use namevalue_ledger::MatchPolicy;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = NameValueConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.ledger.leaderboard_size, 15);
        assert!(config.dispatcher.accept_unrecognized_countries);
        assert!(!config.dispatcher.announce_joins);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r#"
server:
  host: "127.0.0.1"
storage:
  backend: memory
ledger:
  match_policy: strict_identity
  leaderboard_size: 10
  country_board_size: 5
dispatcher:
  accept_unrecognized_countries: false
  announce_joins: true
announcer:
  synthesis:
    model: "custom-tts"
    timeout_ms: 3000
  player:
    program: "paplay"
    args: ["--raw"]
  fallback:
    program: "say"
    args: ["-f", "-"]
    language: "fr-CA"
"#;
        let config = NameValueConfig::parse(yaml).unwrap_or_default();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.ledger.match_policy, MatchPolicy::StrictIdentity);
        assert_eq!(config.ledger.country_board_size, 5);
        assert!(!config.dispatcher.accept_unrecognized_countries);
        assert!(config.dispatcher.announce_joins);
        assert_eq!(config.announcer.synthesis.model, "custom-tts");
        assert_eq!(config.announcer.player.args, ["--raw"]);
        assert_eq!(config.announcer.fallback.language, "fr-CA");
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = NameValueConfig::parse("ledger:\n  leaderboard_size: 3\n").unwrap_or_default();
        assert_eq!(config.ledger.leaderboard_size, 3);
        assert_eq!(config.ledger.country_board_size, 8);
        assert_eq!(config.announcer.fallback.program, "espeak-ng");
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(NameValueConfig::parse("").is_ok());
    }

    #[test]
    fn invalid_yaml_is_rejected() {
        let result = NameValueConfig::parse("ledger: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".into(),
            port: 9000,
        };
        assert_eq!(server.bind_address(), "127.0.0.1:9000");
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join(DEFAULT_CONFIG_FILE);
        if path.exists() {
            let config = NameValueConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}

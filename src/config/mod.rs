//! Configuration facade with environment fallback.
//!
//! This module layers the properties parser into the lookup surface the
//! agents use. Key features:
//!
//! - **Explicit construction**: an [`AgentConfig`] is an ordinary owned
//!   value with a caller-controlled lifetime; no process-wide
//!   singleton, no lazy initialization
//! - **Layered resolution**: properties file first, then the process
//!   environment under the derived name, then the caller's default
//! - **Forgiving discovery**: a missing file logs a warning and yields
//!   an empty config, so every lookup falls through to env/defaults
//!
//! # Example
//!
//! ```no_run
//! use dcomp_config::config::AgentConfig;
//!
//! let config = AgentConfig::load("agent.properties")?;
//! let timeout = config.exec_timeout_ms()?;
//! println!("agent {} times out after {}ms", config.agent_name(), timeout);
//! # Ok::<(), dcomp_config::config::ConfigError>(())
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::io;
use std::num::ParseIntError;
use std::path::Path;

use serde::Serialize;
use sysinfo::System;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::core::parser;

/// Well-known configuration keys shared with the agent's collaborators.
pub mod keys {
    /// Points at the properties file itself; usually supplied through
    /// its derived environment name `DCOMP_CONFIG_FILE`.
    pub const CONFIG_FILE: &str = "dcomp.config.file";
    /// Agent display name.
    pub const AGENT_NAME: &str = "dcomp.agent.name";
    /// Subprocess execution timeout in milliseconds.
    pub const EXEC_TIMEOUT: &str = "dcomp.exec.timeout";
    /// Drush executable name or path.
    pub const DRUSH_COMMAND: &str = "dcomp.drush.command";
    /// Drush site alias.
    pub const DRUSH_SITE: &str = "dcomp.drush.site";
    /// Base URL of the attached Drupal site.
    pub const SITE_BASE_URL: &str = "dcomp.site.base_url";
    /// Services endpoint name.
    pub const SERVICES_ENDPOINT: &str = "dcomp.services.endpoint";
    /// Services account user name.
    pub const SERVICES_USER_NAME: &str = "dcomp.services.user.name";
    /// Services account password.
    pub const SERVICES_USER_PASS: &str = "dcomp.services.user.pass";
}

/// Default drush executable when no key or environment override exists.
pub const DEFAULT_DRUSH_COMMAND: &str = "drush";
/// Default drush site alias.
pub const DEFAULT_DRUSH_SITE: &str = "@self";
/// Default subprocess timeout in milliseconds.
pub const DEFAULT_EXEC_TIMEOUT_MS: u64 = 120_000;
/// Default properties file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.properties";

/// Errors from loading or interpreting agent configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The properties file exists but could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// A numeric key holds a value that does not parse as an integer.
    #[error("config key '{key}' holds non-numeric value '{value}'")]
    InvalidNumber {
        key: String,
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Where a resolved configuration value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Defined in the properties mapping (file or [`AgentConfig::set`]).
    Properties,
    /// Taken from the process environment under the derived name.
    Environment,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Properties => write!(f, "properties"),
            Source::Environment => write!(f, "environment"),
        }
    }
}

/// Derive the environment-variable name for a property key.
///
/// Dots become underscores and the result is upper-cased, so
/// `dcomp.drush.command` is looked up as `DCOMP_DRUSH_COMMAND`.
pub fn env_key(key: &str) -> String {
    key.replace('.', "_").to_uppercase()
}

/// Caller-owned configuration for a Drupal Computing agent.
///
/// Wraps one parsed properties mapping. Lookups fall back to the
/// process environment under [`env_key`] naming, then to the caller's
/// default, so an agent with no properties file at all still runs on
/// environment variables and built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct AgentConfig {
    properties: HashMap<String, String>,
}

impl AgentConfig {
    /// Creates an empty configuration; every lookup falls through to
    /// the environment or the caller default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopts an already-parsed properties mapping.
    pub fn from_map(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    /// Loads configuration from a properties file.
    ///
    /// A missing file is not an error: the agent is expected to be able
    /// to run on environment variables and defaults alone, so this logs
    /// a warning and returns an empty configuration instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] for any read failure other than the
    /// file not existing.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::from_map(parser::parse_str(&content));
                info!(
                    file = %path.display(),
                    keys = config.len(),
                    "loaded agent configuration"
                );
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(file = %path.display(), "cannot find config file, using defaults");
                Ok(Self::new())
            }
            Err(e) => Err(ConfigError::Io(e)),
        }
    }

    /// Loads configuration from the conventional location.
    ///
    /// The path comes from the `DCOMP_CONFIG_FILE` environment variable
    /// (the derived name of [`keys::CONFIG_FILE`]) when set, otherwise
    /// `config.properties` in the working directory.
    ///
    /// # Errors
    ///
    /// Same as [`AgentConfig::load`].
    pub fn load_default() -> Result<Self, ConfigError> {
        debug!(
            version = env!("CARGO_PKG_VERSION"),
            "agent configuration library"
        );
        let path = env::var(env_key(keys::CONFIG_FILE))
            .unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load(path)
    }

    /// Number of keys in the properties mapping (environment fallbacks
    /// not counted).
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// True when no properties are loaded.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterates the loaded properties in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Resolves a key from the properties, falling back to the process
    /// environment under the derived name.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lookup(key).map(|(value, _)| value)
    }

    /// Resolves a key, falling back to `default` when neither the
    /// properties nor the environment define it.
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Resolves a key together with the provenance of the value.
    pub fn lookup(&self, key: &str) -> Option<(String, Source)> {
        if let Some(value) = self.properties.get(key) {
            return Some((value.clone(), Source::Properties));
        }
        env::var(env_key(key))
            .ok()
            .map(|value| (value, Source::Environment))
    }

    /// Overrides a key in memory. Nothing is ever written back to disk.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Agent display name, defaulting to the machine hostname when no
    /// key or environment override exists ("unknown" when the OS
    /// reports none).
    pub fn agent_name(&self) -> String {
        self.get(keys::AGENT_NAME)
            .or_else(System::host_name)
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Drush executable name or path.
    pub fn drush_command(&self) -> String {
        self.get_or(keys::DRUSH_COMMAND, DEFAULT_DRUSH_COMMAND)
    }

    /// Drush site alias.
    pub fn drush_site_alias(&self) -> String {
        self.get_or(keys::DRUSH_SITE, DEFAULT_DRUSH_SITE)
    }

    /// Subprocess execution timeout in milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidNumber`] when the configured value
    /// does not parse as an unsigned integer.
    pub fn exec_timeout_ms(&self) -> Result<u64, ConfigError> {
        match self.get(keys::EXEC_TIMEOUT) {
            None => Ok(DEFAULT_EXEC_TIMEOUT_MS),
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|source| ConfigError::InvalidNumber {
                    key: keys::EXEC_TIMEOUT.to_string(),
                    value: raw.clone(),
                    source,
                }),
        }
    }

    /// Base URL of the attached Drupal site, when configured.
    pub fn site_base_url(&self) -> Option<String> {
        self.get(keys::SITE_BASE_URL)
    }

    /// Services endpoint name, when configured.
    pub fn services_endpoint(&self) -> Option<String> {
        self.get(keys::SERVICES_ENDPOINT)
    }

    /// Services account credentials as (name, password), when both are
    /// configured.
    pub fn services_credentials(&self) -> Option<(String, String)> {
        let user = self.get(keys::SERVICES_USER_NAME)?;
        let pass = self.get(keys::SERVICES_USER_PASS)?;
        Some((user, pass))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    /// Helper: writes a properties file into a fresh temp dir.
    fn write_config(content: &str) -> (TempDir, PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("agent.properties");
        fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_load_parses_properties() {
        let (_dir, path) =
            write_config("dcomp.drush.command = /usr/bin/drush\ndcomp.agent.name: worker-01\n");
        let config = AgentConfig::load(&path).unwrap();

        assert_eq!(config.len(), 2);
        assert_eq!(config.drush_command(), "/usr/bin/drush");
        assert_eq!(config.agent_name(), "worker-01");
    }

    #[test]
    fn test_missing_file_yields_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nonexistent.properties");

        let config = AgentConfig::load(&path).unwrap();
        assert!(config.is_empty());
        assert_eq!(config.drush_command(), "drush");
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        // A directory exists but cannot be read as a file
        let temp_dir = TempDir::new().unwrap();
        let result = AgentConfig::load(temp_dir.path());
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_env_key_derivation() {
        assert_eq!(env_key("dcomp.drush.command"), "DCOMP_DRUSH_COMMAND");
        assert_eq!(env_key("dcomp.site.base_url"), "DCOMP_SITE_BASE_URL");
    }

    #[test]
    fn test_environment_fallback() {
        let config = AgentConfig::new();
        env::set_var("DCOMP_TEST_FALLBACK_ONE", "from-env");

        let (value, source) = config.lookup("dcomp.test.fallback.one").unwrap();
        assert_eq!(value, "from-env");
        assert_eq!(source, Source::Environment);

        env::remove_var("DCOMP_TEST_FALLBACK_ONE");
    }

    #[test]
    fn test_properties_shadow_environment() {
        env::set_var("DCOMP_TEST_SHADOWED_KEY", "from-env");

        let mut config = AgentConfig::new();
        config.set("dcomp.test.shadowed.key", "from-file");

        let (value, source) = config.lookup("dcomp.test.shadowed.key").unwrap();
        assert_eq!(value, "from-file");
        assert_eq!(source, Source::Properties);

        env::remove_var("DCOMP_TEST_SHADOWED_KEY");
    }

    #[test]
    fn test_default_when_unset_everywhere() {
        let config = AgentConfig::new();
        assert_eq!(config.get("dcomp.test.never.set"), None);
        assert_eq!(config.get_or("dcomp.test.never.set", "fallback"), "fallback");
        assert_eq!(config.drush_site_alias(), "@self");
    }

    #[test]
    fn test_set_overrides_loaded_value() {
        let (_dir, path) = write_config("dcomp.drush.site = @live\n");
        let mut config = AgentConfig::load(&path).unwrap();
        assert_eq!(config.drush_site_alias(), "@live");

        config.set(keys::DRUSH_SITE, "@staging");
        assert_eq!(config.drush_site_alias(), "@staging");
    }

    #[test]
    fn test_exec_timeout_parsing() {
        let mut config = AgentConfig::new();
        assert_eq!(config.exec_timeout_ms().unwrap(), 120_000);

        config.set(keys::EXEC_TIMEOUT, "5000");
        assert_eq!(config.exec_timeout_ms().unwrap(), 5000);

        config.set(keys::EXEC_TIMEOUT, "fast");
        assert!(matches!(
            config.exec_timeout_ms(),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_agent_name_defaults_to_hostname() {
        let config = AgentConfig::new();
        // Whatever the host reports, the fallback chain never yields an
        // empty name
        assert!(!config.agent_name().is_empty());
    }

    #[test]
    fn test_services_credentials_require_both() {
        let mut config = AgentConfig::new();
        config.set(keys::SERVICES_USER_NAME, "agent");
        assert_eq!(config.services_credentials(), None);

        config.set(keys::SERVICES_USER_PASS, "secret");
        assert_eq!(
            config.services_credentials(),
            Some(("agent".to_string(), "secret".to_string()))
        );
    }

    #[test]
    fn test_from_map_and_iter() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), "1".to_string());
        map.insert("b".to_string(), "2".to_string());

        let config = AgentConfig::from_map(map);
        let mut pairs: Vec<_> = config.iter().collect();
        pairs.sort();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(format!("{}", Source::Properties), "properties");
        assert_eq!(format!("{}", Source::Environment), "environment");
    }
}

//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, reading the
//! `DP_*` environment variables and merging configurations with proper
//! precedence rules.

use crate::error::DomainCheckError;
use crate::types::ResolverProvider;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [defaults]
/// force_all = false
/// pretty = true
/// timeout = "10s"
///
/// [resolver]
/// provider = "cloudflare"
///
/// [whois]
/// server = "whois.verisign-grs.com"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// DNS resolver settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverFileConfig>,

    /// WHOIS transport settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois: Option<WhoisFileConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    /// Run every check even after one indicated availability
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_all: Option<bool>,

    /// Default JSON output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,

    /// Default pretty output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,

    /// Timeout for both DNS and WHOIS (as string, e.g., "5s", "30s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// `[resolver]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ResolverFileConfig {
    /// "system", "google", "cloudflare" or "quad9"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// `[whois]` section.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WhoisFileConfig {
    /// Fixed WHOIS server, bypassing the IANA referral
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Default)]
pub struct ConfigManager {
    /// Directory searched for local config files; the working directory
    /// when unset
    local_dir: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look for local config files in `dir` instead of the working directory.
    pub fn with_local_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.local_dir = Some(dir.into());
        self
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `FileError` when the file is missing or unreadable, and
    /// `ConfigError` when it is not valid TOML or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            DomainCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config, then the global file in `$HOME`, then the local file;
    /// later files override earlier ones field by field.
    ///
    /// # Errors
    ///
    /// A discovered file that is invalid is an error; missing files are not.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainCheckError> {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged_config = FileConfig::default();
        for path in candidates.into_iter().flatten() {
            debug!(path = %path.display(), "loading config file");
            let config = self.load_file(&path)?;
            merged_config = merge_configs(merged_config, config);
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let dir = self.local_dir.clone().unwrap_or_else(|| PathBuf::from("."));
        ["domain-probe.toml", ".domain-probe.toml"]
            .iter()
            .map(|candidate| dir.join(candidate))
            .find(|path| path.exists())
    }

    /// Get the global configuration file path.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".domain-probe.toml");
        path.exists().then_some(path)
    }

    /// Get the XDG configuration file path.
    ///
    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-probe").join("config.toml");
        path.exists().then_some(path)
    }
}

/// Merge two configurations with proper precedence.
///
/// Values from `higher` take precedence over values from `lower`.
pub fn merge_configs(lower: FileConfig, higher: FileConfig) -> FileConfig {
    FileConfig {
        defaults: match (lower.defaults, higher.defaults) {
            (Some(lower), Some(higher)) => Some(DefaultsConfig {
                force_all: higher.force_all.or(lower.force_all),
                json: higher.json.or(lower.json),
                pretty: higher.pretty.or(lower.pretty),
                timeout: higher.timeout.or(lower.timeout),
            }),
            (lower, higher) => higher.or(lower),
        },
        resolver: match (lower.resolver, higher.resolver) {
            (Some(lower), Some(higher)) => Some(ResolverFileConfig {
                provider: higher.provider.or(lower.provider),
                timeout: higher.timeout.or(lower.timeout),
            }),
            (lower, higher) => higher.or(lower),
        },
        whois: match (lower.whois, higher.whois) {
            (Some(lower), Some(higher)) => Some(WhoisFileConfig {
                server: higher.server.or(lower.server),
                timeout: higher.timeout.or(lower.timeout),
            }),
            (lower, higher) => higher.or(lower),
        },
    }
}

/// Validate a configuration for common issues.
fn validate_config(config: &FileConfig) -> Result<(), DomainCheckError> {
    let timeouts = [
        config.defaults.as_ref().and_then(|d| d.timeout.as_deref()),
        config.resolver.as_ref().and_then(|r| r.timeout.as_deref()),
        config.whois.as_ref().and_then(|w| w.timeout.as_deref()),
    ];
    for timeout_str in timeouts.into_iter().flatten() {
        if parse_timeout(timeout_str).is_none() {
            return Err(DomainCheckError::config(format!(
                "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
                timeout_str
            )));
        }
    }

    if let Some(provider) = config.resolver.as_ref().and_then(|r| r.provider.as_deref()) {
        provider
            .parse::<ResolverProvider>()
            .map_err(DomainCheckError::config)?;
    }

    if let Some(server) = config.whois.as_ref().and_then(|w| w.server.as_deref()) {
        if !is_valid_server(server) {
            return Err(DomainCheckError::config(format!(
                "Invalid WHOIS server '{}'",
                server
            )));
        }
    }

    Ok(())
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via DP_* environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub force_all: Option<bool>,
    pub json: Option<bool>,
    pub pretty: Option<bool>,
    pub timeout: Option<Duration>,
    pub resolver: Option<ResolverProvider>,
    pub whois_server: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from environment variables.
///
/// Parses all DP_* environment variables. Invalid values are logged as
/// warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|key| env::var(key).ok())
}

/// Build an `EnvConfig` from any variable source.
pub fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    let flag = |key: &str| -> Option<bool> {
        let val = lookup(key)?;
        let parsed = parse_bool(&val);
        match parsed {
            Some(b) => debug!(var = key, value = b, "using environment variable"),
            None => warn!(var = key, value = %val, "invalid boolean, use true/false"),
        }
        parsed
    };

    env_config.force_all = flag("DP_FORCE_ALL");
    env_config.json = flag("DP_JSON");
    env_config.pretty = flag("DP_PRETTY");

    // DP_TIMEOUT - timeout for both DNS and WHOIS
    if let Some(val) = lookup("DP_TIMEOUT") {
        match parse_timeout(&val) {
            Some(timeout) => {
                debug!(var = "DP_TIMEOUT", value = %val, "using environment variable");
                env_config.timeout = Some(timeout);
            }
            None => warn!(
                var = "DP_TIMEOUT",
                value = %val,
                "invalid timeout, use format like '5s', '30s', '2m'"
            ),
        }
    }

    // DP_RESOLVER - upstream resolver name
    if let Some(val) = lookup("DP_RESOLVER") {
        match val.parse::<ResolverProvider>() {
            Ok(provider) => {
                debug!(var = "DP_RESOLVER", value = %provider, "using environment variable");
                env_config.resolver = Some(provider);
            }
            Err(e) => warn!(var = "DP_RESOLVER", "{}", e),
        }
    }

    // DP_WHOIS_SERVER - fixed WHOIS server
    if let Some(val) = lookup("DP_WHOIS_SERVER") {
        let server = val.trim();
        if is_valid_server(server) {
            debug!(var = "DP_WHOIS_SERVER", value = %server, "using environment variable");
            env_config.whois_server = Some(server.to_string());
        } else {
            warn!(var = "DP_WHOIS_SERVER", value = %val, "invalid WHOIS server");
        }
    }

    // DP_CONFIG - explicit config file
    if let Some(path) = lookup("DP_CONFIG") {
        if !path.trim().is_empty() {
            env_config.config = Some(path);
        }
    }

    env_config
}

fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn is_valid_server(server: &str) -> bool {
    !server.is_empty() && !server.contains(char::is_whitespace)
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number is taken as seconds. Returns `None` if parsing fails.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    }
}

/// Parse a timeout string into a non-zero `Duration`.
pub fn parse_timeout(timeout_str: &str) -> Option<Duration> {
    parse_timeout_string(timeout_str)
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
}

//! # Domain Probe Library
//!
//! Decide whether a domain name is available for registration by combining
//! three independent signals: DNS resolution, NS delegation and WHOIS
//! registry data.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_probe_lib::DomainChecker;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = DomainChecker::new()?;
//!     let response = checker.check_domain("example.com", false).await;
//!
//!     println!("Domain: {} - Available: {}", response.domain, response.is_available);
//!     for (check, result) in &response.checks {
//!         println!("  {}: {} ({})", check, result.status(), result.details());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## How a check runs
//!
//! - **DNS**: any A/AAAA record means the name is in use
//! - **NS**: a delegation means the name is registered
//! - **WHOIS**: a registrar in the registry record means the name is registered
//!
//! Checks run in that order. The first one that finds evidence of
//! availability ends the run unless `force_all` is set. Failures of a single
//! check are reported in its result and never abort the run.

// Re-export main public API types and functions
// This makes them available as domain_probe_lib::TypeName
pub use checker::DomainChecker;
pub use config::{
    env_config_from, load_env_config, merge_configs, parse_timeout, parse_timeout_string,
    ConfigManager, DefaultsConfig, EnvConfig, FileConfig, ResolverFileConfig, WhoisFileConfig,
};
pub use error::{DomainCheckError, WhoisParseError};
pub use probes::{DnsProbe, NsProbe, Probe, WhoisProbe};
pub use protocols::{
    parse_whois, DnsResolver, HickoryResolver, Registrar, WhoisClient, WhoisParser, WhoisRecord,
    WhoisTransport, IANA_WHOIS_SERVER, MAX_WHOIS_RESPONSE_BYTES, WHOIS_PORT,
};
pub use types::{
    CheckConfig, CheckKind, CheckResult, CheckStatus, DomainCheckResponse, ResolverProvider,
};

// Internal modules - these are not part of the public API
mod checker;
mod config;
mod error;
mod probes;
mod protocols;
mod types;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainCheckError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");

/// Get library information for debugging or display purposes.
pub fn info() -> LibraryInfo {
    LibraryInfo {
        version: VERSION,
        author: AUTHOR,
        checks: vec![CheckKind::Dns, CheckKind::Ns, CheckKind::Whois],
    }
}

/// Information about the library build
#[derive(Debug, Clone)]
pub struct LibraryInfo {
    pub version: &'static str,
    pub author: &'static str,
    /// Checks in the order the default checker runs them
    pub checks: Vec<CheckKind>,
}

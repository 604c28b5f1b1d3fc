//! Core data types for domain availability probing.
//!
//! This module defines the result model shared by every probe, the aggregate
//! response returned by the checker, and the checker configuration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Outcome tag of a single probe.
///
/// The meaning is the same for every probe:
/// - `Passed`: evidence the domain IS available
/// - `Failed`: evidence the domain is NOT available
/// - `Skipped`: not run because an earlier probe already indicated availability
/// - `Error`: the probe itself failed and produced no evidence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passed,
    Failed,
    Skipped,
    Error,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Passed => "passed",
            CheckStatus::Failed => "failed",
            CheckStatus::Skipped => "skipped",
            CheckStatus::Error => "error",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Name of a probe, used as the key in `DomainCheckResponse::checks`.
///
/// The derived ordering is the pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Dns,
    Ns,
    Whois,
}

impl CheckKind {
    /// Key used in serialized responses ("dns", "ns", "whois").
    pub fn key(&self) -> &'static str {
        match self {
            CheckKind::Dns => "dns",
            CheckKind::Ns => "ns",
            CheckKind::Whois => "whois",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckKind::Dns => write!(f, "DNS"),
            CheckKind::Ns => write!(f, "NS"),
            CheckKind::Whois => write!(f, "WHOIS"),
        }
    }
}

/// Outcome of one probe.
///
/// Only constructible through the per-status constructors, so `error_info`
/// is present exactly when the status is `Error`. Deserialization goes
/// through the same rule and rejects input that breaks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCheckResult")]
pub struct CheckResult {
    status: CheckStatus,

    /// Human-readable explanation
    details: String,

    /// Technical error text (only for `Error`)
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    error_info: Option<String>,
}

/// Wire form of `CheckResult` before validation.
#[derive(Deserialize)]
struct RawCheckResult {
    status: CheckStatus,
    details: String,
    #[serde(rename = "error", default)]
    error_info: Option<String>,
}

impl TryFrom<RawCheckResult> for CheckResult {
    type Error = String;

    fn try_from(raw: RawCheckResult) -> Result<Self, Self::Error> {
        match (raw.status, raw.error_info) {
            (CheckStatus::Error, Some(info)) if !info.trim().is_empty() => {
                Ok(Self::error(raw.details, info))
            }
            (CheckStatus::Error, _) => {
                Err("error result requires a non-empty \"error\" field".to_string())
            }
            (status, None) => Ok(Self::without_error(status, raw.details)),
            (status, Some(_)) => Err(format!(
                "{} result must not carry an \"error\" field",
                status
            )),
        }
    }
}

impl CheckResult {
    pub fn passed<D: Into<String>>(details: D) -> Self {
        Self::without_error(CheckStatus::Passed, details)
    }

    pub fn failed<D: Into<String>>(details: D) -> Self {
        Self::without_error(CheckStatus::Failed, details)
    }

    pub fn skipped<D: Into<String>>(details: D) -> Self {
        Self::without_error(CheckStatus::Skipped, details)
    }

    /// Build an `Error` result. An empty message is replaced so that the
    /// error text is never blank.
    pub fn error<D: Into<String>, E: Into<String>>(details: D, error_info: E) -> Self {
        let mut error_info = error_info.into();
        if error_info.trim().is_empty() {
            error_info = "unknown error".to_string();
        }
        Self {
            status: CheckStatus::Error,
            details: details.into(),
            error_info: Some(error_info),
        }
    }

    fn without_error<D: Into<String>>(status: CheckStatus, details: D) -> Self {
        Self {
            status,
            details: details.into(),
            error_info: None,
        }
    }

    pub fn status(&self) -> CheckStatus {
        self.status
    }

    pub fn details(&self) -> &str {
        &self.details
    }

    pub fn error_info(&self) -> Option<&str> {
        self.error_info.as_deref()
    }
}

/// Aggregate result of checking one domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainCheckResponse {
    /// The domain exactly as the caller passed it
    pub domain: String,

    /// Best-effort verdict. Set by the first `Passed` probe and never reset.
    pub is_available: bool,

    /// Result per probe, keyed "dns", "ns", "whois"
    pub checks: BTreeMap<CheckKind, CheckResult>,
}

impl DomainCheckResponse {
    /// Start an empty, not-available response for `domain`.
    pub fn new<D: Into<String>>(domain: D) -> Self {
        Self {
            domain: domain.into(),
            is_available: false,
            checks: BTreeMap::new(),
        }
    }

    /// Result recorded for `kind`, if any.
    pub fn check(&self, kind: CheckKind) -> Option<&CheckResult> {
        self.checks.get(&kind)
    }

    /// Status recorded for `kind`, if any.
    pub fn status(&self, kind: CheckKind) -> Option<CheckStatus> {
        self.checks.get(&kind).map(CheckResult::status)
    }

    pub(crate) fn record(&mut self, kind: CheckKind, result: CheckResult) {
        self.checks.insert(kind, result);
    }
}

/// Which upstream DNS servers the resolver talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverProvider {
    /// Use the operating system's resolver configuration (/etc/resolv.conf, etc.)
    #[default]
    System,
    Google,
    Cloudflare,
    Quad9,
}

impl ResolverProvider {
    pub fn all() -> &'static [ResolverProvider] {
        &[
            ResolverProvider::System,
            ResolverProvider::Google,
            ResolverProvider::Cloudflare,
            ResolverProvider::Quad9,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResolverProvider::System => "system",
            ResolverProvider::Google => "google",
            ResolverProvider::Cloudflare => "cloudflare",
            ResolverProvider::Quad9 => "quad9",
        }
    }
}

impl fmt::Display for ResolverProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ResolverProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ResolverProvider::all()
            .iter()
            .copied()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| {
                format!(
                    "Unknown resolver '{}'. Expected one of: system, google, cloudflare, quad9",
                    s.trim()
                )
            })
    }
}

/// Configuration options for the checker's transports.
///
/// The engine itself has no timeout; these values are handed to the DNS
/// resolver and the WHOIS socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Upstream DNS servers
    /// Default: system configuration
    pub resolver: ResolverProvider,

    /// Timeout for each DNS query
    /// Default: 5 seconds
    #[serde(skip)] // Don't serialize Duration directly
    pub dns_timeout: Duration,

    /// Timeout for each WHOIS socket exchange (connect + query + read)
    /// Default: 10 seconds
    #[serde(skip)]
    pub whois_timeout: Duration,

    /// Fixed WHOIS server. When unset, the server is discovered by asking
    /// the IANA root WHOIS server for the TLD's referral.
    pub whois_server: Option<String>,

    /// TCP port for WHOIS queries
    /// Default: 43
    pub whois_port: u16,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            resolver: ResolverProvider::System,
            dns_timeout: Duration::from_secs(5),
            whois_timeout: Duration::from_secs(10),
            whois_server: None,
            whois_port: 43,
        }
    }
}

impl CheckConfig {
    /// Select the upstream resolver.
    pub fn with_resolver(mut self, resolver: ResolverProvider) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the DNS query timeout.
    pub fn with_dns_timeout(mut self, timeout: Duration) -> Self {
        self.dns_timeout = timeout;
        self
    }

    /// Set the WHOIS socket timeout.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Set both the DNS and WHOIS timeouts.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_dns_timeout(timeout).with_whois_timeout(timeout)
    }

    /// Query a fixed WHOIS server instead of following the IANA referral.
    pub fn with_whois_server<S: Into<String>>(mut self, server: S) -> Self {
        self.whois_server = Some(server.into());
        self
    }
}

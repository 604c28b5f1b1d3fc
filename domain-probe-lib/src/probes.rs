//! The three availability probes run by the checker.
//!
//! Each probe owns the mapping from its transport's errors to the shared
//! `CheckStatus` set and always returns a `CheckResult`, never an error.

use crate::error::WhoisParseError;
use crate::protocols::{DnsResolver, WhoisParser, WhoisTransport};
use crate::types::{CheckKind, CheckResult, CheckStatus};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::trace;

/// One stage of the availability pipeline.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Key the result is recorded under.
    fn kind(&self) -> CheckKind;

    /// Run the probe against `domain`.
    async fn probe(&self, domain: &str) -> CheckResult;

    /// Whether `result` ends the pipeline when a full run was not requested.
    fn ends_pipeline(&self, result: &CheckResult) -> bool {
        result.status() == CheckStatus::Passed
    }
}

/// Resolves A/AAAA records. Any address means the name is in use.
pub struct DnsProbe {
    resolver: Arc<dyn DnsResolver>,
}

impl DnsProbe {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Probe for DnsProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::Dns
    }

    async fn probe(&self, domain: &str) -> CheckResult {
        match self.resolver.lookup_ip(domain).await {
            Ok(addrs) => match addrs.first() {
                Some(ip) => CheckResult::failed(format!("Domain resolves to IP: {}", ip)),
                None => CheckResult::passed("No IP address found for domain"),
            },
            Err(e) if e.is_not_found() => {
                CheckResult::passed("Domain does not resolve to any IP address")
            }
            Err(e) => CheckResult::error("Unable to look up IP address", e.to_string()),
        }
    }
}

/// Resolves NS records. A delegation means the name is registered.
pub struct NsProbe {
    resolver: Arc<dyn DnsResolver>,
}

impl NsProbe {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl Probe for NsProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::Ns
    }

    async fn probe(&self, domain: &str) -> CheckResult {
        match self.resolver.lookup_ns(domain).await {
            Ok(hosts) => match hosts.first() {
                Some(host) => {
                    CheckResult::failed(format!("Domain has name servers like {}", host))
                }
                None => CheckResult::passed("No name servers found for domain"),
            },
            Err(e) if e.is_not_found() => {
                CheckResult::passed("Domain has no NS records or is unregistered")
            }
            Err(e) => CheckResult::error("Unable to look up name servers", e.to_string()),
        }
    }
}

/// Fetches and parses WHOIS data. A registrar means the name is registered.
pub struct WhoisProbe {
    transport: Arc<dyn WhoisTransport>,
    parser: WhoisParser,
}

impl WhoisProbe {
    pub fn new(transport: Arc<dyn WhoisTransport>) -> Self {
        Self {
            transport,
            parser: WhoisParser::new(),
        }
    }

    fn interpret(&self, raw: &str) -> CheckResult {
        let record = match self.parser.parse(raw) {
            Ok(record) => record,
            Err(e) if e.is_registry_verdict() => return registry_verdict(&e),
            Err(e) => return CheckResult::error("Failed to parse WHOIS data", e.to_string()),
        };

        trace!(record = ?record, "parsed WHOIS record");

        match record.registrar_name() {
            Some(name) => CheckResult::failed(format!("Registered via {}", name)),
            None => CheckResult::passed("No WHOIS record found"),
        }
    }
}

/// Result for a registry answer that carries no record.
fn registry_verdict(verdict: &WhoisParseError) -> CheckResult {
    match verdict {
        WhoisParseError::PremiumDomain => CheckResult::passed("Domain is premium or restricted"),
        WhoisParseError::ReservedDomain | WhoisParseError::BlockedDomain => {
            CheckResult::failed("Domain is reserved or blocked")
        }
        _ => CheckResult::passed("No WHOIS record found"),
    }
}

#[async_trait]
impl Probe for WhoisProbe {
    fn kind(&self) -> CheckKind {
        CheckKind::Whois
    }

    async fn probe(&self, domain: &str) -> CheckResult {
        match self.transport.fetch(domain).await {
            Ok(raw) => self.interpret(&raw),
            Err(e) => CheckResult::error("Unable to perform WHOIS lookup", e.to_string()),
        }
    }
}

//! Main domain checker implementation.
//!
//! This module provides the `DomainChecker` struct that turns three
//! unreliable lookups (DNS, NS, WHOIS) into one availability verdict.

use crate::error::DomainCheckError;
use crate::probes::{DnsProbe, NsProbe, Probe, WhoisProbe};
use crate::protocols::{DnsResolver, HickoryResolver, WhoisClient, WhoisTransport};
use crate::types::{CheckConfig, CheckResult, DomainCheckResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Main domain checker that coordinates the availability probes.
///
/// Probes run one after another in a fixed order (DNS, NS, WHOIS). The first
/// probe that finds evidence of availability ends the run, unless a full run
/// is requested. Probe failures never abort the run; they are recorded as
/// `error` results and the next probe still executes.
///
/// # Example
///
/// ```rust,no_run
/// use domain_probe_lib::DomainChecker;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let checker = DomainChecker::new()?;
///     let response = checker.check_domain("example.com", false).await;
///     println!("Available: {}", response.is_available);
///     Ok(())
/// }
/// ```
pub struct DomainChecker {
    /// Probes in pipeline order
    probes: Vec<Box<dyn Probe>>,
}

impl DomainChecker {
    /// Create a new domain checker with default configuration.
    ///
    /// Default settings:
    /// - Resolver: system configuration
    /// - DNS timeout: 5 seconds
    /// - WHOIS timeout: 10 seconds
    /// - WHOIS server: IANA referral
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError::ResolverError` if the system resolver
    /// configuration cannot be read.
    pub fn new() -> Result<Self, DomainCheckError> {
        Self::with_config(CheckConfig::default())
    }

    /// Create a new domain checker with custom configuration.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use domain_probe_lib::{CheckConfig, DomainChecker, ResolverProvider};
    /// use std::time::Duration;
    ///
    /// let config = CheckConfig::default()
    ///     .with_resolver(ResolverProvider::Cloudflare)
    ///     .with_timeout(Duration::from_secs(3));
    ///
    /// let checker = DomainChecker::with_config(config).unwrap();
    /// ```
    pub fn with_config(config: CheckConfig) -> Result<Self, DomainCheckError> {
        let resolver = HickoryResolver::from_config(&config)?;
        let whois = WhoisClient::from_config(&config);
        Ok(Self::with_backends(Arc::new(resolver), Arc::new(whois)))
    }

    /// Create a checker over caller-provided DNS and WHOIS backends.
    pub fn with_backends(resolver: Arc<dyn DnsResolver>, whois: Arc<dyn WhoisTransport>) -> Self {
        let probes: Vec<Box<dyn Probe>> = vec![
            Box::new(DnsProbe::new(Arc::clone(&resolver))),
            Box::new(NsProbe::new(resolver)),
            Box::new(WhoisProbe::new(whois)),
        ];
        Self::with_probes(probes)
    }

    /// Create a checker running exactly `probes`, in the given order.
    pub fn with_probes(probes: Vec<Box<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// Check availability of a single domain.
    ///
    /// The domain is used exactly as given; it is not validated or
    /// normalized. With `force_all` set every probe runs regardless of
    /// earlier results.
    ///
    /// This never fails: every problem is reported in the per-check status.
    /// Every probe of this checker has an entry in the returned `checks`,
    /// either its own result or a `skipped` placeholder.
    pub async fn check_domain(&self, domain: &str, force_all: bool) -> DomainCheckResponse {
        info!(domain = %domain, force_all, "checking domain");

        let mut response = DomainCheckResponse::new(domain);

        for (index, probe) in self.probes.iter().enumerate() {
            let kind = probe.kind();
            let started = Instant::now();
            let result = probe.probe(domain).await;

            debug!(
                check = kind.key(),
                status = %result.status(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "check finished"
            );

            let decisive = probe.ends_pipeline(&result);
            response.record(kind, result);

            if !decisive {
                continue;
            }

            response.is_available = true;

            // Later probes get a placeholder; with force_all they overwrite it.
            let reason = format!("{} check already indicated the domain is available", kind);
            for later in &self.probes[index + 1..] {
                response.record(later.kind(), CheckResult::skipped(reason.clone()));
            }

            if !force_all {
                debug!(check = kind.key(), "short-circuit: skipping remaining checks");
                break;
            }
        }

        info!(domain = %domain, is_available = response.is_available, "check complete");
        response
    }
}

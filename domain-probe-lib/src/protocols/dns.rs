//! DNS resolution for the DNS and NS probes.
//!
//! The probes talk to a `DnsResolver`. The default implementation wraps
//! hickory's tokio resolver, configured for a single attempt per query and
//! no answer cache, and reduces its error taxonomy to two cases: "the name
//! does not exist" (`DomainCheckError::NameNotFound`, from NXDOMAIN or an
//! empty NOERROR answer) and everything else (`DomainCheckError::ResolverError`).

use crate::error::DomainCheckError;
use crate::types::{CheckConfig, ResolverProvider};
use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use std::net::IpAddr;
use std::time::Duration;
use tracing::debug;

/// Resolver used by the DNS and NS probes.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve A and AAAA records for `domain`.
    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, DomainCheckError>;

    /// Resolve the NS record hosts for `domain`, without the trailing root dot.
    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>, DomainCheckError>;
}

/// `DnsResolver` backed by hickory-resolver.
pub struct HickoryResolver {
    resolver: TokioAsyncResolver,
    provider: ResolverProvider,
}

impl HickoryResolver {
    /// Build a resolver from the checker configuration.
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError::ResolverError` if the system resolver
    /// configuration cannot be read (only for `ResolverProvider::System`).
    pub fn from_config(config: &CheckConfig) -> Result<Self, DomainCheckError> {
        let (resolver_config, opts) = match config.resolver {
            ResolverProvider::System => {
                hickory_resolver::system_conf::read_system_conf().map_err(|e| {
                    DomainCheckError::resolver(
                        "system",
                        "config",
                        format!("Failed to read system resolver configuration: {}", e),
                    )
                })?
            }
            ResolverProvider::Google => (ResolverConfig::google(), ResolverOpts::default()),
            ResolverProvider::Cloudflare => (ResolverConfig::cloudflare(), ResolverOpts::default()),
            ResolverProvider::Quad9 => (ResolverConfig::quad9(), ResolverOpts::default()),
        };

        let opts = single_shot_opts(opts, config.dns_timeout);

        Ok(Self {
            resolver: TokioAsyncResolver::tokio(resolver_config, opts),
            provider: config.resolver,
        })
    }

    /// Which upstream this resolver was built for.
    pub fn provider(&self) -> ResolverProvider {
        self.provider
    }

    fn lookup_failed(&self, domain: &str, record_type: &str, err: ResolveError) -> DomainCheckError {
        let mapped = map_resolve_error(domain, record_type, err);
        debug!(
            provider = %self.provider,
            domain = %domain,
            record_type,
            not_found = mapped.is_not_found(),
            "DNS lookup unsuccessful"
        );
        mapped
    }
}

#[async_trait]
impl DnsResolver for HickoryResolver {
    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, DomainCheckError> {
        let lookup = self
            .resolver
            .lookup_ip(domain)
            .await
            .map_err(|e| self.lookup_failed(domain, "A/AAAA", e))?;

        Ok(lookup.iter().collect())
    }

    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>, DomainCheckError> {
        let lookup = self
            .resolver
            .ns_lookup(domain)
            .await
            .map_err(|e| self.lookup_failed(domain, "NS", e))?;

        Ok(lookup.iter().map(|ns| host_without_root(&ns.to_string())).collect())
    }
}

/// One attempt per query, no answer cache, caller-provided timeout.
fn single_shot_opts(mut opts: ResolverOpts, timeout: Duration) -> ResolverOpts {
    opts.timeout = timeout;
    opts.attempts = 1;
    opts.cache_size = 0;
    opts
}

/// Map hickory's error into the probe-level error.
///
/// hickory reports every unsuccessful rcode as `NoRecordsFound`. Only
/// NXDOMAIN and NOERROR without answers (NODATA) mean "no such host";
/// SERVFAIL, REFUSED and the rest are resolver failures.
fn map_resolve_error(domain: &str, record_type: &str, err: ResolveError) -> DomainCheckError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => match response_code {
            ResponseCode::NXDomain | ResponseCode::NoError => {
                DomainCheckError::name_not_found(domain, record_type)
            }
            code => DomainCheckError::resolver(
                domain,
                record_type,
                format!("server responded with {}", code),
            ),
        },
        ResolveErrorKind::Timeout => {
            DomainCheckError::resolver(domain, record_type, "request timed out")
        }
        _ => DomainCheckError::resolver(domain, record_type, err.to_string()),
    }
}

/// Strip the trailing root label dot from a fully qualified host name.
pub(crate) fn host_without_root(host: &str) -> String {
    host.strip_suffix('.').unwrap_or(host).to_string()
}

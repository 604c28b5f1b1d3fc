// domain-probe-lib/tests/integration.rs

//! Integration tests for domain-probe-lib: the full DNS -> NS -> WHOIS
//! pipeline over in-memory resolver and WHOIS backends.

use async_trait::async_trait;
use domain_probe_lib::{
    CheckKind, CheckStatus, DnsResolver, DomainCheckError, DomainChecker, WhoisTransport,
};
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Scripted answers for one domain, with call counters.
#[derive(Default)]
struct FakeNet {
    ip: Option<Result<Vec<IpAddr>, DomainCheckError>>,
    ns: Option<Result<Vec<String>, DomainCheckError>>,
    whois: Option<Result<String, DomainCheckError>>,
    ip_calls: AtomicUsize,
    ns_calls: AtomicUsize,
    whois_calls: AtomicUsize,
}

impl FakeNet {
    fn with_ip(mut self, ip: Result<Vec<IpAddr>, DomainCheckError>) -> Self {
        self.ip = Some(ip);
        self
    }

    fn with_ns(mut self, ns: Result<Vec<String>, DomainCheckError>) -> Self {
        self.ns = Some(ns);
        self
    }

    fn with_whois(mut self, whois: Result<String, DomainCheckError>) -> Self {
        self.whois = Some(whois);
        self
    }

    fn calls(&self) -> (usize, usize, usize) {
        (
            self.ip_calls.load(Ordering::SeqCst),
            self.ns_calls.load(Ordering::SeqCst),
            self.whois_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl DnsResolver for FakeNet {
    async fn lookup_ip(&self, domain: &str) -> Result<Vec<IpAddr>, DomainCheckError> {
        self.ip_calls.fetch_add(1, Ordering::SeqCst);
        self.ip
            .clone()
            .unwrap_or_else(|| Err(DomainCheckError::name_not_found(domain, "A/AAAA")))
    }

    async fn lookup_ns(&self, domain: &str) -> Result<Vec<String>, DomainCheckError> {
        self.ns_calls.fetch_add(1, Ordering::SeqCst);
        self.ns
            .clone()
            .unwrap_or_else(|| Err(DomainCheckError::name_not_found(domain, "NS")))
    }
}

#[async_trait]
impl WhoisTransport for FakeNet {
    async fn fetch(&self, domain: &str) -> Result<String, DomainCheckError> {
        self.whois_calls.fetch_add(1, Ordering::SeqCst);
        self.whois
            .clone()
            .unwrap_or_else(|| Ok(format!("No match for \"{}\".\n", domain.to_uppercase())))
    }
}

fn checker(net: &Arc<FakeNet>) -> DomainChecker {
    DomainChecker::with_backends(net.clone(), net.clone())
}

fn example_ip() -> IpAddr {
    "93.184.216.34".parse().unwrap()
}

fn iana_ns() -> Vec<String> {
    vec!["a.iana-servers.net".to_string(), "b.iana-servers.net".to_string()]
}

const REGISTERED_WHOIS: &str = "Domain Name: EXAMPLE.COM\r\n\
Registrar: RESERVED-Internet Assigned Numbers Authority\r\n\
Registrar IANA ID: 376\r\n\
Name Server: A.IANA-SERVERS.NET\r\n";

const NO_REGISTRAR_WHOIS: &str = "Domain Name: EXAMPLE.COM\r\nName Server: A.IANA-SERVERS.NET\r\n";

#[tokio::test]
async fn test_unregistered_domain_short_circuits_on_dns() {
    let net = Arc::new(FakeNet::default());

    let response = checker(&net).check_domain("nothing-here-12345.com", false).await;

    assert!(response.is_available);
    assert_eq!(response.status(CheckKind::Dns), Some(CheckStatus::Passed));
    assert_eq!(response.status(CheckKind::Ns), Some(CheckStatus::Skipped));
    assert_eq!(response.status(CheckKind::Whois), Some(CheckStatus::Skipped));
    assert_eq!(net.calls(), (1, 0, 0));
}

#[tokio::test]
async fn test_registered_domain_fails_every_check() {
    let net = Arc::new(
        FakeNet::default()
            .with_ip(Ok(vec![example_ip()]))
            .with_ns(Ok(iana_ns()))
            .with_whois(Ok(REGISTERED_WHOIS.to_string())),
    );

    let response = checker(&net).check_domain("example.com", false).await;

    assert!(!response.is_available);
    let dns = response.check(CheckKind::Dns).unwrap();
    assert_eq!(dns.status(), CheckStatus::Failed);
    assert!(dns.details().contains("93.184.216.34"));
    assert_eq!(response.status(CheckKind::Ns), Some(CheckStatus::Failed));
    assert_eq!(
        response.check(CheckKind::Whois).unwrap().details(),
        "Registered via RESERVED-Internet Assigned Numbers Authority"
    );
    assert_eq!(net.calls(), (1, 1, 1));
}

#[tokio::test]
async fn test_empty_ns_skips_whois() {
    let net = Arc::new(
        FakeNet::default()
            .with_ip(Ok(vec![example_ip()]))
            .with_ns(Ok(vec![])),
    );

    let response = checker(&net).check_domain("parked.example", false).await;

    assert!(response.is_available);
    assert_eq!(response.status(CheckKind::Dns), Some(CheckStatus::Failed));
    assert_eq!(response.status(CheckKind::Ns), Some(CheckStatus::Passed));
    assert_eq!(response.status(CheckKind::Whois), Some(CheckStatus::Skipped));
    assert_eq!(net.calls(), (1, 1, 0));
}

#[tokio::test]
async fn test_force_all_whois_without_registrar() {
    let net = Arc::new(
        FakeNet::default()
            .with_ip(Ok(vec![example_ip()]))
            .with_ns(Ok(iana_ns()))
            .with_whois(Ok(NO_REGISTRAR_WHOIS.to_string())),
    );

    let response = checker(&net).check_domain("example.com", true).await;

    assert!(response.is_available);
    assert_eq!(response.status(CheckKind::Dns), Some(CheckStatus::Failed));
    assert_eq!(response.status(CheckKind::Ns), Some(CheckStatus::Failed));
    assert_eq!(response.status(CheckKind::Whois), Some(CheckStatus::Passed));
}

#[tokio::test]
async fn test_dns_timeout_continues_to_ns() {
    let net = Arc::new(
        FakeNet::default()
            .with_ip(Err(DomainCheckError::resolver(
                "example.com",
                "A/AAAA",
                "request timed out",
            )))
            .with_ns(Ok(iana_ns()))
            .with_whois(Ok(REGISTERED_WHOIS.to_string())),
    );

    let response = checker(&net).check_domain("example.com", false).await;

    let dns = response.check(CheckKind::Dns).unwrap();
    assert_eq!(dns.status(), CheckStatus::Error);
    assert!(!dns.error_info().unwrap().is_empty());
    assert_eq!(response.status(CheckKind::Ns), Some(CheckStatus::Failed));
    assert!(!response.is_available);
    assert_eq!(net.calls(), (1, 1, 1));
}

#[tokio::test]
async fn test_force_all_never_leaves_skipped_results() {
    let scripts = [
        FakeNet::default(),
        FakeNet::default().with_ip(Ok(vec![example_ip()])),
        FakeNet::default()
            .with_ip(Ok(vec![example_ip()]))
            .with_ns(Ok(iana_ns()))
            .with_whois(Err(DomainCheckError::whois("example.com", "connection refused"))),
    ];

    for net in scripts {
        let net = Arc::new(net);
        let response = checker(&net).check_domain("example.com", true).await;

        assert_eq!(response.checks.len(), 3);
        for (kind, result) in &response.checks {
            assert_ne!(result.status(), CheckStatus::Skipped, "{} was skipped", kind);
        }
        assert_eq!(net.calls(), (1, 1, 1));
    }
}

#[tokio::test]
async fn test_error_info_present_only_on_error() {
    let net = Arc::new(
        FakeNet::default()
            .with_ip(Ok(vec![example_ip()]))
            .with_ns(Err(DomainCheckError::resolver("example.com", "NS", "SERVFAIL")))
            .with_whois(Ok(String::new())),
    );

    let response = checker(&net).check_domain("example.com", true).await;

    for result in response.checks.values() {
        assert_eq!(
            result.error_info().is_some(),
            result.status() == CheckStatus::Error
        );
    }
    assert_eq!(
        response.check(CheckKind::Whois).unwrap().details(),
        "Failed to parse WHOIS data"
    );
}

#[tokio::test]
async fn test_repeated_checks_are_identical() {
    let net = Arc::new(
        FakeNet::default()
            .with_ip(Ok(vec![example_ip()]))
            .with_ns(Ok(iana_ns())),
    );
    let checker = checker(&net);

    let first = checker.check_domain("example.com", false).await;
    let second = checker.check_domain("example.com", false).await;

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_domain_is_echoed_verbatim() {
    let net = Arc::new(FakeNet::default());
    let response = checker(&net).check_domain("  Odd..Name  ", false).await;
    assert_eq!(response.domain, "  Odd..Name  ");
}

#[tokio::test]
async fn test_shared_checker_across_tasks() {
    let net = Arc::new(FakeNet::default().with_ip(Ok(vec![example_ip()])));
    let checker = Arc::new(checker(&net));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let checker = Arc::clone(&checker);
            tokio::spawn(async move { checker.check_domain(&format!("d{}.example", i), false).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap();
        assert_eq!(response.status(CheckKind::Dns), Some(CheckStatus::Failed));
    }
}

#[test]
fn test_response_json_shape() {
    let net = Arc::new(FakeNet::default());
    let response =
        tokio_test::block_on(checker(&net).check_domain("nothing-here-12345.com", false));

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["domain"], "nothing-here-12345.com");
    assert_eq!(json["isAvailable"], true);
    assert_eq!(json["checks"]["dns"]["status"], "passed");
    assert_eq!(json["checks"]["ns"]["status"], "skipped");
    assert_eq!(json["checks"]["whois"]["status"], "skipped");
    assert!(json["checks"]["dns"].get("error").is_none());
}

#[tokio::test]
#[ignore] // hits real DNS and WHOIS servers
async fn test_live_registered_domain() {
    let checker = DomainChecker::new().unwrap();
    let response = checker.check_domain("example.com", true).await;
    assert_eq!(response.status(CheckKind::Dns), Some(CheckStatus::Failed));
    assert_eq!(response.status(CheckKind::Ns), Some(CheckStatus::Failed));
}

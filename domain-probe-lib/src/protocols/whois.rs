//! WHOIS protocol transport.
//!
//! This module fetches raw WHOIS text for a domain over TCP (RFC 3912).
//! Interpreting that text is the parser's job (see `whois_parser`).
//!
//! Server selection: a fixed server from the configuration, or the referral
//! that the IANA root WHOIS server gives for the domain's TLD. Exactly one
//! registry server is queried; there is no fallback to another server.

use crate::error::DomainCheckError;
use crate::types::CheckConfig;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// IANA root WHOIS server, authoritative for TLD referrals.
pub const IANA_WHOIS_SERVER: &str = "whois.iana.org";

/// Standard WHOIS port.
pub const WHOIS_PORT: u16 = 43;

/// Upper bound on the bytes read from one WHOIS response.
pub const MAX_WHOIS_RESPONSE_BYTES: u64 = 1024 * 1024;

/// Raw WHOIS text source used by the WHOIS probe.
#[async_trait]
pub trait WhoisTransport: Send + Sync {
    /// Fetch the raw WHOIS response for `domain`.
    async fn fetch(&self, domain: &str) -> Result<String, DomainCheckError>;
}

/// WHOIS client speaking the protocol directly over TCP.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Timeout for each socket exchange
    timeout: Duration,
    /// Fixed server; `None` means "ask IANA"
    server: Option<String>,
    port: u16,
    max_response_bytes: u64,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            server: None,
            port: WHOIS_PORT,
            max_response_bytes: MAX_WHOIS_RESPONSE_BYTES,
        }
    }

    /// Create a new WHOIS client from the checker configuration.
    pub fn from_config(config: &CheckConfig) -> Self {
        Self {
            timeout: config.whois_timeout,
            server: config.whois_server.clone(),
            port: config.whois_port,
            max_response_bytes: MAX_WHOIS_RESPONSE_BYTES,
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Always query `server` instead of following the IANA referral.
    pub fn with_server<S: Into<String>>(mut self, server: S) -> Self {
        self.server = Some(server.into());
        self
    }

    /// Determine the registry WHOIS server for `domain`.
    ///
    /// # Errors
    ///
    /// Returns `DomainCheckError::WhoisError` if the domain has no TLD or
    /// IANA knows no WHOIS server for it, or any transport error from the
    /// IANA query.
    pub async fn resolve_server(&self, domain: &str) -> Result<String, DomainCheckError> {
        if let Some(server) = &self.server {
            return Ok(server.clone());
        }

        let tld = extract_tld(domain).ok_or_else(|| {
            DomainCheckError::whois(domain, "Cannot determine TLD for WHOIS lookup")
        })?;

        let response = self.query(IANA_WHOIS_SERVER, &tld).await?;
        let server = parse_iana_refer_response(&response).ok_or_else(|| {
            DomainCheckError::whois(domain, format!("No WHOIS server is known for .{}", tld))
        })?;

        debug!(tld = %tld, server = %server, "IANA referral resolved");
        Ok(server)
    }

    /// Send one query to `server` and read the full response.
    ///
    /// The whole exchange (connect, write, read until the server closes)
    /// runs under the client's timeout. Anything past
    /// `MAX_WHOIS_RESPONSE_BYTES` is dropped.
    pub async fn query(&self, server: &str, query: &str) -> Result<String, DomainCheckError> {
        let exchange = async {
            let mut stream = TcpStream::connect((server, self.port)).await?;
            stream.write_all(format!("{}\r\n", query).as_bytes()).await?;

            let mut buf = Vec::new();
            (&mut stream)
                .take(self.max_response_bytes)
                .read_to_end(&mut buf)
                .await?;
            Ok::<_, std::io::Error>(buf)
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(buf)) => {
                let text = String::from_utf8_lossy(&buf).into_owned();
                debug!(server = %server, query = %query, bytes = buf.len(), "WHOIS response received");
                Ok(text)
            }
            Ok(Err(e)) => Err(DomainCheckError::whois(
                query,
                format!("Query to {}:{} failed: {}", server, self.port, e),
            )),
            Err(_) => Err(DomainCheckError::timeout(
                format!("WHOIS query to {}", server),
                self.timeout,
            )),
        }
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WhoisTransport for WhoisClient {
    async fn fetch(&self, domain: &str) -> Result<String, DomainCheckError> {
        let server = self.resolve_server(domain).await?;
        let raw = self.query(&server, domain).await?;
        trace!(domain = %domain, server = %server, raw = %raw, "raw WHOIS data");
        Ok(raw)
    }
}

/// Last label of `domain`, lowercased. `None` for names without a dot.
pub(crate) fn extract_tld(domain: &str) -> Option<String> {
    let trimmed = domain.trim().trim_end_matches('.');
    let (_, tld) = trimmed.rsplit_once('.')?;
    if tld.is_empty() {
        None
    } else {
        Some(tld.to_lowercase())
    }
}

/// Parse an IANA WHOIS response for the authoritative WHOIS server.
///
/// The IANA WHOIS response may use either `refer:` or `whois:` to indicate
/// the authoritative WHOIS server for a TLD. We check both fields, preferring
/// `refer:` when present.
///
/// ```text
/// whois:        whois.verisign-grs.com
/// refer:        whois.verisign-grs.com
/// ```
pub(crate) fn parse_iana_refer_response(response: &str) -> Option<String> {
    let mut whois_server = None;

    for line in response.lines() {
        let line = line.trim();
        if let Some(server) = line.strip_prefix("refer:") {
            let server = server.trim();
            if !server.is_empty() {
                return Some(server.to_string());
            }
        } else if let Some(server) = line.strip_prefix("whois:") {
            let server = server.trim();
            if !server.is_empty() {
                whois_server = Some(server.to_string());
            }
        }
    }

    whois_server
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    /// Serve exactly one WHOIS exchange on an ephemeral local port and return
    /// the port plus a handle yielding the query the server received.
    async fn one_shot_server(reply: &'static str) -> (u16, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 256];
            let n = socket.read(&mut buf).await.unwrap();
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });

        (port, handle)
    }

    #[test]
    fn test_parse_iana_refer_response() {
        let response = "% IANA WHOIS server\n% for more information on IANA, visit http://www.iana.org\n\nrefer:        whois.verisign-grs.com\n\ndomain:       COM\n";
        assert_eq!(
            parse_iana_refer_response(response),
            Some("whois.verisign-grs.com".to_string())
        );

        let no_refer = "% IANA WHOIS server\ndomain: TEST\nstatus: ACTIVE\n";
        assert_eq!(parse_iana_refer_response(no_refer), None);

        let empty_refer = "refer:        \ndomain: COM\n";
        assert_eq!(parse_iana_refer_response(empty_refer), None);

        let whois_field = "% IANA WHOIS server\n\nwhois:        whois.nic.io\n\ndomain:       IO\n";
        assert_eq!(
            parse_iana_refer_response(whois_field),
            Some("whois.nic.io".to_string())
        );

        let both_fields = "whois:        whois.old-server.com\nrefer:        whois.correct-server.com\n";
        assert_eq!(
            parse_iana_refer_response(both_fields),
            Some("whois.correct-server.com".to_string())
        );
    }

    #[test]
    fn test_extract_tld() {
        assert_eq!(extract_tld("example.com"), Some("com".to_string()));
        assert_eq!(extract_tld("Example.CO.UK"), Some("uk".to_string()));
        assert_eq!(extract_tld("example.org."), Some("org".to_string()));
        assert_eq!(extract_tld("localhost"), None);
        assert_eq!(extract_tld("example."), None);
    }

    #[test]
    fn test_whois_client_creation() {
        let client = WhoisClient::new();
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.port, WHOIS_PORT);
        assert!(client.server.is_none());

        let config = CheckConfig::default()
            .with_whois_timeout(Duration::from_secs(3))
            .with_whois_server("whois.nic.io");
        let client = WhoisClient::from_config(&config);
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert_eq!(client.server.as_deref(), Some("whois.nic.io"));
    }

    #[test]
    fn test_fixed_server_skips_iana() {
        let client = WhoisClient::new().with_server("whois.example.net");
        let server = tokio_test::block_on(client.resolve_server("anything.com")).unwrap();
        assert_eq!(server, "whois.example.net");
    }

    #[tokio::test]
    async fn test_fetch_from_local_server() {
        let (port, handle) = one_shot_server("Domain Name: EXAMPLE.COM\r\nRegistrar: Example Registrar\r\n").await;

        let mut client = WhoisClient::new().with_server("127.0.0.1");
        client.port = port;

        let raw = client.fetch("example.com").await.unwrap();
        assert!(raw.contains("Registrar: Example Registrar"));
        assert_eq!(handle.await.unwrap(), "example.com\r\n");
    }

    #[tokio::test]
    async fn test_oversized_response_is_truncated() {
        let (port, _handle) = one_shot_server("Domain Name: EXAMPLE.COM\r\nRegistrar: Example Registrar\r\n").await;

        let mut client = WhoisClient::new().with_server("127.0.0.1");
        client.port = port;
        client.max_response_bytes = 16;

        let raw = client.fetch("example.com").await.unwrap();
        assert_eq!(raw, "Domain Name: EXA");
    }

    #[tokio::test]
    async fn test_connection_refused_is_whois_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut client = WhoisClient::new().with_server("127.0.0.1");
        client.port = port;

        let err = client.fetch("example.com").await.unwrap_err();
        assert!(matches!(err, DomainCheckError::WhoisError { .. }));
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let _holder = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut client = WhoisClient::new()
            .with_server("127.0.0.1")
            .with_timeout(Duration::from_millis(200));
        client.port = port;

        let err = client.fetch("example.com").await.unwrap_err();
        assert!(matches!(err, DomainCheckError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_domain_without_tld_fails_before_network() {
        let client = WhoisClient::new();
        let err = client.fetch("localhost").await.unwrap_err();
        assert!(matches!(err, DomainCheckError::WhoisError { .. }));
    }

    #[tokio::test]
    #[ignore] // hits whois.iana.org
    async fn test_live_iana_referral() {
        let client = WhoisClient::new();
        let server = client.resolve_server("example.com").await.unwrap();
        assert_eq!(server, "whois.verisign-grs.com");
    }
}

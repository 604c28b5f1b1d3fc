//! Error handling for domain probing operations.
//!
//! Two error types live here. `DomainCheckError` covers transport and
//! configuration failures (resolver errors, WHOIS socket errors, bad config
//! files). `WhoisParseError` is the typed outcome of the WHOIS text parser,
//! several variants of which are availability signals rather than faults.

use std::fmt;
use std::time::Duration;

/// Main error type for domain probing operations.
///
/// None of these escape `DomainChecker::check_domain`; each probe converts
/// them into a `CheckResult` status. They are returned directly by the
/// lower-level resolver, transport and configuration APIs.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainCheckError {
    /// The resolver reported that the name does not exist or has no records
    /// of the requested type (NXDOMAIN / NODATA).
    NameNotFound {
        domain: String,
        record_type: String,
    },

    /// Any other resolver failure (timeout, SERVFAIL, refused, I/O).
    ResolverError {
        domain: String,
        record_type: String,
        message: String,
    },

    /// WHOIS transport failure (connect, write, read, no server for the TLD)
    WhoisError {
        domain: String,
        message: String,
    },

    /// Timeout errors when a transport operation takes too long
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError {
        message: String,
    },

    /// File I/O errors when reading configuration files
    FileError {
        path: String,
        message: String,
    },
}

impl DomainCheckError {
    /// Create a new "name not found" error.
    pub fn name_not_found<D: Into<String>, R: Into<String>>(domain: D, record_type: R) -> Self {
        Self::NameNotFound {
            domain: domain.into(),
            record_type: record_type.into(),
        }
    }

    /// Create a new resolver error.
    pub fn resolver<D: Into<String>, R: Into<String>, M: Into<String>>(
        domain: D,
        record_type: R,
        message: M,
    ) -> Self {
        Self::ResolverError {
            domain: domain.into(),
            record_type: record_type.into(),
            message: message.into(),
        }
    }

    /// Create a new WHOIS error.
    pub fn whois<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::WhoisError {
            domain: domain.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Check if this error is the resolver's "no such host" condition.
    ///
    /// DNS and NS probes treat this as evidence of availability, not as a
    /// failed lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NameNotFound { .. })
    }
}

impl fmt::Display for DomainCheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameNotFound {
                domain,
                record_type,
            } => {
                write!(f, "No {} records found for '{}': no such host", record_type, domain)
            }
            Self::ResolverError {
                domain,
                record_type,
                message,
            } => {
                write!(f, "{} lookup for '{}' failed: {}", record_type, domain, message)
            }
            Self::WhoisError { domain, message } => {
                write!(f, "WHOIS error for '{}': {}", domain, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
        }
    }
}

impl std::error::Error for DomainCheckError {}

/// Conditions reported by the WHOIS parser.
///
/// The first four variants describe the registry's answer and are mapped to
/// availability verdicts by the WHOIS probe. The rest mean the text could
/// not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WhoisParseError {
    /// The registry has no record of the domain
    NotFoundDomain,

    /// The domain is offered as a premium/restricted name
    PremiumDomain,

    /// The registry holds the name as reserved
    ReservedDomain,

    /// The name is blocked from registration
    BlockedDomain,

    /// The server answered with a query-rate notice instead of data
    LimitExceeded,

    /// The server returned nothing but whitespace
    EmptyResponse,

    /// The response contains no recognizable WHOIS fields
    DataInvalid { reason: String },
}

impl WhoisParseError {
    /// Whether this condition is a verdict about the domain rather than a
    /// parsing failure.
    pub fn is_registry_verdict(&self) -> bool {
        matches!(
            self,
            Self::NotFoundDomain | Self::PremiumDomain | Self::ReservedDomain | Self::BlockedDomain
        )
    }
}

impl fmt::Display for WhoisParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFoundDomain => write!(f, "whoisparser: domain is not found"),
            Self::PremiumDomain => write!(f, "whoisparser: domain is premium"),
            Self::ReservedDomain => write!(f, "whoisparser: domain is reserved to register"),
            Self::BlockedDomain => write!(f, "whoisparser: domain is blocked due to brand protection"),
            Self::LimitExceeded => write!(f, "whoisparser: domain query limit exceeded"),
            Self::EmptyResponse => write!(f, "whoisparser: empty WHOIS response"),
            Self::DataInvalid { reason } => {
                write!(f, "whoisparser: domain whois data is invalid: {}", reason)
            }
        }
    }
}

impl std::error::Error for WhoisParseError {}

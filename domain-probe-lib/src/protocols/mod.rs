//! Protocol implementations for domain probing.
//!
//! This module contains the transports the probes talk to (DNS via hickory,
//! WHOIS over TCP port 43) and the WHOIS text parser.

/// DNS resolver seam and hickory-backed implementation
pub mod dns;

/// WHOIS protocol transport
pub mod whois;

/// WHOIS response parser
pub mod whois_parser;

// Re-export commonly used functions and types
pub use dns::{DnsResolver, HickoryResolver};
pub use whois::{
    WhoisClient, WhoisTransport, IANA_WHOIS_SERVER, MAX_WHOIS_RESPONSE_BYTES, WHOIS_PORT,
};
pub use whois_parser::{parse_whois, Registrar, WhoisParser, WhoisRecord};

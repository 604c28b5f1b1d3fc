//! WHOIS response parser.
//!
//! Turns the free-form text returned by a WHOIS server into a `WhoisRecord`,
//! or reports why it could not: the registry said the name is unknown,
//! premium, reserved or blocked, or the text is not usable WHOIS data.
//!
//! Registries disagree on field names, so each record field accepts a list of
//! key spellings. Only "key: value" lines are considered; comment lines
//! (`%`, `#`) and the `>>> ... <<<` trailer are ignored.

use crate::error::WhoisParseError;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static::lazy_static! {
    static ref FIELD_LINE: Regex = Regex::new(r"^\s*([A-Za-z][A-Za-z0-9 ./_()\-]*?)\s*:\s*(.*?)\s*$")
        .expect("field line pattern is valid");
}

const DOMAIN_KEYS: &[&str] = &["domain name", "domain", "domainname", "domain_name"];
const REGISTRAR_NAME_KEYS: &[&str] = &[
    "registrar",
    "registrar name",
    "sponsoring registrar",
    "registrar organization",
    "registrar organisation",
];
const REGISTRAR_ID_KEYS: &[&str] = &["registrar iana id", "sponsoring registrar iana id"];
const REGISTRAR_URL_KEYS: &[&str] = &["registrar url", "referral url"];
const REGISTRAR_WHOIS_KEYS: &[&str] = &["registrar whois server", "whois server"];
const CREATED_KEYS: &[&str] = &[
    "creation date",
    "created",
    "created on",
    "created date",
    "registered",
    "registered on",
    "registration time",
    "domain registration date",
];
const UPDATED_KEYS: &[&str] = &[
    "updated date",
    "last updated",
    "last updated on",
    "last modified",
    "changed",
    "modified",
];
const EXPIRES_KEYS: &[&str] = &[
    "registry expiry date",
    "registrar registration expiration date",
    "expiration date",
    "expiry date",
    "expires",
    "expires on",
    "expire date",
    "paid-till",
    "expiration time",
];
const STATUS_KEYS: &[&str] = &["domain status", "status", "state"];
const NAMESERVER_KEYS: &[&str] = &["name server", "name servers", "nameserver", "nameservers", "nserver"];

const PREMIUM_PATTERNS: &[&str] = &[
    "premium domain",
    "platinum domain",
    "is a premium",
    "premium name",
];

const RESERVED_PATTERNS: &[&str] = &[
    "reserved domain",
    "reserved name",
    "reserved by the registry",
    "reserved by registry",
    "registry reserved",
    "has been reserved",
    "is reserved",
    "status: reserved",
];

const BLOCKED_PATTERNS: &[&str] = &[
    "domain is blocked",
    "blocked domain",
    "has been blocked",
    "is blocked from registration",
    "blocked due to brand protection",
    "dpml block",
];

const LIMIT_PATTERNS: &[&str] = &[
    "limit exceeded",
    "query rate",
    "too many requests",
    "exceeded the maximum",
    "quota exceeded",
    "try again later",
];

const NOT_FOUND_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "no entries found",
    "nothing found",
    "no found",
    "status: available",
    "status: free",
    "not registered",
    "has not been registered",
    "no matching record",
    "no matching entry",
    "no object found",
    "object does not exist",
    "is available for registration",
];

/// Registrar block of a WHOIS record.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Registrar {
    /// Registrar display name (may be empty when only other fields were present)
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iana_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_server: Option<String>,
}

/// Structured view of a WHOIS response for a registered (or at least known)
/// domain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WhoisRecord {
    /// Domain name as the registry spells it, lowercased
    pub domain_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar: Option<Registrar>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    /// EPP status codes (e.g. "clientTransferProhibited")
    pub status: Vec<String>,

    /// Nameserver hosts, lowercased, without trailing dot
    pub nameservers: Vec<String>,
}

impl WhoisRecord {
    /// Registrar name, if the record names one.
    pub fn registrar_name(&self) -> Option<&str> {
        self.registrar
            .as_ref()
            .map(|r| r.name.as_str())
            .filter(|name| !name.is_empty())
    }
}

/// Parser for raw WHOIS text.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhoisParser;

impl WhoisParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse raw WHOIS text.
    ///
    /// A response is usable when it names the domain. Without a domain name
    /// field the text is classified instead: premium, reserved, blocked, rate
    /// limited, not found, or invalid, checked in that order so the more
    /// specific registry notices win over a generic "not found".
    pub fn parse(&self, raw: &str) -> Result<WhoisRecord, WhoisParseError> {
        let text = raw.trim();
        if text.is_empty() {
            return Err(WhoisParseError::EmptyResponse);
        }

        let mut record = WhoisRecord::default();

        for (key, value) in field_lines(text) {
            let key = key.as_str();

            if DOMAIN_KEYS.contains(&key) {
                if record.domain_name.is_empty() && looks_like_domain(value) {
                    record.domain_name = value.trim_end_matches('.').to_lowercase();
                }
            } else if REGISTRAR_NAME_KEYS.contains(&key) {
                let registrar = record.registrar.get_or_insert_with(Registrar::default);
                if registrar.name.is_empty() {
                    registrar.name = value.to_string();
                }
            } else if REGISTRAR_ID_KEYS.contains(&key) {
                set_once(
                    &mut record.registrar.get_or_insert_with(Registrar::default).iana_id,
                    value,
                );
            } else if REGISTRAR_URL_KEYS.contains(&key) {
                set_once(
                    &mut record.registrar.get_or_insert_with(Registrar::default).url,
                    value,
                );
            } else if REGISTRAR_WHOIS_KEYS.contains(&key) {
                set_once(
                    &mut record.registrar.get_or_insert_with(Registrar::default).whois_server,
                    value,
                );
            } else if CREATED_KEYS.contains(&key) {
                set_once(&mut record.creation_date, value);
            } else if UPDATED_KEYS.contains(&key) {
                set_once(&mut record.updated_date, value);
            } else if EXPIRES_KEYS.contains(&key) {
                set_once(&mut record.expiration_date, value);
            } else if STATUS_KEYS.contains(&key) {
                // "clientTransferProhibited https://icann.org/epp#clientTransferProhibited"
                if let Some(code) = value.split_whitespace().next() {
                    push_unique(&mut record.status, code.to_string());
                }
            } else if NAMESERVER_KEYS.contains(&key) {
                if let Some(host) = value.split_whitespace().next() {
                    push_unique(
                        &mut record.nameservers,
                        host.trim_end_matches('.').to_lowercase(),
                    );
                }
            }
        }

        if record.domain_name.is_empty() {
            return Err(classify_unparsed(&text.to_lowercase()));
        }

        Ok(record)
    }
}

/// Parse raw WHOIS text with the default parser.
pub fn parse_whois(raw: &str) -> Result<WhoisRecord, WhoisParseError> {
    WhoisParser::new().parse(raw)
}

/// Non-empty "key: value" pairs, keys lowercased.
fn field_lines(text: &str) -> impl Iterator<Item = (String, &str)> {
    text.lines()
        .map(str::trim_start)
        .filter(|line| !(line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>")))
        .filter_map(|line| {
            let caps = FIELD_LINE.captures(line)?;
            let key = caps.get(1)?.as_str().to_lowercase();
            let value = caps.get(2)?.as_str();
            if value.is_empty() {
                None
            } else {
                Some((key, value))
            }
        })
}

fn classify_unparsed(lower: &str) -> WhoisParseError {
    if contains_any(lower, PREMIUM_PATTERNS) {
        WhoisParseError::PremiumDomain
    } else if contains_any(lower, RESERVED_PATTERNS) {
        WhoisParseError::ReservedDomain
    } else if contains_any(lower, BLOCKED_PATTERNS) {
        WhoisParseError::BlockedDomain
    } else if contains_any(lower, LIMIT_PATTERNS) {
        WhoisParseError::LimitExceeded
    } else if contains_any(lower, NOT_FOUND_PATTERNS) {
        WhoisParseError::NotFoundDomain
    } else {
        WhoisParseError::DataInvalid {
            reason: "no domain name field found".to_string(),
        }
    }
}

fn contains_any(haystack: &str, patterns: &[&str]) -> bool {
    patterns.iter().any(|p| haystack.contains(p))
}

fn looks_like_domain(value: &str) -> bool {
    let value = value.trim_end_matches('.');
    value.contains('.') && !value.contains(char::is_whitespace)
}

fn set_once(slot: &mut Option<String>, value: &str) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !value.is_empty() && !list.contains(&value) {
        list.push(value);
    }
}

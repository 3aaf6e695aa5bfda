//! SPF (RFC 7208) validation for `v=spf1` TXT records.

use std::fmt;
use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::messages::spf as msg;
use crate::constants::{SPF_COMMON_INCLUDES, SPF_MAX_DNS_LOOKUPS};
use crate::primitives::{is_valid_cidr, is_valid_ipv4, is_valid_ipv6};
use crate::types::{Diagnostic, DnsRecord, RecordType, ValidationContext, ValidationResult};

use super::{Rule, run_rules, validate_each};

/// Result requested when a mechanism matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpfQualifier {
    /// `+`
    #[default]
    Pass,
    /// `-`
    Fail,
    /// `~`
    SoftFail,
    /// `?`
    Neutral,
}

impl SpfQualifier {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Pass),
            '-' => Some(Self::Fail),
            '~' => Some(Self::SoftFail),
            '?' => Some(Self::Neutral),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpfMechanismType {
    All,
    Ip4,
    Ip6,
    A,
    Mx,
    Ptr,
    Exists,
    Include,
}

impl SpfMechanismType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Ip4 => "ip4",
            Self::Ip6 => "ip6",
            Self::A => "a",
            Self::Mx => "mx",
            Self::Ptr => "ptr",
            Self::Exists => "exists",
            Self::Include => "include",
        }
    }

    /// DNS lookups the mechanism costs against the RFC 7208 budget.
    pub const fn lookup_cost(self) -> u32 {
        match self {
            Self::A | Self::Mx | Self::Include | Self::Exists => 1,
            Self::Ptr => 2,
            Self::All | Self::Ip4 | Self::Ip6 => 0,
        }
    }
}

impl fmt::Display for SpfMechanismType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpfMechanismType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Self::All),
            "ip4" => Ok(Self::Ip4),
            "ip6" => Ok(Self::Ip6),
            "a" => Ok(Self::A),
            "mx" => Ok(Self::Mx),
            "ptr" => Ok(Self::Ptr),
            "exists" => Ok(Self::Exists),
            "include" => Ok(Self::Include),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpfMechanism {
    pub qualifier: SpfQualifier,
    #[serde(rename = "type")]
    pub mechanism_type: SpfMechanismType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Parsed SPF record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpfData {
    /// First token, e.g. `v=spf1`.
    pub version: String,
    /// Recognised mechanisms in record order. Modifiers and unknown terms are dropped.
    pub mechanisms: Vec<SpfMechanism>,
}

impl SpfData {
    pub fn includes(&self) -> impl Iterator<Item = &str> {
        self.mechanisms
            .iter()
            .filter(|m| m.mechanism_type == SpfMechanismType::Include)
            .filter_map(|m| m.value.as_deref())
    }

    pub fn lookup_count(&self) -> u32 {
        self.mechanisms
            .iter()
            .map(|m| m.mechanism_type.lookup_cost())
            .sum()
    }
}

/// Parse an SPF record; `None` unless the first token starts with `v=spf`.
pub fn parse_spf_record(data: &str) -> Option<SpfData> {
    let mut parts = data.split_whitespace();
    let version = parts.next().filter(|v| v.starts_with("v=spf"))?;

    let mechanisms = parts
        .filter_map(|term| {
            let mut chars = term.chars();
            let (qualifier, rest) = match chars.next().and_then(SpfQualifier::from_char) {
                Some(qualifier) => (qualifier, chars.as_str()),
                None => (SpfQualifier::default(), term),
            };
            let (name, value) = match rest.split_once(':') {
                Some((name, value)) => (name, Some(value.to_string())),
                None => (rest, None),
            };
            let mechanism_type = name.parse::<SpfMechanismType>().ok()?;
            Some(SpfMechanism {
                qualifier,
                mechanism_type,
                value,
            })
        })
        .collect();

    Some(SpfData {
        version: version.to_string(),
        mechanisms,
    })
}

/// Whether a record is an SPF policy (`TXT` starting with `v=spf1`).
pub fn is_spf_record(record: &DnsRecord) -> bool {
    record.record_type == RecordType::Txt && record.data.trim_start().starts_with("v=spf1")
}

/// Version must be `v=spf1` and the last mechanism should be `all`.
pub fn validate_spf_syntax(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let Some(spf) = parse_spf_record(&record.data) else {
        return Some(Diagnostic::error(msg::INVALID_FORMAT));
    };

    if spf.version != "v=spf1" {
        return Some(Diagnostic::error(msg::INVALID_VERSION).with_metadata("version", spf.version));
    }

    match spf.mechanisms.last() {
        Some(last) if last.mechanism_type == SpfMechanismType::All => None,
        _ => Some(Diagnostic::warning(msg::MISSING_ALL)),
    }
}

/// A domain may publish only one SPF policy. Counts over the full zone when
/// supplied, otherwise over the records under test.
pub fn validate_multiple_spf(
    _record: &DnsRecord,
    context: &ValidationContext,
) -> Option<Diagnostic> {
    let count = context
        .zone_records()
        .iter()
        .filter(|r| is_spf_record(r))
        .count();

    (count > 1).then(|| Diagnostic::error(msg::MULTIPLE_RECORDS).with_metadata("count", count))
}

/// `ip4`/`ip6` values must be an address or CIDR of the mechanism's family.
pub fn validate_ip_mechanisms(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let spf = parse_spf_record(&record.data)?;

    spf.mechanisms.iter().find_map(|mechanism| {
        let value = mechanism.value.as_deref()?;
        let (family, is_address) = match mechanism.mechanism_type {
            SpfMechanismType::Ip4 => ("IPv4", is_valid_ipv4 as fn(&str) -> bool),
            SpfMechanismType::Ip6 => ("IPv6", is_valid_ipv6 as fn(&str) -> bool),
            _ => return None,
        };
        let address = value.split('/').next().unwrap_or_default();
        let valid = if value.contains('/') {
            is_address(address) && is_valid_cidr(value)
        } else {
            is_address(value)
        };

        (!valid).then(|| {
            Diagnostic::error(format!(
                "Invalid {family} address or CIDR in SPF record: {value}"
            ))
            .with_metadata("mechanism", mechanism.mechanism_type.as_str())
            .with_metadata("value", value)
        })
    })
}

/// Informational: no well-known sender include is present.
pub fn validate_common_includes(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let spf = parse_spf_record(&record.data)?;

    let recognised = spf.includes().any(|include| {
        SPF_COMMON_INCLUDES
            .iter()
            .any(|provider| include.contains(provider))
    });
    (!recognised).then(|| Diagnostic::info(msg::NO_PROVIDER))
}

/// `ptr` is deprecated by RFC 7208 section 5.5.
pub fn validate_ptr_usage(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let spf = parse_spf_record(&record.data)?;

    spf.mechanisms
        .iter()
        .any(|m| m.mechanism_type == SpfMechanismType::Ptr)
        .then(|| Diagnostic::warning(msg::PTR_DEPRECATED))
}

/// At most ten DNS-querying mechanisms.
pub fn validate_lookup_limit(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let spf = parse_spf_record(&record.data)?;

    let count = spf.lookup_count();
    debug!("[SPF] {} lookup budget used: {count}", record.name);
    (count > SPF_MAX_DNS_LOOKUPS).then(|| {
        Diagnostic::error(format!(
            "SPF record exceeds {SPF_MAX_DNS_LOOKUPS} DNS lookup limit (found {count})"
        ))
        .with_metadata("lookups", count)
    })
}

/// SPF pipeline, in evaluation order.
pub const SPF_RULES: &[Rule] = &[
    validate_spf_syntax,
    validate_multiple_spf,
    validate_ip_mechanisms,
    validate_common_includes,
    validate_ptr_usage,
    validate_lookup_limit,
];

pub(crate) fn check(record: &DnsRecord, context: &ValidationContext) -> Vec<Diagnostic> {
    run_rules(record, context, SPF_RULES)
}

/// Validate a single SPF record.
pub fn validate_spf_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context))
}

/// Validate a set of SPF records, concatenating results in record order.
pub fn validate_spf_records(
    records: &[DnsRecord],
    context: &ValidationContext,
) -> ValidationResult {
    validate_each(records, context, validate_spf_record)
}

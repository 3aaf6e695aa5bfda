//! CAA (RFC 8659) validation.

use crate::constants::messages::caa as msg;
use crate::constants::{CAA_TAGS, KNOWN_CAS};
use crate::primitives::{is_wildcard, parse_uri};
use crate::types::{Diagnostic, DnsRecord, RecordType, ValidationContext, ValidationResult};

use super::{Rule, run_rules, validate_each};

/// Parsed CAA body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaaData {
    pub flags: u8,
    /// Lower-cased property tag.
    pub tag: String,
    /// Property value with surrounding quotes removed.
    pub value: String,
}

/// Parse `flags tag value`; `None` when a field is missing or flags is not 0-255.
pub fn parse_caa_record(data: &str) -> Option<CaaData> {
    let mut parts = data.trim().splitn(3, char::is_whitespace);
    let flags = parts.next()?.parse::<u8>().ok()?;
    let tag = parts.next()?.to_lowercase();
    let value = parts.next().unwrap_or_default().trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some(CaaData {
        flags,
        tag,
        value: value.to_string(),
    })
}

/// Tag must be a known property and flags must fit a byte.
pub fn validate_caa_tag(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    match parse_caa_record(&record.data) {
        Some(caa) if CAA_TAGS.contains(&caa.tag.as_str()) => None,
        Some(caa) => Some(Diagnostic::error(msg::INVALID_TAG).with_metadata("tag", caa.tag)),
        None => Some(Diagnostic::error(msg::INVALID_TAG)),
    }
}

/// `issue` / `issuewild` should name a well-known CA (or be empty to deny).
pub fn validate_caa_issuer(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let caa = parse_caa_record(&record.data)?;
    if caa.tag != "issue" && caa.tag != "issuewild" {
        return None;
    }

    let issuer = caa
        .value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase();
    if issuer.is_empty() || KNOWN_CAS.contains(&issuer.as_str()) {
        return None;
    }
    Some(Diagnostic::info(msg::UNKNOWN_CA).with_metadata("issuer", issuer))
}

/// `iodef` must be a `mailto:`, `http:` or `https:` URI.
pub fn validate_caa_iodef(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let caa = parse_caa_record(&record.data)?;
    if caa.tag != "iodef" {
        return None;
    }

    let valid = parse_uri(&caa.value)
        .is_some_and(|uri| matches!(uri.scheme.as_str(), "mailto" | "http" | "https"));
    (!valid).then(|| Diagnostic::error(msg::INVALID_IODEF).with_metadata("value", caa.value))
}

/// CAA pipeline, in evaluation order.
pub const CAA_RULES: &[Rule] = &[validate_caa_tag, validate_caa_issuer, validate_caa_iodef];

pub(crate) fn check(record: &DnsRecord, context: &ValidationContext) -> Vec<Diagnostic> {
    run_rules(record, context, CAA_RULES)
}

/// Wildcard names fall back to `issue` unless `issuewild` is set; flag zones
/// that restrict `issue` but leave wildcard issuance implicit.
pub(crate) fn check_coverage(context: &ValidationContext) -> Option<Diagnostic> {
    let records = context.zone_records();
    if !records.iter().any(|r| is_wildcard(&r.name)) {
        return None;
    }

    let tags: Vec<String> = records
        .iter()
        .filter(|r| r.record_type == RecordType::Caa)
        .filter_map(|r| parse_caa_record(&r.data))
        .map(|caa| caa.tag)
        .collect();
    let has_issue = tags.iter().any(|t| t == "issue");
    let has_issuewild = tags.iter().any(|t| t == "issuewild");

    (has_issue && !has_issuewild).then(|| Diagnostic::info(msg::INCOMPLETE_COVERAGE))
}

pub fn validate_caa_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context))
}

pub fn validate_caa_records(
    records: &[DnsRecord],
    context: &ValidationContext,
) -> ValidationResult {
    validate_each(records, context, validate_caa_record)
}

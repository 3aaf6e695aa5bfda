//! CNAME validation: target syntax, apex placement and RFC 1034 exclusivity.

use std::collections::BTreeSet;

use crate::constants::CNAME_COEXISTENCE_ALLOWED;
use crate::constants::messages::cname as msg;
use crate::primitives::{is_valid_domain, normalize_domain};
use crate::types::{Diagnostic, DnsRecord, RecordType, ValidationContext, ValidationResult};

use super::{Rule, run_rules, validate_each};

/// Parsed CNAME body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnameData {
    /// Lower-cased target without the trailing root dot.
    pub target: String,
}

/// Parse a CNAME body; `None` unless the target is a syntactically valid domain.
pub fn parse_cname_record(data: &str) -> Option<CnameData> {
    let target = normalize_domain(data.trim());
    if target.is_empty() || !is_valid_domain(&target) {
        return None;
    }
    Some(CnameData { target })
}

/// The body must parse and must not point back at the record's own name.
pub fn validate_cname_format(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let Some(data) = parse_cname_record(&record.data) else {
        return Some(Diagnostic::error(msg::INVALID_FORMAT));
    };

    if data.target == normalize_domain(&record.name) {
        return Some(Diagnostic::error(msg::SELF_TARGET).with_metadata("target", data.target));
    }
    None
}

/// A CNAME may not sit at the zone apex.
pub fn validate_apex_cname(record: &DnsRecord, context: &ValidationContext) -> Option<Diagnostic> {
    if normalize_domain(&record.name) == normalize_domain(&context.domain) {
        return Some(Diagnostic::error(msg::APEX_RECORD));
    }
    None
}

/// No other data may share the CNAME's owner name, DNSSEC metadata excepted.
pub fn validate_cname_coexistence(
    record: &DnsRecord,
    context: &ValidationContext,
) -> Option<Diagnostic> {
    let name = normalize_domain(&record.name);
    let conflicting: BTreeSet<&str> = context
        .all_records()
        .iter()
        .filter(|r| {
            r.record_type != RecordType::Cname
                && !CNAME_COEXISTENCE_ALLOWED.contains(&r.record_type.as_str())
                && normalize_domain(&r.name) == name
        })
        .map(|r| r.record_type.as_str())
        .collect();

    if conflicting.is_empty() {
        return None;
    }
    Some(
        Diagnostic::error(msg::COEXISTENCE)
            .with_metadata("conflictingTypes", conflicting.into_iter().collect::<Vec<_>>()),
    )
}

/// CNAME pipeline, in evaluation order.
pub const CNAME_RULES: &[Rule] = &[
    validate_cname_format,
    validate_apex_cname,
    validate_cname_coexistence,
];

pub(crate) fn check(record: &DnsRecord, context: &ValidationContext) -> Vec<Diagnostic> {
    run_rules(record, context, CNAME_RULES)
}

/// Validate a single CNAME record.
pub fn validate_cname_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context))
}

/// Validate a set of CNAME records, concatenating results in record order.
pub fn validate_cname_records(
    records: &[DnsRecord],
    context: &ValidationContext,
) -> ValidationResult {
    validate_each(records, context, validate_cname_record)
}

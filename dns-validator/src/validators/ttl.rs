//! TTL hygiene checks, enabled by `check_best_practices`.

use std::collections::BTreeMap;

use crate::constants::messages::ttl as msg;
use crate::constants::ttl::{CRITICAL_MAX, CRITICAL_MIN, MAX_RECOMMENDED, MIN_RECOMMENDED};
use crate::primitives::{format_ttl, normalize_domain};
use crate::types::{Diagnostic, DnsRecord, RecordType, ValidationContext, ValidationResult};

use super::{Rule, run_rules, validate_each};

/// Out-of-range TTLs: outside the critical bounds is an error, outside the
/// recommended window a warning.
pub fn validate_ttl_range(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let ttl = record.ttl;
    let diagnostic = if !(CRITICAL_MIN..=CRITICAL_MAX).contains(&ttl) {
        Diagnostic::error(msg::MISCONFIGURED)
            .with_metadata("recordType", record.record_type.as_str())
    } else if ttl < MIN_RECOMMENDED {
        Diagnostic::warning(msg::TOO_LOW).with_metadata("recommended", format_ttl(MIN_RECOMMENDED))
    } else if ttl > MAX_RECOMMENDED {
        Diagnostic::warning(msg::TOO_HIGH).with_metadata("recommended", format_ttl(MAX_RECOMMENDED))
    } else {
        return None;
    };
    Some(
        diagnostic
            .with_metadata("ttl", ttl)
            .with_metadata("formatted", format_ttl(ttl)),
    )
}

pub const TTL_RULES: &[Rule] = &[validate_ttl_range];

pub(crate) fn check(record: &DnsRecord, context: &ValidationContext) -> Vec<Diagnostic> {
    run_rules(record, context, TTL_RULES)
}

/// One warning per RRset (same normalised name and type) whose members
/// disagree on TTL, in order of first appearance.
pub fn check_consistency(records: &[DnsRecord]) -> Vec<Diagnostic> {
    let mut order: Vec<(String, RecordType)> = Vec::new();
    let mut ttls: BTreeMap<(String, RecordType), Vec<u32>> = BTreeMap::new();

    for record in records {
        let key = (normalize_domain(&record.name), record.record_type);
        let entry = ttls.entry(key.clone()).or_default();
        if entry.is_empty() {
            order.push(key);
        }
        entry.push(record.ttl);
    }

    order
        .into_iter()
        .filter_map(|key| {
            let values = ttls.get(&key)?;
            let min = values.iter().min()?;
            let max = values.iter().max()?;
            (min != max).then(|| {
                let (name, record_type) = key;
                Diagnostic::warning(msg::INCONSISTENT)
                    .with_metadata("name", name)
                    .with_metadata("recordType", record_type.as_str())
                    .with_metadata("ttls", values.clone())
            })
        })
        .collect()
}

pub fn validate_ttl_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context))
}

/// Per-record range checks followed by the RRset consistency check.
pub fn validate_ttl_records(
    records: &[DnsRecord],
    context: &ValidationContext,
) -> ValidationResult {
    let mut result = validate_each(records, context, validate_ttl_record);
    for diagnostic in check_consistency(records) {
        result.push(diagnostic);
    }
    result
}

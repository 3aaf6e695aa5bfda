//! MX validation: priority uniqueness, RFC 7505 null MX and unsafe targets.

use std::collections::HashSet;

use crate::constants::INTERNAL_HOST_SUFFIXES;
use crate::constants::messages::mx as msg;
use crate::primitives::{is_valid_ip, normalize_domain};
use crate::types::{Diagnostic, DnsRecord, RecordType, ValidationContext, ValidationResult};

use super::{Rule, run_rules};

/// Parsed MX body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MxData {
    pub priority: u16,
    /// Lower-cased exchange, as written (trailing dot kept).
    pub target: String,
}

/// Parse `priority target`; `None` on a wrong token count or non-integer priority.
pub fn parse_mx_record(data: &str) -> Option<MxData> {
    let parts: Vec<&str> = data.split_whitespace().collect();
    let [priority, target] = parts.as_slice() else {
        return None;
    };
    let priority = priority.parse::<u16>().ok()?;
    Some(MxData {
        priority,
        target: target.to_lowercase(),
    })
}

/// Priorities already seen while walking one MX record set.
///
/// A tracker only spans the records validated through it: a fresh tracker per
/// record (as [`validate_mx_record`] uses) never reports duplicates.
#[derive(Debug, Default)]
pub struct PriorityTracker {
    seen: HashSet<u16>,
}

impl PriorityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report the record's priority if an earlier record in this set used it.
    ///
    /// Skipped when the zone (or, without zone data, the subject set) holds at
    /// most one MX record.
    pub fn check(&mut self, record: &DnsRecord, context: &ValidationContext) -> Option<Diagnostic> {
        let mx_count = context
            .zone_records()
            .iter()
            .filter(|r| r.record_type == RecordType::Mx)
            .count();
        if mx_count <= 1 {
            return None;
        }

        let Some(mx) = parse_mx_record(&record.data) else {
            return Some(Diagnostic::error(msg::NULL_MX_FORMAT));
        };

        if !self.seen.insert(mx.priority) {
            return Some(
                Diagnostic::warning(msg::DUPLICATE_PRIORITY).with_metadata("priority", mx.priority),
            );
        }
        None
    }
}

/// Priority 0 is reserved for the null MX, whose target must be exactly `.`.
pub fn validate_null_mx(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let Some(mx) = parse_mx_record(&record.data) else {
        return Some(Diagnostic::error(msg::NULL_MX_FORMAT));
    };

    if mx.priority == 0 && mx.target != "." {
        return Some(Diagnostic::error(msg::NULL_MX_FORMAT).with_metadata("target", mx.target));
    }
    None
}

/// Flag IP literal, internal and self-referencing exchanges.
pub fn validate_deprecated_configs(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let Some(mx) = parse_mx_record(&record.data) else {
        return Some(Diagnostic::error(msg::NULL_MX_FORMAT));
    };
    let target = normalize_domain(&mx.target);

    if is_valid_ip(&target) {
        return Some(Diagnostic::error(msg::IP_TARGET).with_metadata("target", target));
    }

    if target == "localhost"
        || INTERNAL_HOST_SUFFIXES
            .iter()
            .any(|suffix| target.ends_with(suffix))
    {
        return Some(Diagnostic::warning(msg::INTERNAL_TARGET).with_metadata("target", target));
    }

    if target == normalize_domain(&record.name) {
        return Some(Diagnostic::error(msg::SELF_TARGET));
    }
    None
}

/// MX rules after the priority check, in evaluation order.
pub const MX_RULES: &[Rule] = &[validate_null_mx, validate_deprecated_configs];

pub(crate) fn check(
    record: &DnsRecord,
    context: &ValidationContext,
    tracker: &mut PriorityTracker,
) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = tracker.check(record, context).into_iter().collect();
    diagnostics.extend(run_rules(record, context, MX_RULES));
    diagnostics
}

/// Validate a single MX record.
///
/// The record is checked in isolation, so duplicate priorities against sibling
/// records are not reported; use [`validate_mx_records`] for that.
pub fn validate_mx_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context, &mut PriorityTracker::new()))
}

/// Validate a set of MX records, sharing one priority tracker across the set.
pub fn validate_mx_records(records: &[DnsRecord], context: &ValidationContext) -> ValidationResult {
    let mut tracker = PriorityTracker::new();
    ValidationResult::combine(
        records
            .iter()
            .map(|record| ValidationResult::from_diagnostics(check(record, context, &mut tracker))),
    )
}

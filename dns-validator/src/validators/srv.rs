//! SRV (RFC 2782) validation.

use crate::constants::SRV_PROTOCOLS;
use crate::constants::messages::srv as msg;
use crate::primitives::is_valid_port;
use crate::types::{Diagnostic, DnsRecord, ValidationContext, ValidationResult};

use super::{Rule, run_rules, validate_each};

/// `priority weight port target`, fields kept raw for the range rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SrvData {
    pub priority: String,
    pub weight: String,
    pub port: String,
    pub target: String,
}

/// Split an SRV body into its four fields; `None` on a wrong token count.
pub fn parse_srv_record(data: &str) -> Option<SrvData> {
    let parts: Vec<&str> = data.split_whitespace().collect();
    let [priority, weight, port, target] = parts.as_slice() else {
        return None;
    };
    Some(SrvData {
        priority: (*priority).to_string(),
        weight: (*weight).to_string(),
        port: (*port).to_string(),
        target: (*target).to_string(),
    })
}

fn invalid_format() -> Diagnostic {
    Diagnostic::error(msg::INVALID_FORMAT)
}

pub fn validate_srv_format(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    parse_srv_record(&record.data).is_none().then(invalid_format)
}

pub fn validate_srv_priority(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let Some(srv) = parse_srv_record(&record.data) else {
        return Some(invalid_format());
    };
    srv.priority.parse::<u16>().is_err().then(|| {
        Diagnostic::error(msg::INVALID_PRIORITY).with_metadata("priority", srv.priority)
    })
}

pub fn validate_srv_weight(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let Some(srv) = parse_srv_record(&record.data) else {
        return Some(invalid_format());
    };
    srv.weight
        .parse::<u16>()
        .is_err()
        .then(|| Diagnostic::error(msg::INVALID_WEIGHT).with_metadata("weight", srv.weight))
}

pub fn validate_srv_port(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let Some(srv) = parse_srv_record(&record.data) else {
        return Some(invalid_format());
    };
    (!is_valid_port(&srv.port))
        .then(|| Diagnostic::error(msg::INVALID_PORT).with_metadata("port", srv.port))
}

/// Owner name must start with `_service._proto`.
pub fn validate_srv_service(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    if parse_srv_record(&record.data).is_none() {
        return Some(invalid_format());
    }

    let mut labels = record.name.split('.');
    let service = labels.next().unwrap_or_default();
    let proto = labels.next().unwrap_or_default();

    let valid_service = service.len() > 1 && service.starts_with('_');
    let valid_proto = SRV_PROTOCOLS.contains(&proto.to_lowercase().as_str());
    (!(valid_service && valid_proto)).then(|| {
        Diagnostic::warning(msg::INVALID_SERVICE).with_metadata("name", record.name.as_str())
    })
}

/// SRV pipeline, in evaluation order.
pub const SRV_RULES: &[Rule] = &[
    validate_srv_format,
    validate_srv_priority,
    validate_srv_weight,
    validate_srv_port,
    validate_srv_service,
];

pub(crate) fn check(record: &DnsRecord, context: &ValidationContext) -> Vec<Diagnostic> {
    run_rules(record, context, SRV_RULES)
}

pub fn validate_srv_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context))
}

pub fn validate_srv_records(
    records: &[DnsRecord],
    context: &ValidationContext,
) -> ValidationResult {
    validate_each(records, context, validate_srv_record)
}

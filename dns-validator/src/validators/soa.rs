//! SOA validation: RNAME mailbox, serial range, MNAME/NS agreement and the
//! negative-caching TTL.

use chrono::NaiveDate;

use crate::constants::messages::soa as msg;
use crate::constants::soa_minimum;
use crate::primitives::{is_valid_email, normalize_domain};
use crate::types::{Diagnostic, DnsRecord, RecordType, ValidationContext, ValidationResult};

use super::{Rule, run_rules, validate_each};

const SERIAL_MAX: i64 = 4_294_967_295;

/// Parsed SOA body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoaData {
    /// Primary master nameserver.
    pub mname: String,
    /// Administrator mailbox in DNS form (`hostmaster.example.com.`).
    pub rname: String,
    pub serial: i64,
    pub refresh: i64,
    pub retry: i64,
    pub expire: i64,
    /// Negative-caching TTL.
    pub minimum: i64,
}

/// Parse `mname rname serial refresh retry expire minimum`.
///
/// `None` on a wrong token count or a non-integer numeric field.
pub fn parse_soa_record(data: &str) -> Option<SoaData> {
    let parts: Vec<&str> = data.split_whitespace().collect();
    let [mname, rname, serial, refresh, retry, expire, minimum] = parts.as_slice() else {
        return None;
    };
    Some(SoaData {
        mname: (*mname).to_string(),
        rname: (*rname).to_string(),
        serial: serial.parse().ok()?,
        refresh: refresh.parse().ok()?,
        retry: retry.parse().ok()?,
        expire: expire.parse().ok()?,
        minimum: minimum.parse().ok()?,
    })
}

/// Convert an RNAME to mailbox form: the first dot not escaped with `\`
/// becomes `@` and escaped dots in the local part are unescaped.
///
/// `None` when there is no separating dot.
pub fn rname_to_email(rname: &str) -> Option<String> {
    let rname = rname.strip_suffix('.').unwrap_or(rname);

    let mut escaped = false;
    let split = rname.char_indices().find_map(|(i, c)| match c {
        '\\' if !escaped => {
            escaped = true;
            None
        }
        '.' if !escaped => Some(i),
        _ => {
            escaped = false;
            None
        }
    })?;

    let local = rname[..split].replace("\\.", ".");
    let domain = &rname[split + 1..];
    Some(format!("{local}@{domain}"))
}

fn invalid_format() -> Diagnostic {
    Diagnostic::error(msg::INVALID_FORMAT)
}

/// RNAME must describe a valid mailbox.
pub fn validate_rname(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let Some(soa) = parse_soa_record(&record.data) else {
        return Some(invalid_format());
    };

    let Some(email) = rname_to_email(&soa.rname) else {
        return Some(Diagnostic::error(msg::RNAME_MISSING_DOMAIN));
    };
    if !is_valid_email(&email) {
        return Some(Diagnostic::error(msg::INVALID_RNAME).with_metadata("rname", soa.rname));
    }
    None
}

/// Serial must fit an unsigned 32-bit integer.
pub fn validate_serial(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let Some(soa) = parse_soa_record(&record.data) else {
        return Some(invalid_format());
    };

    if !(0..=SERIAL_MAX).contains(&soa.serial) {
        return Some(Diagnostic::error(msg::SERIAL_RANGE).with_metadata("serial", soa.serial));
    }
    None
}

/// MNAME must be one of the zone's NS targets. Requires `all_records`.
pub fn validate_primary_nameserver(
    record: &DnsRecord,
    context: &ValidationContext,
) -> Option<Diagnostic> {
    let Some(soa) = parse_soa_record(&record.data) else {
        return Some(invalid_format());
    };

    let ns_targets: Vec<String> = context
        .all_of_type(RecordType::Ns)
        .map(|ns| normalize_domain(ns.data.trim()))
        .collect();
    if ns_targets.is_empty() {
        return Some(Diagnostic::error(msg::NO_NS_RECORDS));
    }

    let mname = normalize_domain(&soa.mname);
    if !ns_targets.contains(&mname) {
        return Some(Diagnostic::error(msg::MNAME_MISMATCH).with_metadata("mname", mname));
    }
    None
}

/// RFC 2308 range for the negative-caching TTL.
pub fn validate_minimum_ttl(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let Some(soa) = parse_soa_record(&record.data) else {
        return Some(invalid_format());
    };

    if soa.minimum < soa_minimum::MIN {
        return Some(Diagnostic::warning(msg::TTL_TOO_LOW).with_metadata("minimum", soa.minimum));
    }
    if soa.minimum > soa_minimum::MAX {
        return Some(Diagnostic::warning(msg::TTL_TOO_HIGH).with_metadata("minimum", soa.minimum));
    }
    None
}

/// Advisory `YYYYMMDDnn` serial check, run only in best-practice mode.
///
/// Silent on unparseable bodies; the main pipeline already reports those.
pub fn validate_serial_format(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let soa = parse_soa_record(&record.data)?;
    let serial = soa.serial.to_string();

    if serial.len() != 10 || !serial.bytes().all(|b| b.is_ascii_digit()) {
        return Some(Diagnostic::info(msg::INVALID_SERIAL).with_metadata("serial", soa.serial));
    }

    let field = |range: std::ops::Range<usize>| serial[range].parse::<u32>().ok();
    let date = match (field(0..4), field(4..6), field(6..8)) {
        (Some(year), Some(month), Some(day)) => {
            i32::try_from(year).ok().and_then(|y| NaiveDate::from_ymd_opt(y, month, day))
        }
        _ => None,
    };
    if date.is_none() {
        return Some(
            Diagnostic::warning(msg::INVALID_SERIAL_DATE).with_metadata("serial", soa.serial),
        );
    }
    None
}

/// SOA pipeline, in evaluation order.
pub const SOA_RULES: &[Rule] = &[
    validate_rname,
    validate_serial,
    validate_primary_nameserver,
    validate_minimum_ttl,
];

pub(crate) fn check(record: &DnsRecord, context: &ValidationContext) -> Vec<Diagnostic> {
    run_rules(record, context, SOA_RULES)
}

/// A zone carries exactly one SOA.
pub(crate) fn check_multiple(count: usize) -> Option<Diagnostic> {
    (count > 1).then(|| Diagnostic::error(msg::MULTIPLE_RECORDS).with_metadata("count", count))
}

/// Validate a single SOA record.
pub fn validate_soa_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context))
}

/// Validate a set of SOA records; more than one is itself an error.
pub fn validate_soa_records(
    records: &[DnsRecord],
    context: &ValidationContext,
) -> ValidationResult {
    let mut result = validate_each(records, context, validate_soa_record);
    if let Some(diagnostic) = check_multiple(records.len()) {
        result.push(diagnostic);
    }
    result
}

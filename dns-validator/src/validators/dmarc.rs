//! DMARC (RFC 7489) validation for `_dmarc` TXT records.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::messages::dmarc as msg;
use crate::constants::{DMARC_MAX_RUA, DMARC_RI_MAX, DMARC_RI_MIN};
use crate::primitives::{normalize_domain, parse_dns_key_value, parse_leading_int, parse_uri};
use crate::types::{Diagnostic, DnsRecord, RecordType, ValidationContext, ValidationResult};

use super::spf::is_spf_record;
use super::{Rule, run_rules, validate_each};

/// Requested handling of failing mail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DmarcPolicy {
    None,
    Quarantine,
    Reject,
}

impl fmt::Display for DmarcPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Quarantine => write!(f, "quarantine"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl FromStr for DmarcPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "quarantine" => Ok(Self::Quarantine),
            "reject" => Ok(Self::Reject),
            _ => Err(()),
        }
    }
}

/// Identifier alignment mode for `aspf` / `adkim`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlignmentMode {
    #[serde(rename = "r")]
    Relaxed,
    #[serde(rename = "s")]
    Strict,
}

impl FromStr for AlignmentMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::Relaxed),
            "s" => Ok(Self::Strict),
            _ => Err(()),
        }
    }
}

/// Parsed DMARC record. Tag values are kept raw so that rules can report
/// invalid ones; use the accessors for typed views.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DmarcData {
    pub version: String,
    /// `p`
    pub policy: Option<String>,
    /// `sp`
    pub subdomain_policy: Option<String>,
    pub pct: Option<i64>,
    pub rua: Option<Vec<String>>,
    pub ruf: Option<Vec<String>>,
    /// Failure reporting options, colon-separated in the record.
    pub fo: Option<Vec<String>>,
    pub aspf: Option<String>,
    pub adkim: Option<String>,
    /// Aggregate report interval in seconds.
    pub ri: Option<i64>,
    /// Report formats, colon-separated in the record.
    pub rf: Option<Vec<String>>,
}

impl DmarcData {
    pub fn policy(&self) -> Option<DmarcPolicy> {
        self.policy.as_deref()?.parse().ok()
    }

    pub fn subdomain_policy(&self) -> Option<DmarcPolicy> {
        self.subdomain_policy.as_deref()?.parse().ok()
    }

    pub fn spf_alignment(&self) -> Option<AlignmentMode> {
        self.aspf.as_deref()?.parse().ok()
    }

    pub fn dkim_alignment(&self) -> Option<AlignmentMode> {
        self.adkim.as_deref()?.parse().ok()
    }
}

fn split_list(value: &str, separator: char) -> Vec<String> {
    value.split(separator).map(|s| s.trim().to_string()).collect()
}

/// Parse a DMARC record; `None` unless tag `v` is exactly `DMARC1`.
pub fn parse_dmarc_record(data: &str) -> Option<DmarcData> {
    let mut tags = parse_dns_key_value(data);
    let version = tags.remove("v").filter(|v| v == "DMARC1")?;

    Some(DmarcData {
        version,
        policy: tags.remove("p"),
        subdomain_policy: tags.remove("sp"),
        pct: tags.get("pct").and_then(|v| parse_leading_int(v)),
        rua: tags.get("rua").map(|v| split_list(v, ',')),
        ruf: tags.get("ruf").map(|v| split_list(v, ',')),
        fo: tags.get("fo").map(|v| split_list(v, ':')),
        aspf: tags.remove("aspf"),
        adkim: tags.remove("adkim"),
        ri: tags.get("ri").and_then(|v| parse_leading_int(v)),
        rf: tags.get("rf").map(|v| split_list(v, ':')),
    })
}

/// Whether a record is a DMARC policy: a TXT at `_dmarc.<domain>` or one
/// whose body starts with `v=DMARC1`.
pub fn is_dmarc_record(record: &DnsRecord, domain: &str) -> bool {
    is_domain_dmarc_record(record, domain)
        || (record.record_type == RecordType::Txt
            && record.data.trim_start().starts_with("v=DMARC1"))
}

/// Whether a record is the policy of `domain` itself, i.e. a TXT named
/// exactly `_dmarc.<domain>`. Subdomain policies do not count.
pub fn is_domain_dmarc_record(record: &DnsRecord, domain: &str) -> bool {
    record.record_type == RecordType::Txt
        && normalize_domain(&record.name) == format!("_dmarc.{}", normalize_domain(domain))
}

/// A located DMARC record must carry a body.
pub fn validate_dmarc_exists(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    record
        .data
        .trim()
        .is_empty()
        .then(|| Diagnostic::error(msg::MISSING_RECORD))
}

/// Version tag and a valid `p` tag are required.
pub fn validate_dmarc_structure(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let Some(dmarc) = parse_dmarc_record(&record.data) else {
        return Some(Diagnostic::error(msg::INVALID_FORMAT));
    };

    let Some(policy) = dmarc.policy.as_deref() else {
        return Some(Diagnostic::error(msg::MISSING_POLICY));
    };
    if policy.parse::<DmarcPolicy>().is_err() {
        return Some(Diagnostic::error(msg::INVALID_POLICY).with_metadata("policy", policy));
    }
    None
}

/// `aspf` / `adkim` must be `r` or `s`; strict alignment is flagged.
pub fn validate_alignment(record: &DnsRecord, _context: &ValidationContext) -> Option<Diagnostic> {
    let dmarc = parse_dmarc_record(&record.data)?;

    if dmarc.aspf.is_some() && dmarc.spf_alignment().is_none() {
        return Some(Diagnostic::error(msg::INVALID_ASPF));
    }
    if dmarc.adkim.is_some() && dmarc.dkim_alignment().is_none() {
        return Some(Diagnostic::error(msg::INVALID_ADKIM));
    }
    if dmarc.spf_alignment() == Some(AlignmentMode::Strict)
        || dmarc.dkim_alignment() == Some(AlignmentMode::Strict)
    {
        return Some(Diagnostic::warning(msg::STRICT_ALIGNMENT));
    }
    None
}

/// Report URI count and schemes. Reports the first problem found.
pub fn validate_reporting_uris(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let dmarc = parse_dmarc_record(&record.data)?;

    if let Some(rua) = &dmarc.rua {
        if rua.len() > DMARC_MAX_RUA {
            return Some(Diagnostic::warning(msg::TOO_MANY_RUA).with_metadata("count", rua.len()));
        }
        let invalid = rua.iter().find(|uri| {
            !parse_uri(uri).is_some_and(|u| u.scheme == "mailto" || u.scheme == "https")
        });
        if let Some(uri) = invalid {
            return Some(
                Diagnostic::error(format!("Invalid aggregate report URI format: {uri}"))
                    .with_metadata("uri", uri.as_str()),
            );
        }
    }

    if let Some(ruf) = &dmarc.ruf {
        let invalid = ruf
            .iter()
            .find(|uri| !parse_uri(uri).is_some_and(|u| u.scheme == "mailto"));
        if let Some(uri) = invalid {
            return Some(
                Diagnostic::error(format!("Forensic report URI must use mailto scheme: {uri}"))
                    .with_metadata("uri", uri.as_str()),
            );
        }
    }

    if dmarc.rua.is_none() || dmarc.ruf.is_none() {
        return Some(Diagnostic::info(msg::ENABLE_REPORTING));
    }
    None
}

/// `pct`, `sp` and `ri` ranges, and a nudge away from `p=none`.
pub fn validate_policy_settings(
    record: &DnsRecord,
    _context: &ValidationContext,
) -> Option<Diagnostic> {
    let dmarc = parse_dmarc_record(&record.data)?;

    if let Some(pct) = dmarc.pct {
        if !(0..=100).contains(&pct) {
            return Some(Diagnostic::error(msg::INVALID_PCT).with_metadata("pct", pct));
        }
        if pct < 100 {
            return Some(
                Diagnostic::warning(format!("Only {pct}% of messages are subject to filtering"))
                    .with_metadata("pct", pct),
            );
        }
    }

    if dmarc.subdomain_policy.is_some() && dmarc.subdomain_policy().is_none() {
        return Some(Diagnostic::error(msg::INVALID_SUBDOMAIN_POLICY));
    }

    if let Some(ri) = dmarc.ri
        && !(DMARC_RI_MIN..=DMARC_RI_MAX).contains(&ri)
    {
        return Some(Diagnostic::warning(msg::INVALID_INTERVAL).with_metadata("ri", ri));
    }

    if dmarc.policy() == Some(DmarcPolicy::None) {
        return Some(Diagnostic::info(msg::STRICTER_POLICY));
    }
    None
}

/// DMARC pipeline, in evaluation order.
pub const DMARC_RULES: &[Rule] = &[
    validate_dmarc_exists,
    validate_dmarc_structure,
    validate_alignment,
    validate_reporting_uris,
    validate_policy_settings,
];

pub(crate) fn check(record: &DnsRecord, context: &ValidationContext) -> Vec<Diagnostic> {
    run_rules(record, context, DMARC_RULES)
}

/// At most one DMARC policy per domain.
pub(crate) fn check_multiple(count: usize) -> Option<Diagnostic> {
    (count > 1).then(|| Diagnostic::error(msg::DUPLICATE_RECORD).with_metadata("count", count))
}

/// A zone that sends mail (MX or SPF among the records under test) should
/// publish a DMARC policy at `_dmarc.<domain>`.
pub(crate) fn check_missing(context: &ValidationContext) -> Option<Diagnostic> {
    let sends_mail = context
        .records
        .iter()
        .any(|r| r.record_type == RecordType::Mx || is_spf_record(r));
    if !sends_mail {
        return None;
    }

    let has_dmarc = context
        .zone_records()
        .iter()
        .any(|r| is_domain_dmarc_record(r, &context.domain));
    (!has_dmarc).then(|| Diagnostic::warning(msg::MISSING_RECORD))
}

/// Validate a single DMARC record.
pub fn validate_dmarc_record(record: &DnsRecord, context: &ValidationContext) -> ValidationResult {
    ValidationResult::from_diagnostics(check(record, context))
}

/// Validate a set of DMARC records; more than one is itself an error.
pub fn validate_dmarc_records(
    records: &[DnsRecord],
    context: &ValidationContext,
) -> ValidationResult {
    let mut result = validate_each(records, context, validate_dmarc_record);
    if let Some(diagnostic) = check_multiple(records.len()) {
        result.push(diagnostic);
    }
    result
}

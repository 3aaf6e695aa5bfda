//! Public types consumed and produced by the validation engine.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ValidatorError, ValidatorResult};
use crate::primitives::{slugify, unquote_txt};

/// DNS record type understood by the engine.
///
/// The DNSSEC types are carried so that zone data containing signatures can be
/// fed in unchanged; no validator targets them directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// IPv4 address record.
    A,
    /// Name server record.
    Ns,
    /// Canonical name (alias) record.
    Cname,
    /// Start of authority record.
    Soa,
    /// Mail exchange record.
    Mx,
    /// Text record (SPF, DMARC and other policies).
    Txt,
    /// IPv6 address record.
    Aaaa,
    /// Service locator record.
    Srv,
    /// Certificate Authority Authorization record.
    Caa,
    /// DNSSEC signature.
    Rrsig,
    /// DNSSEC authenticated denial.
    Nsec,
    /// DNSSEC hashed authenticated denial.
    Nsec3,
    /// DNSSEC public key.
    Dnskey,
}

impl RecordType {
    /// Every supported type, in IANA code order.
    pub const ALL: [Self; 13] = [
        Self::A,
        Self::Ns,
        Self::Cname,
        Self::Soa,
        Self::Mx,
        Self::Txt,
        Self::Aaaa,
        Self::Srv,
        Self::Rrsig,
        Self::Nsec,
        Self::Dnskey,
        Self::Nsec3,
        Self::Caa,
    ];

    /// IANA numeric type code, as found in the `type` field of DoH answers.
    pub const fn code(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Ns => 2,
            Self::Cname => 5,
            Self::Soa => 6,
            Self::Mx => 15,
            Self::Txt => 16,
            Self::Aaaa => 28,
            Self::Srv => 33,
            Self::Rrsig => 46,
            Self::Nsec => 47,
            Self::Dnskey => 48,
            Self::Nsec3 => 50,
            Self::Caa => 257,
        }
    }

    /// Reverse of [`code`](Self::code).
    pub fn from_code(code: u16) -> ValidatorResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(ValidatorError::UnknownTypeCode(code))
    }

    /// Upper-case mnemonic (`"CNAME"`, `"NSEC3"`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Ns => "NS",
            Self::Cname => "CNAME",
            Self::Soa => "SOA",
            Self::Mx => "MX",
            Self::Txt => "TXT",
            Self::Aaaa => "AAAA",
            Self::Srv => "SRV",
            Self::Caa => "CAA",
            Self::Rrsig => "RRSIG",
            Self::Nsec => "NSEC",
            Self::Nsec3 => "NSEC3",
            Self::Dnskey => "DNSKEY",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = ValidatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| ValidatorError::UnsupportedRecordType(s.to_string()))
    }
}

/// A single already-fetched DNS record.
///
/// `data` is the raw, type-specific body, e.g. `"10 mail.example.com."` for MX.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// Record type.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Owner name.
    pub name: String,
    /// Time-to-live in seconds.
    pub ttl: u32,
    /// Raw record body.
    pub data: String,
}

impl DnsRecord {
    pub fn new(
        record_type: RecordType,
        name: impl Into<String>,
        ttl: u32,
        data: impl Into<String>,
    ) -> Self {
        Self {
            record_type,
            name: name.into(),
            ttl,
            data: data.into(),
        }
    }
}

/// Input of a validation call: the zone apex, the records under test and,
/// optionally, the full zone for cross-record checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationContext {
    /// Zone apex (e.g. `"example.com"`).
    pub domain: String,
    /// Records under test, in caller order.
    pub records: Vec<DnsRecord>,
    /// Full zone contents used by cross-record rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_records: Option<Vec<DnsRecord>>,
}

impl ValidationContext {
    pub fn new(domain: impl Into<String>, records: Vec<DnsRecord>) -> Self {
        Self {
            domain: domain.into(),
            records,
            all_records: None,
        }
    }

    #[must_use]
    pub fn with_all_records(mut self, all_records: Vec<DnsRecord>) -> Self {
        self.all_records = Some(all_records);
        self
    }

    /// Full-zone records, or an empty slice when none were supplied.
    pub fn all_records(&self) -> &[DnsRecord] {
        self.all_records.as_deref().unwrap_or_default()
    }

    /// Full-zone records when supplied, otherwise the records under test.
    pub fn zone_records(&self) -> &[DnsRecord] {
        self.all_records.as_deref().unwrap_or(&self.records)
    }

    /// Full-zone records of one type.
    pub fn all_of_type(&self, record_type: RecordType) -> impl Iterator<Item = &DnsRecord> {
        self.all_records()
            .iter()
            .filter(move |r| r.record_type == record_type)
    }
}

/// Diagnostic severity. Only [`Error`](Self::Error) affects validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

/// A single finding produced by a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    /// Slug derived from `message` (lower-cased, whitespace runs replaced by `_`).
    ///
    /// Not a stable identifier: editing a message changes its code.
    pub code: String,
    /// Human-readable message.
    pub message: String,
    /// Severity bucket.
    pub severity: Severity,
    /// Rule-specific structured context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, serde_json::Value>>,
    /// Index of the offending record in the validated set, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_index: Option<usize>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        let message = message.into();
        Self {
            code: slugify(&message),
            message,
            severity,
            metadata: None,
            record_index: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Warning)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, Severity::Info)
    }

    /// Attach one metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata
            .get_or_insert_with(BTreeMap::new)
            .insert(key.to_string(), value.into());
        self
    }

    #[must_use]
    pub fn at_record(mut self, index: usize) -> Self {
        self.record_index = Some(index);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Outcome of validating one record or a set of records.
///
/// `is_valid` holds iff `errors` is empty; warnings and info never affect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    /// Warning- and info-severity diagnostics, in production order.
    pub warnings: Vec<Diagnostic>,
    /// Error-severity diagnostics, in production order.
    pub errors: Vec<Diagnostic>,
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self {
            is_valid: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }
}

impl ValidationResult {
    /// Bucket diagnostics by severity, preserving their order.
    pub fn from_diagnostics(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        let mut result = Self::default();
        for diagnostic in diagnostics {
            result.push(diagnostic);
        }
        result
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.errors.push(diagnostic);
            self.is_valid = false;
        } else {
            self.warnings.push(diagnostic);
        }
    }

    /// Concatenate per-record results in the given order.
    ///
    /// Identical diagnostics from different records are all kept.
    pub fn combine(results: impl IntoIterator<Item = Self>) -> Self {
        let mut combined = Self::default();
        for result in results {
            combined.is_valid &= result.is_valid;
            combined.warnings.extend(result.warnings);
            combined.errors.extend(result.errors);
        }
        combined
    }

    /// All diagnostics, errors first, then warnings/info.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.errors.iter().chain(self.warnings.iter())
    }

    /// Number of diagnostics of the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Whether any diagnostic carries the given message.
    pub fn has_message(&self, message: &str) -> bool {
        self.diagnostics().any(|d| d.message == message)
    }
}

/// One answer of a DNS-over-HTTPS JSON response (`application/dns-json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DohAnswer {
    pub name: String,
    /// Numeric record type.
    #[serde(rename = "type")]
    pub record_type: u16,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub data: String,
}

impl TryFrom<DohAnswer> for DnsRecord {
    type Error = ValidatorError;

    fn try_from(answer: DohAnswer) -> Result<Self, Self::Error> {
        let record_type = RecordType::from_code(answer.record_type)?;
        let data = if record_type == RecordType::Txt {
            unquote_txt(&answer.data)
        } else {
            answer.data
        };
        Ok(Self {
            record_type,
            name: answer.name,
            ttl: answer.ttl,
            data,
        })
    }
}

/// The parts of a DoH JSON response the engine consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DohResponse {
    /// DNS response code (0 = NOERROR).
    #[serde(rename = "Status")]
    pub status: u32,
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohAnswer>,
}

impl DohResponse {
    pub fn from_json(json: &str) -> ValidatorResult<Self> {
        serde_json::from_str(json).map_err(|e| ValidatorError::InvalidAnswer(e.to_string()))
    }

    /// Convert every answer into a [`DnsRecord`], skipping types the engine
    /// does not know.
    pub fn into_records(self) -> Vec<DnsRecord> {
        self.answer
            .into_iter()
            .filter_map(|answer| {
                let name = answer.name.clone();
                match DnsRecord::try_from(answer) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        log::warn!("[DOH] Skipping answer for {name}: {e}");
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    // ==================== RecordType tests ====================

    #[test]
    fn test_record_type_from_str() {
        assert_eq!("mx".parse::<RecordType>().unwrap(), RecordType::Mx);
        assert_eq!("AAAA".parse::<RecordType>().unwrap(), RecordType::Aaaa);
        assert_eq!(" nsec3 ".parse::<RecordType>().unwrap(), RecordType::Nsec3);
        assert!(matches!(
            "PTR".parse::<RecordType>(),
            Err(ValidatorError::UnsupportedRecordType(_))
        ));
    }

    #[test]
    fn test_record_type_codes() {
        assert_eq!(RecordType::Mx.code(), 15);
        assert_eq!(RecordType::Caa.code(), 257);
        assert_eq!(RecordType::from_code(16).unwrap(), RecordType::Txt);
        assert_eq!(RecordType::from_code(46).unwrap(), RecordType::Rrsig);
        assert_eq!(
            RecordType::from_code(12),
            Err(ValidatorError::UnknownTypeCode(12))
        );
        for t in RecordType::ALL {
            assert_eq!(RecordType::from_code(t.code()).unwrap(), t);
        }
    }

    #[test]
    fn test_record_type_serde_mnemonic() {
        let json = serde_json::to_string(&RecordType::Cname).unwrap();
        assert_eq!(json, "\"CNAME\"");
        let t: RecordType = serde_json::from_str("\"NSEC3\"").unwrap();
        assert_eq!(t, RecordType::Nsec3);
    }

    // ==================== Diagnostic tests ====================

    #[test]
    fn test_diagnostic_code_from_message() {
        let d = Diagnostic::error("Invalid SOA record format");
        assert_eq!(d.code, "invalid_soa_record_format");
        assert_eq!(d.severity, Severity::Error);
        assert!(d.metadata.is_none());
        assert!(d.record_index.is_none());
    }

    #[test]
    fn test_diagnostic_serialization_shape() {
        let d = Diagnostic::warning("Duplicate MX priority found")
            .with_metadata("priority", 10)
            .at_record(2);
        let json = serde_json::to_value(&d).unwrap();
        assert_eq!(json["severity"], "warning");
        assert_eq!(json["recordIndex"], 2);
        assert_eq!(json["metadata"]["priority"], 10);

        let bare = serde_json::to_value(Diagnostic::info("x")).unwrap();
        assert!(bare.get("metadata").is_none());
        assert!(bare.get("recordIndex").is_none());
    }

    // ==================== ValidationResult tests ====================

    #[test]
    fn test_result_buckets_by_severity() {
        let result = ValidationResult::from_diagnostics(vec![
            Diagnostic::info("a"),
            Diagnostic::error("b"),
            Diagnostic::warning("c"),
        ]);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        let warnings: Vec<_> = result.warnings.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(warnings, vec!["a", "c"]);
    }

    #[test]
    fn test_result_warnings_do_not_affect_validity() {
        let result = ValidationResult::from_diagnostics(vec![
            Diagnostic::warning("w"),
            Diagnostic::info("i"),
        ]);
        assert!(result.is_valid);
        assert_eq!(result.count(Severity::Warning), 1);
        assert_eq!(result.count(Severity::Info), 1);
    }

    #[test]
    fn test_combine_preserves_order_and_duplicates() {
        let first = ValidationResult::from_diagnostics(vec![Diagnostic::error("same")]);
        let second = ValidationResult::from_diagnostics(vec![Diagnostic::error("same")]);
        let third = ValidationResult::from_diagnostics(vec![Diagnostic::warning("w")]);
        let combined = ValidationResult::combine(vec![first, second, third]);
        assert!(!combined.is_valid);
        assert_eq!(combined.errors.len(), 2);
        assert_eq!(combined.warnings.len(), 1);
    }

    #[test]
    fn test_combine_empty_is_valid() {
        let combined = ValidationResult::combine(Vec::new());
        assert!(combined.is_valid);
        assert!(combined.errors.is_empty());
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(ValidationResult::default()).unwrap();
        assert_eq!(json["isValid"], true);
        assert!(json["warnings"].as_array().unwrap().is_empty());
    }

    // ==================== DoH conversion tests ====================

    #[test]
    fn test_doh_answer_into_record() {
        let answer = DohAnswer {
            name: "example.com.".to_string(),
            record_type: 15,
            ttl: 300,
            data: "10 mail.example.com.".to_string(),
        };
        let record = DnsRecord::try_from(answer).unwrap();
        assert_eq!(record.record_type, RecordType::Mx);
        assert_eq!(record.data, "10 mail.example.com.");
    }

    #[test]
    fn test_doh_txt_is_unquoted() {
        let answer = DohAnswer {
            name: "example.com.".to_string(),
            record_type: 16,
            ttl: 300,
            data: "\"v=spf1 include:_spf.google.com \" \"~all\"".to_string(),
        };
        let record = DnsRecord::try_from(answer).unwrap();
        assert_eq!(record.data, "v=spf1 include:_spf.google.com ~all");
    }

    #[test]
    fn test_doh_response_skips_unknown_types() {
        let json = r#"{
            "Status": 0, "TC": false, "RD": true, "RA": true, "AD": false, "CD": false,
            "Question": [{"name": "example.com.", "type": 255}],
            "Answer": [
                {"name": "example.com.", "type": 2, "TTL": 3600, "data": "ns1.example.com."},
                {"name": "example.com.", "type": 12, "TTL": 3600, "data": "host.example.com."}
            ]
        }"#;
        let response = DohResponse::from_json(json).unwrap();
        assert_eq!(response.status, 0);
        let records = response.into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, RecordType::Ns);
    }

    #[test]
    fn test_doh_response_without_answer() {
        let response = DohResponse::from_json(r#"{"Status": 3}"#).unwrap();
        assert!(response.into_records().is_empty());
    }

    #[test]
    fn test_doh_response_invalid_json() {
        assert!(matches!(
            DohResponse::from_json("not json"),
            Err(ValidatorError::InvalidAnswer(_))
        ));
    }

    // ==================== ValidationContext tests ====================

    #[test]
    fn test_context_all_records_default_empty() {
        let ctx = ValidationContext::new("example.com", vec![]);
        assert!(ctx.all_records().is_empty());
        let ctx = ctx.with_all_records(vec![DnsRecord::new(
            RecordType::Ns,
            "example.com",
            3600,
            "ns1.example.com",
        )]);
        assert_eq!(ctx.all_of_type(RecordType::Ns).count(), 1);
        assert_eq!(ctx.all_of_type(RecordType::Mx).count(), 0);
    }

    #[test]
    fn test_context_zone_records_fallback() {
        let mx = DnsRecord::new(RecordType::Mx, "example.com", 3600, "10 mx.example.com");
        let ctx = ValidationContext::new("example.com", vec![mx.clone()]);
        assert_eq!(ctx.zone_records(), std::slice::from_ref(&mx));
        let ctx = ctx.with_all_records(vec![]);
        assert!(ctx.zone_records().is_empty());
    }
}

//! Offline DNS record validation for DNS Orchestrator.
//!
//! Checks already-fetched records (CNAME, MX, SOA, SPF, DMARC, SRV, CAA) against
//! RFC constraints and common best practices and returns structured
//! diagnostics. No I/O is performed; callers supply the records, for example
//! from a DNS-over-HTTPS answer via [`DohResponse`].
//!
//! ```
//! use dns_validator::{DnsRecord, RecordType, ValidationContext, validate_mx_record};
//!
//! let record = DnsRecord::new(RecordType::Mx, "example.com", 3600, "0 .");
//! let context = ValidationContext::new("example.com", vec![record.clone()]);
//! assert!(validate_mx_record(&record, &context).is_valid);
//! ```

pub mod constants;
mod error;
mod options;
pub mod primitives;
mod providers;
mod types;
pub mod validators;

pub use error::{ValidatorError, ValidatorResult};
pub use options::ValidatorOptions;
pub use providers::{MailProvider, detect_mail_providers};
pub use types::{
    Diagnostic, DnsRecord, DohAnswer, DohResponse, RecordType, Severity, ValidationContext,
    ValidationResult,
};
pub use validators::caa::{validate_caa_record, validate_caa_records};
pub use validators::cname::{validate_cname_record, validate_cname_records};
pub use validators::dmarc::{validate_dmarc_record, validate_dmarc_records};
pub use validators::mx::{validate_mx_record, validate_mx_records};
pub use validators::soa::{validate_soa_record, validate_soa_records};
pub use validators::spf::{validate_spf_record, validate_spf_records};
pub use validators::srv::{validate_srv_record, validate_srv_records};
pub use validators::ttl::{validate_ttl_record, validate_ttl_records};
pub use validators::{CustomRule, Rule, ZoneValidator};

//! Per-type rule pipelines and the zone-level dispatcher.
//!
//! Every pipeline is a fixed, ordered slice of [`Rule`] functions. Each rule
//! re-parses the record body it needs and returns at most one diagnostic, so
//! a malformed body never stops the remaining rules from running.

pub mod caa;
pub mod cname;
pub mod dmarc;
pub mod mx;
pub mod soa;
pub mod spf;
pub mod srv;
pub mod ttl;

use log::debug;

use crate::options::ValidatorOptions;
use crate::types::{
    Diagnostic, DnsRecord, RecordType, Severity, ValidationContext, ValidationResult,
};

/// Calling convention shared by every built-in rule.
pub type Rule = fn(&DnsRecord, &ValidationContext) -> Option<Diagnostic>;

/// Caller-supplied rule registered on a [`ZoneValidator`].
pub type CustomRule =
    Box<dyn Fn(&DnsRecord, &ValidationContext) -> Option<Diagnostic> + Send + Sync>;

/// Run a pipeline against one record, keeping rule order.
pub(crate) fn run_rules(
    record: &DnsRecord,
    context: &ValidationContext,
    rules: &[Rule],
) -> Vec<Diagnostic> {
    let diagnostics: Vec<Diagnostic> = rules
        .iter()
        .filter_map(|rule| rule(record, context))
        .collect();
    if !diagnostics.is_empty() {
        debug!(
            "[{}] {} produced {} diagnostic(s)",
            record.record_type,
            record.name,
            diagnostics.len()
        );
    }
    diagnostics
}

/// Validate each record independently and concatenate the results in order.
pub(crate) fn validate_each(
    records: &[DnsRecord],
    context: &ValidationContext,
    validate: fn(&DnsRecord, &ValidationContext) -> ValidationResult,
) -> ValidationResult {
    ValidationResult::combine(records.iter().map(|record| validate(record, context)))
}

/// Validates a whole zone: dispatches each record to its pipeline, then runs
/// the cross-record checks.
///
/// ```
/// use dns_validator::{DnsRecord, RecordType, ValidationContext, ValidatorOptions, ZoneValidator};
///
/// let records = vec![
///     DnsRecord::new(RecordType::Mx, "example.com", 3600, "10 mail.example.com."),
///     DnsRecord::new(RecordType::Txt, "_dmarc.example.com", 3600, "v=DMARC1; p=reject"),
/// ];
/// let context = ValidationContext::new("example.com", records);
/// let result = ZoneValidator::new(ValidatorOptions::default()).validate(&context);
/// assert!(result.is_valid);
/// ```
#[derive(Default)]
pub struct ZoneValidator {
    options: ValidatorOptions,
    custom_rules: Vec<(RecordType, CustomRule)>,
}

impl ZoneValidator {
    pub fn new(options: ValidatorOptions) -> Self {
        Self {
            options,
            custom_rules: Vec::new(),
        }
    }

    pub fn options(&self) -> ValidatorOptions {
        self.options
    }

    /// Register a rule that runs after the built-in checks for every record
    /// of `record_type`.
    #[must_use]
    pub fn with_custom_rule<F>(mut self, record_type: RecordType, rule: F) -> Self
    where
        F: Fn(&DnsRecord, &ValidationContext) -> Option<Diagnostic> + Send + Sync + 'static,
    {
        self.custom_rules.push((record_type, Box::new(rule)));
        self
    }

    /// Validate `context.records` in order.
    ///
    /// Per-record diagnostics carry the record's index and come first, followed
    /// by the zone-level checks. With `strict` set, warnings become errors.
    pub fn validate(&self, context: &ValidationContext) -> ValidationResult {
        debug!(
            "[ZONE] validating {} records for {}",
            context.records.len(),
            context.domain
        );

        let mut tracker = mx::PriorityTracker::new();
        let mut diagnostics = Vec::new();
        for (index, record) in context.records.iter().enumerate() {
            diagnostics.extend(
                self.check_record(record, context, &mut tracker)
                    .into_iter()
                    .map(|d| d.at_record(index)),
            );
        }
        diagnostics.extend(self.check_zone(context));

        if self.options.strict {
            for diagnostic in &mut diagnostics {
                if diagnostic.severity == Severity::Warning {
                    diagnostic.severity = Severity::Error;
                }
            }
        }

        let result = ValidationResult::from_diagnostics(diagnostics);
        debug!(
            "[ZONE] {}: {} error(s), {} warning(s)",
            context.domain,
            result.errors.len(),
            result.warnings.len()
        );
        result
    }

    fn check_record(
        &self,
        record: &DnsRecord,
        context: &ValidationContext,
        tracker: &mut mx::PriorityTracker,
    ) -> Vec<Diagnostic> {
        let mut diagnostics = match record.record_type {
            RecordType::Cname => cname::check(record, context),
            RecordType::Mx => mx::check(record, context, tracker),
            RecordType::Soa => soa::check(record, context),
            RecordType::Txt if dmarc::is_dmarc_record(record, &context.domain) => {
                dmarc::check(record, context)
            }
            RecordType::Txt if spf::is_spf_record(record) => spf::check(record, context),
            RecordType::Srv => srv::check(record, context),
            RecordType::Caa => caa::check(record, context),
            _ => Vec::new(),
        };

        if self.options.check_best_practices {
            if record.record_type == RecordType::Soa {
                diagnostics.extend(soa::validate_serial_format(record, context));
            }
            diagnostics.extend(ttl::check(record, context));
        }

        diagnostics.extend(
            self.custom_rules
                .iter()
                .filter(|(record_type, _)| *record_type == record.record_type)
                .filter_map(|(_, rule)| rule(record, context)),
        );
        diagnostics
    }

    fn check_zone(&self, context: &ValidationContext) -> Vec<Diagnostic> {
        let records = &context.records;
        let soa_count = records
            .iter()
            .filter(|r| r.record_type == RecordType::Soa)
            .count();
        let dmarc_count = records
            .iter()
            .filter(|r| dmarc::is_domain_dmarc_record(r, &context.domain))
            .count();

        let mut diagnostics: Vec<Diagnostic> = [
            soa::check_multiple(soa_count),
            dmarc::check_multiple(dmarc_count),
            dmarc::check_missing(context),
            caa::check_coverage(context),
        ]
        .into_iter()
        .flatten()
        .collect();

        if self.options.check_best_practices {
            diagnostics.extend(ttl::check_consistency(records));
        }
        diagnostics
    }
}

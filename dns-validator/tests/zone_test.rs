//! End-to-end validation of whole zones through the public API.

#![allow(clippy::unwrap_used)]

mod common;

use common::{DOMAIN, cname, dmarc, healthy_zone, messages, mx, ns, record, soa, txt, zone_context};
use dns_validator::constants::messages as msg;
use dns_validator::{
    Diagnostic, DohResponse, RecordType, Severity, ValidationContext, ValidatorOptions,
    ZoneValidator, validate_cname_records, validate_dmarc_record, validate_mx_record,
    validate_mx_records, validate_soa_record, validate_spf_record,
};

// ==================== healthy zone tests ====================

#[test]
fn test_healthy_zone_has_no_diagnostics() {
    let context = zone_context(healthy_zone());
    for options in [
        ValidatorOptions::default(),
        ValidatorOptions::default().strict(true),
        ValidatorOptions::default().check_best_practices(true),
    ] {
        let result = ZoneValidator::new(options).validate(&context);
        assert!(result.is_valid, "{options:?}: {result:?}");
        assert!(result.warnings.is_empty(), "{options:?}: {:?}", result.warnings);
    }
}

// ==================== malformed body tests ====================

#[test]
fn test_malformed_bodies_are_errors() {
    let context = zone_context(vec![ns("ns1.example.com.")]);
    let cases = [
        mx("10"),
        mx("ten mail.example.com"),
        soa("ns1.example.com. hostmaster.example.com. 1 2 3"),
        soa("ns1.example.com. hostmaster.example.com. x 7200 3600 1209600 3600"),
        cname("www.example.com", "not a domain"),
        txt(DOMAIN, "v=spf1 ip4:999.0.2.1 -all"),
        dmarc("p=reject"),
        record(RecordType::Srv, "_sip._tcp.example.com", "10 5060 sip"),
        record(RecordType::Caa, DOMAIN, "x issue letsencrypt.org"),
    ];
    for case in cases {
        let single = ValidationContext {
            records: vec![case.clone()],
            ..context.clone()
        };
        let result = ZoneValidator::default().validate(&single);
        assert!(!result.is_valid, "{case:?}");
        assert!(result.count(Severity::Error) >= 1, "{case:?}");
    }
}

// ==================== property tests ====================

#[test]
fn test_apex_cname_exactly_once() {
    let context = ValidationContext::new(DOMAIN, vec![]);
    for target in ["target.example.net", "%%%", ""] {
        let result = validate_cname_records(&[cname("EXAMPLE.com.", target)], &context);
        let apex = result
            .errors
            .iter()
            .filter(|d| d.message == msg::cname::APEX_RECORD)
            .count();
        assert_eq!(apex, 1, "target {target:?}");
    }
}

#[test]
fn test_soa_serial_limits() {
    let context = zone_context(vec![ns("ns1.example.com.")]);
    let body = |serial: &str| {
        soa(&format!(
            "ns1.example.com. hostmaster.example.com. {serial} 7200 3600 1209600 3600"
        ))
    };
    assert!(!validate_soa_record(&body("4294967296"), &context).is_valid);
    assert!(validate_soa_record(&body("0"), &context).is_valid);
    assert!(validate_soa_record(&body("4294967295"), &context).is_valid);
}

#[test]
fn test_null_mx() {
    let context = ValidationContext::new(DOMAIN, vec![]);
    assert!(validate_mx_record(&mx("0 ."), &context).is_valid);
    assert!(!validate_mx_record(&mx("0 mail.example.com."), &context).is_valid);
}

#[test]
fn test_spf_properties() {
    let context = ValidationContext::new(DOMAIN, vec![]);

    let google = validate_spf_record(&txt(DOMAIN, "v=spf1 include:_spf.google.com ~all"), &context);
    assert!(google.errors.is_empty());
    assert_eq!(google.count(Severity::Info), 0);

    let ptr = validate_spf_record(&txt(DOMAIN, "v=spf1 ptr ~all"), &context);
    assert!(ptr.errors.is_empty());
    assert_eq!(ptr.count(Severity::Warning), 1);
    assert_eq!(
        ptr.warnings
            .iter()
            .find(|d| d.severity == Severity::Warning)
            .map(|d| d.message.as_str()),
        Some(msg::spf::PTR_DEPRECATED)
    );
}

#[test]
fn test_dmarc_too_many_rua() {
    let context = ValidationContext::new(DOMAIN, vec![]);
    let result = validate_dmarc_record(
        &dmarc("v=DMARC1; p=reject; rua=mailto:a@x.com,mailto:b@x.com,mailto:c@x.com"),
        &context,
    );
    assert!(result.is_valid);
    assert!(
        result
            .warnings
            .iter()
            .any(|d| d.severity == Severity::Warning && d.message == msg::dmarc::TOO_MANY_RUA)
    );
}

#[test]
fn test_idempotent_serialisation() {
    let context = zone_context(vec![
        mx("10 192.0.2.1"),
        mx("10 mx.example.local"),
        cname(DOMAIN, DOMAIN),
        txt(DOMAIN, "v=spf1 ip4:300.1.1.1 ptr"),
    ]);
    let validator = ZoneValidator::new(ValidatorOptions::default().check_best_practices(true));
    let first = serde_json::to_string(&validator.validate(&context)).unwrap();
    let second = serde_json::to_string(&validator.validate(&context)).unwrap();
    assert_eq!(first, second);

    let record = mx("10 192.0.2.1");
    let a = serde_json::to_string(&validate_mx_record(&record, &context)).unwrap();
    let b = serde_json::to_string(&validate_mx_record(&record, &context)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_set_results_follow_record_order() {
    let context = ValidationContext::new(DOMAIN, vec![]);
    let records = vec![mx("10 192.0.2.1"), mx("0 host.example.com"), mx("20 box.lan")];
    let result = validate_mx_records(&records, &context);
    assert_eq!(
        messages(&result),
        vec![
            msg::mx::IP_TARGET,
            msg::mx::NULL_MX_FORMAT,
            msg::mx::INTERNAL_TARGET,
        ]
    );
}

#[test]
fn test_zone_record_index_is_monotonic() {
    let context = zone_context(vec![
        cname(DOMAIN, "bad target"),
        mx("0 mail.example.com"),
        soa("bad"),
    ]);
    let result = ZoneValidator::default().validate(&context);
    let indices: Vec<usize> = result.errors.iter().filter_map(|d| d.record_index).collect();
    let mut sorted = indices.clone();
    sorted.sort_unstable();
    assert_eq!(indices, sorted);
    assert_eq!(indices.first(), Some(&0));
    assert_eq!(indices.last(), Some(&2));
}

// ==================== DoH input tests ====================

#[test]
fn test_doh_answer_round_trip_to_validation() {
    let json = r#"{
        "Status": 0,
        "Answer": [
            {"name": "example.com.", "type": 15, "TTL": 300, "data": "10 aspmx.l.google.com."},
            {"name": "example.com.", "type": 16, "TTL": 300, "data": "\"v=spf1 include:_spf.google.com ~all\""},
            {"name": "_dmarc.example.com.", "type": 16, "TTL": 300, "data": "\"v=DMARC1; p=none\""}
        ]
    }"#;
    let records = DohResponse::from_json(json).unwrap().into_records();
    assert_eq!(records.len(), 3);

    let context = zone_context(records);
    let result = ZoneValidator::default().validate(&context);
    assert!(result.is_valid, "{result:?}");
    assert!(result.has_message(msg::dmarc::STRICTER_POLICY));
    assert!(!result.has_message(msg::dmarc::MISSING_RECORD));
}

// ==================== options tests ====================

#[test]
fn test_options_from_json_drive_zone_validator() {
    let options =
        ValidatorOptions::from_json(r#"{"strict": true, "checkBestPractices": true}"#).unwrap();
    let context = zone_context(vec![
        record(RecordType::A, DOMAIN, "192.0.2.1"),
        dns_validator::DnsRecord::new(RecordType::A, "api.example.com", 120, "192.0.2.2"),
    ]);
    let result = ZoneValidator::new(options).validate(&context);
    assert!(!result.is_valid);
    let low = crate::require_some!(
        result
            .errors
            .iter()
            .find(|d| d.message == msg::ttl::TOO_LOW)
    );
    assert_eq!(low.record_index, Some(1));
}

#[test]
fn test_custom_rule_sees_context() {
    let context = zone_context(healthy_zone());
    let validator = ZoneValidator::default().with_custom_rule(RecordType::A, |record, ctx| {
        (record.name == ctx.domain).then(|| Diagnostic::info("Apex A record present"))
    });
    let result = validator.validate(&context);
    assert!(result.is_valid);
    assert_eq!(messages(&result), vec!["Apex A record present"]);
}

#[test]
fn test_zone_without_dmarc_warns() {
    let zone: Vec<_> = healthy_zone()
        .into_iter()
        .filter(|r| !r.name.starts_with("_dmarc"))
        .collect();
    let result = ZoneValidator::default().validate(&zone_context(zone));
    assert!(result.is_valid);
    assert!(result.has_message(msg::dmarc::MISSING_RECORD));
}

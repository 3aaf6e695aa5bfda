//! Shared record builders and assertion helpers for the integration tests.

#![allow(dead_code)]

use dns_validator::{DnsRecord, RecordType, ValidationContext, ValidationResult};

pub const DOMAIN: &str = "example.com";

/// Assert that an `Option` is `Some` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_some {
    ($expr:expr $(,)?) => {{
        let opt = $expr;
        assert!(opt.is_some(), "expected Some(..), got None");
        let Some(val) = opt else {
            return;
        };
        val
    }};
}

pub fn record(record_type: RecordType, name: &str, data: &str) -> DnsRecord {
    DnsRecord::new(record_type, name, 3600, data)
}

pub fn ns(target: &str) -> DnsRecord {
    record(RecordType::Ns, DOMAIN, target)
}

pub fn soa(data: &str) -> DnsRecord {
    record(RecordType::Soa, DOMAIN, data)
}

pub fn mx(data: &str) -> DnsRecord {
    record(RecordType::Mx, DOMAIN, data)
}

pub fn txt(name: &str, data: &str) -> DnsRecord {
    record(RecordType::Txt, name, data)
}

pub fn cname(name: &str, target: &str) -> DnsRecord {
    record(RecordType::Cname, name, target)
}

pub fn dmarc(data: &str) -> DnsRecord {
    txt(&format!("_dmarc.{DOMAIN}"), data)
}

/// Context whose records under test are also the full zone.
pub fn zone_context(records: Vec<DnsRecord>) -> ValidationContext {
    ValidationContext::new(DOMAIN, records.clone()).with_all_records(records)
}

/// A clean, mail-enabled zone that validates without errors.
pub fn healthy_zone() -> Vec<DnsRecord> {
    vec![
        ns("ns1.example.com."),
        ns("ns2.example.com."),
        soa("ns1.example.com. hostmaster.example.com. 2024010101 7200 3600 1209600 3600"),
        record(RecordType::A, DOMAIN, "192.0.2.10"),
        cname("www.example.com", "example.com."),
        mx("10 aspmx.l.google.com."),
        mx("20 alt1.aspmx.l.google.com."),
        txt(DOMAIN, "v=spf1 include:_spf.google.com ~all"),
        dmarc("v=DMARC1; p=reject; rua=mailto:dmarc@example.com; ruf=mailto:forensic@example.com"),
        record(RecordType::Caa, DOMAIN, "0 issue \"letsencrypt.org\""),
        record(RecordType::Srv, "_sip._tcp.example.com", "10 60 5060 sip.example.com."),
    ]
}

pub fn messages(result: &ValidationResult) -> Vec<&str> {
    result.diagnostics().map(|d| d.message.as_str()).collect()
}

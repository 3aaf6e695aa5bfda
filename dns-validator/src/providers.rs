//! Mail provider detection from SPF includes and MX targets.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::primitives::normalize_domain;
use crate::types::{DnsRecord, RecordType};
use crate::validators::mx::parse_mx_record;
use crate::validators::spf::is_spf_record;

/// Hosted mail services recognised in zone data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MailProvider {
    GoogleWorkspace,
    Microsoft365,
    AwsSes,
    Zoho,
}

struct ProviderSignature {
    provider: MailProvider,
    /// SPF terms, matched as whole whitespace-separated tokens.
    spf: &'static [&'static str],
    /// MX target fragments, matched as substrings of the normalised target.
    mx: &'static [&'static str],
}

const KNOWN_PROVIDERS: &[ProviderSignature] = &[
    ProviderSignature {
        provider: MailProvider::GoogleWorkspace,
        spf: &["include:_spf.google.com"],
        mx: &["aspmx.l.google.com"],
    },
    ProviderSignature {
        provider: MailProvider::Microsoft365,
        spf: &["include:spf.protection.outlook.com"],
        mx: &[".mail.protection.outlook.com"],
    },
    ProviderSignature {
        provider: MailProvider::AwsSes,
        spf: &["include:amazonses.com"],
        mx: &[],
    },
    ProviderSignature {
        provider: MailProvider::Zoho,
        spf: &["include:zoho.com"],
        mx: &["mx.zoho.com"],
    },
];

impl MailProvider {
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::GoogleWorkspace => "Google Workspace",
            Self::Microsoft365 => "Microsoft 365",
            Self::AwsSes => "Amazon SES",
            Self::Zoho => "Zoho Mail",
        }
    }
}

impl fmt::Display for MailProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Providers referenced by the given records, in a fixed order without duplicates.
pub fn detect_mail_providers(records: &[DnsRecord]) -> Vec<MailProvider> {
    let spf_terms: Vec<String> = records
        .iter()
        .filter(|r| is_spf_record(r))
        .flat_map(|r| r.data.split_whitespace().map(str::to_lowercase))
        .collect();
    let mx_targets: Vec<String> = records
        .iter()
        .filter(|r| r.record_type == RecordType::Mx)
        .filter_map(|r| parse_mx_record(&r.data))
        .map(|mx| normalize_domain(&mx.target))
        .collect();

    KNOWN_PROVIDERS
        .iter()
        .filter(|signature| {
            let by_spf = signature.spf.iter().any(|term| {
                spf_terms
                    .iter()
                    .any(|t| t.trim_start_matches(['+', '~', '?', '-']) == *term)
            });
            let by_mx = signature
                .mx
                .iter()
                .any(|fragment| mx_targets.iter().any(|target| target.contains(fragment)));
            by_spf || by_mx
        })
        .map(|signature| signature.provider)
        .collect()
}

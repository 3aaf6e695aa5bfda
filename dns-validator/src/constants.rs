//! Read-only tables shared by the validators: message strings, thresholds and
//! allow-lists.
//!
//! Diagnostic codes are derived from these messages, so editing a message
//! changes the code callers see.

/// TTL thresholds in seconds.
pub mod ttl {
    /// 5 minutes.
    pub const MIN_RECOMMENDED: u32 = 300;
    /// 24 hours.
    pub const MAX_RECOMMENDED: u32 = 86_400;
    /// 1 minute.
    pub const CRITICAL_MIN: u32 = 60;
    /// 1 week.
    pub const CRITICAL_MAX: u32 = 604_800;
}

/// RFC 2308 negative-caching bounds for the SOA minimum field.
pub mod soa_minimum {
    /// 15 minutes.
    pub const MIN: i64 = 900;
    /// 24 hours.
    pub const MAX: i64 = 86_400;
}

/// RFC 7208 section 4.6.4.
pub const SPF_MAX_DNS_LOOKUPS: u32 = 10;

/// Recommended maximum number of DMARC aggregate report URIs.
pub const DMARC_MAX_RUA: usize = 2;

/// Bounds for the DMARC `ri` (report interval) tag, in seconds.
pub const DMARC_RI_MIN: i64 = 3600;
pub const DMARC_RI_MAX: i64 = 86_400;

/// Record types allowed to share an owner name with a CNAME (DNSSEC metadata).
pub const CNAME_COEXISTENCE_ALLOWED: &[&str] = &["RRSIG", "NSEC", "NSEC3", "DNSKEY"];

/// Owner-name suffixes that denote non-routable mail targets.
pub const INTERNAL_HOST_SUFFIXES: &[&str] = &[".local", ".internal", ".lan"];

/// Transport labels accepted in SRV owner names.
pub const SRV_PROTOCOLS: &[&str] = &["_tcp", "_udp", "_tls", "_sctp"];

/// CAA property tags from RFC 8659 and the contact extensions.
pub const CAA_TAGS: &[&str] = &["issue", "issuewild", "iodef", "contactemail", "contactphone"];

pub mod messages {
    pub mod cname {
        pub const INVALID_FORMAT: &str =
            "Invalid CNAME record format - target must be a valid domain name";
        pub const SELF_TARGET: &str = "CNAME target cannot point to itself";
        pub const APEX_RECORD: &str =
            "CNAME record not allowed at apex/root domain - use A/AAAA records instead";
        pub const COEXISTENCE: &str =
            "CNAME record cannot coexist with other record types for the same name";
    }

    pub mod mx {
        pub const DUPLICATE_PRIORITY: &str = "Duplicate MX priority found";
        pub const NULL_MX_FORMAT: &str = "Invalid null MX format (RFC 7505)";
        pub const IP_TARGET: &str = "MX target should be a hostname, not an IP address";
        pub const INTERNAL_TARGET: &str = "MX target appears to be an internal hostname";
        pub const SELF_TARGET: &str = "MX target should not point to itself";
    }

    pub mod soa {
        pub const INVALID_FORMAT: &str = "Invalid SOA record format";
        pub const RNAME_MISSING_DOMAIN: &str = "Invalid RNAME format: missing domain part";
        pub const INVALID_RNAME: &str = "Invalid RNAME format: not a valid email address";
        pub const SERIAL_RANGE: &str = "SOA serial number must be between 0 and 4294967295";
        pub const INVALID_SERIAL: &str = "SOA serial number: recommended format is YYYYMMDDnn";
        pub const INVALID_SERIAL_DATE: &str =
            "SOA serial number: invalid date in YYYYMMDDnn format";
        pub const NO_NS_RECORDS: &str = "No NS records found to validate against SOA MNAME";
        pub const MNAME_MISMATCH: &str = "SOA MNAME must match one of the NS records";
        pub const TTL_TOO_LOW: &str = "SOA minimum TTL is less than recommended 15 minutes";
        pub const TTL_TOO_HIGH: &str = "SOA minimum TTL exceeds recommended 24 hours";
        pub const MULTIPLE_RECORDS: &str =
            "Multiple SOA records found (only one allowed per zone)";
    }

    pub mod spf {
        pub const INVALID_FORMAT: &str = "Invalid SPF record format";
        pub const INVALID_VERSION: &str = "SPF version must be 'v=spf1'";
        pub const MISSING_ALL: &str = "SPF record should end with an 'all' mechanism";
        pub const MULTIPLE_RECORDS: &str =
            "Multiple SPF records found - this may cause issues with email delivery";
        pub const NO_PROVIDER: &str = "No common email provider includes found in SPF record";
        pub const PTR_DEPRECATED: &str =
            "PTR mechanism is deprecated and not recommended for use in SPF records";
    }

    pub mod dmarc {
        pub const MISSING_RECORD: &str = "No DMARC record found at _dmarc subdomain";
        pub const INVALID_FORMAT: &str = "Invalid DMARC record format";
        pub const MISSING_POLICY: &str = "Missing required policy (p) tag";
        pub const INVALID_POLICY: &str =
            "Invalid policy value - must be 'none', 'quarantine', or 'reject'";
        pub const INVALID_ASPF: &str =
            "Invalid SPF alignment mode - must be 'r' (relaxed) or 's' (strict)";
        pub const INVALID_ADKIM: &str =
            "Invalid DKIM alignment mode - must be 'r' (relaxed) or 's' (strict)";
        pub const STRICT_ALIGNMENT: &str =
            "Strict alignment mode may cause legitimate emails to fail";
        pub const TOO_MANY_RUA: &str = "Too many aggregate report URIs (maximum 2 recommended)";
        pub const ENABLE_REPORTING: &str =
            "Consider enabling both aggregate (rua) and forensic (ruf) reporting";
        pub const INVALID_PCT: &str = "Invalid percentage - must be between 0 and 100";
        pub const INVALID_SUBDOMAIN_POLICY: &str =
            "Invalid subdomain policy - must be 'none', 'quarantine', or 'reject'";
        pub const INVALID_INTERVAL: &str = "Report interval should be between 1 hour and 24 hours";
        pub const STRICTER_POLICY: &str =
            "Consider moving to a stricter policy ('quarantine' or 'reject') once email authentication is stable";
        pub const DUPLICATE_RECORD: &str = "Multiple DMARC records found";
    }

    pub mod srv {
        pub const INVALID_FORMAT: &str = "Invalid SRV record format";
        pub const INVALID_PRIORITY: &str = "Invalid priority value";
        pub const INVALID_WEIGHT: &str = "Invalid weight value";
        pub const INVALID_PORT: &str = "Invalid port number";
        pub const INVALID_SERVICE: &str = "Invalid service/protocol combination";
    }

    pub mod caa {
        pub const INVALID_TAG: &str = "Invalid CAA tag format";
        pub const UNKNOWN_CA: &str = "Unknown Certificate Authority specified";
        pub const INVALID_IODEF: &str = "Invalid IODEF reporting configuration";
        pub const INCOMPLETE_COVERAGE: &str = "Incomplete CA coverage";
    }

    pub mod ttl {
        pub const INCONSISTENT: &str = "Inconsistent TTL values across record set";
        pub const TOO_LOW: &str = "TTL value below recommended minimum";
        pub const TOO_HIGH: &str = "TTL value exceeds recommended maximum";
        pub const MISCONFIGURED: &str = "Misconfigured TTL for record type";
    }
}

/// Third-party sender includes recognised by the SPF provider rule.
///
/// Matched as substrings of `include:` values.
pub const SPF_COMMON_INCLUDES: &[&str] = &[
    "spf.protection.outlook.com", // Microsoft 365
    "_spf.google.com",            // Google Workspace
    "amazonses.com",              // Amazon SES
    "spf.mailjet.com",            // Mailjet
    "sendgrid.net",               // SendGrid
    "msgapp.com",                 // Campaign Monitor
    "_spf.salesforce.com",        // Salesforce
    "servers.mcsv.net",           // Mailchimp
    "spf.mandrillapp.com",        // Mandrill
    "mail.zendesk.com",           // Zendesk
    "postmarkapp.com",            // Postmark
    "sparkpostmail.com",          // SparkPost
    "mailgun.org",                // Mailgun
    "customeriomail.com",         // Customer.io
    "exacttarget.com",            // Salesforce Marketing Cloud
    "sendpulse.net",              // SendPulse
    "sendinblue.com",             // Sendinblue
    "freshdesk.com",              // Freshdesk
    "helpscout.net",              // Help Scout
    "intercom.io",                // Intercom
    "zoho.in",                    // Zoho
    "outbound.sendowl.com",       // SendOwl
    "spf.constant.contact.com",   // Constant Contact
    "spf.hubspotemail.net",       // HubSpot
    "spf.smtp2go.com",            // SMTP2GO
    "spf.messagingengine.com",    // Fastmail
    "spf.moosend.com",            // Moosend
    "sp.frontapp.com",            // Front
    "spf.activecampaign.com",     // ActiveCampaign
    "mailsender.kayako.com",      // Kayako
    "spf.shopify.com",            // Shopify
    "spf.drift.com",              // Drift
    "spf.convertkit.com",         // ConvertKit
    "spf.klaviyo.com",            // Klaviyo
    "spf.drip.com",               // Drip
    "spf.returnpath.net",         // Return Path
    "_spf.protonmail.ch",         // ProtonMail
    "spf.socketlabs.com",         // SocketLabs
    "spf.mailerlite.com",         // MailerLite
    "spf.uservoice.com",          // UserVoice
];

/// Issuer domains of widely used certificate authorities.
pub const KNOWN_CAS: &[&str] = &[
    "letsencrypt.org",
    "pki.goog",
    "digicert.com",
    "sectigo.com",
    "comodoca.com",
    "globalsign.com",
    "amazon.com",
    "amazontrust.com",
    "awstrust.com",
    "amazonaws.com",
    "zerossl.com",
    "buypass.com",
    "ssl.com",
    "entrust.net",
    "godaddy.com",
    "starfieldtech.com",
    "identrust.com",
    "certum.pl",
    "harica.gr",
    "microsoft.com",
];

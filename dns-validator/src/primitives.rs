//! Primitive syntax predicates and small string helpers shared by every validator.
//!
//! All predicates are total: "not valid" is `false` / `None`, never an error.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

const IPV4_PATTERN: &str = concat!(
    r"(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])",
    r"(?:\.(?:25[0-5]|2[0-4][0-9]|1[0-9][0-9]|[1-9][0-9]|[0-9])){3}",
);

const IPV6_GROUP: &str = "[a-fA-F0-9]{1,4}";

/// All eight-group, compressed and IPv4-embedded IPv6 forms, with optional `%zone` suffix.
fn ipv6_pattern() -> String {
    let h = IPV6_GROUP;
    let v4 = IPV4_PATTERN;
    [
        format!("(?:{h}:){{7}}(?:{h}|:)"),
        format!("(?:{h}:){{6}}(?:{v4}|:{h}|:)"),
        format!("(?:{h}:){{5}}(?::{v4}|(?::{h}){{1,2}}|:)"),
        format!("(?:{h}:){{4}}(?:(?::{h}){{0,1}}:{v4}|(?::{h}){{1,3}}|:)"),
        format!("(?:{h}:){{3}}(?:(?::{h}){{0,2}}:{v4}|(?::{h}){{1,4}}|:)"),
        format!("(?:{h}:){{2}}(?:(?::{h}){{0,3}}:{v4}|(?::{h}){{1,5}}|:)"),
        format!("(?:{h}:){{1}}(?:(?::{h}){{0,4}}:{v4}|(?::{h}){{1,6}}|:)"),
        format!("(?::(?:(?::{h}){{0,5}}:{v4}|(?::{h}){{1,7}}|:))"),
    ]
    .join("|")
}

static IPV4_RE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!("^{IPV4_PATTERN}$")).ok());

static IPV6_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!("^(?:{})(?:%[0-9a-zA-Z]+)?$", ipv6_pattern())).ok()
});

/// Loose fallback: anything containing `::` followed by a digit counts as IPv6.
static IPV6_LOOSE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new("::[0-9]").ok());

static DOMAIN_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"^(?:[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?\.)+[a-zA-Z]{2,}$").ok()
});

static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@",
        r"[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?",
        r"(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    ))
    .ok()
});

static WHITESPACE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+").ok());

fn matches(re: &LazyLock<Option<Regex>>, s: &str) -> bool {
    re.as_ref().is_some_and(|re| re.is_match(s))
}

/// RFC 1035 label syntax with an alphabetic top-level label. No IDN handling.
///
/// A trailing root dot is not accepted; callers normalise first.
pub fn is_valid_domain(domain: &str) -> bool {
    matches(&DOMAIN_RE, domain)
}

/// Dotted-quad IPv4 without leading zeros.
pub fn is_valid_ipv4(ip: &str) -> bool {
    matches(&IPV4_RE, ip)
}

/// IPv6 in any textual form, with optional zone id.
///
/// Also accepts any string containing `::` followed by a digit.
pub fn is_valid_ipv6(ip: &str) -> bool {
    matches(&IPV6_RE, ip) || matches(&IPV6_LOOSE_RE, ip)
}

/// Either address family.
pub fn is_valid_ip(ip: &str) -> bool {
    is_valid_ipv4(ip) || is_valid_ipv6(ip)
}

/// `address/prefix`, prefix 0-32 for IPv4 and 0-128 for IPv6. Exactly one `/`.
pub fn is_valid_cidr(cidr: &str) -> bool {
    let Some((ip, prefix)) = cidr.split_once('/') else {
        return false;
    };
    if prefix.contains('/') {
        return false;
    }
    let Ok(prefix) = prefix.parse::<u8>() else {
        return false;
    };
    if is_valid_ipv4(ip) {
        return prefix <= 32;
    }
    if is_valid_ipv6(ip) {
        return prefix <= 128;
    }
    false
}

/// Port number in `1..=65535`.
pub fn is_valid_port(port: &str) -> bool {
    port.trim().parse::<u32>().is_ok_and(|p| (1..=65535).contains(&p))
}

pub fn is_valid_email(email: &str) -> bool {
    matches(&EMAIL_RE, email)
}

/// `*.` prefixed owner name.
pub fn is_wildcard(hostname: &str) -> bool {
    hostname.starts_with("*.")
}

/// Trim one trailing dot and lower-case.
pub fn normalize_domain(domain: &str) -> String {
    domain.strip_suffix('.').unwrap_or(domain).to_lowercase()
}

/// Diagnostic code derived from a message: lower-cased, whitespace runs replaced by `_`.
pub fn slugify(message: &str) -> String {
    let lower = message.to_lowercase();
    match WHITESPACE_RE.as_ref() {
        Some(re) => re.replace_all(&lower, "_").into_owned(),
        None => lower.split_whitespace().collect::<Vec<_>>().join("_"),
    }
}

/// Human-readable TTL using the largest whole unit (`"2 hours"`, `"1 day"`).
pub fn format_ttl(ttl: u32) -> String {
    const UNITS: [(u32, &str); 4] = [(86400, "day"), (3600, "hour"), (60, "minute"), (1, "second")];

    for (value, unit) in UNITS {
        if ttl >= value {
            let amount = ttl / value;
            let plural = if amount == 1 { "" } else { "s" };
            return format!("{amount} {unit}{plural}");
        }
    }
    format!("{ttl} seconds")
}

/// Integer prefix of a string, tolerant like a lenient number parse:
/// `"50abc"` → 50, `" -3"` → -3, `"abc"` → `None`.
pub fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}

/// Join the quoted character-strings of a TXT answer (`"a" "b"` → `ab`).
///
/// Unquoted input is returned unchanged.
pub fn unquote_txt(data: &str) -> String {
    let trimmed = data.trim();
    if !trimmed.starts_with('"') {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_quotes = false;
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            _ if in_quotes => out.push(c),
            _ => {}
        }
    }
    out
}

/// Components of a parsed URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UriComponents {
    pub scheme: String,
    pub userinfo: Option<String>,
    /// Empty for schemes without an authority (`mailto:`).
    pub host: String,
    pub port: Option<String>,
    pub path: Option<String>,
    pub query: Option<String>,
    pub fragment: Option<String>,
}

/// Decompose an absolute URI; `None` when it cannot be parsed.
pub fn parse_uri(uri: &str) -> Option<UriComponents> {
    let url = Url::parse(uri).ok()?;

    let userinfo = if url.username().is_empty() {
        None
    } else {
        Some(match url.password() {
            Some(password) => format!("{}:{password}", url.username()),
            None => url.username().to_string(),
        })
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    Some(UriComponents {
        scheme: url.scheme().to_string(),
        userinfo,
        host: url.host_str().unwrap_or_default().to_string(),
        port: url.port().map(|p| p.to_string()),
        path: non_empty(url.path()),
        query: url.query().and_then(non_empty),
        fragment: url.fragment().and_then(non_empty),
    })
}

/// Split a `;`-delimited tag list (`v=DMARC1; p=reject`) into lower-cased keys
/// and trimmed values.
///
/// Segments without a key or value are skipped. Only the text between the first
/// and second `=` is kept as value; a repeated key overwrites the earlier one.
pub fn parse_dns_key_value(record: &str) -> HashMap<String, String> {
    let mut result = HashMap::new();
    for part in record.split(';') {
        let mut pieces = part.trim().split('=');
        let (Some(key), Some(value)) = (pieces.next(), pieces.next()) else {
            continue;
        };
        let (key, value) = (key.trim(), value.trim());
        if key.is_empty() || value.is_empty() {
            continue;
        }
        result.insert(key.to_lowercase(), value.to_string());
    }
    result
}

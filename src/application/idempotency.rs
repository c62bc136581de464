//! Deterministic idempotency keys for checkout requests.
//!
//! Two calls with identical logical inputs must yield byte-identical keys
//! no matter the parameter insertion order; that is what lets a retried
//! checkout request deduplicate on the provider side. The hash is a cheap
//! rolling hash, not a cryptographic one - collisions are an accepted risk
//! for a low-stakes dedup aid.

use std::collections::HashMap;

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn url_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// 32-bit wrapping rolling string hash.
fn rolling_hash(s: &str) -> u32 {
    s.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
}

fn to_base36(mut n: u32) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(char::from_digit(n % 36, 36).unwrap_or('0'));
        n /= 36;
    }
    digits.iter().rev().collect()
}

/// Derives `"{prefix}_{sanitized_seed}_{digest}"` where the digest is the
/// base-36 rolling hash of the canonical (sorted, URL-encoded) parameter
/// string.
pub fn compute(prefix: &str, seed: &str, params: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = params.keys().collect();
    keys.sort();

    let canonical = keys
        .iter()
        .map(|k| format!("{}={}", url_encode(k), url_encode(&params[*k])))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}_{}_{}",
        prefix,
        sanitize(seed),
        to_base36(rolling_hash(&canonical))
    )
}

/// Digest-free variant for callers keyed by a known external identifier
/// (e.g. a fixed coupon code): `"{prefix}_{sanitized_identifier}"`.
pub fn fixed(prefix: &str, identifier: &str) -> String {
    format!("{}_{}", prefix, sanitize(identifier))
}

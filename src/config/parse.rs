//! Typed value parsing for the two settings sources.
//!
//! The environment and the INI file accept slightly different spellings.
//! Environment values are strict: plain decimal integers and a small set of
//! boolean words. INI values are lenient: integers may carry a base prefix
//! and booleans also accept `yes`/`no` and `on`/`off`.

/// Parse an environment integer: optional sign followed by decimal digits.
pub fn parse_env_int(raw: &str) -> Option<i64> {
    raw.parse().ok()
}

/// Parse an environment boolean.
pub fn parse_env_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Parse an INI integer.
///
/// Accepts an optional sign, then `0x`, `0o` or `0b` prefixes, a bare
/// leading `0` for octal, or plain decimal. Underscores may separate digits.
pub fn parse_ini_int(raw: &str) -> Option<i64> {
    let (negative, unsigned) = match raw.as_bytes().first()? {
        b'+' => (false, &raw[1..]),
        b'-' => (true, &raw[1..]),
        _ => (false, raw),
    };

    let (radix, digits, prefixed) = split_radix(unsigned);
    if !underscores_ok(digits, prefixed) {
        return None;
    }

    let cleaned: String = digits.chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() || !cleaned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    let magnitude = i128::from(u64::from_str_radix(&cleaned, radix).ok()?);
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Parse an INI boolean.
pub fn parse_ini_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" | "YES" | "yes" | "Yes" | "y" | "ON" | "on"
        | "On" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" | "NO" | "no" | "No" | "n" | "OFF"
        | "off" | "Off" => Some(false),
        _ => None,
    }
}

fn split_radix(s: &str) -> (u32, &str, bool) {
    let bytes = s.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return (10, s, false);
    }
    match bytes[1] {
        b'x' | b'X' => (16, &s[2..], true),
        b'o' | b'O' => (8, &s[2..], true),
        b'b' | b'B' => (2, &s[2..], true),
        _ => (8, &s[1..], true),
    }
}

// An underscore must follow a digit or the base prefix, and the last
// character must be a digit.
fn underscores_ok(digits: &str, prefixed: bool) -> bool {
    if !digits.contains('_') {
        return true;
    }
    let mut after_digit = prefixed;
    for c in digits.chars() {
        if c == '_' {
            if !after_digit {
                return false;
            }
            after_digit = false;
        } else {
            after_digit = true;
        }
    }
    after_digit
}

//! Lenient numeric query parameters
//!
//! Every server endpoint takes plain integers from the query string and
//! never rejects a request because of them: anything unparseable or negative
//! falls back to the endpoint's default.

use std::collections::HashMap;

/// Parse a non-negative integer, falling back to `default`.
///
/// Leading whitespace and an optional sign are accepted, then the longest run
/// of ASCII digits is read, so `"12abc"` yields 12.
pub fn parse_num(raw: Option<&str>, default: u64) -> u64 {
    let Some(raw) = raw else {
        return default;
    };

    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return default;
    }

    match rest[..digits_len].parse::<u64>() {
        Ok(0) => 0,
        Ok(_) if negative => default,
        Ok(value) => value,
        Err(_) => default,
    }
}

/// Look up `key` in a decoded query string and parse it with [`parse_num`].
pub fn query_num(query: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    parse_num(query.get(key).map(String::as_str), default)
}

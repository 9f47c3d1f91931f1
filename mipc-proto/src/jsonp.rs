//! The `message(...);` envelope around device responses.
//!
//! The body inside is a JavaScript object literal. Strict JSON is tried
//! first because it keeps large integers exact; JSON5 covers unquoted keys
//! and single-quoted strings. JSON5 integers are limited to `i64`, so wider
//! ones (the 36-digit DH values) are quoted before that pass and surface as
//! strings with their exact digits.

use std::borrow::Cow;

use serde_json::Value;

use crate::Error;

/// Opening of the JSONP wrapper.
pub const PREFIX: &str = "message(";
/// Closing of the JSONP wrapper.
pub const SUFFIX: &str = ");";

/// Strip the wrapper, leaving the object literal.
pub fn unwrap(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix(PREFIX).unwrap_or(text);
    text.strip_suffix(SUFFIX).unwrap_or(text)
}

/// Unwrap and parse a response body.
pub fn parse(text: &str) -> Result<Value, Error> {
    let body = unwrap(text);
    if let Ok(value) = serde_json::from_str(body) {
        return Ok(value);
    }
    json5::from_str(&quote_wide_integers(body)).map_err(|e| Error::Response(format!("{e}: {body}")))
}

fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b == b'.'
}

/// Wrap integer literals outside strings that do not fit `i64` in quotes.
fn quote_wide_integers(body: &str) -> Cow<'_, str> {
    let bytes = body.as_bytes();
    let mut out = String::new();
    let mut copied = 0;
    let mut quote: Option<u8> = None;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == b'\\' {
                i += 2;
                continue;
            }
            if b == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match b {
            b'"' | b'\'' => {
                quote = Some(b);
                i += 1;
            }
            b'0'..=b'9' if i == 0 || !is_word(bytes[i - 1]) => {
                let start = if i > 0 && bytes[i - 1] == b'-' { i - 1 } else { i };
                let mut end = i;
                while end < bytes.len() && bytes[end].is_ascii_digit() {
                    end += 1;
                }
                // fractions, exponents and hex literals are left to JSON5
                let whole = end == bytes.len() || !is_word(bytes[end]);
                if whole && body[start..end].parse::<i64>().is_err() {
                    out.push_str(&body[copied..start]);
                    out.push('"');
                    out.push_str(&body[start..end]);
                    out.push('"');
                    copied = end;
                }
                i = end;
            }
            _ => i += 1,
        }
    }

    if out.is_empty() {
        return Cow::Borrowed(body);
    }
    out.push_str(&body[copied..]);
    Cow::Owned(out)
}

/// Follow `path` through nested objects.
pub fn field<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

/// A scalar field rendered as text. Numbers keep their exact digits.
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_json_keeps_big_integers() {
        let v = parse(r#"message({"data":{"key_b2a":506541858342243857518660751045580499}});"#).unwrap();
        let key = field(&v, &["data", "key_b2a"]).unwrap();
        assert_eq!(text(key).unwrap(), "506541858342243857518660751045580499");
    }

    #[test]
    fn object_literal_fallback() {
        let v = parse("message({type:'cacs_dh_ack', data:{tid:3, lid:'0x4c'}});\n").unwrap();
        assert_eq!(field(&v, &["type"]).and_then(text).unwrap(), "cacs_dh_ack");
        assert_eq!(field(&v, &["data", "tid"]).and_then(text).unwrap(), "3");
        assert_eq!(field(&v, &["data", "lid"]).and_then(text).unwrap(), "0x4c");
    }

    #[test]
    fn object_literal_keeps_big_integers() {
        let v = parse(
            "message({type:'cacs_dh_ack', data:{key_b2a:506541858342243857518660751045580499, tid:3, lid:'0x4c'}});",
        )
        .unwrap();
        let key = field(&v, &["data", "key_b2a"]).and_then(text).unwrap();
        assert_eq!(key, "506541858342243857518660751045580499");
        assert_eq!(field(&v, &["data", "tid"]).and_then(Value::as_u64), Some(3));
    }

    #[test]
    fn object_literal_integers_past_i64() {
        let v = parse("message({a:9223372036854775808, b:-9223372036854775809, c:18446744073709551615});").unwrap();
        assert_eq!(field(&v, &["a"]).and_then(text).unwrap(), "9223372036854775808");
        assert_eq!(field(&v, &["b"]).and_then(text).unwrap(), "-9223372036854775809");
        assert_eq!(field(&v, &["c"]).and_then(text).unwrap(), "18446744073709551615");
    }

    #[test]
    fn quoting_leaves_strings_and_small_numbers_alone() {
        let body = "{s:'123456789012345678901234567890', d:\"x\\\"99999999999999999999\", k1:5, f:1.5, h:0x1e}";
        assert!(matches!(quote_wide_integers(body), Cow::Borrowed(_)));
        assert_eq!(quote_wide_integers("{n:-12345678901234567890}"), "{n:\"-12345678901234567890\"}");
    }

    #[test]
    fn bare_body_accepted() {
        let v = parse(r#"{"a":1}"#).unwrap();
        assert_eq!(field(&v, &["a"]).and_then(Value::as_u64), Some(1));
    }

    #[test]
    fn garbage_rejected() {
        assert!(matches!(parse("message(<html>);"), Err(Error::Response(_))));
    }

    #[test]
    fn non_scalars_have_no_text() {
        assert_eq!(text(&Value::Null), None);
        assert_eq!(text(&serde_json::json!({"a": 1})), None);
    }
}

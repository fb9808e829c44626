//! Bracket/equals canonical serialization of request payloads.
//!
//! The gateway's legacy signing input. Not JSON:
//!
//! - objects render as `[key=value,key2=value2]`, members joined by a bare comma
//! - arrays render as `[a, b]`, elements joined by comma + space
//! - `null` object members are dropped entirely; `0`, `false` and `""` are kept
//! - strings are emitted verbatim, without quoting or escaping
//!
//! Object keys keep insertion order (`serde_json` is built with
//! `preserve_order`), so the output is a pure function of the value and its
//! key order. Live V2 request signing uses the JSON body instead; this form
//! stays available for consumers of the legacy format.

use serde::Serialize;
use serde_json::{Number, Value};

use crate::{CryptoError, Result};

/// Canonicalize a JSON value.
#[must_use]
pub fn build_canonical_string(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Canonicalize any serializable value.
///
/// Struct fields keep declaration order; `None` fields serialize to `null`
/// and are therefore omitted.
pub fn canonical_string_of<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).map_err(|e| CryptoError::Encoding(e.to_string()))?;
    Ok(build_canonical_string(&value))
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(members) => {
            out.push('[');
            let mut first = true;
            for (key, member) in members {
                if member.is_null() {
                    continue;
                }
                if !first {
                    out.push(',');
                }
                first = false;
                out.push_str(key);
                out.push('=');
                write_value(out, member);
            }
            out.push(']');
        }
        Value::String(s) => out.push_str(s),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&render_number(n)),
        Value::Null => out.push_str("null"),
    }
}

/// Render a number the way JavaScript's `String(n)` does.
fn render_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.is_finite() => render_f64(f),
        _ => n.to_string(),
    }
}

/// `Number.prototype.toString` for a finite, non-zero `f64`.
///
/// `{:e}` yields the shortest round-trip digits; placement of the decimal
/// point then follows the ECMAScript rules: plain notation while the decimal
/// exponent `n` satisfies `-6 < n <= 21`, exponent notation otherwise.
fn render_f64(f: f64) -> String {
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exp: i32 = exp.parse().unwrap_or(0);

    let k = digits.len() as i32;
    let n = exp + 1;

    let mut out = String::new();
    if f.is_sign_negative() {
        out.push('-');
    }

    if k <= n && n <= 21 {
        out.push_str(&digits);
        out.extend(std::iter::repeat_n('0', (n - k) as usize));
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        out.push_str(int);
        out.push('.');
        out.push_str(frac);
    } else if -6 < n && n <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-n) as usize));
        out.push_str(&digits);
    } else {
        let (lead, rest) = digits.split_at(1);
        out.push_str(lead);
        if !rest.is_empty() {
            out.push('.');
            out.push_str(rest);
        }
        out.push('e');
        out.push(if exp < 0 { '-' } else { '+' });
        out.push_str(&exp.unsigned_abs().to_string());
    }
    out
}

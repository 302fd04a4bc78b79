//! Lookup and coercion pass.
//!
//! For each schema entry, in declaration order: pick the external name for the
//! runtime, read it through that runtime's accessor, coerce to the entry type.
//! The pass is all-or-nothing: the first schema or runtime error aborts it and
//! nothing partial is returned.

use super::env_keys as env;
use super::schema::{Schema, ValueType};
use crate::error::Result;
use crate::host::Host;
use crate::namespace::EnvMap;
use crate::runtime::RuntimeKind;
use crate::value::{EnvValue, RawValue};

/// Resolve every schema entry for `runtime` against the host's accessor.
pub fn resolve_all(schema: &Schema, runtime: RuntimeKind, host: &Host) -> Result<EnvMap> {
    let source = host.source_for(runtime)?;
    let mut resolved = EnvMap::new();
    for entry in schema.iter() {
        let value_type = entry.mapping.type_tag().resolve(&entry.key)?;
        let name = entry.external_name(runtime);
        let raw = name.and_then(|n| source.lookup(n));
        let present = raw.is_some();
        let value = coerce(raw, value_type);
        if value.is_nan() && present {
            tracing::warn!(
                key = %entry.key,
                name = name.unwrap_or_default(),
                %runtime,
                "env value is not numeric; resolved to NaN"
            );
        } else {
            tracing::debug!(
                key = %entry.key,
                name = name.unwrap_or("<unavailable>"),
                %runtime,
                present,
                "resolved env key"
            );
        }
        resolved.insert(&*entry.key, value);
    }
    Ok(resolved)
}

/// Coerce a raw value to `value_type`.
///
/// - boolean: absent, empty, `0`, NaN and `false` are false; everything else,
///   including the string `"0"`, is true.
/// - number: absent or unparsable input is NaN (kept as-is, not defaulted).
/// - string: absent is `""`; strings pass through unchanged.
pub fn coerce(raw: Option<RawValue>, value_type: ValueType) -> EnvValue {
    match value_type {
        ValueType::Boolean => EnvValue::Bool(truthy(raw.as_ref())),
        ValueType::Number => EnvValue::Num(to_number(raw.as_ref())),
        ValueType::String => EnvValue::Str(match raw {
            None => String::new(),
            Some(RawValue::Str(s)) => s,
            Some(ref r) if !truthy(Some(r)) => String::new(),
            Some(RawValue::Num(n)) => n.to_string(),
            Some(RawValue::Bool(_)) => "true".to_string(),
        }),
    }
}

/// `WORKER_TIMEOUT + CF_BLOCKLIST_DOWNLOAD_TIMEOUT`, both read straight from
/// worker global scope rather than through the schema.
pub fn worker_timeout(host: &Host) -> EnvValue {
    let base = to_number(host.worker_global(env::WORKER_TIMEOUT).as_ref());
    let download = to_number(host.worker_global(env::CF_BLOCKLIST_DOWNLOAD_TIMEOUT).as_ref());
    EnvValue::Num(base + download)
}

fn truthy(raw: Option<&RawValue>) -> bool {
    match raw {
        None => false,
        Some(RawValue::Str(s)) => !s.is_empty(),
        Some(RawValue::Num(n)) => *n != 0.0 && !n.is_nan(),
        Some(RawValue::Bool(b)) => *b,
    }
}

fn to_number(raw: Option<&RawValue>) -> f64 {
    match raw {
        None => f64::NAN,
        Some(RawValue::Str(s)) => parse_number(s),
        Some(RawValue::Num(n)) => *n,
        Some(RawValue::Bool(b)) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
    }
}

/// Numeric text: decimal (`30`, `-1.5`, `.5`, `2e3`), `Infinity` with an
/// optional sign, or an unsigned `0x` / `0o` / `0b` integer. Anything else,
/// including the empty string and Rust-only spellings like `inf` or `nan`,
/// is NaN.
fn parse_number(text: &str) -> f64 {
    let t = text.trim();
    match t {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match t.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &t[2..];
        if digits.starts_with('+') {
            return f64::NAN;
        }
        return u128::from_str_radix(digits, radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }
    let decimal = t
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));
    if decimal {
        t.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

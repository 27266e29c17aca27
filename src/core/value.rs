// Typed field values and per-type decode rules

use crate::core::constants::DELETION_FLAG_SIZE;
use crate::core::error::{DbfError, Result};
use crate::core::field::{FieldDescriptor, FieldType};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Character(String),
    /// `None` for a blank date field.
    Date(Option<NaiveDate>),
    /// `None` for an unset (`?` or blank) logical field.
    Logical(Option<bool>),
}

/// One decoded row, keyed by field name. When a table repeats a name the
/// later column overwrites the earlier one; `DbfReader::field_names` still
/// lists both.
pub type Record = HashMap<String, Value>;

impl FieldType {
    /// Applies this type's decode rule to a field's raw bytes. The error is
    /// a short reason; callers attach the field name and raw content.
    pub fn decode(self, raw: &[u8], decimal_count: u8) -> std::result::Result<Value, String> {
        match self {
            FieldType::Character => Ok(Value::Character(decode_text(raw))),
            FieldType::Numeric if decimal_count == 0 => {
                let text = numeric_text(raw)?;
                if text.is_empty() {
                    return Ok(Value::Integer(0));
                }
                text.parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|e| format!("invalid integer: {}", e))
            }
            FieldType::Numeric | FieldType::Float => {
                let text = numeric_text(raw)?;
                if text.is_empty() {
                    return Ok(Value::Float(0.0));
                }
                parse_float(text).map(Value::Float)
            }
            FieldType::Date => decode_date(raw),
            FieldType::Logical => decode_logical(raw),
        }
    }
}

fn is_padding(b: u8) -> bool {
    b == b' ' || b == 0
}

fn decode_text(raw: &[u8]) -> String {
    let end = raw.iter().rposition(|&b| !is_padding(b)).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

fn numeric_text(raw: &[u8]) -> std::result::Result<&str, String> {
    std::str::from_utf8(raw)
        .map(|s| s.trim_matches(|c: char| c == ' ' || c == '\0'))
        .map_err(|_| "not ASCII text".to_string())
}

// Plain decimal notation only: `str::parse` would also take NaN and inf
fn parse_float(text: &str) -> std::result::Result<f64, String> {
    let numeric = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !numeric {
        return Err("invalid float: non-numeric text".to_string());
    }

    let value = text
        .parse::<f64>()
        .map_err(|e| format!("invalid float: {}", e))?;
    if !value.is_finite() {
        return Err("invalid float: out of range".to_string());
    }
    Ok(value)
}

fn decode_date(raw: &[u8]) -> std::result::Result<Value, String> {
    if raw.iter().all(|&b| is_padding(b)) {
        return Ok(Value::Date(None));
    }
    if raw.len() != 8 || !raw.iter().all(u8::is_ascii_digit) {
        return Err("expected YYYYMMDD".to_string());
    }

    let digits = |range: std::ops::Range<usize>| {
        raw[range]
            .iter()
            .fold(0u32, |acc, &b| acc * 10 + u32::from(b - b'0'))
    };
    let (year, month, day) = (digits(0..4), digits(4..6), digits(6..8));

    NaiveDate::from_ymd_opt(year as i32, month, day)
        .map(|date| Value::Date(Some(date)))
        .ok_or_else(|| format!("no such date {:04}-{:02}-{:02}", year, month, day))
}

fn decode_logical(raw: &[u8]) -> std::result::Result<Value, String> {
    match raw.first().copied() {
        Some(b'T' | b't' | b'Y' | b'y') => Ok(Value::Logical(Some(true))),
        Some(b'F' | b'f' | b'N' | b'n') => Ok(Value::Logical(Some(false))),
        Some(b' ' | b'?') | None => Ok(Value::Logical(None)),
        Some(_) => Err("expected one of TtYyFfNn? or blank".to_string()),
    }
}

pub fn decode_field(field: &FieldDescriptor, raw: &[u8]) -> Result<Value> {
    field
        .field_type
        .decode(raw, field.decimal_count)
        .map_err(|reason| DbfError::MalformedValue {
            field: field.name.clone(),
            raw: String::from_utf8_lossy(raw).into_owned(),
            reason,
        })
}

/// Decodes a full record buffer, deletion flag included. Fields are sliced
/// in declaration order.
pub fn decode_record(fields: &[FieldDescriptor], bytes: &[u8]) -> Result<Record> {
    let mut record = Record::with_capacity(fields.len());
    let mut offset = DELETION_FLAG_SIZE;

    for field in fields {
        let end = offset + usize::from(field.length);
        let raw = bytes.get(offset..end).ok_or_else(|| {
            DbfError::CorruptedLayout(format!(
                "field {} ends at byte {} of a {}-byte record",
                field.name,
                end,
                bytes.len()
            ))
        })?;
        record.insert(field.name.clone(), decode_field(field, raw)?);
        offset = end;
    }

    Ok(record)
}

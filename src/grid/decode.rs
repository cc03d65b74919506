//! Result decoding: declared column category to display-ready value.
//!
//! Dispatch is driven by the column's declared source type, not the runtime
//! shape of the value in the row. Temporal categories format through the
//! session's `FormatPolicy`; an unrecognized category warns and falls back
//! to text; SQL NULL always wins over whatever a branch would compute.

use rust_decimal::Decimal;
use tracing::warn;

use crate::db::{ColumnInfo, ColumnType, Lob, Row, SourceValue, Value};
use crate::error::{GridfeedError, Result};
use crate::format::FormatPolicy;

/// Decodes one native row into display-ready values.
pub(crate) fn decode_row(
    columns: &[ColumnInfo],
    categories: &[ColumnType],
    values: Vec<SourceValue>,
    formats: &FormatPolicy,
) -> Result<Row> {
    let mut row = Vec::with_capacity(values.len());
    for ((column, category), value) in columns.iter().zip(categories).zip(values) {
        let decoded = decode_value(column, *category, value, formats)
            .map_err(|e| GridfeedError::decode(format!("column '{}': {e}", column.name)))?;
        row.push(decoded);
    }
    Ok(row)
}

/// Decodes one column value.
pub(crate) fn decode_value(
    column: &ColumnInfo,
    category: ColumnType,
    raw: SourceValue,
    formats: &FormatPolicy,
) -> Result<Value> {
    // SQL NULL is forced to null no matter what the category branch would
    // produce; this guards against accessors that hand back a sentinel.
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match category {
        ColumnType::Integer => match raw {
            SourceValue::Int(v) => Value::Int(v),
            SourceValue::Bool(b) => Value::Int(i64::from(b)),
            SourceValue::Float(f) => Value::Int(f as i64),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Numeric => match raw {
            SourceValue::Decimal(d) => Value::Decimal(d),
            SourceValue::Int(v) => Value::Decimal(Decimal::from(v)),
            SourceValue::Float(f) => Value::Decimal(
                Decimal::try_from(f).map_err(|e| GridfeedError::decode(e.to_string()))?,
            ),
            SourceValue::Text(s) => Value::Decimal(
                s.parse().map_err(|e| GridfeedError::decode(format!("{e}: {s}")))?,
            ),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Binary => match raw {
            SourceValue::Bytes(b) => Value::Bytes(b),
            SourceValue::Text(s) => Value::Bytes(s.into_bytes()),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Boolean => match raw {
            SourceValue::Bool(b) => Value::Bool(b),
            SourceValue::Int(v) => Value::Bool(v != 0),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Blob => match raw {
            SourceValue::Bytes(b) => Value::Lob(Lob::Binary(b)),
            SourceValue::Text(s) => Value::Lob(Lob::Binary(s.into_bytes())),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Clob => match raw {
            SourceValue::Text(s) => Value::Lob(Lob::Character(s)),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::NClob => match raw {
            SourceValue::Text(s) => Value::Lob(Lob::WideCharacter(s)),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Text => Value::Text(to_text(raw)),
        ColumnType::Double => match raw {
            SourceValue::Float(f) => Value::Double(f),
            SourceValue::Int(v) => Value::Double(v as f64),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Float => match raw {
            SourceValue::Float(f) => Value::Float(f as f32),
            SourceValue::Int(v) => Value::Float(v as f32),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Date => match raw {
            SourceValue::Date(d) => Value::Text(formats.format_date(d)?),
            SourceValue::Timestamp(ts) => Value::Text(formats.format_date(ts.date())?),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Time => match raw {
            SourceValue::Time(t) => Value::Text(formats.format_time(t)?),
            SourceValue::Timestamp(ts) => Value::Text(formats.format_time(ts.time())?),
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Timestamp => match raw {
            SourceValue::Timestamp(ts) => Value::Text(formats.format_datetime(ts)?),
            SourceValue::Date(d) => {
                Value::Text(formats.format_datetime(d.and_time(chrono::NaiveTime::MIN))?)
            }
            other => return Err(mismatch(category, &other)),
        },
        ColumnType::Opaque => Value::Opaque(to_text(raw)),
        ColumnType::Unknown => {
            warn!(
                "Unsupported column type for '{}': {}, decoding as text",
                column.name, column.data_type
            );
            Value::Text(to_text(raw))
        }
    };
    Ok(value)
}

fn mismatch(category: ColumnType, raw: &SourceValue) -> GridfeedError {
    GridfeedError::decode(format!(
        "value {raw:?} does not match declared {category:?} column"
    ))
}

fn to_text(raw: SourceValue) -> String {
    match raw {
        SourceValue::Null => String::new(),
        SourceValue::Int(v) => v.to_string(),
        SourceValue::Float(f) => f.to_string(),
        SourceValue::Text(s) => s,
        SourceValue::Bytes(b) => String::from_utf8_lossy(&b).into_owned(),
        SourceValue::Bool(b) => b.to_string(),
        SourceValue::Decimal(d) => d.to_string(),
        SourceValue::Date(d) => d.to_string(),
        SourceValue::Time(t) => t.to_string(),
        SourceValue::Timestamp(ts) => ts.to_string(),
    }
}

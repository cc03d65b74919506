//! Core data types for gridfeed.
//!
//! Defines the decoded value model handed to grid consumers, the page
//! envelope, the positional parameter kinds accepted by prepared statements,
//! and the declared-column-type categories driving result decoding.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// One page of decoded rows plus the cross-page total record count.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Page {
    /// Requested page number (1-based).
    pub page: u32,

    /// Requested page size.
    pub page_size: u32,

    /// Column metadata for the result set.
    pub columns: Vec<ColumnInfo>,

    /// Decoded rows for this page only.
    pub rows: Vec<Row>,

    /// Total record count spanning all pages.
    pub record_count: u64,
}

impl Page {
    /// Returns true if this page carries no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Metadata about a column in a result set.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,

    /// Declared column data type, as reported by the driver.
    pub data_type: String,
}

impl ColumnInfo {
    /// Creates a new column info with the given name and declared type.
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Returns the decode category for this column's declared type.
    pub fn category(&self) -> ColumnType {
        ColumnType::from_type_name(&self.data_type)
    }
}

/// A row of decoded values, one per result column, in column order.
pub type Row = Vec<Value>;

/// A single decoded value handed to the grid consumer.
///
/// Temporal columns never appear here as native date/time types; they are
/// formatted to `Text` at decode time.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Native integer.
    Int(i64),

    /// Single-precision float.
    Float(f32),

    /// Double-precision float.
    Double(f64),

    /// Arbitrary-precision decimal.
    Decimal(Decimal),

    /// Text value, including formatted temporal columns.
    Text(String),

    /// Raw byte sequence.
    Bytes(Vec<u8>),

    /// Large-object payload (character, wide character, or binary).
    Lob(Lob),

    /// Driver-native pass-through rendering for opaque column types.
    Opaque(String),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts the value to a display string for plain-text consumers.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Double(f) => f.to_string(),
            Value::Decimal(d) => d.to_string(),
            Value::Text(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
            Value::Lob(lob) => lob.to_display_string(),
            Value::Opaque(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

/// Large-object payload.
///
/// sqlx has no deferred server-side LOB handles, so the payload is
/// materialized here; the wide-character kind is kept distinct from the
/// plain character kind because their source column types differ.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Lob {
    /// Large character object (CLOB family).
    Character(String),

    /// Wide large character object (NCLOB family).
    WideCharacter(String),

    /// Large binary object (BLOB family).
    Binary(Vec<u8>),
}

impl Lob {
    /// Converts the payload to a display string.
    pub fn to_display_string(&self) -> String {
        match self {
            Lob::Character(s) | Lob::WideCharacter(s) => s.clone(),
            Lob::Binary(b) => format!("<{} bytes>", b.len()),
        }
    }
}

/// A positional statement parameter.
///
/// This is the closed set of kinds the binder supports. `Null` exists so a
/// caller-assembled parameter list can carry absence explicitly, but binding
/// it is rejected: the binder never binds SQL NULL, and callers needing NULL
/// semantics must handle them upstream. No implicit numeric widening or
/// narrowing is performed across kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Explicit absence; always rejected by the binder.
    Null,
    /// Text parameter.
    Text(String),
    /// 32-bit integer parameter.
    Int(i32),
    /// Boolean parameter.
    Bool(bool),
    /// Timestamp parameter.
    Timestamp(NaiveDateTime),
    /// Date parameter.
    Date(NaiveDate),
    /// Byte-sequence parameter.
    Bytes(Vec<u8>),
    /// Double-precision float parameter.
    Double(f64),
    /// 64-bit integer parameter.
    Long(i64),
    /// Arbitrary-precision decimal parameter.
    Decimal(Decimal),
    /// Single-precision float parameter.
    Float(f32),
    /// 8-bit integer parameter.
    TinyInt(i8),
    /// 16-bit integer parameter.
    SmallInt(i16),
    /// Time-of-day parameter.
    Time(NaiveTime),
}

impl Param {
    /// Returns the stable kind name used in invalid-argument messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Param::Null => "null",
            Param::Text(_) => "text",
            Param::Int(_) => "int",
            Param::Bool(_) => "bool",
            Param::Timestamp(_) => "timestamp",
            Param::Date(_) => "date",
            Param::Bytes(_) => "bytes",
            Param::Double(_) => "double",
            Param::Long(_) => "long",
            Param::Decimal(_) => "decimal",
            Param::Float(_) => "float",
            Param::TinyInt(_) => "tinyint",
            Param::SmallInt(_) => "smallint",
            Param::Time(_) => "time",
        }
    }
}

// Conversion implementations for common parameter types
impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl From<i32> for Param {
    fn from(v: i32) -> Self {
        Param::Int(v)
    }
}

impl From<i64> for Param {
    fn from(v: i64) -> Self {
        Param::Long(v)
    }
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Double(v)
    }
}

impl From<f32> for Param {
    fn from(v: f32) -> Self {
        Param::Float(v)
    }
}

impl From<Vec<u8>> for Param {
    fn from(v: Vec<u8>) -> Self {
        Param::Bytes(v)
    }
}

impl From<Decimal> for Param {
    fn from(v: Decimal) -> Self {
        Param::Decimal(v)
    }
}

impl From<NaiveDate> for Param {
    fn from(v: NaiveDate) -> Self {
        Param::Date(v)
    }
}

impl From<NaiveDateTime> for Param {
    fn from(v: NaiveDateTime) -> Self {
        Param::Timestamp(v)
    }
}

impl From<NaiveTime> for Param {
    fn from(v: NaiveTime) -> Self {
        Param::Time(v)
    }
}

impl From<i8> for Param {
    fn from(v: i8) -> Self {
        Param::TinyInt(v)
    }
}

impl From<i16> for Param {
    fn from(v: i16) -> Self {
        Param::SmallInt(v)
    }
}

/// Decode category derived from a column's declared source type.
///
/// Decoding dispatches on this category, not on the runtime shape of the
/// value in the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Integer family (INT, INTEGER, SMALLINT, TINYINT, ...).
    Integer,
    /// Exact numeric family (BIGINT, DECIMAL, NUMERIC).
    Numeric,
    /// Binary family (BINARY, VARBINARY, BYTEA, ...).
    Binary,
    /// Boolean family (BOOLEAN, BOOL, BIT).
    Boolean,
    /// Large binary object.
    Blob,
    /// Large character object.
    Clob,
    /// Wide large character object.
    NClob,
    /// Character family, including the generic/unknown textual category.
    Text,
    /// Double-precision float family (DOUBLE, REAL).
    Double,
    /// Single-precision float.
    Float,
    /// Date column.
    Date,
    /// Time-of-day column.
    Time,
    /// Timestamp column.
    Timestamp,
    /// Pass-through driver types (ARRAY, REF, ROWID, XML).
    Opaque,
    /// Anything else; decoded to text with a warning.
    Unknown,
}

impl ColumnType {
    /// Maps a declared type name from driver metadata to a decode category.
    ///
    /// Length suffixes like `VARCHAR(255)` are ignored.
    pub fn from_type_name(name: &str) -> Self {
        let upper = name.trim().to_uppercase();
        let base = upper.split('(').next().unwrap_or("").trim();

        match base {
            "INT" | "INTEGER" | "INT2" | "INT4" | "SMALLINT" | "TINYINT" | "MEDIUMINT" => {
                Self::Integer
            }
            "BIGINT" | "INT8" | "DECIMAL" | "NUMERIC" => Self::Numeric,
            "BINARY" | "VARBINARY" | "LONGVARBINARY" | "BYTEA" => Self::Binary,
            "BOOLEAN" | "BOOL" | "BIT" => Self::Boolean,
            "BLOB" => Self::Blob,
            "CLOB" => Self::Clob,
            "NCLOB" => Self::NClob,
            "CHAR" | "VARCHAR" | "TEXT" | "NCHAR" | "NVARCHAR" | "LONGVARCHAR"
            | "LONGNVARCHAR" | "OTHER" => Self::Text,
            "DOUBLE" | "DOUBLE PRECISION" | "REAL" | "FLOAT8" => Self::Double,
            "FLOAT" | "FLOAT4" => Self::Float,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "TIMESTAMP" | "TIMESTAMPTZ" | "DATETIME" => Self::Timestamp,
            "ARRAY" | "REF" | "ROWID" | "XML" | "SQLXML" => Self::Opaque,
            // SQLite reports NULL as the type of untyped expression columns.
            "NULL" => Self::Text,
            _ => Self::Unknown,
        }
    }

    /// Returns true for the three temporal categories.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }
}

/// A column value as natively read by a backend cursor, before decode
/// policy (temporal formatting, decimal conversion, null forcing) applies.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceValue {
    /// The driver reported SQL NULL for this column.
    Null,
    /// Integer storage.
    Int(i64),
    /// Floating-point storage.
    Float(f64),
    /// Text storage.
    Text(String),
    /// Binary storage.
    Bytes(Vec<u8>),
    /// Boolean storage.
    Bool(bool),
    /// Exact numeric storage.
    Decimal(Decimal),
    /// Native date storage.
    Date(NaiveDate),
    /// Native time-of-day storage.
    Time(NaiveTime),
    /// Native timestamp storage.
    Timestamp(NaiveDateTime),
}

impl SourceValue {
    /// Returns true if the driver reported SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SourceValue::Null)
    }
}

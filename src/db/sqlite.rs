//! SQLite backend implementation.
//!
//! Provides the `SqliteClient` struct that implements the `Connection` trait
//! for SQLite databases using sqlx.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as SqlxColumn, Executor, Row as SqlxRow, Statement as _, TypeInfo, ValueRef as _};
use tracing::debug;

use crate::db::{ColumnInfo, ColumnType, Connection, Cursor, Param, PreparedStatement, SourceValue};
use crate::error::{GridfeedError, Result};

/// SQLite database client.
#[derive(Debug, Clone)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens a private in-memory database.
    ///
    /// The pool is capped at one connection so every statement sees the same
    /// in-memory database.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| GridfeedError::connection(format!("Invalid database options: {e}")))?;
        Self::connect_with(options).await
    }

    /// Opens or creates a database file at the given path.
    pub async fn open(path: &Path) -> Result<Self> {
        let conn_str = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&conn_str)
            .map_err(|e| GridfeedError::connection(format!("Invalid database path: {e}")))?
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .create_if_missing(true);
        Self::connect_with(options).await
    }

    /// Creates a client from an existing connection pool.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn connect_with(options: SqliteConnectOptions) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(options)
            .await
            .map_err(|e| GridfeedError::connection(format!("Failed to connect: {e}")))?;

        debug!("Connected to SQLite database");
        Ok(Self { pool })
    }
}

#[async_trait]
impl Connection for SqliteClient {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement>> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| GridfeedError::connection(format!("Failed to acquire connection: {e}")))?;

        // Eager validation; execution later re-uses sqlx's statement cache.
        let statement = (&mut *conn)
            .prepare(sql)
            .await
            .map_err(|e| GridfeedError::query(format!("Failed to prepare statement: {e}")))?;

        let columns = statement
            .columns()
            .iter()
            .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
            .collect();

        Ok(Box::new(SqliteStatement {
            pool: self.pool.clone(),
            sql: sql.to_string(),
            columns,
            closed: false,
        }))
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        sqlx::query(sql)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| GridfeedError::query(format!("Failed to execute statement: {e}")))
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT name
            FROM sqlite_master
            WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GridfeedError::query(format!("Failed to fetch table names: {e}")))
    }
}

/// A prepared statement backed by sqlx's per-connection statement cache.
struct SqliteStatement {
    pool: SqlitePool,
    sql: String,
    columns: Vec<ColumnInfo>,
    closed: bool,
}

#[async_trait]
impl PreparedStatement for SqliteStatement {
    async fn execute(&mut self, params: &[Param]) -> Result<Box<dyn Cursor>> {
        if self.closed {
            return Err(GridfeedError::query("statement is closed"));
        }

        let mut query = sqlx::query(&self.sql);
        for param in params {
            query = bind_param(query, param)?;
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GridfeedError::query(format!("Failed to execute statement: {e}")))?;

        // Executed rows refine prepare-time metadata (expression columns get
        // their value type); fall back to the prepared columns when empty.
        let columns = match rows.first() {
            Some(first_row) => first_row
                .columns()
                .iter()
                .map(|col| ColumnInfo::new(col.name(), col.type_info().name()))
                .collect(),
            None => self.columns.clone(),
        };

        Ok(Box::new(SqliteCursor::new(columns, rows)))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(GridfeedError::query("statement is closed"));
        }
        self.closed = true;
        Ok(())
    }
}

/// Cursor over a buffered SQLite result set.
struct SqliteCursor {
    columns: Vec<ColumnInfo>,
    categories: Vec<ColumnType>,
    rows: std::vec::IntoIter<SqliteRow>,
}

impl SqliteCursor {
    fn new(columns: Vec<ColumnInfo>, rows: Vec<SqliteRow>) -> Self {
        let categories = columns.iter().map(ColumnInfo::category).collect();
        Self {
            columns,
            categories,
            rows: rows.into_iter(),
        }
    }
}

#[async_trait]
impl Cursor for SqliteCursor {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Vec<SourceValue>>> {
        let Some(row) = self.rows.next() else {
            return Ok(None);
        };

        let mut values = Vec::with_capacity(self.categories.len());
        for (idx, category) in self.categories.iter().enumerate() {
            values.push(read_source_value(&row, idx, *category)?);
        }
        Ok(Some(values))
    }

    async fn close(&mut self) -> Result<()> {
        self.rows = Vec::new().into_iter();
        Ok(())
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

/// Binds one parameter positionally, by the parameter's own kind.
///
/// A null parameter is rejected outright; SQL NULL is never bound here.
/// SQLite has no decimal storage class, so decimals bind as their canonical
/// text rendering.
fn bind_param<'q>(query: SqliteQuery<'q>, param: &Param) -> Result<SqliteQuery<'q>> {
    match param {
        Param::Null => Err(GridfeedError::invalid_argument(
            "null parameter is not supported",
        )),
        Param::Text(v) => Ok(query.bind(v.clone())),
        Param::Int(v) => Ok(query.bind(*v)),
        Param::Bool(v) => Ok(query.bind(*v)),
        Param::Timestamp(v) => Ok(query.bind(*v)),
        Param::Date(v) => Ok(query.bind(*v)),
        Param::Bytes(v) => Ok(query.bind(v.clone())),
        Param::Double(v) => Ok(query.bind(*v)),
        Param::Long(v) => Ok(query.bind(*v)),
        Param::Decimal(v) => Ok(query.bind(v.to_string())),
        Param::Float(v) => Ok(query.bind(*v)),
        Param::TinyInt(v) => Ok(query.bind(*v)),
        Param::SmallInt(v) => Ok(query.bind(*v)),
        Param::Time(v) => Ok(query.bind(*v)),
    }
}

/// Reads one column's native value, guided by its declared category.
///
/// SQL NULL is detected up front so no category branch can produce a
/// sentinel for an absent value.
fn read_source_value(row: &SqliteRow, idx: usize, category: ColumnType) -> Result<SourceValue> {
    let raw = row
        .try_get_raw(idx)
        .map_err(|e| GridfeedError::decode(format!("column {idx}: {e}")))?;
    if raw.is_null() {
        return Ok(SourceValue::Null);
    }

    let value = match category {
        ColumnType::Date => SourceValue::Date(get(row, idx)?),
        ColumnType::Time => SourceValue::Time(get(row, idx)?),
        ColumnType::Timestamp => SourceValue::Timestamp(get(row, idx)?),
        ColumnType::Integer => SourceValue::Int(get(row, idx)?),
        ColumnType::Boolean => SourceValue::Bool(get(row, idx)?),
        ColumnType::Numeric => read_numeric(row, idx)?,
        ColumnType::Binary | ColumnType::Blob => SourceValue::Bytes(get(row, idx)?),
        ColumnType::Double | ColumnType::Float => SourceValue::Float(get(row, idx)?),
        ColumnType::Text
        | ColumnType::Clob
        | ColumnType::NClob
        | ColumnType::Opaque
        | ColumnType::Unknown => SourceValue::Text(read_text(row, idx)?),
    };
    Ok(value)
}

fn get<'r, T>(row: &'r SqliteRow, idx: usize) -> Result<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get::<T, _>(idx)
        .map_err(|e| GridfeedError::decode(format!("column {idx}: {e}")))
}

/// Exact numerics arrive as INTEGER, REAL or TEXT storage depending on how
/// the value was written; all three are accepted.
fn read_numeric(row: &SqliteRow, idx: usize) -> Result<SourceValue> {
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(SourceValue::Int(v));
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Ok(SourceValue::Float(v));
    }
    let text: String = get(row, idx)?;
    Decimal::from_str(&text)
        .map(SourceValue::Decimal)
        .map_err(|e| GridfeedError::decode(format!("column {idx}: {e}")))
}

/// Textual categories accept any storage class, rendering it as text.
fn read_text(row: &SqliteRow, idx: usize) -> Result<String> {
    if let Ok(s) = row.try_get::<String, _>(idx) {
        return Ok(s);
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Ok(v.to_string());
    }
    let bytes: Vec<u8> = get(row, idx)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

//! Database abstraction layer for gridfeed.
//!
//! Provides a trait-based interface for statement preparation, execution and
//! result iteration, allowing different database backends to be used
//! interchangeably behind the pagination engine.

mod mock;
mod sqlite;
mod types;

pub use mock::{MockConnection, MockResult};
pub use sqlite::SqliteClient;
pub use types::{ColumnInfo, ColumnType, Lob, Page, Param, Row, SourceValue, Value};

use crate::error::Result;
use async_trait::async_trait;

/// A live database connection able to prepare statements.
///
/// Connection acquisition, pooling and transaction management are the
/// caller's concern; this trait is only the surface the pagination engine
/// and the script runner consume.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Prepares a statement, validating the SQL against the backend.
    async fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement>>;

    /// Executes a standalone statement outside the prepared-statement path.
    ///
    /// Used by the script runner; result rows, if any, are discarded.
    async fn execute_batch(&self, sql: &str) -> Result<()>;

    /// Lists the table names visible in the catalog.
    async fn table_names(&self) -> Result<Vec<String>>;
}

/// A prepared statement owned by a query session.
///
/// Statements are single-in-flight resources: one execution at a time,
/// serialized by the caller. Reuse after `close` yields the backend's
/// native statement-closed error.
#[async_trait]
pub trait PreparedStatement: Send {
    /// Binds the given parameters positionally and executes the statement.
    ///
    /// Binding errors (a null parameter, a kind the backend cannot encode)
    /// abort before anything is sent to the database.
    async fn execute(&mut self, params: &[Param]) -> Result<Box<dyn Cursor>>;

    /// Closes the statement, releasing its backend resources.
    async fn close(&mut self) -> Result<()>;
}

/// An open result cursor produced by executing a prepared statement.
#[async_trait]
pub trait Cursor: Send {
    /// Column metadata for the result set, in column order.
    fn columns(&self) -> &[ColumnInfo];

    /// Advances to the next row, returning its native column values,
    /// or `None` once the result set is exhausted.
    async fn next_row(&mut self) -> Result<Option<Vec<SourceValue>>>;

    /// Releases the cursor.
    async fn close(&mut self) -> Result<()>;
}

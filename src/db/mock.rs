//! Mock connection for testing.
//!
//! Provides a scriptable in-memory backend: canned result sets per SQL
//! string, failure injection for prepare/execute/close, and a restrictable
//! set of bindable parameter kinds. Used by unit tests that exercise paths a
//! well-behaved driver never takes.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::db::{ColumnInfo, Connection, Cursor, Param, PreparedStatement, SourceValue};
use crate::error::{GridfeedError, Result};

/// A canned result set served for one SQL string.
#[derive(Debug, Clone, Default)]
pub struct MockResult {
    /// Column metadata, in column order.
    pub columns: Vec<ColumnInfo>,

    /// Native rows the cursor will yield.
    pub rows: Vec<Vec<SourceValue>>,
}

impl MockResult {
    /// Creates a result set with the given columns and rows.
    pub fn new(columns: Vec<ColumnInfo>, rows: Vec<Vec<SourceValue>>) -> Self {
        Self { columns, rows }
    }
}

/// A mock connection that returns predefined results.
#[derive(Default)]
pub struct MockConnection {
    results: HashMap<String, MockResult>,
    fail_prepare: HashSet<String>,
    fail_execute: HashSet<String>,
    fail_close: HashSet<String>,
    fail_batch: HashSet<String>,
    supported_kinds: Option<HashSet<&'static str>>,
    tables: Vec<String>,
    bound: Arc<Mutex<Vec<Vec<Param>>>>,
    batches: Arc<Mutex<Vec<String>>>,
}

impl MockConnection {
    /// Creates a mock connection with no scripted results.
    ///
    /// Unscripted statements prepare successfully and yield empty result
    /// sets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the result set served for the given SQL.
    pub fn with_result(mut self, sql: impl Into<String>, result: MockResult) -> Self {
        self.results.insert(sql.into(), result);
        self
    }

    /// Makes preparation of the given SQL fail.
    pub fn with_failing_prepare(mut self, sql: impl Into<String>) -> Self {
        self.fail_prepare.insert(sql.into());
        self
    }

    /// Makes execution of the given SQL fail after a successful prepare.
    pub fn with_failing_execute(mut self, sql: impl Into<String>) -> Self {
        self.fail_execute.insert(sql.into());
        self
    }

    /// Makes closing the statement prepared from the given SQL fail.
    pub fn with_failing_close(mut self, sql: impl Into<String>) -> Self {
        self.fail_close.insert(sql.into());
        self
    }

    /// Makes `execute_batch` fail for the given SQL.
    pub fn with_failing_batch(mut self, sql: impl Into<String>) -> Self {
        self.fail_batch.insert(sql.into());
        self
    }

    /// Restricts the parameter kinds this backend accepts.
    pub fn with_supported_kinds(
        mut self,
        kinds: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        self.supported_kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Sets the table names reported by the catalog.
    pub fn with_tables(mut self, tables: impl IntoIterator<Item = &'static str>) -> Self {
        self.tables = tables.into_iter().map(String::from).collect();
        self
    }

    /// Returns every parameter list successfully bound so far, in
    /// execution order across all statements.
    pub fn bound_params(&self) -> Vec<Vec<Param>> {
        self.bound.lock().expect("bind log lock").clone()
    }

    /// Returns every SQL string passed to `execute_batch`, in order.
    pub fn executed_batches(&self) -> Vec<String> {
        self.batches.lock().expect("batch log lock").clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn prepare(&self, sql: &str) -> Result<Box<dyn PreparedStatement>> {
        if self.fail_prepare.contains(sql) {
            return Err(GridfeedError::query(format!(
                "mock prepare failure: {sql}"
            )));
        }

        Ok(Box::new(MockStatement {
            sql: sql.to_string(),
            result: self.results.get(sql).cloned().unwrap_or_default(),
            fail_execute: self.fail_execute.contains(sql),
            fail_close: self.fail_close.contains(sql),
            supported_kinds: self.supported_kinds.clone(),
            bound: Arc::clone(&self.bound),
            closed: false,
        }))
    }

    async fn execute_batch(&self, sql: &str) -> Result<()> {
        self.batches
            .lock()
            .expect("batch log lock")
            .push(sql.to_string());
        if self.fail_batch.contains(sql) {
            return Err(GridfeedError::query(format!("mock batch failure: {sql}")));
        }
        Ok(())
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.clone())
    }
}

struct MockStatement {
    sql: String,
    result: MockResult,
    fail_execute: bool,
    fail_close: bool,
    supported_kinds: Option<HashSet<&'static str>>,
    bound: Arc<Mutex<Vec<Vec<Param>>>>,
    closed: bool,
}

#[async_trait]
impl PreparedStatement for MockStatement {
    async fn execute(&mut self, params: &[Param]) -> Result<Box<dyn Cursor>> {
        if self.closed {
            return Err(GridfeedError::query("statement is closed"));
        }

        for param in params {
            if matches!(param, Param::Null) {
                return Err(GridfeedError::invalid_argument(
                    "null parameter is not supported",
                ));
            }
            if let Some(kinds) = &self.supported_kinds {
                if !kinds.contains(param.kind()) {
                    return Err(GridfeedError::invalid_argument(format!(
                        "unsupported parameter type: {}",
                        param.kind()
                    )));
                }
            }
        }

        if self.fail_execute {
            return Err(GridfeedError::query(format!(
                "mock execute failure: {}",
                self.sql
            )));
        }

        self.bound
            .lock()
            .expect("bind log lock")
            .push(params.to_vec());

        Ok(Box::new(MockCursor {
            columns: self.result.columns.clone(),
            rows: self.result.rows.iter().cloned().collect(),
        }))
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(GridfeedError::query("statement is closed"));
        }
        self.closed = true;
        if self.fail_close {
            return Err(GridfeedError::query(format!(
                "mock close failure: {}",
                self.sql
            )));
        }
        Ok(())
    }
}

struct MockCursor {
    columns: Vec<ColumnInfo>,
    rows: VecDeque<Vec<SourceValue>>,
}

#[async_trait]
impl Cursor for MockCursor {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    async fn next_row(&mut self) -> Result<Option<Vec<SourceValue>>> {
        Ok(self.rows.pop_front())
    }

    async fn close(&mut self) -> Result<()> {
        self.rows.clear();
        Ok(())
    }
}

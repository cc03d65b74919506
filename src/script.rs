//! SQL script replay.
//!
//! Runs a UTF-8 file of semicolon-terminated statements against a
//! connection, optionally tolerating DDL statements that fail because the
//! schema is already (or no longer) in the expected state. Used to seed and
//! upgrade schemas from plain .sql files.

use std::path::Path;

use tracing::{debug, error, info};

use crate::db::Connection;
use crate::error::{GridfeedError, Result};

/// Replays SQL script files against a connection.
#[derive(Debug, Clone, Default)]
pub struct ScriptRunner {
    ignore_ddl_errors: bool,
}

impl ScriptRunner {
    /// Creates a runner that aborts nothing and tolerates nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether tolerable DDL failures are ignored.
    pub fn ignore_ddl_errors(&self) -> bool {
        self.ignore_ddl_errors
    }

    /// Enables or disables DDL-failure tolerance.
    pub fn set_ignore_ddl_errors(&mut self, ignore: bool) {
        self.ignore_ddl_errors = ignore;
    }

    /// Replays the script at `path`.
    ///
    /// Lines starting with `--` and blank lines are skipped; everything else
    /// accumulates until a `;` terminates the statement. A failing statement
    /// is logged and skipped; it does not abort the rest of the script.
    pub async fn run(&self, conn: &dyn Connection, path: &Path) -> Result<()> {
        info!("Run script: {}", path.display());

        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            GridfeedError::script(format!("Failed to read {}: {e}", path.display()))
        })?;

        // Snapshot the catalog once; tolerance decisions are made against
        // the state the script started from.
        let existing = if self.ignore_ddl_errors {
            conn.table_names().await?
        } else {
            Vec::new()
        };

        let mut buf = String::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with("--") {
                continue;
            }
            match line.find(';') {
                Some(idx) => {
                    buf.push_str(&line[..idx]);
                    self.execute_statement(conn, &existing, &buf).await;
                    buf.clear();
                }
                None => {
                    buf.push_str(line);
                    buf.push('\n');
                }
            }
        }

        Ok(())
    }

    async fn execute_statement(&self, conn: &dyn Connection, existing: &[String], sql: &str) {
        match conn.execute_batch(sql).await {
            Ok(()) => info!("Execute sql: {}", first_line(sql)),
            Err(e) => {
                if self.is_ignorable(existing, sql) {
                    debug!("Ignore sql: {}", first_line(sql));
                } else {
                    error!("Abort sql: {}: {e}", first_line(sql));
                }
            }
        }
    }

    /// Tolerable failures: CREATE TABLE for a table that already existed,
    /// DROP TABLE for a table that never did, and any CREATE/DROP INDEX.
    fn is_ignorable(&self, existing: &[String], sql: &str) -> bool {
        if !self.ignore_ddl_errors {
            return false;
        }
        let tokens: Vec<&str> = sql.split_whitespace().collect();
        if tokens.len() < 3 {
            return false;
        }

        let verb = tokens[0].to_uppercase();
        let object = tokens[1].to_uppercase();
        match (verb.as_str(), object.as_str()) {
            ("CREATE", "TABLE") => existing
                .iter()
                .any(|t| t.eq_ignore_ascii_case(tokens[2])),
            ("DROP", "TABLE") => !existing
                .iter()
                .any(|t| t.eq_ignore_ascii_case(tokens[2])),
            ("CREATE", "INDEX") | ("DROP", "INDEX") => true,
            _ => false,
        }
    }
}

fn first_line(sql: &str) -> String {
    match sql.find('\n') {
        Some(idx) => format!("{} ...", &sql[..idx]),
        None => sql.to_string(),
    }
}

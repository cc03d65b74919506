//! Paginated query sessions for grid consumers.
//!
//! A `GridQuery` owns one prepared main statement and an optional prepared
//! count statement, and turns (page, page size) requests into `Page` values
//! with decoded rows and a cross-page record count.

mod decode;

use tracing::debug;

use crate::db::{
    ColumnInfo, ColumnType, Connection, Cursor, Page, Param, PreparedStatement, Row, SourceValue,
};
use crate::error::{GridfeedError, Result};
use crate::format::FormatPolicy;

/// Suffix appended to the main query in pagination mode; adds the two
/// trailing bind positions filled per fetch.
const PAGINATION_SUFFIX: &str = " LIMIT ? OFFSET ?";

/// A paginated query session.
///
/// Sessions are single-in-flight: one caller drives a session at a time,
/// and both owned statements are re-executed on every fetch (no result
/// caching). Construct once, fetch any number of times, close exactly once.
pub struct GridQuery {
    main: Box<dyn PreparedStatement>,
    count: Option<Box<dyn PreparedStatement>>,
    use_offset: bool,
    formats: FormatPolicy,
}

impl GridQuery {
    /// Prepares a session over the given query texts.
    ///
    /// In pagination mode (`use_offset`) a fixed ` LIMIT ? OFFSET ?` suffix
    /// is appended to the main query before preparing. The main statement is
    /// prepared first; if the count statement then fails to prepare, the
    /// main statement is closed best-effort and the preparation error is
    /// re-raised.
    pub async fn new(
        conn: &dyn Connection,
        query: &str,
        count_query: Option<&str>,
        use_offset: bool,
    ) -> Result<Self> {
        debug!("GridQuery: query: {}", query);
        debug!("GridQuery: count: {:?}", count_query);
        debug!("GridQuery: use_offset: {}", use_offset);

        let sql = if use_offset {
            format!("{query}{PAGINATION_SUFFIX}")
        } else {
            query.to_string()
        };

        let mut main = conn.prepare(&sql).await?;
        let count = match count_query {
            Some(count_sql) => match conn.prepare(count_sql).await {
                Ok(stmt) => Some(stmt),
                Err(e) => {
                    // Cleanup failure is not worth surfacing over the
                    // preparation error that caused it.
                    let _ = main.close().await;
                    return Err(e);
                }
            },
            None => None,
        };

        Ok(Self {
            main,
            count,
            use_offset,
            formats: FormatPolicy::default(),
        })
    }

    /// Returns the session's format policy.
    pub fn formats(&self) -> &FormatPolicy {
        &self.formats
    }

    /// Returns the format policy for in-place adjustment between fetches.
    pub fn formats_mut(&mut self) -> &mut FormatPolicy {
        &mut self.formats
    }

    /// Replaces the session's format policy.
    pub fn set_formats(&mut self, formats: FormatPolicy) {
        self.formats = formats;
    }

    /// Fetches one page of decoded rows plus the total record count.
    ///
    /// `page` is 1-based. Caller parameters are bound positionally into both
    /// statements, ahead of the two pagination placeholders when pagination
    /// mode is on. The count statement, when present, executes independently
    /// of the main query: there is no shared snapshot, so a concurrent
    /// writer can make the (count, rows) pair inconsistent.
    ///
    /// In pagination mode without a count statement the reported total
    /// equals only this page's row count, not a full-table count.
    pub async fn fetch_page(
        &mut self,
        page: u32,
        page_size: u32,
        params: &[Param],
    ) -> Result<Page> {
        let offset = u64::from(page.saturating_sub(1)) * u64::from(page_size);
        let mut total: u64 = 0;

        if let Some(count_stmt) = self.count.as_mut() {
            let mut cursor = count_stmt.execute(params).await?;
            let first = cursor.next_row().await;
            let released = cursor.close().await;
            let first = first?;
            released?;
            total = match first {
                Some(values) => count_from(values.first())?,
                None => 0,
            };
        }

        let mut trailing;
        let main_params: &[Param] = if self.use_offset {
            trailing = Vec::with_capacity(params.len() + 2);
            trailing.extend_from_slice(params);
            trailing.push(Param::Long(page_size as i64));
            trailing.push(Param::Long(offset as i64));
            &trailing
        } else {
            params
        };

        let mut cursor = self.main.execute(main_params).await?;
        let outcome = self
            .select_rows(cursor.as_mut(), page_size, offset, &mut total)
            .await;
        let released = cursor.close().await;
        let (columns, rows) = outcome?;
        released?;

        Ok(Page {
            page,
            page_size,
            columns,
            rows,
            record_count: total,
        })
    }

    /// Walks the main cursor, selecting this page's rows.
    ///
    /// In pagination mode the engine already restricted the result, so every
    /// row is collected. In manual mode the skip counter swallows `offset`
    /// rows first, then rows are collected up to `page_size`, then the rest
    /// of the result is drained purely to finish the running count. The
    /// running count is only maintained when no count statement exists.
    async fn select_rows(
        &self,
        cursor: &mut dyn Cursor,
        page_size: u32,
        offset: u64,
        total: &mut u64,
    ) -> Result<(Vec<ColumnInfo>, Vec<Row>)> {
        let columns = cursor.columns().to_vec();
        let categories: Vec<ColumnType> = columns.iter().map(ColumnInfo::category).collect();
        let counting = self.count.is_none();
        let limit = u64::from(page_size);
        let mut skip = if self.use_offset { 0 } else { offset };
        let mut rows: Vec<Row> = Vec::new();

        while let Some(values) = cursor.next_row().await? {
            if skip > 0 {
                skip -= 1;
                if counting {
                    *total += 1;
                }
                continue;
            }
            if (rows.len() as u64) < limit {
                rows.push(decode::decode_row(
                    &columns,
                    &categories,
                    values,
                    &self.formats,
                )?);
                if counting {
                    *total += 1;
                }
            } else if counting {
                // collection is complete; keep draining for the count
                *total += 1;
            } else {
                break;
            }
        }

        Ok((columns, rows))
    }

    /// Closes both statements.
    ///
    /// The count statement closes first. If the main statement's close then
    /// fails, that error propagates and a pending count-close failure is
    /// lost; if the main statement closes cleanly, a pending count-close
    /// failure is raised instead.
    pub async fn close(mut self) -> Result<()> {
        let mut count_failure = None;
        if let Some(mut stmt) = self.count.take() {
            if let Err(e) = stmt.close().await {
                count_failure = Some(e);
            }
        }
        self.main.close().await?;
        match count_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Interprets the first column of a count query's first row.
fn count_from(value: Option<&SourceValue>) -> Result<u64> {
    use rust_decimal::prelude::ToPrimitive;

    let Some(value) = value else {
        return Ok(0);
    };
    match value {
        SourceValue::Null => Ok(0),
        SourceValue::Int(v) => Ok((*v).max(0) as u64),
        SourceValue::Float(f) => Ok(if *f > 0.0 { *f as u64 } else { 0 }),
        SourceValue::Decimal(d) => Ok(d.to_u64().unwrap_or(0)),
        SourceValue::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|e| GridfeedError::decode(format!("count query returned '{s}': {e}"))),
        other => Err(GridfeedError::decode(format!(
            "count query returned a non-numeric value: {other:?}"
        ))),
    }
}

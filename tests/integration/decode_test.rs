//! Result-decoding integration tests.
//!
//! Exercises the declared-type dispatch end to end: typed columns come back
//! as the matching decoded kinds, temporal columns as formatted text, and
//! SQL NULL as null regardless of the column's category.

use gridfeed::db::{Connection, Lob, Param, SqliteClient, Value};
use gridfeed::format::FormatPolicy;
use gridfeed::grid::GridQuery;
use pretty_assertions::assert_eq;

async fn typed_client() -> SqliteClient {
    super::init_tracing();
    let client = SqliteClient::open_in_memory().await.unwrap();
    client
        .execute_batch(
            "CREATE TABLE samples (
                id INTEGER PRIMARY KEY,
                label TEXT,
                ratio REAL,
                payload BLOB,
                active BOOLEAN,
                born DATE,
                seen DATETIME,
                wakes TIME
            )",
        )
        .await
        .unwrap();
    client
        .execute_batch(
            "INSERT INTO samples VALUES \
             (42, 'hello', 2.5, X'0102', 1, \
              '2024-03-07', '2024-03-07 23:30:00', '09:05:00')",
        )
        .await
        .unwrap();
    client
}

const SAMPLE_SQL: &str =
    "SELECT id, label, ratio, payload, active, born, seen, wakes FROM samples";

#[tokio::test]
async fn test_typed_columns_decode_to_matching_kinds() {
    let client = typed_client().await;
    let mut query = GridQuery::new(&client, SAMPLE_SQL, None, false).await.unwrap();

    let page = query.fetch_page(1, 10, &[]).await.unwrap();
    assert_eq!(page.rows.len(), 1);

    let row = &page.rows[0];
    assert_eq!(row[0], Value::Int(42));
    assert_eq!(row[1], Value::Text("hello".to_string()));
    assert_eq!(row[2], Value::Double(2.5));
    assert_eq!(row[3], Value::Lob(Lob::Binary(vec![1, 2])));
    assert_eq!(row[4], Value::Bool(true));

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_temporal_columns_decode_to_formatted_text() {
    let client = typed_client().await;
    let mut query = GridQuery::new(&client, SAMPLE_SQL, None, false).await.unwrap();

    let page = query.fetch_page(1, 10, &[]).await.unwrap();
    let row = &page.rows[0];

    // default patterns, offset 0
    assert_eq!(row[5], Value::Text("2024/03/07".to_string()));
    assert_eq!(row[6], Value::Text("2024/03/07 23:30:00.000".to_string()));
    assert_eq!(row[7], Value::Text("09:05:00.000".to_string()));

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_time_offset_shifts_the_instant_before_formatting() {
    let client = typed_client().await;
    let mut query = GridQuery::new(&client, SAMPLE_SQL, None, false).await.unwrap();

    let mut formats = FormatPolicy::new();
    formats.set_time_offset_ms(3_600_000); // +1 hour
    query.set_formats(formats);

    let page = query.fetch_page(1, 10, &[]).await.unwrap();
    let row = &page.rows[0];

    // 23:30 plus one hour crosses midnight
    assert_eq!(row[6], Value::Text("2024/03/08 00:30:00.000".to_string()));
    assert_eq!(row[7], Value::Text("10:05:00.000".to_string()));

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_format_policy_swaps_between_fetches() {
    let client = typed_client().await;
    let mut query = GridQuery::new(&client, SAMPLE_SQL, None, false).await.unwrap();

    let page = query.fetch_page(1, 10, &[]).await.unwrap();
    assert_eq!(page.rows[0][5], Value::Text("2024/03/07".to_string()));

    query.formats_mut().set_date_format("%d.%m.%Y");
    let page = query.fetch_page(1, 10, &[]).await.unwrap();
    assert_eq!(page.rows[0][5], Value::Text("07.03.2024".to_string()));

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_sql_null_decodes_to_null_in_every_category() {
    let client = typed_client().await;
    client
        .execute_batch(
            "INSERT INTO samples (id, label, ratio, payload, active, born, seen, wakes) \
             VALUES (43, NULL, NULL, NULL, NULL, NULL, NULL, NULL)",
        )
        .await
        .unwrap();

    let mut query = GridQuery::new(
        &client,
        "SELECT label, ratio, payload, active, born, seen, wakes \
         FROM samples WHERE id = ?",
        None,
        false,
    )
    .await
    .unwrap();

    let page = query.fetch_page(1, 1, &[Param::Int(43)]).await.unwrap();
    for value in &page.rows[0] {
        assert_eq!(*value, Value::Null);
    }

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_row_shape_matches_column_metadata() {
    let client = typed_client().await;
    let mut query = GridQuery::new(&client, SAMPLE_SQL, None, false).await.unwrap();

    let page = query.fetch_page(1, 10, &[]).await.unwrap();

    assert_eq!(page.columns.len(), 8);
    assert_eq!(page.columns[0].name, "id");
    assert_eq!(page.columns[5].name, "born");
    for row in &page.rows {
        assert_eq!(row.len(), page.columns.len());
    }

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_numeric_parameter_kinds_bind_positionally() {
    let client = typed_client().await;
    let mut query = GridQuery::new(
        &client,
        "SELECT id FROM samples WHERE id = ? AND ratio > ? AND active = ?",
        None,
        false,
    )
    .await
    .unwrap();

    let page = query
        .fetch_page(
            1,
            10,
            &[Param::Long(42), Param::Double(1.0), Param::Bool(true)],
        )
        .await
        .unwrap();

    assert_eq!(page.rows, vec![vec![Value::Int(42)]]);

    query.close().await.unwrap();
}

//! Page-fetch integration tests.
//!
//! Covers both row-selection strategies (server-side LIMIT/OFFSET and the
//! manual skip-and-drain fallback) and both counting strategies (count
//! statement vs. running total).

use gridfeed::db::{Connection, Param, Value};
use gridfeed::grid::GridQuery;
use pretty_assertions::assert_eq;

use super::seeded_client;

const DATA_SQL: &str = "SELECT id, name FROM items ORDER BY id";
const COUNT_SQL: &str = "SELECT COUNT(*) FROM items";

fn expected_page_two() -> Vec<Vec<Value>> {
    vec![
        vec![Value::Int(3), Value::Text("c".to_string())],
        vec![Value::Int(4), Value::Text("d".to_string())],
    ]
}

#[tokio::test]
async fn test_pagination_mode_with_count_query() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(&client, DATA_SQL, Some(COUNT_SQL), true)
        .await
        .unwrap();

    let page = query.fetch_page(2, 2, &[]).await.unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.page_size, 2);
    assert_eq!(page.rows, expected_page_two());
    assert_eq!(page.record_count, 5);

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_manual_mode_without_count_query() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(&client, DATA_SQL, None, false).await.unwrap();

    let page = query.fetch_page(2, 2, &[]).await.unwrap();

    // the engine skips 2, collects 2, then drains the rest to finish counting
    assert_eq!(page.rows, expected_page_two());
    assert_eq!(page.record_count, 5);

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_manual_mode_record_count_matches_unpaginated_total() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(&client, DATA_SQL, None, false).await.unwrap();

    for (page_no, page_size) in [(1u32, 2u32), (2, 2), (3, 2), (1, 5), (2, 3)] {
        let page = query.fetch_page(page_no, page_size, &[]).await.unwrap();
        assert_eq!(page.record_count, 5, "page={page_no} size={page_size}");
    }

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_pagination_mode_row_window() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(&client, DATA_SQL, Some(COUNT_SQL), true)
        .await
        .unwrap();

    // rows.len() == min(page_size, max(0, total - offset)) for a 5-row table
    for (page_no, page_size, expected_len) in
        [(1u32, 2u32, 2usize), (2, 2, 2), (3, 2, 1), (4, 2, 0), (1, 10, 5)]
    {
        let page = query.fetch_page(page_no, page_size, &[]).await.unwrap();
        assert_eq!(
            page.rows.len(),
            expected_len,
            "page={page_no} size={page_size}"
        );
        assert_eq!(page.record_count, 5);
    }

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_page_beyond_available_data_is_empty() {
    let client = seeded_client().await;

    for use_offset in [false, true] {
        let count_sql = use_offset.then_some(COUNT_SQL);
        let mut query = GridQuery::new(&client, DATA_SQL, count_sql, use_offset)
            .await
            .unwrap();
        let page = query.fetch_page(9, 3, &[]).await.unwrap();
        assert!(page.rows.is_empty(), "use_offset={use_offset}");
        query.close().await.unwrap();
    }
}

#[tokio::test]
async fn test_caller_params_bind_into_both_statements() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(
        &client,
        "SELECT id, name FROM items WHERE id > ? ORDER BY id",
        Some("SELECT COUNT(*) FROM items WHERE id > ?"),
        true,
    )
    .await
    .unwrap();

    let page = query.fetch_page(1, 2, &[Param::Int(2)]).await.unwrap();

    assert_eq!(page.rows, expected_page_two());
    assert_eq!(page.record_count, 3);

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_every_fetch_reexecutes_the_statements() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(&client, DATA_SQL, Some(COUNT_SQL), true)
        .await
        .unwrap();

    let before = query.fetch_page(1, 10, &[]).await.unwrap();
    assert_eq!(before.record_count, 5);

    client
        .execute_batch("INSERT INTO items (id, name) VALUES (6, 'f')")
        .await
        .unwrap();

    let after = query.fetch_page(1, 10, &[]).await.unwrap();
    assert_eq!(after.record_count, 6);
    assert_eq!(after.rows.len(), 6);

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_null_parameter_is_rejected_not_bound() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(
        &client,
        "SELECT id FROM items WHERE name = ?",
        None,
        false,
    )
    .await
    .unwrap();

    let err = query.fetch_page(1, 10, &[Param::Null]).await.unwrap_err();
    assert_eq!(err.category(), "Invalid Argument");
    assert!(err.to_string().contains("null parameter"));

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_main_prepare_failure_surfaces_at_construction() {
    let client = seeded_client().await;
    let result = GridQuery::new(&client, "SELECT nope FROM missing", None, false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_count_prepare_failure_reraises_original_error() {
    let client = seeded_client().await;
    let err = GridQuery::new(
        &client,
        DATA_SQL,
        Some("SELECT COUNT(*) FROM missing"),
        false,
    )
    .await
    .err()
    .expect("count preparation must fail");
    assert!(err.to_string().contains("missing"));
}

#[tokio::test]
async fn test_page_envelope_serializes_for_grid_consumers() {
    let client = seeded_client().await;
    let mut query = GridQuery::new(&client, DATA_SQL, Some(COUNT_SQL), true)
        .await
        .unwrap();

    let page = query.fetch_page(2, 2, &[]).await.unwrap();
    let json: serde_json::Value = serde_json::to_value(&page).unwrap();

    assert_eq!(json["page"], 2);
    assert_eq!(json["page_size"], 2);
    assert_eq!(json["record_count"], 5);
    assert_eq!(json["rows"][0][0], 3);
    assert_eq!(json["rows"][0][1], "c");

    query.close().await.unwrap();
}

//! Script-runner integration tests.
//!
//! Replays .sql files against in-memory SQLite and verifies the resulting
//! schema through the paging path.

use std::io::Write as _;

use gridfeed::db::{Connection, SqliteClient, Value};
use gridfeed::grid::GridQuery;
use gridfeed::script::ScriptRunner;

fn script_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write script");
    file
}

#[tokio::test]
async fn test_script_seeds_a_queryable_schema() {
    let file = script_file(
        "-- schema\n\
         CREATE TABLE pets (\n\
             id INTEGER PRIMARY KEY,\n\
             name TEXT\n\
         );\n\
         -- data\n\
         INSERT INTO pets (id, name) VALUES (1, 'rex');\n\
         INSERT INTO pets (id, name) VALUES (2, 'mia');\n",
    );

    let client = SqliteClient::open_in_memory().await.unwrap();
    ScriptRunner::new().run(&client, file.path()).await.unwrap();

    let mut query = GridQuery::new(&client, "SELECT name FROM pets ORDER BY id", None, false)
        .await
        .unwrap();
    let page = query.fetch_page(1, 10, &[]).await.unwrap();

    assert_eq!(
        page.rows,
        vec![
            vec![Value::Text("rex".to_string())],
            vec![Value::Text("mia".to_string())],
        ]
    );
    assert_eq!(page.record_count, 2);

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_recreating_an_existing_table_is_tolerated() {
    let client = SqliteClient::open_in_memory().await.unwrap();
    client
        .execute_batch("CREATE TABLE pets (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    client
        .execute_batch("INSERT INTO pets (id, name) VALUES (1, 'rex')")
        .await
        .unwrap();

    let file = script_file(
        "CREATE TABLE pets (\n\
             id INTEGER PRIMARY KEY,\n\
             name TEXT\n\
         );\n\
         INSERT INTO pets (id, name) VALUES (2, 'mia');\n",
    );

    let mut runner = ScriptRunner::new();
    runner.set_ignore_ddl_errors(true);
    runner.run(&client, file.path()).await.unwrap();

    // the failing CREATE was skipped; the rest of the script still ran
    let names = client.table_names().await.unwrap();
    assert_eq!(names, vec!["pets".to_string()]);

    let mut query = GridQuery::new(&client, "SELECT COUNT(*) FROM pets", None, false)
        .await
        .unwrap();
    let page = query.fetch_page(1, 1, &[]).await.unwrap();
    assert_eq!(page.rows[0][0], Value::Int(2));

    query.close().await.unwrap();
}

#[tokio::test]
async fn test_dropping_a_never_created_table_is_tolerated() {
    let file = script_file(
        "DROP TABLE ghosts;\n\
         CREATE TABLE pets (id INTEGER PRIMARY KEY);\n",
    );

    let client = SqliteClient::open_in_memory().await.unwrap();
    let mut runner = ScriptRunner::new();
    runner.set_ignore_ddl_errors(true);
    runner.run(&client, file.path()).await.unwrap();

    assert_eq!(client.table_names().await.unwrap(), vec!["pets".to_string()]);
}

//! Integration tests for gridfeed.
//!
//! Each test opens its own in-memory SQLite database.

pub mod decode_test;
pub mod paging_test;
pub mod script_test;

use std::sync::Once;

use gridfeed::db::{Connection, SqliteClient};

static TRACING: Once = Once::new();

/// Installs a stderr subscriber once so `RUST_LOG` works in test runs.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    });
}

/// Opens an in-memory database seeded with the five-row `items` table used
/// by the paging tests.
pub async fn seeded_client() -> SqliteClient {
    init_tracing();
    let client = SqliteClient::open_in_memory().await.unwrap();
    client
        .execute_batch("CREATE TABLE items (id INTEGER PRIMARY KEY, name TEXT)")
        .await
        .unwrap();
    client
        .execute_batch(
            "INSERT INTO items (id, name) VALUES \
             (1, 'a'), (2, 'b'), (3, 'c'), (4, 'd'), (5, 'e')",
        )
        .await
        .unwrap();
    client
}

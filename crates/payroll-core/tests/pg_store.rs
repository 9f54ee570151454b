use std::env;

use anyhow::Result;
use payroll_core::db::{self, PgDocumentStore};
use payroll_core::{Document, DocumentStore};
use serde_json::{json, Value};

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[tokio::test]
async fn documents_round_trip_through_postgres_when_available() -> Result<()> {
    let database_url = match env::var("PAYROLL_TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("Skipping pg_store test because PAYROLL_TEST_DATABASE_URL is not set");
            return Ok(());
        }
    };

    let pool = db::connect(&database_url, 2).await?;
    db::run_migrations(&pool).await?;

    // Unique collection so repeated runs do not see each other's rows.
    let collection = format!("attendance_test_{}", uuid::Uuid::new_v4().simple());
    let store = PgDocumentStore::new(pool.clone());

    store
        .create(&collection, doc(json!({"date": "2024-03-02", "status": "present"})))
        .await?;
    store
        .create(&collection, doc(json!({"status": "unknown"})))
        .await?;
    let first = store
        .create(&collection, doc(json!({"date": "2024-03-01", "status": "absent"})))
        .await?;

    let ordered = store.get_all(&collection, Some("date")).await?;
    assert_eq!(ordered.len(), 3);
    assert_eq!(ordered[0]["id"], json!(first));
    assert_eq!(ordered[0].keys().next().map(String::as_str), Some("id"));
    assert_eq!(ordered[1]["date"], json!("2024-03-02"));
    assert!(ordered[2].get("date").is_none());

    let unordered = store.get_all(&collection, None).await?;
    assert_eq!(unordered.len(), 3);
    assert_eq!(unordered[0]["status"], json!("present"));

    sqlx::query("DELETE FROM documents WHERE collection = $1")
        .bind(&collection)
        .execute(&pool)
        .await?;

    Ok(())
}

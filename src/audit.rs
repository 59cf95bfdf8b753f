// Audit log sink
//
// Records who did what to which entity. Entries are written on the caller's
// connection so they commit or roll back with the operation they describe.

use serde_json::Value as JsonValue;
use sqlx::PgConnection;

/// Append one audit entry
pub async fn record(
    conn: &mut PgConnection,
    user_id: i32,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    new_values: JsonValue,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (user_id, action, entity_type, entity_id, new_values)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(new_values)
    .execute(conn)
    .await?;

    Ok(())
}

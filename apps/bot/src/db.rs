use std::str::FromStr;

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tracing::info;

/// Creates and returns a SQLite connection pool, creating the database
/// file on first run.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite...");

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Initializes the profile schema.
///
/// Deployments that predate the name/gender fields have a `user_stacks`
/// table with only the stack column; those get the missing columns via
/// ALTER TABLE so existing rows survive the upgrade.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    let table_exists =
        sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'user_stacks'")
            .fetch_optional(pool)
            .await?
            .is_some();

    if table_exists {
        let columns: Vec<String> = sqlx::query("PRAGMA table_info(user_stacks)")
            .fetch_all(pool)
            .await?
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();

        if !columns.iter().any(|c| c == "name") {
            sqlx::query("ALTER TABLE user_stacks ADD COLUMN name TEXT")
                .execute(pool)
                .await?;
            info!("Schema migration: added user_stacks.name");
        }
        if !columns.iter().any(|c| c == "gender") {
            sqlx::query("ALTER TABLE user_stacks ADD COLUMN gender TEXT")
                .execute(pool)
                .await?;
            info!("Schema migration: added user_stacks.gender");
        }
    } else {
        sqlx::query(
            r#"
            CREATE TABLE user_stacks (
                user_id    INTEGER PRIMARY KEY,
                name       TEXT,
                gender     TEXT,
                tech_stack TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(pool)
        .await?;
    }

    info!("Database schema initialized");
    Ok(())
}

/// Single-connection in-memory pool for tests. SQLite gives every
/// `:memory:` connection its own database, so the pool must never hand
/// out a second connection.
#[cfg(test)]
pub(crate) async fn memory_pool() -> SqlitePool {
    SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_schema_creates_table() {
        let pool = memory_pool().await;
        init_schema(&pool).await.unwrap();

        let columns: Vec<String> = sqlx::query("PRAGMA table_info(user_stacks)")
            .fetch_all(&pool)
            .await
            .unwrap()
            .iter()
            .map(|row| row.get::<String, _>("name"))
            .collect();

        for expected in ["user_id", "name", "gender", "tech_stack", "created_at"] {
            assert!(columns.iter().any(|c| c == expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn test_init_schema_is_idempotent() {
        let pool = memory_pool().await;
        init_schema(&pool).await.unwrap();
        init_schema(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_init_schema_migrates_old_table() {
        let pool = memory_pool().await;

        // Old deployments only tracked the stack.
        sqlx::query(
            "CREATE TABLE user_stacks (
                user_id    INTEGER PRIMARY KEY,
                tech_stack TEXT,
                created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO user_stacks (user_id, tech_stack) VALUES (1, 'Rust, Tokio')")
            .execute(&pool)
            .await
            .unwrap();

        init_schema(&pool).await.unwrap();

        let row = sqlx::query("SELECT name, gender, tech_stack FROM user_stacks WHERE user_id = 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<Option<String>, _>("name"), None);
        assert_eq!(row.get::<Option<String>, _>("gender"), None);
        assert_eq!(
            row.get::<Option<String>, _>("tech_stack").as_deref(),
            Some("Rust, Tokio")
        );
    }
}

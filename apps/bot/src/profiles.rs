//! Profile store — one persisted row per Telegram user.
//!
//! Every operation is a single SQL statement, so each call is atomic
//! and `created_at` (set on first insert) is never touched by updates.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub tech_stack: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl Profile {
    /// A profile is complete iff name, gender, and tech stack are all
    /// present and non-empty.
    pub fn is_complete(&self) -> bool {
        has_value(&self.name) && has_value(&self.gender) && has_value(&self.tech_stack)
    }

    /// True when name and stack are both set, regardless of gender.
    /// Used by the gender step to decide whether the rest of the intake
    /// sequence still has to run.
    pub fn has_name_and_stack(&self) -> bool {
        has_value(&self.name) && has_value(&self.tech_stack)
    }
}

fn has_value(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.is_empty())
}

/// Returns the full profile, or `None` if the user has never saved anything.
pub async fn get_profile(pool: &SqlitePool, user_id: i64) -> Result<Option<Profile>, sqlx::Error> {
    sqlx::query_as::<_, Profile>("SELECT * FROM user_stacks WHERE user_id = ?1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

/// Inserts a new row with only the stack set, or replaces the stack on
/// an existing row. Name, gender, and `created_at` are left untouched.
pub async fn upsert_stack(pool: &SqlitePool, user_id: i64, stack: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_stacks (user_id, tech_stack) VALUES (?1, ?2)
         ON CONFLICT(user_id) DO UPDATE SET tech_stack = excluded.tech_stack",
    )
    .bind(user_id)
    .bind(stack)
    .execute(pool)
    .await?;
    Ok(())
}

/// Partial update of name and/or gender. `None` fields are never
/// cleared. Creates the row (with an empty stack) if it does not exist.
pub async fn update_fields(
    pool: &SqlitePool,
    user_id: i64,
    name: Option<&str>,
    gender: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO user_stacks (user_id, name, gender, tech_stack) VALUES (?1, ?2, ?3, '')
         ON CONFLICT(user_id) DO UPDATE SET
             name   = COALESCE(excluded.name, user_stacks.name),
             gender = COALESCE(excluded.gender, user_stacks.gender)",
    )
    .bind(user_id)
    .bind(name)
    .bind(gender)
    .execute(pool)
    .await?;
    Ok(())
}

/// Derived completeness check. A missing row is simply incomplete,
/// not an error.
pub async fn is_complete(pool: &SqlitePool, user_id: i64) -> Result<bool, sqlx::Error> {
    Ok(get_profile(pool, user_id)
        .await?
        .map(|p| p.is_complete())
        .unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{init_schema, memory_pool};

    async fn test_pool() -> SqlitePool {
        let pool = memory_pool().await;
        init_schema(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn test_get_profile_missing_user() {
        let pool = test_pool().await;
        assert!(get_profile(&pool, 42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_is_complete_missing_user_is_false() {
        let pool = test_pool().await;
        assert!(!is_complete(&pool, 42).await.unwrap());
    }

    #[tokio::test]
    async fn test_is_complete_all_field_permutations() {
        let pool = test_pool().await;
        let cases = [
            (Some("Иван"), Some("мужской"), Some("Rust, Tokio"), true),
            (None, Some("мужской"), Some("Rust, Tokio"), false),
            (Some("Иван"), None, Some("Rust, Tokio"), false),
            (Some("Иван"), Some("мужской"), None, false),
            (Some("Иван"), None, None, false),
            (None, Some("мужской"), None, false),
            (None, None, Some("Rust, Tokio"), false),
            (None, None, None, false),
        ];

        for (i, (name, gender, stack, expected)) in cases.into_iter().enumerate() {
            let user_id = i as i64 + 1;
            update_fields(&pool, user_id, name, gender).await.unwrap();
            if let Some(stack) = stack {
                upsert_stack(&pool, user_id, stack).await.unwrap();
            }
            assert_eq!(
                is_complete(&pool, user_id).await.unwrap(),
                expected,
                "case {i}: name={name:?} gender={gender:?} stack={stack:?}"
            );
        }
    }

    #[tokio::test]
    async fn test_empty_stack_counts_as_incomplete() {
        let pool = test_pool().await;
        // update_fields seeds tech_stack = '' on insert.
        update_fields(&pool, 1, Some("Иван"), Some("мужской"))
            .await
            .unwrap();
        assert!(!is_complete(&pool, 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_fields_creates_row_with_empty_stack() {
        let pool = test_pool().await;
        update_fields(&pool, 1, Some("Иван"), None).await.unwrap();

        let profile = get_profile(&pool, 1).await.unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("Иван"));
        assert_eq!(profile.gender, None);
        assert_eq!(profile.tech_stack.as_deref(), Some(""));
        assert!(profile.created_at.is_some());
    }

    #[tokio::test]
    async fn test_update_fields_never_clears_absent_fields() {
        let pool = test_pool().await;
        update_fields(&pool, 1, Some("Иван"), Some("мужской"))
            .await
            .unwrap();
        upsert_stack(&pool, 1, "Rust, Tokio, sqlx").await.unwrap();

        // Update only the name; gender and stack must survive byte-for-byte.
        update_fields(&pool, 1, Some("Пётр"), None).await.unwrap();

        let profile = get_profile(&pool, 1).await.unwrap().unwrap();
        assert_eq!(profile.name.as_deref(), Some("Пётр"));
        assert_eq!(profile.gender.as_deref(), Some("мужской"));
        assert_eq!(profile.tech_stack.as_deref(), Some("Rust, Tokio, sqlx"));
    }

    #[tokio::test]
    async fn test_upsert_stack_preserves_other_fields_and_created_at() {
        let pool = test_pool().await;
        update_fields(&pool, 1, Some("Иван"), Some("мужской"))
            .await
            .unwrap();
        let before = get_profile(&pool, 1).await.unwrap().unwrap();

        upsert_stack(&pool, 1, "Rust, Tokio, sqlx").await.unwrap();
        upsert_stack(&pool, 1, "Python, Django").await.unwrap();

        let after = get_profile(&pool, 1).await.unwrap().unwrap();
        assert_eq!(after.name.as_deref(), Some("Иван"));
        assert_eq!(after.gender.as_deref(), Some("мужской"));
        assert_eq!(after.tech_stack.as_deref(), Some("Python, Django"));
        assert_eq!(after.created_at, before.created_at);
    }

    #[tokio::test]
    async fn test_upsert_stack_on_fresh_user() {
        let pool = test_pool().await;
        upsert_stack(&pool, 7, "Rust, Tokio, sqlx").await.unwrap();

        let profile = get_profile(&pool, 7).await.unwrap().unwrap();
        assert_eq!(profile.tech_stack.as_deref(), Some("Rust, Tokio, sqlx"));
        assert_eq!(profile.name, None);
        assert_eq!(profile.gender, None);
        assert!(!profile.is_complete());
    }
}

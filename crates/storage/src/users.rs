//! User records and the repository over the `users` table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Result, StorageError};

/// A user record as persisted in the `users` table.
///
/// `id` is assigned by [`UserRepository::save`] on first insert and never
/// rewritten afterwards. `email` is unique across all rows, enforced by the
/// schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Primary key, a UUIDv4 in string form.
    pub id: String,
    /// Display name, no format constraint.
    pub name: String,
    /// Unique email address.
    pub email: String,
}

impl User {
    /// Builds an unsaved record with no id. `save` assigns one on insert.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Data-access abstraction over the record store.
///
/// The service layer is written against this trait so tests and future
/// backends can swap implementations without touching the handlers.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Looks up a single record by id, `None` if absent.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>>;

    /// Returns every record currently in the store, fully materialized,
    /// in unspecified order.
    async fn find_all(&self) -> Result<Vec<User>>;

    /// Inserts the record (assigning a fresh id when empty) or overwrites
    /// the mutable fields of the row with the same id.
    ///
    /// Fails with [`StorageError::EmailTaken`] when the resulting email
    /// value collides with a different existing row.
    async fn save(&self, user: User) -> Result<User>;

    /// Removes the row matching the record's id.
    async fn delete(&self, user: &User) -> Result<()>;
}

/// `SQLite`-backed repository implementation.
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Creates a repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>("SELECT id, name, email FROM users")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn save(&self, mut user: User) -> Result<User> {
        if user.id.is_empty() {
            user.id = Uuid::new_v4().to_string();
        }

        // Upsert keyed on id: a fresh UUID inserts, an existing id has its
        // mutable fields overwritten. Any unique violation that survives the
        // ON CONFLICT(id) clause is therefore the email constraint.
        sqlx::query(
            "INSERT INTO users (id, name, email) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, email = excluded.email",
        )
        .bind(&user.id)
        .bind(&user.name)
        .bind(&user.email)
        .execute(&self.pool)
        .await
        .map_err(|e| email_conflict(e, &user.email))?;

        Ok(user)
    }

    async fn delete(&self, user: &User) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(&user.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Maps a unique-constraint violation onto [`StorageError::EmailTaken`],
/// passing every other database error through untouched.
fn email_conflict(err: sqlx::Error, email: &str) -> StorageError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::EmailTaken {
            email: email.to_owned(),
        },
        other => StorageError::Database(other),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::{memory_pool, run_migrations};

    async fn repository() -> SqliteUserRepository {
        let pool = memory_pool().await.expect("create pool");
        run_migrations(&pool).await.expect("run migrations");
        SqliteUserRepository::new(pool)
    }

    #[tokio::test]
    async fn save_assigns_id_on_insert() {
        let repo = repository().await;

        let saved = repo.save(User::new("Alice", "a@x.com")).await.unwrap();

        assert!(!saved.id.is_empty(), "insert should assign an id");
        assert_eq!(saved.name, "Alice");
        assert_eq!(saved.email, "a@x.com");
    }

    #[tokio::test]
    async fn save_keeps_existing_id_on_update() {
        let repo = repository().await;

        let saved = repo.save(User::new("Alice", "a@x.com")).await.unwrap();
        let mut updated = saved.clone();
        updated.name = "Alicia".to_string();
        updated.email = "alicia@x.com".to_string();

        let updated = repo.save(updated).await.unwrap();
        assert_eq!(updated.id, saved.id, "update must not rewrite the id");

        let fetched = repo.find_by_id(&saved.id).await.unwrap().unwrap();
        assert_eq!(fetched, updated);
    }

    #[tokio::test]
    async fn save_rejects_duplicate_email() {
        let repo = repository().await;

        repo.save(User::new("Alice", "a@x.com")).await.unwrap();
        let err = repo.save(User::new("Bob", "a@x.com")).await.unwrap_err();

        assert!(
            matches!(err, StorageError::EmailTaken { ref email } if email == "a@x.com"),
            "expected EmailTaken, got: {err:?}"
        );

        // The failed insert must not have altered the store
        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Alice");
    }

    #[tokio::test]
    async fn update_to_taken_email_rejected() {
        let repo = repository().await;

        repo.save(User::new("Alice", "a@x.com")).await.unwrap();
        let bob = repo.save(User::new("Bob", "b@x.com")).await.unwrap();

        let mut stolen = bob.clone();
        stolen.email = "a@x.com".to_string();
        let err = repo.save(stolen).await.unwrap_err();
        assert!(matches!(err, StorageError::EmailTaken { .. }));

        // Bob's row is unchanged
        let fetched = repo.find_by_id(&bob.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "b@x.com");
    }

    #[tokio::test]
    async fn update_keeping_own_email_succeeds() {
        let repo = repository().await;

        let alice = repo.save(User::new("Alice", "a@x.com")).await.unwrap();
        let mut renamed = alice.clone();
        renamed.name = "Alicia".to_string();

        // Same email, same row: not a collision with a *different* record
        let renamed = repo.save(renamed).await.unwrap();
        assert_eq!(renamed.email, "a@x.com");
        assert_eq!(renamed.name, "Alicia");
    }

    #[tokio::test]
    async fn find_by_id_missing_returns_none() {
        let repo = repository().await;

        let found = repo.find_by_id("no-such-id").await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn find_all_returns_every_row() {
        let repo = repository().await;

        let a = repo.save(User::new("Alice", "a@x.com")).await.unwrap();
        let b = repo.save(User::new("Bob", "b@x.com")).await.unwrap();

        let mut ids: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        ids.sort();
        let mut expected = vec![a.id, b.id];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let repo = repository().await;

        let alice = repo.save(User::new("Alice", "a@x.com")).await.unwrap();
        repo.delete(&alice).await.unwrap();

        assert!(repo.find_by_id(&alice.id).await.unwrap().is_none());
        assert!(repo.find_all().await.unwrap().is_empty());
    }
}

//! Post records and the repository over the `posts` table.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::Result;

/// A post record as persisted in the `posts` table.
///
/// `id` is assigned by [`PostRepository::save`] on first insert. Unlike users,
/// posts carry no uniqueness constraint beyond the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    /// Primary key, a UUIDv4 in string form.
    pub id: String,
    /// Post title, no format constraint.
    pub title: String,
    /// Post body text.
    pub body: String,
}

impl Post {
    /// Builds an unsaved record with no id. `save` assigns one on insert.
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Data-access abstraction over the post store, mirroring [`UserRepository`].
///
/// [`UserRepository`]: crate::UserRepository
#[async_trait]
pub trait PostRepository: Send + Sync + 'static {
    /// Looks up a single record by id, `None` if absent.
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>>;

    /// Returns every record currently in the store, in unspecified order.
    async fn find_all(&self) -> Result<Vec<Post>>;

    /// Inserts the record (assigning a fresh id when empty) or overwrites
    /// the mutable fields of the row with the same id.
    async fn save(&self, post: Post) -> Result<Post>;

    /// Removes the row matching the record's id.
    async fn delete(&self, post: &Post) -> Result<()>;
}

/// `SQLite`-backed repository implementation.
#[derive(Debug, Clone)]
pub struct SqlitePostRepository {
    pool: SqlitePool,
}

impl SqlitePostRepository {
    /// Creates a repository over the given pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<Post>> {
        let row = sqlx::query_as::<_, Post>("SELECT id, title, body FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn find_all(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query_as::<_, Post>("SELECT id, title, body FROM posts")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn save(&self, mut post: Post) -> Result<Post> {
        if post.id.is_empty() {
            post.id = Uuid::new_v4().to_string();
        }

        // Upsert keyed on id: a fresh UUID inserts, an existing id has its
        // mutable fields overwritten.
        sqlx::query(
            "INSERT INTO posts (id, title, body) VALUES (?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET title = excluded.title, body = excluded.body",
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.body)
        .execute(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete(&self, post: &Post) -> Result<()> {
        sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(&post.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

pub mod memory;
pub mod post_repository;
pub mod user_repository;

use async_trait::async_trait;
use deadpool_postgres::Pool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::post::{NewPost, Post};
use crate::models::user::{NewUser, User};

pub use memory::InMemoryStore;
pub use post_repository::PgPostRepository;
pub use user_repository::PgUserRepository;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),
    #[error("database error: {0}")]
    Database(#[from] tokio_postgres::Error),
    #[error("email already registered")]
    DuplicateEmail,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Fails with [`RepoError::DuplicateEmail`] when the email is taken.
    async fn create(&self, new_user: NewUser) -> Result<User, RepoError>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError>;

    /// All posts, oldest first.
    async fn list(&self) -> Result<Vec<Post>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Returns the removed post, `None` when nothing matched.
    async fn delete(&self, id: Uuid) -> Result<Option<Post>, RepoError>;
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id          UUID PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    password    TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE UNIQUE INDEX IF NOT EXISTS users_email_key ON users (email);

CREATE TABLE IF NOT EXISTS posts (
    id          UUID PRIMARY KEY,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    content     TEXT NOT NULL,
    thumbnail   TEXT NOT NULL,
    created_by  TEXT NOT NULL,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS posts_created_at_idx ON posts (created_at);
"#;

/// Creates the `users` and `posts` tables when they are missing.
pub async fn ensure_schema(pool: &Pool) -> Result<(), RepoError> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    Ok(())
}

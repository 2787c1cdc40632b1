// src/repositories/user_repository.rs
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::error::SqlState;
use tokio_postgres::Row;
use uuid::Uuid;

use super::{RepoError, UserRepository};
use crate::models::user::{NewUser, User};

#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool,
}

impl PgUserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        password: row.get("password"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, name, email, password, created_at FROM users WHERE email = $1",
                &[&email],
            )
            .await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let row = client
            .query_one(
                "INSERT INTO users (id, name, email, password) VALUES ($1, $2, $3, $4) \
                 RETURNING id, name, email, password, created_at",
                &[&id, &new_user.name, &new_user.email, &new_user.password_hash],
            )
            .await
            .map_err(|e| {
                if e.code() == Some(&SqlState::UNIQUE_VIOLATION) {
                    RepoError::DuplicateEmail
                } else {
                    RepoError::Database(e)
                }
            })?;
        Ok(user_from_row(&row))
    }
}

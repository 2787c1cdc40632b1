// src/repositories/post_repository.rs
use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio_postgres::Row;
use uuid::Uuid;

use super::{PostRepository, RepoError};
use crate::models::post::{NewPost, Post};

const POST_COLUMNS: &str = "id, title, description, content, thumbnail, created_by, created_at";

#[derive(Clone)]
pub struct PgPostRepository {
    pool: Pool,
}

impl PgPostRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

fn post_from_row(row: &Row) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        content: row.get("content"),
        thumbnail: row.get("thumbnail"),
        created_by: row.get("created_by"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let client = self.pool.get().await?;
        let id = Uuid::new_v4();
        let sql = format!(
            "INSERT INTO posts (id, title, description, content, thumbnail, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {POST_COLUMNS}"
        );
        let row = client
            .query_one(
                sql.as_str(),
                &[
                    &id,
                    &new_post.title,
                    &new_post.description,
                    &new_post.content,
                    &new_post.thumbnail,
                    &new_post.created_by,
                ],
            )
            .await?;
        Ok(post_from_row(&row))
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at ASC");
        let rows = client.query(sql.as_str(), &[]).await?;
        Ok(rows.iter().map(post_from_row).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(post_from_row))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let client = self.pool.get().await?;
        let sql = format!("DELETE FROM posts WHERE id = $1 RETURNING {POST_COLUMNS}");
        let row = client.query_opt(sql.as_str(), &[&id]).await?;
        Ok(row.as_ref().map(post_from_row))
    }
}

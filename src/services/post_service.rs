// src/services/post_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{ApiError, ApiResult};
use crate::models::post::{NewPost, Post};
use crate::repositories::PostRepository;
use crate::services::upload_service::{PostForm, UploadService};
use crate::validation::PostDraft;

fn not_found() -> ApiError {
    ApiError::NotFound("Post not found".to_string())
}

/// Ids that are not UUIDs cannot name a post, so they read as "not found".
fn parse_post_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| not_found())
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    uploads: UploadService,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, uploads: UploadService) -> Self {
        Self { posts, uploads }
    }

    /// Validate → store thumbnail → insert. The thumbnail reaches the disk only after the form
    /// passed validation and is removed again if the insert fails.
    pub async fn create(&self, author: Uuid, form: PostForm) -> ApiResult<Post> {
        let draft = PostDraft::from_payload(&form.fields)?;
        let upload = form
            .thumbnail
            .ok_or_else(|| ApiError::Validation("\"thumbnail\" is required".to_string()))?;

        let stored = self.uploads.persist(upload).await?;

        let new_post = NewPost {
            title: draft.title,
            description: draft.description,
            content: draft.content,
            thumbnail: stored.public_path.clone(),
            created_by: author.to_string(),
        };

        match self.posts.insert(new_post).await {
            Ok(post) => {
                log::info!("post {} created by {}", post.id, author);
                Ok(post)
            }
            Err(e) => {
                self.uploads.discard(&stored).await;
                Err(e.into())
            }
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Post>> {
        Ok(self.posts.list().await?)
    }

    pub async fn get(&self, raw_id: &str) -> ApiResult<Post> {
        let id = parse_post_id(raw_id)?;
        self.posts.find_by_id(id).await?.ok_or_else(not_found)
    }

    /// Removes the post and then its thumbnail file.
    pub async fn delete(&self, raw_id: &str, requested_by: Uuid) -> ApiResult<()> {
        let id = parse_post_id(raw_id)?;
        let post = self.posts.delete(id).await?.ok_or_else(not_found)?;

        if let Some(stored) = self.uploads.locate(&post.thumbnail) {
            self.uploads.discard(&stored).await;
        }
        log::info!("post {} deleted by {}", post.id, requested_by);
        Ok(())
    }
}

// src/repositories/memory.rs - process-local store for development runs and tests
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PostRepository, RepoError, UserRepository};
use crate::models::post::{NewPost, Post};
use crate::models::user::{NewUser, User};

/// Both collections behind one handle. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    users: Arc<RwLock<Vec<User>>>,
    posts: Arc<RwLock<Vec<Post>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(RepoError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password: new_user.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let post = Post {
            id: Uuid::new_v4(),
            title: new_post.title,
            description: new_post.description,
            content: new_post.content,
            thumbnail: new_post.thumbnail,
            created_by: new_post.created_by,
            created_at: Utc::now(),
        };
        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn list(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.posts.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let mut posts = self.posts.write().await;
        Ok(posts
            .iter()
            .position(|p| p.id == id)
            .map(|idx| posts.remove(idx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Jane Doe".into(),
            email: email.into(),
            password_hash: "$2b$10$hash".into(),
        }
    }

    fn new_post(title: &str) -> NewPost {
        NewPost {
            title: title.into(),
            description: "a description".into(),
            content: "content that is long enough".into(),
            thumbnail: "storage/x.png".into(),
            created_by: Uuid::new_v4().to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = InMemoryStore::new();
        store.create(new_user("jane@example.com")).await.unwrap();

        let err = store.create(new_user("jane@example.com")).await.unwrap_err();
        assert!(matches!(err, RepoError::DuplicateEmail));
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn concurrent_registrations_keep_one_user() {
        let store = InMemoryStore::new();
        let a = store.clone();
        let b = store.clone();

        let (ra, rb) = tokio::join!(
            a.create(new_user("race@example.com")),
            b.create(new_user("race@example.com"))
        );
        assert!(ra.is_ok() ^ rb.is_ok());
        assert_eq!(store.user_count().await, 1);
    }

    #[tokio::test]
    async fn find_by_email_matches_exactly() {
        let store = InMemoryStore::new();
        let created = store.create(new_user("jane@example.com")).await.unwrap();

        let found = store.find_by_email("jane@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert!(store.find_by_email("john@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn posts_keep_insertion_order_and_delete_once() {
        let store = InMemoryStore::new();
        let first = store.insert(new_post("first")).await.unwrap();
        let second = store.insert(new_post("second")).await.unwrap();

        let titles: Vec<_> = store.list().await.unwrap().into_iter().map(|p| p.title).collect();
        assert_eq!(titles, vec!["first", "second"]);

        assert_eq!(store.delete(first.id).await.unwrap(), Some(first.clone()));
        assert_eq!(store.delete(first.id).await.unwrap(), None);
        assert_eq!(store.find_by_id(second.id).await.unwrap(), Some(second));
    }
}

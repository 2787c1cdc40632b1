use serde::{Deserialize, Serialize};

use crate::models::post::Post;

#[derive(Debug, Serialize, Deserialize)]
pub struct PostOut {
    pub post: Post,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageOut {
    pub message: String,
}

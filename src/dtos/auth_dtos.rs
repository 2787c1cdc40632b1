use serde::{Deserialize, Serialize};

use crate::models::user::UserPublic;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterOut {
    pub user: UserPublic,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenOut {
    pub token: String,
}

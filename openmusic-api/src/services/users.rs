//! Registered users

use openmusic_common::Result;
use std::sync::Arc;
use tracing::info;

use crate::models::{NewUser, User};
use crate::store::UserStore;

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    pub async fn add_user(&self, user: NewUser) -> Result<String> {
        let id = self.users.add(user).await?;
        info!(user_id = %id, "User registered");
        Ok(id)
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        self.users.get(id).await
    }

    /// `NotFound` if no user has this id
    pub async fn verify_user_exists(&self, id: &str) -> Result<()> {
        self.users.get(id).await.map(|_| ())
    }
}

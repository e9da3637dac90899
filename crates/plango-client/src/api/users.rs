use plango_types::{User, UserUpdate};
use tracing::info;

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;

pub struct UsersApi<'a> {
    client: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.request("/users/me", RequestOptions::get()).await
    }

    pub async fn update_me(&self, update: &UserUpdate) -> Result<User, ApiError> {
        let options = RequestOptions::put().json(update)?;
        self.client.request("/users/me", options).await
    }

    /// Deletes the account and drops the now useless session tokens.
    pub async fn delete_me(&self) -> Result<(), ApiError> {
        self.client
            .request::<()>("/users/me", RequestOptions::delete())
            .await?;
        self.client.session().clear()?;
        info!("account deleted");
        Ok(())
    }

    /// Legacy per-id profile lookup.
    pub async fn get(&self, user_id: i64) -> Result<User, ApiError> {
        self.client
            .request(&format!("/users/{user_id}"), RequestOptions::get())
            .await
    }

    /// Legacy per-id profile update.
    pub async fn update(&self, user_id: i64, update: &UserUpdate) -> Result<User, ApiError> {
        let options = RequestOptions::put().json(update)?;
        self.client
            .request(&format!("/users/{user_id}"), options)
            .await
    }
}

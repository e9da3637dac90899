use plango_types::{
    LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest, RegisterRequest,
    TokenResponse, User,
};
use tracing::info;

use crate::client::{ApiClient, RequestOptions};
use crate::error::ApiError;

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl<'a> AuthApi<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Creates an account and signs in with the returned tokens.
    pub async fn register(&self, request: &RegisterRequest) -> Result<LoginResponse, ApiError> {
        let options = RequestOptions::post().json(request)?.anonymous();
        let response: LoginResponse = self.client.request("/auth/register", options).await?;
        self.store(&response)?;
        info!(user_id = response.user.id, "registered");
        Ok(response)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let options = RequestOptions::post()
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })?
            .anonymous();
        let response: LoginResponse = self.client.request("/auth/login", options).await?;
        self.store(&response)?;
        info!(user_id = response.user.id, "logged in");
        Ok(response)
    }

    /// Trades a refresh token for a new pair without touching the session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, ApiError> {
        self.client.exchange_refresh_token(refresh_token).await
    }

    /// Revokes the stored refresh token server-side. The local session is
    /// cleared even when the server call fails.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let session = self.client.session();
        let result = match session.refresh_token() {
            Some(refreshToken) => {
                let options = RequestOptions::post().json(&RefreshTokenRequest {
                    refresh_token: refreshToken,
                })?;
                self.client
                    .request::<Option<MessageResponse>>("/auth/logout", options)
                    .await
                    .map(|_| ())
            }
            None => Ok(()),
        };

        session.clear()?;
        info!("logged out");
        result
    }

    /// Revokes every refresh token of the current user.
    pub async fn revoke_all(&self) -> Result<MessageResponse, ApiError> {
        self.client
            .request("/auth/revoke-all", RequestOptions::post())
            .await
    }

    pub async fn me(&self) -> Result<User, ApiError> {
        self.client.request("/auth/me", RequestOptions::get()).await
    }

    fn store(&self, response: &LoginResponse) -> Result<(), ApiError> {
        self.client
            .session()
            .set_tokens(&response.access_token, Some(&response.refresh_token))?;
        Ok(())
    }
}

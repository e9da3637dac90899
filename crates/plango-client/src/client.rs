use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::{Method, StatusCode};
use plango_types::{RefreshTokenRequest, TokenResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ApiConfig;
use crate::error::{error_message, ApiError};
use crate::session::Session;

/// Method, body and headers of one API call.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    /// Skip bearer attachment and the refresh-on-401 policy.
    pub anonymous: bool,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn delete() -> Self {
        Self::with_method(Method::DELETE)
    }

    pub fn post() -> Self {
        Self::with_method(Method::POST)
    }

    pub fn put() -> Self {
        Self::with_method(Method::PUT)
    }

    pub fn patch() -> Self {
        Self::with_method(Method::PATCH)
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ApiError> {
        self.body = Some(serde_json::to_value(body).map_err(ApiError::Encode)?);
        Ok(self)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.anonymous = true;
        self
    }
}

/// REST client for the Plan & Go API. Clones share the session and the
/// connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<Session>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ApiError::Network)?;

        let baseUrl = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&baseUrl).map_err(|e| ApiError::InvalidUrl {
            url: baseUrl.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            http,
            base_url: baseUrl,
            session,
        })
    }

    /// Client against `base_url` with a fresh in-memory session.
    pub fn in_memory(base_url: &str) -> Result<Self, ApiError> {
        let config = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        Self::new(&config, Arc::new(Session::in_memory()))
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Runs a call and decodes the JSON response. An empty or non-JSON
    /// body decodes as `null`, so `()` and `Option<T>` accept it.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let attemptRefresh = !options.anonymous;
        let body = self.send(endpoint, &options, attemptRefresh).await?;
        serde_json::from_value(body.unwrap_or(Value::Null)).map_err(ApiError::Decode)
    }

    /// Runs a call with bearer attachment and the 401 policy: on the first
    /// 401 the session is refreshed once and the call is retried once.
    pub async fn send(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        attemptRefresh: bool,
    ) -> Result<Option<Value>, ApiError> {
        let sentToken = if options.anonymous {
            None
        } else {
            self.session.access_token()
        };

        let response = self.dispatch(endpoint, options, sentToken.as_deref()).await?;

        if response.status() == StatusCode::UNAUTHORIZED && attemptRefresh {
            if let Some(freshToken) = self.refresh_after_unauthorized(sentToken.as_deref()).await {
                debug!(%endpoint, "retrying after token refresh");
                let retried = self.dispatch(endpoint, options, Some(&freshToken)).await?;
                return finish(retried).await;
            }
        }

        finish(response).await
    }

    async fn dispatch(
        &self,
        endpoint: &str,
        options: &RequestOptions,
        accessToken: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(endpoint)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in &options.headers {
            headers.insert(name.clone(), value.clone());
        }
        if let Some(token) = accessToken {
            let bearer = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ApiError::Validation(format!("access token is not a valid header value: {e}"))
            })?;
            headers.insert(AUTHORIZATION, bearer);
        }

        debug!(method = %options.method, %endpoint, "sending request");

        let mut request = self.http.request(options.method.clone(), url).headers(headers);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.body(body.to_string());
        }

        request.send().await.map_err(ApiError::Network)
    }

    fn url(&self, endpoint: &str) -> Result<reqwest::Url, ApiError> {
        let full = format!("{}{}", self.base_url, endpoint);
        reqwest::Url::parse(&full).map_err(|e| ApiError::InvalidUrl {
            url: full,
            reason: e.to_string(),
        })
    }

    /// Decides, under the refresh gate, which token a 401'd call should
    /// retry with. Callers that lost the race reuse the winner's token
    /// instead of refreshing again.
    async fn refresh_after_unauthorized(&self, sentToken: Option<&str>) -> Option<String> {
        let _gate = self.session.refresh_gate().lock().await;

        match (sentToken, self.session.access_token()) {
            (Some(sent), Some(current)) if sent != current => return Some(current),
            (None, Some(current)) => return Some(current),
            (Some(_), None) => {
                debug!("session ended while waiting for refresh");
                return None;
            }
            _ => {}
        }

        if self.run_refresh().await {
            self.session.access_token()
        } else {
            None
        }
    }

    /// Exchanges the stored refresh token for a new pair. Any failure ends
    /// the session.
    pub async fn refresh_session(&self) -> bool {
        let _gate = self.session.refresh_gate().lock().await;
        self.run_refresh().await
    }

    async fn run_refresh(&self) -> bool {
        let Some(refreshToken) = self.session.refresh_token() else {
            warn!("no refresh token stored, ending session");
            self.end_session();
            return false;
        };

        match self.exchange_refresh_token(&refreshToken).await {
            Ok(tokens) => match self
                .session
                .set_tokens(&tokens.access_token, Some(&tokens.refresh_token))
            {
                Ok(()) => {
                    info!("session refreshed");
                    true
                }
                Err(e) => {
                    warn!("failed to store refreshed tokens: {e}");
                    self.end_session();
                    false
                }
            },
            Err(e) => {
                warn!("token refresh failed: {e}");
                self.end_session();
                false
            }
        }
    }

    /// Raw call to `/auth/refresh`. Bypasses the 401 policy.
    pub(crate) async fn exchange_refresh_token(
        &self,
        refreshToken: &str,
    ) -> Result<TokenResponse, ApiError> {
        let options = RequestOptions::post().json(&RefreshTokenRequest {
            refresh_token: refreshToken.to_string(),
        })?;
        let accessToken = self.session.access_token();
        let response = self
            .dispatch("/auth/refresh", &options, accessToken.as_deref())
            .await?;
        let body = finish(response).await?;
        serde_json::from_value(body.unwrap_or(Value::Null)).map_err(ApiError::Decode)
    }

    fn end_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!("failed to clear session tokens: {e}");
        }
    }
}

async fn finish(response: reqwest::Response) -> Result<Option<Value>, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(ApiError::Network)?;
    let body = parse_lenient(&bytes);

    if status.is_success() {
        return Ok(body);
    }

    let message = error_message(body.as_ref());
    debug!(%status, %message, "request failed");
    if status == StatusCode::UNAUTHORIZED {
        Err(ApiError::Unauthorized { message })
    } else {
        Err(ApiError::Status { status, message })
    }
}

/// Empty or non-JSON bodies read as absent rather than failing.
fn parse_lenient(bytes: &[u8]) -> Option<Value> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parsing() {
        assert_eq!(parse_lenient(b""), None);
        assert_eq!(parse_lenient(b"  \n"), None);
        assert_eq!(parse_lenient(b"<html>oops</html>"), None);
        assert_eq!(parse_lenient(b"null"), Some(Value::Null));
        assert_eq!(parse_lenient(br#"{"a":1}"#), Some(serde_json::json!({ "a": 1 })));
    }

    #[test]
    fn endpoints_join_onto_base_url() {
        let client = ApiClient::in_memory("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/trips/4/members").unwrap().as_str(),
            "http://localhost:8000/trips/4/members"
        );
    }

    #[test]
    fn rejects_unparsable_base_url() {
        assert!(matches!(
            ApiClient::in_memory("not a url"),
            Err(ApiError::InvalidUrl { .. })
        ));
    }
}

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use plango_types::{
    LoginRequest, LoginResponse, MessageResponse, RefreshTokenRequest, RegisterRequest,
    TokenResponse, User,
};
use tracing::debug;

use crate::error::{StubError, StubResult};
use crate::state::{RecordedRequest, StubState, INVALID_CREDENTIALS};

/// Id of the user whose bearer token authorized the request.
#[derive(Clone, Copy, Debug)]
pub struct CurrentUser(pub i64);

pub fn auth_routes(state: StubState) -> Router<StubState> {
    let public = Router::new()
        .route("/auth/register", post(handle_register))
        .route("/auth/login", post(handle_login))
        .route("/auth/refresh", post(handle_refresh))
        .route("/auth/logout", post(handle_logout));

    let protected = Router::new()
        .route("/auth/me", get(handle_me))
        .route("/auth/revoke-all", post(handle_revoke_all))
        .route_layer(middleware::from_fn_with_state(state, require_api_auth));

    public.merge(protected)
}

async fn handle_register(
    State(state): State<StubState>,
    Json(body): Json<RegisterRequest>,
) -> StubResult<(StatusCode, Json<LoginResponse>)> {
    if !body.email.contains('@') {
        return Err(StubError::validation("email", "value is not a valid email address"));
    }
    let response = state.register(body.name, &body.email, &body.password)?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn handle_login(
    State(state): State<StubState>,
    Json(body): Json<LoginRequest>,
) -> StubResult<Json<LoginResponse>> {
    state.login(&body.email, &body.password).map(Json)
}

async fn handle_refresh(
    State(state): State<StubState>,
    Json(body): Json<RefreshTokenRequest>,
) -> StubResult<Json<TokenResponse>> {
    state.refresh(&body.refresh_token).map(Json)
}

async fn handle_logout(
    State(state): State<StubState>,
    Json(body): Json<RefreshTokenRequest>,
) -> StubResult<Json<MessageResponse>> {
    state.logout(&body.refresh_token)?;
    Ok(Json(MessageResponse {
        message: "Successfully logged out".into(),
    }))
}

async fn handle_revoke_all(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
) -> Json<MessageResponse> {
    let revoked = state.revoke_all(userId);
    Json(MessageResponse {
        message: format!("Revoked {revoked} refresh tokens"),
    })
}

async fn handle_me(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
) -> StubResult<Json<User>> {
    state.user(userId).map(Json)
}

/// Middleware for API routes: checks Authorization: Bearer <token> header.
pub async fn require_api_auth(
    State(state): State<StubState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let userId = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .and_then(|token| state.authenticate(token));

    let Some(userId) = userId else {
        debug!(path = %request.uri().path(), "rejecting unauthenticated request");
        return StubError::unauthorized(INVALID_CREDENTIALS).into_response();
    };

    request.extensions_mut().insert(CurrentUser(userId));
    next.run(request).await
}

/// Records every request so tests can inspect what the client sent.
pub async fn record_request(
    State(state): State<StubState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    state.record(RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    next.run(request).await
}

fn bearer_token(headerValue: &str) -> Option<&str> {
    headerValue
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer access-1"), Some("access-1"));
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Basic dXNlcjpwYXNz"), None);
    }
}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use plango_types::{User, UserUpdate};

use crate::error::{StubError, StubResult};
use crate::middleware::auth::{require_api_auth, CurrentUser};
use crate::state::StubState;

pub fn routes(state: StubState) -> Router<StubState> {
    Router::new()
        .route(
            "/users/me",
            get(get_me).put(update_me).delete(delete_me),
        )
        .route("/users/:user_id", get(get_user).put(update_user))
        .route_layer(middleware::from_fn_with_state(state, require_api_auth))
}

async fn get_me(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
) -> StubResult<Json<User>> {
    state.user(userId).map(Json)
}

async fn update_me(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Json(update): Json<UserUpdate>,
) -> StubResult<Json<User>> {
    state.update_user(userId, update).map(Json)
}

async fn delete_me(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
) -> StubResult<StatusCode> {
    state.delete_user(userId)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_user(
    State(state): State<StubState>,
    Path(userId): Path<i64>,
) -> StubResult<Json<User>> {
    state.user(userId).map(Json)
}

async fn update_user(
    State(state): State<StubState>,
    Extension(CurrentUser(currentId)): Extension<CurrentUser>,
    Path(userId): Path<i64>,
    Json(update): Json<UserUpdate>,
) -> StubResult<Json<User>> {
    if userId != currentId {
        return Err(StubError::forbidden("You can only edit your own profile"));
    }
    state.update_user(userId, update).map(Json)
}

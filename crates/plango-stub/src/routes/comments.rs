use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{delete, get},
    Extension, Json, Router,
};
use plango_types::{Comment, CommentCreate};

use crate::error::StubResult;
use crate::middleware::auth::{require_api_auth, CurrentUser};
use crate::routes::PageParams;
use crate::state::StubState;

pub fn routes(state: StubState) -> Router<StubState> {
    Router::new()
        .route(
            "/trips/:trip_id/comments",
            get(list_comments).post(add_comment),
        )
        .route("/trips/comments/:comment_id", delete(delete_comment))
        .route_layer(middleware::from_fn_with_state(state, require_api_auth))
}

async fn list_comments(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
    Query(page): Query<PageParams>,
) -> StubResult<Json<Vec<Comment>>> {
    state
        .trip_comments(userId, tripId, page.skip, page.limit)
        .map(Json)
}

async fn add_comment(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
    Json(create): Json<CommentCreate>,
) -> StubResult<(StatusCode, Json<Comment>)> {
    let comment = state.add_comment(userId, tripId, create.content)?;
    Ok((StatusCode::CREATED, Json(comment)))
}

async fn delete_comment(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(commentId): Path<i64>,
) -> StubResult<StatusCode> {
    state.delete_comment(userId, commentId)?;
    Ok(StatusCode::NO_CONTENT)
}

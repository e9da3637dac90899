use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use plango_types::{Message, MessageCreate};

use crate::error::StubResult;
use crate::middleware::auth::{require_api_auth, CurrentUser};
use crate::routes::PageParams;
use crate::state::StubState;

pub fn routes(state: StubState) -> Router<StubState> {
    Router::new()
        .route(
            "/trips/:trip_id/messages",
            get(list_messages).post(send_message),
        )
        .route_layer(middleware::from_fn_with_state(state, require_api_auth))
}

async fn list_messages(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
    Query(page): Query<PageParams>,
) -> StubResult<Json<Vec<Message>>> {
    state
        .trip_messages(userId, tripId, page.skip, page.limit)
        .map(Json)
}

async fn send_message(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
    Json(create): Json<MessageCreate>,
) -> StubResult<(StatusCode, Json<Message>)> {
    let message = state.send_message(userId, tripId, create.content)?;
    Ok((StatusCode::CREATED, Json(message)))
}

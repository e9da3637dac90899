use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use plango_types::{JoinRequest, TripMember};
use serde::Deserialize;

use crate::error::StubResult;
use crate::middleware::auth::{require_api_auth, CurrentUser};
use crate::state::StubState;

#[derive(Deserialize)]
struct RoleParams {
    new_role: String,
}

pub fn routes(state: StubState) -> Router<StubState> {
    Router::new()
        .route("/trips/:trip_id/join", post(join_trip))
        .route("/trips/:trip_id/members", get(list_members))
        .route(
            "/trips/:trip_id/members/:member_id",
            patch(update_role).delete(remove_member),
        )
        .route_layer(middleware::from_fn_with_state(state, require_api_auth))
}

async fn join_trip(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
    Json(_request): Json<JoinRequest>,
) -> StubResult<(StatusCode, Json<TripMember>)> {
    let member = state.join_trip(userId, tripId)?;
    Ok((StatusCode::CREATED, Json(member)))
}

async fn list_members(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
) -> StubResult<Json<Vec<TripMember>>> {
    state.trip_members(userId, tripId).map(Json)
}

async fn update_role(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path((tripId, memberId)): Path<(i64, i64)>,
    Query(params): Query<RoleParams>,
) -> StubResult<Json<TripMember>> {
    state
        .update_member_role(userId, tripId, memberId, &params.new_role)
        .map(Json)
}

async fn remove_member(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path((tripId, memberId)): Path<(i64, i64)>,
) -> StubResult<StatusCode> {
    state.remove_member(userId, tripId, memberId)?;
    Ok(StatusCode::NO_CONTENT)
}

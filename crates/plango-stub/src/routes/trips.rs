use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::get,
    Extension, Json, Router,
};
use plango_types::{Trip, TripCreate, TripUpdate};

use crate::error::StubResult;
use crate::middleware::auth::{require_api_auth, CurrentUser};
use crate::routes::PageParams;
use crate::state::StubState;

pub fn routes(state: StubState) -> Router<StubState> {
    Router::new()
        .route("/trips", get(list_trips).post(create_trip))
        .route(
            "/trips/:trip_id",
            get(get_trip).put(update_trip).delete(delete_trip),
        )
        .route_layer(middleware::from_fn_with_state(state, require_api_auth))
}

async fn list_trips(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Query(page): Query<PageParams>,
) -> Json<Vec<Trip>> {
    Json(state.user_trips(userId, page.skip, page.limit))
}

async fn create_trip(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Json(create): Json<TripCreate>,
) -> StubResult<(StatusCode, Json<Trip>)> {
    let trip = state.create_trip(userId, create)?;
    Ok((StatusCode::CREATED, Json(trip)))
}

async fn get_trip(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
) -> StubResult<Json<Trip>> {
    state.trip(userId, tripId).map(Json)
}

async fn update_trip(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
    Json(update): Json<TripUpdate>,
) -> StubResult<Json<Trip>> {
    state.update_trip(userId, tripId, update).map(Json)
}

async fn delete_trip(
    State(state): State<StubState>,
    Extension(CurrentUser(userId)): Extension<CurrentUser>,
    Path(tripId): Path<i64>,
) -> StubResult<StatusCode> {
    state.delete_trip(userId, tripId)?;
    Ok(StatusCode::NO_CONTENT)
}

pub mod comments;
pub mod members;
pub mod messages;
pub mod trips;
pub mod users;

use axum::Router;
use serde::Deserialize;

use crate::state::StubState;

pub fn api_routes(state: StubState) -> Router<StubState> {
    Router::new()
        .merge(users::routes(state.clone()))
        .merge(trips::routes(state.clone()))
        .merge(members::routes(state.clone()))
        .merge(messages::routes(state.clone()))
        .merge(comments::routes(state))
}

/// `?skip=&limit=` with the backend's defaults.
#[derive(Deserialize, Clone, Copy, Debug)]
#[serde(default)]
pub struct PageParams {
    pub skip: usize,
    pub limit: usize,
}

impl Default for PageParams {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

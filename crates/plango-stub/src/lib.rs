#![allow(non_snake_case)]

//! In-memory stand-in for the Plan & Go backend. It speaks the same REST
//! contract (paths, status codes, `{"detail"}` errors, rotating refresh
//! tokens) and exposes knobs on [`StubState`] for driving the token
//! lifecycle from tests.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

pub use state::{RecordedRequest, StubState};

pub fn api_router(state: StubState) -> Router {
    let apiRoutes = routes::api_routes(state.clone());
    let authRoutes = middleware::auth::auth_routes(state.clone());

    Router::new()
        .merge(apiRoutes)
        .merge(authRoutes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    middleware::auth::record_request,
                )),
        )
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: StubState) -> std::io::Result<()> {
    axum::serve(listener, api_router(state).into_make_service()).await
}

/// Binds `127.0.0.1:0`, serves in the background and returns the address.
pub async fn spawn(state: StubState) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = serve(listener, state).await {
            tracing::error!("stub server exited with error: {e}");
        }
    });
    Ok(addr)
}

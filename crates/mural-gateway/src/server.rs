//! Axum-based WebSocket server and endpoint validation.

use std::sync::Arc;

use axum::{
    extract::{ws::rejection::WebSocketUpgradeRejection, State, WebSocketUpgrade},
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use tracing::{debug, info};

use mural_core::protocol::{ENDPOINT, SERVER_IDENT};

use crate::session;
use crate::state::GatewayState;

/// Start the canvas WebSocket server.
///
/// Bind and listen errors are fatal; everything after accept is isolated
/// to the individual connection.
pub async fn serve(state: Arc<GatewayState>, port: u16) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_addr();

    // Every request goes through the same endpoint check, so the router
    // is a single catch-all.
    let app = Router::new().fallback(accept_connection).with_state(state);

    let addr = format!("{bind_addr}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Mural listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Admit one incoming request: the first path segment must equal the
/// `tile` endpoint and the request must be a WebSocket upgrade. Anything
/// else is a 404; the HTTP layer preserves the request's keep-alive
/// semantics on the response.
async fn accept_connection(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    uri: Uri,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if first_segment(uri.path()) != Some(ENDPOINT) {
        debug!(%method, %uri, "wrong endpoint");
        return StatusCode::NOT_FOUND.into_response();
    }

    let upgrade = match ws {
        Ok(upgrade) => upgrade,
        Err(rejection) => {
            debug!(%method, %uri, %rejection, "not a websocket upgrade");
            return StatusCode::NOT_FOUND.into_response();
        }
    };

    let mut response = upgrade.on_upgrade(move |socket| session::run(state, socket));
    response
        .headers_mut()
        .insert(header::SERVER, HeaderValue::from_static(SERVER_IDENT));
    response
}

/// First path segment, without percent-decoding. `/tile/extra` yields
/// `tile`; `/` yields nothing.
fn first_segment(path: &str) -> Option<&str> {
    path.strip_prefix('/')?
        .split('/')
        .next()
        .filter(|s| !s.is_empty())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}

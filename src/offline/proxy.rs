//! Local HTTP front for the offline layer.
//!
//! Every GET is answered through [`OfflineLayer::handle_fetch`]; the
//! `x-served-from` header says whether the cache or the network answered.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{info, warn};

use super::layer::OfflineLayer;

/// Response header naming the answering side.
pub const SERVED_FROM_HEADER: &str = "x-served-from";

/// Builds the proxy router.
pub fn router(layer: Arc<OfflineLayer>) -> Router {
    Router::new().fallback(handle).with_state(layer)
}

/// Binds to `addr` and serves until the process is stopped.
///
/// # Errors
///
/// Returns the I/O error if binding or serving fails.
pub async fn serve(layer: Arc<OfflineLayer>, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, version = layer.version(), "offline proxy listening");
    axum::serve(listener, router(layer)).await
}

async fn handle(State(layer): State<Arc<OfflineLayer>>, method: Method, uri: Uri) -> Response {
    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    // The query is part of the resource: it keys the cache and goes upstream.
    let target = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |pq| pq.as_str());

    let served = match layer.handle_fetch(target).await {
        Ok(served) => served,
        Err(e) => {
            warn!(target, "offline proxy could not answer: {e}");
            return (StatusCode::BAD_GATEWAY, e.to_string()).into_response();
        }
    };

    let status = StatusCode::from_u16(served.response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut response = Response::new(Body::from(served.response.body));
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(
        SERVED_FROM_HEADER,
        HeaderValue::from_static(served.source.as_str()),
    );
    if let Some(ct) = served
        .response
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
    {
        headers.insert(header::CONTENT_TYPE, ct);
    }
    response
}

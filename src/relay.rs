//! Credential relay for the capture endpoint.
//!
//! The access key otherwise ships inside client-visible query strings, which
//! are commonly logged. The relay keeps the key server-side: clients send it
//! an un-keyed capture request, the relay validates the target, strips
//! anything that is not the target URL or a viewport selection, re-signs the
//! request with its own key and streams the image bytes back. A
//! [`ScreenshotClient`](crate::ScreenshotClient) pointed at the relay with an
//! empty key works unchanged.

use std::net::SocketAddr;

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::{parse_target, CaptureConfig, Error, Result, ScreenshotClient};

/// Query parameters the relay forwards upstream. Everything else is dropped,
/// notably any client-supplied `access_key`.
const FORWARDED_PARAMS: &[&str] = &[
    "url",
    "viewport_device",
    "full_page",
    "viewport_width",
    "viewport_height",
];

/// Shared relay state: the upstream client holding the real access key.
#[derive(Clone)]
pub struct RelayState {
    client: ScreenshotClient,
}

impl RelayState {
    pub fn new(config: &CaptureConfig) -> Result<Self> {
        Ok(Self {
            client: ScreenshotClient::new(config)?,
        })
    }
}

/// Build the relay router.
pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/take", get(take))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Bind and run the relay until the process exits.
pub async fn serve(addr: SocketAddr, config: &CaptureConfig) -> Result<()> {
    let app = router(RelayState::new(config)?);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("relay listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

fn keep_forwardable(params: Vec<(String, String)>) -> Vec<(String, String)> {
    params
        .into_iter()
        .filter(|(key, _)| {
            let keep = FORWARDED_PARAMS.contains(&key.as_str());
            if !keep {
                log::debug!("relay dropping query parameter {:?}", key);
            }
            keep
        })
        .collect()
}

async fn take(
    State(state): State<RelayState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    let target = params
        .iter()
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.as_str());

    if target.and_then(parse_target).is_none() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": Error::InvalidUrl.to_string() })),
        )
            .into_response();
    }

    match state.client.forward(&keep_forwardable(params)).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(err) => {
            if let Error::Fetch { reason } = &err {
                log::debug!("relay upstream failure: {}", reason);
            }
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use reqwest::{redirect, Client, ClientBuilder};
use serde::Deserialize;
use shared::error::{ApiError, ErrorCode};
use tracing::{debug, warn};
use url::Url;

use crate::config::Settings;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

type RelayError = (StatusCode, Json<ApiError>);

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) http: Client,
    pub(crate) settings: Arc<Settings>,
}

impl AppState {
    pub(crate) fn new(settings: Settings) -> anyhow::Result<Self> {
        let http = upstream_client(&settings).build()?;
        Ok(Self::with_client(http, settings))
    }

    pub(crate) fn with_client(http: Client, settings: Settings) -> Self {
        Self {
            http,
            settings: Arc::new(settings),
        }
    }
}

/// Redirects are not followed so the host allowlist cannot be bypassed.
pub(crate) fn upstream_client(settings: &Settings) -> ClientBuilder {
    Client::builder()
        .redirect(redirect::Policy::none())
        .timeout(Duration::from_secs(settings.upstream_timeout_secs))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageProxyQuery {
    url: Option<String>,
}

pub(crate) async fn image_proxy(
    State(state): State<AppState>,
    Query(query): Query<ImageProxyQuery>,
) -> Result<Response, RelayError> {
    let raw = query
        .url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| relay_error(StatusCode::BAD_REQUEST, ErrorCode::Validation, "missing url parameter"))?;
    let target = parse_target(raw, &state.settings)?;
    let max_bytes = state.settings.max_image_bytes;

    let mut upstream = state.http.get(target.clone()).send().await.map_err(|error| {
        warn!(url = %target, %error, "image fetch failed");
        bad_gateway(format!("failed to fetch image: {error}"))
    })?;

    let status = upstream.status();
    if !status.is_success() {
        warn!(url = %target, status = status.as_u16(), "image upstream rejected request");
        return Err(bad_gateway(format!(
            "upstream responded with status {}",
            status.as_u16()
        )));
    }
    if upstream
        .content_length()
        .is_some_and(|len| len > max_bytes as u64)
    {
        return Err(too_large(max_bytes));
    }

    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string();
    if !content_type.starts_with("image/") && content_type != FALLBACK_CONTENT_TYPE {
        return Err(bad_gateway(format!(
            "upstream returned non-image content type {content_type}"
        )));
    }

    // Content-Length may be absent or wrong, so the cap is enforced per chunk.
    let mut body = Vec::new();
    while let Some(chunk) = upstream
        .chunk()
        .await
        .map_err(|error| bad_gateway(format!("failed to read image body: {error}")))?
    {
        if body.len() + chunk.len() > max_bytes {
            warn!(url = %target, max_bytes, "image body exceeded cap");
            return Err(too_large(max_bytes));
        }
        body.extend_from_slice(&chunk);
    }

    debug!(url = %target, bytes = body.len(), %content_type, "relayed image");
    let cache_control = format!("public, max-age={}", state.settings.cache_max_age_secs);
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, cache_control),
        ],
        body,
    )
        .into_response())
}

pub(crate) fn parse_target(raw: &str, settings: &Settings) -> Result<Url, RelayError> {
    let url = Url::parse(raw).map_err(|error| {
        relay_error(
            StatusCode::BAD_REQUEST,
            ErrorCode::Validation,
            format!("invalid image url: {error}"),
        )
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(relay_error(
            StatusCode::BAD_REQUEST,
            ErrorCode::Validation,
            format!("unsupported url scheme {}", url.scheme()),
        ));
    }

    let host = url.host_str().unwrap_or_default();
    if !settings.host_allowed(host) {
        return Err(relay_error(
            StatusCode::FORBIDDEN,
            ErrorCode::Forbidden,
            format!("host {host} is not allowed"),
        ));
    }

    Ok(url)
}

fn relay_error(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> RelayError {
    (status, Json(ApiError::new(code, message)))
}

fn bad_gateway(message: String) -> RelayError {
    relay_error(StatusCode::BAD_GATEWAY, ErrorCode::Upstream, message)
}

fn too_large(max_bytes: usize) -> RelayError {
    bad_gateway(format!("image exceeds {max_bytes} bytes"))
}

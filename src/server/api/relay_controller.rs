use axum::{
    Router,
    body::Body,
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use futures::TryStreamExt;
use serde::Deserialize;
use tracing::{debug, error};

use crate::server::error::{AppResult, Error};
use crate::server::services::app_services::AppServices;
use crate::server::utils::filename_utils;

#[derive(Deserialize)]
struct RelayQuery {
    url: String,
    filename: Option<String>,
}

pub struct RelayController;

impl RelayController {
    pub fn app() -> Router {
        Router::new().route(
            "/download",
            get(Self::relay_download).options(Self::relay_options),
        )
    }

    /// resumable single-item download through the relay: validate the target,
    /// forward the caller's range semantics upstream, pipe the body straight
    /// back. memory footprint does not scale with the resource size
    async fn relay_download(
        Extension(services): Extension<AppServices>,
        Query(params): Query<RelayQuery>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let target_url = Self::decode_url(&params.url)?;

        let range = headers
            .get(header::RANGE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let if_range = headers
            .get(header::IF_RANGE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let upstream = services
            .relay
            .fetch_upstream(&target_url, range, if_range)
            .await?;

        // 200 vs 206 carries through as-is
        let status = upstream.status();

        let mut response_headers = HeaderMap::new();
        for name in [
            header::CONTENT_TYPE,
            header::CONTENT_LENGTH,
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
        ] {
            if let Some(value) = upstream.headers().get(&name) {
                response_headers.insert(name, value.clone());
            }
        }

        // never let intermediaries cache a relayed byte range
        response_headers.insert(
            header::CACHE_CONTROL,
            "no-cache, no-store, must-revalidate"
                .parse()
                .expect("Static header value should parse"),
        );
        response_headers.insert(
            header::PRAGMA,
            "no-cache".parse().expect("Static header value should parse"),
        );
        response_headers.insert(
            header::EXPIRES,
            "0".parse().expect("Static header value should parse"),
        );

        let filename = params
            .filename
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| Self::filename_from_url(&target_url));
        response_headers.insert(
            header::CONTENT_DISPOSITION,
            filename_utils::content_disposition(&filename)
                .parse()
                .map_err(|_| {
                    Error::InternalServerErrorWithContext(
                        "Generated Content-Disposition header is invalid".to_string(),
                    )
                })?,
        );

        debug!("piping upstream body (status {})", status);

        // if the client goes away the stream is dropped and the upstream
        // connection released with it
        let body = Body::from_stream(
            upstream
                .bytes_stream()
                .inspect_err(|e| error!("upstream stream error: {}", e)),
        );

        Ok((status, response_headers, body).into_response())
    }

    async fn relay_options() -> impl IntoResponse {
        StatusCode::NO_CONTENT
    }

    // the url arrives percent-encoded from the frontend, sometimes twice
    fn decode_url(url_param: &str) -> AppResult<String> {
        urlencoding::decode(url_param)
            .map(|s| s.to_string())
            .map_err(|e| {
                error!("failed to decode url parameter: {}", e);
                Error::BadRequest("Invalid URL encoding".to_string())
            })
    }

    /// last path segment of the target, or a generic default
    fn filename_from_url(target_url: &str) -> String {
        url::Url::parse(target_url)
            .ok()
            .and_then(|u| {
                u.path_segments()
                    .and_then(|mut s| s.next_back().map(|p| p.to_string()))
            })
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "download".to_string())
    }
}

use std::sync::Arc;

use axum::http::header;
use tracing::{debug, error};

use crate::server::error::{AppResult, Error};
use crate::server::utils::url_guard_utils;

// upstreams that gate on headers must see a plausible browser request
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub type DynRelayService = Arc<dyn RelayServiceTrait + Send + Sync>;

#[mockall::automock]
#[async_trait::async_trait]
pub trait RelayServiceTrait {
    /// validate the target, then issue the upstream request with the caller's
    /// range semantics carried through. the response body is still unread so
    /// the controller can pipe it without buffering
    async fn fetch_upstream(
        &self,
        target_url: &str,
        range: Option<String>,
        if_range: Option<String>,
    ) -> AppResult<reqwest::Response>;
}

pub struct RelayService {
    http: reqwest::Client,
}

impl RelayService {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait::async_trait]
impl RelayServiceTrait for RelayService {
    async fn fetch_upstream(
        &self,
        target_url: &str,
        range: Option<String>,
        if_range: Option<String>,
    ) -> AppResult<reqwest::Response> {
        // every gate runs before any outbound connection is attempted
        let url = url_guard_utils::validate_target_url(target_url)?;

        // referer from the target's own origin, some cdns refuse without one
        let referer = format!(
            "{}://{}/",
            url.scheme(),
            url.host_str().unwrap_or_default()
        );

        let range = range.unwrap_or_else(|| "bytes=0-".to_string());
        debug!("relaying {} (range: {})", url, range);

        let mut request_builder = self
            .http
            .get(url.as_str())
            .header(header::RANGE, range)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::ACCEPT, "*/*")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(header::REFERER, referer);

        if let Some(if_range) = if_range {
            request_builder = request_builder.header(header::IF_RANGE, if_range);
        }

        let response = request_builder.send().await.map_err(|e| {
            error!("upstream request failed: {}", e);
            Error::InternalServerErrorWithContext(format!("Upstream request failed: {}", e))
        })?;

        let status = response.status();
        debug!("upstream responded with {}", status);

        // 2xx including 206 partial content is fine, anything else is a relay
        // failure surfaced with the upstream status. no retries here, that's
        // the caller's call
        if !status.is_success() {
            error!("upstream returned non-success status: {}", status);
            return Err(Error::BadGateway(status.as_u16()));
        }

        Ok(response)
    }
}

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::AppConfig;
use crate::server::services::relay_services::RelayService;

use super::DynRelayService;

/// everything the handlers need, injected once via Extension. no database,
/// no cache - parsing is stateless per request and the relay only needs the
/// shared outbound client
#[derive(Clone)]
pub struct AppServices {
    pub relay: DynRelayService,
    pub http: reqwest::Client,
    pub config: Arc<AppConfig>,
}

impl AppServices {
    pub fn new(config: Arc<AppConfig>) -> Self {
        info!("starting services (stateless mode, no database)...");

        // process-wide client config, read-only after this point. no overall
        // timeout because relayed bodies can stream for a long time, the
        // connect timeout catches dead upstreams
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .expect("Failed to build outbound http client");

        let relay = Arc::new(RelayService::new(http.clone())) as DynRelayService;

        Self {
            relay,
            http,
            config,
        }
    }
}

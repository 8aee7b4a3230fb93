use playlist_edge::server::error::Error;
use playlist_edge::server::services::relay_services::{RelayService, RelayServiceTrait};

// these never touch the network - the guard has to fire before any outbound
// connection is attempted, so a blocked target fails instantly

#[tokio::test]
async fn test_blocked_target_rejected_before_fetch() {
    let relay = RelayService::new(reqwest::Client::new());

    let result = relay
        .fetch_upstream("http://127.0.0.1/secret", None, None)
        .await;

    assert!(matches!(result, Err(Error::BlockedUrl(_))));
}

#[tokio::test]
async fn test_zero_address_rejected_before_fetch() {
    let relay = RelayService::new(reqwest::Client::new());

    let result = relay
        .fetch_upstream("http://0.0.0.0/stream.ts", None, None)
        .await;

    assert!(matches!(result, Err(Error::BlockedUrl(_))));
}

#[tokio::test]
async fn test_bad_scheme_rejected_before_fetch() {
    let relay = RelayService::new(reqwest::Client::new());

    let result = relay
        .fetch_upstream("file:///etc/passwd", None, None)
        .await;

    assert!(matches!(result, Err(Error::BadRequest(_))));
}

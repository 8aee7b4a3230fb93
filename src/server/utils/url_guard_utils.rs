use std::net::{Ipv4Addr, Ipv6Addr};

use tracing::warn;
use url::Url;

use crate::server::error::{AppResult, Error};

/// validate an outbound proxy target before any request is made.
///
/// this is a syntactic check on the hostname literal as given - it does NOT
/// resolve dns, so a public name pointing at a private address slips through.
/// known limitation, closing it would change which urls we accept
pub fn validate_target_url(raw: &str) -> AppResult<Url> {
    let url = Url::parse(raw)
        .map_err(|_| Error::BadRequest("Invalid URL format".to_string()))?;

    // file://, gopher://, ftp:// etc are classic tricks to reach local stuff
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(Error::BadRequest(format!(
            "Unsupported URL scheme: {}",
            url.scheme()
        )));
    }

    let Some(host) = url.host_str() else {
        return Err(Error::BadRequest("URL has no host".to_string()));
    };

    if is_blocked_host(host) {
        warn!("blocked proxy target: {}", host);
        return Err(Error::BlockedUrl(
            "Target host is not allowed".to_string(),
        ));
    }

    Ok(url)
}

/// localhost, loopback and the private/reserved dotted-quad ranges:
/// 10/8, 127/8, 172.16/12, 192.168/16, 169.254/16 and 0/8
fn is_blocked_host(host: &str) -> bool {
    let host = host.trim_start_matches('[').trim_end_matches(']');

    if host.eq_ignore_ascii_case("localhost") {
        return true;
    }

    if let Ok(addr) = host.parse::<Ipv4Addr>() {
        return addr.is_loopback()
            || addr.is_private()
            || addr.is_link_local()
            || addr.octets()[0] == 0;
    }

    if let Ok(addr) = host.parse::<Ipv6Addr>() {
        return addr.is_loopback();
    }

    false
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_rejects_private_and_loopback_literals() {
        for host in [
            "127.0.0.1",
            "10.1.2.3",
            "192.168.1.1",
            "172.20.0.5",
            "169.254.1.1",
            "0.0.0.0",
            "localhost",
            "LOCALHOST",
        ] {
            assert!(is_blocked_host(host), "{host} should be blocked");
        }
    }

    #[test]
    fn test_allows_public_addresses_and_names() {
        for host in ["93.184.216.34", "example.com", "8.8.8.8", "172.15.0.1", "172.32.0.1"] {
            assert!(!is_blocked_host(host), "{host} should be allowed");
        }
    }

    #[test]
    fn test_rejects_ipv6_loopback() {
        assert!(is_blocked_host("::1"));
        assert!(is_blocked_host("[::1]"));
    }

    #[test]
    fn test_validate_rejects_bad_scheme() {
        assert!(validate_target_url("file:///etc/passwd").is_err());
        assert!(validate_target_url("gopher://example.com").is_err());
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(validate_target_url("not a url").is_err());
    }

    #[test]
    fn test_validate_accepts_public_http() {
        assert!(validate_target_url("http://example.com/stream.ts").is_ok());
        assert!(validate_target_url("https://93.184.216.34/video.mp4").is_ok());
    }
}

use std::time::Duration;

use reqwest::{redirect, Client, StatusCode};
use tracing::debug;

use crate::error::{DeployError, DeployResult};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// IPv6 literals are bracketed.
pub fn public_url(host: &str) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("http://[{}]/", host)
    } else {
        format!("http://{}/", host)
    }
}

/// HEAD the URL and require exactly `200 OK`. Redirects are not followed.
pub async fn check(url: &str) -> DeployResult<StatusCode> {
    let probe_err = |source| DeployError::Probe {
        url: url.to_string(),
        source,
    };

    let client = Client::builder()
        .timeout(PROBE_TIMEOUT)
        .redirect(redirect::Policy::none())
        .build()
        .map_err(probe_err)?;

    let response = client.head(url).send().await.map_err(probe_err)?;
    let status = response.status();
    debug!("HEAD {} -> {}", url, status);

    if status != StatusCode::OK {
        return Err(DeployError::ValidationFailed {
            url: url.to_string(),
            status,
        });
    }
    Ok(status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned response on a random local port.
    async fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[test]
    fn url_points_at_port_80() {
        assert_eq!(public_url("203.0.113.10"), "http://203.0.113.10/");
        assert_eq!(public_url("app.example.com"), "http://app.example.com/");
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        assert_eq!(public_url("2001:db8::10"), "http://[2001:db8::10]/");
        assert_eq!(public_url("[::1]"), "http://[::1]/");
        assert!(reqwest::Url::parse(&public_url("::1")).is_ok());
    }

    #[tokio::test]
    async fn ok_passes() {
        let url = serve_once("HTTP/1.1 200 OK").await;
        assert_eq!(check(&url).await.unwrap(), StatusCode::OK);
    }

    #[tokio::test]
    async fn bad_gateway_fails_validation() {
        let url = serve_once("HTTP/1.1 502 Bad Gateway").await;
        let err = check(&url).await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::ValidationFailed { status, .. } if status == StatusCode::BAD_GATEWAY
        ));
    }

    #[tokio::test]
    async fn redirect_is_not_success() {
        let url = serve_once("HTTP/1.1 301 Moved Permanently\r\nLocation: http://example.com/").await;
        let err = check(&url).await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::ValidationFailed { status, .. } if status == StatusCode::MOVED_PERMANENTLY
        ));
    }

    #[tokio::test]
    async fn closed_port_is_a_probe_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = check(&format!("http://{}/", addr)).await.unwrap_err();
        assert!(matches!(err, DeployError::Probe { .. }));
    }
}

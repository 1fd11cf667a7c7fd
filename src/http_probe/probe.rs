use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::{Client, redirect};
use url::Url;

use super::result::Record;
use super::report;
use crate::error::{Error, Result};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const USER_AGENT: &str = "downtimer-probe/1.0";

/// Builds the client used for every probe of a run.
/// Redirects are not followed, so a 3xx answer is recorded as such.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(PROBE_TIMEOUT)
        .danger_accept_invalid_certs(true)
        .redirect(redirect::Policy::none())
        .user_agent(USER_AGENT)
        .build()
        .map_err(Error::HttpClient)
}

/// Issues one GET against `url` and describes the outcome as a [`Record`].
///
/// Transport failures (refused connection, timeout, DNS) never surface as errors: they
/// yield a failed record with code and size 0.
pub async fn probe_url(client: &Client, url: &Url) -> Record {
    let timestamp = Utc::now().timestamp();
    let start = Instant::now();

    let outcome = match client.get(url.clone()).send().await {
        Ok(resp) => {
            let status = resp.status();
            resp.bytes().await.map(|body| (status, body.len() as u64))
        }
        Err(e) => Err(e),
    };
    let latency = start.elapsed();

    match outcome {
        Ok((status, size)) => {
            let success = status.is_success() || status.is_redirection();
            tracing::debug!(%url, code = status.as_u16(), size, ?latency, success, "probe completed");
            Record {
                timestamp,
                success,
                latency,
                code: status.as_u16(),
                size,
                annotation: String::new(),
            }
        }
        Err(e) => {
            tracing::warn!(%url, ?latency, "probe failed: {}", report(&e));
            Record {
                timestamp,
                success: false,
                latency,
                code: 0,
                size: 0,
                annotation: String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refused_connection_is_a_failed_record() {
        // Bind then drop a listener to get a port nothing listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Bind");
        let port = listener.local_addr().expect("Local addr").port();
        drop(listener);

        let client = build_client().expect("Client");
        let url = Url::parse(&format!("http://127.0.0.1:{port}/health")).expect("URL");
        let before = Utc::now().timestamp();

        let record = probe_url(&client, &url).await;

        assert!(!record.success);
        assert_eq!(record.code, 0);
        assert_eq!(record.size, 0);
        assert!(record.timestamp >= before);
        assert!(record.annotation.is_empty());
    }
}

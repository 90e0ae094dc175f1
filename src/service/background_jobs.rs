// service/background_jobs.rs
use std::sync::Arc;

use tokio::time::{interval, Duration};

use crate::service::notification_service::ProviderHealth;

/// One reachability check of the push provider. Only a 2xx answer counts as reachable.
pub async fn probe_provider(client: &reqwest::Client, probe_url: &str) -> bool {
    match client.get(probe_url).send().await {
        Ok(response) if response.status().is_success() => {
            tracing::debug!("Push provider probe returned {}", response.status());
            true
        }
        Ok(response) => {
            tracing::warn!("Push provider probe to {} answered {}", probe_url, response.status());
            false
        }
        Err(e) => {
            tracing::warn!("Push provider probe to {} failed: {}", probe_url, e);
            false
        }
    }
}

/// Refresh the provider health flag every `interval_secs` seconds
pub async fn start_provider_health_job(health: Arc<ProviderHealth>, probe_url: String, interval_secs: u64) {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_default();
    let mut interval = interval(Duration::from_secs(interval_secs.max(1)));

    loop {
        interval.tick().await;

        let reachable = probe_provider(&client, &probe_url).await;
        let previous = health.set_reachable(reachable);

        if previous != reachable {
            tracing::info!("Push provider reachability changed: {} -> {}", previous, reachable);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP response and returns its url
    async fn serve_once(status_line: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            if let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!("{}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n", status_line);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn server_error_answer_is_unreachable() {
        let url = serve_once("HTTP/1.1 503 Service Unavailable").await;
        let client = reqwest::Client::new();
        assert!(!probe_provider(&client, &url).await);
    }

    #[tokio::test]
    async fn success_answer_is_reachable() {
        let url = serve_once("HTTP/1.1 200 OK").await;
        let client = reqwest::Client::new();
        assert!(probe_provider(&client, &url).await);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        // Port 9 (discard) is closed on test hosts
        assert!(!probe_provider(&client, "http://127.0.0.1:9/").await);
    }
}

use reqwest::{Client, RequestBuilder, Response};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::PoolSettings;
use crate::constants::http::RETRY_BACKOFF;

/// Counts pooled clients ever built across all workers
#[derive(Debug, Default)]
pub struct ConnectionStats {
    created: AtomicUsize,
}

impl ConnectionStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }

    fn record_created(&self) -> usize {
        self.created.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Pooled HTTP client owned by a single execution unit.
///
/// The client is built on the first [`acquire`](Self::acquire) and reused
/// until the owner drops it.
pub struct WorkerConnection {
    worker_id: usize,
    settings: PoolSettings,
    stats: Arc<ConnectionStats>,
    client: Option<Client>,
}

impl WorkerConnection {
    pub fn new(worker_id: usize, settings: PoolSettings, stats: Arc<ConnectionStats>) -> Self {
        Self {
            worker_id,
            settings,
            stats,
            client: None,
        }
    }

    pub fn worker_id(&self) -> usize {
        self.worker_id
    }

    pub fn is_initialized(&self) -> bool {
        self.client.is_some()
    }

    pub fn acquire(&mut self) -> Result<&Client, reqwest::Error> {
        let client = match self.client.take() {
            Some(client) => client,
            None => {
                let client = build_client(&self.settings)?;
                let total = self.stats.record_created();
                info!(
                    "Worker {} created pooled connection ({} total)",
                    self.worker_id, total
                );
                client
            }
        };

        Ok(self.client.insert(client))
    }

    /// Send, retrying only when the connection could not be established
    pub async fn send_with_retry<F>(&mut self, build: F) -> Result<Response, reqwest::Error>
    where
        F: Fn(&Client) -> RequestBuilder,
    {
        let retries = self.settings.retries;
        let worker_id = self.worker_id;
        let client = self.acquire()?;

        let mut attempt = 0;
        loop {
            match build(client).send().await {
                Err(e) if e.is_connect() && attempt < retries => {
                    attempt += 1;
                    warn!(
                        "Worker {} connect failure (attempt {}/{}): {}",
                        worker_id, attempt, retries, e
                    );
                    sleep(RETRY_BACKOFF).await;
                }
                result => {
                    if attempt > 0 {
                        debug!("Worker {} finished after {} retries", worker_id, attempt);
                    }
                    return result;
                }
            }
        }
    }
}

fn build_client(settings: &PoolSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .pool_max_idle_per_host(settings.idle_per_host())
        .pool_idle_timeout(settings.idle_timeout)
        .connect_timeout(settings.connect_timeout)
        .danger_accept_invalid_certs(settings.accept_invalid_certs)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_created_once() {
        let stats = ConnectionStats::new();
        let mut connection = WorkerConnection::new(0, PoolSettings::default(), stats.clone());

        assert!(!connection.is_initialized());
        assert_eq!(stats.created(), 0);

        connection.acquire().unwrap();
        connection.acquire().unwrap();

        assert!(connection.is_initialized());
        assert_eq!(stats.created(), 1);
    }

    #[test]
    fn test_stats_are_shared_between_workers() {
        let stats = ConnectionStats::new();
        let mut a = WorkerConnection::new(0, PoolSettings::default(), stats.clone());
        let mut b = WorkerConnection::new(1, PoolSettings::default(), stats.clone());

        a.acquire().unwrap();
        b.acquire().unwrap();
        a.acquire().unwrap();

        assert_eq!(stats.created(), 2);
    }

    #[tokio::test]
    async fn test_connect_failures_are_retried_then_returned() {
        let settings = PoolSettings {
            retries: 2,
            ..PoolSettings::default()
        };
        let mut connection = WorkerConnection::new(0, settings, ConnectionStats::new());
        let attempts = AtomicUsize::new(0);
        let started = std::time::Instant::now();

        // Port 9 (discard) on localhost is closed in test environments
        let err = connection
            .send_with_retry(|client| {
                attempts.fetch_add(1, Ordering::SeqCst);
                client.get("http://127.0.0.1:9/")
            })
            .await
            .unwrap_err();

        assert!(err.is_connect());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= RETRY_BACKOFF * 2);
    }

    #[tokio::test]
    async fn test_no_retries_means_one_attempt() {
        let settings = PoolSettings {
            retries: 0,
            ..PoolSettings::default()
        };
        let mut connection = WorkerConnection::new(0, settings, ConnectionStats::new());
        let attempts = AtomicUsize::new(0);

        let err = connection
            .send_with_retry(|client| {
                attempts.fetch_add(1, Ordering::SeqCst);
                client.get("http://127.0.0.1:9/")
            })
            .await
            .unwrap_err();

        assert!(err.is_connect());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}

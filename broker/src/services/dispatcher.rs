//! Bounded worker pool for remote invocations
//!
//! `max_workers` long-lived tasks pull jobs from one bounded queue. Each
//! worker handles one job at a time on its own [`WorkerConnection`], so the
//! number of in-flight remote calls never exceeds the worker count and the
//! number of pooled clients never exceeds it either.
//!
//! There is no cancellation: once scheduled, a job runs until the backend
//! answers or the per-request timeout fires.

use futures::future::join_all;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::catalog::{FieldValues, OperationCatalog};
use crate::config::Config;
use crate::constants::batch::UNKNOWN_TAG;
use crate::credentials::CredentialStore;
use crate::errors::BrokerError;
use crate::http::{ConnectionStats, InvocationResult, OperationClient, PoolSettings, WorkerConnection};

type JobReply = oneshot::Sender<Result<InvocationResult, BrokerError>>;

struct Job {
    client: Arc<OperationClient>,
    fields: FieldValues,
    reply: JobReply,
}

#[derive(Debug, Default)]
struct DispatchMetrics {
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    completed: AtomicUsize,
}

impl DispatchMetrics {
    fn started(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
    }

    fn finished(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Snapshot reported by the pool status tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub max_workers: usize,
    pub request_timeout: u64,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub completed: usize,
    pub connections_created: usize,
    pub pool_type: &'static str,
}

/// Result of one batch element, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchRecord {
    pub index: usize,
    /// Caller-chosen correlation value, or `"unknown"`
    pub tag: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchRecord {
    fn new(index: usize, tag: String, result: Result<InvocationResult, BrokerError>) -> Self {
        match result {
            Ok(invocation) if invocation.success => Self {
                index,
                tag,
                success: true,
                result: Some(invocation.to_string()),
                error: None,
            },
            Ok(invocation) => Self {
                index,
                tag,
                success: false,
                result: None,
                error: Some(invocation.to_string()),
            },
            Err(e) => Self {
                index,
                tag,
                success: false,
                result: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Handle to a scheduled invocation
pub struct PendingInvocation {
    receiver: oneshot::Receiver<Result<InvocationResult, BrokerError>>,
}

impl PendingInvocation {
    pub async fn wait(self) -> Result<InvocationResult, BrokerError> {
        self.receiver
            .await
            .map_err(|_| BrokerError::DispatcherUnavailable)?
    }
}

pub struct Dispatcher {
    catalog: Arc<OperationCatalog>,
    store: Arc<CredentialStore>,
    sender: RwLock<Option<mpsc::Sender<Job>>>,
    workers: StdMutex<Vec<JoinHandle<()>>>,
    max_workers: usize,
    timeout: Duration,
    metrics: Arc<DispatchMetrics>,
    connections: Arc<ConnectionStats>,
}

impl Dispatcher {
    /// Spawn the worker tasks. Must be called inside a Tokio runtime.
    pub fn new(
        catalog: Arc<OperationCatalog>,
        store: Arc<CredentialStore>,
        max_workers: usize,
        timeout: Duration,
        pool: PoolSettings,
    ) -> Self {
        let max_workers = max_workers.max(1);
        let (sender, receiver) = mpsc::channel::<Job>(max_workers);
        let receiver = Arc::new(Mutex::new(receiver));
        let metrics = Arc::new(DispatchMetrics::default());
        let connections = ConnectionStats::new();

        let workers = (0..max_workers)
            .map(|worker_id| {
                let connection = WorkerConnection::new(worker_id, pool.clone(), connections.clone());
                tokio::spawn(run_worker(
                    receiver.clone(),
                    connection,
                    timeout,
                    metrics.clone(),
                ))
            })
            .collect();

        info!(
            "Dispatcher started: {} workers, {}s request timeout",
            max_workers,
            timeout.as_secs()
        );

        Self {
            catalog,
            store,
            sender: RwLock::new(Some(sender)),
            workers: StdMutex::new(workers),
            max_workers,
            timeout,
            metrics,
            connections,
        }
    }

    pub fn from_config(
        config: &Config,
        catalog: Arc<OperationCatalog>,
        store: Arc<CredentialStore>,
    ) -> Self {
        Self::new(
            catalog,
            store,
            config.max_workers,
            config.request_timeout(),
            config.pool_settings(),
        )
    }

    pub fn catalog(&self) -> &OperationCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Schedule one invocation and wait for its result
    pub async fn submit_one(
        &self,
        code: &str,
        session_id: &str,
        fields: FieldValues,
    ) -> Result<InvocationResult, BrokerError> {
        self.enqueue(code, session_id, fields).await?.wait().await
    }

    /// Schedule one invocation; the caller awaits the handle later
    pub async fn enqueue(
        &self,
        code: &str,
        session_id: &str,
        fields: FieldValues,
    ) -> Result<PendingInvocation, BrokerError> {
        let client = Arc::new(OperationClient::new(
            &self.catalog,
            &self.store,
            code,
            session_id,
        )?);
        client.render(&fields)?;
        self.schedule(client, fields).await
    }

    /// One invocation per input, results in input order.
    ///
    /// Unknown operations and missing credentials fail the whole call before
    /// anything is scheduled; a validation error fails only its element.
    pub async fn submit_batch(
        &self,
        code: &str,
        session_id: &str,
        inputs: Vec<FieldValues>,
        correlation_field: &str,
    ) -> Result<Vec<BatchRecord>, BrokerError> {
        let client = Arc::new(OperationClient::new(
            &self.catalog,
            &self.store,
            code,
            session_id,
        )?);

        info!(
            "Batch of {} {} for session {}",
            inputs.len(),
            client.descriptor().name(),
            session_id
        );

        let mut scheduled = Vec::with_capacity(inputs.len());
        for (index, fields) in inputs.into_iter().enumerate() {
            let tag = fields
                .get(correlation_field)
                .unwrap_or(UNKNOWN_TAG)
                .to_string();

            let pending = match client.render(&fields) {
                Ok(_) => self.schedule(client.clone(), fields).await,
                Err(e) => {
                    debug!("Batch element {} ({}) rejected: {}", index, tag, e);
                    Err(e)
                }
            };
            scheduled.push((index, tag, pending));
        }

        let records = join_all(scheduled.into_iter().map(|(index, tag, pending)| async move {
            let result = match pending {
                Ok(pending) => pending.wait().await,
                Err(e) => Err(e),
            };
            BatchRecord::new(index, tag, result)
        }))
        .await;

        Ok(records)
    }

    async fn schedule(
        &self,
        client: Arc<OperationClient>,
        fields: FieldValues,
    ) -> Result<PendingInvocation, BrokerError> {
        let sender = self
            .sender
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
            .ok_or(BrokerError::DispatcherUnavailable)?;

        let (reply, receiver) = oneshot::channel();
        sender
            .send(Job {
                client,
                fields,
                reply,
            })
            .await
            .map_err(|_| BrokerError::DispatcherUnavailable)?;

        Ok(PendingInvocation { receiver })
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            max_workers: self.max_workers,
            request_timeout: self.timeout.as_secs(),
            in_flight: self.metrics.in_flight.load(Ordering::SeqCst),
            peak_in_flight: self.metrics.peak_in_flight.load(Ordering::SeqCst),
            completed: self.metrics.completed.load(Ordering::SeqCst),
            connections_created: self.connections.created(),
            pool_type: "tokio-worker-pool",
        }
    }

    /// Close the queue. Queued jobs still run; workers exit once it drains.
    pub async fn shutdown(&self) {
        let sender = self
            .sender
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if sender.is_none() {
            return;
        }
        drop(sender);

        let workers: Vec<_> = self
            .workers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .drain(..)
            .collect();

        for worker in workers {
            if let Err(e) = worker.await {
                warn!("Dispatcher worker ended abnormally: {}", e);
            }
        }
        info!("Dispatcher shut down");
    }
}

async fn run_worker(
    receiver: Arc<Mutex<mpsc::Receiver<Job>>>,
    mut connection: WorkerConnection,
    timeout: Duration,
    metrics: Arc<DispatchMetrics>,
) {
    loop {
        let job = {
            let mut receiver = receiver.lock().await;
            receiver.recv().await
        };
        let Some(job) = job else {
            break;
        };

        metrics.started();
        let result = job.client.invoke(&mut connection, &job.fields, timeout).await;
        metrics.finished();

        if job.reply.send(result).is_err() {
            debug!(
                "Worker {}: caller dropped before the result arrived",
                connection.worker_id()
            );
        }
    }
    debug!("Worker {} exiting", connection.worker_id());
}

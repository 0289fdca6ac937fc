use std::fmt;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use async_channel::{Receiver, Sender};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;

use crate::analytics::error::{internal_error, network_error, AnalyticsResult};
use crate::analytics::hit::Hit;
use crate::analytics::logger::LOGGER;

/// Environment variable overriding the production collect endpoint.
pub const ENDPOINT_ENV_VAR: &str = "GA_MEASUREMENT_ENDPOINT";

/// Backend client contract: hands a finished hit over for delivery.
///
/// Delivery is fire-and-forget. Implementations must not block the caller on the network and
/// have no way to report the outcome back.
pub trait HitTransport: Send + Sync {
    fn send(&self, hit: Hit);

    /// Stops accepting hits and delivers whatever is already queued.
    fn shutdown(&self) {}
}

/// Supported endpoints for the Measurement Protocol.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeasurementProtocolEndpoint {
    /// Production collection endpoint: <https://www.google-analytics.com/collect>
    Collect,
    /// Validation endpoint: <https://www.google-analytics.com/debug/collect>
    DebugCollect,
    /// Custom endpoint (primarily for testing).
    Custom(String),
}

impl MeasurementProtocolEndpoint {
    pub fn as_str(&self) -> &str {
        match self {
            MeasurementProtocolEndpoint::Collect => "https://www.google-analytics.com/collect",
            MeasurementProtocolEndpoint::DebugCollect => {
                "https://www.google-analytics.com/debug/collect"
            }
            MeasurementProtocolEndpoint::Custom(url) => url,
        }
    }

    fn resolve(override_url: Option<String>) -> Self {
        match override_url {
            Some(url) if !url.trim().is_empty() => MeasurementProtocolEndpoint::Custom(url),
            _ => MeasurementProtocolEndpoint::Collect,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MeasurementProtocolConfig {
    endpoint: MeasurementProtocolEndpoint,
    timeout: Duration,
}

impl MeasurementProtocolConfig {
    /// Production endpoint unless `GA_MEASUREMENT_ENDPOINT` is set, 10 second request timeout.
    pub fn new() -> Self {
        Self {
            endpoint: MeasurementProtocolEndpoint::resolve(std::env::var(ENDPOINT_ENV_VAR).ok()),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_endpoint(mut self, endpoint: MeasurementProtocolEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &MeasurementProtocolEndpoint {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for MeasurementProtocolConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Posts hits to the Measurement Protocol from a background worker thread.
///
/// [`HitTransport::send`] only enqueues. The worker posts hits one at a time in order; invalid
/// hits are dropped and delivery failures are logged, never retried.
pub struct MeasurementProtocolTransport {
    config: MeasurementProtocolConfig,
    sender: Sender<Hit>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl fmt::Debug for MeasurementProtocolTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeasurementProtocolTransport")
            .field("endpoint", &self.config.endpoint)
            .field("queued", &self.sender.len())
            .finish()
    }
}

impl MeasurementProtocolTransport {
    pub fn new(config: MeasurementProtocolConfig) -> AnalyticsResult<Self> {
        let (sender, receiver) = async_channel::unbounded();
        let (ready_tx, ready_rx) = async_channel::bounded(1);

        let worker_config = config.clone();
        let worker = thread::Builder::new()
            .name("ga-measurement-protocol".to_string())
            .spawn(move || {
                // The blocking client must be created and dropped off any async runtime.
                let client = match Client::builder().timeout(worker_config.timeout()).build() {
                    Ok(client) => {
                        let _ = ready_tx.send_blocking(Ok(()));
                        client
                    }
                    Err(err) => {
                        let _ = ready_tx.send_blocking(Err(internal_error(format!(
                            "failed to build HTTP client: {err}"
                        ))));
                        return;
                    }
                };
                run_worker(&client, worker_config.endpoint().as_str(), receiver);
            })
            .map_err(|err| internal_error(format!("failed to spawn analytics worker: {err}")))?;

        ready_rx
            .recv_blocking()
            .map_err(|_| internal_error("analytics worker exited during start-up"))??;

        Ok(Self {
            config,
            sender,
            worker: Mutex::new(Some(worker)),
        })
    }

    pub fn config(&self) -> &MeasurementProtocolConfig {
        &self.config
    }

    /// Number of hits waiting for the worker.
    pub fn pending(&self) -> usize {
        self.sender.len()
    }
}

impl HitTransport for MeasurementProtocolTransport {
    fn send(&self, hit: Hit) {
        if self.sender.try_send(hit).is_err() {
            LOGGER.warn("analytics transport is shut down; dropping hit");
        }
    }

    /// Closes the queue, waits for the queued hits to be posted and joins the worker.
    fn shutdown(&self) {
        self.sender.close();
        let handle = self.worker.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.join().is_err() {
                LOGGER.error("analytics worker panicked");
            }
        }
    }
}

impl Drop for MeasurementProtocolTransport {
    fn drop(&mut self) {
        // The detached worker drains whatever is still queued and exits.
        self.sender.close();
    }
}

fn run_worker(client: &Client, endpoint: &str, receiver: Receiver<Hit>) {
    while let Ok(hit) = receiver.recv_blocking() {
        if let Err(err) = hit.validate() {
            LOGGER.warn(format!(
                "dropping {} hit for {}: {err}",
                hit.kind().hit_type(),
                hit.tracking_id()
            ));
            continue;
        }
        match post_hit(client, endpoint, &hit) {
            Ok(()) => LOGGER.debug(format!(
                "sent {} hit for {}",
                hit.kind().hit_type(),
                hit.tracking_id()
            )),
            Err(err) => LOGGER.warn(format!("failed to send analytics hit: {err}")),
        }
    }
}

fn post_hit(client: &Client, endpoint: &str, hit: &Hit) -> AnalyticsResult<()> {
    let response = client
        .post(endpoint)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(hit.encode())
        .send()
        .map_err(|err| network_error(format!("failed to send analytics hit: {err}")))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response
        .text()
        .unwrap_or_else(|_| "<unavailable response body>".to_string());
    let message = match status {
        StatusCode::BAD_REQUEST => {
            format!("measurement protocol rejected the hit (400). Response: {body}")
        }
        _ => format!("measurement protocol request failed with status {status}. Response: {body}"),
    };
    Err(network_error(message))
}

/// Keeps every hit in memory instead of sending it. Clones share the same buffer.
#[derive(Clone, Debug, Default)]
pub struct RecordingTransport {
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().unwrap().clone()
    }

    pub fn take_hits(&self) -> Vec<Hit> {
        std::mem::take(&mut *self.hits.lock().unwrap())
    }

    pub fn len(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HitTransport for RecordingTransport {
    fn send(&self, hit: Hit) {
        self.hits.lock().unwrap().push(hit);
    }
}

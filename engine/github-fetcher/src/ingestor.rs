//! Background polling loop with cooperative stop.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use event_store::{EventRecord, EventStore};

use crate::client::{FeedClient, FetchOutcome};
use crate::config::FetcherConfig;
use crate::models::RawEvent;

/// How long `stop` waits for the worker to acknowledge before detaching it.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Lifecycle state of the ingestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestorState {
    Idle,
    Running,
    Stopping,
}

/// Outcome of one poll cycle.
///
/// Logged and discarded at the loop boundary; no variant ever propagates
/// past it. This replaces a blanket catch-all with something the log line
/// can name.
#[derive(Debug)]
pub enum CycleOutcome {
    /// Payload fetched; `accepted` of `fetched` items made it into the store.
    Ingested { fetched: usize, accepted: usize },

    /// Server answered "not modified"; nothing to do this cycle.
    Unchanged,

    /// Fetch, parse, or submission failed; the next scheduled cycle is the
    /// retry.
    Failed(anyhow::Error),
}

/// Errors surfaced by the ingestor lifecycle itself, never by the loop.
#[derive(Debug, thiserror::Error)]
pub enum IngestorError {
    #[error("ingestor must be configured with a store before start")]
    StoreNotConfigured,

    #[error("invalid fetcher configuration")]
    InvalidConfig(#[from] crate::config::FetcherConfigError),

    #[error("failed to build feed client")]
    Client(#[source] anyhow::Error),
}

/// Background task that feeds an [`EventStore`] from the events endpoint.
///
/// `configure` binds the store, `start` launches the poll loop on the tokio
/// runtime, and `stop` requests cooperative exit and waits a bounded time
/// for acknowledgment. A stop request interrupts the idle wait but never an
/// in-flight request; the request timeout bounds total stop latency.
pub struct FeedIngestor {
    config: FetcherConfig,
    store: Option<Arc<EventStore>>,
    stop_tx: Option<watch::Sender<bool>>,
    handle: Option<JoinHandle<()>>,
    state: IngestorState,
}

impl FeedIngestor {
    /// Create an ingestor with a validated configuration.
    pub fn new(config: FetcherConfig) -> Result<Self, IngestorError> {
        config.validate()?;
        Ok(Self { config, store: None, stop_tx: None, handle: None, state: IngestorState::Idle })
    }

    /// Bind the ingestor to the store it feeds. Must be called before
    /// `start`.
    pub fn configure(&mut self, store: Arc<EventStore>) {
        self.store = Some(store);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> IngestorState {
        self.state
    }

    /// Whether the poll loop is currently running.
    pub fn is_running(&self) -> bool {
        self.state == IngestorState::Running
    }

    /// Launch the polling loop as a background task.
    ///
    /// No-op when already running. Fails when no store has been bound or the
    /// HTTP client cannot be constructed.
    pub fn start(&mut self) -> Result<(), IngestorError> {
        if self.state == IngestorState::Running {
            return Ok(());
        }

        let store = self.store.clone().ok_or(IngestorError::StoreNotConfigured)?;
        let client = FeedClient::new(self.config.clone()).map_err(IngestorError::Client)?;
        let (stop_tx, stop_rx) = watch::channel(false);

        let worker = PollWorker { client, config: self.config.clone(), store, etag: None };
        self.handle = Some(tokio::spawn(worker.run(stop_rx)));
        self.stop_tx = Some(stop_tx);
        self.state = IngestorState::Running;

        info!(interval_secs = self.config.poll_interval_secs, "Feed ingestor started");
        Ok(())
    }

    /// Signal the loop to exit and wait up to [`STOP_TIMEOUT`] for it.
    ///
    /// The ingestor returns to `Idle` regardless of whether the worker
    /// acknowledged in time; a straggler is detached and dies with the
    /// runtime.
    pub async fn stop(&mut self) {
        if self.state != IngestorState::Running {
            return;
        }
        self.state = IngestorState::Stopping;

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(true);
        }
        if let Some(handle) = self.handle.take() {
            match timeout(STOP_TIMEOUT, handle).await {
                Ok(_) => info!("Feed ingestor stopped"),
                Err(_) => {
                    warn!("Feed ingestor did not acknowledge stop within {STOP_TIMEOUT:?}, detaching")
                }
            }
        }

        self.state = IngestorState::Idle;
    }
}

/// Poll-loop worker.
///
/// Owns the network client and the revalidation-token state for the loop's
/// lifetime; nothing outside the loop touches either.
struct PollWorker {
    client: FeedClient,
    config: FetcherConfig,
    store: Arc<EventStore>,
    etag: Option<String>,
}

impl PollWorker {
    async fn run(mut self, mut stop_rx: watch::Receiver<bool>) {
        let interval = Duration::from_secs(self.config.poll_interval_secs);

        loop {
            if *stop_rx.borrow() {
                break;
            }

            let outcome = self.run_cycle().await;
            match &outcome {
                CycleOutcome::Ingested { fetched, accepted } => {
                    debug!(fetched, accepted, total = self.store.len(), "Poll cycle ingested events");
                }
                CycleOutcome::Unchanged => debug!("Poll cycle: feed unchanged"),
                CycleOutcome::Failed(err) => warn!("Poll cycle failed: {err:#}"),
            }

            // Idle until the next cycle, or until stop is requested,
            // whichever comes first.
            tokio::select! {
                changed = stop_rx.changed() => {
                    if changed.is_err() || *stop_rx.borrow() {
                        break;
                    }
                }
                _ = tokio::time::sleep(interval) => {}
            }
        }

        debug!("Poll loop exited");
    }

    async fn run_cycle(&mut self) -> CycleOutcome {
        match self.client.fetch_events(self.etag.as_deref()).await {
            Ok(outcome) => self.apply(outcome),
            Err(err) => CycleOutcome::Failed(err),
        }
    }

    /// Turn a fetch outcome into store mutations.
    fn apply(&mut self, outcome: FetchOutcome) -> CycleOutcome {
        match outcome {
            FetchOutcome::NotModified => CycleOutcome::Unchanged,
            FetchOutcome::Fetched { items, etag } => {
                if etag.is_some() {
                    self.etag = etag;
                }
                let fetched = items.len();
                let batch = translate_batch(items, &self.config);
                let accepted = self.store.add_events(batch);
                CycleOutcome::Ingested { fetched, accepted }
            }
        }
    }
}

/// Translate raw feed items into records, capped at the configured page
/// size. Disallowed kinds and items with missing or malformed required
/// fields are dropped individually.
fn translate_batch(items: Vec<RawEvent>, config: &FetcherConfig) -> Vec<EventRecord> {
    items
        .into_iter()
        .take(config.events_per_poll as usize)
        .filter_map(|item| translate_item(item, config))
        .collect()
}

fn translate_item(item: RawEvent, config: &FetcherConfig) -> Option<EventRecord> {
    let kind = item.kind?;
    if !config.allowed_kinds.contains(&kind) {
        return None;
    }
    let id = item.id?;
    let created_at = parse_timestamp(item.created_at.as_deref()?)?;
    let repo = item.repo.and_then(|repo| repo.name).unwrap_or_default();

    Some(EventRecord::new(id, kind, repo, created_at))
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw).ok().map(|parsed| parsed.with_timezone(&Utc))
}

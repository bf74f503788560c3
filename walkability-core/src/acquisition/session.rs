//! Progressive acquisition of one location query at a time.
//!
//! Every selection bumps a generation counter stored next to the displayed
//! metrics. Query tasks compare their generation against it inside the same
//! critical section that writes the display, so a superseded query can never
//! overwrite the current one.

use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::stream::{FuturesUnordered, Stream, StreamExt};
use log::{debug, info, trace, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::AbortHandle;
use tokio::time::timeout;

use super::config::AcquisitionConfig;
use super::sources::{InfrastructureSource, SignalSource, SourceSet};
use super::update::WalkabilityUpdate;
use crate::scoring::BaseAssessment;
use crate::{Error, InfrastructureSnapshot, Location, SignalKind, SignalResult, Signals};

/// Lifecycle of a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QueryPhase {
    /// Nothing selected yet
    #[default]
    Idle,
    /// Waiting for the infrastructure snapshot
    Fetching,
    /// Metrics published, signals still arriving
    Settling,
    /// All signals resolved or given up
    Complete,
    /// Infrastructure fetch failed, nothing was published
    Failed,
    /// A newer selection replaced this query
    Superseded,
}

/// The single shared "currently displayed" value of a session
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    generation: u64,
    phase: QueryPhase,
    current: Option<WalkabilityUpdate>,
}

impl DisplayState {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    pub fn current(&self) -> Option<&WalkabilityUpdate> {
        self.current.as_ref()
    }
}

type StreamItem = Result<WalkabilityUpdate, Error>;

/// Updates of one query: 1 to 6 metrics snapshots, or a single error when
/// the infrastructure fetch fails. Ends when the query settles or is
/// superseded.
#[derive(Debug)]
pub struct WalkabilityStream {
    generation: u64,
    rx: mpsc::UnboundedReceiver<StreamItem>,
}

impl WalkabilityStream {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Waits for the query to finish and returns its last update.
    /// `Ok(None)` if the query was superseded before publishing anything.
    ///
    /// # Errors
    ///
    /// Returns the infrastructure error if the query failed
    pub async fn settled(mut self) -> Result<Option<WalkabilityUpdate>, Error> {
        let mut last = None;
        while let Some(item) = self.rx.recv().await {
            last = Some(item?);
        }
        Ok(last)
    }
}

impl Stream for WalkabilityStream {
    type Item = StreamItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// A caller-facing session; selecting a location supersedes the previous one
pub struct WalkabilitySession {
    sources: SourceSet,
    config: Arc<AcquisitionConfig>,
    display: Arc<watch::Sender<DisplayState>>,
    active: Mutex<Option<AbortHandle>>,
}

impl WalkabilitySession {
    pub fn new(sources: SourceSet, config: AcquisitionConfig) -> Self {
        let (display, _) = watch::channel(DisplayState::default());
        Self {
            sources,
            config: Arc::new(config),
            display: Arc::new(display),
            active: Mutex::new(None),
        }
    }

    /// Starts a query for `location`, invalidating any previous query.
    ///
    /// All fetches start immediately on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidLocation`] without touching the current query
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime
    pub fn select(&self, location: Location) -> Result<WalkabilityStream, Error> {
        location.validate()?;

        let mut generation = 0;
        self.display.send_modify(|state| {
            state.generation += 1;
            state.phase = QueryPhase::Fetching;
            state.current = None;
            generation = state.generation;
        });

        let (tx, rx) = mpsc::unbounded_channel();
        let publisher = Publisher {
            display: Arc::clone(&self.display),
            generation,
            tx,
        };
        let task = tokio::spawn(run_query(
            self.sources.clone(),
            Arc::clone(&self.config),
            location,
            publisher,
        ));

        let previous = self
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task.abort_handle());
        if let Some(previous) = previous {
            if self.config.abort_superseded {
                previous.abort();
            }
        }

        Ok(WalkabilityStream { generation, rx })
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    /// Latest update of the active query
    pub fn current(&self) -> Option<WalkabilityUpdate> {
        self.display.borrow().current.clone()
    }

    /// Generation of the most recent selection, 0 before the first one
    pub fn generation(&self) -> u64 {
        self.display.borrow().generation
    }

    pub fn phase_of(&self, generation: u64) -> QueryPhase {
        let state = self.display.borrow();
        if generation == 0 || generation > state.generation {
            QueryPhase::Idle
        } else if generation < state.generation {
            QueryPhase::Superseded
        } else {
            state.phase
        }
    }
}

/// Runs a one-off query in a fresh session
///
/// # Errors
///
/// Returns [`Error::InvalidLocation`] for unusable coordinates
///
/// # Panics
///
/// Panics if called outside a tokio runtime
pub fn compute_walkability(
    sources: &SourceSet,
    config: &AcquisitionConfig,
    location: Location,
) -> Result<WalkabilityStream, Error> {
    WalkabilitySession::new(sources.clone(), config.clone()).select(location)
}

struct Publisher {
    display: Arc<watch::Sender<DisplayState>>,
    generation: u64,
    tx: mpsc::UnboundedSender<StreamItem>,
}

impl Publisher {
    fn is_current(&self) -> bool {
        self.display.borrow().generation == self.generation
    }

    /// Writes the update if this query is still the active one
    fn publish(&self, update: WalkabilityUpdate) -> bool {
        self.display.send_if_modified(|state| {
            if state.generation != self.generation {
                return false;
            }
            state.phase = if update.settled {
                QueryPhase::Complete
            } else {
                QueryPhase::Settling
            };
            state.current = Some(update.clone());
            // the stream consumer may be gone; the display stays authoritative
            let _ = self.tx.send(Ok(update));
            true
        })
    }

    fn fail(&self, error: Error) -> bool {
        self.display.send_if_modified(|state| {
            if state.generation != self.generation {
                return false;
            }
            state.phase = QueryPhase::Failed;
            state.current = None;
            let _ = self.tx.send(Err(error));
            true
        })
    }
}

async fn fetch_infrastructure(
    source: &dyn InfrastructureSource,
    location: &Location,
    limit: Duration,
) -> Result<InfrastructureSnapshot, Error> {
    match timeout(limit, source.fetch(location)).await {
        Ok(Ok(snapshot)) => Ok(snapshot),
        Ok(Err(error)) => Err(Error::InfrastructureUnavailable(error.to_string())),
        Err(_) => Err(Error::InfrastructureUnavailable(format!(
            "timed out after {limit:?}"
        ))),
    }
}

/// Never fails: errors, timeouts and non-finite values all yield `None`
async fn fetch_signal(
    source: &dyn SignalSource,
    location: &Location,
    limit: Duration,
) -> (SignalKind, Option<f64>) {
    let kind = source.kind();
    let raw = match timeout(limit, source.fetch(location)).await {
        Ok(Ok(Some(raw))) if raw.is_finite() => Some(raw),
        Ok(Ok(Some(raw))) => {
            warn!("{kind} source returned non-finite value {raw}");
            None
        }
        Ok(Ok(None)) => {
            debug!("{kind} has no measurement for this location");
            None
        }
        Ok(Err(error)) => {
            warn!("{kind} fetch failed: {error}");
            None
        }
        Err(_) => {
            warn!("{kind} fetch timed out after {limit:?}");
            None
        }
    };
    (kind, raw)
}

async fn run_query(
    sources: SourceSet,
    config: Arc<AcquisitionConfig>,
    location: Location,
    publisher: Publisher,
) {
    let generation = publisher.generation;
    info!(
        "Query {generation} started for '{}' ({:.5}, {:.5}) with {} signal sources",
        location.display_name,
        location.lat,
        location.lon,
        sources.signals().len()
    );

    let mut pending: FuturesUnordered<_> = sources
        .signals()
        .iter()
        .map(|source| fetch_signal(source.as_ref(), &location, config.signal_timeout()))
        .collect();
    let infrastructure = fetch_infrastructure(
        sources.infrastructure(),
        &location,
        config.infrastructure_timeout(),
    );
    tokio::pin!(infrastructure);

    let mut base: Option<BaseAssessment> = None;
    let mut signals = Signals::default();
    let mut failed: Vec<SignalKind> = Vec::new();

    loop {
        if !publisher.is_current() {
            trace!("Query {generation} superseded, dropping in-flight fetches");
            return;
        }

        let changed = tokio::select! {
            result = &mut infrastructure, if base.is_none() => match result {
                Ok(snapshot) => {
                    let assessment = BaseAssessment::new(&snapshot, location.point());
                    info!(
                        "Query {generation}: {} streets, {} crossings, {} POIs ({} confidence)",
                        assessment.quality.street_count,
                        assessment.quality.crossing_count,
                        assessment.quality.poi_count,
                        assessment.quality.confidence.as_str()
                    );
                    base = Some(assessment);
                    true
                }
                Err(error) => {
                    warn!("Query {generation} failed: {error}");
                    if !publisher.fail(error) {
                        trace!("Query {generation} superseded before its failure was reported");
                    }
                    return;
                }
            },
            Some((kind, raw)) = pending.next() => match raw {
                Some(raw) => {
                    signals.resolve(kind, SignalResult::from_raw(kind, raw)) || pending.is_empty()
                }
                None => {
                    failed.push(kind);
                    // the last outstanding signal still has to report settling
                    pending.is_empty()
                }
            },
            else => break,
        };

        let Some(assessment) = base else {
            continue;
        };
        if !changed {
            continue;
        }

        let settled = pending.is_empty();
        let update = WalkabilityUpdate::build(
            generation,
            &location,
            &assessment,
            &signals,
            &failed,
            &config.fusion,
            settled,
        );
        debug!(
            "Query {generation}: publishing {:?} score {} from {} signals",
            update.regime,
            update.metrics.overall_score,
            update.resolved.len()
        );
        if !publisher.publish(update) {
            trace!("Query {generation} superseded, discarding update");
            return;
        }
    }

    info!(
        "Query {generation} complete: {} signals resolved, {} absent",
        signals.resolved_count(),
        failed.len()
    );
}

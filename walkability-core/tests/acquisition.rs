use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::oneshot;
use walkability_core::acquisition::{
    AcquisitionConfig, FixedSignal, InfrastructureSource, QueryPhase, SignalSource, SourceSet,
    StaticInfrastructure, WalkabilitySession, WalkabilityUpdate, compute_walkability,
};
use walkability_core::scoring::{BaseAssessment, Regime, fuse};
use walkability_core::{
    Entity, Error, InfrastructureSnapshot, Location, SignalKind, SignalResult, SourceError,
};

type Delivery<T> = (T, oneshot::Sender<()>);

/// Per-location gates deciding when a fake collaborator answers
struct Gates<T> {
    pending: Mutex<HashMap<String, oneshot::Receiver<Delivery<T>>>>,
}

impl<T> Gates<T> {
    fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn open(&self, name: &str) -> Release<T> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(name.to_string(), rx);
        Release { tx }
    }

    async fn wait(&self, name: &str) -> Option<T> {
        let rx = self.pending.lock().unwrap().remove(name)?;
        let (value, ack) = rx.await.ok()?;
        let _ = ack.send(());
        Some(value)
    }
}

struct Release<T> {
    tx: oneshot::Sender<Delivery<T>>,
}

impl<T> Release<T> {
    /// Resolves the fetch and waits until the collaborator returned it
    async fn release(self, value: T) {
        let (ack_tx, ack_rx) = oneshot::channel();
        if self.tx.send((value, ack_tx)).is_ok() {
            let _ = ack_rx.await;
        }
    }
}

struct GatedInfrastructure(Gates<Result<InfrastructureSnapshot, SourceError>>);

#[async_trait]
impl InfrastructureSource for GatedInfrastructure {
    async fn fetch(&self, location: &Location) -> Result<InfrastructureSnapshot, SourceError> {
        self.0
            .wait(&location.display_name)
            .await
            .unwrap_or_else(|| Err(SourceError::Unavailable("gate dropped".into())))
    }
}

struct GatedSignal {
    kind: SignalKind,
    gates: Gates<Result<Option<f64>, SourceError>>,
}

#[async_trait]
impl SignalSource for GatedSignal {
    fn kind(&self) -> SignalKind {
        self.kind
    }

    async fn fetch(&self, location: &Location) -> Result<Option<f64>, SourceError> {
        self.gates
            .wait(&location.display_name)
            .await
            .unwrap_or_else(|| Err(SourceError::Unavailable("gate dropped".into())))
    }
}

struct NeverAnswers(SignalKind);

#[async_trait]
impl SignalSource for NeverAnswers {
    fn kind(&self) -> SignalKind {
        self.0
    }

    async fn fetch(&self, _location: &Location) -> Result<Option<f64>, SourceError> {
        futures::future::pending().await
    }
}

struct NeverLoads;

#[async_trait]
impl InfrastructureSource for NeverLoads {
    async fn fetch(&self, _location: &Location) -> Result<InfrastructureSnapshot, SourceError> {
        futures::future::pending().await
    }
}

struct Harness {
    infrastructure: Arc<GatedInfrastructure>,
    signals: Vec<Arc<GatedSignal>>,
    sources: SourceSet,
}

impl Harness {
    fn new() -> Self {
        let infrastructure = Arc::new(GatedInfrastructure(Gates::new()));
        let signals: Vec<Arc<GatedSignal>> = SignalKind::ALL
            .into_iter()
            .map(|kind| {
                Arc::new(GatedSignal {
                    kind,
                    gates: Gates::new(),
                })
            })
            .collect();

        let mut sources = SourceSet::new(infrastructure.clone());
        for signal in &signals {
            sources = sources.with_signal(signal.clone());
        }

        Self {
            infrastructure,
            signals,
            sources,
        }
    }

    fn open(&self, name: &str) -> QueryGates {
        QueryGates {
            infrastructure: Some(self.infrastructure.0.open(name)),
            signals: self
                .signals
                .iter()
                .map(|signal| (signal.kind, signal.gates.open(name)))
                .collect(),
        }
    }
}

struct QueryGates {
    infrastructure: Option<Release<Result<InfrastructureSnapshot, SourceError>>>,
    signals: HashMap<SignalKind, Release<Result<Option<f64>, SourceError>>>,
}

impl QueryGates {
    async fn infrastructure(&mut self, value: Result<InfrastructureSnapshot, SourceError>) {
        if let Some(release) = self.infrastructure.take() {
            release.release(value).await;
        }
    }

    async fn signal(&mut self, kind: SignalKind, value: Result<Option<f64>, SourceError>) {
        if let Some(release) = self.signals.remove(&kind) {
            release.release(value).await;
        }
    }
}

fn town_centre() -> InfrastructureSnapshot {
    InfrastructureSnapshot::from_entities([
        Entity::node(1, 52.2300, 21.0100, [("highway", "crossing")]),
        Entity::node(2, 52.2305, 21.0105, [("crossing", "zebra")]),
        Entity::way(10, [("highway", "residential")]).with_position(52.2301, 21.0102),
        Entity::way(11, [("highway", "primary")]).with_position(52.2299, 21.0098),
        Entity::way(12, [("highway", "footway"), ("footway", "sidewalk")])
            .with_position(52.2302, 21.0101),
        Entity::node(20, 52.2303, 21.0099, [("amenity", "school")]),
        Entity::node(21, 52.2298, 21.0103, [("amenity", "cafe")]),
        Entity::node(22, 52.2304, 21.0104, [("leisure", "park")]),
    ])
}

fn location(name: &str) -> Location {
    Location::new(52.2300, 21.0100, name).unwrap()
}

fn raw_value(kind: SignalKind) -> f64 {
    match kind {
        SignalKind::Slope => 3.0,
        SignalKind::TreeCanopy => 0.45,
        SignalKind::SurfaceTemp => 24.0,
        SignalKind::AirQuality => 8.0,
        SignalKind::HeatIsland => 1.5,
    }
}

fn assert_consistent(update: &WalkabilityUpdate, snapshot: &InfrastructureSnapshot) {
    let base = BaseAssessment::new(snapshot, update.location.point());
    let scores = update.signal_scores();
    let expected = fuse(&base.metrics, &scores, &AcquisitionConfig::default().fusion);

    assert_eq!(update.metrics, expected);
    assert_eq!(update.regime, scores.regime());
    assert_eq!(update.data_quality, base.quality);
}

#[tokio::test]
async fn publishes_one_update_per_arrival() {
    let harness = Harness::new();
    let session = WalkabilitySession::new(harness.sources.clone(), AcquisitionConfig::default());
    let mut gates = harness.open("centre");
    let mut stream = session.select(location("centre")).unwrap();
    assert_eq!(session.phase_of(stream.generation()), QueryPhase::Fetching);

    gates.infrastructure(Ok(town_centre())).await;
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.regime, Regime::InfrastructureOnly);
    assert!(first.resolved.is_empty());
    assert!(!first.settled);
    assert_consistent(&first, &town_centre());
    assert_eq!(session.phase_of(stream.generation()), QueryPhase::Settling);

    for (n, kind) in SignalKind::ALL.into_iter().enumerate() {
        gates.signal(kind, Ok(Some(raw_value(kind)))).await;
        let update = stream.next().await.unwrap().unwrap();
        assert_eq!(update.resolved.len(), n + 1);
        assert_eq!(update.regime, Regime::select(n + 1));
        assert_eq!(update.settled, n + 1 == SignalKind::ALL.len());
        assert_consistent(&update, &town_centre());
    }

    assert!(stream.next().await.is_none());
    let last = session.current().unwrap();
    assert_eq!(last.regime, Regime::Complete);
    assert_eq!(session.phase_of(last.generation), QueryPhase::Complete);

    let air = last
        .resolved
        .iter()
        .find(|signal| signal.kind == SignalKind::AirQuality)
        .unwrap();
    assert_eq!(
        SignalResult {
            score: air.score,
            raw: air.raw
        },
        SignalResult::from_raw(SignalKind::AirQuality, 8.0)
    );
}

#[tokio::test]
async fn early_signals_fold_into_first_update() {
    let harness = Harness::new();
    let session = WalkabilitySession::new(harness.sources.clone(), AcquisitionConfig::default());
    let mut gates = harness.open("centre");
    let mut stream = session.select(location("centre")).unwrap();

    gates.signal(SignalKind::Slope, Ok(Some(1.0))).await;
    gates.signal(SignalKind::AirQuality, Ok(Some(40.0))).await;
    assert!(session.current().is_none());

    gates.infrastructure(Ok(town_centre())).await;
    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.regime, Regime::Partial);
    assert_eq!(first.resolved.len(), 2);
    assert_consistent(&first, &town_centre());
}

#[tokio::test]
async fn failed_signals_are_absent_not_zero() {
    let harness = Harness::new();
    let session = WalkabilitySession::new(harness.sources.clone(), AcquisitionConfig::default());
    let mut gates = harness.open("centre");
    let stream = session.select(location("centre")).unwrap();

    gates.infrastructure(Ok(town_centre())).await;
    gates
        .signal(SignalKind::Slope, Err(SourceError::Http("503".into())))
        .await;
    gates.signal(SignalKind::TreeCanopy, Ok(None)).await;
    gates.signal(SignalKind::SurfaceTemp, Ok(Some(f64::NAN))).await;
    gates.signal(SignalKind::AirQuality, Ok(Some(8.0))).await;
    gates
        .signal(SignalKind::HeatIsland, Err(SourceError::Timeout))
        .await;

    let updates: Vec<_> = stream.collect().await;
    // infrastructure, air quality, and the settling failure of heat island
    assert_eq!(updates.len(), 3);

    let last = updates.last().unwrap().as_ref().unwrap();
    assert!(last.settled);
    assert_eq!(last.regime, Regime::Partial);
    assert_eq!(last.resolved.len(), 1);
    assert_eq!(
        last.failed,
        vec![
            SignalKind::Slope,
            SignalKind::TreeCanopy,
            SignalKind::SurfaceTemp,
            SignalKind::HeatIsland
        ]
    );
    assert_eq!(last.signal_scores().slope, None);
    assert_consistent(last, &town_centre());
}

#[tokio::test(start_paused = true)]
async fn slow_signal_times_out() {
    let sources = SourceSet::new(Arc::new(StaticInfrastructure(Arc::new(town_centre()))))
        .with_signal(Arc::new(FixedSignal {
            kind: SignalKind::AirQuality,
            value: 8.0,
        }))
        .with_signal(Arc::new(NeverAnswers(SignalKind::Slope)));
    let config = AcquisitionConfig::default();
    let started = tokio::time::Instant::now();

    let last = compute_walkability(&sources, &config, location("centre"))
        .unwrap()
        .settled()
        .await
        .unwrap()
        .unwrap();

    assert!(started.elapsed() >= config.signal_timeout());
    assert!(last.settled);
    assert_eq!(last.failed, vec![SignalKind::Slope]);
    assert_eq!(last.resolved.len(), 1);
    assert_eq!(last.regime, Regime::Partial);
}

#[tokio::test]
async fn infrastructure_failure_is_fatal() {
    let harness = Harness::new();
    let session = WalkabilitySession::new(harness.sources.clone(), AcquisitionConfig::default());
    let mut gates = harness.open("centre");
    let mut stream = session.select(location("centre")).unwrap();
    let generation = stream.generation();

    gates.signal(SignalKind::Slope, Ok(Some(2.0))).await;
    gates
        .infrastructure(Err(SourceError::Http("429 Too Many Requests".into())))
        .await;

    let result = stream.next().await.unwrap();
    assert!(matches!(result, Err(Error::InfrastructureUnavailable(_))));
    assert!(stream.next().await.is_none());
    assert!(session.current().is_none());
    assert_eq!(session.phase_of(generation), QueryPhase::Failed);
}

#[tokio::test(start_paused = true)]
async fn infrastructure_timeout_is_fatal() {
    let config = AcquisitionConfig {
        infrastructure_timeout_ms: 5_000,
        ..AcquisitionConfig::default()
    };
    let sources = SourceSet::new(Arc::new(NeverLoads));

    let result = compute_walkability(&sources, &config, location("centre"))
        .unwrap()
        .settled()
        .await;

    assert!(matches!(result, Err(Error::InfrastructureUnavailable(_))));
}

#[tokio::test]
async fn superseded_query_never_publishes() {
    let harness = Harness::new();
    let config = AcquisitionConfig {
        abort_superseded: false,
        ..AcquisitionConfig::default()
    };
    let session = WalkabilitySession::new(harness.sources.clone(), config);

    let mut old_gates = harness.open("old");
    let mut old = session.select(location("old")).unwrap();
    old_gates.infrastructure(Ok(town_centre())).await;
    let first = old.next().await.unwrap().unwrap();
    assert_eq!(first.generation, old.generation());

    let mut new_gates = harness.open("new");
    let mut new = session.select(location("new")).unwrap();
    assert!(new.generation() > old.generation());
    assert!(session.current().is_none());
    assert_eq!(session.phase_of(old.generation()), QueryPhase::Superseded);

    // the old query still receives data but must not surface it
    old_gates.signal(SignalKind::Slope, Ok(Some(1.0))).await;
    assert!(old.next().await.is_none());
    assert!(session.current().is_none());

    new_gates.infrastructure(Ok(town_centre())).await;
    let update = new.next().await.unwrap().unwrap();
    assert_eq!(update.generation, new.generation());
    assert_eq!(update.location.display_name, "new");
    assert_eq!(session.current().unwrap().generation, new.generation());
}

#[tokio::test]
async fn selecting_again_aborts_previous_query() {
    let harness = Harness::new();
    let session = WalkabilitySession::new(harness.sources.clone(), AcquisitionConfig::default());

    let mut old_gates = harness.open("old");
    let mut old = session.select(location("old")).unwrap();
    old_gates.infrastructure(Ok(town_centre())).await;
    assert!(old.next().await.unwrap().is_ok());

    let mut new_gates = harness.open("new");
    let new = session.select(location("new")).unwrap();
    assert!(old.next().await.is_none());

    new_gates.infrastructure(Ok(town_centre())).await;
    drop(new_gates);
    let last = new.settled().await.unwrap().unwrap();
    assert!(last.settled);
    assert_eq!(last.failed.len(), SignalKind::ALL.len());
    assert_eq!(last.regime, Regime::InfrastructureOnly);
}

#[tokio::test]
async fn invalid_location_is_rejected_before_fetching() {
    let harness = Harness::new();
    let session = WalkabilitySession::new(harness.sources.clone(), AcquisitionConfig::default());
    let location = Location {
        lat: 95.0,
        lon: 21.0,
        display_name: "nowhere".into(),
        country_code: None,
    };

    assert!(matches!(
        session.select(location),
        Err(Error::InvalidLocation { .. })
    ));
    assert_eq!(session.generation(), 0);
    assert_eq!(session.phase_of(1), QueryPhase::Idle);
}

#[tokio::test]
async fn fixed_sources_settle_complete() {
    let mut sources = SourceSet::new(Arc::new(StaticInfrastructure(Arc::new(town_centre()))));
    for kind in SignalKind::ALL {
        sources = sources.with_signal(Arc::new(FixedSignal {
            kind,
            value: raw_value(kind),
        }));
    }

    let updates: Vec<_> = compute_walkability(&sources, &AcquisitionConfig::default(), location("centre"))
        .unwrap()
        .collect()
        .await;

    assert!(!updates.is_empty() && updates.len() <= 6);
    for update in &updates {
        assert_consistent(update.as_ref().unwrap(), &town_centre());
    }
    let last = updates.last().unwrap().as_ref().unwrap();
    assert!(last.settled);
    assert_eq!(last.regime, Regime::Complete);
    assert!(last.failed.is_empty());
    assert!(updates[..updates.len() - 1]
        .iter()
        .all(|update| !update.as_ref().unwrap().settled));
}

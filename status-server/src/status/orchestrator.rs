//! Fetch orchestration: cache-first reads with graceful degradation.
//!
//! All three query kinds share one algorithm: serve fresh cache without a
//! network call; otherwise query the upstream; on failure fall back to the
//! last known payload if any, else an empty one. The orchestrator never
//! returns an error — transit status is advisory, and a stale or empty
//! result is strictly better than an error page.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::clock::Clock;
use crate::domain::{RawBusArrival, RawTimetableEntry, StationId, StopId};
use crate::upstream::{TransitClient, UpstreamError};

/// Cache key: entity identifier plus query kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// Metro first/last-train table for a station.
    MetroFirstLast(StationId),
    /// Metro live timetable for a station.
    MetroTimetable(StationId),
    /// Live bus arrivals for a stop.
    BusArrivals(StopId),
}

/// Query kind, independent of the entity queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    MetroFirstLast,
    MetroTimetable,
    BusArrivals,
}

impl QueryKey {
    /// The kind of this key, for TTL selection and empty payloads.
    pub fn kind(&self) -> QueryKind {
        match self {
            QueryKey::MetroFirstLast(_) => QueryKind::MetroFirstLast,
            QueryKey::MetroTimetable(_) => QueryKind::MetroTimetable,
            QueryKey::BusArrivals(_) => QueryKind::BusArrivals,
        }
    }
}

/// A fetched payload, shaped by the query kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Metro records (both first/last and live timetable kinds).
    Timetable(Vec<RawTimetableEntry>),
    /// Bus arrival readings.
    BusArrivals(Vec<RawBusArrival>),
}

impl Payload {
    /// The empty payload of the right shape for a query kind.
    pub fn empty_for(kind: QueryKind) -> Payload {
        match kind {
            QueryKind::MetroFirstLast | QueryKind::MetroTimetable => {
                Payload::Timetable(Vec::new())
            }
            QueryKind::BusArrivals => Payload::BusArrivals(Vec::new()),
        }
    }

    /// Timetable records, or empty for a bus payload.
    pub fn timetable_entries(&self) -> &[RawTimetableEntry] {
        match self {
            Payload::Timetable(entries) => entries,
            Payload::BusArrivals(_) => &[],
        }
    }

    /// Bus readings, or empty for a metro payload.
    pub fn bus_arrivals(&self) -> &[RawBusArrival] {
        match self {
            Payload::BusArrivals(arrivals) => arrivals,
            Payload::Timetable(_) => &[],
        }
    }

    /// Whether the payload holds no records.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Timetable(entries) => entries.is_empty(),
            Payload::BusArrivals(arrivals) => arrivals.is_empty(),
        }
    }
}

/// One logical upstream query per (entity, query-kind) pair.
///
/// The orchestrator is generic over this seam so tests can script the
/// upstream without a network.
#[async_trait]
pub trait TransitSource: Send + Sync {
    async fn query(&self, key: &QueryKey) -> Result<Payload, UpstreamError>;
}

#[async_trait]
impl TransitSource for TransitClient {
    async fn query(&self, key: &QueryKey) -> Result<Payload, UpstreamError> {
        match key {
            QueryKey::MetroFirstLast(station) => {
                Ok(Payload::Timetable(self.first_last(station).await?))
            }
            QueryKey::MetroTimetable(station) => {
                Ok(Payload::Timetable(self.timetable(station).await?))
            }
            QueryKey::BusArrivals(stop) => {
                Ok(Payload::BusArrivals(self.bus_arrivals(stop).await?))
            }
        }
    }
}

/// Why a fetch served degraded data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradeReason {
    /// The proxy has no provider credentials.
    NotConfigured,
    /// The provider rate-limited us.
    RateLimited,
    /// Network failure, provider error, or unparseable response.
    Unavailable,
}

impl DegradeReason {
    fn classify(error: &UpstreamError) -> Self {
        match error {
            UpstreamError::NotConfigured => DegradeReason::NotConfigured,
            UpstreamError::RateLimited => DegradeReason::RateLimited,
            UpstreamError::Http(_) | UpstreamError::Api { .. } | UpstreamError::Json { .. } => {
                DegradeReason::Unavailable
            }
        }
    }

    /// Stable label for diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradeReason::NotConfigured => "not-configured",
            DegradeReason::RateLimited => "rate-limited",
            DegradeReason::Unavailable => "unavailable",
        }
    }
}

/// How the returned payload relates to the upstream's current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Served from a fresh cache entry or a successful refresh.
    Fresh,
    /// Refresh failed; this is the last known payload.
    Stale { age: Duration, reason: DegradeReason },
    /// Refresh failed and nothing was cached.
    Empty { reason: DegradeReason },
}

/// Result of a fetch: best available data, possibly stale or empty.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub payload: Arc<Payload>,
    pub freshness: Freshness,
}

/// Cache-first fetcher shared by all query kinds.
pub struct FetchOrchestrator<S> {
    source: S,
    cache: CacheStore<QueryKey, Payload>,
    /// Per-key in-flight locks deduplicating concurrent refreshes.
    flights: Mutex<HashMap<QueryKey, Arc<Mutex<()>>>>,
    /// Kinds the proxy reported as not configured; permanent until restart.
    not_configured: std::sync::Mutex<HashSet<QueryKind>>,
}

impl<S: TransitSource> FetchOrchestrator<S> {
    /// Create an orchestrator over the given source, aging cache entries
    /// against `clock`.
    pub fn new(source: S, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            cache: CacheStore::new(clock),
            flights: Mutex::new(HashMap::new()),
            not_configured: std::sync::Mutex::new(HashSet::new()),
        }
    }

    /// Fetch the payload for `key`, treating cache entries younger than
    /// `ttl` as fresh. Never fails; see module docs for the degrade policy.
    pub async fn fetch(&self, key: QueryKey, ttl: Duration) -> FetchOutcome {
        if let Some(payload) = self.cache.get_fresh(&key, ttl).await {
            return FetchOutcome {
                payload,
                freshness: Freshness::Fresh,
            };
        }

        // A missing integration is a configuration condition, not a
        // transient fault: once seen, stop calling the upstream for it.
        if self.kind_not_configured(key.kind()) {
            return self.empty_outcome(key.kind(), DegradeReason::NotConfigured);
        }

        let flight = self.flight_lock(&key).await;
        let _guard = flight.lock().await;

        // A concurrent flight for this key may have refreshed while we
        // waited for the lock.
        if let Some(payload) = self.cache.get_fresh(&key, ttl).await {
            debug!(?key, "refresh satisfied by concurrent flight");
            return FetchOutcome {
                payload,
                freshness: Freshness::Fresh,
            };
        }

        match self.source.query(&key).await {
            Ok(payload) => {
                let payload = self.cache.insert(key, payload).await;
                FetchOutcome {
                    payload,
                    freshness: Freshness::Fresh,
                }
            }
            Err(error) => self.degrade(key, error).await,
        }
    }

    /// Failed refresh: stale fallback where possible, empty otherwise.
    async fn degrade(&self, key: QueryKey, error: UpstreamError) -> FetchOutcome {
        let reason = DegradeReason::classify(&error);
        warn!(?key, error = %error, "upstream fetch failed, degrading");

        if matches!(error, UpstreamError::NotConfigured) {
            self.mark_not_configured(key.kind());
            return self.empty_outcome(key.kind(), reason);
        }

        if let Some((payload, age)) = self.cache.get(&key).await {
            return FetchOutcome {
                payload,
                freshness: Freshness::Stale { age, reason },
            };
        }

        self.empty_outcome(key.kind(), reason)
    }

    fn empty_outcome(&self, kind: QueryKind, reason: DegradeReason) -> FetchOutcome {
        FetchOutcome {
            payload: Arc::new(Payload::empty_for(kind)),
            freshness: Freshness::Empty { reason },
        }
    }

    async fn flight_lock(&self, key: &QueryKey) -> Arc<Mutex<()>> {
        let mut flights = self.flights.lock().await;
        Arc::clone(flights.entry(key.clone()).or_default())
    }

    fn kind_not_configured(&self, kind: QueryKind) -> bool {
        self.not_configured.lock().unwrap().contains(&kind)
    }

    fn mark_not_configured(&self, kind: QueryKind) {
        self.not_configured.lock().unwrap().insert(kind);
    }

    /// Number of cached keys (for monitoring).
    pub async fn cached_keys(&self) -> usize {
        self.cache.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::domain::CivilTime;
    use chrono::Weekday;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const TTL: Duration = Duration::from_secs(20);

    fn entry(headsign: &str) -> RawTimetableEntry {
        RawTimetableEntry {
            line_id: "G".to_string(),
            destination_id: None,
            destination_name: headsign.trim_start_matches('往').to_string(),
            headsign: headsign.to_string(),
            times: vec![CivilTime::from_hm(10, 0).unwrap()],
            service_days: None,
            updated_at: None,
        }
    }

    fn timetable(headsign: &str) -> Payload {
        Payload::Timetable(vec![entry(headsign)])
    }

    /// Upstream double: pops one scripted result per call.
    struct ScriptedSource {
        calls: AtomicUsize,
        script: std::sync::Mutex<VecDeque<Result<Payload, UpstreamError>>>,
        delay: Option<Duration>,
    }

    impl ScriptedSource {
        fn new(script: Vec<Result<Payload, UpstreamError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script: std::sync::Mutex::new(script.into()),
                delay: None,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TransitSource for ScriptedSource {
        async fn query(&self, _key: &QueryKey) -> Result<Payload, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            CivilTime::from_hm(12, 0).unwrap(),
            Weekday::Mon,
        ))
    }

    fn key() -> QueryKey {
        QueryKey::MetroTimetable(StationId::parse("G07").unwrap())
    }

    #[tokio::test]
    async fn second_fetch_within_ttl_skips_upstream() {
        let source = ScriptedSource::new(vec![Ok(timetable("往新店"))]);
        let orch = FetchOrchestrator::new(source, clock());

        let first = orch.fetch(key(), TTL).await;
        let second = orch.fetch(key(), TTL).await;

        assert_eq!(orch.source.calls(), 1);
        assert_eq!(first.freshness, Freshness::Fresh);
        assert_eq!(second.freshness, Freshness::Fresh);
        // Byte-identical: the very same cached allocation.
        assert!(Arc::ptr_eq(&first.payload, &second.payload));
    }

    #[tokio::test]
    async fn expired_entry_triggers_refresh() {
        let clock = clock();
        let source = ScriptedSource::new(vec![Ok(timetable("往新店")), Ok(timetable("往松山"))]);
        let orch = FetchOrchestrator::new(source, clock.clone());

        orch.fetch(key(), TTL).await;
        clock.advance(TTL + Duration::from_secs(1));
        let outcome = orch.fetch(key(), TTL).await;

        assert_eq!(orch.source.calls(), 2);
        assert_eq!(outcome.freshness, Freshness::Fresh);
        assert_eq!(outcome.payload.timetable_entries()[0].headsign, "往松山");
    }

    #[tokio::test]
    async fn stale_fallback_on_rate_limit() {
        let clock = clock();
        let source =
            ScriptedSource::new(vec![Ok(timetable("往新店")), Err(UpstreamError::RateLimited)]);
        let orch = FetchOrchestrator::new(source, clock.clone());

        let first = orch.fetch(key(), TTL).await;
        clock.advance(TTL + Duration::from_secs(40));
        let second = orch.fetch(key(), TTL).await;

        // Previous value, unchanged.
        assert!(Arc::ptr_eq(&first.payload, &second.payload));
        match second.freshness {
            Freshness::Stale { age, reason } => {
                assert_eq!(reason, DegradeReason::RateLimited);
                assert_eq!(age, TTL + Duration::from_secs(40));
            }
            other => panic!("expected stale outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_fallback_on_upstream_error() {
        let clock = clock();
        let source = ScriptedSource::new(vec![
            Ok(timetable("往新店")),
            Err(UpstreamError::Api {
                status: 502,
                message: "bad gateway".into(),
            }),
        ]);
        let orch = FetchOrchestrator::new(source, clock.clone());

        let first = orch.fetch(key(), TTL).await;
        clock.advance(TTL * 2);
        let second = orch.fetch(key(), TTL).await;

        assert!(Arc::ptr_eq(&first.payload, &second.payload));
        assert!(matches!(
            second.freshness,
            Freshness::Stale {
                reason: DegradeReason::Unavailable,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn empty_on_cold_failure() {
        let source = ScriptedSource::new(vec![Err(UpstreamError::Api {
            status: 503,
            message: "unavailable".into(),
        })]);
        let orch = FetchOrchestrator::new(source, clock());

        let outcome = orch.fetch(key(), TTL).await;

        assert!(outcome.payload.is_empty());
        assert_eq!(
            outcome.freshness,
            Freshness::Empty {
                reason: DegradeReason::Unavailable
            }
        );
    }

    #[tokio::test]
    async fn not_configured_is_memoized() {
        let source = ScriptedSource::new(vec![Err(UpstreamError::NotConfigured)]);
        let orch = FetchOrchestrator::new(source, clock());

        let first = orch.fetch(key(), TTL).await;
        let second = orch.fetch(key(), TTL).await;

        // Only the first request hits the upstream.
        assert_eq!(orch.source.calls(), 1);
        for outcome in [first, second] {
            assert!(outcome.payload.is_empty());
            assert_eq!(
                outcome.freshness,
                Freshness::Empty {
                    reason: DegradeReason::NotConfigured
                }
            );
        }
    }

    #[tokio::test]
    async fn not_configured_does_not_serve_stale() {
        let clock = clock();
        let source = ScriptedSource::new(vec![
            Ok(timetable("往新店")),
            Err(UpstreamError::NotConfigured),
        ]);
        let orch = FetchOrchestrator::new(source, clock.clone());

        orch.fetch(key(), TTL).await;
        clock.advance(TTL * 2);
        let outcome = orch.fetch(key(), TTL).await;

        // Credentials gone is not a transient fault; no stale fallback.
        assert!(outcome.payload.is_empty());
        assert_eq!(
            outcome.freshness,
            Freshness::Empty {
                reason: DegradeReason::NotConfigured
            }
        );
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_upstream_call() {
        let source = ScriptedSource::new(vec![Ok(timetable("往新店")), Ok(timetable("往松山"))])
            .with_delay(Duration::from_millis(20));
        let orch = FetchOrchestrator::new(source, clock());

        let (a, b) = tokio::join!(orch.fetch(key(), TTL), orch.fetch(key(), TTL));

        assert_eq!(orch.source.calls(), 1);
        assert!(Arc::ptr_eq(&a.payload, &b.payload));
        assert_eq!(a.freshness, Freshness::Fresh);
        assert_eq!(b.freshness, Freshness::Fresh);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let source = ScriptedSource::new(vec![
            Ok(timetable("往新店")),
            Err(UpstreamError::RateLimited),
        ]);
        let orch = FetchOrchestrator::new(source, clock());

        let other = QueryKey::MetroTimetable(StationId::parse("R08").unwrap());
        let good = orch.fetch(key(), TTL).await;
        let bad = orch.fetch(other, TTL).await;

        // One key failing cold does not disturb the other.
        assert_eq!(good.freshness, Freshness::Fresh);
        assert!(matches!(bad.freshness, Freshness::Empty { .. }));
        assert_eq!(orch.cached_keys().await, 1);
    }
}

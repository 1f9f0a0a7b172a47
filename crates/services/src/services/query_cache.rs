//! Keyed read cache for backend collections and records.
//!
//! Entries are type-erased so one cache holds exhibits, parts, jotforms and the
//! user profile side by side. Each entry keeps its last good value even after
//! it is invalidated or a refetch fails, so callers can render stale data while
//! a new read is in flight.

use std::{
    any::Any,
    fmt,
    future::Future,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use backon::{ExponentialBuilder, Retryable};
use chrono::{DateTime, Utc};
use client::ClientError;
use dashmap::{DashMap, mapref::entry::Entry as MapEntry};
use futures::{
    FutureExt,
    future::{BoxFuture, Shared},
};
use moka::future::Cache;
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, warn};
use utils::config::CacheConfig;

type AnyData = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<AnyData, QueryError>>>;

const MAX_ENTRIES: u64 = 10_000;

#[derive(Debug, Clone, Error)]
pub enum QueryError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("query is disabled")]
    Disabled,
    #[error("cached value for {0} has a different type")]
    TypeMismatch(QueryKey),
    #[error("{0}")]
    Failed(String),
}

impl QueryError {
    pub fn should_retry(&self) -> bool {
        match self {
            Self::Client(e) => e.should_retry(),
            _ => false,
        }
    }
}

/// Ordered path of segments identifying one cached read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Empty key; a prefix of every other key.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn exhibits() -> Self {
        Self::new(["exhibits"])
    }

    pub fn exhibit(id: &str) -> Self {
        Self::new(["exhibit", id])
    }

    /// Every `["exhibit", id]` key.
    pub fn exhibit_records() -> Self {
        Self::new(["exhibit"])
    }

    pub fn random_exhibit() -> Self {
        Self::new(["exhibits-random"])
    }

    pub fn parts() -> Self {
        Self::new(["parts"])
    }

    pub fn part(id: &str) -> Self {
        Self::new(["part", id])
    }

    pub fn part_records() -> Self {
        Self::new(["part"])
    }

    pub fn parts_by_ids(ids: &[String]) -> Self {
        Self::new(std::iter::once("parts").chain(ids.iter().map(String::as_str)))
    }

    pub fn jotforms() -> Self {
        Self::new(["jotforms"])
    }

    pub fn profile() -> Self {
        Self::new(["profile-info"])
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Segment-wise prefix test; `["parts"]` matches `["parts", "7"]` but not `["parts-old"]`.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }

    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.0.push(segment.into());
        self
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// Freshness and retry policy for one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful read counts as fresh. Zero means stale immediately.
    pub stale_time: Duration,
    /// Background refresh period, if the query is polled.
    pub refetch_interval: Option<Duration>,
    /// Extra attempts after a transient failure.
    pub retry: usize,
    pub retry_delay: Duration,
    pub enabled: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self::polling()
    }
}

impl QueryOptions {
    /// Primary collections: refreshed every minute.
    pub fn polling() -> Self {
        Self {
            stale_time: Duration::ZERO,
            refetch_interval: Some(Duration::from_secs(60)),
            retry: 2,
            retry_delay: Duration::from_secs(1),
            enabled: true,
        }
    }

    /// Read once, reuse for five minutes.
    pub fn stale_window() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            refetch_interval: None,
            ..Self::polling()
        }
    }

    /// Sign-in splash image, rotated every ten seconds.
    pub fn random_splash() -> Self {
        Self {
            refetch_interval: Some(Duration::from_secs(10)),
            ..Self::polling()
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            stale_time: config.stale_time(),
            refetch_interval: Some(config.refetch_interval()).filter(|d| !d.is_zero()),
            retry: config.retry,
            ..Self::polling()
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Loading,
    Success,
    Error,
}

/// What a renderer sees for a key right now, without triggering a read.
#[derive(Debug, Clone)]
pub struct QuerySnapshot<T> {
    pub status: QueryStatus,
    pub data: Option<Arc<T>>,
    pub error: Option<QueryError>,
    pub is_stale: bool,
    pub is_fetching: bool,
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> QuerySnapshot<T> {
    fn loading() -> Self {
        Self {
            status: QueryStatus::Loading,
            data: None,
            error: None,
            is_stale: true,
            is_fetching: false,
            updated_at: None,
        }
    }
}

#[derive(Default)]
struct EntryState {
    data: Option<AnyData>,
    error: Option<QueryError>,
    fetched_at: Option<Instant>,
    updated_at: Option<DateTime<Utc>>,
    invalidated: bool,
    fetching: bool,
    // Bumped on every invalidation so a read that started earlier can't mark itself fresh.
    generation: u64,
    // Generation the stored data was read at.
    data_generation: u64,
}

#[derive(Default)]
struct Entry {
    state: RwLock<EntryState>,
}

impl Entry {
    fn read(&self) -> std::sync::RwLockReadGuard<'_, EntryState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, EntryState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn fresh_data(&self, stale_time: Duration) -> Option<AnyData> {
        let state = self.read();
        let fetched_at = state.fetched_at?;
        if state.invalidated || state.error.is_some() || fetched_at.elapsed() >= stale_time {
            return None;
        }
        state.data.clone()
    }

    fn begin_fetch(&self) -> u64 {
        let mut state = self.write();
        state.fetching = true;
        state.generation
    }

    fn store_success(&self, data: AnyData, generation: u64) {
        let mut state = self.write();
        if state.data.is_some() && generation < state.data_generation {
            // A read started after the last invalidation has already landed.
            state.fetching = false;
            return;
        }
        state.data = Some(data);
        state.data_generation = generation;
        state.error = None;
        state.fetching = false;
        state.fetched_at = Some(Instant::now());
        state.updated_at = Some(Utc::now());
        state.invalidated = state.generation != generation;
    }

    fn store_error(&self, error: QueryError) {
        let mut state = self.write();
        state.error = Some(error);
        state.fetching = false;
    }

    fn invalidate(&self) {
        let mut state = self.write();
        state.invalidated = true;
        state.generation += 1;
    }

    fn snapshot<T: Send + Sync + 'static>(&self, stale_time: Duration) -> QuerySnapshot<T> {
        let state = self.read();
        let data = state.data.clone().and_then(|d| d.downcast::<T>().ok());
        let status = match (&state.error, &data) {
            (Some(_), _) => QueryStatus::Error,
            (None, Some(_)) => QueryStatus::Success,
            (None, None) => QueryStatus::Loading,
        };
        let is_stale = state.invalidated
            || state
                .fetched_at
                .is_none_or(|fetched_at| fetched_at.elapsed() >= stale_time);
        QuerySnapshot {
            status,
            data,
            error: state.error.clone(),
            is_stale,
            is_fetching: state.fetching,
            updated_at: state.updated_at,
        }
    }
}

/// Shared read cache. Clones are handles onto the same storage.
#[derive(Clone)]
pub struct QueryCache {
    entries: Cache<QueryKey, Arc<Entry>>,
    in_flight: Arc<DashMap<QueryKey, (u64, SharedFetch)>>,
    next_fetch_id: Arc<AtomicU64>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(5 * 60))
    }
}

impl fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.entries.entry_count())
            .field("in_flight", &self.in_flight.len())
            .finish()
    }
}

impl QueryCache {
    /// Entries nobody has read for `gc_time` are dropped.
    pub fn new(gc_time: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(MAX_ENTRIES)
                .time_to_idle(gc_time)
                .build(),
            in_flight: Arc::new(DashMap::new()),
            next_fetch_id: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.gc_time())
    }

    async fn entry(&self, key: &QueryKey) -> Arc<Entry> {
        self.entries
            .get_with(key.clone(), async { Arc::new(Entry::default()) })
            .await
    }

    /// Return cached data if it is still fresh, otherwise read through `fetcher`.
    ///
    /// Concurrent callers for the same key share one request.
    pub async fn fetch<T, F, Fut, E>(
        &self,
        key: QueryKey,
        options: &QueryOptions,
        fetcher: F,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<QueryError> + 'static,
    {
        self.fetch_inner(key, options, fetcher, false).await
    }

    /// Like [`fetch`](Self::fetch) but always goes to the backend.
    pub async fn refetch<T, F, Fut, E>(
        &self,
        key: QueryKey,
        options: &QueryOptions,
        fetcher: F,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<QueryError> + 'static,
    {
        self.fetch_inner(key, options, fetcher, true).await
    }

    async fn fetch_inner<T, F, Fut, E>(
        &self,
        key: QueryKey,
        options: &QueryOptions,
        fetcher: F,
        force: bool,
    ) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<QueryError> + 'static,
    {
        if !options.enabled {
            return Err(QueryError::Disabled);
        }

        let entry = self.entry(&key).await;
        if !force {
            if let Some(data) = entry.fresh_data(options.stale_time) {
                debug!(key = %key, "Query cache hit");
                return downcast(&key, data);
            }
        }

        let shared = match self.in_flight.entry(key.clone()) {
            MapEntry::Occupied(existing) => {
                debug!(key = %key, "Joining in-flight query");
                existing.get().1.clone()
            }
            MapEntry::Vacant(slot) => {
                let fetch_id = self.next_fetch_id.fetch_add(1, Ordering::Relaxed);
                let fut = self
                    .clone()
                    .run_fetch(key.clone(), entry, options.clone(), fetcher, fetch_id)
                    .boxed()
                    .shared();
                slot.insert((fetch_id, fut.clone()));
                fut
            }
        };

        let data = shared.await?;
        downcast(&key, data)
    }

    async fn run_fetch<T, F, Fut, E>(
        self,
        key: QueryKey,
        entry: Arc<Entry>,
        options: QueryOptions,
        fetcher: F,
        fetch_id: u64,
    ) -> Result<AnyData, QueryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Into<QueryError> + 'static,
    {
        let generation = entry.begin_fetch();
        debug!(key = %key, "Fetching query");

        let backoff = ExponentialBuilder::default()
            .with_min_delay(options.retry_delay)
            .with_max_delay(options.retry_delay.saturating_mul(8))
            .with_max_times(options.retry);
        let attempt = || {
            let fut = fetcher();
            async move { fut.await.map_err(Into::into) }
        };
        let result = attempt
            .retry(backoff)
            .when(|e: &QueryError| e.should_retry())
            .notify(|e, dur| {
                warn!(
                    key = %key,
                    error = %e,
                    "Query failed, retrying after {:.2}s",
                    dur.as_secs_f64()
                )
            })
            .await;

        let result = match result {
            Ok(data) => {
                let data: AnyData = Arc::new(data);
                entry.store_success(data.clone(), generation);
                Ok(data)
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Query failed");
                entry.store_error(e.clone());
                Err(e)
            }
        };

        self.in_flight.remove_if(&key, |_, (id, _)| *id == fetch_id);
        result
    }

    /// Current state of `key` without triggering a read.
    pub async fn peek<T: Send + Sync + 'static>(
        &self,
        key: &QueryKey,
        options: &QueryOptions,
    ) -> QuerySnapshot<T> {
        match self.entries.get(key).await {
            Some(entry) => entry.snapshot(options.stale_time),
            None => QuerySnapshot::loading(),
        }
    }

    /// Mark every entry under `prefix` stale. Data is kept for [`peek`](Self::peek);
    /// the next [`fetch`](Self::fetch) goes to the backend. Returns how many keys matched.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut touched = 0;
        for (key, entry) in self.entries.iter() {
            if key.starts_with(prefix) {
                entry.invalidate();
                touched += 1;
            }
        }
        // Reads started before the write must not be joined by reads started after it.
        self.in_flight.retain(|key, _| !key.starts_with(prefix));
        debug!(prefix = %prefix, touched, "Invalidated queries");
        touched
    }

    pub fn invalidate_all(&self) -> usize {
        self.invalidate(&QueryKey::root())
    }

    /// Drop every entry under `prefix`, data included.
    pub async fn remove(&self, prefix: &QueryKey) -> usize {
        let keys: Vec<QueryKey> = self
            .entries
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| (*key).clone())
            .collect();
        for key in &keys {
            self.entries.invalidate(key).await;
        }
        self.in_flight.retain(|key, _| !key.starts_with(prefix));
        keys.len()
    }

    /// Prime `key` with a known value, as if it had just been fetched.
    pub async fn set_data<T: Send + Sync + 'static>(&self, key: QueryKey, data: T) {
        let entry = self.entry(&key).await;
        let generation = entry.read().generation;
        entry.store_success(Arc::new(data), generation);
    }

    /// Counts entries directly; moka's `entry_count` lags behind recent inserts.
    pub fn len(&self) -> u64 {
        self.entries.iter().count() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.iter().next().is_none()
    }
}

fn downcast<T: Send + Sync + 'static>(key: &QueryKey, data: AnyData) -> Result<Arc<T>, QueryError> {
    data.downcast::<T>()
        .map_err(|_| QueryError::TypeMismatch(key.clone()))
}

//! Viewport fetch lifecycle.
//!
//! One session owns at most one pending debounce timer and one in-flight
//! fetch. A region change replaces the pending timer; each new fetch aborts
//! its predecessor; a superseded or torn-down fetch commits nothing. State
//! goes out over a `watch` channel so consumers re-render from snapshots
//! without holding any lock.

use std::sync::Arc;
use std::time::Duration;

use foundation::region::Region;
use formats::ingest::FeatureSet;
use parking_lot::Mutex;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::diff;
use crate::fetch::{FetchError, ViewportFetcher, ViewportQuery};

/// Delay between a region change and the fetch it triggers.
pub const DEFAULT_VIEWPORT_DEBOUNCE: Duration = Duration::from_millis(450);

/// How a region request is scheduled.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestMode {
    /// Wait out the debounce window; a repeat of the last accepted rounded
    /// region is a no-op.
    Debounced,
    /// Skip the debounce and the same-region de-duplication.
    Immediate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    pub debounce: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_VIEWPORT_DEBOUNCE,
        }
    }
}

/// Everything a consumer needs to render the current viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewportState {
    pub loading: bool,
    /// User-facing wording from the most recent failure, cleared by the next
    /// success.
    pub error: Option<String>,
    /// Features from the last committed fetch. Kept across failures so the
    /// map never blanks out under a flaky connection.
    pub features: FeatureSet,
    pub last_requested_region: Option<Region>,
}

/// Owns the fetch pipeline for one map screen.
///
/// Not `Clone`: exactly one owner drives requests, everyone else observes
/// through [`ViewportSession::subscribe`]. Dropping the session aborts all
/// pending work.
pub struct ViewportSession {
    shared: Arc<Shared>,
}

struct Shared {
    fetcher: Arc<dyn ViewportFetcher>,
    options: SessionOptions,
    state: watch::Sender<ViewportState>,
    tasks: Mutex<Tasks>,
}

/// Single-slot bookkeeping: one debounce, one fetch, monotonic counters.
#[derive(Default)]
struct Tasks {
    last_key: Option<String>,
    debounce: Option<JoinHandle<()>>,
    /// Stamp for the pending timer. `abort` cannot stop a timer that is
    /// already past its sleep, so the timer tail re-checks this under the
    /// lock and fires nothing when superseded.
    debounce_seq: u64,
    in_flight: Option<JoinHandle<()>>,
    generation: u64,
    disposed: bool,
}

impl ViewportSession {
    pub fn new(fetcher: Arc<dyn ViewportFetcher>, options: SessionOptions) -> Self {
        let (state, _) = watch::channel(ViewportState::default());
        Self {
            shared: Arc::new(Shared {
                fetcher,
                options,
                state,
                tasks: Mutex::new(Tasks::default()),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewportState> {
        self.shared.state.subscribe()
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ViewportState {
        self.shared.state.borrow().clone()
    }

    /// Ask for the features within `region`.
    ///
    /// Debounced repeats of the last accepted rounded region do nothing. A
    /// changed region replaces any pending timer; `Immediate` skips the
    /// timer and fires now. Must run inside a tokio runtime.
    pub fn request(&self, region: Region, mode: RequestMode) {
        let key = diff::region_key(&region);
        let mut tasks = self.shared.tasks.lock();
        if tasks.disposed {
            return;
        }
        if mode == RequestMode::Debounced && tasks.last_key.as_deref() == Some(key.as_str()) {
            debug!(%key, "viewport request skipped, region unchanged");
            return;
        }
        tasks.last_key = Some(key);

        tasks.debounce_seq += 1;
        if let Some(pending) = tasks.debounce.take() {
            pending.abort();
        }

        self.shared
            .state
            .send_modify(|state| state.last_requested_region = Some(region));

        match mode {
            RequestMode::Immediate => {
                Shared::start_fetch(&self.shared, &mut tasks, region);
            }
            RequestMode::Debounced => {
                let shared = Arc::clone(&self.shared);
                let delay = self.shared.options.debounce;
                let scheduled = tasks.debounce_seq;
                tasks.debounce = Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    Shared::fire_debounce(&shared, scheduled, region);
                }));
            }
        }
    }

    /// Abort the pending timer and any in-flight fetch. Idempotent; further
    /// requests are ignored. Also runs on drop.
    pub fn dispose(&self) {
        let mut tasks = self.shared.tasks.lock();
        tasks.disposed = true;
        if let Some(pending) = tasks.debounce.take() {
            pending.abort();
        }
        if let Some(running) = tasks.in_flight.take() {
            running.abort();
        }
    }
}

impl Drop for ViewportSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    /// Debounce timer tail. A timer that was past its sleep when it was
    /// replaced still runs this; the stamp check keeps it from fetching a
    /// stale region.
    fn fire_debounce(shared: &Arc<Shared>, scheduled: u64, region: Region) {
        let mut tasks = shared.tasks.lock();
        if tasks.disposed || tasks.debounce_seq != scheduled {
            return;
        }
        Shared::start_fetch(shared, &mut tasks, region);
    }

    /// Abort the previous fetch and start one for `region`. The generation
    /// counter keeps an aborted fetch's response from committing if it was
    /// already past its await when aborted.
    fn start_fetch(shared: &Arc<Shared>, tasks: &mut Tasks, region: Region) {
        if tasks.disposed {
            return;
        }
        if let Some(previous) = tasks.in_flight.take() {
            previous.abort();
        }
        tasks.generation += 1;
        let generation = tasks.generation;

        shared.state.send_modify(|state| state.loading = true);

        let task_shared = Arc::clone(shared);
        tasks.in_flight = Some(tokio::spawn(async move {
            let query = ViewportQuery::from_region(&region);
            let result = task_shared.fetcher.fetch_viewport(query).await;
            task_shared.commit(generation, result);
        }));
    }

    fn commit(&self, generation: u64, result: Result<Value, FetchError>) {
        {
            let tasks = self.tasks.lock();
            if tasks.disposed || tasks.generation != generation {
                return;
            }
        }

        match result {
            Ok(payload) => {
                let features = formats::decode_viewport_payload(&payload);
                self.state.send_if_modified(|state| {
                    let mut changed = false;
                    if state.loading {
                        state.loading = false;
                        changed = true;
                    }
                    if state.error.is_some() {
                        state.error = None;
                        changed = true;
                    }
                    if diff::features_changed(&state.features, &features) {
                        state.features = features;
                        changed = true;
                    }
                    changed
                });
            }
            Err(err) => {
                debug!("viewport fetch failed: {err}");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(err.user_message());
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BoxFuture;
    use foundation::coord::LatLng;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::VecDeque;

    /// Records queries, optionally sleeps, then answers. With no scripted
    /// response it returns one property centered on the queried bounds, so
    /// different regions naturally produce different feature sets.
    struct ScriptedFetcher {
        delay: Duration,
        calls: Mutex<Vec<ViewportQuery>>,
        responses: Mutex<VecDeque<Result<Value, FetchError>>>,
    }

    impl ScriptedFetcher {
        fn new(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                delay,
                calls: Mutex::new(Vec::new()),
                responses: Mutex::new(VecDeque::new()),
            })
        }

        fn push_response(&self, response: Result<Value, FetchError>) {
            self.responses.lock().push_back(response);
        }

        fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn last_query(&self) -> Option<ViewportQuery> {
            self.calls.lock().last().copied()
        }
    }

    impl ViewportFetcher for ScriptedFetcher {
        fn fetch_viewport(&self, query: ViewportQuery) -> BoxFuture<'_, Result<Value, FetchError>> {
            Box::pin(async move {
                self.calls.lock().push(query);
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                if let Some(scripted) = self.responses.lock().pop_front() {
                    return scripted;
                }
                let lat = (query.bounds.min_lat_deg + query.bounds.max_lat_deg) / 2.0;
                let lon = (query.bounds.min_lon_deg + query.bounds.max_lon_deg) / 2.0;
                Ok(json!({
                    "properties": [{
                        "id": format!("center-{lat:.4}-{lon:.4}"),
                        "centerGeoJson": { "type": "Point", "coordinates": [lon, lat] },
                    }]
                }))
            })
        }
    }

    fn region(lat: f64, lon: f64) -> Region {
        Region::new(LatLng::new(lat, lon), 0.02, 0.02)
    }

    fn session_with(fetcher: &Arc<ScriptedFetcher>) -> ViewportSession {
        ViewportSession::new(fetcher.clone(), SessionOptions::default())
    }

    #[tokio::test(start_paused = true)]
    async fn same_rounded_region_fetches_once() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.4, 78.5), RequestMode::Debounced);
        session.request(region(17.4, 78.5), RequestMode::Debounced);
        // Differs past the 4th decimal, so it rounds to the same key.
        session.request(region(17.400004, 78.5), RequestMode::Debounced);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn changed_region_replaces_pending_debounce() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.4, 78.5), RequestMode::Debounced);
        tokio::time::sleep(Duration::from_millis(200)).await;
        session.request(region(18.0, 79.0), RequestMode::Debounced);
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(fetcher.call_count(), 1);
        let query = fetcher.last_query().unwrap();
        assert!((query.bounds.min_lat_deg - 17.99).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn replaced_timer_past_its_sleep_fetches_nothing() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.4, 78.5), RequestMode::Debounced);
        let stale = session.shared.tasks.lock().debounce_seq;
        session.request(region(18.0, 79.0), RequestMode::Debounced);

        // On a threaded runtime the first timer can be past its sleep when
        // it is replaced, making the abort a no-op; its tail still runs.
        Shared::fire_debounce(&session.shared, stale, region(17.4, 78.5));
        assert_eq!(fetcher.call_count(), 0);
        assert!(!session.state().loading);

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fetcher.call_count(), 1);
        let query = fetcher.last_query().unwrap();
        assert!((query.bounds.min_lat_deg - 17.99).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_request_invalidates_a_woken_timer() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.4, 78.5), RequestMode::Debounced);
        let stale = session.shared.tasks.lock().debounce_seq;
        session.request(region(18.0, 79.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(fetcher.call_count(), 1);

        // A late tail from the replaced timer must not refetch the old
        // region over the immediate result.
        Shared::fire_debounce(&session.shared, stale, region(17.4, 78.5));
        tokio::time::sleep(Duration::from_millis(600)).await;

        assert_eq!(fetcher.call_count(), 1);
        let state = session.state();
        assert_eq!(state.features.properties[0].id, "center-18.0000-79.0000");
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_mode_skips_the_debounce() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.4, 78.5), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(fetcher.call_count(), 1);
        let state = session.state();
        assert!(!state.loading);
        assert_eq!(state.features.properties.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_mode_refetches_an_unchanged_region() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.4, 78.5), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;
        session.request(region(17.4, 78.5), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(fetcher.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_fetch_supersedes_older() {
        let fetcher = ScriptedFetcher::new(Duration::from_millis(100));
        let session = session_with(&fetcher);

        session.request(region(17.0, 78.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(10)).await;
        session.request(region(18.0, 79.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(fetcher.call_count(), 2);
        let state = session.state();
        assert_eq!(state.features.properties.len(), 1);
        assert_eq!(state.features.properties[0].id, "center-18.0000-79.0000");
        assert!(!state.loading);
        assert_eq!(state.error, None);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_keeps_previous_features_and_sets_error() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.0, 78.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(session.state().features.properties.len(), 1);

        fetcher.push_response(Err(FetchError::Status {
            code: 500,
            message: Some("backend down".to_string()),
        }));
        session.request(region(18.0, 79.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = session.state();
        assert!(!state.loading);
        assert_eq!(state.error.as_deref(), Some("backend down"));
        assert_eq!(state.features.properties[0].id, "center-17.0000-78.0000");
    }

    #[tokio::test(start_paused = true)]
    async fn success_clears_a_previous_error() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        fetcher.push_response(Err(FetchError::Timeout));
        session.request(region(17.0, 78.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(session.state().error.as_deref(), Some("Request timed out"));

        session.request(region(18.0, 79.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = session.state();
        assert_eq!(state.error, None);
        assert_eq!(state.features.properties[0].id, "center-18.0000-79.0000");
    }

    #[tokio::test(start_paused = true)]
    async fn identical_payload_leaves_features_untouched() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.0, 78.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;
        let baseline = session.state().features.clone();

        session.request(region(17.0, 78.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(1)).await;

        let state = session.state();
        assert_eq!(state.features, baseline);
        assert_eq!(state.error, None);
        assert!(!state.loading);
    }

    #[tokio::test(start_paused = true)]
    async fn loading_tracks_the_fetch_lifecycle() {
        let fetcher = ScriptedFetcher::new(Duration::from_millis(50));
        let session = session_with(&fetcher);

        session.request(region(17.0, 78.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(session.state().loading);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!session.state().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn request_records_the_region_before_the_fetch_fires() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        let requested = region(17.4, 78.5);
        session.request(requested, RequestMode::Debounced);

        assert_eq!(session.state().last_requested_region, Some(requested));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_cancels_a_pending_debounce() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        let session = session_with(&fetcher);

        session.request(region(17.0, 78.0), RequestMode::Debounced);
        session.dispose();
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fetcher.call_count(), 0);

        session.request(region(18.0, 79.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_freezes_state_mid_fetch() {
        let fetcher = ScriptedFetcher::new(Duration::from_millis(100));
        let session = session_with(&fetcher);

        session.request(region(17.0, 78.0), RequestMode::Immediate);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(fetcher.call_count(), 1);

        session.dispose();
        let frozen = session.state();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(session.state(), frozen);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_aborts_pending_work() {
        let fetcher = ScriptedFetcher::new(Duration::ZERO);
        {
            let session = session_with(&fetcher);
            session.request(region(17.0, 78.0), RequestMode::Debounced);
        }
        tokio::time::sleep(Duration::from_millis(600)).await;
        assert_eq!(fetcher.call_count(), 0);
    }
}

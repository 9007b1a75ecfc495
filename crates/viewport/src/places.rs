//! Debounced place autocomplete behind a provider seam.
//!
//! The vendor's HTTP surface stays outside this crate; the session only
//! sees [`PlaceProvider`]. Scheduling discipline mirrors the viewport
//! session: one pending timer, one authoritative search, superseded results
//! commit nothing.

use std::sync::Arc;

use foundation::bounds::LatLngBounds;
use foundation::coord::LatLng;
use foundation::region::Region;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::{ConfigError, PlacesConfig};
use crate::fetch::{BoxFuture, FetchError};

/// One ranked autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    pub place_id: String,
    pub description: String,
    #[serde(default)]
    pub structured_formatting: Option<StructuredFormatting>,
}

/// Primary/secondary split of a suggestion, for two-line list rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredFormatting {
    pub main_text: String,
    #[serde(default)]
    pub secondary_text: Option<String>,
}

pub trait PlaceProvider: Send + Sync {
    /// Ranked suggestions for a free-text query biased to `rect`.
    fn text_search(
        &self,
        query: &str,
        rect: LatLngBounds,
    ) -> BoxFuture<'_, Result<Vec<PlaceSuggestion>, FetchError>>;

    /// Resolve a chosen suggestion to its coordinate.
    fn place_details(&self, place_id: &str) -> BoxFuture<'_, Result<LatLng, FetchError>>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceSearchState {
    pub loading: bool,
    pub error: Option<String>,
    pub suggestions: Vec<PlaceSuggestion>,
}

/// Keystroke-driven search session.
pub struct PlaceSearchSession {
    shared: Arc<PlaceShared>,
}

struct PlaceShared {
    provider: Arc<dyn PlaceProvider>,
    config: PlacesConfig,
    state: watch::Sender<PlaceSearchState>,
    tasks: Mutex<PlaceTasks>,
}

#[derive(Default)]
struct PlaceTasks {
    debounce: Option<JoinHandle<()>>,
    /// Stamp for the pending timer. `abort` cannot stop a timer already past
    /// its sleep, so the timer tail re-checks this under the lock and
    /// searches nothing when superseded.
    debounce_seq: u64,
    in_flight: Option<JoinHandle<()>>,
    generation: u64,
    disposed: bool,
}

impl PlaceSearchSession {
    /// Fails when the API key is missing, so the screen can disable search
    /// instead of erroring on every keystroke.
    pub fn new(provider: Arc<dyn PlaceProvider>, config: PlacesConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let (state, _) = watch::channel(PlaceSearchState::default());
        Ok(Self {
            shared: Arc::new(PlaceShared {
                provider,
                config,
                state,
                tasks: Mutex::new(PlaceTasks::default()),
            }),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaceSearchState> {
        self.shared.state.subscribe()
    }

    pub fn state(&self) -> PlaceSearchState {
        self.shared.state.borrow().clone()
    }

    /// Update the query text.
    ///
    /// Trimmed input shorter than the configured minimum cancels pending
    /// work and clears the suggestions without searching. Otherwise the
    /// pending timer is replaced and a search fires after the configured
    /// debounce. Must run inside a tokio runtime.
    pub fn set_query(&self, text: &str) {
        let trimmed = text.trim().to_string();
        let mut tasks = self.shared.tasks.lock();
        if tasks.disposed {
            return;
        }

        tasks.debounce_seq += 1;
        if let Some(pending) = tasks.debounce.take() {
            pending.abort();
        }

        if trimmed.chars().count() < self.shared.config.min_query_len {
            if let Some(running) = tasks.in_flight.take() {
                running.abort();
            }
            // Bumping the generation strands any search past its await.
            tasks.generation += 1;
            drop(tasks);
            self.shared.state.send_if_modified(|state| {
                let had_output =
                    state.loading || state.error.is_some() || !state.suggestions.is_empty();
                state.loading = false;
                state.error = None;
                state.suggestions.clear();
                had_output
            });
            return;
        }

        let shared = Arc::clone(&self.shared);
        let delay = self.shared.config.debounce;
        let scheduled = tasks.debounce_seq;
        tasks.debounce = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            PlaceShared::fire_debounce(&shared, scheduled, trimmed);
        }));
    }

    /// Resolve a picked suggestion to its coordinate.
    pub fn resolve(&self, place_id: &str) -> BoxFuture<'_, Result<LatLng, FetchError>> {
        self.shared.provider.place_details(place_id)
    }

    /// Abort pending work; further queries are ignored. Also runs on drop.
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

impl Drop for PlaceSearchSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl PlaceShared {
    /// Debounce timer tail. A timer that was past its sleep when it was
    /// replaced or cleared still runs this; the stamp check keeps it from
    /// searching the stale text.
    fn fire_debounce(shared: &Arc<PlaceShared>, scheduled: u64, query: String) {
        let mut tasks = shared.tasks.lock();
        if tasks.disposed || tasks.debounce_seq != scheduled {
            return;
        }
        PlaceShared::start_search(shared, &mut tasks, query);
    }

    fn start_search(shared: &Arc<PlaceShared>, tasks: &mut PlaceTasks, query: String) {
        if let Some(previous) = tasks.in_flight.take() {
            previous.abort();
        }
        tasks.generation += 1;
        let generation = tasks.generation;

        shared.state.send_modify(|state| state.loading = true);

        let task_shared = Arc::clone(shared);
        tasks.in_flight = Some(tokio::spawn(async move {
            let result = task_shared
                .provider
                .text_search(&query, task_shared.config.search_rect)
                .await;
            task_shared.commit(generation, result);
        }));
    }

    fn commit(&self, generation: u64, result: Result<Vec<PlaceSuggestion>, FetchError>) {
        {
            let tasks = self.tasks.lock();
            if tasks.disposed || tasks.generation != generation {
                return;
            }
        }

        match result {
            Ok(suggestions) => {
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = None;
                    state.suggestions = suggestions;
                });
            }
            Err(err) => {
                debug!("place search failed: {err}");
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(err.user_message());
                });
            }
        }
    }
}

/// Region centered on a resolved place, sized for `zoom` at the given
/// viewport aspect ratio.
pub fn region_for_place(center: LatLng, zoom: f64, aspect_ratio: f64) -> Region {
    Region::for_zoom(center, zoom, aspect_ratio)
}

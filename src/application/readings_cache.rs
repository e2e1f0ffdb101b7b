// Readings cache - Fetch-on-select, evict-on-deselect, one fetch in flight per sensor
use crate::application::ports::{FetchError, SensorReadings, SensorReadingsSource};
use crate::domain::readings::{LookbackWindow, SensorSeriesPoint};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

type BatchResult = Result<Arc<SensorReadings>, FetchError>;
type BatchFetch = Shared<BoxFuture<'static, BatchResult>>;

/// A fetch registered for one identifier. Several identifiers may share the
/// same underlying request after a window change.
struct InFlight {
    ticket: u64,
    window: LookbackWindow,
    fetch: BatchFetch,
}

#[derive(Default)]
struct CacheState {
    window: LookbackWindow,
    /// Currently selected identifiers in selection order.
    order: Vec<String>,
    selected: HashSet<String>,
    entries: HashMap<String, Vec<SensorSeriesPoint>>,
    in_flight: HashMap<String, InFlight>,
    failures: HashMap<String, FetchError>,
    next_ticket: u64,
}

impl CacheState {
    fn mark_selected(&mut self, id: &str) {
        if !self.order.iter().any(|known| known == id) {
            self.order.push(id.to_string());
        }
        self.selected.insert(id.to_string());
    }

    fn selected_ids(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|id| self.selected.contains(*id))
            .cloned()
            .collect()
    }

    fn register(&mut self, id: &str, window: LookbackWindow, fetch: BatchFetch) -> u64 {
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.in_flight.insert(
            id.to_string(),
            InFlight {
                ticket,
                window,
                fetch,
            },
        );
        ticket
    }
}

/// Consistent view of the selection and its cached series, taken under one lock.
#[derive(Debug, Clone, Default)]
pub struct CacheSnapshot {
    pub window: LookbackWindow,
    /// Selected identifiers in selection order, including pending and failed ones.
    pub selected: Vec<String>,
    pub entries: HashMap<String, Vec<SensorSeriesPoint>>,
}

impl CacheSnapshot {
    pub fn any_selected(&self) -> bool {
        !self.selected.is_empty()
    }
}

pub struct ReadingsCache {
    source: Arc<dyn SensorReadingsSource>,
    state: Mutex<CacheState>,
}

impl ReadingsCache {
    pub fn new(source: Arc<dyn SensorReadingsSource>, window: LookbackWindow) -> Self {
        Self {
            source,
            state: Mutex::new(CacheState {
                window,
                ..CacheState::default()
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue(&self, identifiers: Vec<String>, window: LookbackWindow) -> BatchFetch {
        let source = self.source.clone();
        async move {
            tracing::debug!(
                "Fetching readings for {:?} over {} days",
                identifiers,
                window.days()
            );
            source
                .fetch_sensor_readings(&identifiers, window.days())
                .await
                .map(Arc::new)
        }
        .boxed()
        .shared()
    }

    /// Select a sensor and wait until its series is available.
    ///
    /// Resolves immediately when the series is already cached. A select that
    /// arrives while a fetch for the same sensor and window is in flight
    /// attaches to it instead of issuing another request.
    pub async fn select(&self, id: &str) -> Result<(), FetchError> {
        let (ticket, fetch) = {
            let mut state = self.state();
            state.mark_selected(id);
            if state.entries.contains_key(id) {
                return Ok(());
            }

            let window = state.window;
            let attached = state
                .in_flight
                .get(id)
                .filter(|pending| pending.window == window)
                .map(|pending| (pending.ticket, pending.fetch.clone()));
            match attached {
                Some(attached) => {
                    tracing::debug!("Attaching to in-flight fetch for {}", id);
                    attached
                }
                None => {
                    let fetch = self.issue(vec![id.to_string()], window);
                    let ticket = state.register(id, window, fetch.clone());
                    (ticket, fetch)
                }
            }
        };

        let result = fetch.await;
        self.settle(id, ticket, result)
    }

    /// Deselect a sensor and drop its series. A response still in flight for
    /// it is discarded on arrival.
    pub fn deselect(&self, id: &str) {
        let mut state = self.state();
        state.selected.remove(id);
        state.order.retain(|known| known != id);
        state.entries.remove(id);
        state.failures.remove(id);
        if state.in_flight.remove(id).is_some() {
            tracing::debug!("Deselected {} with a fetch in flight", id);
        }
    }

    /// Switch every selected series to a new lookback window.
    ///
    /// Cached series are discarded before any new data arrives, so old- and
    /// new-window data are never mixed. All selected sensors are fetched in
    /// one request.
    pub async fn change_window(&self, window: LookbackWindow) -> Result<(), FetchError> {
        let (fetch, tickets) = {
            let mut state = self.state();
            if state.window == window {
                return Ok(());
            }
            tracing::debug!(
                "Lookback window {} -> {} days",
                state.window.days(),
                window.days()
            );
            state.window = window;
            state.entries.clear();
            state.failures.clear();
            state.in_flight.clear();

            let ids = state.selected_ids();
            if ids.is_empty() {
                return Ok(());
            }
            let fetch = self.issue(ids.clone(), window);
            let tickets: Vec<(String, u64)> = ids
                .into_iter()
                .map(|id| {
                    let ticket = state.register(&id, window, fetch.clone());
                    (id, ticket)
                })
                .collect();
            (fetch, tickets)
        };

        let result = fetch.await;
        let mut outcome = Ok(());
        for (id, ticket) in tickets {
            if let Err(err) = self.settle(&id, ticket, result.clone()) {
                if outcome.is_ok() {
                    outcome = Err(err);
                }
            }
        }
        outcome
    }

    /// Apply a completed fetch if it is still the one registered for `id`.
    fn settle(&self, id: &str, ticket: u64, result: BatchResult) -> Result<(), FetchError> {
        let mut state = self.state();
        let current = state
            .in_flight
            .get(id)
            .is_some_and(|pending| pending.ticket == ticket);

        if current {
            state.in_flight.remove(id);
            match &result {
                Ok(readings) => {
                    let points = readings.get(id).cloned().unwrap_or_default();
                    tracing::debug!("Cached {} points for {}", points.len(), id);
                    state.failures.remove(id);
                    state.entries.insert(id.to_string(), points);
                }
                Err(err) => {
                    tracing::warn!("Fetching readings for {} failed: {}", id, err);
                    state.failures.insert(id.to_string(), err.clone());
                }
            }
        } else if !state.entries.contains_key(id) {
            tracing::debug!("Discarding stale response for {}", id);
        }

        result.map(|_| ())
    }

    /// Cached series for `id`; absent when not selected, pending or failed.
    pub fn get(&self, id: &str) -> Option<Vec<SensorSeriesPoint>> {
        self.state().entries.get(id).cloned()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.state().selected.contains(id)
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.state().in_flight.contains_key(id)
    }

    /// Last fetch error for a selected sensor, cleared by a successful fetch.
    pub fn failure(&self, id: &str) -> Option<FetchError> {
        self.state().failures.get(id).cloned()
    }

    pub fn window(&self) -> LookbackWindow {
        self.state().window
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        let state = self.state();
        let selected = state.selected_ids();
        let entries = selected
            .iter()
            .filter_map(|id| state.entries.get(id).map(|points| (id.clone(), points.clone())))
            .collect();
        CacheSnapshot {
            window: state.window,
            selected,
            entries,
        }
    }
}

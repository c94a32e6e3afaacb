//! Debounced, generation-ordered fetching for the news list surface.
//!
//! Every issued request takes the next generation number. A response only reaches the
//! visible [`ListView`] when its generation is still the latest one issued; anything
//! older is dropped without touching state, whatever order responses arrive in.
//! Failures clear the list entirely (see [`ListView::reset_with_error`]).

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};

use shared::{
    domain::{Article, ListResult, QueryState},
    error::FetchError,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    debounce::Debouncer,
    events::{EventSender, ViewEvent},
    transport::NewsApi,
    ui_error::{UiError, UiErrorContext},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ListView {
    pub articles: Vec<Article>,
    pub total_pages: u32,
    pub total_count: u64,
    pub loading: bool,
    pub error: Option<UiError>,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            total_pages: 1,
            total_count: 0,
            loading: false,
            error: None,
        }
    }
}

impl ListView {
    fn replace(&mut self, result: ListResult) {
        self.articles = result.articles;
        self.total_pages = result.total_pages;
        self.total_count = result.total_count;
        self.error = None;
    }

    fn reset_with_error(&mut self, error: UiError) {
        self.articles.clear();
        self.total_pages = 1;
        self.total_count = 0;
        self.error = Some(error);
    }
}

struct OrchestratorState {
    view: ListView,
    latest_generation: u64,
    torn_down: bool,
}

pub struct FetchOrchestrator {
    api: Arc<dyn NewsApi>,
    state: Mutex<OrchestratorState>,
    debouncer: Mutex<Debouncer>,
    events: EventSender,
}

impl FetchOrchestrator {
    pub fn new(api: Arc<dyn NewsApi>, debounce_window: Duration, events: EventSender) -> Arc<Self> {
        Arc::new(Self {
            api,
            state: Mutex::new(OrchestratorState {
                view: ListView::default(),
                latest_generation: 0,
                torn_down: false,
            }),
            debouncer: Mutex::new(Debouncer::new(debounce_window)),
            events,
        })
    }

    pub fn view(&self) -> ListView {
        self.state().view.clone()
    }

    pub fn latest_generation(&self) -> u64 {
        self.state().latest_generation
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    /// Single undebounced request, no effect on the visible view.
    pub async fn request_list(&self, query: &QueryState) -> Result<ListResult, FetchError> {
        self.api.fetch_news_list(query).await
    }

    /// Issues a request for `query` once the debounce window passes without another call.
    pub fn schedule(self: &Arc<Self>, query: QueryState) {
        if self.state().torn_down {
            return;
        }
        let this = Arc::downgrade(self);
        let mut debouncer = self.debouncer();
        let window = debouncer.window();
        let superseded = debouncer.schedule(move || {
            if let Some(this) = Weak::upgrade(&this) {
                this.issue(query);
            }
        });
        debug!(
            window_ms = window.as_millis() as u64,
            superseded, "scheduled debounced news list fetch"
        );
    }

    /// Skips the debounce window; still subject to the generation guard.
    pub fn fetch_now(self: &Arc<Self>, query: QueryState) -> Option<u64> {
        self.debouncer().cancel();
        Arc::clone(self).issue(query)
    }

    /// Cancels any pending timer; in-flight responses are discarded when they arrive.
    pub fn teardown(&self) {
        let canceled = self.debouncer().cancel();
        let mut state = self.state();
        state.torn_down = true;
        state.view.loading = false;
        debug!(canceled, "news list orchestrator torn down");
    }

    fn issue(self: Arc<Self>, query: QueryState) -> Option<u64> {
        let generation = {
            let mut state = self.state();
            if state.torn_down {
                return None;
            }
            state.latest_generation += 1;
            state.view.loading = true;
            state.view.error = None;
            state.latest_generation
        };
        debug!(generation, page = query.page, page_size = query.page_size.get(), search = %query.search_query, "issuing news list request");
        let _ = self.events.send(ViewEvent::ListRequested {
            generation,
            query: query.clone(),
        });

        tokio::spawn(async move {
            let outcome = self.request_list(&query).await;
            self.apply(generation, outcome);
        });
        Some(generation)
    }

    fn apply(&self, generation: u64, outcome: Result<ListResult, FetchError>) {
        let mut state = self.state();
        if state.torn_down {
            debug!(generation, "dropping news list response after teardown");
            return;
        }
        if generation != state.latest_generation {
            debug!(
                generation,
                latest = state.latest_generation,
                "discarding stale news list response"
            );
            let _ = self.events.send(ViewEvent::StaleListResponse { generation });
            return;
        }

        state.view.loading = false;
        match outcome {
            Ok(result) => {
                let total_count = result.total_count;
                info!(
                    generation,
                    articles = result.articles.len(),
                    total_pages = result.total_pages,
                    total_count,
                    "news list updated"
                );
                state.view.replace(result);
                let _ = self.events.send(ViewEvent::ListUpdated {
                    generation,
                    total_count,
                });
            }
            Err(err) => {
                let error = UiError::classify(UiErrorContext::NewsList, &err);
                warn!(generation, error = %err, message = error.message(), "news list request failed");
                let message = error.message().to_string();
                state.view.reset_with_error(error);
                let _ = self.events.send(ViewEvent::ListFailed {
                    generation,
                    message,
                });
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, OrchestratorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn debouncer(&self) -> MutexGuard<'_, Debouncer> {
        self.debouncer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/orchestrator_tests.rs"]
mod tests;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::domain::{Article, ArticleHandoff, PageSize, QueryState};
use tracing::{debug, warn};

use crate::{
    events::{EventSender, ViewEvent},
    location::LocationStore,
    orchestrator::FetchOrchestrator,
};

/// Owns the list surface's page, page size and search term.
///
/// The location is read once in [`QueryStateController::initialize`]; after that the
/// controller only writes it. Each change schedules a debounced fetch.
pub struct QueryStateController {
    state: Mutex<QueryState>,
    location: Arc<dyn LocationStore>,
    orchestrator: Arc<FetchOrchestrator>,
    events: EventSender,
}

impl QueryStateController {
    pub fn initialize(
        location: Arc<dyn LocationStore>,
        orchestrator: Arc<FetchOrchestrator>,
        events: EventSender,
    ) -> Self {
        let raw = location.query();
        let state = QueryState::from_query_string(&raw);
        if !state.page_size.is_standard() {
            warn!(
                page_size = state.page_size.get(),
                "location carries a page size outside the selector options; keeping it"
            );
        }
        debug!(location = %raw, page = state.page, page_size = state.page_size.get(), search = %state.search_query, "query state initialized");

        let controller = Self {
            state: Mutex::new(state.clone()),
            location,
            orchestrator,
            events,
        };
        controller.sync(&state);
        controller
    }

    pub fn state(&self) -> QueryState {
        self.current().clone()
    }

    pub fn orchestrator(&self) -> &Arc<FetchOrchestrator> {
        &self.orchestrator
    }

    pub fn set_search(&self, search_query: impl Into<String>) {
        let search_query = search_query.into();
        self.update(|state| state.with_search(search_query));
    }

    pub fn set_page(&self, page: u32) {
        self.update(|state| state.with_page(page));
    }

    pub fn set_page_size(&self, page_size: PageSize) {
        self.update(|state| state.with_page_size(page_size));
    }

    /// Hands the article and the current query state to the detail surface.
    pub fn select(&self, article: Article) -> ArticleHandoff {
        ArticleHandoff {
            article,
            origin: self.state(),
        }
    }

    pub fn teardown(&self) {
        self.orchestrator.teardown();
    }

    fn update(&self, next: impl FnOnce(&QueryState) -> QueryState) {
        let updated = {
            let mut state = self.current();
            let updated = next(&state);
            if updated == *state {
                return;
            }
            *state = updated.clone();
            updated
        };
        self.sync(&updated);
    }

    fn sync(&self, state: &QueryState) {
        let query = state.to_query_string();
        self.location.replace_query(&query);
        let _ = self.events.send(ViewEvent::LocationChanged(query));
        self.orchestrator.schedule(state.clone());
    }

    fn current(&self) -> MutexGuard<'_, QueryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;

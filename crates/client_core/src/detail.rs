//! On-demand summarization for the article detail surface.
//!
//! Failures stay on the surface as an inline error; the article content and any controls
//! remain usable.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{
    domain::{Article, ArticleHandoff, SummaryResult},
    error::FetchError,
};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    events::{EventSender, ViewEvent},
    in_flight::InFlight,
    transport::NewsApi,
    ui_error::{UiError, UiErrorContext},
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailView {
    pub summary: Option<SummaryResult>,
    pub summary_open: bool,
    pub loading: bool,
    pub error: Option<UiError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SummarizeOutcome {
    Completed(SummaryResult),
    Failed(FetchError),
    /// A summarization was already in flight; nothing was sent.
    AlreadyInFlight,
    /// The surface was torn down before the response arrived.
    Discarded,
}

struct DetailState {
    view: DetailView,
    torn_down: bool,
}

pub struct DetailViewGateway {
    api: Arc<dyn NewsApi>,
    state: Mutex<DetailState>,
    events: EventSender,
}

impl DetailViewGateway {
    pub fn new(api: Arc<dyn NewsApi>, events: EventSender) -> Self {
        Self {
            api,
            state: Mutex::new(DetailState {
                view: DetailView::default(),
                torn_down: false,
            }),
            events,
        }
    }

    pub fn view(&self) -> DetailView {
        self.state().view.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub async fn summarize(&self, article: &Article) -> SummarizeOutcome {
        let url = {
            let mut state = self.state();
            if state.torn_down {
                return SummarizeOutcome::Discarded;
            }
            if state.view.loading {
                debug!("summarize ignored: request already in flight");
                return SummarizeOutcome::AlreadyInFlight;
            }
            let Some(url) = article.resolve_url().map(str::to_owned) else {
                let err = FetchError::MissingResource("URL".to_string());
                self.surface_error(&mut state.view, &err);
                return SummarizeOutcome::Failed(err);
            };
            state.view.loading = true;
            state.view.error = None;
            state.view.summary = None;
            state.view.summary_open = false;
            url
        };
        let _ = self.events.send(ViewEvent::SummaryLoading);

        let in_flight = InFlight::new(&self.state, |state: &mut DetailState| {
            debug!("summarize canceled before its response arrived");
            state.view.loading = false;
        });
        let outcome = self.api.summarize(&url).await;
        in_flight.disarm();

        let mut state = self.state();
        if state.torn_down {
            debug!(%url, "dropping summary response after teardown");
            return SummarizeOutcome::Discarded;
        }
        state.view.loading = false;
        match outcome {
            Ok(summary) => {
                info!(%url, chars = summary.text.len(), "summary ready");
                state.view.summary = Some(summary.clone());
                state.view.summary_open = true;
                let _ = self.events.send(ViewEvent::SummaryReady);
                SummarizeOutcome::Completed(summary)
            }
            Err(err) => {
                self.surface_error(&mut state.view, &err);
                SummarizeOutcome::Failed(err)
            }
        }
    }

    /// Closes the summary surface and drops its text.
    pub fn dismiss(&self) {
        let mut state = self.state();
        if state.torn_down {
            return;
        }
        state.view.summary_open = false;
        state.view.summary = None;
        let _ = self.events.send(ViewEvent::SummaryDismissed);
    }

    /// URL for the "read full article" action.
    pub fn visit_target(&self, article: &Article) -> Option<String> {
        let url = article.resolve_url().map(str::to_owned);
        if url.is_none() {
            let mut state = self.state();
            if !state.torn_down {
                let err = FetchError::MissingResource("URL".to_string());
                self.surface_error(&mut state.view, &err);
            }
        }
        url
    }

    /// Location to return to: the list view exactly as it was when the article was opened.
    pub fn back_location(&self, handoff: &ArticleHandoff) -> String {
        handoff.back_location()
    }

    pub fn teardown(&self) {
        let mut state = self.state();
        state.torn_down = true;
        state.view.loading = false;
    }

    fn surface_error(&self, view: &mut DetailView, err: &FetchError) {
        let error = UiError::classify(UiErrorContext::Summary, err);
        warn!(error = %err, message = error.message(), "summarize failed");
        let _ = self
            .events
            .send(ViewEvent::SummaryFailed(error.message().to_string()));
        view.error = Some(error);
    }

    fn state(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/detail_tests.rs"]
mod tests;

//! Market indices panel: fetched on mount and on manual refresh only.
//!
//! A failed poll keeps whatever indices were already shown and only updates the error
//! banner.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{domain::MarketIndex, error::FetchError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    events::{EventSender, ViewEvent},
    in_flight::InFlight,
    transport::NewsApi,
    ui_error::{UiError, UiErrorContext},
};

const INVALID_PAYLOAD: &str = "Invalid or empty data received";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PanelView {
    pub indices: Vec<MarketIndex>,
    /// Initial (non-manual) fetch in flight.
    pub loading: bool,
    /// Manual refresh in flight.
    pub refreshing: bool,
    pub error: Option<UiError>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelPresentation {
    Skeleton,
    Content { dimmed: bool },
}

impl PanelView {
    pub fn presentation(&self) -> PanelPresentation {
        if self.loading && self.indices.is_empty() {
            PanelPresentation::Skeleton
        } else {
            PanelPresentation::Content {
                dimmed: self.loading || self.refreshing,
            }
        }
    }

    pub fn refresh_enabled(&self) -> bool {
        !self.loading && !self.refreshing
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Updated(usize),
    Failed(FetchError),
    /// Another fetch was in flight; nothing was sent.
    Skipped,
    Discarded,
}

struct PanelState {
    view: PanelView,
    torn_down: bool,
}

pub struct PollingPanel {
    api: Arc<dyn NewsApi>,
    state: Mutex<PanelState>,
    events: EventSender,
}

impl PollingPanel {
    pub fn new(api: Arc<dyn NewsApi>, events: EventSender) -> Self {
        Self {
            api,
            state: Mutex::new(PanelState {
                view: PanelView::default(),
                torn_down: false,
            }),
            events,
        }
    }

    pub fn view(&self) -> PanelView {
        self.state().view.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub async fn mount(&self) -> PollOutcome {
        self.fetch_indices(false).await
    }

    pub async fn refresh(&self) -> PollOutcome {
        self.fetch_indices(true).await
    }

    pub async fn fetch_indices(&self, is_manual_refresh: bool) -> PollOutcome {
        {
            let mut state = self.state();
            if state.torn_down {
                return PollOutcome::Discarded;
            }
            if !state.view.refresh_enabled() {
                debug!(is_manual_refresh, "market indices fetch already in flight");
                return PollOutcome::Skipped;
            }
            if is_manual_refresh {
                state.view.refreshing = true;
            } else {
                state.view.loading = true;
            }
        }
        let _ = self.events.send(ViewEvent::IndicesLoading {
            manual: is_manual_refresh,
        });

        let in_flight = InFlight::new(&self.state, |state: &mut PanelState| {
            debug!("market indices fetch canceled before its response arrived");
            state.view.loading = false;
            state.view.refreshing = false;
        });
        let outcome = self
            .api
            .fetch_market_indices()
            .await
            .and_then(|payload| normalize_indices(&payload));
        in_flight.disarm();

        let mut state = self.state();
        if state.torn_down {
            debug!("dropping market indices response after teardown");
            return PollOutcome::Discarded;
        }
        state.view.loading = false;
        state.view.refreshing = false;
        match outcome {
            Ok(indices) => {
                let count = indices.len();
                info!(count, is_manual_refresh, "market indices updated");
                state.view.indices = indices;
                state.view.error = None;
                state.view.last_updated = Some(Utc::now());
                let _ = self.events.send(ViewEvent::IndicesUpdated { count });
                PollOutcome::Updated(count)
            }
            Err(err) => {
                let error = UiError::classify(UiErrorContext::MarketIndices, &err);
                warn!(
                    error = %err,
                    message = error.message(),
                    retained = state.view.indices.len(),
                    "market indices fetch failed; keeping previous data"
                );
                let _ = self
                    .events
                    .send(ViewEvent::IndicesFailed(error.message().to_string()));
                state.view.error = Some(error);
                PollOutcome::Failed(err)
            }
        }
    }

    pub fn teardown(&self) {
        let mut state = self.state();
        state.torn_down = true;
        state.view.loading = false;
        state.view.refreshing = false;
    }

    fn state(&self) -> MutexGuard<'_, PanelState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Validates the payload is a non-empty array of objects and coerces each entry.
pub fn normalize_indices(payload: &Value) -> Result<Vec<MarketIndex>, FetchError> {
    let entries = payload
        .as_array()
        .filter(|entries| !entries.is_empty())
        .ok_or_else(|| FetchError::DataShape(INVALID_PAYLOAD.to_string()))?;

    entries
        .iter()
        .enumerate()
        .map(|(position, entry)| {
            if entry.is_object() {
                Ok(normalize_index(entry))
            } else {
                Err(FetchError::DataShape(format!(
                    "{INVALID_PAYLOAD}: entry {position} is not an object"
                )))
            }
        })
        .collect()
}

fn normalize_index(entry: &Value) -> MarketIndex {
    let text = |key: &str| entry.get(key).and_then(Value::as_str).map(str::to_owned);
    let number = |key: &str| entry.get(key).and_then(Value::as_f64);

    MarketIndex {
        symbol: text("symbol").unwrap_or_default(),
        name: text("name"),
        price: number("price"),
        change: number("change").unwrap_or(0.0),
        change_perc: number("changePerc")
            .or_else(|| number("changePercentage"))
            .unwrap_or(0.0),
        is_historical: entry
            .get("isDelayed")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        updated_at: text("updatedAt"),
    }
}

#[cfg(test)]
#[path = "tests/panel_tests.rs"]
mod tests;

//! Notifications published by the view components for a presentation layer to redraw on.

use shared::domain::QueryState;
use tokio::sync::broadcast;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    LocationChanged(String),
    ListRequested {
        generation: u64,
        query: QueryState,
    },
    ListUpdated {
        generation: u64,
        total_count: u64,
    },
    ListFailed {
        generation: u64,
        message: String,
    },
    StaleListResponse {
        generation: u64,
    },
    SummaryLoading,
    SummaryReady,
    SummaryFailed(String),
    SummaryDismissed,
    IndicesLoading {
        manual: bool,
    },
    IndicesUpdated {
        count: usize,
    },
    IndicesFailed(String),
}

pub type EventSender = broadcast::Sender<ViewEvent>;

pub fn channel() -> EventSender {
    let (events, _) = broadcast::channel(256);
    events
}

//! Request orchestration and view state for the market-news client.
//!
//! The list surface is [`QueryStateController`] driving [`FetchOrchestrator`]; the detail
//! surface ([`DetailViewGateway`]) and the market panel ([`PollingPanel`]) run their own
//! independent request lifecycles against the same [`NewsApi`].

pub mod config;
pub mod controller;
pub mod debounce;
pub mod detail;
pub mod events;
mod in_flight;
pub mod location;
pub mod orchestrator;
pub mod panel;
pub mod transport;
pub mod ui_error;

pub use config::{load_settings, Settings};
pub use controller::QueryStateController;
pub use debounce::{Debouncer, DelayedTask};
pub use detail::{DetailView, DetailViewGateway, SummarizeOutcome};
pub use events::{EventSender, ViewEvent};
pub use location::{LocationStore, MemoryLocation};
pub use orchestrator::{FetchOrchestrator, ListView};
pub use panel::{normalize_indices, PanelPresentation, PanelView, PollOutcome, PollingPanel};
pub use transport::{HttpNewsApi, NewsApi};
pub use ui_error::{classify, UiError, UiErrorCategory, UiErrorContext};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

//! Mapping from request failures to the single message a surface displays.

use shared::error::FetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    Server,
    DataShape,
    MissingResource,
    Setup,
}

/// The surface that issued the failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    NewsList,
    Summary,
    MarketIndices,
}

impl UiErrorContext {
    pub fn fallback_message(self) -> &'static str {
        match self {
            Self::NewsList => "Failed to load news articles.",
            Self::Summary => "Failed to generate summary",
            Self::MarketIndices => "Failed to fetch market data",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    /// Priority: server `error` field, server `details` field, transport message, then a
    /// request-setup message.
    pub fn classify(context: UiErrorContext, error: &FetchError) -> Self {
        let (category, message) = match error {
            FetchError::Server { status, body } => (
                UiErrorCategory::Server,
                body.error
                    .clone()
                    .or_else(|| body.details.clone())
                    .unwrap_or_else(|| {
                        format!("{} (HTTP {status})", context.fallback_message())
                    }),
            ),
            FetchError::Transport { message } => (
                UiErrorCategory::Transport,
                if message.trim().is_empty() {
                    "Could not reach the server. Please check your connection.".to_string()
                } else {
                    message.clone()
                },
            ),
            FetchError::DataShape(message) => (UiErrorCategory::DataShape, message.clone()),
            FetchError::MissingResource(what) => (
                UiErrorCategory::MissingResource,
                format!("No {what} available for this article"),
            ),
            FetchError::RequestSetup(message) => (
                UiErrorCategory::Setup,
                format!("Error setting up request: {message}"),
            ),
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn classify(context: UiErrorContext, error: &FetchError) -> String {
    UiError::classify(context, error).message
}

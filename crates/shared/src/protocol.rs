use serde::{Deserialize, Serialize};

use crate::domain::{Article, ListResult};

pub const NEWS_LIST_PATH: &str = "news-list";
pub const MARKET_INDICES_PATH: &str = "market-indices";
pub const SUMMARIZE_PATH: &str = "summarize";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsListQuery {
    pub page: u32,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsListResponse {
    #[serde(default)]
    pub articles: Option<Vec<Article>>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_count: u64,
}

impl From<NewsListResponse> for ListResult {
    fn from(value: NewsListResponse) -> Self {
        Self {
            articles: value.articles.unwrap_or_default(),
            total_pages: value.total_pages.max(1),
            total_count: value.total_count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeRequest {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizeResponse {
    pub summary: String,
}

/// Structured fields a non-success response may carry, plus the raw body text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip)]
    pub raw: String,
}

impl ServerErrorBody {
    /// Non-JSON bodies and non-string fields simply leave the structured fields empty.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let value = serde_json::from_str::<serde_json::Value>(&raw).unwrap_or_default();
        let field = |name: &str| {
            value
                .get(name)
                .and_then(serde_json::Value::as_str)
                .filter(|text| !text.is_empty())
                .map(str::to_owned)
        };
        Self {
            error: field("error"),
            details: field("details"),
            raw,
        }
    }
}

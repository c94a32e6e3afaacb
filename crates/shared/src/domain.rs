use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::location;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleId {
    Number(i64),
    Text(String),
}

impl ArticleId {
    /// Any scalar is kept as an opaque id (`1.5` becomes the text `"1.5"`); null, arrays and
    /// objects yield no id rather than failing the whole article.
    fn from_json(value: serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(number) => Some(match number.as_i64() {
                Some(id) => Self::Number(id),
                None => Self::Text(number.to_string()),
            }),
            serde_json::Value::String(text) => Some(Self::Text(text)),
            serde_json::Value::Bool(flag) => Some(Self::Text(flag.to_string())),
            serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                None
            }
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<ArticleId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<serde_json::Value>::deserialize(deserializer)?.and_then(ArticleId::from_json))
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

/// Publisher of an article. The list endpoint sends either `{"name": "..."}` or a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArticleSource {
    Named { name: Option<String> },
    Plain(String),
}

impl ArticleSource {
    pub fn name(&self) -> Option<&str> {
        let name = match self {
            Self::Named { name } => name.as_deref()?,
            Self::Plain(name) => name.as_str(),
        };
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(
        default,
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<ArticleId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default, rename = "imageURL", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, rename = "URL", skip_serializing_if = "Option::is_none")]
    pub legacy_url: Option<String>,
}

impl Article {
    /// The link used by the summarize and visit actions. `URL` takes precedence over `url`.
    pub fn resolve_url(&self) -> Option<&str> {
        [self.legacy_url.as_deref(), self.url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
    }

    /// Lead image; `imageURL` takes precedence over `urlToImage`.
    pub fn resolve_image_url(&self) -> Option<&str> {
        [self.image_url.as_deref(), self.url_to_image.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
    }

    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref()).unwrap_or("No Title")
    }

    pub fn display_description(&self) -> &str {
        non_empty(self.description.as_deref()).unwrap_or("No description available")
    }

    pub fn source_name(&self) -> &str {
        self.source
            .as_ref()
            .and_then(ArticleSource::name)
            .unwrap_or("Unknown Source")
    }

    pub fn published_at_parsed(&self) -> Option<DateTime<Utc>> {
        let raw = self.published_at.as_deref()?;
        DateTime::parse_from_rfc3339(raw.trim())
            .ok()
            .map(|at| at.with_timezone(&Utc))
    }

    pub fn display_published_at(&self) -> String {
        match self.published_at_parsed() {
            Some(at) => at.format("%A, %B %-d, %Y %H:%M UTC").to_string(),
            None => "Date not available".to_string(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageSize(pub u32);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(10);
    pub const OPTIONS: [PageSize; 3] = [PageSize(10), PageSize(20), PageSize(50)];

    pub fn get(self) -> u32 {
        self.0
    }

    /// Whether the value is one of the sizes the page-size selector offers.
    pub fn is_standard(self) -> bool {
        Self::OPTIONS.contains(&self)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryState {
    pub page: u32,
    pub page_size: PageSize,
    #[serde(rename = "search")]
    pub search_query: String,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PageSize::DEFAULT,
            search_query: String::new(),
        }
    }
}

impl QueryState {
    pub fn with_search(&self, search_query: impl Into<String>) -> Self {
        Self {
            page: 1,
            page_size: self.page_size,
            search_query: search_query.into(),
        }
    }

    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// A zero size has no encoding and falls back to the default.
    pub fn with_page_size(&self, page_size: PageSize) -> Self {
        Self {
            page: 1,
            page_size: if page_size.get() == 0 {
                PageSize::DEFAULT
            } else {
                page_size
            },
            search_query: self.search_query.clone(),
        }
    }

    /// Search term as sent to the list endpoint: trimmed, `None` when blank.
    pub fn search_param(&self) -> Option<&str> {
        let trimmed = self.search_query.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn to_query_string(&self) -> String {
        location::encode(self)
    }

    pub fn from_query_string(query: &str) -> Self {
        location::decode(query)
    }

    /// List route for this state, e.g. `/?page=2&search=nifty`.
    pub fn to_location(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            "/".to_string()
        } else {
            format!("/?{query}")
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListResult {
    pub articles: Vec<Article>,
    pub total_pages: u32,
    pub total_count: u64,
}

impl Default for ListResult {
    fn default() -> Self {
        Self {
            articles: Vec::new(),
            total_pages: 1,
            total_count: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketIndex {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub change: f64,
    pub change_perc: f64,
    pub is_historical: bool,
    pub updated_at: Option<String>,
}

impl MarketIndex {
    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or("Unknown Index")
    }

    pub fn display_price(&self) -> String {
        match self.price {
            Some(price) => format!("{price:.2}"),
            None => "N/A".to_string(),
        }
    }

    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }

    pub fn display_change(&self) -> String {
        let sign = if self.change >= 0.0 { "+" } else { "" };
        let perc_sign = if self.change_perc >= 0.0 { "+" } else { "" };
        format!(
            "{sign}{:.2} ({perc_sign}{:.2}%)",
            self.change, self.change_perc
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub text: String,
}

/// Payload carried from the list surface to the detail surface when an article is opened.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleHandoff {
    pub article: Article,
    pub origin: QueryState,
}

impl ArticleHandoff {
    pub fn article_route(&self) -> String {
        match &self.article.id {
            Some(id) => format!("/article/{id}"),
            None => "/article/".to_string(),
        }
    }

    pub fn back_location(&self) -> String {
        self.origin.to_location()
    }
}

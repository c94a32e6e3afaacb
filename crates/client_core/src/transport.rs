//! HTTP access to the news backend.
//!
//! Components talk to the backend only through [`NewsApi`], so tests can swap in a scripted
//! implementation that controls when (and in which order) responses arrive.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{ListResult, QueryState, SummaryResult},
    error::FetchError,
    protocol::{
        NewsListQuery, NewsListResponse, SummarizeRequest, SummarizeResponse, MARKET_INDICES_PATH,
        NEWS_LIST_PATH, SUMMARIZE_PATH,
    },
};
use tracing::debug;
use url::Url;

use crate::config::Settings;

#[async_trait]
pub trait NewsApi: Send + Sync {
    async fn fetch_news_list(&self, query: &QueryState) -> Result<ListResult, FetchError>;
    /// Raw payload; shape validation belongs to the market panel.
    async fn fetch_market_indices(&self) -> Result<serde_json::Value, FetchError>;
    async fn summarize(&self, url: &str) -> Result<SummaryResult, FetchError>;
}

pub struct HttpNewsApi {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpNewsApi {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let timeout = settings.request_timeout();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| FetchError::RequestSetup(err.to_string()))?;
        Ok(Self {
            http,
            base_url: settings.api_base_url.clone(),
            timeout,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let normalized = format!("{}/", self.base_url.trim().trim_end_matches('/'));
        Url::parse(&normalized)
            .and_then(|base| base.join(path))
            .map_err(|err| {
                FetchError::RequestSetup(format!("invalid base URL '{}': {err}", self.base_url))
            })
    }

    fn map_request_error(&self, err: reqwest::Error) -> FetchError {
        if err.is_builder() {
            FetchError::RequestSetup(err.to_string())
        } else if err.is_timeout() {
            FetchError::transport(format!(
                "timeout of {}ms exceeded",
                self.timeout.as_millis()
            ))
        } else {
            FetchError::transport(format!("network error: {err}"))
        }
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
        path: &str,
    ) -> Result<T, FetchError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| self.map_request_error(err))?;
        if !status.is_success() {
            return Err(FetchError::server(status.as_u16(), body));
        }
        serde_json::from_str(&body)
            .map_err(|err| FetchError::DataShape(format!("invalid {path} payload: {err}")))
    }
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn fetch_news_list(&self, query: &QueryState) -> Result<ListResult, FetchError> {
        let url = self.endpoint(NEWS_LIST_PATH)?;
        let params = NewsListQuery {
            page: query.page,
            page_size: query.page_size.get(),
            search: query.search_param().map(str::to_owned),
        };
        debug!(%url, page = params.page, page_size = params.page_size, search = ?params.search, "GET news list");
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .query(&params)
            .send()
            .await
            .map_err(|err| self.map_request_error(err))?;
        let body: NewsListResponse = self.read_json(response, NEWS_LIST_PATH).await?;
        Ok(body.into())
    }

    async fn fetch_market_indices(&self) -> Result<serde_json::Value, FetchError> {
        let url = self.endpoint(MARKET_INDICES_PATH)?;
        debug!(%url, "GET market indices");
        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|err| self.map_request_error(err))?;
        self.read_json(response, MARKET_INDICES_PATH).await
    }

    async fn summarize(&self, article_url: &str) -> Result<SummaryResult, FetchError> {
        let url = self.endpoint(SUMMARIZE_PATH)?;
        debug!(%url, article_url, "POST summarize");
        let response = self
            .http
            .post(url)
            .header(header::ACCEPT, "application/json")
            .json(&SummarizeRequest {
                url: article_url.to_string(),
            })
            .send()
            .await
            .map_err(|err| self.map_request_error(err))?;
        let body: SummarizeResponse = self.read_json(response, SUMMARIZE_PATH).await?;
        Ok(SummaryResult { text: body.summary })
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;

//! Scripted [`NewsApi`] whose responses are released by the test.

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use shared::{
    domain::{Article, ArticleSource, ListResult, QueryState, SummaryResult},
    error::FetchError,
};
use tokio::sync::{broadcast, oneshot};

use crate::{events::ViewEvent, transport::NewsApi};

/// Calls to one endpoint. A queued response answers the next call immediately; otherwise
/// the call waits until the test releases it by index.
pub(crate) struct Gate<Req, Resp> {
    calls: Mutex<Vec<Req>>,
    waiting: Mutex<Vec<Option<oneshot::Sender<Resp>>>>,
    queued: Mutex<VecDeque<Resp>>,
}

impl<Req: Clone, Resp> Gate<Req, Resp> {
    fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            waiting: Mutex::new(Vec::new()),
            queued: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Req> {
        self.calls.lock().expect("calls").clone()
    }

    pub(crate) fn queue(&self, response: Resp) {
        self.queued.lock().expect("queued").push_back(response);
    }

    /// Completes the `index`-th call that is still waiting for a response.
    pub(crate) fn release(&self, index: usize, response: Resp) {
        let sender = self.waiting.lock().expect("waiting")[index]
            .take()
            .expect("call already released");
        let _ = sender.send(response);
    }

    pub(crate) async fn wait_for_calls(&self, count: usize) {
        for _ in 0..1_000 {
            if self.calls.lock().expect("calls").len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("expected {count} calls, saw {}", self.calls().len());
    }

    async fn call(&self, request: Req) -> Option<Resp> {
        self.calls.lock().expect("calls").push(request);
        if let Some(response) = self.queued.lock().expect("queued").pop_front() {
            return Some(response);
        }
        let (tx, rx) = oneshot::channel();
        self.waiting.lock().expect("waiting").push(Some(tx));
        rx.await.ok()
    }
}

pub(crate) struct ScriptedNewsApi {
    pub(crate) list: Gate<QueryState, Result<ListResult, FetchError>>,
    pub(crate) indices: Gate<(), Result<serde_json::Value, FetchError>>,
    pub(crate) summaries: Gate<String, Result<SummaryResult, FetchError>>,
}

impl ScriptedNewsApi {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            list: Gate::new(),
            indices: Gate::new(),
            summaries: Gate::new(),
        })
    }
}

fn dropped() -> FetchError {
    FetchError::transport("scripted response dropped")
}

#[async_trait]
impl NewsApi for ScriptedNewsApi {
    async fn fetch_news_list(&self, query: &QueryState) -> Result<ListResult, FetchError> {
        self.list.call(query.clone()).await.unwrap_or_else(|| Err(dropped()))
    }

    async fn fetch_market_indices(&self) -> Result<serde_json::Value, FetchError> {
        self.indices.call(()).await.unwrap_or_else(|| Err(dropped()))
    }

    async fn summarize(&self, url: &str) -> Result<SummaryResult, FetchError> {
        self.summaries
            .call(url.to_string())
            .await
            .unwrap_or_else(|| Err(dropped()))
    }
}

pub(crate) fn article(title: &str) -> Article {
    Article {
        title: Some(title.to_string()),
        description: Some(format!("{title} description")),
        source: Some(ArticleSource::Named {
            name: Some("Mint".to_string()),
        }),
        published_at: Some("2024-03-01T09:15:00Z".to_string()),
        url: Some(format!(
            "https://news.example.com/{}",
            title.to_lowercase().replace(' ', "-")
        )),
        ..Article::default()
    }
}

pub(crate) fn list_result(titles: &[&str], total_pages: u32, total_count: u64) -> ListResult {
    ListResult {
        articles: titles.iter().map(|title| article(title)).collect(),
        total_pages,
        total_count,
    }
}

/// Waits (on the paused clock) for the first event matching `predicate`.
pub(crate) async fn next_event(
    events: &mut broadcast::Receiver<ViewEvent>,
    predicate: impl Fn(&ViewEvent) -> bool,
) -> ViewEvent {
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for view event")
}

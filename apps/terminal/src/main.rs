use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    events, load_settings, DetailViewGateway, FetchOrchestrator, HttpNewsApi, NewsApi,
    PollingPanel, Settings, SummarizeOutcome, ViewEvent,
};
use shared::domain::{Article, PageSize, QueryState};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod browse;
mod render;

#[derive(Parser, Debug)]
#[command(name = "market-news", about = "Market news and indices from the terminal")]
struct Cli {
    /// Overrides the API base URL from market_news.toml and the environment.
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one page of the news list.
    List {
        /// List location query, e.g. `?page=2&search=nifty`. Takes precedence over the
        /// individual flags.
        #[arg(long)]
        location: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = PageSize::DEFAULT.get())]
        page_size: u32,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Browse the list interactively.
    Browse {
        #[arg(long, default_value = "")]
        location: String,
    },
    /// Summarize the article at a URL.
    Summarize {
        #[arg(long)]
        url: String,
    },
    /// Show the market indices panel.
    Indices {
        /// Follow the initial load with a manual refresh.
        #[arg(long)]
        refresh: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let mut settings = load_settings();
    if let Some(base_url) = cli.base_url {
        settings.api_base_url = base_url;
    }
    info!(base_url = %settings.api_base_url, "using news API");
    let api: Arc<dyn NewsApi> =
        Arc::new(HttpNewsApi::new(&settings).context("failed to build HTTP client")?);

    match cli.command {
        Command::List {
            location,
            page,
            page_size,
            search,
        } => {
            let query = match location {
                Some(location) => QueryState::from_query_string(&location),
                None => QueryState::default()
                    .with_search(search)
                    .with_page_size(PageSize(page_size.max(1)))
                    .with_page(page),
            };
            list(api, &settings, query).await
        }
        Command::Browse { location } => browse::run(api, &settings, &location).await,
        Command::Summarize { url } => summarize(api, url).await,
        Command::Indices { refresh } => indices(api, refresh).await,
    }
}

async fn list(api: Arc<dyn NewsApi>, settings: &Settings, query: QueryState) -> Result<()> {
    let events = events::channel();
    let mut rx = events.subscribe();
    let orchestrator = FetchOrchestrator::new(api, settings.debounce_window(), events);

    let Some(generation) = orchestrator.fetch_now(query.clone()) else {
        bail!("news list request was not issued");
    };
    wait_for_list(&mut rx, generation).await?;

    let view = orchestrator.view();
    print!("{}", render::list(&view, &query));
    orchestrator.teardown();
    if let Some(error) = view.error {
        bail!("{}", error.message());
    }
    Ok(())
}

async fn wait_for_list(rx: &mut broadcast::Receiver<ViewEvent>, generation: u64) -> Result<()> {
    loop {
        match rx.recv().await {
            Ok(ViewEvent::ListUpdated { generation: g, .. } | ViewEvent::ListFailed { generation: g, .. })
                if g == generation =>
            {
                return Ok(())
            }
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => bail!("event channel closed before the list arrived"),
        }
    }
}

async fn summarize(api: Arc<dyn NewsApi>, url: String) -> Result<()> {
    let gateway = DetailViewGateway::new(api, events::channel());
    let article = Article {
        url: Some(url),
        ..Article::default()
    };

    let outcome = gateway.summarize(&article).await;
    print!("{}", render::summary(&gateway.view()));
    match outcome {
        SummarizeOutcome::Completed(_) => Ok(()),
        SummarizeOutcome::Failed(err) => Err(anyhow::Error::new(err).context("summarize failed")),
        SummarizeOutcome::AlreadyInFlight | SummarizeOutcome::Discarded => {
            bail!("summary was not produced")
        }
    }
}

async fn indices(api: Arc<dyn NewsApi>, refresh: bool) -> Result<()> {
    let panel = PollingPanel::new(api, events::channel());

    panel.mount().await;
    if refresh {
        panel.refresh().await;
    }

    let view = panel.view();
    print!("{}", render::panel(&view));
    panel.teardown();
    if view.indices.is_empty() {
        if let Some(error) = view.error {
            bail!("{}", error.message());
        }
    }
    Ok(())
}

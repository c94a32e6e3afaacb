//! Interactive list browsing: one line of input per command, list redrawn as results land.

use std::sync::Arc;

use anyhow::Result;
use client_core::{
    events, DetailViewGateway, FetchOrchestrator, MemoryLocation, NewsApi, PollingPanel,
    QueryStateController, Settings, SummarizeOutcome, ViewEvent,
};
use shared::domain::{Article, PageSize};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, info};

use crate::render;

const HELP: &str = "\
type text to search, or:
  :page N        go to page N
  :size N        show N articles per page (10, 20 or 50)
  :open N        show article N
  :summarize N   summarize article N
  :indices       show market indices
  :help          show this help
  :quit          leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Page(u32),
    Size(u32),
    Open(usize),
    Summarize(usize),
    Indices,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(command) = line.strip_prefix(':') else {
        return Ok(BrowseCommand::Search(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default();
    let arg = parts.next();
    let number = |what: &str| -> Result<u32, String> {
        arg.and_then(|raw| raw.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| format!(":{name} needs a positive {what}"))
    };

    match name {
        "page" | "p" => number("page number").map(BrowseCommand::Page),
        "size" | "s" => number("page size").map(BrowseCommand::Size),
        "open" | "o" => number("article number").map(|n| BrowseCommand::Open(n as usize)),
        "summarize" | "sum" => number("article number").map(|n| BrowseCommand::Summarize(n as usize)),
        "indices" | "i" => Ok(BrowseCommand::Indices),
        "help" | "h" | "?" => Ok(BrowseCommand::Help),
        "quit" | "q" => Ok(BrowseCommand::Quit),
        other => Err(format!("unknown command :{other} (try :help)")),
    }
}

struct Surfaces {
    controller: QueryStateController,
    gateway: DetailViewGateway,
    panel: PollingPanel,
}

impl Surfaces {
    fn article(&self, number: usize) -> Option<Article> {
        let view = self.controller.orchestrator().view();
        number
            .checked_sub(1)
            .and_then(|position| view.articles.get(position).cloned())
    }

    async fn run(&self, command: BrowseCommand) {
        match command {
            BrowseCommand::Search(term) => self.controller.set_search(term),
            BrowseCommand::Page(page) => self.controller.set_page(page),
            BrowseCommand::Size(size) => {
                let size = PageSize(size);
                if !size.is_standard() {
                    println!("note: {size} is not one of the usual page sizes");
                }
                self.controller.set_page_size(size);
            }
            BrowseCommand::Open(number) => match self.article(number) {
                Some(article) => println!("{}", render::article(&self.controller.select(article))),
                None => println!("no article {number} on this page"),
            },
            BrowseCommand::Summarize(number) => match self.article(number) {
                Some(article) => {
                    println!("Generating summary...");
                    let outcome = self.gateway.summarize(&article).await;
                    if outcome == SummarizeOutcome::AlreadyInFlight {
                        println!("a summary is already being generated");
                        return;
                    }
                    println!("{}", render::summary(&self.gateway.view()));
                    self.gateway.dismiss();
                }
                None => println!("no article {number} on this page"),
            },
            BrowseCommand::Indices => {
                let view = self.panel.view();
                if view.last_updated.is_none() && view.error.is_none() {
                    self.panel.mount().await;
                } else {
                    self.panel.refresh().await;
                }
                println!("{}", render::panel(&self.panel.view()));
            }
            BrowseCommand::Help => println!("{HELP}"),
            BrowseCommand::Quit => {}
        }
    }

    fn teardown(&self) {
        self.controller.teardown();
        self.gateway.teardown();
        self.panel.teardown();
    }
}

pub async fn run(api: Arc<dyn NewsApi>, settings: &Settings, location: &str) -> Result<()> {
    let events = events::channel();
    let mut rx = events.subscribe();
    let orchestrator = FetchOrchestrator::new(
        Arc::clone(&api),
        settings.debounce_window(),
        events.clone(),
    );
    let surfaces = Surfaces {
        controller: QueryStateController::initialize(
            Arc::new(MemoryLocation::new(location)),
            orchestrator,
            events.clone(),
        ),
        gateway: DetailViewGateway::new(Arc::clone(&api), events.clone()),
        panel: PollingPanel::new(api, events),
    };
    info!(location, "browsing news list");
    println!("{HELP}\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_command(&line) {
                    Ok(BrowseCommand::Quit) => break,
                    Ok(command) => surfaces.run(command).await,
                    Err(message) => println!("{message}"),
                }
            }
            event = rx.recv() => match event {
                Ok(ViewEvent::ListUpdated { generation, .. } | ViewEvent::ListFailed { generation, .. })
                    if generation == surfaces.controller.orchestrator().latest_generation() =>
                {
                    let view = surfaces.controller.orchestrator().view();
                    println!("{}", render::list(&view, &surfaces.controller.state()));
                }
                Ok(ViewEvent::LocationChanged(query)) => debug!(%query, "location replaced"),
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    }

    surfaces.teardown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_search() {
        assert_eq!(
            parse_command("tata steel\n"),
            Ok(BrowseCommand::Search("tata steel".to_string()))
        );
        assert_eq!(parse_command(""), Ok(BrowseCommand::Search(String::new())));
    }

    #[test]
    fn numbered_commands_require_positive_numbers() {
        assert_eq!(parse_command(":page 3"), Ok(BrowseCommand::Page(3)));
        assert_eq!(parse_command(":s 20"), Ok(BrowseCommand::Size(20)));
        assert_eq!(parse_command(":open 2"), Ok(BrowseCommand::Open(2)));
        assert_eq!(parse_command(":sum 1"), Ok(BrowseCommand::Summarize(1)));
        assert!(parse_command(":page 0").is_err());
        assert!(parse_command(":page two").is_err());
        assert!(parse_command(":open").is_err());
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert_eq!(
            parse_command(":bogus"),
            Err("unknown command :bogus (try :help)".to_string())
        );
        assert_eq!(parse_command(":q"), Ok(BrowseCommand::Quit));
    }
}

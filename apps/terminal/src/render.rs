//! Plain-text rendering of the view components' state.

use std::fmt::Write;

use client_core::{DetailView, ListView, PanelPresentation, PanelView};
use shared::domain::{ArticleHandoff, QueryState};

pub fn list(view: &ListView, state: &QueryState) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Page {} of {} | {} articles | {} per page",
        state.page, view.total_pages, view.total_count, state.page_size
    );
    if let Some(search) = state.search_param() {
        let _ = write!(out, " | search \"{search}\"");
    }
    out.push('\n');

    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {}", error.message());
    }
    if view.loading {
        out.push_str("(loading)\n");
    }
    if view.articles.is_empty() && view.error.is_none() && !view.loading {
        out.push_str("No articles found.\n");
    }

    for (position, article) in view.articles.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}\n     {} | {}",
            position + 1,
            article.display_title(),
            article.source_name(),
            article.display_published_at()
        );
    }
    out
}

pub fn article(handoff: &ArticleHandoff) -> String {
    let article = &handoff.article;
    let mut out = String::new();
    let _ = writeln!(out, "{}", article.display_title());
    let _ = writeln!(
        out,
        "{} | {}",
        article.source_name(),
        article.display_published_at()
    );
    let _ = writeln!(out, "\n{}", article.display_description());
    if let Some(content) = article.content.as_deref().filter(|c| !c.trim().is_empty()) {
        let _ = writeln!(out, "\n{content}");
    }
    match article.resolve_url() {
        Some(url) => {
            let _ = writeln!(out, "\nRead full article: {url}");
        }
        None => out.push_str("\nNo URL available for this article\n"),
    }
    let _ = writeln!(
        out,
        "route {} | back to {}",
        handoff.article_route(),
        handoff.back_location()
    );
    out
}

pub fn summary(view: &DetailView) -> String {
    if let Some(error) = &view.error {
        return format!("! {}\n", error.message());
    }
    match (&view.summary, view.summary_open) {
        (Some(summary), true) => format!("AI summary\n\n{}\n", summary.text),
        _ => "No summary.\n".to_string(),
    }
}

pub fn panel(view: &PanelView) -> String {
    let mut out = String::new();
    if let Some(error) = &view.error {
        let _ = writeln!(out, "! {}", error.message());
    }
    match view.presentation() {
        PanelPresentation::Skeleton => out.push_str("Loading market data...\n"),
        PanelPresentation::Content { .. } => {
            for index in &view.indices {
                let _ = writeln!(
                    out,
                    "{:<24} {:>12} {:>18} {}",
                    index.display_name(),
                    index.display_price(),
                    index.display_change(),
                    if index.is_up() { "▲" } else { "▼" }
                );
                if index.is_historical {
                    out.push_str("    (delayed)\n");
                }
            }
        }
    }
    if let Some(at) = view.last_updated {
        let _ = writeln!(out, "Last updated {}", at.format("%H:%M:%S UTC"));
    }
    out
}

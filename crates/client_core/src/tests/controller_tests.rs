use std::time::Duration;

use shared::domain::ArticleId;

use super::*;
use crate::{
    events,
    location::MemoryLocation,
    test_support::{article, list_result, next_event, ScriptedNewsApi},
};

const WINDOW: Duration = Duration::from_millis(300);

struct Harness {
    api: Arc<ScriptedNewsApi>,
    location: Arc<MemoryLocation>,
    controller: QueryStateController,
}

fn harness(initial_location: &str) -> Harness {
    let api = ScriptedNewsApi::new();
    let events = events::channel();
    let orchestrator = FetchOrchestrator::new(api.clone(), WINDOW, events.clone());
    let location = Arc::new(MemoryLocation::new(initial_location));
    let controller = QueryStateController::initialize(location.clone(), orchestrator, events);
    Harness {
        api,
        location,
        controller,
    }
}

#[tokio::test(start_paused = true)]
async fn initialize_parses_location_and_fetches_once() {
    let h = harness("?page=3&pageSize=20&search=nifty");

    assert_eq!(
        h.controller.state(),
        QueryState {
            page: 3,
            page_size: PageSize(20),
            search_query: "nifty".to_string(),
        }
    );

    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.api.list.calls(), vec![h.controller.state()]);
}

#[tokio::test(start_paused = true)]
async fn initialize_falls_back_to_defaults_for_invalid_params() {
    let h = harness("page=-4&pageSize=abc&utm_source=feed");

    assert_eq!(h.controller.state(), QueryState::default());
    assert_eq!(h.location.query(), "");
}

#[tokio::test(start_paused = true)]
async fn initialize_keeps_non_standard_page_size() {
    let h = harness("pageSize=25");

    assert_eq!(h.controller.state().page_size, PageSize(25));
    assert_eq!(h.location.query(), "pageSize=25");
}

#[tokio::test(start_paused = true)]
async fn search_burst_issues_single_request_on_page_one() {
    let h = harness("page=4");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(h.api.list.calls().len(), 1);

    for (step, partial) in ["n", "ni", "nif", "nift", "nifty"].into_iter().enumerate() {
        h.controller.set_search(partial);
        tokio::time::sleep(Duration::from_millis(50 * step as u64)).await;
    }
    assert_eq!(h.controller.state().page, 1);
    assert_eq!(h.location.query(), "search=nifty");

    tokio::time::sleep(Duration::from_secs(1)).await;
    let calls = h.api.list.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1], QueryState::default().with_search("nifty"));
}

#[tokio::test(start_paused = true)]
async fn page_size_change_resets_page_and_refetches() {
    let h = harness("page=2&search=oil");
    tokio::time::sleep(Duration::from_secs(1)).await;

    h.controller.set_page_size(PageSize(20));
    tokio::time::sleep(Duration::from_secs(1)).await;

    let expected = QueryState {
        page: 1,
        page_size: PageSize(20),
        search_query: "oil".to_string(),
    };
    assert_eq!(h.controller.state(), expected);
    assert_eq!(h.api.list.calls().len(), 2);
    assert_eq!(h.api.list.calls().last(), Some(&expected));
    assert_eq!(h.location.query(), "pageSize=20&search=oil");
}

#[tokio::test(start_paused = true)]
async fn set_page_changes_only_the_page() {
    let h = harness("pageSize=50&search=rupee");

    h.controller.set_page(7);

    assert_eq!(
        h.controller.state(),
        QueryState {
            page: 7,
            page_size: PageSize(50),
            search_query: "rupee".to_string(),
        }
    );
    assert_eq!(h.location.query(), "page=7&pageSize=50&search=rupee");
}

#[tokio::test(start_paused = true)]
async fn returning_to_defaults_writes_empty_location() {
    let h = harness("page=5&search=crude");

    h.controller.set_search("");

    assert_eq!(h.controller.state(), QueryState::default());
    assert_eq!(h.location.query(), "");
}

#[tokio::test(start_paused = true)]
async fn unchanged_state_does_not_write_location_or_fetch() {
    let h = harness("pageSize=20");
    tokio::time::sleep(Duration::from_secs(1)).await;
    let writes = h.location.writes();

    h.controller.set_page(1);
    h.controller.set_page_size(PageSize(20));
    h.controller.set_search("");
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(h.location.writes(), writes);
    assert_eq!(h.api.list.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn list_view_reflects_latest_controller_state() {
    let h = harness("");
    let mut events = h.controller.orchestrator().subscribe_events();
    h.api.list.wait_for_calls(1).await;

    h.controller.set_search("sebi");
    h.api.list.wait_for_calls(2).await;

    h.api.list.release(1, Ok(list_result(&["SEBI tightens rules"], 2, 11)));
    next_event(&mut events, |event| {
        matches!(event, ViewEvent::ListUpdated { generation: 2, .. })
    })
    .await;
    h.api.list.release(0, Ok(list_result(&["Front page"], 8, 80)));
    next_event(&mut events, |event| {
        matches!(event, ViewEvent::StaleListResponse { generation: 1 })
    })
    .await;

    let view = h.controller.orchestrator().view();
    assert_eq!(view.total_count, 11);
    assert_eq!(view.articles[0].display_title(), "SEBI tightens rules");
}

#[tokio::test(start_paused = true)]
async fn select_hands_off_article_with_origin_state() {
    let h = harness("page=3&search=gold");
    let picked = Article {
        id: Some(ArticleId::Number(42)),
        ..article("Gold steady")
    };

    let handoff = h.controller.select(picked.clone());

    assert_eq!(handoff.article, picked);
    assert_eq!(handoff.article_route(), "/article/42");
    assert_eq!(handoff.back_location(), "/?page=3&search=gold");
}

#[tokio::test(start_paused = true)]
async fn teardown_stops_pending_fetch() {
    let h = harness("search=metals");

    h.controller.teardown();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert!(h.api.list.calls().is_empty());
}

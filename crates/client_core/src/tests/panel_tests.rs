use serde_json::json;

use super::*;
use crate::{events, test_support::ScriptedNewsApi, ui_error::UiErrorCategory};

fn setup() -> (Arc<ScriptedNewsApi>, Arc<PollingPanel>) {
    let api = ScriptedNewsApi::new();
    let panel = Arc::new(PollingPanel::new(api.clone(), events::channel()));
    (api, panel)
}

fn two_indices() -> Value {
    json!([
        {
            "symbol": "^NSEI",
            "name": "NIFTY 50",
            "price": 22450.3,
            "change": 112.4,
            "changePerc": 0.5,
            "isDelayed": false,
            "updatedAt": "2024-03-01T10:00:00Z"
        },
        {
            "symbol": "^BSESN",
            "name": "S&P BSE SENSEX",
            "price": 73800.1,
            "change": -95.2,
            "changePercentage": -0.13,
            "isDelayed": true
        }
    ])
}

#[test]
fn normalize_coerces_fields() {
    let indices = normalize_indices(&two_indices()).expect("indices");

    assert_eq!(indices.len(), 2);
    assert_eq!(indices[0].display_name(), "NIFTY 50");
    assert_eq!(indices[0].change_perc, 0.5);
    assert!(!indices[0].is_historical);
    assert_eq!(indices[0].updated_at.as_deref(), Some("2024-03-01T10:00:00Z"));
    assert_eq!(indices[1].change_perc, -0.13);
    assert!(indices[1].is_historical);
    assert!(!indices[1].is_up());
}

#[test]
fn normalize_defaults_missing_numbers() {
    let indices = normalize_indices(&json!([{ "symbol": "^NSEBANK", "price": "n/a" }]))
        .expect("indices");

    let bank = &indices[0];
    assert_eq!(bank.price, None);
    assert_eq!(bank.display_price(), "N/A");
    assert_eq!(bank.change, 0.0);
    assert_eq!(bank.change_perc, 0.0);
    assert_eq!(bank.display_name(), "Unknown Index");
}

#[test]
fn normalize_rejects_non_arrays_and_empty_arrays() {
    for payload in [json!({}), json!([]), Value::Null, json!("[]")] {
        assert_eq!(
            normalize_indices(&payload),
            Err(FetchError::DataShape(INVALID_PAYLOAD.to_string())),
            "payload {payload}"
        );
    }
}

#[test]
fn normalize_rejects_non_object_entries() {
    let err = normalize_indices(&json!([{ "symbol": "^NSEI" }, 42])).expect_err("entry 1");
    assert_eq!(
        err,
        FetchError::DataShape(format!("{INVALID_PAYLOAD}: entry 1 is not an object"))
    );
}

#[test]
fn presentation_depends_on_data_and_flags() {
    let mut view = PanelView {
        loading: true,
        ..PanelView::default()
    };
    assert_eq!(view.presentation(), PanelPresentation::Skeleton);
    assert!(!view.refresh_enabled());

    view.indices = normalize_indices(&two_indices()).expect("indices");
    assert_eq!(
        view.presentation(),
        PanelPresentation::Content { dimmed: true }
    );

    view.loading = false;
    assert_eq!(
        view.presentation(),
        PanelPresentation::Content { dimmed: false }
    );
    assert!(view.refresh_enabled());
}

#[tokio::test]
async fn mount_loads_indices() {
    let (api, panel) = setup();
    api.indices.queue(Ok(two_indices()));

    assert_eq!(panel.mount().await, PollOutcome::Updated(2));

    let view = panel.view();
    assert_eq!(view.indices.len(), 2);
    assert!(view.error.is_none());
    assert!(view.last_updated.is_some());
    assert_eq!(view.presentation(), PanelPresentation::Content { dimmed: false });
}

#[tokio::test]
async fn malformed_refresh_keeps_previous_indices() {
    let (api, panel) = setup();
    api.indices.queue(Ok(two_indices()));
    panel.mount().await;
    let before = panel.view();

    api.indices.queue(Ok(json!({})));
    let outcome = panel.refresh().await;

    assert_eq!(
        outcome,
        PollOutcome::Failed(FetchError::DataShape(INVALID_PAYLOAD.to_string()))
    );
    let view = panel.view();
    assert_eq!(view.indices, before.indices);
    assert_eq!(view.last_updated, before.last_updated);
    assert!(!view.refreshing);
    let error = view.error.expect("banner");
    assert_eq!(error.category(), UiErrorCategory::DataShape);
    assert_eq!(error.message(), INVALID_PAYLOAD);
}

#[tokio::test]
async fn server_failure_on_mount_shows_banner_over_empty_panel() {
    let (api, panel) = setup();
    api.indices.queue(Err(FetchError::server(503, "Service Unavailable")));

    panel.mount().await;

    let view = panel.view();
    assert!(view.indices.is_empty());
    assert!(!view.loading);
    assert_eq!(
        view.error.as_ref().map(UiError::message),
        Some("Failed to fetch market data (HTTP 503)")
    );
}

#[tokio::test]
async fn successful_refresh_clears_banner() {
    let (api, panel) = setup();
    api.indices.queue(Err(FetchError::transport("network error: dns")));
    panel.mount().await;
    assert!(panel.view().error.is_some());

    api.indices.queue(Ok(two_indices()));
    assert_eq!(panel.refresh().await, PollOutcome::Updated(2));
    assert!(panel.view().error.is_none());
}

#[tokio::test]
async fn refresh_while_in_flight_is_skipped() {
    let (api, panel) = setup();
    api.indices.queue(Ok(two_indices()));
    panel.mount().await;

    let pending = tokio::spawn({
        let panel = Arc::clone(&panel);
        async move { panel.refresh().await }
    });
    api.indices.wait_for_calls(2).await;

    let view = panel.view();
    assert!(view.refreshing);
    assert!(!view.refresh_enabled());
    assert_eq!(view.presentation(), PanelPresentation::Content { dimmed: true });
    assert_eq!(panel.refresh().await, PollOutcome::Skipped);

    api.indices.release(0, Ok(two_indices()));
    assert_eq!(pending.await.expect("join"), PollOutcome::Updated(2));
    assert_eq!(api.indices.calls().len(), 2);
}

#[tokio::test]
async fn initial_fetch_shows_skeleton() {
    let (api, panel) = setup();

    let pending = tokio::spawn({
        let panel = Arc::clone(&panel);
        async move { panel.mount().await }
    });
    api.indices.wait_for_calls(1).await;
    assert_eq!(panel.view().presentation(), PanelPresentation::Skeleton);

    api.indices.release(0, Ok(two_indices()));
    pending.await.expect("join");
    assert!(!panel.view().loading);
}

#[tokio::test]
async fn response_after_teardown_is_discarded() {
    let (api, panel) = setup();

    let pending = tokio::spawn({
        let panel = Arc::clone(&panel);
        async move { panel.mount().await }
    });
    api.indices.wait_for_calls(1).await;
    panel.teardown();
    api.indices.release(0, Ok(two_indices()));

    assert_eq!(pending.await.expect("join"), PollOutcome::Discarded);
    assert!(panel.view().indices.is_empty());
    assert_eq!(panel.refresh().await, PollOutcome::Discarded);
}

#[tokio::test(start_paused = true)]
async fn canceled_refresh_does_not_block_the_next_one() {
    let (api, panel) = setup();
    api.indices.queue(Ok(two_indices()));
    panel.mount().await;

    let dropped =
        tokio::time::timeout(std::time::Duration::from_millis(50), panel.refresh()).await;
    assert!(dropped.is_err());
    let view = panel.view();
    assert!(!view.refreshing);
    assert!(view.refresh_enabled());

    api.indices.queue(Ok(two_indices()));
    assert_eq!(panel.refresh().await, PollOutcome::Updated(2));
    assert_eq!(api.indices.calls().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn canceled_mount_clears_loading() {
    let (api, panel) = setup();

    let dropped = tokio::time::timeout(std::time::Duration::from_millis(50), panel.mount()).await;
    assert!(dropped.is_err());
    assert_eq!(
        panel.view().presentation(),
        PanelPresentation::Content { dimmed: false }
    );

    api.indices.queue(Ok(two_indices()));
    assert_eq!(panel.mount().await, PollOutcome::Updated(2));
}

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use ticketdash_lib::analysis::svg::render_svg;
use ticketdash_lib::commands::api::{FetchError, HttpStatsSource, StatsSource, STATS_PATH};
use ticketdash_lib::commands::settings::{read_overrides_file, resolve_settings, DashboardSettings};
use ticketdash_lib::commands::shell::{Dashboard, RefreshOutcome, RefreshTrigger};
use ticketdash_lib::models::chart::ChartRender;
use ticketdash_lib::models::dashboard::DashboardStatus;
use ticketdash_lib::models::snapshot::{fallback_snapshot, DataOrigin, TicketStatsSnapshot};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn live_body() -> serde_json::Value {
    json!({
        "success": true,
        "data": {
            "total_count": 42,
            "status_stats": {
                "resolved": { "count": 40, "percentage": 95.2 },
                "escalated": { "count": 2, "percentage": 4.8 }
            },
            "daily_stats": [
                { "count": 4, "date": "2025-10-02" },
                { "count": 9, "date": "2025-10-01" }
            ]
        }
    })
}

/// Replays scripted results; a trailing success repeats forever.
struct ScriptedSource {
    script: Mutex<VecDeque<Result<TicketStatsSnapshot, FetchError>>>,
    calls: AtomicUsize,
    delay: Duration,
}

impl ScriptedSource {
    fn new(script: Vec<Result<TicketStatsSnapshot, FetchError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatsSource for ScriptedSource {
    async fn fetch(&self) -> Result<TicketStatsSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut script = self.script.lock().expect("script lock");
        match script.pop_front() {
            Some(Ok(snapshot)) if script.is_empty() => {
                script.push_back(Ok(snapshot.clone()));
                Ok(snapshot)
            }
            Some(next) => next,
            None => Err(FetchError::Network("script exhausted".to_string())),
        }
    }
}

fn live_snapshot(total: u64) -> TicketStatsSnapshot {
    TicketStatsSnapshot {
        total_count: total,
        ..fallback_snapshot()
    }
}

#[tokio::test]
async fn http_source_decodes_live_snapshot() {
    ticketdash_lib::init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_body()))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpStatsSource::new(&server.uri(), Duration::from_secs(5)).expect("build source");
    let snapshot = source.fetch().await.expect("fetch snapshot");

    assert_eq!(snapshot.total_count, 42);
    assert_eq!(snapshot.status_stats["resolved"].count, 40);
    assert_eq!(snapshot.daily_stats.len(), 2);
}

#[tokio::test]
async fn http_source_reports_failures_instead_of_hiding_them() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = HttpStatsSource::new(&server.uri(), Duration::from_secs(5)).expect("build source");
    let result = source.fetch().await;
    assert!(matches!(result, Err(FetchError::Status(503))));
}

#[tokio::test]
async fn http_source_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(live_body())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let source = HttpStatsSource::new(&server.uri(), Duration::from_millis(200)).expect("build source");
    let result = source.fetch().await;
    assert!(matches!(result, Err(FetchError::Timeout(_))), "got {result:?}");
}

#[tokio::test]
async fn http_source_flags_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let source = HttpStatsSource::new(&server.uri(), Duration::from_secs(5)).expect("build source");
    assert!(matches!(source.fetch().await, Err(FetchError::Malformed(_))));
}

#[tokio::test]
async fn dashboard_falls_back_to_mock_data_when_endpoint_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(STATS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = HttpStatsSource::new(&server.uri(), Duration::from_secs(5)).expect("build source");
    let dashboard = Dashboard::new(Arc::new(source), DashboardSettings::default());
    assert_eq!(dashboard.view().status, DashboardStatus::Loading);

    let outcome = dashboard.refresh(RefreshTrigger::Initial).await;
    assert_eq!(outcome, RefreshOutcome::Completed(DashboardStatus::Ready));

    let view = dashboard.view();
    assert_eq!(view.origin, Some(DataOrigin::Fallback));
    assert_eq!(view.total_count, Some(101));

    let last = view.window.last().expect("window entry");
    assert_eq!(last.date.to_string(), "2025-09-16");
    assert_eq!(last.count, 20);
    assert_eq!(view.summary.peak, 20);
    assert_eq!(view.summary.average, 5.1);
}

#[tokio::test]
async fn dashboard_without_fallback_fails_then_recovers() {
    let source = Arc::new(ScriptedSource::new(vec![
        Err(FetchError::Status(502)),
        Ok(live_snapshot(7)),
    ]));
    let settings = DashboardSettings {
        use_fallback: false,
        ..DashboardSettings::default()
    };
    let dashboard = Dashboard::new(source, settings);

    dashboard.refresh(RefreshTrigger::Initial).await;
    let failed = dashboard.view();
    assert_eq!(failed.status, DashboardStatus::Failed);
    assert!(failed.error.expect("error text").contains("502"));

    dashboard.refresh(RefreshTrigger::Manual).await;
    let view = dashboard.view();
    assert_eq!(view.status, DashboardStatus::Ready);
    assert_eq!(view.origin, Some(DataOrigin::Live));
    assert_eq!(view.total_count, Some(7));
}

#[tokio::test]
async fn failed_refresh_keeps_previous_snapshot_with_warning() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(live_snapshot(11)),
        Err(FetchError::Timeout(Duration::from_secs(10))),
        Ok(live_snapshot(12)),
    ]));
    let dashboard = Dashboard::new(source, DashboardSettings::default());

    dashboard.refresh(RefreshTrigger::Initial).await;
    dashboard.refresh(RefreshTrigger::Timer).await;

    let stale = dashboard.view();
    assert_eq!(stale.status, DashboardStatus::Stale);
    assert_eq!(stale.total_count, Some(11));
    assert_eq!(stale.origin, Some(DataOrigin::Live));
    assert!(stale.warning.is_some());

    dashboard.refresh(RefreshTrigger::Manual).await;
    let fresh = dashboard.view();
    assert_eq!(fresh.status, DashboardStatus::Ready);
    assert_eq!(fresh.total_count, Some(12));
    assert!(fresh.warning.is_none());
}

#[tokio::test]
async fn manual_and_timer_refresh_never_overlap() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(live_snapshot(3))]).slow(Duration::from_millis(50)));
    let dashboard = Dashboard::new(source.clone(), DashboardSettings::default());

    let (manual, timer) = tokio::join!(
        dashboard.refresh(RefreshTrigger::Manual),
        dashboard.refresh(RefreshTrigger::Timer),
    );

    assert_eq!(manual, RefreshOutcome::Completed(DashboardStatus::Ready));
    assert_eq!(timer, RefreshOutcome::Skipped);
    assert_eq!(source.calls(), 1);
    assert!(!dashboard.is_refreshing());

    // the guard is released once the fetch completes
    let again = dashboard.refresh(RefreshTrigger::Manual).await;
    assert_eq!(again, RefreshOutcome::Completed(DashboardStatus::Ready));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn listener_sees_refreshing_then_settled_views() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let source = Arc::new(ScriptedSource::new(vec![Ok(live_snapshot(5))]));
    let dashboard = Dashboard::new(source, DashboardSettings::default()).with_listener(move |view| {
        sink.lock()
            .expect("sink lock")
            .push((view.status, view.refreshing));
    });

    dashboard.refresh(RefreshTrigger::Initial).await;

    let seen = seen.lock().expect("seen lock");
    assert_eq!(
        *seen,
        vec![
            (DashboardStatus::Loading, true),
            (DashboardStatus::Ready, false)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_ticks_until_stopped() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(live_snapshot(1))]));
    let settings = DashboardSettings {
        refresh_interval: Duration::from_secs(60),
        ..DashboardSettings::default()
    };
    let dashboard = Arc::new(Dashboard::new(source.clone(), settings));
    assert_eq!(dashboard.settings().refresh_interval, Duration::from_secs(60));

    dashboard.start_auto_refresh();
    assert!(dashboard.auto_refresh_running());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(source.calls(), 0);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(source.calls(), 1);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls(), 2);

    dashboard.stop_auto_refresh();
    assert!(!dashboard.auto_refresh_running());
    tokio::time::sleep(Duration::from_secs(300)).await;
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_dashboard_tears_down_timer() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(live_snapshot(1))]));
    let settings = DashboardSettings {
        refresh_interval: Duration::from_secs(60),
        ..DashboardSettings::default()
    };
    let dashboard = Arc::new(Dashboard::new(source.clone(), settings));
    dashboard.start_auto_refresh();

    drop(dashboard);
    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn chart_follows_current_snapshot_and_surface() {
    let source = Arc::new(ScriptedSource::new(vec![Err(FetchError::Unsuccessful)]));
    let dashboard = Dashboard::new(source, DashboardSettings::default());

    let before = dashboard.render_chart(800.0, 250.0);
    assert!(matches!(before, ChartRender::Empty { .. }));

    dashboard.refresh(RefreshTrigger::Initial).await;

    let chart = dashboard.render_chart(800.0, 250.0);
    let ChartRender::Bars(geometry) = &chart else {
        panic!("expected bars for fallback data");
    };
    assert_eq!(geometry.bars.len(), 10);
    assert_eq!(geometry.max_count, 20);
    assert_eq!(
        render_svg(&chart).expect("chart svg"),
        render_svg(&dashboard.render_chart(800.0, 250.0)).expect("chart svg")
    );

    let ChartRender::Bars(narrow) = dashboard.render_chart(400.0, 250.0) else {
        panic!("expected bars for fallback data");
    };
    assert_eq!(narrow.layout.width, 400.0);
    assert!(narrow.bars[0].width < geometry.bars[0].width);
}

#[test]
fn settings_overrides_file_is_layered_over_defaults() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let file = tmp.path().join("ticketdash.json");
    fs::write(&file, r#"{ "windowDays": 7, "locale": "ru-RU", "chart": { "height": 300 } }"#)
        .expect("write overrides");

    let overrides = read_overrides_file(&file).expect("read overrides");
    let settings = resolve_settings(Some(&overrides), &[]);

    assert_eq!(settings.window_days, 7);
    assert_eq!(settings.locale.tag(), "ru-RU");
    assert_eq!(settings.chart.height, 300.0);
    assert_eq!(settings.chart.width, 800.0);
}

#[test]
fn malformed_overrides_file_is_an_error() {
    let tmp = tempfile::tempdir().expect("create temp dir");
    let file = tmp.path().join("broken.json");
    fs::write(&file, "{ not json").expect("write overrides");

    let err = read_overrides_file(&file).expect_err("parse should fail");
    assert!(err.to_string().contains("not valid JSON"));
}

use crate::analysis::aggregate::{status_breakdown, summarize, windowed};
use crate::analysis::chart::render_chart;
use crate::commands::api::{FetchError, StatsSource};
use crate::commands::settings::DashboardSettings;
use crate::commands::timer::RefreshTimer;
use crate::models::chart::ChartRender;
use crate::models::dashboard::{DailySummary, DashboardState, DashboardStatus, DashboardView, LoadedSnapshot};
use crate::models::snapshot::{fallback_snapshot, DataOrigin, TicketStatsSnapshot};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub type ViewListener = Arc<dyn Fn(&DashboardView) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Initial,
    Manual,
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed(DashboardStatus),
    /// Another fetch was already in flight.
    Skipped,
}

/// Holds the current snapshot and drives fetches, one at a time.
pub struct Dashboard {
    source: Arc<dyn StatsSource>,
    settings: DashboardSettings,
    state: Mutex<DashboardState>,
    in_flight: AtomicBool,
    listener: Option<ViewListener>,
    timer: Mutex<RefreshTimer>,
}

impl Dashboard {
    pub fn new(source: Arc<dyn StatsSource>, settings: DashboardSettings) -> Self {
        let timer = RefreshTimer::new(settings.refresh_interval);
        Self {
            source,
            settings,
            state: Mutex::new(DashboardState::Loading),
            in_flight: AtomicBool::new(false),
            listener: None,
            timer: Mutex::new(timer),
        }
    }

    /// Called with a fresh view after every state change.
    pub fn with_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&DashboardView) + Send + Sync + 'static,
    {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn settings(&self) -> &DashboardSettings {
        &self.settings
    }

    pub fn state(&self) -> DashboardState {
        self.lock_state().clone()
    }

    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn view(&self) -> DashboardView {
        build_view(&self.lock_state(), self.is_refreshing(), self.settings.window_days)
    }

    /// Fetch once and apply the result. Returns `Skipped` without touching the
    /// source when a fetch is already outstanding.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshOutcome {
        let Some(guard) = InFlight::acquire(&self.in_flight) else {
            debug!("{trigger:?} refresh skipped, fetch already in flight");
            return RefreshOutcome::Skipped;
        };
        self.notify();

        let result = self.source.fetch().await;
        let status = {
            let mut state = self.lock_state();
            let next = next_state(&state, result, self.settings.use_fallback, Utc::now());
            *state = next;
            state.status()
        };
        drop(guard);

        info!("{trigger:?} refresh finished: {status:?}");
        self.notify();
        RefreshOutcome::Completed(status)
    }

    /// Chart for the current window, laid out on a `width` x `height` surface.
    pub fn render_chart(&self, width: f64, height: f64) -> ChartRender {
        let window = self
            .lock_state()
            .loaded()
            .map(|loaded| windowed(&loaded.snapshot.daily_stats, self.settings.window_days))
            .unwrap_or_default();
        let layout = self.settings.chart.with_size(width, height);
        render_chart(&layout, self.settings.locale, &window)
    }

    /// Start the periodic refresh. The timer only holds a weak reference, so
    /// dropping the last `Arc` tears it down.
    pub fn start_auto_refresh(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.lock_timer().start(weak);
    }

    pub fn stop_auto_refresh(&self) {
        self.lock_timer().stop();
    }

    pub fn auto_refresh_running(&self) -> bool {
        self.lock_timer().is_running()
    }

    fn notify(&self) {
        if let Some(listener) = &self.listener {
            listener(&self.view());
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_timer(&self) -> MutexGuard<'_, RefreshTimer> {
        self.timer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.lock_timer().stop();
    }
}

struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// State transition for one completed fetch.
pub fn next_state(
    current: &DashboardState,
    result: Result<TicketStatsSnapshot, FetchError>,
    use_fallback: bool,
    now: DateTime<Utc>,
) -> DashboardState {
    let error = match result {
        Ok(snapshot) => {
            return DashboardState::Ready(LoadedSnapshot {
                snapshot,
                origin: DataOrigin::Live,
                fetched_at: now,
            })
        }
        Err(error) => error,
    };

    match current {
        DashboardState::Ready(data) | DashboardState::ReadyWithStaleWarning { data, .. } => {
            warn!("refresh failed, keeping previous data: {error}");
            DashboardState::ReadyWithStaleWarning {
                data: data.clone(),
                warning: format!("Refresh failed, showing previous data: {error}"),
            }
        }
        DashboardState::Loading | DashboardState::Failed { .. } if use_fallback => {
            warn!("stats endpoint unavailable, using fallback data: {error}");
            DashboardState::Ready(LoadedSnapshot {
                snapshot: fallback_snapshot(),
                origin: DataOrigin::Fallback,
                fetched_at: now,
            })
        }
        DashboardState::Loading | DashboardState::Failed { .. } => DashboardState::Failed {
            error: error.to_string(),
        },
    }
}

pub fn build_view(state: &DashboardState, refreshing: bool, window_days: usize) -> DashboardView {
    let mut view = DashboardView {
        status: state.status(),
        refreshing,
        origin: None,
        total_count: None,
        status_rows: Vec::new(),
        window: Vec::new(),
        summary: DailySummary::default(),
        warning: None,
        error: None,
        last_updated: None,
    };

    if let Some(loaded) = state.loaded() {
        let window = windowed(&loaded.snapshot.daily_stats, window_days);
        view.origin = Some(loaded.origin);
        view.total_count = Some(loaded.snapshot.total_count);
        view.status_rows = status_breakdown(&loaded.snapshot);
        view.summary = summarize(&window);
        view.window = window;
        view.last_updated = Some(loaded.fetched_at);
    }

    match state {
        DashboardState::ReadyWithStaleWarning { warning, .. } => view.warning = Some(warning.clone()),
        DashboardState::Failed { error } => view.error = Some(error.clone()),
        DashboardState::Loading | DashboardState::Ready(_) => {}
    }

    view
}

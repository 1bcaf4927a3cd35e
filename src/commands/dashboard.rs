use crate::commands::resize::{ResizeDebouncer, SurfaceSize};
use crate::commands::shell::{Dashboard, RefreshOutcome, RefreshTrigger};
use crate::models::chart::ChartRender;
use crate::models::dashboard::DashboardView;
use std::sync::Arc;

/// Managed state shared by the dashboard commands.
pub struct DesktopState {
    pub dashboard: Arc<Dashboard>,
    pub resize: ResizeDebouncer,
}

#[tauri::command]
pub async fn get_dashboard(state: tauri::State<'_, DesktopState>) -> Result<DashboardView, String> {
    Ok(state.dashboard.view())
}

#[tauri::command]
pub async fn refresh_dashboard(state: tauri::State<'_, DesktopState>) -> Result<DashboardView, String> {
    let dashboard = state.dashboard.clone();
    match dashboard.refresh(RefreshTrigger::Manual).await {
        RefreshOutcome::Completed(_) => Ok(dashboard.view()),
        RefreshOutcome::Skipped => Err("REFRESH_IN_PROGRESS: a refresh is already running".to_string()),
    }
}

#[tauri::command]
pub async fn render_chart(
    width: f64,
    height: f64,
    state: tauri::State<'_, DesktopState>,
) -> Result<ChartRender, String> {
    let size = SurfaceSize::checked(width, height)?;
    Ok(state.dashboard.render_chart(size.width, size.height))
}

#[tauri::command]
pub async fn notify_resize(
    width: f64,
    height: f64,
    state: tauri::State<'_, DesktopState>,
) -> Result<(), String> {
    let size = SurfaceSize::checked(width, height)?;
    state.resize.notify(size.width, size.height);
    Ok(())
}

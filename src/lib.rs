pub mod analysis;
pub mod commands;
pub mod models;

/// Install the `env_logger` backend, honouring `RUST_LOG` and defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

#[cfg(feature = "desktop")]
#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    use commands::{
        api::HttpStatsSource,
        dashboard::{get_dashboard, notify_resize, refresh_dashboard, render_chart, DesktopState},
        resize::ResizeDebouncer,
        settings::{load_settings, DashboardSettings},
        shell::{Dashboard, RefreshTrigger},
    };
    use std::sync::Arc;
    use tauri::{Emitter, Manager};

    init_logging();

    let settings = load_settings().unwrap_or_else(|e| {
        log::error!("{e}; continuing with default settings");
        DashboardSettings::default()
    });

    tauri::Builder::default()
        .setup(move |app| {
            let source = HttpStatsSource::from_settings(&settings)?;
            let view_handle = app.handle().clone();
            let dashboard = Arc::new(
                Dashboard::new(Arc::new(source), settings.clone()).with_listener(move |view| {
                    let _ = view_handle.emit("dashboard_updated", view);
                }),
            );

            let resize_handle = app.handle().clone();
            let weak = Arc::downgrade(&dashboard);
            let debounce = settings.resize_debounce;
            let resize = tauri::async_runtime::block_on(async move {
                ResizeDebouncer::spawn(debounce, move |size| {
                    if let Some(dashboard) = weak.upgrade() {
                        let chart = dashboard.render_chart(size.width, size.height);
                        let _ = resize_handle.emit("chart_resized", chart);
                    }
                })
            });

            let initial = dashboard.clone();
            tauri::async_runtime::spawn(async move {
                initial.refresh(RefreshTrigger::Initial).await;
                initial.start_auto_refresh();
            });

            app.manage(DesktopState { dashboard, resize });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            get_dashboard,
            refresh_dashboard,
            render_chart,
            notify_resize,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

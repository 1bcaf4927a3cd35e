use crate::commands::shell::{Dashboard, RefreshTrigger};
use log::{debug, info};
use std::sync::Weak;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Periodic refresh task with an explicit start/stop lifecycle.
#[derive(Debug)]
pub struct RefreshTimer {
    period: Duration,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    pub fn new(period: Duration) -> Self {
        Self { period, handle: None }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Spawn the tick loop on the current tokio runtime. The first tick fires
    /// one full period after start. Calling `start` while running is a no-op.
    pub fn start(&mut self, dashboard: Weak<Dashboard>) {
        if self.is_running() {
            return;
        }

        let period = self.period;
        info!("auto refresh every {}s", period.as_secs());
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;
                let Some(dashboard) = dashboard.upgrade() else {
                    debug!("dashboard dropped, auto refresh exiting");
                    break;
                };
                dashboard.refresh(RefreshTrigger::Timer).await;
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("auto refresh stopped");
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

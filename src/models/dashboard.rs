use crate::models::snapshot::{DailyStat, DataOrigin, TicketStatsSnapshot};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DailySummary {
    pub days: usize,
    pub average: f64,
    pub peak: u64,
    pub peak_date: Option<NaiveDate>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Danger,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRow {
    pub status: String,
    pub count: u64,
    pub percentage: f64,
    pub tone: Tone,
}

/// Snapshot currently held by the dashboard together with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSnapshot {
    pub snapshot: TicketStatsSnapshot,
    pub origin: DataOrigin,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Loading,
    Ready(LoadedSnapshot),
    ReadyWithStaleWarning { data: LoadedSnapshot, warning: String },
    Failed { error: String },
}

impl DashboardState {
    pub fn loaded(&self) -> Option<&LoadedSnapshot> {
        match self {
            DashboardState::Ready(data) | DashboardState::ReadyWithStaleWarning { data, .. } => Some(data),
            DashboardState::Loading | DashboardState::Failed { .. } => None,
        }
    }

    pub fn status(&self) -> DashboardStatus {
        match self {
            DashboardState::Loading => DashboardStatus::Loading,
            DashboardState::Ready(_) => DashboardStatus::Ready,
            DashboardState::ReadyWithStaleWarning { .. } => DashboardStatus::Stale,
            DashboardState::Failed { .. } => DashboardStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardStatus {
    Loading,
    Ready,
    Stale,
    Failed,
}

/// Serializable projection of the dashboard handed to the webview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub status: DashboardStatus,
    pub refreshing: bool,
    pub origin: Option<DataOrigin>,
    pub total_count: Option<u64>,
    pub status_rows: Vec<StatusRow>,
    pub window: Vec<DailyStat>,
    pub summary: DailySummary,
    pub warning: Option<String>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

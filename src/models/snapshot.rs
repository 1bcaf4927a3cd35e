use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusStat {
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStat {
    pub date: NaiveDate,
    pub count: u64,
}

impl DailyStat {
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self { date, count }
    }
}

/// One fetched instance of aggregate ticket statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketStatsSnapshot {
    pub total_count: u64,
    #[serde(default)]
    pub status_stats: BTreeMap<String, StatusStat>, // "active" | "resolved" | "escalated" | ...
    #[serde(default)]
    pub daily_stats: Vec<DailyStat>,
}

/// Response body of the stats endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsEnvelope {
    pub success: bool,
    pub data: Option<TicketStatsSnapshot>,
}

/// Where the snapshot the dashboard is showing came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataOrigin {
    Live,
    Fallback,
}

/// Hardcoded snapshot shown when the live endpoint is unavailable.
pub fn fallback_snapshot() -> TicketStatsSnapshot {
    const DAILY: [(i32, u32, u32, u64); 24] = [
        (2025, 7, 6, 6),
        (2025, 7, 7, 5),
        (2025, 7, 16, 2),
        (2025, 7, 17, 1),
        (2025, 8, 12, 3),
        (2025, 8, 13, 8),
        (2025, 8, 14, 6),
        (2025, 8, 15, 1),
        (2025, 8, 16, 1),
        (2025, 8, 17, 2),
        (2025, 8, 18, 4),
        (2025, 8, 19, 5),
        (2025, 8, 20, 1),
        (2025, 8, 22, 5),
        (2025, 8, 23, 10),
        (2025, 8, 24, 7),
        (2025, 8, 25, 1),
        (2025, 8, 26, 3),
        (2025, 9, 3, 1),
        (2025, 9, 4, 1),
        (2025, 9, 10, 1),
        (2025, 9, 11, 2),
        (2025, 9, 12, 5),
        (2025, 9, 16, 20),
    ];

    let daily_stats = DAILY
        .iter()
        .filter_map(|&(y, m, d, count)| NaiveDate::from_ymd_opt(y, m, d).map(|date| DailyStat::new(date, count)))
        .collect();

    let mut status_stats = BTreeMap::new();
    status_stats.insert("active".to_string(), StatusStat { count: 88, percentage: 87.1 });
    status_stats.insert("escalated".to_string(), StatusStat { count: 13, percentage: 12.9 });

    TicketStatsSnapshot {
        total_count: 101,
        status_stats,
        daily_stats,
    }
}

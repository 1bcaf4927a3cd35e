use crate::models::dashboard::{DailySummary, StatusRow, Tone};
use crate::models::snapshot::{DailyStat, TicketStatsSnapshot};

/// Status keys shown as the "healthy" card, in lookup order.
pub const PRIMARY_STATUSES: [&str; 2] = ["active", "resolved"];
pub const ESCALATED_STATUS: &str = "escalated";

/// Sum of daily counts.
pub fn total(stats: &[DailyStat]) -> u64 {
    stats.iter().map(|s| s.count).sum()
}

/// Mean count per day rounded to one decimal; 0.0 for an empty slice.
pub fn average(stats: &[DailyStat]) -> f64 {
    if stats.is_empty() {
        return 0.0;
    }
    let mean = total(stats) as f64 / stats.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Highest daily count; 0 for an empty slice.
pub fn peak(stats: &[DailyStat]) -> u64 {
    stats.iter().map(|s| s.count).max().unwrap_or(0)
}

/// The `n` most recently dated entries, ascending by date.
///
/// Entries sharing a date keep their input order.
pub fn windowed(stats: &[DailyStat], n: usize) -> Vec<DailyStat> {
    let mut sorted = stats.to_vec();
    sorted.sort_by_key(|s| s.date);
    let skip = sorted.len().saturating_sub(n);
    sorted.split_off(skip)
}

pub fn summarize(stats: &[DailyStat]) -> DailySummary {
    let peak_value = peak(stats);
    let peak_date = stats
        .iter()
        .find(|s| s.count == peak_value)
        .map(|s| s.date);

    DailySummary {
        days: stats.len(),
        average: average(stats),
        peak: peak_value,
        peak_date,
        total: total(stats),
    }
}

/// Status cards in display order: primary, escalated, then the rest by name.
/// Counts and percentages are passed through as received.
pub fn status_breakdown(snapshot: &TicketStatsSnapshot) -> Vec<StatusRow> {
    let mut rows: Vec<StatusRow> = snapshot
        .status_stats
        .iter()
        .map(|(name, stat)| StatusRow {
            status: name.clone(),
            count: stat.count,
            percentage: stat.percentage,
            tone: tone_for(name),
        })
        .collect();

    rows.sort_by_key(|row| (display_rank(&row.status), row.status.clone()));
    rows
}

fn tone_for(status: &str) -> Tone {
    if PRIMARY_STATUSES.contains(&status) {
        Tone::Success
    } else if status == ESCALATED_STATUS {
        Tone::Danger
    } else {
        Tone::Neutral
    }
}

fn display_rank(status: &str) -> usize {
    match PRIMARY_STATUSES.iter().position(|s| *s == status) {
        Some(index) => index,
        None if status == ESCALATED_STATUS => PRIMARY_STATUSES.len(),
        None => PRIMARY_STATUSES.len() + 1,
    }
}

use crate::analysis::aggregate::{peak, windowed};
use crate::analysis::locale::ChartLocale;
use crate::models::chart::{BarGeometry, ChartGeometry, ChartLayout, ChartRender, GridLine, Label, TextAnchor};
use crate::models::snapshot::DailyStat;

/// Empty headroom above the tallest bar, in count units.
pub const HEADROOM: u64 = 2;
/// Target number of y-axis intervals.
pub const GRID_DIVISIONS: u64 = 5;

pub const EMPTY_MESSAGE: &str = "No data to display";

const VALUE_LABEL_OFFSET: f64 = 5.0;
const DATE_LABEL_OFFSET: f64 = 20.0;
const AXIS_LABEL_INSET: f64 = 10.0;
const AXIS_LABEL_BASELINE: f64 = 3.0;

/// Lay out the daily bar chart on the given surface.
///
/// Entries are sorted by date before layout; the caller decides the window.
/// Nothing is cached, every call derives the geometry from `layout` alone.
pub fn render_chart(layout: &ChartLayout, locale: ChartLocale, stats: &[DailyStat]) -> ChartRender {
    if stats.is_empty() {
        return ChartRender::Empty {
            layout: *layout,
            message: EMPTY_MESSAGE.to_string(),
        };
    }

    let days = windowed(stats, stats.len());
    let max_count = peak(&days);
    let headroom = max_count.saturating_add(HEADROOM);
    let grid_step = grid_step(max_count);

    let chart_width = (layout.width - 2.0 * layout.padding).max(0.0);
    let chart_height = (layout.height - 2.0 * layout.padding).max(0.0);
    let scale = chart_height / headroom as f64;
    let baseline = layout.height - layout.padding;

    let slot = chart_width / days.len() as f64;
    let bar_width = (slot - layout.bar_gap).min(layout.max_bar_width).max(0.0);
    let pitch = (bar_width + layout.bar_gap).min(slot);
    let group_width = pitch * days.len() as f64;
    let offset = ((chart_width - group_width) / 2.0).max(0.0);

    let bars = days
        .iter()
        .enumerate()
        .map(|(index, day)| {
            let x = layout.padding + offset + index as f64 * pitch + (pitch - bar_width) / 2.0;
            let height = day.count as f64 * scale;
            let y = baseline - height;
            let center = x + bar_width / 2.0;

            BarGeometry {
                date: day.date,
                count: day.count,
                x,
                y,
                width: bar_width,
                height,
                value_label: Label {
                    x: center,
                    y: y - VALUE_LABEL_OFFSET,
                    text: day.count.to_string(),
                    anchor: TextAnchor::Middle,
                },
                date_label: Label {
                    x: center,
                    y: baseline + DATE_LABEL_OFFSET,
                    text: locale.short_date(day.date),
                    anchor: TextAnchor::Middle,
                },
            }
        })
        .collect();

    let x_end = (layout.width - layout.padding).max(layout.padding);
    let grid = (0..=headroom)
        .step_by(grid_step as usize)
        .map(|value| {
            let y = baseline - value as f64 * scale;
            GridLine {
                value,
                y,
                x_start: layout.padding,
                x_end,
                label: Label {
                    x: layout.padding - AXIS_LABEL_INSET,
                    y: y + AXIS_LABEL_BASELINE,
                    text: value.to_string(),
                    anchor: TextAnchor::End,
                },
            }
        })
        .collect();

    ChartRender::Bars(ChartGeometry {
        layout: *layout,
        max_count,
        scale,
        grid_step,
        bars,
        grid,
    })
}

/// Y-axis step: `ceil((max_count + 2) / 5)`, never below 1.
pub fn grid_step(max_count: u64) -> u64 {
    let headroom = max_count.saturating_add(HEADROOM);
    headroom.div_ceil(GRID_DIVISIONS).max(1)
}

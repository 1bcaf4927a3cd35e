use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Drawing surface and bar sizing for the daily chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartLayout {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub max_bar_width: f64,
    pub bar_gap: f64,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 250.0,
            padding: 40.0,
            max_bar_width: 40.0,
            bar_gap: 10.0,
        }
    }
}

impl ChartLayout {
    pub fn with_size(self, width: f64, height: f64) -> Self {
        Self { width, height, ..self }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub anchor: TextAnchor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarGeometry {
    pub date: NaiveDate,
    pub count: u64,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub value_label: Label,
    pub date_label: Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub value: u64,
    pub y: f64,
    pub x_start: f64,
    pub x_end: f64,
    pub label: Label,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    pub layout: ChartLayout,
    pub max_count: u64,
    pub scale: f64,
    pub grid_step: u64,
    pub bars: Vec<BarGeometry>,
    pub grid: Vec<GridLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartRender {
    Empty { layout: ChartLayout, message: String },
    Bars(ChartGeometry),
}

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const RU_MONTHS: [&str; 12] = [
    "янв.", "февр.", "мар.", "апр.", "мая", "июн.", "июл.", "авг.", "сент.", "окт.", "нояб.", "дек.",
];

/// Locales supported for chart date labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartLocale {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "ru-RU")]
    RuRu,
}

impl ChartLocale {
    pub const ALL: [&'static str; 2] = ["en-US", "ru-RU"];

    /// Unknown tags resolve to `en-US`.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ru-RU" | "ru" => ChartLocale::RuRu,
            _ => ChartLocale::EnUs,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ChartLocale::EnUs => "en-US",
            ChartLocale::RuRu => "ru-RU",
        }
    }

    /// Short month + day, e.g. "Sep 16" or "16 сент.".
    pub fn short_date(self, date: NaiveDate) -> String {
        let month = date.month0() as usize;
        match self {
            ChartLocale::EnUs => format!("{} {}", EN_MONTHS[month], date.day()),
            ChartLocale::RuRu => format!("{} {}", date.day(), RU_MONTHS[month]),
        }
    }
}

use crate::analysis::locale::ChartLocale;
use crate::models::chart::ChartLayout;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "https://agent.pointai.tech";

pub const ENV_CONFIG_PATH: &str = "TICKETDASH_CONFIG";
pub const ENV_API_BASE_URL: &str = "TICKETDASH_API_BASE_URL";
pub const ENV_REFRESH_SECS: &str = "TICKETDASH_REFRESH_SECS";
pub const ENV_LOCALE: &str = "TICKETDASH_LOCALE";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("settings file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Typed view of the sanitized settings document.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSettings {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub refresh_interval: Duration,
    pub window_days: usize,
    pub locale: ChartLocale,
    pub use_fallback: bool,
    pub chart: ChartLayout,
    pub resize_debounce: Duration,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        settings_from_value(&normalize_settings(json!({})))
    }
}

/// Defaults, then the optional overrides file, then environment variables.
pub fn load_settings() -> Result<DashboardSettings, SettingsError> {
    let file = match std::env::var_os(ENV_CONFIG_PATH) {
        Some(path) => Some(read_overrides_file(Path::new(&path))?),
        None => None,
    };
    let env: Vec<(String, String)> = [ENV_API_BASE_URL, ENV_REFRESH_SECS, ENV_LOCALE]
        .iter()
        .filter_map(|key| std::env::var(key).ok().map(|value| (key.to_string(), value)))
        .collect();

    Ok(resolve_settings(file.as_ref(), &env))
}

/// Layer `file` and `env` overrides over the defaults and sanitize the result.
pub fn resolve_settings(file: Option<&Value>, env: &[(String, String)]) -> DashboardSettings {
    let mut merged = default_settings();
    if let Some(overrides) = file {
        merge_settings(&mut merged, overrides);
    }
    apply_env_overrides(&mut merged, env);

    settings_from_value(&normalize_settings(merged))
}

pub fn read_overrides_file(path: &Path) -> Result<Value, SettingsError> {
    let raw = fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str::<Value>(&raw).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(settings: &mut Value, env: &[(String, String)]) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    for (key, value) in env {
        match key.as_str() {
            ENV_API_BASE_URL if !value.trim().is_empty() => {
                obj.insert("apiBaseUrl".to_string(), json!(value.trim()));
            }
            ENV_REFRESH_SECS => {
                if let Ok(secs) = value.trim().parse::<u64>() {
                    obj.insert("refreshIntervalSecs".to_string(), json!(secs));
                }
            }
            ENV_LOCALE => {
                obj.insert("locale".to_string(), json!(value.trim()));
            }
            _ => {}
        }
    }
}

fn settings_from_value(settings: &Value) -> DashboardSettings {
    let u64_of = |key: &str, default: u64| settings.get(key).and_then(Value::as_u64).unwrap_or(default);
    let chart = settings.get("chart").cloned().unwrap_or_else(|| json!({}));
    let f64_of = |key: &str, default: f64| chart.get(key).and_then(Value::as_f64).unwrap_or(default);
    let defaults = ChartLayout::default();

    DashboardSettings {
        api_base_url: settings
            .get("apiBaseUrl")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_API_BASE_URL)
            .to_string(),
        request_timeout: Duration::from_secs(u64_of("requestTimeoutSecs", 10)),
        refresh_interval: Duration::from_secs(u64_of("refreshIntervalSecs", 300)),
        window_days: u64_of("windowDays", 10) as usize,
        locale: ChartLocale::from_tag(settings.get("locale").and_then(Value::as_str).unwrap_or("en-US")),
        use_fallback: settings.get("useFallback").and_then(Value::as_bool).unwrap_or(true),
        chart: ChartLayout {
            width: f64_of("width", defaults.width),
            height: f64_of("height", defaults.height),
            padding: f64_of("padding", defaults.padding),
            max_bar_width: f64_of("maxBarWidth", defaults.max_bar_width),
            bar_gap: f64_of("barGap", defaults.bar_gap),
        },
        resize_debounce: Duration::from_millis(u64_of("resizeDebounceMs", 250)),
    }
}

fn normalize_settings(input: Value) -> Value {
    let defaults = default_settings();
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };

    deep_merge_defaults(&mut out, &defaults);
    sanitize_settings(&mut out);
    out
}

fn default_settings() -> Value {
    let chart = ChartLayout::default();
    json!({
        "apiBaseUrl": DEFAULT_API_BASE_URL,
        "requestTimeoutSecs": 10,
        "refreshIntervalSecs": 300,
        "windowDays": 10,
        "locale": "en-US",
        "useFallback": true,
        "resizeDebounceMs": 250,
        "chart": {
            "width": chart.width,
            "height": chart.height,
            "padding": chart.padding,
            "maxBarWidth": chart.max_bar_width,
            "barGap": chart.bar_gap
        }
    })
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn merge_settings(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target_obj), Value::Object(incoming_obj)) => {
            for (key, value) in incoming_obj {
                if let Some(existing) = target_obj.get_mut(key) {
                    merge_settings(existing, value);
                } else {
                    target_obj.insert(key.clone(), value.clone());
                }
            }
        }
        (target_slot, incoming_value) => {
            *target_slot = incoming_value.clone();
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    clamp_u64(obj, "requestTimeoutSecs", 1, 60, 10);
    clamp_u64(obj, "refreshIntervalSecs", 10, 3600, 300);
    clamp_u64(obj, "windowDays", 1, 60, 10);
    clamp_u64(obj, "resizeDebounceMs", 0, 5000, 250);

    sanitize_enum(obj, "locale", &ChartLocale::ALL, "en-US");
    ensure_bool(obj, "useFallback", true);

    let base_url = obj
        .get("apiBaseUrl")
        .and_then(Value::as_str)
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| url.starts_with("http://") || url.starts_with("https://"))
        .unwrap_or(DEFAULT_API_BASE_URL)
        .to_string();
    obj.insert("apiBaseUrl".to_string(), json!(base_url));

    let defaults = ChartLayout::default();
    let chart = obj.entry("chart".to_string()).or_insert_with(|| json!({}));
    if !chart.is_object() {
        *chart = json!({});
    }
    if let Some(chart_obj) = chart.as_object_mut() {
        clamp_f64(chart_obj, "width", 1.0, 10_000.0, defaults.width);
        clamp_f64(chart_obj, "height", 1.0, 10_000.0, defaults.height);
        clamp_f64(chart_obj, "padding", 0.0, 200.0, defaults.padding);
        clamp_f64(chart_obj, "maxBarWidth", 1.0, 1_000.0, defaults.max_bar_width);
        clamp_f64(chart_obj, "barGap", 0.0, 200.0, defaults.bar_gap);
    }
}

fn clamp_u64(map: &mut Map<String, Value>, key: &str, min: u64, max: u64, default: u64) {
    let raw = map.get(key).and_then(Value::as_u64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn clamp_f64(map: &mut Map<String, Value>, key: &str, min: f64, max: f64, default: f64) {
    let raw = map
        .get(key)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn sanitize_enum(map: &mut Map<String, Value>, key: &str, allowed: &[&str], default: &str) {
    let valid = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| allowed.contains(value))
        .unwrap_or(default);
    map.insert(key.to_string(), json!(valid));
}

fn ensure_bool(map: &mut Map<String, Value>, key: &str, default: bool) {
    let value = map.get(key).and_then(Value::as_bool).unwrap_or(default);
    map.insert(key.to_string(), json!(value));
}

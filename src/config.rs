use std::path::PathBuf;

pub const DATA_PATH_VAR: &str = "SALES_DASHBOARD_DATA";
pub const MODEL_PATH_VAR: &str = "SALES_DASHBOARD_MODEL";

const DEFAULT_DATA_PATH: &str = "data/data_dummy_retail_store.csv";
const DEFAULT_MODEL_PATH: &str = "models/model_sales.json";

/// Where the dashboard reads its inputs from at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
}

impl DashboardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve paths through `lookup`, falling back to the defaults for
    /// unset or blank variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let resolve = |key: &str, default: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from(default), PathBuf::from)
        };
        Self {
            data_path: resolve(DATA_PATH_VAR, DEFAULT_DATA_PATH),
            model_path: resolve(MODEL_PATH_VAR, DEFAULT_MODEL_PATH),
        }
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::DatasetCategory;
use crate::error::DataError;

pub const DEFAULT_LEGACY_BASE_URL: &str = "https://data.cityofchicago.org/resource/";

pub const API_KEY_VAR: &str = "CHICAGO_DATA_API_KEY";
pub const BASE_URL_VAR: &str = "CHICAGO_DATA_BASE_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortalConfig {
    pub app_token: Option<String>,
    pub legacy_base_url: String,
    pub legacy_datasets: BTreeMap<DatasetCategory, String>,
    pub current_endpoints: BTreeMap<DatasetCategory, String>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        let current_endpoints = DatasetCategory::ALL
            .into_iter()
            .map(|category| (category, default_current_endpoint(category).to_string()))
            .collect();
        Self {
            app_token: None,
            legacy_base_url: DEFAULT_LEGACY_BASE_URL.to_string(),
            legacy_datasets: BTreeMap::new(),
            current_endpoints,
        }
    }
}

impl PortalConfig {
    pub fn empty() -> Self {
        Self {
            app_token: None,
            legacy_base_url: DEFAULT_LEGACY_BASE_URL.to_string(),
            legacy_datasets: BTreeMap::new(),
            current_endpoints: BTreeMap::new(),
        }
    }
}

pub fn default_current_endpoint(category: DatasetCategory) -> &'static str {
    match category {
        DatasetCategory::Housing => {
            "https://data.cityofchicago.org/api/v3/views/s6ha-ppgi/query.json"
        }
        DatasetCategory::Crime => {
            "https://data.cityofchicago.org/api/v3/views/ijzp-q8t2/query.json"
        }
        DatasetCategory::Calls311 => {
            "https://data.cityofchicago.org/api/v3/views/v6vf-nfxy/query.json"
        }
    }
}

pub fn default_legacy_dataset(category: DatasetCategory) -> &'static str {
    match category {
        DatasetCategory::Housing => "s6ha-ppgi",
        DatasetCategory::Crime => "ijzp-q8t2",
        DatasetCategory::Calls311 => "v6vf-nfxy",
    }
}

pub fn legacy_dataset_var(category: DatasetCategory) -> &'static str {
    match category {
        DatasetCategory::Housing => "AFFORDABLE_HOUSING_DATASET_ID",
        DatasetCategory::Crime => "CRIME_DATASET_ID",
        DatasetCategory::Calls311 => "CALLS_311_DATASET_ID",
    }
}

pub fn current_endpoint_var(category: DatasetCategory) -> &'static str {
    match category {
        DatasetCategory::Housing => "AFFORDABLE_HOUSING_API_URL",
        DatasetCategory::Crime => "CRIME_API_URL",
        DatasetCategory::Calls311 => "CALLS_311_API_URL",
    }
}

// An empty string disables the corresponding endpoint.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub app_token: Option<String>,
    #[serde(default)]
    pub legacy_base_url: Option<String>,
    #[serde(default)]
    pub legacy_datasets: BTreeMap<DatasetCategory, String>,
    #[serde(default)]
    pub current_endpoints: BTreeMap<DatasetCategory, String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    pub fn resolve(path: Option<&str>) -> Result<PortalConfig, DataError> {
        let base = Self::from_env();
        let Some(path) = path else {
            return Ok(base);
        };
        let config_path = PathBuf::from(path);
        let content = fs::read_to_string(&config_path)
            .map_err(|_| DataError::ConfigRead(config_path.clone()))?;
        let file: ConfigFile = serde_json::from_str(&content)
            .map_err(|err| DataError::ConfigParse(err.to_string()))?;
        Ok(Self::apply_file(base, file))
    }

    pub fn from_env() -> PortalConfig {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> PortalConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = PortalConfig::empty();
        config.app_token = read(API_KEY_VAR);
        if let Some(base_url) = read(BASE_URL_VAR) {
            config.legacy_base_url = base_url;
        }
        for category in DatasetCategory::ALL {
            if let Some(dataset_id) = read(legacy_dataset_var(category)) {
                config.legacy_datasets.insert(category, dataset_id);
            }
            let endpoint = read(current_endpoint_var(category))
                .unwrap_or_else(|| default_current_endpoint(category).to_string());
            config.current_endpoints.insert(category, endpoint);
        }
        config
    }

    pub fn apply_file(mut config: PortalConfig, file: ConfigFile) -> PortalConfig {
        if let Some(token) = file.app_token {
            let token = token.trim().to_string();
            config.app_token = (!token.is_empty()).then_some(token);
        }
        if let Some(base_url) = file.legacy_base_url {
            config.legacy_base_url = base_url;
        }
        overlay(&mut config.legacy_datasets, file.legacy_datasets);
        overlay(&mut config.current_endpoints, file.current_endpoints);
        config
    }
}

fn overlay(
    target: &mut BTreeMap<DatasetCategory, String>,
    source: BTreeMap<DatasetCategory, String>,
) {
    for (category, value) in source {
        let value = value.trim().to_string();
        if value.is_empty() {
            target.remove(&category);
        } else {
            target.insert(category, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn env_defaults() {
        let config = ConfigLoader::from_lookup(lookup_from(&[]));
        assert_eq!(config, PortalConfig::default());
        assert!(config.legacy_datasets.is_empty());
        assert_eq!(
            config.current_endpoints[&DatasetCategory::Crime],
            default_current_endpoint(DatasetCategory::Crime)
        );
    }

    #[test]
    fn env_blank_values_are_unset() {
        let config = ConfigLoader::from_lookup(lookup_from(&[
            (API_KEY_VAR, "  "),
            ("CRIME_DATASET_ID", ""),
            ("AFFORDABLE_HOUSING_DATASET_ID", "s6ha-ppgi"),
        ]));
        assert_eq!(config.app_token, None);
        assert!(!config.legacy_datasets.contains_key(&DatasetCategory::Crime));
        assert_eq!(
            config.legacy_datasets[&DatasetCategory::Housing],
            "s6ha-ppgi"
        );
    }

    #[test]
    fn file_overlay_disables_endpoint() {
        let file: ConfigFile = serde_json::from_str(
            r#"{
                "app_token": "tok",
                "legacy_datasets": {"housing": "s6ha-ppgi"},
                "current_endpoints": {"housing": ""}
            }"#,
        )
        .unwrap();
        let config = ConfigLoader::apply_file(PortalConfig::default(), file);
        assert_eq!(config.app_token.as_deref(), Some("tok"));
        assert!(
            !config
                .current_endpoints
                .contains_key(&DatasetCategory::Housing)
        );
        assert!(config.current_endpoints.contains_key(&DatasetCategory::Crime));
        assert_eq!(config.legacy_base_url, DEFAULT_LEGACY_BASE_URL);
    }
}

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{PortalConfig, default_legacy_dataset};
use crate::domain::{DatasetCategory, FetchRequest};
use crate::error::DataError;
use crate::table::{Table, UpstreamBody};
use crate::transport::{PortalRequest, Transport};

pub const APP_TOKEN_HEADER: &str = "X-App-Token";
pub const APP_TOKEN_PARAM: &str = "$$app_token";

pub trait DatasetSource: Send + Sync {
    fn fetch(&self, request: &FetchRequest) -> Result<Table, DataError>;

    fn fetch_resource(&self, request: &FetchRequest) -> Result<Table, DataError> {
        self.fetch(request)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "path", rename_all = "lowercase")]
pub enum Endpoint {
    Current { url: String },
    Legacy { url: String, dataset_id: String },
}

impl Endpoint {
    pub fn url(&self) -> &str {
        match self {
            Endpoint::Current { url } | Endpoint::Legacy { url, .. } => url,
        }
    }
}

#[derive(Clone)]
pub struct PortalClient<T: Transport> {
    config: PortalConfig,
    transport: T,
}

impl<T: Transport> PortalClient<T> {
    pub fn new(config: PortalConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn resolve(&self, category: DatasetCategory) -> Result<Endpoint, DataError> {
        if let Some(url) = self.config.current_endpoints.get(&category) {
            return Ok(Endpoint::Current { url: url.clone() });
        }
        if let Some(dataset_id) = self.config.legacy_datasets.get(&category) {
            return Ok(self.legacy_endpoint(dataset_id));
        }
        Err(DataError::UnknownCategory(category.to_string()))
    }

    // Always the resource endpoint, falling back to the built-in dataset id.
    pub fn resolve_resource(&self, category: DatasetCategory) -> Endpoint {
        let dataset_id = self
            .config
            .legacy_datasets
            .get(&category)
            .map(String::as_str)
            .unwrap_or_else(|| default_legacy_dataset(category));
        self.legacy_endpoint(dataset_id)
    }

    fn legacy_endpoint(&self, dataset_id: &str) -> Endpoint {
        Endpoint::Legacy {
            url: format!("{}{}.json", self.config.legacy_base_url, dataset_id),
            dataset_id: dataset_id.to_string(),
        }
    }

    pub fn plan(&self, request: &FetchRequest) -> Result<PortalRequest, DataError> {
        let endpoint = self.resolve(request.category)?;
        Ok(self.plan_for(&endpoint, request))
    }

    pub fn plan_for(&self, endpoint: &Endpoint, request: &FetchRequest) -> PortalRequest {
        let mut query = QueryParams::default();
        let mut headers = Vec::new();
        match endpoint {
            Endpoint::Current { .. } => {
                query.set("limit", request.limit.to_string());
                if let Some(token) = &self.config.app_token {
                    headers.push((APP_TOKEN_HEADER.to_string(), token.clone()));
                }
            }
            Endpoint::Legacy { .. } => {
                query.set("$limit", request.limit.to_string());
                if let Some(token) = &self.config.app_token {
                    query.set(APP_TOKEN_PARAM, token.clone());
                }
            }
        }
        query.merge(&request.filters);

        PortalRequest {
            url: endpoint.url().to_string(),
            query: query.into_pairs(),
            headers,
        }
    }

    pub fn fetch_named(
        &self,
        category: &str,
        filters: BTreeMap<String, Value>,
        limit: u32,
    ) -> Result<Table, DataError> {
        let request = FetchRequest {
            category: category.parse()?,
            filters,
            limit,
        };
        self.fetch(&request)
    }

    fn execute(&self, endpoint: &Endpoint, request: &FetchRequest) -> Result<Table, DataError> {
        let planned = self.plan_for(endpoint, request);
        debug!(
            category = %request.category,
            url = %planned.url,
            params = planned.query.len(),
            "requesting dataset"
        );

        let response = self.transport.get(&planned)?;
        if !(200..300).contains(&response.status) {
            let message = if response.body.trim().is_empty() {
                "upstream request failed".to_string()
            } else {
                response.body
            };
            return Err(DataError::UpstreamStatus {
                status: response.status,
                message,
            });
        }

        let value: Value = serde_json::from_str(&response.body)
            .map_err(|err| DataError::UpstreamRequest(format!("invalid JSON body: {err}")))?;
        let body = match endpoint {
            Endpoint::Current { .. } => UpstreamBody::classify(value)?,
            Endpoint::Legacy { .. } => UpstreamBody::rows(value),
        };
        let table = body.into_table()?;
        info!(category = %request.category, rows = table.len(), "dataset fetched");
        Ok(table)
    }
}

impl<T: Transport> DatasetSource for PortalClient<T> {
    fn fetch(&self, request: &FetchRequest) -> Result<Table, DataError> {
        let endpoint = self.resolve(request.category)?;
        self.execute(&endpoint, request)
    }

    fn fetch_resource(&self, request: &FetchRequest) -> Result<Table, DataError> {
        let endpoint = self.resolve_resource(request.category);
        self.execute(&endpoint, request)
    }
}

// A repeated key replaces the earlier value in place.
#[derive(Debug, Default)]
struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    fn set(&mut self, key: &str, value: String) {
        match self.pairs.iter_mut().find(|(name, _)| name == key) {
            Some((_, existing)) => *existing = value,
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    fn merge(&mut self, filters: &BTreeMap<String, Value>) {
        for (key, value) in filters {
            self.set(key, render_param(value));
        }
    }

    fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

fn render_param(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn repeated_keys_overwrite_in_place() {
        let mut params = QueryParams::default();
        params.set("$limit", "1000".to_string());
        params.set("a", "1".to_string());
        let mut filters = BTreeMap::new();
        filters.insert("$limit".to_string(), json!(5));
        params.merge(&filters);
        assert_eq!(
            params.into_pairs(),
            vec![
                ("$limit".to_string(), "5".to_string()),
                ("a".to_string(), "1".to_string())
            ]
        );
    }

    #[test]
    fn render_scalars() {
        assert_eq!(render_param(&json!("north")), "north");
        assert_eq!(render_param(&json!(true)), "true");
        assert_eq!(render_param(&json!(12.5)), "12.5");
        assert_eq!(render_param(&Value::Null), "");
    }
}

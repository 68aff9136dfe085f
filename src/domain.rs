use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;

pub const DEFAULT_LIMIT: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetCategory {
    Housing,
    Crime,
    #[serde(rename = "calls_311")]
    Calls311,
}

impl DatasetCategory {
    pub const ALL: [DatasetCategory; 3] = [
        DatasetCategory::Housing,
        DatasetCategory::Crime,
        DatasetCategory::Calls311,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetCategory::Housing => "housing",
            DatasetCategory::Crime => "crime",
            DatasetCategory::Calls311 => "calls_311",
        }
    }
}

impl fmt::Display for DatasetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DatasetCategory {
    type Err = DataError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "housing" => Ok(DatasetCategory::Housing),
            "crime" => Ok(DatasetCategory::Crime),
            "calls_311" => Ok(DatasetCategory::Calls311),
            _ => Err(DataError::UnknownCategory(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub category: DatasetCategory,
    pub filters: BTreeMap<String, Value>,
    pub limit: u32,
}

impl FetchRequest {
    pub fn new(category: DatasetCategory) -> Self {
        Self {
            category,
            filters: BTreeMap::new(),
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }
}

pub fn parse_filter(raw: &str) -> Result<(String, Value), DataError> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| DataError::InvalidFilter(raw.to_string()))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(DataError::InvalidFilter(raw.to_string()));
    }
    Ok((key.to_string(), Value::String(value.to_string())))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_category_names() {
        assert_eq!(
            "housing".parse::<DatasetCategory>().unwrap(),
            DatasetCategory::Housing
        );
        assert_eq!(
            " calls_311 ".parse::<DatasetCategory>().unwrap(),
            DatasetCategory::Calls311
        );
    }

    #[test]
    fn parse_category_unknown() {
        let err = "parks".parse::<DatasetCategory>().unwrap_err();
        assert_matches!(err, DataError::UnknownCategory(name) if name == "parks");
    }

    #[test]
    fn category_serde_uses_wire_names() {
        let json = serde_json::to_string(&DatasetCategory::Calls311).unwrap();
        assert_eq!(json, "\"calls_311\"");
        let back: DatasetCategory = serde_json::from_str("\"crime\"").unwrap();
        assert_eq!(back, DatasetCategory::Crime);
    }

    #[test]
    fn request_defaults_to_thousand_rows() {
        let request = FetchRequest::new(DatasetCategory::Crime);
        assert_eq!(request.limit, 1000);
        assert!(request.filters.is_empty());
    }

    #[test]
    fn filter_parsing() {
        let (key, value) = parse_filter("$where=year > 2020").unwrap();
        assert_eq!(key, "$where");
        assert_eq!(value, Value::String("year > 2020".to_string()));

        assert_matches!(parse_filter("borough"), Err(DataError::InvalidFilter(_)));
        assert_matches!(parse_filter("=north"), Err(DataError::InvalidFilter(_)));
    }
}

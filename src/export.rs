use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{DatasetCategory, FetchRequest};
use crate::error::DataError;
use crate::portal::DatasetSource;
use crate::table::Record;

#[derive(Debug, Clone, Copy)]
enum Fallback {
    Text(&'static str),
    Int(i64),
    Bool(bool),
}

impl Fallback {
    fn value(self) -> Value {
        match self {
            Fallback::Text(text) => Value::String(text.to_string()),
            Fallback::Int(number) => Value::from(number),
            Fallback::Bool(flag) => Value::Bool(flag),
        }
    }
}

struct FieldRule {
    name: &'static str,
    sources: &'static [&'static str],
    fallback: Fallback,
}

const fn field(
    name: &'static str,
    sources: &'static [&'static str],
    fallback: Fallback,
) -> FieldRule {
    FieldRule {
        name,
        sources,
        fallback,
    }
}

const EMPTY: Fallback = Fallback::Text("");

const HOUSING_FIELDS: &[FieldRule] = &[
    field(
        "property_name",
        &["property_name", "Property Name"],
        Fallback::Text("Unknown"),
    ),
    field("address", &["address", "Address"], EMPTY),
    field("community_area", &["community_area", "Community Area"], EMPTY),
    field(
        "community_area_name",
        &["community_area_name", "Community Area Name"],
        EMPTY,
    ),
    field("units", &["units", "Units"], Fallback::Int(0)),
    field("phone", &["phone_number", "Phone"], EMPTY),
    field("property_type", &["property_type"], EMPTY),
    field("management_company", &["management_company"], EMPTY),
];

const CRIME_FIELDS: &[FieldRule] = &[
    field("date", &["date", "Date"], EMPTY),
    field("primary_type", &["primary_type", "Primary Type"], EMPTY),
    field("description", &["description", "Description"], EMPTY),
    field("location_description", &["location_description"], EMPTY),
    field("arrest", &["arrest"], Fallback::Bool(false)),
    field("domestic", &["domestic"], Fallback::Bool(false)),
    field("community_area", &["community_area"], EMPTY),
    field("year", &["year"], EMPTY),
    field("block", &["block"], EMPTY),
];

const CALLS_311_FIELDS: &[FieldRule] = &[
    field("sr_number", &["sr_number"], EMPTY),
    field("sr_type", &["sr_type", "SR Type"], EMPTY),
    field("sr_short_code", &["sr_short_code"], EMPTY),
    field("created_date", &["created_date"], EMPTY),
    field("status", &["status"], EMPTY),
    field("community_area", &["community_area"], EMPTY),
    field("street_address", &["street_address"], EMPTY),
    field("zip_code", &["zip_code"], EMPTY),
];

fn rules(category: DatasetCategory) -> &'static [FieldRule] {
    match category {
        DatasetCategory::Housing => HOUSING_FIELDS,
        DatasetCategory::Crime => CRIME_FIELDS,
        DatasetCategory::Calls311 => CALLS_311_FIELDS,
    }
}

pub fn export_file_name(category: DatasetCategory) -> &'static str {
    match category {
        DatasetCategory::Housing => "chicago-housing-data.json",
        DatasetCategory::Crime => "chicago-crime-data.json",
        DatasetCategory::Calls311 => "chicago-311-data.json",
    }
}

// First source field holding a non-empty, non-false, non-zero value wins.
pub fn project_record(category: DatasetCategory, record: &Record) -> Record {
    rules(category)
        .iter()
        .map(|rule| {
            let value = rule
                .sources
                .iter()
                .filter_map(|source| record.get(*source))
                .find(|value| is_present(value))
                .cloned()
                .unwrap_or_else(|| rule.fallback.value());
            (rule.name.to_string(), value)
        })
        .collect()
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportSummary {
    pub exported_at: String,
    pub out_dir: String,
    pub items: Vec<ExportItem>,
}

impl ExportSummary {
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|item| item.error.is_none()).count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportItem {
    pub category: DatasetCategory,
    pub records: usize,
    pub path: Option<String>,
    pub error: Option<String>,
}

pub fn export_all<S: DatasetSource + ?Sized>(
    source: &S,
    out_dir: &Utf8Path,
    limit: u32,
) -> Result<ExportSummary, DataError> {
    let mut items = Vec::new();
    for category in DatasetCategory::ALL {
        let request = FetchRequest::new(category).with_limit(limit);
        let item = match source.fetch_resource(&request) {
            Ok(table) => {
                let projected: Vec<Record> = table
                    .records()
                    .iter()
                    .map(|record| project_record(category, record))
                    .collect();
                let path = out_dir.join(export_file_name(category));
                write_json_atomic(&path, &projected)?;
                info!(%category, records = projected.len(), path = %path, "dataset exported");
                ExportItem {
                    category,
                    records: projected.len(),
                    path: Some(path.to_string()),
                    error: None,
                }
            }
            Err(err) => {
                warn!(%category, error = %err, "could not fetch dataset");
                ExportItem {
                    category,
                    records: 0,
                    path: None,
                    error: Some(err.to_string()),
                }
            }
        };
        items.push(item);
    }

    let summary = ExportSummary {
        exported_at: chrono::Utc::now().to_rfc3339(),
        out_dir: out_dir.to_string(),
        items,
    };
    if summary.succeeded() == 0 {
        return Err(DataError::NoDatasetsExported);
    }
    Ok(summary)
}

fn write_json_atomic<T: Serialize>(path: &Utf8PathBuf, value: &T) -> Result<(), DataError> {
    let parent = path
        .parent()
        .ok_or_else(|| DataError::Filesystem("invalid destination path".to_string()))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| DataError::Filesystem(err.to_string()))?;
    let json = serde_json::to_vec_pretty(value)
        .map_err(|err| DataError::Filesystem(err.to_string()))?;
    let mut temp = tempfile::Builder::new()
        .prefix("nbhd-export")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| DataError::Filesystem(err.to_string()))?;
    temp.write_all(&json)
        .map_err(|err| DataError::Filesystem(err.to_string()))?;
    temp.persist(path.as_std_path())
        .map_err(|err| DataError::Filesystem(err.to_string()))?;
    Ok(())
}

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::DataError;

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    pub fn columns(&self) -> Vec<String> {
        let mut columns: Vec<String> = Vec::new();
        for record in &self.records {
            for key in record.keys() {
                if !columns.iter().any(|existing| existing == key) {
                    columns.push(key.clone());
                }
            }
        }
        columns
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamBody {
    RowArray(Vec<Value>),
    ColumnarObject {
        data: Vec<Value>,
        columns: Option<Vec<ColumnDescriptor>>,
    },
    Other(Value),
}

impl UpstreamBody {
    pub fn classify(value: Value) -> Result<Self, DataError> {
        match value {
            Value::Array(rows) => Ok(UpstreamBody::RowArray(rows)),
            Value::Object(mut object) if object.contains_key("data") => {
                let data = match object.remove("data") {
                    Some(Value::Array(rows)) => rows,
                    _ => {
                        return Err(DataError::UpstreamRequest(
                            "response field `data` is not an array".to_string(),
                        ));
                    }
                };
                let columns = object
                    .remove("columns")
                    .map(serde_json::from_value::<Vec<ColumnDescriptor>>)
                    .transpose()
                    .map_err(|err| {
                        DataError::UpstreamRequest(format!("invalid `columns` metadata: {err}"))
                    })?;
                Ok(UpstreamBody::ColumnarObject { data, columns })
            }
            other => Ok(UpstreamBody::Other(other)),
        }
    }

    pub fn rows(value: Value) -> Self {
        match value {
            Value::Array(rows) => UpstreamBody::RowArray(rows),
            other => UpstreamBody::Other(other),
        }
    }

    pub fn into_table(self) -> Result<Table, DataError> {
        let records = match self {
            UpstreamBody::RowArray(rows) => rows_to_records(rows, None)?,
            UpstreamBody::ColumnarObject { data, columns } => {
                let names = columns.map(|columns| {
                    unique_names(columns.into_iter().map(|column| column.name))
                });
                rows_to_records(data, names.as_deref())?
            }
            UpstreamBody::Other(Value::Object(record)) => vec![record],
            UpstreamBody::Other(other) => {
                return Err(DataError::UpstreamRequest(format!(
                    "unexpected response body: {other}"
                )));
            }
        };
        Ok(Table::new(records))
    }
}

fn rows_to_records(
    rows: Vec<Value>,
    columns: Option<&[String]>,
) -> Result<Vec<Record>, DataError> {
    rows.into_iter()
        .map(|row| row_to_record(row, columns))
        .collect()
}

// Repeated names get a numeric suffix: `a`, `a_1`, `a_2`.
fn unique_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for name in names {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while unique.contains(&candidate) {
            candidate = format!("{name}_{suffix}");
            suffix += 1;
        }
        unique.push(candidate);
    }
    unique
}

fn row_to_record(row: Value, columns: Option<&[String]>) -> Result<Record, DataError> {
    match (row, columns) {
        (Value::Object(mut record), Some(names)) => Ok(names
            .iter()
            .map(|name| (name.clone(), record.remove(name).unwrap_or(Value::Null)))
            .collect()),
        (Value::Object(record), None) => Ok(record),
        (Value::Array(values), Some(names)) => {
            if values.len() != names.len() {
                return Err(DataError::UpstreamRequest(format!(
                    "row has {} values but {} columns were declared",
                    values.len(),
                    names.len()
                )));
            }
            Ok(names.iter().cloned().zip(values).collect())
        }
        (Value::Array(values), None) => Ok(values
            .into_iter()
            .enumerate()
            .map(|(index, value)| (index.to_string(), value))
            .collect()),
        (scalar, _) => {
            let mut record = Record::new();
            record.insert("0".to_string(), scalar);
            Ok(record)
        }
    }
}

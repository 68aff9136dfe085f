use serde::{Deserialize, Serialize};

use crate::domain::{DatasetCategory, FetchRequest};
use crate::error::DataError;
use crate::portal::DatasetSource;
use crate::table::Record;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrimeStats {}

pub struct NeighborhoodViews<S: DatasetSource> {
    source: S,
}

impl<S: DatasetSource> NeighborhoodViews<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn housing_by_neighborhood(&self, _neighborhood: &str) -> Result<Vec<Record>, DataError> {
        let table = self
            .source
            .fetch(&FetchRequest::new(DatasetCategory::Housing))?;
        Ok(table.into_records())
    }

    pub fn crime_stats(&self, _neighborhood: &str) -> Result<CrimeStats, DataError> {
        let _table = self.source.fetch(&FetchRequest::new(DatasetCategory::Crime))?;
        Ok(CrimeStats::default())
    }

    pub fn calls_311(&self, _neighborhood: &str) -> Result<Vec<Record>, DataError> {
        let table = self
            .source
            .fetch(&FetchRequest::new(DatasetCategory::Calls311))?;
        Ok(table.into_records())
    }
}

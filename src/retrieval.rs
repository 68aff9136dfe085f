use tracing::debug;

use crate::domain::DatasetCategory;
use crate::error::DataError;
use crate::table::Record;

pub const SERVER_URL_VAR: &str = "MCP_SERVER_URL";
pub const API_KEY_VAR: &str = "MCP_API_KEY";

pub trait RecordIndex: Send + Sync {
    fn connect(&self) -> Result<bool, DataError>;
    fn index(&self, records: &[Record], category: DatasetCategory) -> Result<bool, DataError>;
    fn query(
        &self,
        query: &str,
        category: Option<DatasetCategory>,
    ) -> Result<Vec<Record>, DataError>;
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderIndex {
    server_url: Option<String>,
    api_key: Option<String>,
}

impl PlaceholderIndex {
    pub fn new(server_url: Option<String>, api_key: Option<String>) -> Self {
        Self {
            server_url,
            api_key,
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self::new(read(SERVER_URL_VAR), read(API_KEY_VAR))
    }

    pub fn server_url(&self) -> Option<&str> {
        self.server_url.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl RecordIndex for PlaceholderIndex {
    fn connect(&self) -> Result<bool, DataError> {
        debug!(server = ?self.server_url, "record index not implemented");
        Ok(false)
    }

    fn index(&self, _records: &[Record], _category: DatasetCategory) -> Result<bool, DataError> {
        Ok(false)
    }

    fn query(
        &self,
        _query: &str,
        _category: Option<DatasetCategory>,
    ) -> Result<Vec<Record>, DataError> {
        Ok(Vec::new())
    }
}

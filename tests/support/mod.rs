#![allow(dead_code)]

use std::sync::Mutex;

use neighborhood_data::config::PortalConfig;
use neighborhood_data::domain::DatasetCategory;
use neighborhood_data::error::DataError;
use neighborhood_data::transport::{PortalRequest, Transport, TransportResponse};

pub struct RecordingTransport {
    responses: Mutex<Vec<TransportResponse>>,
    pub requests: Mutex<Vec<PortalRequest>>,
}

impl RecordingTransport {
    pub fn new(status: u16, body: &str) -> Self {
        Self::sequence(vec![(status, body)])
    }

    pub fn sequence(responses: Vec<(u16, &str)>) -> Self {
        let responses = responses
            .into_iter()
            .rev()
            .map(|(status, body)| TransportResponse {
                status,
                body: body.to_string(),
            })
            .collect();
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> PortalRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for RecordingTransport {
    fn get(&self, request: &PortalRequest) -> Result<TransportResponse, DataError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .ok_or_else(|| DataError::UpstreamRequest("no canned response left".to_string()))
    }
}

impl Transport for &RecordingTransport {
    fn get(&self, request: &PortalRequest) -> Result<TransportResponse, DataError> {
        (**self).get(request)
    }
}

pub fn legacy_only(token: Option<&str>) -> PortalConfig {
    let mut config = PortalConfig::empty();
    config.app_token = token.map(str::to_string);
    config.legacy_base_url = "https://portal.test/resource/".to_string();
    config
        .legacy_datasets
        .insert(DatasetCategory::Housing, "s6ha-ppgi".to_string());
    config
}

pub fn current_only(token: Option<&str>) -> PortalConfig {
    let mut config = PortalConfig::empty();
    config.app_token = token.map(str::to_string);
    for category in DatasetCategory::ALL {
        config.current_endpoints.insert(
            category,
            format!("https://portal.test/api/v3/views/{category}/query.json"),
        );
    }
    config
}

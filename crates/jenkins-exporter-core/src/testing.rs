//! In-memory `JenkinsApi` used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::JenkinsApi;
use crate::error::{
    ExporterError,
    ExporterResult,
};

#[derive(Default)]
pub(crate) struct FakeJenkins {
    routes: HashMap<String, Value>,
    failures: HashMap<String, u16>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl FakeJenkins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, url: &str, body: Value) -> Self {
        self.routes.insert(url.to_string(), body);
        self
    }

    pub fn fail(mut self, url: &str, status: u16) -> Self {
        self.failures.insert(url.to_string(), status);
        self
    }

    pub fn called_urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    pub fn queries_for(&self, url: &str) -> Vec<Vec<(String, String)>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(called, _)| called == url)
            .map(|(_, query)| query.clone())
            .collect()
    }
}

#[async_trait]
impl JenkinsApi for FakeJenkins {
    async fn fetch(&self, url: &str, query: &[(&str, &str)]) -> ExporterResult<Value> {
        self.calls.lock().unwrap().push((
            url.to_string(),
            query
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        if let Some(status) = self.failures.get(url) {
            return Err(ExporterError::Upstream {
                url: url.to_string(),
                status: *status,
            });
        }

        self.routes
            .get(url)
            .cloned()
            .ok_or_else(|| ExporterError::Upstream {
                url: url.to_string(),
                status: 404,
            })
    }
}

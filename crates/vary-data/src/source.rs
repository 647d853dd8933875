//! External data sources
//!
//! Two contracts feed the provisioning chain:
//! - [`DatasetSource`]: a seeded slice of a backing dataset
//! - [`GenerationSource`]: freshly generated records
//!
//! HTTP implementations are provided for both. Neither applies its own
//! timeout; the chain bounds every call.

use crate::entity::Entity;
use crate::error::SourceError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

/// How the dataset service slices its data for a seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetMethod {
    /// Contiguous window starting at a seed-derived offset
    #[default]
    Select,
    /// Seeded permutation
    Shuffle,
    /// Even spread across the values of a filter key
    Distribute,
}

impl DatasetMethod {
    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Shuffle => "shuffle",
            Self::Distribute => "distribute",
        }
    }
}

impl fmt::Display for DatasetMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "select" => Ok(Self::Select),
            "shuffle" => Ok(Self::Shuffle),
            "distribute" => Ok(Self::Distribute),
            other => Err(format!("unknown dataset method: {other}")),
        }
    }
}

/// Request to the seeded dataset service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetRequest {
    /// Project namespace
    pub project_key: String,
    /// Entity type
    pub entity_type: String,
    /// Data-channel seed
    pub seed_value: u32,
    /// Maximum number of records
    pub limit: usize,
    /// Slicing method
    pub method: DatasetMethod,
    /// Field to distribute over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_key: Option<String>,
}

/// Request to the generation service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Project namespace
    pub project_key: String,
    /// Entity type
    pub entity_type: String,
    /// Number of records to generate
    pub count: usize,
}

/// Seeded dataset slices
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Fetch the slice for a request
    async fn fetch(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError>;
}

/// Generated records
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerationSource: Send + Sync {
    /// Generate records for a request
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Entity>, SourceError>;
}

/// Pull the record array out of a response body
///
/// Accepts a bare array or an object carrying the array under `field`.
pub(crate) fn extract_items(body: Value, field: &str) -> Result<Vec<Entity>, SourceError> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(field) {
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(SourceError::decode(format!(
                "field {field} is not an array but {}",
                kind(&other)
            ))),
            None => Err(SourceError::decode(format!("missing field {field}"))),
        },
        other => Err(SourceError::decode(format!("expected array, got {}", kind(&other)))),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Dataset service over HTTP (`GET` with query parameters)
#[derive(Debug, Clone)]
pub struct HttpDatasetSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpDatasetSource {
    /// Create source for an endpoint
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Use a preconfigured client
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Full request URL
    #[must_use]
    pub fn request_url(&self, request: &DatasetRequest) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("project_key", &request.project_key)
                .append_pair("entity_type", &request.entity_type)
                .append_pair("seed_value", &request.seed_value.to_string())
                .append_pair("limit", &request.limit.to_string())
                .append_pair("method", request.method.as_str());
            if let Some(filter_key) = &request.filter_key {
                query.append_pair("filter_key", filter_key);
            }
        }
        url
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    async fn fetch(&self, request: &DatasetRequest) -> Result<Vec<Entity>, SourceError> {
        let url = self.request_url(request);
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        extract_items(serde_json::from_slice(&bytes)?, "data")
    }
}

/// Generation service over HTTP (`POST` JSON)
#[derive(Debug, Clone)]
pub struct HttpGenerationSource {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpGenerationSource {
    /// Create source for an endpoint
    #[must_use]
    pub fn new(endpoint: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }

    /// Use a preconfigured client
    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }
}

#[async_trait]
impl GenerationSource for HttpGenerationSource {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<Entity>, SourceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: self.endpoint.to_string(),
            });
        }
        let bytes = response.bytes().await?;
        extract_items(serde_json::from_slice(&bytes)?, "generated_data")
    }
}

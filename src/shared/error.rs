// Copyright 2025 Stratus Team.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use thiserror::Error;
pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cloud API error: {operation} on '{resource}': {message}")]
    Api {
        operation: String,
        resource: String,
        message: String,
        /// Throttling/5xx/transport-timeout class. 4xx validation errors are
        /// never retryable.
        retryable: bool,
    },

    #[error("Resource not found: {resource_type} '{id}'")]
    NotFound { resource_type: String, id: String },

    #[error("Kubernetes API error: {0}")]
    Kube(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl From<kube::Error> for ProviderError {
    fn from(err: kube::Error) -> Self {
        ProviderError::Kube(err.to_string())
    }
}

impl ProviderError {
    pub fn configuration(context: impl Into<String>) -> Self {
        Self::Configuration(context.into())
    }

    pub fn api(
        operation: impl Into<String>,
        resource: impl Into<String>,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self::Api {
            operation: operation.into(),
            resource: resource.into(),
            message: message.into(),
            retryable,
        }
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    /// Whether the underlying failure is transient. The transport-level
    /// retry budget is already spent by the time an error surfaces here,
    /// so callers use this only to decide pass-level backoff.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api { retryable: true, .. })
    }
}

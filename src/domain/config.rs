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

//! Provider configuration, supplied once at factory construction and
//! immutable afterwards.

use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::constants::{
    DEFAULT_CACHE_SWEEP_INTERVAL_SECS, DEFAULT_CACHE_TTL_SECS,
};
use crate::shared::error::ProviderError;
use crate::shared::Result;

/// Cloud provider configuration.
///
/// `region = None` means auto-detection through the instance metadata
/// service; a failure to resolve either way aborts factory construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudConfig {
    /// Cluster name, used in ownership tags on every discovered or created
    /// cloud resource.
    pub cluster_name: String,
    pub region: Option<String>,
    /// Seconds a cached cloud lookup stays valid.
    pub cache_ttl_secs: u64,
    /// Seconds between background sweeps of expired cache entries. Should
    /// exceed the TTL so the sweep only ever cleans already-dead entries.
    pub cache_sweep_interval_secs: u64,
    pub retry: RetrySettings,
}

/// Transport-level retry policy, applied to every cloud API call.
/// Only throttling/5xx-class failures are retried; validation errors
/// fail fast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            cluster_name: "stratus".to_string(),
            region: None,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_sweep_interval_secs: DEFAULT_CACHE_SWEEP_INTERVAL_SECS,
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
        }
    }
}

impl CloudConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_to_string(path.as_ref())?;
        let conf: Self = toml::from_str(&content)?;
        conf.validate()?;
        Ok(conf)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cluster_name.is_empty() {
            return Err(ProviderError::configuration("cluster_name must not be empty"));
        }
        if self.cache_ttl_secs == 0 {
            return Err(ProviderError::configuration("cache_ttl_secs must be > 0"));
        }
        if self.cache_sweep_interval_secs < self.cache_ttl_secs {
            return Err(ProviderError::configuration(format!(
                "cache_sweep_interval_secs ({}) must be >= cache_ttl_secs ({})",
                self.cache_sweep_interval_secs, self.cache_ttl_secs
            )));
        }
        if self.retry.max_attempts == 0 {
            return Err(ProviderError::configuration("retry.max_attempts must be > 0"));
        }
        Ok(())
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.retry.initial_backoff_ms)
    }
}

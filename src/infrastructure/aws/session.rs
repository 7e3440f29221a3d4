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

//! Session construction: region resolution, retry policy, request tagging.
//!
//! The resulting `SdkConfig` is built once at factory construction and
//! shared read-only by every client for the life of the process.

use aws_config::imds::region::ImdsRegionProvider;
use aws_config::meta::region::ProvideRegion;
use aws_config::retry::RetryConfig;
use aws_config::{AppName, BehaviorVersion, Region, SdkConfig};
use tracing::info;

use crate::domain::config::CloudConfig;
use crate::infrastructure::constants::request_tag;
use crate::shared::error::ProviderError;
use crate::shared::Result;

/// Build the shared SDK session from provider configuration.
///
/// The region comes from configuration when set, otherwise from the
/// instance metadata service. There is no safe default region, so failing
/// both is fatal to startup.
pub async fn build_sdk_config(config: &CloudConfig) -> Result<SdkConfig> {
    let region = resolve_region(config).await?;
    info!(region = %region, "resolved operating region");

    // Bounded exponential backoff, applied by the SDK to throttling and
    // transient-class failures only. Validation errors fail fast.
    let retry = RetryConfig::standard()
        .with_max_attempts(config.retry.max_attempts)
        .with_initial_backoff(config.initial_backoff());

    let app_name = AppName::new(request_tag())
        .map_err(|e| ProviderError::configuration(format!("invalid app name: {}", e)))?;

    Ok(aws_config::defaults(BehaviorVersion::latest())
        .region(region)
        .retry_config(retry)
        .app_name(app_name)
        .load()
        .await)
}

async fn resolve_region(config: &CloudConfig) -> Result<Region> {
    if let Some(region) = &config.region {
        return Ok(Region::new(region.clone()));
    }
    ImdsRegionProvider::builder()
        .build()
        .region()
        .await
        .ok_or_else(|| {
            ProviderError::configuration(
                "no region configured and the instance metadata region lookup failed",
            )
        })
}

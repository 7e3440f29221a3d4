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

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_ec2::types::{Filter, SecurityGroup};
use tracing::debug;

use crate::infrastructure::aws::api::Ec2Api;
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::constants::cluster_tag_key;
use crate::shared::Result;

/// Resolves security groups carrying the cluster ownership tag. Shared by
/// reference with the launch template provider, so one cache window covers
/// every launch-template resolution that needs it.
pub struct SecurityGroupProvider {
    ec2: Arc<dyn Ec2Api>,
    cluster_name: String,
    cache: TtlCache<Vec<SecurityGroup>>,
}

impl SecurityGroupProvider {
    pub fn new(
        ec2: Arc<dyn Ec2Api>,
        cluster_name: &str,
        ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            ec2,
            cluster_name: cluster_name.to_string(),
            cache: TtlCache::with_sweeper(ttl, sweep_interval),
        }
    }

    pub async fn resolve(&self) -> Result<Vec<SecurityGroup>> {
        let key = self.cluster_name.clone();
        if let Some(groups) = self.cache.get(&key) {
            debug!(%key, "security group cache hit");
            return Ok(groups);
        }

        let filters = vec![Filter::builder()
            .name("tag-key")
            .values(cluster_tag_key(&self.cluster_name))
            .build()];
        let groups = self.ec2.describe_security_groups(filters).await?;
        debug!(%key, count = groups.len(), "security group cache miss, fetched from EC2");
        self.cache.insert(key, groups.clone());
        Ok(groups)
    }
}

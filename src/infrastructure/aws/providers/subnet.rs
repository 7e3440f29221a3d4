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

use aws_sdk_ec2::types::{Filter, Subnet};
use tracing::debug;

use crate::infrastructure::aws::api::Ec2Api;
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::constants::cluster_tag_key;
use crate::shared::Result;

/// Resolves subnets carrying the cluster ownership tag, optionally narrowed
/// to one availability zone.
pub struct SubnetProvider {
    ec2: Arc<dyn Ec2Api>,
    cluster_name: String,
    cache: TtlCache<Vec<Subnet>>,
}

impl SubnetProvider {
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

    /// Cache-first subnet lookup. The key carries every filter dimension
    /// (cluster, zone) so distinct queries populate distinct entries.
    pub async fn resolve(&self, zone: Option<&str>) -> Result<Vec<Subnet>> {
        let key = format!("{}/{}", self.cluster_name, zone.unwrap_or("*"));
        if let Some(subnets) = self.cache.get(&key) {
            debug!(%key, "subnet cache hit");
            return Ok(subnets);
        }

        let mut filters = vec![Filter::builder()
            .name("tag-key")
            .values(cluster_tag_key(&self.cluster_name))
            .build()];
        if let Some(zone) = zone {
            filters.push(
                Filter::builder()
                    .name("availability-zone")
                    .values(zone)
                    .build(),
            );
        }

        let subnets = self.ec2.describe_subnets(filters).await?;
        debug!(%key, count = subnets.len(), "subnet cache miss, fetched from EC2");
        self.cache.insert(key, subnets.clone());
        Ok(subnets)
    }
}

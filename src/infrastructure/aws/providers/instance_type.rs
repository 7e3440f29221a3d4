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

use tracing::debug;

use crate::infrastructure::aws::api::Ec2Api;
use crate::infrastructure::cache::TtlCache;
use crate::shared::Result;

/// Resolves the instance type names offered in an availability zone,
/// cached per zone.
pub struct InstanceTypeProvider {
    ec2: Arc<dyn Ec2Api>,
    cache: TtlCache<Vec<String>>,
}

impl InstanceTypeProvider {
    pub fn new(ec2: Arc<dyn Ec2Api>, ttl: Duration, sweep_interval: Duration) -> Self {
        Self {
            ec2,
            cache: TtlCache::with_sweeper(ttl, sweep_interval),
        }
    }

    pub async fn resolve(&self, zone: &str) -> Result<Vec<String>> {
        if let Some(types) = self.cache.get(zone) {
            debug!(zone, "instance type cache hit");
            return Ok(types);
        }
        let types = self.ec2.offered_instance_types(zone).await?;
        debug!(zone, count = types.len(), "instance type cache miss, fetched from EC2");
        self.cache.insert(zone, types.clone());
        Ok(types)
    }
}

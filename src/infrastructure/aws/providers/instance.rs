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

use aws_sdk_ec2::types::{Subnet, Tag};
use tracing::info;

use crate::infrastructure::aws::api::Ec2Api;
use crate::infrastructure::constants::{cluster_tag_key, stratus_tag_key};
use crate::shared::error::ProviderError;
use crate::shared::Result;

/// Launches instances. Deliberately uncached: mutations must never be
/// served stale.
pub struct InstanceProvider {
    ec2: Arc<dyn Ec2Api>,
    cluster_name: String,
}

impl InstanceProvider {
    pub fn new(ec2: Arc<dyn Ec2Api>, cluster_name: &str) -> Self {
        Self {
            ec2,
            cluster_name: cluster_name.to_string(),
        }
    }

    pub async fn create(
        &self,
        launch_template_id: &str,
        subnet: &Subnet,
        instance_type: Option<&str>,
        count: i32,
    ) -> Result<Vec<String>> {
        let subnet_id = subnet
            .subnet_id()
            .ok_or_else(|| ProviderError::not_found("SubnetId", "<missing>"))?;
        let tags = vec![
            Tag::builder()
                .key(cluster_tag_key(&self.cluster_name))
                .value("owned")
                .build(),
            Tag::builder()
                .key(stratus_tag_key(&self.cluster_name))
                .value("owned")
                .build(),
        ];
        let instance_ids = self
            .ec2
            .run_instances(launch_template_id, subnet_id, instance_type, count, tags)
            .await?;
        info!(
            subnet = subnet_id,
            count = instance_ids.len(),
            "launched instances"
        );
        Ok(instance_ids)
    }
}

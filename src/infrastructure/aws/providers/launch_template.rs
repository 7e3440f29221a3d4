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

use aws_sdk_ec2::types::LaunchTemplate;
use tracing::{debug, info};

use super::security_group::SecurityGroupProvider;
use crate::infrastructure::aws::api::{Ec2Api, SsmApi};
use crate::infrastructure::cache::TtlCache;
use crate::infrastructure::constants::{
    cluster_tag_key, DEFAULT_AMI_PARAMETER, LAUNCH_TEMPLATE_NAME_PREFIX,
};
use crate::shared::error::ProviderError;
use crate::shared::Result;

/// Get-or-create resolution of the cluster's node launch template.
///
/// Composes the security group provider by shared reference and the SSM
/// parameter store for the default AMI. The resolved template is cached;
/// a failed resolution never is.
pub struct LaunchTemplateProvider {
    ec2: Arc<dyn Ec2Api>,
    ssm: Arc<dyn SsmApi>,
    security_groups: Arc<SecurityGroupProvider>,
    cluster_name: String,
    cache: TtlCache<LaunchTemplate>,
}

impl LaunchTemplateProvider {
    pub fn new(
        ec2: Arc<dyn Ec2Api>,
        ssm: Arc<dyn SsmApi>,
        security_groups: Arc<SecurityGroupProvider>,
        cluster_name: &str,
        ttl: Duration,
        sweep_interval: Duration,
    ) -> Self {
        Self {
            ec2,
            ssm,
            security_groups,
            cluster_name: cluster_name.to_string(),
            cache: TtlCache::with_sweeper(ttl, sweep_interval),
        }
    }

    pub fn template_name(&self) -> String {
        format!("{}{}", LAUNCH_TEMPLATE_NAME_PREFIX, self.cluster_name)
    }

    pub async fn resolve(&self) -> Result<LaunchTemplate> {
        let key = self.cluster_name.clone();
        if let Some(template) = self.cache.get(&key) {
            debug!(%key, "launch template cache hit");
            return Ok(template);
        }

        let name = self.template_name();
        let template = match self.ec2.describe_launch_template(&name).await? {
            Some(template) => template,
            None => self.create(&name).await?,
        };
        self.cache.insert(key, template.clone());
        Ok(template)
    }

    async fn create(&self, name: &str) -> Result<LaunchTemplate> {
        let groups = self.security_groups.resolve().await?;
        let group_ids: Vec<String> = groups
            .iter()
            .filter_map(|group| group.group_id().map(str::to_string))
            .collect();
        if group_ids.is_empty() {
            return Err(ProviderError::not_found(
                "SecurityGroup",
                cluster_tag_key(&self.cluster_name),
            ));
        }
        let image_id = self.ssm.get_parameter(DEFAULT_AMI_PARAMETER).await?;
        info!(name, %image_id, "creating launch template");
        self.ec2.create_launch_template(name, &image_id, group_ids).await
    }
}

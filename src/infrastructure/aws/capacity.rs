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

use crate::domain::nodegroup::ScalableNodeGroup;
use crate::infrastructure::aws::providers::{
    InstanceProvider, InstanceTypeProvider, LaunchTemplateProvider, SubnetProvider,
};
use crate::shared::error::ProviderError;
use crate::shared::Result;

/// Placement and sizing constraints for one capacity creation.
#[derive(Debug, Clone, Default)]
pub struct CapacityConstraints {
    pub count: i32,
    pub zone: Option<String>,
    pub instance_type: Option<String>,
}

/// Per-request binding of a node group to the provider machinery that can
/// realize it. Short-lived, never persisted; construction performs no
/// network I/O.
pub struct Capacity {
    node_group: ScalableNodeGroup,
    subnet_provider: Arc<SubnetProvider>,
    launch_template_provider: Arc<LaunchTemplateProvider>,
    instance_type_provider: Arc<InstanceTypeProvider>,
    instance_provider: Arc<InstanceProvider>,
}

impl Capacity {
    pub(crate) fn new(
        node_group: ScalableNodeGroup,
        subnet_provider: Arc<SubnetProvider>,
        launch_template_provider: Arc<LaunchTemplateProvider>,
        instance_type_provider: Arc<InstanceTypeProvider>,
        instance_provider: Arc<InstanceProvider>,
    ) -> Self {
        Self {
            node_group,
            subnet_provider,
            launch_template_provider,
            instance_type_provider,
            instance_provider,
        }
    }

    pub fn node_group(&self) -> &ScalableNodeGroup {
        &self.node_group
    }

    /// Launch instances satisfying the constraints: resolve a tagged subnet,
    /// ensure the launch template, check the requested instance type is
    /// offered in the subnet's zone, then run the instances.
    pub async fn create(&self, constraints: &CapacityConstraints) -> Result<Vec<String>> {
        let subnets = self
            .subnet_provider
            .resolve(constraints.zone.as_deref())
            .await?;
        let subnet = subnets.first().ok_or_else(|| {
            ProviderError::not_found("Subnet", constraints.zone.as_deref().unwrap_or("*"))
        })?;

        let template = self.launch_template_provider.resolve().await?;
        let template_id = template.launch_template_id().ok_or_else(|| {
            ProviderError::not_found("LaunchTemplateId", self.launch_template_provider.template_name())
        })?;

        let instance_type = match (&constraints.instance_type, subnet.availability_zone()) {
            (Some(requested), Some(zone)) => {
                let offered = self.instance_type_provider.resolve(zone).await?;
                if !offered.iter().any(|name| name == requested) {
                    return Err(ProviderError::not_found(
                        "InstanceTypeOffering",
                        format!("{} in {}", requested, zone),
                    ));
                }
                Some(requested.as_str())
            }
            (Some(requested), None) => Some(requested.as_str()),
            (None, _) => None,
        };

        self.instance_provider
            .create(template_id, subnet, instance_type, constraints.count)
            .await
    }
}

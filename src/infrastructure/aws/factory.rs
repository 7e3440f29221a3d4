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

//! Provider factory: builds the session once, wires every sub-provider to
//! it, and hands out per-request capacity handles.

use std::sync::Arc;

use crate::domain::config::CloudConfig;
use crate::domain::nodegroup::ScalableNodeGroup;
use crate::infrastructure::aws::api::{
    AutoScalingApi, AutoScalingApiClient, Ec2Api, Ec2ApiClient, SsmApi, SsmApiClient,
};
use crate::infrastructure::aws::autoscaling::AutoScalingGroup;
use crate::infrastructure::aws::capacity::Capacity;
use crate::infrastructure::aws::providers::{
    InstanceProvider, InstanceTypeProvider, LaunchTemplateProvider, SecurityGroupProvider,
    SubnetProvider,
};
use crate::infrastructure::aws::session::build_sdk_config;
use crate::shared::Result;

/// Constructed once per process. All sub-providers and their caches are
/// shared across every handle the factory hands out.
pub struct CloudProviderFactory {
    subnet_provider: Arc<SubnetProvider>,
    launch_template_provider: Arc<LaunchTemplateProvider>,
    instance_type_provider: Arc<InstanceTypeProvider>,
    instance_provider: Arc<InstanceProvider>,
    autoscaling: Arc<dyn AutoScalingApi>,
}

impl CloudProviderFactory {
    /// Build the shared session (region, credentials, retry policy, request
    /// tag) and wire every sub-provider to it. Fails fast on configuration
    /// problems; performs no cloud calls beyond region auto-detection.
    pub async fn new(config: CloudConfig) -> Result<Self> {
        config.validate()?;
        let session = build_sdk_config(&config).await?;
        let ec2: Arc<dyn Ec2Api> = Arc::new(Ec2ApiClient::new(&session));
        let ssm: Arc<dyn SsmApi> = Arc::new(SsmApiClient::new(&session));
        let autoscaling: Arc<dyn AutoScalingApi> = Arc::new(AutoScalingApiClient::new(&session));
        Ok(Self::assemble(&config, ec2, ssm, autoscaling))
    }

    /// Wire a factory from pre-built API seams. Used by tests and by
    /// alternative transports; must run inside a tokio runtime so the cache
    /// sweepers can be spawned.
    pub fn assemble(
        config: &CloudConfig,
        ec2: Arc<dyn Ec2Api>,
        ssm: Arc<dyn SsmApi>,
        autoscaling: Arc<dyn AutoScalingApi>,
    ) -> Self {
        let ttl = config.cache_ttl();
        let sweep = config.cache_sweep_interval();
        let security_group_provider = Arc::new(SecurityGroupProvider::new(
            ec2.clone(),
            &config.cluster_name,
            ttl,
            sweep,
        ));
        Self {
            subnet_provider: Arc::new(SubnetProvider::new(
                ec2.clone(),
                &config.cluster_name,
                ttl,
                sweep,
            )),
            launch_template_provider: Arc::new(LaunchTemplateProvider::new(
                ec2.clone(),
                ssm,
                security_group_provider,
                &config.cluster_name,
                ttl,
                sweep,
            )),
            instance_type_provider: Arc::new(InstanceTypeProvider::new(ec2.clone(), ttl, sweep)),
            instance_provider: Arc::new(InstanceProvider::new(ec2, &config.cluster_name)),
            autoscaling,
        }
    }

    /// Bind a node group to the shared sub-providers. Pure wiring, no
    /// network I/O; callable any number of times.
    pub fn capacity_for(&self, node_group: &ScalableNodeGroup) -> Capacity {
        Capacity::new(
            node_group.clone(),
            self.subnet_provider.clone(),
            self.launch_template_provider.clone(),
            self.instance_type_provider.clone(),
            self.instance_provider.clone(),
        )
    }

    /// The node group reconciler bound to the shared AutoScaling client.
    pub fn scalable_node_group(&self) -> AutoScalingGroup {
        AutoScalingGroup::new(self.autoscaling.clone())
    }
}

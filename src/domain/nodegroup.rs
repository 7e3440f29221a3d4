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

//! The `ScalableNodeGroup` resource: the desired-capacity contract between
//! the provisioning controller and the cloud provider.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::shared::Result;

/// Desired state for one scalable group of worker nodes.
///
/// Owned by the provisioning controller; the provider treats it as
/// read-only input.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, JsonSchema)]
#[kube(
    group = "autoscaling.stratus.sh",
    version = "v1alpha1",
    kind = "ScalableNodeGroup",
    namespaced,
    status = "ScalableNodeGroupStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct ScalableNodeGroupSpec {
    /// Cloud resource identifier (for AWS, the AutoScalingGroup name).
    pub id: String,
    /// Target replica count. Unset means no scaling intent this pass.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

/// Observed state, written exclusively by the reconciler.
#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScalableNodeGroupStatus {
    /// Instance count as of the last describe call. Reflects the latest
    /// observation even when no scaling action followed it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,
}

/// A cloud-backed scalable node group.
///
/// One reconcile pass reads the group's current member count, records it in
/// `status`, and issues at most one corrective call when desired and
/// observed counts differ. Callers must serialize passes per node-group id;
/// passes for different ids may run concurrently.
#[async_trait::async_trait]
pub trait NodeGroup: Send + Sync {
    async fn reconcile(
        &self,
        spec: &ScalableNodeGroupSpec,
        status: &mut ScalableNodeGroupStatus,
    ) -> Result<()>;
}

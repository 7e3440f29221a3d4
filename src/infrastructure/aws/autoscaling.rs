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

//! EC2 AutoScalingGroup implementation of the [`NodeGroup`] contract.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::nodegroup::{NodeGroup, ScalableNodeGroupSpec, ScalableNodeGroupStatus};
use crate::infrastructure::aws::api::AutoScalingApi;
use crate::shared::error::ProviderError;
use crate::shared::Result;

/// Converges an AutoScalingGroup toward the spec's replica target.
pub struct AutoScalingGroup {
    api: Arc<dyn AutoScalingApi>,
}

impl AutoScalingGroup {
    pub fn new(api: Arc<dyn AutoScalingApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl NodeGroup for AutoScalingGroup {
    /// One reconcile pass: describe, record the observation, then issue at
    /// most one corrective call.
    ///
    /// Status carries the pre-mutation count; convergence is confirmed by a
    /// later pass once the group's own scaling activity has run. A describe
    /// failure leaves the prior status untouched.
    async fn reconcile(
        &self,
        spec: &ScalableNodeGroupSpec,
        status: &mut ScalableNodeGroupStatus,
    ) -> Result<()> {
        let observation = self
            .api
            .describe_group(&spec.id)
            .await?
            .ok_or_else(|| ProviderError::not_found("AutoScalingGroup", &spec.id))?;
        let observed = observation.instance_count as i32;

        // Recorded before any scaling decision so the status reflects the
        // latest describe even on a no-op pass.
        status.replicas = Some(observed);

        let desired = match spec.replicas {
            Some(desired) => desired,
            None => {
                debug!(group = %spec.id, observed, "no replica target set, skipping");
                return Ok(());
            }
        };
        if desired == observed {
            debug!(group = %spec.id, observed, "already converged");
            return Ok(());
        }

        info!(group = %spec.id, observed, desired, "updating desired capacity");
        self.api.update_desired_capacity(&spec.id, desired).await
    }
}

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

//! Typed get/update access to `ScalableNodeGroup` objects in the cluster
//! control plane. No watch or informer machinery lives here; the
//! provisioning controller drives the loop.

use backon::{ExponentialBuilder, Retryable};
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use tracing::warn;

use crate::domain::nodegroup::{ScalableNodeGroup, ScalableNodeGroupStatus};
use crate::shared::error::ProviderError;
use crate::shared::Result;

#[async_trait::async_trait]
pub trait NodeGroupStore: Send + Sync {
    async fn get(&self, name: &str) -> Result<ScalableNodeGroup>;

    async fn update_status(&self, name: &str, status: &ScalableNodeGroupStatus) -> Result<()>;
}

pub struct NodeGroupStoreImpl {
    api: Api<ScalableNodeGroup>,
}

impl NodeGroupStoreImpl {
    pub async fn new(namespace: &str) -> Result<Self> {
        let client = Client::try_default().await.map_err(|e| {
            ProviderError::Kube(format!("Failed to create Kubernetes client: {}", e))
        })?;
        Ok(Self::with_client(client, namespace))
    }

    pub fn with_client(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait::async_trait]
impl NodeGroupStore for NodeGroupStoreImpl {
    async fn get(&self, name: &str) -> Result<ScalableNodeGroup> {
        Ok(self.api.get(name).await?)
    }

    async fn update_status(&self, name: &str, status: &ScalableNodeGroupStatus) -> Result<()> {
        let patch = serde_json::json!({ "status": status });
        let pp = PatchParams::default();
        (|| async { self.api.patch_status(name, &pp, &Patch::Merge(&patch)).await })
            .retry(ExponentialBuilder::default().with_max_times(3))
            .when(is_conflict)
            .notify(|err: &kube::Error, _| {
                warn!(name, %err, "status update conflict, retrying");
            })
            .await?;
        Ok(())
    }
}

fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(response) if response.code == 409)
}

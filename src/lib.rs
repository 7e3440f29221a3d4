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

// Core modules
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export commonly used types
pub use domain::config::{CloudConfig, RetrySettings};
pub use domain::nodegroup::{
    NodeGroup, ScalableNodeGroup, ScalableNodeGroupSpec, ScalableNodeGroupStatus,
};
pub use infrastructure::aws::{
    AutoScalingGroup, Capacity, CapacityConstraints, CloudProviderFactory,
};
pub use infrastructure::kubernetes::{NodeGroupStore, NodeGroupStoreImpl};
pub use shared::{ProviderError, Result};

// Re-export API seams for alternative implementations and test doubles
#[doc(hidden)]
pub use infrastructure::aws::api::{AutoScalingApi, Ec2Api, GroupObservation, SsmApi};
#[doc(hidden)]
pub use infrastructure::cache::TtlCache;

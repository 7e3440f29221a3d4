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

/// Product identification
pub const PRODUCT_NAME: &str = "stratus-kube";
pub const PRODUCT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Ownership tags
pub const CLUSTER_TAG_KEY_PREFIX: &str = "kubernetes.io/cluster/";
pub const STRATUS_TAG_KEY_PREFIX: &str = "stratus.sh/cluster/";

/// Cache defaults. The sweep interval exceeds the TTL so expired entries
/// linger unswept only briefly; reads check expiry themselves.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_SWEEP_INTERVAL_SECS: u64 = 600;

/// SSM parameter holding the default EKS-optimized AMI id.
pub const DEFAULT_AMI_PARAMETER: &str =
    "/aws/service/eks/optimized-ami/1.30/amazon-linux-2/recommended/image_id";

/// Launch template naming
pub const LAUNCH_TEMPLATE_NAME_PREFIX: &str = "stratus-nodes-";

/// Tag key set on all Kubernetes-owned resources for `cluster_name`.
pub fn cluster_tag_key(cluster_name: &str) -> String {
    format!("{}{}", CLUSTER_TAG_KEY_PREFIX, cluster_name)
}

/// Tag key set on all Stratus-owned resources for `cluster_name`.
pub fn stratus_tag_key(cluster_name: &str) -> String {
    format!("{}{}", STRATUS_TAG_KEY_PREFIX, cluster_name)
}

/// User-agent style request tag carried by every outbound cloud call.
pub fn request_tag() -> String {
    format!("{}-{}", PRODUCT_NAME, PRODUCT_VERSION)
}

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

//! AWS cloud provider

pub mod api;
pub mod autoscaling;
pub mod capacity;
pub mod factory;
pub mod providers;
pub mod session;

pub use self::autoscaling::AutoScalingGroup;
pub use self::capacity::{Capacity, CapacityConstraints};
pub use self::factory::CloudProviderFactory;
pub use self::session::build_sdk_config;

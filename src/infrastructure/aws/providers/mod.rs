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

//! Cache-backed sub-providers, one per cloud resource kind.
//!
//! Each provider owns its own [`TtlCache`](crate::infrastructure::cache::TtlCache)
//! instance so keys never collide across kinds. Lookups are cache-first;
//! failures are never cached. Mutations (instance launches) bypass caching
//! entirely.

pub mod instance;
pub mod instance_type;
pub mod launch_template;
pub mod security_group;
pub mod subnet;

pub use self::instance::InstanceProvider;
pub use self::instance_type::InstanceTypeProvider;
pub use self::launch_template::LaunchTemplateProvider;
pub use self::security_group::SecurityGroupProvider;
pub use self::subnet::SubnetProvider;

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

//! Narrow trait seams over the AWS SDK clients.
//!
//! The providers and the reconciler talk to these traits, never to the SDK
//! clients directly, so tests can substitute in-memory doubles and the
//! rest of the crate stays free of SDK plumbing.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_ec2::types::{
    Filter, InstanceType, LaunchTemplate, LaunchTemplateSpecification, LocationType,
    RequestLaunchTemplateData, ResourceType, SecurityGroup, Subnet, Tag, TagSpecification,
};

use crate::shared::error::ProviderError;
use crate::shared::Result;

const LAUNCH_TEMPLATE_NOT_FOUND: &str = "InvalidLaunchTemplateName.NotFoundException";

/// EC2 query/create surface used by the sub-providers.
#[async_trait]
pub trait Ec2Api: Send + Sync {
    async fn describe_subnets(&self, filters: Vec<Filter>) -> Result<Vec<Subnet>>;

    async fn describe_security_groups(&self, filters: Vec<Filter>) -> Result<Vec<SecurityGroup>>;

    /// Returns `None` when no launch template with that name exists.
    async fn describe_launch_template(&self, name: &str) -> Result<Option<LaunchTemplate>>;

    async fn create_launch_template(
        &self,
        name: &str,
        image_id: &str,
        security_group_ids: Vec<String>,
    ) -> Result<LaunchTemplate>;

    /// Instance type names offered in an availability zone.
    async fn offered_instance_types(&self, zone: &str) -> Result<Vec<String>>;

    async fn run_instances(
        &self,
        launch_template_id: &str,
        subnet_id: &str,
        instance_type: Option<&str>,
        count: i32,
        tags: Vec<Tag>,
    ) -> Result<Vec<String>>;
}

/// What a describe call observed about one auto scaling group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupObservation {
    pub instance_count: usize,
}

/// AutoScaling surface used by the node group reconciler.
#[async_trait]
pub trait AutoScalingApi: Send + Sync {
    /// Returns `None` when the group does not exist.
    async fn describe_group(&self, name: &str) -> Result<Option<GroupObservation>>;

    async fn update_desired_capacity(&self, name: &str, desired: i32) -> Result<()>;
}

/// SSM parameter store surface (default AMI resolution).
#[async_trait]
pub trait SsmApi: Send + Sync {
    async fn get_parameter(&self, name: &str) -> Result<String>;
}

// ============================================================================
// SDK error mapping
// ============================================================================

/// Map an SDK error into the crate taxonomy, classifying throttling, 5xx and
/// transport timeouts as retryable and validation (4xx) failures as final.
/// The SDK's own bounded retry has already run by the time this is reached.
pub(crate) fn sdk_error<E>(operation: &str, resource: &str, err: &SdkError<E>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let retryable = is_retryable(err);
    let message = match err {
        SdkError::ServiceError(ctx) => ctx
            .err()
            .meta()
            .message()
            .or_else(|| ctx.err().meta().code())
            .unwrap_or("service error")
            .to_string(),
        other => other.to_string(),
    };
    ProviderError::api(operation, resource, message, retryable)
}

fn is_retryable<E>(err: &SdkError<E>) -> bool
where
    E: ProvideErrorMetadata,
{
    match err {
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            true
        }
        SdkError::ServiceError(ctx) => {
            let code = ctx.err().meta().code().unwrap_or("");
            if matches!(
                code,
                "Throttling"
                    | "ThrottlingException"
                    | "RequestLimitExceeded"
                    | "RequestThrottled"
                    | "SlowDown"
            ) {
                return true;
            }
            (500..600).contains(&ctx.raw().status().as_u16())
        }
        _ => false,
    }
}

fn filter_summary(filters: &[Filter]) -> String {
    filters
        .iter()
        .flat_map(|f| f.values())
        .cloned()
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// SDK-backed implementations
// ============================================================================

#[derive(Clone)]
pub struct Ec2ApiClient {
    client: aws_sdk_ec2::Client,
}

impl Ec2ApiClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ec2::Client::new(config),
        }
    }
}

#[async_trait]
impl Ec2Api for Ec2ApiClient {
    async fn describe_subnets(&self, filters: Vec<Filter>) -> Result<Vec<Subnet>> {
        let resource = filter_summary(&filters);
        let output = self
            .client
            .describe_subnets()
            .set_filters(Some(filters))
            .send()
            .await
            .map_err(|e| sdk_error("DescribeSubnets", &resource, &e))?;
        Ok(output.subnets.unwrap_or_default())
    }

    async fn describe_security_groups(&self, filters: Vec<Filter>) -> Result<Vec<SecurityGroup>> {
        let resource = filter_summary(&filters);
        let output = self
            .client
            .describe_security_groups()
            .set_filters(Some(filters))
            .send()
            .await
            .map_err(|e| sdk_error("DescribeSecurityGroups", &resource, &e))?;
        Ok(output.security_groups.unwrap_or_default())
    }

    async fn describe_launch_template(&self, name: &str) -> Result<Option<LaunchTemplate>> {
        match self
            .client
            .describe_launch_templates()
            .launch_template_names(name)
            .send()
            .await
        {
            Ok(output) => Ok(output.launch_templates.unwrap_or_default().into_iter().next()),
            Err(err) => {
                if err.as_service_error().and_then(|e| e.meta().code())
                    == Some(LAUNCH_TEMPLATE_NOT_FOUND)
                {
                    return Ok(None);
                }
                Err(sdk_error("DescribeLaunchTemplates", name, &err))
            }
        }
    }

    async fn create_launch_template(
        &self,
        name: &str,
        image_id: &str,
        security_group_ids: Vec<String>,
    ) -> Result<LaunchTemplate> {
        let data = RequestLaunchTemplateData::builder()
            .image_id(image_id)
            .set_security_group_ids(Some(security_group_ids))
            .build();
        let output = self
            .client
            .create_launch_template()
            .launch_template_name(name)
            .launch_template_data(data)
            .send()
            .await
            .map_err(|e| sdk_error("CreateLaunchTemplate", name, &e))?;
        output.launch_template.ok_or_else(|| {
            ProviderError::api(
                "CreateLaunchTemplate",
                name,
                "response contained no launch template",
                false,
            )
        })
    }

    async fn offered_instance_types(&self, zone: &str) -> Result<Vec<String>> {
        let output = self
            .client
            .describe_instance_type_offerings()
            .location_type(LocationType::AvailabilityZone)
            .filters(Filter::builder().name("location").values(zone).build())
            .send()
            .await
            .map_err(|e| sdk_error("DescribeInstanceTypeOfferings", zone, &e))?;
        Ok(output
            .instance_type_offerings
            .unwrap_or_default()
            .into_iter()
            .filter_map(|offering| offering.instance_type.map(|t| t.as_str().to_string()))
            .collect())
    }

    async fn run_instances(
        &self,
        launch_template_id: &str,
        subnet_id: &str,
        instance_type: Option<&str>,
        count: i32,
        tags: Vec<Tag>,
    ) -> Result<Vec<String>> {
        let mut request = self
            .client
            .run_instances()
            .launch_template(
                LaunchTemplateSpecification::builder()
                    .launch_template_id(launch_template_id)
                    .build(),
            )
            .subnet_id(subnet_id)
            .min_count(count)
            .max_count(count)
            .tag_specifications(
                TagSpecification::builder()
                    .resource_type(ResourceType::Instance)
                    .set_tags(Some(tags))
                    .build(),
            );
        if let Some(instance_type) = instance_type {
            request = request.instance_type(InstanceType::from(instance_type));
        }
        let output = request
            .send()
            .await
            .map_err(|e| sdk_error("RunInstances", launch_template_id, &e))?;
        Ok(output
            .instances
            .unwrap_or_default()
            .into_iter()
            .filter_map(|instance| instance.instance_id)
            .collect())
    }
}

#[derive(Clone)]
pub struct AutoScalingApiClient {
    client: aws_sdk_autoscaling::Client,
}

impl AutoScalingApiClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_autoscaling::Client::new(config),
        }
    }
}

#[async_trait]
impl AutoScalingApi for AutoScalingApiClient {
    async fn describe_group(&self, name: &str) -> Result<Option<GroupObservation>> {
        let output = self
            .client
            .describe_auto_scaling_groups()
            .auto_scaling_group_names(name)
            .max_records(1)
            .send()
            .await
            .map_err(|e| sdk_error("DescribeAutoScalingGroups", name, &e))?;
        Ok(output
            .auto_scaling_groups
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(|group| GroupObservation {
                instance_count: group.instances.unwrap_or_default().len(),
            }))
    }

    async fn update_desired_capacity(&self, name: &str, desired: i32) -> Result<()> {
        self.client
            .update_auto_scaling_group()
            .auto_scaling_group_name(name)
            .desired_capacity(desired)
            .send()
            .await
            .map_err(|e| sdk_error("UpdateAutoScalingGroup", name, &e))?;
        Ok(())
    }
}

#[derive(Clone)]
pub struct SsmApiClient {
    client: aws_sdk_ssm::Client,
}

impl SsmApiClient {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: aws_sdk_ssm::Client::new(config),
        }
    }
}

#[async_trait]
impl SsmApi for SsmApiClient {
    async fn get_parameter(&self, name: &str) -> Result<String> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .send()
            .await
            .map_err(|e| sdk_error("GetParameter", name, &e))?;
        output
            .parameter
            .and_then(|parameter| parameter.value)
            .ok_or_else(|| ProviderError::not_found("SsmParameter", name))
    }
}

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

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_ec2::types::{Filter, LaunchTemplate, SecurityGroup, Subnet, Tag};
use futures::future::join_all;
use stratus_kube::infrastructure::aws::providers::{
    InstanceProvider, InstanceTypeProvider, LaunchTemplateProvider, SecurityGroupProvider,
    SubnetProvider,
};
use stratus_kube::{
    AutoScalingApi, CapacityConstraints, CloudConfig, CloudProviderFactory, Ec2Api,
    GroupObservation, ProviderError, Result, ScalableNodeGroup, ScalableNodeGroupSpec, SsmApi,
};

const TTL: Duration = Duration::from_secs(60);
const SWEEP: Duration = Duration::from_secs(120);

fn zone_of(filters: &[Filter]) -> String {
    filters
        .iter()
        .find(|f| f.name() == Some("availability-zone"))
        .and_then(|f| f.values().first())
        .cloned()
        .unwrap_or_else(|| "*".to_string())
}

#[derive(Default)]
struct FakeEc2 {
    subnet_calls: Mutex<Vec<String>>,
    sg_calls: AtomicUsize,
    offering_calls: AtomicUsize,
    lt_describe_calls: AtomicUsize,
    created_templates: Mutex<Vec<String>>,
    existing_template: Option<LaunchTemplate>,
    fail_subnets: AtomicBool,
    run_requests: Mutex<Vec<(String, String, Option<String>, i32, Vec<Tag>)>>,
}

impl FakeEc2 {
    fn subnet_call_count(&self) -> usize {
        self.subnet_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Ec2Api for FakeEc2 {
    async fn describe_subnets(&self, filters: Vec<Filter>) -> Result<Vec<Subnet>> {
        if self.fail_subnets.load(Ordering::SeqCst) {
            return Err(ProviderError::api("DescribeSubnets", "fake", "throttled", true));
        }
        let zone = zone_of(&filters);
        self.subnet_calls.lock().unwrap().push(zone.clone());
        let az = if zone == "*" { "us-east-1a".to_string() } else { zone };
        Ok(vec![Subnet::builder()
            .subnet_id(format!("subnet-{}", az))
            .availability_zone(az)
            .build()])
    }

    async fn describe_security_groups(&self, _filters: Vec<Filter>) -> Result<Vec<SecurityGroup>> {
        self.sg_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![SecurityGroup::builder().group_id("sg-1234").build()])
    }

    async fn describe_launch_template(&self, _name: &str) -> Result<Option<LaunchTemplate>> {
        self.lt_describe_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.existing_template.clone())
    }

    async fn create_launch_template(
        &self,
        name: &str,
        image_id: &str,
        security_group_ids: Vec<String>,
    ) -> Result<LaunchTemplate> {
        assert_eq!(security_group_ids, vec!["sg-1234".to_string()]);
        assert!(!image_id.is_empty());
        self.created_templates.lock().unwrap().push(name.to_string());
        Ok(LaunchTemplate::builder()
            .launch_template_id("lt-0001")
            .launch_template_name(name)
            .build())
    }

    async fn offered_instance_types(&self, _zone: &str) -> Result<Vec<String>> {
        self.offering_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["m5.large".to_string(), "c5.xlarge".to_string()])
    }

    async fn run_instances(
        &self,
        launch_template_id: &str,
        subnet_id: &str,
        instance_type: Option<&str>,
        count: i32,
        tags: Vec<Tag>,
    ) -> Result<Vec<String>> {
        self.run_requests.lock().unwrap().push((
            launch_template_id.to_string(),
            subnet_id.to_string(),
            instance_type.map(str::to_string),
            count,
            tags,
        ));
        Ok((0..count).map(|i| format!("i-{:04}", i)).collect())
    }
}

#[derive(Default)]
struct FakeSsm {
    calls: AtomicUsize,
}

#[async_trait]
impl SsmApi for FakeSsm {
    async fn get_parameter(&self, _name: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("ami-0123456789".to_string())
    }
}

struct UnreachableAutoScaling;

#[async_trait]
impl AutoScalingApi for UnreachableAutoScaling {
    async fn describe_group(&self, _name: &str) -> Result<Option<GroupObservation>> {
        unreachable!("no AutoScaling call expected");
    }

    async fn update_desired_capacity(&self, _name: &str, _desired: i32) -> Result<()> {
        unreachable!("no AutoScaling call expected");
    }
}

// ============================================================================
// Sub-provider caching
// ============================================================================

#[tokio::test]
async fn subnet_queries_with_distinct_filters_never_share_an_entry() {
    let ec2 = Arc::new(FakeEc2::default());
    let provider = SubnetProvider::new(ec2.clone(), "alpha", TTL, SWEEP);

    provider.resolve(None).await.unwrap();
    provider.resolve(None).await.unwrap();
    assert_eq!(ec2.subnet_call_count(), 1);

    provider.resolve(Some("us-east-1a")).await.unwrap();
    provider.resolve(Some("us-east-1b")).await.unwrap();
    assert_eq!(ec2.subnet_call_count(), 3);

    // every key is now warm
    provider.resolve(None).await.unwrap();
    provider.resolve(Some("us-east-1a")).await.unwrap();
    provider.resolve(Some("us-east-1b")).await.unwrap();
    assert_eq!(ec2.subnet_call_count(), 3);
}

#[tokio::test]
async fn failed_lookups_are_not_cached() {
    let ec2 = Arc::new(FakeEc2::default());
    let provider = SubnetProvider::new(ec2.clone(), "alpha", TTL, SWEEP);

    ec2.fail_subnets.store(true, Ordering::SeqCst);
    assert!(provider.resolve(None).await.is_err());

    ec2.fail_subnets.store(false, Ordering::SeqCst);
    let subnets = provider.resolve(None).await.unwrap();
    assert_eq!(subnets.len(), 1);
    assert_eq!(ec2.subnet_call_count(), 1);
}

#[tokio::test]
async fn expired_entries_trigger_a_refetch_without_sweep() {
    let ec2 = Arc::new(FakeEc2::default());
    let provider = SubnetProvider::new(ec2.clone(), "alpha", Duration::from_millis(20), SWEEP);

    provider.resolve(None).await.unwrap();
    tokio::time::sleep(Duration::from_millis(40)).await;
    provider.resolve(None).await.unwrap();
    assert_eq!(ec2.subnet_call_count(), 2);
}

#[tokio::test]
async fn concurrent_resolves_match_the_sequential_baseline() {
    let ec2 = Arc::new(FakeEc2::default());
    let provider = Arc::new(SubnetProvider::new(ec2.clone(), "alpha", TTL, SWEEP));

    let baseline_a = provider.resolve(Some("us-east-1a")).await.unwrap();
    let baseline_b = provider.resolve(Some("us-east-1b")).await.unwrap();

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let provider = provider.clone();
            tokio::spawn(async move {
                let zone = if i % 2 == 0 { "us-east-1a" } else { "us-east-1b" };
                provider.resolve(Some(zone)).await.unwrap()
            })
        })
        .collect();

    for (i, result) in join_all(tasks).await.into_iter().enumerate() {
        let subnets = result.unwrap();
        let expected = if i % 2 == 0 { &baseline_a } else { &baseline_b };
        assert_eq!(
            subnets.first().and_then(|s| s.subnet_id()),
            expected.first().and_then(|s| s.subnet_id())
        );
    }
    // both keys were warm before the concurrent burst
    assert_eq!(ec2.subnet_call_count(), 2);
}

// ============================================================================
// Launch template composition
// ============================================================================

#[tokio::test]
async fn launch_template_is_created_once_from_composed_providers() {
    let ec2 = Arc::new(FakeEc2::default());
    let ssm = Arc::new(FakeSsm::default());
    let security_groups = Arc::new(SecurityGroupProvider::new(ec2.clone(), "alpha", TTL, SWEEP));
    let provider = LaunchTemplateProvider::new(
        ec2.clone(),
        ssm.clone(),
        security_groups,
        "alpha",
        TTL,
        SWEEP,
    );

    let template = provider.resolve().await.unwrap();
    assert_eq!(template.launch_template_id(), Some("lt-0001"));
    assert_eq!(ec2.sg_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ssm.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        *ec2.created_templates.lock().unwrap(),
        vec!["stratus-nodes-alpha".to_string()]
    );

    // second resolution comes from cache, no further upstream traffic
    provider.resolve().await.unwrap();
    assert_eq!(ec2.lt_describe_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ec2.sg_calls.load(Ordering::SeqCst), 1);
    assert_eq!(ssm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn existing_launch_template_skips_creation_entirely() {
    let ec2 = Arc::new(FakeEc2 {
        existing_template: Some(
            LaunchTemplate::builder()
                .launch_template_id("lt-live")
                .launch_template_name("stratus-nodes-alpha")
                .build(),
        ),
        ..FakeEc2::default()
    });
    let ssm = Arc::new(FakeSsm::default());
    let security_groups = Arc::new(SecurityGroupProvider::new(ec2.clone(), "alpha", TTL, SWEEP));
    let provider = LaunchTemplateProvider::new(
        ec2.clone(),
        ssm.clone(),
        security_groups,
        "alpha",
        TTL,
        SWEEP,
    );

    let template = provider.resolve().await.unwrap();
    assert_eq!(template.launch_template_id(), Some("lt-live"));
    assert_eq!(ec2.sg_calls.load(Ordering::SeqCst), 0);
    assert_eq!(ssm.calls.load(Ordering::SeqCst), 0);
    assert!(ec2.created_templates.lock().unwrap().is_empty());
}

// ============================================================================
// Factory and capacity handle
// ============================================================================

fn node_group(id: &str, replicas: Option<i32>) -> ScalableNodeGroup {
    ScalableNodeGroup::new(
        "main",
        ScalableNodeGroupSpec {
            id: id.to_string(),
            replicas,
        },
    )
}

fn test_config() -> CloudConfig {
    CloudConfig {
        cluster_name: "alpha".to_string(),
        region: Some("us-east-1".to_string()),
        ..CloudConfig::default()
    }
}

#[tokio::test]
async fn capacity_for_performs_no_network_io() {
    struct UnreachableEc2;

    #[async_trait]
    impl Ec2Api for UnreachableEc2 {
        async fn describe_subnets(&self, _: Vec<Filter>) -> Result<Vec<Subnet>> {
            unreachable!("no EC2 call expected");
        }
        async fn describe_security_groups(&self, _: Vec<Filter>) -> Result<Vec<SecurityGroup>> {
            unreachable!("no EC2 call expected");
        }
        async fn describe_launch_template(&self, _: &str) -> Result<Option<LaunchTemplate>> {
            unreachable!("no EC2 call expected");
        }
        async fn create_launch_template(
            &self,
            _: &str,
            _: &str,
            _: Vec<String>,
        ) -> Result<LaunchTemplate> {
            unreachable!("no EC2 call expected");
        }
        async fn offered_instance_types(&self, _: &str) -> Result<Vec<String>> {
            unreachable!("no EC2 call expected");
        }
        async fn run_instances(
            &self,
            _: &str,
            _: &str,
            _: Option<&str>,
            _: i32,
            _: Vec<Tag>,
        ) -> Result<Vec<String>> {
            unreachable!("no EC2 call expected");
        }
    }

    struct UnreachableSsm;

    #[async_trait]
    impl SsmApi for UnreachableSsm {
        async fn get_parameter(&self, _: &str) -> Result<String> {
            unreachable!("no SSM call expected");
        }
    }

    let factory = CloudProviderFactory::assemble(
        &test_config(),
        Arc::new(UnreachableEc2),
        Arc::new(UnreachableSsm),
        Arc::new(UnreachableAutoScaling),
    );

    // handles are cheap and independent; I/O only happens on first use
    let first = factory.capacity_for(&node_group("asg-main", Some(3)));
    let second = factory.capacity_for(&node_group("asg-batch", None));
    assert_eq!(first.node_group().spec.id, "asg-main");
    assert_eq!(second.node_group().spec.id, "asg-batch");
}

#[tokio::test]
async fn capacity_create_resolves_through_every_provider() {
    let ec2 = Arc::new(FakeEc2::default());
    let ssm = Arc::new(FakeSsm::default());
    let factory = CloudProviderFactory::assemble(
        &test_config(),
        ec2.clone(),
        ssm,
        Arc::new(UnreachableAutoScaling),
    );
    let capacity = factory.capacity_for(&node_group("asg-main", Some(2)));

    let constraints = CapacityConstraints {
        count: 2,
        zone: Some("us-east-1a".to_string()),
        instance_type: Some("m5.large".to_string()),
    };
    let instance_ids = capacity.create(&constraints).await.unwrap();
    assert_eq!(instance_ids.len(), 2);

    let requests = ec2.run_requests.lock().unwrap();
    let (template_id, subnet_id, instance_type, count, tags) = &requests[0];
    assert_eq!(template_id, "lt-0001");
    assert_eq!(subnet_id, "subnet-us-east-1a");
    assert_eq!(instance_type.as_deref(), Some("m5.large"));
    assert_eq!(*count, 2);
    assert!(tags
        .iter()
        .any(|tag| tag.key() == Some("kubernetes.io/cluster/alpha")));
}

#[tokio::test]
async fn capacity_create_rejects_an_unoffered_instance_type() {
    let ec2 = Arc::new(FakeEc2::default());
    let factory = CloudProviderFactory::assemble(
        &test_config(),
        ec2.clone(),
        Arc::new(FakeSsm::default()),
        Arc::new(UnreachableAutoScaling),
    );
    let capacity = factory.capacity_for(&node_group("asg-main", Some(1)));

    let constraints = CapacityConstraints {
        count: 1,
        zone: Some("us-east-1a".to_string()),
        instance_type: Some("u-6tb1.metal".to_string()),
    };
    let err = capacity.create(&constraints).await.unwrap_err();
    assert!(matches!(err, ProviderError::NotFound { .. }));
    assert!(ec2.run_requests.lock().unwrap().is_empty());
}

// ============================================================================
// Instance type / instance providers
// ============================================================================

#[tokio::test]
async fn instance_type_offerings_are_cached_per_zone() {
    let ec2 = Arc::new(FakeEc2::default());
    let provider = InstanceTypeProvider::new(ec2.clone(), TTL, SWEEP);

    provider.resolve("us-east-1a").await.unwrap();
    provider.resolve("us-east-1a").await.unwrap();
    assert_eq!(ec2.offering_calls.load(Ordering::SeqCst), 1);

    provider.resolve("us-east-1b").await.unwrap();
    assert_eq!(ec2.offering_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn instance_launches_carry_ownership_tags() {
    let ec2 = Arc::new(FakeEc2::default());
    let provider = InstanceProvider::new(ec2.clone(), "alpha");
    let subnet = Subnet::builder()
        .subnet_id("subnet-1")
        .availability_zone("us-east-1a")
        .build();

    let ids = provider.create("lt-0001", &subnet, None, 3).await.unwrap();
    assert_eq!(ids.len(), 3);

    let requests = ec2.run_requests.lock().unwrap();
    let tags = &requests[0].4;
    assert!(tags.iter().any(|tag| tag.key() == Some("stratus.sh/cluster/alpha")));
    assert!(tags.iter().all(|tag| tag.value() == Some("owned")));
}

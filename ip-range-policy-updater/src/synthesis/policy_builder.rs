//! Builds the S3 read policy and pins it to a set of source CIDRs.

use crate::types::{ConditionBlock, Effect, PolicyDocument, Statement, POLICY_VERSION};
use std::collections::BTreeMap;

/// Actions granted on the prefixed buckets.
pub const S3_READ_ACTIONS: [&str; 3] = ["s3:GetObject", "s3:ListBucket", "s3:GetBucketLocation"];

pub const IP_ADDRESS_OPERATOR: &str = "IpAddress";
pub const SOURCE_IP_KEY: &str = "aws:SourceIp";

/// Object ARN pattern covering every bucket whose name starts with `prefix`.
pub fn bucket_prefix_arn(prefix: &str) -> String {
    format!("arn:aws:s3:::{prefix}*/*")
}

/// Single-statement allow policy for the buckets named by `prefix`.
///
/// The resource pattern is listed twice; deployed policies have always carried
/// both entries and the duplicate is kept so rewrites produce the same shape.
pub fn base_policy(prefix: &str) -> PolicyDocument {
    let resource = bucket_prefix_arn(prefix);
    PolicyDocument {
        version: POLICY_VERSION.to_string(),
        statement: vec![Statement {
            action: S3_READ_ACTIONS.iter().map(ToString::to_string).collect(),
            resource: vec![resource.clone(), resource],
            effect: Effect::Allow,
            condition: None,
        }],
    }
}

/// Replaces the condition of every statement with `IpAddress: {aws:SourceIp: cidrs}`.
///
/// Any previous condition is discarded, never merged.
pub fn with_source_ip_condition(mut policy: PolicyDocument, cidrs: &[String]) -> PolicyDocument {
    for statement in &mut policy.statement {
        let mut condition = ConditionBlock::new();
        condition.insert(
            IP_ADDRESS_OPERATOR.to_string(),
            BTreeMap::from([(SOURCE_IP_KEY.to_string(), cidrs.to_vec())]),
        );
        statement.condition = Some(condition);
    }
    policy
}

pub fn build_region_policy(prefix: &str, cidrs: &[String]) -> PolicyDocument {
    with_source_ip_condition(base_policy(prefix), cidrs)
}

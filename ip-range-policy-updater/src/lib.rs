//! This crate provides the core logic of the IP range policy updater:
//! - AWS IP range feed fetching and per-region filtering
//! - S3 read policy synthesis pinned to `aws:SourceIp`
//! - IAM inline role policy writes
//! - CloudFormation custom resource callbacks
//!

mod aws;
pub mod cfn;
pub mod commands;
pub mod config;
mod error;
pub mod feed;
mod synthesis;
mod types;

// Re-exports for a small, focused public API
pub use aws::{resolve_region, AwsIamClient, PutRolePolicyReceipt, RolePolicyWriter};
pub use cfn::{
    CallbackNotifier, CallbackResponse, CustomResourceEvent, HttpCallbackNotifier, RequestType,
    ResponseStatus,
};
pub use commands::{AppliedPolicy, PolicyUpdaterService};
pub use config::{Settings, UpdaterConfig};
pub use error::{UpdaterError, UpdaterResult};
pub use feed::{HttpIpRangeSource, IpPrefixEntry, IpRangeFeed, IpRangeSource};
pub use synthesis::{base_policy, build_region_policy, with_source_ip_condition};
pub use types::{ConditionBlock, Effect, PolicyDocument, Statement, UpdateOutcome, POLICY_VERSION};

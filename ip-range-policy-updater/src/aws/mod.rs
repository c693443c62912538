//! AWS SDK integration: IAM inline policy writes and region resolution.

pub mod iam_client;
pub mod region;

pub use iam_client::{AwsIamClient, PutRolePolicyReceipt, RolePolicyWriter};
pub use region::resolve_region;

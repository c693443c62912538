//! Runtime settings, read from the function's environment.

use crate::error::{UpdaterError, UpdaterResult};
use crate::feed::AWS_IP_RANGES_URL;
use clap::Parser;

/// Settings for the policy updater.
///
/// Required values are optional here and checked per invocation, so a
/// misconfigured function still reports `FAILED` to CloudFormation instead of
/// dying during start-up.
#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "ip-range-policy-updater",
    version,
    about = "Pins an IAM role's inline S3 policy to AWS's published IP ranges for the current region"
)]
pub struct Settings {
    /// S3 bucket-name prefix the policy grants read access to
    #[arg(long, env = "prefix")]
    pub prefix: Option<String>,

    /// IAM role that receives the inline policy
    #[arg(long, env = "iam_role_name")]
    pub iam_role_name: Option<String>,

    /// Name of the inline policy to create or replace
    #[arg(long, env = "policy_name")]
    pub policy_name: Option<String>,

    /// IP range feed to read
    #[arg(long, env = "IP_RANGES_URL", default_value = AWS_IP_RANGES_URL)]
    pub ip_ranges_url: String,
}

/// Settings with every required value present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdaterConfig {
    pub prefix: String,
    pub iam_role_name: String,
    pub policy_name: String,
}

impl Settings {
    pub fn validate(&self) -> UpdaterResult<UpdaterConfig> {
        Ok(UpdaterConfig {
            prefix: required(self.prefix.as_deref(), "prefix")?,
            iam_role_name: required(self.iam_role_name.as_deref(), "iam_role_name")?,
            policy_name: required(self.policy_name.as_deref(), "policy_name")?,
        })
    }

    /// Role name for diagnostics, whether or not it is set.
    pub fn role_label(&self) -> &str {
        self.iam_role_name.as_deref().unwrap_or("<unset>")
    }

    /// Policy name for diagnostics, whether or not it is set.
    pub fn policy_label(&self) -> &str {
        self.policy_name.as_deref().unwrap_or("<unset>")
    }
}

fn required(value: Option<&str>, name: &'static str) -> UpdaterResult<String> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(UpdaterError::MissingConfig(name)),
    }
}

//! Shared data types: IAM policy documents and invocation outcomes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// IAM policy language version written into every document.
pub const POLICY_VERSION: &str = "2012-10-17";

/// Condition block of a statement: operator -> condition key -> values.
pub type ConditionBlock = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    pub action: Vec<String>,
    pub resource: Vec<String>,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<ConditionBlock>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

/// Result of one invocation, returned to the Lambda runtime.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "Status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateOutcome {
    /// The policy was written.
    #[serde(rename_all = "PascalCase")]
    Success {
        region: String,
        role_name: String,
        policy_name: String,
        cidr_count: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    /// The policy was left untouched (CloudFormation delete).
    Skipped,
    /// Any step failed; carries the diagnostic that was reported.
    #[serde(rename_all = "PascalCase")]
    Failed { reason: String },
}

impl UpdateOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

//! AWS IAM client wrapper for inline role policy writes

use crate::error::{UpdaterError, UpdaterResult};
use crate::types::PolicyDocument;
use async_trait::async_trait;
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_iam::operation::RequestId;
use aws_sdk_iam::Client as IamClient;

/// Error codes IAM uses when the caller lacks permission.
const AUTHORIZATION_ERROR_CODES: [&str; 3] =
    ["AccessDenied", "AccessDeniedException", "UnauthorizedOperation"];

/// What IAM handed back for a successful write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PutRolePolicyReceipt {
    pub request_id: Option<String>,
}

/// Destination for the synthesized inline policy.
#[async_trait]
pub trait RolePolicyWriter: Send + Sync {
    /// Creates or replaces the inline policy `policy_name` on `role_name`.
    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> UpdaterResult<PutRolePolicyReceipt>;
}

pub struct AwsIamClient {
    client: IamClient,
}

impl AwsIamClient {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RolePolicyWriter for AwsIamClient {
    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> UpdaterResult<PutRolePolicyReceipt> {
        let policy_json = serde_json::to_string(policy_document)?;

        let output = self
            .client
            .put_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .policy_document(policy_json)
            .send()
            .await
            .map_err(|e| {
                let code = e.as_service_error().and_then(|se| se.code());
                classify_iam_error(
                    code,
                    format!(
                        "Failed to put role policy '{policy_name}' on role '{role_name}': {}",
                        DisplayErrorContext(&e)
                    ),
                )
            })?;

        Ok(PutRolePolicyReceipt {
            request_id: output.request_id().map(str::to_string),
        })
    }
}

/// Splits IAM failures into permission problems and everything else.
pub(crate) fn classify_iam_error(code: Option<&str>, message: String) -> UpdaterError {
    match code {
        Some(code) if AUTHORIZATION_ERROR_CODES.contains(&code) => {
            UpdaterError::Authorization(message)
        }
        _ => UpdaterError::Api(message),
    }
}

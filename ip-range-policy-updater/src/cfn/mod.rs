//! CloudFormation custom resource plumbing: request events and completion callbacks.

pub mod response;

pub use response::{CallbackNotifier, CallbackResponse, HttpCallbackNotifier, ResponseStatus};

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum RequestType {
    Create,
    Update,
    Delete,
    #[serde(other)]
    Unknown,
}

/// Invocation payload. Every field is optional so scheduled or manual
/// invocations, which carry none of them, deserialize as well.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceEvent {
    #[serde(default)]
    pub request_type: Option<RequestType>,
    #[serde(rename = "ResponseURL", default)]
    pub response_url: Option<String>,
    #[serde(default)]
    pub stack_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub logical_resource_id: Option<String>,
    #[serde(default)]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Option<serde_json::Value>,
}

impl CustomResourceEvent {
    /// Callback URL, when the invocation came from CloudFormation.
    pub fn callback_url(&self) -> Option<&str> {
        self.response_url.as_deref().filter(|url| !url.is_empty())
    }

    pub fn is_delete(&self) -> bool {
        self.request_type == Some(RequestType::Delete)
    }
}

//! Completion notifications sent to a custom resource's pre-signed `ResponseURL`.

use super::CustomResourceEvent;
use crate::error::{UpdaterError, UpdaterResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

impl ResponseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failed => "FAILED",
        }
    }
}

/// Payload under the response's `Data` key.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResponseData {
    #[serde(rename = "Data")]
    pub data: String,
}

/// Body CloudFormation expects at the callback URL.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CallbackResponse {
    pub status: ResponseStatus,
    pub reason: String,
    pub physical_resource_id: String,
    pub stack_id: Option<String>,
    pub request_id: Option<String>,
    pub logical_resource_id: Option<String>,
    pub no_echo: bool,
    pub data: ResponseData,
}

impl CallbackResponse {
    /// Response for `event`.
    ///
    /// The physical id is the one CloudFormation already tracks, or the log
    /// stream name on first creation. Failures put the diagnostic in `Reason`.
    pub fn for_event(
        event: &CustomResourceEvent,
        status: ResponseStatus,
        data: impl Into<String>,
        log_stream_name: &str,
    ) -> Self {
        let data = data.into();
        let reason = match status {
            ResponseStatus::Success => {
                format!("See the details in CloudWatch Log Stream: {log_stream_name}")
            }
            ResponseStatus::Failed => data.clone(),
        };

        Self {
            status,
            reason,
            physical_resource_id: event
                .physical_resource_id
                .clone()
                .unwrap_or_else(|| log_stream_name.to_string()),
            stack_id: event.stack_id.clone(),
            request_id: event.request_id.clone(),
            logical_resource_id: event.logical_resource_id.clone(),
            no_echo: false,
            data: ResponseData { data },
        }
    }
}

/// Delivers completion notifications to the orchestrator.
#[async_trait]
pub trait CallbackNotifier: Send + Sync {
    async fn send(&self, response_url: &str, response: &CallbackResponse) -> UpdaterResult<()>;
}

/// PUTs the response JSON to the pre-signed URL.
pub struct HttpCallbackNotifier {
    client: reqwest::Client,
}

impl HttpCallbackNotifier {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CallbackNotifier for HttpCallbackNotifier {
    async fn send(&self, response_url: &str, response: &CallbackResponse) -> UpdaterResult<()> {
        let body = serde_json::to_string(response)?;
        log::debug!("Callback response body: {body}");

        // The URL is signed for an empty content type.
        let reply = self
            .client
            .put(response_url)
            .header(CONTENT_TYPE, "")
            .body(body)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| UpdaterError::Callback(e.to_string()))?;

        log::info!("Callback status code: {}", reply.status());
        Ok(())
    }
}

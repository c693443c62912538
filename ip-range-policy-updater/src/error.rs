//! Error types for policy update operations.

use thiserror::Error;

/// Errors that can occur while synchronizing the role policy.
///
/// Every variant is reported the same way by the service: formatted into a
/// single diagnostic, logged, and forwarded to the callback when there is one.
#[derive(Error, Debug)]
pub enum UpdaterError {
    /// No region could be resolved from the execution environment.
    #[error("unable to resolve the active AWS region")]
    RegionUnresolved,

    /// A required setting was not provided.
    #[error("missing required setting '{0}'")]
    MissingConfig(&'static str),

    /// The IP range feed could not be reached or answered with an error status.
    #[error("failed to fetch IP ranges: {0}")]
    Network(String),

    /// The IP range feed payload was not the expected JSON document.
    #[error("failed to parse IP ranges: {0}")]
    Parse(String),

    /// IAM rejected the write for lack of permission.
    #[error("not authorized to update role policy: {0}")]
    Authorization(String),

    /// IAM rejected the write for any other reason.
    #[error("IAM API error: {0}")]
    Api(String),

    #[error("failed to serialize policy document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The completion notification could not be delivered.
    #[error("failed to send callback response: {0}")]
    Callback(String),
}

pub type UpdaterResult<T> = Result<T, UpdaterError>;

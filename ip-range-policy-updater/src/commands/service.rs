//! Policy updater service layer
//!
//! Holds the collaborators one invocation needs (feed source, IAM writer,
//! callback notifier) together with the settings and the resolved region.
//! Clients are built once per cold start and reused across invocations.

use crate::aws::{resolve_region, AwsIamClient, RolePolicyWriter};
use crate::cfn::{CallbackNotifier, HttpCallbackNotifier};
use crate::config::Settings;
use crate::error::{UpdaterError, UpdaterResult};
use crate::feed::{HttpIpRangeSource, IpRangeSource};
use aws_config::SdkConfig;
use aws_sdk_iam::Client as IamClient;
use std::sync::Arc;

/// Main service struct that holds the clients and runs policy updates
pub struct PolicyUpdaterService {
    pub(crate) settings: Settings,
    pub(crate) region: Option<String>,
    pub(crate) ip_ranges: Arc<dyn IpRangeSource>,
    pub(crate) iam: Arc<dyn RolePolicyWriter>,
    pub(crate) notifier: Arc<dyn CallbackNotifier>,
}

impl PolicyUpdaterService {
    /// Create a service backed by the real feed endpoint, IAM and callback URL.
    ///
    /// The region is taken from `config`; an unresolved region is not an
    /// error here but fails each invocation.
    pub fn new(settings: Settings, config: &SdkConfig) -> UpdaterResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| UpdaterError::Network(format!("failed to build HTTP client: {e}")))?;

        let ip_ranges = HttpIpRangeSource::new(http.clone(), settings.ip_ranges_url.clone());
        log::debug!("Using IP range feed {}", ip_ranges.url());

        Ok(Self::from_parts(
            settings,
            resolve_region(config),
            Arc::new(ip_ranges),
            Arc::new(AwsIamClient::new(IamClient::new(config))),
            Arc::new(HttpCallbackNotifier::new(http)),
        ))
    }

    /// Assemble a service from explicit collaborators.
    pub fn from_parts(
        settings: Settings,
        region: Option<String>,
        ip_ranges: Arc<dyn IpRangeSource>,
        iam: Arc<dyn RolePolicyWriter>,
        notifier: Arc<dyn CallbackNotifier>,
    ) -> Self {
        Self {
            settings,
            region,
            ip_ranges,
            iam,
            notifier,
        }
    }

    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    // update() and handle() are in update.rs
}

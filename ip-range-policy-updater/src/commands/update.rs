//! Update logic for the policy updater service

use crate::cfn::{CallbackResponse, CustomResourceEvent, ResponseStatus};
use crate::config::UpdaterConfig;
use crate::error::{UpdaterError, UpdaterResult};
use crate::synthesis::build_region_policy;
use crate::types::{PolicyDocument, UpdateOutcome};

/// `Data` payload reported on success.
pub const SUCCESS_DATA: &str = "Good";

/// A policy that was written to IAM.
#[derive(Debug, Clone)]
pub struct AppliedPolicy {
    pub region: String,
    pub config: UpdaterConfig,
    pub cidrs: Vec<String>,
    pub policy: PolicyDocument,
    pub request_id: Option<String>,
}

impl From<AppliedPolicy> for UpdateOutcome {
    fn from(applied: AppliedPolicy) -> Self {
        Self::Success {
            region: applied.region,
            role_name: applied.config.iam_role_name,
            policy_name: applied.config.policy_name,
            cidr_count: applied.cidrs.len(),
            request_id: applied.request_id,
        }
    }
}

impl super::service::PolicyUpdaterService {
    /// Run one invocation: update the policy and report to the callback URL.
    ///
    /// Every failure is caught here, logged, forwarded as `FAILED` when the
    /// event has a callback URL, and returned as [`UpdateOutcome::Failed`].
    pub async fn handle(
        &self,
        event: &CustomResourceEvent,
        log_stream_name: &str,
    ) -> UpdateOutcome {
        if event.is_delete() {
            log::info!(
                "Delete request for {}; leaving policy '{}' on role '{}' in place",
                event.logical_resource_id.as_deref().unwrap_or("<unknown>"),
                self.settings.policy_label(),
                self.settings.role_label()
            );
            self.notify(event, ResponseStatus::Success, SUCCESS_DATA, log_stream_name)
                .await;
            return UpdateOutcome::Skipped;
        }

        match self.update().await {
            Ok(applied) => {
                self.notify(event, ResponseStatus::Success, SUCCESS_DATA, log_stream_name)
                    .await;
                applied.into()
            }
            Err(e) => {
                let diagnostic = self.diagnostic(&e);
                log::error!("{diagnostic}");
                self.notify(event, ResponseStatus::Failed, diagnostic.clone(), log_stream_name)
                    .await;
                UpdateOutcome::Failed { reason: diagnostic }
            }
        }
    }

    /// Replace the inline policy with one pinned to the region's AMAZON CIDRs.
    pub async fn update(&self) -> UpdaterResult<AppliedPolicy> {
        let region = self
            .region
            .clone()
            .ok_or(UpdaterError::RegionUnresolved)?;
        log::info!("Current region is {region}");

        let config = self.settings.validate()?;

        let feed = self.ip_ranges.fetch().await?;
        let cidrs = feed.region_cidrs(&region);
        log::info!("Found {} AMAZON prefixes for {region}", cidrs.len());

        let policy = build_region_policy(&config.prefix, &cidrs);

        let receipt = self
            .iam
            .put_role_policy(&config.iam_role_name, &config.policy_name, &policy)
            .await?;
        log::info!(
            "Updated policy '{}' on role '{}' (request id {})",
            config.policy_name,
            config.iam_role_name,
            receipt.request_id.as_deref().unwrap_or("<none>")
        );

        Ok(AppliedPolicy {
            region,
            config,
            cidrs,
            policy,
            request_id: receipt.request_id,
        })
    }

    fn diagnostic(&self, error: &UpdaterError) -> String {
        format!(
            "There was a problem updating policy {} for role {} in region {}: {}",
            self.settings.policy_label(),
            self.settings.role_label(),
            self.region.as_deref().unwrap_or(""),
            error
        )
    }

    /// Send the completion notification when the event carries a callback URL.
    /// Delivery problems are logged and otherwise ignored.
    async fn notify(
        &self,
        event: &CustomResourceEvent,
        status: ResponseStatus,
        data: impl Into<String>,
        log_stream_name: &str,
    ) {
        let Some(url) = event.callback_url() else {
            return;
        };

        log::info!(
            "Sending {} message to callback URL {}",
            status.as_str(),
            without_query(url)
        );
        let response = CallbackResponse::for_event(event, status, data, log_stream_name);
        if let Err(e) = self.notifier.send(url, &response).await {
            log::error!("{e}");
        }
    }
}

/// Pre-signed URLs carry credentials in the query string; keep them out of logs.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aws::{PutRolePolicyReceipt, RolePolicyWriter};
    use crate::cfn::{CallbackNotifier, RequestType};
    use crate::commands::PolicyUpdaterService;
    use crate::config::Settings;
    use crate::feed::{IpRangeFeed, IpRangeSource};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    const CALLBACK_URL: &str = "https://cfn-response.example.com/signed?X-Amz-Signature=secret";
    const LOG_STREAM: &str = "2024/01/01/[$LATEST]0123456789abcdef";

    struct FakeFeed {
        feed: Option<IpRangeFeed>,
        fetches: AtomicUsize,
    }

    #[async_trait]
    impl IpRangeSource for FakeFeed {
        async fn fetch(&self) -> UpdaterResult<IpRangeFeed> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.feed
                .clone()
                .ok_or_else(|| UpdaterError::Network("connection refused".into()))
        }
    }

    #[derive(Default)]
    struct RecordingIam {
        deny: bool,
        writes: Mutex<Vec<(String, String, PolicyDocument)>>,
    }

    #[async_trait]
    impl RolePolicyWriter for RecordingIam {
        async fn put_role_policy(
            &self,
            role_name: &str,
            policy_name: &str,
            policy_document: &PolicyDocument,
        ) -> UpdaterResult<PutRolePolicyReceipt> {
            if self.deny {
                return Err(UpdaterError::Authorization("AccessDenied: iam:PutRolePolicy".into()));
            }
            self.writes.lock().unwrap().push((
                role_name.to_string(),
                policy_name.to_string(),
                policy_document.clone(),
            ));
            Ok(PutRolePolicyReceipt {
                request_id: Some("iam-request-1".into()),
            })
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        unreachable: bool,
        sent: Mutex<Vec<(String, CallbackResponse)>>,
    }

    #[async_trait]
    impl CallbackNotifier for RecordingNotifier {
        async fn send(&self, response_url: &str, response: &CallbackResponse) -> UpdaterResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push((response_url.to_string(), response.clone()));
            if self.unreachable {
                return Err(UpdaterError::Callback("connection reset".into()));
            }
            Ok(())
        }
    }

    struct Harness {
        feed: Arc<FakeFeed>,
        iam: Arc<RecordingIam>,
        notifier: Arc<RecordingNotifier>,
        service: PolicyUpdaterService,
    }

    fn sample_feed() -> IpRangeFeed {
        serde_json::from_value(serde_json::json!({
            "prefixes": [
                {"ip_prefix": "3.5.0.0/16", "service": "AMAZON", "region": "us-east-1"},
                {"ip_prefix": "52.0.0.0/15", "service": "S3", "region": "us-east-1"},
                {"ip_prefix": "15.0.0.0/8", "service": "AMAZON", "region": "eu-west-1"}
            ]
        }))
        .unwrap()
    }

    fn settings() -> Settings {
        Settings {
            prefix: Some("my-bucket".into()),
            iam_role_name: Some("ReaderRole".into()),
            policy_name: Some("AmazonIpOnly".into()),
            ..Default::default()
        }
    }

    fn harness(
        settings: Settings,
        region: Option<&str>,
        feed: Option<IpRangeFeed>,
        iam: RecordingIam,
        notifier: RecordingNotifier,
    ) -> Harness {
        let feed = Arc::new(FakeFeed {
            feed,
            fetches: AtomicUsize::new(0),
        });
        let iam = Arc::new(iam);
        let notifier = Arc::new(notifier);
        let service = PolicyUpdaterService::from_parts(
            settings,
            region.map(str::to_string),
            feed.clone(),
            iam.clone(),
            notifier.clone(),
        );
        Harness {
            feed,
            iam,
            notifier,
            service,
        }
    }

    fn cfn_event(request_type: RequestType) -> CustomResourceEvent {
        CustomResourceEvent {
            request_type: Some(request_type),
            response_url: Some(CALLBACK_URL.into()),
            stack_id: Some("arn:aws:cloudformation:us-east-1:123456789012:stack/demo/guid".into()),
            request_id: Some("req-1".into()),
            logical_resource_id: Some("IpRangePolicy".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_writes_region_policy_and_reports_success() {
        let h = harness(
            settings(),
            Some("us-east-1"),
            Some(sample_feed()),
            RecordingIam::default(),
            RecordingNotifier::default(),
        );

        let outcome = h.service.handle(&cfn_event(RequestType::Create), LOG_STREAM).await;

        assert_eq!(
            outcome,
            UpdateOutcome::Success {
                region: "us-east-1".into(),
                role_name: "ReaderRole".into(),
                policy_name: "AmazonIpOnly".into(),
                cidr_count: 1,
                request_id: Some("iam-request-1".into()),
            }
        );

        let writes = h.iam.writes.lock().unwrap();
        assert_eq!(writes.len(), 1);
        let (role, name, policy) = &writes[0];
        assert_eq!(role, "ReaderRole");
        assert_eq!(name, "AmazonIpOnly");
        let json = serde_json::to_value(policy).unwrap();
        assert_eq!(
            json["Statement"][0]["Condition"]["IpAddress"]["aws:SourceIp"],
            serde_json::json!(["3.5.0.0/16"])
        );
        assert_eq!(
            json["Statement"][0]["Resource"],
            serde_json::json!(["arn:aws:s3:::my-bucket*/*", "arn:aws:s3:::my-bucket*/*"])
        );

        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, CALLBACK_URL);
        assert_eq!(sent[0].1.status, ResponseStatus::Success);
        assert_eq!(sent[0].1.data.data, "Good");
        assert_eq!(sent[0].1.physical_resource_id, LOG_STREAM);
    }

    #[tokio::test]
    async fn test_success_without_callback_sends_nothing() {
        let h = harness(
            settings(),
            Some("eu-west-1"),
            Some(sample_feed()),
            RecordingIam::default(),
            RecordingNotifier::default(),
        );

        let outcome = h.service.handle(&CustomResourceEvent::default(), LOG_STREAM).await;

        assert!(outcome.is_success());
        assert!(h.notifier.sent.lock().unwrap().is_empty());
        let writes = h.iam.writes.lock().unwrap();
        assert_eq!(
            writes[0].2.statement[0].condition.as_ref().unwrap()["IpAddress"]["aws:SourceIp"],
            vec!["15.0.0.0/8"]
        );
    }

    #[tokio::test]
    async fn test_iam_rejection_reports_failure_with_diagnostic() {
        let h = harness(
            settings(),
            Some("us-east-1"),
            Some(sample_feed()),
            RecordingIam {
                deny: true,
                ..Default::default()
            },
            RecordingNotifier::default(),
        );

        let outcome = h.service.handle(&cfn_event(RequestType::Update), LOG_STREAM).await;

        let UpdateOutcome::Failed { reason } = outcome else {
            panic!("expected failure");
        };
        for needle in ["AmazonIpOnly", "ReaderRole", "us-east-1", "AccessDenied"] {
            assert!(reason.contains(needle), "{needle} missing from {reason}");
        }

        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.status, ResponseStatus::Failed);
        assert_eq!(sent[0].1.data.data, reason);
    }

    #[tokio::test]
    async fn test_failure_without_callback_only_returns_failed() {
        let h = harness(
            settings(),
            Some("us-east-1"),
            None,
            RecordingIam::default(),
            RecordingNotifier::default(),
        );

        let outcome = h.service.handle(&CustomResourceEvent::default(), LOG_STREAM).await;

        assert!(!outcome.is_success());
        assert!(h.notifier.sent.lock().unwrap().is_empty());
        assert!(h.iam.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_region_fails_before_fetching() {
        let h = harness(
            settings(),
            None,
            Some(sample_feed()),
            RecordingIam::default(),
            RecordingNotifier::default(),
        );

        let outcome = h.service.handle(&cfn_event(RequestType::Create), LOG_STREAM).await;

        assert_eq!(
            outcome,
            UpdateOutcome::Failed {
                reason: "There was a problem updating policy AmazonIpOnly for role ReaderRole in region : unable to resolve the active AWS region".into()
            }
        );
        assert_eq!(h.feed.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(h.notifier.sent.lock().unwrap()[0].1.status, ResponseStatus::Failed);
    }

    #[tokio::test]
    async fn test_missing_setting_is_reported_through_callback() {
        let h = harness(
            Settings {
                policy_name: None,
                ..settings()
            },
            Some("us-east-1"),
            Some(sample_feed()),
            RecordingIam::default(),
            RecordingNotifier::default(),
        );

        let outcome = h.service.handle(&cfn_event(RequestType::Create), LOG_STREAM).await;

        let UpdateOutcome::Failed { reason } = outcome else {
            panic!("expected failure");
        };
        assert!(reason.contains("policy <unset>"));
        assert!(reason.contains("missing required setting 'policy_name'"));
        assert!(h.iam.writes.lock().unwrap().is_empty());
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_leaves_policy_and_acknowledges() {
        let h = harness(
            settings(),
            Some("us-east-1"),
            Some(sample_feed()),
            RecordingIam::default(),
            RecordingNotifier::default(),
        );

        let outcome = h.service.handle(&cfn_event(RequestType::Delete), LOG_STREAM).await;

        assert_eq!(outcome, UpdateOutcome::Skipped);
        assert_eq!(h.feed.fetches.load(Ordering::SeqCst), 0);
        assert!(h.iam.writes.lock().unwrap().is_empty());
        let sent = h.notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.status, ResponseStatus::Success);
    }

    #[tokio::test]
    async fn test_callback_delivery_failure_keeps_outcome() {
        let h = harness(
            settings(),
            Some("us-east-1"),
            Some(sample_feed()),
            RecordingIam::default(),
            RecordingNotifier {
                unreachable: true,
                ..Default::default()
            },
        );

        let outcome = h.service.handle(&cfn_event(RequestType::Create), LOG_STREAM).await;

        assert!(outcome.is_success());
        assert_eq!(h.notifier.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_returns_policy_for_region() {
        let h = harness(
            settings(),
            Some("ap-south-2"),
            Some(sample_feed()),
            RecordingIam::default(),
            RecordingNotifier::default(),
        );

        let applied = h.service.update().await.unwrap();
        assert!(applied.cidrs.is_empty());
        assert_eq!(applied.policy.statement.len(), 1);
        assert_eq!(h.service.region(), Some("ap-south-2"));
    }

    #[test]
    fn test_without_query_strips_signature() {
        assert_eq!(without_query(CALLBACK_URL), "https://cfn-response.example.com/signed");
        assert_eq!(without_query("https://a/b"), "https://a/b");
    }
}

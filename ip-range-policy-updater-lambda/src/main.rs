//! AWS Lambda entry point for the IP range policy updater.
//!
//! Settings come from the function's environment (`prefix`, `iam_role_name`,
//! `policy_name`); the region comes from the SDK's default provider chain.

use anyhow::Context;
use clap::Parser;
use ip_range_policy_updater::{
    CustomResourceEvent, PolicyUpdaterService, RequestType, Settings, UpdateOutcome,
};
use lambda_runtime::{run, service_fn, Error, LambdaEvent};

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let settings = Settings::parse();

    // Load AWS configuration using the standard credential provider chain.
    let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .load()
        .await;

    let service = PolicyUpdaterService::new(settings, &config)
        .context("Failed to initialize policy updater")?;
    if service.region().is_none() {
        log::warn!("No AWS region configured; invocations will fail until one is set");
    }

    run(service_fn(|event| handler(event, &service))).await
}

async fn handler(
    event: LambdaEvent<CustomResourceEvent>,
    service: &PolicyUpdaterService,
) -> Result<UpdateOutcome, Error> {
    let LambdaEvent { payload, context } = event;
    log::info!(
        "Invocation {} ({})",
        context.request_id,
        request_label(payload.request_type)
    );

    let outcome = service.handle(&payload, &context.env_config.log_stream).await;
    log::debug!("Outcome: {outcome:?}");
    Ok(outcome)
}

fn request_label(request_type: Option<RequestType>) -> &'static str {
    match request_type {
        Some(RequestType::Create) => "CloudFormation Create",
        Some(RequestType::Update) => "CloudFormation Update",
        Some(RequestType::Delete) => "CloudFormation Delete",
        Some(RequestType::Unknown) => "CloudFormation request",
        None => "direct invocation",
    }
}

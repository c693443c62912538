//! Active region lookup from the loaded SDK configuration.

use aws_config::SdkConfig;

/// Region the SDK's default provider chain settled on, if any.
///
/// On Lambda this comes from `AWS_REGION`; there is no fallback.
pub fn resolve_region(config: &SdkConfig) -> Option<String> {
    config
        .region()
        .map(|region| region.as_ref().to_string())
        .filter(|region| !region.is_empty())
}

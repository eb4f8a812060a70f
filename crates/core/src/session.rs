//! Shared AWS configuration, built once and handed to every client

use aws_config::{BehaviorVersion, Region};

pub use aws_config::SdkConfig;

/// Profile and region selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub profile: Option<String>,
    pub region: Option<String>,
}

/// Load the AWS configuration for `options`.
///
/// Unset values fall back to the SDK's default provider chain
/// (environment, shared config files, instance metadata).
pub async fn load_sdk_config(options: &SessionOptions) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = &options.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(region) = &options.region {
        loader = loader.region(Region::new(region.clone()));
    }

    loader.load().await
}

/// Region of a loaded configuration, if one was resolved
pub fn region_name(sdk_config: &SdkConfig) -> Option<String> {
    sdk_config.region().map(|r| r.as_ref().to_string())
}

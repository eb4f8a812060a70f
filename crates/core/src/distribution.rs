//! CloudFront distributions in front of website buckets

use std::time::Duration;

use aws_config::SdkConfig;
use aws_sdk_cloudfront::{
    types::{
        Aliases, CustomOriginConfig, DefaultCacheBehavior, DistributionConfig,
        MinimumProtocolVersion, Origin, OriginProtocolPolicy, Origins, SslSupportMethod,
        ViewerCertificate, ViewerProtocolPolicy,
    },
    Client,
};
use tracing::{debug, info};

use crate::certificate::Certificate;
use crate::error::{Error, Result};

/// Managed "CachingOptimized" cache policy
const CACHING_OPTIMIZED_POLICY_ID: &str = "658327ea-f89d-4fab-a63d-7e88639e58f6";

/// Status CloudFront reports once a distribution is live
const DEPLOYED_STATUS: &str = "Deployed";

/// A CloudFront distribution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Distribution {
    pub id: String,
    /// `*.cloudfront.net` host
    pub domain_name: String,
    pub status: String,
    pub aliases: Vec<String>,
}

impl Distribution {
    pub fn is_deployed(&self) -> bool {
        self.status == DEPLOYED_STATUS
    }
}

/// How long and how often to poll while a distribution deploys
#[derive(Debug, Clone, Copy)]
pub struct DeployWait {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for DeployWait {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_attempts: 60,
        }
    }
}

/// Manages CloudFront distributions for site domains
pub struct DistributionManager {
    client: Client,
}

impl DistributionManager {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Distribution whose aliases include `domain`
    pub async fn find_matching_dist(&self, domain: &str) -> Result<Option<Distribution>> {
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .client
                .list_distributions()
                .set_marker(marker.take())
                .send()
                .await?;

            let Some(list) = response.distribution_list() else {
                return Ok(None);
            };

            for summary in list.items() {
                let aliases: Vec<String> = summary
                    .aliases()
                    .map(|a| a.items().to_vec())
                    .unwrap_or_default();

                if aliases.iter().any(|a| a.eq_ignore_ascii_case(domain)) {
                    return Ok(Some(Distribution {
                        id: summary.id().to_string(),
                        domain_name: summary.domain_name().to_string(),
                        status: summary.status().to_string(),
                        aliases,
                    }));
                }
            }

            match list.next_marker() {
                Some(next) if list.is_truncated() => marker = Some(next.to_string()),
                _ => return Ok(None),
            }
        }
    }

    /// Create a distribution serving `domain` from a bucket website endpoint
    pub async fn create_dist(
        &self,
        domain: &str,
        origin_host: &str,
        certificate: &Certificate,
    ) -> Result<Distribution> {
        let origin_id = format!("S3-{}", domain);
        let config = distribution_config(domain, origin_host, &origin_id, &certificate.arn)?;

        let response = self
            .client
            .create_distribution()
            .distribution_config(config)
            .send()
            .await?;

        let distribution = response
            .distribution()
            .map(|d| Distribution {
                id: d.id().to_string(),
                domain_name: d.domain_name().to_string(),
                status: d.status().to_string(),
                aliases: vec![domain.to_string()],
            })
            .ok_or_else(|| Error::AwsSdk(format!("No distribution returned for {}", domain)))?;

        info!(domain, id = %distribution.id, cf_domain = %distribution.domain_name, "Distribution created");
        Ok(distribution)
    }

    /// Current status of distribution `id`
    pub async fn status(&self, id: &str) -> Result<String> {
        let response = self.client.get_distribution().id(id).send().await?;
        Ok(response
            .distribution()
            .map(|d| d.status().to_string())
            .unwrap_or_default())
    }

    /// Poll until the distribution reports `Deployed`
    pub async fn await_deploy(&self, distribution: &Distribution, wait: DeployWait) -> Result<()> {
        for attempt in 1..=wait.max_attempts {
            let status = self.status(&distribution.id).await?;
            debug!(id = %distribution.id, %status, attempt, "Distribution status");
            if status == DEPLOYED_STATUS {
                info!(id = %distribution.id, "Distribution deployed");
                return Ok(());
            }
            tokio::time::sleep(wait.interval).await;
        }

        Err(Error::Timeout(format!(
            "Distribution {} not deployed after {} checks",
            distribution.id, wait.max_attempts
        )))
    }
}

/// Configuration for a distribution fronting an S3 website endpoint.
///
/// Website endpoints only speak HTTP, so the origin is a custom HTTP origin
/// and viewers are redirected to HTTPS with the given certificate.
fn distribution_config(
    domain: &str,
    origin_host: &str,
    origin_id: &str,
    certificate_arn: &str,
) -> Result<DistributionConfig> {
    let origin = Origin::builder()
        .id(origin_id)
        .domain_name(origin_host)
        .custom_origin_config(
            CustomOriginConfig::builder()
                .http_port(80)
                .https_port(443)
                .origin_protocol_policy(OriginProtocolPolicy::HttpOnly)
                .build()?,
        )
        .build()?;

    let cache_behavior = DefaultCacheBehavior::builder()
        .target_origin_id(origin_id)
        .viewer_protocol_policy(ViewerProtocolPolicy::RedirectToHttps)
        .cache_policy_id(CACHING_OPTIMIZED_POLICY_ID)
        .compress(true)
        .build()?;

    let certificate = ViewerCertificate::builder()
        .acm_certificate_arn(certificate_arn)
        .ssl_support_method(SslSupportMethod::SniOnly)
        .minimum_protocol_version(MinimumProtocolVersion::TlSv122021)
        .build();

    let config = DistributionConfig::builder()
        .caller_reference(uuid::Uuid::new_v4().to_string())
        .aliases(Aliases::builder().quantity(1).items(domain).build()?)
        .default_root_object("index.html")
        .origins(Origins::builder().quantity(1).items(origin).build()?)
        .default_cache_behavior(cache_behavior)
        .viewer_certificate(certificate)
        .comment(format!("sitepilot: {}", domain))
        .enabled(true)
        .build()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_config() {
        let config = distribution_config(
            "www.example.com",
            "www.example.com.s3-website-us-east-1.amazonaws.com",
            "S3-www.example.com",
            "arn:aws:acm:us-east-1:123456789012:certificate/abc",
        )
        .unwrap();

        assert_eq!(config.default_root_object(), Some("index.html"));
    }

    #[test]
    fn test_is_deployed() {
        let mut dist = Distribution {
            id: "E123".to_string(),
            domain_name: "d111.cloudfront.net".to_string(),
            status: "InProgress".to_string(),
            aliases: vec![],
        };
        assert!(!dist.is_deployed());
        dist.status = "Deployed".to_string();
        assert!(dist.is_deployed());
    }
}

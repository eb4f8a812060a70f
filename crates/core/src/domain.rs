//! Route 53 hosted zones and alias records

use aws_config::SdkConfig;
use aws_sdk_route53::{
    types::{AliasTarget, Change, ChangeAction, ChangeBatch, ResourceRecordSet, RrType},
    Client,
};
use tracing::{debug, info};

use crate::endpoints::Endpoint;
use crate::error::{Error, Result};

/// Hosted zone id shared by every CloudFront distribution for alias records
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

const CHANGE_COMMENT: &str = "Created by sitepilot";

/// A Route 53 hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedZone {
    pub id: String,
    /// Fully qualified zone name, with trailing dot
    pub name: String,
}

/// Manages DNS records for site domains
pub struct DomainManager {
    client: Client,
}

impl DomainManager {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Every hosted zone in the account
    pub async fn all_hosted_zones(&self) -> Result<Vec<HostedZone>> {
        let mut zones = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = self
                .client
                .list_hosted_zones()
                .set_marker(marker.take())
                .send()
                .await?;

            zones.extend(response.hosted_zones().iter().map(|z| HostedZone {
                id: z.id().to_string(),
                name: z.name().to_string(),
            }));

            match response.next_marker() {
                Some(next) if response.is_truncated() => marker = Some(next.to_string()),
                _ => break,
            }
        }

        debug!(count = zones.len(), "Listed hosted zones");
        Ok(zones)
    }

    /// The hosted zone that most specifically contains `domain`
    pub async fn find_hosted_zone(&self, domain: &str) -> Result<Option<HostedZone>> {
        let zones = self.all_hosted_zones().await?;
        Ok(best_zone_match(domain, &zones).cloned())
    }

    /// Create a hosted zone for the registrable part of `domain`
    pub async fn create_hosted_zone(&self, domain: &str) -> Result<HostedZone> {
        let zone_name = zone_name_for(domain)?;

        let response = self
            .client
            .create_hosted_zone()
            .name(&zone_name)
            .caller_reference(uuid::Uuid::new_v4().to_string())
            .send()
            .await?;

        let zone = response
            .hosted_zone()
            .map(|z| HostedZone {
                id: z.id().to_string(),
                name: z.name().to_string(),
            })
            .ok_or_else(|| Error::AwsSdk(format!("No hosted zone returned for {}", zone_name)))?;

        info!(zone = %zone.name, id = %zone.id, "Hosted zone created");
        Ok(zone)
    }

    /// Find the zone for `domain`, creating one if none exists
    pub async fn find_or_create_hosted_zone(&self, domain: &str) -> Result<HostedZone> {
        match self.find_hosted_zone(domain).await? {
            Some(zone) => Ok(zone),
            None => self.create_hosted_zone(domain).await,
        }
    }

    /// Point `domain` at an S3 website endpoint. Returns the change id.
    pub async fn create_s3_domain_record(
        &self,
        zone: &HostedZone,
        domain: &str,
        endpoint: &Endpoint,
    ) -> Result<Option<String>> {
        self.upsert_alias(zone, domain, endpoint.zone, endpoint.host)
            .await
    }

    /// Point `domain` at a CloudFront distribution. Returns the change id.
    pub async fn create_cf_domain_record(
        &self,
        zone: &HostedZone,
        domain: &str,
        cf_domain: &str,
    ) -> Result<Option<String>> {
        self.upsert_alias(zone, domain, CLOUDFRONT_HOSTED_ZONE_ID, cf_domain)
            .await
    }

    async fn upsert_alias(
        &self,
        zone: &HostedZone,
        domain: &str,
        target_zone: &str,
        target_dns: &str,
    ) -> Result<Option<String>> {
        let alias = AliasTarget::builder()
            .hosted_zone_id(target_zone)
            .dns_name(target_dns)
            .evaluate_target_health(false)
            .build()?;

        let record = ResourceRecordSet::builder()
            .name(domain)
            .r#type(RrType::A)
            .alias_target(alias)
            .build()?;

        let batch = ChangeBatch::builder()
            .comment(CHANGE_COMMENT)
            .changes(
                Change::builder()
                    .action(ChangeAction::Upsert)
                    .resource_record_set(record)
                    .build()?,
            )
            .build()?;

        let response = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&zone.id)
            .change_batch(batch)
            .send()
            .await?;

        info!(domain, target = target_dns, zone = %zone.name, "Alias record upserted");
        Ok(response.change_info().map(|c| c.id().to_string()))
    }
}

/// Whether `domain` lies in `zone_name` (equal to it or a subdomain of it)
pub fn zone_contains(zone_name: &str, domain: &str) -> bool {
    let zone = zone_name.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();

    if zone.is_empty() {
        return false;
    }
    domain == zone || domain.ends_with(&format!(".{}", zone))
}

/// Among `zones`, the one with the longest name containing `domain`
pub fn best_zone_match<'a>(domain: &str, zones: &'a [HostedZone]) -> Option<&'a HostedZone> {
    zones
        .iter()
        .filter(|z| zone_contains(&z.name, domain))
        .max_by_key(|z| z.name.trim_end_matches('.').len())
}

/// Zone name for a new zone: the last two labels of `domain`, with trailing dot
pub fn zone_name_for(domain: &str) -> Result<String> {
    let labels: Vec<&str> = domain
        .trim_end_matches('.')
        .split('.')
        .filter(|l| !l.is_empty())
        .collect();

    if labels.len() < 2 {
        return Err(Error::InvalidInput(format!(
            "Domain must have at least two labels: {}",
            domain
        )));
    }
    Ok(format!("{}.", labels[labels.len() - 2..].join(".")))
}

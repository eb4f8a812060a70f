//! ACM certificate lookup

use aws_config::SdkConfig;
use aws_sdk_acm::{config::Region, types::CertificateStatus, Client};
use tracing::debug;

use crate::error::Result;

/// CloudFront only accepts certificates issued in this region
pub const CERTIFICATE_REGION: &str = "us-east-1";

/// An issued certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub arn: String,
    pub domain_name: Option<String>,
    pub subject_alternative_names: Vec<String>,
}

impl Certificate {
    /// Whether this certificate is valid for `domain`
    pub fn covers(&self, domain: &str) -> bool {
        self.subject_alternative_names
            .iter()
            .any(|name| name_covers(name, domain))
    }
}

/// Finds certificates for site domains
pub struct CertificateManager {
    client: Client,
}

impl CertificateManager {
    /// Create a manager; the region is always forced to us-east-1
    pub fn new(sdk_config: &SdkConfig) -> Self {
        let config = aws_sdk_acm::config::Builder::from(sdk_config)
            .region(Region::new(CERTIFICATE_REGION))
            .build();
        Self {
            client: Client::from_conf(config),
        }
    }

    /// Full details of one certificate
    pub async fn describe(&self, arn: &str) -> Result<Certificate> {
        let response = self
            .client
            .describe_certificate()
            .certificate_arn(arn)
            .send()
            .await?;

        let detail = response.certificate();
        Ok(Certificate {
            arn: arn.to_string(),
            domain_name: detail.and_then(|d| d.domain_name()).map(str::to_string),
            subject_alternative_names: detail
                .map(|d| d.subject_alternative_names().to_vec())
                .unwrap_or_default(),
        })
    }

    /// First issued certificate covering `domain`, exactly or by wildcard
    pub async fn find_matching_cert(&self, domain: &str) -> Result<Option<Certificate>> {
        let mut next_token: Option<String> = None;

        loop {
            let response = self
                .client
                .list_certificates()
                .certificate_statuses(CertificateStatus::Issued)
                .set_next_token(next_token.take())
                .send()
                .await?;

            for summary in response.certificate_summary_list() {
                let Some(arn) = summary.certificate_arn() else {
                    continue;
                };
                let certificate = self.describe(arn).await?;
                debug!(arn, names = ?certificate.subject_alternative_names, "Checking certificate");
                if certificate.covers(domain) {
                    return Ok(Some(certificate));
                }
            }

            match response.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => return Ok(None),
            }
        }
    }
}

/// Whether a certificate name covers `domain`.
///
/// A wildcard `*.example.com` covers exactly one extra label, so it matches
/// `www.example.com` but neither `example.com` nor `a.b.example.com`.
pub fn name_covers(name: &str, domain: &str) -> bool {
    let name = name.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();

    if name == domain {
        return true;
    }
    match name.strip_prefix("*.") {
        Some(suffix) => domain
            .strip_suffix(suffix)
            .and_then(|rest| rest.strip_suffix('.'))
            .is_some_and(|label| !label.is_empty() && !label.contains('.')),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_name() {
        assert!(name_covers("example.com", "example.com"));
        assert!(name_covers("WWW.example.com", "www.example.com"));
        assert!(!name_covers("example.com", "www.example.com"));
    }

    #[test]
    fn test_wildcard_covers_one_label() {
        assert!(name_covers("*.example.com", "www.example.com"));
        assert!(!name_covers("*.example.com", "example.com"));
        assert!(!name_covers("*.example.com", "a.b.example.com"));
        assert!(!name_covers("*.example.com", "wwwexample.com"));
    }

    #[test]
    fn test_certificate_covers_any_san() {
        let cert = Certificate {
            arn: "arn:aws:acm:us-east-1:123456789012:certificate/abc".to_string(),
            domain_name: Some("example.com".to_string()),
            subject_alternative_names: vec!["example.com".to_string(), "*.example.com".to_string()],
        };
        assert!(cert.covers("example.com"));
        assert!(cert.covers("blog.example.com"));
        assert!(!cert.covers("example.org"));
    }
}

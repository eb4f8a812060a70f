//! S3 static website endpoints per region

use crate::error::{Error, Result};

/// Website endpoint of a region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    /// Region code, e.g. `us-east-1`
    pub region: &'static str,
    /// Human-readable region name
    pub name: &'static str,
    /// Website endpoint host
    pub host: &'static str,
    /// Route 53 hosted zone id used for alias records to this endpoint
    pub zone: &'static str,
}

const fn endpoint(
    region: &'static str,
    name: &'static str,
    host: &'static str,
    zone: &'static str,
) -> Endpoint {
    Endpoint {
        region,
        name,
        host,
        zone,
    }
}

/// Regions with S3 website hosting
pub const ENDPOINTS: &[Endpoint] = &[
    endpoint("us-east-2", "US East (Ohio)", "s3-website.us-east-2.amazonaws.com", "Z2O1EMRO9K5GLX"),
    endpoint("us-east-1", "US East (N. Virginia)", "s3-website-us-east-1.amazonaws.com", "Z3AQBSTGFYJSTF"),
    endpoint("us-west-1", "US West (N. California)", "s3-website-us-west-1.amazonaws.com", "Z2F56UZL2M1ACD"),
    endpoint("us-west-2", "US West (Oregon)", "s3-website-us-west-2.amazonaws.com", "Z3BJ6K6RIION7M"),
    endpoint("ap-south-1", "Asia Pacific (Mumbai)", "s3-website.ap-south-1.amazonaws.com", "Z11RGJOFQNVJUP"),
    endpoint("ap-northeast-3", "Asia Pacific (Osaka)", "s3-website.ap-northeast-3.amazonaws.com", "Z2YQB5RD63NC85"),
    endpoint("ap-northeast-2", "Asia Pacific (Seoul)", "s3-website.ap-northeast-2.amazonaws.com", "Z3W03O7B5YMIYP"),
    endpoint("ap-southeast-1", "Asia Pacific (Singapore)", "s3-website-ap-southeast-1.amazonaws.com", "Z3O0J2DXBE1FTB"),
    endpoint("ap-southeast-2", "Asia Pacific (Sydney)", "s3-website-ap-southeast-2.amazonaws.com", "Z1WCIGYICN2BYD"),
    endpoint("ap-northeast-1", "Asia Pacific (Tokyo)", "s3-website-ap-northeast-1.amazonaws.com", "Z2M4EHUR26P7ZW"),
    endpoint("ca-central-1", "Canada (Central)", "s3-website.ca-central-1.amazonaws.com", "Z1QDHH18159H29"),
    endpoint("eu-central-1", "EU (Frankfurt)", "s3-website.eu-central-1.amazonaws.com", "Z21DNDUVLTQW6Q"),
    endpoint("eu-west-1", "EU (Ireland)", "s3-website-eu-west-1.amazonaws.com", "Z1BKCTXD74EZPE"),
    endpoint("eu-west-2", "EU (London)", "s3-website.eu-west-2.amazonaws.com", "Z3GKZC51ZF0DB4"),
    endpoint("eu-west-3", "EU (Paris)", "s3-website.eu-west-3.amazonaws.com", "Z3R1K369G5AVDG"),
    endpoint("eu-north-1", "EU (Stockholm)", "s3-website.eu-north-1.amazonaws.com", "Z3BAZG2TWCNX0D"),
    endpoint("sa-east-1", "South America (Sao Paulo)", "s3-website-sa-east-1.amazonaws.com", "Z7KQH4QJS55SO"),
];

/// Whether `region` has a known website endpoint
pub fn known_region(region: &str) -> bool {
    ENDPOINTS.iter().any(|e| e.region == region)
}

/// Website endpoint for `region`
pub fn get_endpoint(region: &str) -> Result<&'static Endpoint> {
    ENDPOINTS
        .iter()
        .find(|e| e.region == region)
        .ok_or_else(|| Error::UnknownRegion(region.to_string()))
}

/// Public website URL of a bucket hosted in `region`
pub fn website_url(bucket: &str, region: &str) -> Result<String> {
    Ok(format!("http://{}.{}", bucket, get_endpoint(region)?.host))
}

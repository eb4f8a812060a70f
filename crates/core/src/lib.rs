//! sitepilot-core - Core library for the sitepilot CLI
//!
//! This library deploys static websites to S3: bucket setup for website
//! hosting, incremental directory sync driven by ETag-compatible content
//! fingerprints, and Route 53 / ACM / CloudFront wiring for custom domains.

pub mod bucket;
pub mod certificate;
pub mod client;
pub mod config;
pub mod distribution;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod fingerprint;
pub mod manifest;
pub mod session;
pub mod storage;
pub mod sync;
pub mod transfer;
pub mod walker;

// Re-export commonly used types
pub use bucket::{public_read_policy, BucketManager};
pub use certificate::{Certificate, CertificateManager};
pub use client::S3Client;
pub use config::{config_exists, get_config_path, load_config, load_config_or_default, save_config, validate_config};
pub use config::{AwsConfig, ConfigFile, LoggingConfig, TransferConfig, WebsiteConfig};
pub use distribution::{DeployWait, Distribution, DistributionManager};
pub use domain::{DomainManager, HostedZone};
pub use endpoints::{get_endpoint, known_region, website_url, Endpoint};
pub use error::{Error, Result};
pub use fingerprint::{fingerprint_file, fingerprint_reader, Fingerprint};
pub use manifest::{load_manifest, RemoteManifest};
pub use session::{load_sdk_config, region_name, SdkConfig, SessionOptions};
pub use storage::{
    BucketCreation, BucketInfo, ListPage, ObjectInfo, StorageClient, WebsiteDocuments,
};
pub use sync::{content_type_for, SyncAction, SyncEngine, SyncEvent, SyncOptions, SyncReport};
pub use transfer::{requires_multipart_upload, MultipartUploadConfig};
pub use walker::{LocalFile, SiteWalker};

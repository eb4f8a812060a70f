//! Storage trait: the object-store operations the rest of the crate relies on

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::transfer::MultipartUploadConfig;

/// Information about an object from a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub size: i64,
    /// ETag as reported by the store (quoted)
    pub etag: String,
    pub last_modified: Option<String>,
}

/// One page of a bucket listing
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub objects: Vec<ObjectInfo>,
    /// Whether more pages follow
    pub is_truncated: bool,
    /// Token for the next page, when truncated
    pub next_continuation_token: Option<String>,
}

/// Bucket summary from the account listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketInfo {
    pub name: String,
    pub creation_date: Option<String>,
}

/// Outcome of a create-bucket request that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketCreation {
    /// A new bucket was created
    Created,
    /// The bucket already existed and belongs to the caller
    AlreadyOwned,
}

/// Static website hosting documents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteDocuments {
    pub index_document: String,
    pub error_document: String,
}

impl Default for WebsiteDocuments {
    fn default() -> Self {
        Self {
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
        }
    }
}

/// Low-level object store operations
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// List all buckets owned by the caller
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>>;

    /// Fetch one page of a bucket listing
    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage>;

    /// Upload a local file, splitting it into parts per `transfer`
    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
        transfer: &MultipartUploadConfig,
    ) -> Result<()>;

    /// Create a bucket in `region`.
    ///
    /// A bucket that already exists and is owned by the caller is reported
    /// as [`BucketCreation::AlreadyOwned`]; every other failure is an error.
    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<BucketCreation>;

    /// Replace the bucket policy with a JSON document
    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()>;

    /// Enable static website hosting
    async fn put_bucket_website(&self, bucket: &str, documents: &WebsiteDocuments) -> Result<()>;

    /// Region the bucket lives in
    async fn bucket_region(&self, bucket: &str) -> Result<String>;
}

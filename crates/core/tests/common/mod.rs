//! In-memory StorageClient used by the integration tests

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use sitepilot_core::{
    BucketCreation, BucketInfo, Error, ListPage, MultipartUploadConfig,
    ObjectInfo, Result, StorageClient, WebsiteDocuments,
};

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub etag: String,
    pub content_type: String,
    pub size: i64,
}

/// ETag S3 assigns to `bytes`: plain MD5 for a single PUT, MD5 of the part
/// digests with a `-N` suffix when uploaded in `part_size` parts
pub fn s3_etag(bytes: &[u8], part_size: usize) -> String {
    if bytes.len() <= part_size {
        return format!("\"{:x}\"", md5::compute(bytes));
    }
    let parts: Vec<&[u8]> = bytes.chunks(part_size).collect();
    let mut digests = Vec::with_capacity(parts.len() * 16);
    for part in &parts {
        digests.extend_from_slice(&md5::compute(*part).0);
    }
    format!("\"{:x}-{}\"", md5::compute(&digests), parts.len())
}

/// Behaves like a single S3 bucket: uploads get the ETag S3 would assign
pub struct MemoryStorage {
    pub objects: Mutex<BTreeMap<String, StoredObject>>,
    pub uploads: Mutex<Vec<(String, String)>>,
    pub owned_buckets: Mutex<HashSet<String>>,
    pub foreign_buckets: HashSet<String>,
    pub policies: Mutex<Vec<(String, String)>>,
    pub websites: Mutex<Vec<(String, WebsiteDocuments)>>,
    pub page_size: usize,
    /// Listing request number (1-based) that fails
    pub fail_on_page: Option<usize>,
    /// Drop the continuation token from truncated pages
    pub lose_continuation_token: bool,
    pub pages_served: Mutex<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            uploads: Mutex::new(Vec::new()),
            owned_buckets: Mutex::new(HashSet::new()),
            foreign_buckets: HashSet::new(),
            policies: Mutex::new(Vec::new()),
            websites: Mutex::new(Vec::new()),
            page_size: 1000,
            fail_on_page: None,
            lose_continuation_token: false,
            pages_served: Mutex::new(0),
        }
    }

    pub fn with_object(self, key: &str, etag: &str) -> Self {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                etag: etag.to_string(),
                content_type: "binary/octet-stream".to_string(),
                size: 0,
            },
        );
        self
    }

    pub fn uploaded_keys(&self) -> Vec<String> {
        self.uploads.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn clear_uploads(&self) {
        self.uploads.lock().unwrap().clear();
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|o| o.content_type.clone())
    }
}

#[async_trait]
impl StorageClient for MemoryStorage {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        let mut names: Vec<String> = self.owned_buckets.lock().unwrap().iter().cloned().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| BucketInfo {
                name,
                creation_date: None,
            })
            .collect())
    }

    async fn list_objects_page(
        &self,
        _bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let page_number = {
            let mut served = self.pages_served.lock().unwrap();
            *served += 1;
            *served
        };
        if self.fail_on_page == Some(page_number) {
            return Err(Error::AwsSdk("service error: InternalError".to_string()));
        }

        let start: usize = continuation_token
            .map(|t| t.parse().expect("token is an offset"))
            .unwrap_or(0);
        let objects = self.objects.lock().unwrap();
        let page: Vec<ObjectInfo> = objects
            .iter()
            .skip(start)
            .take(self.page_size)
            .map(|(key, obj)| ObjectInfo {
                key: key.clone(),
                size: obj.size,
                etag: obj.etag.clone(),
                last_modified: None,
            })
            .collect();

        let end = start + page.len();
        let is_truncated = end < objects.len();
        let next_continuation_token = if is_truncated && !self.lose_continuation_token {
            Some(end.to_string())
        } else {
            None
        };

        Ok(ListPage {
            objects: page,
            is_truncated,
            next_continuation_token,
        })
    }

    async fn upload_file(
        &self,
        _bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
        transfer: &MultipartUploadConfig,
    ) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let etag = s3_etag(&bytes, transfer.chunk_size() as usize);
        let size = bytes.len() as i64;

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                etag: etag.to_string(),
                content_type: content_type.to_string(),
                size,
            },
        );
        self.uploads
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));
        Ok(())
    }

    async fn create_bucket(&self, bucket: &str, _region: &str) -> Result<BucketCreation> {
        if self.foreign_buckets.contains(bucket) {
            return Err(Error::AwsSdk(format!("BucketAlreadyExists: {}", bucket)));
        }
        if self.owned_buckets.lock().unwrap().insert(bucket.to_string()) {
            Ok(BucketCreation::Created)
        } else {
            Ok(BucketCreation::AlreadyOwned)
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        self.policies
            .lock()
            .unwrap()
            .push((bucket.to_string(), policy.to_string()));
        Ok(())
    }

    async fn put_bucket_website(&self, bucket: &str, documents: &WebsiteDocuments) -> Result<()> {
        self.websites
            .lock()
            .unwrap()
            .push((bucket.to_string(), documents.clone()));
        Ok(())
    }

    async fn bucket_region(&self, _bucket: &str) -> Result<String> {
        Ok("us-east-1".to_string())
    }
}

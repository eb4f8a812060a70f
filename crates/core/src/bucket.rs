//! Bucket provisioning for static website hosting

use std::path::Path;

use tracing::info;

use crate::endpoints::website_url;
use crate::error::Result;
use crate::storage::{BucketCreation, BucketInfo, ObjectInfo, StorageClient, WebsiteDocuments};
use crate::sync::{SyncEngine, SyncOptions, SyncReport};

/// Manages website buckets through a [`StorageClient`]
pub struct BucketManager<C: StorageClient> {
    client: C,
}

impl<C: StorageClient> BucketManager<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// All buckets owned by the caller
    pub async fn all_buckets(&self) -> Result<Vec<BucketInfo>> {
        self.client.list_buckets().await
    }

    /// Every object in `bucket`, across all listing pages
    pub async fn all_objects(&self, bucket: &str) -> Result<Vec<ObjectInfo>> {
        let mut objects = Vec::new();
        let mut continuation_token = None;

        loop {
            let page = self
                .client
                .list_objects_page(bucket, continuation_token)
                .await?;
            objects.extend(page.objects);

            match page.next_continuation_token {
                Some(token) if page.is_truncated => continuation_token = Some(token),
                _ => break,
            }
        }

        Ok(objects)
    }

    /// Create `bucket` in `region`, or reuse it if the caller already owns it
    pub async fn init_bucket(&self, bucket: &str, region: &str) -> Result<BucketCreation> {
        let outcome = self.client.create_bucket(bucket, region).await?;
        match outcome {
            BucketCreation::Created => info!(bucket, region, "Bucket created"),
            BucketCreation::AlreadyOwned => info!(bucket, "Bucket already exists, reusing it"),
        }
        Ok(outcome)
    }

    /// Make every object in `bucket` publicly readable
    pub async fn set_policy(&self, bucket: &str) -> Result<()> {
        let policy = public_read_policy(bucket)?;
        self.client.put_bucket_policy(bucket, &policy).await?;
        info!(bucket, "Public read policy applied");
        Ok(())
    }

    /// Serve `bucket` as a static website
    pub async fn configure_website(&self, bucket: &str, documents: &WebsiteDocuments) -> Result<()> {
        self.client.put_bucket_website(bucket, documents).await?;
        info!(
            bucket,
            index = %documents.index_document,
            error = %documents.error_document,
            "Website hosting enabled"
        );
        Ok(())
    }

    /// Region `bucket` lives in
    pub async fn get_region(&self, bucket: &str) -> Result<String> {
        self.client.bucket_region(bucket).await
    }

    /// Public website URL of `bucket`
    pub async fn get_bucket_url(&self, bucket: &str) -> Result<String> {
        let region = self.get_region(bucket).await?;
        website_url(bucket, &region)
    }

    /// Sync `local_root` into `bucket`
    pub async fn sync(
        &self,
        local_root: &Path,
        bucket: &str,
        options: SyncOptions,
    ) -> Result<SyncReport> {
        SyncEngine::new(&self.client, options)
            .sync(local_root, bucket)
            .await
    }
}

/// Bucket policy granting anonymous `s3:GetObject` on every object
pub fn public_read_policy(bucket: &str) -> Result<String> {
    let policy = serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "PublicReadGetObject",
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{}/*", bucket)]
        }]
    });
    Ok(serde_json::to_string(&policy)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_read_policy() {
        let policy = public_read_policy("example.com").unwrap();
        let value: serde_json::Value = serde_json::from_str(&policy).unwrap();

        assert_eq!(value["Version"], "2012-10-17");
        let statement = &value["Statement"][0];
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"], "*");
        assert_eq!(statement["Action"][0], "s3:GetObject");
        assert_eq!(statement["Resource"][0], "arn:aws:s3:::example.com/*");
    }
}

//! S3 client implementation using the AWS S3 SDK

use std::path::Path;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    operation::create_bucket::CreateBucketError,
    primitives::ByteStream,
    types::{
        BucketLocationConstraint, CompletedMultipartUpload, CompletedPart,
        CreateBucketConfiguration, ErrorDocument, IndexDocument, PublicAccessBlockConfiguration,
        WebsiteConfiguration,
    },
    Client,
};
use aws_smithy_types::byte_stream::Length;
use aws_smithy_types::date_time::Format;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::storage::{
    BucketCreation, BucketInfo, ListPage, ObjectInfo, StorageClient, WebsiteDocuments,
};
use crate::transfer::MultipartUploadConfig;

/// Region S3 uses when a bucket has no location constraint
const DEFAULT_BUCKET_REGION: &str = "us-east-1";

/// S3 client backed by the AWS SDK
#[derive(Clone)]
pub struct S3Client {
    client: Client,
}

impl S3Client {
    /// Create a client from a shared SDK configuration
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }

    /// Allow bucket policies to grant public access.
    ///
    /// New buckets block public policies by default, which makes a
    /// public-read policy fail with AccessDenied.
    pub async fn allow_public_policy(&self, bucket: &str) -> Result<()> {
        let config = PublicAccessBlockConfiguration::builder()
            .block_public_acls(true)
            .ignore_public_acls(true)
            .block_public_policy(false)
            .restrict_public_buckets(false)
            .build();

        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(config)
            .send()
            .await?;

        Ok(())
    }

    async fn upload_single(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> Result<()> {
        let body = ByteStream::from_path(path).await?;

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .send()
            .await?;

        Ok(())
    }

    async fn upload_multipart(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
        size: u64,
        transfer: &MultipartUploadConfig,
    ) -> Result<()> {
        transfer.check_part_count(size)?;

        let created = self
            .client
            .create_multipart_upload()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .send()
            .await?;

        let upload_id = created
            .upload_id()
            .ok_or_else(|| Error::AwsSdk(format!("No upload id returned for {}", key)))?
            .to_string();

        match self
            .upload_parts(bucket, key, path, size, &upload_id, transfer)
            .await
        {
            Ok(parts) => {
                self.client
                    .complete_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .multipart_upload(
                        CompletedMultipartUpload::builder()
                            .set_parts(Some(parts))
                            .build(),
                    )
                    .send()
                    .await?;
                Ok(())
            }
            Err(e) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(bucket)
                    .key(key)
                    .upload_id(&upload_id)
                    .send()
                    .await
                {
                    warn!(key, error = %abort_err, "Failed to abort multipart upload");
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        size: u64,
        upload_id: &str,
        transfer: &MultipartUploadConfig,
    ) -> Result<Vec<CompletedPart>> {
        let chunk_size = transfer.chunk_size();
        let mut parts = Vec::new();
        let mut offset: u64 = 0;
        let mut part_number: i32 = 1;

        while offset < size {
            let length = (size - offset).min(chunk_size);
            let body = ByteStream::read_from()
                .path(path)
                .offset(offset)
                .length(Length::Exact(length))
                .build()
                .await?;

            let uploaded = self
                .client
                .upload_part()
                .bucket(bucket)
                .key(key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(body)
                .send()
                .await?;

            parts.push(
                CompletedPart::builder()
                    .set_e_tag(uploaded.e_tag().map(str::to_string))
                    .part_number(part_number)
                    .build(),
            );

            debug!(key, part = part_number, bytes = length, "Uploaded part");
            offset += length;
            part_number += 1;
        }

        Ok(parts)
    }
}

#[async_trait]
impl StorageClient for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketInfo>> {
        let response = self.client.list_buckets().send().await?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| BucketInfo {
                name: b.name().unwrap_or("").to_string(),
                creation_date: b.creation_date().and_then(|d| d.fmt(Format::DateTime).ok()),
            })
            .collect();

        Ok(buckets)
    }

    async fn list_objects_page(
        &self,
        bucket: &str,
        continuation_token: Option<String>,
    ) -> Result<ListPage> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .set_continuation_token(continuation_token)
            .send()
            .await?;

        let objects = response
            .contents()
            .iter()
            .map(|obj| ObjectInfo {
                key: obj.key().unwrap_or("").to_string(),
                size: obj.size().unwrap_or(0),
                etag: obj.e_tag().unwrap_or("").to_string(),
                last_modified: obj
                    .last_modified()
                    .and_then(|d| d.fmt(Format::DateTime).ok()),
            })
            .collect();

        Ok(ListPage {
            objects,
            is_truncated: response.is_truncated().unwrap_or(false),
            next_continuation_token: response.next_continuation_token().map(str::to_string),
        })
    }

    async fn upload_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
        transfer: &MultipartUploadConfig,
    ) -> Result<()> {
        let size = tokio::fs::metadata(path).await?.len();

        if transfer.requires_multipart(size) {
            self.upload_multipart(bucket, key, path, content_type, size, transfer)
                .await
        } else {
            self.upload_single(bucket, key, path, content_type).await
        }
    }

    async fn create_bucket(&self, bucket: &str, region: &str) -> Result<BucketCreation> {
        let mut request = self.client.create_bucket().bucket(bucket);

        // us-east-1 rejects an explicit location constraint
        if region != DEFAULT_BUCKET_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(BucketCreation::Created),
            Err(err)
                if err
                    .as_service_error()
                    .is_some_and(CreateBucketError::is_bucket_already_owned_by_you) =>
            {
                Ok(BucketCreation::AlreadyOwned)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<()> {
        self.allow_public_policy(bucket).await?;

        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await?;

        Ok(())
    }

    async fn put_bucket_website(&self, bucket: &str, documents: &WebsiteDocuments) -> Result<()> {
        let configuration = WebsiteConfiguration::builder()
            .index_document(
                IndexDocument::builder()
                    .suffix(&documents.index_document)
                    .build()?,
            )
            .error_document(
                ErrorDocument::builder()
                    .key(&documents.error_document)
                    .build()?,
            )
            .build();

        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(configuration)
            .send()
            .await?;

        Ok(())
    }

    async fn bucket_region(&self, bucket: &str) -> Result<String> {
        let response = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await?;

        Ok(normalize_location(
            response.location_constraint().map(|c| c.as_str()),
        ))
    }
}

/// Map a GetBucketLocation constraint to a region name
fn normalize_location(constraint: Option<&str>) -> String {
    match constraint {
        None | Some("") => DEFAULT_BUCKET_REGION.to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_location() {
        assert_eq!(normalize_location(None), "us-east-1");
        assert_eq!(normalize_location(Some("")), "us-east-1");
        assert_eq!(normalize_location(Some("EU")), "eu-west-1");
        assert_eq!(normalize_location(Some("ap-south-1")), "ap-south-1");
    }
}

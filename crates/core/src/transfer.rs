//! Chunking configuration shared by fingerprinting and multipart upload
//!
//! S3 assigns a composite ETag to multipart-uploaded objects. Local
//! fingerprints only line up with those ETags when both sides split the file
//! at the same boundaries, so a single [`MultipartUploadConfig`] drives both.

use crate::error::{Error, Result};

/// One mebibyte
pub const MIB: u64 = 1024 * 1024;

/// Default chunk size, matching the AWS CLI and boto3 defaults (8 MiB)
pub const DEFAULT_CHUNK_SIZE: u64 = 8 * MIB;

/// Smallest part size S3 accepts for a non-final multipart part (5 MiB)
pub const MIN_CHUNK_SIZE: u64 = 5 * MIB;

/// Largest part size S3 accepts (5 GiB)
pub const MAX_CHUNK_SIZE: u64 = 5 * 1024 * MIB;

/// S3 caps a multipart upload at this many parts
pub const MAX_PARTS: u64 = 10_000;

/// Multipart upload configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultipartUploadConfig {
    chunk_size: u64,
}

impl MultipartUploadConfig {
    /// Create a configuration with the given chunk size in bytes
    pub fn new(chunk_size: u64) -> Result<Self> {
        if !(MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&chunk_size) {
            return Err(Error::InvalidInput(format!(
                "Chunk size must be between {} and {} bytes, got {}",
                MIN_CHUNK_SIZE, MAX_CHUNK_SIZE, chunk_size
            )));
        }
        Ok(Self { chunk_size })
    }

    /// Create a configuration from a chunk size in MiB
    pub fn from_mb(chunk_size_mb: u64) -> Result<Self> {
        Self::new(chunk_size_mb.saturating_mul(MIB))
    }

    /// Chunk size in bytes
    pub fn chunk_size(&self) -> u64 {
        self.chunk_size
    }

    /// Number of chunks a file of `size` bytes is split into
    pub fn chunk_count(&self, size: u64) -> u64 {
        size.div_ceil(self.chunk_size)
    }

    /// Fail when a file of `size` bytes needs more parts than S3 accepts
    pub fn check_part_count(&self, size: u64) -> Result<()> {
        let parts = self.chunk_count(size);
        if parts > MAX_PARTS {
            return Err(Error::InvalidInput(format!(
                "A {} byte file needs {} parts of {} bytes; S3 allows at most {}. Increase transfer.chunk_size_mb",
                size, parts, self.chunk_size, MAX_PARTS
            )));
        }
        Ok(())
    }

    /// Whether a file of `size` bytes goes through multipart upload
    pub fn requires_multipart(&self, size: u64) -> bool {
        requires_multipart_upload(size, self.chunk_size)
    }
}

impl Default for MultipartUploadConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// A file is uploaded in parts exactly when it spans more than one chunk,
/// which is also when its fingerprint becomes composite.
pub fn requires_multipart_upload(size: u64, chunk_size: u64) -> bool {
    size > chunk_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunk_size() {
        assert_eq!(MultipartUploadConfig::default().chunk_size(), 8 * MIB);
    }

    #[test]
    fn test_chunk_size_bounds() {
        assert!(MultipartUploadConfig::new(MIN_CHUNK_SIZE - 1).is_err());
        assert!(MultipartUploadConfig::new(MIN_CHUNK_SIZE).is_ok());
        assert!(MultipartUploadConfig::new(MAX_CHUNK_SIZE + 1).is_err());
        assert!(MultipartUploadConfig::from_mb(4).is_err());
        assert_eq!(MultipartUploadConfig::from_mb(16).unwrap().chunk_size(), 16 * MIB);
    }

    #[test]
    fn test_requires_multipart_boundary() {
        let config = MultipartUploadConfig::default();
        assert!(!config.requires_multipart(0));
        assert!(!config.requires_multipart(DEFAULT_CHUNK_SIZE));
        assert!(config.requires_multipart(DEFAULT_CHUNK_SIZE + 1));
    }

    #[test]
    fn test_part_count_limit() {
        let config = MultipartUploadConfig::new(MIN_CHUNK_SIZE).unwrap();
        assert!(config.check_part_count(MIN_CHUNK_SIZE * MAX_PARTS).is_ok());
        assert!(matches!(
            config.check_part_count(MIN_CHUNK_SIZE * MAX_PARTS + 1),
            Err(Error::InvalidInput(_))
        ));
        assert!(config.check_part_count(0).is_ok());
    }

    #[test]
    fn test_chunk_count() {
        let config = MultipartUploadConfig::default();
        assert_eq!(config.chunk_count(0), 0);
        assert_eq!(config.chunk_count(1), 1);
        assert_eq!(config.chunk_count(DEFAULT_CHUNK_SIZE), 1);
        assert_eq!(config.chunk_count(DEFAULT_CHUNK_SIZE * 2 + 1), 3);
    }
}

//! Content fingerprints compatible with S3 ETags
//!
//! S3 reports the MD5 of an object's bytes as its ETag when the object was
//! uploaded in one request. For multipart uploads it instead reports the MD5
//! of the concatenated raw part digests followed by `-<part count>`. Both
//! forms are quoted. [`fingerprint_file`] reproduces the same strings locally
//! so a file can be compared to a listing entry with plain string equality.

use std::fmt;
use std::io::{self, Read};
use std::path::Path;

/// Read buffer used while hashing a chunk
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Quoted content fingerprint, directly comparable with an S3 ETag
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Build the fingerprint for a sequence of per-chunk MD5 digests.
    ///
    /// No digests means an empty file, which S3 fingerprints as the MD5 of
    /// empty input.
    pub fn from_digests(digests: &[[u8; 16]]) -> Self {
        match digests {
            [] => Self::quoted(format!("{:x}", md5::Context::new().finalize())),
            [single] => Self::quoted(format!("{:x}", md5::Digest(*single))),
            parts => {
                let mut context = md5::Context::new();
                for digest in parts {
                    context.consume(digest);
                }
                Self::quoted(format!("{:x}-{}", context.finalize(), parts.len()))
            }
        }
    }

    /// Normalize an ETag as returned by a listing.
    ///
    /// Some S3-compatible stores omit the surrounding quotes.
    pub fn from_etag(etag: &str) -> Self {
        Self::quoted(etag.trim_matches('"').to_string())
    }

    fn quoted(inner: String) -> Self {
        Self(format!("\"{}\"", inner))
    }

    /// The quoted fingerprint string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of parts for a composite fingerprint, `None` for a simple one
    pub fn part_count(&self) -> Option<u64> {
        self.0
            .trim_matches('"')
            .rsplit_once('-')
            .and_then(|(_, count)| count.parse().ok())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Fingerprint everything readable from `reader`, split at `chunk_size`.
pub fn fingerprint_reader<R: Read>(mut reader: R, chunk_size: u64) -> io::Result<Fingerprint> {
    if chunk_size == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "chunk size must be greater than zero",
        ));
    }

    let buffer_len = usize::try_from(chunk_size).map_or(READ_BUFFER_SIZE, |c| c.min(READ_BUFFER_SIZE));
    let mut buffer = vec![0u8; buffer_len];
    let mut digests: Vec<[u8; 16]> = Vec::new();

    loop {
        let mut context = md5::Context::new();
        let mut consumed: u64 = 0;

        while consumed < chunk_size {
            #[allow(clippy::cast_possible_truncation)] // bounded by buffer_len
            let want = (chunk_size - consumed).min(buffer_len as u64) as usize;
            let n = match reader.read(&mut buffer[..want]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            context.consume(&buffer[..n]);
            consumed += n as u64;
        }

        if consumed == 0 {
            break;
        }
        digests.push(*context.finalize());
        if consumed < chunk_size {
            break;
        }
    }

    Ok(Fingerprint::from_digests(&digests))
}

/// Fingerprint a local file.
///
/// `chunk_size` must be the part size used when uploading, or composite
/// fingerprints will never match the remote ETag.
pub fn fingerprint_file(path: &Path, chunk_size: u64) -> io::Result<Fingerprint> {
    let file = std::fs::File::open(path)?;
    fingerprint_reader(io::BufReader::new(file), chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn md5_of(data: &[u8]) -> md5::Digest {
        let mut context = md5::Context::new();
        context.consume(data);
        context.finalize()
    }

    #[test]
    fn test_single_chunk_is_quoted_md5() {
        let fp = fingerprint_reader(&b"hello world"[..], 1024).unwrap();
        assert_eq!(fp.as_str(), "\"5eb63bbbe01eeed093cb22bb8f5acdc3\"");
        assert_eq!(fp.part_count(), None);
    }

    #[test]
    fn test_exactly_one_chunk_stays_simple() {
        let fp = fingerprint_reader(&b"hello"[..], 5).unwrap();
        assert_eq!(fp.as_str(), "\"5d41402abc4b2a76b9719d911017c592\"");
    }

    #[test]
    fn test_empty_input_is_md5_of_nothing() {
        let fp = fingerprint_reader(&b""[..], 8).unwrap();
        assert_eq!(fp.as_str(), "\"d41d8cd98f00b204e9800998ecf8427e\"");
    }

    #[test]
    fn test_composite_fingerprint() {
        let fp = fingerprint_reader(&b"helloworld!"[..], 5).unwrap();

        let mut concatenated = Vec::new();
        concatenated.extend_from_slice(&md5_of(b"hello").0);
        concatenated.extend_from_slice(&md5_of(b"world").0);
        concatenated.extend_from_slice(&md5_of(b"!").0);
        let expected = format!("\"{:x}-3\"", md5_of(&concatenated));

        assert_eq!(fp.as_str(), expected);
        assert_eq!(fp.part_count(), Some(3));
    }

    #[test]
    fn test_deterministic() {
        let data = vec![7u8; 4096];
        let first = fingerprint_reader(&data[..], 1000).unwrap();
        let second = fingerprint_reader(&data[..], 1000).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_single_byte_change_changes_fingerprint() {
        let mut data = vec![0u8; 3000];
        let before = fingerprint_reader(&data[..], 1000).unwrap();
        data[1500] = 1;
        let after = fingerprint_reader(&data[..], 1000).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn test_exact_multiple_has_no_trailing_part() {
        let data = [1u8; 3000];
        let fp = fingerprint_reader(&data[..], 1000).unwrap();
        assert_eq!(fp.part_count(), Some(3));

        let part = md5_of(&data[..1000]).0;
        let concatenated = [part, part, part].concat();
        assert_eq!(fp.as_str(), format!("\"{:x}-3\"", md5_of(&concatenated)));

        let exact = fingerprint_reader(&data[..1000], 1000).unwrap();
        assert_eq!(exact.part_count(), None);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(fingerprint_reader(&b"abc"[..], 0).is_err());
    }

    #[test]
    fn test_fingerprint_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.html");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"hello world").unwrap();
        drop(file);

        let fp = fingerprint_file(&path, 8 * 1024 * 1024).unwrap();
        assert_eq!(fp, fingerprint_reader(&b"hello world"[..], 1024).unwrap());
    }

    #[test]
    fn test_fingerprint_file_not_found() {
        assert!(fingerprint_file(Path::new("/nonexistent/file.html"), 1024).is_err());
    }

    #[test]
    fn test_from_etag_normalizes_quotes() {
        assert_eq!(Fingerprint::from_etag("abc").as_str(), "\"abc\"");
        assert_eq!(Fingerprint::from_etag("\"abc-2\"").as_str(), "\"abc-2\"");
        assert_eq!(Fingerprint::from_etag("\"abc-2\"").part_count(), Some(2));
    }
}

//! Remote manifest: key -> fingerprint for everything already in a bucket

use std::collections::HashMap;

use tracing::debug;

use crate::error::{Error, Result};
use crate::fingerprint::Fingerprint;
use crate::storage::StorageClient;

/// Fingerprints of the objects stored in a bucket, keyed by object key.
///
/// Built once per sync run and never modified afterward.
#[derive(Debug, Clone, Default)]
pub struct RemoteManifest {
    entries: HashMap<String, Fingerprint>,
}

impl RemoteManifest {
    /// Fingerprint recorded for `key`
    pub fn get(&self, key: &str) -> Option<&Fingerprint> {
        self.entries.get(key)
    }

    /// Whether the remote object at `key` has exactly this fingerprint
    pub fn matches(&self, key: &str, fingerprint: &Fingerprint) -> bool {
        self.get(key) == Some(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, Fingerprint)> for RemoteManifest {
    fn from_iter<I: IntoIterator<Item = (K, Fingerprint)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// Load the complete manifest of `bucket`, following every listing page.
///
/// Fails if any page fails; a partial manifest is never returned since it
/// could make the sync skip files that are actually missing.
pub async fn load_manifest<C: StorageClient + ?Sized>(
    client: &C,
    bucket: &str,
) -> Result<RemoteManifest> {
    let mut entries = HashMap::new();
    let mut continuation_token: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let page = client
            .list_objects_page(bucket, continuation_token.take())
            .await?;
        pages += 1;

        debug!(bucket, page = pages, objects = page.objects.len(), "Listed page");

        for object in page.objects {
            entries.insert(object.key, Fingerprint::from_etag(&object.etag));
        }

        if !page.is_truncated {
            break;
        }
        match page.next_continuation_token {
            Some(token) => continuation_token = Some(token),
            None => {
                return Err(Error::IncompleteListing {
                    bucket: bucket.to_string(),
                })
            }
        }
    }

    debug!(bucket, objects = entries.len(), pages, "Remote manifest loaded");
    Ok(RemoteManifest { entries })
}

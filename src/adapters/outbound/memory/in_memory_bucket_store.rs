use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        errors::{ProviderError, ProviderResult},
        models::{ObjectDeleteFailure, ObjectIdentifier},
        value_objects::{BucketName, ObjectKey, VersionId},
    },
    ports::{
        storage::{BucketStore, VersionMarker, VersionPage},
        Page,
    },
};

/// Default page size of the fake listings, matching the provider's
const DEFAULT_PAGE_SIZE: usize = 1000;

/// A provider call seen by [`InMemoryBucketStore`], in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    ListBuckets,
    ListObjects {
        bucket: BucketName,
    },
    ListObjectVersions {
        bucket: BucketName,
    },
    DeleteObjects {
        bucket: BucketName,
        identifiers: Vec<ObjectIdentifier>,
    },
    DeleteBucket {
        bucket: BucketName,
    },
}

/// A provider call the store should fail
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FailOn {
    ListBuckets,
    ListObjects(BucketName),
    ListObjectVersions(BucketName),
    /// Bulk deletes without version ids (current versions)
    DeleteCurrent(BucketName),
    /// Bulk deletes carrying version ids (history and delete markers)
    DeleteVersions(BucketName),
    /// Accept the bulk delete but reject every key in it
    RejectVersions(BucketName),
    DeleteBucket(BucketName),
}

#[derive(Debug, Clone)]
struct StoredVersion {
    version_id: String,
    delete_marker: bool,
}

#[derive(Debug, Default)]
struct StoredBucket {
    versioned: bool,
    // key -> versions, oldest first; the last entry is the current one
    objects: BTreeMap<ObjectKey, Vec<StoredVersion>>,
}

impl StoredBucket {
    fn is_empty(&self) -> bool {
        self.objects.values().all(Vec::is_empty)
    }

    fn current_keys(&self) -> Vec<ObjectKey> {
        self.objects
            .iter()
            .filter(|(_, versions)| versions.last().is_some_and(|v| !v.delete_marker))
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// All entries flattened as (key, version, is_delete_marker), newest first per key
    fn version_entries(&self) -> Vec<(ObjectKey, String, bool)> {
        self.objects
            .iter()
            .flat_map(|(key, versions)| {
                versions
                    .iter()
                    .rev()
                    .map(move |v| (key.clone(), v.version_id.clone(), v.delete_marker))
            })
            .collect()
    }
}

#[derive(Default)]
struct StoreData {
    buckets: BTreeMap<BucketName, StoredBucket>,
    failures: HashSet<FailOn>,
    calls: Vec<StoreCall>,
    next_version: u64,
}

impl StoreData {
    fn check(&self, rule: FailOn, operation: &str) -> ProviderResult<()> {
        if self.failures.contains(&rule) {
            return Err(ProviderError::new(operation, "injected failure").with_code("InternalError"));
        }
        Ok(())
    }

    fn bucket(&self, bucket: &BucketName, operation: &str) -> ProviderResult<&StoredBucket> {
        self.buckets.get(bucket).ok_or_else(|| no_such_bucket(bucket, operation))
    }

    fn bucket_mut(
        &mut self,
        bucket: &BucketName,
        operation: &str,
    ) -> ProviderResult<&mut StoredBucket> {
        self.buckets
            .get_mut(bucket)
            .ok_or_else(|| no_such_bucket(bucket, operation))
    }
}

fn no_such_bucket(bucket: &BucketName, operation: &str) -> ProviderError {
    ProviderError::new(operation, format!("The specified bucket does not exist: {}", bucket))
        .with_code("NoSuchBucket")
}

fn version_label(counter: u64) -> String {
    format!("v{:08}", counter)
}

/// Slice `items` into a page starting at offset `token`
fn page_at<T: Clone>(items: &[T], token: Option<String>, page_size: usize) -> Page<T> {
    let start = token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
    let end = (start + page_size).min(items.len());
    let slice = items.get(start..end).unwrap_or_default().to_vec();
    let next_token = (end < items.len()).then(|| end.to_string());
    Page {
        items: slice,
        next_token,
    }
}

/// In-memory storage provider for tests and local runs.
///
/// Mirrors the provider semantics the purge relies on: deleting a key without
/// a version id on a versioned bucket only adds a delete marker, and a bucket
/// that still holds any version or marker cannot be deleted. Every call is
/// journaled so tests can assert ordering and batch sizes.
#[derive(Clone)]
pub struct InMemoryBucketStore {
    data: Arc<RwLock<StoreData>>,
    page_size: usize,
}

impl InMemoryBucketStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(StoreData::default())),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Serve every listing in pages of `page_size` entries
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub async fn create_bucket(&self, bucket: &BucketName, versioned: bool) {
        let mut data = self.data.write().await;
        data.buckets.insert(
            bucket.clone(),
            StoredBucket {
                versioned,
                objects: BTreeMap::new(),
            },
        );
    }

    /// Write an object; on a versioned bucket this stacks a new version
    pub async fn put_object(&self, bucket: &BucketName, key: &ObjectKey) -> ProviderResult<()> {
        let mut data = self.data.write().await;
        data.next_version += 1;
        let version_id = version_label(data.next_version);
        let stored = data.bucket_mut(bucket, "PutObject")?;

        let versions = stored.objects.entry(key.clone()).or_default();
        if stored.versioned {
            versions.push(StoredVersion {
                version_id,
                delete_marker: false,
            });
        } else {
            *versions = vec![StoredVersion {
                version_id: VersionId::NULL.to_string(),
                delete_marker: false,
            }];
        }
        Ok(())
    }

    pub async fn fail_on(&self, rule: FailOn) {
        self.data.write().await.failures.insert(rule);
    }

    pub async fn bucket_exists(&self, bucket: &BucketName) -> bool {
        self.data.read().await.buckets.contains_key(bucket)
    }

    /// Count of versions and delete markers left in a bucket
    pub async fn entry_count(&self, bucket: &BucketName) -> Option<usize> {
        let data = self.data.read().await;
        data.buckets
            .get(bucket)
            .map(|b| b.objects.values().map(Vec::len).sum())
    }

    pub async fn calls(&self) -> Vec<StoreCall> {
        self.data.read().await.calls.clone()
    }
}

impl Default for InMemoryBucketStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BucketStore for InMemoryBucketStore {
    async fn list_buckets(
        &self,
        continuation_token: Option<String>,
    ) -> ProviderResult<Page<BucketName>> {
        let mut data = self.data.write().await;
        data.calls.push(StoreCall::ListBuckets);
        data.check(FailOn::ListBuckets, "ListBuckets")?;

        let names: Vec<BucketName> = data.buckets.keys().cloned().collect();
        Ok(page_at(&names, continuation_token, self.page_size))
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        continuation_token: Option<String>,
    ) -> ProviderResult<Page<ObjectKey>> {
        let mut data = self.data.write().await;
        data.calls.push(StoreCall::ListObjects {
            bucket: bucket.clone(),
        });
        data.check(FailOn::ListObjects(bucket.clone()), "ListObjectsV2")?;

        let keys = data.bucket(bucket, "ListObjectsV2")?.current_keys();
        Ok(page_at(&keys, continuation_token, self.page_size))
    }

    async fn list_object_versions(
        &self,
        bucket: &BucketName,
        marker: Option<VersionMarker>,
    ) -> ProviderResult<VersionPage> {
        let mut data = self.data.write().await;
        data.calls.push(StoreCall::ListObjectVersions {
            bucket: bucket.clone(),
        });
        data.check(FailOn::ListObjectVersions(bucket.clone()), "ListObjectVersions")?;

        let entries = data.bucket(bucket, "ListObjectVersions")?.version_entries();
        let start = match &marker {
            Some(marker) => entries
                .iter()
                .position(|(key, version_id, _)| {
                    key.as_str() == marker.key_marker
                        && marker.version_id_marker.as_deref() == Some(version_id.as_str())
                })
                .map_or(entries.len(), |i| i + 1),
            None => 0,
        };
        let end = (start + self.page_size).min(entries.len());

        let mut page = VersionPage::default();
        for (key, version_id, delete_marker) in &entries[start..end] {
            let version_id = VersionId::new(version_id.as_str()).map_err(|e| {
                ProviderError::new("ListObjectVersions", e.to_string())
                    .with_code("MalformedResponse")
            })?;
            let identifier = ObjectIdentifier::version(key.clone(), version_id);
            if *delete_marker {
                page.delete_markers.push(identifier);
            } else {
                page.versions.push(identifier);
            }
        }
        if end < entries.len() {
            let (key, version_id, _) = &entries[end - 1];
            page.next_marker = Some(VersionMarker {
                key_marker: key.to_string(),
                version_id_marker: Some(version_id.clone()),
            });
        }
        Ok(page)
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        identifiers: &[ObjectIdentifier],
    ) -> ProviderResult<Vec<ObjectDeleteFailure>> {
        let mut data = self.data.write().await;
        data.calls.push(StoreCall::DeleteObjects {
            bucket: bucket.clone(),
            identifiers: identifiers.to_vec(),
        });

        if identifiers.len() > crate::domain::models::MAX_DELETE_BATCH {
            return Err(ProviderError::new(
                "DeleteObjects",
                format!("{} keys exceed the per-request limit", identifiers.len()),
            )
            .with_code("MalformedXML"));
        }

        let versioned_request = identifiers.iter().any(ObjectIdentifier::is_versioned);
        if versioned_request {
            data.check(FailOn::DeleteVersions(bucket.clone()), "DeleteObjects")?;
            if data.failures.contains(&FailOn::RejectVersions(bucket.clone())) {
                return Ok(identifiers
                    .iter()
                    .map(|identifier| ObjectDeleteFailure {
                        identifier: identifier.clone(),
                        code: Some("AccessDenied".to_string()),
                        message: Some("Access Denied".to_string()),
                    })
                    .collect());
            }
        } else {
            data.check(FailOn::DeleteCurrent(bucket.clone()), "DeleteObjects")?;
        }

        let mut counter = data.next_version;
        let stored = data.bucket_mut(bucket, "DeleteObjects")?;
        for identifier in identifiers {
            match &identifier.version_id {
                Some(version_id) => {
                    // Unknown versions are silently accepted, as the provider does
                    if let Some(versions) = stored.objects.get_mut(&identifier.key) {
                        versions.retain(|v| v.version_id != version_id.as_str());
                        if versions.is_empty() {
                            stored.objects.remove(&identifier.key);
                        }
                    }
                }
                None if stored.versioned => {
                    if let Some(versions) = stored.objects.get_mut(&identifier.key) {
                        counter += 1;
                        versions.push(StoredVersion {
                            version_id: version_label(counter),
                            delete_marker: true,
                        });
                    }
                }
                None => {
                    stored.objects.remove(&identifier.key);
                }
            }
        }
        data.next_version = counter;
        Ok(Vec::new())
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> ProviderResult<()> {
        let mut data = self.data.write().await;
        data.calls.push(StoreCall::DeleteBucket {
            bucket: bucket.clone(),
        });
        data.check(FailOn::DeleteBucket(bucket.clone()), "DeleteBucket")?;

        if !data.bucket(bucket, "DeleteBucket")?.is_empty() {
            return Err(ProviderError::new(
                "DeleteBucket",
                "The bucket you tried to delete is not empty",
            )
            .with_code("BucketNotEmpty"));
        }
        data.buckets.remove(bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(name: &str) -> BucketName {
        BucketName::new(name).unwrap()
    }

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new(name).unwrap()
    }

    #[tokio::test]
    async fn test_delete_without_version_adds_marker_on_versioned_bucket() {
        let store = InMemoryBucketStore::new();
        let b = bucket("versioned");
        store.create_bucket(&b, true).await;
        store.put_object(&b, &key("a.txt")).await.unwrap();

        store
            .delete_objects(&b, &[ObjectIdentifier::current(key("a.txt"))])
            .await
            .unwrap();

        assert!(store.list_objects(&b, None).await.unwrap().items.is_empty());
        let versions = store.list_object_versions(&b, None).await.unwrap();
        assert_eq!(versions.versions.len(), 1);
        assert_eq!(versions.delete_markers.len(), 1);
        assert_eq!(store.entry_count(&b).await, Some(2));
    }

    #[tokio::test]
    async fn test_non_empty_bucket_cannot_be_deleted() {
        let store = InMemoryBucketStore::new();
        let b = bucket("full");
        store.create_bucket(&b, false).await;
        store.put_object(&b, &key("a.txt")).await.unwrap();

        let err = store.delete_bucket(&b).await.unwrap_err();
        assert!(err.has_code("BucketNotEmpty"));
        assert!(store.bucket_exists(&b).await);
    }

    #[tokio::test]
    async fn test_version_listing_pages_resume_after_marker() {
        let store = InMemoryBucketStore::new().with_page_size(2);
        let b = bucket("paged");
        store.create_bucket(&b, true).await;
        for name in ["a", "b", "c"] {
            store.put_object(&b, &key(name)).await.unwrap();
            store.put_object(&b, &key(name)).await.unwrap();
        }

        let mut seen = Vec::new();
        let mut marker = None;
        loop {
            let page = store.list_object_versions(&b, marker).await.unwrap();
            seen.extend(page.versions);
            match page.next_marker {
                Some(next) => marker = Some(next),
                None => break,
            }
        }
        assert_eq!(seen.len(), 6);
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), 6);
    }

    #[tokio::test]
    async fn test_oversized_batch_is_refused() {
        let store = InMemoryBucketStore::new();
        let b = bucket("big");
        store.create_bucket(&b, false).await;
        let identifiers: Vec<_> = (0..101)
            .map(|i| ObjectIdentifier::current(key(&format!("k{i}"))))
            .collect();

        let err = store.delete_objects(&b, &identifiers).await.unwrap_err();
        assert!(err.has_code("MalformedXML"));
    }
}

use async_trait::async_trait;

use crate::{
    domain::{
        errors::ProviderResult,
        models::{ObjectDeleteFailure, ObjectIdentifier},
        value_objects::{BucketName, ObjectKey},
    },
    ports::Page,
};

/// Port for the storage provider.
///
/// Every listing is exposed one page at a time; following continuation tokens
/// is the caller's job so pagination stays observable and testable.
#[async_trait]
pub trait BucketStore: Send + Sync + 'static {
    /// List one page of the buckets owned by the account
    async fn list_buckets(&self, continuation_token: Option<String>)
        -> ProviderResult<Page<BucketName>>;

    /// List one page of the current object keys of a bucket
    async fn list_objects(
        &self,
        bucket: &BucketName,
        continuation_token: Option<String>,
    ) -> ProviderResult<Page<ObjectKey>>;

    /// List one page of versions and delete markers of a bucket
    async fn list_object_versions(
        &self,
        bucket: &BucketName,
        marker: Option<VersionMarker>,
    ) -> ProviderResult<VersionPage>;

    /// Delete up to [`MAX_DELETE_BATCH`](crate::domain::models::MAX_DELETE_BATCH)
    /// identifiers in one request.
    ///
    /// An `Err` means the request itself failed. Keys the provider rejected
    /// inside an accepted request are returned in the `Ok` vector.
    async fn delete_objects(
        &self,
        bucket: &BucketName,
        identifiers: &[ObjectIdentifier],
    ) -> ProviderResult<Vec<ObjectDeleteFailure>>;

    /// Delete an empty bucket
    async fn delete_bucket(&self, bucket: &BucketName) -> ProviderResult<()>;
}

/// Position in a versioned listing to resume after
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionMarker {
    pub key_marker: String,
    pub version_id_marker: Option<String>,
}

/// One page of a versioned listing
#[derive(Debug, Clone, Default)]
pub struct VersionPage {
    pub versions: Vec<ObjectIdentifier>,
    pub delete_markers: Vec<ObjectIdentifier>,
    pub next_marker: Option<VersionMarker>,
}

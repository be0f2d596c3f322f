use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::{
    config::Region,
    types::{Delete, ObjectIdentifier as S3ObjectIdentifier},
    Client,
};
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

use super::error::{malformed, provider_error};
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

/// Region S3 reports as an empty location constraint
const DEFAULT_BUCKET_REGION: &str = "us-east-1";

#[derive(Default)]
struct RegionCache {
    bucket_regions: HashMap<BucketName, String>,
    clients: HashMap<String, Client>,
}

/// S3 implementation of [`BucketStore`].
///
/// Bucket listing goes through the client of the configured region. Every
/// per-bucket call uses a client for the bucket's own region, resolved once
/// with `GetBucketLocation`. With a custom endpoint all calls share one
/// path-style client.
pub struct S3BucketStore {
    sdk_config: SdkConfig,
    client: Client,
    custom_endpoint: bool,
    cache: Mutex<RegionCache>,
}

impl S3BucketStore {
    pub fn new(sdk_config: &SdkConfig) -> Self {
        let custom_endpoint = sdk_config.endpoint_url().is_some();
        let client = Client::from_conf(Self::client_config(sdk_config, None, custom_endpoint));
        Self {
            sdk_config: sdk_config.clone(),
            client,
            custom_endpoint,
            cache: Mutex::new(RegionCache::default()),
        }
    }

    fn client_config(
        sdk_config: &SdkConfig,
        region: Option<&str>,
        force_path_style: bool,
    ) -> aws_sdk_s3::Config {
        let mut builder =
            aws_sdk_s3::config::Builder::from(sdk_config).force_path_style(force_path_style);
        if let Some(region) = region {
            builder = builder.region(Region::new(region.to_string()));
        }
        builder.build()
    }

    /// Client bound to the region the bucket lives in
    async fn client_for(&self, bucket: &BucketName) -> ProviderResult<Client> {
        if self.custom_endpoint {
            return Ok(self.client.clone());
        }

        {
            let cache = self.cache.lock().await;
            if let Some(client) = cache
                .bucket_regions
                .get(bucket)
                .and_then(|region| cache.clients.get(region))
            {
                return Ok(client.clone());
            }
        }

        let region = self.bucket_region(bucket).await?;
        let mut cache = self.cache.lock().await;
        let client = cache
            .clients
            .entry(region.clone())
            .or_insert_with(|| {
                debug!(region = %region, "creating regional S3 client");
                Client::from_conf(Self::client_config(&self.sdk_config, Some(&region), false))
            })
            .clone();
        cache.bucket_regions.insert(bucket.clone(), region);
        Ok(client)
    }

    async fn bucket_region(&self, bucket: &BucketName) -> ProviderResult<String> {
        let output = self
            .client
            .get_bucket_location()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_err(|e| provider_error("GetBucketLocation", e))?;

        let region = match output.location_constraint().map(|c| c.as_str()) {
            None | Some("") => DEFAULT_BUCKET_REGION.to_string(),
            // Legacy alias
            Some("EU") => "eu-west-1".to_string(),
            Some(region) => region.to_string(),
        };
        debug!(bucket = %bucket, region = %region, "resolved bucket region");
        Ok(region)
    }
}

fn bucket_name(operation: &str, raw: Option<&str>) -> ProviderResult<BucketName> {
    let raw = raw.ok_or_else(|| malformed(operation, "bucket entry without a name"))?;
    BucketName::new(raw).map_err(|e| malformed(operation, e.to_string()))
}

fn object_key(operation: &str, raw: Option<&str>) -> ProviderResult<ObjectKey> {
    let raw = raw.ok_or_else(|| malformed(operation, "object entry without a key"))?;
    ObjectKey::new(raw).map_err(|e| malformed(operation, e.to_string()))
}

fn versioned_identifier(
    operation: &str,
    key: Option<&str>,
    version_id: Option<&str>,
) -> ProviderResult<ObjectIdentifier> {
    let key = object_key(operation, key)?;
    let version_id = VersionId::new(version_id.unwrap_or(VersionId::NULL))
        .map_err(|e| malformed(operation, e.to_string()))?;
    Ok(ObjectIdentifier::version(key, version_id))
}

fn to_sdk_identifier(identifier: &ObjectIdentifier) -> ProviderResult<S3ObjectIdentifier> {
    S3ObjectIdentifier::builder()
        .key(identifier.key.as_str())
        .set_version_id(identifier.version_id.as_ref().map(VersionId::to_string))
        .build()
        .map_err(|e| ProviderError::new("DeleteObjects", e.to_string()))
}

/// Match a per-key error from the response back to the identifier we sent
fn rejected_identifier(
    submitted: &[ObjectIdentifier],
    key: Option<&str>,
    version_id: Option<&str>,
) -> ProviderResult<ObjectIdentifier> {
    let found = submitted.iter().find(|id| {
        Some(id.key.as_str()) == key && id.version_id.as_ref().map(VersionId::as_str) == version_id
    });
    match found {
        Some(identifier) => Ok(identifier.clone()),
        None => Ok(ObjectIdentifier {
            key: object_key("DeleteObjects", key)?,
            version_id: version_id
                .map(VersionId::new)
                .transpose()
                .map_err(|e| malformed("DeleteObjects", e.to_string()))?,
        }),
    }
}

#[async_trait]
impl BucketStore for S3BucketStore {
    async fn list_buckets(
        &self,
        continuation_token: Option<String>,
    ) -> ProviderResult<Page<BucketName>> {
        let output = self
            .client
            .list_buckets()
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| provider_error("ListBuckets", e))?;

        let items = output
            .buckets()
            .iter()
            .map(|b| bucket_name("ListBuckets", b.name()))
            .collect::<ProviderResult<Vec<_>>>()?;

        Ok(Page {
            items,
            next_token: output.continuation_token().map(str::to_string),
        })
    }

    async fn list_objects(
        &self,
        bucket: &BucketName,
        continuation_token: Option<String>,
    ) -> ProviderResult<Page<ObjectKey>> {
        let client = self.client_for(bucket).await?;
        let output = client
            .list_objects_v2()
            .bucket(bucket.as_str())
            .set_continuation_token(continuation_token)
            .send()
            .await
            .map_err(|e| provider_error("ListObjectsV2", e))?;

        let items = output
            .contents()
            .iter()
            .map(|o| object_key("ListObjectsV2", o.key()))
            .collect::<ProviderResult<Vec<_>>>()?;

        let next_token = if output.is_truncated().unwrap_or(false) {
            Some(
                output
                    .next_continuation_token()
                    .ok_or_else(|| malformed("ListObjectsV2", "truncated listing without a token"))?
                    .to_string(),
            )
        } else {
            None
        };
        Ok(Page { items, next_token })
    }

    async fn list_object_versions(
        &self,
        bucket: &BucketName,
        marker: Option<VersionMarker>,
    ) -> ProviderResult<VersionPage> {
        const OP: &str = "ListObjectVersions";

        let client = self.client_for(bucket).await?;
        let (key_marker, version_id_marker) = match marker {
            Some(m) => (Some(m.key_marker), m.version_id_marker),
            None => (None, None),
        };
        let output = client
            .list_object_versions()
            .bucket(bucket.as_str())
            .set_key_marker(key_marker)
            .set_version_id_marker(version_id_marker)
            .send()
            .await
            .map_err(|e| provider_error(OP, e))?;

        let versions = output
            .versions()
            .iter()
            .map(|v| versioned_identifier(OP, v.key(), v.version_id()))
            .collect::<ProviderResult<Vec<_>>>()?;
        let delete_markers = output
            .delete_markers()
            .iter()
            .map(|m| versioned_identifier(OP, m.key(), m.version_id()))
            .collect::<ProviderResult<Vec<_>>>()?;

        let next_marker = if output.is_truncated().unwrap_or(false) {
            let key_marker = output
                .next_key_marker()
                .ok_or_else(|| malformed(OP, "truncated listing without a key marker"))?;
            Some(VersionMarker {
                key_marker: key_marker.to_string(),
                version_id_marker: output.next_version_id_marker().map(str::to_string),
            })
        } else {
            None
        };

        Ok(VersionPage {
            versions,
            delete_markers,
            next_marker,
        })
    }

    async fn delete_objects(
        &self,
        bucket: &BucketName,
        identifiers: &[ObjectIdentifier],
    ) -> ProviderResult<Vec<ObjectDeleteFailure>> {
        if identifiers.is_empty() {
            return Ok(Vec::new());
        }

        let objects = identifiers
            .iter()
            .map(to_sdk_identifier)
            .collect::<ProviderResult<Vec<_>>>()?;
        let delete = Delete::builder()
            .set_objects(Some(objects))
            .quiet(true)
            .build()
            .map_err(|e| ProviderError::new("DeleteObjects", e.to_string()))?;

        let client = self.client_for(bucket).await?;
        let output = client
            .delete_objects()
            .bucket(bucket.as_str())
            .delete(delete)
            .send()
            .await
            .map_err(|e| provider_error("DeleteObjects", e))?;

        output
            .errors()
            .iter()
            .map(|err| {
                Ok(ObjectDeleteFailure {
                    identifier: rejected_identifier(identifiers, err.key(), err.version_id())?,
                    code: err.code().map(str::to_string),
                    message: err.message().map(str::to_string),
                })
            })
            .collect()
    }

    async fn delete_bucket(&self, bucket: &BucketName) -> ProviderResult<()> {
        let client = self.client_for(bucket).await?;
        client
            .delete_bucket()
            .bucket(bucket.as_str())
            .send()
            .await
            .map_err(|e| provider_error("DeleteBucket", e))?;

        self.cache.lock().await.bucket_regions.remove(bucket);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::aws::error::MALFORMED_RESPONSE;

    fn identifier(key: &str, version: Option<&str>) -> ObjectIdentifier {
        ObjectIdentifier {
            key: ObjectKey::new(key).unwrap(),
            version_id: version.map(|v| VersionId::new(v).unwrap()),
        }
    }

    #[test]
    fn test_missing_version_id_is_the_null_version() {
        let id = versioned_identifier("ListObjectVersions", Some("a.txt"), None).unwrap();
        assert!(id.version_id.unwrap().is_null());
    }

    #[test]
    fn test_entry_without_key_is_malformed() {
        let err = versioned_identifier("ListObjectVersions", None, Some("v1")).unwrap_err();
        assert!(err.has_code(MALFORMED_RESPONSE));
    }

    #[test]
    fn test_rejections_map_back_to_submitted_identifiers() {
        let submitted = vec![identifier("a", Some("v1")), identifier("a", Some("v2"))];
        let rejected = rejected_identifier(&submitted, Some("a"), Some("v2")).unwrap();
        assert_eq!(rejected, submitted[1]);

        let unknown = rejected_identifier(&submitted, Some("b"), None).unwrap();
        assert_eq!(unknown, identifier("b", None));
    }

    #[test]
    fn test_sdk_identifier_keeps_version() {
        let sdk = to_sdk_identifier(&identifier("logs/1.gz", Some("abc"))).unwrap();
        assert_eq!(sdk.key(), "logs/1.gz");
        assert_eq!(sdk.version_id(), Some("abc"));
    }
}

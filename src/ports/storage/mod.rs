mod bucket_store;

pub use bucket_store::{BucketStore, VersionMarker, VersionPage};

use crate::domain::value_objects::{ObjectKey, VersionId};

/// Identifies one object, or one specific version or delete marker of it.
///
/// Without a version id a delete request removes the "current" pointer of the
/// key; on a versioned bucket the provider answers that with a new delete
/// marker. With a version id the version (or marker) is removed permanently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentifier {
    pub key: ObjectKey,
    pub version_id: Option<VersionId>,
}

impl ObjectIdentifier {
    /// Identifier of the current version of a key
    pub fn current(key: ObjectKey) -> Self {
        Self {
            key,
            version_id: None,
        }
    }

    /// Identifier of one specific version or delete marker
    pub fn version(key: ObjectKey, version_id: VersionId) -> Self {
        Self {
            key,
            version_id: Some(version_id),
        }
    }

    pub fn is_versioned(&self) -> bool {
        self.version_id.is_some()
    }
}

impl std::fmt::Display for ObjectIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version_id {
            Some(version_id) => write!(f, "{}@{}", self.key, version_id),
            None => write!(f, "{}", self.key),
        }
    }
}

/// A key the provider refused to delete inside an otherwise accepted bulk request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDeleteFailure {
    pub identifier: ObjectIdentifier,
    pub code: Option<String>,
    pub message: Option<String>,
}

impl std::fmt::Display for ObjectDeleteFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} {}",
            self.identifier,
            self.code.as_deref().unwrap_or("UnknownError"),
            self.message.as_deref().unwrap_or_default()
        )
    }
}

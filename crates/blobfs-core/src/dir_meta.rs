//! Directory metadata document stored in a directory's marker object.
//!
//! The document is a small JSON object:
//!
//! ```json
//! {"TotalBytesUsed":0}
//! ```
//!
//! `TotalBytesUsed` is the aggregate usage attributed to the directory. It is
//! only meaningful as of the last write: the mount layer never recomputes it
//! as children change.

use crate::error::DirMetadataError;
use serde::{Deserialize, Serialize};

/// Contents of a directory marker object.
///
/// # Example
///
/// ```
/// use blobfs_core::DirectoryMetadata;
///
/// let meta = DirectoryMetadata::new(4096);
/// let bytes = meta.encode();
/// assert_eq!(DirectoryMetadata::decode(&bytes).unwrap(), meta);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryMetadata {
    /// Aggregate bytes used by the directory.
    #[serde(rename = "TotalBytesUsed", alias = "total_bytes_used")]
    pub total_bytes_used: u64,
}

impl DirectoryMetadata {
    /// Creates a document with the given usage.
    pub fn new(total_bytes_used: u64) -> Self {
        Self { total_bytes_used }
    }

    /// Document written into a freshly created directory marker.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Serializes the document into the marker body.
    pub fn encode(&self) -> Vec<u8> {
        // A struct with a single integer field always serializes
        serde_json::to_vec(self).unwrap_or_else(|_| b"{\"TotalBytesUsed\":0}".to_vec())
    }

    /// Parses a marker body.
    ///
    /// An empty body is a marker created before its document was written and
    /// decodes to zero usage.
    pub fn decode(body: &[u8]) -> Result<Self, DirMetadataError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::empty());
        }
        Ok(serde_json::from_slice(body)?)
    }
}

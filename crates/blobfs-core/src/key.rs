//! Translation between host filesystem paths and object-store keys.
//!
//! The object store has no directories. A directory is emulated by a *marker
//! object* named [`DIR_MARKER`] placed under the directory's key prefix:
//!
//! | Host path | Kind | Object key |
//! |-----------|------|------------|
//! | `\` | directory | `<container>/.dir` |
//! | `\docs\a.txt` | file | `<container>/docs/a.txt` |
//! | `\docs` (directory hint) | directory | `<container>/docs/.dir` |
//! | `\docs\` | directory | `<container>/docs/.dir` |
//!
//! Keys never start with a separator, so the root marker sits directly under
//! the container segment.

use std::fmt;

/// Name of the marker object that represents a directory.
pub const DIR_MARKER: &str = ".dir";

/// Separator used inside object keys.
pub const STORE_SEPARATOR: char = '/';

/// Separator used by the host (Windows-style paths).
pub const HOST_SEPARATOR: char = '\\';

/// Kind of entity an object key stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file, stored as one object.
    File,
    /// A directory, stored as a marker object.
    Directory,
}

impl EntryKind {
    /// Returns true for [`EntryKind::Directory`].
    #[inline]
    pub fn is_directory(self) -> bool {
        matches!(self, EntryKind::Directory)
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::File => f.write_str("file"),
            EntryKind::Directory => f.write_str("directory"),
        }
    }
}

/// A resolved object key together with the kind it represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    key: String,
    kind: EntryKind,
}

impl ObjectKey {
    /// Key of a file object.
    pub fn file(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: EntryKind::File,
        }
    }

    /// Key of a directory marker object.
    pub fn directory(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            kind: EntryKind::Directory,
        }
    }

    /// The key as stored in the object store.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Kind of entity this key represents.
    #[inline]
    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// Returns true if this is a directory marker key.
    #[inline]
    pub fn is_directory(&self) -> bool {
        self.kind.is_directory()
    }

    /// Prefix under which the children of this directory live.
    ///
    /// For file keys this is the key itself.
    pub fn listing_prefix(&self) -> &str {
        match self.kind {
            EntryKind::Directory => marker_prefix(&self.key),
            EntryKind::File => &self.key,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// Derives the object key for a host path.
///
/// A path is treated as a directory when `is_directory_hint` is set, when it
/// ends with a separator, or when it already names a marker object. A path
/// that already ends with `/.dir` is taken as fully qualified and returned
/// without a container prefix.
pub fn derive_key(container: &str, path: &str, is_directory_hint: bool) -> ObjectKey {
    let store_path = path.replace(HOST_SEPARATOR, "/");
    let ends_with_separator = store_path.ends_with(STORE_SEPARATOR);
    let ends_with_marker = is_marker_key(&store_path);
    let relative = store_path.trim_start_matches(STORE_SEPARATOR);

    if !is_directory_hint && !ends_with_separator && !ends_with_marker && !relative.is_empty() {
        return ObjectKey::file(format!("{container}{STORE_SEPARATOR}{relative}"));
    }

    if ends_with_marker {
        ObjectKey::directory(relative)
    } else if ends_with_separator || relative.is_empty() {
        ObjectKey::directory(format!("{container}{STORE_SEPARATOR}{relative}{DIR_MARKER}"))
    } else {
        ObjectKey::directory(format!(
            "{container}{STORE_SEPARATOR}{relative}{STORE_SEPARATOR}{DIR_MARKER}"
        ))
    }
}

/// Returns the last segment of a key, ignoring a trailing separator.
///
/// `c/docs/a.txt` gives `a.txt`; the listing prefix `c/docs/sub/` gives `sub`.
pub fn display_name(key: &str) -> &str {
    let trimmed = key.strip_suffix(STORE_SEPARATOR).unwrap_or(key);
    trimmed
        .rsplit(STORE_SEPARATOR)
        .next()
        .unwrap_or(trimmed)
}

/// Returns true if `key` names a directory marker object.
pub fn is_marker_key(key: &str) -> bool {
    key == DIR_MARKER
        || key
            .strip_suffix(DIR_MARKER)
            .is_some_and(|rest| rest.ends_with(STORE_SEPARATOR))
}

/// Strips the marker name from a marker key, leaving the listing prefix.
///
/// `c/docs/.dir` gives `c/docs/`. Keys that are not markers are returned
/// unchanged.
pub fn marker_prefix(key: &str) -> &str {
    if is_marker_key(key) {
        &key[..key.len() - DIR_MARKER.len()]
    } else {
        key
    }
}

/// Normalizes a host path for use as a lookup key.
///
/// Host separators become store separators, empty segments are dropped and
/// the result always starts with a single `/`. The root is `/`; no other
/// normalized path ends with a separator.
pub fn normalize_path(raw: &str) -> String {
    let mut normalized = String::with_capacity(raw.len() + 1);
    for segment in raw
        .split([HOST_SEPARATOR, STORE_SEPARATOR])
        .filter(|s| !s.is_empty())
    {
        normalized.push(STORE_SEPARATOR);
        normalized.push_str(segment);
    }
    if normalized.is_empty() {
        normalized.push(STORE_SEPARATOR);
    }
    normalized
}

/// Returns true if the raw host path carries an explicit directory shape
/// (trailing separator or marker suffix).
pub fn has_directory_shape(raw: &str) -> bool {
    let store_path = raw.replace(HOST_SEPARATOR, "/");
    store_path.ends_with(STORE_SEPARATOR) || is_marker_key(&store_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: &str = "test1";

    #[test]
    fn test_root_resolves_to_container_marker() {
        let key = derive_key(C, "\\", false);
        assert_eq!(key.as_str(), "test1/.dir");
        assert!(key.is_directory());

        assert_eq!(derive_key(C, "/", true).as_str(), "test1/.dir");
        assert_eq!(derive_key(C, "", false).as_str(), "test1/.dir");
    }

    #[test]
    fn test_file_key() {
        let key = derive_key(C, "\\docs\\a.txt", false);
        assert_eq!(key.as_str(), "test1/docs/a.txt");
        assert_eq!(key.kind(), EntryKind::File);
    }

    #[test]
    fn test_directory_hint() {
        let key = derive_key(C, "\\docs", true);
        assert_eq!(key.as_str(), "test1/docs/.dir");
        assert_eq!(key.kind(), EntryKind::Directory);
    }

    #[test]
    fn test_trailing_separator_is_directory() {
        let key = derive_key(C, "\\docs\\", false);
        assert_eq!(key.as_str(), "test1/docs/.dir");
        assert!(key.is_directory());
    }

    #[test]
    fn test_marker_path_is_fully_qualified() {
        let key = derive_key(C, "test1/docs/.dir", false);
        assert_eq!(key.as_str(), "test1/docs/.dir");
        assert!(key.is_directory());

        // Leading separators are still dropped
        let key = derive_key(C, "\\test1\\docs\\.dir", false);
        assert_eq!(key.as_str(), "test1/docs/.dir");
    }

    #[test]
    fn test_dotdir_lookalike_is_a_file() {
        // Only an exact `.dir` segment is a marker
        let key = derive_key(C, "\\docs\\x.dir", false);
        assert_eq!(key.as_str(), "test1/docs/x.dir");
        assert_eq!(key.kind(), EntryKind::File);
    }

    #[test]
    fn test_listing_prefix() {
        assert_eq!(derive_key(C, "/docs", true).listing_prefix(), "test1/docs/");
        assert_eq!(derive_key(C, "/", true).listing_prefix(), "test1/");
        assert_eq!(derive_key(C, "/a.txt", false).listing_prefix(), "test1/a.txt");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("test1/docs/a.txt"), "a.txt");
        assert_eq!(display_name("test1/docs/sub/"), "sub");
        assert_eq!(display_name("a.txt"), "a.txt");
        assert_eq!(display_name("test1/.dir"), ".dir");
    }

    #[test]
    fn test_is_marker_key() {
        assert!(is_marker_key(".dir"));
        assert!(is_marker_key("c/.dir"));
        assert!(is_marker_key("c/a/.dir"));
        assert!(!is_marker_key("c/a.dir"));
        assert!(!is_marker_key("c/a/.dirt"));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("\\"), "/");
        assert_eq!(normalize_path("\\a\\"), "/a");
        assert_eq!(normalize_path("/a"), "/a");
        assert_eq!(normalize_path("a//b\\\\c"), "/a/b/c");
    }

    #[test]
    fn test_has_directory_shape() {
        assert!(has_directory_shape("\\a\\"));
        assert!(has_directory_shape("/a/.dir"));
        assert!(!has_directory_shape("\\a"));
    }
}

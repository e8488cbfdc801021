use std::time::SystemTime;

use chrono::{DateTime, Local, Utc};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

use blobfs_mount::FileAttributes;

/// Create a styled table for output
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS);
    table
}

/// Format an entry type indicator
pub fn format_entry_type(is_dir: bool) -> &'static str {
    if is_dir { "d" } else { "-" }
}

/// Local time for tables, `-` when unknown.
pub fn format_time(time: Option<SystemTime>) -> String {
    time.map_or_else(
        || "-".to_string(),
        |t| DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// RFC 3339 UTC timestamp for JSON output.
pub fn rfc3339(time: Option<SystemTime>) -> Option<String> {
    time.map(|t| DateTime::<Utc>::from(t).to_rfc3339())
}

/// Attribute names joined with `|`, e.g. `HIDDEN | READONLY`.
pub fn format_attributes(attributes: FileAttributes) -> String {
    let names: Vec<&str> = attributes.iter_names().map(|(name, _)| name).collect();
    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(" | ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    #[test]
    fn test_rfc3339() {
        let t = UNIX_EPOCH + Duration::from_secs(86_400);
        assert_eq!(rfc3339(Some(t)).as_deref(), Some("1970-01-02T00:00:00+00:00"));
        assert_eq!(rfc3339(None), None);
        assert_eq!(format_time(None), "-");
    }

    #[test]
    fn test_format_attributes() {
        assert_eq!(format_attributes(FileAttributes::empty()), "-");
        assert_eq!(
            format_attributes(FileAttributes::READONLY | FileAttributes::HIDDEN),
            "READONLY | HIDDEN"
        );
    }
}

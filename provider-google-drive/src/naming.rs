//! Timestamped names for uploaded files.

use chrono::{DateTime, Utc};

/// `strftime` pattern appended to every uploaded name
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// `<base>_<YYYY-MM-DD_HH-MM-SS>`, plus `.<extension>` when given
pub fn timestamped_name(base: &str, now: DateTime<Utc>, extension: Option<&str>) -> String {
    let stamped = format!("{}_{}", base, now.format(TIMESTAMP_FORMAT));
    match extension {
        Some(ext) => format!("{}.{}", stamped, ext.trim_start_matches('.')),
        None => stamped,
    }
}

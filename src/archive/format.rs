/// Size units for display, in base-1024 steps
const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count for display
///
/// Base-1024 scaling, at most two decimals with trailing zeros trimmed.
/// Sizes beyond the gigabyte range stay expressed in GB.
///
/// # Examples
///
/// ```
/// use sitepack::archive::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1024), "1 KB");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(1048576), "1 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    // Integer unit selection keeps exact powers of 1024 on the larger unit.
    let mut unit = 0;
    while unit + 1 < UNITS.len() && bytes >= 1u64 << (10 * (unit + 1)) {
        unit += 1;
    }

    let value = bytes as f64 / (1u64 << (10 * unit)) as f64;
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');

    format!("{} {}", trimmed, UNITS[unit])
}

use std::path::Path;

const WINDOWS_DEVICE_NAMES: [&str; 24] = [
    "CON", "PRN", "AUX", "NUL", "COM0", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
    "COM8", "COM9", "LPT0", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

pub fn current_timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Reduces an arbitrary client-supplied filename to a flat, ASCII-only name
/// that is safe to join onto a storage directory.
///
/// The result may be empty, callers decide what to do with that.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename
        .chars()
        .filter(char::is_ascii)
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = ascii.split_whitespace().collect::<Vec<_>>().join("_");
    let stripped: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let trimmed = stripped.trim_matches(|c| c == '.' || c == '_');

    let device = trimmed.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if !trimmed.is_empty() && WINDOWS_DEVICE_NAMES.contains(&device.as_str()) {
        return format!("_{}", trimmed);
    }
    trimmed.to_string()
}

/// Builds `{base}_{suffix}_{millis}.{extension}` for a processed image, where
/// `base` is the sanitised stem of `input`.
pub fn output_file_name(input: &Path, suffix: &str, extension: &str) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy())
        .unwrap_or_default();
    let base = secure_filename(&stem);
    format!(
        "{}_{}_{}.{}",
        base,
        suffix,
        current_timestamp_millis(),
        extension
    )
}

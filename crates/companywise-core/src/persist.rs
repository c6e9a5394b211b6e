//! Whole-file JSON persistence.

use std::path::Path;

use serde::Serialize;

/// Serialize `value` and replace `path` with it.
///
/// Missing parent directories are created. The bytes land in a sibling
/// `<name>.json.tmp` first and are renamed over `path`, so a reader sees
/// either the old file or the new one.
pub fn write_json_atomic<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    pretty: bool,
) -> std::io::Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let bytes = if pretty {
        serde_json::to_vec_pretty(value)
    } else {
        serde_json::to_vec(value)
    }
    .map_err(std::io::Error::other)?;

    let staged = path.with_extension("json.tmp");
    std::fs::write(&staged, &bytes)?;
    std::fs::rename(&staged, path)?;
    Ok(bytes.len())
}

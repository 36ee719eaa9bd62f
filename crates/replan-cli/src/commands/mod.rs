pub mod check;
pub mod plan;
pub mod slot;

use std::path::Path;

/// Load a JSON document from a file.
pub fn load_json<T: for<'de> serde::Deserialize<'de>>(
    path: &Path,
) -> Result<T, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{bail, Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::info;

static UNSAFE_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.-]").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct StoredImage {
    pub success: bool,
    /// Path to use as an `<img src>` in the pages.
    pub path: String,
    pub file_name: String,
}

pub fn sanitize_file_name(name: &str) -> String {
    UNSAFE_CHARS_RE.replace_all(name, "_").into_owned()
}

/// Copy an uploaded image into `images_dir` as `<unix-millis>-<name>`.
pub fn store_image(images_dir: &Path, original_name: &str, bytes: &[u8]) -> Result<StoredImage> {
    if original_name.is_empty() {
        bail!("No file name provided");
    }
    fs::create_dir_all(images_dir)
        .with_context(|| format!("Failed to create {}", images_dir.display()))?;

    let file_name = format!(
        "{}-{}",
        chrono::Utc::now().timestamp_millis(),
        sanitize_file_name(original_name)
    );
    let target = images_dir.join(&file_name);
    fs::write(&target, bytes).with_context(|| format!("Failed to write {}", target.display()))?;
    info!("Stored image {} ({} bytes)", file_name, bytes.len());

    Ok(StoredImage {
        success: true,
        path: format!("images/{}", file_name),
        file_name,
    })
}

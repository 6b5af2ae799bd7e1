use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::ContentError;

static SAVE_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub file: String,
    pub path: PathBuf,
    pub source: String,
    pub version: String,
}

/// Hex SHA-256 of the document bytes, used as an optimistic-concurrency token.
pub fn content_version(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// Reject anything but a bare file name so requests cannot reach outside the site root.
pub fn validate_document_name(file: &str) -> Result<(), ContentError> {
    let plain = !file.is_empty()
        && file != "."
        && file != ".."
        && !file.contains(['/', '\\'])
        && !file.contains('\0');
    if plain {
        Ok(())
    } else {
        Err(ContentError::InvalidDocumentName(file.to_string()))
    }
}

pub fn document_path(root: &Path, file: &str) -> Result<PathBuf, ContentError> {
    validate_document_name(file)?;
    Ok(root.join(file))
}

pub fn load(root: &Path, file: &str) -> Result<LoadedDocument, ContentError> {
    let path = document_path(root, file)?;
    let source = fs::read_to_string(&path).map_err(|source| ContentError::Read {
        file: file.to_string(),
        source,
    })?;
    let version = content_version(&source);
    debug!(file, bytes = source.len(), %version, "loaded document");
    Ok(LoadedDocument {
        file: file.to_string(),
        path,
        source,
        version,
    })
}

/// Replace the document in one step: write a sibling temp file, then rename
/// it over the original so readers never see a half-written page. The temp
/// name is unique per process and call; the original's permissions carry over.
pub fn save(doc: &LoadedDocument, contents: &str) -> Result<(), ContentError> {
    let write_err = |source: io::Error| ContentError::Write {
        file: doc.file.clone(),
        source,
    };
    let tmp = doc.path.with_file_name(format!(
        ".{}.{}-{}.tmp",
        doc.file,
        std::process::id(),
        SAVE_SEQ.fetch_add(1, Ordering::Relaxed)
    ));

    let staged = fs::write(&tmp, contents).and_then(|()| match fs::metadata(&doc.path) {
        Ok(meta) => fs::set_permissions(&tmp, meta.permissions()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    });
    if let Err(e) = staged.and_then(|()| fs::rename(&tmp, &doc.path)) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    debug!(file = %doc.file, bytes = contents.len(), "wrote document");
    Ok(())
}

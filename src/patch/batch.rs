use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ContentError;
use crate::settings::ScanRules;
use crate::store;

use super::{apply_edits, parse_request, EditOutcome, EditRequest};

#[derive(Debug, Clone, Serialize)]
pub struct PatchResponse {
    /// The request was well-formed and processed. Per-file problems are
    /// reported in `files`, not here.
    pub success: bool,
    /// Every edit ended up `applied` or `unchanged`.
    pub complete: bool,
    pub updated: BTreeMap<String, usize>,
    pub files: Vec<FileReport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Patched,
    Unchanged,
    Missing,
    Conflict,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub status: FileStatus,
    pub applied: usize,
    /// Version of the document as it now stands on disk.
    pub version: Option<String>,
    pub edits: Vec<EditReport>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditReport {
    /// Position of the edit in the request.
    pub index: usize,
    pub kind: &'static str,
    pub outcome: EditOutcome,
}

/// Parse, validate and apply a patch body against the documents under `root`.
pub fn handle_patch(body: &str, root: &Path, rules: &ScanRules) -> Result<PatchResponse, ContentError> {
    let edits = parse_request(body)?;
    Ok(apply_batch(root, rules, &edits))
}

/// Apply already-validated edits, one document at a time. Files are visited
/// in the order they first appear in `edits`; a failure on one file never
/// stops the others.
pub fn apply_batch(root: &Path, rules: &ScanRules, edits: &[EditRequest]) -> PatchResponse {
    let mut by_file: Vec<(&str, Vec<usize>)> = Vec::new();
    for (i, edit) in edits.iter().enumerate() {
        match by_file.iter_mut().find(|(f, _)| *f == edit.file()) {
            Some((_, idxs)) => idxs.push(i),
            None => by_file.push((edit.file(), vec![i])),
        }
    }

    let files: Vec<FileReport> = by_file
        .into_iter()
        .map(|(file, idxs)| patch_file(root, rules, file, edits, &idxs))
        .collect();

    let updated = files.iter().map(|f| (f.file.clone(), f.applied)).collect();
    let complete = files
        .iter()
        .flat_map(|f| &f.edits)
        .all(|e| matches!(e.outcome, EditOutcome::Applied | EditOutcome::Unchanged));

    info!(
        "Patched {} of {} files ({} edits)",
        files.iter().filter(|f| f.status == FileStatus::Patched).count(),
        files.len(),
        edits.len()
    );

    PatchResponse {
        success: true,
        complete,
        updated,
        files,
    }
}

fn patch_file(root: &Path, rules: &ScanRules, file: &str, edits: &[EditRequest], idxs: &[usize]) -> FileReport {
    let loaded = match store::load(root, file) {
        Ok(doc) => doc,
        Err(e) => {
            let reports = edit_reports(edits, idxs, None);
            return FileReport::failed(file, FileStatus::Missing, None, &e, reports);
        }
    };

    let stale = idxs
        .iter()
        .filter_map(|&i| edits[i].version())
        .find(|v| *v != loaded.version);
    if let Some(expected) = stale {
        let err = ContentError::VersionConflict {
            file: file.to_string(),
            expected: expected.to_string(),
            actual: loaded.version.clone(),
        };
        let reports = edit_reports(edits, idxs, None);
        return FileReport::failed(file, FileStatus::Conflict, Some(loaded.version), &err, reports);
    }

    let targets: Vec<&EditRequest> = idxs.iter().map(|&i| &edits[i]).collect();
    let patch = apply_edits(&loaded.source, &targets, rules);
    let reports = edit_reports(edits, idxs, Some(patch.outcomes.as_slice()));

    if !patch.changed(&loaded.source) {
        return FileReport {
            file: file.to_string(),
            status: FileStatus::Unchanged,
            applied: 0,
            version: Some(loaded.version),
            edits: reports,
            error: None,
        };
    }

    if let Err(e) = store::save(&loaded, &patch.output) {
        let reports = edit_reports(edits, idxs, None);
        return FileReport::failed(file, FileStatus::Failed, Some(loaded.version.clone()), &e, reports);
    }

    let applied = patch.applied();
    info!("{}: {} edits applied", file, applied);
    FileReport {
        file: file.to_string(),
        status: FileStatus::Patched,
        applied,
        version: Some(store::content_version(&patch.output)),
        edits: reports,
        error: None,
    }
}

/// Per-edit lines for one file. Without resolved outcomes every edit takes
/// the outcome matching the file-level failure.
fn edit_reports(edits: &[EditRequest], idxs: &[usize], outcomes: Option<&[EditOutcome]>) -> Vec<EditReport> {
    idxs.iter()
        .enumerate()
        .map(|(n, &i)| EditReport {
            index: i,
            kind: edits[i].kind(),
            outcome: outcomes.map(|o| o[n]).unwrap_or(EditOutcome::Failed),
        })
        .collect()
}

impl FileReport {
    fn failed(
        file: &str,
        status: FileStatus,
        version: Option<String>,
        err: &ContentError,
        mut edits: Vec<EditReport>,
    ) -> Self {
        warn!("{}", err);
        let outcome = match status {
            FileStatus::Missing => EditOutcome::Missing,
            FileStatus::Conflict => EditOutcome::Conflict,
            _ => EditOutcome::Failed,
        };
        for e in &mut edits {
            e.outcome = outcome;
        }
        FileReport {
            file: file.to_string(),
            status,
            applied: 0,
            version,
            edits,
            error: Some(err.to_string()),
        }
    }
}

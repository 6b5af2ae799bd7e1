pub mod batch;
pub mod image;
pub mod testimonial;
pub mod text;

use std::ops::Range;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ContentError;
use crate::html::Document;
use crate::settings::ScanRules;
use crate::store::validate_document_name;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum EditRequest {
    Text(TextEdit),
    Image(ImageEdit),
    Testimonial(TestimonialEdit),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextEdit {
    pub file: String,
    #[serde(alias = "target_class")]
    pub class_name: String,
    pub occurrence: usize,
    pub new_text: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageEdit {
    pub file: String,
    pub original_src: String,
    pub occurrence: usize,
    pub new_src: String,
    pub new_alt: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TestimonialEdit {
    pub file: String,
    pub occurrence: usize,
    pub badge: String,
    pub quote: String,
    pub author: String,
    pub role: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl EditRequest {
    pub fn file(&self) -> &str {
        match self {
            EditRequest::Text(e) => &e.file,
            EditRequest::Image(e) => &e.file,
            EditRequest::Testimonial(e) => &e.file,
        }
    }

    pub fn occurrence(&self) -> usize {
        match self {
            EditRequest::Text(e) => e.occurrence,
            EditRequest::Image(e) => e.occurrence,
            EditRequest::Testimonial(e) => e.occurrence,
        }
    }

    pub fn version(&self) -> Option<&str> {
        match self {
            EditRequest::Text(e) => e.version.as_deref(),
            EditRequest::Image(e) => e.version.as_deref(),
            EditRequest::Testimonial(e) => e.version.as_deref(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            EditRequest::Text(_) => "text",
            EditRequest::Image(_) => "image",
            EditRequest::Testimonial(_) => "testimonial",
        }
    }

    fn validate(&self) -> Result<(), String> {
        validate_document_name(self.file()).map_err(|e| e.to_string())?;
        if self.occurrence() == 0 {
            return Err("occurrence is 1-based and must be at least 1".into());
        }
        match self {
            EditRequest::Text(e) if e.class_name.trim().is_empty() => Err("class_name is empty".into()),
            EditRequest::Image(e) if e.original_src.is_empty() => Err("original_src is empty".into()),
            _ => Ok(()),
        }
    }

    /// Locate the target in `doc` and describe the change as byte splices.
    pub fn resolve(&self, doc: &Document, rules: &ScanRules) -> Resolution {
        match self {
            EditRequest::Text(e) => text::resolve(doc, rules, &e.class_name, e.occurrence, &e.new_text),
            EditRequest::Image(e) => {
                image::resolve(doc, rules, &e.original_src, e.occurrence, &e.new_src, &e.new_alt)
            }
            EditRequest::Testimonial(e) => testimonial::resolve(
                doc,
                &rules.testimonial,
                e.occurrence,
                [e.badge.as_str(), e.quote.as_str(), e.author.as_str(), e.role.as_str()],
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    edits: Option<serde_json::Value>,
}

/// Parse and validate a patch body `{ "edits": [ ... ] }`. Any problem rejects
/// the whole request before a file is opened.
pub fn parse_request(body: &str) -> Result<Vec<EditRequest>, ContentError> {
    let raw: RawRequest = serde_json::from_str(body)
        .map_err(|e| ContentError::InvalidRequest(format!("body is not a JSON object: {}", e)))?;

    let edits = match raw.edits {
        Some(v @ serde_json::Value::Array(_)) => v,
        Some(_) => return Err(ContentError::InvalidRequest("edits must be an array".into())),
        None => return Err(ContentError::InvalidRequest("missing edits".into())),
    };

    let edits: Vec<EditRequest> = serde_json::from_value(edits)
        .map_err(|e| ContentError::InvalidRequest(format!("malformed edit: {}", e)))?;

    for (i, edit) in edits.iter().enumerate() {
        edit.validate()
            .map_err(|msg| ContentError::InvalidRequest(format!("edit {}: {}", i, msg)))?;
    }

    Ok(edits)
}

/// Replace `range` of the loaded document with `text`. An empty range inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splice {
    pub range: Range<usize>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Splices(Vec<Splice>),
    /// Target found and already holds the requested values.
    Unchanged,
    /// Nothing in the document matches; the reference is stale.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOutcome {
    Applied,
    Unchanged,
    NotFound,
    /// Every change this edit wanted was overwritten by a later edit.
    Superseded,
    Missing,
    Conflict,
    Failed,
}

#[derive(Debug, Clone)]
pub struct DocumentPatch {
    pub output: String,
    pub outcomes: Vec<EditOutcome>,
}

impl DocumentPatch {
    pub fn changed(&self, source: &str) -> bool {
        self.output != source
    }

    pub fn applied(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| **o == EditOutcome::Applied)
            .count()
    }
}

/// Apply edits to one document. Every edit is resolved against `source` as
/// given, so earlier edits never shift later targets; where two edits touch
/// the same bytes the later one in the list wins.
pub fn apply_edits(source: &str, edits: &[&EditRequest], rules: &ScanRules) -> DocumentPatch {
    let doc = Document::parse(source);
    let mut outcomes = Vec::with_capacity(edits.len());
    let mut planned: Vec<(usize, Splice)> = Vec::new();

    for (i, edit) in edits.iter().enumerate() {
        match edit.resolve(&doc, rules) {
            Resolution::Splices(splices) => {
                outcomes.push(EditOutcome::Applied);
                planned.extend(splices.into_iter().map(|s| (i, s)));
            }
            Resolution::Unchanged => outcomes.push(EditOutcome::Unchanged),
            Resolution::NotFound => outcomes.push(EditOutcome::NotFound),
        }
    }

    let mut kept: Vec<(usize, Splice)> = Vec::new();
    for (i, splice) in planned.into_iter().rev() {
        if kept.iter().any(|(_, k)| overlaps(&k.range, &splice.range)) {
            debug!(edit = i, "splice overwritten by a later edit");
            continue;
        }
        kept.push((i, splice));
    }

    for (i, outcome) in outcomes.iter_mut().enumerate() {
        if *outcome == EditOutcome::Applied && !kept.iter().any(|(k, _)| *k == i) {
            *outcome = EditOutcome::Superseded;
        }
    }

    kept.sort_by(|a, b| {
        b.1.range
            .start
            .cmp(&a.1.range.start)
            .then(b.1.range.end.cmp(&a.1.range.end))
    });
    let mut output = source.to_string();
    for (_, splice) in &kept {
        output.replace_range(splice.range.clone(), &splice.text);
    }

    DocumentPatch { output, outcomes }
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => a.start == b.start,
        (true, false) => b.start < a.start && a.start < b.end,
        (false, true) => a.start < b.start && b.start < a.end,
        (false, false) => a.start < b.end && b.start < a.end,
    }
}

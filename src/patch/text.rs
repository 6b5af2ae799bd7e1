use crate::html::text::{collapse_whitespace, escape_text};
use crate::html::Document;
use crate::scan::text::text_matches;
use crate::settings::ScanRules;

use super::{Resolution, Splice};

/// Target the `occurrence`-th scanned text field with primary class `class_name`.
pub fn resolve(doc: &Document, rules: &ScanRules, class_name: &str, occurrence: usize, new_text: &str) -> Resolution {
    let target = text_matches(doc, rules)
        .into_iter()
        .find(|m| m.class_name == class_name && m.occurrence == occurrence);

    match target {
        Some(m) => match text_splice(doc, m.element, &m.text, new_text) {
            Some(splice) => Resolution::Splices(vec![splice]),
            None => Resolution::Unchanged,
        },
        None => Resolution::NotFound,
    }
}

/// Rewrite an element's editable run (see `Document::editable_run`), keeping
/// the run's surrounding whitespace and any nested markup around it.
/// Returns `None` when the element already reads `new_text`.
pub fn text_splice(doc: &Document, element: usize, current: &str, new_text: &str) -> Option<Splice> {
    if collapse_whitespace(new_text) == current {
        return None;
    }

    let run = doc.editable_run(element);
    let raw = &doc.source[run.clone()];
    let trimmed_start = raw.trim_start();
    let lead = raw.len() - trimmed_start.len();
    let trail = trimmed_start.len() - trimmed_start.trim_end().len();

    Some(Splice {
        range: run.start + lead..run.end - trail,
        text: escape_text(new_text.trim()),
    })
}

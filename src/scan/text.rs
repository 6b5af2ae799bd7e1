use crate::html::{text::label_from_class, Document};
use crate::settings::ScanRules;

use super::item::{content_id, InputKind, OccurrenceCounter, TextField};
use super::sections::{section_at, Section};

/// One editable text element, as both the scanner and the text patcher see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMatch {
    pub element: usize,
    pub tag: String,
    pub class_name: String,
    pub text: String,
    pub occurrence: usize,
    pub offset: usize,
}

/// Enumerate editable text elements in document order.
///
/// An element qualifies when its tag is allow-listed, it is explicitly closed,
/// its primary class is present, none of its classes is on the skip-list,
/// and its visible text falls inside the configured length band. The band is
/// a heuristic: the markup does not mark leaf copy apart from wrappers, so
/// very short strings are treated as noise and very long ones as containers.
pub fn text_matches(doc: &Document, rules: &ScanRules) -> Vec<TextMatch> {
    let mut counter = OccurrenceCounter::new();
    let mut matches = Vec::new();

    for (idx, el) in doc.elements.iter().enumerate() {
        if !rules.is_text_tag(&el.name) || !el.is_closed() {
            continue;
        }
        let Some(class_name) = el.primary_class() else {
            continue;
        };
        if el.classes().any(|c| rules.is_skipped_class(c)) {
            continue;
        }
        let text = doc.inner_text(idx);
        if !rules.text_len_ok(&text) {
            continue;
        }

        matches.push(TextMatch {
            element: idx,
            tag: el.name.clone(),
            class_name: class_name.to_string(),
            occurrence: counter.next(class_name),
            text,
            offset: el.open.start,
        });
    }

    matches
}

pub fn scan(doc: &Document, file: &str, sections: &[Section], rules: &ScanRules) -> Vec<TextField> {
    text_matches(doc, rules)
        .into_iter()
        .map(|m| {
            let input = if m.text.chars().count() > rules.textarea_threshold {
                InputKind::Textarea
            } else {
                InputKind::Text
            };
            TextField {
                id: content_id(file, &m.class_name, m.occurrence),
                file: file.to_string(),
                section: section_at(sections, m.offset, &rules.sections.default_name).to_string(),
                label: label_from_class(&m.class_name),
                tag: m.tag,
                class_name: m.class_name,
                text: m.text,
                input,
                occurrence: m.occurrence,
            }
        })
        .collect()
}

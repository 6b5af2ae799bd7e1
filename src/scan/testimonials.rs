use crate::html::Document;
use crate::settings::{ScanRules, TestimonialRules};

use super::item::{content_id, TestimonialBlock};
use super::sections::{section_at, Section};

const DISCRIMINATOR: &str = "testimonial";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    pub element: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialMatch {
    pub element: usize,
    pub occurrence: usize,
    pub offset: usize,
    pub badge: Option<Part>,
    pub quote: Option<Part>,
    pub author: Option<Part>,
    pub role: Option<Part>,
}

/// Testimonial cards are the outermost elements carrying the container class.
/// Each card's parts are the first descendants with the part classes.
pub fn testimonial_matches(doc: &Document, rules: &TestimonialRules) -> Vec<TestimonialMatch> {
    let mut matches = Vec::new();

    for (idx, el) in doc.elements.iter().enumerate() {
        if !el.has_class(&rules.container) {
            continue;
        }
        if doc
            .ancestors(idx)
            .any(|a| doc.elements[a].has_class(&rules.container))
        {
            continue;
        }

        let part = |class: &str| {
            doc.descendants(idx)
                .find(|&d| doc.elements[d].has_class(class))
                .map(|d| Part {
                    element: d,
                    text: doc.inner_text(d),
                })
        };

        let occurrence = matches.len() + 1;
        matches.push(TestimonialMatch {
            element: idx,
            occurrence,
            offset: el.open.start,
            badge: part(&rules.badge.class),
            quote: part(&rules.quote.class),
            author: part(&rules.author.class),
            role: part(&rules.role.class),
        });
    }

    matches
}

pub fn scan(doc: &Document, file: &str, sections: &[Section], rules: &ScanRules) -> Vec<TestimonialBlock> {
    let text = |p: &Option<Part>| p.as_ref().map(|p| p.text.clone()).unwrap_or_default();

    testimonial_matches(doc, &rules.testimonial)
        .into_iter()
        .map(|m| TestimonialBlock {
            id: content_id(file, DISCRIMINATOR, m.occurrence),
            file: file.to_string(),
            section: section_at(sections, m.offset, &rules.sections.default_name).to_string(),
            badge: text(&m.badge),
            quote: text(&m.quote),
            author: text(&m.author),
            role: text(&m.role),
            occurrence: m.occurrence,
        })
        .collect()
}

use crate::html::text::escape_text;
use crate::html::Document;
use crate::scan::testimonials::{testimonial_matches, Part};
use crate::settings::{PartMarker, TestimonialRules};

use super::text::text_splice;
use super::{Resolution, Splice};

/// Update the `occurrence`-th testimonial card. `values` are badge, quote,
/// author and role. Parts the card lacks are appended to it when their new
/// value is non-empty.
pub fn resolve(doc: &Document, rules: &TestimonialRules, occurrence: usize, values: [&str; 4]) -> Resolution {
    let Some(m) = testimonial_matches(doc, rules)
        .into_iter()
        .find(|m| m.occurrence == occurrence)
    else {
        return Resolution::NotFound;
    };

    let parts: [(&Option<Part>, &PartMarker); 4] = [
        (&m.badge, &rules.badge),
        (&m.quote, &rules.quote),
        (&m.author, &rules.author),
        (&m.role, &rules.role),
    ];

    let mut splices = Vec::new();
    let mut appended = String::new();
    for ((part, marker), value) in parts.into_iter().zip(values) {
        match part {
            Some(p) => splices.extend(text_splice(doc, p.element, &p.text, value)),
            None if !value.trim().is_empty() => {
                appended.push_str(&format!(
                    "<{tag} class=\"{class}\">{text}</{tag}>",
                    tag = marker.tag,
                    class = marker.class,
                    text = escape_text(value.trim()),
                ));
            }
            None => {}
        }
    }

    if !appended.is_empty() {
        let at = doc.elements[m.element].content.end;
        splices.push(Splice {
            range: at..at,
            text: appended,
        });
    }

    if splices.is_empty() {
        Resolution::Unchanged
    } else {
        Resolution::Splices(splices)
    }
}

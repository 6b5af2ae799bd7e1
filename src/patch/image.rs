use crate::html::text::escape_attr;
use crate::html::{Document, Element};
use crate::scan::images::image_matches;
use crate::settings::ScanRules;

use super::{Resolution, Splice};

/// Target the `occurrence`-th scanned image whose src is `original_src` and
/// rewrite its `src` and `alt` wherever they sit in the tag.
pub fn resolve(
    doc: &Document,
    rules: &ScanRules,
    original_src: &str,
    occurrence: usize,
    new_src: &str,
    new_alt: &str,
) -> Resolution {
    let Some(m) = image_matches(doc, rules)
        .into_iter()
        .find(|m| m.src == original_src && m.occurrence == occurrence)
    else {
        return Resolution::NotFound;
    };

    let el = &doc.elements[m.element];
    let mut splices = Vec::new();
    if m.src != new_src {
        splices.push(attr_splice(doc, el, "src", new_src));
    }
    if m.alt != new_alt {
        splices.push(attr_splice(doc, el, "alt", new_alt));
    }

    if splices.is_empty() {
        Resolution::Unchanged
    } else {
        Resolution::Splices(splices)
    }
}

/// Double-quoted values are replaced in place; anything else (single-quoted,
/// unquoted, valueless, absent) is rewritten as `name="value"`.
fn attr_splice(doc: &Document, el: &Element, name: &str, value: &str) -> Splice {
    let escaped = escape_attr(value);
    let Some(attr) = el.attr(name) else {
        let at = el.open.start + 1 + el.name.len();
        return Splice {
            range: at..at,
            text: format!(" {}=\"{}\"", name, escaped),
        };
    };

    match &attr.value_span {
        Some(span) if span.start > 0 && doc.source.as_bytes()[span.start - 1] == b'"' => Splice {
            range: span.clone(),
            text: escaped,
        },
        _ => Splice {
            range: attr.span.clone(),
            text: format!("{}=\"{}\"", name, escaped),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{apply_edits, EditOutcome, EditRequest, ImageEdit};

    fn patch(src: &str, original: &str, occurrence: usize, new_src: &str, new_alt: &str) -> (String, EditOutcome) {
        let edit = EditRequest::Image(ImageEdit {
            file: "about.html".into(),
            original_src: original.into(),
            occurrence,
            new_src: new_src.into(),
            new_alt: new_alt.into(),
            version: None,
        });
        let p = apply_edits(src, &[&edit], &ScanRules::default());
        (p.output, p.outcomes[0])
    }

    #[test]
    fn both_attributes_either_order() {
        let src = r#"<img src="/images/a.jpg" alt="A"><img alt="B" class="round" src="/images/b.jpg">"#;
        let (out, outcome) = patch(src, "/images/b.jpg", 1, "images/123-new.jpg", "New B");
        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(
            out,
            r#"<img src="/images/a.jpg" alt="A"><img alt="New B" class="round" src="images/123-new.jpg">"#
        );
    }

    #[test]
    fn only_target_occurrence_changes() {
        let src = r#"<img src="/i/x.png" alt="one"><img src="/i/x.png" alt="two">"#;
        let (out, _) = patch(src, "/i/x.png", 2, "/i/z.png", "zed");
        assert_eq!(out, r#"<img src="/i/x.png" alt="one"><img src="/i/z.png" alt="zed">"#);
    }

    #[test]
    fn stale_src_is_not_found() {
        let src = r#"<img src="/i/x.png" alt="one">"#;
        let (out, outcome) = patch(src, "/i/deleted.png", 1, "/i/z.png", "zed");
        assert_eq!(outcome, EditOutcome::NotFound);
        assert_eq!(out, src);
    }

    #[test]
    fn same_values_leave_document_untouched() {
        let src = r#"<img src="/i/x.png?v=1&amp;w=2" alt='Say "hi"'>"#;
        let (out, outcome) = patch(src, "/i/x.png?v=1&w=2", 1, "/i/x.png?v=1&w=2", "Say \"hi\"");
        assert_eq!(outcome, EditOutcome::Unchanged);
        assert_eq!(out, src);
    }

    #[test]
    fn unquoted_and_valueless_rewritten() {
        let src = r#"<img src=/i/x.png alt>"#;
        let (out, _) = patch(src, "/i/x.png", 1, "/i/y.png", "Why \"quoted\"");
        assert_eq!(out, r#"<img src="/i/y.png" alt="Why &quot;quoted&quot;">"#);
    }

    #[test]
    fn logo_cannot_be_targeted() {
        let src = r#"<img src="/images/logo.png" alt="Brand">"#;
        let (out, outcome) = patch(src, "/images/logo.png", 1, "/images/other.png", "Other");
        assert_eq!(outcome, EditOutcome::NotFound);
        assert_eq!(out, src);
    }
}

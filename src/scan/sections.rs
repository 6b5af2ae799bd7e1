use serde::Serialize;

use crate::html::Document;
use crate::settings::SectionRules;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub name: String,
    pub offset: usize,
}

/// Section markers are short HTML comments such as `<!-- Hero Section -->`.
/// Closing markers (`<!-- /Hero -->`) and injected tracking snippets are not.
pub fn detect_sections(doc: &Document, rules: &SectionRules) -> Vec<Section> {
    doc.comments()
        .filter_map(|(offset, body)| {
            let name = body.trim();
            if is_marker(name, rules) {
                Some(Section {
                    name: name.to_string(),
                    offset,
                })
            } else {
                None
            }
        })
        .collect()
}

fn is_marker(name: &str, rules: &SectionRules) -> bool {
    !name.is_empty()
        && name.chars().count() < rules.max_len
        && !name.starts_with('/')
        && !rules.noise.iter().any(|n| name.contains(n.as_str()))
}

/// Name of the last section starting before `offset`.
pub fn section_at<'a>(sections: &'a [Section], offset: usize, default: &'a str) -> &'a str {
    let idx = sections.partition_point(|s| s.offset < offset);
    if idx == 0 {
        default
    } else {
        &sections[idx - 1].name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(html: &str) -> Vec<String> {
        let doc = Document::parse(html);
        detect_sections(&doc, &SectionRules::default())
            .into_iter()
            .map(|s| s.name)
            .collect()
    }

    #[test]
    fn markers_in_order() {
        let html = "<!-- Hero -->\n<h1>x</h1>\n<!-- /Hero -->\n<!--   The Problem   -->";
        assert_eq!(names(html), ["Hero", "The Problem"]);
    }

    #[test]
    fn noise_and_long_comments_rejected() {
        let long = "x".repeat(50);
        let html = format!(
            "<!-- Google tag (gtag.js) --><!-- inline script loader --><!-- {} --><!----><!-- Footer -->",
            long
        );
        assert_eq!(names(&html), ["Footer"]);
        let just_under = "y".repeat(49);
        assert_eq!(names(&format!("<!--{}-->", just_under)), [just_under]);
    }

    #[test]
    fn no_markers_means_top() {
        let doc = Document::parse("<p class=\"a\">hello</p>");
        let sections = detect_sections(&doc, &SectionRules::default());
        assert!(sections.is_empty());
        assert_eq!(section_at(&sections, 10, "Top"), "Top");
    }

    #[test]
    fn attribution_uses_preceding_marker() {
        let sections = vec![
            Section { name: "Hero".into(), offset: 10 },
            Section { name: "CTA".into(), offset: 100 },
        ];
        assert_eq!(section_at(&sections, 5, "Top"), "Top");
        assert_eq!(section_at(&sections, 10, "Top"), "Top");
        assert_eq!(section_at(&sections, 11, "Top"), "Hero");
        assert_eq!(section_at(&sections, 500, "Top"), "CTA");
    }

    #[test]
    fn fixture_sections() {
        let html = std::fs::read_to_string("tests/fixtures/index.html").unwrap();
        let got = names(&html);
        assert_eq!(got, ["Hero Section", "What Blueprxnt Is", "Testimonials", "Final CTA"]);
    }
}

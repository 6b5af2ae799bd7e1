use crate::html::{text::decode_entities, Document};
use crate::settings::ScanRules;

use super::item::{content_id, ImageField, OccurrenceCounter};
use super::sections::{section_at, Section};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageMatch {
    pub element: usize,
    pub src: String,
    pub alt: String,
    pub occurrence: usize,
    pub offset: usize,
}

/// `<img>` tags carrying both `src` and `alt`, in any attribute order.
/// The site logo is never offered for editing.
pub fn image_matches(doc: &Document, rules: &ScanRules) -> Vec<ImageMatch> {
    let mut counter = OccurrenceCounter::new();

    doc.elements
        .iter()
        .enumerate()
        .filter(|(_, el)| el.name == "img")
        .filter_map(|(idx, el)| {
            let src = decode_entities(el.attr_value("src")?);
            let alt = decode_entities(el.attr("alt")?.value.as_deref().unwrap_or(""));
            if src.contains(rules.logo_marker.as_str()) {
                return None;
            }
            Some(ImageMatch {
                element: idx,
                occurrence: counter.next(&src),
                src,
                alt,
                offset: el.open.start,
            })
        })
        .collect()
}

pub fn scan(doc: &Document, file: &str, sections: &[Section], rules: &ScanRules) -> Vec<ImageField> {
    image_matches(doc, rules)
        .into_iter()
        .map(|m| ImageField {
            id: content_id(file, &m.src, m.occurrence),
            file: file.to_string(),
            section: section_at(sections, m.offset, &rules.sections.default_name).to_string(),
            src: m.src,
            alt: m.alt,
            occurrence: m.occurrence,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images(html: &str) -> Vec<ImageField> {
        let doc = Document::parse(html);
        scan(&doc, "about.html", &[], &ScanRules::default())
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let f = images(r#"<img alt="Coach" src="/images/coach.jpg"><img src="/images/gym.jpg" class="wide" alt="Gym">"#);
        assert_eq!(f.len(), 2);
        assert_eq!((f[0].src.as_str(), f[0].alt.as_str()), ("/images/coach.jpg", "Coach"));
        assert_eq!((f[1].src.as_str(), f[1].alt.as_str()), ("/images/gym.jpg", "Gym"));
        assert_eq!(f[1].id, "about.html::/images/gym.jpg");
    }

    #[test]
    fn logo_excluded() {
        let f = images(r#"<img src="/images/logo.png" alt="Brand"><img src="/images/hero.jpg" alt="Hero">"#);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].src, "/images/hero.jpg");
    }

    #[test]
    fn requires_src_and_alt() {
        let f = images(r#"<img src="/images/a.jpg"><img alt="only alt"><img src="/images/b.jpg" alt>"#);
        assert_eq!(f.len(), 1);
        assert_eq!(f[0].src, "/images/b.jpg");
        assert_eq!(f[0].alt, "");
    }

    #[test]
    fn repeated_src_counts_occurrences() {
        let f = images(r#"<img src="/i/x.png" alt="one"><img src="/i/y.png" alt="y"><img src="/i/x.png" alt="two">"#);
        let ids: Vec<&str> = f.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["about.html::/i/x.png", "about.html::/i/y.png", "about.html::/i/x.png::2"]);
    }
}

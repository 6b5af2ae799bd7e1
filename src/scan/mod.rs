pub mod images;
pub mod item;
pub mod sections;
pub mod testimonials;
pub mod text;

use std::collections::HashSet;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::html::Document;
use crate::settings::{ScanRules, Settings};
use crate::store;
use item::ContentItem;
use sections::Section;

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub items: Vec<ContentItem>,
    pub pages: Vec<PageGroup>,
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageGroup {
    pub page: String,
    pub sections: Vec<SectionGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionGroup {
    pub name: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub file: String,
    pub page: String,
    /// Present when the document was read; send it back with edits to detect
    /// concurrent changes.
    pub version: Option<String>,
    pub items: usize,
    pub sections: Vec<Section>,
    pub error: Option<String>,
}

/// Sections → text fields → images → testimonials for one document.
pub fn scan_document(file: &str, source: &str, rules: &ScanRules) -> (Vec<Section>, Vec<ContentItem>) {
    let doc = Document::parse(source);
    let sections = sections::detect_sections(&doc, &rules.sections);

    let mut items: Vec<ContentItem> = Vec::new();
    items.extend(text::scan(&doc, file, &sections, rules).into_iter().map(ContentItem::Text));
    items.extend(images::scan(&doc, file, &sections, rules).into_iter().map(ContentItem::Image));
    items.extend(
        testimonials::scan(&doc, file, &sections, rules)
            .into_iter()
            .map(ContentItem::Testimonial),
    );

    (sections, items)
}

/// Scan every configured document. Unreadable documents contribute nothing
/// and are reported in their summary; the scan itself never fails.
pub fn scan_site(settings: &Settings) -> ScanResult {
    let per_doc: Vec<(DocumentSummary, Vec<ContentItem>)> = settings
        .documents
        .par_iter()
        .map(|spec| match store::load(&settings.site_root, &spec.file) {
            Ok(loaded) => {
                let (sections, items) = scan_document(&spec.file, &loaded.source, &settings.rules);
                let summary = DocumentSummary {
                    file: spec.file.clone(),
                    page: spec.page.clone(),
                    version: Some(loaded.version),
                    items: items.len(),
                    sections,
                    error: None,
                };
                (summary, items)
            }
            Err(e) => {
                warn!("Skipping {}: {}", spec.file, e);
                let summary = DocumentSummary {
                    file: spec.file.clone(),
                    page: spec.page.clone(),
                    version: None,
                    items: 0,
                    sections: Vec::new(),
                    error: Some(e.to_string()),
                };
                (summary, Vec::new())
            }
        })
        .collect();

    let mut documents = Vec::with_capacity(per_doc.len());
    let mut items = Vec::new();
    for (summary, doc_items) in per_doc {
        documents.push(summary);
        items.extend(doc_items);
    }
    ensure_unique_ids(&mut items);

    let pages = group_by_page(&items, settings);
    info!(
        "Scanned {} documents: {} items",
        documents.iter().filter(|d| d.error.is_none()).count(),
        items.len()
    );

    ScanResult {
        items,
        pages,
        documents,
    }
}

/// Different kinds could share a discriminator (a text class named like an
/// image src, or a class literally called `testimonial`). Later duplicates get
/// the kind appended.
fn ensure_unique_ids(items: &mut [ContentItem]) {
    let mut seen: HashSet<String> = HashSet::new();
    for item in items.iter_mut() {
        if !seen.insert(item.id().to_string()) {
            let id = format!("{}::{}", item.id(), item.kind());
            warn!("Duplicate content id {}, renamed to {}", item.id(), id);
            item.set_id(id.clone());
            seen.insert(id);
        }
    }
}

/// Page → section → items, each level in first-appearance order.
pub fn group_by_page(items: &[ContentItem], settings: &Settings) -> Vec<PageGroup> {
    let mut pages: Vec<PageGroup> = Vec::new();

    for item in items {
        let page_name = settings.page_name(item.file()).unwrap_or(item.file());

        let pi = match pages.iter().position(|p| p.page == page_name) {
            Some(i) => i,
            None => {
                pages.push(PageGroup {
                    page: page_name.to_string(),
                    sections: Vec::new(),
                });
                pages.len() - 1
            }
        };
        let page = &mut pages[pi];

        match page.sections.iter_mut().find(|s| s.name == item.section()) {
            Some(section) => section.items.push(item.clone()),
            None => page.sections.push(SectionGroup {
                name: item.section().to_string(),
                items: vec![item.clone()],
            }),
        }
    }

    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn fixture(name: &str) -> String {
        fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
    }

    fn site_with(files: &[(&str, &str)]) -> (tempfile::TempDir, Settings) {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let settings = Settings {
            site_root: dir.path().to_path_buf(),
            ..Settings::default()
        };
        (dir, settings)
    }

    #[test]
    fn home_fixture_items() {
        let (sections, items) = scan_document("index.html", &fixture("index.html"), &ScanRules::default());
        assert_eq!(sections.len(), 4);

        let ids: Vec<&str> = items.iter().map(|i| i.id()).collect();
        assert!(ids.contains(&"index.html::hero-title"));
        assert!(ids.contains(&"index.html::hero-subtitle"));
        assert!(ids.contains(&"index.html::feature-title::3"));
        assert!(ids.contains(&"index.html::/images/hero.jpg"));
        assert!(ids.contains(&"index.html::testimonial::2"));
        assert!(!ids.iter().any(|id| id.contains("logo")));
        assert!(!ids.iter().any(|id| id.contains("nav-menu")));
        assert!(!ids.iter().any(|id| id.contains("mobile-menu-toggle")));
        assert!(!ids.iter().any(|id| id.contains("footer-bottom-links")));

        let hero = items.iter().find(|i| i.id() == "index.html::hero-title").unwrap();
        assert_eq!(hero.section(), "Hero Section");
        let cta = items.iter().find(|i| i.id() == "index.html::cta-title").unwrap();
        assert_eq!(cta.section(), "Final CTA");
    }

    #[test]
    fn testimonial_box_markup_is_a_testimonial() {
        let html = r#"<div class="testimonial-box"><span class="testimonial-badge">Pro</span><p class="testimonial-text">Great</p><p class="testimonial-author">Jo</p><p class="testimonial-position">Coach</p></div>"#;
        let (_, items) = scan_document("index.html", html, &ScanRules::default());

        let kinds: Vec<&str> = items.iter().map(|i| i.kind()).collect();
        assert_eq!(kinds, ["text", "text", "text", "text", "testimonial"]);
        match &items[4] {
            ContentItem::Testimonial(t) => {
                assert_eq!(t.id, "index.html::testimonial");
                assert_eq!((t.badge.as_str(), t.quote.as_str()), ("Pro", "Great"));
                assert_eq!((t.author.as_str(), t.role.as_str()), ("Jo", "Coach"));
            }
            other => panic!("expected testimonial, got {:?}", other),
        }
    }

    #[test]
    fn kinds_in_fixed_order() {
        let (_, items) = scan_document("index.html", &fixture("index.html"), &ScanRules::default());
        let kinds: Vec<&str> = items.iter().map(|i| i.kind()).collect();
        let first_image = kinds.iter().position(|k| *k == "image").unwrap();
        let first_testimonial = kinds.iter().position(|k| *k == "testimonial").unwrap();
        assert!(kinds[..first_image].iter().all(|k| *k == "text"));
        assert!(kinds[first_image..first_testimonial].iter().all(|k| *k == "image"));
        assert!(kinds[first_testimonial..].iter().all(|k| *k == "testimonial"));
    }

    #[test]
    fn scan_is_deterministic() {
        let (_dir, settings) = site_with(&[
            ("index.html", fixture("index.html").as_str()),
            ("coaching.html", fixture("coaching.html").as_str()),
        ]);
        let a = scan_site(&settings);
        let b = scan_site(&settings);
        assert_eq!(a.items, b.items);
        assert_eq!(a.pages, b.pages);
    }

    #[test]
    fn missing_documents_are_swallowed() {
        let (_dir, settings) = site_with(&[("index.html", fixture("index.html").as_str())]);
        let result = scan_site(&settings);

        assert_eq!(result.documents.len(), 6);
        let home = &result.documents[0];
        assert!(home.error.is_none());
        assert!(home.version.is_some());
        assert_eq!(home.items, result.items.len());

        let about = result.documents.iter().find(|d| d.file == "about.html").unwrap();
        assert!(about.error.is_some());
        assert_eq!(about.items, 0);
        assert!(result.items.iter().all(|i| i.file() == "index.html"));
    }

    #[test]
    fn grouping_by_page_then_section() {
        let (_dir, settings) = site_with(&[
            ("index.html", fixture("index.html").as_str()),
            ("coaching.html", fixture("coaching.html").as_str()),
        ]);
        let result = scan_site(&settings);

        let pages: Vec<&str> = result.pages.iter().map(|p| p.page.as_str()).collect();
        assert_eq!(pages, ["Home", "Coaching"]);

        let home_sections: Vec<&str> = result.pages[0].sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(home_sections[0], "Top");
        assert!(home_sections.contains(&"Hero Section"));
        assert!(home_sections.contains(&"Final CTA"));

        let grouped: usize = result
            .pages
            .iter()
            .flat_map(|p| &p.sections)
            .map(|s| s.items.len())
            .sum();
        assert_eq!(grouped, result.items.len());
    }

    #[test]
    fn ids_unique_across_kinds() {
        let html = r#"<div class="testimonial-box"><p class="testimonial-text">Quote here</p></div><p class="testimonial">Plain copy</p>"#;
        let (_dir, settings) = site_with(&[("index.html", html)]);
        let result = scan_site(&settings);
        let ids: Vec<&str> = result.items.iter().map(|i| i.id()).collect();
        assert_eq!(
            ids,
            ["index.html::testimonial-text", "index.html::testimonial", "index.html::testimonial::testimonial"]
        );
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }
}

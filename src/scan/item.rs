use std::collections::HashMap;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentItem {
    Text(TextField),
    Image(ImageField),
    Testimonial(TestimonialBlock),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Textarea,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextField {
    pub id: String,
    pub file: String,
    pub section: String,
    pub tag: String,
    pub class_name: String,
    pub label: String,
    pub text: String,
    pub input: InputKind,
    pub occurrence: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageField {
    pub id: String,
    pub file: String,
    pub section: String,
    pub src: String,
    pub alt: String,
    pub occurrence: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestimonialBlock {
    pub id: String,
    pub file: String,
    pub section: String,
    pub badge: String,
    pub quote: String,
    pub author: String,
    pub role: String,
    pub occurrence: usize,
}

impl ContentItem {
    pub fn id(&self) -> &str {
        match self {
            ContentItem::Text(t) => &t.id,
            ContentItem::Image(i) => &i.id,
            ContentItem::Testimonial(t) => &t.id,
        }
    }

    pub fn set_id(&mut self, id: String) {
        match self {
            ContentItem::Text(t) => t.id = id,
            ContentItem::Image(i) => i.id = id,
            ContentItem::Testimonial(t) => t.id = id,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            ContentItem::Text(t) => &t.file,
            ContentItem::Image(i) => &i.file,
            ContentItem::Testimonial(t) => &t.file,
        }
    }

    pub fn section(&self) -> &str {
        match self {
            ContentItem::Text(t) => &t.section,
            ContentItem::Image(i) => &i.section,
            ContentItem::Testimonial(t) => &t.section,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ContentItem::Text(_) => "text",
            ContentItem::Image(_) => "image",
            ContentItem::Testimonial(_) => "testimonial",
        }
    }

    /// The editable value, for listings.
    pub fn preview(&self) -> String {
        match self {
            ContentItem::Text(t) => t.text.clone(),
            ContentItem::Image(i) => format!("{} ({})", i.src, i.alt),
            ContentItem::Testimonial(t) => format!("{} - {}", t.quote, t.author),
        }
    }
}

/// Running count per discriminator within one document pass.
#[derive(Debug, Default)]
pub struct OccurrenceCounter {
    counts: HashMap<String, usize>,
}

impl OccurrenceCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more instance of `key` and return its 1-based occurrence.
    pub fn next(&mut self, key: &str) -> usize {
        let n = self.counts.entry(key.to_string()).or_insert(0);
        *n += 1;
        *n
    }
}

/// `file::discriminator` for the first instance, `file::discriminator::n` after.
pub fn content_id(file: &str, discriminator: &str, occurrence: usize) -> String {
    if occurrence > 1 {
        format!("{}::{}::{}", file, discriminator, occurrence)
    } else {
        format!("{}::{}", file, discriminator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_per_key() {
        let mut c = OccurrenceCounter::new();
        assert_eq!(c.next("a"), 1);
        assert_eq!(c.next("b"), 1);
        assert_eq!(c.next("a"), 2);
    }

    #[test]
    fn ids() {
        assert_eq!(content_id("index.html", "hero-title", 1), "index.html::hero-title");
        assert_eq!(content_id("index.html", "hero-title", 3), "index.html::hero-title::3");
    }

    #[test]
    fn serializes_kind_tag() {
        let item = ContentItem::Image(ImageField {
            id: "index.html::/images/a.png".into(),
            file: "index.html".into(),
            section: "Top".into(),
            src: "/images/a.png".into(),
            alt: "A".into(),
            occurrence: 1,
        });
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["kind"], "image");
        assert_eq!(v["src"], "/images/a.png");
    }

    #[test]
    fn testimonial_preview_is_plain_ascii_joined() {
        let item = ContentItem::Testimonial(TestimonialBlock {
            id: "coaching.html::testimonial".into(),
            file: "coaching.html".into(),
            section: "Results".into(),
            badge: String::new(),
            quote: "Stayed healthy all season.".into(),
            author: "Coach Ellis".into(),
            role: String::new(),
            occurrence: 1,
        });
        assert_eq!(item.preview(), "Stayed healthy all season. - Coach Ellis");
    }
}

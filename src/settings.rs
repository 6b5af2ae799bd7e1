use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

/// Runtime settings. Every field has a default so an empty environment
/// still describes the stock marketing site.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the site's HTML documents.
    pub site_root: PathBuf,
    /// Where uploaded images are stored; `src` paths are written relative to
    /// `site_root` as `images/<name>`.
    pub images_dir: PathBuf,
    pub documents: Vec<DocumentSpec>,
    pub rules: ScanRules,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    pub file: String,
    pub page: String,
}

/// The heuristics that separate editable copy from layout markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanRules {
    pub text_tags: Vec<String>,
    pub skip_classes: Vec<String>,
    /// Inclusive character bounds for a text field.
    pub min_text_chars: usize,
    pub max_text_chars: usize,
    /// Texts longer than this are offered as a textarea.
    pub textarea_threshold: usize,
    pub logo_marker: String,
    pub sections: SectionRules,
    pub testimonial: TestimonialRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionRules {
    /// Comments this long (in characters) or longer are prose, not markers.
    pub max_len: usize,
    pub noise: Vec<String>,
    pub default_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestimonialRules {
    pub container: String,
    pub badge: PartMarker,
    pub quote: PartMarker,
    pub author: PartMarker,
    pub role: PartMarker,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartMarker {
    pub tag: String,
    pub class: String,
}

impl PartMarker {
    fn new(tag: &str, class: &str) -> Self {
        PartMarker {
            tag: tag.to_string(),
            class: class.to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        let documents = [
            ("index.html", "Home"),
            ("about.html", "About"),
            ("coaching.html", "Coaching"),
            ("system.html", "System"),
            ("contact.html", "Contact"),
            ("apply.html", "Apply"),
        ]
        .into_iter()
        .map(|(file, page)| DocumentSpec {
            file: file.to_string(),
            page: page.to_string(),
        })
        .collect();

        Settings {
            site_root: PathBuf::from("site"),
            images_dir: PathBuf::from("site/images"),
            documents,
            rules: ScanRules::default(),
        }
    }
}

impl Default for ScanRules {
    fn default() -> Self {
        ScanRules {
            text_tags: strings(&[
                "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "a", "button", "li", "label",
            ]),
            skip_classes: strings(&[
                "nav-menu",
                "nav-container",
                "hero-background",
                "hero-cta-group",
                "trusted-divider-line",
                "mobile-menu-toggle",
                "footer-bottom-links",
            ]),
            min_text_chars: 2,
            max_text_chars: 500,
            textarea_threshold: 80,
            logo_marker: "images/logo".to_string(),
            sections: SectionRules::default(),
            testimonial: TestimonialRules::default(),
        }
    }
}

impl Default for SectionRules {
    fn default() -> Self {
        SectionRules {
            max_len: 50,
            noise: strings(&["Google", "script"]),
            default_name: "Top".to_string(),
        }
    }
}

impl Default for TestimonialRules {
    fn default() -> Self {
        TestimonialRules {
            container: "testimonial-box".to_string(),
            badge: PartMarker::new("span", "testimonial-badge"),
            quote: PartMarker::new("p", "testimonial-text"),
            author: PartMarker::new("p", "testimonial-author"),
            role: PartMarker::new("p", "testimonial-position"),
        }
    }
}

impl ScanRules {
    pub fn is_text_tag(&self, tag: &str) -> bool {
        self.text_tags.iter().any(|t| t == tag)
    }

    pub fn is_skipped_class(&self, class: &str) -> bool {
        self.skip_classes.iter().any(|c| c == class)
    }

    pub fn text_len_ok(&self, text: &str) -> bool {
        let n = text.chars().count();
        n >= self.min_text_chars && n <= self.max_text_chars
    }
}

impl Settings {
    /// Layer an optional config file (explicit path, or `site_content.toml`
    /// in the working directory) under `SITE__*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(p) => File::from(p).required(true),
            None => File::with_name("site_content").required(false),
        };

        let settings: Settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("SITE").separator("__"))
            .build()
            .context("Failed to load configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;

        Ok(settings)
    }

    pub fn page_name(&self, file: &str) -> Option<&str> {
        self.documents
            .iter()
            .find(|d| d.file == file)
            .map(|d| d.page.as_str())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

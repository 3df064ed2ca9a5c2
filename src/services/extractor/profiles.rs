use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;
use url::Url;

static CITATION_MARKERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(?:\d+|[a-z]|edit|citation needed|note \d+)\]")
        .expect("CITATION_MARKERS is a valid regex pattern")
});

/// Site-specific extraction knowledge. The extractor asks the registry for
/// the profile matching a URL instead of branching on domain names.
pub trait SourceProfile: Send + Sync {
    fn name(&self) -> &str;

    fn handles(&self, url: &Url) -> bool;

    /// Tried in order before the generic `h1` / `<title>` / `og:title` chain.
    fn title_selectors(&self) -> &[Selector];

    /// Tried in order; the first element with enough paragraphs wins.
    fn content_root_selectors(&self) -> &[Selector];

    /// Elements whose whole subtree is dropped in addition to the core noise tags.
    fn noise_selectors(&self) -> &[Selector];

    fn min_root_paragraphs(&self) -> usize {
        1
    }

    fn min_paragraph_chars(&self) -> usize {
        1
    }

    fn skips_section(&self, _heading: &str) -> bool {
        false
    }

    fn clean_text(&self, text: &str) -> String {
        text.to_string()
    }
}

fn selectors(patterns: &[&str]) -> Vec<Selector> {
    patterns
        .iter()
        .filter_map(|p| match Selector::parse(p) {
            Ok(selector) => Some(selector),
            Err(e) => {
                log::warn!("Ignoring invalid selector '{}': {:?}", p, e);
                None
            }
        })
        .collect()
}

pub struct GenericProfile {
    title: Vec<Selector>,
    roots: Vec<Selector>,
    noise: Vec<Selector>,
}

impl GenericProfile {
    pub fn new() -> Self {
        Self {
            title: Vec::new(),
            roots: selectors(&[
                "article",
                "main",
                "div[class*='content']",
                "div[class*='article']",
                "div[class*='post']",
                "body",
            ]),
            noise: selectors(&["[aria-hidden='true']", "[role='navigation']", ".advertisement"]),
        }
    }
}

impl Default for GenericProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceProfile for GenericProfile {
    fn name(&self) -> &str {
        "generic"
    }

    fn handles(&self, _url: &Url) -> bool {
        true
    }

    fn title_selectors(&self) -> &[Selector] {
        &self.title
    }

    fn content_root_selectors(&self) -> &[Selector] {
        &self.roots
    }

    fn noise_selectors(&self) -> &[Selector] {
        &self.noise
    }

    fn clean_text(&self, text: &str) -> String {
        CITATION_MARKERS.replace_all(text, "").into_owned()
    }
}

const WIKIPEDIA_SKIPPED_SECTIONS: &[&str] = &[
    "references",
    "external links",
    "see also",
    "notes",
    "further reading",
    "bibliography",
    "sources",
    "citations",
];

pub struct WikipediaProfile {
    title: Vec<Selector>,
    roots: Vec<Selector>,
    noise: Vec<Selector>,
}

impl WikipediaProfile {
    pub fn new() -> Self {
        Self {
            title: selectors(&["h1#firstHeading", "h1.firstHeading"]),
            roots: selectors(&["div.mw-parser-output", "div#mw-content-text"]),
            noise: selectors(&[
                "span.mw-editsection",
                "sup.reference",
                "span.reference",
                "table.infobox",
                "table.navbox",
                "table.vertical-navbox",
                "table.sidebar",
                "div.navbox",
                "div.reflist",
                "div.hatnote",
                "ol.references",
            ]),
        }
    }
}

impl Default for WikipediaProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceProfile for WikipediaProfile {
    fn name(&self) -> &str {
        "wikipedia"
    }

    fn handles(&self, url: &Url) -> bool {
        url.host_str()
            .map(|host| {
                let host = host.to_lowercase();
                host == "wikipedia.org" || host.ends_with(".wikipedia.org")
            })
            .unwrap_or(false)
    }

    fn title_selectors(&self) -> &[Selector] {
        &self.title
    }

    fn content_root_selectors(&self) -> &[Selector] {
        &self.roots
    }

    fn noise_selectors(&self) -> &[Selector] {
        &self.noise
    }

    fn min_root_paragraphs(&self) -> usize {
        3
    }

    fn min_paragraph_chars(&self) -> usize {
        10
    }

    fn skips_section(&self, heading: &str) -> bool {
        let heading = heading.trim().to_lowercase();
        WIKIPEDIA_SKIPPED_SECTIONS.contains(&heading.as_str())
    }

    fn clean_text(&self, text: &str) -> String {
        CITATION_MARKERS.replace_all(text, "").into_owned()
    }
}

/// Ordered profile lookup with a catch-all fallback.
#[derive(Clone)]
pub struct SourceProfiles {
    profiles: Vec<Arc<dyn SourceProfile>>,
    fallback: Arc<dyn SourceProfile>,
}

impl SourceProfiles {
    pub fn new(fallback: Arc<dyn SourceProfile>) -> Self {
        Self {
            profiles: Vec::new(),
            fallback,
        }
    }

    pub fn with_profile(mut self, profile: Arc<dyn SourceProfile>) -> Self {
        self.profiles.push(profile);
        self
    }

    pub fn for_url(&self, url: &Url) -> Arc<dyn SourceProfile> {
        self.profiles
            .iter()
            .find(|p| p.handles(url))
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }
}

impl Default for SourceProfiles {
    fn default() -> Self {
        SourceProfiles::new(Arc::new(GenericProfile::new()))
            .with_profile(Arc::new(WikipediaProfile::new()))
    }
}

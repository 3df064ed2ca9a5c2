use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::{
    errors::ExtractionError,
    models::domain::{
        article::{ArticleSection, INTRODUCTION_HEADING},
        Article,
    },
    services::extractor::profiles::SourceProfile,
};

const UNTITLED: &str = "Untitled Article";

/// Subtrees that never carry article prose, whatever the site.
const CORE_NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "nav", "footer", "aside", "header", "form", "iframe", "svg",
    "button", "template",
];

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("WHITESPACE is a valid regex pattern"));

static BLOCKS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1, h2, h3, h4, p").expect("BLOCKS is a valid selector"));
static PARAGRAPHS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("PARAGRAPHS is a valid selector"));
static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").expect("H1 is a valid selector"));
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("TITLE is a valid selector"));
static OG_TITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("meta[property='og:title']").expect("OG_TITLE is a valid selector")
});

/// Turns a fetched page into an [`Article`]: picks the content root, drops
/// noise subtrees, and splits paragraphs into sections at each heading in
/// document order. Word-count policy is left to the caller.
pub fn parse_article(
    url: &str,
    html: &str,
    profile: &dyn SourceProfile,
) -> Result<Article, ExtractionError> {
    let document = Html::parse_document(html);
    let title = extract_title(&document, profile);

    let root = find_content_root(&document, profile)
        .ok_or_else(|| ExtractionError::empty("could not identify a main content area"))?;

    let mut sections = Vec::new();
    let mut heading = INTRODUCTION_HEADING.to_string();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut skip_level: Option<u8> = None;

    for block in root.select(&BLOCKS) {
        if is_inside_noise(block, root, profile) {
            continue;
        }

        if let Some(level) = heading_level(block) {
            let text = clean_block(block, profile);
            if text.is_empty() || (level == 1 && text.eq_ignore_ascii_case(&title)) {
                continue;
            }

            // Subheadings of a skipped section stay skipped.
            if let Some(skipped) = skip_level {
                if level > skipped {
                    continue;
                }
            }

            flush_section(&mut sections, &heading, &mut paragraphs, skip_level.is_some());
            skip_level = if profile.skips_section(&text) {
                Some(level)
            } else {
                None
            };
            heading = text;
            continue;
        }

        if skip_level.is_some() {
            continue;
        }

        let text = clean_block(block, profile);
        if text.chars().count() >= profile.min_paragraph_chars() && !text.is_empty() {
            paragraphs.push(text);
        }
    }
    flush_section(&mut sections, &heading, &mut paragraphs, skip_level.is_some());

    log::debug!(
        "Parsed {} sections from {} using the {} profile",
        sections.len(),
        url,
        profile.name()
    );

    Ok(Article::new(url, &title, sections))
}

fn flush_section(
    sections: &mut Vec<ArticleSection>,
    heading: &str,
    paragraphs: &mut Vec<String>,
    skipped: bool,
) {
    if !skipped && !paragraphs.is_empty() {
        sections.push(ArticleSection::new(heading, paragraphs));
    }
    paragraphs.clear();
}

fn heading_level(element: ElementRef) -> Option<u8> {
    match element.value().name() {
        "h1" => Some(1),
        "h2" => Some(2),
        "h3" => Some(3),
        "h4" => Some(4),
        _ => None,
    }
}

fn extract_title(document: &Html, profile: &dyn SourceProfile) -> String {
    let from_selectors = profile
        .title_selectors()
        .iter()
        .chain([&*H1, &*TITLE])
        .filter_map(|selector| document.select(selector).next())
        .map(|el| normalize_whitespace(&el.text().collect::<String>()))
        .find(|text| !text.is_empty());

    if let Some(title) = from_selectors {
        return title;
    }

    document
        .select(&OG_TITLE)
        .filter_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

fn find_content_root<'a>(document: &'a Html, profile: &dyn SourceProfile) -> Option<ElementRef<'a>> {
    let mut first_candidate = None;

    for selector in profile.content_root_selectors() {
        for candidate in document.select(selector) {
            if first_candidate.is_none() {
                first_candidate = Some(candidate);
            }
            if candidate.select(&PARAGRAPHS).count() >= profile.min_root_paragraphs() {
                return Some(candidate);
            }
        }
    }

    first_candidate.or_else(|| Some(document.root_element()))
}

fn is_noise(element: ElementRef, profile: &dyn SourceProfile) -> bool {
    CORE_NOISE_TAGS.contains(&element.value().name())
        || profile
            .noise_selectors()
            .iter()
            .any(|selector| selector.matches(&element))
}

fn is_inside_noise(element: ElementRef, root: ElementRef, profile: &dyn SourceProfile) -> bool {
    if is_noise(element, profile) {
        return true;
    }

    for ancestor in element.ancestors() {
        if ancestor.id() == root.id() {
            return false;
        }
        if let Some(ancestor) = ElementRef::wrap(ancestor) {
            if is_noise(ancestor, profile) {
                return true;
            }
        }
    }

    false
}

fn clean_block(element: ElementRef, profile: &dyn SourceProfile) -> String {
    let mut raw = String::new();
    collect_text(element, profile, &mut raw);
    normalize_whitespace(&profile.clean_text(&raw))
}

fn collect_text(element: ElementRef, profile: &dyn SourceProfile, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    if !is_noise(child, profile) {
                        collect_text(child, profile, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extractor::profiles::{GenericProfile, WikipediaProfile};

    #[test]
    fn generic_page_is_split_into_sections_in_document_order() {
        let html = r#"
            <html><head><title>Tab Title</title><script>var x = 1;</script></head>
            <body>
              <nav><p>Home | About | Contact links here</p></nav>
              <article>
                <h1>Rivers of Europe</h1>
                <p>The Danube flows through ten countries.</p>
                <h2>Sources</h2>
                <p>It rises in the Black Forest.<script>track()</script></p>
                <aside><p>Sponsored content that should vanish.</p></aside>
                <h2>Mouth</h2>
                <p>It ends in the Black Sea.</p>
              </article>
              <footer><p>Copyright notice</p></footer>
            </body></html>
        "#;

        let article = parse_article("https://example.com/rivers", html, &GenericProfile::new())
            .expect("page should parse");

        assert_eq!(article.title, "Rivers of Europe");
        let headings: Vec<&str> = article.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Introduction", "Sources", "Mouth"]);
        assert_eq!(article.sections[1].content, "It rises in the Black Forest.");
        assert!(!article.full_text.contains("Sponsored"));
        assert!(!article.full_text.contains("Copyright"));
        assert!(!article.full_text.contains("track()"));
    }

    #[test]
    fn wikipedia_profile_drops_references_and_citation_markers() {
        let html = r#"
            <html><body>
              <h1 id="firstHeading">Alan Turing</h1>
              <div class="mw-parser-output">
                <table class="infobox"><tr><td><p>Born 23 June 1912 infobox text</p></td></tr></table>
                <p>Alan Turing was an English mathematician.<sup class="reference">[1]</sup></p>
                <p>He is widely considered the father of computer science.[2]</p>
                <div class="mw-heading"><h2>Early life<span class="mw-editsection">[edit]</span></h2></div>
                <p>Turing was born in Maida Vale, London.</p>
                <h2>References</h2>
                <p>Hodges, Andrew (1983). Alan Turing: The Enigma.</p>
                <h3>Citations</h3>
                <p>Another citation entry that should be skipped.</p>
              </div>
            </body></html>
        "#;

        let article = parse_article(
            "https://en.wikipedia.org/wiki/Alan_Turing",
            html,
            &WikipediaProfile::new(),
        )
        .expect("page should parse");

        assert_eq!(article.title, "Alan Turing");
        let headings: Vec<&str> = article.sections.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, vec!["Introduction", "Early life"]);
        assert!(!article.full_text.contains("[1]"));
        assert!(!article.full_text.contains("[2]"));
        assert!(!article.full_text.contains("infobox"));
        assert!(!article.full_text.contains("Hodges"));
        assert!(!article.full_text.contains("citation entry"));
    }

    #[test]
    fn title_falls_back_to_og_title_then_placeholder() {
        let with_og = r#"<html><head><meta property="og:title" content="Open Graph Title"></head>
            <body><p>Body text.</p></body></html>"#;
        let article = parse_article("https://example.com", with_og, &GenericProfile::new())
            .expect("page should parse");
        assert_eq!(article.title, "Open Graph Title");

        let bare = "<html><body><p>Body text.</p></body></html>";
        let article = parse_article("https://example.com", bare, &GenericProfile::new())
            .expect("page should parse");
        assert_eq!(article.title, "Untitled Article");
    }

    #[test]
    fn page_without_paragraphs_yields_zero_words() {
        let html = "<html><body><div>Just a div</div></body></html>";
        let article = parse_article("https://example.com", html, &GenericProfile::new())
            .expect("page should parse");
        assert_eq!(article.word_count, 0);
        assert!(article.sections.is_empty());
    }
}

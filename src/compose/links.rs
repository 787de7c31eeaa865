//! Anchor extraction
//!
//! Listings are consumed by pattern-matching on `href` values, not by any
//! deeper HTML semantics.

use regex::Regex;
use scraper::{ElementRef, Html};

fn anchors<'a>(document: &'a Html) -> impl Iterator<Item = &'a str> + 'a {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "a")
        .filter_map(|el| el.value().attr("href"))
}

/// All anchor hrefs in document order
pub fn extract_links(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let links = anchors(&document).map(str::to_string).collect();
    links
}

/// Anchor hrefs containing a match for `pattern`, in document order
pub fn extract_links_matching(html: &str, pattern: &Regex) -> Vec<String> {
    let document = Html::parse_document(html);
    let links = anchors(&document)
        .filter(|href| pattern.is_match(href))
        .map(str::to_string)
        .collect();
    links
}

/// First anchor href containing a match for `pattern`
pub fn find_first_link(html: &str, pattern: &Regex) -> Option<String> {
    let document = Html::parse_document(html);
    let found = anchors(&document)
        .find(|href| pattern.is_match(href))
        .map(str::to_string);
    found
}

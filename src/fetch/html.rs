// src/fetch/html.rs
// =============================================================================
// This module extracts the two things a crawl needs from an HTML page:
//
// 1. A word histogram built from the visible text
// 2. The outbound links that stay on the crawled site
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Words are maximal runs of alphabetic characters, lowercased. Text inside
// <script>, <style>, <noscript> and <template> is ignored. A word is counted
// only if its length (in characters) passes the LengthFilter.
// =============================================================================

use std::sync::LazyLock;

use scraper::{Html, Node, Selector};
use url::Url;

use super::{Histogram, HostScope};
use crate::config::LengthFilter;

// Elements whose text content is not page prose
const SKIPPED_ELEMENTS: [&str; 4] = ["script", "style", "noscript", "template"];

// The selector is a constant and known to be valid
static LINK_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid link selector"));

// Parses a page and returns (word histogram, in-scope links)
//
// Parameters:
//   html: the HTML content to parse
//   page_url: the URL the page was fetched from (for resolving relative links)
//   lengths: which word lengths to count
//   scope: which hosts count as "the same site"
//
// Links keep their document order and may contain duplicates.
pub fn extract_page(
    html: &str,
    page_url: &Url,
    lengths: &LengthFilter,
    scope: &HostScope,
) -> (Histogram, Vec<String>) {
    let document = Html::parse_document(html);
    let histogram = extract_words(&document, lengths);
    let links = extract_links(&document, page_url, scope);
    (histogram, links)
}

fn extract_words(document: &Html, lengths: &LengthFilter) -> Histogram {
    let mut histogram = Histogram::new();

    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
            Node::Element(element) => SKIPPED_ELEMENTS.contains(&element.name()),
            _ => false,
        });
        if !hidden {
            count_words(text, lengths, &mut histogram);
        }
    }

    histogram
}

// Adds every accepted word of `text` to the histogram
fn count_words(text: &str, lengths: &LengthFilter, histogram: &mut Histogram) {
    for word in text.split(|c: char| !c.is_alphabetic()) {
        if word.is_empty() || !lengths.accepts(word.chars().count()) {
            continue;
        }
        *histogram.entry(word.to_lowercase()).or_insert(0) += 1;
    }
}

fn extract_links(document: &Html, page_url: &Url, scope: &HostScope) -> Vec<String> {
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(mut url) = resolve_url(page_url, href.trim()) else {
            continue;
        };
        if !is_crawlable(&url) || !scope.in_scope(&url) {
            continue;
        }
        // /page and /page#section are the same page
        url.set_fragment(None);
        links.push(url.to_string());
    }

    links
}

// Resolves a possibly-relative href against the page URL
//
// Examples (base = "https://example.com/page/"):
//   "/docs"              -> Some("https://example.com/docs")
//   "../other"           -> Some("https://example.com/other")
//   "#top"               -> None (same page)
//   "mailto:a@b.com"     -> None
fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    // join() handles both absolute and relative hrefs
    base.join(href).ok()
}

fn is_crawlable(url: &Url) -> bool {
    url.scheme() == "http" || url.scheme() == "https"
}

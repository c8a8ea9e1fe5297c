// src/links/html.rs
// =============================================================================
// This module extracts the crawlable links from an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// For every <a href> on the page:
// 1. Skip it unless it is in scope (relative, or http(s) on the same host)
// 2. Resolve it against the document base and drop the fragment
// 3. Add it to a set, so repeated links on one page collapse
//
// The result is a BTreeSet: iterating it yields links in sorted order, which
// is the order the worker offers them to the frontier.
// =============================================================================

use std::collections::BTreeSet;

use scraper::{Html, Selector};
use url::Url;

use super::resolve::{document_base, is_in_scope, resolve_against};

// Extracts the set of in-scope, canonical links on a page
//
// Parameters:
//   page_url: the URL the page was fetched from
//   html: the page body
//
// Returns: sorted, deduplicated absolute URLs without fragments
//
// Example:
//   page_url = "https://example.com/foo/bar.html"
//   html = "<a href='baz.html'></a><a href='mailto:x@example.com'></a>"
//   result = {"https://example.com/foo/baz.html"}
pub fn extract_links(page_url: &Url, html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);

    // Constant selector, known to be valid
    let selector = Selector::parse("a[href]").unwrap();

    // Every link on the page shares one base, look it up once
    let base = document_base(page_url, &document);

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| is_in_scope(page_url, href))
        .filter_map(|href| resolve_against(&base, href))
        .collect()
}

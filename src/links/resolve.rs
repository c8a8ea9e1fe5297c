// src/links/resolve.rs
// =============================================================================
// This module turns the raw href of an anchor into a canonical URL.
//
// Canonical means:
// - absolute (resolved against the page, or against its <base href>)
// - no fragment (#section is dropped, it names the same page)
//
// It also decides whether an href is in scope for the crawl:
// - the scheme must be empty (relative), http or https
// - the host must be empty (relative) or the same as the page's host,
//   with the same port and userinfo
//
// No other normalization is done. Two URLs are the same page exactly when
// their canonical strings are equal.
// =============================================================================

use log::debug;
use scraper::{Html, Selector};
use url::{ParseError, Url};

use crate::error::{CrawlError, Result};

// Parses the crawl's root URL into its canonical form
//
// The root goes through the same fragment stripping as discovered links, so
// a link back to the root page dedups against the seed.
pub fn canonicalize_root(root_url: &str) -> Result<Url> {
    let mut url = Url::parse(root_url.trim()).map_err(|source| CrawlError::InvalidRootUrl {
        url: root_url.to_string(),
        source,
    })?;

    if !is_web_scheme(url.scheme()) || url.host_str().is_none() {
        return Err(CrawlError::UnsupportedRootUrl(root_url.to_string()));
    }

    url.set_fragment(None);
    Ok(url)
}

// Finds the URL relative links on this document resolve against
//
// The first <base href> wins. A relative base href is itself resolved
// against the page URL; an unusable one falls back to the page URL.
pub fn document_base(page_url: &Url, document: &Html) -> Url {
    // Constant selector, known to be valid
    let selector = Selector::parse("base[href]").unwrap();

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href.trim()).ok())
        .unwrap_or_else(|| page_url.clone())
}

// Resolves an href found on `document` (fetched from `page_url`)
//
// Returns: Some(canonical_url), or None if the href cannot be resolved
pub fn resolve_link(page_url: &Url, document: &Html, href: &str) -> Option<String> {
    let base = document_base(page_url, document);
    resolve_against(&base, href)
}

// Resolves an href against an already-chosen base and strips the fragment
pub fn resolve_against(base: &Url, href: &str) -> Option<String> {
    match base.join(href) {
        Ok(mut url) => {
            url.set_fragment(None);
            Some(url.into())
        }
        Err(e) => {
            debug!("Skipping unresolvable href '{}': {}", href, e);
            None
        }
    }
}

// Checks whether an href points inside the site being crawled
//
// The check looks at the href as written, before resolution:
//   "foo.html", "/a/b", "#top"      -> in scope (no scheme, no host)
//   "https://same.host/x"           -> in scope
//   "//other.host/x"                -> out of scope (host differs)
//   "mailto:me@same.host"           -> out of scope (not a web scheme)
//   "http://user@same.host/x"       -> out of scope (userinfo differs)
//   "http://[::1"                   -> out of scope (malformed)
pub fn is_in_scope(page_url: &Url, href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => is_web_scheme(url.scheme()) && same_site(page_url, &url),
        Err(ParseError::RelativeUrlWithoutBase) => {
            if is_scheme_relative(href) {
                // A network-path reference carries its own host
                page_url
                    .join(href)
                    .map(|url| same_site(page_url, &url))
                    .unwrap_or(false)
            } else {
                true
            }
        }
        Err(e) => {
            debug!("Skipping malformed href '{}': {}", href, e);
            false
        }
    }
}

fn is_web_scheme(scheme: &str) -> bool {
    scheme == "http" || scheme == "https"
}

// Host, port and userinfo must all match the page, as written in its authority
fn same_site(page_url: &Url, url: &Url) -> bool {
    url.host_str() == page_url.host_str()
        && url.port() == page_url.port()
        && url.username() == page_url.username()
        && url.password() == page_url.password()
}

fn is_scheme_relative(href: &str) -> bool {
    let mut chars = href.trim_start().chars();
    let is_slash = |c: Option<char>| matches!(c, Some('/') | Some('\\'));
    is_slash(chars.next()) && is_slash(chars.next())
}

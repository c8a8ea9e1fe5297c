// src/links/mod.rs
// =============================================================================
// Link extraction and URL resolution.
//
// Submodules:
// - html: finds the in-scope anchors on a fetched page
// - resolve: scope rules, <base href> handling, canonical URL form
// =============================================================================

mod html;
mod resolve;

pub use html::extract_links;
pub use resolve::{canonicalize_root, document_base, is_in_scope, resolve_against, resolve_link};

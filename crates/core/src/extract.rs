//! The content-extraction engine.
//!
//! [`extract_page`] takes a raw HTML document plus the page's own URL and
//! produces a [`PageExtract`]: every image the page references (resolved to
//! absolute URLs, deduplicated, in discovery order), the page title and
//! description, and a cleaned plain-text excerpt. The result is what the
//! rest of the system displays, captions, and publishes.
//!
//! # Example
//!
//! ```rust
//! use postprep_core::extract_page;
//!
//! let html = r#"<html><head><title>Post</title></head>
//! <body><img src="../img/a.png"></body></html>"#;
//!
//! let page = extract_page(html, "https://example.com/blog/post").unwrap();
//! assert_eq!(page.title, "Post");
//! assert_eq!(page.images, vec!["https://example.com/img/a.png"]);
//! ```

use std::collections::HashSet;

use regex::Regex;
use scraper::Html;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{PostprepError, Result, metadata, patterns};

/// Hard cap on the extracted plain-text excerpt, in characters.
pub const MAX_CONTENT_LEN: usize = 2000;

/// Structured result of extracting one page.
///
/// Constructed fresh on every [`extract_page`] call and immutable once
/// returned. Serializes to the wire shape consumed by the caption endpoint
/// and the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageExtract {
    /// Absolute image URLs, unique, in discovery order (first occurrence wins).
    pub images: Vec<String>,
    /// Page title; falls back to a placeholder, never empty.
    pub title: String,
    /// Page description; may be empty.
    pub description: String,
    /// Cleaned plain-text excerpt, at most [`MAX_CONTENT_LEN`] characters.
    pub content: String,
    /// The caller-supplied page URL, echoed through unchanged.
    pub url: String,
}

/// Extract images, title, description, and text content from an HTML document.
///
/// `base_url` is the URL the document was fetched from; every discovered image
/// reference is resolved against it. The only error condition is a `base_url`
/// that is not a valid absolute URL. Malformed fragments *inside* the
/// document are tolerated and skipped, so the scan always runs to completion.
pub fn extract_page(html: &str, base_url: &str) -> Result<PageExtract> {
    let base = Url::parse(base_url).map_err(|e| PostprepError::InvalidUrl(format!("{base_url}: {e}")))?;

    let mut images = ImageSet::default();

    // Discovery rules run in a fixed order; that order is what determines
    // the final iteration order of the image list.
    collect_single(&mut images, &base, &patterns::META_IMAGE, html, 2);
    collect_single(&mut images, &base, &patterns::IMG_SRC, html, 1);
    collect_srcset(&mut images, &base, &patterns::IMG_SRCSET, html);
    collect_single(&mut images, &base, &patterns::SOURCE_SRC, html, 1);
    collect_srcset(&mut images, &base, &patterns::SOURCE_SRCSET, html);
    collect_single(&mut images, &base, &patterns::IMG_DATA_SRC, html, 1);
    collect_srcset(&mut images, &base, &patterns::IMG_DATA_SRCSET, html);
    collect_single(&mut images, &base, &patterns::CSS_BACKGROUND_IMAGE, html, 1);
    collect_single(&mut images, &base, &patterns::CSS_BACKGROUND, html, 1);
    collect_single(&mut images, &base, &patterns::LINK_IMAGE_HREF, html, 1);

    let doc = Html::parse_document(html);

    Ok(PageExtract {
        images: images.into_vec(),
        title: metadata::extract_title(&doc),
        description: metadata::extract_description(&doc),
        content: clean_content(html),
        url: base_url.to_string(),
    })
}

/// Insertion-ordered set of resolved image URLs.
#[derive(Default)]
struct ImageSet {
    seen: HashSet<String>,
    urls: Vec<String>,
}

impl ImageSet {
    fn insert(&mut self, url: String) {
        if self.seen.insert(url.clone()) {
            self.urls.push(url);
        }
    }

    fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

/// Resolve one candidate against the base URL.
///
/// Candidates containing interior whitespace are rejected up front; the
/// WHATWG parser would otherwise percent-encode them into junk entries.
/// Resolution failures are skipped rather than propagated.
fn resolve(base: &Url, candidate: &str) -> Option<String> {
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.chars().any(char::is_whitespace) {
        return None;
    }
    base.join(candidate).ok().map(|u| u.to_string())
}

/// Run a single-URL rule: each match contributes the given capture group.
fn collect_single(images: &mut ImageSet, base: &Url, rule: &Regex, html: &str, group: usize) {
    for caps in rule.captures_iter(html) {
        if let Some(m) = caps.get(group)
            && let Some(url) = resolve(base, m.as_str())
        {
            images.insert(url);
        }
    }
}

/// Run a srcset rule: the captured value is split on commas and each
/// candidate's URL portion (everything before the first whitespace, so
/// `1x`/`480w` descriptors fall away) is contributed.
fn collect_srcset(images: &mut ImageSet, base: &Url, rule: &Regex, html: &str) {
    for caps in rule.captures_iter(html) {
        let Some(m) = caps.get(1) else { continue };
        for candidate in m.as_str().split(',') {
            if let Some(first) = candidate.split_whitespace().next()
                && let Some(url) = resolve(base, first)
            {
                images.insert(url);
            }
        }
    }
}

/// Strip scripts, styles, and tags, collapse whitespace, and cut to the cap.
fn clean_content(html: &str) -> String {
    let text = patterns::SCRIPT_BLOCK.replace_all(html, "");
    let text = patterns::STYLE_BLOCK.replace_all(&text, "");
    let text = patterns::HTML_TAG.replace_all(&text, " ");
    let text = patterns::WHITESPACE_RUN.replace_all(&text, " ");
    truncate_chars(text.trim(), MAX_CONTENT_LEN)
}

/// Hard character cut, not word-aware. The cut lands on a char boundary so
/// multi-byte text can never split a scalar value.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.com/blog/post";

    #[test]
    fn test_invalid_base_url_is_fatal() {
        let result = extract_page("<html></html>", "not a url");
        assert!(matches!(result, Err(PostprepError::InvalidUrl(_))));
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let html = r#"
            <html><head><title>T</title><meta property="og:image" content="/a.png"></head>
            <body><img src="b.png"><p>Some text</p></body></html>
        "#;
        let first = extract_page(html, BASE).unwrap();
        let second = extract_page(html, BASE).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_meta_images_discovered_first() {
        let html = r#"
            <html><head><meta property="og:image" content="https://cdn.example.com/og.png"></head>
            <body><img src="/inline.png"></body></html>
        "#;
        let page = extract_page(html, BASE).unwrap();
        assert_eq!(
            page.images,
            vec!["https://cdn.example.com/og.png", "https://example.com/inline.png"]
        );
    }

    #[rstest::rstest]
    #[case("../img/a.png", "https://example.com/img/a.png")]
    #[case("/img/a.png", "https://example.com/img/a.png")]
    #[case("img/a.png", "https://example.com/blog/img/a.png")]
    #[case("//cdn.example.net/pic.jpg", "https://cdn.example.net/pic.jpg")]
    #[case("?size=large", "https://example.com/blog/post?size=large")]
    fn test_url_resolution_forms(#[case] reference: &str, #[case] resolved: &str) {
        let html = format!(r#"<img src="{reference}">"#);
        let page = extract_page(&html, BASE).unwrap();
        assert_eq!(page.images, vec![resolved.to_string()]);
    }

    #[test]
    fn test_duplicate_references_collapse() {
        // Same image via relative <img> path and absolute CSS url().
        let html = r#"
            <img src="/img/hero.png">
            <div style="background-image: url('https://example.com/img/hero.png')"></div>
        "#;
        let page = extract_page(html, BASE).unwrap();
        assert_eq!(page.images, vec!["https://example.com/img/hero.png"]);
    }

    #[test]
    fn test_srcset_candidates_lose_descriptors() {
        let html = r#"<img srcset="a.jpg 1x, b.jpg 2x">"#;
        let page = extract_page(html, "https://x.com/").unwrap();
        assert_eq!(page.images, vec!["https://x.com/a.jpg", "https://x.com/b.jpg"]);
        assert!(page.images.iter().all(|u| !u.contains("1x") && !u.contains("2x")));
    }

    #[test]
    fn test_source_elements_and_lazy_attributes() {
        let html = r#"
            <picture>
                <source srcset="/large.webp 1200w, /small.webp 400w">
                <source src="/fallback.jpg">
            </picture>
            <img data-src="/lazy.png" data-srcset="/lazy-2x.png 2x">
        "#;
        let page = extract_page(html, "https://x.com/").unwrap();
        // The unanchored src/srcset scans pick up the data-* attributes of the
        // img element first (rules 2 and 3), ahead of the <source> rules.
        assert_eq!(
            page.images,
            vec![
                "https://x.com/lazy.png",
                "https://x.com/lazy-2x.png",
                "https://x.com/fallback.jpg",
                "https://x.com/large.webp",
                "https://x.com/small.webp",
            ]
        );
    }

    #[test]
    fn test_css_and_link_rules() {
        let html = r#"
            <style>.hero { background: url(/banner.gif); }</style>
            <link rel="apple-touch-icon" href="/touch.png">
            <link rel="stylesheet" href="/app.css">
        "#;
        let page = extract_page(html, "https://x.com/").unwrap();
        assert_eq!(page.images, vec!["https://x.com/banner.gif", "https://x.com/touch.png"]);
    }

    #[test]
    fn test_malformed_candidate_skipped() {
        let html = r#"
            <img src="not a url but spaces">
            <img src="/fine.png">
        "#;
        let page = extract_page(html, BASE).unwrap();
        assert_eq!(page.images, vec!["https://example.com/fine.png"]);
    }

    #[test]
    fn test_tag_stripping_and_whitespace_collapse() {
        let html = "<script>alert(1)</script><p>Hello <b>World</b></p>";
        let page = extract_page(html, BASE).unwrap();
        assert_eq!(page.content, "Hello World");
    }

    #[test]
    fn test_style_content_removed() {
        let html = "<style>body { color: red; }</style><p>Visible</p>";
        let page = extract_page(html, BASE).unwrap();
        assert_eq!(page.content, "Visible");
    }

    #[test]
    fn test_content_truncated_at_cap() {
        let body = "word ".repeat(1000);
        let html = format!("<p>{}</p>", body);
        let page = extract_page(&html, BASE).unwrap();
        assert_eq!(page.content.chars().count(), MAX_CONTENT_LEN);
    }

    #[test]
    fn test_short_content_untouched() {
        let page = extract_page("<p>short text</p>", BASE).unwrap();
        assert_eq!(page.content, "short text");
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let body = "é".repeat(MAX_CONTENT_LEN + 50);
        let html = format!("<p>{}</p>", body);
        let page = extract_page(&html, BASE).unwrap();
        assert_eq!(page.content.chars().count(), MAX_CONTENT_LEN);
    }

    #[test]
    fn test_title_placeholder() {
        let page = extract_page("<html><body><p>no metadata</p></body></html>", BASE).unwrap();
        assert_eq!(page.title, "Untitled");
    }

    #[test]
    fn test_url_echoed_through() {
        let page = extract_page("<html></html>", BASE).unwrap();
        assert_eq!(page.url, BASE);
    }

    #[test]
    fn test_result_serializes_to_wire_shape() {
        let html = r#"<html><head><title>T</title></head><body><img src="/a.png"></body></html>"#;
        let page = extract_page(html, BASE).unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("images").is_some());
        assert!(json.get("title").is_some());
        assert!(json.get("description").is_some());
        assert!(json.get("content").is_some());
        assert!(json.get("url").is_some());
    }
}

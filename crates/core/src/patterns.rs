//! Compiled regex patterns for image discovery and text cleaning.
//!
//! All patterns are compiled once at startup using `LazyLock`. The image
//! patterns scan raw markup rather than a parsed tree: several of them
//! (CSS `url(...)` declarations in particular) target text that never
//! becomes an element attribute, so a uniform text scan keeps all ten
//! discovery rules on the same footing.

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Image discovery
// =============================================================================

/// Rule 1: `og:image` / `twitter:image` meta tags. The image URL is in
/// capture group 2; group 1 holds which property matched.
pub static META_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<meta[^>]+(?:property|name)\s*=\s*['"](og:image|twitter:image)['"][^>]*content\s*=\s*['"]([^'"]+)['"]"#,
    )
    .expect("META_IMAGE regex")
});

/// Rule 2: `<img src>`. Also matches `data-src=` (the scan is not anchored to
/// an attribute boundary); the unique set absorbs the overlap with rule 6.
pub static IMG_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]+src\s*=\s*['"]([^'"]+)['"]"#).expect("IMG_SRC regex"));

/// Rule 3: `<img srcset>`. The captured value is a comma-separated candidate
/// list; each candidate's width/density descriptor is dropped by the caller.
pub static IMG_SRCSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]+srcset\s*=\s*['"]([^'"]+)['"]"#).expect("IMG_SRCSET regex"));

/// Rule 4: `<source src>` inside responsive `<picture>` markup.
pub static SOURCE_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<source[^>]+src\s*=\s*['"]([^'"]+)['"]"#).expect("SOURCE_SRC regex"));

/// Rule 5: `<source srcset>`.
pub static SOURCE_SRCSET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<source[^>]+srcset\s*=\s*['"]([^'"]+)['"]"#).expect("SOURCE_SRCSET regex"));

/// Rule 6: lazy-loading `data-src` on image elements.
pub static IMG_DATA_SRC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<img[^>]+data-src\s*=\s*['"]([^'"]+)['"]"#).expect("IMG_DATA_SRC regex"));

/// Rule 7: lazy-loading `data-srcset` on image elements.
pub static IMG_DATA_SRCSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img[^>]+data-srcset\s*=\s*['"]([^'"]+)['"]"#).expect("IMG_DATA_SRCSET regex")
});

/// Rule 8: CSS `background-image: url(...)`, inline styles and `<style>`
/// blocks alike.
pub static CSS_BACKGROUND_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background-image\s*:\s*url\((?:'|")?([^)'"]+)(?:'|")?\)"#).expect("CSS_BACKGROUND_IMAGE regex")
});

/// Rule 9: CSS shorthand `background: url(...)`.
pub static CSS_BACKGROUND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)background\s*:\s*url\((?:'|")?([^)'"]+)(?:'|")?\)"#).expect("CSS_BACKGROUND regex")
});

/// Rule 10: `<link>` elements whose `href` ends in a known image extension.
pub static LINK_IMAGE_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link[^>]+href\s*=\s*['"]([^'"]+\.(?:png|jpe?g|gif|svg))['"][^>]*>"#)
        .expect("LINK_IMAGE_HREF regex")
});

// =============================================================================
// Text cleaning
// =============================================================================

/// `<script>` elements with their entire content.
pub static SCRIPT_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").expect("SCRIPT_BLOCK regex"));

/// `<style>` elements with their entire content.
pub static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").expect("STYLE_BLOCK regex"));

/// Any remaining tag. Replaced with a space so adjacent text does not fuse.
pub static HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("HTML_TAG regex"));

/// Whitespace runs, newlines included.
pub static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("WHITESPACE_RUN regex"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_image_captures_url() {
        let html = r#"<meta property="og:image" content="https://example.com/a.png">"#;
        let caps = META_IMAGE.captures(html).unwrap();
        assert_eq!(&caps[2], "https://example.com/a.png");
    }

    #[test]
    fn test_meta_image_matches_name_attribute() {
        let html = r#"<meta name="twitter:image" content="/card.jpg">"#;
        let caps = META_IMAGE.captures(html).unwrap();
        assert_eq!(&caps[1], "twitter:image");
        assert_eq!(&caps[2], "/card.jpg");
    }

    #[test]
    fn test_img_src_ignores_srcset_attribute() {
        let html = r#"<img srcset="a.jpg 1x, b.jpg 2x">"#;
        assert!(IMG_SRC.captures(html).is_none());
    }

    #[test]
    fn test_background_image_unquoted_url() {
        let html = r#"<div style="background-image: url(/hero.jpg)">"#;
        let caps = CSS_BACKGROUND_IMAGE.captures(html).unwrap();
        assert_eq!(&caps[1], "/hero.jpg");
    }

    #[test]
    fn test_link_href_requires_image_extension() {
        assert!(LINK_IMAGE_HREF.captures(r#"<link rel="stylesheet" href="/app.css">"#).is_none());
        let caps = LINK_IMAGE_HREF
            .captures(r#"<link rel="icon" href="/favicon.png">"#)
            .unwrap();
        assert_eq!(&caps[1], "/favicon.png");
    }

    #[test]
    fn test_script_block_spans_newlines() {
        let html = "<script>\nvar x = 1;\n</script>rest";
        assert_eq!(SCRIPT_BLOCK.replace_all(html, ""), "rest");
    }
}

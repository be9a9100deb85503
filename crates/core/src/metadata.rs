//! Title and description extraction from parsed documents.
//!
//! Both values follow a priority fallback over standard metadata
//! conventions, preferring Open Graph tags over their plain HTML
//! equivalents.

use scraper::{Html, Selector};

/// Placeholder title used when a page declares none.
pub const UNTITLED: &str = "Untitled";

/// Extract the page title with priority fallback:
/// 1. Open Graph `og:title`
/// 2. `<title>` element
/// 3. [`UNTITLED`] placeholder
///
/// The result is always trimmed and never empty.
pub fn extract_title(doc: &Html) -> String {
    if let Some(title) = meta_content(doc, "og:title") {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }

    if let Some(title) = title_element(doc) {
        let title = title.trim();
        if !title.is_empty() {
            return title.to_string();
        }
    }

    UNTITLED.to_string()
}

/// Extract the page description with priority fallback:
/// 1. Open Graph `og:description`
/// 2. Meta `description`
/// 3. Empty string
pub fn extract_description(doc: &Html) -> String {
    if let Some(desc) = meta_content(doc, "og:description") {
        let desc = desc.trim();
        if !desc.is_empty() {
            return desc.to_string();
        }
    }

    if let Some(desc) = meta_content(doc, "description") {
        return desc.trim().to_string();
    }

    String::new()
}

/// Get meta tag content by property or name attribute.
fn meta_content(doc: &Html, attr: &str) -> Option<String> {
    let selector = format!("meta[property=\"{}\"]", attr);
    if let Ok(sel) = Selector::parse(&selector)
        && let Some(el) = doc.select(&sel).next()
        && let Some(content) = el.value().attr("content")
    {
        return Some(content.to_string());
    }

    let selector = format!("meta[name=\"{}\"]", attr);
    if let Ok(sel) = Selector::parse(&selector)
        && let Some(el) = doc.select(&sel).next()
        && let Some(content) = el.value().attr("content")
    {
        return Some(content.to_string());
    }

    None
}

fn title_element(doc: &Html) -> Option<String> {
    let sel = Selector::parse("title").ok()?;
    doc.select(&sel).next().map(|el| el.text().collect::<String>())
}

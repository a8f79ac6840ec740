//! Link extraction
//!
//! Turns fetched page content into the set of absolute, navigable URLs the
//! page links to. Extraction is best-effort: broken markup and unparseable
//! `href` values simply contribute no links.

use crate::crawler::fetcher::PageContent;
use crate::url::resolve;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Elements whose `href` attribute counts as an outbound link
pub const LINK_SELECTOR: &str = "a[href], link[href]";

/// Extracts outbound links from fetched content
///
/// # Arguments
///
/// * `content` - What the fetch strategy produced
/// * `base_url` - The URL of the page (after redirects)
///
/// # Returns
///
/// The distinct absolute URLs found on the page
pub fn extract_links(content: &PageContent, base_url: &Url) -> BTreeSet<String> {
    match content {
        PageContent::Html(html) => extract_links_from_html(html, base_url),
        PageContent::Rendered(hrefs) => extract_links_from_hrefs(hrefs, base_url),
        PageContent::Empty => BTreeSet::new(),
    }
}

/// Extracts links from `<a>` and `<link>` tags in raw HTML
///
/// # Example
///
/// ```
/// use link_ripple::crawler::extract_links_from_html;
/// use url::Url;
///
/// let html = r#"<a href="/one">1</a><a href="/one">again</a><a href="mailto:x@y.z">mail</a>"#;
/// let base = Url::parse("https://example.com/").unwrap();
/// let links = extract_links_from_html(html, &base);
/// assert_eq!(links.len(), 1);
/// assert!(links.contains("https://example.com/one"));
/// ```
pub fn extract_links_from_html(html: &str, base_url: &Url) -> BTreeSet<String> {
    let document = Html::parse_document(html);

    let selector = match Selector::parse(LINK_SELECTOR) {
        Ok(selector) => selector,
        Err(_) => return BTreeSet::new(),
    };

    let hrefs = document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"));

    resolve_all(hrefs, base_url)
}

/// Filters `href` values gathered from a rendered page
///
/// The browser has already resolved them, but they still pass through the
/// resolver so scheme filtering and de-duplication match the HTML path.
pub fn extract_links_from_hrefs(hrefs: &[String], base_url: &Url) -> BTreeSet<String> {
    resolve_all(hrefs.iter().map(String::as_str), base_url)
}

fn resolve_all<'a>(hrefs: impl Iterator<Item = &'a str>, base_url: &Url) -> BTreeSet<String> {
    let mut links = BTreeSet::new();

    for href in hrefs {
        match resolve(base_url, href) {
            Ok(Some(url)) => {
                links.insert(url.to_string());
            }
            Ok(None) => {}
            Err(e) => tracing::trace!("Skipping unparseable href {:?}: {}", href, e),
        }
    }

    links
}

use super::{NAVIGABLE_SCHEMES, SKIPPED_PREFIXES};
use url::{ParseError, Url};

/// Resolves a link reference against the page it was found on
///
/// # Resolution Rules
///
/// 1. Empty references, fragment-only references (`#top`) and the
///    `javascript:`, `mailto:`, `tel:` and `data:` schemes are not navigable
/// 2. Everything else is joined onto `base` (relative, protocol-relative and
///    absolute references are all accepted)
/// 3. Only `http` and `https` results are navigable
///
/// # Arguments
///
/// * `base` - The URL of the page the reference appeared on
/// * `reference` - The raw `href` attribute value
///
/// # Returns
///
/// * `Ok(Some(Url))` - An absolute URL worth fetching
/// * `Ok(None)` - The reference is well-formed but not navigable
/// * `Err(ParseError)` - The reference is not a valid URI reference
///
/// # Examples
///
/// ```
/// use link_ripple::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/intro").unwrap();
/// let url = resolve(&base, "../about").unwrap().unwrap();
/// assert_eq!(url.as_str(), "https://example.com/about");
///
/// assert!(resolve(&base, "mailto:someone@example.com").unwrap().is_none());
/// ```
pub fn resolve(base: &Url, reference: &str) -> Result<Option<Url>, ParseError> {
    let reference = reference.trim();

    if is_skippable_reference(reference) {
        return Ok(None);
    }

    let absolute = base.join(reference)?;

    if is_navigable(&absolute) {
        Ok(Some(absolute))
    } else {
        Ok(None)
    }
}

/// Returns true if a reference should be dropped before resolution
pub fn is_skippable_reference(reference: &str) -> bool {
    if reference.is_empty() || reference.starts_with('#') {
        return true;
    }

    let lowered = reference.to_ascii_lowercase();
    SKIPPED_PREFIXES
        .iter()
        .any(|prefix| lowered.starts_with(prefix))
}

/// Returns true if the URL uses a scheme the crawler can fetch
pub fn is_navigable(url: &Url) -> bool {
    NAVIGABLE_SCHEMES.contains(&url.scheme())
}

use url::Url;

/// Resolves an attribute value to an absolute HTTP(S) URL
///
/// Returns None if the value should be ignored:
/// - empty or whitespace-only values
/// - javascript:, mailto:, tel: schemes
/// - fragment-only references
/// - values that cannot be joined onto `base_url`
/// - non-HTTP(S) URLs after resolution
///
/// `data:` URIs are ignored as well since there is nothing to fetch.
pub fn resolve_href(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    // Skip special schemes
    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    if href.starts_with('#') {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url.to_string())
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Resolves an image `src` value against `base_url`
///
/// Only a blank value yields `None`. A value that joins onto `base_url` is
/// returned absolute whatever its scheme; one that does not is returned
/// trimmed but otherwise untouched, so the download attempt can report it.
pub fn resolve_src(src: &str, base_url: &Url) -> Option<String> {
    let src = src.trim();

    if src.is_empty() {
        return None;
    }

    match base_url.join(src) {
        Ok(absolute_url) => Some(absolute_url.to_string()),
        Err(_) => Some(src.to_string()),
    }
}

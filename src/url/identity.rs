use crate::UrlError;
use url::Url;

/// Derives `(item_id, item_name)` from a detail-page URL
///
/// Detail links look like `.../product/<item_id>/<item_name>`, so the
/// identifier and name are the last two non-empty path segments. A trailing
/// slash does not matter. URLs with fewer than two segments are rejected.
///
/// # Examples
///
/// ```
/// use gallery_harvest::url::item_identity;
/// use url::Url;
///
/// let url = Url::parse("https://shop.example/product/dkp-42/desk-lamp/").unwrap();
/// let (id, name) = item_identity(&url).unwrap();
/// assert_eq!(id, "dkp-42");
/// assert_eq!(name, "desk-lamp");
/// ```
pub fn item_identity(url: &Url) -> Result<(String, String), UrlError> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [.., id, name] => Ok((id.to_string(), name.to_string())),
        _ => Err(UrlError::MissingIdentifier(url.to_string())),
    }
}

use crate::UrlError;
use url::Url;

/// Name of the query parameter carrying the listing page number
const PAGE_PARAM: &str = "page";

/// Builds the URL of listing page `page_number` from the configured base URL
///
/// A base URL ending in `?` or `&` is treated as a prefix and `page=<n>` is
/// appended to it verbatim. Any other base URL gets `page` added as a new
/// query pair, so `https://shop.example/list` and
/// `https://shop.example/list?sort=new` both work.
///
/// # Examples
///
/// ```
/// use gallery_harvest::url::listing_page_url;
///
/// let url = listing_page_url("https://shop.example/list?sort=new&", 3).unwrap();
/// assert_eq!(url.as_str(), "https://shop.example/list?sort=new&page=3");
/// ```
pub fn listing_page_url(base_url: &str, page_number: u32) -> Result<Url, UrlError> {
    let base_url = base_url.trim();

    if base_url.ends_with('?') || base_url.ends_with('&') {
        let joined = format!("{}{}={}", base_url, PAGE_PARAM, page_number);
        return Url::parse(&joined).map_err(|e| UrlError::Parse(format!("{}: {}", joined, e)));
    }

    let mut url = Url::parse(base_url).map_err(|e| UrlError::Parse(format!("{}: {}", base_url, e)))?;
    url.query_pairs_mut()
        .append_pair(PAGE_PARAM, &page_number.to_string());
    Ok(url)
}

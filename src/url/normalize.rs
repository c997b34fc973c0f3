use url::Url;

/// Canonicalizes a URL so that the same logical page is never queued twice
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything after #)
/// 2. Remove trailing slashes from the path, except for the bare root `/`
///
/// Host lowercasing, default-port elision, and dot-segment removal are already done by
/// [`Url::parse`], so two URLs that differ only in fragment or trailing slash normalize
/// to the same string. The input must already be a parsed absolute URL; this function
/// never fails.
///
/// # Examples
///
/// ```
/// use autositefix::url::normalize_url;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/docs/#intro").unwrap();
/// assert_eq!(normalize_url(&url), "https://example.com/docs");
///
/// let root = Url::parse("https://example.com/#top").unwrap();
/// assert_eq!(normalize_url(&root), "https://example.com/");
/// ```
pub fn normalize_url(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        let trimmed = if trimmed.is_empty() { "/" } else { trimmed };
        let trimmed = trimmed.to_string();
        url.set_path(&trimmed);
    }

    url.to_string()
}

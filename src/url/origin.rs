use crate::{UrlError, UrlResult};
use url::Url;

/// Parses and validates a run's entry URL
///
/// The entry URL must be absolute, use HTTP or HTTPS, and carry a host. Anything else is
/// rejected before crawling starts.
///
/// # Examples
///
/// ```
/// use autositefix::url::parse_entry_url;
///
/// assert!(parse_entry_url("https://example.com/").is_ok());
/// assert!(parse_entry_url("ftp://example.com/").is_err());
/// assert!(parse_entry_url("not a url").is_err());
/// ```
pub fn parse_entry_url(input: &str) -> UrlResult<Url> {
    let url = Url::parse(input.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Returns true if both URLs share scheme, host, and port
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    let origin = a.origin();
    origin.is_tuple() && origin == b.origin()
}

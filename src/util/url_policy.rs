use thiserror::Error;
use url::Url;

/// Errors from URL policy checks.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to a non-loopback host.
    #[error("Insecure URL: HTTPS required (plain HTTP only for localhost)")]
    Insecure,
    #[error("URL has no host")]
    MissingHost,
}

/// Validate the inventory API base URL.
///
/// HTTPS is required, except for loopback hosts (`localhost`, `127.0.0.1`,
/// `[::1]`) so a local backend or a test server can be used over plain HTTP.
/// A trailing slash is added to the path so relative joins keep any prefix.
///
/// ```
/// use stockroom::util::validate_base_url;
///
/// assert!(validate_base_url("https://api.example.com").is_ok());
/// assert!(validate_base_url("http://localhost:5000").is_ok());
/// assert!(validate_base_url("http://api.example.com").is_err());
/// ```
pub fn validate_base_url(raw: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(raw.trim())?;

    match url.scheme() {
        "https" => {}
        "http" => {
            if !is_loopback_host(&url) {
                tracing::error!(base_url = %url, "Rejecting non-HTTPS base URL");
                return Err(UrlValidationError::Insecure);
            }
            tracing::warn!(base_url = %url, "Using non-HTTPS API base URL (localhost only)");
        }
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if url.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// SEC: Check a URL before passing it to `open::that()`.
///
/// Only http/https URLs with a host are handed to the system opener, so a
/// server-supplied image reference can never launch a local file or handler.
pub fn validate_url_for_open(raw: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(raw)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().is_none() {
        return Err(UrlValidationError::MissingHost);
    }
    Ok(url)
}

fn is_loopback_host(url: &Url) -> bool {
    match url.host() {
        Some(url::Host::Domain(d)) => d.eq_ignore_ascii_case("localhost"),
        Some(url::Host::Ipv4(ip)) => ip.is_loopback(),
        Some(url::Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_https_accepted() {
        let url = validate_base_url("https://inventory.example.com").unwrap();
        assert_eq!(url.as_str(), "https://inventory.example.com/");
    }

    #[test]
    fn test_path_prefix_gets_trailing_slash() {
        let url = validate_base_url("https://example.com/backend").unwrap();
        assert_eq!(url.path(), "/backend/");
        assert_eq!(
            url.join("api/inventory").unwrap().as_str(),
            "https://example.com/backend/api/inventory"
        );
    }

    #[test]
    fn test_http_localhost_accepted() {
        assert!(validate_base_url("http://localhost:5000").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
        assert!(validate_base_url("http://[::1]:3000").is_ok());
    }

    #[test]
    fn test_http_remote_rejected() {
        assert_eq!(
            validate_base_url("http://inventory.example.com"),
            Err(UrlValidationError::Insecure)
        );
    }

    #[test]
    fn test_other_schemes_rejected() {
        assert!(matches!(
            validate_base_url("ftp://example.com"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_query_and_fragment_dropped() {
        let url = validate_base_url("https://example.com/?x=1#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_open_allows_http_and_https() {
        assert!(validate_url_for_open("https://cdn.example.com/a.png").is_ok());
        assert!(validate_url_for_open("http://localhost:5000/Slice-2_10.jpg").is_ok());
    }

    #[test]
    fn test_open_rejects_file_and_javascript() {
        assert!(validate_url_for_open("file:///etc/passwd").is_err());
        assert!(validate_url_for_open("javascript:alert(1)").is_err());
    }
}

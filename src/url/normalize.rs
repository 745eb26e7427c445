use crate::UrlError;
use url::Url;

/// Normalizes a URL for visited-set and cache keying
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Reject schemes other than http/https
/// 3. Lowercase the host
/// 4. Remove the fragment (everything after #)
/// 5. Collapse duplicate slashes in the path and strip the trailing
///    slash (except for the root path)
///
/// Query strings are kept as-is: banks route card pages through
/// parameterized URLs and dropping them would merge distinct pages.
///
/// # Examples
///
/// ```
/// use cardscout::url::normalize_url;
///
/// let url = normalize_url("https://Bank.example.com/cards/#promo").unwrap();
/// assert_eq!(url.as_str(), "https://bank.example.com/cards");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    match url.host_str() {
        Some(host) => {
            let lowered = host.to_lowercase();
            url.set_host(Some(&lowered))
                .map_err(|e| UrlError::Parse(format!("Failed to set host: {}", e)))?;
        }
        None => return Err(UrlError::MissingAuthority),
    }

    url.set_fragment(None);

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    Ok(url)
}

/// Collapses duplicate slashes and strips the trailing slash (root excepted)
fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

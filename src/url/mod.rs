//! URL handling module for cardscout
//!
//! This module provides URL normalization, authority extraction, and the
//! digit-blind similarity predicate the page cache uses to collapse
//! paginated or parameter-varied duplicates.

mod normalize;
mod similarity;

pub use normalize::normalize_url;
pub use similarity::{path_signature, urls_similar};

use url::Url;

/// Extracts the authority (lowercase host plus explicit port) from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use cardscout::url::extract_authority;
///
/// let url = Url::parse("https://Bank.Example.com/cards").unwrap();
/// assert_eq!(extract_authority(&url), Some("bank.example.com".to_string()));
///
/// let url = Url::parse("http://bank.example.com:8080/").unwrap();
/// assert_eq!(extract_authority(&url), Some("bank.example.com:8080".to_string()));
/// ```
pub fn extract_authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

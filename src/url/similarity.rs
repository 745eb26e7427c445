use crate::url::extract_authority;
use url::Url;

/// Checks whether two URLs are near-duplicates for caching purposes
///
/// Two URLs are considered similar when they share an authority and their
/// paths are equal after trailing-slash stripping and after removing digit
/// runs. This deliberately merges `/cards/page/1` with `/cards/page/2`,
/// which bounds total fetch volume on paginated listings. URLs on
/// different hosts never match.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use cardscout::url::urls_similar;
///
/// let a = Url::parse("https://x.com/page/1").unwrap();
/// let b = Url::parse("https://x.com/page/2").unwrap();
/// assert!(urls_similar(&a, &b));
///
/// let c = Url::parse("https://y.com/page/1").unwrap();
/// assert!(!urls_similar(&a, &c));
/// ```
pub fn urls_similar(a: &Url, b: &Url) -> bool {
    match (extract_authority(a), extract_authority(b)) {
        (Some(auth_a), Some(auth_b)) if auth_a == auth_b => {}
        _ => return false,
    }

    path_signature(a.path()) == path_signature(b.path())
}

/// Reduces a path to its similarity signature: trailing slash stripped,
/// digit runs removed
pub fn path_signature(path: &str) -> String {
    let trimmed = if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    };

    trimmed.chars().filter(|c| !c.is_ascii_digit()).collect()
}

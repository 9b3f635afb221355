use url::Url;

/// Checks whether a URL path starts with at least one allowed prefix
///
/// An empty prefix set allows every path.
///
/// # Examples
///
/// ```
/// use burrow::url::matches_path_prefix;
/// use std::collections::HashSet;
///
/// let prefixes: HashSet<String> = ["/docs".to_string()].into_iter().collect();
/// assert!(matches_path_prefix("/docs/intro", &prefixes));
/// assert!(!matches_path_prefix("/blog", &prefixes));
/// ```
pub fn matches_path_prefix<'a, I>(path: &str, prefixes: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let mut prefixes = prefixes.into_iter().peekable();
    if prefixes.peek().is_none() {
        return true;
    }
    prefixes.any(|prefix| path.starts_with(prefix.as_str()))
}

/// Checks whether the lowercased URL path ends with any of the given suffixes
pub fn has_skipped_extension(url: &Url, extensions: &[String]) -> bool {
    let path = url.path().to_lowercase();
    extensions.iter().any(|ext| path.ends_with(ext.as_str()))
}

/// Checks whether the URL points at a PDF document
pub fn is_pdf(url: &Url) -> bool {
    url.path().to_lowercase().ends_with(".pdf")
}

/// Checks whether the URL carries GET parameters
///
/// Only the parsed query component counts; a `?` that is percent-encoded in
/// the path does not.
pub fn has_query(url: &Url) -> bool {
    url.query().is_some()
}

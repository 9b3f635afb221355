use crate::UrlError;
use regex::Regex;
use std::sync::OnceLock;
use url::{Host, Url};

/// Accepted URL shape: optional scheme, dotted labels ending in an alphabetic
/// suffix, optional path. Anything with whitespace is rejected.
const URL_PATTERN: &str = r"(?i)^(https?://)?([a-z0-9-]+\.)+[a-z]{2,}(/\S*)?$";

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(URL_PATTERN).expect("URL_PATTERN is a valid regex"))
}

/// Trims whitespace and strips trailing slashes
///
/// # Examples
///
/// ```
/// use burrow::url::clean;
///
/// assert_eq!(clean("  https://example.com/docs/ "), "https://example.com/docs");
/// ```
pub fn clean(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Prepends `https://` when the input carries no HTTP(S) scheme
///
/// # Examples
///
/// ```
/// use burrow::url::with_protocol;
///
/// assert_eq!(with_protocol("example.com"), "https://example.com");
/// assert_eq!(with_protocol("http://example.com"), "http://example.com");
/// ```
pub fn with_protocol(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

/// Checks whether a raw string looks like a crawlable URL or bare domain
///
/// Accepts `[http(s)://][www.]label(.label)+[/path]`. Never panics; anything
/// that does not match simply returns `false`.
///
/// # Examples
///
/// ```
/// use burrow::url::is_valid;
///
/// assert!(is_valid("example.com/path"));
/// assert!(is_valid("https://sub.example.co.uk"));
/// assert!(!is_valid("not a url"));
/// ```
pub fn is_valid(raw: &str) -> bool {
    let trimmed = raw.trim();
    !trimmed.is_empty() && url_regex().is_match(trimmed)
}

/// Parses a seed string into an absolute HTTP(S) URL
///
/// The seed is cleaned and given a scheme if it lacks one. An explicit scheme
/// other than `http` or `https` is refused before that happens. IP hosts and
/// ports are accepted; a named host must look like a real domain (see
/// [`is_valid`]), since seeds may come from callers other than the command
/// parser.
pub fn parse_seed(raw: &str) -> Result<Url, UrlError> {
    let cleaned = clean(raw);
    if let Some((scheme, _)) = cleaned.split_once("://") {
        if !scheme.eq_ignore_ascii_case("http") && !scheme.eq_ignore_ascii_case("https") {
            return Err(UrlError::InvalidScheme(scheme.to_string()));
        }
    }

    let candidate = with_protocol(&cleaned);
    let url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    match url.host() {
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => {}
        Some(Host::Domain(domain)) if is_valid(domain) => {}
        Some(Host::Domain(_)) | None => return Err(UrlError::MissingDomain),
    }

    Ok(url)
}

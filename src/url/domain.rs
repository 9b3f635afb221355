use url::Url;

/// Computes the domain key of a URL or bare domain
///
/// The protocol is stripped (via URL parsing), the host is lowercased, and a
/// leading `www.` is removed. A non-default port is kept, so two servers on the
/// same host but different ports are different domains. This key is the only
/// thing ever compared when deciding domain membership.
///
/// # Examples
///
/// ```
/// use burrow::url::domain_of;
///
/// assert_eq!(domain_of("https://www.Example.com/x"), "example.com");
/// assert_eq!(domain_of("example.com"), "example.com");
/// assert_eq!(domain_of("http://127.0.0.1:8080/page"), "127.0.0.1:8080");
/// ```
pub fn domain_of(url_or_domain: &str) -> String {
    let trimmed = url_or_domain.trim();

    let lowered = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        match Url::parse(trimmed) {
            Ok(url) => return domain_of_url(&url),
            Err(_) => trimmed.to_lowercase(),
        }
    } else {
        // Bare domain, possibly followed by a path
        let host = trimmed.split('/').next().unwrap_or_default();
        host.to_lowercase()
    };

    strip_www(&lowered).to_string()
}

/// Computes the domain key of an already parsed URL
///
/// Returns an empty string for URLs without a host.
pub fn domain_of_url(url: &Url) -> String {
    let host = match url.host_str() {
        Some(h) => h.to_lowercase(),
        None => return String::new(),
    };

    let host = strip_www(&host);

    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

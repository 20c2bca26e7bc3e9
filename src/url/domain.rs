use url::Url;

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use ripple_deepcrawl::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Extracts the lowercase host from a URL string
///
/// Returns `None` when the string does not parse or has no host.
pub fn extract_domain_str(url: &str) -> Option<String> {
    Url::parse(url).ok().as_ref().and_then(extract_domain)
}

/// Strips a leading `www.` so that `www.example.com` and `example.com`
/// compare as the same site
pub fn site_key(domain: &str) -> &str {
    domain.strip_prefix("www.").unwrap_or(domain)
}

/// Returns true if both URLs live on the same site
///
/// Hosts are compared case-insensitively and ignoring a `www.` prefix.
pub fn is_same_site(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(left), Some(right)) => site_key(&left) == site_key(&right),
        _ => false,
    }
}

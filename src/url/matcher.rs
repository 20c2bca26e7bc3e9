/// Checks if a domain matches a pattern
///
/// Two kinds of patterns are supported:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches "example.com" itself and any
///    subdomain such as "blog.example.com" or "api.v2.example.com"
///
/// With `include_subdomains` set, an exact pattern behaves like its
/// wildcard form. Both sides are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use ripple_deepcrawl::url::matches_domain;
///
/// assert!(matches_domain("example.com", "example.com", false));
/// assert!(!matches_domain("example.com", "blog.example.com", false));
/// assert!(matches_domain("example.com", "blog.example.com", true));
/// assert!(matches_domain("*.example.com", "api.v2.example.com", false));
/// assert!(!matches_domain("*.example.com", "example.org", false));
/// ```
pub fn matches_domain(pattern: &str, candidate: &str, include_subdomains: bool) -> bool {
    let (base, wildcard) = match pattern.strip_prefix("*.") {
        Some(base) => (base, true),
        None => (pattern, include_subdomains),
    };

    if candidate == base {
        return true;
    }

    wildcard
        && candidate.len() > base.len()
        && candidate.ends_with(base)
        && candidate.as_bytes()[candidate.len() - base.len() - 1] == b'.'
}

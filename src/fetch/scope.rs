// src/fetch/scope.rs
// =============================================================================
// Crawl scope: which links are "on the same site" as the start URL.
//
// Two hosts match when they are equal after lowercasing and dropping one
// leading "www.", so example.com and WWW.Example.com are the same site but
// blog.example.com is not.
// =============================================================================

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostScope {
    target: String,
}

impl HostScope {
    // Builds the scope from the start URL. A URL without a host gets an
    // empty target, which matches nothing.
    pub fn new(start_url: &Url) -> Self {
        Self {
            target: start_url.host_str().map(normalize_host).unwrap_or_default(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn in_scope(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => !self.target.is_empty() && normalize_host(host) == self.target,
            None => false,
        }
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.to_ascii_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(url: &str) -> HostScope {
        HostScope::new(&Url::parse(url).unwrap())
    }

    // Unparseable URLs are never in scope
    fn accepts(scope: &HostScope, url: &str) -> bool {
        Url::parse(url).map(|u| scope.in_scope(&u)).unwrap_or(false)
    }

    #[test]
    fn test_strips_www_from_target() {
        assert_eq!(scope("https://www.example.com/start").target(), "example.com");
    }

    #[test]
    fn test_www_and_bare_host_match() {
        let scope = scope("https://example.com/");
        assert!(accepts(&scope, "https://www.example.com/about"));
        assert!(accepts(&scope, "http://example.com/docs?page=2"));
    }

    #[test]
    fn test_case_insensitive() {
        let scope = scope("https://Example.COM/");
        assert!(accepts(&scope, "https://WWW.EXAMPLE.com/"));
    }

    #[test]
    fn test_other_hosts_rejected() {
        let scope = scope("https://example.com/");
        assert!(!accepts(&scope, "https://blog.example.com/"));
        assert!(!accepts(&scope, "https://example.org/"));
        assert!(!accepts(&scope, "not a url"));
    }
}

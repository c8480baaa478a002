//! Recognized video-host domains
//!
//! The table itself lives in `domain_table.rs` and is regenerated by
//! `tmy-cli domains` from the upstream community domain list. Everything
//! the content script does is gated on [`is_recognized_host`].

pub use crate::domain_table::RECOGNIZED_DOMAINS;

/// Iterator over a host and each of its parent domains, most specific first.
pub struct HostSuffixIter<'a> {
    current: Option<&'a str>,
}

impl<'a> Iterator for HostSuffixIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.current?;
        self.current = get_parent_domain(result);
        Some(result)
    }
}

/// Walk host suffixes from most specific to least specific.
pub fn walk_host_suffixes(host: &str) -> HostSuffixIter<'_> {
    HostSuffixIter {
        current: (!host.is_empty()).then_some(host),
    }
}

/// Strip the leftmost label. `None` once only one label is left.
pub fn get_parent_domain(host: &str) -> Option<&str> {
    let dot = host.find('.')?;
    let parent = &host[dot + 1..];
    (!parent.is_empty()).then_some(parent)
}

/// True when the host is a recognized domain or a subdomain of one.
pub fn is_recognized_host(hostname: &str) -> bool {
    let host = hostname.trim_end_matches('.').to_ascii_lowercase();
    walk_host_suffixes(&host).any(|suffix| RECOGNIZED_DOMAINS.binary_search(&suffix).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_sorted_and_unique() {
        assert!(RECOGNIZED_DOMAINS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_exact_and_subdomain_hosts() {
        assert!(is_recognized_host("youtube.com"));
        assert!(is_recognized_host("www.youtube.com"));
        assert!(is_recognized_host("m.youtube.com"));
        assert!(is_recognized_host("youtu.be"));
        assert!(is_recognized_host("WWW.YouTube.co.uk"));
        assert!(is_recognized_host("www.youtube.com."));
    }

    #[test]
    fn test_unrelated_hosts() {
        assert!(!is_recognized_host("example.com"));
        assert!(!is_recognized_host("notyoutube.com"));
        assert!(!is_recognized_host("youtube.com.evil.net"));
        assert!(!is_recognized_host("com"));
        assert!(!is_recognized_host(""));
    }

    #[test]
    fn test_walk_host_suffixes() {
        let suffixes: Vec<_> = walk_host_suffixes("a.b.youtube.com").collect();
        assert_eq!(suffixes, vec!["a.b.youtube.com", "b.youtube.com", "youtube.com", "com"]);
    }

    #[test]
    fn test_get_parent_domain() {
        assert_eq!(get_parent_domain("www.youtube.com"), Some("youtube.com"));
        assert_eq!(get_parent_domain("com"), None);
        assert_eq!(get_parent_domain("com."), None);
    }
}

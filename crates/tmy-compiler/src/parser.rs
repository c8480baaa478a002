use std::collections::BTreeSet;

/// Entry kinds in the community list that carry no literal domain.
const SKIPPED_PREFIXES: [&str; 3] = ["include:", "regexp:", "keyword:"];

/// Prefixes stripped in front of a literal domain.
const DOMAIN_PREFIXES: [&str; 3] = ["full:", "domain:", "suffix:"];

/// Short-link hosts accepted regardless of the `youtube` prefix rule.
const SHORT_LINK_HOSTS: [&str; 2] = ["youtu.be", "yt.be"];

const BLOCKED_SUFFIXES: [&str; 3] = [".google.com", ".googleapis.com", ".googleusercontent.com"];

/// CDN and API hosts listed upstream that never serve a watch page.
const BLOCKED_EXACT: [&str; 9] = [
    "ggpht.com",
    "ggpht.cn",
    "googlevideo.com",
    "ytimg.com",
    "yt3.googleusercontent.com",
    "wide-youtube.l.google.com",
    "youtube-ui.l.google.com",
    "youtubeembeddedplayer.googleapis.com",
    "youtubei.googleapis.com",
];

/// Parse a community domain list into the sorted, deduplicated set of
/// hosts the content script runs on.
pub fn parse_domain_list(text: &str) -> Vec<String> {
    let mut domains = BTreeSet::new();

    for raw_line in text.lines() {
        let Some(domain) = normalize_line(raw_line) else {
            continue;
        };
        if !is_allowed_domain(&domain) {
            log::trace!("skipping {}", domain);
            continue;
        }
        domains.insert(domain);
    }

    domains.into_iter().collect()
}

/// Reduce one list line to a bare lowercase domain, or `None` for
/// comments, includes, regex/keyword entries and anything not a literal
/// host.
pub fn normalize_line(line: &str) -> Option<String> {
    let mut cleaned = line.trim();
    if cleaned.is_empty() || cleaned.starts_with('#') {
        return None;
    }

    if let Some(index) = cleaned.find(" #") {
        cleaned = cleaned[..index].trim();
    }

    if SKIPPED_PREFIXES.iter().any(|prefix| cleaned.starts_with(prefix)) {
        return None;
    }

    // Attributes such as `@cn` follow the domain
    if let Some(index) = cleaned.find(' ') {
        cleaned = cleaned[..index].trim();
    }

    for prefix in DOMAIN_PREFIXES {
        if let Some(rest) = cleaned.strip_prefix(prefix) {
            cleaned = rest.trim();
        }
    }

    let lowered = cleaned.to_lowercase();
    let domain = lowered.strip_prefix('.').unwrap_or(&lowered);
    let domain = domain.strip_suffix('.').unwrap_or(domain);

    if domain.is_empty() || domain.contains('/') || domain.contains('*') {
        return None;
    }

    Some(domain.to_string())
}

pub fn is_allowed_domain(domain: &str) -> bool {
    if SHORT_LINK_HOSTS.contains(&domain) {
        return true;
    }
    if !domain.starts_with("youtube") {
        return false;
    }
    if BLOCKED_SUFFIXES.iter().any(|suffix| domain.ends_with(suffix)) {
        return false;
    }
    if BLOCKED_EXACT.contains(&domain) {
        return false;
    }
    domain.contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_line_prefixes() {
        assert_eq!(normalize_line("youtube.com"), Some("youtube.com".to_string()));
        assert_eq!(normalize_line("full:www.youtube.com"), Some("www.youtube.com".to_string()));
        assert_eq!(normalize_line("domain:YouTube.DE"), Some("youtube.de".to_string()));
        assert_eq!(normalize_line("suffix:.youtu.be."), Some("youtu.be".to_string()));
    }

    #[test]
    fn test_normalize_line_comments_and_attributes() {
        assert_eq!(normalize_line(""), None);
        assert_eq!(normalize_line("   "), None);
        assert_eq!(normalize_line("# comment"), None);
        assert_eq!(normalize_line("youtube.fr # France"), Some("youtube.fr".to_string()));
        assert_eq!(normalize_line("youtube.cn @cn"), Some("youtube.cn".to_string()));
    }

    #[test]
    fn test_normalize_line_skips_non_literals() {
        assert_eq!(normalize_line("include:google"), None);
        assert_eq!(normalize_line("regexp:^yt[0-9]\\.com$"), None);
        assert_eq!(normalize_line("keyword:youtube"), None);
        assert_eq!(normalize_line("youtube.com/path"), None);
        assert_eq!(normalize_line("*.youtube.com"), None);
        assert_eq!(normalize_line("full:."), None);
    }

    #[test]
    fn test_is_allowed_domain() {
        assert!(is_allowed_domain("youtu.be"));
        assert!(is_allowed_domain("yt.be"));
        assert!(is_allowed_domain("youtube.com"));
        assert!(is_allowed_domain("youtube-nocookie.com"));
        assert!(is_allowed_domain("youtubekids.com"));

        assert!(!is_allowed_domain("ytimg.com"));
        assert!(!is_allowed_domain("googlevideo.com"));
        assert!(!is_allowed_domain("youtubei.googleapis.com"));
        assert!(!is_allowed_domain("youtube-ui.l.google.com"));
        assert!(!is_allowed_domain("youtube.googleusercontent.com"));
        assert!(!is_allowed_domain("youtube"));
    }

    #[test]
    fn test_parse_domain_list_sorted_and_deduped() {
        let text = "\
# YouTube
include:youtube-ads
youtube.de
domain:youtube.com
full:youtube.com
youtu.be @cn
ytimg.com
regexp:.+\\.youtube\\.com$
youtubei.googleapis.com
";
        assert_eq!(parse_domain_list(text), vec!["youtu.be", "youtube.com", "youtube.de"]);
    }

    #[test]
    fn test_parse_domain_list_empty() {
        assert!(parse_domain_list("# nothing here\n\n").is_empty());
    }
}

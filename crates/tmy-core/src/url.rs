//! URL slicing helpers
//!
//! These functions avoid allocations and work directly on string slices.
//! They only need to understand the URLs the host page puts in
//! `location.href`, so there is no general-purpose parsing here.

// =============================================================================
// Scheme / Host
// =============================================================================

/// Get the position after "://".
#[inline]
pub fn get_scheme_end(url: &str) -> Option<usize> {
    let bytes = url.as_bytes();

    let colon_pos = bytes.iter().position(|&b| b == b':')?;

    if bytes.len() > colon_pos + 2
        && bytes[colon_pos + 1] == b'/'
        && bytes[colon_pos + 2] == b'/'
    {
        return Some(colon_pos + 3);
    }

    None
}

/// Get the start and end positions of the hostname in a URL.
#[inline]
pub fn get_host_position(url: &str) -> Option<(usize, usize)> {
    let scheme_end = get_scheme_end(url)?;
    let bytes = url.as_bytes();

    // Skip userinfo
    let mut host_start = scheme_end;
    for (i, &b) in bytes.iter().enumerate().skip(scheme_end) {
        if b == b'@' {
            host_start = i + 1;
            break;
        }
        if b == b'/' || b == b'?' || b == b'#' {
            break;
        }
    }

    let mut host_end = bytes.len();
    for (i, &b) in bytes.iter().enumerate().skip(host_start) {
        if b == b'/' || b == b'?' || b == b'#' || b == b':' {
            host_end = i;
            break;
        }
    }

    Some((host_start, host_end))
}

/// Host extraction without allocations.
/// Returns a slice into the original URL.
#[inline]
pub fn extract_host(url: &str) -> Option<&str> {
    let (host_start, host_end) = get_host_position(url)?;
    Some(&url[host_start..host_end])
}

// =============================================================================
// Path / Query
// =============================================================================

/// Extract the path portion of a URL. Defaults to "/".
pub fn extract_path(url: &str) -> &str {
    let (_, host_end) = match get_host_position(url) {
        Some(pos) => pos,
        None => return "/",
    };

    let bytes = url.as_bytes();

    let path_start = match bytes[host_end..].iter().position(|&b| b == b'/' || b == b'?' || b == b'#') {
        Some(offset) if bytes[host_end + offset] == b'/' => host_end + offset,
        _ => return "/",
    };

    let path_end = bytes[path_start..]
        .iter()
        .position(|&b| b == b'?' || b == b'#')
        .map_or(bytes.len(), |offset| path_start + offset);

    &url[path_start..path_end]
}

/// Extract the query string without the leading '?' or the fragment.
pub fn extract_query(url: &str) -> Option<&str> {
    let fragment_start = url.find('#').unwrap_or(url.len());
    let q_pos = url[..fragment_start].find('?')?;
    Some(&url[q_pos + 1..fragment_start])
}

/// First value of a query parameter, undecoded.
pub fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    extract_query(url)?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}

// =============================================================================
// Video Identity
// =============================================================================

const SHORT_LINK_HOST: &str = "youtu.be";
const SHORTS_PREFIX: &str = "/shorts/";

/// Cut a path segment at the first `?`, `&`, `#` or `/`.
#[inline]
fn leading_segment(s: &str) -> &str {
    let end = s
        .bytes()
        .position(|b| matches!(b, b'?' | b'&' | b'#' | b'/'))
        .unwrap_or(s.len());
    &s[..end]
}

/// Video id for the current URL: short-link path, `v` parameter, or
/// `/shorts/<id>`, first hit wins. Empty string when none applies.
pub fn video_id_from_url(url: &str) -> &str {
    let host = extract_host(url).unwrap_or("");
    let path = extract_path(url);

    if host.eq_ignore_ascii_case(SHORT_LINK_HOST) {
        let first = path.strip_prefix('/').unwrap_or(path);
        return leading_segment(first);
    }

    if let Some(v) = query_param(url, "v").filter(|v| !v.is_empty()) {
        return v;
    }

    if let Some(rest) = path.strip_prefix(SHORTS_PREFIX) {
        return leading_segment(rest);
    }

    ""
}

/// Key used to dedupe enforcement: the video id, or the full URL when
/// the page has none.
pub fn match_key(url: &str) -> String {
    let video_id = video_id_from_url(url);
    if video_id.is_empty() {
        url.to_string()
    } else {
        video_id.to_string()
    }
}

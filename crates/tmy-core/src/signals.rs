//! Signal Extractor
//!
//! Best-effort reads of video id, title and channel candidates from a
//! client-rendered page. Missing elements produce empty values; nothing
//! here fails.

use crate::page::PageSignals;
use crate::types::MatchContext;
use crate::url::video_id_from_url;

// =============================================================================
// Host page selectors
// =============================================================================

/// Primary video heading.
pub const TITLE_SELECTOR: &str = "h1 yt-formatted-string, h1.title";

/// Containers whose text is a channel name.
pub const CHANNEL_TEXT_SELECTOR: &str = "ytd-channel-name a, #text-container.ytd-channel-name, \
     ytd-video-owner-renderer a, ytd-video-owner-renderer #text";

/// Owner/channel links carrying a handle or channel id in their href.
pub const CHANNEL_LINK_SELECTOR: &str = "ytd-video-owner-renderer a[href], ytd-channel-name a[href]";

/// `itemprop` values of the metadata tags that name the channel.
pub const CHANNEL_META_ITEMPROPS: [&str; 2] = ["author", "channelId"];

/// Suffix the host appends to `document.title`.
pub const PAGE_TITLE_SUFFIX: &str = " - YouTube";

// =============================================================================
// Extraction
// =============================================================================

pub fn extract_video_id<P: PageSignals + ?Sized>(page: &P) -> String {
    video_id_from_url(&page.location_href()).to_string()
}

/// Heading text if present, else the document title minus the site suffix.
pub fn extract_title<P: PageSignals + ?Sized>(page: &P) -> String {
    if let Some(heading) = page.heading_text() {
        let heading = heading.trim();
        if !heading.is_empty() {
            return heading.to_string();
        }
    }
    page.document_title()
        .replacen(PAGE_TITLE_SUFFIX, "", 1)
        .trim()
        .to_string()
}

/// Union of every channel signal on the page, deduplicated, in the order
/// the sources are consulted.
pub fn extract_channel_candidates<P: PageSignals + ?Sized>(page: &P) -> Vec<String> {
    let mut ctx = MatchContext::default();
    collect_channels(page, &mut ctx);
    ctx.channels
}

fn collect_channels<P: PageSignals + ?Sized>(page: &P, ctx: &mut MatchContext) {
    for text in page.channel_name_texts() {
        ctx.push_channel(&text);
    }

    for href in page.channel_link_hrefs() {
        if let Some(handle) = handle_from_href(&href) {
            ctx.push_channel(handle);
        }
        if let Some(channel_id) = channel_id_from_href(&href) {
            ctx.push_channel(channel_id);
        }
    }

    for itemprop in CHANNEL_META_ITEMPROPS {
        if let Some(content) = page.meta_content(itemprop) {
            ctx.push_channel(&content);
        }
    }

    if let Some(author) = page.player_response_author() {
        ctx.push_channel(&author);
    }
}

/// Gather everything the matcher needs in one pass.
pub fn extract_signals<P: PageSignals + ?Sized>(page: &P) -> MatchContext {
    let mut ctx = MatchContext::new(extract_title(page), extract_video_id(page));
    collect_channels(page, &mut ctx);
    ctx
}

// =============================================================================
// Href patterns
// =============================================================================

#[inline]
fn until_delimiter(s: &str) -> &str {
    let end = s
        .bytes()
        .position(|b| matches!(b, b'/' | b'?' | b'#'))
        .unwrap_or(s.len());
    &s[..end]
}

/// `@handle` from the first non-empty `/@...` path segment.
pub fn handle_from_href(href: &str) -> Option<&str> {
    href.match_indices("/@")
        .map(|(start, _)| until_delimiter(&href[start + 1..]))
        // "@" alone is not a handle
        .find(|handle| handle.len() > 1)
}

/// Channel id from the first non-empty `/channel/<id>` path.
pub fn channel_id_from_href(href: &str) -> Option<&str> {
    const MARKER: &str = "/channel/";
    href.match_indices(MARKER)
        .map(|(start, _)| until_delimiter(&href[start + MARKER.len()..]))
        .find(|id| !id.is_empty())
}

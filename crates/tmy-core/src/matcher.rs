//! Rule Matcher
//!
//! Ordered, first-match-wins evaluation of the rule list against the
//! signals extracted from the page. If two rules could both match, only
//! the earlier one in the persisted order takes effect.

use crate::types::{MatchContext, Rule, RuleType};

#[inline]
fn normalize(value: &str) -> String {
    value.to_lowercase()
}

/// Does a single rule match the context?
///
/// `channel` and `title` are case-insensitive substring tests, `videoId`
/// is exact and case-sensitive. A rule with an empty value never matches.
pub fn matches_rule(rule: &Rule, ctx: &MatchContext) -> bool {
    if rule.value.is_empty() {
        return false;
    }

    match rule.rule_type {
        RuleType::Channel => {
            let needle = normalize(&rule.value);
            ctx.channels
                .iter()
                .any(|channel| normalize(channel).contains(&needle))
        }
        RuleType::Title => {
            !ctx.title.is_empty() && normalize(&ctx.title).contains(&normalize(&rule.value))
        }
        RuleType::VideoId => !ctx.video_id.is_empty() && rule.value.trim() == ctx.video_id,
    }
}

/// Index and rule of the first match. Stops at the first hit.
pub fn find_first_match<'r>(rules: &'r [Rule], ctx: &MatchContext) -> Option<(usize, &'r Rule)> {
    rules
        .iter()
        .enumerate()
        .find(|(_, rule)| matches_rule(rule, ctx))
}

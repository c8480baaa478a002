use std::fs;

use serde::Serialize;
use serde_json::Value;

use tmy_core::domains::is_recognized_host;
use tmy_core::rules::{normalize_rules, RULES_KEY};
use tmy_core::url::{extract_host, match_key, video_id_from_url};
use tmy_core::{find_first_match, MatchContext, Rule, RuleSet};

fn load_rules(path: &str) -> Result<RuleSet, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path, e))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| format!("Invalid JSON in '{}': {}", path, e))?;

    // Accept a storage export (`{"rules": [...]}`) as well as a bare array.
    let rules = match value.get(RULES_KEY) {
        Some(rules) if value.is_object() => rules,
        _ => &value,
    };
    Ok(RuleSet::from_value(rules))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport<'a> {
    host: &'a str,
    recognized: bool,
    match_key: String,
    context: &'a MatchContext,
    rule_index: Option<usize>,
    rule: Option<&'a Rule>,
    rate: Option<f64>,
    error: Option<String>,
}

fn describe(rule: &Rule) -> String {
    format!("[{}] {:?} -> {:?}", rule.rule_type.label(), rule.value, rule.speed)
}

pub fn cmd_check(rules_path: &str, url: &str, title: &str, channels: &[String], json: bool) -> Result<(), String> {
    let rules = load_rules(rules_path)?;

    let host = extract_host(url).unwrap_or("");
    let mut ctx = MatchContext::new(title.trim(), video_id_from_url(url));
    for channel in channels {
        ctx.push_channel(channel);
    }

    let matched = find_first_match(rules.rules(), &ctx);
    let validation = matched.map(|(_, rule)| rule.validate());

    if json {
        let report = CheckReport {
            host,
            recognized: is_recognized_host(host),
            match_key: match_key(url),
            context: &ctx,
            rule_index: matched.map(|(index, _)| index),
            rule: matched.map(|(_, rule)| rule),
            rate: validation.as_ref().and_then(|v| v.as_ref().ok()).map(|rate| rate.get()),
            error: validation.as_ref().and_then(|v| v.as_ref().err()).map(|e| e.to_string()),
        };
        let out = serde_json::to_string_pretty(&report).map_err(|e| format!("Failed to serialize report: {}", e))?;
        println!("{}", out);
        return Ok(());
    }

    println!("Page: {}", url);
    println!("  Host:       {} ({})", host, if is_recognized_host(host) { "recognized" } else { "not recognized" });
    println!("  Key:        {}", match_key(url));
    println!("  Video ID:   {:?}", ctx.video_id);
    println!("  Title:      {:?}", ctx.title);
    println!("  Channels:   {:?}", ctx.channels);
    println!("  Rules:      {}", rules.len());
    println!();

    match (matched, validation) {
        (Some((index, rule)), Some(validation)) => {
            println!("Match: #{} {}", index, describe(rule));
            match validation {
                Ok(rate) => println!("  Rate:       {}", rate.get()),
                Err(e) => println!("  No-op:      {}", e),
            }
        }
        _ => println!("No rule matches"),
    }

    Ok(())
}

pub fn cmd_normalize(input: &str, output: Option<&str>) -> Result<(), String> {
    let rules = load_rules(input)?;
    let before = rules.len();
    let normalized = normalize_rules(rules.rules().to_vec());

    let json = serde_json::to_string_pretty(&normalized).map_err(|e| format!("Failed to serialize rules: {}", e))?;
    match output {
        Some(path) => {
            fs::write(path, format!("{}\n", json)).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
        }
        None => println!("{}", json),
    }

    eprintln!("Rules: {} -> {} (dropped {})", before, normalized.len(), before - normalized.len());
    for (index, rule) in normalized.iter().enumerate() {
        if let Err(e) = rule.validate() {
            eprintln!("  #{} {}: {}", index, describe(rule), e);
        }
    }

    Ok(())
}

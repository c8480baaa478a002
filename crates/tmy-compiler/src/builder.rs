use std::collections::BTreeSet;
use std::fmt::Write as _;

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("invalid manifest JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("manifest.json missing content_scripts")]
    MissingContentScripts,
}

/// Rust source of `tmy-core`'s `domain_table.rs`. `domains` must already
/// be sorted; the lookup binary-searches the table.
pub fn render_domain_table(domains: &[String]) -> String {
    let mut out = String::new();
    out.push_str("// @generated by `tmy-cli domains`. Do not edit by hand.\n");
    out.push('\n');
    out.push_str("/// Recognized video-host domains, sorted.\n");
    out.push_str("pub static RECOGNIZED_DOMAINS: &[&str] = &[\n");
    for domain in domains {
        let _ = writeln!(out, "    {:?},", domain);
    }
    out.push_str("];\n");
    out
}

/// Content-script match patterns covering each domain and its subdomains.
pub fn build_match_patterns(domains: &[String]) -> Vec<String> {
    let mut patterns = BTreeSet::new();
    for domain in domains {
        patterns.insert(format!("https://{}/*", domain));
        patterns.insert(format!("https://*.{}/*", domain));
    }
    patterns.into_iter().collect()
}

/// Rewrite `matches` of every content script entry. Other manifest keys
/// are left alone. Returns pretty JSON with a trailing newline.
pub fn update_manifest(manifest_json: &str, patterns: &[String]) -> Result<String, ManifestError> {
    let mut manifest: Value = serde_json::from_str(manifest_json)?;

    let scripts = manifest
        .get_mut("content_scripts")
        .and_then(Value::as_array_mut)
        .ok_or(ManifestError::MissingContentScripts)?;

    let matches = Value::from(patterns.to_vec());
    for script in scripts.iter_mut() {
        if let Some(script) = script.as_object_mut() {
            script.insert("matches".to_string(), matches.clone());
        }
    }

    let mut out = serde_json::to_string_pretty(&manifest)?;
    out.push('\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_render_domain_table() {
        let source = render_domain_table(&domains(&["youtu.be", "youtube.com"]));
        assert_eq!(
            source,
            "// @generated by `tmy-cli domains`. Do not edit by hand.\n\
             \n\
             /// Recognized video-host domains, sorted.\n\
             pub static RECOGNIZED_DOMAINS: &[&str] = &[\n    \"youtu.be\",\n    \"youtube.com\",\n];\n"
        );
    }

    #[test]
    fn test_checked_in_table_is_sorted() {
        let table = tmy_core::domains::RECOGNIZED_DOMAINS;
        assert!(table.windows(2).all(|pair| pair[0] < pair[1]));
        let regenerated = render_domain_table(&table.iter().map(|d| d.to_string()).collect::<Vec<_>>());
        assert!(regenerated.contains("    \"youtube.com\",\n"));
    }

    #[test]
    fn test_build_match_patterns() {
        let patterns = build_match_patterns(&domains(&["youtube.com", "youtu.be", "youtube.com"]));
        assert_eq!(
            patterns,
            vec![
                "https://*.youtu.be/*",
                "https://*.youtube.com/*",
                "https://youtu.be/*",
                "https://youtube.com/*",
            ]
        );
    }

    #[test]
    fn test_update_manifest_rewrites_every_script() {
        let manifest = json!({
            "manifest_version": 3,
            "name": "TooMuchYouTube",
            "content_scripts": [
                {"matches": ["https://old/*"], "js": ["content.js"], "run_at": "document_idle"},
                {"matches": [], "js": ["other.js"]}
            ]
        })
        .to_string();
        let patterns = domains(&["https://youtube.com/*"]);

        let out = update_manifest(&manifest, &patterns).unwrap();
        assert!(out.ends_with("}\n"));
        let value: Value = serde_json::from_str(&out).unwrap();
        for script in value["content_scripts"].as_array().unwrap() {
            assert_eq!(script["matches"], json!(["https://youtube.com/*"]));
        }
        assert_eq!(value["content_scripts"][0]["run_at"], "document_idle");
        assert_eq!(value["name"], "TooMuchYouTube");
    }

    #[test]
    fn test_update_manifest_errors() {
        assert!(matches!(
            update_manifest(r#"{"name": "x"}"#, &[]),
            Err(ManifestError::MissingContentScripts)
        ));
        assert!(matches!(
            update_manifest(r#"{"content_scripts": {}}"#, &[]),
            Err(ManifestError::MissingContentScripts)
        ));
        assert!(matches!(update_manifest("not json", &[]), Err(ManifestError::InvalidJson(_))));
    }
}

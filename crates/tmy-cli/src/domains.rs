use std::fs;
use std::path::Path;
use std::time::Instant;

use tmy_compiler::{build_match_patterns, parse_domain_list, render_domain_table, update_manifest};

const USER_AGENT: &str = "TooMuchYouTube domain sync";

pub struct DomainsOptions {
    pub source: String,
    pub fetch: bool,
    pub url: String,
    pub table: String,
    pub list: String,
    pub manifest: Option<String>,
}

pub fn run_domains(opts: DomainsOptions) -> Result<(), String> {
    let start = Instant::now();

    if opts.fetch {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| format!("Failed to start tokio runtime: {}", e))?;
        let raw = runtime.block_on(fetch_text(&opts.url))?;
        write_file(&opts.source, &raw)?;
        println!("Fetched {} bytes from {}", raw.len(), opts.url);
    }

    // A previously generated plain list is an acceptable source.
    let input = if Path::new(&opts.source).exists() {
        &opts.source
    } else if Path::new(&opts.list).exists() {
        &opts.list
    } else {
        return Err("Missing domain list. Run with --fetch first.".to_string());
    };

    let raw = fs::read_to_string(input).map_err(|e| format!("Failed to read '{}': {}", input, e))?;
    let domains = parse_domain_list(&raw);
    if domains.is_empty() {
        return Err("No domains parsed from source.".to_string());
    }

    let mut list = domains.join("\n");
    list.push('\n');
    write_file(&opts.list, &list)?;
    write_file(&opts.table, &render_domain_table(&domains))?;

    if let Some(manifest_path) = &opts.manifest {
        let manifest = fs::read_to_string(manifest_path)
            .map_err(|e| format!("Failed to read '{}': {}", manifest_path, e))?;
        let patterns = build_match_patterns(&domains);
        let updated = update_manifest(&manifest, &patterns)
            .map_err(|e| format!("Failed to update '{}': {}", manifest_path, e))?;
        write_file(manifest_path, &updated)?;
        println!("  Patterns: {} -> '{}'", patterns.len(), manifest_path);
    }

    println!("Domains updated: {}", domains.len());
    println!("  Source:   '{}'", input);
    println!("  Table:    '{}'", opts.table);
    println!("  List:     '{}'", opts.list);
    println!("  Time:     {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    Ok(())
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| format!("Failed to build HTTP client: {}", e))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("Failed to fetch '{}': {}", url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("HTTP {}", status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| format!("Failed to read response body: {}", e))
}

fn write_file(path: &str, contents: &str) -> Result<(), String> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create '{}': {}", parent.display(), e))?;
    }
    fs::write(path, contents).map_err(|e| format!("Failed to write '{}': {}", path, e))
}

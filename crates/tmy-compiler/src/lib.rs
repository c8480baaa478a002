//! TooMuchYouTube Domain List Compiler
//!
//! This crate turns the upstream community domain list into the
//! recognized-host table compiled into `tmy-core` and the content-script
//! match patterns in the extension manifest.

pub mod parser;
pub mod builder;

pub use builder::{build_match_patterns, render_domain_table, update_manifest, ManifestError};
pub use parser::{is_allowed_domain, normalize_line, parse_domain_list};

/// Upstream source of the domain list.
pub const SOURCE_URL: &str =
    "https://raw.githubusercontent.com/v2fly/domain-list-community/refs/heads/master/data/youtube";

//! TooMuchYouTube CLI
//!
//! Developer tooling: regenerate the recognized-host table, check a rule
//! file against a page context, normalize a rule file.

mod domains;
mod rules;

use clap::{Parser, Subcommand};

use crate::domains::DomainsOptions;

#[derive(Parser)]
#[command(name = "tmy-cli")]
#[command(about = "TooMuchYouTube domain list and rule tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the recognized-host table from the community domain list
    Domains {
        /// Raw domain list source
        #[arg(short, long, default_value = "data/youtube-domains-source.txt")]
        source: String,

        /// Download the source list before parsing
        #[arg(long)]
        fetch: bool,

        /// Source list URL used with --fetch
        #[arg(long, default_value = tmy_compiler::SOURCE_URL)]
        url: String,

        /// Generated Rust table module
        #[arg(long, default_value = "crates/tmy-core/src/domain_table.rs")]
        table: String,

        /// Plain-text domain list, one per line
        #[arg(long, default_value = "data/youtube-domains.txt")]
        list: String,

        /// Extension manifest whose content script matches are rewritten
        #[arg(long)]
        manifest: Option<String>,
    },

    /// Show which rule, if any, applies to a page
    Check {
        /// Rule file (JSON array, or an object with a "rules" array)
        #[arg(short, long)]
        rules: String,

        /// Page URL
        #[arg(short, long)]
        url: String,

        /// Video title
        #[arg(short, long, default_value = "")]
        title: String,

        /// Channel candidate (repeatable)
        #[arg(short, long)]
        channel: Vec<String>,

        /// Print a JSON report
        #[arg(long)]
        json: bool,
    },

    /// Normalize a rule file the way the settings editor does on save
    Normalize {
        /// Input rule file
        #[arg(short, long)]
        input: String,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Domains {
            source,
            fetch,
            url,
            table,
            list,
            manifest,
        } => domains::run_domains(DomainsOptions {
            source,
            fetch,
            url,
            table,
            list,
            manifest,
        }),
        Commands::Check {
            rules,
            url,
            title,
            channel,
            json,
        } => rules::cmd_check(&rules, &url, &title, &channel, json),
        Commands::Normalize { input, output } => rules::cmd_normalize(&input, output.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

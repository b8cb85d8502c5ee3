// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so stdout stays clean for --json)
// 3. Ask for the start URL if it was not given
// 4. Run the crawl, stopping early on Ctrl-C
// 5. Print a summary and exit with a proper code
//    (0 = pages saved, 1 = nothing saved, 2 = error)
//
// Rust concepts used:
// - async/await: Because we need to make many network requests concurrently
// - Result<T, E>: For error handling (T = success type, E = error type)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - crawl settings and defaults
mod crawl; // src/crawl/ - the crawl itself
mod error; // src/error.rs - error types
mod extract; // src/extract/ - HTML to text, link discovery
mod fetch; // src/fetch/ - static fetch + browser fallback
mod policy; // src/policy/ - same-origin and robots.txt rules
mod store; // src/store/ - the JSON result file

use anyhow::{bail, Context, Result};
use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use std::io::{self, BufRead, Write};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

// The #[tokio::main] attribute transforms our async main into a real main function
// It creates a tokio runtime and runs our async code inside it
#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr. RUST_LOG overrides everything; otherwise `info`,
// or `debug` for this crate with --verbose.
fn init_logging(verbose: bool) {
    let default = if verbose { "info,site_scribe=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let start_url = match &cli.start_url {
        Some(url) => url.clone(),
        None => prompt_for_url()?,
    };
    let config = cli.crawl_config();

    println!("🔍 Crawling: {}", start_url);
    println!("📊 Max crawl depth: {}", config.max_depth);

    // Ctrl-C stops new pages from starting; pages in flight still get saved
    let cancel = CancellationToken::new();
    let on_ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n⏹️  Stopping: finishing pages already in flight...");
            on_ctrl_c.cancel();
        }
    });

    let summary = crawl::crawl_website(&start_url, config, cancel).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);

        // The file may hold pages from earlier runs too
        let document = store::ResultStore::new()
            .load(&summary.output)
            .await
            .context("could not read the output file back")?;
        println!("📚 Pages in file: {}", document.webpages.len());
    }

    if summary.persisted > 0 {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Asks for the start URL on stdin
fn prompt_for_url() -> Result<String> {
    print!("Please enter the starting URL: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("could not read the start URL from stdin")?;

    let url = line.trim().to_string();
    if url.is_empty() {
        bail!("no start URL given");
    }
    Ok(url)
}

fn print_summary(summary: &crawl::CrawlSummary) {
    println!();
    println!("📊 Summary:");
    println!("   ✅ Saved: {}", summary.persisted);
    println!("   🖥️  Rendered in browser: {}", summary.rendered);
    println!("   ⏭️  Skipped: {}", summary.skipped);
    println!("   ❌ Failed: {}", summary.failed);
    println!("   📋 Distinct URLs visited: {}", summary.visited);
    if summary.cancelled {
        println!("   ⏹️  Stopped early");
    }
    println!("💾 Output: {}", summary.output.display());
}

// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and merge them with the
//    optional JSON config file
// 2. Collect the ordered URL list (positional args and/or --input file)
// 3. Run the concurrent checker over the batch
// 4. Print per-URL results and aggregate metrics (table or JSON)
// 5. Exit with proper code (0 = all available, 1 = some unavailable,
//    2 = internal error)
//
// Ctrl-C requests cooperative cancellation: in-flight checks finish on
// their own, the rest of the batch is skipped, and results are printed
// for every URL either way.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - URL availability checking logic
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - JSON config file handling

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use checker::{CheckResult, MetricsSnapshot, UrlChecker};
use cli::Cli;
use config::AppConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns:
//   Ok(0) = every URL available
//   Ok(1) = at least one URL unavailable
//   Err   = unexpected error (exit code 2)
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    let mut app_config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    app_config.apply_cli(&cli);

    let urls = gather_urls(&cli, &app_config)?;
    if urls.is_empty() {
        bail!("no URLs to check; pass URLs as arguments or use --input <file>");
    }

    println!("🌐 Checking {} URL(s)...\n", urls.len());

    let checker = Arc::new(UrlChecker::new(app_config.checker_config()?)?);

    // Ctrl-C triggers cooperative cancellation; in-flight checks run to
    // their own terminal outcome before the batch winds down.
    {
        let checker = checker.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("Cancellation requested; finishing in-flight checks...");
                checker.cancel();
            }
        });
    }

    let results = if cli.json {
        checker.check_urls_bounded(&urls, app_config.threads).await
    } else {
        // Stream progress lines as results complete (completion order),
        // then print the ordered table at the end.
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let printer = tokio::spawn(async move {
            while let Some(result) = rx.recv().await {
                print_progress_line(&result);
            }
        });
        let results = checker
            .check_urls_with_progress(&urls, app_config.threads, tx)
            .await;
        let _ = printer.await;
        results
    };

    let metrics = checker.metrics();
    print_results(&results, &metrics, cli.json)?;

    let unavailable = results.iter().filter(|r| !r.is_available).count();
    if unavailable > 0 {
        Ok(1) // Exit code 1 = unavailable URLs found
    } else {
        Ok(0) // Exit code 0 = all good
    }
}

// Collects the ordered URL list: positional arguments first, then the
// input file (CLI --input or the config's input_file), one URL per line.
fn gather_urls(cli: &Cli, config: &AppConfig) -> Result<Vec<String>> {
    let mut urls = cli.urls.clone();

    if let Some(input_file) = &config.input_file {
        urls.extend(read_url_file(Path::new(input_file))?);
    }

    Ok(urls)
}

// Reads one URL per line, skipping blank lines and '#' comments
fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read URL file {}", path.display()))?;

    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect())
}

// One line per completed check, in completion order
fn print_progress_line(result: &CheckResult) {
    if result.is_available {
        println!(
            "✅ {} [{}] {:.2}s{}",
            result.url,
            result.status,
            result.response_time,
            if result.retry_count > 0 {
                format!(" ({} retries)", result.retry_count)
            } else {
                String::new()
            }
        );
    } else if let Some(error) = &result.error {
        println!("❌ {} - {}", result.url, error);
    } else {
        println!("❌ {} [{}]", result.url, result.status);
    }
}

// Prints the results either as a table or JSON
fn print_results(results: &[CheckResult], metrics: &MetricsSnapshot, json: bool) -> Result<()> {
    if json {
        let output = serde_json::json!({
            "results": results,
            "metrics": metrics,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_table(results, metrics);
    }
    Ok(())
}

// Prints results as a human-readable table in the terminal
fn print_table(results: &[CheckResult], metrics: &MetricsSnapshot) {
    println!();
    println!(
        "{:<60} {:<8} {:<9} {:<8} {:<30}",
        "URL", "STATUS", "TIME", "RETRIES", "ERROR"
    );
    println!("{}", "=".repeat(117));

    for result in results {
        let status_display = if result.status == 0 {
            "-".to_string()
        } else {
            result.status.to_string()
        };
        let error = result.error.as_deref().unwrap_or("");
        let url_display = truncate_url(&result.url);

        println!(
            "{:<60} {:<8} {:<9} {:<8} {:<30}",
            url_display,
            status_display,
            format!("{:.2}s", result.response_time),
            result.retry_count,
            error
        );
    }

    println!();

    // Print summary
    let available = results.iter().filter(|r| r.is_available).count();
    let unavailable = results.len() - available;

    println!("📊 Summary:");
    println!("   ✅ Available: {}", available);
    println!("   ❌ Unavailable: {}", unavailable);
    println!("   📋 Total: {}", results.len());
    println!();
    println!("📈 Metrics:");
    println!("   Attempts: {}", metrics.total_requests);
    println!("   Unique URLs: {}", metrics.unique_requests);
    println!("   Responses: {}", metrics.successful_requests);
    println!("   Failed URLs: {}", metrics.failed_requests);
    println!(
        "   Errors: {} timeout, {} network, {} ssl, {} other",
        metrics.timeout_errors, metrics.network_errors, metrics.ssl_errors, metrics.other_errors
    );
}

// Truncates a URL for table display, counting characters rather than bytes
// so multi-byte URLs (IDN hosts, non-ASCII paths) never split mid-character
fn truncate_url(url: &str) -> String {
    if url.chars().count() > 57 {
        let truncated: String = url.chars().take(57).collect();
        format!("{}...", truncated)
    } else {
        url.to_string()
    }
}

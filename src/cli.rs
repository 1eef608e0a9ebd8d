// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// clap is a popular Rust library for parsing command-line arguments.
// We use the "derive" API which lets us define the CLI structure using
// Rust structs and attributes (the #[...] things).
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

// This struct represents our entire CLI application
//
// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "url-sentinel",
    version = "0.1.0",
    about = "Check the availability of large batches of URLs",
    long_about = "url-sentinel checks the reachability of a batch of URLs concurrently, \
                  following redirects, retrying transient failures with backoff, and \
                  reporting per-URL results plus aggregate metrics. URLs come from \
                  positional arguments, a file (--input), or both."
)]
pub struct Cli {
    /// URLs to check (positional, in order)
    pub urls: Vec<String>,

    /// File with one URL per line; blank lines and '#' comments are skipped
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Path to a JSON config file (missing file falls back to defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Per-attempt timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Attempts per URL, first attempt included
    #[arg(long)]
    pub max_retries: Option<u32>,

    /// Redirects followed before a URL fails as a redirect loop
    #[arg(long)]
    pub max_redirects: Option<usize>,

    /// URLs checked in parallel; 0 = no ceiling (one task per URL)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output results and metrics in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

//! reqcat CLI - concatenate files in `require` order.
//!
//! Usage:
//!   reqcat -r <dir>               # order, concatenate, write output.txt
//!   reqcat build -o out.txt       # same, custom artifact path
//!   reqcat order [--json]         # print the order only
//!   reqcat check [--json]         # cycles and missing files
//!   reqcat deps <file> [--json]   # what a file needs / what needs it
//!   reqcat stats [--json]         # graph statistics
//!
//! Exit codes: 0 ok, 1 I/O or other failure, 2 cycle, 3 missing file,
//! 4 malformed require, 5 bad config.

use anyhow::{Context, Result};
use clap::Parser;
use dialoguer::Input;
use reqcat::cli::{log_level, root_source, Cli, Commands, RootSource};
use reqcat::config::DEFAULT_CONFIG_FILE;
use reqcat::graph::scan;
use reqcat::{bundle, check, resolve, CheckReport, Config, ReqcatError};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing::debug;

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level(cli.verbose))),
        )
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e
                .downcast_ref::<ReqcatError>()
                .map_or(1, ReqcatError::exit_code);
            std::process::exit(code);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let mut config = Config::load(&config_path)?;

    let interactive = std::io::stdin().is_terminal();
    let root = match root_source(cli.root.as_deref(), config.root.as_deref(), interactive) {
        RootSource::Given(root) => root,
        RootSource::Prompt => prompt_root()?,
        RootSource::CurrentDir => PathBuf::from("."),
    };
    debug!(root = %root.display(), config = %config_path.display(), "starting");

    match cli.command.unwrap_or_default() {
        Commands::Build { output, print } => {
            if let Some(output) = output {
                config.output = output;
            }
            let result = bundle(&root, &config)?;
            for file in &result.order {
                println!("{}", file);
            }
            if print {
                print!("{}", result.content);
            }
            eprintln!(
                "✓ Wrote {} ({} files)",
                result.output.display(),
                result.order.len()
            );
        }

        Commands::Order { json } => {
            let resolution = resolve(&root, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resolution.order)?);
            } else {
                for file in &resolution.order {
                    println!("{}", file);
                }
            }
        }

        Commands::Check { json } => {
            let report = check(&root, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
            return Ok(report.exit_code());
        }

        Commands::Deps { file, json } => {
            let graph = scan(&root, &config.scan_options())?.graph;
            let info = graph.dependency_info(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("{}", info.id);
                print_list("Requires", &info.direct);
                print_list("All dependencies", &info.transitive);
                print_list("Required by", &info.dependents);
            }
        }

        Commands::Stats { json } => {
            let scan = scan(&root, &config.scan_options())?;
            let stats = scan.graph.stats();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("Files:      {}", stats.file_count);
                println!("Referenced: {}", stats.referenced_count);
                println!("Requires:   {}", stats.edge_count);
                println!("Unresolved: {}", stats.unresolved_count);
                println!("Skipped:    {}", scan.stats.skipped);
            }
        }
    }

    Ok(0)
}

fn prompt_root() -> Result<PathBuf> {
    let input: String = Input::new()
        .with_prompt("Directory to scan")
        .default(".".to_string())
        .interact_text()
        .context("failed to read directory from prompt")?;
    Ok(PathBuf::from(input.trim()))
}

fn print_report(report: &CheckReport) {
    println!("Files:      {}", report.graph.file_count);
    println!("Requires:   {}", report.graph.edge_count);
    println!();

    match &report.cycle {
        Some(cycle) => {
            println!("✗ Cycle: {}", cycle);
            for group in &report.cycle_groups {
                println!("  [{}]", group.join(", "));
            }
        }
        None => println!("✓ No cycles"),
    }

    if report.missing.is_empty() {
        println!("✓ No missing files");
    } else {
        println!("✗ Missing files:");
        for id in &report.missing {
            println!("  {}", id);
        }
    }
}

fn print_list(title: &str, items: &[String]) {
    if items.is_empty() {
        println!("{}: (none)", title);
        return;
    }
    println!("{}:", title);
    for item in items {
        println!("  {}", item);
    }
}

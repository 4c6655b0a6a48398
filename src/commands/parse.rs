use crate::core::parser::FamilyRegistry;
use crate::core::session::{Session, TerminalStatus};
use crate::core::Config;
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::sync::Arc;

/// Output layout of `sargraph parse`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    fn from_arg(value: &str) -> Self {
        match value {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let input = matches
        .get_one::<String>("input")
        .context("Input argument is required")?;
    let format = matches
        .get_one::<String>("format")
        .map_or(OutputFormat::Text, |f| OutputFormat::from_arg(f));
    let only_stat = matches.get_one::<String>("stat").map(String::as_str);

    let mut config = Config::load()?;
    if let Some(date_format) = matches.get_one::<String>("date-format") {
        config.set_linux_date_format(date_format)?;
    }
    if let Some(schema) = matches.get_one::<String>("schema") {
        config.set_schema_overlay(PathBuf::from(schema));
    }

    let registry = config.schema_registry()?;
    let options = config.parser_options()?;
    let mut session = Session::new(Arc::new(registry), FamilyRegistry::with_defaults(), options);

    // Setup Ctrl+C handler
    let cancel = session.cancel_handle();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("{}", "Cancellation requested...".yellow().bold());
        eprintln!("{}", "Keeping what was parsed so far.".dimmed());
        cancel.cancel();
    })
    .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    let result = if input == "-" {
        log::debug!("Reading report from stdin");
        session.ingest(io::stdin().lock())
    } else {
        let file = File::open(input).with_context(|| format!("Failed to open {}", input))?;
        session.ingest(BufReader::new(file))
    };
    let report = result.with_context(|| format!("Failed to parse {}", input))?;

    match &report.status {
        TerminalStatus::StreamError(e) => {
            ui::warn(&format!("input ended early ({}), results are partial", e))
        }
        TerminalStatus::Cancelled => ui::info("Parsing cancelled, results are partial"),
        TerminalStatus::Completed => {}
    }

    match format {
        OutputFormat::Json => {
            let mut snapshot = session.snapshot();
            if let Some(stat) = only_stat {
                snapshot.retain_stat(stat);
            }
            let json = serde_json::to_string_pretty(&snapshot)
                .context("Failed to serialize parse results")?;
            println!("{}", json);
        }
        OutputFormat::Text => {
            ui::print_summary(&session, &report);
            ui::print_stats(&session, only_stat);
            println!();
        }
    }

    if let Some(stat) = only_stat {
        if session.handler(stat).is_none() {
            ui::warn(&format!("no data for stat '{}'", stat));
        }
    }

    Ok(())
}

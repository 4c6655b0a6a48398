use crate::core::datetime::LINUX_DATE_FORMATS;
use crate::core::Config;
use crate::ui;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

pub fn handle_config(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("set", sub_matches)) => handle_set(sub_matches),
        Some(("unset", sub_matches)) => handle_unset(sub_matches),
        _ => {
            println!("Use 'sargraph config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    let path = Config::get_config_path()?;

    println!("{}", "Configuration file:".white());
    println!("  {}", path.display().to_string().dimmed());
    println!();
    println!("  Linux date format: {}", config.linux_date_format.cyan().bold());
    match &config.schema_overlay {
        Some(overlay) => println!(
            "  Schema overlay:    {}",
            overlay.display().to_string().cyan().bold()
        ),
        None => println!("  Schema overlay:    {}", "none".dimmed()),
    }

    Ok(())
}

fn handle_set(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("date-format", sub_matches)) => set_date_format(sub_matches),
        Some(("schema", sub_matches)) => set_schema(sub_matches),
        _ => {
            println!("Use 'sargraph config set --help' for more information.");
            Ok(())
        }
    }
}

fn set_date_format(matches: &clap::ArgMatches) -> Result<()> {
    let format = matches
        .get_one::<String>("format")
        .context("Format argument is required")?;

    let mut config = Config::load()?;
    if let Err(e) = config.set_linux_date_format(format) {
        ui::error(&e.to_string());
        println!();
        println!("{}", "Accepted formats:".white());
        for known in LINUX_DATE_FORMATS {
            println!("  {}", known.cyan());
        }
        return Ok(());
    }
    config.save()?;

    ui::success(&format!("✓ Linux date format set to: {}", format));
    Ok(())
}

fn set_schema(matches: &clap::ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("path")
        .context("Path argument is required")?;

    let path_buf = Path::new(path);
    if !path_buf.exists() {
        println!(
            "{}",
            format!("⚠️  Warning: Path '{}' does not exist", path).yellow()
        );
    }
    let canonical_path = if path_buf.exists() {
        path_buf
            .canonicalize()
            .map_err(|e| anyhow::anyhow!("Failed to resolve path: {}", e))?
    } else {
        path_buf.to_path_buf()
    };

    let mut config = Config::load()?;
    config.set_schema_overlay(canonical_path.clone());
    // Reject a broken overlay before it is saved
    config.schema_registry()?;
    config.save()?;

    ui::success(&format!("✓ Schema overlay set to: {}", canonical_path.display()));
    Ok(())
}

fn handle_unset(matches: &clap::ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("schema", _)) => {
            let mut config = Config::load()?;
            config.clear_schema_overlay();
            config.save()?;
            ui::success("✓ Schema overlay removed");
            Ok(())
        }
        _ => {
            println!("Use 'sargraph config unset --help' for more information.");
            Ok(())
        }
    }
}

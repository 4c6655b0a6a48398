use crate::core::schema::{GraphKind, OsSchema};
use crate::core::Config;
use crate::ui;
use anyhow::{bail, Result};
use colored::Colorize;

pub fn execute(matches: &clap::ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let registry = config.schema_registry()?;

    match matches.get_one::<String>("os") {
        Some(os) => match registry.system(os) {
            Some(schema) => print_system(&schema),
            None => bail!(
                "No schema for '{}', known systems: {}",
                os,
                registry.system_names().join(", ")
            ),
        },
        None => {
            println!("{}", "Known systems:".white().bold());
            for name in registry.system_names() {
                if let Some(schema) = registry.system(name) {
                    println!(
                        "  {:<8} {} stats, {} graphs",
                        name.cyan().bold(),
                        schema.stats().len(),
                        schema.graphs().len()
                    );
                }
            }
            println!();
            ui::dimmed("Run 'sargraph schema <OS>' for details.");
        }
    }

    Ok(())
}

fn print_system(schema: &OsSchema) {
    println!("{}", format!("{} stats", schema.name()).bold().green());
    for stat in schema.stats() {
        let duplicate = if stat.duplicate_time {
            " (duplicate time)".yellow().to_string()
        } else {
            String::new()
        };
        println!(
            "  {:<14} -> {:<12} {}{}",
            stat.name.cyan(),
            stat.graph,
            stat.signature().dimmed(),
            duplicate
        );
    }

    println!();
    println!("{}", format!("{} graphs", schema.name()).bold().green());
    for graph in schema.graphs() {
        let kind = match graph.kind {
            GraphKind::Single => "single",
            GraphKind::Multi => "multi",
        };
        println!("  {:<14} {:<7} {}", graph.name.cyan(), kind, graph.title);
        for group in &graph.groups {
            let stacked = if group.stacked { " stacked" } else { "" };
            println!(
                "      {}{}: {}",
                group.title,
                stacked.dimmed(),
                group.columns.join(" ").dimmed()
            );
        }
    }
}

use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use sargraph::commands;

fn main() -> Result<()> {
    let matches = Command::new("sargraph")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Parse sar reports into per-stat time series")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Log parser decisions (stat changes, header refreshes)")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("trace")
                .long("trace")
                .help("Also log every rejected line")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a sar report and print what was collected")
                .arg(
                    Arg::new("input")
                        .help("Report file, or '-' for stdin")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::new("format")
                        .short('f')
                        .long("format")
                        .value_name("FORMAT")
                        .help("Output format")
                        .value_parser(["text", "json"])
                        .default_value("text"),
                )
                .arg(
                    Arg::new("date-format")
                        .long("date-format")
                        .value_name("FORMAT")
                        .help("Linux date format, e.g. \"MM/DD/YY 12:59:59 AM|PM\""),
                )
                .arg(
                    Arg::new("schema")
                        .long("schema")
                        .value_name("PATH")
                        .help("Extra schema document loaded on top of the bundled one"),
                )
                .arg(
                    Arg::new("stat")
                        .short('s')
                        .long("stat")
                        .value_name("GRAPH")
                        .help("Only show one graph (e.g. CPU, DEVICE)"),
                ),
        )
        .subcommand(
            Command::new("schema")
                .about("List known systems, or the stats and graphs of one")
                .arg(Arg::new("os").help("System name (Linux, HPUX, SunOS, AIX)").index(1)),
        )
        .subcommand(
            Command::new("config")
                .about("Show or change settings (use 'sargraph config --help' for subcommands)")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Show current settings"))
                .subcommand(
                    Command::new("set")
                        .about("Change a setting")
                        .subcommand_required(true)
                        .arg_required_else_help(true)
                        .subcommand(
                            Command::new("date-format")
                                .about("Date format used for Linux reports")
                                .arg(
                                    Arg::new("format")
                                        .help("\"Automatic Detection\" or e.g. \"DD/MM/YYYY 23:59:59\"")
                                        .required(true)
                                        .index(1),
                                ),
                        )
                        .subcommand(
                            Command::new("schema")
                                .about("Schema overlay document")
                                .arg(
                                    Arg::new("path")
                                        .help("Path to the schema JSON document")
                                        .required(true)
                                        .index(1),
                                ),
                        ),
                )
                .subcommand(
                    Command::new("unset")
                        .about("Reset a setting")
                        .subcommand_required(true)
                        .arg_required_else_help(true)
                        .subcommand(Command::new("schema").about("Stop loading a schema overlay")),
                ),
        )
        .subcommand(Command::new("version").about("Shows version information"))
        .get_matches();

    let level = if matches.get_flag("trace") {
        log::LevelFilter::Trace
    } else if matches.get_flag("debug") {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    sargraph::init_logging(level);

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("parse", sub_matches)) => commands::parse(sub_matches)?,
        Some(("schema", sub_matches)) => commands::schema(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::handle_config(sub_matches)?,
        Some(("version", _)) => commands::version()?,
        _ => {
            println!("Welcome to sargraph!");
            println!("Use 'sargraph --help' for more information.");
        }
    }

    Ok(())
}

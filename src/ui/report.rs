use crate::core::schema::GraphKind;
use crate::core::series::{SeriesAggregator, StatHandler};
use crate::core::session::{IngestReport, Session, TerminalStatus};
use colored::*;

use super::formatters::{format_axis_value, format_duration, format_timestamp};

fn print_section_header(title: &str) {
    println!("\n{}", title.bold().green());
    println!("{}", "-".repeat(title.len()));
}

/// Host summary, window and line counts
pub fn print_summary(session: &Session, report: &IngestReport) {
    println!("\n{}", "SAR REPORT".bold().bright_cyan());
    println!("{}", "=".repeat(80));

    for line in session.summary_text().lines() {
        match line.split_once(": ") {
            Some((label, value)) => println!("  {}: {}", label, value.white().bold()),
            None => println!("  {}", line),
        }
    }

    let window = session.window();
    if let (Some(start), Some(end)) = (window.start(), window.end()) {
        println!(
            "  Window: {} to {}",
            format_timestamp(&start).cyan(),
            format_timestamp(&end).cyan()
        );
    }
    if let Some(timestamps) = session.timestamps() {
        println!("  Samples: {}", timestamps.len());
    }

    let status = match &report.status {
        TerminalStatus::Completed => "completed".green(),
        TerminalStatus::Cancelled => "cancelled".yellow(),
        TerminalStatus::StreamError(e) => format!("stream error: {}", e).red(),
    };
    println!(
        "  Lines: {} read, {} consumed, {} skipped, {} rejected ({}, {})",
        report.lines_read,
        report.consumed,
        report.skipped,
        report.rejected.to_string().red(),
        status,
        format_duration(report.elapsed)
    );
}

/// Every bound stat in graph name order, or only `only` when given
pub fn print_stats(session: &Session, only: Option<&str>) {
    let Some(handlers) = session.handlers() else {
        return;
    };

    let mut graphs: Vec<&String> = handlers.keys().collect();
    graphs.sort();

    for graph in graphs {
        if only.map_or(false, |name| name != graph.as_str()) {
            continue;
        }
        if let Some(handler) = handlers.get(graph) {
            print_stat(graph, handler);
        }
    }
}

fn print_stat(graph: &str, handler: &StatHandler) {
    let kind = match handler.graph().kind {
        GraphKind::Single => "single",
        GraphKind::Multi => "multi",
    };
    print_section_header(&format!("{} [{}] {}", handler.title(), graph, kind));

    match handler {
        StatHandler::Single(agg) => print_columns(agg, "  "),
        StatHandler::Multi(dispatcher) => {
            for (key, agg) in dispatcher.instances() {
                println!("  {}", key.bold());
                print_columns(agg, "    ");
            }
        }
    }
}

fn print_columns(agg: &SeriesAggregator, indent: &str) {
    for series in agg.series() {
        let (base, factor) = agg.graph().axis_for(series.name());

        match series.value_range() {
            Some((min, max)) => println!(
                "{}{:<14} {:>6} pts  min {:>14}  max {:>14}",
                indent,
                series.name(),
                series.len(),
                format_axis_value(min, base, factor),
                format_axis_value(max, base, factor)
            ),
            None => println!("{}{:<14} {}", indent, series.name(), "no data".dimmed()),
        }
    }
}

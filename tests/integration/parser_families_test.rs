// Header and row handling per OS family, driven through the parser engine

use chrono::{NaiveDate, NaiveDateTime};
use sargraph::core::parser::aix::AixPolicy;
use sargraph::core::parser::hpux::HpuxPolicy;
use sargraph::core::parser::linux::LinuxPolicy;
use sargraph::core::parser::sunos::SunOsPolicy;
use sargraph::core::parser::{LineOutcome, OsPolicy, ParserEngine, ParserState};
use sargraph::core::schema::SchemaRegistry;

fn engine(policy: Box<dyn OsPolicy>, header: &str) -> ParserEngine {
    let registry = SchemaRegistry::bundled().unwrap();
    let schema = registry.system(policy.family()).unwrap();
    ParserEngine::new(policy, schema, registry.column_types(), header).unwrap()
}

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(h, mi, s)
        .unwrap()
}

#[test]
fn test_linux_headers_resolve_start_of_graph() {
    let row_24h = "09:10:01          6      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00    100.00";
    let row_12h = "09:10:01    AM      6      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00      0.00    100.00";
    let dates = ["03/28/16", "03/28/2016", "20160328", "2016-03-28"];
    let expected = at(2016, 3, 28, 9, 10, 1);

    for row in [row_24h, row_12h] {
        for date in dates {
            let header = format!(
                "Linux 3.10.0-327.el7.x86_64 (hostname.example.com)  {}  _x86_64_  (48 CPU)",
                date
            );
            let mut engine = engine(Box::new(LinuxPolicy::default()), &header);
            engine.process_line(row);
            assert_eq!(
                engine.window().start(),
                Some(expected),
                "header: {}, row: {}",
                header,
                row
            );
        }
    }
}

#[test]
fn test_hpux_header() {
    let mut engine = engine(
        Box::new(HpuxPolicy::default()),
        "HP-UX hostname.example.com B.11.31 U ia64    03/21/18",
    );
    engine.process_line("00:05:01    %usr    %sys    %wio   %idle");
    assert_eq!(engine.window().start(), Some(at(2018, 3, 21, 0, 5, 1)));
    assert_eq!(engine.host_info().os_version.as_deref(), Some("B.11.31"));
}

#[test]
fn test_solaris_header() {
    let mut engine = engine(
        Box::new(SunOsPolicy::default()),
        "SunOS hostname.example.com 5.11 11.3 sun4v    05/31/2018",
    );
    engine.process_line("00:05:01    %usr    %sys    %wio   %idle");
    assert_eq!(engine.window().start(), Some(at(2018, 5, 31, 0, 5, 1)));
}

#[test]
fn test_linux_per_cpu_block_with_twelve_hour_clock() {
    let mut engine = engine(
        Box::new(LinuxPolicy::default()),
        "Linux 3.10.0-327.el7.x86_64 (db01)  03/28/16  _x86_64_  (2 CPU)",
    );
    let lines = [
        "09:10:01 AM     CPU     %user     %nice   %system   %iowait    %steal     %idle",
        "09:20:01 AM     all      1.00      0.00      0.50      0.10      0.00     98.40",
        "09:20:01 AM       0      1.50      0.00      0.60      0.10      0.00     97.80",
        "09:20:01 AM       1      0.50      0.00      0.40      0.10      0.00     98.50",
        "09:30:01 AM     all      2.00      0.00      0.50      0.10      0.00     97.40",
        "09:30:01 AM       0      3.00      0.00      0.60      0.10      0.00     96.30",
        "09:30:01 AM       1      1.00      0.00      0.40      0.10      0.00     98.50",
    ];
    for line in lines {
        assert_eq!(engine.process_line(line), LineOutcome::Consumed, "{}", line);
    }
    assert_eq!(
        engine.process_line("Average:        all      1.50      0.00      0.50      0.10      0.00     97.90"),
        LineOutcome::Skipped
    );
    assert_eq!(engine.state(), ParserState::AverageSkip);

    let cpu = engine.handler("CPU").unwrap().as_multi().unwrap();
    let keys: Vec<&str> = cpu.keys().collect();
    assert_eq!(keys, vec!["0", "1", "all"]);

    let cpu0 = cpu.instance("0").unwrap();
    assert_eq!(cpu0.title(), "CPU 0");
    let user = cpu0.series_for("%user").unwrap();
    assert_eq!(user.get(&at(2016, 3, 28, 9, 30, 1)), Some(3.0));
    assert_eq!(user.len(), 2);

    // The header row's time counts towards the window
    assert_eq!(engine.window().start(), Some(at(2016, 3, 28, 9, 10, 1)));
    assert_eq!(engine.window().end(), Some(at(2016, 3, 28, 9, 30, 1)));
    assert_eq!(engine.timestamps().len(), 2);
}

#[test]
fn test_linux_skips_restarts_and_interrupt_tables() {
    let mut engine = engine(
        Box::new(LinuxPolicy::default()),
        "Linux 4.18.0 (web01)  2016-03-28  _x86_64_  (4 CPU)",
    );
    engine.process_line("00:00:01        proc/s   cswch/s");
    assert_eq!(engine.process_line("00:10:01          1.50    900.00"), LineOutcome::Consumed);
    assert_eq!(
        engine.process_line("00:12:00     LINUX RESTART      (4 CPU)"),
        LineOutcome::Skipped
    );
    assert_eq!(
        engine.process_line("00:20:01      CPU    i000/s    i001/s    i002/s"),
        LineOutcome::Skipped
    );
    // Rows of the interrupt table belong to it, not to the previous stat
    assert_eq!(
        engine.process_line("00:30:01        0      12.00      0.00      3.00"),
        LineOutcome::Skipped
    );

    let process = engine.handler("PROCESS").unwrap().as_single().unwrap();
    assert_eq!(process.series_for("cswch/s").unwrap().len(), 1);
}

#[test]
fn test_hpux_device_continuation_rows_merge_duplicates() {
    let mut engine = engine(
        Box::new(HpuxPolicy::default()),
        "HP-UX host B.11.31 U ia64 03/21/18",
    );
    let lines = [
        "00:00:01   device   %busy   avque   r+w/s  blks/s  avwait  avserv",
        "00:05:01   c0t6d0    1.20    0.50       2      24    0.00    5.10",
        "           c2t6d0    0.80    0.50       1      16    0.00    7.00",
        "00:10:01   c0t6d0    1.00    0.50       3      40    0.00    4.90",
        "           c0t6d0    3.00    0.50       1      10    0.00    5.10",
    ];
    for line in lines {
        assert_eq!(engine.process_line(line), LineOutcome::Consumed, "{}", line);
    }

    let disks = engine.handler("DEVICE").unwrap().as_multi().unwrap();
    assert_eq!(disks.keys().collect::<Vec<_>>(), vec!["c0t6d0", "c2t6d0"]);

    let t1 = at(2018, 3, 21, 0, 5, 1);
    let t2 = at(2018, 3, 21, 0, 10, 1);
    let c2 = disks.instance("c2t6d0").unwrap();
    assert_eq!(c2.series_for("blks/s").unwrap().get(&t1), Some(16.0));

    let c0 = disks.instance("c0t6d0").unwrap();
    // gauges are averaged, counters summed
    assert_eq!(c0.series_for("%busy").unwrap().get(&t2), Some(2.0));
    assert_eq!(c0.series_for("r+w/s").unwrap().get(&t2), Some(4.0));
    assert_eq!(c0.series_for("blks/s").unwrap().get(&t2), Some(50.0));
    assert_eq!(engine.timestamps().len(), 2);
}

#[test]
fn test_duplicate_rows_rejected_without_duplicate_time() {
    let mut engine = engine(
        Box::new(HpuxPolicy::default()),
        "HP-UX host B.11.31 U ia64 03/21/18",
    );
    engine.process_line("00:00:01    %usr    %sys    %wio   %idle");
    engine.process_line("00:05:01      10       8      29      53");
    engine.process_line("00:05:01      20       8      29      43");

    let cpu = engine.handler("CPUSTAT").unwrap().as_single().unwrap();
    let t = at(2018, 3, 21, 0, 5, 1);
    assert_eq!(cpu.series_for("%usr").unwrap().get(&t), Some(10.0));
    assert_eq!(engine.totals().rejected, 4);
}

#[test]
fn test_non_numeric_value_fails_only_its_column() {
    let mut engine = engine(
        Box::new(HpuxPolicy::default()),
        "HP-UX host B.11.31 U ia64 03/21/18",
    );
    engine.process_line("00:00:01    %usr    %sys    %wio   %idle");
    assert_eq!(
        engine.process_line("00:05:01      19     n/a      29      45"),
        LineOutcome::Consumed
    );

    let cpu = engine.handler("CPUSTAT").unwrap().as_single().unwrap();
    assert_eq!(cpu.series_for("%usr").unwrap().len(), 1);
    assert!(cpu.series_for("%sys").unwrap().is_empty());
    assert_eq!(engine.totals().failed, 1);
    assert_eq!(engine.totals().stored, 3);
}

#[test]
fn test_aix_configuration_banner_and_per_cpu_rows() {
    let mut engine = engine(
        Box::new(AixPolicy::default()),
        "AIX lpar01 1 7 00F84C0C4C00    06/12/17",
    );
    assert_eq!(
        engine.process_line("System configuration: lcpu=2 mode=Capped"),
        LineOutcome::Skipped
    );
    let lines = [
        "00:00:00     cpu    %usr    %sys    %wio   %idle",
        "01:00:00       0       5       3       0      92",
        "               1       4       2       0      94",
        "               -       5       3       0      92",
    ];
    for line in lines {
        assert_eq!(engine.process_line(line), LineOutcome::Consumed, "{}", line);
    }

    let cpus = engine.handler("CPUS").unwrap().as_multi().unwrap();
    assert_eq!(cpus.len(), 3);
    let cpu1 = cpus.instance("1").unwrap();
    assert_eq!(
        cpu1.series_for("%idle").unwrap().get(&at(2017, 6, 12, 1, 0, 0)),
        Some(94.0)
    );
    assert_eq!(engine.host_info().os_version.as_deref(), Some("1.7"));
}

#[test]
fn test_header_refresh_moves_to_next_day() {
    let mut engine = engine(
        Box::new(HpuxPolicy::default()),
        "HP-UX host B.11.31 U ia64 03/21/18",
    );
    engine.process_line("00:00:01    %usr    %sys    %wio   %idle");
    engine.process_line("23:55:01      19       8      29      45");
    engine.process_line("Average       19       8      29      45");
    assert_eq!(engine.state(), ParserState::AverageSkip);

    assert_eq!(
        engine.process_line("HP-UX host B.11.31 U ia64 03/22/18"),
        LineOutcome::Consumed
    );
    assert_eq!(engine.state(), ParserState::Active);
    engine.process_line("00:00:01    %usr    %sys    %wio   %idle");
    engine.process_line("00:05:01      20       7      28      45");

    assert_eq!(engine.handlers().len(), 1);
    assert_eq!(engine.window().start(), Some(at(2018, 3, 21, 0, 0, 1)));
    assert_eq!(engine.window().end(), Some(at(2018, 3, 22, 0, 5, 1)));
    assert_eq!(
        engine.dates().date_range_text().as_deref(),
        Some("03/21/18 to 03/22/18")
    );
}

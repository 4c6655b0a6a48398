// End-to-end ingestion through the session

use chrono::{NaiveDate, NaiveDateTime};
use sargraph::core::parser::ParserOptions;
use sargraph::core::session::{Session, TerminalStatus};
use sargraph::SarError;
use std::io::Cursor;

fn session() -> Session {
    Session::with_defaults(ParserOptions::default()).unwrap()
}

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2018, 3, 21)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

#[test]
fn test_single_row_window() {
    let mut session = session();
    session
        .ingest_lines([
            "HP-UX host B.11.31 U ia64 03/21/18",
            "00:05:01 19 8 29 45",
        ])
        .unwrap();

    let window = session.window();
    assert_eq!(window.start(), Some(at(0, 5, 1)));
    assert_eq!(window.end(), Some(at(0, 5, 1)));
}

#[test]
fn test_identical_headers_bind_once() {
    let mut session = session();
    let report = session
        .ingest_lines([
            "HP-UX host B.11.31 U ia64 03/21/18",
            "00:00:01    %usr    %sys    %wio   %idle",
            "00:05:01      19       8      29      45",
            "HP-UX renamed B.11.31 U ia64 03/21/18",
            "00:00:01    %usr    %sys    %wio   %idle",
            "00:10:01      20       7      28      45",
        ])
        .unwrap();

    assert_eq!(report.rejected, 0);
    let handlers = session.handlers().unwrap();
    assert_eq!(handlers.len(), 1);
    let cpu = session.handler("CPUSTAT").unwrap().as_single().unwrap();
    assert_eq!(cpu.series_for("%idle").unwrap().len(), 2);
    // The refresh still updates metadata
    assert_eq!(
        session.host_info().unwrap().hostname.as_deref(),
        Some("renamed")
    );
}

#[test]
fn test_out_of_order_rows_widen_window() {
    let mut session = session();
    session
        .ingest_lines([
            "HP-UX host B.11.31 U ia64 03/21/18",
            "00:10:01    %usr    %sys    %wio   %idle",
            "00:15:01      19       8      29      45",
            "00:05:01      20       7      28      45",
            "00:10:01      21       6      27      46",
        ])
        .unwrap();

    let window = session.window();
    assert_eq!(window.start(), Some(at(0, 5, 1)));
    assert_eq!(window.end(), Some(at(0, 15, 1)));

    let ordered: Vec<NaiveDateTime> = session.timestamps().unwrap().iter().copied().collect();
    assert_eq!(ordered, vec![at(0, 5, 1), at(0, 10, 1), at(0, 15, 1)]);
}

#[test]
fn test_unrecognized_source_produces_nothing() {
    let mut session = session();
    let result = session.ingest_lines([
        "Windows Performance Monitor export",
        "00:05:01 19 8 29 45",
    ]);

    match result {
        Err(SarError::UnrecognizedSource(token)) => assert_eq!(token, "Windows"),
        other => panic!("expected UnrecognizedSource, got {:?}", other),
    }
    assert!(session.handlers().is_none());
    assert!(session.snapshot().stats.is_empty());
    assert!(!session.is_parsing());
}

#[test]
fn test_malformed_first_header_is_fatal() {
    let mut session = session();
    let result = session.ingest_lines(["HP-UX host B.11.31 U ia64 21.03.2018"]);
    assert!(matches!(result, Err(SarError::MalformedHeader(_))));
}

#[test]
fn test_blank_lines_ignored_and_lines_counted() {
    let log = "\nHP-UX host B.11.31 U ia64 03/21/18\n\n00:00:01 %usr %sys %wio %idle\n   \n00:05:01 19 8 29 45\nbogus line\n";
    let mut session = session();
    let report = session.ingest(Cursor::new(log)).unwrap();

    assert_eq!(report.status, TerminalStatus::Completed);
    assert_eq!(report.lines_read, 7);
    assert_eq!(report.consumed, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.rejected, 1);
}

#[test]
fn test_second_ingest_appends() {
    let mut session = session();
    session
        .ingest_lines([
            "HP-UX host B.11.31 U ia64 03/21/18",
            "00:00:01    %usr    %sys    %wio   %idle",
            "00:05:01      19       8      29      45",
        ])
        .unwrap();
    session
        .ingest_lines(["00:10:01      20       7      28      45"])
        .unwrap();

    assert_eq!(session.timestamps().unwrap().len(), 2);
    assert_eq!(session.window().end(), Some(at(0, 10, 1)));
}

#[test]
fn test_snapshot_serializes_to_json() {
    let mut session = session();
    session
        .ingest_lines([
            "HP-UX host B.11.31 U ia64 03/21/18",
            "00:00:01   device   %busy   avque   r+w/s  blks/s  avwait  avserv",
            "00:05:01   c0t6d0    1.20    0.50       2      24    0.00    5.10",
            "00:00:01    %usr    %sys    %wio   %idle",
            "00:05:01      19       8      29      45",
        ])
        .unwrap();

    let mut snapshot = session.snapshot();
    assert_eq!(snapshot.family.as_deref(), Some("HPUX"));
    assert_eq!(snapshot.date_range.as_deref(), Some("03/21/18"));
    let graphs: Vec<&str> = snapshot.stats.iter().map(|s| s.graph.as_str()).collect();
    assert_eq!(graphs, vec!["CPUSTAT", "DEVICE"]);

    let device = snapshot.stat("DEVICE").unwrap();
    assert_eq!(device.instances[0].key.as_deref(), Some("c0t6d0"));
    assert_eq!(device.instances[0].title, "Disk c0t6d0");
    assert_eq!(device.sample_count(), 6);

    snapshot.retain_stat("CPUSTAT");
    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["family"], "HPUX");
    assert_eq!(json["host"]["hostname"], "host");
    assert_eq!(json["timestamps"][0], "2018-03-21T00:05:01");
    assert_eq!(json["stats"].as_array().unwrap().len(), 1);
    assert_eq!(json["stats"][0]["kind"], "single");
    assert_eq!(json["stats"][0]["instances"][0]["series"][0]["column"], "%usr");
    assert_eq!(
        json["stats"][0]["instances"][0]["series"][0]["points"][0][1],
        19.0
    );
}

#[test]
fn test_summary_text_lists_host_and_dates() {
    let mut session = session();
    session
        .ingest_lines([
            "Linux 3.10.0-327.el7.x86_64 (hostname.example.com)  03/28/16  _x86_64_  (48 CPU)",
            "09:10:01        proc/s   cswch/s",
            "09:20:01          1.50    900.00",
        ])
        .unwrap();

    let summary = session.summary_text();
    assert_eq!(
        summary,
        "OS Type: Linux\n\
         Kernel Release: 3.10.0-327.el7.x86_64\n\
         CPU Type: x86_64\n\
         Hostname: hostname.example.com\n\
         Number of CPU: 48\n\
         Start of SAR: 03/28/16\n\
         End of SAR: 03/28/16\n"
    );
}

#[test]
fn test_invalid_utf8_rejects_only_that_line() {
    let mut log = Vec::new();
    log.extend_from_slice(b"Linux 3.10.0 (web01)  03/28/16  _x86_64_  (2 CPU)\n");
    log.extend_from_slice(b"00:00:01  CPU  %user  %nice  %system  %iowait  %steal  %idle\n");
    log.extend_from_slice(b"00:05:01  all   1.00   0.00     0.50     0.10    0.00  98.40\n");
    log.extend_from_slice(b"\xe9t\xe9 \xff\xfe garbage\n");
    log.extend_from_slice(b"00:10:01  all   2.00   0.00     0.50     0.10    0.00  97.40\n");
    log.extend_from_slice(b"00:15:01  all   3.00   0.00     0.50     0.10    0.00  96.40\n");

    let mut session = session();
    let report = session.ingest(Cursor::new(log)).unwrap();

    assert_eq!(report.status, TerminalStatus::Completed);
    assert_eq!(report.lines_read, 6);
    assert_eq!(report.rejected, 1);
    assert_eq!(session.timestamps().unwrap().len(), 3);

    let cpu = session.handler("CPU").unwrap().as_multi().unwrap();
    let all = cpu.instance("all").unwrap();
    assert_eq!(all.series_for("%user").unwrap().len(), 3);
}

#[test]
fn test_crlf_line_endings() {
    let log = b"HP-UX host B.11.31 U ia64 03/21/18\r\n\
\r\n\
00:00:01    %usr    %sys    %wio   %idle\r\n\
00:05:01      19       8      29      45\r\n\
00:10:01      20       7      28      46\r\n";

    let mut session = session();
    let report = session.ingest(Cursor::new(&log[..])).unwrap();

    assert_eq!(report.status, TerminalStatus::Completed);
    assert_eq!(report.lines_read, 5);
    assert_eq!(report.consumed, 4);
    assert_eq!(report.rejected, 0);
    assert_eq!(session.date_range_text().as_deref(), Some("03/21/18"));

    let cpu = session.handler("CPUSTAT").unwrap().as_single().unwrap();
    let idle = cpu.series_for("%idle").unwrap();
    assert_eq!(idle.get(&at(0, 5, 1)), Some(45.0));
    assert_eq!(idle.get(&at(0, 10, 1)), Some(46.0));
}

#[test]
fn test_last_line_without_newline() {
    let log = "HP-UX host B.11.31 U ia64 03/21/18\n\
00:00:01    %usr    %sys    %wio   %idle\n\
00:05:01      19       8      29      45";

    let mut session = session();
    let report = session.ingest(Cursor::new(log)).unwrap();

    assert_eq!(report.lines_read, 3);
    assert_eq!(session.timestamps().unwrap().len(), 1);
}

// Cooperative cancellation of an ingestion job

use sargraph::core::parser::ParserOptions;
use sargraph::core::session::{Session, TerminalStatus};

const LOG: &str = "HP-UX host B.11.31 U ia64 03/21/18
00:00:01    %usr    %sys    %wio   %idle
00:05:01      19       8      29      45
00:10:01      20       7      28      45
00:15:01      21       6      27      46
00:20:01      22       5      26      47";

#[test]
fn test_cancel_stops_between_lines_and_keeps_results() {
    let mut session = Session::with_defaults(ParserOptions::default()).unwrap();
    let handle = session.cancel_handle();

    // Cancel while the fourth line is being handed over
    let lines = LOG.lines().enumerate().map(move |(i, line)| {
        if i == 3 {
            handle.cancel();
        }
        line
    });
    let report = session.ingest_lines(lines).unwrap();

    assert_eq!(report.status, TerminalStatus::Cancelled);
    assert_eq!(report.lines_read, 3);
    assert_eq!(session.timestamps().unwrap().len(), 1);
    assert!(!session.is_parsing());
}

#[test]
fn test_cancel_flag_stays_set_until_reset() {
    let mut session = Session::with_defaults(ParserOptions::default()).unwrap();
    session.cancel();

    let report = session.ingest_lines(LOG.lines()).unwrap();
    assert_eq!(report.status, TerminalStatus::Cancelled);
    assert_eq!(report.lines_read, 0);
    assert!(session.handlers().is_none());

    session.cancel_handle().reset();
    let report = session.ingest_lines(LOG.lines()).unwrap();
    assert_eq!(report.status, TerminalStatus::Completed);
    assert_eq!(session.timestamps().unwrap().len(), 4);
}

#[test]
fn test_cancel_from_another_thread() {
    use std::thread;

    let mut session = Session::with_defaults(ParserOptions::default()).unwrap();
    let handle = session.cancel_handle();

    thread::spawn(move || handle.cancel()).join().unwrap();

    let report = session.ingest_lines(LOG.lines()).unwrap();
    assert_eq!(report.status, TerminalStatus::Cancelled);
}

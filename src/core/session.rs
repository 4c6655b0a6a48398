use crate::core::datetime::TimeWindow;
use crate::core::parser::{
    FamilyRegistry, HostInfo, LineOutcome, ParserEngine, ParserOptions, ParserState,
};
use crate::core::schema::SchemaRegistry;
use crate::core::series::StatHandler;
use crate::core::snapshot::SessionSnapshot;
use crate::error::{Result, SarError};
use chrono::NaiveDateTime;
use std::collections::{BTreeSet, HashMap};
use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Cooperative cancellation flag shared with whoever may stop the job,
/// plus a read-only view of whether a job is running
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
    parsing: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Clear the flag so a later job can run
    pub fn reset(&self) {
        self.cancelled.store(false, Ordering::SeqCst);
    }

    pub fn is_parsing(&self) -> bool {
        self.parsing.load(Ordering::SeqCst)
    }
}

/// Line iterator over raw bytes, `\n` or `\r\n` terminated
struct LossyLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> LossyLines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.ends_with(b"\n") {
                    self.buf.pop();
                    if self.buf.ends_with(b"\r") {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// How an ingestion job ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    Completed,
    Cancelled,
    /// The line source failed; everything read before it is kept
    StreamError(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub status: TerminalStatus,
    pub lines_read: usize,
    pub consumed: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub elapsed: Duration,
}

impl IngestReport {
    fn new() -> Self {
        Self {
            status: TerminalStatus::Completed,
            lines_read: 0,
            consumed: 0,
            skipped: 0,
            rejected: 0,
            elapsed: Duration::ZERO,
        }
    }

    fn count(&mut self, outcome: LineOutcome) {
        match outcome {
            LineOutcome::Consumed => self.consumed += 1,
            LineOutcome::Skipped => self.skipped += 1,
            LineOutcome::Rejected => self.rejected += 1,
        }
    }
}

/// One parse job's worth of state: the bound parser and everything it built
#[derive(Debug)]
pub struct Session {
    schema: Arc<SchemaRegistry>,
    families: FamilyRegistry,
    options: ParserOptions,
    engine: Option<ParserEngine>,
    cancel: CancelHandle,
}

impl Session {
    pub fn new(schema: Arc<SchemaRegistry>, families: FamilyRegistry, options: ParserOptions) -> Self {
        Self {
            schema,
            families,
            options,
            engine: None,
            cancel: CancelHandle::default(),
        }
    }

    /// Session over the bundled schema and the built-in families
    pub fn with_defaults(options: ParserOptions) -> Result<Self> {
        Ok(Self::new(
            Arc::new(SchemaRegistry::bundled()?),
            FamilyRegistry::with_defaults(),
            options,
        ))
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_parsing(&self) -> bool {
        self.cancel.is_parsing()
    }

    /// Ingest every line of a reader.
    ///
    /// Bytes that are not valid UTF-8 are replaced, so a damaged line is
    /// rejected on its own instead of ending the job.
    pub fn ingest<R: BufRead>(&mut self, reader: R) -> Result<IngestReport> {
        self.run(LossyLines::new(reader))
    }

    /// Ingest already split lines
    pub fn ingest_lines<I, S>(&mut self, lines: I) -> Result<IngestReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run(lines.into_iter().map(|l| Ok(l.as_ref().to_string())))
    }

    fn run<I>(&mut self, lines: I) -> Result<IngestReport>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let parsing = Arc::clone(&self.cancel.parsing);
        if parsing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SarError::AlreadyParsing);
        }

        let result = self.read_lines(lines);
        parsing.store(false, Ordering::SeqCst);
        result
    }

    fn read_lines<I>(&mut self, lines: I) -> Result<IngestReport>
    where
        I: Iterator<Item = io::Result<String>>,
    {
        let start = Instant::now();
        let mut report = IngestReport::new();

        for line in lines {
            if self.cancel.is_cancelled() {
                log::info!("Parsing cancelled after {} lines", report.lines_read);
                report.status = TerminalStatus::Cancelled;
                break;
            }

            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    log::warn!("Line source failed: {}", e);
                    report.status = TerminalStatus::StreamError(e.to_string());
                    break;
                }
            };
            report.lines_read += 1;

            if line.trim().is_empty() {
                continue;
            }

            let outcome = match self.engine.as_mut() {
                Some(engine) => engine.process_line(&line),
                None => {
                    self.engine = Some(self.bind_engine(&line)?);
                    LineOutcome::Consumed
                }
            };
            report.count(outcome);
        }

        report.elapsed = start.elapsed();
        let samples = self.engine.as_ref().map_or(0, |e| e.totals().stored);
        log::debug!(
            "Parse finished in {:?}: {} lines, {} consumed, {} skipped, {} rejected, {} samples",
            report.elapsed,
            report.lines_read,
            report.consumed,
            report.skipped,
            report.rejected,
            samples
        );
        Ok(report)
    }

    /// Pick the family from the first token of the first line
    fn bind_engine(&self, line: &str) -> Result<ParserEngine> {
        let token = line.split_whitespace().next().unwrap_or_default();
        let factory = self
            .families
            .lookup(token)
            .ok_or_else(|| SarError::unrecognized_source(token))?;
        let policy = factory(&self.options);

        let schema = self.schema.system(policy.family()).ok_or_else(|| {
            SarError::schema(format!("no schema for OS '{}'", policy.family()))
        })?;

        log::info!("Parsing {} report", policy.family());
        ParserEngine::new(policy, schema, self.schema.column_types(), line)
    }

    /// Family of the bound parser
    pub fn family(&self) -> Option<&'static str> {
        self.engine.as_ref().map(ParserEngine::family)
    }

    pub fn state(&self) -> ParserState {
        self.engine
            .as_ref()
            .map_or(ParserState::AwaitingHeader, ParserEngine::state)
    }

    pub fn engine(&self) -> Option<&ParserEngine> {
        self.engine.as_ref()
    }

    pub fn host_info(&self) -> Option<&HostInfo> {
        self.engine.as_ref().map(ParserEngine::host_info)
    }

    pub fn timestamps(&self) -> Option<&BTreeSet<NaiveDateTime>> {
        self.engine.as_ref().map(ParserEngine::timestamps)
    }

    pub fn window(&self) -> TimeWindow {
        self.engine
            .as_ref()
            .map_or_else(TimeWindow::default, ParserEngine::window)
    }

    pub fn date_range_text(&self) -> Option<String> {
        self.engine.as_ref()?.dates().date_range_text()
    }

    pub fn handler(&self, graph: &str) -> Option<&StatHandler> {
        self.engine.as_ref()?.handler(graph)
    }

    pub fn handlers(&self) -> Option<&HashMap<String, StatHandler>> {
        self.engine.as_ref().map(ParserEngine::handlers)
    }

    /// Host description followed by the report dates
    pub fn summary_text(&self) -> String {
        let Some(engine) = self.engine.as_ref() else {
            return String::new();
        };

        let mut text = String::new();
        for (label, value) in engine.host_info().fields() {
            text.push_str(&format!("{}: {}\n", label, value));
        }
        let dates = engine.dates();
        if let Some(start) = dates.start_date_text() {
            text.push_str(&format!("Start of SAR: {}\n", start));
        }
        if let Some(end) = dates.end_date_text() {
            text.push_str(&format!("End of SAR: {}\n", end));
        }
        text
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.engine
            .as_ref()
            .map(SessionSnapshot::capture)
            .unwrap_or_default()
    }
}

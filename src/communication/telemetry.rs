//! Telemetry Sink
//!
//! One CSV row per tracking cycle, preceded by a header row when the loop
//! starts. Sinks take already-rendered lines and must not block; the
//! firmware sink hands lines to a USB writer task through a bounded
//! channel and reports `QueueFull` instead of waiting.

use core::fmt;
use sightline_core::telemetry::{TelemetryRecord, TELEMETRY_HEADER, TELEMETRY_LINE_CAPACITY};

/// Telemetry error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum TelemetryError {
    /// Row did not fit the line buffer
    Overflow,
    /// Writer is behind; the row was dropped
    QueueFull,
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Overflow => write!(f, "telemetry line overflow"),
            TelemetryError::QueueFull => write!(f, "telemetry queue full"),
        }
    }
}

/// Destination for telemetry rows
pub trait TelemetrySink {
    /// Queue one line; the sink appends the terminator
    fn emit_line(&mut self, line: &str) -> Result<(), TelemetryError>;

    fn emit_header(&mut self) -> Result<(), TelemetryError> {
        self.emit_line(TELEMETRY_HEADER)
    }

    fn emit(&mut self, record: &TelemetryRecord<'_>) -> Result<(), TelemetryError> {
        let line = record.render().map_err(|_| TelemetryError::Overflow)?;
        self.emit_line(&line)
    }
}

impl<T: TelemetrySink> TelemetrySink for &mut T {
    fn emit_line(&mut self, line: &str) -> Result<(), TelemetryError> {
        (**self).emit_line(line)
    }
}

/// Lines the mock sink keeps
#[cfg(any(test, feature = "mock"))]
pub const MOCK_TELEMETRY_LINES: usize = 64;

/// Capturing sink for tests
#[cfg(any(test, feature = "mock"))]
#[derive(Default)]
pub struct MockTelemetry {
    lines: heapless::Vec<heapless::String<TELEMETRY_LINE_CAPACITY>, MOCK_TELEMETRY_LINES>,
    dropped: u32,
}

#[cfg(any(test, feature = "mock"))]
impl MockTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[heapless::String<TELEMETRY_LINE_CAPACITY>] {
        &self.lines
    }

    /// Most recent row, if any
    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(|l| l.as_str())
    }

    /// Rows rejected because the mock was full
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

#[cfg(any(test, feature = "mock"))]
impl TelemetrySink for MockTelemetry {
    fn emit_line(&mut self, line: &str) -> Result<(), TelemetryError> {
        let stored = heapless::String::try_from(line).map_err(|_| TelemetryError::Overflow)?;
        self.lines.push(stored).map_err(|_| {
            self.dropped += 1;
            TelemetryError::QueueFull
        })
    }
}

//! Line Link Abstraction
//!
//! Byte link that carries the target protocol between the device and one
//! remote client. The control loop polls it once per cycle and must never
//! stall on it, so the contract is built around a non-blocking
//! `available()` check.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  Tracking loop (LineAssembler)│
//! └──────────┬───────────────────┘
//!            │ LineLink
//!            ▼
//! ┌─────────────────┬──────────────┐
//! │  TcpLineLink    │   MockLink   │
//! │  (pico2_w)      │   (tests)    │
//! └─────────────────┴──────────────┘
//! ```
//!
//! # Sessions
//!
//! Every accepted client gets a new session number. A change of session
//! tells the reader to drop any half-assembled line from the previous
//! client. Session 0 means no client has connected yet.

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::MockLink;

use core::fmt;

/// Transport for the line protocol
///
/// - `available()` never waits and reports bytes that `read()` can return
///   immediately.
/// - `read()` may return fewer bytes than requested, and `Ok(0)` when
///   nothing is buffered.
/// - `write_line()` appends the line terminator itself.
#[allow(async_fn_in_trait)]
pub trait LineLink {
    fn available(&self) -> usize;

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError>;

    async fn write_line(&mut self, line: &str) -> Result<(), LinkError>;

    /// Identifier of the current client connection
    fn session(&self) -> u32;
}

/// Link error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum LinkError {
    /// No client is connected
    Disconnected,
    /// Transfer failed or the outbound queue is full
    Io,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::Disconnected => write!(f, "link disconnected"),
            LinkError::Io => write!(f, "link I/O error"),
        }
    }
}

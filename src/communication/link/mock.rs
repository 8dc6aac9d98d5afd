//! Mock line link for testing
//!
//! Inbound bytes are fed by the test, outbound lines are captured for
//! inspection. Connecting bumps the session number like a new TCP client.

use super::{LineLink, LinkError};
use heapless::{Deque, String, Vec};
use sightline_core::protocol::REPLY_CAPACITY;

/// Inbound bytes the mock can buffer
pub const MOCK_INBOUND_CAPACITY: usize = 1024;

/// Outbound lines the mock keeps
pub const MOCK_OUTBOUND_LINES: usize = 16;

pub struct MockLink {
    inbound: Deque<u8, MOCK_INBOUND_CAPACITY>,
    outbound: Vec<String<REPLY_CAPACITY>, MOCK_OUTBOUND_LINES>,
    session: u32,
    connected: bool,
    write_error: Option<LinkError>,
    read_error: Option<LinkError>,
}

impl Default for MockLink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLink {
    /// Link with no client yet
    pub fn new() -> Self {
        Self {
            inbound: Deque::new(),
            outbound: Vec::new(),
            session: 0,
            connected: false,
            write_error: None,
            read_error: None,
        }
    }

    /// Link with one client already connected
    pub fn connected() -> Self {
        let mut link = Self::new();
        link.connect();
        link
    }

    /// Accept a new client; pending inbound bytes belong to the old one
    pub fn connect(&mut self) {
        self.inbound.clear();
        self.session = self.session.wrapping_add(1);
        self.connected = true;
    }

    pub fn disconnect(&mut self) {
        self.inbound.clear();
        self.connected = false;
    }

    /// Queue bytes as if the client had sent them
    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            let _ = self.inbound.push_back(b);
        }
    }

    pub fn set_write_error(&mut self, error: Option<LinkError>) {
        self.write_error = error;
    }

    pub fn set_read_error(&mut self, error: Option<LinkError>) {
        self.read_error = error;
    }

    /// Lines written so far
    pub fn sent(&self) -> &[String<REPLY_CAPACITY>] {
        &self.outbound
    }
}

impl LineLink for MockLink {
    fn available(&self) -> usize {
        self.inbound.len()
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, LinkError> {
        if let Some(error) = self.read_error {
            return Err(error);
        }

        let mut n = 0;
        while n < buf.len() {
            match self.inbound.pop_front() {
                Some(b) => {
                    buf[n] = b;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    async fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        if let Some(error) = self.write_error {
            return Err(error);
        }
        if !self.connected {
            return Err(LinkError::Disconnected);
        }

        let mut stored = String::new();
        stored.push_str(line).map_err(|_| LinkError::Io)?;
        self.outbound.push(stored).map_err(|_| LinkError::Io)
    }

    fn session(&self) -> u32 {
        self.session
    }
}

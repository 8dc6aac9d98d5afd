//! Line assembly
//!
//! Bytes arrive from the link in arbitrary chunks. The assembler collects
//! them until `\n`, drops `\r`, and keeps at most [`MAX_LINE_LEN`] bytes per
//! line: anything past the cap is discarded up to the next newline and the
//! truncated line is still handed on for parsing.

use crate::config::MAX_LINE_LEN;
use heapless::Vec;

/// One complete inbound line (terminator removed)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    bytes: Vec<u8, MAX_LINE_LEN>,
    truncated: bool,
}

impl Line {
    /// Line text.
    ///
    /// Invalid UTF-8 (including a multi-byte character split by the length
    /// cap) ends the text at the last valid character.
    pub fn as_str(&self) -> &str {
        match core::str::from_utf8(&self.bytes) {
            Ok(text) => text,
            Err(e) => {
                // valid_up_to() marks a prefix that is valid UTF-8
                core::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or("")
            }
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether bytes past [`MAX_LINE_LEN`] were dropped
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

/// Accumulates bytes into [`Line`]s
#[derive(Debug, Default)]
pub struct LineAssembler {
    current: Line,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte; returns the line when `byte` terminates it
    pub fn push(&mut self, byte: u8) -> Option<Line> {
        match byte {
            b'\r' => None,
            b'\n' => Some(core::mem::take(&mut self.current)),
            _ => {
                if self.current.bytes.push(byte).is_err() {
                    self.current.truncated = true;
                }
                None
            }
        }
    }

    /// Drop any partially received line
    pub fn clear(&mut self) {
        self.current = Line::default();
    }

    /// Bytes buffered for the line in progress
    pub fn pending(&self) -> usize {
        self.current.bytes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(assembler: &mut LineAssembler, data: &[u8]) -> Option<Line> {
        let mut last = None;
        for &b in data {
            if let Some(line) = assembler.push(b) {
                last = Some(line);
            }
        }
        last
    }

    #[test]
    fn assembles_line_and_strips_cr() {
        let mut assembler = LineAssembler::new();
        let line = feed(&mut assembler, b"MSG:a;X:1;Y:2\r\n").unwrap();
        assert_eq!(line.as_str(), "MSG:a;X:1;Y:2");
        assert!(!line.is_truncated());
        assert_eq!(assembler.pending(), 0);
    }

    #[test]
    fn partial_line_waits_for_newline() {
        let mut assembler = LineAssembler::new();
        assert!(feed(&mut assembler, b"MSG:a;X").is_none());
        assert_eq!(assembler.pending(), 7);

        let line = feed(&mut assembler, b":1;Y:2\n").unwrap();
        assert_eq!(line.as_str(), "MSG:a;X:1;Y:2");
    }

    #[test]
    fn overlong_line_is_truncated_not_dropped() {
        let mut assembler = LineAssembler::new();
        for _ in 0..MAX_LINE_LEN + 40 {
            assert!(assembler.push(b'z').is_none());
        }
        let line = assembler.push(b'\n').unwrap();
        assert_eq!(line.as_bytes().len(), MAX_LINE_LEN);
        assert!(line.is_truncated());

        // next line starts clean
        let next = feed(&mut assembler, b"ok\n").unwrap();
        assert_eq!(next.as_str(), "ok");
        assert!(!next.is_truncated());
    }

    #[test]
    fn split_multibyte_char_is_dropped() {
        let mut assembler = LineAssembler::new();
        for _ in 0..MAX_LINE_LEN - 1 {
            assembler.push(b'a');
        }
        // 'é' = C3 A9; only the first byte fits
        feed(&mut assembler, "é".as_bytes());
        let line = assembler.push(b'\n').unwrap();
        assert_eq!(line.as_str().len(), MAX_LINE_LEN - 1);
    }

    #[test]
    fn empty_line() {
        let mut assembler = LineAssembler::new();
        let line = assembler.push(b'\n').unwrap();
        assert_eq!(line.as_str(), "");
    }

    #[test]
    fn clear_discards_partial_line() {
        let mut assembler = LineAssembler::new();
        feed(&mut assembler, b"garbage");
        assembler.clear();
        let line = feed(&mut assembler, b"MSG:x;X:1;Y:1\n").unwrap();
        assert_eq!(line.as_str(), "MSG:x;X:1;Y:1");
    }
}

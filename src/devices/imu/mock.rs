//! Mock fusion source for testing
//!
//! Plays back a script of FIFO outcomes and records how often the caller
//! asked for a resync.
//!
//! ## Usage
//!
//! ```ignore
//! use sightline::devices::imu::MockFusion;
//!
//! let mut source = MockFusion::new();
//! source.push_quat(RawQuaternion::new(0, 0, 0));
//! source.push_error(FusionError::Fault(FaultKind::Overflow));
//! ```

use crate::devices::traits::{DmpHeader, DmpPacket, FusionError, FusionSource};
use sightline_core::orientation::RawQuaternion;

/// Scripted outcomes the mock can hold
pub const MOCK_SCRIPT_CAPACITY: usize = 64;

/// Mock fusion source
///
/// Returns scripted results in order, then `NoData` once the script is
/// exhausted. A resync drops whatever is still queued, mirroring a FIFO
/// reset on the real part, unless `keep_on_resync` is set.
pub struct MockFusion {
    script: heapless::Deque<Result<DmpPacket, FusionError>, MOCK_SCRIPT_CAPACITY>,
    resyncs: u32,
    reads: u32,
    keep_on_resync: bool,
}

impl Default for MockFusion {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFusion {
    pub fn new() -> Self {
        Self {
            script: heapless::Deque::new(),
            resyncs: 0,
            reads: 0,
            keep_on_resync: false,
        }
    }

    /// Mock that yields each quaternion once, in order
    pub fn with_quats(quats: &[RawQuaternion]) -> Self {
        let mut mock = Self::new();
        for q in quats.iter().take(MOCK_SCRIPT_CAPACITY) {
            mock.push_quat(*q);
        }
        mock
    }

    pub fn push_quat(&mut self, q: RawQuaternion) {
        let _ = self.script.push_back(Ok(DmpPacket::quat6(q)));
    }

    /// Queue a frame whose header lacks the Quat6 bit
    pub fn push_without_orientation(&mut self, header: DmpHeader) {
        let _ = self
            .script
            .push_back(Ok(DmpPacket::without_orientation(header)));
    }

    pub fn push_error(&mut self, error: FusionError) {
        let _ = self.script.push_back(Err(error));
    }

    /// Keep queued entries across resyncs
    pub fn keep_on_resync(&mut self, keep: bool) {
        self.keep_on_resync = keep;
    }

    pub fn resync_count(&self) -> u32 {
        self.resyncs
    }

    pub fn read_count(&self) -> u32 {
        self.reads
    }

    pub fn pending(&self) -> usize {
        self.script.len()
    }
}

impl FusionSource for MockFusion {
    async fn read_packet(&mut self) -> Result<DmpPacket, FusionError> {
        self.reads += 1;
        self.script.pop_front().unwrap_or(Err(FusionError::NoData))
    }

    async fn resync(&mut self) {
        self.resyncs += 1;
        if !self.keep_on_resync {
            self.script.clear();
        }
    }
}

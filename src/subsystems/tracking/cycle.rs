//! Tracking loop
//!
//! One call to [`TrackingLoop::run_cycle`] is one pass of the device's main
//! loop:
//!
//! 1. drain the fusion source, conditioning every sample
//! 2. skip the rest of the cycle if nothing was decoded
//! 3. swap roll and pitch into the device frame and quantize
//! 4. take at most one complete line from the link and reply to it
//! 5. evaluate the alignment verdict and emit one telemetry row
//!
//! Link and telemetry failures are logged and never end the loop.

use super::drain::drain_latest;
use crate::communication::link::LineLink;
use crate::communication::telemetry::TelemetrySink;
use crate::devices::traits::FusionSource;
use sightline_core::config::SAMPLE_DRAIN_BUDGET_US;
use sightline_core::orientation::EulerAngles;
use sightline_core::protocol::{Line, LineAssembler};
use sightline_core::quantize::QuantizedAttitude;
use sightline_core::target::AlignmentVerdict;
use sightline_core::tracker::TrackerState;
use sightline_core::traits::TimeSource;

/// Summary of a completed cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleReport {
    /// Device-frame angles (after the roll/pitch swap)
    pub angles: EulerAngles,
    pub quantized: QuantizedAttitude,
    pub verdict: AlignmentVerdict,
    /// Samples decoded during the drain
    pub decoded: u32,
    /// A protocol line was answered this cycle
    pub replied: bool,
}

/// Control loop state and collaborators
pub struct TrackingLoop<F, L, K, C>
where
    F: FusionSource,
    L: LineLink,
    K: TelemetrySink,
    C: TimeSource,
{
    source: F,
    link: L,
    telemetry: K,
    clock: C,
    state: TrackerState,
    assembler: LineAssembler,
    session: u32,
}

impl<F, L, K, C> TrackingLoop<F, L, K, C>
where
    F: FusionSource,
    L: LineLink,
    K: TelemetrySink,
    C: TimeSource,
{
    pub fn new(source: F, link: L, telemetry: K, clock: C) -> Self {
        let session = link.session();
        Self {
            source,
            link,
            telemetry,
            clock,
            state: TrackerState::new(),
            assembler: LineAssembler::new(),
            session,
        }
    }

    /// Emit the telemetry header; call once before the first cycle
    pub fn start(&mut self) {
        if let Err(e) = self.telemetry.emit_header() {
            crate::log_warn!("Telemetry header dropped: {}", e);
        }
    }

    pub async fn run_cycle(&mut self) -> Option<CycleReport> {
        let drain = drain_latest(
            &mut self.source,
            &mut self.state,
            &self.clock,
            SAMPLE_DRAIN_BUDGET_US,
        )
        .await;
        let latest = drain.latest?;

        let angles = latest.swap_roll_pitch();
        let quantized = QuantizedAttitude::from_euler(&angles);

        let replied = self.service_link().await;

        let verdict = self.state.evaluate(&quantized);
        let record = self
            .state
            .telemetry(self.clock.now_ms(), angles, quantized, &verdict);
        if let Err(e) = self.telemetry.emit(&record) {
            crate::log_warn!("Telemetry row dropped: {}", e);
        }

        Some(CycleReport {
            angles,
            quantized,
            verdict,
            decoded: drain.decoded,
            replied,
        })
    }

    /// Feed buffered link bytes to the assembler until one line completes
    async fn service_link(&mut self) -> bool {
        let session = self.link.session();
        if session != self.session {
            if self.assembler.pending() > 0 {
                crate::log_debug!("Dropping partial line from previous client");
            }
            self.assembler.clear();
            self.session = session;
        }

        let mut byte = [0u8; 1];
        while self.link.available() > 0 {
            match self.link.read(&mut byte).await {
                Ok(0) => break,
                Ok(_) => {
                    if let Some(line) = self.assembler.push(byte[0]) {
                        return self.answer(&line).await;
                    }
                }
                Err(e) => {
                    crate::log_warn!("Link read failed: {}", e);
                    break;
                }
            }
        }
        false
    }

    /// Reply to one completed line; blank lines get no reply
    async fn answer(&mut self, line: &Line) -> bool {
        let text = line.as_str().trim();
        if text.is_empty() {
            return false;
        }
        if line.is_truncated() {
            crate::log_warn!("Inbound line truncated to {} bytes", line.as_bytes().len());
        }

        let reply = self.state.handle_line(text);
        match reply.render() {
            Ok(out) => {
                if let Err(e) = self.link.write_line(&out).await {
                    crate::log_warn!("Reply not sent: {}", e);
                }
            }
            Err(_) => crate::log_warn!("Reply did not fit the buffer"),
        }
        true
    }

    pub fn state(&self) -> &TrackerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut TrackerState {
        &mut self.state
    }

    pub fn source_mut(&mut self) -> &mut F {
        &mut self.source
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn telemetry(&self) -> &K {
        &self.telemetry
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::communication::link::{LinkError, MockLink};
    use crate::communication::telemetry::MockTelemetry;
    use crate::devices::imu::MockFusion;
    use sightline_core::orientation::RawQuaternion;
    use sightline_core::telemetry::TELEMETRY_HEADER;
    use sightline_core::traits::MockTime;

    type TestLoop = TrackingLoop<MockFusion, MockLink, MockTelemetry, MockTime>;

    fn tracking() -> TestLoop {
        let mut tracking = TrackingLoop::new(
            MockFusion::new(),
            MockLink::connected(),
            MockTelemetry::new(),
            MockTime::new(),
        );
        tracking.start();
        tracking
    }

    fn level() -> RawQuaternion {
        RawQuaternion::default()
    }

    #[tokio::test]
    async fn start_emits_header() {
        let tracking = tracking();
        assert_eq!(tracking.telemetry().lines().len(), 1);
        assert_eq!(tracking.telemetry().last(), Some(TELEMETRY_HEADER));
    }

    #[tokio::test]
    async fn no_sample_skips_cycle() {
        let mut tracking = tracking();
        tracking.link_mut().feed(b"MSG:a;X:1;Y:1\n");

        assert_eq!(tracking.run_cycle().await, None);
        // line stays buffered for a later cycle, no telemetry row
        assert!(tracking.link().sent().is_empty());
        assert_eq!(tracking.link().available(), 14);
        assert_eq!(tracking.telemetry().lines().len(), 1);
    }

    #[tokio::test]
    async fn cycle_emits_one_row() {
        let mut tracking = tracking();
        tracking.source_mut().push_quat(level());
        tracking.clock().set(42_000);

        let report = tracking.run_cycle().await.unwrap();
        assert_eq!(report.decoded, 1);
        assert!(!report.replied);
        assert!(report.verdict.on_target);
        assert_eq!(
            tracking.telemetry().last(),
            Some("42,0.00,0.00,0.00,0,0,0,0,0,0,1,-,0.0.0.0")
        );
    }

    #[tokio::test]
    async fn answers_one_line_per_cycle() {
        let mut tracking = tracking();
        tracking
            .link_mut()
            .feed(b"MSG:a;X:10;Y:0\nMSG:b;X:;Y:0\n");

        tracking.source_mut().push_quat(level());
        let report = tracking.run_cycle().await.unwrap();
        assert!(report.replied);
        assert_eq!(tracking.link().sent().len(), 1);
        assert_eq!(tracking.link().sent()[0].as_str(), "ACK;MSG:a;X:10.00;Y:0.00");
        assert!(!report.verdict.on_target);

        tracking.source_mut().push_quat(level());
        tracking.run_cycle().await.unwrap();
        assert_eq!(tracking.link().sent().len(), 2);
        assert_eq!(tracking.link().sent()[1].as_str(), "ERR;BAD_PACKET;MSG:b;X:;Y:0");
        // rejected packet left the target alone
        assert_eq!(tracking.state().target().spawn_pitch_q(), 10);
    }

    #[tokio::test]
    async fn overlong_padded_line_is_still_answered() {
        let mut tracking = tracking();
        let mut line = [b' '; 13 + 300 + 1];
        line[..13].copy_from_slice(b"MSG:a;X:1;Y:2");
        line[313] = b'\n';
        tracking.link_mut().feed(&line);

        tracking.source_mut().push_quat(level());
        assert!(tracking.run_cycle().await.unwrap().replied);
        assert_eq!(tracking.link().sent().len(), 1);
        assert_eq!(tracking.link().sent()[0].as_str(), "ACK;MSG:a;X:1.00;Y:2.00");
        assert_eq!(tracking.link().available(), 0);
        assert_eq!(tracking.state().target().spawn_yaw_q(), 2);
    }

    #[tokio::test]
    async fn line_split_across_cycles() {
        let mut tracking = tracking();
        tracking.link_mut().feed(b"MSG:hi;X:");
        tracking.source_mut().push_quat(level());
        assert!(!tracking.run_cycle().await.unwrap().replied);

        tracking.link_mut().feed(b"2;Y:4\r\n");
        tracking.source_mut().push_quat(level());
        assert!(tracking.run_cycle().await.unwrap().replied);
        assert_eq!(tracking.link().sent()[0].as_str(), "ACK;MSG:hi;X:2.00;Y:4.00");
        assert_eq!(tracking.state().last_msg(), "hi");
    }

    #[tokio::test]
    async fn blank_line_gets_no_reply() {
        let mut tracking = tracking();
        tracking.link_mut().feed(b"   \r\n");
        tracking.source_mut().push_quat(level());

        let report = tracking.run_cycle().await.unwrap();
        assert!(!report.replied);
        assert!(tracking.link().sent().is_empty());
    }

    #[tokio::test]
    async fn new_session_discards_partial_line() {
        let mut tracking = tracking();
        tracking.link_mut().feed(b"MSG:stale;X:1");
        tracking.source_mut().push_quat(level());
        tracking.run_cycle().await.unwrap();

        // the reconnect would drop unread bytes, but these were already consumed
        tracking.link_mut().connect();
        tracking.link_mut().feed(b";Y:1\n");
        tracking.source_mut().push_quat(level());
        let report = tracking.run_cycle().await.unwrap();

        assert!(report.replied);
        assert_eq!(tracking.link().sent()[0].as_str(), "ERR;BAD_PACKET;;Y:1");
        assert!(!tracking.state().target().is_set());
    }

    #[tokio::test]
    async fn reply_failure_does_not_stop_the_loop() {
        let mut tracking = tracking();
        tracking.link_mut().set_write_error(Some(LinkError::Io));
        tracking.link_mut().feed(b"MSG:x;X:4;Y:4\n");
        tracking.source_mut().push_quat(level());

        let report = tracking.run_cycle().await.unwrap();
        assert!(report.replied);
        // state is updated even though the ACK was lost
        assert!(tracking.state().target().is_set());
        assert_eq!(tracking.telemetry().lines().len(), 2);
    }

    #[tokio::test]
    async fn angles_are_reported_in_device_frame() {
        let mut tracking = tracking();
        tracking.source_mut().push_quat(level());
        tracking.run_cycle().await.unwrap();

        // 20° about the sensor x axis (native roll) shows up as pitch
        let half = 10.0f32.to_radians();
        let q = RawQuaternion::new((half.sin() * 1_073_741_824.0) as i32, 0, 0);
        tracking.source_mut().push_quat(q);
        let report = tracking.run_cycle().await.unwrap();

        assert!((report.angles.pitch - 20.0).abs() < 0.05);
        assert!(report.angles.roll.abs() < 0.05);
        assert_eq!(report.quantized.pitch, 20);
    }
}

//! End-to-end tracking loop scenarios on host mocks
//!
//! Run with `cargo test --features mock --test tracking_loop`.

use sightline::communication::link::{LineLink, MockLink};
use sightline::communication::telemetry::MockTelemetry;
use sightline::devices::imu::MockFusion;
use sightline::devices::traits::{FaultKind, FusionError};
use sightline::subsystems::tracking::TrackingLoop;
use sightline_core::orientation::RawQuaternion;
use sightline_core::telemetry::TELEMETRY_HEADER;
use sightline_core::traits::MockTime;

type HostLoop = TrackingLoop<MockFusion, MockLink, MockTelemetry, MockTime>;

/// Device rolled 20° about its sensor x axis (sin(10°) in Q30)
const ROLLED_20: RawQuaternion = RawQuaternion::new(186_453_311, 0, 0);

fn host_loop() -> HostLoop {
    let mut tracker = TrackingLoop::new(
        MockFusion::new(),
        MockLink::connected(),
        MockTelemetry::new(),
        MockTime::new(),
    );
    tracker.state_mut().set_ip([192, 168, 4, 7]);
    tracker.start();
    tracker
}

#[tokio::test]
async fn target_then_alignment() {
    let mut tracker = host_loop();
    assert_eq!(tracker.telemetry().lines()[0].as_str(), TELEMETRY_HEADER);

    // baseline sample defines zero
    tracker.source_mut().push_quat(RawQuaternion::default());
    tracker.clock().set(1_000);
    let report = tracker.run_cycle().await.unwrap();
    assert_eq!(report.quantized.pitch, 0);
    assert!(tracker.state().zero_reference().is_calibrated());
    assert_eq!(
        tracker.telemetry().last(),
        Some("1,0.00,0.00,0.00,0,0,0,0,0,0,1,-,192.168.4.7")
    );

    // client sets a target; the device is still level
    tracker.link_mut().feed(b"MSG:go;X:4;Y:-5\n");
    tracker.source_mut().push_quat(RawQuaternion::default());
    tracker.clock().set(2_000);
    let report = tracker.run_cycle().await.unwrap();
    assert!(report.replied);
    assert_eq!(tracker.link().sent()[0].as_str(), "ACK;MSG:go;X:4.00;Y:-5.00");
    assert_eq!(tracker.state().target().spawn_pitch_q(), 4);
    assert_eq!(tracker.state().target().spawn_yaw_q(), -6);
    assert_eq!(report.verdict.pitch_rel_q, -4);
    assert_eq!(report.verdict.yaw_rel_q, 6);
    assert!(report.verdict.on_target);
    assert_eq!(
        tracker.telemetry().last(),
        Some("2,0.00,0.00,0.00,0,0,0,1,4,-6,1,go,192.168.4.7")
    );

    // sensor roll becomes device pitch and leaves the tolerance band
    tracker.source_mut().push_quat(ROLLED_20);
    tracker.clock().set(3_000);
    let report = tracker.run_cycle().await.unwrap();
    assert_eq!(report.quantized.roll, 0);
    assert_eq!(report.quantized.pitch, 20);
    assert_eq!(report.verdict.pitch_rel_q, 16);
    assert!(!report.verdict.on_target);
    assert_eq!(
        tracker.telemetry().last(),
        Some("3,0.00,20.00,0.00,0,20,0,1,4,-6,0,go,192.168.4.7")
    );
}

#[tokio::test]
async fn latest_sample_wins_within_a_cycle() {
    let mut tracker = host_loop();
    tracker.source_mut().push_quat(RawQuaternion::default());
    tracker.run_cycle().await.unwrap();

    tracker.source_mut().push_quat(RawQuaternion::default());
    tracker.source_mut().push_quat(ROLLED_20);
    let report = tracker.run_cycle().await.unwrap();
    assert_eq!(report.decoded, 2);
    assert_eq!(report.quantized.pitch, 20);
    // one header plus one row per cycle
    assert_eq!(tracker.telemetry().lines().len(), 3);
}

#[tokio::test]
async fn fault_resyncs_and_keeps_earlier_sample() {
    let mut tracker = host_loop();
    tracker.source_mut().push_quat(RawQuaternion::default());
    tracker
        .source_mut()
        .push_error(FusionError::Fault(FaultKind::Overflow));
    tracker.source_mut().push_quat(ROLLED_20);

    let report = tracker.run_cycle().await.unwrap();
    assert_eq!(report.decoded, 1);
    assert_eq!(report.quantized.pitch, 0);
    assert_eq!(tracker.source_mut().resync_count(), 1);
    assert_eq!(tracker.source_mut().pending(), 0);

    // nothing left after the resync
    assert_eq!(tracker.run_cycle().await, None);
}

#[tokio::test]
async fn reconnect_and_bad_packets() {
    let mut tracker = host_loop();
    tracker.link_mut().feed(b"MSG:one;X:1;Y:1\n");
    tracker.source_mut().push_quat(RawQuaternion::default());
    tracker.run_cycle().await.unwrap();

    tracker.link_mut().disconnect();
    tracker.link_mut().connect();
    assert_eq!(tracker.link().available(), 0);

    tracker.link_mut().feed(b"Y:1;X:2;MSG:two\n");
    tracker.source_mut().push_quat(RawQuaternion::default());
    tracker.run_cycle().await.unwrap();

    let sent = tracker.link().sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].as_str(), "ACK;MSG:one;X:1.00;Y:1.00");
    assert_eq!(sent[1].as_str(), "ERR;BAD_PACKET;Y:1;X:2;MSG:two");
    // rejected packet leaves the previous target and message in place
    assert_eq!(tracker.state().last_msg(), "one");
    assert_eq!(tracker.state().target().spawn_pitch_q(), 2);
}

//! Sample drain loop
//!
//! The DMP keeps producing frames whether or not we read them, so each
//! cycle empties the FIFO and keeps only the newest sample. Every decoded
//! sample still goes through calibration and the yaw hold so the hold sees
//! the complete pitch history. The drain stops on the first decode error
//! or once the time budget is spent, whichever comes first.

use super::decoder::{read_orientation, DecodeError};
use crate::devices::traits::FusionSource;
use sightline_core::orientation::EulerAngles;
use sightline_core::tracker::TrackerState;
use sightline_core::traits::TimeSource;

/// Outcome of one drain pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrainReport {
    /// Conditioned newest sample, in native sensor axes
    pub latest: Option<EulerAngles>,
    /// Samples decoded this pass
    pub decoded: u32,
    /// Stopped because the budget ran out
    pub budget_exhausted: bool,
    /// Error that ended the pass, if any
    pub stopped_by: Option<DecodeError>,
}

/// Drain the source, conditioning each sample, within `budget_us`
///
/// The budget is checked after each successful decode, so at least one
/// sample is taken whenever one is available.
pub async fn drain_latest<F, T>(
    source: &mut F,
    state: &mut TrackerState,
    clock: &T,
    budget_us: u64,
) -> DrainReport
where
    F: FusionSource,
    T: TimeSource,
{
    let started = clock.now_us();
    let mut report = DrainReport {
        latest: None,
        decoded: 0,
        budget_exhausted: false,
        stopped_by: None,
    };

    loop {
        match read_orientation(source).await {
            Ok(raw) => {
                report.latest = Some(state.condition(raw));
                report.decoded += 1;
                if clock.elapsed_since(started) > budget_us {
                    report.budget_exhausted = true;
                    break;
                }
            }
            Err(e) => {
                report.stopped_by = Some(e);
                break;
            }
        }
    }

    report
}

//! Tracking Loop Task
//!
//! Embassy task that runs the tracking cycle back to back. Each cycle drains
//! the IMU FIFO, services the command link, and emits one telemetry row; the
//! task yields between cycles so the network and USB tasks can progress.
//!
//! ## Integration
//!
//! This task requires:
//! - A started ICM-20948 with its DMP running
//! - `tcp_server_task` spawned on the same executor
//! - `usb_telemetry_task` spawned on the same executor

use super::{EmbassyTime, TcpLineLink, UsbTelemetry};
use crate::devices::imu::Icm20948Dmp;
use crate::subsystems::tracking::TrackingLoop;
use embassy_rp::i2c::{Async, I2c};
use embassy_rp::peripherals::I2C0;

/// Concrete tracking loop wired to the Pico 2 W peripherals
pub type FirmwareLoop =
    TrackingLoop<Icm20948Dmp<I2c<'static, I2C0, Async>>, TcpLineLink, UsbTelemetry, EmbassyTime>;

/// Run the tracking loop forever
///
/// # Example
///
/// ```rust,ignore
/// let mut tracker = TrackingLoop::new(imu, TcpLineLink, UsbTelemetry, EmbassyTime);
/// tracker.start();
/// spawner.spawn(tracking_task(tracker).unwrap());
/// ```
#[embassy_executor::task]
pub async fn tracking_task(mut tracker: FirmwareLoop) -> ! {
    crate::log_info!("Tracking loop task started");
    crate::log_info!("  IMU address: {:#x}", tracker.source_mut().address());

    let mut cycles: u32 = 0;
    let mut dropped: u32 = 0;
    let mut healthy = true;
    loop {
        if tracker.run_cycle().await.is_some() {
            cycles = cycles.wrapping_add(1);
            if cycles % 1000 == 0 {
                crate::log_debug!("Tracking cycles: {}", cycles);
                let now_dropped = tracker.telemetry().dropped();
                if now_dropped != dropped {
                    crate::log_warn!(
                        "Telemetry rows dropped: {} ({} total)",
                        now_dropped.wrapping_sub(dropped),
                        now_dropped
                    );
                    dropped = now_dropped;
                }
            }
        }

        let now_healthy = tracker.source_mut().is_healthy();
        if now_healthy != healthy {
            if now_healthy {
                crate::log_info!("IMU recovered");
            } else {
                crate::log_warn!("IMU reporting repeated errors");
            }
            healthy = now_healthy;
        }

        embassy_futures::yield_now().await;
    }
}

//! USB CDC-ACM telemetry
//!
//! Rows are queued by [`UsbTelemetry`] and written by a dedicated task so
//! the control loop never waits on the host. While no terminal is attached
//! rows are discarded; the header is replayed on every new connection so a
//! late-attaching host still sees the column names.

use crate::communication::telemetry::{TelemetryError, TelemetrySink};
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use embassy_rp::peripherals::USB;
use embassy_rp::usb::Driver;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_usb::class::cdc_acm::CdcAcmClass;
use embassy_usb::driver::EndpointError;
use heapless::String;
use sightline_core::telemetry::{TELEMETRY_HEADER, TELEMETRY_LINE_CAPACITY};

/// USB full-speed bulk packet size
pub const USB_PACKET_SIZE: usize = 64;

/// Rows buffered ahead of the USB writer
const QUEUE_DEPTH: usize = 8;

static ROWS: Channel<CriticalSectionRawMutex, String<TELEMETRY_LINE_CAPACITY>, QUEUE_DEPTH> =
    Channel::new();
static HOST_ATTACHED: AtomicBool = AtomicBool::new(false);
static DROPPED: AtomicU32 = AtomicU32::new(0);

/// Control-loop handle onto the USB writer task
#[derive(Clone, Copy, Default)]
pub struct UsbTelemetry;

impl UsbTelemetry {
    /// Rows dropped because the writer fell behind
    pub fn dropped(&self) -> u32 {
        DROPPED.load(Ordering::Relaxed)
    }
}

impl TelemetrySink for UsbTelemetry {
    fn emit_line(&mut self, line: &str) -> Result<(), TelemetryError> {
        if !HOST_ATTACHED.load(Ordering::Acquire) {
            return Ok(());
        }
        let row = String::try_from(line).map_err(|_| TelemetryError::Overflow)?;
        ROWS.try_send(row).map_err(|_| {
            DROPPED.fetch_add(1, Ordering::Relaxed);
            TelemetryError::QueueFull
        })
    }

    /// The writer task sends the header on each connection
    fn emit_header(&mut self) -> Result<(), TelemetryError> {
        Ok(())
    }
}

/// Write queued telemetry rows to the CDC-ACM port
#[embassy_executor::task]
pub async fn usb_telemetry_task(mut class: CdcAcmClass<'static, Driver<'static, USB>>) -> ! {
    loop {
        class.wait_connection().await;
        while ROWS.try_receive().is_ok() {}
        HOST_ATTACHED.store(true, Ordering::Release);
        crate::log_info!("USB telemetry host attached");

        if write_row(&mut class, TELEMETRY_HEADER).await.is_ok() {
            loop {
                let row = ROWS.receive().await;
                if write_row(&mut class, &row).await.is_err() {
                    break;
                }
            }
        }

        HOST_ATTACHED.store(false, Ordering::Release);
        crate::log_info!("USB telemetry host detached");
    }
}

/// Send one CRLF-terminated row in packet-sized chunks
async fn write_row(
    class: &mut CdcAcmClass<'static, Driver<'static, USB>>,
    row: &str,
) -> Result<(), EndpointError> {
    let mut packet = [0u8; USB_PACKET_SIZE];
    let mut len = 0;
    for &byte in row.as_bytes().iter().chain(b"\r\n") {
        packet[len] = byte;
        len += 1;
        if len == USB_PACKET_SIZE {
            class.write_packet(&packet).await?;
            len = 0;
        }
    }
    // a short (possibly empty) packet ends the transfer
    class.write_packet(&packet[..len]).await
}

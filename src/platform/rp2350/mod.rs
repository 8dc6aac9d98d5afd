//! RP2350 platform glue for the Raspberry Pi Pico 2 W
//!
//! Only built with the `pico2_w` feature.
//!
//! - `dmp_image`: ICM-20948 DMP firmware image
//! - `network`: CYW43439 WiFi join and embassy-net stack
//! - `tcp_link`: TCP server task and the `LineLink` handle for the control loop
//! - `usb_telemetry`: USB CDC-ACM telemetry writer and its sink handle
//! - `time`: `TimeSource` on the Embassy time driver
//! - `tasks`: the tracking loop task

pub mod dmp_image;
pub mod network;
pub mod tasks;
pub mod tcp_link;
pub mod time;
pub mod usb_telemetry;

pub use dmp_image::DMP3_IMAGE;
pub use network::{initialize_wifi, WifiError, WifiLink, WifiPins};
pub use tasks::{tracking_task, FirmwareLoop};
pub use tcp_link::{tcp_server_task, TcpLineLink, GREETING};
pub use time::EmbassyTime;
pub use usb_telemetry::{usb_telemetry_task, UsbTelemetry, USB_PACKET_SIZE};

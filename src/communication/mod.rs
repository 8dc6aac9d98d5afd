//! Communication
//!
//! - `link`: byte link carrying the target protocol (TCP on the device)
//! - `telemetry`: CSV telemetry sink (USB CDC-ACM on the device)

pub mod link;
pub mod telemetry;

pub use link::{LineLink, LinkError};
pub use telemetry::{TelemetryError, TelemetrySink};

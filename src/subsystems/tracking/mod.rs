//! Orientation tracking subsystem
//!
//! Turns the fusion source's FIFO into one conditioned orientation per
//! cycle, answers at most one protocol line and emits a telemetry row.
//!
//! ## Modules
//!
//! - `decoder`: one FIFO read → Euler angles, with fault recovery
//! - `drain`: time-bounded FIFO drain keeping the latest sample
//! - `cycle`: `TrackingLoop`, the control loop body

pub mod cycle;
pub mod decoder;
pub mod drain;

pub use cycle::{CycleReport, TrackingLoop};
pub use decoder::{read_orientation, DecodeError};
pub use drain::{drain_latest, DrainReport};

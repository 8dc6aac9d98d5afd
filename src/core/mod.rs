//! Core infrastructure shared by the firmware subsystems
//!
//! Currently this is the logging facade; the tracking algorithms themselves
//! live in the `sightline_core` crate.

pub mod logging;

//! Subsystems
//!
//! - `tracking`: sample acquisition and the per-cycle control flow

pub mod tracking;

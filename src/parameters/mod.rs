//! Build-time parameters
//!
//! Calibration is never persisted and there is no runtime parameter store;
//! the only configurable values are the network settings baked in by
//! `build.rs`.

pub mod network;

pub use network::NetworkParams;

#![cfg_attr(not(test), no_std)]

//! sightline - orientation tracking and target alignment for a handheld pointer
//!
//! This library provides the device driver for the fused IMU, the tracking
//! control loop, and the command and telemetry links that surround it.
//! Pure computation lives in `sightline_core`.

// Platform glue (RP2350 hardware, host-side mocks)
pub mod platform;

// Device drivers
pub mod devices;

// Logging macros
pub mod core;

// Command link and telemetry sinks
pub mod communication;

// Tracking control loop
pub mod subsystems;

// Build-time configuration
pub mod parameters;

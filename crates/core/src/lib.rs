//! sightline_core - Pure no_std tracking logic for the sightline pointing device
//!
//! This crate contains the platform-agnostic algorithms and types that turn
//! fused orientation quaternions into quantized angles and decide whether the
//! device is aimed at the commanded target. It is tested on host without any
//! feature flags or embassy dependencies.
//!
//! # Design Principles
//!
//! - **Zero cfg**: No `#[cfg(feature = ...)]` directives allowed
//! - **Pure no_std**: No std library dependencies
//! - **Trait abstractions**: Platform services injected via traits
//!
//! # Modules
//!
//! - [`config`]: Compile-time tuning constants
//! - [`orientation`]: Quaternion decode, zero reference, yaw hold
//! - [`quantize`]: Angle quantizer shared by device and target angles
//! - [`target`]: Remote target tracking and alignment verdict
//! - [`protocol`]: Line protocol codec (target updates and replies)
//! - [`telemetry`]: CSV telemetry record
//! - [`text`]: Bounded display text
//! - [`tracker`]: `TrackerState` aggregate owned by the control loop
//! - [`traits`]: Platform-agnostic trait abstractions (TimeSource)

#![no_std]

pub mod config;
pub mod orientation;
pub mod protocol;
pub mod quantize;
pub mod target;
pub mod telemetry;
pub mod text;
pub mod tracker;
pub mod traits;

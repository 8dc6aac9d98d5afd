//! Platform abstraction layer
//!
//! Board-specific code is isolated here: the RP2350 (Pico 2 W) glue behind
//! the `pico2_w` feature and host-side mock peripherals.

#[cfg(feature = "pico2_w")]
pub mod rp2350;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

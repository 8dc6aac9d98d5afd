//! Mock platform peripherals for testing
//!
//! Available during test builds (`#[cfg(test)]`) and when the `mock`
//! feature is enabled.

#![cfg(any(test, feature = "mock"))]

mod i2c;

pub use i2c::{MockI2c, MOCK_FIFO_CAPACITY};

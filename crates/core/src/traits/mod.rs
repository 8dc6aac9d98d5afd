//! Platform seams for the pure tracking logic
//!
//! Trait definitions carry no feature gates. The mock implementations are
//! plain `core` types so host tests can drive them directly; the Embassy
//! implementation lives with the firmware platform code.

pub mod time;

pub use time::{MockTime, TimeSource};

//! Logging abstraction
//!
//! Unified logging macros that work across targets:
//! - Embedded (pico2_w): defmt over RTT
//! - Host tests: `println!` / `eprintln!`
//! - Host non-test: no-op
//!
//! Format strings must stay within the subset defmt accepts: plain `{}`
//! placeholders, no width or precision specifiers. Arguments must implement
//! `defmt::Format` on the firmware build, which is why error enums in this
//! crate carry `#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]`.

/// Log informational message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::info!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[INFO] {}", format!($($arg)*));
    }};
}

/// Log warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::warn!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[WARN] {}", format!($($arg)*));
    }};
}

/// Log error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::error!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        eprintln!("[ERROR] {}", format!($($arg)*));
    }};
}

/// Log debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::debug!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[DEBUG] {}", format!($($arg)*));
    }};
}

/// Log trace message
#[macro_export]
macro_rules! log_trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "pico2_w")]
        ::defmt::trace!($($arg)*);

        #[cfg(all(not(feature = "pico2_w"), test))]
        println!("[TRACE] {}", format!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    #[test]
    fn macros_accept_format_arguments() {
        let count = 3u32;
        crate::log_info!("drained {} samples", count);
        crate::log_warn!("fault: {}", "overflow");
        crate::log_error!("link error");
        crate::log_debug!("yaw {}", 1.5f32);
        crate::log_trace!("tick");
    }
}

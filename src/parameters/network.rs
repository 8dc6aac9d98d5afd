//! Network Parameter Definitions
//!
//! WiFi and TCP server settings. Defaults are provided at build time via
//! environment variables read by `build.rs`:
//!
//! - `WIFI_SSID` - WiFi network name
//! - `WIFI_PASSWORD` - WiFi password
//! - `WIFI_DHCP` - Use DHCP (true/false, default true)
//! - `WIFI_IP` - Static IP address (e.g., "192.168.1.100")
//! - `WIFI_NETMASK` - Network mask (default "255.255.255.0")
//! - `WIFI_GATEWAY` - Gateway address
//! - `SIGHTLINE_PORT` - TCP port for the target protocol (default 3333)
//!
//! # Security Note
//!
//! The password ends up in the firmware image in plain text.

use heapless::String;

/// Maximum SSID length (IEEE 802.11 standard)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WiFi password length (WPA2 standard)
pub const MAX_PASSWORD_LEN: usize = 63;

/// Protocol port when `SIGHTLINE_PORT` is unset or invalid
pub const DEFAULT_PORT: u16 = 3333;

/// Network configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkParams {
    pub ssid: String<MAX_SSID_LEN>,
    pub password: String<MAX_PASSWORD_LEN>,
    pub use_dhcp: bool,
    /// Used only when `use_dhcp` is false
    pub static_ip: [u8; 4],
    pub netmask: [u8; 4],
    pub gateway: [u8; 4],
    pub port: u16,
}

impl Default for NetworkParams {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            use_dhcp: true,
            static_ip: [0, 0, 0, 0],
            netmask: [255, 255, 255, 0],
            gateway: [0, 0, 0, 0],
            port: DEFAULT_PORT,
        }
    }
}

impl NetworkParams {
    /// Parameters baked in at build time
    pub fn from_build_env() -> Self {
        Self::from_strs(
            env!("WIFI_SSID"),
            env!("WIFI_PASSWORD"),
            env!("WIFI_DHCP"),
            env!("WIFI_IP"),
            env!("WIFI_NETMASK"),
            env!("WIFI_GATEWAY"),
            env!("SIGHTLINE_PORT"),
        )
    }

    /// Build parameters from raw strings, falling back to defaults for
    /// anything that does not parse
    pub fn from_strs(
        ssid: &str,
        password: &str,
        dhcp: &str,
        ip: &str,
        netmask: &str,
        gateway: &str,
        port: &str,
    ) -> Self {
        let defaults = Self::default();
        Self {
            ssid: String::try_from(ssid).unwrap_or_else(|_| String::new()),
            password: String::try_from(password).unwrap_or_else(|_| String::new()),
            use_dhcp: dhcp.trim().parse::<bool>().unwrap_or(defaults.use_dhcp),
            static_ip: parse_ipv4(ip).unwrap_or(defaults.static_ip),
            netmask: parse_ipv4(netmask).unwrap_or(defaults.netmask),
            gateway: parse_ipv4(gateway).unwrap_or(defaults.gateway),
            port: parse_port(port).unwrap_or(defaults.port),
        }
    }

    /// True when an SSID is set
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }

    /// CIDR prefix length of `netmask` (leading one bits)
    pub fn prefix_len(&self) -> u8 {
        u32::from_be_bytes(self.netmask).leading_ones() as u8
    }
}

/// Parse IPv4 address from string (e.g., "192.168.1.1")
pub fn parse_ipv4(s: &str) -> Option<[u8; 4]> {
    let mut parts = s.trim().split('.');
    let mut result = [0u8; 4];
    for octet in result.iter_mut() {
        *octet = parts.next()?.parse::<u8>().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(result)
}

/// Parse a non-zero TCP port
pub fn parse_port(s: &str) -> Option<u16> {
    s.trim().parse::<u16>().ok().filter(|&p| p != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = NetworkParams::default();
        assert!(!params.is_configured());
        assert!(params.use_dhcp);
        assert_eq!(params.netmask, [255, 255, 255, 0]);
        assert_eq!(params.port, 3333);
    }

    #[test]
    fn test_from_strs_static() {
        let params = NetworkParams::from_strs(
            "field-net",
            "secret123",
            "false",
            "192.168.4.20",
            "255.255.0.0",
            "192.168.4.1",
            "4000",
        );
        assert!(params.is_configured());
        assert_eq!(params.ssid.as_str(), "field-net");
        assert!(!params.use_dhcp);
        assert_eq!(params.static_ip, [192, 168, 4, 20]);
        assert_eq!(params.netmask, [255, 255, 0, 0]);
        assert_eq!(params.gateway, [192, 168, 4, 1]);
        assert_eq!(params.port, 4000);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let params = NetworkParams::from_strs("", "", "maybe", "1.2.3", "x", "", "0");
        assert!(params.use_dhcp);
        assert_eq!(params.static_ip, [0, 0, 0, 0]);
        assert_eq!(params.netmask, [255, 255, 255, 0]);
        assert_eq!(params.port, DEFAULT_PORT);
    }

    #[test]
    fn test_overlong_ssid_is_dropped() {
        let long = "abcdefghijklmnopqrstuvwxyz0123456789";
        let params = NetworkParams::from_strs(long, "", "true", "", "", "", "");
        assert!(!params.is_configured());
    }

    #[test]
    fn test_prefix_len() {
        let mut params = NetworkParams::default();
        assert_eq!(params.prefix_len(), 24);
        params.netmask = [255, 255, 0, 0];
        assert_eq!(params.prefix_len(), 16);
        params.netmask = [0, 0, 0, 0];
        assert_eq!(params.prefix_len(), 0);
    }

    #[test]
    fn test_parse_ipv4() {
        assert_eq!(parse_ipv4("10.0.0.1"), Some([10, 0, 0, 1]));
        assert_eq!(parse_ipv4(" 255.255.255.255 "), Some([255; 4]));
        assert_eq!(parse_ipv4("256.0.0.1"), None);
        assert_eq!(parse_ipv4("1.2.3.4.5"), None);
        assert_eq!(parse_ipv4("1..3.4"), None);
        assert_eq!(parse_ipv4(""), None);
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("3333"), Some(3333));
        assert_eq!(parse_port("65536"), None);
        assert_eq!(parse_port("0"), None);
        assert_eq!(parse_port("abc"), None);
    }

    #[test]
    fn test_build_env_is_readable() {
        let params = NetworkParams::from_build_env();
        assert_ne!(params.port, 0);
    }
}

use std::env;

/// Build-time settings baked into the firmware via `rustc-env`.
///
/// `(variable, default, secret)`; read back by `NetworkParams::from_build_env()`.
const SETTINGS: &[(&str, &str, bool)] = &[
    ("WIFI_SSID", "", false),
    ("WIFI_PASSWORD", "", true),
    ("WIFI_DHCP", "true", false),
    ("WIFI_IP", "0.0.0.0", false),
    ("WIFI_NETMASK", "255.255.255.0", false),
    ("WIFI_GATEWAY", "0.0.0.0", false),
    ("SIGHTLINE_PORT", "3333", false),
];

fn main() {
    for &(name, default, secret) in SETTINGS {
        println!("cargo:rerun-if-env-changed={}", name);

        match env::var(name) {
            Ok(value) => {
                println!("cargo:rustc-env={}={}", name, value);
                if secret {
                    println!("cargo:warning=Using {} from environment (hidden)", name);
                } else {
                    println!("cargo:warning=Using {} from environment: {}", name, value);
                }
            }
            Err(_) => println!("cargo:rustc-env={}={}", name, default),
        }
    }
}

//! RP2350 WiFi Network Bring-up
//!
//! WiFi initialization and network stack management for the Pico 2 W using
//! the CYW43439 WiFi chip and the Embassy network stack.
//!
//! # Connection Flow
//!
//! ```text
//! 1. Initialize CYW43439 driver (PIO, DMA, firmware)
//! 2. Spawn WiFi and network runner tasks
//! 3. Join WPA2 network, retrying until it succeeds
//! 4. Configure DHCP or static IP
//! 5. Wait (bounded) for an address
//! ```
//!
//! The returned `Control` must stay alive for the lifetime of the firmware;
//! the caller keeps it in its own stack frame.

use crate::parameters::NetworkParams;
use cyw43::{aligned_bytes, Control, JoinOptions};
use cyw43_pio::DEFAULT_CLOCK_DIVIDER;
use embassy_executor::Spawner;
use embassy_net::{
    Config as NetConfig, Ipv4Address, Ipv4Cidr, Stack, StackResources, StaticConfigV4,
};
use embassy_rp::clocks::RoscRng;
use embassy_rp::{
    bind_interrupts,
    gpio::{Level, Output},
    peripherals::{DMA_CH0, PIN_23, PIN_24, PIN_25, PIN_29, PIO0},
    pio::{InterruptHandler as PioInterruptHandler, Pio},
    Peri,
};
use embassy_time::{Duration, Instant, Timer};
use static_cell::StaticCell;

/// Delay between join attempts
const JOIN_RETRY_DELAY_MS: u64 = 800;

/// Join timeout per attempt
const JOIN_TIMEOUT_SECS: u64 = 5;

/// How long to wait for an address after joining
const ADDRESS_WAIT_MS: u64 = 15_000;

/// Poll interval while waiting for an address
const ADDRESS_POLL_MS: u64 = 250;

/// WiFi initialization error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "pico2_w", derive(defmt::Format))]
pub enum WifiError {
    /// Empty SSID
    NotConfigured,
}

impl core::fmt::Display for WifiError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WifiError::NotConfigured => write!(f, "WiFi not configured"),
        }
    }
}

/// Radio pins and peripherals on the Pico 2 W
pub struct WifiPins {
    pub pwr: Peri<'static, PIN_23>,
    pub dio: Peri<'static, PIN_24>,
    pub cs: Peri<'static, PIN_25>,
    pub clk: Peri<'static, PIN_29>,
    pub pio: Peri<'static, PIO0>,
    pub dma: Peri<'static, DMA_CH0>,
}

/// Network handles returned by [`initialize_wifi`]
pub struct WifiLink {
    pub stack: Stack<'static>,
    pub control: Control<'static>,
    /// Address once known, `None` if it did not arrive in time
    pub address: Option<[u8; 4]>,
}

bind_interrupts!(pub struct PioIrqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

/// Bring up WiFi and the network stack
///
/// Join attempts repeat until the network accepts us, as the device has no
/// use without its link.
pub async fn initialize_wifi(
    spawner: Spawner,
    params: &NetworkParams,
    pins: WifiPins,
) -> Result<WifiLink, WifiError> {
    if !params.is_configured() {
        crate::log_warn!("WiFi not configured (empty SSID)");
        return Err(WifiError::NotConfigured);
    }

    crate::log_info!("Connecting WiFi to: {}", params.ssid.as_str());

    let fw = aligned_bytes!("../../../cyw43-firmware/43439A0.bin");
    let clm = include_bytes!("../../../cyw43-firmware/43439A0_clm.bin");
    let nvram = aligned_bytes!("../../../cyw43-firmware/nvram_rp2040.bin");

    let pwr = Output::new(pins.pwr, Level::Low);
    let cs = Output::new(pins.cs, Level::High);
    let mut pio = Pio::new(pins.pio, PioIrqs);
    let spi = cyw43_pio::PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        pins.dio,
        pins.clk,
        pins.dma,
    );

    static STATE: StaticCell<cyw43::State> = StaticCell::new();
    let state = STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, spi, fw, nvram).await;
    spawner.spawn(wifi_task(runner).unwrap());

    control.init(clm).await;
    control
        .set_power_management(cyw43::PowerManagementMode::None)
        .await;

    let net_config = if params.use_dhcp {
        crate::log_info!("Configuring DHCP");
        NetConfig::dhcpv4(Default::default())
    } else {
        let ip = params.static_ip;
        let gw = params.gateway;
        crate::log_info!("Configuring static IP: {}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]);
        NetConfig::ipv4_static(StaticConfigV4 {
            address: Ipv4Cidr::new(
                Ipv4Address::new(ip[0], ip[1], ip[2], ip[3]),
                params.prefix_len(),
            ),
            gateway: Some(Ipv4Address::new(gw[0], gw[1], gw[2], gw[3])),
            dns_servers: Default::default(),
        })
    };

    let mut rng = RoscRng;
    let seed = rng.next_u64();
    static RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        net_device,
        net_config,
        RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner).unwrap());

    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let options = JoinOptions::new(params.password.as_bytes());
        let joined = embassy_time::with_timeout(
            Duration::from_secs(JOIN_TIMEOUT_SECS),
            control.join(params.ssid.as_str(), options),
        )
        .await;

        match joined {
            Ok(Ok(())) => {
                crate::log_info!("WiFi connected (attempt {})", attempt);
                break;
            }
            Ok(Err(_)) => crate::log_warn!("WiFi join failed (attempt {})", attempt),
            Err(_) => crate::log_warn!("WiFi join timed out (attempt {})", attempt),
        }

        // leave() resets the CYW43439 join state before the next attempt
        control.leave().await;
        Timer::after_millis(JOIN_RETRY_DELAY_MS).await;
    }

    let address = wait_for_address(stack).await;
    match address {
        Some(ip) => crate::log_info!("IP address: {}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]),
        None => crate::log_warn!("No IP address after {} ms", ADDRESS_WAIT_MS),
    }

    Ok(WifiLink {
        stack,
        control,
        address,
    })
}

/// Poll for an IPv4 address for up to [`ADDRESS_WAIT_MS`]
async fn wait_for_address(stack: Stack<'static>) -> Option<[u8; 4]> {
    let start = Instant::now();
    loop {
        if let Some(config) = stack.config_v4() {
            let ip = config.address.address().octets();
            if ip[0] != 0 {
                return Some(ip);
            }
        }
        if start.elapsed() > Duration::from_millis(ADDRESS_WAIT_MS) {
            return None;
        }
        Timer::after_millis(ADDRESS_POLL_MS).await;
    }
}

/// WiFi driver task
#[embassy_executor::task]
async fn wifi_task(
    runner: cyw43::Runner<
        'static,
        cyw43::SpiBus<Output<'static>, cyw43_pio::PioSpi<'static, PIO0, 0, DMA_CH0>>,
    >,
) -> ! {
    runner.run().await
}

/// Network stack task
#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, cyw43::NetDriver<'static>>) -> ! {
    runner.run().await
}

//! sightline firmware for the Raspberry Pi Pico 2 W
//!
//! Brings up USB telemetry, the ICM-20948 DMP, and WiFi, then hands the
//! peripherals to the tracking loop task.
//!
//! # Hardware Setup
//!
//! - ICM-20948 on I2C0: GPIO 4 (SDA), GPIO 5 (SCL), address 0x68
//! - CYW43439 on the Pico 2 W's internal PIO0 SPI bus
//!
//! # Usage
//!
//! ```bash
//! WIFI_SSID=bench WIFI_PASSWORD=secret \
//!     cargo build --release --bin sightline --features pico2_w
//!
//! # Telemetry (CSV over USB CDC-ACM)
//! screen /dev/ttyACM0 115200
//!
//! # Commands (newline-terminated over TCP)
//! nc <device-ip> 3333
//! MSG:go;X:4;Y:-5
//! ```

#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::i2c::{Config as I2cConfig, I2c};
use embassy_rp::peripherals::{I2C0, USB};
use embassy_rp::usb::{Driver, InterruptHandler as UsbInterruptHandler};
use embassy_time::{Duration, Timer};
use embassy_usb::class::cdc_acm::{CdcAcmClass, State};
use embassy_usb::{Builder, Config as UsbConfig, UsbDevice};
use sightline::devices::imu::{Icm20948Dmp, ICM20948_ADDR};
use sightline::parameters::NetworkParams;
use sightline::platform::rp2350::{
    initialize_wifi, tcp_server_task, tracking_task, usb_telemetry_task, EmbassyTime, DMP3_IMAGE,
    TcpLineLink, UsbTelemetry, WifiPins, USB_PACKET_SIZE,
};
use sightline::subsystems::tracking::TrackingLoop;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

/// Delay between IMU bring-up attempts
const IMU_RETRY_DELAY_MS: u64 = 200;

/// I2C0 bus speed
const I2C_FREQUENCY_HZ: u32 = 400_000;

hal::bind_interrupts!(struct Irqs {
    USBCTRL_IRQ => UsbInterruptHandler<USB>;
    I2C0_IRQ => embassy_rp::i2c::InterruptHandler<I2C0>;
});

#[embassy_executor::task]
async fn usb_device_task(mut usb: UsbDevice<'static, Driver<'static, USB>>) -> ! {
    usb.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = hal::init(Default::default());

    sightline::log_info!("sightline");
    sightline::log_info!("=========");

    // USB CDC-ACM telemetry
    {
        static CONFIG_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
        static BOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
        static MSOS_DESCRIPTOR: StaticCell<[u8; 256]> = StaticCell::new();
        static CONTROL_BUF: StaticCell<[u8; 64]> = StaticCell::new();
        static CDC_STATE: StaticCell<State> = StaticCell::new();

        let driver = Driver::new(p.USB, Irqs);

        let mut usb_config = UsbConfig::new(0x2e8a, 0x000a);
        usb_config.manufacturer = Some("sightline");
        usb_config.product = Some("sightline telemetry");
        usb_config.serial_number = Some("SIGHTLINE01");
        usb_config.max_power = 100;
        usb_config.max_packet_size_0 = 64;

        let mut builder = Builder::new(
            driver,
            usb_config,
            CONFIG_DESCRIPTOR.init([0; 256]),
            BOS_DESCRIPTOR.init([0; 256]),
            MSOS_DESCRIPTOR.init([0; 256]),
            CONTROL_BUF.init([0; 64]),
        );
        let class = CdcAcmClass::new(
            &mut builder,
            CDC_STATE.init(State::new()),
            USB_PACKET_SIZE as u16,
        );
        let usb = builder.build();

        spawner.spawn(usb_device_task(usb).unwrap());
        spawner.spawn(usb_telemetry_task(class).unwrap());
        sightline::log_info!("USB telemetry initialized");
    }

    // ICM-20948 with DMP fusion
    let i2c = I2c::new_async(p.I2C0, p.PIN_5, p.PIN_4, Irqs, {
        let mut config = I2cConfig::default();
        config.frequency = I2C_FREQUENCY_HZ;
        config
    });
    let mut imu = Icm20948Dmp::new(i2c, ICM20948_ADDR);
    let mut attempts: u32 = 0;
    while let Err(e) = imu.start(DMP3_IMAGE).await {
        attempts += 1;
        if attempts == 1 || attempts % 25 == 0 {
            sightline::log_warn!("IMU start failed ({} attempts): {}", attempts, e);
        }
        Timer::after(Duration::from_millis(IMU_RETRY_DELAY_MS)).await;
    }

    // WiFi and the TCP command server
    let params = NetworkParams::from_build_env();
    let pins = WifiPins {
        pwr: p.PIN_23,
        dio: p.PIN_24,
        cs: p.PIN_25,
        clk: p.PIN_29,
        pio: p.PIO0,
        dma: p.DMA_CH0,
    };
    let wifi = match initialize_wifi(spawner, &params, pins).await {
        Ok(wifi) => wifi,
        Err(e) => {
            sightline::log_error!("WiFi unavailable: {}", e);
            sightline::log_error!("Rebuild with WIFI_SSID and WIFI_PASSWORD set");
            loop {
                Timer::after(Duration::from_secs(60)).await;
            }
        }
    };
    spawner.spawn(tcp_server_task(wifi.stack, params.port).unwrap());

    let mut tracker = TrackingLoop::new(imu, TcpLineLink, UsbTelemetry, EmbassyTime);
    if let Some(octets) = wifi.address {
        tracker.state_mut().set_ip(octets);
    }
    tracker.start();
    spawner.spawn(tracking_task(tracker).unwrap());

    // The WiFi control handle must outlive the link
    let _control = wifi.control;
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}

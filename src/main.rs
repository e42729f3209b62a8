//! AutoPush Firmware: Main Entry Point
//!
//! Single cooperative loop on the main task:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                      │
//! │  HardwareAdapter (servo, USB, delay)   PeriodicTimer         │
//! │  UartTransport + TelnetTransport (ConsoleMirror)             │
//! │  WifiAdapter                           UptimeClock           │
//! │                                                              │
//! │  ───────────────── Port Trait Boundary ─────────────────     │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │          PushService (pure logic)                      │  │
//! │  │  Mailbox drain · Fsm dispatch · Validator              │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per iteration: check the link, accept telnet clients, sample the
//! button, read both consoles, execute at most one action, idle 1 ms.
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyIOPin, PinDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::uart::{UartDriver, config::Config as UartConfig};
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use autopush::adapters::hardware::HardwareAdapter;
use autopush::adapters::telnet::TelnetTransport;
use autopush::adapters::time::UptimeClock;
use autopush::adapters::uart::UartTransport;
use autopush::adapters::wifi::WifiAdapter;
use autopush::app::service::PushService;
use autopush::config::{self, BoardConfig, PushConfig};
use autopush::console::ConsoleMirror;
use autopush::drivers::hw_timer::PeriodicTimer;
use autopush::drivers::servo::ServoDriver;
use autopush::drivers::usb_switch::UsbSwitch;
use autopush::error::TransportFault;
use autopush::events::Mailbox;
use autopush::pins;
use autopush::sources::ButtonSource;

/// The one mailbox shared by the timer callback, the button, the consoles
/// and the controller.
static MAILBOX: Mailbox = Mailbox::new();

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  AutoPush v{}                       ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let board = BoardConfig::default();
    let p = Peripherals::take()?;

    // ── 2. Actuators ──────────────────────────────────────────
    let ledc_timer = LedcTimerDriver::new(
        p.ledc.timer0,
        &TimerConfig::default()
            .frequency(Hertz(pins::SERVO_PWM_FREQ_HZ))
            // 14 bits keeps 1 µs granularity at 50 Hz.
            .resolution(Resolution::Bits14),
    )?;
    let pwm = LedcDriver::new(p.ledc.channel0, ledc_timer, p.pins.gpio22)?;
    let usb = UsbSwitch::new(PinDriver::output(p.pins.gpio25)?)?;
    let mut hw = HardwareAdapter::new(ServoDriver::new(pwm), usb, FreeRtos);
    info!(
        "Actuators: servo GPIO{}, USB switch GPIO{}",
        pins::SERVO_GPIO,
        pins::USB_SWITCH_GPIO
    );

    // ── 3. Controller + periodic timer ────────────────────────
    let mut service = PushService::new(&MAILBOX, PushConfig::default());
    let mut timer = PeriodicTimer::new(&MAILBOX)?;

    // ── 4. Serial console ─────────────────────────────────────
    let uart = UartDriver::new(
        p.uart1,
        p.pins.gpio26,
        p.pins.gpio32,
        Option::<AnyIOPin>::None,
        Option::<AnyIOPin>::None,
        &UartConfig::default().baudrate(Hertz(board.serial_baud)),
    )?;
    info!(
        "Serial console: {} baud, rx GPIO{}, tx GPIO{}",
        board.serial_baud, board.serial_rx_gpio, board.serial_tx_gpio
    );

    // ── 5. Network console (fail-fast) ────────────────────────
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(
        EspWifi::new(p.modem, sysloop.clone(), Some(nvs))?,
        sysloop,
    )?);
    let telnet = match bring_up_network(&mut wifi, board.telnet_port) {
        Ok(t) => t,
        Err(fault) => {
            service.fail_fast(&mut hw, fault);
            anyhow::bail!("network bring-up failed: {fault}");
        }
    };

    let mut consoles = ConsoleMirror::new(UartTransport::new(uart), telnet);

    // ── 6. Boot sequence ──────────────────────────────────────
    service.start(&mut hw, &mut consoles, board.boot_settle_ms);

    let mut button = ButtonSource::new(PinDriver::input(p.pins.gpio39)?);
    let clock = UptimeClock::new();
    info!("Button on GPIO{}; entering main loop", pins::BUTTON_GPIO);

    // ── 7. Main loop ──────────────────────────────────────────
    loop {
        if let Err(fault) = wifi.poll() {
            service.fail_fast(&mut hw, fault);
        }
        consoles.remote.transport_mut().poll_connections();

        button.poll(clock.now_ms(), &MAILBOX, &mut consoles);
        consoles.poll(&MAILBOX);

        service.tick(&mut hw, &mut timer, &mut consoles);

        FreeRtos::delay_ms(board.loop_delay_ms);
    }
}

/// Join Wi-Fi with the build-time credentials and open the telnet port.
fn bring_up_network(wifi: &mut WifiAdapter, port: u16) -> Result<TelnetTransport, TransportFault> {
    let Some((ssid, pass)) = config::wifi_credentials() else {
        warn!("No Wi-Fi credentials (set AUTOPUSH_WIFI_SSID / AUTOPUSH_WIFI_PASS at build time)");
        return Err(TransportFault::LinkDown);
    };
    wifi.set_credentials(ssid, pass).map_err(|e| {
        warn!("Wi-Fi credentials rejected: {e}");
        TransportFault::LinkDown
    })?;
    wifi.connect().map_err(|_| TransportFault::LinkDown)?;
    TelnetTransport::bind(port)
}

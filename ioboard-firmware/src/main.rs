//! ioboard - Serial I/O expansion firmware
//!
//! Firmware binary for RP2040-based boards. Bytes from the host are
//! buffered by the UART receive task; the main loop runs them through the
//! protocol engine and hands replies to the transmit task. Edge sampling
//! and servo pulse generation run as their own tasks.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc, Channel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Flex, Pull};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{self, BufferedInterruptHandler, Uart};
use embassy_rp::watchdog::Watchdog as RpWatchdogPeripheral;
use embassy_time::{with_timeout, Duration};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use ioboard_core::{Device, DeviceState};
use ioboard_hal::uart::{DataBits, Parity, StopBits};

use crate::board::{PinBank, RpBoard, RpWatchdog};
use crate::channels::{PINS, RX_READY, RX_RING, TX_READY, TX_RING};
use crate::config::{POLL_INTERVAL_MS, UART, UART_BUF_SIZE, WATCHDOG_PERIOD_MS};

mod board;
mod channels;
mod config;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; UART_BUF_SIZE]> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("ioboard firmware starting...");

    let p = embassy_rp::init(Default::default());

    // Serial link to the host on D0/D1
    let tx_buf = TX_BUF.init([0u8; UART_BUF_SIZE]);
    let rx_buf = RX_BUF.init([0u8; UART_BUF_SIZE]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized at {} baud", UART.baudrate);

    // Digital pins D2-D13, all floating inputs until the host configures them
    let bank = PinBank::new([
        Flex::new(p.PIN_2),
        Flex::new(p.PIN_3),
        Flex::new(p.PIN_4),
        Flex::new(p.PIN_5),
        Flex::new(p.PIN_6),
        Flex::new(p.PIN_7),
        Flex::new(p.PIN_8),
        Flex::new(p.PIN_9),
        Flex::new(p.PIN_10),
        Flex::new(p.PIN_11),
        Flex::new(p.PIN_12),
        Flex::new(p.PIN_13),
    ]);
    PINS.lock(|cell| *cell.borrow_mut() = Some(bank));

    // Analog inputs A0-A3 and the die temperature sensor
    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let analog = [
        Channel::new_pin(p.PIN_26, Pull::None),
        Channel::new_pin(p.PIN_27, Pull::None),
        Channel::new_pin(p.PIN_28, Pull::None),
        Channel::new_pin(p.PIN_29, Pull::None),
    ];
    let temperature = Channel::new_temp_sensor(p.ADC_TEMP_SENSOR);

    // I2C master, standard mode until the host asks otherwise
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, i2c::Config::default());

    info!("Peripherals initialized");

    let board = RpBoard::new(adc, analog, temperature, i2c);
    let watchdog = RpWatchdog::start(
        RpWatchdogPeripheral::new(p.WATCHDOG),
        Duration::from_millis(WATCHDOG_PERIOD_MS),
    );
    let mut device = Device::new(board, watchdog, &RX_RING, &TX_RING);

    unwrap!(spawner.spawn(tasks::uart_rx_task(rx)));
    unwrap!(spawner.spawn(tasks::uart_tx_task(tx)));
    unwrap!(spawner.spawn(tasks::edge_sampler_task()));
    unwrap!(spawner.spawn(tasks::servo_pulse_task()));

    info!("All tasks spawned, firmware running");

    let poll_interval = Duration::from_millis(POLL_INTERVAL_MS);
    let mut halted = false;
    loop {
        if device.poll() == DeviceState::Halted && !halted {
            warn!("Halted; the watchdog will restart the board");
            halted = true;
        }

        if !TX_RING.is_empty() {
            TX_READY.signal(());
        }

        // Wake on received bytes, or after the interval so the watchdog
        // keeps being fed while the link is idle
        let _ = with_timeout(poll_interval, RX_READY.wait()).await;
    }
}

/// Map the link settings onto the RP2040 UART driver config
fn uart_config() -> uart::Config {
    let mut cfg = uart::Config::default();
    cfg.baudrate = UART.baudrate;
    cfg.data_bits = match UART.data_bits {
        DataBits::Seven => uart::DataBits::DataBits7,
        DataBits::Eight => uart::DataBits::DataBits8,
    };
    cfg.parity = match UART.parity {
        Parity::None => uart::Parity::ParityNone,
        Parity::Even => uart::Parity::ParityEven,
        Parity::Odd => uart::Parity::ParityOdd,
    };
    cfg.stop_bits = match UART.stop_bits {
        StopBits::One => uart::StopBits::STOP1,
        StopBits::Two => uart::StopBits::STOP2,
    };
    cfg
}

//! Serial port setup

use std::thread;
use std::time::Duration;

use ioboard_hal::uart::{DataBits, Parity, StopBits, UartConfig};
use log::info;
use serialport::{ClearBuffer, FlowControl, SerialPort};

use crate::client::Client;
use crate::config::HostConfig;
use crate::error::Result;

/// How long one read call may block before the client re-checks its
/// reply deadline
pub const POLL_TIMEOUT: Duration = Duration::from_millis(100);

/// Open `path` with the given line settings and no flow control
pub fn open_port(path: &str, uart: &UartConfig) -> Result<Box<dyn SerialPort>> {
    let port = serialport::new(path, uart.baudrate)
        .data_bits(match uart.data_bits {
            DataBits::Seven => serialport::DataBits::Seven,
            DataBits::Eight => serialport::DataBits::Eight,
        })
        .parity(match uart.parity {
            Parity::None => serialport::Parity::None,
            Parity::Even => serialport::Parity::Even,
            Parity::Odd => serialport::Parity::Odd,
        })
        .stop_bits(match uart.stop_bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        })
        .flow_control(FlowControl::None)
        .timeout(POLL_TIMEOUT)
        .open()?;
    Ok(port)
}

/// Open the configured port and bring the board to a known state
///
/// With `reset_on_connect` the board is reset and given
/// `reset_settle_ms` to restart; anything it sent meanwhile is discarded.
pub fn connect(config: &HostConfig) -> Result<Client<Box<dyn SerialPort>>> {
    config.validate()?;

    let port = open_port(&config.port, &config.uart())?;
    info!("Opened {} at {} baud", config.port, config.baud_rate);

    let mut client = Client::new(port)
        .with_reply_timeout(config.reply_timeout())
        .with_analog_reference(config.analog_reference_volts);

    if config.reset_on_connect {
        client.reset()?;
        thread::sleep(config.reset_settle());
        client.get_mut().clear(ClearBuffer::Input)?;
        info!("Board reset");
    }

    Ok(client)
}

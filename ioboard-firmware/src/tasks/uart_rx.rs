//! Host UART receive task
//!
//! Moves received bytes into the receive ring and wakes the main loop.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use crate::channels::{RX_READY, RX_RING};

/// Buffer size for one UART read
const RX_CHUNK: usize = 64;

#[embassy_executor::task]
pub async fn uart_rx_task(mut rx: BufferedUartRx) {
    info!("UART RX task started");

    let mut buf = [0u8; RX_CHUNK];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);
                let dropped = buf[..n].iter().filter(|&&byte| !RX_RING.push(byte)).count();
                if dropped > 0 {
                    warn!("Receive ring full, dropped {} bytes", dropped);
                }
                RX_READY.signal(());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}

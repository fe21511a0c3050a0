//! Host UART transmit task
//!
//! Drains the transmit ring whenever the main loop queued a reply.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;
use heapless::Vec;

use crate::channels::{TX_READY, TX_RING};

/// Bytes taken from the ring per UART write
const TX_CHUNK: usize = 64;

#[embassy_executor::task]
pub async fn uart_tx_task(mut tx: BufferedUartTx) {
    info!("UART TX task started");

    loop {
        TX_READY.wait().await;

        loop {
            let mut chunk: Vec<u8, TX_CHUNK> = Vec::new();
            while !chunk.is_full() {
                match TX_RING.pop() {
                    Some(byte) => {
                        let _ = chunk.push(byte);
                    }
                    None => break,
                }
            }
            if chunk.is_empty() {
                break;
            }

            if let Err(e) = tx.write_all(&chunk).await {
                warn!("UART write error: {:?}", e);
            } else {
                trace!("TX: {} bytes", chunk.len());
            }
        }
    }
}

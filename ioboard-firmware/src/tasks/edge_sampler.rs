//! Edge sampling task
//!
//! Samples every digital pin at a fixed rate and records level changes
//! into the shared edge monitor. Pulses shorter than the period can be
//! missed.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::{with_pins, EDGES};
use crate::config::EDGE_SAMPLE_PERIOD_US;

#[embassy_executor::task]
pub async fn edge_sampler_task() {
    info!("Edge sampler started, period {} us", EDGE_SAMPLE_PERIOD_US);

    let mut ticker = Ticker::every(Duration::from_micros(EDGE_SAMPLE_PERIOD_US));

    loop {
        ticker.next().await;
        with_pins(|bank| bank.sample(&EDGES));
    }
}

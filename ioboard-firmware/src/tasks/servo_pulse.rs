//! Servo pulse generation
//!
//! Every 20 ms frame raises all attached servo pins together, then lowers
//! each one after its own pulse width, shortest first.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker, Timer};
use heapless::Vec;

use ioboard_protocol::{ServoPin, SERVO_PERIOD_US};

use crate::channels::{with_pins, SERVO_PULSES};

#[embassy_executor::task]
pub async fn servo_pulse_task() {
    info!("Servo pulse task started");

    let mut ticker = Ticker::every(Duration::from_micros(SERVO_PERIOD_US as u64));

    loop {
        ticker.next().await;

        let pulses = SERVO_PULSES.lock(|pulses| *pulses.borrow());
        let mut active: Vec<(u16, ServoPin), 8> = ServoPin::ALL
            .iter()
            .filter_map(|&pin| pulses[pin.index()].map(|pulse| (pulse, pin)))
            .collect();
        if active.is_empty() {
            continue;
        }
        active.sort_unstable_by_key(|&(pulse, _)| pulse);

        let start = Instant::now();
        for &(_, pin) in &active {
            with_pins(|bank| bank.set(pin.digital_pin(), true));
        }
        for &(pulse, pin) in &active {
            Timer::at(start + Duration::from_micros(pulse as u64)).await;
            with_pins(|bank| bank.set(pin.digital_pin(), false));
        }
    }
}

//! Servo sub-machine
//!
//! Config and Set share one layout, `pin, pulse_hi, pulse_lo`, with the
//! pulse width in microseconds. Widths outside the servo range are clamped
//! rather than refused.

use ioboard_protocol::{clamp_pulse, ByteSink, ClassTag, ServoOp, ServoPin, Status};

use super::{Context, Step};
use crate::traits::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoState {
    AwaitingDataTag,
    Pin { op: ServoOp },
    PulseHigh { op: ServoOp, pin: u8 },
    PulseLow { op: ServoOp, pin: u8, high: u8 },
    Checksum { op: ServoOp, pin: u8, pulse: u16 },
}

pub(super) fn feed<B, S>(state: ServoState, byte: u8, ctx: &mut Context<'_, B, S>) -> Step<ServoState>
where
    B: Board,
    S: ByteSink + ?Sized,
{
    match state {
        ServoState::AwaitingDataTag => match ServoOp::from_byte(byte) {
            Some(op) => Step::Next(ServoState::Pin { op }),
            None => Step::Discard,
        },
        ServoState::Pin { op } => Step::Next(ServoState::PulseHigh { op, pin: byte }),
        ServoState::PulseHigh { op, pin } => Step::Next(ServoState::PulseLow { op, pin, high: byte }),
        ServoState::PulseLow { op, pin, high } => Step::Next(ServoState::Checksum {
            op,
            pin,
            pulse: u16::from_be_bytes([high, byte]),
        }),
        ServoState::Checksum { op, pin, pulse } => {
            let target = ServoPin::from_number(pin).filter(|_| ctx.checksum_ok(byte));
            if let Some(pin) = target {
                let pulse = clamp_pulse(pulse);
                match op {
                    ServoOp::Config => ctx.board.attach_servo(pin, pulse),
                    ServoOp::Set => ctx.board.set_pulse(pin, pulse),
                }
            }

            let status = Status::from_success(target.is_some());
            ctx.reply(ClassTag::Servo, op.to_byte(), status).finish();
            Step::Done(status)
        }
    }
}

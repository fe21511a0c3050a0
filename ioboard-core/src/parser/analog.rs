//! Analog sub-machine: single-channel read and read-all

use ioboard_hal::AnalogInput;
use ioboard_protocol::{AnalogOp, AnalogPin, ByteSink, ClassTag, Status, ANALOG_CHANNELS};

use super::{Context, Step};
use crate::traits::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnalogState {
    AwaitingDataTag,
    ReadPin,
    ReadChecksum { pin: u8 },
    ReadAllChecksum,
}

pub(super) fn feed<B, S>(state: AnalogState, byte: u8, ctx: &mut Context<'_, B, S>) -> Step<AnalogState>
where
    B: Board,
    S: ByteSink + ?Sized,
{
    match state {
        AnalogState::AwaitingDataTag => match AnalogOp::from_byte(byte) {
            Some(AnalogOp::Read) => Step::Next(AnalogState::ReadPin),
            Some(AnalogOp::ReadAll) => Step::Next(AnalogState::ReadAllChecksum),
            None => Step::Discard,
        },

        AnalogState::ReadPin => Step::Next(AnalogState::ReadChecksum { pin: byte }),
        AnalogState::ReadChecksum { pin } => {
            let reading = AnalogPin::new(pin)
                .filter(|_| ctx.checksum_ok(byte))
                .and_then(|pin| ctx.board.read_channel(pin).ok());

            let status = Status::from_success(reading.is_some());
            let mut reply = ctx.reply(ClassTag::Analog, AnalogOp::Read.to_byte(), status);
            reply.u16_be(reading.unwrap_or(0));
            reply.finish();
            Step::Done(status)
        }

        AnalogState::ReadAllChecksum => {
            let readings = if ctx.checksum_ok(byte) {
                read_all(&mut *ctx.board)
            } else {
                None
            };

            let status = Status::from_success(readings.is_some());
            let mut reply = ctx.reply(ClassTag::Analog, AnalogOp::ReadAll.to_byte(), status);
            for value in readings.unwrap_or([0; ANALOG_CHANNELS]) {
                reply.u16_be(value);
            }
            reply.finish();
            Step::Done(status)
        }
    }
}

/// Sample every channel in order; any failed conversion fails the lot
fn read_all<A: AnalogInput>(adc: &mut A) -> Option<[u16; ANALOG_CHANNELS]> {
    let mut readings = [0u16; ANALOG_CHANNELS];
    for (slot, pin) in readings.iter_mut().zip(AnalogPin::ALL) {
        *slot = adc.read_channel(pin).ok()?;
    }
    Some(readings)
}

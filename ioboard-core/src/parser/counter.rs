//! Edge counter sub-machine

use ioboard_protocol::{ByteSink, ClassTag, CounterOp, CounterPin, EdgeMode, Status};

use super::{Context, Step};
use crate::traits::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CounterState {
    AwaitingDataTag,
    ConfigPin,
    ConfigOptions { pin: u8 },
    ConfigChecksum { pin: u8, options: u8 },
    ReadPin,
    ReadChecksum { pin: u8 },
}

pub(super) fn feed<B, S>(state: CounterState, byte: u8, ctx: &mut Context<'_, B, S>) -> Step<CounterState>
where
    B: Board,
    S: ByteSink + ?Sized,
{
    match state {
        CounterState::AwaitingDataTag => match CounterOp::from_byte(byte) {
            Some(CounterOp::Config) => Step::Next(CounterState::ConfigPin),
            Some(CounterOp::Read) => Step::Next(CounterState::ReadPin),
            None => Step::Discard,
        },

        CounterState::ConfigPin => Step::Next(CounterState::ConfigOptions { pin: byte }),
        CounterState::ConfigOptions { pin } => {
            Step::Next(CounterState::ConfigChecksum { pin, options: byte })
        }
        CounterState::ConfigChecksum { pin, options } => {
            let target = CounterPin::from_number(pin)
                .zip(EdgeMode::from_options(options))
                .filter(|_| ctx.checksum_ok(byte));
            if let Some((pin, mode)) = target {
                // Edges caused by switching the pin over are not counted
                ctx.board.enable_counter(pin, mode);
                ctx.board.edges().arm_counter(pin, mode);
            }

            let status = Status::from_success(target.is_some());
            ctx.reply(ClassTag::Counter, CounterOp::Config.to_byte(), status)
                .finish();
            Step::Done(status)
        }

        CounterState::ReadPin => Step::Next(CounterState::ReadChecksum { pin: byte }),
        CounterState::ReadChecksum { pin } => {
            let count = CounterPin::from_number(pin)
                .filter(|_| ctx.checksum_ok(byte))
                .map(|pin| ctx.board.edges().take_count(pin));

            let status = Status::from_success(count.is_some());
            let mut reply = ctx.reply(ClassTag::Counter, CounterOp::Read.to_byte(), status);
            reply.byte(count.unwrap_or(0));
            reply.finish();
            Step::Done(status)
        }
    }
}

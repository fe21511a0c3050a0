//! GPIO sub-machine
//!
//! | op     | fields        | reply data |
//! |--------|---------------|------------|
//! | Config | pin, options  | -          |
//! | Read   | pin           | sample     |
//! | Write  | pin, value    | -          |

use ioboard_protocol::{ByteSink, ClassTag, DigitalPin, GpioOp, GpioOptions, PinSample, Status};

use super::{Context, Step};
use crate::traits::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpioState {
    AwaitingDataTag,
    ConfigPin,
    ConfigOptions { pin: u8 },
    ConfigChecksum { pin: u8, options: u8 },
    ReadPin,
    ReadChecksum { pin: u8 },
    WritePin,
    WriteValue { pin: u8 },
    WriteChecksum { pin: u8, value: u8 },
}

pub(super) fn feed<B, S>(state: GpioState, byte: u8, ctx: &mut Context<'_, B, S>) -> Step<GpioState>
where
    B: Board,
    S: ByteSink + ?Sized,
{
    match state {
        GpioState::AwaitingDataTag => match GpioOp::from_byte(byte) {
            Some(GpioOp::Config) => Step::Next(GpioState::ConfigPin),
            Some(GpioOp::Read) => Step::Next(GpioState::ReadPin),
            Some(GpioOp::Write) => Step::Next(GpioState::WritePin),
            None => Step::Discard,
        },

        GpioState::ConfigPin => Step::Next(GpioState::ConfigOptions { pin: byte }),
        GpioState::ConfigOptions { pin } => Step::Next(GpioState::ConfigChecksum { pin, options: byte }),
        GpioState::ConfigChecksum { pin, options } => {
            let target = DigitalPin::new(pin).filter(|_| ctx.checksum_ok(byte));
            if let Some(pin) = target {
                ctx.board.configure_pin(pin, GpioOptions::from_byte(options));
            }
            finish_ack(ctx, GpioOp::Config, target.is_some())
        }

        GpioState::ReadPin => Step::Next(GpioState::ReadChecksum { pin: byte }),
        GpioState::ReadChecksum { pin } => {
            let sample = DigitalPin::new(pin)
                .filter(|_| ctx.checksum_ok(byte))
                .map(|pin| {
                    let high = ctx.board.read_pin(pin);
                    let edges = ctx.board.edges().take_edges(pin);
                    PinSample {
                        high,
                        rose: edges.rose,
                        fell: edges.fell,
                    }
                });

            let status = Status::from_success(sample.is_some());
            let mut reply = ctx.reply(ClassTag::Gpio, GpioOp::Read.to_byte(), status);
            reply.byte(sample.map_or(0, PinSample::to_byte));
            reply.finish();
            Step::Done(status)
        }

        GpioState::WritePin => Step::Next(GpioState::WriteValue { pin: byte }),
        GpioState::WriteValue { pin } => Step::Next(GpioState::WriteChecksum { pin, value: byte }),
        GpioState::WriteChecksum { pin, value } => {
            let target = DigitalPin::new(pin).filter(|_| ctx.checksum_ok(byte));
            if let Some(pin) = target {
                ctx.board.write_pin(pin, value != 0);
            }
            finish_ack(ctx, GpioOp::Write, target.is_some())
        }
    }
}

fn finish_ack<B, S>(ctx: &mut Context<'_, B, S>, op: GpioOp, success: bool) -> Step<GpioState>
where
    B: Board,
    S: ByteSink + ?Sized,
{
    let status = Status::from_success(success);
    ctx.reply(ClassTag::Gpio, op.to_byte(), status).finish();
    Step::Done(status)
}

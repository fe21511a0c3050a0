//! Misc sub-machine: Reset, GetId, GetTemp
//!
//! All three operations are `[class, data, checksum]`.

use ioboard_protocol::{ByteSink, ClassTag, MiscOp, Status};

use super::{Context, Step};
use crate::traits::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MiscState {
    AwaitingDataTag,
    AwaitingChecksum(MiscOp),
}

pub(super) fn feed<B, S>(state: MiscState, byte: u8, ctx: &mut Context<'_, B, S>) -> Step<MiscState>
where
    B: Board,
    S: ByteSink + ?Sized,
{
    match state {
        MiscState::AwaitingDataTag => match MiscOp::from_byte(byte) {
            Some(op) => Step::Next(MiscState::AwaitingChecksum(op)),
            None => Step::Discard,
        },
        MiscState::AwaitingChecksum(op) => {
            let valid = ctx.checksum_ok(byte);
            let status = Status::from_success(valid);

            match op {
                MiscOp::Reset => {
                    ctx.reply(ClassTag::Misc, op.to_byte(), status).finish();
                    if valid {
                        Step::Reset
                    } else {
                        Step::Done(status)
                    }
                }
                MiscOp::GetId | MiscOp::GetTemp => {
                    let value = match (valid, op) {
                        (false, _) => 0,
                        (true, MiscOp::GetId) => ctx.board.board_id(),
                        (true, _) => ctx.board.read_die_temperature(),
                    };
                    let mut reply = ctx.reply(ClassTag::Misc, op.to_byte(), status);
                    reply.u16_be(value);
                    reply.finish();
                    Step::Done(status)
                }
            }
        }
    }
}

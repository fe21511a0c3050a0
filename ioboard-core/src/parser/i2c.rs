//! I2C bridge sub-machine
//!
//! Read and Write carry `address, offset, length`; Write follows with
//! `length` data bytes. Every declared data byte is consumed and summed
//! even past the write capacity, so the frame stays aligned and an
//! over-long write is answered with NOK rather than desynchronizing the
//! link. Reads beyond the read capacity are refused the same way, and the
//! NOK reply still has `length` (zeroed) data bytes.

use ioboard_hal::{I2cBus, I2cConfig};
use ioboard_protocol::{
    ByteSink, ClassTag, I2cOp, I2cSpeed, Status, I2C_READ_CAPACITY, I2C_WRITE_CAPACITY,
};

use super::{Context, Step};
use crate::traits::Board;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum I2cState {
    AwaitingDataTag,
    ConfigSpeed,
    ConfigChecksum {
        speed: u8,
    },
    ReadAddress,
    ReadOffset {
        address: u8,
    },
    ReadLength {
        address: u8,
        offset: u8,
    },
    ReadChecksum {
        address: u8,
        offset: u8,
        length: u8,
    },
    WriteAddress,
    WriteOffset {
        address: u8,
    },
    WriteLength {
        address: u8,
        offset: u8,
    },
    WriteData {
        address: u8,
        offset: u8,
        length: u8,
        received: u8,
    },
    WriteChecksum {
        address: u8,
        offset: u8,
        length: u8,
    },
}

pub(super) fn feed<B, S>(state: I2cState, byte: u8, ctx: &mut Context<'_, B, S>) -> Step<I2cState>
where
    B: Board,
    S: ByteSink + ?Sized,
{
    match state {
        I2cState::AwaitingDataTag => match I2cOp::from_byte(byte) {
            Some(I2cOp::Config) => Step::Next(I2cState::ConfigSpeed),
            Some(I2cOp::Read) => Step::Next(I2cState::ReadAddress),
            Some(I2cOp::Write) => Step::Next(I2cState::WriteAddress),
            None => Step::Discard,
        },

        I2cState::ConfigSpeed => Step::Next(I2cState::ConfigChecksum { speed: byte }),
        I2cState::ConfigChecksum { speed } => {
            let success = match I2cSpeed::from_byte(speed).filter(|_| ctx.checksum_ok(byte)) {
                Some(speed) => ctx.board.set_config(I2cConfig::from(speed)).is_ok(),
                None => false,
            };
            let status = Status::from_success(success);
            ctx.reply(ClassTag::I2c, I2cOp::Config.to_byte(), status)
                .finish();
            Step::Done(status)
        }

        I2cState::ReadAddress => Step::Next(I2cState::ReadOffset { address: byte }),
        I2cState::ReadOffset { address } => Step::Next(I2cState::ReadLength {
            address,
            offset: byte,
        }),
        I2cState::ReadLength { address, offset } => Step::Next(I2cState::ReadChecksum {
            address,
            offset,
            length: byte,
        }),
        I2cState::ReadChecksum {
            address,
            offset,
            length,
        } => {
            let len = length as usize;
            let mut buf = [0u8; I2C_READ_CAPACITY];
            let success = ctx.checksum_ok(byte)
                && len <= I2C_READ_CAPACITY
                && ctx
                    .board
                    .read_registers(address, offset, &mut buf[..len])
                    .is_ok();

            let status = Status::from_success(success);
            let mut reply = ctx.reply(ClassTag::I2c, I2cOp::Read.to_byte(), status);
            if success {
                reply.bytes(&buf[..len]);
            } else {
                reply.zeros(len);
            }
            reply.finish();
            Step::Done(status)
        }

        I2cState::WriteAddress => Step::Next(I2cState::WriteOffset { address: byte }),
        I2cState::WriteOffset { address } => Step::Next(I2cState::WriteLength {
            address,
            offset: byte,
        }),
        I2cState::WriteLength { address, offset } => {
            ctx.i2c_data.clear();
            if byte == 0 {
                Step::Next(I2cState::WriteChecksum {
                    address,
                    offset,
                    length: 0,
                })
            } else {
                Step::Next(I2cState::WriteData {
                    address,
                    offset,
                    length: byte,
                    received: 0,
                })
            }
        }
        I2cState::WriteData {
            address,
            offset,
            length,
            received,
        } => {
            // Bytes past capacity are summed but not kept
            let _ = ctx.i2c_data.push(byte);
            let received = received + 1;
            if received == length {
                Step::Next(I2cState::WriteChecksum {
                    address,
                    offset,
                    length,
                })
            } else {
                Step::Next(I2cState::WriteData {
                    address,
                    offset,
                    length,
                    received,
                })
            }
        }
        I2cState::WriteChecksum {
            address,
            offset,
            length,
        } => {
            let success = ctx.checksum_ok(byte)
                && (length as usize) <= I2C_WRITE_CAPACITY
                && write_registers(&mut *ctx.board, address, offset, ctx.i2c_data.as_slice());
            ctx.i2c_data.clear();

            let status = Status::from_success(success);
            ctx.reply(ClassTag::I2c, I2cOp::Write.to_byte(), status)
                .finish();
            Step::Done(status)
        }
    }
}

/// One bus write of `[offset, data...]`
fn write_registers<I: I2cBus>(bus: &mut I, address: u8, offset: u8, data: &[u8]) -> bool {
    let mut buf = [0u8; I2C_WRITE_CAPACITY + 1];
    buf[0] = offset;
    buf[1..=data.len()].copy_from_slice(data);
    bus.write(address, &buf[..=data.len()]).is_ok()
}

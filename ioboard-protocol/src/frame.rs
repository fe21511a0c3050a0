//! Frame encoding, decoding and checksums.
//!
//! Frame format:
//! - CLASS TAG (1 byte): subsystem
//! - DATA TAG (1 byte): operation within the subsystem
//! - PAYLOAD (0-258 bytes): operation-specific fields
//! - CHECKSUM (1 byte): sum of all preceding bytes, modulo 256
//!
//! Frames carry no length field. Both ends know the length of every
//! request and reply from its tags and leading fields.

use heapless::Vec;

use crate::tags::Status;

/// Maximum payload size in bytes (I2C write: address, offset, length, 255 data bytes)
pub const MAX_PAYLOAD_SIZE: usize = 3 + 255;

/// Maximum complete frame size (CLASS + DATA + MAX_PAYLOAD + CHECKSUM)
pub const MAX_FRAME_SIZE: usize = 2 + MAX_PAYLOAD_SIZE + 1;

/// Errors that can occur during frame encoding or decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// More payload than the longest request carries
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Fewer than the three bytes every frame has
    TooShort,
    /// Output slice shorter than the encoded frame
    BufferTooSmall,
}

/// Additive checksum over `bytes`, wrapping at 256
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Returns true if the last byte of `frame` is the checksum of the rest
///
/// An empty slice has no checksum position and never verifies.
pub fn verify(frame: &[u8]) -> bool {
    match frame.split_last() {
        Some((&sum, body)) => checksum(body) == sum,
        None => false,
    }
}

/// Running checksum, fed one byte at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum(u8);

impl Checksum {
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn update(&mut self, byte: u8) {
        self.0 = self.0.wrapping_add(byte);
    }

    pub fn update_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.update(b);
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns true if `byte` closes the frame summed so far
    pub fn matches(self, byte: u8) -> bool {
        self.0 == byte
    }
}

/// Destination for outgoing bytes
///
/// The device implements this for its transmit ring buffer. A sink that
/// cannot take a byte drops it.
pub trait ByteSink {
    fn push_byte(&mut self, byte: u8);
}

impl<const N: usize> ByteSink for Vec<u8, N> {
    fn push_byte(&mut self, byte: u8) {
        let _ = self.push(byte);
    }
}

#[cfg(feature = "std")]
impl ByteSink for std::vec::Vec<u8> {
    fn push_byte(&mut self, byte: u8) {
        self.push(byte);
    }
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn push_byte(&mut self, byte: u8) {
        (**self).push_byte(byte);
    }
}

/// Streams one reply frame into a sink
///
/// The header (tags and status) is written on construction and the
/// checksum on [`finish`](Self::finish), so replies of any length go out
/// without an intermediate buffer.
pub struct ReplyWriter<'a, S: ByteSink + ?Sized> {
    sink: &'a mut S,
    sum: Checksum,
}

impl<'a, S: ByteSink + ?Sized> ReplyWriter<'a, S> {
    /// Write `[class, data, status]` and start summing
    pub fn begin(sink: &'a mut S, class: u8, data: u8, status: Status) -> Self {
        let mut writer = Self {
            sink,
            sum: Checksum::new(),
        };
        writer.byte(class);
        writer.byte(data);
        writer.byte(status.to_byte());
        writer
    }

    pub fn byte(&mut self, byte: u8) {
        self.sum.update(byte);
        self.sink.push_byte(byte);
    }

    pub fn bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.byte(b);
        }
    }

    /// Write a 16-bit field, high byte first
    pub fn u16_be(&mut self, value: u16) {
        self.bytes(&value.to_be_bytes());
    }

    /// Write `count` zero bytes (data slots of a NOK reply)
    pub fn zeros(&mut self, count: usize) {
        for _ in 0..count {
            self.byte(0);
        }
    }

    /// Append the checksum, completing the frame
    pub fn finish(self) {
        self.sink.push_byte(self.sum.value());
    }
}

/// A complete frame held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Class tag byte
    pub class: u8,
    /// Data tag byte
    pub data: u8,
    /// Payload bytes between the tags and the checksum
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    pub fn new(class: u8, data: u8, payload: &[u8]) -> Result<Self, FrameError> {
        Ok(Self {
            class,
            data,
            payload: Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?,
        })
    }

    /// Tags only, as in `[0x01, 0x02, 0x03]` (GetId)
    pub fn empty(class: u8, data: u8) -> Self {
        Self {
            class,
            data,
            payload: Vec::new(),
        }
    }

    /// Total encoded length including the checksum
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + 3
    }

    /// Checksum this frame encodes with
    pub fn checksum(&self) -> u8 {
        let mut sum = Checksum::new();
        sum.update(self.class);
        sum.update(self.data);
        sum.update_slice(&self.payload);
        sum.value()
    }

    /// Write the wire bytes into `out`, returning how many were used
    pub fn encode(&self, out: &mut [u8]) -> Result<usize, FrameError> {
        let n = self.encoded_len();
        let out = out.get_mut(..n).ok_or(FrameError::BufferTooSmall)?;

        let (sum, body) = out.split_last_mut().ok_or(FrameError::BufferTooSmall)?;
        body[0] = self.class;
        body[1] = self.data;
        body[2..].copy_from_slice(&self.payload);
        *sum = self.checksum();

        Ok(n)
    }

    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut out = Vec::new();
        for byte in [self.class, self.data] {
            out.push(byte).map_err(|_| FrameError::BufferTooSmall)?;
        }
        out.extend_from_slice(&self.payload)
            .map_err(|_| FrameError::BufferTooSmall)?;
        out.push(self.checksum())
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(out)
    }

    /// Decode a complete frame, verifying its checksum
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < 3 {
            return Err(FrameError::TooShort);
        }
        if verify(bytes) {
            Self::new(bytes[0], bytes[1], &bytes[2..bytes.len() - 1])
        } else {
            Err(FrameError::InvalidChecksum)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_checksum_wraps() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x01, 0x01]), 0x02);
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum(&[0x80; 4]), 0x00);
    }

    #[test]
    fn test_verify_reset_request() {
        assert!(verify(&[0x01, 0x01, 0x02]));
        assert!(!verify(&[0x01, 0x01, 0x03]));
        assert!(!verify(&[]));
        // A lone zero byte is the checksum of nothing
        assert!(verify(&[0x00]));
    }

    #[test]
    fn test_frame_encode_gpio_write() {
        let frame = Frame::new(0x02, 0x03, &[13, 1]).unwrap();
        let mut out = [0u8; 8];
        assert_eq!(frame.encode(&mut out), Ok(5));
        assert_eq!(&out[..5], &[0x02, 0x03, 13, 1, 19]);
    }

    #[test]
    fn test_frame_encode_buffer_too_small() {
        let frame = Frame::new(0x02, 0x03, &[13, 1]).unwrap();
        let mut buffer = [0u8; 4];
        assert_eq!(frame.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_frame_decode() {
        let frame = Frame::decode(&[0x02, 0x03, 1, 0x06]).unwrap();
        assert_eq!(frame.class, 0x02);
        assert_eq!(frame.data, 0x03);
        assert_eq!(&frame.payload[..], &[1]);

        assert_eq!(
            Frame::decode(&[0x03, 0x02, 0, 0xFF]),
            Err(FrameError::InvalidChecksum)
        );
        assert_eq!(Frame::decode(&[0x01, 0x01]), Err(FrameError::TooShort));
    }

    #[test]
    fn test_oversized_payload_rejected() {
        let payload = [0u8; MAX_PAYLOAD_SIZE + 1];
        assert_eq!(
            Frame::new(0x04, 0x03, &payload),
            Err(FrameError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_reply_writer_ok() {
        let mut out = Vec::<u8, 16>::new();
        let mut reply = ReplyWriter::begin(&mut out, 0x01, 0x02, Status::Ok);
        reply.u16_be(0x0002);
        reply.finish();

        assert_eq!(&out[..], &[0x01, 0x02, 0x01, 0x00, 0x02, 0x06]);
        assert!(verify(&out));
    }

    #[test]
    fn test_reply_writer_nok_zeros() {
        let mut out = Vec::<u8, 16>::new();
        let mut reply = ReplyWriter::begin(&mut out, 0x03, 0x02, Status::Nok);
        reply.zeros(2);
        reply.finish();

        assert_eq!(&out[..], &[0x03, 0x02, 0x00, 0x00, 0x00, 0x05]);
    }

    proptest! {
        #[test]
        fn prop_appended_checksum_verifies(body in proptest::collection::vec(any::<u8>(), 1..64)) {
            let mut frame = body.clone();
            frame.push(checksum(&body));
            prop_assert!(verify(&frame));
        }

        #[test]
        fn prop_single_byte_corruption_detected(
            body in proptest::collection::vec(any::<u8>(), 1..64),
            index in any::<prop::sample::Index>(),
            delta in 1u8..=255,
        ) {
            let mut frame = body.clone();
            frame.push(checksum(&body));
            let i = index.index(body.len());
            frame[i] = frame[i].wrapping_add(delta);
            prop_assert!(!verify(&frame));
        }

        #[test]
        fn prop_running_checksum_matches(body in proptest::collection::vec(any::<u8>(), 0..64)) {
            let mut sum = Checksum::new();
            sum.update_slice(&body);
            prop_assert_eq!(sum.value(), checksum(&body));
        }
    }
}

//! Byte transport between the serial interrupt context and the main loop
//!
//! One ring buffer per direction. The receive side is filled by the UART
//! receive handler and drained by the main loop; the transmit side the
//! other way round.
//!
//! A full ring drops the incoming byte and reports it only through the
//! `push` return value. Nobody upstream acts on that, so an overflowing
//! receive ring can desynchronize the parser until the next Reset.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use ioboard_protocol::ByteSink;

/// Fixed-capacity circular byte queue
///
/// `N` must be a power of two so cursors wrap with a mask.
#[derive(Debug, Clone)]
pub struct RingBuffer<const N: usize> {
    buf: [u8; N],
    read: usize,
    write: usize,
    len: usize,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "ring capacity must be a power of two");
        N - 1
    };

    /// Create an empty ring
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            read: 0,
            write: 0,
            len: 0,
        }
    }

    /// Append a byte
    ///
    /// Returns false and drops the byte if the ring is full.
    pub fn push(&mut self, byte: u8) -> bool {
        if self.len == N {
            return false;
        }
        self.buf[self.write] = byte;
        self.write = (self.write + 1) & Self::MASK;
        self.len += 1;
        true
    }

    /// Take the oldest byte
    pub fn pop(&mut self) -> Option<u8> {
        if self.len == 0 {
            return None;
        }
        let byte = self.buf[self.read];
        self.read = (self.read + 1) & Self::MASK;
        self.len -= 1;
        Some(byte)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Discard all queued bytes
    pub fn clear(&mut self) {
        self.read = 0;
        self.write = 0;
        self.len = 0;
    }
}

/// Ring buffer shared between an interrupt handler and the main loop
///
/// Every operation runs inside one critical section, so a push from the
/// interrupt side can never interleave with a pop in the middle of a cursor
/// update. Intended to live in a `static`.
pub struct SharedRing<const N: usize> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<RingBuffer<N>>>,
}

impl<const N: usize> Default for SharedRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> SharedRing<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer::new())),
        }
    }

    /// Append a byte; false if the ring was full and the byte dropped
    pub fn push(&self, byte: u8) -> bool {
        self.inner.lock(|ring| ring.borrow_mut().push(byte))
    }

    /// Take the oldest byte
    pub fn pop(&self) -> Option<u8> {
        self.inner.lock(|ring| ring.borrow_mut().pop())
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|ring| ring.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&self) {
        self.inner.lock(|ring| ring.borrow_mut().clear());
    }
}

impl<const N: usize> ByteSink for &SharedRing<N> {
    fn push_byte(&mut self, byte: u8) {
        // Full transmit ring: the byte is lost
        let _ = self.push(byte);
    }
}

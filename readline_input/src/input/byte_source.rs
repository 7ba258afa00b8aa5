// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io, time::Duration};

/// Result of [`ByteSource::read_byte_within`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitOutcome {
    /// A byte arrived before the deadline.
    Byte(u8),
    /// The deadline passed. Nothing was consumed.
    Elapsed,
    /// The source is exhausted.
    Eof,
}

/// Where the decoder gets its bytes from. One byte at a time, in order.
///
/// Implementations must make sure an [`WaitOutcome::Elapsed`] wait did not consume a
/// byte. A byte that shows up after the deadline has to be returned by the next read.
pub trait ByteSource {
    /// Block until a byte is available. `Ok(None)` is end of input.
    ///
    /// # Errors
    ///
    /// Any I/O error from the underlying source.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Wait at most `timeout` for a byte.
    ///
    /// # Errors
    ///
    /// Any I/O error from the underlying source.
    fn read_byte_within(&mut self, timeout: Duration) -> io::Result<WaitOutcome>;
}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn read_byte(&mut self) -> io::Result<Option<u8>> { (**self).read_byte() }

    fn read_byte_within(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        (**self).read_byte_within(timeout)
    }
}

impl<T: ByteSource + ?Sized> ByteSource for Box<T> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> { (**self).read_byte() }

    fn read_byte_within(&mut self, timeout: Duration) -> io::Result<WaitOutcome> {
        (**self).read_byte_within(timeout)
    }
}

//! Chunk stream reader and writer.
//!
//! Wire format, repeated until end of stream:
//!
//! ```text
//! +0   name     8 bytes, NUL-padded ASCII
//! +8   length   u64 little-endian, payload bytes excluding this header
//! +16  payload  `length` bytes, padded to a multiple of 8
//! ```
//!
//! The codec is pure transport: it never interprets names or payloads.

use std::io::{self, ErrorKind, Read, Write};

use crate::common::CodecError;
use crate::state::chunk::{CHUNK_ALIGN, Chunk, ChunkName, HEADER_LEN, NAME_LEN, padded_len};

/// Reads until `buf` is full or the stream ends; returns the number of bytes read.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Lazy, single-pass chunk decoder.
///
/// Yields one chunk per header until the stream ends cleanly on a header boundary. A
/// truncated header or payload yields one error, after which the reader is exhausted.
#[derive(Debug)]
pub struct ChunkReader<R> {
    inner: R,
    done: bool,
}

impl<R: Read> ChunkReader<R> {
    /// Wraps a byte stream.
    pub const fn new(inner: R) -> Self {
        Self { inner, done: false }
    }

    /// Reads the next chunk, or `None` at a clean end of stream.
    ///
    /// # Errors
    ///
    /// [`CodecError::ShortHeader`] or [`CodecError::ShortPayload`] if the stream ends
    /// mid-record; [`CodecError::Io`] if the underlying read fails.
    pub fn read_chunk(&mut self) -> Result<Option<Chunk>, CodecError> {
        let mut header = [0u8; HEADER_LEN];
        let got = read_full(&mut self.inner, &mut header)?;
        if got == 0 {
            return Ok(None);
        }
        if got < HEADER_LEN {
            return Err(CodecError::ShortHeader {
                got,
                expected: HEADER_LEN,
            });
        }

        let mut name = [0u8; NAME_LEN];
        name.copy_from_slice(&header[..NAME_LEN]);
        let name = ChunkName::from_bytes(name);
        let mut len = [0u8; 8];
        len.copy_from_slice(&header[NAME_LEN..]);
        let len = u64::from_le_bytes(len);

        // Grow with the data actually present so a corrupt length can't force a huge
        // allocation up front.
        let mut data = Vec::new();
        let got = (&mut self.inner).take(len).read_to_end(&mut data)? as u64;
        if got < len {
            return Err(CodecError::ShortPayload {
                name: name.to_string(),
                got,
                expected: len,
            });
        }
        Ok(Some(Chunk { name, data }))
    }

    /// Returns the underlying stream.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Iterator for ChunkReader<R> {
    type Item = Result<Chunk, CodecError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> std::iter::FusedIterator for ChunkReader<R> {}

/// Chunk encoder; pads every payload to the chunk alignment.
#[derive(Debug)]
pub struct ChunkWriter<W> {
    inner: W,
    written: u64,
}

impl<W: Write> ChunkWriter<W> {
    /// Wraps a byte sink.
    pub const fn new(inner: W) -> Self {
        Self { inner, written: 0 }
    }

    /// Encodes one chunk.
    ///
    /// The length field records the padded payload size, so a reader consumes the padding
    /// as part of the payload.
    pub fn write_chunk(&mut self, chunk: &Chunk) -> Result<(), CodecError> {
        let padded = padded_len(chunk.data.len());
        self.inner.write_all(chunk.name.as_bytes())?;
        self.inner.write_all(&(padded as u64).to_le_bytes())?;
        self.inner.write_all(&chunk.data)?;
        let pad = [0u8; CHUNK_ALIGN];
        self.inner.write_all(&pad[..padded - chunk.data.len()])?;
        self.written += (HEADER_LEN + padded) as u64;
        Ok(())
    }

    /// Encodes a `u64` scalar chunk.
    pub fn write_scalar(&mut self, name: ChunkName, value: u64) -> Result<(), CodecError> {
        self.write_chunk(&Chunk::scalar(name, value))
    }

    /// Total bytes emitted so far, headers included.
    pub const fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Flushes and returns the underlying sink.
    pub fn finish(mut self) -> Result<W, CodecError> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

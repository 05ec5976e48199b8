//! Checked reader over framed message bytes.
//!
//! The transport is expected to have already framed the message: the reader
//! operates on a complete message body and never waits for more bytes. A
//! short read is a decode failure, not a retry.

use bytes::Buf;

use crate::{Error, Result};

/// Sequential big-endian reader over a RowDescription message body.
pub struct WireReader<'a> {
    buf: &'a [u8],
}

impl<'a> WireReader<'a> {
    /// Wrap a message body positioned at its first byte.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn check(&self, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(Error::InvalidMessage {
                message: format!(
                    "truncated message: need {} bytes, have {}",
                    needed,
                    self.buf.remaining()
                ),
            });
        }
        Ok(())
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        self.check(2)?;
        Ok(self.buf.get_u16())
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        self.check(2)?;
        Ok(self.buf.get_i16())
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        self.check(4)?;
        Ok(self.buf.get_u32())
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        self.check(4)?;
        Ok(self.buf.get_i32())
    }

    /// Read a null-terminated string, consuming the terminator.
    ///
    /// Invalid UTF-8 is replaced rather than rejected, matching how column
    /// names are handled elsewhere in the ecosystem.
    pub fn read_cstr(&mut self) -> Result<String> {
        let Some(end) = self.buf.iter().position(|&b| b == 0) else {
            return Err(Error::InvalidMessage {
                message: "unterminated string in message".to_string(),
            });
        };
        let value = String::from_utf8_lossy(&self.buf[..end]).to_string();
        self.buf.advance(end + 1);
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::{BufMut, BytesMut};

    #[test]
    fn test_read_primitives() {
        let mut buf = BytesMut::new();
        buf.put_u16(513);
        buf.put_i16(-2);
        buf.put_u32(70000);
        buf.put_i32(-70000);
        let bytes = buf.freeze();

        let mut reader = WireReader::new(&bytes);
        assert_eq!(reader.read_u16().unwrap(), 513);
        assert_eq!(reader.read_i16().unwrap(), -2);
        assert_eq!(reader.read_u32().unwrap(), 70000);
        assert_eq!(reader.read_i32().unwrap(), -70000);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_cstr() {
        let mut reader = WireReader::new(b"name\0rest");
        assert_eq!(reader.read_cstr().unwrap(), "name");
        assert_eq!(reader.remaining(), 4);
    }

    #[test]
    fn test_short_read_fails() {
        let mut reader = WireReader::new(&[0x01]);
        assert!(reader.read_u32().is_err());

        let mut reader = WireReader::new(b"no terminator");
        assert!(reader.read_cstr().is_err());
    }
}

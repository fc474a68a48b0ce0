use byteorder::{BigEndian, ByteOrder};

use crate::{ClassFileError, Result};

type Endian = BigEndian;

/// What a short read reports: running off the class file itself, or off the
/// payload of an attribute that is being decoded on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bounds {
    Buffer,
    Payload,
}

/// Bounds-checked big-endian cursor over a byte slice.
///
/// A failed read leaves the position untouched; no partial values are ever
/// returned.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    base_offset: usize,
    bounds: Bounds,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            base_offset: 0,
            bounds: Bounds::Buffer,
        }
    }

    /// A cursor over an attribute payload that starts at `base_offset` in the
    /// enclosing class file. Positions are zero-based within the payload but
    /// errors carry absolute offsets.
    pub(crate) fn payload(buf: &'a [u8], base_offset: usize) -> Self {
        Self {
            buf,
            pos: 0,
            base_offset,
            bounds: Bounds::Payload,
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Absolute offset of the first byte of the buffer in the class file.
    pub fn base_offset(&self) -> usize {
        self.base_offset
    }

    /// Absolute offset of the next byte in the class file.
    pub fn offset(&self) -> usize {
        self.base_offset + self.pos
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(Endian::read_u16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(Endian::read_u32(self.take(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(Endian::read_i32(self.take(4)?))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len)
    }

    fn take(&mut self, needed: usize) -> Result<&'a [u8]> {
        if self.remaining() < needed {
            return Err(self.short_read(needed));
        }

        let bytes = &self.buf[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(bytes)
    }

    fn short_read(&self, needed: usize) -> ClassFileError {
        let offset = self.offset();
        let available = self.remaining();
        match self.bounds {
            Bounds::Buffer => ClassFileError::OutOfBounds {
                offset,
                needed,
                available,
            },
            Bounds::Payload => ClassFileError::TruncatedPayload {
                offset,
                needed,
                available,
            },
        }
    }
}

#[cfg(test)]
mod read_tests {
    use super::*;

    #[test]
    fn it_should_read_a_big_endian_u16() {
        let mut r = ByteReader::new(&[0x00, 0x03]);

        assert_eq!(r.read_u16().unwrap(), 3);
        assert_eq!(r.position(), 2);
        assert!(r.is_empty());
    }

    #[test]
    fn it_should_read_each_width() {
        let mut r = ByteReader::new(&[0xca, 0xfe, 0xba, 0xbe, 0x12, 0x34, 0x56, 0xff]);

        assert_eq!(r.read_u32().unwrap(), 0xcafebabe);
        assert_eq!(r.read_u16().unwrap(), 0x1234);
        assert_eq!(r.read_u8().unwrap(), 0x56);
        assert_eq!(r.read_u8().unwrap(), 0xff);
        assert_eq!(r.position(), 8);
    }

    #[test]
    fn it_should_read_a_negative_i32() {
        assert_eq!(
            ByteReader::new(&[0xff, 0xff, 0xff, 0xfe]).read_i32().unwrap(),
            -2
        );
    }

    #[test]
    fn it_should_fail_if_there_is_not_enough_data() {
        let mut r = ByteReader::new(&[0x01, 0x02, 0x03]);

        assert_eq!(
            r.read_u32(),
            Err(ClassFileError::OutOfBounds {
                offset: 0,
                needed: 4,
                available: 3
            })
        );
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn it_should_not_advance_after_a_failed_read() {
        let mut r = ByteReader::new(&[0x01, 0x02, 0x03]);
        r.read_u16().unwrap();

        assert!(r.read_u16().is_err());
        assert_eq!(r.position(), 2);
        assert_eq!(r.read_u8().unwrap(), 0x03);
    }

    #[test]
    fn it_should_report_truncated_payloads_with_absolute_offsets() {
        let mut r = ByteReader::payload(&[0x00, 0x01, 0x02], 100);
        r.read_u16().unwrap();

        assert_eq!(
            r.read_bytes(2),
            Err(ClassFileError::TruncatedPayload {
                offset: 102,
                needed: 2,
                available: 1
            })
        );
    }
}

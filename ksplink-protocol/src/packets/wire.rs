//! Little-endian field cursors over payload buffers

use crate::frame::FrameError;

/// Sequential reader over a received payload
pub(crate) struct PayloadReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PayloadReader<'a> {
    pub(crate) fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], FrameError> {
        let end = self.pos + N;
        let bytes = self.buf.get(self.pos..end).ok_or(FrameError::BufferTooSmall)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        self.pos = end;
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, FrameError> {
        self.take::<1>().map(|b| b[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, FrameError> {
        self.take::<2>().map(u16::from_le_bytes)
    }

    pub(crate) fn i16(&mut self) -> Result<i16, FrameError> {
        self.take::<2>().map(i16::from_le_bytes)
    }
}

/// Sequential writer into an outbound payload
pub(crate) struct PayloadWriter<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> PayloadWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far
    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    fn put(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        let end = self.pos + bytes.len();
        let slot = self
            .buf
            .get_mut(self.pos..end)
            .ok_or(FrameError::BufferTooSmall)?;
        slot.copy_from_slice(bytes);
        self.pos = end;
        Ok(())
    }

    pub(crate) fn u8(&mut self, value: u8) -> Result<(), FrameError> {
        self.put(&[value])
    }

    pub(crate) fn u16(&mut self, value: u16) -> Result<(), FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub(crate) fn i16(&mut self, value: i16) -> Result<(), FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub(crate) fn i32(&mut self, value: i32) -> Result<(), FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub(crate) fn u32(&mut self, value: u32) -> Result<(), FrameError> {
        self.put(&value.to_le_bytes())
    }

    pub(crate) fn f32(&mut self, value: f32) -> Result<(), FrameError> {
        self.put(&value.to_le_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_little_endian() {
        let buf = [0x01, 0x34, 0x12, 0xF4, 0x01, 0x0C, 0xFE];
        let mut reader = PayloadReader::new(&buf);
        assert_eq!(reader.u8().unwrap(), 0x01);
        assert_eq!(reader.u16().unwrap(), 0x1234);
        assert_eq!(reader.i16().unwrap(), 500);
        assert_eq!(reader.i16().unwrap(), -500);
        assert_eq!(reader.u8(), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_writer_overflow() {
        let mut buf = [0u8; 3];
        let mut writer = PayloadWriter::new(&mut buf);
        writer.u16(0xBEEF).unwrap();
        assert_eq!(writer.position(), 2);
        assert_eq!(writer.u16(1), Err(FrameError::BufferTooSmall));
        writer.u8(7).unwrap();
        assert_eq!(buf, [0xEF, 0xBE, 7]);
    }
}

//! Byte-level writer/reader for the save-state payload.
//!
//! Everything is little-endian and written in a fixed field order; there
//! is no self-description in the payload. The version field in the
//! header is what guards format changes.

use super::error::SaveStateError;

/// Appends fixed-width fields to a byte buffer.
#[derive(Debug, Default)]
pub struct StateWriter {
    buffer: Vec<u8>,
}

impl StateWriter {
    /// Create an empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the writer, returning the accumulated bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Write a u8.
    pub fn u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    /// Write a bool as one byte.
    pub fn bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    /// Write a u16.
    pub fn u16(&mut self, value: u16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write an i16.
    pub fn i16(&mut self, value: i16) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a u32.
    pub fn u32(&mut self, value: u32) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a u64.
    pub fn u64(&mut self, value: u64) {
        self.buffer.extend_from_slice(&value.to_le_bytes());
    }

    /// Write a raw byte slice (no length prefix).
    pub fn bytes(&mut self, value: &[u8]) {
        self.buffer.extend_from_slice(value);
    }

    /// Write a length-prefixed byte slice.
    pub fn chunk(&mut self, value: &[u8]) {
        self.u32(value.len() as u32);
        self.bytes(value);
    }
}

/// Reads fixed-width fields back out of a blob.
#[derive(Debug)]
pub struct StateReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> StateReader<'a> {
    /// Wrap a byte slice.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], SaveStateError> {
        let end = self
            .position
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(SaveStateError::Corrupt)?;
        let slice = &self.data[self.position..end];
        self.position = end;
        Ok(slice)
    }

    /// Read a u8.
    pub fn u8(&mut self) -> Result<u8, SaveStateError> {
        Ok(self.take(1)?[0])
    }

    /// Read a bool.
    pub fn bool(&mut self) -> Result<bool, SaveStateError> {
        Ok(self.u8()? != 0)
    }

    /// Read a u16.
    pub fn u16(&mut self) -> Result<u16, SaveStateError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read an i16.
    pub fn i16(&mut self) -> Result<i16, SaveStateError> {
        let bytes = self.take(2)?;
        Ok(i16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Read a u32.
    pub fn u32(&mut self) -> Result<u32, SaveStateError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read a u64.
    pub fn u64(&mut self) -> Result<u64, SaveStateError> {
        let bytes = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(u64::from_le_bytes(raw))
    }

    /// Read exactly `out.len()` raw bytes.
    pub fn bytes_into(&mut self, out: &mut [u8]) -> Result<(), SaveStateError> {
        let slice = self.take(out.len())?;
        out.copy_from_slice(slice);
        Ok(())
    }

    /// Read a length-prefixed byte slice.
    pub fn chunk(&mut self) -> Result<&'a [u8], SaveStateError> {
        let len = self.u32()? as usize;
        self.take(len)
    }

    /// Require that every byte has been consumed.
    pub fn finish(self) -> Result<(), SaveStateError> {
        if self.position == self.data.len() {
            Ok(())
        } else {
            Err(SaveStateError::Corrupt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut writer = StateWriter::new();
        writer.u8(0xAB);
        writer.bool(true);
        writer.u16(0x1234);
        writer.u32(0xDEAD_BEEF);
        writer.u64(0x0123_4567_89AB_CDEF);
        writer.chunk(&[1, 2, 3]);
        let blob = writer.into_bytes();

        let mut reader = StateReader::new(&blob);
        assert_eq!(reader.u8().unwrap(), 0xAB);
        assert!(reader.bool().unwrap());
        assert_eq!(reader.u16().unwrap(), 0x1234);
        assert_eq!(reader.u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(reader.u64().unwrap(), 0x0123_4567_89AB_CDEF);
        assert_eq!(reader.chunk().unwrap(), &[1, 2, 3]);
        reader.finish().unwrap();
    }

    #[test]
    fn test_truncated_read_is_corrupt() {
        let mut reader = StateReader::new(&[0x01]);
        assert_eq!(reader.u16(), Err(SaveStateError::Corrupt));
    }

    #[test]
    fn test_trailing_bytes_are_corrupt() {
        let reader = StateReader::new(&[0x01]);
        assert_eq!(reader.finish(), Err(SaveStateError::Corrupt));
    }
}

//! Bounds-checked reader over container bytes.

use crate::error::{Error, Result};

pub(crate) struct Cursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn read_u8(&mut self, field: &str) -> Result<u8> {
        Ok(self.read_exact(1, field)?[0])
    }

    pub fn read_exact(&mut self, len: usize, field: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(Error::MalformedContainer(format!(
                "{field} needs {len} bytes at offset {} but only {} remain",
                self.offset,
                self.remaining()
            )));
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    /// Reads a one-byte length followed by that many bytes.
    pub fn read_prefixed(&mut self, field: &str) -> Result<&'a [u8]> {
        let len = self.read_u8(field)? as usize;
        self.read_exact(len, field)
    }

    /// Consumes everything left.
    pub fn rest(&mut self) -> &'a [u8] {
        let bytes = &self.data[self.offset..];
        self.offset = self.data.len();
        bytes
    }
}

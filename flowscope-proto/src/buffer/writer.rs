use std::collections::HashMap;
use std::fmt::Display;

use super::MAX_MESSAGE_SIZE;

#[derive(Debug, PartialEq, Eq)]
pub enum WriterError {
    EndOfBuffer,
    LabelTooLong(usize),
}

impl Display for WriterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfBuffer => write!(f, "message exceeds {MAX_MESSAGE_SIZE} octets"),
            Self::LabelTooLong(length) => write!(f, "label length {length} exceeds 63 octets"),
        }
    }
}

impl std::error::Error for WriterError {}

/// Encode side of the wire format. Grows up to the UDP payload limit and
/// compresses repeated names by pointing back at their first occurrence.
pub struct MessageWriter {
    buf: Vec<u8>,
    labels: HashMap<String, usize>,
}

impl Default for MessageWriter {
    fn default() -> Self {
        Self {
            buf: Vec::with_capacity(MAX_MESSAGE_SIZE),
            labels: HashMap::new(),
        }
    }
}

impl MessageWriter {
    /// Number of octets written so far
    pub fn pos(&self) -> usize {
        self.buf.len()
    }

    /// The encoded message
    pub fn bytes(&self) -> &[u8] {
        &self.buf
    }

    /// The encoded message as an owned buffer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_u8(&mut self, val: u8) -> Result<(), WriterError> {
        if self.buf.len() >= MAX_MESSAGE_SIZE {
            return Err(WriterError::EndOfBuffer);
        }
        self.buf.push(val);
        Ok(())
    }

    pub fn write_u16(&mut self, val: u16) -> Result<(), WriterError> {
        self.write_u8((val >> 8) as u8)?;
        self.write_u8((val & 0xFF) as u8)?;

        Ok(())
    }

    pub fn write_u32(&mut self, val: u32) -> Result<(), WriterError> {
        self.write_u16((val >> 16) as u16)?;
        self.write_u16((val & 0xFFFF) as u16)?;

        Ok(())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        for val in bytes {
            self.write_u8(*val)?;
        }
        Ok(())
    }

    /// Patch two octets at an already-written position, used to backfill
    /// rdlength once the rdata size is known.
    pub fn set_u16(&mut self, pos: usize, val: u16) -> Result<(), WriterError> {
        if pos + 1 >= self.buf.len() {
            return Err(WriterError::EndOfBuffer);
        }
        self.buf[pos] = (val >> 8) as u8;
        self.buf[pos + 1] = (val & 0xFF) as u8;

        Ok(())
    }

    fn write_label(&mut self, label: &str) -> Result<(), WriterError> {
        if label.len() > 0x3F {
            return Err(WriterError::LabelTooLong(label.len()));
        }
        self.write_u8(label.len() as u8)?;
        self.write_bytes(label.as_bytes())
    }

    fn recursive_write_name(&mut self, name: &str) -> Result<bool, WriterError> {
        if let Some(index) = self.labels.get(name) {
            self.write_u16(0xC000 | (*index as u16))?;
            Ok(true)
        } else {
            self.labels.insert(name.to_string(), self.pos());
            if let Some((head, tail)) = name.split_once('.') {
                self.write_label(head)?;
                self.recursive_write_name(tail)
            } else {
                self.write_label(name)?;
                Ok(false)
            }
        }
    }

    /// Write a name as length-prefixed labels, compressing suffixes already
    /// present in the message. The root name is the bare terminator.
    pub fn write_name(&mut self, name: &str) -> Result<(), WriterError> {
        if name.is_empty() {
            return self.write_u8(0);
        }
        if !self.recursive_write_name(name)? {
            self.write_u8(0)?;
        }

        Ok(())
    }
}

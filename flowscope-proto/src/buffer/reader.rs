use std::collections::HashSet;
use std::fmt::Display;

/// Longest name allowed on the wire, in octets, after reassembly.
const MAX_NAME: usize = 255;

#[derive(Debug, PartialEq, Eq)]
pub enum ReaderError {
    EndOfBuffer,
    PointerOutOfBounds(usize),
    PointerLoop(usize),
    LabelTooLong(u8),
    NameTooLong(usize),
    RdataLength { qtype: u16, length: u16 },
}

impl Display for ReaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EndOfBuffer => write!(f, "end of buffer"),
            Self::PointerOutOfBounds(offset) => {
                write!(f, "name pointer targets offset {offset} outside the message")
            }
            Self::PointerLoop(offset) => {
                write!(f, "name pointer revisits offset {offset}")
            }
            Self::LabelTooLong(length) => write!(f, "label length {length} exceeds 63 octets"),
            Self::NameTooLong(length) => {
                write!(f, "name length {length} exceeds {MAX_NAME} octets")
            }
            Self::RdataLength { qtype, length } => {
                write!(f, "rdata length {length} invalid for record type {qtype}")
            }
        }
    }
}

impl std::error::Error for ReaderError {}

/// Cursor over a received message. Borrows the packet bytes, so nothing is
/// copied until a typed field is materialized.
pub struct MessageReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> MessageReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current position within the message
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Step the position forward a specific number of octets
    pub fn step(&mut self, steps: usize) -> Result<(), ReaderError> {
        if self.pos + steps > self.buf.len() {
            return Err(ReaderError::EndOfBuffer);
        }
        self.pos += steps;

        Ok(())
    }

    /// Get a single octet, without moving the position
    fn get(&self, pos: usize) -> Result<u8, ReaderError> {
        if pos >= self.buf.len() {
            return Err(ReaderError::EndOfBuffer);
        }
        Ok(self.buf[pos])
    }

    /// Read a single octet and move the position one step forward
    pub fn read_u8(&mut self) -> Result<u8, ReaderError> {
        let res = self.get(self.pos)?;
        self.pos += 1;

        Ok(res)
    }

    /// Read two octets big-endian, stepping two steps forward
    pub fn read_u16(&mut self) -> Result<u16, ReaderError> {
        let res = ((self.read_u8()? as u16) << 8) | (self.read_u8()? as u16);

        Ok(res)
    }

    /// Read four octets big-endian, stepping four steps forward
    pub fn read_u32(&mut self) -> Result<u32, ReaderError> {
        let res = ((self.read_u16()? as u32) << 16) | (self.read_u16()? as u32);

        Ok(res)
    }

    /// Read a run of octets, stepping past them
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReaderError> {
        let end = self.pos + len;
        if end > self.buf.len() {
            return Err(ReaderError::EndOfBuffer);
        }
        let res = &self.buf[self.pos..end];
        self.pos = end;

        Ok(res)
    }

    fn recursive_read_name(
        &self,
        position: usize,
        taken: usize,
        visited: &mut HashSet<usize>,
    ) -> Result<(String, usize), ReaderError> {
        // At this point we're always at the beginning of a label, and labels
        // start with a length octet.
        let length = self.get(position)?;

        // When the two most significant bits are set, the octet is the head
        // of a pointer to some other offset in the message. Messages are
        // untrusted data and a crafted packet can chain pointers into a
        // cycle, so every followed offset is recorded and may be visited
        // only once.
        if (length & 0xC0) == 0xC0 {
            let b2 = self.get(position + 1)? as u16;
            let offset = ((((length as u16) ^ 0xC0) << 8) | b2) as usize;
            if offset >= self.buf.len() {
                return Err(ReaderError::PointerOutOfBounds(offset));
            }
            if !visited.insert(offset) {
                return Err(ReaderError::PointerLoop(offset));
            }
            let (label, _) = self.recursive_read_name(offset, taken, visited)?;
            Ok((label, position + 2))
        } else if length == 0 {
            // Names are terminated by the empty root label.
            Ok((String::new(), position + 1))
        } else if length >= 0x40 {
            // The 01 and 10 prefixes are reserved; a plain label never
            // exceeds 63 octets.
            Err(ReaderError::LabelTooLong(length))
        } else {
            let length = length as usize;
            let taken = taken + 1 + length;
            if taken > MAX_NAME {
                return Err(ReaderError::NameTooLong(taken));
            }
            let end = position + 1 + length;
            if end > self.buf.len() {
                return Err(ReaderError::EndOfBuffer);
            }
            let label = String::from_utf8_lossy(&self.buf[position + 1..end]).to_lowercase();

            let (tail, next_position) = self.recursive_read_name(end, taken, visited)?;

            let name = if tail.is_empty() {
                label
            } else {
                format!("{label}.{tail}")
            };
            Ok((name, next_position))
        }
    }

    /// Read a possibly compressed name.
    ///
    /// Turns the wire form [3]www[7]example[3]com[0] into `www.example.com`,
    /// following compression pointers where present. Labels are lowercased
    /// so that every name observed by the caller is already normalized.
    pub fn read_name(&mut self) -> Result<String, ReaderError> {
        let mut visited = HashSet::new();
        let (name, position) = self.recursive_read_name(self.pos, 0, &mut visited)?;
        self.pos = position;
        Ok(name)
    }
}

use crate::buffer::reader::{MessageReader, ReaderError};
use crate::buffer::writer::{MessageWriter, WriterError};

/// Fixed 12-octet message header: transaction id, flags word and the four
/// section counts.
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Header {
    /// A 16 bit identifier assigned by the program that generates the
    /// query. The identifier is copied into the corresponding reply so the
    /// requester can match replies to outstanding queries.
    pub id: u16,

    /// RD - directs the name server to pursue the query recursively.
    pub recursion_desired: bool,
    /// TC - the message was truncated to fit the transmission channel.
    pub truncated: bool,
    /// AA - the responding name server is an authority for the name.
    pub authoritative_answer: bool,
    /// OPCODE - kind of query, copied into the response.
    pub opcode: u8,
    /// QR - whether this message is a query (false) or a response (true).
    pub response: bool,

    /// RCODE - 4 bit response code. Carried but not interpreted.
    pub response_code: u8,
    pub checking_disabled: bool,
    pub authed_data: bool,
    /// Z - reserved, must be zero in queries and responses.
    pub z: bool,
    /// RA - the name server supports recursive queries.
    pub recursion_available: bool,

    pub question_count: u16,
    pub answer_count: u16,
    pub authority_count: u16,
    pub resource_count: u16,
}

impl Header {
    pub fn question(id: u16) -> Self {
        Self {
            id,
            recursion_desired: true,
            ..Default::default()
        }
    }

    pub fn response(id: u16) -> Self {
        Self {
            id,
            response: true,
            ..Default::default()
        }
    }

    /// Reads the first 12 octets
    pub fn read(reader: &mut MessageReader<'_>) -> Result<Self, ReaderError> {
        let id = reader.read_u16()?;

        let head = reader.read_u8()?;
        let tail = reader.read_u8()?;

        Ok(Self {
            id,
            recursion_desired: (head & (1 << 0)) > 0,
            truncated: (head & (1 << 1)) > 0,
            authoritative_answer: (head & (1 << 2)) > 0,
            opcode: (head >> 3) & 0x0F,
            response: (head & (1 << 7)) > 0,
            response_code: tail & 0x0F,
            checking_disabled: (tail & (1 << 4)) > 0,
            authed_data: (tail & (1 << 5)) > 0,
            z: (tail & (1 << 6)) > 0,
            recursion_available: (tail & (1 << 7)) > 0,
            question_count: reader.read_u16()?,
            answer_count: reader.read_u16()?,
            authority_count: reader.read_u16()?,
            resource_count: reader.read_u16()?,
        })
    }

    /// Writes the header with the provided section counts, which are
    /// recomputed by the message encoder rather than trusted from `self`.
    pub(crate) fn write(
        &self,
        writer: &mut MessageWriter,
        counts: [u16; 4],
    ) -> Result<(), WriterError> {
        writer.write_u16(self.id)?;

        writer.write_u8(
            (self.recursion_desired as u8)
                | ((self.truncated as u8) << 1)
                | ((self.authoritative_answer as u8) << 2)
                | (self.opcode << 3)
                | ((self.response as u8) << 7),
        )?;

        writer.write_u8(
            (self.response_code & 0x0F)
                | ((self.checking_disabled as u8) << 4)
                | ((self.authed_data as u8) << 5)
                | ((self.z as u8) << 6)
                | ((self.recursion_available as u8) << 7),
        )?;

        for count in counts {
            writer.write_u16(count)?;
        }

        Ok(())
    }
}

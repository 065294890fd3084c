use super::QueryType;
use crate::buffer::reader::{MessageReader, ReaderError};
use crate::buffer::writer::{MessageWriter, WriterError};

/// QCLASS for the Internet, the only class seen in practice.
pub const CLASS_IN: u16 = 1;

#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    /// QNAME, already lowercased by the name decoder.
    pub name: String,
    /// QTYPE a two octet code which specifies the type of the query.
    pub qtype: QueryType,
    /// QCLASS kept as the raw two octet code: the cache key must
    /// distinguish arbitrary class values and an unusual class is not a
    /// parse error.
    pub qclass: u16,
}

impl Question {
    pub fn new<N: Into<String>>(name: N, qtype: QueryType) -> Self {
        Self {
            name: name.into(),
            qtype,
            qclass: CLASS_IN,
        }
    }

    pub fn read(reader: &mut MessageReader<'_>) -> Result<Self, ReaderError> {
        let name = reader.read_name()?;
        let qtype = QueryType::from_num(reader.read_u16()?);
        let qclass = reader.read_u16()?;

        Ok(Self {
            name,
            qtype,
            qclass,
        })
    }

    pub fn write(&self, writer: &mut MessageWriter) -> Result<(), WriterError> {
        writer.write_name(&self.name)?;
        writer.write_u16(self.qtype.into_num())?;
        writer.write_u16(self.qclass)?;

        Ok(())
    }

    /// The normalized cache key `(lowercased qname, qtype, qclass)`.
    pub fn key(&self) -> (String, QueryType, u16) {
        (self.name.to_lowercase(), self.qtype, self.qclass)
    }
}

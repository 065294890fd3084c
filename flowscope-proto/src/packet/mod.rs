pub mod header;
pub mod question;
pub mod record;

use crate::buffer::reader::{MessageReader, ReaderError};
use crate::buffer::writer::{MessageWriter, WriterError};

#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[derive(PartialEq, Eq, Debug, Clone, Hash, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub enum QueryType {
    Unknown(u16),
    /// a host address
    A, // 1
    /// the canonical name for an alias
    CNAME, // 5
    /// a domain name pointer
    PTR, // 12
    /// mail exchange
    MX, // 15
    /// a host address, IPv6
    AAAA, // 28
    /// location of a service
    SRV, // 33
}

impl QueryType {
    pub fn into_num(self) -> u16 {
        match self {
            QueryType::Unknown(x) => x,
            QueryType::A => 1,
            QueryType::CNAME => 5,
            QueryType::PTR => 12,
            QueryType::MX => 15,
            QueryType::AAAA => 28,
            QueryType::SRV => 33,
        }
    }

    pub fn from_num(num: u16) -> QueryType {
        match num {
            1 => QueryType::A,
            5 => QueryType::CNAME,
            12 => QueryType::PTR,
            15 => QueryType::MX,
            28 => QueryType::AAAA,
            33 => QueryType::SRV,
            _ => QueryType::Unknown(num),
        }
    }
}

/// A fully decoded message. Decoding owns its strings; the packet bytes it
/// was read from can be dropped immediately afterwards.
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DnsMessage {
    pub header: header::Header,
    pub questions: Vec<question::Question>,
    pub answers: Vec<record::Record>,
    pub authorities: Vec<record::Record>,
    pub resources: Vec<record::Record>,
}

impl DnsMessage {
    pub fn new(header: header::Header) -> Self {
        Self {
            header,
            ..Default::default()
        }
    }

    pub fn with_question(mut self, question: question::Question) -> Self {
        self.questions.push(question);
        self
    }

    pub fn with_answer(mut self, record: record::Record) -> Self {
        self.answers.push(record);
        self
    }

    pub fn with_authority(mut self, record: record::Record) -> Self {
        self.authorities.push(record);
        self
    }

    pub fn with_resource(mut self, record: record::Record) -> Self {
        self.resources.push(record);
        self
    }

    /// Whether the QR bit marks this message as a response.
    pub fn is_response(&self) -> bool {
        self.header.response
    }

    /// Decode a whole message from packet bytes. Any structural violation
    /// fails the parse as a whole, no partial message is returned.
    pub fn decode(buf: &[u8]) -> Result<Self, ReaderError> {
        let mut reader = MessageReader::new(buf);
        let header = header::Header::read(&mut reader)?;

        let mut questions = Vec::with_capacity(header.question_count as usize);
        for _ in 0..header.question_count {
            questions.push(question::Question::read(&mut reader)?);
        }

        let mut answers = Vec::with_capacity(header.answer_count as usize);
        for _ in 0..header.answer_count {
            answers.push(record::Record::read(&mut reader)?);
        }

        let mut authorities = Vec::with_capacity(header.authority_count as usize);
        for _ in 0..header.authority_count {
            authorities.push(record::Record::read(&mut reader)?);
        }

        let mut resources = Vec::with_capacity(header.resource_count as usize);
        for _ in 0..header.resource_count {
            resources.push(record::Record::read(&mut reader)?);
        }

        Ok(DnsMessage {
            header,
            questions,
            answers,
            authorities,
            resources,
        })
    }

    /// Encode the message, recomputing the section counts from the actual
    /// section lengths.
    pub fn encode(&self) -> Result<MessageWriter, WriterError> {
        let mut writer = MessageWriter::default();
        self.header.write(
            &mut writer,
            [
                self.questions.len() as u16,
                self.answers.len() as u16,
                self.authorities.len() as u16,
                self.resources.len() as u16,
            ],
        )?;

        for question in &self.questions {
            question.write(&mut writer)?;
        }
        for rec in &self.answers {
            rec.write(&mut writer)?;
        }
        for rec in &self.authorities {
            rec.write(&mut writer)?;
        }
        for rec in &self.resources {
            rec.write(&mut writer)?;
        }

        Ok(writer)
    }
}

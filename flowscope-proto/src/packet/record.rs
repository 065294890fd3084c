use super::QueryType;
use crate::buffer::reader::{MessageReader, ReaderError};
use crate::buffer::writer::{MessageWriter, WriterError};
use std::net::{Ipv4Addr, Ipv6Addr};

#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[allow(clippy::upper_case_acronyms)]
pub enum Record {
    /// Record types the engine does not interpret keep their raw rdata.
    Unknown {
        domain: String,
        qtype: u16,
        data: Vec<u8>,
        ttl: u32,
    }, // 0
    A {
        domain: String,
        addr: Ipv4Addr,
        ttl: u32,
    }, // 1
    CNAME {
        domain: String,
        host: String,
        ttl: u32,
    }, // 5
    PTR {
        domain: String,
        host: String,
        ttl: u32,
    }, // 12
    MX {
        domain: String,
        priority: u16,
        host: String,
        ttl: u32,
    }, // 15
    AAAA {
        domain: String,
        addr: Ipv6Addr,
        ttl: u32,
    }, // 28
    SRV {
        domain: String,
        priority: u16,
        weight: u16,
        port: u16,
        host: String,
        ttl: u32,
    }, // 33
}

impl Record {
    /// Owner name of the record
    pub fn domain(&self) -> &str {
        match self {
            Self::Unknown { domain, .. } => domain,
            Self::A { domain, .. } => domain,
            Self::CNAME { domain, .. } => domain,
            Self::PTR { domain, .. } => domain,
            Self::MX { domain, .. } => domain,
            Self::AAAA { domain, .. } => domain,
            Self::SRV { domain, .. } => domain,
        }
    }

    pub fn ttl(&self) -> u32 {
        match self {
            Self::Unknown { ttl, .. } => *ttl,
            Self::A { ttl, .. } => *ttl,
            Self::CNAME { ttl, .. } => *ttl,
            Self::PTR { ttl, .. } => *ttl,
            Self::MX { ttl, .. } => *ttl,
            Self::AAAA { ttl, .. } => *ttl,
            Self::SRV { ttl, .. } => *ttl,
        }
    }

    pub fn read(reader: &mut MessageReader<'_>) -> Result<Record, ReaderError> {
        // NAME the domain name to which this resource record pertains.
        let domain = reader.read_name()?;

        // TYPE two octets containing one of the RR type codes. This field
        // specifies the meaning of the data in the RDATA field.
        let qtype_num = reader.read_u16()?;
        let qtype = QueryType::from_num(qtype_num);

        // CLASS two octets, read and not interpreted.
        let _qclass = reader.read_u16()?;

        // TTL how long the record may be cached, in seconds. Zero means
        // "use for the transaction in progress only, do not cache".
        let ttl = reader.read_u32()?;

        // RDLENGTH the length in octets of the RDATA field. Each typed
        // payload below must consume exactly this many octets.
        let data_len = reader.read_u16()?;
        let data_start = reader.pos();

        let record = match qtype {
            QueryType::A => {
                if data_len != 4 {
                    return Err(ReaderError::RdataLength {
                        qtype: qtype_num,
                        length: data_len,
                    });
                }
                let addr = Ipv4Addr::from(reader.read_u32()?);

                Record::A { domain, addr, ttl }
            }
            QueryType::AAAA => {
                if data_len != 16 {
                    return Err(ReaderError::RdataLength {
                        qtype: qtype_num,
                        length: data_len,
                    });
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(reader.read_bytes(16)?);
                let addr = Ipv6Addr::from(octets);

                Record::AAAA { domain, addr, ttl }
            }
            QueryType::CNAME => {
                let host = reader.read_name()?;

                Record::CNAME { domain, host, ttl }
            }
            QueryType::PTR => {
                let host = reader.read_name()?;

                Record::PTR { domain, host, ttl }
            }
            QueryType::MX => {
                let priority = reader.read_u16()?;
                let host = reader.read_name()?;

                Record::MX {
                    domain,
                    priority,
                    host,
                    ttl,
                }
            }
            QueryType::SRV => {
                let priority = reader.read_u16()?;
                let weight = reader.read_u16()?;
                let port = reader.read_u16()?;
                let host = reader.read_name()?;

                Record::SRV {
                    domain,
                    priority,
                    weight,
                    port,
                    host,
                    ttl,
                }
            }
            QueryType::Unknown(_) => {
                let data = reader.read_bytes(data_len as usize)?.to_vec();

                Record::Unknown {
                    domain,
                    qtype: qtype_num,
                    data,
                    ttl,
                }
            }
        };

        // A name-bearing rdata that under- or over-runs its declared length
        // is structurally corrupt.
        if reader.pos() - data_start != data_len as usize {
            return Err(ReaderError::RdataLength {
                qtype: qtype_num,
                length: data_len,
            });
        }

        Ok(record)
    }

    pub fn write(&self, writer: &mut MessageWriter) -> Result<usize, WriterError> {
        let start_pos = writer.pos();

        match *self {
            Record::A {
                ref domain,
                ref addr,
                ttl,
            } => {
                writer.write_name(domain)?;
                writer.write_u16(QueryType::A.into_num())?;
                writer.write_u16(1)?;
                writer.write_u32(ttl)?;
                writer.write_u16(4)?;
                writer.write_bytes(&addr.octets())?;
            }
            Record::AAAA {
                ref domain,
                ref addr,
                ttl,
            } => {
                writer.write_name(domain)?;
                writer.write_u16(QueryType::AAAA.into_num())?;
                writer.write_u16(1)?;
                writer.write_u32(ttl)?;
                writer.write_u16(16)?;
                writer.write_bytes(&addr.octets())?;
            }
            Record::CNAME {
                ref domain,
                ref host,
                ttl,
            } => {
                writer.write_name(domain)?;
                writer.write_u16(QueryType::CNAME.into_num())?;
                writer.write_u16(1)?;
                writer.write_u32(ttl)?;

                let pos = writer.pos();
                writer.write_u16(0)?;

                writer.write_name(host)?;

                let size = writer.pos() - (pos + 2);
                writer.set_u16(pos, size as u16)?;
            }
            Record::PTR {
                ref domain,
                ref host,
                ttl,
            } => {
                writer.write_name(domain)?;
                writer.write_u16(QueryType::PTR.into_num())?;
                writer.write_u16(1)?;
                writer.write_u32(ttl)?;

                let pos = writer.pos();
                writer.write_u16(0)?;

                writer.write_name(host)?;

                let size = writer.pos() - (pos + 2);
                writer.set_u16(pos, size as u16)?;
            }
            Record::MX {
                ref domain,
                priority,
                ref host,
                ttl,
            } => {
                writer.write_name(domain)?;
                writer.write_u16(QueryType::MX.into_num())?;
                writer.write_u16(1)?;
                writer.write_u32(ttl)?;

                let pos = writer.pos();
                writer.write_u16(0)?;

                writer.write_u16(priority)?;
                writer.write_name(host)?;

                let size = writer.pos() - (pos + 2);
                writer.set_u16(pos, size as u16)?;
            }
            Record::SRV {
                ref domain,
                priority,
                weight,
                port,
                ref host,
                ttl,
            } => {
                writer.write_name(domain)?;
                writer.write_u16(QueryType::SRV.into_num())?;
                writer.write_u16(1)?;
                writer.write_u32(ttl)?;

                let pos = writer.pos();
                writer.write_u16(0)?;

                writer.write_u16(priority)?;
                writer.write_u16(weight)?;
                writer.write_u16(port)?;
                writer.write_name(host)?;

                let size = writer.pos() - (pos + 2);
                writer.set_u16(pos, size as u16)?;
            }
            Record::Unknown {
                ref domain,
                qtype,
                ref data,
                ttl,
            } => {
                writer.write_name(domain)?;
                writer.write_u16(qtype)?;
                writer.write_u16(1)?;
                writer.write_u32(ttl)?;
                writer.write_u16(data.len() as u16)?;
                writer.write_bytes(data)?;
            }
        }

        Ok(writer.pos() - start_pos)
    }
}

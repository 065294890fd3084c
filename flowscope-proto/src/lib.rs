pub mod buffer;
pub mod packet;

pub use buffer::reader::{MessageReader, ReaderError};
pub use buffer::writer::{MessageWriter, WriterError};
pub use packet::{DnsMessage, QueryType};

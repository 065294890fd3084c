pub mod reader;
pub mod writer;

/// Largest message the encoder will produce, the classic UDP payload limit.
/// The decoder side has no such limit since responses received over TCP may
/// be larger.
pub const MAX_MESSAGE_SIZE: usize = 512;

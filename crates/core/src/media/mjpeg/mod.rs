//! RTP/JPEG payload format — RFC 2435.
//!
//! - Each JPEG frame maps to one or more RTP packets sharing a timestamp.
//! - Every payload starts with an 8-byte JPEG header
//!   (type, Q, width, height, fragment offset); see [`header`].
//! - Only the entropy-coded scan travels on the wire. The receiver rebuilds
//!   the JFIF markers ([`jfif`]) from the header fields, derived or in-band
//!   quantization tables ([`qtables`]) and the standard Huffman tables
//!   ([`huffman`]).
//! - Uses static payload type 26: `a=rtpmap:26 JPEG/90000`.
//!
//! Restart markers (types 64–127) and non-zero type-specific values are
//! rejected.

pub mod depacketizer;
pub mod header;
pub mod huffman;
pub mod jfif;
pub mod packetizer;
pub mod qtables;

pub use depacketizer::{DepacketizerConfig, JpegDepacketizer};
pub use header::{JpegHeader, JpegPayload, QuantizationHeader};
pub use packetizer::{JpegPacketizer, ScanParams};
pub use qtables::QuantizationTables;

/// Static RTP payload type assigned to JPEG (RFC 3551 §6).
pub const PAYLOAD_TYPE: u8 = 26;

/// RTP clock rate for JPEG video.
pub const CLOCK_RATE: u32 = 90000;

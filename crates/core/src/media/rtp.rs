use std::ops::Range;

use crate::error::{DepacketizeError, Result};

/// Length of the fixed RTP header, without CSRCs or extensions.
pub const RTP_HEADER_LEN: usize = 12;

/// RTP protocol version written by [`RtpHeader::serialize`].
pub const RTP_VERSION: u8 = 2;

/// Generic RTP fixed header (RFC 3550 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             SSRC                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// [`parse`](Self::parse) reports the version exactly as found on the wire;
/// [`serialize`](Self::serialize) always writes version 2. Fields wider than
/// their wire width are masked on serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RtpHeader {
    /// Protocol version (2 bits).
    pub version: u8,
    /// Padding flag: the payload ends with padding octets.
    pub padding: bool,
    /// Extension flag: a header extension follows the CSRC list.
    pub extension: bool,
    /// Number of CSRC identifiers following the fixed header (4 bits).
    pub csrc_count: u8,
    /// Marker bit. For RTP/JPEG, set on the last packet of a frame.
    pub marker: bool,
    /// Payload type (7 bits). JPEG uses the static type 26.
    pub payload_type: u8,
    pub sequence_number: u16,
    pub timestamp: u32,
    /// Synchronization source identifier.
    pub ssrc: u32,
}

impl RtpHeader {
    /// Parse the 12-byte fixed header starting at `offset`.
    pub fn parse(buffer: &[u8], offset: usize) -> Result<Self> {
        let available = buffer.len().saturating_sub(offset);
        if available < RTP_HEADER_LEN {
            return Err(DepacketizeError::TruncatedBuffer {
                needed: RTP_HEADER_LEN,
                available,
            });
        }
        let b = &buffer[offset..offset + RTP_HEADER_LEN];

        Ok(Self {
            version: b[0] >> 6 & 0x03,
            padding: b[0] >> 5 & 0x01 != 0,
            extension: b[0] >> 4 & 0x01 != 0,
            csrc_count: b[0] & 0x0f,
            marker: b[1] >> 7 & 0x01 != 0,
            payload_type: b[1] & 0x7f,
            sequence_number: u16::from_be_bytes([b[2], b[3]]),
            timestamp: u32::from_be_bytes([b[4], b[5], b[6], b[7]]),
            ssrc: u32::from_be_bytes([b[8], b[9], b[10], b[11]]),
        })
    }

    /// Serialize the fixed header. The version field is always 2.
    pub fn serialize(&self) -> [u8; RTP_HEADER_LEN] {
        let mut header = [0u8; RTP_HEADER_LEN];
        header[0] = (RTP_VERSION << 6)
            | ((self.padding as u8) << 5)
            | ((self.extension as u8) << 4)
            | (self.csrc_count & 0x0f);
        header[1] = ((self.marker as u8) << 7) | (self.payload_type & 0x7f);
        header[2..4].copy_from_slice(&self.sequence_number.to_be_bytes());
        header[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        header[8..12].copy_from_slice(&self.ssrc.to_be_bytes());
        header
    }

    /// Locate the payload of the packet whose header starts at `offset`.
    ///
    /// Skips the CSRC list and the header extension (RFC 3550 §5.3.1), and
    /// strips trailing padding when the padding flag is set. The returned
    /// range indexes into `buffer`.
    pub fn payload_range(&self, buffer: &[u8], offset: usize) -> Result<Range<usize>> {
        let mut start = offset + RTP_HEADER_LEN + 4 * self.csrc_count as usize;
        if self.extension {
            let ext_header_end = start + 4;
            if buffer.len() < ext_header_end {
                return Err(DepacketizeError::TruncatedBuffer {
                    needed: ext_header_end - offset,
                    available: buffer.len().saturating_sub(offset),
                });
            }
            let words = u16::from_be_bytes([buffer[start + 2], buffer[start + 3]]) as usize;
            start = ext_header_end + 4 * words;
        }
        if buffer.len() < start {
            return Err(DepacketizeError::TruncatedBuffer {
                needed: start - offset,
                available: buffer.len().saturating_sub(offset),
            });
        }

        let mut end = buffer.len();
        if self.padding {
            // Last octet counts the padding, itself included.
            let pad = buffer[end - 1];
            if pad == 0 || pad as usize > end - start {
                return Err(DepacketizeError::InvalidPadding(pad));
            }
            end -= pad as usize;
        }
        Ok(start..end)
    }
}

/// Sender-side RTP header state.
///
/// It manages:
/// - **Sequence number**: 16-bit, wrapping, incremented on every packet.
/// - **Timestamp**: stored as u64 internally; the lower 32 bits are written
///   to the wire.
/// - **SSRC**: fixed for the lifetime of the sequencer, optionally random
///   per RFC 3550 §8.1.
///
/// Padding, extension, and CSRC count are always 0.
#[derive(Debug)]
pub struct RtpSequencer {
    /// RTP payload type (7-bit, RFC 3551).
    pub pt: u8,
    /// Synchronization source identifier (RFC 3550 §8.1).
    pub ssrc: u32,
    sequence: u16,
    timestamp: u64,
}

impl RtpSequencer {
    /// Create a new sequencer with explicit SSRC.
    pub fn new(pt: u8, ssrc: u32) -> Self {
        tracing::debug!(
            pt,
            ssrc = format_args!("{:#010X}", ssrc),
            "RTP sequencer created"
        );
        Self {
            pt,
            ssrc,
            sequence: 0,
            timestamp: 0,
        }
    }

    /// Create with a random SSRC.
    pub fn with_random_ssrc(pt: u8) -> Self {
        Self::new(pt, rand::random::<u32>())
    }

    /// Current sequence number (before the next [`next_header`](Self::next_header) call).
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Current timestamp (internal u64 representation).
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Produce the header for the next packet and advance the sequence number.
    pub fn next_header(&mut self, marker: bool) -> RtpHeader {
        let header = RtpHeader {
            version: RTP_VERSION,
            marker,
            payload_type: self.pt,
            sequence_number: self.sequence,
            timestamp: self.timestamp as u32,
            ssrc: self.ssrc,
            ..RtpHeader::default()
        };
        self.sequence = self.sequence.wrapping_add(1);
        header
    }

    /// Advance the RTP timestamp by the given increment.
    ///
    /// At the 90 kHz video clock the increment per frame is `90000 / fps`.
    pub fn advance_timestamp(&mut self, increment: u32) {
        self.timestamp = self.timestamp.wrapping_add(increment as u64);
    }
}

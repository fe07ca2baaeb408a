//! RTP parsing and codec depacketization.
//!
//! ## RTP overview (RFC 3550)
//!
//! Each encoded video frame is split into one or more RTP packets.
//! Every RTP packet carries a 12-byte fixed header ([`rtp::RtpHeader`])
//! containing:
//!
//! - **Sequence number** (16-bit, wrapping) — for reordering and loss detection.
//! - **Timestamp** (32-bit) — media clock, 90 kHz for video.
//! - **SSRC** (32-bit) — identifies the sender.
//! - **Marker bit** — set on the last packet of a frame.
//!
//! ## Supported codecs
//!
//! | Codec | Module | RFC | Status |
//! |-------|--------|-----|--------|
//! | JPEG | [`mjpeg`] | [RFC 2435](https://tools.ietf.org/html/rfc2435) | Implemented (no restart markers) |

pub mod mjpeg;
pub mod rtp;

use crate::error::Result;

/// A complete frame, ready for a decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegFrame {
    /// RTP timestamp shared by all fragments of the frame.
    pub timestamp: u32,
    pub ssrc: u32,
    /// Width in pixels.
    pub width: u16,
    /// Height in pixels.
    pub height: u16,
    /// JFIF header, scan data and EOI.
    pub data: Vec<u8>,
}

/// Codec-specific RTP depacketizer.
///
/// Implementations own the per-stream reassembly state. They are fed one
/// datagram at a time, in arrival order, and hand back a frame once the
/// packet carrying the marker bit completes it.
///
/// An `Err` affects only the current packet and the frame it belonged to;
/// keep pushing subsequent packets.
pub trait Depacketizer: Send {
    /// Consume one RTP datagram (12-byte header plus payload).
    fn push(&mut self, packet: &[u8]) -> Result<Option<JpegFrame>>;

    /// Codec name as used in `a=rtpmap` (e.g. `"JPEG"`).
    fn codec_name(&self) -> &'static str;

    /// RTP clock rate in Hz.
    fn clock_rate(&self) -> u32;

    /// RTP payload type this depacketizer accepts.
    fn payload_type(&self) -> u8;
}

//! Error types for RTP/JPEG depacketization.

/// Errors raised while parsing RTP/JPEG packets, assembling frames, or
/// packetizing a scan.
///
/// Variants fall into three groups:
///
/// - **Parsing** (a single packet is malformed or uses an unsupported
///   feature): [`TruncatedBuffer`](Self::TruncatedBuffer),
///   [`UnsupportedTypeSpecifier`](Self::UnsupportedTypeSpecifier),
///   [`UnsupportedRestartMarkers`](Self::UnsupportedRestartMarkers),
///   [`TruncatedQuantizationHeader`](Self::TruncatedQuantizationHeader),
///   [`TruncatedQuantizationTable`](Self::TruncatedQuantizationTable),
///   [`InvalidRtpVersion`](Self::InvalidRtpVersion),
///   [`InvalidPadding`](Self::InvalidPadding).
/// - **Frame assembly** (the packet is well formed but cannot be placed
///   into the frame in progress): [`PayloadTypeMismatch`](Self::PayloadTypeMismatch)
///   through [`FrameTooLarge`](Self::FrameTooLarge).
/// - **Packetizing** (the sender was handed a frame it cannot put on the
///   wire): [`ScanTooLarge`](Self::ScanTooLarge),
///   [`TablesWithoutInbandQ`](Self::TablesWithoutInbandQ).
///
/// None of these are fatal. The caller drops the affected frame and keeps
/// feeding subsequent packets.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DepacketizeError {
    /// Fewer bytes than a fixed-size RTP or JPEG header needs.
    #[error("truncated buffer: need {needed} bytes, {available} available")]
    TruncatedBuffer { needed: usize, available: usize },

    /// The JPEG header type-specific byte was not 0 (RFC 2435 §3.1.1).
    #[error("unsupported JPEG type-specific value: {0}")]
    UnsupportedTypeSpecifier(u8),

    /// Type 64–127 signals restart markers (RFC 2435 §3.1.7).
    #[error("JPEG type {0} uses restart markers, which are not supported")]
    UnsupportedRestartMarkers(u8),

    /// Q ≥ 128 at offset 0 but the 4-byte quantization table header is missing.
    #[error("truncated quantization table header: {available} of 4 bytes available")]
    TruncatedQuantizationHeader { available: usize },

    /// The quantization table header announces more data than the packet holds.
    #[error("truncated quantization table: header announces {length} bytes, {available} available")]
    TruncatedQuantizationTable { length: u16, available: usize },

    /// The RTP version field was not 2.
    #[error("invalid RTP version: {0}")]
    InvalidRtpVersion(u8),

    /// The RTP padding count is zero or larger than the payload.
    #[error("invalid RTP padding count: {0}")]
    InvalidPadding(u8),

    /// Packet carries a payload type other than the configured one.
    #[error("unexpected RTP payload type {actual}, expected {expected}")]
    PayloadTypeMismatch { expected: u8, actual: u8 },

    /// In-band tables with 16-bit entries cannot be written as a baseline DQT.
    #[error("unsupported quantization table precision: {0:#04x}")]
    UnsupportedPrecision(u8),

    /// In-band table data shorter than one 64-byte table.
    #[error("invalid quantization table length: {0}")]
    InvalidQuantizationTableLength(u16),

    /// Q ≥ 128 with an empty table and no earlier in-band table for that Q.
    #[error("no quantization table received for Q={0}")]
    MissingQuantizationTable(u8),

    /// A continuation fragment arrived without a frame in progress.
    #[error("fragment at offset {0} has no frame in progress")]
    OrphanFragment(u32),

    /// A fragment's RTP timestamp does not match the frame in progress.
    #[error("RTP timestamp {actual} does not match frame timestamp {expected}")]
    TimestampMismatch { expected: u32, actual: u32 },

    /// A fragment's offset does not continue the bytes received so far.
    #[error("fragment offset {actual} does not follow {expected} received bytes")]
    FragmentGap { expected: u32, actual: u32 },

    /// Reassembled scan data exceeds the configured limit.
    #[error("frame exceeds {limit} bytes")]
    FrameTooLarge { limit: usize },

    /// Scan longer than the 24-bit fragment offset can address.
    #[error("scan of {0} bytes exceeds the 24-bit fragment offset range")]
    ScanTooLarge(usize),

    /// In-band tables were supplied with a Q below 128, where receivers
    /// never look for them.
    #[error("quantization tables supplied with Q={0}, in-band tables need Q >= 128")]
    TablesWithoutInbandQ(u8),
}

/// Convenience alias for `Result<T, DepacketizeError>`.
pub type Result<T> = std::result::Result<T, DepacketizeError>;

use std::collections::HashMap;

use super::header::{JpegHeader, QuantizationHeader};
use super::jfif::{self, FrameParams};
use super::qtables::{self, QuantizationTables};
use super::{CLOCK_RATE, PAYLOAD_TYPE};
use crate::error::{DepacketizeError, Result};
use crate::media::rtp::RtpHeader;
use crate::media::{Depacketizer, JpegFrame};

const EOI: [u8; 2] = [0xff, 0xd9];

/// Receiver-side settings for [`JpegDepacketizer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepacketizerConfig {
    /// Reject packets with any other payload type. `None` accepts all.
    pub payload_type: Option<u8>,
    /// Upper bound on reassembled scan bytes per frame.
    pub max_frame_size: usize,
    /// Restart interval written to the DRI segment; 0 omits it.
    pub restart_interval: u16,
    /// Append EOI when the scan data does not already end with one.
    pub append_eoi: bool,
}

impl Default for DepacketizerConfig {
    fn default() -> Self {
        Self {
            payload_type: Some(PAYLOAD_TYPE),
            max_frame_size: 4 * 1024 * 1024,
            restart_interval: 0,
            append_eoi: true,
        }
    }
}

/// Frame in progress: the parameters of its first fragment plus the scan
/// bytes received so far.
#[derive(Debug)]
struct PendingFrame {
    timestamp: u32,
    ssrc: u32,
    params: FrameParams,
    tables: QuantizationTables,
    scan: Vec<u8>,
}

/// RTP/JPEG depacketizer (RFC 2435).
///
/// Feeds packets of one stream through [`RtpHeader::parse`] and
/// [`JpegHeader::parse`], collects the scan data of each frame in offset
/// order, and on the marker bit prepends a synthesized JFIF header.
///
/// ## Quantization tables
///
/// - **Q < 128**: tables are derived with [`qtables::synthesize`].
/// - **Q ≥ 128**: tables arrive in-band on the first fragment. A zero-length
///   table reuses the last in-band tables received for the same Q
///   (RFC 2435 §4.2).
///
/// ## Loss handling
///
/// Fragments must arrive in order. A gap, a timestamp change, or a
/// continuation fragment without a first fragment drops the frame in
/// progress and returns an error; the next fragment at offset 0 starts over.
#[derive(Debug)]
pub struct JpegDepacketizer {
    config: DepacketizerConfig,
    pending: Option<PendingFrame>,
    inband_tables: HashMap<u8, QuantizationTables>,
}

impl JpegDepacketizer {
    /// Create with [`DepacketizerConfig::default`]: payload type 26, 4 MiB
    /// frame limit, no DRI, EOI appended.
    pub fn new() -> Self {
        Self::with_config(DepacketizerConfig::default())
    }

    /// Create with explicit settings. The table cache starts empty.
    pub fn with_config(config: DepacketizerConfig) -> Self {
        Self {
            config,
            pending: None,
            inband_tables: HashMap::new(),
        }
    }

    /// Settings this depacketizer was created with.
    pub fn config(&self) -> &DepacketizerConfig {
        &self.config
    }

    /// Whether a frame is partially assembled.
    pub fn has_pending_frame(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the frame in progress, if any.
    pub fn reset(&mut self) {
        if let Some(frame) = self.pending.take() {
            tracing::debug!(
                timestamp = frame.timestamp,
                bytes = frame.scan.len(),
                "discarding incomplete JPEG frame"
            );
        }
    }

    /// Resolve the tables for a first fragment.
    fn resolve_tables(
        &mut self,
        header: &JpegHeader,
        quantization: Option<QuantizationHeader>,
    ) -> Result<QuantizationTables> {
        let Some(quantization) = quantization else {
            return Ok(qtables::synthesize(header.q));
        };

        if quantization.precision != 0 {
            return Err(DepacketizeError::UnsupportedPrecision(quantization.precision));
        }
        if quantization.data.is_empty() {
            return self
                .inband_tables
                .get(&header.q)
                .cloned()
                .ok_or(DepacketizeError::MissingQuantizationTable(header.q));
        }

        let tables = QuantizationTables::from_inband(&quantization.data).ok_or(
            DepacketizeError::InvalidQuantizationTableLength(quantization.data.len() as u16),
        )?;
        if self.inband_tables.get(&header.q) != Some(&tables) {
            tracing::debug!(q = header.q, count = tables.count(), "in-band quantization tables cached");
            self.inband_tables.insert(header.q, tables.clone());
        }
        Ok(tables)
    }

    fn push_inner(&mut self, packet: &[u8]) -> Result<Option<JpegFrame>> {
        let rtp = RtpHeader::parse(packet, 0)?;
        if rtp.version != 2 {
            return Err(DepacketizeError::InvalidRtpVersion(rtp.version));
        }
        if let Some(expected) = self.config.payload_type
            && rtp.payload_type != expected
        {
            return Err(DepacketizeError::PayloadTypeMismatch {
                expected,
                actual: rtp.payload_type,
            });
        }

        let range = rtp.payload_range(packet, 0)?;
        let payload = &packet[..range.end];
        let parsed = JpegHeader::parse(payload, range.start)?;
        let header = parsed.header;
        let scan = &payload[parsed.data_offset..];

        if header.fragment_offset == 0 {
            self.reset();
            let tables = self.resolve_tables(&header, parsed.quantization)?;
            tracing::debug!(
                timestamp = rtp.timestamp,
                jpeg_type = header.jpeg_type,
                q = header.q,
                width = header.width_px(),
                height = header.height_px(),
                "JPEG frame started"
            );
            self.pending = Some(PendingFrame {
                timestamp: rtp.timestamp,
                ssrc: rtp.ssrc,
                params: FrameParams {
                    width: header.width,
                    height: header.height,
                    jpeg_type: header.jpeg_type,
                    restart_interval: self.config.restart_interval,
                },
                tables,
                scan: Vec::new(),
            });
        }

        let Some(frame) = self.pending.as_mut() else {
            return Err(DepacketizeError::OrphanFragment(header.fragment_offset));
        };
        if frame.timestamp != rtp.timestamp {
            return Err(DepacketizeError::TimestampMismatch {
                expected: frame.timestamp,
                actual: rtp.timestamp,
            });
        }
        if frame.scan.len() != header.fragment_offset as usize {
            return Err(DepacketizeError::FragmentGap {
                expected: frame.scan.len() as u32,
                actual: header.fragment_offset,
            });
        }
        if frame.scan.len() + scan.len() > self.config.max_frame_size {
            return Err(DepacketizeError::FrameTooLarge {
                limit: self.config.max_frame_size,
            });
        }
        frame.scan.extend_from_slice(scan);

        tracing::trace!(
            seq = rtp.sequence_number,
            offset = header.fragment_offset,
            len = scan.len(),
            marker = rtp.marker,
            "JPEG fragment"
        );

        if !rtp.marker {
            return Ok(None);
        }

        let Some(frame) = self.pending.take() else {
            return Ok(None);
        };
        Ok(Some(self.finish(frame)))
    }

    fn finish(&self, frame: PendingFrame) -> JpegFrame {
        let mut data = Vec::with_capacity(640 + frame.scan.len() + EOI.len());
        jfif::write_header(&mut data, &frame.params, &frame.tables);
        data.extend_from_slice(&frame.scan);
        if self.config.append_eoi && !frame.scan.ends_with(&EOI) {
            data.extend_from_slice(&EOI);
        }

        let width = (frame.params.width as u16) << 3;
        let height = (frame.params.height as u16) << 3;
        tracing::debug!(
            timestamp = frame.timestamp,
            width,
            height,
            bytes = data.len(),
            "JPEG frame complete"
        );

        JpegFrame {
            timestamp: frame.timestamp,
            ssrc: frame.ssrc,
            width,
            height,
            data,
        }
    }
}

impl Default for JpegDepacketizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Depacketizer for JpegDepacketizer {
    /// Any error discards the frame in progress.
    fn push(&mut self, packet: &[u8]) -> Result<Option<JpegFrame>> {
        let result = self.push_inner(packet);
        if result.is_err() {
            self.reset();
        }
        result
    }

    fn codec_name(&self) -> &'static str {
        "JPEG"
    }

    fn clock_rate(&self) -> u32 {
        CLOCK_RATE
    }

    fn payload_type(&self) -> u8 {
        self.config.payload_type.unwrap_or(PAYLOAD_TYPE)
    }
}

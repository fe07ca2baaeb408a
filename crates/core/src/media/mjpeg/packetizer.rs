use super::header::{JPEG_HEADER_LEN, JpegHeader, Q_INBAND_MIN, QuantizationHeader};
use super::qtables::QuantizationTables;
use super::PAYLOAD_TYPE;
use crate::error::{DepacketizeError, Result};
use crate::media::rtp::{RTP_HEADER_LEN, RtpSequencer};

const DEFAULT_MTU: usize = 1400;

/// Largest scan whose fragment offsets fit the 24-bit offset field.
pub const MAX_SCAN_LEN: usize = 0xFF_FFFF;

/// Frame description carried in every RFC 2435 main header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanParams {
    pub jpeg_type: u8,
    /// Q value announced on the wire.
    pub q: u8,
    /// Width in 8-pixel blocks.
    pub width: u8,
    /// Height in 8-pixel blocks.
    pub height: u8,
    /// Sent in-band on the first fragment. Requires `q >= 128`; with
    /// `q >= 128` and `None`, an empty table tells the receiver to reuse
    /// the tables it last saw for that Q.
    pub tables: Option<QuantizationTables>,
}

/// RTP/JPEG packetizer (RFC 2435).
///
/// Splits the entropy-coded scan of one frame into RTP packets:
///
/// ```text
/// RTP header (12)  JPEG header (8)  [quantization header + tables]  scan bytes
/// ```
///
/// - The quantization header only appears on the first packet, and only
///   when Q ≥ 128. It is empty when [`ScanParams::tables`] is `None`.
/// - Fragment offsets count scan bytes, not packet bytes.
/// - The marker bit is set on the last packet of the frame.
#[derive(Debug)]
pub struct JpegPacketizer {
    header: RtpSequencer,
    mtu: usize,
}

impl JpegPacketizer {
    /// Create with explicit payload type and SSRC.
    pub fn new(pt: u8, ssrc: u32) -> Self {
        Self {
            header: RtpSequencer::new(pt, ssrc),
            mtu: DEFAULT_MTU,
        }
    }

    /// Create with the static JPEG payload type and a random SSRC.
    pub fn with_random_ssrc() -> Self {
        Self {
            header: RtpSequencer::with_random_ssrc(PAYLOAD_TYPE),
            mtu: DEFAULT_MTU,
        }
    }

    /// Maximum RTP payload size. Clamped so every packet carries scan data.
    pub fn with_mtu(mut self, mtu: usize) -> Self {
        self.mtu = mtu.max(JPEG_HEADER_LEN + 1);
        self
    }

    /// SSRC written into every packet.
    pub fn ssrc(&self) -> u32 {
        self.header.ssrc
    }

    /// Packetize one frame and advance the RTP timestamp by
    /// `timestamp_increment` afterwards.
    ///
    /// Fails with [`ScanTooLarge`](DepacketizeError::ScanTooLarge) when the
    /// scan exceeds [`MAX_SCAN_LEN`], and with
    /// [`TablesWithoutInbandQ`](DepacketizeError::TablesWithoutInbandQ) when
    /// tables are supplied with `q < 128`. Nothing is sent on failure.
    pub fn packetize(
        &mut self,
        scan: &[u8],
        params: &ScanParams,
        timestamp_increment: u32,
    ) -> Result<Vec<Vec<u8>>> {
        if scan.len() > MAX_SCAN_LEN {
            return Err(DepacketizeError::ScanTooLarge(scan.len()));
        }
        let inband = params.q >= Q_INBAND_MIN;
        if !inband && params.tables.is_some() {
            return Err(DepacketizeError::TablesWithoutInbandQ(params.q));
        }

        let mut packets = Vec::new();
        let mut offset = 0usize;

        loop {
            let mut payload = Vec::with_capacity(self.mtu);
            JpegHeader {
                type_specific: 0,
                fragment_offset: offset as u32,
                jpeg_type: params.jpeg_type,
                q: params.q,
                width: params.width,
                height: params.height,
            }
            .write(&mut payload);

            if offset == 0 && inband {
                let mut data = Vec::new();
                if let Some(tables) = &params.tables {
                    data.extend_from_slice(&tables.luma);
                    if let Some(chroma) = &tables.chroma {
                        data.extend_from_slice(chroma);
                    }
                }
                QuantizationHeader::new(data).write(&mut payload);
            }

            let room = self.mtu.saturating_sub(payload.len()).max(1);
            let chunk = room.min(scan.len() - offset);
            payload.extend_from_slice(&scan[offset..offset + chunk]);
            offset += chunk;

            let last = offset >= scan.len();
            let mut packet = Vec::with_capacity(RTP_HEADER_LEN + payload.len());
            packet.extend_from_slice(&self.header.next_header(last).serialize());
            packet.extend_from_slice(&payload);
            packets.push(packet);

            if last {
                break;
            }
        }

        self.header.advance_timestamp(timestamp_increment);

        tracing::trace!(
            rtp_packets = packets.len(),
            scan_bytes = scan.len(),
            seq = self.header.sequence(),
            ts = self.header.timestamp(),
            "JPEG frame packetized"
        );

        Ok(packets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mjpeg::qtables::synthesize;
    use crate::media::rtp::RtpHeader;

    fn params(tables: Option<QuantizationTables>) -> ScanParams {
        ScanParams {
            jpeg_type: 1,
            q: if tables.is_some() { 255 } else { 50 },
            width: 80,
            height: 60,
            tables,
        }
    }

    #[test]
    fn small_scan_single_packet() {
        let mut p = JpegPacketizer::new(26, 0xAABBCCDD);
        let packets = p.packetize(&[1, 2, 3], &params(None), 3000).unwrap();
        assert_eq!(packets.len(), 1);
        assert_eq!(packets[0].len(), 12 + 8 + 3);
        assert_eq!(packets[0][1], 0x80 | 26);
    }

    #[test]
    fn fragments_carry_scan_offsets() {
        let mut p = JpegPacketizer::new(26, 1).with_mtu(108);
        let scan = vec![0xAA; 250];
        let packets = p.packetize(&scan, &params(None), 3000).unwrap();
        assert_eq!(packets.len(), 3);

        let offsets: Vec<u32> = packets
            .iter()
            .map(|pkt| JpegHeader::parse(pkt, 12).unwrap().header.fragment_offset)
            .collect();
        assert_eq!(offsets, vec![0, 100, 200]);

        let markers: Vec<bool> = packets
            .iter()
            .map(|pkt| RtpHeader::parse(pkt, 0).unwrap().marker)
            .collect();
        assert_eq!(markers, vec![false, false, true]);
    }

    #[test]
    fn tables_only_on_first_packet() {
        let mut p = JpegPacketizer::new(26, 1).with_mtu(300);
        let scan = vec![0x11; 400];
        let packets = p.packetize(&scan, &params(Some(synthesize(50))), 3000).unwrap();

        let first = JpegHeader::parse(&packets[0], 12).unwrap();
        assert_eq!(first.quantization.unwrap().data.len(), 128);
        assert_eq!(packets[0].len() - first.data_offset, 300 - 8 - 4 - 128);

        let second = JpegHeader::parse(&packets[1], 12).unwrap();
        assert_eq!(second.quantization, None);
        assert_eq!(second.header.fragment_offset, 160);
    }

    #[test]
    fn empty_scan_still_sends_one_packet() {
        let mut p = JpegPacketizer::new(26, 1);
        let packets = p.packetize(&[], &params(None), 3000).unwrap();
        assert_eq!(packets.len(), 1);
        assert!(RtpHeader::parse(&packets[0], 0).unwrap().marker);
    }

    #[test]
    fn timestamp_shared_within_frame() {
        let mut p = JpegPacketizer::new(26, 1).with_mtu(20);
        let first = p.packetize(&[0; 30], &params(None), 3000).unwrap();
        let second = p.packetize(&[0; 5], &params(None), 3000).unwrap();
        assert!(first
            .iter()
            .all(|pkt| RtpHeader::parse(pkt, 0).unwrap().timestamp == 0));
        assert_eq!(RtpHeader::parse(&second[0], 0).unwrap().timestamp, 3000);
    }

    #[test]
    fn inband_q_without_tables_sends_empty_table() {
        let mut p = JpegPacketizer::new(26, 1).with_mtu(100);
        let scan = vec![0x22; 150];
        let params = ScanParams {
            q: 200,
            ..params(None)
        };
        let packets = p.packetize(&scan, &params, 3000).unwrap();

        let first = JpegHeader::parse(&packets[0], 12).unwrap();
        assert!(first.quantization.unwrap().data.is_empty());
        assert_eq!(packets[0].len() - first.data_offset, 100 - 8 - 4);

        let second = JpegHeader::parse(&packets[1], 12).unwrap();
        assert_eq!(second.header.fragment_offset, 88);
    }

    #[test]
    fn tables_with_small_q_rejected() {
        let mut p = JpegPacketizer::new(26, 1);
        let params = ScanParams {
            q: 50,
            ..params(Some(synthesize(50)))
        };
        assert_eq!(
            p.packetize(&[1, 2, 3], &params, 3000),
            Err(DepacketizeError::TablesWithoutInbandQ(50))
        );
        assert_eq!(p.header.sequence(), 0);
    }

    #[test]
    fn scan_beyond_24_bit_offsets_rejected() {
        let mut p = JpegPacketizer::new(26, 1).with_mtu(60000);
        let scan = vec![0u8; MAX_SCAN_LEN + 1];
        assert_eq!(
            p.packetize(&scan, &params(None), 3000),
            Err(DepacketizeError::ScanTooLarge(MAX_SCAN_LEN + 1))
        );

        let packets = p.packetize(&scan[..MAX_SCAN_LEN], &params(None), 3000).unwrap();
        let last = packets.last().unwrap();
        let header = JpegHeader::parse(last, 12).unwrap().header;
        assert_eq!(
            header.fragment_offset as usize + last.len() - 12 - 8,
            MAX_SCAN_LEN
        );
    }
}

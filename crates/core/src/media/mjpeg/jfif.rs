//! JFIF header synthesis.
//!
//! RFC 2435 strips every marker segment from the JPEG it transmits. To hand a
//! frame to an ordinary decoder the receiver rebuilds them (RFC 2435
//! Appendix B):
//!
//! ```text
//! SOI  APP0(JFIF)  [DRI]  DQT  DHT  SOF0  SOS  <scan data>  EOI
//! ```
//!
//! The builder only writes the headers; the caller appends the reassembled
//! scan data.

use super::huffman::STANDARD_TABLES;
use super::qtables::QuantizationTables;

/// JPEG marker codes (ITU T.81 Table B.1). Each is written after a 0xFF byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum JpegMarker {
    /// Baseline DCT frame.
    Sof0 = 0xc0,
    /// Extended sequential, Huffman.
    Sof1 = 0xc1,
    /// Progressive, Huffman.
    Sof2 = 0xc2,
    /// Lossless, Huffman.
    Sof3 = 0xc3,
    Dht = 0xc4,
    Sof5 = 0xc5,
    Sof6 = 0xc6,
    Sof7 = 0xc7,
    Jpg = 0xc8,
    Sof9 = 0xc9,
    Sof10 = 0xca,
    Sof11 = 0xcb,
    Dac = 0xcc,
    Sof13 = 0xcd,
    Sof14 = 0xce,
    Sof15 = 0xcf,
    Rst0 = 0xd0,
    Rst1 = 0xd1,
    Rst2 = 0xd2,
    Rst3 = 0xd3,
    Rst4 = 0xd4,
    Rst5 = 0xd5,
    Rst6 = 0xd6,
    Rst7 = 0xd7,
    Soi = 0xd8,
    Eoi = 0xd9,
    Sos = 0xda,
    Dqt = 0xdb,
    Dnl = 0xdc,
    Dri = 0xdd,
    Dhp = 0xde,
    Exp = 0xdf,
    App0 = 0xe0,
    App1 = 0xe1,
    App2 = 0xe2,
    App3 = 0xe3,
    App4 = 0xe4,
    App5 = 0xe5,
    App6 = 0xe6,
    App7 = 0xe7,
    App8 = 0xe8,
    App9 = 0xe9,
    App10 = 0xea,
    App11 = 0xeb,
    App12 = 0xec,
    App13 = 0xed,
    App14 = 0xee,
    App15 = 0xef,
    Jpg0 = 0xf0,
    Jpg1 = 0xf1,
    Jpg2 = 0xf2,
    Jpg3 = 0xf3,
    Jpg4 = 0xf4,
    Jpg5 = 0xf5,
    Jpg6 = 0xf6,
    /// JPEG-LS frame.
    Sof48 = 0xf7,
    /// JPEG-LS extension parameters.
    Lse = 0xf8,
    Jpg9 = 0xf9,
    Jpg10 = 0xfa,
    Jpg11 = 0xfb,
    Jpg12 = 0xfc,
    Jpg13 = 0xfd,
    Com = 0xfe,
    /// Temporary private use in arithmetic coding.
    Tem = 0x01,
}

impl JpegMarker {
    /// The two-byte marker as it appears in the stream.
    pub fn bytes(self) -> [u8; 2] {
        [0xff, self as u8]
    }
}

/// Frame-level inputs to [`build`] and [`write_header`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameParams {
    /// Width in 8-pixel blocks.
    pub width: u8,
    /// Height in 8-pixel blocks.
    pub height: u8,
    /// RFC 2435 type; 0 is 4:2:2, anything else is treated as 4:2:0.
    pub jpeg_type: u8,
    /// Emit a DRI segment when non-zero.
    pub restart_interval: u16,
}

fn put_marker(out: &mut Vec<u8>, marker: JpegMarker) {
    out.extend_from_slice(&marker.bytes());
}

fn put_u16(out: &mut Vec<u8>, value: u16) {
    out.extend_from_slice(&value.to_be_bytes());
}

/// Append the full header for one frame to `out` and return the number of
/// bytes written.
///
/// Inputs are trusted: they come out of [`JpegHeader::parse`](super::header::JpegHeader::parse)
/// and the table resolution in the depacketizer.
pub fn write_header(out: &mut Vec<u8>, params: &FrameParams, tables: &QuantizationTables) -> usize {
    let start = out.len();
    let width = (params.width as u16) << 3;
    let height = (params.height as u16) << 3;

    put_marker(out, JpegMarker::Soi);

    // APP0: "JFIF\0", version 1.02, aspect ratio 1:1, no thumbnail
    put_marker(out, JpegMarker::App0);
    put_u16(out, 16);
    out.extend_from_slice(b"JFIF\0");
    out.extend_from_slice(&[0x01, 0x02]);
    out.push(0);
    put_u16(out, 1);
    put_u16(out, 1);
    out.push(0);
    out.push(0);

    if params.restart_interval > 0 {
        put_marker(out, JpegMarker::Dri);
        put_u16(out, 4);
        put_u16(out, params.restart_interval);
    }

    let table_count = tables.count();
    put_marker(out, JpegMarker::Dqt);
    put_u16(out, (2 + table_count * (1 + 64)) as u16);
    out.push(0);
    out.extend_from_slice(&tables.luma);
    if let Some(chroma) = &tables.chroma {
        out.push(1);
        out.extend_from_slice(chroma);
    }

    put_marker(out, JpegMarker::Dht);
    let dht_len: usize = 2 + STANDARD_TABLES.iter().map(|t| t.encoded_len()).sum::<usize>();
    put_u16(out, dht_len as u16);
    for table in &STANDARD_TABLES {
        table.write(out);
    }

    let chroma_table = if table_count == 2 { 1 } else { 0 };
    put_marker(out, JpegMarker::Sof0);
    put_u16(out, 17);
    out.push(8); // sample precision
    put_u16(out, height);
    put_u16(out, width);
    out.push(3);
    // component id, sampling factors (H << 4 | V), quantization table
    out.extend_from_slice(&[1, (2 << 4) | if params.jpeg_type != 0 { 2 } else { 1 }, 0]);
    out.extend_from_slice(&[2, (1 << 4) | 1, chroma_table]);
    out.extend_from_slice(&[3, (1 << 4) | 1, chroma_table]);

    put_marker(out, JpegMarker::Sos);
    put_u16(out, 12);
    out.push(3);
    // component id, DC table << 4 | AC table
    out.extend_from_slice(&[1, 0x00]);
    out.extend_from_slice(&[2, 0x11]);
    out.extend_from_slice(&[3, 0x11]);
    out.extend_from_slice(&[0, 63, 0]); // Ss, Se, Ah/Al

    let written = out.len() - start;
    tracing::trace!(
        width,
        height,
        jpeg_type = params.jpeg_type,
        qtables = table_count,
        bytes = written,
        "JFIF header written"
    );
    written
}

/// Build the header for one frame into a fresh buffer.
pub fn build(params: &FrameParams, tables: &QuantizationTables) -> Vec<u8> {
    let mut out = Vec::with_capacity(640);
    write_header(&mut out, params, tables);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::mjpeg::qtables::synthesize;

    fn params(jpeg_type: u8) -> FrameParams {
        FrameParams {
            width: 80,
            height: 60,
            jpeg_type,
            restart_interval: 0,
        }
    }

    /// Walk marker segments after SOI, returning `(marker, segment body)`.
    fn segments(buf: &[u8]) -> Vec<(u8, &[u8])> {
        let mut out = Vec::new();
        let mut i = 2;
        while i + 4 <= buf.len() {
            assert_eq!(buf[i], 0xff);
            let len = u16::from_be_bytes([buf[i + 2], buf[i + 3]]) as usize;
            out.push((buf[i + 1], &buf[i + 4..i + 2 + len]));
            i += 2 + len;
        }
        assert_eq!(i, buf.len());
        out
    }

    fn segment(buf: &[u8], marker: JpegMarker) -> &[u8] {
        segments(buf)
            .into_iter()
            .find(|(m, _)| *m == marker as u8)
            .map(|(_, body)| body)
            .expect("segment present")
    }

    #[test]
    fn starts_with_soi_and_app0() {
        let h = build(&params(0), &synthesize(50));
        assert_eq!(&h[..2], &[0xff, 0xd8]);
        assert_eq!(&h[2..4], &[0xff, 0xe0]);
        let app0 = segment(&h, JpegMarker::App0);
        assert_eq!(app0.len(), 14);
        assert_eq!(&app0[..5], b"JFIF\0");
        assert_eq!(&app0[5..7], &[1, 2]);
    }

    #[test]
    fn marker_order() {
        let h = build(&params(0), &synthesize(50));
        let order: Vec<u8> = segments(&h).iter().map(|(m, _)| *m).collect();
        assert_eq!(order, vec![0xe0, 0xdb, 0xc4, 0xc0, 0xda]);
    }

    #[test]
    fn header_lengths() {
        let mut out = Vec::new();
        assert_eq!(write_header(&mut out, &params(0), &synthesize(50)), 607);
        assert_eq!(out.len(), 607);

        let mono = QuantizationTables {
            luma: [1; 64],
            chroma: None,
        };
        assert_eq!(build(&params(0), &mono).len(), 542);
    }

    #[test]
    fn write_header_appends() {
        let mut out = vec![0xAA; 3];
        let n = write_header(&mut out, &params(1), &synthesize(50));
        assert_eq!(out.len(), 3 + n);
        assert_eq!(&out[3..5], &[0xff, 0xd8]);
    }

    #[test]
    fn sof0_dimensions_and_sampling() {
        let h = build(&params(0), &synthesize(50));
        let sof = segment(&h, JpegMarker::Sof0);
        assert_eq!(sof[0], 8);
        assert_eq!(u16::from_be_bytes([sof[1], sof[2]]), 480);
        assert_eq!(u16::from_be_bytes([sof[3], sof[4]]), 640);
        assert_eq!(sof[5], 3);
        assert_eq!(&sof[6..9], &[1, 0x21, 0]);
        assert_eq!(&sof[9..12], &[2, 0x11, 1]);
        assert_eq!(&sof[12..15], &[3, 0x11, 1]);

        let h = build(&params(1), &synthesize(50));
        assert_eq!(segment(&h, JpegMarker::Sof0)[7], 0x22);
    }

    #[test]
    fn single_table_shares_index_zero() {
        let mono = QuantizationTables {
            luma: [7; 64],
            chroma: None,
        };
        let h = build(&params(0), &mono);
        let dqt = segment(&h, JpegMarker::Dqt);
        assert_eq!(dqt.len(), 65);
        assert_eq!(dqt[0], 0);
        let sof = segment(&h, JpegMarker::Sof0);
        assert_eq!(sof[11], 0);
        assert_eq!(sof[14], 0);
    }

    #[test]
    fn dqt_carries_tables_verbatim() {
        let tables = synthesize(80);
        let h = build(&params(0), &tables);
        let dqt = segment(&h, JpegMarker::Dqt);
        assert_eq!(dqt.len(), 130);
        assert_eq!(dqt[0], 0);
        assert_eq!(&dqt[1..65], &tables.luma);
        assert_eq!(dqt[65], 1);
        assert_eq!(&dqt[66..], &tables.chroma.unwrap());
    }

    #[test]
    fn dht_contains_all_tables() {
        let h = build(&params(0), &synthesize(50));
        let dht = segment(&h, JpegMarker::Dht);
        assert_eq!(dht.len(), 416);
        assert_eq!(dht[0], 0x00);
        assert_eq!(dht[29], 0x01);
        assert_eq!(dht[58], 0x10);
        assert_eq!(dht[237], 0x11);
    }

    #[test]
    fn dri_only_when_requested() {
        let h = build(&params(0), &synthesize(50));
        assert!(segments(&h).iter().all(|(m, _)| *m != 0xdd));

        let p = FrameParams {
            restart_interval: 0x1234,
            ..params(0)
        };
        let h = build(&p, &synthesize(50));
        assert_eq!(h.len(), 613);
        assert_eq!(segment(&h, JpegMarker::Dri), &[0x12, 0x34]);
    }

    #[test]
    fn sos_is_fixed() {
        let h = build(&params(0), &synthesize(50));
        assert_eq!(
            segment(&h, JpegMarker::Sos),
            &[3, 1, 0x00, 2, 0x11, 3, 0x11, 0, 63, 0]
        );
        assert_eq!(&h[h.len() - 14..h.len() - 12], &[0xff, 0xda]);
    }
}

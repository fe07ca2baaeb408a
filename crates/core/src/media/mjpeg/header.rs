use crate::error::{DepacketizeError, Result};

/// Length of the RFC 2435 main JPEG header.
pub const JPEG_HEADER_LEN: usize = 8;

/// Length of the quantization table header that precedes in-band tables.
pub const QUANT_HEADER_LEN: usize = 4;

/// Only the default type-specific value is understood.
pub const DEFAULT_TYPE_SPECIFIC: u8 = 0;

/// Types in this range signal that restart markers are present.
pub const RESTART_MARKER_TYPES: std::ops::RangeInclusive<u8> = 64..=127;

/// Q values from here on announce in-band quantization tables.
pub const Q_INBAND_MIN: u8 = 128;

/// RFC 2435 main JPEG header (§3.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | Type-specific |              Fragment Offset                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      Type     |       Q       |     Width     |     Height    |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegHeader {
    pub type_specific: u8,
    /// Byte offset of this fragment within the frame's scan data (24 bits).
    pub fragment_offset: u32,
    /// JPEG type. 0 and 1 select 4:2:2 and 4:2:0 sampling.
    pub jpeg_type: u8,
    /// 0–127: table id for [`synthesize`](super::qtables::synthesize);
    /// 128–255: tables are carried in-band on the first fragment.
    pub q: u8,
    /// Frame width in 8-pixel blocks.
    pub width: u8,
    /// Frame height in 8-pixel blocks.
    pub height: u8,
}

/// RFC 2435 quantization table header and its table data (§3.1.8).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |      MBZ      |   Precision   |             Length            |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                    Quantization Table Data                    |
/// |                              ...                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationHeader {
    pub mbz: u8,
    /// Bit i set means table i has 16-bit entries.
    pub precision: u8,
    /// Table data, exactly as many bytes as the length field announced.
    pub data: Vec<u8>,
}

/// A parsed JPEG payload header plus where the scan data begins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JpegPayload {
    pub header: JpegHeader,
    pub quantization: Option<QuantizationHeader>,
    /// Absolute index into the parsed buffer of the first scan byte.
    pub data_offset: usize,
}

impl JpegHeader {
    /// Parse the main header at `offset`, plus the quantization table header
    /// when this is the first fragment (offset 0) and Q ≥ 128.
    ///
    /// Bytes after the headers are left alone: they are entropy-coded data,
    /// even when the quantization table header is not expected.
    pub fn parse(buffer: &[u8], offset: usize) -> Result<JpegPayload> {
        let available = buffer.len().saturating_sub(offset);
        if available < JPEG_HEADER_LEN {
            return Err(DepacketizeError::TruncatedBuffer {
                needed: JPEG_HEADER_LEN,
                available,
            });
        }
        let b = &buffer[offset..];

        let header = JpegHeader {
            type_specific: b[0],
            fragment_offset: u32::from_be_bytes([0, b[1], b[2], b[3]]),
            jpeg_type: b[4],
            q: b[5],
            width: b[6],
            height: b[7],
        };

        if header.type_specific != DEFAULT_TYPE_SPECIFIC {
            return Err(DepacketizeError::UnsupportedTypeSpecifier(header.type_specific));
        }
        if RESTART_MARKER_TYPES.contains(&header.jpeg_type) {
            return Err(DepacketizeError::UnsupportedRestartMarkers(header.jpeg_type));
        }

        let mut data_offset = offset + JPEG_HEADER_LEN;
        let mut quantization = None;

        if header.has_inband_tables() {
            let rest = &b[JPEG_HEADER_LEN..];
            if rest.len() < QUANT_HEADER_LEN {
                return Err(DepacketizeError::TruncatedQuantizationHeader {
                    available: rest.len(),
                });
            }
            let length = u16::from_be_bytes([rest[2], rest[3]]);
            let table = &rest[QUANT_HEADER_LEN..];
            if table.len() < length as usize {
                return Err(DepacketizeError::TruncatedQuantizationTable {
                    length,
                    available: table.len(),
                });
            }
            quantization = Some(QuantizationHeader {
                mbz: rest[0],
                precision: rest[1],
                data: table[..length as usize].to_vec(),
            });
            data_offset += QUANT_HEADER_LEN + length as usize;
        }

        Ok(JpegPayload {
            header,
            quantization,
            data_offset,
        })
    }

    /// Whether a quantization table header follows this header on the wire.
    pub fn has_inband_tables(&self) -> bool {
        self.fragment_offset == 0 && self.q >= Q_INBAND_MIN
    }

    /// Frame width in pixels.
    pub fn width_px(&self) -> u16 {
        (self.width as u16) << 3
    }

    /// Frame height in pixels.
    pub fn height_px(&self) -> u16 {
        (self.height as u16) << 3
    }

    /// Append the 8-byte wire form. The offset is truncated to 24 bits.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(self.type_specific);
        out.extend_from_slice(&self.fragment_offset.to_be_bytes()[1..]);
        out.extend_from_slice(&[self.jpeg_type, self.q, self.width, self.height]);
    }
}

impl QuantizationHeader {
    /// Header for 8-bit tables.
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            mbz: 0,
            precision: 0,
            data,
        }
    }

    /// Append the 4-byte header followed by the table data.
    pub fn write(&self, out: &mut Vec<u8>) {
        out.push(self.mbz);
        out.push(self.precision);
        out.extend_from_slice(&(self.data.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(offset: u32, jpeg_type: u8, q: u8) -> Vec<u8> {
        let mut buf = Vec::new();
        JpegHeader {
            type_specific: 0,
            fragment_offset: offset,
            jpeg_type,
            q,
            width: 80,
            height: 60,
        }
        .write(&mut buf);
        buf
    }

    #[test]
    fn parse_fields() {
        let buf = [0x00, 0x01, 0x02, 0x03, 0x01, 0x32, 0x50, 0x3C, 0xAA];
        let p = JpegHeader::parse(&buf, 0).unwrap();
        assert_eq!(p.header.fragment_offset, 0x010203);
        assert_eq!(p.header.jpeg_type, 1);
        assert_eq!(p.header.q, 50);
        assert_eq!(p.header.width_px(), 640);
        assert_eq!(p.header.height_px(), 480);
        assert_eq!(p.quantization, None);
        assert_eq!(p.data_offset, 8);
    }

    #[test]
    fn parse_short_buffer() {
        assert_eq!(
            JpegHeader::parse(&[0u8; 7], 0),
            Err(DepacketizeError::TruncatedBuffer {
                needed: 8,
                available: 7
            })
        );
    }

    #[test]
    fn rejects_type_specific() {
        let mut buf = header(0, 0, 50);
        buf[0] = 1;
        assert_eq!(
            JpegHeader::parse(&buf, 0),
            Err(DepacketizeError::UnsupportedTypeSpecifier(1))
        );
    }

    #[test]
    fn rejects_restart_marker_types() {
        for t in [64u8, 65, 127] {
            assert_eq!(
                JpegHeader::parse(&header(0, t, 50), 0),
                Err(DepacketizeError::UnsupportedRestartMarkers(t))
            );
        }
        assert!(JpegHeader::parse(&header(0, 63, 50), 0).is_ok());
        assert!(JpegHeader::parse(&header(0, 128, 50), 0).is_ok());
    }

    #[test]
    fn parses_inband_tables() {
        let mut buf = header(0, 1, 255);
        QuantizationHeader::new((0..128).collect()).write(&mut buf);
        buf.extend_from_slice(&[0xDE, 0xAD]);

        let p = JpegHeader::parse(&buf, 0).unwrap();
        let q = p.quantization.unwrap();
        assert_eq!(q.mbz, 0);
        assert_eq!(q.precision, 0);
        assert_eq!(q.data.len(), 128);
        assert_eq!(q.data[127], 127);
        assert_eq!(&buf[p.data_offset..], &[0xDE, 0xAD]);
    }

    #[test]
    fn no_tables_below_q128() {
        let mut buf = header(0, 1, 127);
        buf.extend_from_slice(&[0, 0, 0, 64]);
        let p = JpegHeader::parse(&buf, 0).unwrap();
        assert_eq!(p.quantization, None);
        assert_eq!(p.data_offset, 8);
    }

    #[test]
    fn no_tables_after_first_fragment() {
        let mut buf = header(10, 1, 255);
        buf.extend_from_slice(&[0, 0, 0, 64]);
        let p = JpegHeader::parse(&buf, 0).unwrap();
        assert_eq!(p.quantization, None);
        assert_eq!(p.data_offset, 8);
    }

    #[test]
    fn truncated_quantization_header() {
        let mut buf = header(0, 0, 200);
        buf.extend_from_slice(&[0, 0, 0]);
        assert_eq!(
            JpegHeader::parse(&buf, 0),
            Err(DepacketizeError::TruncatedQuantizationHeader { available: 3 })
        );
    }

    #[test]
    fn truncated_quantization_table() {
        let mut buf = header(0, 0, 200);
        buf.extend_from_slice(&[0, 0, 0, 128]);
        buf.extend_from_slice(&[1; 100]);
        assert_eq!(
            JpegHeader::parse(&buf, 0),
            Err(DepacketizeError::TruncatedQuantizationTable {
                length: 128,
                available: 100
            })
        );
    }

    #[test]
    fn empty_inband_table() {
        let mut buf = header(0, 0, 200);
        buf.extend_from_slice(&[0, 0, 0, 0, 0xAB]);
        let p = JpegHeader::parse(&buf, 0).unwrap();
        assert!(p.quantization.unwrap().data.is_empty());
        assert_eq!(p.data_offset, 12);
    }

    #[test]
    fn parse_at_offset() {
        let mut buf = vec![0xEE; 12];
        buf.extend_from_slice(&header(0x123456, 0, 10));
        let p = JpegHeader::parse(&buf, 12).unwrap();
        assert_eq!(p.header.fragment_offset, 0x123456);
        assert_eq!(p.data_offset, 20);
    }
}

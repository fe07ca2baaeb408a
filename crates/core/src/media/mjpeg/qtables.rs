//! Quantization tables derived from a Q factor (RFC 2435 §4.2, Appendix A).

/// Luma then chroma base quantizers, each 64 entries in zig-zag order.
#[rustfmt::skip]
const DEFAULT_QUANTIZERS: [u8; 128] = [
    // luma
    16, 11, 12, 14, 12, 10, 16, 14, 13, 14, 18, 17, 16, 19, 24, 40,
    26, 24, 22, 22, 24, 49, 35, 37, 29, 40, 58, 51, 61, 60, 57, 51,
    56, 55, 64, 72, 92, 78, 64, 68, 87, 69, 55, 56, 80, 109, 81, 87,
    95, 98, 103, 104, 103, 62, 77, 113, 121, 112, 100, 120, 92, 101, 103, 99,
    // chroma
    17, 18, 18, 24, 21, 24, 47, 26, 26, 47, 99, 66, 56, 66, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
    99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99, 99,
];

/// A luma table and an optional chroma table, 64 zig-zag entries each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizationTables {
    pub luma: [u8; 64],
    pub chroma: Option<[u8; 64]>,
}

impl QuantizationTables {
    /// Split in-band table data into one or two tables.
    ///
    /// 128 bytes or more yield luma and chroma; 64 to 127 bytes yield a
    /// lone luma table. Anything shorter returns `None`.
    pub fn from_inband(data: &[u8]) -> Option<Self> {
        let luma: [u8; 64] = data.get(..64)?.try_into().ok()?;
        let chroma = data
            .get(64..128)
            .and_then(|c| <[u8; 64]>::try_from(c).ok());
        Some(Self { luma, chroma })
    }

    /// Number of tables a DQT segment carries for this pair.
    pub fn count(&self) -> usize {
        if self.chroma.is_some() { 2 } else { 1 }
    }
}

/// Scale the standard tables by `quality` the way libjpeg does.
///
/// Quality is clamped to 1..=99. The scale is `5000 / q` below 50 and
/// `200 - 2q` from 50 up; every entry is `(base * scale + 50) / 100`
/// clamped to 1..=255.
pub fn synthesize(quality: u8) -> QuantizationTables {
    let factor = quality.clamp(1, 99) as u32;
    let scale = if factor < 50 {
        5000 / factor
    } else {
        200 - factor * 2
    };

    let mut tables = [0u8; 128];
    for (out, &base) in tables.iter_mut().zip(DEFAULT_QUANTIZERS.iter()) {
        let value = (base as u32 * scale + 50) / 100;
        *out = value.clamp(1, 255) as u8;
    }

    let mut luma = [0u8; 64];
    let mut chroma = [0u8; 64];
    luma.copy_from_slice(&tables[..64]);
    chroma.copy_from_slice(&tables[64..]);
    QuantizationTables {
        luma,
        chroma: Some(chroma),
    }
}

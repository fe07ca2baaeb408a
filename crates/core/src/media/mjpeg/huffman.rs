//! Standard baseline Huffman tables (ITU T.81 Annex K.3).
//!
//! RFC 2435 streams never carry Huffman tables; every receiver assumes these.
//! They are only valid for 8-bit sample precision.

/// Table class written in the high nibble of a DHT table byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TableClass {
    Dc = 0,
    Ac = 1,
}

/// One Huffman table as it appears in a DHT segment.
#[derive(Debug, Clone, Copy)]
pub struct HuffmanTable {
    pub class: TableClass,
    pub id: u8,
    /// `bits[n]` is the number of codes of length `n`. Index 0 is unused.
    pub bits: &'static [u8; 17],
    /// Symbol values in code order.
    pub values: &'static [u8],
}

impl HuffmanTable {
    /// Number of symbols the table defines.
    pub fn symbol_count(&self) -> usize {
        self.bits[1..].iter().map(|&n| n as usize).sum()
    }

    /// Bytes this table occupies inside a DHT segment.
    pub fn encoded_len(&self) -> usize {
        17 + self.symbol_count()
    }

    /// Append class/id byte, the 16 length counts, then the symbol values.
    /// Returns the number of bytes written.
    pub fn write(&self, out: &mut Vec<u8>) -> usize {
        let n = self.symbol_count();
        out.push((self.class as u8) << 4 | self.id);
        out.extend_from_slice(&self.bits[1..]);
        out.extend_from_slice(&self.values[..n]);
        17 + n
    }
}

const BITS_DC_LUMINANCE: [u8; 17] = [0, 0, 1, 5, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0];
const BITS_DC_CHROMINANCE: [u8; 17] = [0, 0, 3, 1, 1, 1, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0];
const VAL_DC: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

const BITS_AC_LUMINANCE: [u8; 17] = [0, 0, 2, 1, 3, 3, 2, 4, 3, 5, 5, 4, 4, 0, 0, 1, 0x7d];
#[rustfmt::skip]
const VAL_AC_LUMINANCE: [u8; 162] = [
    0x01, 0x02, 0x03, 0x00, 0x04, 0x11, 0x05, 0x12,
    0x21, 0x31, 0x41, 0x06, 0x13, 0x51, 0x61, 0x07,
    0x22, 0x71, 0x14, 0x32, 0x81, 0x91, 0xa1, 0x08,
    0x23, 0x42, 0xb1, 0xc1, 0x15, 0x52, 0xd1, 0xf0,
    0x24, 0x33, 0x62, 0x72, 0x82, 0x09, 0x0a, 0x16,
    0x17, 0x18, 0x19, 0x1a, 0x25, 0x26, 0x27, 0x28,
    0x29, 0x2a, 0x34, 0x35, 0x36, 0x37, 0x38, 0x39,
    0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48, 0x49,
    0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58, 0x59,
    0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68, 0x69,
    0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78, 0x79,
    0x7a, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89,
    0x8a, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98,
    0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5, 0xa6, 0xa7,
    0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4, 0xb5, 0xb6,
    0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3, 0xc4, 0xc5,
    0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2, 0xd3, 0xd4,
    0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda, 0xe1, 0xe2,
    0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9, 0xea,
    0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

const BITS_AC_CHROMINANCE: [u8; 17] = [0, 0, 2, 1, 2, 4, 4, 3, 4, 7, 5, 4, 4, 0, 1, 2, 0x77];
#[rustfmt::skip]
const VAL_AC_CHROMINANCE: [u8; 162] = [
    0x00, 0x01, 0x02, 0x03, 0x11, 0x04, 0x05, 0x21,
    0x31, 0x06, 0x12, 0x41, 0x51, 0x07, 0x61, 0x71,
    0x13, 0x22, 0x32, 0x81, 0x08, 0x14, 0x42, 0x91,
    0xa1, 0xb1, 0xc1, 0x09, 0x23, 0x33, 0x52, 0xf0,
    0x15, 0x62, 0x72, 0xd1, 0x0a, 0x16, 0x24, 0x34,
    0xe1, 0x25, 0xf1, 0x17, 0x18, 0x19, 0x1a, 0x26,
    0x27, 0x28, 0x29, 0x2a, 0x35, 0x36, 0x37, 0x38,
    0x39, 0x3a, 0x43, 0x44, 0x45, 0x46, 0x47, 0x48,
    0x49, 0x4a, 0x53, 0x54, 0x55, 0x56, 0x57, 0x58,
    0x59, 0x5a, 0x63, 0x64, 0x65, 0x66, 0x67, 0x68,
    0x69, 0x6a, 0x73, 0x74, 0x75, 0x76, 0x77, 0x78,
    0x79, 0x7a, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87,
    0x88, 0x89, 0x8a, 0x92, 0x93, 0x94, 0x95, 0x96,
    0x97, 0x98, 0x99, 0x9a, 0xa2, 0xa3, 0xa4, 0xa5,
    0xa6, 0xa7, 0xa8, 0xa9, 0xaa, 0xb2, 0xb3, 0xb4,
    0xb5, 0xb6, 0xb7, 0xb8, 0xb9, 0xba, 0xc2, 0xc3,
    0xc4, 0xc5, 0xc6, 0xc7, 0xc8, 0xc9, 0xca, 0xd2,
    0xd3, 0xd4, 0xd5, 0xd6, 0xd7, 0xd8, 0xd9, 0xda,
    0xe2, 0xe3, 0xe4, 0xe5, 0xe6, 0xe7, 0xe8, 0xe9,
    0xea, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8,
    0xf9, 0xfa,
];

pub const DC_LUMINANCE: HuffmanTable = HuffmanTable {
    class: TableClass::Dc,
    id: 0,
    bits: &BITS_DC_LUMINANCE,
    values: &VAL_DC,
};

pub const DC_CHROMINANCE: HuffmanTable = HuffmanTable {
    class: TableClass::Dc,
    id: 1,
    bits: &BITS_DC_CHROMINANCE,
    values: &VAL_DC,
};

pub const AC_LUMINANCE: HuffmanTable = HuffmanTable {
    class: TableClass::Ac,
    id: 0,
    bits: &BITS_AC_LUMINANCE,
    values: &VAL_AC_LUMINANCE,
};

pub const AC_CHROMINANCE: HuffmanTable = HuffmanTable {
    class: TableClass::Ac,
    id: 1,
    bits: &BITS_AC_CHROMINANCE,
    values: &VAL_AC_CHROMINANCE,
};

/// The four tables in DHT order.
pub const STANDARD_TABLES: [HuffmanTable; 4] =
    [DC_LUMINANCE, DC_CHROMINANCE, AC_LUMINANCE, AC_CHROMINANCE];

/// Code lengths and codes indexed by symbol value. A length of 0 means the
/// symbol has no code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCodes {
    pub sizes: [u8; 256],
    pub codes: [u16; 256],
}

impl HuffmanCodes {
    /// `(length, code)` for `symbol`, if it was assigned one.
    pub fn get(&self, symbol: u8) -> Option<(u8, u16)> {
        let size = self.sizes[symbol as usize];
        (size != 0).then(|| (size, self.codes[symbol as usize]))
    }
}

/// Assign canonical codes: for each length 1..=16, hand out `bits[length]`
/// consecutive codes in value order, then shift the running code left.
///
/// Symbol 0 keeps the code of its *first* occurrence. Some encoders emit
/// tables that map two codes to symbol 0 and only the first one is valid;
/// later occurrences still consume a code but are not recorded. Assignment
/// stops early if `values` runs out.
pub fn build_codes(bits: &[u8; 17], values: &[u8]) -> HuffmanCodes {
    let mut sizes = [0u8; 256];
    let mut codes = [0u16; 256];
    let mut symbols = values.iter();
    let mut code: u16 = 0;

    for length in 1..=16u8 {
        for _ in 0..bits[length as usize] {
            let Some(&sym) = symbols.next() else {
                return HuffmanCodes { sizes, codes };
            };
            // symbol 0: first occurrence wins
            if sym != 0 || sizes[0] == 0 {
                sizes[sym as usize] = length;
                codes[sym as usize] = code;
            }
            code = code.wrapping_add(1);
        }
        code = code.wrapping_shl(1);
    }

    HuffmanCodes { sizes, codes }
}

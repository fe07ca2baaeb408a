//! Reader for rtpdump capture files (rtptools `rtpdump -F dump`).
//!
//! ```text
//! #!rtpplay1.0 <address>/<port>\n
//! file header:   start_sec u32 | start_usec u32 | source u32 | port u16 | pad u16
//! per packet:    length u16 | plen u16 | offset_ms u32 | data[length - 8]
//! ```
//!
//! All integers are big-endian. `plen` is the RTP packet length, or 0 for
//! RTCP records, which are skipped.

use std::io::{self, BufRead, ErrorKind, Read};

const MAGIC: &[u8] = b"#!rtpplay1.0 ";
const FILE_HEADER_LEN: usize = 16;
const RECORD_HEADER_LEN: usize = 8;

/// One captured RTP packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Milliseconds since the start of the capture.
    pub offset_ms: u32,
    pub data: Vec<u8>,
}

pub struct RtpDumpReader<R> {
    inner: R,
}

impl<R: BufRead> RtpDumpReader<R> {
    /// Validate the text line and skip the binary file header.
    pub fn new(mut inner: R) -> io::Result<Self> {
        let mut line = Vec::new();
        inner.read_until(b'\n', &mut line)?;
        if !line.starts_with(MAGIC) {
            return Err(io::Error::new(
                ErrorKind::InvalidData,
                "not an rtpdump file (missing #!rtpplay1.0)",
            ));
        }
        let mut header = [0u8; FILE_HEADER_LEN];
        inner.read_exact(&mut header)?;
        Ok(Self { inner })
    }

    /// Next RTP record, or `None` at a clean end of file.
    pub fn next_record(&mut self) -> io::Result<Option<Record>> {
        loop {
            let mut header = [0u8; RECORD_HEADER_LEN];
            let mut filled = 0;
            while filled < RECORD_HEADER_LEN {
                match self.inner.read(&mut header[filled..]) {
                    Ok(0) if filled == 0 => return Ok(None),
                    Ok(0) => {
                        return Err(io::Error::new(
                            ErrorKind::InvalidData,
                            format!("record header truncated after {filled} bytes"),
                        ));
                    }
                    Ok(n) => filled += n,
                    Err(e) if e.kind() == ErrorKind::Interrupted => {}
                    Err(e) => return Err(e),
                }
            }
            let length = u16::from_be_bytes([header[0], header[1]]) as usize;
            let plen = u16::from_be_bytes([header[2], header[3]]) as usize;
            let offset_ms = u32::from_be_bytes([header[4], header[5], header[6], header[7]]);

            let body_len = length.checked_sub(RECORD_HEADER_LEN).ok_or_else(|| {
                io::Error::new(ErrorKind::InvalidData, "record shorter than its header")
            })?;
            let mut data = vec![0u8; body_len];
            self.inner.read_exact(&mut data)?;

            if plen == 0 {
                continue;
            }
            data.truncate(plen);
            return Ok(Some(Record { offset_ms, data }));
        }
    }
}

impl<R: BufRead> Iterator for RtpDumpReader<R> {
    type Item = io::Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

pub mod error;
pub mod media;

pub use error::{DepacketizeError, Result};
pub use media::mjpeg::{DepacketizerConfig, JpegDepacketizer, JpegPacketizer};
pub use media::rtp::RtpHeader;
pub use media::{Depacketizer, JpegFrame};

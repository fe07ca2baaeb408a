mod rtpdump;

use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rtpjpeg::media::mjpeg::jfif::{self, FrameParams};
use rtpjpeg::media::mjpeg::qtables::synthesize;
use rtpjpeg::{Depacketizer, DepacketizerConfig, JpegDepacketizer};

use rtpdump::RtpDumpReader;

#[derive(Parser)]
#[command(name = "rtp-jpeg", about = "Tools for RTP/JPEG (RFC 2435) streams")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reassemble JPEG frames from an rtpdump capture
    Extract {
        /// rtpdump file (rtptools "dump" format)
        #[arg(long, short)]
        input: PathBuf,
        /// Directory that receives frame-NNNNN.jpg files
        #[arg(long, short, default_value = "frames")]
        out_dir: PathBuf,
        /// Only accept this RTP payload type
        #[arg(long, default_value_t = 26)]
        payload_type: u8,
    },
    /// Write the JFIF header a receiver would synthesize for a frame
    Header {
        /// Width in 8-pixel blocks
        #[arg(long)]
        width: u8,
        /// Height in 8-pixel blocks
        #[arg(long)]
        height: u8,
        /// RFC 2435 type (0 = 4:2:2, 1 = 4:2:0)
        #[arg(long = "type", default_value_t = 0)]
        jpeg_type: u8,
        /// Q factor used to derive the quantization tables
        #[arg(long, default_value_t = 50)]
        quality: u8,
        /// Emit a DRI segment with this interval
        #[arg(long, default_value_t = 0)]
        restart_interval: u16,
        #[arg(long, short)]
        output: PathBuf,
    },
}

fn extract(input: PathBuf, out_dir: PathBuf, payload_type: u8) -> std::io::Result<usize> {
    let reader = RtpDumpReader::new(BufReader::new(File::open(&input)?))?;
    fs::create_dir_all(&out_dir)?;

    let mut depacketizer = JpegDepacketizer::with_config(DepacketizerConfig {
        payload_type: Some(payload_type),
        ..DepacketizerConfig::default()
    });
    let mut frames = 0usize;

    for record in reader {
        let record = record?;
        match depacketizer.push(&record.data) {
            Ok(Some(frame)) => {
                let path = out_dir.join(format!("frame-{frames:05}.jpg"));
                fs::write(&path, &frame.data)?;
                tracing::info!(
                    path = %path.display(),
                    width = frame.width,
                    height = frame.height,
                    timestamp = frame.timestamp,
                    "frame written"
                );
                frames += 1;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(offset_ms = record.offset_ms, error = %e, "packet dropped");
            }
        }
    }

    Ok(frames)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    match args.command {
        Command::Extract {
            input,
            out_dir,
            payload_type,
        } => match extract(input, out_dir.clone(), payload_type) {
            Ok(frames) => {
                println!("{} frames written to {}", frames, out_dir.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Extraction failed: {}", e);
                ExitCode::FAILURE
            }
        },
        Command::Header {
            width,
            height,
            jpeg_type,
            quality,
            restart_interval,
            output,
        } => {
            let params = FrameParams {
                width,
                height,
                jpeg_type,
                restart_interval,
            };
            let header = jfif::build(&params, &synthesize(quality));
            if let Err(e) = fs::write(&output, &header) {
                eprintln!("Failed to write {}: {}", output.display(), e);
                return ExitCode::FAILURE;
            }
            println!("{} header bytes written to {}", header.len(), output.display());
            ExitCode::SUCCESS
        }
    }
}

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::process::ExitCode;
use std::time::Duration;

use stream_encoder::{
    CodecSession, EncodePump, EncoderError, FfmpegSession, RawFrame, Result, StreamEncoderConfig,
};

const USAGE: &str = "Usage: stream-encoder <config.json> <input.yuv> <output>";
const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    // Load configuration
    let config = load_config(&args[1]);

    // Initialize logger
    let Some(logger) = initialize_logger(&config) else {
        return ExitCode::FAILURE;
    };

    logger.info(&format!("Encoding {} -> {}", args[2], args[3]));

    let code = match run(&config, &args[2], &args[3], &logger) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger.error(&format!("Encoding failed: {}", e));
            eprintln!("Encoding failed: {}", e);
            ExitCode::FAILURE
        }
    };

    if !logger.flush(LOG_FLUSH_TIMEOUT) {
        eprintln!("Log file may be incomplete");
    }
    code
}

/// Initializes the main logger from configuration
fn initialize_logger(config: &StreamEncoderConfig) -> Option<logging::Logger> {
    match config.logging.create_logger("Main") {
        Ok(logger) => {
            eprintln!(
                "Logging initialized: {} (level: {})",
                config.logging.log_file_path, config.logging.log_level
            );
            Some(logger)
        }
        Err(e) => {
            eprintln!("Failed to create logger: {}", e);
            eprintln!("Cannot continue without logging system.");
            None
        }
    }
}

/// Loads configuration, falling back to defaults
///
/// Order:
/// 1. `ENCODER_CONFIG` environment variable holding a JSON document
/// 2. The file named on the command line
/// 3. Built-in defaults
fn load_config(path: &str) -> StreamEncoderConfig {
    if let Ok(json) = std::env::var("ENCODER_CONFIG") {
        match StreamEncoderConfig::from_json(&json) {
            Ok(config) => {
                eprintln!("Configuration loaded from ENCODER_CONFIG env as JSON string");
                return config;
            }
            Err(e) => eprintln!("ENCODER_CONFIG env is not a valid configuration: {}", e),
        }
    }

    match StreamEncoderConfig::load_from_file(path) {
        Ok(config) => {
            eprintln!("Configuration loaded from: {}", path);
            config
        }
        Err(e) => {
            eprintln!("Failed to load configuration from {}: {}", path, e);
            eprintln!("Using default values...");
            StreamEncoderConfig::default()
        }
    }
}

/// Encodes every frame of `input` into `output`
fn run(
    config: &StreamEncoderConfig,
    input: &str,
    output: &str,
    logger: &logging::Logger,
) -> Result<()> {
    let session = FfmpegSession::open(&config.encoder, logger)?;
    let geometry = session.geometry();
    let mut pump = EncodePump::new(
        session,
        config.pump.clone(),
        config.encoder.discard_rule,
        logger,
    );

    let mut reader = BufReader::new(File::open(input)?);
    let mut writer = BufWriter::new(File::create(output)?);
    let mut buffer = vec![0u8; geometry.frame_size()];

    let mut pts = 0;
    let mut packets = 0u64;
    while read_frame(&mut reader, &mut buffer)? {
        let raw = RawFrame::from_packed(&geometry, &buffer, pts)?;
        if let Some(packet) = pump.encode(&raw)? {
            writer.write_all(packet.data())?;
            packets += 1;
        }
        pts += 1;
    }

    // finish() clears the headers
    let header = pump.header_bytes().map(<[u8]>::to_vec);
    let sei = pump.supplemental_bytes().map(<[u8]>::to_vec);

    let mut write_error = None;
    let drains = pump.finish(|packet| {
        if write_error.is_none() {
            match writer.write_all(packet.data()) {
                Ok(()) => packets += 1,
                Err(e) => write_error = Some(e),
            }
        }
    });
    if let Some(e) = write_error {
        return Err(e.into());
    }
    writer.flush()?;

    if let Some(bytes) = header {
        fs::write(format!("{}.hdr", output), bytes)?;
    }
    if let Some(bytes) = sei {
        fs::write(format!("{}.sei", output), bytes)?;
    }

    logger.info(&format!(
        "Done: {} frames in, {} packets out, {} flush drains",
        pts, packets, drains
    ));
    Ok(())
}

/// Fills `buffer` with the next frame. `false` at a clean end of input.
fn read_frame<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<bool> {
    let mut filled = 0;
    while filled < buffer.len() {
        match reader.read(&mut buffer[filled..])? {
            0 => break,
            n => filled += n,
        }
    }

    match filled {
        0 => Ok(false),
        n if n == buffer.len() => Ok(true),
        n => Err(EncoderError::InvalidFrame(format!(
            "truncated input frame: {} of {} bytes",
            n,
            buffer.len()
        ))),
    }
}

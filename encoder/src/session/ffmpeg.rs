//! FFmpeg-backed codec session.
//!
//! Opens any FFmpeg video encoder by name and exposes it through
//! [`CodecSession`]. Frames are FFmpeg's own `frame::Video`, so a pooled
//! frame is handed to the codec without an extra copy.

use super::packet::EncodedPacket;
use super::traits::{CodecId, CodecSession, SessionError, SessionResult};
use crate::config::EncoderSettings;
use crate::error::{EncoderError, Result};
use crate::frame::{FrameBuffer, FrameGeometry, PixelFormat};
use ffmpeg_next as ffmpeg;
use ffmpeg_sys_next::AVCodecContext;
use logging::Logger;
use std::num::NonZeroUsize;
use std::thread;

impl FrameBuffer for ffmpeg::frame::Video {
    fn allocate(geometry: &FrameGeometry) -> Result<Self> {
        let frame =
            ffmpeg::frame::Video::new(pixel(geometry.format), geometry.width, geometry.height);

        // SAFETY: the frame was just created and owns its AVFrame
        let empty = unsafe { (*frame.as_ptr()).data[0].is_null() };
        if empty {
            return Err(EncoderError::Allocation(format!(
                "FFmpeg frame {}x{} {}",
                geometry.width, geometry.height, geometry.format
            )));
        }
        Ok(frame)
    }

    fn set_pts(&mut self, pts: i64) {
        ffmpeg::frame::Frame::set_pts(self, Some(pts));
    }

    fn pts(&self) -> Option<i64> {
        ffmpeg::frame::Frame::pts(self)
    }

    fn plane_count(&self) -> usize {
        ffmpeg::frame::Video::planes(self)
    }

    fn plane_mut(&mut self, index: usize) -> Option<(&mut [u8], usize)> {
        if index >= ffmpeg::frame::Video::planes(self) {
            return None;
        }
        let stride = ffmpeg::frame::Video::stride(self, index);
        Some((ffmpeg::frame::Video::data_mut(self, index), stride))
    }
}

/// FFmpeg pixel format for `format`.
pub fn pixel(format: PixelFormat) -> ffmpeg::format::Pixel {
    match format {
        PixelFormat::Yuv420p => ffmpeg::format::Pixel::YUV420P,
        PixelFormat::Nv12 => ffmpeg::format::Pixel::NV12,
        PixelFormat::Yuv422p => ffmpeg::format::Pixel::YUV422P,
        PixelFormat::Yuv444p => ffmpeg::format::Pixel::YUV444P,
    }
}

/// Maps an FFmpeg send/receive error onto the session contract.
pub(crate) fn map_error(err: ffmpeg::Error) -> SessionError {
    match err {
        ffmpeg::Error::Other { errno } if errno == ffmpeg::error::EAGAIN => SessionError::NotReady,
        ffmpeg::Error::Eof => SessionError::EndOfStream,
        other => SessionError::Failed(other.to_string()),
    }
}

pub(crate) fn codec_id(id: ffmpeg::codec::Id) -> CodecId {
    match id {
        ffmpeg::codec::Id::H264 => CodecId::H264,
        ffmpeg::codec::Id::HEVC => CodecId::Hevc,
        _ => CodecId::Other,
    }
}

/// Thread count passed to the codec and the resulting pipeline depth.
///
/// Codecs without frame or slice threading run single-threaded with a
/// depth of one. Otherwise `configured` threads, or `cores` when zero.
pub(crate) fn thread_plan(threading: bool, configured: u32, cores: usize) -> (usize, u64) {
    if !threading {
        return (1, 1);
    }
    let count = match configured {
        0 => cores.max(1),
        n => n as usize,
    };
    (count, count as u64)
}

fn available_cores() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Copies the global header bytes an opened codec context carries.
///
/// # Safety
///
/// `ctx` must point to an open `AVCodecContext`. FFmpeg owns `extradata`
/// for `extradata_size` bytes until the context is freed.
unsafe fn read_extradata(ctx: *const AVCodecContext) -> Vec<u8> {
    if ctx.is_null() {
        return Vec::new();
    }
    // SAFETY: non-null and open per the caller's contract
    let (data, size) = unsafe { ((*ctx).extradata, (*ctx).extradata_size) };
    match usize::try_from(size) {
        Ok(len) if len > 0 && !data.is_null() => {
            // SAFETY: `data` is valid for `len` bytes while the context lives
            unsafe { std::slice::from_raw_parts(data, len) }.to_vec()
        }
        _ => Vec::new(),
    }
}

/// Codec session over an opened FFmpeg encoder.
pub struct FfmpegSession {
    encoder: ffmpeg::encoder::Video,
    codec_id: CodecId,
    codec_name: String,
    geometry: FrameGeometry,
    pipeline_depth: u64,
    delays_output: bool,
    extradata: Vec<u8>,
    scratch: ffmpeg::Packet,
}

impl FfmpegSession {
    /// Finds the encoder named in `settings` and opens it.
    ///
    /// # Errors
    ///
    /// `EncoderError::Config` for invalid settings, `EncoderError::Codec`
    /// if FFmpeg cannot find or open the encoder.
    pub fn open(settings: &EncoderSettings, logger: &Logger) -> Result<Self> {
        settings.validate()?;
        let geometry = settings.geometry()?;

        logger.info(&format!(
            "Initializing {} encoder: {}x{} {}, bitrate={}, fps={}/{}, gop={}",
            settings.codec,
            geometry.width,
            geometry.height,
            geometry.format,
            settings.bitrate,
            settings.fps_num,
            settings.fps_den,
            settings.keyframe_interval
        ));

        ffmpeg::init().map_err(|e| EncoderError::Codec(format!("Error init ffmpeg: {}", e)))?;

        let codec = ffmpeg::encoder::find_by_name(&settings.codec)
            .ok_or_else(|| EncoderError::Codec(format!("Encoder '{}' not found", settings.codec)))?
            .video()
            .map_err(|e| EncoderError::Codec(format!("Not a video codec: {}", e)))?;

        let capabilities = codec.capabilities();
        let threading = capabilities.intersects(
            ffmpeg::codec::Capabilities::FRAME_THREADS | ffmpeg::codec::Capabilities::SLICE_THREADS,
        );
        let delays_output = capabilities.contains(ffmpeg::codec::Capabilities::DELAY);
        let id = codec_id(codec.id());

        let mut context = ffmpeg::codec::context::Context::new_with_codec(*codec)
            .encoder()
            .video()
            .map_err(|e| EncoderError::Codec(format!("Error creating context: {}", e)))?;

        context.set_width(geometry.width);
        context.set_height(geometry.height);
        context.set_format(pixel(geometry.format));
        context.set_bit_rate(settings.bitrate as usize);
        context.set_time_base((settings.fps_den as i32, settings.fps_num as i32));
        context.set_frame_rate(Some((settings.fps_num as i32, settings.fps_den as i32)));
        context.set_gop(settings.keyframe_interval);

        let (threads, pipeline_depth) =
            thread_plan(threading, settings.threads, available_cores());

        let mut opts = ffmpeg::Dictionary::new();
        opts.set("threads", &threads.to_string());
        for (key, value) in &settings.options {
            opts.set(key, value);
        }

        let encoder = context
            .open_with(opts)
            .map_err(|e| EncoderError::Codec(format!("Error opening encoder: {}", e)))?;

        // SAFETY: `encoder` holds an open context for the whole call
        let extradata = unsafe { read_extradata(encoder.as_ptr()) };

        logger.info(&format!(
            "Encoder open: threads={}, lag={}, delay={}, extradata={} bytes",
            threads,
            pipeline_depth,
            delays_output,
            extradata.len()
        ));

        Ok(FfmpegSession {
            encoder,
            codec_id: id,
            codec_name: settings.codec.clone(),
            geometry,
            pipeline_depth,
            delays_output,
            extradata,
            scratch: ffmpeg::Packet::empty(),
        })
    }
}

impl CodecSession for FfmpegSession {
    type Frame = ffmpeg::frame::Video;

    fn codec_id(&self) -> CodecId {
        self.codec_id
    }

    fn codec_name(&self) -> &str {
        &self.codec_name
    }

    fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    fn pipeline_depth(&self) -> u64 {
        self.pipeline_depth
    }

    fn delays_output(&self) -> bool {
        self.delays_output
    }

    fn extradata(&self) -> Option<&[u8]> {
        (!self.extradata.is_empty()).then_some(self.extradata.as_slice())
    }

    fn submit(&mut self, frame: &Self::Frame) -> SessionResult<()> {
        self.encoder.send_frame(frame).map_err(map_error)
    }

    fn drain(&mut self, packet: &mut EncodedPacket) -> SessionResult<()> {
        self.encoder
            .receive_packet(&mut self.scratch)
            .map_err(map_error)?;

        packet.fill(
            self.scratch.data().unwrap_or(&[]),
            self.scratch.pts().unwrap_or(0),
            self.scratch.dts().unwrap_or(0),
            self.scratch.is_key(),
        );
        Ok(())
    }

    fn flush(&mut self) -> SessionResult<()> {
        self.encoder.send_eof().map_err(map_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_error() {
        assert_eq!(
            map_error(ffmpeg::Error::Other {
                errno: ffmpeg::error::EAGAIN
            }),
            SessionError::NotReady
        );
        assert_eq!(map_error(ffmpeg::Error::Eof), SessionError::EndOfStream);
        assert!(matches!(
            map_error(ffmpeg::Error::InvalidData),
            SessionError::Failed(_)
        ));
    }

    #[test]
    fn test_codec_id() {
        assert_eq!(codec_id(ffmpeg::codec::Id::HEVC), CodecId::Hevc);
        assert_eq!(codec_id(ffmpeg::codec::Id::H264), CodecId::H264);
        assert_eq!(codec_id(ffmpeg::codec::Id::AV1), CodecId::Other);
    }

    #[test]
    fn test_thread_plan() {
        assert_eq!(thread_plan(false, 8, 16), (1, 1));
        assert_eq!(thread_plan(true, 4, 16), (4, 4));
        assert_eq!(thread_plan(true, 0, 12), (12, 12));
        assert_eq!(thread_plan(true, 0, 0), (1, 1));
    }

    #[test]
    fn test_read_extradata_null_context() {
        // SAFETY: null is handled before any dereference
        assert!(unsafe { read_extradata(std::ptr::null()) }.is_empty());
    }

    #[test]
    fn test_pixel_mapping() {
        assert_eq!(pixel(PixelFormat::Yuv420p), ffmpeg::format::Pixel::YUV420P);
        assert_eq!(pixel(PixelFormat::Nv12), ffmpeg::format::Pixel::NV12);
    }
}

//! Frame buffers and raw plane copies.

use crate::constants::frame::ROW_ALIGNMENT;
use crate::error::{EncoderError, Result};
use std::fmt;
use std::str::FromStr;

/// Planar pixel layouts the encoder accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Yuv420p,
    /// Luma plane plus one interleaved UV plane
    Nv12,
    Yuv422p,
    Yuv444p,
}

impl PixelFormat {
    pub fn plane_count(&self) -> usize {
        match self {
            PixelFormat::Nv12 => 2,
            _ => 3,
        }
    }

    /// Horizontal and vertical chroma subsampling as right shifts.
    pub fn chroma_shift(&self) -> (u32, u32) {
        match self {
            PixelFormat::Yuv420p | PixelFormat::Nv12 => (1, 1),
            PixelFormat::Yuv422p => (1, 0),
            PixelFormat::Yuv444p => (0, 0),
        }
    }

    pub fn is_subsampled(&self) -> bool {
        self.chroma_shift() != (0, 0)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Yuv420p => "yuv420p",
            PixelFormat::Nv12 => "nv12",
            PixelFormat::Yuv422p => "yuv422p",
            PixelFormat::Yuv444p => "yuv444p",
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PixelFormat {
    type Err = EncoderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "yuv420p" | "i420" => Ok(PixelFormat::Yuv420p),
            "nv12" => Ok(PixelFormat::Nv12),
            "yuv422p" => Ok(PixelFormat::Yuv422p),
            "yuv444p" => Ok(PixelFormat::Yuv444p),
            other => Err(EncoderError::Config(format!(
                "Unsupported pixel format: {}",
                other
            ))),
        }
    }
}

fn ceil_shift(value: usize, shift: u32) -> usize {
    (value + (1 << shift) - 1) >> shift
}

/// Dimensions and layout shared by every frame of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameGeometry {
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        FrameGeometry {
            width,
            height,
            format,
        }
    }

    pub fn plane_count(&self) -> usize {
        self.format.plane_count()
    }

    /// Meaningful bytes per row of `plane`.
    pub fn plane_row_bytes(&self, plane: usize) -> usize {
        let width = self.width as usize;
        if plane == 0 {
            return width;
        }
        let (shift_x, _) = self.format.chroma_shift();
        let chroma_width = ceil_shift(width, shift_x);
        match self.format {
            PixelFormat::Nv12 => chroma_width * 2,
            _ => chroma_width,
        }
    }

    /// Rows in `plane`.
    pub fn plane_height(&self, plane: usize) -> usize {
        let height = self.height as usize;
        if plane == 0 {
            return height;
        }
        let (_, shift_y) = self.format.chroma_shift();
        ceil_shift(height, shift_y)
    }

    /// Size of a tightly packed frame (stride == row bytes).
    pub fn frame_size(&self) -> usize {
        (0..self.plane_count())
            .map(|p| self.plane_row_bytes(p) * self.plane_height(p))
            .sum()
    }
}

/// Storage a frame pool can hand out and a codec session can consume.
pub trait FrameBuffer: Sized {
    /// Allocates storage for `geometry`. Contents are unspecified.
    fn allocate(geometry: &FrameGeometry) -> Result<Self>;

    fn set_pts(&mut self, pts: i64);

    fn pts(&self) -> Option<i64>;

    fn plane_count(&self) -> usize;

    /// Mutable plane storage and its stride in bytes.
    fn plane_mut(&mut self, index: usize) -> Option<(&mut [u8], usize)>;
}

/// Heap-backed frame with 32-byte aligned strides.
#[derive(Debug)]
pub struct HeapFrame {
    planes: Vec<Vec<u8>>,
    strides: Vec<usize>,
    pts: Option<i64>,
}

impl HeapFrame {
    pub fn stride(&self, index: usize) -> Option<usize> {
        self.strides.get(index).copied()
    }

    pub fn plane(&self, index: usize) -> Option<&[u8]> {
        self.planes.get(index).map(Vec::as_slice)
    }
}

impl FrameBuffer for HeapFrame {
    fn allocate(geometry: &FrameGeometry) -> Result<Self> {
        let mut planes = Vec::with_capacity(geometry.plane_count());
        let mut strides = Vec::with_capacity(geometry.plane_count());

        for p in 0..geometry.plane_count() {
            let stride = geometry.plane_row_bytes(p).next_multiple_of(ROW_ALIGNMENT);
            let len = stride
                .checked_mul(geometry.plane_height(p))
                .ok_or_else(|| EncoderError::Allocation(format!("plane {} too large", p)))?;

            let mut plane = Vec::new();
            plane.try_reserve_exact(len).map_err(|e| {
                EncoderError::Allocation(format!("plane {} ({} bytes): {}", p, len, e))
            })?;
            plane.resize(len, 0);

            planes.push(plane);
            strides.push(stride);
        }

        Ok(HeapFrame {
            planes,
            strides,
            pts: None,
        })
    }

    fn set_pts(&mut self, pts: i64) {
        self.pts = Some(pts);
    }

    fn pts(&self) -> Option<i64> {
        self.pts
    }

    fn plane_count(&self) -> usize {
        self.planes.len()
    }

    fn plane_mut(&mut self, index: usize) -> Option<(&mut [u8], usize)> {
        let stride = *self.strides.get(index)?;
        let plane = self.planes.get_mut(index)?;
        Some((plane.as_mut_slice(), stride))
    }
}

/// One plane of a host-provided frame.
#[derive(Debug, Clone, Copy)]
pub struct RawPlane<'a> {
    pub data: &'a [u8],
    pub stride: usize,
}

/// Host-provided pixels in the session's pixel format.
#[derive(Debug, Clone)]
pub struct RawFrame<'a> {
    pub planes: Vec<RawPlane<'a>>,
    pub pts: i64,
}

impl<'a> RawFrame<'a> {
    pub fn new(planes: Vec<RawPlane<'a>>, pts: i64) -> Self {
        RawFrame { planes, pts }
    }

    /// Splits a tightly packed planar buffer into planes.
    pub fn from_packed(geometry: &FrameGeometry, bytes: &'a [u8], pts: i64) -> Result<Self> {
        let expected = geometry.frame_size();
        if bytes.len() < expected {
            return Err(EncoderError::InvalidFrame(format!(
                "packed frame has {} bytes, {} expected",
                bytes.len(),
                expected
            )));
        }

        let mut planes = Vec::with_capacity(geometry.plane_count());
        let mut rest = bytes;
        for p in 0..geometry.plane_count() {
            let stride = geometry.plane_row_bytes(p);
            let (plane, tail) = rest.split_at(stride * geometry.plane_height(p));
            planes.push(RawPlane {
                data: plane,
                stride,
            });
            rest = tail;
        }

        Ok(RawFrame { planes, pts })
    }
}

fn required_len(stride: usize, rows: usize, row_bytes: usize) -> usize {
    match rows {
        0 => 0,
        _ => stride * (rows - 1) + row_bytes,
    }
}

/// Copies `raw` into `frame` plane by plane.
///
/// Planes with equal strides are copied in one block, others row by row.
pub fn copy_planes<F: FrameBuffer>(
    raw: &RawFrame<'_>,
    frame: &mut F,
    geometry: &FrameGeometry,
) -> Result<()> {
    if raw.planes.len() != geometry.plane_count() || frame.plane_count() != geometry.plane_count()
    {
        return Err(EncoderError::InvalidFrame(format!(
            "{} planes supplied, {} expected for {}",
            raw.planes.len(),
            geometry.plane_count(),
            geometry.format
        )));
    }

    for (index, src) in raw.planes.iter().enumerate() {
        let rows = geometry.plane_height(index);
        let row_bytes = geometry.plane_row_bytes(index);
        let (dst, dst_stride) = frame
            .plane_mut(index)
            .ok_or_else(|| EncoderError::InvalidFrame(format!("plane {} missing", index)))?;

        if src.stride < row_bytes || dst_stride < row_bytes {
            return Err(EncoderError::InvalidFrame(format!(
                "plane {} stride below {} bytes",
                index, row_bytes
            )));
        }
        if src.data.len() < required_len(src.stride, rows, row_bytes)
            || dst.len() < required_len(dst_stride, rows, row_bytes)
        {
            return Err(EncoderError::InvalidFrame(format!(
                "plane {} shorter than {} rows",
                index, rows
            )));
        }

        if src.stride == dst_stride {
            let len = required_len(src.stride, rows, row_bytes);
            dst[..len].copy_from_slice(&src.data[..len]);
        } else {
            for row in 0..rows {
                let from = row * src.stride;
                let to = row * dst_stride;
                dst[to..to + row_bytes].copy_from_slice(&src.data[from..from + row_bytes]);
            }
        }
    }

    frame.set_pts(raw.pts);
    Ok(())
}

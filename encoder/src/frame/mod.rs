//! Frame buffers and pooling

pub mod buffer;
pub mod pool;

pub use buffer::{
    FrameBuffer, FrameGeometry, HeapFrame, PixelFormat, RawFrame, RawPlane, copy_planes,
};
pub use pool::{FramePool, PoolStats};

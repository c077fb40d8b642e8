//! Reusable compressed packet.

use crate::constants::packet::{PREALLOCATED_BYTES, PRIORITY_DEFAULT, PRIORITY_KEYFRAME};

/// Compressed output of one drain.
///
/// A pump owns a single instance and refills it on every drain; the
/// allocation only ever grows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPacket {
    data: Vec<u8>,
    pts: i64,
    dts: i64,
    keyframe: bool,
}

impl EncodedPacket {
    /// Empty packet with the default 8 MiB reservation.
    pub fn new() -> Self {
        Self::with_capacity(PREALLOCATED_BYTES)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        EncodedPacket {
            data: Vec::with_capacity(capacity),
            pts: 0,
            dts: 0,
            keyframe: false,
        }
    }

    /// Replaces the contents, keeping the allocation.
    pub fn fill(&mut self, bytes: &[u8], pts: i64, dts: i64, keyframe: bool) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.pts = pts;
        self.dts = dts;
        self.keyframe = keyframe;
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.pts = 0;
        self.dts = 0;
        self.keyframe = false;
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn pts(&self) -> i64 {
        self.pts
    }

    pub fn dts(&self) -> i64 {
        self.dts
    }

    pub fn is_keyframe(&self) -> bool {
        self.keyframe
    }

    /// Drop priority hint: 0 for keyframes, 1 otherwise.
    pub fn priority(&self) -> u8 {
        if self.keyframe {
            PRIORITY_KEYFRAME
        } else {
            PRIORITY_DEFAULT
        }
    }
}

impl Default for EncodedPacket {
    fn default() -> Self {
        Self::new()
    }
}

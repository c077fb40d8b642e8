//! Bitstream and encoder constants

/// Annex-B framing
pub mod annexb {
    /// 4-byte unit start code (0x00 0x00 0x00 0x01)
    pub const START_CODE: [u8; 4] = [0x00, 0x00, 0x00, 0x01];
    /// Length of the start code
    pub const START_CODE_LEN: usize = 4;
    /// 3-byte start code H.264 streams use between units of one picture
    pub const SHORT_START_CODE: [u8; 3] = [0x00, 0x00, 0x01];
    pub const SHORT_START_CODE_LEN: usize = 3;
    /// Smallest span a discard marker can occupy
    pub const MARKER_LEN: usize = 4;
    /// Emulation prevention byte
    pub const EMULATION_PREVENTION: u8 = 0x03;
}

/// H.265 (HEVC) NAL unit header
pub mod hevc {
    /// NAL unit type mask (after shifting right by one)
    pub const NAL_TYPE_MASK: u8 = 0x3F;
    /// Video Parameter Set
    pub const NAL_TYPE_VPS: u8 = 32;
    /// Sequence Parameter Set
    pub const NAL_TYPE_SPS: u8 = 33;
    /// Picture Parameter Set
    pub const NAL_TYPE_PPS: u8 = 34;
    /// SEI placed before the slice data
    pub const NAL_TYPE_PREFIX_SEI: u8 = 39;
    /// SEI placed after the slice data
    pub const NAL_TYPE_SUFFIX_SEI: u8 = 40;
}

/// H.264 (AVC) NAL unit header
pub mod h264 {
    /// NAL unit type mask (lower 5 bits)
    pub const NAL_TYPE_MASK: u8 = 0x1F;
    /// Supplemental enhancement information
    pub const NAL_TYPE_SEI: u8 = 6;
    /// Sequence Parameter Set
    pub const NAL_TYPE_SPS: u8 = 7;
    /// Picture Parameter Set
    pub const NAL_TYPE_PPS: u8 = 8;
}

/// Packet sizing
pub mod packet {
    /// Initial capacity of the scratch packet (8 MiB)
    pub const PREALLOCATED_BYTES: usize = 8 * 1024 * 1024;
    /// Drop priority of keyframes
    pub const PRIORITY_KEYFRAME: u8 = 0;
    /// Drop priority of every other packet
    pub const PRIORITY_DEFAULT: u8 = 1;
}

/// Logging intervals for frame processing
pub mod logging {
    /// Log progress every N frames
    pub const ENCODER_LOG_INTERVAL: u64 = 60;
}

/// Frame buffer layout
pub mod frame {
    /// Row alignment of pooled frame buffers
    pub const ROW_ALIGNMENT: usize = 32;
}

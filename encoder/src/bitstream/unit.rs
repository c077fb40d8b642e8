//! Unit views, headers and type classes.

use crate::constants::{h264, hevc};

/// NAL header syntax of the elementary stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSyntax {
    /// Two-byte H.265 header
    Hevc,
    /// One-byte H.264 header
    Avc,
}

/// Coarse classification driving extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitClass {
    /// Parameter sets (VPS/SPS/PPS) a decoder needs before any slice
    Header,
    /// SEI metadata
    Supplemental,
    Other,
}

/// Decoded NAL unit header.
///
/// H.264 headers carry no layer or temporal id; both are reported as 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitHeader {
    pub unit_type: u8,
    pub layer_id: u8,
    pub temporal_id_plus1: u8,
}

impl UnitHeader {
    /// Decodes the header at the start of `payload` (the bytes after the
    /// start code). `None` if the payload is shorter than the header.
    pub fn parse(syntax: UnitSyntax, payload: &[u8]) -> Option<Self> {
        match syntax {
            UnitSyntax::Hevc => {
                let [b0, b1] = *payload.first_chunk::<2>()?;
                Some(UnitHeader {
                    unit_type: (b0 >> 1) & hevc::NAL_TYPE_MASK,
                    layer_id: ((b0 & 0x01) << 5) | (b1 >> 3),
                    temporal_id_plus1: b1 & 0x07,
                })
            }
            UnitSyntax::Avc => {
                let [b0] = *payload.first_chunk::<1>()?;
                Some(UnitHeader {
                    unit_type: b0 & h264::NAL_TYPE_MASK,
                    layer_id: 0,
                    temporal_id_plus1: 0,
                })
            }
        }
    }

    /// Class of this header's unit type under `syntax`.
    pub fn class(&self, syntax: UnitSyntax) -> UnitClass {
        classify(syntax, self.unit_type)
    }
}

/// Class of a raw unit type value.
pub fn classify(syntax: UnitSyntax, unit_type: u8) -> UnitClass {
    match syntax {
        UnitSyntax::Hevc => match unit_type {
            hevc::NAL_TYPE_VPS | hevc::NAL_TYPE_SPS | hevc::NAL_TYPE_PPS => UnitClass::Header,
            hevc::NAL_TYPE_PREFIX_SEI | hevc::NAL_TYPE_SUFFIX_SEI => UnitClass::Supplemental,
            _ => UnitClass::Other,
        },
        UnitSyntax::Avc => match unit_type {
            h264::NAL_TYPE_SPS | h264::NAL_TYPE_PPS => UnitClass::Header,
            h264::NAL_TYPE_SEI => UnitClass::Supplemental,
            _ => UnitClass::Other,
        },
    }
}

/// A start-code-delimited unit borrowed from a packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unit<'a> {
    bytes: &'a [u8],
    offset: usize,
    start_code_len: usize,
}

impl<'a> Unit<'a> {
    /// `[offset, offset + size)` of `data`, clamped to its length, opening
    /// with a start code of `start_code_len` bytes.
    pub(crate) fn new(data: &'a [u8], offset: usize, size: usize, start_code_len: usize) -> Self {
        let start = offset.min(data.len());
        let stop = offset.saturating_add(size).min(data.len());
        Unit {
            bytes: &data[start..stop],
            offset: start,
            start_code_len,
        }
    }

    /// Offset of the start code within the packet.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length including the start code.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Full byte range, start code included.
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// 4, or 3 for a short H.264 start code.
    pub fn start_code_len(&self) -> usize {
        self.start_code_len
    }

    /// Bytes after the start code.
    pub fn payload(&self) -> &'a [u8] {
        self.bytes.get(self.start_code_len..).unwrap_or(&[])
    }

    pub fn header(&self, syntax: UnitSyntax) -> Option<UnitHeader> {
        UnitHeader::parse(syntax, self.payload())
    }

    /// `Other` when the unit is too short to carry a header.
    pub fn class(&self, syntax: UnitSyntax) -> UnitClass {
        self.header(syntax)
            .map_or(UnitClass::Other, |header| header.class(syntax))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hevc_header() {
        // SPS, layer 0, tid+1 = 1
        let header = UnitHeader::parse(UnitSyntax::Hevc, &[0x42, 0x01]).unwrap();
        assert_eq!(header.unit_type, hevc::NAL_TYPE_SPS);
        assert_eq!(header.layer_id, 0);
        assert_eq!(header.temporal_id_plus1, 1);
    }

    #[test]
    fn test_parse_hevc_layer_bits() {
        // type 39, layer 0b100001, tid+1 = 3
        let header = UnitHeader::parse(UnitSyntax::Hevc, &[0x4F, 0x0B]).unwrap();
        assert_eq!(header.unit_type, hevc::NAL_TYPE_PREFIX_SEI);
        assert_eq!(header.layer_id, 0b100001);
        assert_eq!(header.temporal_id_plus1, 3);
    }

    #[test]
    fn test_parse_avc_header() {
        let header = UnitHeader::parse(UnitSyntax::Avc, &[0x67, 0x42]).unwrap();
        assert_eq!(header.unit_type, h264::NAL_TYPE_SPS);
        assert_eq!(header.class(UnitSyntax::Avc), UnitClass::Header);
    }

    #[test]
    fn test_truncated_header() {
        assert!(UnitHeader::parse(UnitSyntax::Hevc, &[0x40]).is_none());
        assert!(UnitHeader::parse(UnitSyntax::Avc, &[]).is_none());

        let data = [0x00, 0x00, 0x00, 0x01, 0x40];
        let unit = Unit::new(&data, 0, data.len(), 4);
        assert_eq!(unit.class(UnitSyntax::Hevc), UnitClass::Other);
    }

    #[test]
    fn test_classify_hevc() {
        for t in [32, 33, 34] {
            assert_eq!(classify(UnitSyntax::Hevc, t), UnitClass::Header);
        }
        for t in [39, 40] {
            assert_eq!(classify(UnitSyntax::Hevc, t), UnitClass::Supplemental);
        }
        for t in [0, 1, 19, 35, 41, 63] {
            assert_eq!(classify(UnitSyntax::Hevc, t), UnitClass::Other);
        }
    }

    #[test]
    fn test_classify_avc() {
        assert_eq!(classify(UnitSyntax::Avc, 6), UnitClass::Supplemental);
        assert_eq!(classify(UnitSyntax::Avc, 8), UnitClass::Header);
        assert_eq!(classify(UnitSyntax::Avc, 5), UnitClass::Other);
    }

    #[test]
    fn test_unit_view_clamps() {
        let data = [0x00, 0x00, 0x00, 0x01, 0x26, 0x01];
        let unit = Unit::new(&data, 0, 64, 4);
        assert_eq!(unit.len(), data.len());
        assert_eq!(unit.payload(), &[0x26, 0x01]);
        assert_eq!(Unit::new(&data, 10, 4, 4).len(), 0);

        let short = Unit::new(&data[1..], 0, 5, 3);
        assert_eq!(short.payload(), &[0x26, 0x01]);
    }
}

//! Parameter-set and SEI extraction from the first encoded packet.

use super::scanner::{DiscardRule, Units, should_discard};
use super::unit::{UnitClass, UnitSyntax};

/// Codec headers captured from the first packet of a session.
///
/// Written once, then only read until [`StreamHeaders::clear`] at teardown.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StreamHeaders {
    header: Vec<u8>,
    supplemental: Vec<u8>,
}

impl StreamHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parameter sets, start codes included. `None` while empty.
    pub fn header(&self) -> Option<&[u8]> {
        (!self.header.is_empty()).then_some(self.header.as_slice())
    }

    /// SEI units, start codes included. `None` while empty.
    pub fn supplemental(&self) -> Option<&[u8]> {
        (!self.supplemental.is_empty()).then_some(self.supplemental.as_slice())
    }

    pub fn is_populated(&self) -> bool {
        !self.header.is_empty() || !self.supplemental.is_empty()
    }

    pub fn clear(&mut self) {
        self.header.clear();
        self.supplemental.clear();
    }

    pub(crate) fn set_header(&mut self, bytes: &[u8]) {
        self.header.clear();
        self.header.extend_from_slice(bytes);
    }
}

/// Splits the parameter-set and SEI units out of `packet`.
///
/// Units flagged by [`should_discard`] over their payload are skipped.
/// Retained units keep their start code and source order. H.264 units may
/// open with either start code length.
pub fn extract_units(packet: &[u8], syntax: UnitSyntax, rule: DiscardRule) -> StreamHeaders {
    let mut headers = StreamHeaders {
        header: Vec::with_capacity(packet.len()),
        supplemental: Vec::with_capacity(packet.len()),
    };

    for unit in Units::with_syntax(packet, syntax) {
        let payload_start = unit.offset() + unit.start_code_len();
        let unit_end = unit.offset() + unit.len();
        if should_discard(packet, payload_start, unit_end, rule) {
            continue;
        }

        match unit.class(syntax) {
            UnitClass::Header => headers.header.extend_from_slice(unit.bytes()),
            UnitClass::Supplemental => headers.supplemental.extend_from_slice(unit.bytes()),
            UnitClass::Other => {}
        }
    }

    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    const VPS: [u8; 8] = [0x00, 0x00, 0x00, 0x01, 0x40, 0x01, 0x0C, 0x01];
    const SPS: [u8; 9] = [0x00, 0x00, 0x00, 0x01, 0x42, 0x01, 0x01, 0x01, 0x60];
    const PPS: [u8; 7] = [0x00, 0x00, 0x00, 0x01, 0x44, 0x01, 0xC1];
    const PREFIX_SEI: [u8; 8] = [0x00, 0x00, 0x00, 0x01, 0x4E, 0x01, 0x05, 0x10];
    const SUFFIX_SEI: [u8; 7] = [0x00, 0x00, 0x00, 0x01, 0x50, 0x01, 0x81];
    const IDR: [u8; 8] = [0x00, 0x00, 0x00, 0x01, 0x26, 0x01, 0xAF, 0x09];

    fn concat(parts: &[&[u8]]) -> Vec<u8> {
        parts.iter().flat_map(|p| p.iter().copied()).collect()
    }

    #[test]
    fn test_no_start_codes() {
        let packet = [0x12, 0x34, 0x56, 0x78, 0x9A];
        let headers = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Strict);
        assert_eq!(headers.header(), None);
        assert_eq!(headers.supplemental(), None);
        assert!(!headers.is_populated());

        let empty = extract_units(&[], UnitSyntax::Hevc, DiscardRule::Strict);
        assert!(!empty.is_populated());
    }

    #[test]
    fn test_keyframe_packet_split() {
        let packet = concat(&[&VPS, &SPS, &PPS, &PREFIX_SEI, &IDR, &SUFFIX_SEI]);
        let headers = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Strict);

        assert_eq!(headers.header(), Some(concat(&[&VPS, &SPS, &PPS]).as_slice()));
        assert_eq!(
            headers.supplemental(),
            Some(concat(&[&PREFIX_SEI, &SUFFIX_SEI]).as_slice())
        );
    }

    #[test]
    fn test_order_is_preserved() {
        let packet = concat(&[&PPS, &IDR, &VPS]);
        let headers = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Strict);
        assert_eq!(headers.header(), Some(concat(&[&PPS, &VPS]).as_slice()));
        assert_eq!(headers.supplemental(), None);
    }

    #[test]
    fn test_slices_only() {
        let packet = concat(&[&IDR, &IDR]);
        let headers = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Strict);
        assert!(!headers.is_populated());
    }

    #[test]
    fn test_units_with_markers_are_skipped() {
        // zero run inside the payload
        let broken_sps = [0x00, 0x00, 0x00, 0x01, 0x42, 0x01, 0x00, 0x00, 0x02, 0x01];
        let packet = concat(&[&broken_sps, &PPS]);
        let headers = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Strict);
        assert_eq!(headers.header(), Some(&PPS[..]));
    }

    #[test]
    fn test_rule_decides_invalid_escape() {
        let escaped_sps = [0x00, 0x00, 0x00, 0x01, 0x42, 0x01, 0x00, 0x00, 0x03, 0x07];
        let packet = concat(&[&escaped_sps, &PPS]);

        let strict = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Strict);
        assert_eq!(strict.header(), Some(&PPS[..]));

        let compatible = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Compatible);
        assert_eq!(compatible.header(), Some(packet.as_slice()));
    }

    #[test]
    fn test_avc_packet_split() {
        let sps = [0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1E];
        let pps = [0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80];
        let sei = [0x00, 0x00, 0x00, 0x01, 0x06, 0x05, 0x11];
        let idr = [0x00, 0x00, 0x00, 0x01, 0x65, 0x88, 0x84];
        let packet = concat(&[&sps, &pps, &sei, &idr]);

        let headers = extract_units(&packet, UnitSyntax::Avc, DiscardRule::Strict);
        assert_eq!(headers.header(), Some(concat(&[&sps, &pps]).as_slice()));
        assert_eq!(headers.supplemental(), Some(&sei[..]));
    }

    #[test]
    fn test_avc_mixed_start_codes() {
        let sps = [0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1E];
        let pps = [0x00, 0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80];
        let sei = [0x00, 0x00, 0x01, 0x06, 0x05, 0x11];
        let idr = [0x00, 0x00, 0x01, 0x65, 0x88, 0x84];
        let packet = concat(&[&sps, &pps, &sei, &idr]);

        let headers = extract_units(&packet, UnitSyntax::Avc, DiscardRule::Strict);
        assert_eq!(headers.header(), Some(concat(&[&sps, &pps]).as_slice()));
        assert_eq!(headers.supplemental(), Some(&sei[..]));
    }

    #[test]
    fn test_avc_short_start_code_after_parameter_sets() {
        let sps = [0x00, 0x00, 0x00, 0x01, 0x67, 0x42, 0xC0, 0x1E];
        let pps = [0x00, 0x00, 0x01, 0x68, 0xCE, 0x3C, 0x80];
        let idr = [0x00, 0x00, 0x01, 0x65, 0x88, 0x84];
        let packet = concat(&[&sps, &pps, &idr]);

        let headers = extract_units(&packet, UnitSyntax::Avc, DiscardRule::Strict);
        assert_eq!(headers.header(), Some(concat(&[&sps, &pps]).as_slice()));
        assert_eq!(headers.supplemental(), None);
    }

    #[test]
    fn test_clear() {
        let packet = concat(&[&VPS, &PREFIX_SEI]);
        let mut headers = extract_units(&packet, UnitSyntax::Hevc, DiscardRule::Strict);
        assert!(headers.is_populated());
        headers.clear();
        assert!(!headers.is_populated());
    }
}

//! Annex-B unit scanner
//!
//! Pure, bounds-checked scans over an encoded packet. Every function takes
//! the whole buffer plus explicit positions; `end` is clamped to the buffer
//! length so no position can ever index past it.

use super::unit::{Unit, UnitSyntax};
use crate::constants::annexb::{
    EMULATION_PREVENTION, MARKER_LEN, SHORT_START_CODE, SHORT_START_CODE_LEN, START_CODE,
    START_CODE_LEN,
};
use serde::Deserialize;

/// How the third byte `0x03` (emulation prevention) is treated when
/// looking for discard markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardRule {
    /// `00 00 03 xx` is a marker when `xx` is above 3.
    #[default]
    Strict,
    /// `00 00 03 xx` is never a marker. Matches the output of encoders
    /// built against the legacy extraction code byte for byte.
    Compatible,
}

impl DiscardRule {
    /// Parses a config value ("strict" or "compatible"), case-insensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "strict" => Some(DiscardRule::Strict),
            "compatible" => Some(DiscardRule::Compatible),
            _ => None,
        }
    }
}

/// True iff four bytes are available at `pos` and they are `00 00 00 01`.
pub fn is_unit_start(data: &[u8], pos: usize, end: usize) -> bool {
    let end = end.min(data.len());
    match pos.checked_add(START_CODE_LEN) {
        Some(stop) if stop <= end => data[pos..stop] == START_CODE,
        _ => false,
    }
}

/// Position of the first start code at or after `pos`.
pub fn find_next_start(data: &[u8], pos: usize, end: usize) -> Option<usize> {
    let end = end.min(data.len());
    if pos >= end {
        return None;
    }
    (pos..end).find(|&p| is_unit_start(data, p, end))
}

/// Length of the start code at `pos`, if one is there.
///
/// Both syntaxes accept `00 00 00 01`. H.264 also accepts `00 00 01`; a
/// zero byte in front of it makes it the 4-byte form.
pub fn start_code_len(data: &[u8], pos: usize, end: usize, syntax: UnitSyntax) -> Option<usize> {
    if is_unit_start(data, pos, end) {
        return Some(START_CODE_LEN);
    }
    match syntax {
        UnitSyntax::Hevc => None,
        UnitSyntax::Avc => {
            let end = end.min(data.len());
            match pos.checked_add(SHORT_START_CODE_LEN) {
                Some(stop) if stop <= end && data[pos..stop] == SHORT_START_CODE => {
                    Some(SHORT_START_CODE_LEN)
                }
                _ => None,
            }
        }
    }
}

/// Position of the first unit boundary at or after `pos` under `syntax`.
/// Same as [`find_next_start`] for HEVC.
pub fn find_next_boundary(
    data: &[u8],
    pos: usize,
    end: usize,
    syntax: UnitSyntax,
) -> Option<usize> {
    let end = end.min(data.len());
    if pos >= end {
        return None;
    }
    (pos..end).find(|&p| start_code_len(data, p, end, syntax).is_some())
}

/// Distance from `pos` to the next start code, searching from `pos + 4`,
/// or to `end` when there is none. Zero once `pos` reaches `end`.
pub fn unit_size(data: &[u8], pos: usize, end: usize) -> usize {
    let end = end.min(data.len());
    if pos >= end {
        return 0;
    }
    match find_next_start(data, pos.saturating_add(START_CODE_LEN), end) {
        Some(next) => next - pos,
        None => end - pos,
    }
}

/// True if `[pos, end)` should not be treated as a unit payload: either
/// the range is inverted or a discard marker starts at some position in
/// `[pos, end]`.
pub fn should_discard(data: &[u8], pos: usize, end: usize, rule: DiscardRule) -> bool {
    if pos > end {
        return true;
    }
    let end = end.min(data.len());
    (pos..=end).any(|p| is_discard_marker(data, p, end, rule))
}

fn is_discard_marker(data: &[u8], pos: usize, end: usize, rule: DiscardRule) -> bool {
    if pos >= end || end - pos < MARKER_LEN {
        return false;
    }
    let window = &data[pos..pos + MARKER_LEN];
    if window[0] != 0x00 || window[1] != 0x00 {
        return false;
    }

    match window[2] {
        0x00..=0x02 => true,
        EMULATION_PREVENTION => match rule {
            DiscardRule::Strict => window[3] > 0x03,
            DiscardRule::Compatible => false,
        },
        _ => false,
    }
}

/// Lazy iterator over the units of a packet.
///
/// Cloning an iterator restarts nothing; it forks the scan at the current
/// position. Use [`Units::new`] or [`Units::starting_at`] to restart.
#[derive(Debug, Clone)]
pub struct Units<'a> {
    data: &'a [u8],
    pos: usize,
    syntax: UnitSyntax,
}

impl<'a> Units<'a> {
    /// HEVC scan starting at the first start code of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_syntax(data, UnitSyntax::Hevc)
    }

    /// Scan starting at the first unit boundary of `data` under `syntax`.
    pub fn with_syntax(data: &'a [u8], syntax: UnitSyntax) -> Self {
        Self::seek(data, 0, syntax)
    }

    /// HEVC scan starting at the first start code at or after `pos`.
    pub fn starting_at(data: &'a [u8], pos: usize) -> Self {
        Self::seek(data, pos, UnitSyntax::Hevc)
    }

    fn seek(data: &'a [u8], pos: usize, syntax: UnitSyntax) -> Self {
        let pos = find_next_boundary(data, pos, data.len(), syntax).unwrap_or(data.len());
        Units { data, pos, syntax }
    }
}

impl<'a> Iterator for Units<'a> {
    type Item = Unit<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.data.len();
        let prefix = start_code_len(self.data, self.pos, end, self.syntax)?;
        let stop =
            find_next_boundary(self.data, self.pos + prefix, end, self.syntax).unwrap_or(end);

        let unit = Unit::new(self.data, self.pos, stop - self.pos, prefix);
        self.pos = stop;
        Some(unit)
    }
}

//! Annex-B bitstream handling
//!
//! Scanning, unit classification and header extraction over encoded
//! packets. Everything here is pure: no allocation outside the extractor's
//! output buffers and no errors, only absent results.

pub mod extractor;
pub mod scanner;
pub mod unit;

pub use extractor::{StreamHeaders, extract_units};
pub use scanner::{
    DiscardRule, Units, find_next_boundary, find_next_start, is_unit_start, should_discard,
    start_code_len, unit_size,
};
pub use unit::{Unit, UnitClass, UnitHeader, UnitSyntax, classify};

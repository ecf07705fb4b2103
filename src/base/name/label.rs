//! Domain name labels.
//!
//! This is a private module. Its public types are re-exported by the parent
//! module.

use super::super::wire::{FormError, ParseError};
use core::fmt;
use octseq::parse::Parser;

/// The maximum length of a label’s content.
pub const MAX_LABEL_LEN: usize = 63;

/// The maximum length of a domain name in wire format.
pub const MAX_NAME_LEN: usize = 255;

//------------ LabelType -----------------------------------------------------

/// The type of a label as indicated by its first octet.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LabelType {
    /// A normal label with the given length.
    Normal(usize),

    /// A compressed label pointing to the given position in the message.
    Compressed(usize),
}

impl LabelType {
    /// Parses the label type at the beginning of `parser`.
    ///
    /// For a normal label, the parser is left at the start of the content,
    /// for a compressed label it is moved past the two octets of the
    /// pointer.
    pub fn parse(parser: &mut Parser<'_, [u8]>) -> Result<Self, ParseError> {
        let ltype = parser.parse_u8()?;
        match ltype {
            0..=0x3F => Ok(LabelType::Normal(ltype.into())),
            0xC0..=0xFF => {
                let res = usize::from(parser.parse_u8()?);
                let res = res | ((usize::from(ltype) & 0x3F) << 8);
                Ok(LabelType::Compressed(res))
            }
            _ => Err(ParseError::Form(FormError::new("invalid label type"))),
        }
    }
}

//------------ LabelIter -----------------------------------------------------

/// An iterator over the labels of an uncompressed wire-format name.
///
/// The root label is not returned.
#[derive(Clone, Debug)]
pub struct LabelIter<'a> {
    slice: &'a [u8],
}

impl<'a> LabelIter<'a> {
    pub(super) fn new(slice: &'a [u8]) -> Self {
        LabelIter { slice }
    }
}

impl<'a> Iterator for LabelIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(*self.slice.first()?);
        if len == 0 {
            return None;
        }
        let label = self.slice.get(1..=len)?;
        self.slice = &self.slice[len + 1..];
        Some(label)
    }
}

//------------ Display helper ------------------------------------------------

/// Writes a label’s content in presentation format.
///
/// Dots, spaces, and backslashes are escaped with a backslash, other
/// non-printable octets use the `\DDD` form.
pub(super) fn fmt_label(label: &[u8], f: &mut fmt::Formatter) -> fmt::Result {
    for &ch in label {
        if ch == b' ' || ch == b'.' || ch == b'\\' {
            write!(f, "\\{}", ch as char)?;
        } else if !(0x20..0x7F).contains(&ch) {
            write!(f, "\\{:03}", ch)?;
        } else {
            write!(f, "{}", (ch as char))?;
        }
    }
    Ok(())
}

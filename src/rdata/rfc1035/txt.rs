//! Record data for the TXT record.
//!
//! This is a private module. It’s content is re-exported by the parent.

use crate::base::iana::Rtype;
use crate::base::wire::{parse_slice, Compose, FormError, ParseError};
use bytes::Bytes;
use core::fmt;
use octseq::parse::Parser;

//------------ Txt ----------------------------------------------------------

/// TXT record data.
///
/// TXT records hold descriptive text. While it may appear as a single text,
/// it internally consists of a sequence of one or more character strings.
/// The type holds this sequence in its encoded form, i.e., each character
/// string is at most 255 octets long and preceded by an octet with its
/// length.
///
/// The TXT record type is defined in [RFC 1035, section 3.3.14].
///
/// [RFC 1035, section 3.3.14]: https://tools.ietf.org/html/rfc1035#section-3.3.14
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Txt(Bytes);

impl Txt {
    /// The rtype of this record data type.
    pub const RTYPE: Rtype = Rtype::TXT;

    /// Creates a new Txt record from a single slice.
    ///
    /// If the slice is longer than 255 octets, it will be broken up into
    /// multiple character strings where all but the last string will be
    /// 255 octets long. An empty slice results in a single empty string.
    pub fn build_from_slice(text: &[u8]) -> Result<Self, FormError> {
        if text.len() > 0xFF00 {
            return Err(FormError::new("long TXT record data"));
        }
        let mut res = Vec::with_capacity(text.len() + text.len() / 255 + 1);
        let mut chunks = text.chunks(255).peekable();
        if chunks.peek().is_none() {
            res.push(0);
        }
        for chunk in chunks {
            res.push(chunk.len() as u8);
            res.extend_from_slice(chunk);
        }
        Ok(Txt(res.into()))
    }

    /// Creates new TXT record data from its encoded content.
    ///
    /// The content must be a non-empty sequence of character strings.
    pub fn from_slice(slice: &[u8]) -> Result<Self, FormError> {
        if slice.is_empty() {
            return Err(FormError::new("empty TXT record data"));
        }
        let mut pos = 0;
        while pos < slice.len() {
            pos += usize::from(slice[pos]) + 1;
        }
        if pos != slice.len() {
            return Err(FormError::new("short character string"));
        }
        Ok(Txt(Bytes::copy_from_slice(slice)))
    }

    /// Parses TXT record data of `len` octets.
    pub fn parse(
        parser: &mut Parser<'_, [u8]>,
        len: usize,
    ) -> Result<Self, ParseError> {
        Self::from_slice(parse_slice(parser, len)?).map_err(Into::into)
    }

    /// Returns an iterator over the character strings.
    pub fn iter(&self) -> TxtIter {
        TxtIter(self.0.as_ref())
    }

    /// Returns the content of all character strings concatenated.
    pub fn text(&self) -> Vec<u8> {
        self.iter().flatten().copied().collect()
    }
}

//--- Compose

impl Compose for Txt {
    fn compose(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.0.as_ref())
    }
}

//--- Display

impl fmt::Display for Txt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, chunk) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            f.write_str("\"")?;
            for &ch in chunk {
                if ch == b'"' || ch == b'\\' {
                    write!(f, "\\{}", ch as char)?;
                } else if !(0x20..0x7F).contains(&ch) {
                    write!(f, "\\{:03}", ch)?;
                } else {
                    write!(f, "{}", ch as char)?;
                }
            }
            f.write_str("\"")?;
        }
        Ok(())
    }
}

//------------ TxtIter -------------------------------------------------------

/// An iterator over the character strings of TXT record data.
#[derive(Clone, Debug)]
pub struct TxtIter<'a>(&'a [u8]);

impl<'a> Iterator for TxtIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let len = usize::from(*self.0.first()?);
        let res = self.0.get(1..=len)?;
        self.0 = &self.0[len + 1..];
        Some(res)
    }
}

//============ Testing =======================================================

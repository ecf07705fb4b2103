//! Parsed domain names.
//!
//! This is a private module. Its public types are re-exported by the parent
//! module.

use super::super::wire::{FormError, ParseError};
use super::dname::Dname;
use super::label::{fmt_label, LabelType, MAX_NAME_LEN};
use core::fmt;
use octseq::parse::Parser;

//------------ ParsedDname ---------------------------------------------------

/// A domain name parsed from a DNS message.
///
/// In an attempt to keep messages small, DNS uses a procedure called ‘name
/// compression.’ It tries to minimize the space used for repeatedly
/// appearing domain names by simply refering to the first occurence of the
/// name. This works not only for complete names but also for suffixes. In
/// this case, the first unique labels of the name are included and then a
/// pointer is included for the remainder of the name.
///
/// A consequence of this is that when parsing a domain name, its labels can
/// be scattered all over the message. `ParsedDname` therefore only keeps a
/// reference to the message and the position where the name starts. When
/// being created, the type walks over the name once to check that it is,
/// indeed, a valid name. Compression pointers must point backwards, so a
/// pointer loop cannot exist in a name that passed this check.
///
/// Inspecting the name via [`name_eq`][Self::name_eq] or
/// [`iter_labels`][Self::iter_labels] does not allocate. A self-contained
/// copy with its case folded is made explicitly by
/// [`to_dname`][Self::to_dname].
#[derive(Clone, Copy)]
pub struct ParsedDname<'a> {
    /// The message the name is embedded in.
    message: &'a [u8],

    /// The start of the name in the message.
    pos: usize,

    /// The length of the uncompressed name.
    name_len: usize,

    /// Whether the name is compressed starting at `pos`.
    compressed: bool,
}

impl<'a> ParsedDname<'a> {
    /// Parses a name at the current position of `parser`.
    ///
    /// The parser must cover the complete message so that compression
    /// pointers can be resolved. Afterwards, the parser is positioned
    /// right after the name in the linear stream.
    pub fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        let mut name_len = 0;
        let mut pos = parser.pos();

        // Phase One: No compression pointers have been found yet.
        //
        // Parse labels. If we encounter the root label, return an
        // uncompressed name. Otherwise continue to phase two.
        let mut ptr = loop {
            match LabelType::parse(parser)? {
                LabelType::Normal(0) => {
                    // Root label.
                    name_len += 1;
                    return Ok(ParsedDname {
                        message: parser.octets_ref(),
                        pos,
                        name_len,
                        compressed: false,
                    });
                }
                LabelType::Normal(label_len) => {
                    parser.advance(label_len)?;
                    name_len += label_len + 1;
                    if name_len >= MAX_NAME_LEN {
                        return Err(ParsedDnameError::LongName.into());
                    }
                }
                LabelType::Compressed(ptr) => {
                    break ptr;
                }
            }
        };

        // Phase Two: Compression has occured.
        //
        // Now we need to add up label lengths until we encounter the root
        // label or the name becomes too long. This happens on a second
        // parser so the original stays right behind the pointer.
        let message = parser.octets_ref();
        let mut walker = Parser::from_ref(message);
        let mut ptr_end = parser.pos();
        let mut compressed = true;
        loop {
            // The pointer has to point to before its own two octets.
            if ptr + 2 >= ptr_end {
                return Err(ParsedDnameError::ExcessiveCompression.into());
            }

            // If this is the first label, the returned name may as well start
            // here.
            if name_len == 0 {
                pos = ptr;
                compressed = false;
            }

            walker.seek(ptr)?;
            loop {
                match LabelType::parse(&mut walker)? {
                    LabelType::Normal(0) => {
                        name_len += 1;
                        return Ok(ParsedDname {
                            message,
                            pos,
                            name_len,
                            compressed,
                        });
                    }
                    LabelType::Normal(label_len) => {
                        walker.advance(label_len)?;
                        name_len += label_len + 1;
                        if name_len >= MAX_NAME_LEN {
                            return Err(ParsedDnameError::LongName.into());
                        }
                    }
                    LabelType::Compressed(new_ptr) => {
                        ptr = new_ptr;
                        ptr_end = walker.pos();
                        compressed = true;
                        break;
                    }
                }
            }
        }
    }

}

/// # Properties
///
impl<'a> ParsedDname<'a> {
    /// Returns the length of the name if it were uncompressed.
    pub fn name_len(&self) -> usize {
        self.name_len
    }

    /// Returns whether the name is compressed.
    pub fn is_compressed(&self) -> bool {
        self.compressed
    }

    /// Returns whether the name is the root name.
    pub fn is_root(&self) -> bool {
        self.name_len == 1
    }

    /// Returns an iterator over the labels of the name.
    ///
    /// The root label is not included.
    pub fn iter_labels(&self) -> ParsedLabels<'a> {
        ParsedLabels {
            message: self.message,
            pos: self.pos,
        }
    }

    /// Returns whether the name equals `other` ignoring ASCII case.
    pub fn name_eq(&self, other: &Dname) -> bool {
        if self.name_len != other.len() {
            return false;
        }
        let mut left = self.iter_labels();
        let mut right = other.iter_labels();
        loop {
            match (left.next(), right.next()) {
                (Some(l), Some(r)) => {
                    if !l.eq_ignore_ascii_case(r) {
                        return false;
                    }
                }
                (None, None) => return true,
                _ => return false,
            }
        }
    }

    /// Creates an owned, uncompressed copy of the name.
    ///
    /// The copy has all ASCII letters folded to lower case.
    pub fn to_dname(&self) -> Dname {
        if !self.compressed {
            return Dname::from_wire_lowercase(
                &self.message[self.pos..self.pos + self.name_len],
            );
        }
        let mut res = Vec::with_capacity(self.name_len);
        for label in self.iter_labels() {
            res.push(label.len() as u8);
            res.extend_from_slice(label);
        }
        res.push(0);
        Dname::from_wire_lowercase(&res)
    }
}

//--- Display

impl<'a> fmt::Display for ParsedDname<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            return f.write_str(".");
        }
        for (idx, label) in self.iter_labels().enumerate() {
            if idx > 0 {
                f.write_str(".")?;
            }
            fmt_label(label, f)?;
        }
        Ok(())
    }
}

impl<'a> fmt::Debug for ParsedDname<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ParsedDname({}.)", self)
    }
}

//------------ ParsedLabels --------------------------------------------------

/// An iterator over the labels of a parsed domain name.
#[derive(Clone)]
pub struct ParsedLabels<'a> {
    message: &'a [u8],
    pos: usize,
}

impl<'a> Iterator for ParsedLabels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        // The name has been checked during parsing, so running past the
        // message can only happen on a corrupted value and ends iteration.
        loop {
            let ltype = *self.message.get(self.pos)?;
            match ltype {
                0 => return None,
                1..=0x3F => {
                    let start = self.pos + 1;
                    let end = start + usize::from(ltype);
                    let label = self.message.get(start..end)?;
                    self.pos = end;
                    return Some(label);
                }
                _ => {
                    let low = *self.message.get(self.pos + 1)?;
                    self.pos =
                        (usize::from(ltype & 0x3F) << 8) | usize::from(low);
                }
            }
        }
    }
}

//------------ ParsedDnameError ----------------------------------------------

/// Parsing a domain name failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParsedDnameError {
    /// The name is longer than the 255 octets allowed.
    LongName,

    /// A compression pointer did not point backwards.
    ExcessiveCompression,
}

impl fmt::Display for ParsedDnameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        FormError::from(*self).fmt(f)
    }
}

impl std::error::Error for ParsedDnameError {}

impl From<ParsedDnameError> for FormError {
    fn from(err: ParsedDnameError) -> FormError {
        match err {
            ParsedDnameError::LongName => FormError::new("long domain name"),
            ParsedDnameError::ExcessiveCompression => {
                FormError::new("too many compression pointers")
            }
        }
    }
}

impl From<ParsedDnameError> for ParseError {
    fn from(err: ParsedDnameError) -> ParseError {
        ParseError::Form(err.into())
    }
}

//============ Testing =======================================================

//! Uncompressed, absolute domain names.
//!
//! This is a private module. Its public types are re-exported by the parent
//! module.

use super::super::wire::Compose;
use super::label::{fmt_label, LabelIter, MAX_LABEL_LEN, MAX_NAME_LEN};
use bytes::Bytes;
use core::{fmt, str};
use std::net::IpAddr;

//------------ Dname ---------------------------------------------------------

/// An owned, uncompressed, absolute domain name.
///
/// The name is kept in wire format including the final root label. All
/// ASCII letters are folded to lower case when a name is created, so two
/// names compare equal if they are equal ignoring case. This makes `Dname`
/// suitable as a key for the record cache.
///
/// Because the content lives in a [`Bytes`] value, cloning a name and
/// taking its parent are cheap.
#[derive(Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Dname(Bytes);

/// # Creation and Conversion
///
impl Dname {
    /// Returns the root name.
    pub fn root() -> Self {
        Dname(Bytes::from_static(b"\0"))
    }

    /// Creates a name from its uncompressed wire format.
    ///
    /// The slice must contain exactly one name ending in the root label.
    pub fn from_slice(slice: &[u8]) -> Result<Self, DnameError> {
        if slice.len() > MAX_NAME_LEN {
            return Err(DnameError::LongName);
        }
        let mut pos = 0;
        loop {
            let len = match slice.get(pos) {
                Some(&len) => usize::from(len),
                None => return Err(DnameError::ShortInput),
            };
            if len > MAX_LABEL_LEN {
                return Err(DnameError::LongLabel);
            }
            pos += len + 1;
            if len == 0 {
                break;
            }
        }
        if pos != slice.len() {
            return Err(DnameError::TrailingData);
        }
        Ok(Self::from_wire_lowercase(slice))
    }

    /// Creates a name from valid wire format, folding its case.
    pub(super) fn from_wire_lowercase(slice: &[u8]) -> Self {
        Dname(Bytes::from(slice.to_ascii_lowercase()))
    }

    /// Creates the reverse lookup name for an IP address.
    ///
    /// IPv4 addresses map into `in-addr.arpa`, IPv6 addresses into
    /// `ip6.arpa` using one label per nibble.
    pub fn from_addr(addr: IpAddr) -> Self {
        let mut res = Vec::with_capacity(74);
        match addr {
            IpAddr::V4(addr) => {
                for octet in addr.octets().iter().rev() {
                    let label = octet.to_string();
                    res.push(label.len() as u8);
                    res.extend_from_slice(label.as_bytes());
                }
                res.extend_from_slice(b"\x07in-addr\x04arpa\0");
            }
            IpAddr::V6(addr) => {
                const HEX: &[u8] = b"0123456789abcdef";
                for octet in addr.octets().iter().rev() {
                    res.extend_from_slice(&[
                        1,
                        HEX[usize::from(octet & 0x0F)],
                        1,
                        HEX[usize::from(octet >> 4)],
                    ]);
                }
                res.extend_from_slice(b"\x03ip6\x04arpa\0");
            }
        }
        Dname(res.into())
    }

    /// Returns a reference to the wire format of the name.
    pub fn as_slice(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Converts the name into its underlying bytes value.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

/// # Properties
///
impl Dname {
    /// Returns the length of the name’s wire format.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the name is the root name.
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// Returns an iterator over the labels of the name.
    ///
    /// The root label is not included.
    pub fn iter_labels(&self) -> LabelIter {
        LabelIter::new(self.as_slice())
    }

    /// Returns the number of labels not counting the root label.
    pub fn label_count(&self) -> usize {
        self.iter_labels().count()
    }

    /// Returns the first label or `None` for the root name.
    pub fn first(&self) -> Option<&[u8]> {
        self.iter_labels().next()
    }

    /// Returns the name with the first label removed.
    ///
    /// Returns `None` for the root name.
    pub fn parent(&self) -> Option<Dname> {
        if self.is_root() {
            return None;
        }
        let skip = usize::from(self.0[0]) + 1;
        Some(Dname(self.0.slice(skip..)))
    }

    /// Returns a name consisting of the last `count` labels of this name.
    ///
    /// If the name has fewer labels, the whole name is returned.
    pub fn suffix(&self, count: usize) -> Dname {
        let mut res = self.clone();
        let mut labels = self.label_count();
        while labels > count {
            match res.parent() {
                Some(parent) => res = parent,
                None => break,
            }
            labels -= 1;
        }
        res
    }

    /// Returns whether `base` is a suffix of this name at a label boundary.
    ///
    /// Every name ends with the root name and with itself.
    pub fn ends_with(&self, base: &Dname) -> bool {
        let mut pos = 0;
        loop {
            if self.0[pos..] == base.0[..] {
                return true;
            }
            let len = usize::from(self.0[pos]);
            if len == 0 {
                return false;
            }
            pos += len + 1;
        }
    }
}

//--- Compose

impl Compose for Dname {
    fn compose(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.as_slice())
    }
}

//--- FromStr

impl str::FromStr for Dname {
    type Err = DnameError;

    /// Parses a name from its presentation format.
    ///
    /// The trailing dot is optional. A single dot is the root name. Labels
    /// may contain escapes of the form `\X` or `\DDD`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(DnameError::EmptyName);
        }
        if s == "." {
            return Ok(Self::root());
        }
        let mut res = Vec::with_capacity(s.len() + 2);
        let mut label_start = 0;
        res.push(0);
        let mut chars = s.bytes();
        while let Some(ch) = chars.next() {
            let ch = match ch {
                b'.' => {
                    let len = res.len() - label_start - 1;
                    if len == 0 {
                        return Err(DnameError::EmptyLabel);
                    }
                    res[label_start] = len as u8;
                    label_start = res.len();
                    res.push(0);
                    continue;
                }
                b'\\' => parse_escape(&mut chars)?,
                ch => ch,
            };
            if res.len() - label_start > MAX_LABEL_LEN {
                return Err(DnameError::LongLabel);
            }
            res.push(ch.to_ascii_lowercase());
        }
        let len = res.len() - label_start - 1;
        if len > 0 {
            // No trailing dot: close the last label and add the root.
            res[label_start] = len as u8;
            res.push(0);
        }
        if res.len() > MAX_NAME_LEN {
            return Err(DnameError::LongName);
        }
        Ok(Dname(res.into()))
    }
}

fn parse_escape(
    chars: &mut impl Iterator<Item = u8>,
) -> Result<u8, DnameError> {
    let ch = chars.next().ok_or(DnameError::BadEscape)?;
    if !ch.is_ascii_digit() {
        return Ok(ch);
    }
    let mut value = u16::from(ch - b'0');
    for _ in 0..2 {
        match chars.next() {
            Some(ch) if ch.is_ascii_digit() => {
                value = value * 10 + u16::from(ch - b'0');
            }
            _ => return Err(DnameError::BadEscape),
        }
    }
    u8::try_from(value).map_err(|_| DnameError::BadEscape)
}

//--- Display and Debug

impl fmt::Display for Dname {
    /// Formats the domain name without the trailing dot.
    ///
    /// The root name is formatted as a single dot.
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

impl fmt::Debug for Dname {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_root() {
            f.write_str("Dname(.)")
        } else {
            write!(f, "Dname({}.)", self)
        }
    }
}

//------------ DnameError ----------------------------------------------------

/// A domain name could not be created.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DnameError {
    /// The name was empty.
    EmptyName,

    /// The name contained an empty label before its end.
    EmptyLabel,

    /// A label was longer than 63 octets.
    LongLabel,

    /// The name was longer than 255 octets in wire format.
    LongName,

    /// An escape sequence was invalid.
    BadEscape,

    /// The wire format ended before the root label.
    ShortInput,

    /// There was data after the root label.
    TrailingData,
}

//--- Display and Error

impl fmt::Display for DnameError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            DnameError::EmptyName => "empty domain name",
            DnameError::EmptyLabel => "empty label",
            DnameError::LongLabel => "long label",
            DnameError::LongName => "long domain name",
            DnameError::BadEscape => "invalid escape sequence",
            DnameError::ShortInput => "unexpected end of input",
            DnameError::TrailingData => "trailing data",
        })
    }
}

impl std::error::Error for DnameError {}

//============ Testing =======================================================

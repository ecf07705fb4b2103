//! Resource data implementations.
//!
//! This module contains implementations for the record data of the record
//! types the resolver understands.
//!
//! The types are named identically to the [`Rtype`] constant they
//! implement. They are grouped into submodules for the RFCs they are defined
//! in. All types are also re-exported at the top level here. Ie., for the
//! AAAA record type, you can simple `use dnsengine::rdata::Aaaa` instead of
//! `use dnsengine::rdata::aaaa::Aaaa`.
//!
//! The [`RecordData`] enum wraps all of them plus record data of any other
//! type as [`UnknownRecordData`].
//!
//! [`Rtype`]: crate::base::iana::Rtype

pub use self::aaaa::Aaaa;
pub use self::rfc1035::{Cname, Mx, Ns, Ptr, Soa, Txt, TxtIter, A};
pub use self::srv::Srv;

pub mod aaaa;
pub mod rfc1035;
pub mod srv;

use crate::base::iana::Rtype;
use crate::base::name::Dname;
use crate::base::wire::{parse_slice, Compose, FormError, ParseError};
use bytes::Bytes;
use core::fmt;
use octseq::parse::Parser;
use std::net::IpAddr;

//------------ RecordData ----------------------------------------------------

/// The record data of a resource record.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum RecordData {
    A(A),
    Aaaa(Aaaa),
    Cname(Cname),
    Mx(Mx),
    Ns(Ns),
    Ptr(Ptr),
    Soa(Soa),
    Srv(Srv),
    Txt(Txt),
    Unknown(UnknownRecordData),
}

impl RecordData {
    /// Returns the record type of the data.
    pub fn rtype(&self) -> Rtype {
        match *self {
            RecordData::A(_) => A::RTYPE,
            RecordData::Aaaa(_) => Aaaa::RTYPE,
            RecordData::Cname(_) => Cname::RTYPE,
            RecordData::Mx(_) => Mx::RTYPE,
            RecordData::Ns(_) => Ns::RTYPE,
            RecordData::Ptr(_) => Ptr::RTYPE,
            RecordData::Soa(_) => Soa::RTYPE,
            RecordData::Srv(_) => Srv::RTYPE,
            RecordData::Txt(_) => Txt::RTYPE,
            RecordData::Unknown(ref data) => data.rtype(),
        }
    }

    /// Parses record data of type `rtype` that is `rdlen` octets long.
    ///
    /// Domain names in the data may point to earlier parts of the message
    /// but the data itself must end exactly after `rdlen` octets.
    pub fn parse(
        rtype: Rtype,
        parser: &mut Parser<'_, [u8]>,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        if parser.remaining() < rdlen {
            return Err(ParseError::ShortInput);
        }
        let end = parser.pos() + rdlen;
        let res = match rtype {
            Rtype::A => A::parse(parser).map(RecordData::A),
            Rtype::AAAA => Aaaa::parse(parser).map(RecordData::Aaaa),
            Rtype::CNAME => Cname::parse(parser).map(RecordData::Cname),
            Rtype::MX => Mx::parse(parser).map(RecordData::Mx),
            Rtype::NS => Ns::parse(parser).map(RecordData::Ns),
            Rtype::PTR => Ptr::parse(parser).map(RecordData::Ptr),
            Rtype::SOA => Soa::parse(parser).map(RecordData::Soa),
            Rtype::SRV => Srv::parse(parser).map(RecordData::Srv),
            Rtype::TXT => Txt::parse(parser, rdlen).map(RecordData::Txt),
            _ => UnknownRecordData::parse(rtype, parser, rdlen)
                .map(RecordData::Unknown),
        };
        let res = match res {
            // Data running past the record is short input for the record
            // even if the message continues.
            Err(ParseError::ShortInput) => {
                return Err(FormError::new("short record data").into())
            }
            res => res?,
        };
        if parser.pos() != end {
            return Err(FormError::new("record data length mismatch").into());
        }
        Ok(res)
    }

    /// Returns the domain name the record points to, if any.
    ///
    /// This is the target of NS, CNAME, PTR, MX, and SRV records.
    pub fn target_name(&self) -> Option<&Dname> {
        match *self {
            RecordData::Cname(ref data) => Some(data.cname()),
            RecordData::Mx(ref data) => Some(data.exchange()),
            RecordData::Ns(ref data) => Some(data.nsdname()),
            RecordData::Ptr(ref data) => Some(data.ptrdname()),
            RecordData::Srv(ref data) => Some(data.target()),
            _ => None,
        }
    }

    /// Returns the address of an A or AAAA record.
    pub fn addr(&self) -> Option<IpAddr> {
        match *self {
            RecordData::A(ref data) => Some(data.addr().into()),
            RecordData::Aaaa(ref data) => Some(data.addr().into()),
            _ => None,
        }
    }
}

//--- From

macro_rules! from_data {
    ( $( $variant:ident ),* ) => {
        $(
            impl From<$variant> for RecordData {
                fn from(data: $variant) -> Self {
                    RecordData::$variant(data)
                }
            }
        )*
    }
}

from_data!(A, Aaaa, Cname, Mx, Ns, Ptr, Soa, Srv, Txt);

impl From<IpAddr> for RecordData {
    fn from(addr: IpAddr) -> Self {
        match addr {
            IpAddr::V4(addr) => RecordData::A(A::new(addr)),
            IpAddr::V6(addr) => RecordData::Aaaa(Aaaa::new(addr)),
        }
    }
}

//--- Compose

impl Compose for RecordData {
    fn compose(&self, target: &mut Vec<u8>) {
        match *self {
            RecordData::A(ref data) => data.compose(target),
            RecordData::Aaaa(ref data) => data.compose(target),
            RecordData::Cname(ref data) => data.compose(target),
            RecordData::Mx(ref data) => data.compose(target),
            RecordData::Ns(ref data) => data.compose(target),
            RecordData::Ptr(ref data) => data.compose(target),
            RecordData::Soa(ref data) => data.compose(target),
            RecordData::Srv(ref data) => data.compose(target),
            RecordData::Txt(ref data) => data.compose(target),
            RecordData::Unknown(ref data) => data.compose(target),
        }
    }
}

//--- Display

impl fmt::Display for RecordData {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            RecordData::A(ref data) => data.fmt(f),
            RecordData::Aaaa(ref data) => data.fmt(f),
            RecordData::Cname(ref data) => data.fmt(f),
            RecordData::Mx(ref data) => data.fmt(f),
            RecordData::Ns(ref data) => data.fmt(f),
            RecordData::Ptr(ref data) => data.fmt(f),
            RecordData::Soa(ref data) => data.fmt(f),
            RecordData::Srv(ref data) => data.fmt(f),
            RecordData::Txt(ref data) => data.fmt(f),
            RecordData::Unknown(ref data) => data.fmt(f),
        }
    }
}

//------------ UnknownRecordData ---------------------------------------------

/// A type for parsing any type of record data.
///
/// This type accepts any record type and stores the plain, unparsed record
/// data as an octets sequence.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct UnknownRecordData {
    /// The record type of this data.
    rtype: Rtype,

    /// The record data.
    data: Bytes,
}

impl UnknownRecordData {
    /// Creates generic record data from its components.
    pub fn from_octets(rtype: Rtype, data: Bytes) -> Self {
        UnknownRecordData { rtype, data }
    }

    /// Returns the record type this data is for.
    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    /// Returns a reference to the record data.
    pub fn data(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Parses any record type as unknown record data.
    pub fn parse(
        rtype: Rtype,
        parser: &mut Parser<'_, [u8]>,
        rdlen: usize,
    ) -> Result<Self, ParseError> {
        let data = parse_slice(parser, rdlen)?;
        Ok(Self::from_octets(rtype, Bytes::copy_from_slice(data)))
    }
}

impl Compose for UnknownRecordData {
    fn compose(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(self.data.as_ref())
    }
}

impl fmt::Display for UnknownRecordData {
    /// Formats the data in the generic format of RFC 3597.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "\\# {}", self.data.len())?;
        for ch in self.data.as_ref() {
            write!(f, " {:02x}", ch)?;
        }
        Ok(())
    }
}

//============ Testing =======================================================

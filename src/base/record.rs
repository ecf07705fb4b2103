//! Resource Records.
//!
//! This module defines the [`Record`] type for a DNS resource record as it
//! appears in a message. The TTL of such a record is relative, i.e., the
//! number of seconds the record may be cached. The record cache converts
//! it into an absolute expiry time when storing the record.

use super::iana::{Class, Rtype};
use super::name::{Dname, ParsedDname};
use super::wire::{compose_len_prefixed, Compose, ComposeError, Parse, ParseError};
use crate::rdata::RecordData;
use core::fmt;
use octseq::parse::Parser;

//------------ Record --------------------------------------------------------

/// A DNS resource record.
///
/// All information available through the DNS is stored in resource records.
/// They have a three part key of a domain name, resource record type, and
/// class. The domain name is called the *owner* of the record. The payload
/// of a resource record is its data whose format is determined by the
/// record type. Finally, the TTL or time to live says how long a record
/// remains valid before it should be refreshed from its original source.
///
/// Because a record’s owner is a domain name, the `Record` type is
/// generic over the domain name type. A record parsed from a message uses a
/// [`ParsedDname`] that still points into the message while a record that
/// needs to be kept uses [`Dname`].
#[derive(Clone, Debug)]
pub struct Record<N> {
    /// The owner of the record.
    owner: N,

    /// The class of the record.
    class: Class,

    /// The time-to-live value of the record in seconds.
    ttl: u32,

    /// The record data. The value also specifies the record’s type.
    data: RecordData,
}

/// A record parsed from a message.
pub type ParsedRecord<'a> = Record<ParsedDname<'a>>;

/// # Creation and Element Access
///
impl<N> Record<N> {
    /// Creates a new record from its parts.
    pub fn new(owner: N, class: Class, ttl: u32, data: RecordData) -> Self {
        Record {
            owner,
            class,
            ttl,
            data,
        }
    }

    /// Returns a reference to the owner domain name.
    pub fn owner(&self) -> &N {
        &self.owner
    }

    /// Returns the record type.
    pub fn rtype(&self) -> Rtype {
        self.data.rtype()
    }

    /// Returns the record class.
    pub fn class(&self) -> Class {
        self.class
    }

    /// Returns the record’s time-to-live in seconds.
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Return a reference to the record data.
    pub fn data(&self) -> &RecordData {
        &self.data
    }
}

impl<'a> Record<ParsedDname<'a>> {
    /// Parses a record at the current position of `parser`.
    ///
    /// A TTL with the most significant bit set is treated as zero as
    /// required by RFC 2181.
    pub fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        let owner = ParsedDname::parse(parser)?;
        let rtype = Rtype::parse(parser)?;
        let class = Class::parse(parser)?;
        let ttl = u32::parse(parser)?;
        let ttl = if ttl > i32::MAX as u32 { 0 } else { ttl };
        let rdlen = u16::parse(parser)?;
        let data = RecordData::parse(rtype, parser, rdlen.into())?;
        Ok(Record::new(owner, class, ttl, data))
    }

    /// Creates an owned copy of the record.
    pub fn to_record(&self) -> Record<Dname> {
        Record::new(
            self.owner.to_dname(),
            self.class,
            self.ttl,
            self.data.clone(),
        )
    }
}

impl Record<Dname> {
    /// Appends the wire format of the record with an uncompressed owner.
    pub fn compose(&self, target: &mut Vec<u8>) -> Result<(), ComposeError> {
        self.owner.compose(target);
        self.compose_tail(target)
    }

    /// Appends everything after the owner name.
    pub(crate) fn compose_tail(
        &self,
        target: &mut Vec<u8>,
    ) -> Result<(), ComposeError> {
        self.rtype().compose(target);
        self.class.compose(target);
        self.ttl.compose(target);
        compose_len_prefixed(target, |target| {
            self.data.compose(target);
            Ok(())
        })
    }
}

//--- Display

impl<N: fmt::Display> fmt::Display for Record<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}.\t{}\t{}\t{}\t{}",
            self.owner,
            self.ttl,
            self.class,
            self.rtype(),
            self.data
        )
    }
}

//============ Testing =======================================================

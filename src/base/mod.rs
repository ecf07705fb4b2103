//! Basics.
//!
//! This module provides types and traits for working with DNS data. The types
//! allow creating such data from scratch and processing it. Crucially, the
//! module provides means to extract the data from wire-format DNS messages
//! and assemble such messages.
//!
//!
//! ## Parsing and Composing Messages
//!
//! In order to easily distinguish the process of creating and disecting
//! wire-format messages from other forms of representation conversion, we
//! use the term *parsing* for extracting data from a wire-format
//! representation and *composing* for producing such a representation.
//!
//! Both parsing and composing happen on buffers holding a complete DNS
//! message. This seems to be a reasonable choice given the limited
//! size of DNS messages and the complexities introduced by compressing
//! domain names in message by referencing other parts of the message.
//!
//! The types [`Message`] and [`MessageBuilder`] are there to make
//! parsing and constructing DNS messages easy. A [`Message`] takes the
//! binary data of a DNS message and gives access to its four sections.
//! Similarly, a [`MessageBuilder`] collects questions and records and
//! assembles them into a message.
//!
//! All data received from the network is untrusted. Parsing never reads
//! beyond the end of the data and never follows compression pointers in
//! a loop. Any such problem is reported as a [`ParseError`].
//!
//!
//! # Types for DNS Data
//!
//! The module contains a number of types for DNS data, both fundamental
//! and composed. These are:
//!
//! * [header] for the header of DNS messages,
//! * [iana] for the integer types registered with IANA,
//! * [name] for domain names,
//! * [question] for questions,
//! * [record] for DNS resource records, and
//! * [stream] for reassembling messages received over TCP.
//!
//! The record data for the individual record types lives in the
//! [rdata](crate::rdata) module.

//--- Re-exports

pub use self::header::{Flags, Header, HeaderCounts, HeaderSection};
pub use self::iana::{Class, Opcode, Rcode, Rtype};
pub use self::message::Message;
pub use self::message_builder::{stream_frame, MessageBuilder};
pub use self::name::{Dname, DnameError, ParsedDname};
pub use self::question::Question;
pub use self::record::{ParsedRecord, Record};
pub use self::stream::StreamBuffer;
pub use self::wire::{ComposeError, FormError, ParseError};

//--- Modules

pub mod header;
pub mod iana;
pub mod message;
pub mod message_builder;
pub mod name;
pub mod question;
pub mod record;
pub mod stream;
pub mod wire;

//! Accessing exisiting DNS messages.
//!
//! This module defines the [`Message`] type that gives access to the header
//! and the four sections of a DNS message received from the wire.

use super::header::{Header, HeaderCounts, HeaderSection};
use super::iana::{Rcode, Rtype};
use super::name::{Dname, ParsedDname};
use super::question::Question;
use super::record::ParsedRecord;
use super::wire::{FormError, ParseError};
use octseq::parse::Parser;

//------------ Message -------------------------------------------------------

/// A DNS message.
///
/// The message is parsed completely when created. Names in questions and
/// record owners keep referencing the underlying octets, so the message
/// cannot outlive them. Record data is copied.
///
/// Messages arriving from the network are untrusted: creating a message
/// fails with a [`ParseError`] if the data is truncated, a section holds
/// fewer entries than announced in the header, or any name or record data
/// is malformed. Trailing data after the last section is ignored.
#[derive(Clone, Debug)]
pub struct Message<'a> {
    /// The octets of the message.
    octets: &'a [u8],

    /// The header section.
    header: HeaderSection,

    /// The question section.
    question: Vec<Question<ParsedDname<'a>>>,

    /// The answer section.
    answer: Vec<ParsedRecord<'a>>,

    /// The authority section.
    authority: Vec<ParsedRecord<'a>>,

    /// The additional section.
    additional: Vec<ParsedRecord<'a>>,
}

/// # Creation and Conversion
///
impl<'a> Message<'a> {
    /// Parses a message from a slice.
    pub fn from_slice(octets: &'a [u8]) -> Result<Self, ParseError> {
        let mut parser = Parser::from_ref(octets);
        let header = HeaderSection::parse(&mut parser)?;
        let counts = header.counts();
        let mut question = Vec::with_capacity(counts.qdcount().into());
        for _ in 0..counts.qdcount() {
            question.push(Question::parse(&mut parser)?);
        }
        let answer = Self::parse_section(&mut parser, counts.ancount())?;
        let authority = Self::parse_section(&mut parser, counts.nscount())?;
        let additional = Self::parse_section(&mut parser, counts.arcount())?;
        Ok(Message {
            octets,
            header,
            question,
            answer,
            authority,
            additional,
        })
    }

    fn parse_section(
        parser: &mut Parser<'a, [u8]>,
        count: u16,
    ) -> Result<Vec<ParsedRecord<'a>>, ParseError> {
        // Each record needs at least eleven octets. Checking this first
        // keeps a bogus count from causing a huge allocation.
        if usize::from(count) * 11 > parser.remaining() {
            return Err(FormError::new("section count exceeds message").into());
        }
        let mut res = Vec::with_capacity(count.into());
        for _ in 0..count {
            res.push(ParsedRecord::parse(parser)?);
        }
        Ok(res)
    }

    /// Returns a reference to the underlying octets.
    pub fn as_slice(&self) -> &'a [u8] {
        self.octets
    }
}

/// # Header Section
///
impl<'a> Message<'a> {
    /// Returns the message header.
    pub fn header(&self) -> Header {
        self.header.header()
    }

    /// Returns the header counts of the message.
    pub fn header_counts(&self) -> HeaderCounts {
        self.header.counts()
    }

    /// Returns whether the rcode is NOERROR.
    pub fn no_error(&self) -> bool {
        self.header().rcode() == Rcode::NOERROR
    }
}

/// # Access to Sections
///
impl<'a> Message<'a> {
    /// Returns the question section.
    pub fn question(&self) -> &[Question<ParsedDname<'a>>] {
        &self.question
    }

    /// Returns the first question, if there is one.
    pub fn first_question(&self) -> Option<&Question<ParsedDname<'a>>> {
        self.question.first()
    }

    /// Returns whether the message has exactly one question and it is for
    /// `qname` and `qtype` in class IN.
    pub fn is_answer_for(&self, qname: &Dname, qtype: Rtype) -> bool {
        self.question.len() == 1 && self.question[0].matches(qname, qtype)
    }

    /// Returns the answer section.
    pub fn answer(&self) -> &[ParsedRecord<'a>] {
        &self.answer
    }

    /// Returns the authority section.
    pub fn authority(&self) -> &[ParsedRecord<'a>] {
        &self.authority
    }

    /// Returns the additional section.
    pub fn additional(&self) -> &[ParsedRecord<'a>] {
        &self.additional
    }

    /// Returns whether the answer section is empty.
    pub fn is_answer_empty(&self) -> bool {
        self.answer.is_empty()
    }
}

//============ Testing =======================================================

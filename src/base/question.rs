//! A single question in a DNS message.
//!
//! This module defines the type `Question` which represents an entry in
//! the question section of a DNS message.

use super::iana::{Class, Rtype};
use super::name::{Dname, ParsedDname};
use super::wire::{Compose, ParseError};
use core::fmt;
use octseq::parse::Parser;

//------------ Question ------------------------------------------------------

/// A question in a DNS message.
///
/// In DNS, a question describes what is requested in a query. It consists
/// of three elements: a domain name, a record type, and a class. This type
/// represents such a question.
///
/// Questions are generic over the domain name type. When read from an
/// actual message, a [`ParsedDname`] is used because the name part may be
/// compressed. Questions that are sent use an owned [`Dname`].
#[derive(Clone, Copy, Debug)]
pub struct Question<N> {
    /// The domain name of the question.
    qname: N,

    /// The record type of the question.
    qtype: Rtype,

    /// The class of the quesiton.
    qclass: Class,
}

/// # Creation and Conversion
///
impl<N> Question<N> {
    /// Creates a new question from its three componets.
    pub fn new(qname: N, qtype: Rtype, qclass: Class) -> Self {
        Question {
            qname,
            qtype,
            qclass,
        }
    }

    /// Creates a new question from a name and record type, assuming class IN.
    pub fn new_in(qname: N, qtype: Rtype) -> Self {
        Question {
            qname,
            qtype,
            qclass: Class::IN,
        }
    }

    /// Converts the question into the qname.
    pub fn into_qname(self) -> N {
        self.qname
    }

    /// Returns a reference to the domain nmae in the question,
    pub fn qname(&self) -> &N {
        &self.qname
    }

    /// Returns the record type of the question.
    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    /// Returns the class of the question.
    pub fn qclass(&self) -> Class {
        self.qclass
    }
}

impl<'a> Question<ParsedDname<'a>> {
    /// Parses a question at the current position of `parser`.
    pub fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        Ok(Question::new(
            ParsedDname::parse(parser)?,
            Rtype::parse(parser)?,
            Class::parse(parser)?,
        ))
    }

    /// Returns whether the question asks for `qname`, `qtype`, and `IN`.
    ///
    /// The names are compared ignoring ASCII case.
    pub fn matches(&self, qname: &Dname, qtype: Rtype) -> bool {
        self.qtype == qtype
            && self.qclass == Class::IN
            && self.qname.name_eq(qname)
    }

    /// Creates an owned copy of the question.
    pub fn to_question(&self) -> Question<Dname> {
        Question::new(self.qname.to_dname(), self.qtype, self.qclass)
    }
}

//--- From

impl<N> From<(N, Rtype)> for Question<N> {
    fn from((name, rtype): (N, Rtype)) -> Self {
        Question::new(name, rtype, Class::IN)
    }
}

//--- PartialEq and Eq

impl PartialEq for Question<Dname> {
    fn eq(&self, other: &Self) -> bool {
        self.qname == other.qname
            && self.qtype == other.qtype
            && self.qclass == other.qclass
    }
}

impl Eq for Question<Dname> {}

//--- Compose

impl Compose for Question<Dname> {
    fn compose(&self, target: &mut Vec<u8>) {
        self.qname.compose(target);
        self.qtype.compose(target);
        self.qclass.compose(target);
    }
}

//--- Display

impl<N: fmt::Display> fmt::Display for Question<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.\t{}\t{}", self.qname, self.qtype, self.qclass)
    }
}

//============ Testing =======================================================

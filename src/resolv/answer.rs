//! The result of resolving a question.

use crate::base::iana::Rtype;
use crate::base::name::Dname;
use crate::cache::{QueryKey, ResourceRecord};
use core::fmt;
use core::ops::BitOr;
use std::net::IpAddr;

//------------ Status --------------------------------------------------------

/// The outcome of a query.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    /// The question was answered.
    Ok,

    /// The name in the question was malformed.
    ///
    /// Such questions are never sent.
    BadName,

    /// The name or the requested type at the name does not exist.
    NoDomain,

    /// Responses could not be parsed or did not match the question.
    BadResponse,

    /// No response arrived before all retries were used up.
    Timeout,

    /// The servers failed or the transport broke down.
    Error,

    /// Answering the question needed its own answer.
    Deadlock,

    /// The resolver was shut down.
    Shutdown,

    /// The answer was not cached and querying was not allowed.
    NotCached,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            Status::Ok => "OK",
            Status::BadName => "BADNAME",
            Status::NoDomain => "NODOMAIN",
            Status::BadResponse => "BADRESPONSE",
            Status::Timeout => "TIMEOUT",
            Status::Error => "ERROR",
            Status::Deadlock => "DEADLOCK",
            Status::Shutdown => "SHUTDOWN",
            Status::NotCached => "NOTCACHED",
        })
    }
}

//------------ Answer --------------------------------------------------------

/// The answer to a question.
///
/// An answer carries the status, the question it answers, and the records
/// found. Unless the status is [`Status::Ok`], there are no records.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Answer {
    status: Status,
    qtype: Rtype,

    /// The key of the question.
    ///
    /// This is missing if the question could not even be turned into a
    /// key, i.e., for [`Status::BadName`].
    key: Option<QueryKey>,

    /// The target of a question that could not be turned into a key.
    input: Option<String>,

    records: Vec<ResourceRecord>,
}

impl Answer {
    /// Creates a new answer.
    ///
    /// Records are dropped unless `status` is [`Status::Ok`].
    pub fn new(
        status: Status,
        qtype: Rtype,
        key: QueryKey,
        mut records: Vec<ResourceRecord>,
    ) -> Self {
        if status != Status::Ok {
            records.clear()
        }
        Answer {
            status,
            qtype,
            key: Some(key),
            input: None,
            records,
        }
    }

    /// Creates an answer without records.
    pub fn empty(status: Status, qtype: Rtype, key: QueryKey) -> Self {
        Self::new(status, qtype, key, Vec::new())
    }

    /// Creates the answer for a malformed question.
    ///
    /// The target is kept as given so it can be reported.
    pub fn bad_name(qtype: Rtype, input: impl Into<String>) -> Self {
        Answer {
            status: Status::BadName,
            qtype,
            key: None,
            input: Some(input.into()),
            records: Vec::new(),
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn qtype(&self) -> Rtype {
        self.qtype
    }

    pub fn key(&self) -> Option<&QueryKey> {
        self.key.as_ref()
    }

    /// Returns the domain name of the question, if it was for one.
    pub fn name(&self) -> Option<&Dname> {
        self.key.as_ref().and_then(QueryKey::name)
    }

    /// Returns the target of a malformed question.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Returns the address of a reverse lookup.
    pub fn addr(&self) -> Option<IpAddr> {
        self.key.as_ref().and_then(QueryKey::addr)
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<ResourceRecord> {
        self.records
    }

    /// Returns the records of the requested type.
    ///
    /// This skips any CNAME records the answer may contain.
    pub fn iter_answers(&self) -> impl Iterator<Item = &ResourceRecord> {
        let qtype = self.qtype;
        self.records
            .iter()
            .filter(move |record| record.rtype() == qtype)
    }

    /// Returns the addresses contained in the answer.
    pub fn addrs(&self) -> impl Iterator<Item = IpAddr> + '_ {
        self.records
            .iter()
            .filter_map(|record| record.data()?.addr())
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.key {
            Some(ref key) => {
                write!(f, "{} {} {}", key, self.qtype, self.status)?
            }
            None => write!(
                f,
                "{} {} {}",
                self.input.as_deref().unwrap_or("-"),
                self.qtype,
                self.status
            )?,
        }
        for record in &self.records {
            write!(f, "\n{}", record)?;
        }
        Ok(())
    }
}

//------------ QueryFlags ----------------------------------------------------

/// Flags modifying how a question is resolved.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct QueryFlags(u8);

impl QueryFlags {
    /// Only answer from the cache, never send a query.
    pub const NO_QUERY: QueryFlags = QueryFlags(0x01);

    pub const fn empty() -> Self {
        QueryFlags(0)
    }

    pub fn contains(self, other: QueryFlags) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for QueryFlags {
    type Output = Self;

    fn bitor(self, other: Self) -> Self {
        QueryFlags(self.0 | other.0)
    }
}

//------------ Target --------------------------------------------------------

/// What a question asks about.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    /// A domain name in presentation format.
    Name(&'a str),

    /// An already parsed domain name.
    Dname(&'a Dname),

    /// An address for a reverse lookup.
    Addr(IpAddr),
}

impl<'a> From<&'a str> for Target<'a> {
    fn from(name: &'a str) -> Self {
        Target::Name(name)
    }
}

impl<'a> From<&'a Dname> for Target<'a> {
    fn from(name: &'a Dname) -> Self {
        Target::Dname(name)
    }
}

impl From<IpAddr> for Target<'_> {
    fn from(addr: IpAddr) -> Self {
        Target::Addr(addr)
    }
}

impl fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Target::Name(name) => f.write_str(name),
            Target::Dname(name) => fmt::Display::fmt(name, f),
            Target::Addr(addr) => fmt::Display::fmt(&addr, f),
        }
    }
}

//============ Testing =======================================================

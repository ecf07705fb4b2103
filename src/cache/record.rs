//! Records held by the cache.

use crate::base::iana::{Class, Rtype};
use crate::base::name::Dname;
use crate::base::record::Record;
use crate::rdata::RecordData;
use core::fmt;
use std::net::IpAddr;
use std::time::{Duration, Instant};

//------------ QueryKey ------------------------------------------------------

/// The key a question is cached and de-duplicated under.
///
/// Reverse lookups are keyed by the address being looked up. Everything
/// else is keyed by the domain name.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum QueryKey {
    /// A domain name.
    Name(Dname),

    /// An address for a reverse lookup.
    Addr(IpAddr),
}

impl QueryKey {
    /// Returns the name to put into the question for this key.
    ///
    /// For an address this is the name in the reverse tree.
    pub fn qname(&self) -> Dname {
        match self {
            QueryKey::Name(name) => name.clone(),
            QueryKey::Addr(addr) => Dname::from_addr(*addr),
        }
    }

    /// Returns the domain name if the key is a name.
    pub fn name(&self) -> Option<&Dname> {
        match self {
            QueryKey::Name(name) => Some(name),
            QueryKey::Addr(_) => None,
        }
    }

    /// Returns the address if the key is an address.
    pub fn addr(&self) -> Option<IpAddr> {
        match self {
            QueryKey::Name(_) => None,
            QueryKey::Addr(addr) => Some(*addr),
        }
    }
}

impl From<Dname> for QueryKey {
    fn from(name: Dname) -> Self {
        QueryKey::Name(name)
    }
}

impl From<IpAddr> for QueryKey {
    fn from(addr: IpAddr) -> Self {
        QueryKey::Addr(addr)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QueryKey::Name(name) => name.fmt(f),
            QueryKey::Addr(addr) => addr.fmt(f),
        }
    }
}

//------------ ResourceRecord ------------------------------------------------

/// A resource record with an absolute expiry time.
///
/// Records taken from a message have their relative TTL turned into the
/// point in time when they expire. A negative record has no data. It
/// marks a name or a type at a name as non-existing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceRecord {
    owner: Dname,
    rtype: Rtype,
    class: Class,
    expires: Instant,
    data: Option<RecordData>,
}

impl ResourceRecord {
    /// Creates a record from a wire record received at `now`.
    ///
    /// The record expires after its TTL but never earlier than `min_ttl`
    /// from now.
    pub fn from_record(
        record: &Record<Dname>,
        now: Instant,
        min_ttl: Duration,
    ) -> Self {
        let ttl = Duration::from_secs(record.ttl().into()).max(min_ttl);
        ResourceRecord {
            owner: record.owner().clone(),
            rtype: record.rtype(),
            class: record.class(),
            expires: now + ttl,
            data: Some(record.data().clone()),
        }
    }

    /// Creates a positive record with the given expiry.
    pub fn new(owner: Dname, expires: Instant, data: RecordData) -> Self {
        ResourceRecord {
            owner,
            rtype: data.rtype(),
            class: Class::IN,
            expires,
            data: Some(data),
        }
    }

    /// Creates a negative record.
    pub fn negative(owner: Dname, rtype: Rtype, expires: Instant) -> Self {
        ResourceRecord {
            owner,
            rtype,
            class: Class::IN,
            expires,
            data: None,
        }
    }

    pub fn owner(&self) -> &Dname {
        &self.owner
    }

    pub fn rtype(&self) -> Rtype {
        self.rtype
    }

    pub fn class(&self) -> Class {
        self.class
    }

    pub fn expires(&self) -> Instant {
        self.expires
    }

    /// Returns the record data or `None` for a negative record.
    pub fn data(&self) -> Option<&RecordData> {
        self.data.as_ref()
    }

    pub fn is_negative(&self) -> bool {
        self.data.is_none()
    }

    /// Returns whether the record has expired at `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires
    }

    /// Returns the time left until the record expires.
    pub fn remaining_ttl(&self, now: Instant) -> Duration {
        self.expires.saturating_duration_since(now)
    }

    /// Converts the record back into a wire record.
    ///
    /// Returns `None` for a negative record.
    pub fn to_record(&self, now: Instant) -> Option<Record<Dname>> {
        let ttl = u32::try_from(self.remaining_ttl(now).as_secs())
            .unwrap_or(u32::MAX);
        self.data.as_ref().map(|data| {
            Record::new(self.owner.clone(), self.class, ttl, data.clone())
        })
    }
}

impl fmt::Display for ResourceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.data {
            Some(ref data) => write!(
                f,
                "{}.\t{}\t{}\t{}",
                self.owner, self.class, self.rtype, data
            ),
            None => write!(
                f,
                "{}.\t{}\t{}\t; negative",
                self.owner, self.class, self.rtype
            ),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::A;
    use std::str::FromStr;

    fn name(s: &str) -> Dname {
        Dname::from_str(s).unwrap()
    }

    #[test]
    fn expiry() {
        let now = Instant::now();
        let record = Record::new(
            name("example.com"),
            Class::IN,
            300,
            A::from_octets(93, 184, 216, 34).into(),
        );
        let rr = ResourceRecord::from_record(&record, now, Duration::ZERO);
        assert!(!rr.is_negative());
        assert_eq!(rr.rtype(), Rtype::A);
        assert!(!rr.is_expired(now + Duration::from_secs(299)));
        assert!(rr.is_expired(now + Duration::from_secs(300)));
        assert_eq!(
            rr.to_record(now + Duration::from_secs(100)).unwrap().ttl(),
            200
        );

        let rr = ResourceRecord::from_record(
            &record,
            now,
            Duration::from_secs(600),
        );
        assert_eq!(rr.expires(), now + Duration::from_secs(600));
    }

    #[test]
    fn negative() {
        let now = Instant::now();
        let rr = ResourceRecord::negative(name("nosuch.example"), Rtype::A, now);
        assert!(rr.is_negative());
        assert!(rr.data().is_none());
        assert!(rr.to_record(now).is_none());
        assert_eq!(rr.to_string(), "nosuch.example.\tIN\tA\t; negative");
    }

    #[test]
    fn reverse_key() {
        let key = QueryKey::from(IpAddr::from([192, 0, 2, 1]));
        assert_eq!(key.qname(), name("1.2.0.192.in-addr.arpa"));
        assert_eq!(key.addr(), Some(IpAddr::from([192, 0, 2, 1])));
        assert!(key.name().is_none());
    }
}

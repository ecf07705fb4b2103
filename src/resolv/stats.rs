//! Resolver statistics.

use crate::base::iana::Rtype;
use core::fmt;
use std::collections::BTreeMap;

//------------ Stats ---------------------------------------------------------

/// Counters describing what a resolver has been doing.
///
/// The counters are for information only. They have no influence on how
/// questions are resolved.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Questions asked per record type.
    pub requests: BTreeMap<Rtype, u64>,

    /// Questions not answered from the cache per record type.
    pub misses: BTreeMap<Rtype, u64>,

    pub udp_sent: u64,
    pub udp_received: u64,
    pub tcp_sent: u64,
    pub tcp_received: u64,

    /// Queries sent again after a timeout or a failed response.
    pub retries: u64,

    /// UDP responses with the TC bit set.
    pub truncated: u64,

    /// Responses that could not be parsed or did not match the query.
    pub bad_responses: u64,

    /// Responses that did not belong to any query.
    pub unexpected: u64,

    /// Queries that had to wait for their transaction ID.
    pub id_collisions: u64,

    /// Questions that failed because they depended on themselves.
    pub deadlocks: u64,
}

impl Stats {
    pub(super) fn request(&mut self, rtype: Rtype) {
        *self.requests.entry(rtype).or_default() += 1;
    }

    pub(super) fn miss(&mut self, rtype: Rtype) {
        *self.misses.entry(rtype).or_default() += 1;
    }

    /// Returns the number of questions for a record type.
    pub fn requests_for(&self, rtype: Rtype) -> u64 {
        self.requests.get(&rtype).copied().unwrap_or(0)
    }

    /// Returns the number of cache misses for a record type.
    pub fn misses_for(&self, rtype: Rtype) -> u64 {
        self.misses.get(&rtype).copied().unwrap_or(0)
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (rtype, count) in &self.requests {
            writeln!(
                f,
                "{:<6} requests {:>8} misses {:>8}",
                rtype.to_string(),
                count,
                self.misses_for(*rtype)
            )?;
        }
        writeln!(
            f,
            "udp sent {} received {}, tcp sent {} received {}",
            self.udp_sent, self.udp_received, self.tcp_sent, self.tcp_received
        )?;
        write!(
            f,
            "retries {} truncated {} bad {} unexpected {} \
             id collisions {} deadlocks {}",
            self.retries,
            self.truncated,
            self.bad_responses,
            self.unexpected,
            self.id_collisions,
            self.deadlocks
        )
    }
}

//============ Testing =======================================================

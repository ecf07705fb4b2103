//! The record cache.
//!
//! The [`RecordCache`] keeps the records learned from answers until they
//! expire. There is a separate store for each supported record type. Each
//! store maps a [`QueryKey`] to either a single record or, for NS, MX, and
//! SRV, to the list of records at that key. PTR records are keyed by the
//! address that was looked up.
//!
//! Expired records are never returned. A lookup that finds an expired
//! entry removes it. Each store is bounded by a pair of watermarks: when
//! a new key is about to be added to a store that has reached its high
//! watermark, the store is pruned. Pruning first drops everything that
//! has expired and then, if the store is still too large, drops entries
//! until it is down to its low watermark.
//!
//! The name servers of the root and of other configured delegation roots
//! as well as the addresses of those servers are protected and never
//! evicted by pruning. Without them, resolution could not start.
//!
//! An answer that did not produce any records is stored as a negative
//! record. It makes later lookups fail quickly until it expires.

pub use self::hints::{HintEntry, HintMode, HintsError, RootHints};
pub use self::record::{QueryKey, ResourceRecord};

use crate::base::iana::Rtype;
use crate::base::name::Dname;
use crate::resolv::answer::{Answer, Status};
use crate::utils::config::DefMinMax;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

pub mod hints;
pub mod record;

//------------ Configuration Constants ---------------------------------------

/// Limits for the high watermark of a store.
const HIGH_WATERMARK: DefMinMax<usize> = DefMinMax::new(10_000, 1, 10_000_000);

/// Limits for the low watermark of a store.
const LOW_WATERMARK: DefMinMax<usize> = DefMinMax::new(8_000, 0, 10_000_000);

/// Limits for how long a non-existing name is remembered.
///
/// RFC 2308 suggests one to three hours as a maximum.
const NEGATIVE_TTL: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(300),
    Duration::ZERO,
    Duration::from_secs(3 * 3600),
);

/// Limits for the minimum time a record is kept.
const MIN_TTL: DefMinMax<Duration> = DefMinMax::new(
    Duration::ZERO,
    Duration::ZERO,
    Duration::from_secs(86400),
);

/// How long records taken from the root hints live.
const HINTS_TTL: Duration = Duration::from_secs(365 * 86400);

//------------ Watermark -----------------------------------------------------

/// The thresholds for pruning a store.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Watermark {
    /// The number of entries pruning reduces a store to.
    pub low: usize,

    /// The number of entries that triggers pruning.
    pub high: usize,
}

impl Watermark {
    pub fn new(low: usize, high: usize) -> Self {
        Watermark { low, high }
    }

    fn finalize(self) -> Self {
        let high = HIGH_WATERMARK.limit("high watermark", self.high);
        let low = LOW_WATERMARK.limit("low watermark", self.low).min(high);
        Watermark { low, high }
    }
}

impl Default for Watermark {
    fn default() -> Self {
        Watermark::new(LOW_WATERMARK.default(), HIGH_WATERMARK.default())
    }
}

//------------ Watermarks ----------------------------------------------------

/// The watermarks for all record types.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Watermarks {
    /// The watermark for types without a specific one.
    pub default: Watermark,

    /// Watermarks for specific record types.
    pub per_type: BTreeMap<Rtype, Watermark>,
}

impl Watermarks {
    /// Creates watermarks using the same values for all types.
    pub fn uniform(low: usize, high: usize) -> Self {
        Watermarks {
            default: Watermark::new(low, high),
            per_type: BTreeMap::new(),
        }
    }

    /// Sets the watermark for a record type.
    pub fn set(&mut self, rtype: Rtype, watermark: Watermark) {
        self.per_type.insert(rtype, watermark);
    }

    /// Returns the watermark for a record type.
    pub fn get(&self, rtype: Rtype) -> Watermark {
        self.per_type.get(&rtype).copied().unwrap_or(self.default)
    }

    /// Forces all values into their permitted range.
    pub fn finalize(&mut self) {
        self.default = self.default.finalize();
        for value in self.per_type.values_mut() {
            *value = value.finalize();
        }
    }
}

//------------ ListExpiry ----------------------------------------------------

/// What happens to a list of records when some of them expire.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ListExpiry {
    /// Only the expired records are removed.
    #[default]
    StripExpired,

    /// The whole list is removed as soon as one record expires.
    DiscardWhole,
}

impl ListExpiry {
    /// Applies the policy to `list`.
    fn apply(self, list: &mut Vec<ResourceRecord>, now: Instant) {
        match self {
            ListExpiry::StripExpired => {
                list.retain(|record| !record.is_expired(now))
            }
            ListExpiry::DiscardWhole => {
                if list.iter().any(|record| record.is_expired(now)) {
                    list.clear()
                }
            }
        }
    }
}

//------------ CacheConf -----------------------------------------------------

/// The configuration of the record cache.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CacheConf {
    pub watermarks: Watermarks,
    pub list_expiry: ListExpiry,

    /// How long a negative answer is kept.
    pub negative_ttl: Duration,

    /// The minimum time any record is kept.
    pub min_ttl: Duration,
}

impl CacheConf {
    /// Forces all values into their permitted range.
    pub fn finalize(&mut self) {
        self.watermarks.finalize();
        self.negative_ttl =
            NEGATIVE_TTL.limit("negative_ttl", self.negative_ttl);
        self.min_ttl = MIN_TTL.limit("min_ttl", self.min_ttl);
    }
}

impl Default for CacheConf {
    fn default() -> Self {
        CacheConf {
            watermarks: Watermarks::default(),
            list_expiry: ListExpiry::default(),
            negative_ttl: NEGATIVE_TTL.default(),
            min_ttl: MIN_TTL.default(),
        }
    }
}

//------------ RecordCache ---------------------------------------------------

/// A cache of resource records.
#[derive(Clone, Debug)]
pub struct RecordCache {
    conf: CacheConf,

    /// The stores for each record type.
    ///
    /// For the types that are not lists, every vec holds exactly one
    /// record.
    stores: HashMap<Rtype, HashMap<QueryKey, Vec<ResourceRecord>>>,

    /// Domains whose NS records are protected.
    delegation_roots: HashSet<Dname>,

    /// Names whose A and AAAA records are protected.
    root_glue: HashSet<Dname>,
}

impl RecordCache {
    /// Creates a new, empty cache.
    pub fn new(mut conf: CacheConf) -> Self {
        conf.finalize();
        let mut delegation_roots = HashSet::new();
        delegation_roots.insert(Dname::root());
        RecordCache {
            conf,
            stores: Rtype::SUPPORTED
                .iter()
                .map(|rtype| (*rtype, HashMap::new()))
                .collect(),
            delegation_roots,
            root_glue: HashSet::new(),
        }
    }

    pub fn conf(&self) -> &CacheConf {
        &self.conf
    }

    /// Returns the number of keys in the store for `rtype`.
    pub fn len(&self, rtype: Rtype) -> usize {
        self.stores.get(&rtype).map(HashMap::len).unwrap_or(0)
    }

    /// Returns whether the cache holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.stores.values().all(HashMap::is_empty)
    }
}

/// # Lookup
///
impl RecordCache {
    /// Looks up the record of the given type for a key.
    ///
    /// For list types, the first record of the list is returned. The
    /// record may be negative.
    pub fn lookup(
        &mut self,
        rtype: Rtype,
        key: &QueryKey,
        now: Instant,
    ) -> Option<ResourceRecord> {
        self.fresh(rtype, key, now)?.first().cloned()
    }

    /// Looks up all records of the given type for a key.
    ///
    /// The result is either a non-empty list of positive records or a
    /// list with a single negative record.
    pub fn lookup_list(
        &mut self,
        rtype: Rtype,
        key: &QueryKey,
        now: Instant,
    ) -> Option<Vec<ResourceRecord>> {
        self.fresh(rtype, key, now).map(<[_]>::to_vec)
    }

    /// Returns the addresses cached for a host name.
    ///
    /// IPv4 addresses come first.
    pub fn lookup_addrs(&mut self, name: &Dname, now: Instant) -> Vec<IpAddr> {
        let key = QueryKey::Name(name.clone());
        let mut res = Vec::new();
        for rtype in [Rtype::A, Rtype::AAAA] {
            if let Some(list) = self.fresh(rtype, &key, now) {
                res.extend(
                    list.iter().filter_map(|rr| rr.data()?.addr()),
                );
            }
        }
        res
    }

    /// Returns the unexpired entry for a key, removing it if expired.
    fn fresh(
        &mut self,
        rtype: Rtype,
        key: &QueryKey,
        now: Instant,
    ) -> Option<&[ResourceRecord]> {
        let policy = self.conf.list_expiry;
        let store = self.stores.get_mut(&rtype)?;
        let empty = {
            let list = store.get_mut(key)?;
            policy.apply(list, now);
            list.is_empty()
        };
        if empty {
            trace!("evicting expired {} records for {}", rtype, key);
            store.remove(key);
            return None;
        }
        store.get(key).map(Vec::as_slice)
    }
}

/// # Storing
///
impl RecordCache {
    /// Stores the result of a query.
    ///
    /// Only successful answers and answers for non-existing names are
    /// stored. A successful answer without any records is stored as a
    /// negative record for the question.
    pub fn store(&mut self, answer: &Answer, now: Instant) {
        let key = match answer.key() {
            Some(key) => key,
            None => return,
        };
        match answer.status() {
            Status::Ok if !answer.records().is_empty() => {
                self.store_records_for(answer.records(), Some(key), now)
            }
            Status::Ok | Status::NoDomain => {
                self.store_negative(answer.qtype(), key.clone(), now)
            }
            _ => {}
        }
    }

    /// Stores a negative record for a key.
    pub fn store_negative(&mut self, rtype: Rtype, key: QueryKey, now: Instant) {
        let expires = now + self.conf.negative_ttl;
        let record = ResourceRecord::negative(key.qname(), rtype, expires);
        self.insert(rtype, key, vec![record], now);
    }

    /// Stores records, for instance glue from the additional section.
    ///
    /// The records are grouped by type and owner. Each group replaces what
    /// was cached for its owner before.
    pub fn store_records(&mut self, records: &[ResourceRecord], now: Instant) {
        self.store_records_for(records, None, now)
    }

    fn store_records_for(
        &mut self,
        records: &[ResourceRecord],
        question: Option<&QueryKey>,
        now: Instant,
    ) {
        // PTR records answering a reverse lookup are keyed by address.
        let reverse = match question {
            Some(QueryKey::Addr(addr)) => Some((*addr, Dname::from_addr(*addr))),
            _ => None,
        };
        let mut groups: Vec<(Rtype, QueryKey, Vec<ResourceRecord>)> =
            Vec::new();
        for record in records {
            if record.is_negative() || !record.rtype().is_supported() {
                continue;
            }
            let key = match reverse {
                Some((addr, ref qname)) if record.owner() == qname => {
                    QueryKey::Addr(addr)
                }
                _ => QueryKey::Name(record.owner().clone()),
            };
            match groups
                .iter_mut()
                .find(|(rtype, group_key, _)| {
                    *rtype == record.rtype() && *group_key == key
                }) {
                Some((_, _, list)) => list.push(record.clone()),
                None => {
                    groups.push((record.rtype(), key, vec![record.clone()]))
                }
            }
        }
        for (rtype, key, list) in groups {
            self.insert(rtype, key, list, now)
        }
    }

    /// Inserts an entry, pruning the store first if it is full.
    fn insert(
        &mut self,
        rtype: Rtype,
        key: QueryKey,
        mut records: Vec<ResourceRecord>,
        now: Instant,
    ) {
        let high = self.conf.watermarks.get(rtype).high;
        let full = match self.stores.get(&rtype) {
            Some(store) => !store.contains_key(&key) && store.len() >= high,
            None => return,
        };
        if full {
            self.prune(rtype, now);
        }
        if !rtype.is_multi() {
            records.truncate(1);
        }
        if rtype == Rtype::NS {
            if let QueryKey::Name(ref name) = key {
                if self.delegation_roots.contains(name) {
                    self.root_glue.extend(
                        records
                            .iter()
                            .filter_map(|rr| rr.data()?.target_name().cloned()),
                    );
                }
            }
        }
        trace!("caching {} {} records for {}", records.len(), rtype, key);
        if let Some(store) = self.stores.get_mut(&rtype) {
            store.insert(key, records);
        }
    }
}

/// # Pruning
///
impl RecordCache {
    /// Prunes the store for a record type.
    ///
    /// All expired entries are removed. If the store is still at or above
    /// its high watermark, unprotected entries are removed until the store
    /// is down to its low watermark.
    pub fn prune(&mut self, rtype: Rtype, now: Instant) {
        let policy = self.conf.list_expiry;
        let watermark = self.conf.watermarks.get(rtype);
        let delegation_roots = &self.delegation_roots;
        let root_glue = &self.root_glue;
        let store = match self.stores.get_mut(&rtype) {
            Some(store) => store,
            None => return,
        };
        let before = store.len();

        store.retain(|key, list| {
            if is_protected(rtype, key, delegation_roots, root_glue) {
                return true;
            }
            policy.apply(list, now);
            !list.is_empty()
        });
        let expired = before - store.len();

        if store.len() >= watermark.high {
            let excess = store.len().saturating_sub(watermark.low);
            let victims: Vec<_> = store
                .keys()
                .filter(|key| {
                    !is_protected(rtype, key, delegation_roots, root_glue)
                })
                .take(excess)
                .cloned()
                .collect();
            for key in victims {
                store.remove(&key);
            }
        }
        debug!(
            "pruned {} cache: {} expired, {} evicted, {} left",
            rtype,
            expired,
            before - expired - store.len(),
            store.len()
        );
    }

    /// Prunes the stores of all record types.
    pub fn prune_all(&mut self, now: Instant) {
        for rtype in Rtype::SUPPORTED {
            self.prune(rtype, now)
        }
    }

    /// Removes everything but the protected entries.
    pub fn clear(&mut self) {
        let delegation_roots = &self.delegation_roots;
        let root_glue = &self.root_glue;
        for (rtype, store) in self.stores.iter_mut() {
            store.retain(|key, _| {
                is_protected(*rtype, key, delegation_roots, root_glue)
            });
        }
    }
}

/// # Delegation Roots
///
impl RecordCache {
    /// Marks a domain as a delegation root.
    ///
    /// The NS records of the domain and the addresses of its name servers
    /// are protected from pruning from now on.
    pub fn add_delegation_root(&mut self, domain: Dname) {
        self.delegation_roots.insert(domain);
    }

    pub fn is_delegation_root(&self, domain: &Dname) -> bool {
        self.delegation_roots.contains(domain)
    }

    /// Returns whether the addresses of a host are protected.
    pub fn is_root_glue(&self, host: &Dname) -> bool {
        self.root_glue.contains(host)
    }

    /// Returns whether name servers for the root are cached.
    pub fn has_root_servers(&mut self, now: Instant) -> bool {
        let key = QueryKey::Name(Dname::root());
        matches!(
            self.fresh(Rtype::NS, &key, now),
            Some(list) if !list[0].is_negative()
        )
    }

    /// Loads the manual entries of root hints.
    ///
    /// Every domain mentioned in the hints becomes a delegation root. For
    /// each manual entry, a name server is added to the domain. Since the
    /// hints only provide an address, the reverse lookup name of the
    /// address serves as the name of the server.
    ///
    /// Returns the automatic entries which need to be resolved by asking
    /// the server given in the entry.
    pub fn load_root_servers<'a>(
        &mut self,
        hints: &'a RootHints,
        now: Instant,
    ) -> Vec<&'a HintEntry> {
        let expires = now + HINTS_TTL;
        let mut auto = Vec::new();
        let mut servers: Vec<(Dname, Vec<ResourceRecord>)> = Vec::new();
        for entry in hints.entries() {
            self.add_delegation_root(entry.domain.clone());
            if entry.mode == HintMode::Auto {
                auto.push(entry);
                continue;
            }
            let host = Dname::from_addr(entry.server);
            self.root_glue.insert(host.clone());
            self.insert(
                match entry.server {
                    IpAddr::V4(_) => Rtype::A,
                    IpAddr::V6(_) => Rtype::AAAA,
                },
                QueryKey::Name(host.clone()),
                vec![ResourceRecord::new(
                    host.clone(),
                    expires,
                    entry.server.into(),
                )],
                now,
            );
            let ns = ResourceRecord::new(
                entry.domain.clone(),
                expires,
                crate::rdata::Ns::new(host).into(),
            );
            match servers.iter_mut().find(|(domain, _)| *domain == entry.domain)
            {
                Some((_, list)) => list.push(ns),
                None => servers.push((entry.domain.clone(), vec![ns])),
            }
        }
        for (domain, list) in servers {
            debug!("loaded {} name servers for {} from hints", list.len(), domain);
            self.insert(Rtype::NS, QueryKey::Name(domain), list, now);
        }
        auto
    }
}

fn is_protected(
    rtype: Rtype,
    key: &QueryKey,
    delegation_roots: &HashSet<Dname>,
    root_glue: &HashSet<Dname>,
) -> bool {
    match (rtype, key) {
        (Rtype::NS, QueryKey::Name(name)) => delegation_roots.contains(name),
        (Rtype::A | Rtype::AAAA, QueryKey::Name(name)) => {
            root_glue.contains(name)
        }
        _ => false,
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::rdata::{Cname, Mx, Ns, Ptr, A};
    use std::str::FromStr;

    fn name(s: &str) -> Dname {
        Dname::from_str(s).unwrap()
    }

    fn key(s: &str) -> QueryKey {
        QueryKey::Name(name(s))
    }

    fn a(owner: &str, expires: Instant, last: u8) -> ResourceRecord {
        ResourceRecord::new(
            name(owner),
            expires,
            A::from_octets(192, 0, 2, last).into(),
        )
    }

    fn cache(low: usize, high: usize) -> RecordCache {
        RecordCache::new(CacheConf {
            watermarks: Watermarks::uniform(low, high),
            ..Default::default()
        })
    }

    #[test]
    fn lookup_evicts_expired() {
        let now = Instant::now();
        let mut cache = cache(50, 100);
        let expires = now + Duration::from_secs(300);
        cache.store_records(&[a("example.com", expires, 1)], now);
        assert_eq!(cache.len(Rtype::A), 1);

        let hit = cache
            .lookup(Rtype::A, &key("example.com"), now + Duration::from_secs(299))
            .unwrap();
        assert_eq!(hit.data().unwrap().addr(), Some([192, 0, 2, 1].into()));
        assert!(cache
            .lookup(Rtype::A, &key("example.com"), now + Duration::from_secs(301))
            .is_none());
        assert_eq!(cache.len(Rtype::A), 0);
    }

    #[test]
    fn prune_to_low_watermark() {
        let now = Instant::now();
        let mut cache = cache(50, 100);
        let expires = now + Duration::from_secs(3600);
        for i in 0..150 {
            let owner = format!("host{}.example", i);
            cache.store_records(&[a(&owner, expires, 1)], now);
        }
        // Inserts prune once the high watermark is reached.
        assert!(cache.len(Rtype::A) <= 100);
        cache.prune(Rtype::A, now);
        assert!(cache.len(Rtype::A) <= 100);

        // Pruning an overfull store gets it down to the low watermark.
        let mut cache = cache_with(150, now, expires, None);
        assert_eq!(cache.len(Rtype::A), 150);
        cache.prune(Rtype::A, now);
        assert!(cache.len(Rtype::A) <= 50);
    }

    fn cache_with(
        count: usize,
        now: Instant,
        expires: Instant,
        hints: Option<&RootHints>,
    ) -> RecordCache {
        let mut cache = cache(1_000, 1_000);
        if let Some(hints) = hints {
            assert!(cache.load_root_servers(hints, now).is_empty());
        }
        for i in 0..count {
            let owner = format!("host{}.example", i);
            cache.store_records(&[a(&owner, expires, 1)], now);
        }
        cache.conf.watermarks = Watermarks::uniform(50, 100);
        cache
    }

    #[test]
    fn prune_keeps_root_glue() {
        let now = Instant::now();
        let expires = now + Duration::from_secs(3600);
        let hints = RootHints::parse(".:198.41.0.4\n.:199.9.14.201").unwrap();
        let mut cache = cache_with(150, now, expires, Some(&hints));
        assert_eq!(cache.len(Rtype::A), 152);
        cache.prune(Rtype::A, now);
        assert!(cache.len(Rtype::A) <= 52);
        assert_eq!(
            cache.lookup_addrs(&name("4.0.41.198.in-addr.arpa"), now),
            vec![IpAddr::from([198, 41, 0, 4])]
        );
        assert!(cache.has_root_servers(now));
        assert_eq!(
            cache
                .lookup_list(Rtype::NS, &QueryKey::Name(Dname::root()), now)
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn prune_removes_expired_first() {
        let now = Instant::now();
        let mut cache = cache(5, 10);
        for i in 0..8 {
            let owner = format!("old{}.example", i);
            cache.store_records(&[a(&owner, now + Duration::from_secs(1), 1)], now);
        }
        cache.store_records(
            &[a("fresh.example", now + Duration::from_secs(100), 1)],
            now,
        );
        cache.prune(Rtype::A, now + Duration::from_secs(10));
        assert_eq!(cache.len(Rtype::A), 1);
        assert!(cache
            .lookup(Rtype::A, &key("fresh.example"), now + Duration::from_secs(10))
            .is_some());
    }

    fn ns_list(now: Instant) -> Vec<ResourceRecord> {
        vec![
            ResourceRecord::new(
                name("example.com"),
                now + Duration::from_secs(10),
                Ns::new(name("a.ns.example")).into(),
            ),
            ResourceRecord::new(
                name("example.com"),
                now + Duration::from_secs(100),
                Ns::new(name("b.ns.example")).into(),
            ),
        ]
    }

    #[test]
    fn list_strip_expired() {
        let now = Instant::now();
        let mut cache = cache(50, 100);
        cache.store_records(&ns_list(now), now);
        let later = now + Duration::from_secs(20);
        let list = cache.lookup_list(Rtype::NS, &key("example.com"), later).unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(
            list[0].data().unwrap().target_name(),
            Some(&name("b.ns.example"))
        );
        let gone = now + Duration::from_secs(200);
        assert!(cache.lookup_list(Rtype::NS, &key("example.com"), gone).is_none());
        assert_eq!(cache.len(Rtype::NS), 0);
    }

    #[test]
    fn list_discard_whole() {
        let now = Instant::now();
        let mut cache = RecordCache::new(CacheConf {
            list_expiry: ListExpiry::DiscardWhole,
            ..Default::default()
        });
        cache.store_records(&ns_list(now), now);
        assert_eq!(
            cache.lookup_list(Rtype::NS, &key("example.com"), now).unwrap().len(),
            2
        );
        let later = now + Duration::from_secs(20);
        assert!(cache.lookup_list(Rtype::NS, &key("example.com"), later).is_none());
    }

    #[test]
    fn store_answers() {
        let now = Instant::now();
        let mut cache = cache(50, 100);
        let expires = now + Duration::from_secs(60);

        // An empty successful answer becomes a negative record.
        let answer = Answer::new(Status::Ok, Rtype::MX, key("example.org"), vec![]);
        cache.store(&answer, now);
        let rr = cache.lookup(Rtype::MX, &key("example.org"), now).unwrap();
        assert!(rr.is_negative());

        let answer = Answer::new(
            Status::NoDomain,
            Rtype::A,
            key("nosuch.example"),
            vec![],
        );
        cache.store(&answer, now);
        assert!(cache
            .lookup(Rtype::A, &key("nosuch.example"), now + Duration::from_secs(299))
            .unwrap()
            .is_negative());
        assert!(cache
            .lookup(Rtype::A, &key("nosuch.example"), now + Duration::from_secs(300))
            .is_none());

        // Errors are not cached.
        let answer = Answer::new(Status::Timeout, Rtype::A, key("slow.example"), vec![]);
        cache.store(&answer, now);
        assert!(cache.lookup(Rtype::A, &key("slow.example"), now).is_none());

        // CNAME and the target's records are both cached.
        let answer = Answer::new(
            Status::Ok,
            Rtype::MX,
            key("www.example.com"),
            vec![
                ResourceRecord::new(
                    name("www.example.com"),
                    expires,
                    Cname::new(name("example.com")).into(),
                ),
                ResourceRecord::new(
                    name("example.com"),
                    expires,
                    Mx::new(10, name("mail.example.com")).into(),
                ),
            ],
        );
        cache.store(&answer, now);
        assert!(cache.lookup(Rtype::CNAME, &key("www.example.com"), now).is_some());
        assert!(cache.lookup(Rtype::MX, &key("example.com"), now).is_some());
        assert!(cache.lookup(Rtype::MX, &key("www.example.com"), now).is_none());
    }

    #[test]
    fn reverse_answers_keyed_by_addr() {
        let now = Instant::now();
        let mut cache = cache(50, 100);
        let addr = IpAddr::from([192, 0, 2, 1]);
        let answer = Answer::new(
            Status::Ok,
            Rtype::PTR,
            QueryKey::Addr(addr),
            vec![ResourceRecord::new(
                Dname::from_addr(addr),
                now + Duration::from_secs(60),
                Ptr::new(name("host.example")).into(),
            )],
        );
        cache.store(&answer, now);
        let rr = cache.lookup(Rtype::PTR, &QueryKey::Addr(addr), now).unwrap();
        assert_eq!(rr.data().unwrap().target_name(), Some(&name("host.example")));
    }

    #[test]
    fn auto_hints_are_returned() {
        let now = Instant::now();
        let mut cache = cache(50, 100);
        let hints =
            RootHints::parse("corp.example:10.0.0.53:AUTO\n.:198.41.0.4").unwrap();
        let auto = cache.load_root_servers(&hints, now);
        assert_eq!(auto.len(), 1);
        assert_eq!(auto[0].domain, name("corp.example"));
        assert!(cache.is_delegation_root(&name("corp.example")));
        assert!(cache.is_root_glue(&name("4.0.41.198.in-addr.arpa")));
    }

    #[test]
    fn watermark_limits() {
        let mut marks = Watermarks::uniform(500, 100);
        marks.set(Rtype::NS, Watermark::new(10, 0));
        marks.finalize();
        assert_eq!(marks.get(Rtype::A), Watermark::new(100, 100));
        assert_eq!(marks.get(Rtype::NS), Watermark::new(1, 1));
    }
}

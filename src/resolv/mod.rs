//! An event-driven DNS resolver.
//!
//! The [`Resolver`] answers questions from its [record cache][crate::cache]
//! and, if that fails, by asking name servers. It does not perform any I/O
//! itself. Instead, it is driven by a [`Reactor`] which sends messages,
//! opens connections, and manages timers on its behalf. Whatever the
//! reactor observes is fed back into the resolver through its `handle_*`
//! methods.
//!
//! A question is asked via [`Resolver::resolve`]. If the answer is known
//! right away, be it because it is cached or because the question is
//! malformed, it is returned immediately. Otherwise, the method returns
//! `None` and the answer is delivered later through the resolver’s
//! [`Notify`] implementation, together with the client and parameter
//! given with the question.
//!
//! All of this happens on a single thread. Nothing in the resolver is
//! shared, so there is no locking. The `net` module contains a driver
//! that runs a resolver atop tokio sockets and timers.
//!
//! # Modes
//!
//! In [recursive mode][Mode::Recursive], questions are sent to the
//! configured servers in turn. In [iterative mode][Mode::Iterative], the
//! resolver walks the delegation tree itself, starting at the root name
//! servers. These are taken from a root hints file or learned by asking
//! the configured servers for them.

pub use self::answer::{Answer, QueryFlags, Status, Target};
pub use self::conf::{Mode, ResolvConf};
pub use self::error::Error;
pub use self::stats::Stats;
pub use self::transport::{
    ClientId, ConnId, Notify, QueryId, Reactor, Timer, TimerHandle,
};
pub use crate::cache::QueryKey;

pub mod answer;
pub mod conf;
pub mod error;
pub mod stats;
pub mod transport;

mod pending;
mod query;

use self::pending::QueryIds;
use self::query::{PendingQuery, Waiter, Work, MAX_CNAME_CHAIN};
use crate::base::iana::Rtype;
use crate::base::name::Dname;
use crate::base::Header;
use crate::cache::{HintMode, RecordCache, ResourceRecord, RootHints};
use crate::rdata::RecordData;
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::str::FromStr;
use std::{fmt, io};
use tracing::{debug, error, info, trace, warn};

//------------ Resolver ------------------------------------------------------

/// A DNS resolver.
///
/// The resolver is generic over the reactor `R` that performs I/O and
/// the receiver `N` of asynchronous answers.
pub struct Resolver<R, N> {
    conf: ResolvConf,
    reactor: R,
    notify: N,
    cache: RecordCache,
    stats: Stats,

    /// All queries in progress.
    queries: HashMap<QueryId, PendingQuery>,

    /// The query in progress for each question.
    index: HashMap<(Rtype, QueryKey), QueryId>,

    /// The transaction IDs of UDP queries.
    ids: QueryIds,

    /// The queries owning open stream connections.
    conns: HashMap<ConnId, QueryId>,

    next_query: u64,

    /// Index of the next recursive server to use.
    next_server: usize,

    /// Work queued while processing an event.
    work: VecDeque<Work>,

    /// The timer retrying queries deferred for a transaction ID.
    id_timer: Option<TimerHandle>,

    /// The query started by the current call to `resolve`.
    ///
    /// If the query completes before `resolve` returns, its answer is
    /// returned directly and clients are not notified.
    sync: Option<(QueryId, Option<Answer>)>,

    shut_down: bool,
}

/// # Creation
///
impl<R: Reactor, N: Notify> Resolver<R, N> {
    /// Creates a new resolver.
    ///
    /// In iterative mode, the root name servers are loaded from the root
    /// hints file if one is configured. Otherwise, or if the file only
    /// contains automatic entries, they are requested from the
    /// configured servers.
    pub fn new(mut conf: ResolvConf, reactor: R, notify: N) -> Result<Self, Error> {
        conf.finalize();
        if conf.mode == Mode::Recursive && conf.servers.is_empty() {
            error!("recursive mode requires at least one server");
            return Err(Error::NoServers);
        }
        let mut res = Self::unstarted(conf, reactor, notify);
        if res.conf.mode == Mode::Iterative {
            res.reload_roots()?;
        }
        Ok(res)
    }

    /// Creates a new resolver using the given root hints.
    ///
    /// Any root hints file in the configuration is ignored.
    pub fn with_root_hints(
        mut conf: ResolvConf,
        hints: &RootHints,
        reactor: R,
        notify: N,
    ) -> Result<Self, Error> {
        conf.finalize();
        let mut res = Self::unstarted(conf, reactor, notify);
        let root_query = res.load_hints(hints)?;
        res.bootstrap(root_query)?;
        Ok(res)
    }

    fn unstarted(conf: ResolvConf, reactor: R, notify: N) -> Self {
        Resolver {
            cache: RecordCache::new(conf.cache_conf()),
            conf,
            reactor,
            notify,
            stats: Stats::default(),
            queries: HashMap::new(),
            index: HashMap::new(),
            ids: QueryIds::new(),
            conns: HashMap::new(),
            next_query: 0,
            next_server: 0,
            work: VecDeque::new(),
            id_timer: None,
            sync: None,
            shut_down: false,
        }
    }

    /// Loads the root name servers again.
    ///
    /// If the configuration names a root hints file, it is read and its
    /// entries are added to the cache. If reading fails while root name
    /// servers are cached, the old servers are kept and a warning is
    /// logged.
    pub fn reload_roots(&mut self) -> Result<(), Error> {
        let now = self.reactor.now();
        let mut root_query = false;
        if let Some(path) = self.conf.root_hints.clone() {
            match RootHints::from_file(&path) {
                Ok(hints) => {
                    info!("loaded {} root hints from {}", hints.entries().len(), path.display());
                    root_query = self.load_hints(&hints)?;
                }
                Err(err) if self.cache.has_root_servers(now) => {
                    warn!("cannot reload root hints from {}: {}", path.display(), err);
                    return Ok(());
                }
                Err(err) => {
                    error!("cannot read root hints from {}: {}", path.display(), err);
                    return Err(err.into());
                }
            }
        }
        self.bootstrap(root_query)
    }

    /// Adds root hints to the cache.
    ///
    /// Automatic entries are resolved by asking the configured servers.
    /// Returns whether one of these queries is for the root zone.
    fn load_hints(&mut self, hints: &RootHints) -> Result<bool, Error> {
        let now = self.reactor.now();
        let auto = self.cache.load_root_servers(hints, now);
        if !auto.is_empty() && self.conf.servers.is_empty() {
            error!("automatic root hints require at least one server");
            return Err(Error::NoServers);
        }
        let mut root_query = false;
        for entry in auto {
            debug_assert_eq!(entry.mode, HintMode::Auto);
            debug!("asking configured servers for the name servers of {}", entry.domain);
            root_query |= entry.domain.is_root();
            self.start_internal(
                Rtype::NS,
                QueryKey::Name(entry.domain.clone()),
                true,
            );
        }
        self.run();
        Ok(root_query)
    }

    /// Makes sure there is a way to learn the root name servers.
    fn bootstrap(&mut self, root_query: bool) -> Result<(), Error> {
        let now = self.reactor.now();
        if root_query || self.cache.has_root_servers(now) {
            return Ok(());
        }
        if self.conf.auto_bootstrap && !self.conf.servers.is_empty() {
            debug!("asking configured servers for the root name servers");
            self.start_internal(Rtype::NS, QueryKey::Name(Dname::root()), true);
            self.run();
            return Ok(());
        }
        error!("no root name servers available");
        Err(Error::NoRootServers)
    }

    /// Starts a query nobody outside the resolver waits for.
    ///
    /// With `bootstrap`, the configured servers are asked regardless of
    /// mode. Nothing happens if the question is being asked already.
    fn start_internal(&mut self, qtype: Rtype, key: QueryKey, bootstrap: bool) {
        if self.index.contains_key(&(qtype, key.clone())) {
            return;
        }
        let id = self.new_query(qtype, key, bootstrap);
        self.work.push_back(Work::Start(id));
    }
}

/// # Asking Questions
///
impl<R: Reactor, N: Notify> Resolver<R, N> {
    /// Asks a question.
    ///
    /// Returns the answer if it is available immediately. This happens if
    /// the answer is cached, if the question cannot be asked at all, or
    /// if `flags` contains [`QueryFlags::NO_QUERY`]. Otherwise returns
    /// `None` and the answer will be given to the resolver’s [`Notify`]
    /// together with `client` and `param` once it is known.
    ///
    /// If the same question is being asked already, no new query is
    /// started. Instead, the client is notified when that query finishes.
    pub fn resolve<'a>(
        &mut self,
        qtype: Rtype,
        target: impl Into<Target<'a>>,
        client: ClientId,
        param: u64,
        flags: QueryFlags,
    ) -> Option<Answer> {
        let target = target.into();
        let key = match Self::query_key(qtype, target) {
            Some(key) => key,
            None => {
                debug!("{}: bad name {} in {} question", client, target, qtype);
                return Some(Answer::bad_name(qtype, target.to_string()));
            }
        };
        if self.shut_down {
            return Some(Answer::empty(Status::Shutdown, qtype, key));
        }
        if !qtype.is_supported() {
            debug!("{}: unsupported record type {}", client, qtype);
            return Some(Answer::empty(Status::Error, qtype, key));
        }
        self.stats.request(qtype);
        if let Some(answer) = self.cached_answer(qtype, &key) {
            trace!("{}: {} {} answered from cache", client, qtype, key);
            return Some(answer);
        }
        self.stats.miss(qtype);
        if flags.contains(QueryFlags::NO_QUERY) {
            return Some(Answer::empty(Status::NotCached, qtype, key));
        }

        let waiter = Waiter::Client { client, param };
        if let Some(id) = self.index.get(&(qtype, key.clone())).copied() {
            if let Some(query) = self.queries.get_mut(&id) {
                debug!("{}: joining {} for {} {}", client, id, qtype, key);
                query.waiters.push(waiter);
                return None;
            }
        }

        let id = self.new_query(qtype, key, false);
        if let Some(query) = self.queries.get_mut(&id) {
            query.waiters.push(waiter);
        }
        self.sync = Some((id, None));
        self.work.push_back(Work::Start(id));
        self.run();
        self.sync.take().and_then(|(_, answer)| answer)
    }

    /// Looks up a question in the cache.
    ///
    /// Returns a positive answer if records are cached, a negative answer
    /// if the name is known not to exist, and `None` otherwise. For types
    /// other than CNAME, a cached CNAME chain is followed.
    pub fn cached_answer(&mut self, qtype: Rtype, key: &QueryKey) -> Option<Answer> {
        let now = self.reactor.now();
        if let Some(answer) = self.lookup_exact(qtype, key, now) {
            return Some(answer);
        }
        if qtype == Rtype::CNAME || qtype == Rtype::PTR {
            return None;
        }

        let mut records = Vec::new();
        let mut current = key.clone();
        for _ in 0..MAX_CNAME_CHAIN {
            let cname = match self.cache.lookup(Rtype::CNAME, &current, now) {
                Some(cname) if !cname.is_negative() => cname,
                _ => return None,
            };
            let target = match cname.data() {
                Some(RecordData::Cname(data)) => data.cname().clone(),
                _ => return None,
            };
            records.push(cname);
            current = QueryKey::Name(target);
            match self.lookup_exact(qtype, &current, now) {
                Some(answer) if answer.is_ok() => {
                    records.extend(answer.into_records());
                    return Some(Answer::new(Status::Ok, qtype, key.clone(), records));
                }
                Some(_) => {
                    return Some(Answer::empty(Status::NoDomain, qtype, key.clone()))
                }
                None => {}
            }
        }
        None
    }

    fn lookup_exact(
        &mut self,
        qtype: Rtype,
        key: &QueryKey,
        now: std::time::Instant,
    ) -> Option<Answer> {
        let records: Vec<ResourceRecord> = if qtype.is_multi() {
            self.cache.lookup_list(qtype, key, now)?
        } else {
            vec![self.cache.lookup(qtype, key, now)?]
        };
        if records.first().map_or(false, ResourceRecord::is_negative) {
            Some(Answer::empty(Status::NoDomain, qtype, key.clone()))
        } else {
            Some(Answer::new(Status::Ok, qtype, key.clone(), records))
        }
    }

    /// Turns the target of a question into a query key.
    ///
    /// Returns `None` if the target is not valid for the question.
    fn query_key(qtype: Rtype, target: Target) -> Option<QueryKey> {
        match target {
            Target::Name(name) => Dname::from_str(name).ok().map(QueryKey::Name),
            Target::Dname(name) => Some(QueryKey::Name(name.clone())),
            Target::Addr(addr) if qtype == Rtype::PTR => Some(QueryKey::Addr(addr)),
            Target::Addr(_) => None,
        }
    }

    /// Creates a new query and adds it to the index.
    ///
    /// Bootstrap queries always go to the configured servers.
    fn new_query(&mut self, qtype: Rtype, key: QueryKey, bootstrap: bool) -> QueryId {
        self.next_query += 1;
        let id = QueryId(self.next_query);
        let recursive = bootstrap
            || self.conf.mode == Mode::Recursive
            || (qtype == Rtype::NS && key.name().map_or(false, Dname::is_root));
        trace!("{}: new query for {} {}", id, qtype, key);
        self.index.insert((qtype, key.clone()), id);
        self.queries.insert(
            id,
            PendingQuery::new(qtype, key, recursive, self.conf.tcp_only),
        );
        id
    }

    /// Stops notifying a client.
    ///
    /// The client is removed from all queries in progress. The queries
    /// themselves continue so that their answers can be cached.
    pub fn cancel(&mut self, client: ClientId) {
        for query in self.queries.values_mut() {
            query.waiters.retain(|waiter| {
                !matches!(waiter, Waiter::Client { client: c, .. } if *c == client)
            });
        }
    }

    /// Shuts the resolver down.
    ///
    /// All queries in progress are dropped without notifying anyone.
    /// Afterwards, all questions are answered with [`Status::Shutdown`].
    pub fn shutdown(&mut self) {
        info!("shutting down with {} queries in progress", self.queries.len());
        for (_, query) in self.queries.drain() {
            if let Some(timer) = query.timer() {
                self.reactor.cancel_timer(timer)
            }
        }
        for (conn, _) in self.conns.drain() {
            self.reactor.close_stream(conn)
        }
        if let Some(timer) = self.id_timer.take() {
            self.reactor.cancel_timer(timer)
        }
        self.index.clear();
        self.ids.clear();
        self.work.clear();
        self.sync = None;
        self.shut_down = true;
    }
}

/// # Handling Events
///
impl<R: Reactor, N: Notify> Resolver<R, N> {
    /// Processes a datagram received from `from`.
    pub fn handle_datagram(&mut self, from: SocketAddr, data: &[u8]) {
        if self.shut_down {
            return;
        }
        if data.len() > usize::from(self.conf.udp_payload_size) {
            warn!("dropping oversized datagram of {} octets from {}", data.len(), from);
            self.stats.unexpected += 1;
            return;
        }
        let header = match Header::for_message_slice(data) {
            Some(header) => header,
            None => {
                warn!("dropping short datagram from {}", from);
                self.stats.unexpected += 1;
                return;
            }
        };
        let id = match self.ids.get(header.id()) {
            Some(id) => id,
            None => {
                debug!("dropping response with unknown ID {} from {}", header.id(), from);
                self.stats.unexpected += 1;
                return;
            }
        };
        match self.queries.get(&id) {
            Some(query) if query.expects_datagram(from) => {}
            _ => {
                warn!("{}: dropping response from unexpected {}", id, from);
                self.stats.unexpected += 1;
                return;
            }
        }
        trace!("{}: received {} octets from {}", id, data.len(), from);
        self.stats.udp_received += 1;
        self.process_response(id, data);
        self.run();
    }

    /// Processes data received on a stream connection.
    pub fn handle_stream_data(&mut self, conn: ConnId, data: &[u8]) {
        let id = match self.conns.get(&conn) {
            Some(id) => *id,
            None => return,
        };
        let messages = match self.queries.get_mut(&id) {
            Some(query) => query.stream_data(data),
            None => return,
        };
        for message in messages {
            if self.conns.get(&conn) != Some(&id) {
                break;
            }
            trace!("{}: received {} octets over TCP", id, message.len());
            self.stats.tcp_received += 1;
            self.process_response(id, &message);
        }
        self.run();
    }

    /// Processes the remote end closing a stream connection.
    pub fn handle_stream_closed(&mut self, conn: ConnId) {
        if let Some(id) = self.conns.remove(&conn) {
            debug!("{}: connection closed before response", id);
            self.connection_failed(id);
            self.run();
        }
    }

    /// Processes an error on a stream connection.
    pub fn handle_stream_error(&mut self, conn: ConnId, err: io::Error) {
        if let Some(id) = self.conns.remove(&conn) {
            warn!("{}: connection failed: {}", id, err);
            self.connection_failed(id);
            self.run();
        }
    }

    /// Processes an expired timer.
    pub fn handle_timer(&mut self, timer: Timer) {
        if self.shut_down {
            return;
        }
        match timer {
            Timer::Query { query, attempt } => {
                self.query_timeout(query, attempt)
            }
            Timer::IdRetry => self.retry_deferred(),
        }
        self.run();
    }
}

/// # Access to Internals
///
impl<R, N> Resolver<R, N> {
    pub fn conf(&self) -> &ResolvConf {
        &self.conf
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut RecordCache {
        &mut self.cache
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    pub fn reactor_mut(&mut self) -> &mut R {
        &mut self.reactor
    }

    /// Returns the number of queries in progress.
    pub fn pending_count(&self) -> usize {
        self.queries.len()
    }

    /// Returns whether the question is being asked right now.
    pub fn is_pending(&self, qtype: Rtype, key: &QueryKey) -> bool {
        self.index.contains_key(&(qtype, key.clone()))
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down
    }

    /// Replaces the source of transaction IDs.
    ///
    /// This is meant for testing. Any IDs in use are forgotten, so this
    /// should only be called before asking any questions.
    pub fn set_id_generator(
        &mut self,
        generator: impl FnMut() -> u16 + Send + 'static,
    ) {
        self.ids = QueryIds::with_generator(generator);
    }
}

impl<R, N> fmt::Debug for Resolver<R, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("conf", &self.conf)
            .field("queries", &self.queries.len())
            .field("ids", &self.ids)
            .field("shut_down", &self.shut_down)
            .finish()
    }
}


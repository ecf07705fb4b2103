//! The state machine of a single query.
//!
//! A [`PendingQuery`] represents one question the resolver is working on.
//! It starts out in [`State::New`]. Once a server has been chosen, the
//! query is sent and the query waits for a response. If none arrives in
//! time, the query is sent again, possibly to a different server, until
//! the retries are used up. A truncated UDP response makes the query
//! switch over to TCP.
//!
//! In iterative mode, choosing a server may require knowing the name
//! servers of a zone or the address of one of these servers. If that
//! information is not cached, the query starts another query for it and
//! waits for that one to finish. Since this can go in circles, before
//! waiting on an existing query, the resolver checks that this query
//! is not itself waiting for the one that wants to wait.
//!
//! Once the answer is known, it is stored in the cache and everyone
//! waiting for the query is told about it.

use super::answer::{Answer, Status};
use super::transport::{
    ClientId, ConnId, Notify, QueryId, Reactor, Timer, TimerHandle,
};
use super::Resolver;
use crate::base::iana::{Class, Rcode, Rtype};
use crate::base::message::Message;
use crate::base::message_builder::{stream_frame, MessageBuilder};
use crate::base::name::Dname;
use crate::base::question::Question;
use crate::base::stream::StreamBuffer;
use crate::base::wire::ComposeError;
use crate::base::Header;
use crate::cache::{QueryKey, RecordCache, ResourceRecord};
use crate::rdata::RecordData;
use smallvec::SmallVec;
use std::net::SocketAddr;
use tracing::{debug, trace, warn};

/// The number of CNAME records followed in an answer.
pub(super) const MAX_CNAME_CHAIN: usize = 8;

/// Top-level domains whose names are delegated right below the TLD.
///
/// For names under these, iterative resolution starts looking for name
/// servers at the second level.
const FLAT_TLDS: [&[u8]; 3] = [b"com", b"org", b"net"];

//------------ PendingQuery --------------------------------------------------

/// A question the resolver is working on.
#[derive(Debug)]
pub(super) struct PendingQuery {
    pub(super) qtype: Rtype,
    pub(super) key: QueryKey,

    /// The name used in the question.
    ///
    /// This differs from the key once a CNAME has been followed.
    qname: Dname,

    /// The CNAME records followed so far.
    aliases: Vec<ResourceRecord>,

    pub(super) state: State,

    /// Whether to ask recursive servers rather than walking the tree.
    recursive: bool,

    transport: Transport,

    /// The server the query is sent to.
    server: Option<SocketAddr>,

    /// The transaction ID of the current attempt.
    txid: Option<u16>,

    /// The number of retries so far.
    retries: u8,

    /// Counts attempts so that stale timers can be recognized.
    attempt: u32,

    timer: Option<TimerHandle>,

    /// Collects data received over TCP.
    stream: StreamBuffer,

    /// The zone whose name servers are asked in iterative mode.
    zone: Option<Dname>,

    /// The number of referrals followed and queries waited for.
    steps: u8,

    /// Name servers whose address does not exist.
    lame: Vec<Dname>,

    /// The answer of the last query this query waited for.
    ///
    /// This is consulted before the cache so that records with a very
    /// short TTL can still be used once.
    hint: Option<Answer>,

    /// The query this query currently waits for.
    pub(super) subquery: Option<QueryId>,

    /// The status to report when retries are used up.
    failure: Status,

    /// Everyone waiting for the answer, in order of arrival.
    pub(super) waiters: SmallVec<[Waiter; 2]>,
}

impl PendingQuery {
    pub(super) fn new(
        qtype: Rtype,
        key: QueryKey,
        recursive: bool,
        tcp_only: bool,
    ) -> Self {
        PendingQuery {
            qtype,
            qname: key.qname(),
            aliases: Vec::new(),
            key,
            state: State::New,
            recursive,
            transport: if tcp_only {
                Transport::Tcp(None)
            } else {
                Transport::Udp
            },
            server: None,
            txid: None,
            retries: 0,
            attempt: 0,
            timer: None,
            stream: StreamBuffer::new(),
            zone: None,
            steps: 0,
            lame: Vec::new(),
            hint: None,
            subquery: None,
            failure: Status::Timeout,
            waiters: SmallVec::new(),
        }
    }

    /// Returns whether a datagram from `from` may be a response.
    pub(super) fn expects_datagram(&self, from: SocketAddr) -> bool {
        self.state == State::AwaitingResponse
            && self.transport == Transport::Udp
            && self.server == Some(from)
    }

    /// Returns whether `attempt` is the current attempt of this query.
    pub(super) fn is_current_attempt(&self, attempt: u32) -> bool {
        self.state == State::AwaitingResponse && self.attempt == attempt
    }

    /// Returns the stream connection of the query if there is one.
    pub(super) fn conn(&self) -> Option<ConnId> {
        match self.transport {
            Transport::Tcp(conn) => conn,
            Transport::Udp => None,
        }
    }

    pub(super) fn timer(&self) -> Option<TimerHandle> {
        self.timer
    }

    /// Adds data received over the stream and returns complete messages.
    pub(super) fn stream_data(&mut self, data: &[u8]) -> Vec<bytes::Bytes> {
        self.stream.extend(data);
        let mut res = Vec::new();
        while let Some(message) = self.stream.next_message() {
            res.push(message)
        }
        res
    }

    /// Creates the request message.
    fn request(&self, txid: u16) -> Result<Vec<u8>, ComposeError> {
        MessageBuilder::query(
            txid,
            Question::new_in(self.qname.clone(), self.qtype),
            self.recursive,
        )
        .finish()
    }

    fn set_state(&mut self, state: State) {
        trace!("{} {}: {:?} -> {:?}", self.qtype, self.key, self.state, state);
        self.state = state;
    }

    /// Returns a hint matching the given question.
    ///
    /// A negative hint results in an empty list.
    fn hint_for(&self, rtype: Rtype, key: &QueryKey) -> Option<Vec<ResourceRecord>> {
        let hint = self.hint.as_ref()?;
        if hint.qtype() != rtype || hint.key() != Some(key) {
            return None;
        }
        Some(hint.iter_answers().cloned().collect())
    }
}

//------------ State ---------------------------------------------------------

/// The states of a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum State {
    /// The query has just been created.
    New,

    /// A server has been picked but the query not sent yet.
    ///
    /// Queries waiting for a transaction ID stay in this state.
    ServerSelected,

    /// The query has been sent.
    AwaitingResponse,

    /// The query is waiting for another query.
    AwaitingSubquery,

    /// The answer is known.
    Completed,
}

//------------ Transport -----------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Transport {
    Udp,

    /// TCP with the connection if one is open.
    Tcp(Option<ConnId>),
}

//------------ Waiter --------------------------------------------------------

/// Someone waiting for the answer of a query.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(super) enum Waiter {
    Client { client: ClientId, param: u64 },
    Query(QueryId),
}

//------------ Work ----------------------------------------------------------

/// Things to do once the current event has been dealt with.
#[derive(Debug)]
pub(super) enum Work {
    /// Start a newly created query.
    Start(QueryId),

    /// A query this query waited for has finished.
    Resume { query: QueryId, answer: Answer },
}

//------------ Selection -----------------------------------------------------

/// The outcome of choosing a server.
enum Selection {
    Server(SocketAddr),

    /// Another question needs answering first.
    Wait(Rtype, QueryKey),

    Fail(Status),
}

//------------ Resolver: the state machine -----------------------------------

impl<R: Reactor, N: Notify> Resolver<R, N> {
    /// Performs all queued work.
    pub(super) fn run(&mut self) {
        while let Some(work) = self.work.pop_front() {
            match work {
                Work::Start(id) => {
                    trace!("{}: starting", id);
                    self.select_server(id)
                }
                Work::Resume { query, answer } => {
                    self.resume_query(query, answer)
                }
            }
        }
    }

    /// Chooses a server and sends the query there.
    fn select_server(&mut self, id: QueryId) {
        let now = self.reactor.now();
        let selection = {
            let query = match self.queries.get_mut(&id) {
                Some(query) => query,
                None => return,
            };
            if query.recursive {
                select_upstream(&self.conf.servers, &mut self.next_server)
            } else {
                select_iterative(&mut self.cache, query, now)
            }
        };
        match selection {
            Selection::Server(server) => self.send_query(id, server),
            Selection::Wait(rtype, key) => self.wait_for(id, rtype, key),
            Selection::Fail(status) => self.complete(id, status, Vec::new()),
        }
    }

    /// Makes a query wait for the answer to another question.
    fn wait_for(&mut self, id: QueryId, rtype: Rtype, key: QueryKey) {
        let max_steps = self.conf.max_steps;
        match self.queries.get_mut(&id) {
            Some(query) => {
                query.steps += 1;
                if query.steps > max_steps {
                    warn!("{}: too many steps resolving {}", id, query.key);
                    return self.complete(id, Status::Error, Vec::new());
                }
            }
            None => return,
        }

        let sub = match self.index.get(&(rtype, key.clone())).copied() {
            Some(existing) => {
                if existing == id || self.waits_on(existing, id) {
                    warn!("{}: {} {} depends on itself", id, rtype, key);
                    self.stats.deadlocks += 1;
                    return self.complete(id, Status::Deadlock, Vec::new());
                }
                debug!("{}: waiting for pending {} {} {}", id, existing, rtype, key);
                existing
            }
            None => {
                debug!("{}: waiting for {} {}", id, rtype, key);
                let sub = self.new_query(rtype, key, false);
                self.work.push_back(Work::Start(sub));
                sub
            }
        };
        if let Some(query) = self.queries.get_mut(&sub) {
            query.waiters.push(Waiter::Query(id));
        }
        if let Some(query) = self.queries.get_mut(&id) {
            query.subquery = Some(sub);
            query.set_state(State::AwaitingSubquery);
        }
    }

    /// Returns whether `query` waits for `target`, maybe indirectly.
    fn waits_on(&self, query: QueryId, target: QueryId) -> bool {
        let mut current = query;
        for _ in 0..=self.queries.len() {
            match self.queries.get(&current).and_then(|query| query.subquery) {
                Some(next) if next == target => return true,
                Some(next) => current = next,
                None => return false,
            }
        }
        // A longer chain must contain a cycle.
        true
    }

    /// Continues a query after the query it waited for has finished.
    fn resume_query(&mut self, id: QueryId, answer: Answer) {
        let query = match self.queries.get_mut(&id) {
            Some(query) if query.state == State::AwaitingSubquery => query,
            _ => return,
        };
        query.subquery = None;
        match answer.status() {
            Status::Ok => {}
            Status::NoDomain => match (answer.qtype(), answer.name()) {
                (Rtype::NS, Some(zone)) => {
                    // Not a zone. Continue with its parent.
                    match zone.parent() {
                        Some(parent) => query.zone = Some(parent),
                        None => {
                            return self.complete(id, Status::Error, Vec::new())
                        }
                    }
                }
                (_, Some(host)) => {
                    debug!("{}: name server {} does not exist", id, host);
                    query.lame.push(host.clone())
                }
                _ => {}
            },
            status => return self.complete(id, status, Vec::new()),
        }
        query.hint = Some(answer);
        query.set_state(State::ServerSelected);
        self.select_server(id)
    }

    /// Sends a query to a server.
    fn send_query(&mut self, id: QueryId, server: SocketAddr) {
        let tcp = match self.queries.get_mut(&id) {
            Some(query) => {
                debug!("{}: asking {} for {} {}", id, server, query.qtype, query.key);
                query.server = Some(server);
                query.set_state(State::ServerSelected);
                matches!(query.transport, Transport::Tcp(_))
            }
            None => return,
        };
        if tcp {
            self.send_tcp(id)
        } else {
            match self.ids.reserve(id) {
                Some(txid) => self.send_udp(id, txid),
                None => {
                    debug!("{}: transaction ID in use, deferring", id);
                    self.stats.id_collisions += 1;
                    self.arm_id_timer();
                }
            }
        }
    }

    /// Sends a query over UDP using the given transaction ID.
    pub(super) fn send_udp(&mut self, id: QueryId, txid: u16) {
        let query = match self.queries.get_mut(&id) {
            Some(query) if query.state == State::ServerSelected => query,
            _ => return self.ids.release(txid, id),
        };
        let server = match query.server {
            Some(server) => server,
            None => return self.ids.release(txid, id),
        };
        query.txid = Some(txid);
        let request = match query.request(txid) {
            Ok(request) => request,
            Err(err) => {
                warn!("{}: cannot build query: {}", id, err);
                return self.complete(id, Status::Error, Vec::new());
            }
        };
        match self.reactor.send_datagram(server, &request) {
            Ok(()) => {
                trace!("{}: sent {} octets to {}", id, request.len(), server);
                self.stats.udp_sent += 1
            }
            // A lost datagram is dealt with by the timeout.
            Err(err) => warn!("{}: sending to {} failed: {}", id, server, err),
        }
        self.arm_query_timer(id);
    }

    /// Sends a query over a new TCP connection.
    fn send_tcp(&mut self, id: QueryId) {
        let txid = self.ids.next_id();
        let query = match self.queries.get_mut(&id) {
            Some(query) => query,
            None => return,
        };
        let server = match query.server {
            Some(server) => server,
            None => return,
        };
        let txid = *query.txid.get_or_insert(txid);
        let request = match query.request(txid).and_then(|msg| stream_frame(&msg)) {
            Ok(request) => request,
            Err(err) => {
                warn!("{}: cannot build query: {}", id, err);
                return self.complete(id, Status::Error, Vec::new());
            }
        };
        let conn = match self.reactor.connect(server) {
            Ok(conn) => conn,
            Err(err) => {
                warn!("{}: connecting to {} failed: {}", id, server, err);
                return self.complete(id, Status::Error, Vec::new());
            }
        };
        query.transport = Transport::Tcp(Some(conn));
        query.stream.clear();
        self.conns.insert(conn, id);
        if let Err(err) = self.reactor.send_stream(conn, &request) {
            warn!("{}: sending to {} failed: {}", id, server, err);
            return self.complete(id, Status::Error, Vec::new());
        }
        trace!("{}: sent {} octets to {} over TCP", id, request.len(), server);
        self.stats.tcp_sent += 1;
        self.arm_query_timer(id);
    }

    /// Starts the timer for the current attempt of a query.
    fn arm_query_timer(&mut self, id: QueryId) {
        let query = match self.queries.get_mut(&id) {
            Some(query) => query,
            None => return,
        };
        query.attempt += 1;
        let timer = self.reactor.set_timer(
            self.conf.timeout_for(query.retries),
            Timer::Query {
                query: id,
                attempt: query.attempt,
            },
        );
        if let Some(old) = query.timer.replace(timer) {
            self.reactor.cancel_timer(old)
        }
        query.set_state(State::AwaitingResponse);
    }

    /// Starts the timer for deferred queries unless it is running.
    fn arm_id_timer(&mut self) {
        if self.id_timer.is_none() {
            self.id_timer = Some(
                self.reactor
                    .set_timer(self.conf.id_retry_interval, Timer::IdRetry),
            );
        }
    }

    /// Processes an expired timer of a query.
    pub(super) fn query_timeout(&mut self, id: QueryId, attempt: u32) {
        match self.queries.get_mut(&id) {
            Some(query) if query.is_current_attempt(attempt) => {
                debug!("{}: no response from {:?}", id, query.server);
                query.timer = None;
            }
            _ => return,
        }
        self.fail_attempt(id, Status::Timeout)
    }

    /// Sends deferred queries whose transaction ID has become free.
    pub(super) fn retry_deferred(&mut self) {
        self.id_timer = None;
        for (id, txid) in self.ids.retry_deferred() {
            self.send_udp(id, txid)
        }
        if self.ids.has_deferred() {
            self.arm_id_timer()
        }
    }

    /// Ends the current attempt of a query.
    ///
    /// This releases the transaction ID, cancels the timer, and closes
    /// the connection.
    fn end_attempt(&mut self, id: QueryId) {
        let query = match self.queries.get_mut(&id) {
            Some(query) => query,
            None => return,
        };
        if let Some(txid) = query.txid.take() {
            self.ids.release(txid, id)
        }
        if let Some(timer) = query.timer.take() {
            self.reactor.cancel_timer(timer)
        }
        if let Transport::Tcp(Some(conn)) = query.transport {
            self.reactor.close_stream(conn);
            self.conns.remove(&conn);
            query.transport = Transport::Tcp(None);
        }
    }

    /// Deals with a failed attempt.
    ///
    /// If there are retries left, the query is sent again. Otherwise it
    /// fails with the status of the last failure.
    pub(super) fn fail_attempt(&mut self, id: QueryId, status: Status) {
        self.end_attempt(id);
        let retries = self.conf.retries;
        let query = match self.queries.get_mut(&id) {
            Some(query) => query,
            None => return,
        };
        query.failure = status;
        if query.retries >= retries {
            warn!(
                "{}: giving up on {} {} after {} retries",
                id, query.qtype, query.key, query.retries
            );
            let status = query.failure;
            return self.complete(id, status, Vec::new());
        }
        query.retries += 1;
        self.stats.retries += 1;
        debug!("{}: retry {} of {}", id, query.retries, retries);
        self.select_server(id)
    }

    /// A stream connection of a query broke down.
    pub(super) fn connection_failed(&mut self, id: QueryId) {
        if let Some(query) = self.queries.get_mut(&id) {
            // The connection is gone already.
            query.transport = Transport::Tcp(None);
        }
        self.complete(id, Status::Error, Vec::new())
    }

    /// Processes a response.
    pub(super) fn process_response(&mut self, id: QueryId, data: &[u8]) {
        let (txid, udp) = match self.queries.get(&id) {
            Some(query) if query.state == State::AwaitingResponse => {
                (query.txid, query.transport == Transport::Udp)
            }
            _ => return,
        };

        // Check the header first. A truncated response may not parse.
        let header = match Header::for_message_slice(data) {
            Some(header) => header,
            None => return self.bad_response(id, "short message"),
        };
        if !header.qr() || Some(header.id()) != txid {
            return self.bad_response(id, "transaction ID mismatch");
        }
        if header.tc() && udp {
            debug!("{}: truncated response, switching to TCP", id);
            self.stats.truncated += 1;
            return self.switch_to_tcp(id);
        }

        let msg = match Message::from_slice(data) {
            Ok(msg) => msg,
            Err(err) => {
                debug!("{}: {}", id, err);
                return self.bad_response(id, "malformed message");
            }
        };
        let matches = match self.queries.get(&id) {
            Some(query) => msg.is_answer_for(&query.qname, query.qtype),
            None => return,
        };
        if !matches {
            return self.bad_response(id, "question mismatch");
        }
        match header.rcode() {
            Rcode::NOERROR => self.process_answer(id, &msg),
            Rcode::NXDOMAIN => self.complete(id, Status::NoDomain, Vec::new()),
            rcode => {
                debug!("{}: server responded with {}", id, rcode);
                self.fail_attempt(id, Status::Error)
            }
        }
    }

    fn bad_response(&mut self, id: QueryId, reason: &str) {
        warn!("{}: dropping response: {}", id, reason);
        self.stats.bad_responses += 1;
        self.fail_attempt(id, Status::BadResponse)
    }

    /// Re-sends a query over TCP after a truncated response.
    fn switch_to_tcp(&mut self, id: QueryId) {
        let txid = self.queries.get(&id).and_then(|query| query.txid);
        self.end_attempt(id);
        if let Some(query) = self.queries.get_mut(&id) {
            query.transport = Transport::Tcp(None);
            query.txid = txid;
            query.set_state(State::ServerSelected);
        }
        self.send_tcp(id)
    }

    /// Processes a successful response.
    fn process_answer(&mut self, id: QueryId, msg: &Message) {
        let now = self.reactor.now();
        let min_ttl = self.cache.conf().min_ttl;
        let (qname, qtype, zone, recursive) = match self.queries.get(&id) {
            Some(query) => (
                query.qname.clone(),
                query.qtype,
                query.zone.clone(),
                query.recursive,
            ),
            None => return,
        };
        let convert = |record: &crate::base::ParsedRecord| {
            ResourceRecord::from_record(&record.to_record(), now, min_ttl)
        };

        // Follow CNAMEs from the question name.
        let mut names = vec![qname.clone()];
        for _ in 0..MAX_CNAME_CHAIN {
            let next = msg.answer().iter().find_map(|record| {
                let target = match record.data() {
                    RecordData::Cname(cname) => cname.cname(),
                    _ => return None,
                };
                let owner_known = names.iter().any(|name| record.owner().name_eq(name));
                if owner_known && !names.contains(target) {
                    Some(target.clone())
                } else {
                    None
                }
            });
            match next {
                Some(name) => names.push(name),
                None => break,
            }
        }
        let records: Vec<_> = msg
            .answer()
            .iter()
            .filter(|record| {
                record.class() == Class::IN
                    && (record.rtype() == qtype || record.rtype() == Rtype::CNAME)
                    && names.iter().any(|name| record.owner().name_eq(name))
            })
            .map(convert)
            .collect();

        self.cache_glue(msg, zone.as_ref(), now);

        if !records.is_empty() {
            let resolved = qtype == Rtype::CNAME
                || records.iter().any(|record| record.rtype() == qtype);
            return match names.pop() {
                Some(target) if !resolved && !recursive && target != qname => {
                    self.follow_alias(id, target, records, now)
                }
                _ => self.complete(id, Status::Ok, records),
            };
        }

        // Look for a delegation closer to the question name.
        let referral: Vec<_> = msg
            .authority()
            .iter()
            .filter(|record| record.rtype() == Rtype::NS)
            .map(convert)
            .filter(|record| {
                let owner = record.owner();
                qname.ends_with(owner)
                    && zone.as_ref().map_or(true, |zone| {
                        owner.ends_with(zone) && owner != zone
                    })
            })
            .collect();
        let cut = match referral.first() {
            Some(record) => record.owner().clone(),
            None => return self.complete(id, Status::NoDomain, Vec::new()),
        };
        let referral: Vec<_> = referral
            .into_iter()
            .filter(|record| *record.owner() == cut)
            .collect();
        if qtype == Rtype::NS && cut == qname {
            return self.complete(id, Status::Ok, referral);
        }
        if recursive {
            // Recursive servers should not send referrals.
            return self.complete(id, Status::NoDomain, Vec::new());
        }
        self.follow_referral(id, cut, referral, now)
    }

    /// Continues a query with the name servers of a more specific zone.
    fn follow_referral(
        &mut self,
        id: QueryId,
        cut: Dname,
        referral: Vec<ResourceRecord>,
        now: std::time::Instant,
    ) {
        self.cache.store_records(&referral, now);
        self.end_attempt(id);
        let max_steps = self.conf.max_steps;
        let query = match self.queries.get_mut(&id) {
            Some(query) => query,
            None => return,
        };
        query.steps += 1;
        if query.steps > max_steps {
            warn!("{}: too many referrals resolving {}", id, query.key);
            return self.complete(id, Status::Error, Vec::new());
        }
        debug!("{}: referred to {}", id, cut);
        query.hint = Some(Answer::new(
            Status::Ok,
            Rtype::NS,
            QueryKey::Name(cut.clone()),
            referral,
        ));
        query.zone = Some(cut);
        query.retries = 0;
        query.lame.clear();
        query.set_state(State::ServerSelected);
        self.select_server(id)
    }

    /// Continues a query with the target of the CNAME records received.
    ///
    /// The records are kept and become part of the final answer.
    fn follow_alias(
        &mut self,
        id: QueryId,
        target: Dname,
        aliases: Vec<ResourceRecord>,
        now: std::time::Instant,
    ) {
        self.cache.store_records(&aliases, now);
        self.end_attempt(id);
        let max_steps = self.conf.max_steps;
        let query = match self.queries.get_mut(&id) {
            Some(query) => query,
            None => return,
        };
        query.steps += 1;
        query.aliases.extend(aliases);
        if query.steps > max_steps || query.aliases.len() > MAX_CNAME_CHAIN {
            warn!("{}: too many aliases resolving {}", id, query.key);
            return self.complete(id, Status::Error, Vec::new());
        }
        debug!("{}: following alias to {}", id, target);
        query.qname = target;
        query.zone = None;
        query.hint = None;
        query.retries = 0;
        query.lame.clear();
        query.set_state(State::ServerSelected);
        self.select_server(id)
    }

    /// Caches the addresses of name servers from the additional section.
    ///
    /// If `zone` is given, only addresses of hosts within the zone are
    /// accepted.
    fn cache_glue(
        &mut self,
        msg: &Message,
        zone: Option<&Dname>,
        now: std::time::Instant,
    ) {
        let min_ttl = self.cache.conf().min_ttl;
        let hosts: Vec<Dname> = msg
            .answer()
            .iter()
            .chain(msg.authority())
            .filter_map(|record| match record.data() {
                RecordData::Ns(ns) => Some(ns.nsdname().clone()),
                _ => None,
            })
            .collect();
        if hosts.is_empty() {
            return;
        }
        let glue: Vec<_> = msg
            .additional()
            .iter()
            .filter(|record| {
                matches!(record.rtype(), Rtype::A | Rtype::AAAA)
                    && hosts.iter().any(|host| record.owner().name_eq(host))
            })
            .map(|record| {
                ResourceRecord::from_record(&record.to_record(), now, min_ttl)
            })
            .filter(|record| zone.map_or(true, |zone| record.owner().ends_with(zone)))
            .collect();
        if !glue.is_empty() {
            trace!("caching {} glue records", glue.len());
            self.cache.store_records(&glue, now);
        }
    }

    /// Finishes a query and tells everyone waiting for it.
    pub(super) fn complete(
        &mut self,
        id: QueryId,
        status: Status,
        records: Vec<ResourceRecord>,
    ) {
        self.end_attempt(id);
        self.ids.cancel_deferred(id);
        let mut query = match self.queries.remove(&id) {
            Some(query) => query,
            None => return,
        };
        let index_key = (query.qtype, query.key.clone());
        if self.index.get(&index_key) == Some(&id) {
            self.index.remove(&index_key);
        }
        if let Some(sub) = query.subquery.take() {
            if let Some(sub) = self.queries.get_mut(&sub) {
                sub.waiters.retain(|waiter| *waiter != Waiter::Query(id));
            }
        }
        query.set_state(State::Completed);

        let records = if status == Status::Ok && !query.aliases.is_empty() {
            let mut all = std::mem::take(&mut query.aliases);
            all.extend(records);
            all
        } else {
            records
        };
        let answer = Answer::new(status, query.qtype, query.key, records);
        debug!(
            "{}: {} {} completed with {}",
            id,
            answer.qtype(),
            index_key.1,
            status
        );
        let now = self.reactor.now();
        self.cache.store(&answer, now);

        let synchronous = match self.sync {
            Some((sync_id, ref mut slot)) if sync_id == id => {
                *slot = Some(answer.clone());
                true
            }
            _ => false,
        };
        for waiter in query.waiters {
            match waiter {
                Waiter::Client { client, param } => {
                    if !synchronous {
                        self.notify.notify(client, param, &answer)
                    }
                }
                Waiter::Query(waiting) => self.work.push_back(Work::Resume {
                    query: waiting,
                    answer: answer.clone(),
                }),
            }
        }
    }
}

//------------ Server Selection ----------------------------------------------

/// Picks the next of the configured servers.
fn select_upstream(servers: &[SocketAddr], next_server: &mut usize) -> Selection {
    if servers.is_empty() {
        return Selection::Fail(Status::Error);
    }
    let server = servers[*next_server % servers.len()];
    *next_server = next_server.wrapping_add(1);
    Selection::Server(server)
}

/// Picks a name server of the closest known zone.
fn select_iterative(
    cache: &mut RecordCache,
    query: &mut PendingQuery,
    now: std::time::Instant,
) -> Selection {
    let mut zone = match query.zone.clone() {
        Some(zone) => zone,
        None => initial_zone(&query.qname),
    };
    loop {
        let key = QueryKey::Name(zone.clone());
        let servers = query
            .hint_for(Rtype::NS, &key)
            .or_else(|| cache.lookup_list(Rtype::NS, &key, now));
        match servers {
            Some(list) if list.first().map_or(false, |rr| !rr.is_negative()) => {
                query.zone = Some(zone);
                return select_nameserver(cache, query, &list, now);
            }
            Some(_) => {
                trace!("{} is not a zone", zone);
                zone = match zone.parent() {
                    Some(parent) => parent,
                    None => return Selection::Fail(Status::Error),
                };
            }
            None => return Selection::Wait(Rtype::NS, key),
        }
    }
}

/// Picks one of the given name servers that has a known address.
fn select_nameserver(
    cache: &mut RecordCache,
    query: &PendingQuery,
    servers: &[ResourceRecord],
    now: std::time::Instant,
) -> Selection {
    let mut addrs = Vec::new();
    let mut unresolved = None;
    for host in servers
        .iter()
        .filter_map(|rr| rr.data()?.target_name())
        .filter(|host| !query.lame.contains(host))
    {
        let key = QueryKey::Name(host.clone());
        let found: Vec<_> = match query.hint_for(Rtype::A, &key) {
            Some(list) => list.iter().filter_map(|rr| rr.data()?.addr()).collect(),
            None => cache.lookup_addrs(host, now),
        };
        if found.is_empty() && unresolved.is_none() {
            unresolved = Some(key)
        }
        addrs.extend(found);
    }
    addrs.sort_by_key(|addr| addr.is_ipv6());
    if !addrs.is_empty() {
        let addr = addrs[usize::from(query.retries) % addrs.len()];
        return Selection::Server(SocketAddr::new(addr, 53));
    }
    match unresolved {
        Some(key) => Selection::Wait(Rtype::A, key),
        None => Selection::Fail(Status::Error),
    }
}

/// Returns the zone to start iterative resolution of a name at.
fn initial_zone(qname: &Dname) -> Dname {
    if qname.label_count() > 2 {
        if let Some(tld) = qname.iter_labels().last() {
            if FLAT_TLDS.iter().any(|flat| *flat == tld) {
                return qname.suffix(2);
            }
        }
    }
    qname.parent().unwrap_or_else(Dname::root)
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn name(s: &str) -> Dname {
        Dname::from_str(s).unwrap()
    }

    #[test]
    fn initial_zones() {
        assert_eq!(initial_zone(&name("a.b.c.example.com")), name("example.com"));
        assert_eq!(initial_zone(&name("www.example.org")), name("example.org"));
        assert_eq!(initial_zone(&name("example.com")), name("com"));
        assert_eq!(initial_zone(&name("www.example.co.uk")), name("example.co.uk"));
        assert_eq!(initial_zone(&name("a.b.example.de")), name("b.example.de"));
        assert_eq!(initial_zone(&name("com")), Dname::root());
        assert_eq!(initial_zone(&Dname::root()), Dname::root());
    }

    #[test]
    fn upstream_round_robin() {
        let servers: Vec<SocketAddr> =
            vec!["192.0.2.1:53".parse().unwrap(), "192.0.2.2:53".parse().unwrap()];
        let mut next = 0;
        let picked: Vec<_> = (0..3)
            .map(|_| match select_upstream(&servers, &mut next) {
                Selection::Server(addr) => addr,
                _ => panic!("no server"),
            })
            .collect();
        assert_eq!(picked, vec![servers[0], servers[1], servers[0]]);
        assert!(matches!(
            select_upstream(&[], &mut next),
            Selection::Fail(Status::Error)
        ));
    }
}

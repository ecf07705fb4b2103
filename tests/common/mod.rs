//! Helpers shared by the integration tests.
#![allow(dead_code)]

use dnsengine::base::iana::{Class, Rcode, Rtype};
use dnsengine::base::{Dname, Message, MessageBuilder, Question, Record};
use dnsengine::rdata::RecordData;
use dnsengine::resolv::{
    Answer, ClientId, ConnId, Reactor, Timer, TimerHandle,
};
use std::cell::RefCell;
use std::collections::HashSet;
use std::io;
use std::net::SocketAddr;
use std::rc::Rc;
use std::str::FromStr;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Setup logging of events reported by the resolver and the test suite.
///
/// Use the RUST_LOG environment variable to override the defaults.
///
/// E.g. To enable debug level logging:
///   RUST_LOG=DEBUG
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .without_time()
        .try_init()
        .ok();
}

//------------ MockReactor ---------------------------------------------------

/// A reactor recording everything the resolver asks it to do.
#[derive(Debug)]
pub struct MockReactor {
    pub now: Instant,
    pub datagrams: Vec<(SocketAddr, Vec<u8>)>,
    pub connects: Vec<(ConnId, SocketAddr)>,
    pub stream_writes: Vec<(ConnId, Vec<u8>)>,
    pub closed: Vec<ConnId>,
    pub timers: Vec<(TimerHandle, Duration, Timer)>,
    pub cancelled: HashSet<TimerHandle>,
    pub fail_connect: bool,
    next: u64,
}

impl MockReactor {
    pub fn new() -> Self {
        MockReactor {
            now: Instant::now(),
            datagrams: Vec::new(),
            connects: Vec::new(),
            stream_writes: Vec::new(),
            closed: Vec::new(),
            timers: Vec::new(),
            cancelled: HashSet::new(),
            fail_connect: false,
            next: 0,
        }
    }

    pub fn advance(&mut self, duration: Duration) {
        self.now += duration;
    }

    /// Removes and returns all datagrams sent so far.
    pub fn take_datagrams(&mut self) -> Vec<(SocketAddr, Vec<u8>)> {
        std::mem::take(&mut self.datagrams)
    }

    /// Returns the timers that have been neither cancelled nor fired.
    pub fn active_timers(&self) -> Vec<(TimerHandle, Duration, Timer)> {
        self.timers
            .iter()
            .filter(|(handle, _, _)| !self.cancelled.contains(handle))
            .copied()
            .collect()
    }

    /// Removes the most recent active query timer and returns it.
    pub fn pop_query_timer(&mut self) -> Option<(Duration, Timer)> {
        let (handle, delay, timer) = self
            .active_timers()
            .into_iter()
            .rev()
            .find(|(_, _, timer)| matches!(timer, Timer::Query { .. }))?;
        self.cancelled.insert(handle);
        Some((delay, timer))
    }

    /// Removes the active ID retry timer and returns it.
    pub fn pop_id_timer(&mut self) -> Option<Timer> {
        let (handle, _, timer) = self
            .active_timers()
            .into_iter()
            .find(|(_, _, timer)| *timer == Timer::IdRetry)?;
        self.cancelled.insert(handle);
        Some(timer)
    }
}

impl Reactor for MockReactor {
    fn now(&self) -> Instant {
        self.now
    }

    fn send_datagram(
        &mut self,
        server: SocketAddr,
        data: &[u8],
    ) -> Result<(), io::Error> {
        self.datagrams.push((server, data.into()));
        Ok(())
    }

    fn connect(&mut self, server: SocketAddr) -> Result<ConnId, io::Error> {
        if self.fail_connect {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                "refused",
            ));
        }
        self.next += 1;
        let conn = ConnId(self.next);
        self.connects.push((conn, server));
        Ok(conn)
    }

    fn send_stream(
        &mut self,
        conn: ConnId,
        data: &[u8],
    ) -> Result<(), io::Error> {
        self.stream_writes.push((conn, data.into()));
        Ok(())
    }

    fn close_stream(&mut self, conn: ConnId) {
        self.closed.push(conn)
    }

    fn set_timer(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        self.next += 1;
        let handle = TimerHandle(self.next);
        self.timers.push((handle, delay, timer));
        handle
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        self.cancelled.insert(handle);
    }
}

//------------ Notifications -------------------------------------------------

pub type Notes = Rc<RefCell<Vec<(ClientId, u64, Answer)>>>;

/// Returns a notification receiver and the list it records into.
pub fn recorder() -> (Notes, impl FnMut(ClientId, u64, &Answer)) {
    let notes = Notes::default();
    let sink = notes.clone();
    (notes, move |client, param, answer: &Answer| {
        sink.borrow_mut().push((client, param, answer.clone()))
    })
}

//------------ Messages ------------------------------------------------------

pub fn name(s: &str) -> Dname {
    Dname::from_str(s).unwrap()
}

pub fn record(owner: &str, ttl: u32, data: impl Into<RecordData>) -> Record<Dname> {
    Record::new(name(owner), Class::IN, ttl, data.into())
}

/// Returns the ID and question of a query sent by the resolver.
pub fn parse_query(data: &[u8]) -> (u16, Question<Dname>) {
    let msg = Message::from_slice(data).unwrap();
    let question = msg.first_question().unwrap().to_question();
    (msg.header().id(), question)
}

/// A response to be built for a query.
#[derive(Clone, Debug, Default)]
pub struct Response {
    pub rcode: Option<Rcode>,
    pub tc: bool,
    pub answer: Vec<Record<Dname>>,
    pub authority: Vec<Record<Dname>>,
    pub additional: Vec<Record<Dname>>,
}

impl Response {
    pub fn answer(records: Vec<Record<Dname>>) -> Self {
        Response {
            answer: records,
            ..Default::default()
        }
    }

    pub fn rcode(rcode: Rcode) -> Self {
        Response {
            rcode: Some(rcode),
            ..Default::default()
        }
    }

    pub fn referral(
        authority: Vec<Record<Dname>>,
        additional: Vec<Record<Dname>>,
    ) -> Self {
        Response {
            authority,
            additional,
            ..Default::default()
        }
    }

    /// Builds the response for the given query.
    pub fn build(&self, query: &[u8]) -> Vec<u8> {
        let (id, question) = parse_query(query);
        self.build_for(id, &question)
    }

    pub fn build_for(&self, id: u16, question: &Question<Dname>) -> Vec<u8> {
        let mut msg = MessageBuilder::new_compressed();
        msg.header_mut().set_id(id);
        msg.header_mut().set_qr(true);
        msg.header_mut().set_tc(self.tc);
        msg.header_mut().set_rcode(self.rcode.unwrap_or(Rcode::NOERROR));
        msg.push_question(question).unwrap();
        for record in &self.answer {
            msg.push_answer(record).unwrap();
        }
        for record in &self.authority {
            msg.push_authority(record).unwrap();
        }
        for record in &self.additional {
            msg.push_additional(record).unwrap();
        }
        msg.finish().unwrap()
    }
}

/// Returns the question of a query as type and name.
pub fn question_of(data: &[u8]) -> (Rtype, Dname) {
    let (_, question) = parse_query(data);
    (question.qtype(), question.qname().clone())
}

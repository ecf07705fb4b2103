//! The interface to the environment the resolver runs in.
//!
//! The resolver does not do any I/O itself. Instead, it is driven by an
//! event loop that owns the sockets and timers. The resolver asks the loop
//! to send data and to start timers through the [`Reactor`] trait. The loop
//! hands incoming data and expired timers to the resolver by calling the
//! `handle_*` methods of [`Resolver`][super::Resolver].
//!
//! Answers for questions that could not be answered right away are
//! delivered through the [`Notify`] trait.

use super::answer::Answer;
use core::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

//------------ Reactor -------------------------------------------------------

/// The event loop driving a resolver.
///
/// All methods must return immediately.
pub trait Reactor {
    /// Returns the current time.
    fn now(&self) -> Instant;

    /// Sends a datagram to a server.
    fn send_datagram(
        &mut self,
        server: SocketAddr,
        data: &[u8],
    ) -> Result<(), io::Error>;

    /// Starts opening a stream connection to a server.
    ///
    /// Data sent before the connection is established needs to be queued
    /// by the reactor.
    fn connect(&mut self, server: SocketAddr) -> Result<ConnId, io::Error>;

    /// Sends data over a stream connection.
    fn send_stream(
        &mut self,
        conn: ConnId,
        data: &[u8],
    ) -> Result<(), io::Error>;

    /// Closes a stream connection.
    ///
    /// No more events must be delivered for the connection afterwards.
    fn close_stream(&mut self, conn: ConnId);

    /// Starts a one-shot timer.
    ///
    /// When the timer expires, the reactor calls
    /// [`Resolver::handle_timer`][super::Resolver::handle_timer] with
    /// `timer`.
    fn set_timer(&mut self, delay: Duration, timer: Timer) -> TimerHandle;

    /// Cancels a timer that has not yet expired.
    fn cancel_timer(&mut self, handle: TimerHandle);
}

//------------ Notify --------------------------------------------------------

/// Receives answers for questions that were not answered right away.
pub trait Notify {
    /// Delivers the answer for a question asked by `client`.
    ///
    /// The `param` is the value given when asking the question.
    fn notify(&mut self, client: ClientId, param: u64, answer: &Answer);
}

impl<F: FnMut(ClientId, u64, &Answer)> Notify for F {
    fn notify(&mut self, client: ClientId, param: u64, answer: &Answer) {
        (self)(client, param, answer)
    }
}

//------------ ClientId ------------------------------------------------------

/// Identifies a user of the resolver.
///
/// Clients pick their identifiers themselves. The resolver uses them to
/// deliver answers and to cancel all questions of a client.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "client {}", self.0)
    }
}

//------------ ConnId --------------------------------------------------------

/// Identifies a stream connection opened by the reactor.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ConnId(pub u64);

//------------ TimerHandle ---------------------------------------------------

/// Identifies a timer started by the reactor.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct TimerHandle(pub u64);

//------------ QueryId -------------------------------------------------------

/// Identifies a query inside the resolver.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct QueryId(pub(super) u64);

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//------------ Timer ---------------------------------------------------------

/// What an expired timer means.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Timer {
    /// A query has waited too long for a response.
    ///
    /// The attempt counter allows the resolver to ignore timers for
    /// earlier attempts.
    Query { query: QueryId, attempt: u32 },

    /// Time to retry queries waiting for a transaction ID.
    IdRetry,
}

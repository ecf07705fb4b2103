//! Running a resolver atop tokio.
//!
//! The [`Driver`] owns a [`Resolver`] together with a [`TokioReactor`]
//! that performs the resolver’s I/O. It is an ordinary future that should
//! be spawned onto a runtime or awaited directly. Questions are asked
//! through a cloneable [`Handle`] from any task.
//!
//! ```no_run
//! use dnsengine::base::iana::Rtype;
//! use dnsengine::net::Driver;
//! use dnsengine::resolv::ResolvConf;
//!
//! # async fn run() -> Result<(), dnsengine::resolv::Error> {
//! let conf = ResolvConf::with_servers(vec!["192.0.2.53:53".parse().unwrap()]);
//! let (driver, handle) = Driver::new(conf).await?;
//! tokio::spawn(driver.run());
//! let answer = handle.resolve(Rtype::A, "example.com").await;
//! for addr in answer.addrs() {
//!     println!("{}", addr);
//! }
//! # Ok(())
//! # }
//! ```
#![cfg(feature = "net")]
#![cfg_attr(docsrs, doc(cfg(feature = "net")))]

pub use self::reactor::TokioReactor;

mod reactor;

use self::reactor::Event;
use crate::base::iana::Rtype;
use crate::resolv::{
    Answer, ClientId, Error, Notify, QueryFlags, QueryKey, ResolvConf,
    Resolver, Status, Target,
};
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// The client ID used for all questions asked through handles.
const CLIENT: ClientId = ClientId(0);

//------------ Driver --------------------------------------------------------

/// Runs a resolver.
pub struct Driver {
    resolver: Resolver<TokioReactor, AnswerQueue>,
    socket: Arc<UdpSocket>,
    events: mpsc::UnboundedReceiver<Event>,
    answers: mpsc::UnboundedReceiver<(u64, Answer)>,
    commands: mpsc::UnboundedReceiver<Command>,

    /// The callers waiting for an answer by their parameter.
    waiting: HashMap<u64, oneshot::Sender<Answer>>,
    next_param: u64,
}

impl Driver {
    /// Creates a new driver and a handle for it.
    ///
    /// The UDP socket is bound to an unspecified address of the family of
    /// the first configured server.
    pub async fn new(conf: ResolvConf) -> Result<(Self, Handle), Error> {
        let local = match conf.servers.first() {
            Some(SocketAddr::V6(_)) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            _ => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };
        let socket = Arc::new(UdpSocket::bind(SocketAddr::new(local, 0)).await?);
        let (event_tx, events) = mpsc::unbounded_channel();
        let (answer_tx, answers) = mpsc::unbounded_channel();
        let (command_tx, commands) = mpsc::unbounded_channel();
        let resolver = Resolver::new(
            conf,
            TokioReactor::new(socket.clone(), event_tx),
            AnswerQueue(answer_tx),
        )?;
        Ok((
            Driver {
                resolver,
                socket,
                events,
                answers,
                commands,
                waiting: HashMap::new(),
                next_param: 0,
            },
            Handle { commands: command_tx },
        ))
    }

    pub fn resolver(&self) -> &Resolver<TokioReactor, AnswerQueue> {
        &self.resolver
    }

    /// Runs the resolver until all handles are gone or shutdown is
    /// requested.
    pub async fn run(mut self) {
        let size = usize::from(self.resolver.conf().udp_payload_size);
        // One extra octet to detect oversized datagrams.
        let mut buf = vec![0u8; size + 1];
        let socket = self.socket.clone();
        loop {
            tokio::select! {
                res = socket.recv_from(&mut buf) => match res {
                    Ok((len, from)) => {
                        self.resolver.handle_datagram(from, &buf[..len])
                    }
                    Err(err) => warn!("receiving datagram failed: {}", err),
                },
                Some(event) = self.events.recv() => self.handle_event(event),
                command = self.commands.recv() => match command {
                    Some(Command::Resolve { qtype, target, reply }) => {
                        self.resolve(qtype, target, reply)
                    }
                    Some(Command::Shutdown) | None => break,
                },
            }
            self.deliver_answers();
        }
        info!("resolver stopping\n{}", self.resolver.stats());
        self.resolver.shutdown();
        // Dropping the waiting senders tells callers about the shutdown.
        self.waiting.clear();
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::StreamData(conn, data) => {
                self.resolver.handle_stream_data(conn, &data)
            }
            Event::StreamClosed(conn) => {
                self.resolver.handle_stream_closed(conn)
            }
            Event::StreamError(conn, err) => {
                self.resolver.handle_stream_error(conn, err)
            }
            Event::Timer(handle, timer) => {
                if self.resolver.reactor_mut().timer_fired(handle) {
                    self.resolver.handle_timer(timer)
                }
            }
        }
    }

    fn resolve(
        &mut self,
        qtype: Rtype,
        target: OwnedTarget,
        reply: oneshot::Sender<Answer>,
    ) {
        self.next_param += 1;
        let param = self.next_param;
        let target = match target {
            OwnedTarget::Name(ref name) => Target::Name(name.as_str()),
            OwnedTarget::Addr(addr) => Target::Addr(addr),
        };
        match self.resolver.resolve(
            qtype,
            target,
            CLIENT,
            param,
            QueryFlags::empty(),
        ) {
            Some(answer) => {
                let _ = reply.send(answer);
            }
            None => {
                debug!("question {} is pending", param);
                self.waiting.insert(param, reply);
            }
        }
    }

    fn deliver_answers(&mut self) {
        while let Ok((param, answer)) = self.answers.try_recv() {
            if let Some(reply) = self.waiting.remove(&param) {
                // The caller may have given up already.
                let _ = reply.send(answer);
            }
        }
    }
}

//------------ Handle --------------------------------------------------------

/// A handle for asking questions of a running [`Driver`].
#[derive(Clone, Debug)]
pub struct Handle {
    commands: mpsc::UnboundedSender<Command>,
}

impl Handle {
    /// Asks a question about a domain name.
    pub async fn resolve(&self, qtype: Rtype, name: &str) -> Answer {
        let gone = match name.parse() {
            Ok(name) => {
                Answer::empty(Status::Shutdown, qtype, QueryKey::Name(name))
            }
            Err(_) => Answer::bad_name(qtype, name),
        };
        self.ask(qtype, OwnedTarget::Name(name.into()), gone).await
    }

    /// Asks for the name of an address.
    pub async fn resolve_addr(&self, addr: IpAddr) -> Answer {
        let gone = Answer::empty(Status::Shutdown, Rtype::PTR, addr.into());
        self.ask(Rtype::PTR, OwnedTarget::Addr(addr), gone).await
    }

    /// Stops the driver.
    pub fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown);
    }

    /// Sends a question to the driver.
    ///
    /// Returns `gone` if the driver has stopped.
    async fn ask(
        &self,
        qtype: Rtype,
        target: OwnedTarget,
        gone: Answer,
    ) -> Answer {
        let (reply, rx) = oneshot::channel();
        let sent = self
            .commands
            .send(Command::Resolve {
                qtype,
                target,
                reply,
            })
            .is_ok();
        let answer = if sent { rx.await.ok() } else { None };
        answer.unwrap_or(gone)
    }
}

//------------ Command -------------------------------------------------------

#[derive(Debug)]
enum Command {
    Resolve {
        qtype: Rtype,
        target: OwnedTarget,
        reply: oneshot::Sender<Answer>,
    },
    Shutdown,
}

#[derive(Debug)]
enum OwnedTarget {
    Name(String),
    Addr(IpAddr),
}

//------------ AnswerQueue ---------------------------------------------------

/// Passes answers from the resolver back to the driver.
#[derive(Debug)]
pub struct AnswerQueue(mpsc::UnboundedSender<(u64, Answer)>);

impl Notify for AnswerQueue {
    fn notify(&mut self, _client: ClientId, param: u64, answer: &Answer) {
        let _ = self.0.send((param, answer.clone()));
    }
}

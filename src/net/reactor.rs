//! A reactor using tokio sockets and timers.

use crate::resolv::{ConnId, Reactor, Timer, TimerHandle};
use bytes::Bytes;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// The size of the buffer for reading from stream connections.
const READ_SIZE: usize = 4096;

//------------ Event ---------------------------------------------------------

/// Something that happened in one of the reactor’s tasks.
#[derive(Debug)]
pub(super) enum Event {
    StreamData(ConnId, Bytes),
    StreamClosed(ConnId),
    StreamError(ConnId, io::Error),
    Timer(TimerHandle, Timer),
}

//------------ TokioReactor --------------------------------------------------

/// A reactor performing I/O through tokio.
///
/// Datagrams are sent through a single shared UDP socket. Every stream
/// connection and every timer is run by a task of its own which reports
/// back through an event channel.
#[derive(Debug)]
pub struct TokioReactor {
    socket: Arc<UdpSocket>,
    events: mpsc::UnboundedSender<Event>,

    /// Write queues of the open stream connections.
    streams: HashMap<ConnId, mpsc::UnboundedSender<Vec<u8>>>,

    timers: HashMap<TimerHandle, JoinHandle<()>>,
    next_conn: u64,
    next_timer: u64,
}

impl TokioReactor {
    pub(super) fn new(
        socket: Arc<UdpSocket>,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        TokioReactor {
            socket,
            events,
            streams: HashMap::new(),
            timers: HashMap::new(),
            next_conn: 0,
            next_timer: 0,
        }
    }

    /// Forgets a timer that has fired.
    ///
    /// Returns whether the timer was still active.
    pub(super) fn timer_fired(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    /// Returns the number of timers currently armed.
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }
}

impl Reactor for TokioReactor {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }

    fn send_datagram(
        &mut self,
        server: SocketAddr,
        data: &[u8],
    ) -> Result<(), io::Error> {
        self.socket.try_send_to(data, server).map(|_| ())
    }

    fn connect(&mut self, server: SocketAddr) -> Result<ConnId, io::Error> {
        self.next_conn += 1;
        let conn = ConnId(self.next_conn);
        let (tx, rx) = mpsc::unbounded_channel();
        self.streams.insert(conn, tx);
        tokio::spawn(run_stream(conn, server, rx, self.events.clone()));
        debug!("connecting to {}", server);
        Ok(conn)
    }

    fn send_stream(
        &mut self,
        conn: ConnId,
        data: &[u8],
    ) -> Result<(), io::Error> {
        match self.streams.get(&conn) {
            Some(stream) => stream.send(data.to_vec()).map_err(|_| {
                io::Error::new(io::ErrorKind::BrokenPipe, "connection closed")
            }),
            None => Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "unknown connection",
            )),
        }
    }

    fn close_stream(&mut self, conn: ConnId) {
        // Dropping the write queue ends the task.
        self.streams.remove(&conn);
    }

    fn set_timer(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        self.next_timer += 1;
        let handle = TimerHandle(self.next_timer);
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(Event::Timer(handle, timer));
        });
        self.timers.insert(handle, task);
        handle
    }

    fn cancel_timer(&mut self, handle: TimerHandle) {
        if let Some(task) = self.timers.remove(&handle) {
            task.abort()
        }
    }
}

impl Drop for TokioReactor {
    fn drop(&mut self) {
        for (_, task) in self.timers.drain() {
            task.abort()
        }
    }
}

//------------ Stream Task ---------------------------------------------------

/// Runs a stream connection.
///
/// The task ends when the connection fails, the remote end closes it, or
/// the write queue is dropped.
async fn run_stream(
    conn: ConnId,
    server: SocketAddr,
    mut writes: mpsc::UnboundedReceiver<Vec<u8>>,
    events: mpsc::UnboundedSender<Event>,
) {
    let mut stream = match TcpStream::connect(server).await {
        Ok(stream) => stream,
        Err(err) => {
            let _ = events.send(Event::StreamError(conn, err));
            return;
        }
    };
    let mut buf = vec![0u8; READ_SIZE];
    loop {
        tokio::select! {
            res = stream.read(&mut buf) => match res {
                Ok(0) => {
                    let _ = events.send(Event::StreamClosed(conn));
                    return;
                }
                Ok(len) => {
                    trace!("read {} octets from {}", len, server);
                    let data = Bytes::copy_from_slice(&buf[..len]);
                    if events.send(Event::StreamData(conn, data)).is_err() {
                        return;
                    }
                }
                Err(err) => {
                    let _ = events.send(Event::StreamError(conn, err));
                    return;
                }
            },
            data = writes.recv() => match data {
                Some(data) => {
                    if let Err(err) = stream.write_all(&data).await {
                        let _ = events.send(Event::StreamError(conn, err));
                        return;
                    }
                }
                None => return,
            },
        }
    }
}

//! Running the resolver over real sockets on the loopback interface.
#![cfg(feature = "net")]

mod common;

use common::{init_logging, record, Response};
use dnsengine::base::iana::Rtype;
use dnsengine::base::stream_frame;
use dnsengine::net::Driver;
use dnsengine::rdata::A;
use dnsengine::resolv::{ResolvConf, Status};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, UdpSocket};

fn example_response() -> Response {
    Response::answer(vec![record(
        "example.com",
        300,
        A::from_octets(192, 0, 2, 1),
    )])
}

/// Starts a UDP server answering every query with the example response.
async fn udp_server() -> SocketAddr {
    let sock = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = sock.local_addr().unwrap();
    tokio::spawn(async move {
        let mut buf = vec![0u8; 512];
        loop {
            let (len, from) = sock.recv_from(&mut buf).await.unwrap();
            let response = example_response().build(&buf[..len]);
            sock.send_to(&response, from).await.unwrap();
        }
    });
    addr
}

/// Starts a TCP server answering one query per connection.
async fn tcp_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = listener.accept().await.unwrap();
            let len = usize::from(stream.read_u16().await.unwrap());
            let mut query = vec![0u8; len];
            stream.read_exact(&mut query).await.unwrap();
            let response =
                stream_frame(&example_response().build(&query)).unwrap();
            stream.write_all(&response).await.unwrap();
        }
    });
    addr
}

#[tokio::test]
async fn resolve_over_udp() {
    init_logging();
    let addr = udp_server().await;
    let (driver, handle) =
        Driver::new(ResolvConf::with_servers(vec![addr])).await.unwrap();
    let task = tokio::spawn(driver.run());

    let answer = handle.resolve(Rtype::A, "example.com").await;
    assert_eq!(answer.status(), Status::Ok);
    assert_eq!(
        answer.addrs().collect::<Vec<_>>(),
        vec![IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1))]
    );

    // Answered from the cache this time.
    let answer = handle.resolve(Rtype::A, "example.com").await;
    assert_eq!(answer.status(), Status::Ok);

    let answer = handle.resolve(Rtype::A, "bad..name").await;
    assert_eq!(answer.status(), Status::BadName);

    handle.shutdown();
    task.await.unwrap();
    let answer = handle.resolve(Rtype::A, "example.com").await;
    assert_eq!(answer.status(), Status::Shutdown);
}

#[tokio::test]
async fn resolve_over_tcp() {
    init_logging();
    let addr = tcp_server().await;
    let conf = ResolvConf {
        tcp_only: true,
        ..ResolvConf::with_servers(vec![addr])
    };
    let (driver, handle) = Driver::new(conf).await.unwrap();
    tokio::spawn(driver.run());

    let answer = handle.resolve(Rtype::A, "example.com").await;
    assert_eq!(answer.status(), Status::Ok);
    assert_eq!(answer.records().len(), 1);
}

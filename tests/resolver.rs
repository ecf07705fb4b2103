//! Resolver scenarios run against a scripted reactor.

mod common;

use common::{
    init_logging, name, parse_query, question_of, record, recorder,
    MockReactor, Notes, Response,
};
use dnsengine::base::iana::{Rcode, Rtype};
use dnsengine::base::{stream_frame, Message, Question};
use dnsengine::cache::{QueryKey, ResourceRecord, RootHints};
use dnsengine::rdata::{Cname, Ns, A};
use dnsengine::resolv::{
    ClientId, Error, Mode, Notify, QueryFlags, ResolvConf, Resolver, Status,
    Timer,
};
use rstest::rstest;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

fn server() -> SocketAddr {
    "192.0.2.53:53".parse().unwrap()
}

fn recursive(
    conf: ResolvConf,
) -> (Resolver<MockReactor, impl Notify>, Notes) {
    init_logging();
    let (notes, notify) = recorder();
    let resolver = Resolver::new(conf, MockReactor::new(), notify).unwrap();
    (resolver, notes)
}

fn default_resolver() -> (Resolver<MockReactor, impl Notify>, Notes) {
    recursive(ResolvConf::with_servers(vec![server()]))
}

fn iterative() -> (Resolver<MockReactor, impl Notify>, Notes) {
    init_logging();
    let (notes, notify) = recorder();
    let conf = ResolvConf {
        mode: Mode::Iterative,
        ..Default::default()
    };
    let hints = RootHints::parse(".:198.41.0.4\n").unwrap();
    let resolver =
        Resolver::with_root_hints(conf, &hints, MockReactor::new(), notify)
            .unwrap();
    (resolver, notes)
}

fn ask<N: Notify>(
    resolver: &mut Resolver<MockReactor, N>,
    qtype: Rtype,
    target: &str,
    client: u64,
) -> Option<dnsengine::resolv::Answer> {
    resolver.resolve(qtype, target, ClientId(client), client * 10, QueryFlags::empty())
}

fn example_a(ttl: u32) -> Response {
    Response::answer(vec![record(
        "example.com",
        ttl,
        A::from_octets(93, 184, 216, 34),
    )])
}

fn example_addr() -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34))
}

//------------ Recursive Mode ------------------------------------------------

#[test]
fn answer_expires_with_ttl() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());

    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, server());
    assert_eq!(question_of(&sent[0].1), (Rtype::A, name("example.com")));
    let header = Message::from_slice(&sent[0].1).unwrap().header();
    assert!(header.rd());
    assert_ne!(header.id(), 0);

    resolver.handle_datagram(server(), &example_a(300).build(&sent[0].1));
    {
        let notes = notes.borrow();
        assert_eq!(notes.len(), 1);
        let (client, param, answer) = &notes[0];
        assert_eq!(*client, ClientId(1));
        assert_eq!(*param, 10);
        assert_eq!(answer.status(), Status::Ok);
        assert_eq!(answer.records().len(), 1);
        assert_eq!(answer.addrs().collect::<Vec<_>>(), vec![example_addr()]);
    }
    assert!(resolver.reactor().active_timers().is_empty());
    assert_eq!(resolver.pending_count(), 0);

    let key = QueryKey::Name(name("example.com"));
    resolver.reactor_mut().advance(Duration::from_secs(299));
    let now = resolver.reactor().now;
    assert!(resolver.cache_mut().lookup(Rtype::A, &key, now).is_some());

    resolver.reactor_mut().advance(Duration::from_secs(2));
    let now = resolver.reactor().now;
    assert!(resolver.cache_mut().lookup(Rtype::A, &key, now).is_none());
    assert_eq!(resolver.cache().len(Rtype::A), 0);
}

#[test]
fn cached_answer_is_synchronous() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    resolver.handle_datagram(server(), &example_a(300).build(&sent[0].1));

    let answer = ask(&mut resolver, Rtype::A, "EXAMPLE.com.", 2).unwrap();
    assert_eq!(answer.status(), Status::Ok);
    assert_eq!(answer.addrs().collect::<Vec<_>>(), vec![example_addr()]);
    assert!(resolver.reactor().datagrams.is_empty());
    assert_eq!(notes.borrow().len(), 1);
    assert_eq!(resolver.stats().requests_for(Rtype::A), 2);
    assert_eq!(resolver.stats().misses_for(Rtype::A), 1);
}

#[test]
fn nxdomain_is_cached() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "nosuch.example", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    resolver.handle_datagram(
        server(),
        &Response::rcode(Rcode::NXDOMAIN).build(&sent[0].1),
    );
    {
        let notes = notes.borrow();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].2.status(), Status::NoDomain);
        assert!(notes[0].2.records().is_empty());
    }

    resolver.reactor_mut().advance(Duration::from_secs(299));
    let answer = ask(&mut resolver, Rtype::A, "nosuch.example", 2).unwrap();
    assert_eq!(answer.status(), Status::NoDomain);
    assert!(answer.records().is_empty());
    assert!(resolver.reactor().datagrams.is_empty());

    // The default negative TTL is five minutes.
    resolver.reactor_mut().advance(Duration::from_secs(2));
    assert!(ask(&mut resolver, Rtype::A, "nosuch.example", 3).is_none());
    assert_eq!(resolver.reactor().datagrams.len(), 1);
}

#[test]
fn empty_answer_is_no_domain() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::MX, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    resolver.handle_datagram(server(), &Response::default().build(&sent[0].1));
    assert_eq!(notes.borrow()[0].2.status(), Status::NoDomain);
    assert_eq!(
        ask(&mut resolver, Rtype::MX, "example.com", 2).map(|a| a.status()),
        Some(Status::NoDomain)
    );
}

#[test]
fn duplicate_questions_share_a_query() {
    let (mut resolver, notes) = default_resolver();
    for client in 1..=3 {
        assert!(ask(&mut resolver, Rtype::A, "example.com", client).is_none());
    }
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(resolver.pending_count(), 1);

    resolver.handle_datagram(server(), &example_a(300).build(&sent[0].1));
    let notes = notes.borrow();
    assert_eq!(notes.len(), 3);
    for (i, (client, param, answer)) in notes.iter().enumerate() {
        let expected = i as u64 + 1;
        assert_eq!(*client, ClientId(expected));
        assert_eq!(*param, expected * 10);
        assert_eq!(*answer, notes[0].2);
    }
    assert_eq!(resolver.stats().udp_sent, 1);
    assert_eq!(resolver.stats().udp_received, 1);
}

#[test]
fn cname_chain() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "www.example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    let response = Response::answer(vec![
        record("www.example.com", 300, Cname::new(name("example.com"))),
        record("example.com", 300, A::from_octets(93, 184, 216, 34)),
    ]);
    resolver.handle_datagram(server(), &response.build(&sent[0].1));
    {
        let notes = notes.borrow();
        let answer = &notes[0].2;
        assert_eq!(answer.status(), Status::Ok);
        assert_eq!(answer.records().len(), 2);
        assert_eq!(answer.iter_answers().count(), 1);
    }

    // Both the alias and the target are answered from the cache now.
    let answer = ask(&mut resolver, Rtype::A, "www.example.com", 2).unwrap();
    assert_eq!(answer.addrs().collect::<Vec<_>>(), vec![example_addr()]);
    let answer = ask(&mut resolver, Rtype::A, "example.com", 2).unwrap();
    assert_eq!(answer.records().len(), 1);
    assert!(resolver.reactor().datagrams.is_empty());
}

#[test]
fn reverse_lookup() {
    let (mut resolver, notes) = default_resolver();
    let addr = IpAddr::V4(Ipv4Addr::new(192, 0, 2, 1));
    assert!(resolver
        .resolve(Rtype::PTR, addr, ClientId(1), 0, QueryFlags::empty())
        .is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(
        question_of(&sent[0].1),
        (Rtype::PTR, name("1.2.0.192.in-addr.arpa"))
    );
    let response = Response::answer(vec![record(
        "1.2.0.192.in-addr.arpa",
        300,
        dnsengine::rdata::Ptr::new(name("host.example.com")),
    )]);
    resolver.handle_datagram(server(), &response.build(&sent[0].1));
    assert_eq!(notes.borrow()[0].2.addr(), Some(addr));

    let answer = resolver
        .resolve(Rtype::PTR, addr, ClientId(2), 0, QueryFlags::empty())
        .unwrap();
    assert_eq!(answer.status(), Status::Ok);
}

//------------ Transaction IDs -----------------------------------------------

#[test]
fn colliding_ids_are_deferred() {
    let (mut resolver, notes) = default_resolver();
    resolver.set_id_generator(|| 42);

    assert!(ask(&mut resolver, Rtype::A, "a.example", 1).is_none());
    assert!(ask(&mut resolver, Rtype::A, "b.example", 2).is_none());
    let first = resolver.reactor_mut().take_datagrams();
    assert_eq!(first.len(), 1);
    assert_eq!(parse_query(&first[0].1).0, 42);
    assert_eq!(resolver.stats().id_collisions, 1);

    // Still in use: nothing is sent, the retry timer is armed again.
    let timer = resolver.reactor_mut().pop_id_timer().unwrap();
    resolver.handle_timer(timer);
    assert!(resolver.reactor().datagrams.is_empty());

    let response = Response::answer(vec![record(
        "a.example",
        60,
        A::from_octets(192, 0, 2, 1),
    )]);
    resolver.handle_datagram(server(), &response.build(&first[0].1));
    assert_eq!(notes.borrow().len(), 1);

    let timer = resolver.reactor_mut().pop_id_timer().unwrap();
    resolver.handle_timer(timer);
    let second = resolver.reactor_mut().take_datagrams();
    assert_eq!(second.len(), 1);
    let (id, question) = parse_query(&second[0].1);
    assert_eq!(id, 42);
    assert_eq!(*question.qname(), name("b.example"));
    assert!(resolver.reactor_mut().pop_id_timer().is_none());

    let response = Response::answer(vec![record(
        "b.example",
        60,
        A::from_octets(192, 0, 2, 2),
    )]);
    resolver.handle_datagram(server(), &response.build(&second[0].1));
    let notes = notes.borrow();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[1].0, ClientId(2));
    assert_eq!(notes[1].2.status(), Status::Ok);
}

//------------ Failures and Retries ------------------------------------------

#[test]
fn timeouts_back_off() {
    let other: SocketAddr = "192.0.2.54:53".parse().unwrap();
    let (mut resolver, notes) =
        recursive(ResolvConf::with_servers(vec![server(), other]));
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());

    let mut delays = Vec::new();
    while let Some((delay, timer)) = resolver.reactor_mut().pop_query_timer() {
        delays.push(delay);
        resolver.handle_timer(timer);
    }
    assert_eq!(
        delays,
        vec![
            Duration::from_secs(2),
            Duration::from_secs(3),
            Duration::from_secs(4)
        ]
    );
    let servers: Vec<_> = resolver
        .reactor()
        .datagrams
        .iter()
        .map(|(addr, _)| *addr)
        .collect();
    assert_eq!(servers, vec![server(), other, server()]);

    let notes = notes.borrow();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].2.status(), Status::Timeout);
    assert_eq!(resolver.stats().retries, 2);
    assert_eq!(resolver.pending_count(), 0);
}

#[test]
fn stale_timer_is_ignored() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let (_, _, timer) = resolver.reactor().active_timers()[0];
    let sent = resolver.reactor_mut().take_datagrams();
    resolver.handle_datagram(server(), &example_a(300).build(&sent[0].1));
    resolver.handle_timer(timer);
    assert_eq!(notes.borrow().len(), 1);
    assert!(resolver.reactor().datagrams.is_empty());
}

#[test]
fn mismatched_response_is_retried() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    let (id, _) = parse_query(&sent[0].1);
    let wrong = example_a(300)
        .build_for(id, &Question::new_in(name("example.org"), Rtype::A));
    resolver.handle_datagram(server(), &wrong);
    assert!(notes.borrow().is_empty());
    assert_eq!(resolver.stats().bad_responses, 1);

    let retry = resolver.reactor_mut().take_datagrams();
    assert_eq!(retry.len(), 1);
    resolver.handle_datagram(server(), &example_a(300).build(&retry[0].1));
    assert_eq!(notes.borrow()[0].2.status(), Status::Ok);
}

#[test]
fn garbage_response_fails_eventually() {
    let (mut resolver, notes) = recursive(ResolvConf {
        retries: 0,
        ..ResolvConf::with_servers(vec![server()])
    });
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    let mut response = example_a(300).build(&sent[0].1);
    response.truncate(20);
    resolver.handle_datagram(server(), &response);
    assert_eq!(notes.borrow()[0].2.status(), Status::BadResponse);
}

#[test]
fn response_from_elsewhere_is_dropped() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    let response = example_a(300).build(&sent[0].1);

    resolver.handle_datagram("198.51.100.1:53".parse().unwrap(), &response);
    assert!(notes.borrow().is_empty());
    assert_eq!(resolver.stats().unexpected, 1);
    assert!(resolver.reactor().datagrams.is_empty());

    resolver.handle_datagram(server(), &response);
    assert_eq!(notes.borrow().len(), 1);
}

#[test]
fn oversized_datagram_is_dropped() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    let mut response = example_a(300).build(&sent[0].1);
    response.resize(600, 0);
    resolver.handle_datagram(server(), &response);
    assert!(notes.borrow().is_empty());
    assert_eq!(resolver.stats().unexpected, 1);
}

#[rstest]
#[case(Rcode::SERVFAIL)]
#[case(Rcode::REFUSED)]
#[case(Rcode::FORMERR)]
#[case(Rcode::NOTIMP)]
fn server_failure_is_retried(#[case] rcode: Rcode) {
    let (mut resolver, notes) = recursive(ResolvConf {
        retries: 1,
        ..ResolvConf::with_servers(vec![server()])
    });
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    for _ in 0..2 {
        let sent = resolver.reactor_mut().take_datagrams();
        assert_eq!(sent.len(), 1);
        let response = Response::rcode(rcode).build(&sent[0].1);
        resolver.handle_datagram(server(), &response);
    }
    let notes = notes.borrow();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].2.status(), Status::Error);
}

//------------ TCP -----------------------------------------------------------

#[test]
fn truncated_response_switches_to_tcp() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    let truncated = Response {
        tc: true,
        ..Default::default()
    };
    resolver.handle_datagram(server(), &truncated.build(&sent[0].1));
    assert!(notes.borrow().is_empty());
    assert_eq!(resolver.stats().truncated, 1);

    let (conn, addr) = resolver.reactor().connects[0];
    assert_eq!(addr, server());
    let (write_conn, data) = resolver.reactor().stream_writes[0].clone();
    assert_eq!(write_conn, conn);
    assert_eq!(usize::from(u16::from_be_bytes([data[0], data[1]])), data.len() - 2);
    assert_eq!(question_of(&data[2..]), (Rtype::A, name("example.com")));

    // Deliver the response in two pieces.
    let response = stream_frame(&example_a(300).build(&data[2..])).unwrap();
    let (head, tail) = response.split_at(7);
    resolver.handle_stream_data(conn, head);
    assert!(notes.borrow().is_empty());
    resolver.handle_stream_data(conn, tail);

    let notes = notes.borrow();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].2.addrs().collect::<Vec<_>>(), vec![example_addr()]);
    assert_eq!(resolver.stats().tcp_sent, 1);
    assert_eq!(resolver.stats().tcp_received, 1);
    assert_eq!(resolver.reactor().closed, vec![conn]);
}

#[test]
fn tcp_only() {
    let (mut resolver, notes) = recursive(ResolvConf {
        tcp_only: true,
        ..ResolvConf::with_servers(vec![server()])
    });
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    assert!(resolver.reactor().datagrams.is_empty());
    let (conn, _) = resolver.reactor().connects[0];
    resolver.handle_stream_error(
        conn,
        std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
    );
    assert_eq!(notes.borrow()[0].2.status(), Status::Error);
    assert_eq!(resolver.pending_count(), 0);
}

#[test]
fn closed_connection_fails() {
    let (mut resolver, notes) = recursive(ResolvConf {
        tcp_only: true,
        ..ResolvConf::with_servers(vec![server()])
    });
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let (conn, _) = resolver.reactor().connects[0];
    resolver.handle_stream_closed(conn);
    assert_eq!(notes.borrow()[0].2.status(), Status::Error);
}

#[test]
fn refused_connection_fails_immediately() {
    let (mut resolver, notes) = recursive(ResolvConf {
        tcp_only: true,
        ..ResolvConf::with_servers(vec![server()])
    });
    resolver.reactor_mut().fail_connect = true;
    let answer = ask(&mut resolver, Rtype::A, "example.com", 1).unwrap();
    assert_eq!(answer.status(), Status::Error);
    assert!(notes.borrow().is_empty());
}

//------------ Questions Answered Locally ------------------------------------

#[rstest]
#[case("")]
#[case("a..b")]
#[case("this-label-is-far-too-long-for-the-dns-because-it-has-more-than-63-octets.com")]
fn bad_names(#[case] qname: &str) {
    let (mut resolver, notes) = default_resolver();
    let answer = ask(&mut resolver, Rtype::A, qname, 1).unwrap();
    assert_eq!(answer.status(), Status::BadName);
    assert!(answer.key().is_none());
    assert_eq!(answer.input(), Some(qname));
    assert!(resolver.reactor().datagrams.is_empty());
    assert!(notes.borrow().is_empty());
}

#[test]
fn address_needs_ptr() {
    let (mut resolver, _) = default_resolver();
    let answer = resolver
        .resolve(
            Rtype::A,
            IpAddr::V4(Ipv4Addr::LOCALHOST),
            ClientId(1),
            0,
            QueryFlags::empty(),
        )
        .unwrap();
    assert_eq!(answer.status(), Status::BadName);
    assert_eq!(answer.input(), Some("127.0.0.1"));
}

#[test]
fn no_query_flag() {
    let (mut resolver, _) = default_resolver();
    let answer = resolver
        .resolve(
            Rtype::A,
            "example.com",
            ClientId(1),
            0,
            QueryFlags::NO_QUERY,
        )
        .unwrap();
    assert_eq!(answer.status(), Status::NotCached);
    assert!(resolver.reactor().datagrams.is_empty());
    assert_eq!(resolver.stats().misses_for(Rtype::A), 1);
}

#[test]
fn unsupported_type() {
    let (mut resolver, _) = default_resolver();
    let answer = ask(&mut resolver, Rtype::from_int(255), "example.com", 1);
    assert_eq!(answer.map(|a| a.status()), Some(Status::Error));
}

//------------ Cancel and Shutdown -------------------------------------------

#[test]
fn cancelled_client_is_not_notified() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    assert!(ask(&mut resolver, Rtype::A, "example.com", 2).is_none());
    resolver.cancel(ClientId(1));

    let sent = resolver.reactor_mut().take_datagrams();
    resolver.handle_datagram(server(), &example_a(300).build(&sent[0].1));
    let notes = notes.borrow();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].0, ClientId(2));
}

#[test]
fn cancelled_query_still_caches() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    resolver.cancel(ClientId(1));
    let sent = resolver.reactor_mut().take_datagrams();
    resolver.handle_datagram(server(), &example_a(300).build(&sent[0].1));
    assert!(notes.borrow().is_empty());
    let answer = ask(&mut resolver, Rtype::A, "example.com", 1).unwrap();
    assert_eq!(answer.status(), Status::Ok);
}

#[test]
fn shutdown_drops_everything() {
    let (mut resolver, notes) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    resolver.shutdown();
    assert!(resolver.is_shut_down());
    assert!(resolver.reactor().active_timers().is_empty());
    assert_eq!(resolver.pending_count(), 0);

    resolver.handle_datagram(server(), &example_a(300).build(&sent[0].1));
    assert!(notes.borrow().is_empty());
    let answer = ask(&mut resolver, Rtype::A, "example.com", 2).unwrap();
    assert_eq!(answer.status(), Status::Shutdown);
}

//------------ Setup ---------------------------------------------------------

#[test]
fn recursive_needs_servers() {
    let (_, notify) = recorder();
    let err = Resolver::new(ResolvConf::default(), MockReactor::new(), notify)
        .unwrap_err();
    assert!(matches!(err, Error::NoServers));
}

#[test]
fn iterative_needs_roots() {
    let (_, notify) = recorder();
    let conf = ResolvConf {
        mode: Mode::Iterative,
        ..Default::default()
    };
    let err = Resolver::new(conf, MockReactor::new(), notify).unwrap_err();
    assert!(matches!(err, Error::NoRootServers));
}

#[test]
fn missing_hints_file() {
    let (_, notify) = recorder();
    let conf = ResolvConf {
        mode: Mode::Iterative,
        root_hints: Some("/nonexistent/root.hints".into()),
        ..ResolvConf::with_servers(vec![server()])
    };
    let err = Resolver::new(conf, MockReactor::new(), notify).unwrap_err();
    assert!(matches!(err, Error::Hints(_)));
}

#[test]
fn bootstrap_asks_configured_server() {
    let (_, notify) = recorder();
    let conf = ResolvConf {
        mode: Mode::Iterative,
        ..ResolvConf::with_servers(vec![server()])
    };
    let resolver = Resolver::new(conf, MockReactor::new(), notify).unwrap();
    let sent = &resolver.reactor().datagrams;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, server());
    assert_eq!(question_of(&sent[0].1), (Rtype::NS, name(".")));
    assert!(Message::from_slice(&sent[0].1).unwrap().header().rd());
}

#[test]
fn auto_hints_ask_configured_server() {
    let (_, notify) = recorder();
    let conf = ResolvConf {
        mode: Mode::Iterative,
        ..ResolvConf::with_servers(vec![server()])
    };
    let hints = RootHints::parse(".:198.41.0.4:AUTO\n").unwrap();
    let resolver =
        Resolver::with_root_hints(conf, &hints, MockReactor::new(), notify)
            .unwrap();
    let sent = &resolver.reactor().datagrams;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, server());
    assert_eq!(question_of(&sent[0].1), (Rtype::NS, name(".")));
    assert!(Message::from_slice(&sent[0].1).unwrap().header().rd());
}

#[test]
fn auto_hints_need_servers() {
    let (_, notify) = recorder();
    let conf = ResolvConf {
        mode: Mode::Iterative,
        ..Default::default()
    };
    let hints = RootHints::parse(".:198.41.0.4:AUTO\n").unwrap();
    let err =
        Resolver::with_root_hints(conf, &hints, MockReactor::new(), notify)
            .unwrap_err();
    assert!(matches!(err, Error::NoServers));
}

//------------ Iterative Mode ------------------------------------------------

#[test]
fn iterative_walks_down_from_root() {
    let (mut resolver, notes) = iterative();
    assert!(ask(&mut resolver, Rtype::NS, "sub.example.com", 1).is_none());

    // The root server is asked about com.
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "198.41.0.4:53".parse::<SocketAddr>().unwrap());
    assert_eq!(question_of(&sent[0].1), (Rtype::NS, name("com")));
    assert!(!Message::from_slice(&sent[0].1).unwrap().header().rd());
    let response = Response::referral(
        vec![record("com", 172800, Ns::new(name("a.gtld-servers.net")))],
        vec![record("a.gtld-servers.net", 172800, A::from_octets(192, 5, 6, 30))],
    );
    resolver.handle_datagram(sent[0].0, &response.build(&sent[0].1));

    // The com server is asked about example.com.
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "192.5.6.30:53".parse::<SocketAddr>().unwrap());
    assert_eq!(question_of(&sent[0].1), (Rtype::NS, name("example.com")));
    let response = Response::referral(
        vec![record("example.com", 172800, Ns::new(name("ns1.example.com")))],
        vec![record("ns1.example.com", 172800, A::from_octets(192, 0, 2, 10))],
    );
    resolver.handle_datagram(sent[0].0, &response.build(&sent[0].1));

    // The example.com server is asked about sub.example.com.
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "192.0.2.10:53".parse::<SocketAddr>().unwrap());
    assert_eq!(question_of(&sent[0].1), (Rtype::NS, name("sub.example.com")));
    let response = Response::referral(
        vec![record("sub.example.com", 3600, Ns::new(name("ns.sub.example.com")))],
        vec![record("ns.sub.example.com", 3600, A::from_octets(192, 0, 2, 20))],
    );
    resolver.handle_datagram(sent[0].0, &response.build(&sent[0].1));

    let notes = notes.borrow();
    assert_eq!(notes.len(), 1);
    let answer = &notes[0].2;
    assert_eq!(answer.status(), Status::Ok);
    let targets: Vec<_> = answer
        .records()
        .iter()
        .filter_map(|rr| rr.data()?.target_name().cloned())
        .collect();
    assert_eq!(targets, vec![name("ns.sub.example.com")]);

    let now = resolver.reactor().now;
    for zone in ["com", "example.com"] {
        let key = QueryKey::Name(name(zone));
        assert!(resolver.cache_mut().lookup(Rtype::NS, &key, now).is_some());
    }
    assert_eq!(resolver.stats().udp_sent, 3);
    assert_eq!(resolver.pending_count(), 0);
}

#[test]
fn iterative_follows_referrals() {
    let (mut resolver, notes) = iterative();
    let now = resolver.reactor().now;
    resolver.cache_mut().store_records(
        &[
            ResourceRecord::new(
                name("example.com"),
                now + Duration::from_secs(3600),
                Ns::new(name("ns1.example.com")).into(),
            ),
            ResourceRecord::new(
                name("ns1.example.com"),
                now + Duration::from_secs(3600),
                A::from_octets(192, 0, 2, 10).into(),
            ),
        ],
        now,
    );
    assert!(ask(&mut resolver, Rtype::A, "www.sub.example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent[0].0, "192.0.2.10:53".parse::<SocketAddr>().unwrap());

    let response = Response::referral(
        vec![record("sub.example.com", 3600, Ns::new(name("ns.sub.example.com")))],
        vec![record("ns.sub.example.com", 3600, A::from_octets(192, 0, 2, 20))],
    );
    resolver.handle_datagram(sent[0].0, &response.build(&sent[0].1));

    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "192.0.2.20:53".parse::<SocketAddr>().unwrap());
    assert_eq!(question_of(&sent[0].1), (Rtype::A, name("www.sub.example.com")));
    let response = Response::answer(vec![record(
        "www.sub.example.com",
        300,
        A::from_octets(192, 0, 2, 80),
    )]);
    resolver.handle_datagram(sent[0].0, &response.build(&sent[0].1));
    assert_eq!(notes.borrow()[0].2.status(), Status::Ok);
}

#[test]
fn iterative_follows_aliases() {
    let (mut resolver, notes) = iterative();
    let now = resolver.reactor().now;
    let expires = now + Duration::from_secs(3600);
    resolver.cache_mut().store_records(
        &[
            ResourceRecord::new(
                name("example.com"),
                expires,
                Ns::new(name("ns1.example.com")).into(),
            ),
            ResourceRecord::new(
                name("ns1.example.com"),
                expires,
                A::from_octets(192, 0, 2, 10).into(),
            ),
            ResourceRecord::new(
                name("example.net"),
                expires,
                Ns::new(name("ns1.example.net")).into(),
            ),
            ResourceRecord::new(
                name("ns1.example.net"),
                expires,
                A::from_octets(198, 51, 100, 10).into(),
            ),
        ],
        now,
    );
    assert!(ask(&mut resolver, Rtype::A, "www.example.com", 1).is_none());
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "192.0.2.10:53".parse::<SocketAddr>().unwrap());
    let response = Response::answer(vec![record(
        "www.example.com",
        300,
        Cname::new(name("cdn.example.net")),
    )]);
    resolver.handle_datagram(sent[0].0, &response.build(&sent[0].1));

    // The alias target is asked of its own name server.
    assert!(notes.borrow().is_empty());
    let sent = resolver.reactor_mut().take_datagrams();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "198.51.100.10:53".parse::<SocketAddr>().unwrap());
    assert_eq!(question_of(&sent[0].1), (Rtype::A, name("cdn.example.net")));
    let response = Response::answer(vec![record(
        "cdn.example.net",
        300,
        A::from_octets(198, 51, 100, 80),
    )]);
    resolver.handle_datagram(sent[0].0, &response.build(&sent[0].1));

    let cdn = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 80));
    {
        let notes = notes.borrow();
        assert_eq!(notes.len(), 1);
        let answer = &notes[0].2;
        assert_eq!(answer.status(), Status::Ok);
        assert_eq!(answer.name(), Some(&name("www.example.com")));
        assert_eq!(answer.records().len(), 2);
        assert_eq!(answer.records()[0].rtype(), Rtype::CNAME);
        assert_eq!(answer.addrs().collect::<Vec<_>>(), vec![cdn]);
    }

    // Asking again is answered from the cache.
    let answer = ask(&mut resolver, Rtype::A, "www.example.com", 2).unwrap();
    assert_eq!(answer.addrs().collect::<Vec<_>>(), vec![cdn]);
    assert!(resolver.reactor().datagrams.is_empty());
    assert_eq!(resolver.pending_count(), 0);
}

#[test]
fn circular_delegation_is_a_deadlock() {
    let (mut resolver, notes) = iterative();
    let now = resolver.reactor().now;
    let expires = now + Duration::from_secs(3600);
    resolver.cache_mut().store_records(
        &[
            ResourceRecord::new(
                name("a.org"),
                expires,
                Ns::new(name("ns.b.org")).into(),
            ),
            ResourceRecord::new(
                name("b.org"),
                expires,
                Ns::new(name("ns.a.org")).into(),
            ),
        ],
        now,
    );
    let answer = ask(&mut resolver, Rtype::A, "www.a.org", 1).unwrap();
    assert_eq!(answer.status(), Status::Deadlock);
    assert!(resolver.reactor().datagrams.is_empty());
    assert!(notes.borrow().is_empty());
    assert_eq!(resolver.stats().deadlocks, 1);
    assert_eq!(resolver.pending_count(), 0);
}

#[test]
fn reload_keeps_roots_on_error() {
    let (_, notify) = recorder();
    let conf = ResolvConf {
        mode: Mode::Iterative,
        root_hints: Some("/nonexistent/root.hints".into()),
        ..Default::default()
    };
    let hints = RootHints::parse(".:198.41.0.4\n").unwrap();
    let mut resolver = Resolver::with_root_hints(
        conf,
        &hints,
        MockReactor::new(),
        notify,
    )
    .unwrap();

    // The file is missing but the hints loaded before are still there.
    resolver.reload_roots().unwrap();
    assert!(resolver.reactor().datagrams.is_empty());
    let now = resolver.reactor().now;
    assert!(resolver.cache_mut().has_root_servers(now));
}

#[test]
fn root_timer_kind() {
    let (mut resolver, _) = default_resolver();
    assert!(ask(&mut resolver, Rtype::A, "example.com", 1).is_none());
    let timers = resolver.reactor().active_timers();
    assert_eq!(timers.len(), 1);
    assert!(matches!(timers[0].2, Timer::Query { attempt: 1, .. }));
}

//! Looks up names or addresses using a running resolver.
//!
//! Usage: lookup [+tcp] [@server] <name-or-address> [type]
use dnsengine::base::iana::Rtype;
use dnsengine::net::Driver;
use dnsengine::resolv::{Answer, ResolvConf};
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::process::exit;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

fn parse_server(arg: &str) -> Option<SocketAddr> {
    if let Ok(addr) = SocketAddr::from_str(arg) {
        return Some(addr);
    }
    IpAddr::from_str(arg).ok().map(|addr| SocketAddr::new(addr, 53))
}

fn print_answer(answer: &Answer) {
    if !answer.is_ok() {
        println!("Error: {}", answer.status());
        return;
    }
    for record in answer.records() {
        println!("{}", record);
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut server = SocketAddr::from(([127, 0, 0, 1], 53));
    let mut tcp_only = false;
    let mut args = Vec::new();
    for arg in env::args().skip(1) {
        if arg == "+tcp" {
            tcp_only = true;
        } else if let Some(addr) = arg.strip_prefix('@') {
            match parse_server(addr) {
                Some(addr) => server = addr,
                None => {
                    println!("Not a server address: {}", addr);
                    exit(1);
                }
            }
        } else if arg.starts_with('+') {
            println!("Warning: ignoring unknown query option {}", arg);
        } else {
            args.push(arg)
        }
    }
    let (target, qtype) = match args.as_slice() {
        [target] => (target.as_str(), None),
        [target, qtype] => (target.as_str(), Some(qtype.as_str())),
        _ => {
            println!("Usage: lookup [+tcp] [@server] <name> [type]");
            exit(1);
        }
    };
    let qtype = match qtype {
        Some(qtype) => match Rtype::from_mnemonic(qtype.as_bytes()) {
            Some(qtype) => qtype,
            None => {
                println!("Unknown record type {}", qtype);
                exit(1);
            }
        },
        None => Rtype::A,
    };

    let conf = ResolvConf {
        tcp_only,
        ..ResolvConf::with_servers(vec![server])
    };
    let (driver, handle) = match Driver::new(conf).await {
        Ok(some) => some,
        Err(err) => {
            println!("Error: {}", err);
            exit(1);
        }
    };
    let task = tokio::spawn(driver.run());

    let answer = match IpAddr::from_str(target) {
        Ok(addr) => handle.resolve_addr(addr).await,
        Err(_) => handle.resolve(qtype, target).await,
    };
    print_answer(&answer);

    handle.shutdown();
    let _ = task.await;
}

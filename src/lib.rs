//! An event-driven DNS resolver engine.
//!
//! This crate provides the building blocks of a caching DNS resolver that
//! is driven entirely by external events. It does not own any sockets or
//! timers. Instead, it asks a reactor to send messages and arm timers and
//! is told by the reactor whenever something has happened. This makes it
//! easy to embed the resolver into any event loop and to test it without
//! a network.
//!
//! # Modules
//!
//! * [base] contains the fundamental types for DNS data and the wire
//!   format codec for DNS messages,
//! * [rdata] contains the record data of the supported record types,
//! * [cache] contains the record cache with expiry, negative caching, and
//!   watermark based pruning, as well as root hints,
//! * [resolv] contains the resolver itself, and
//! * [utils] contains helpers for configuration.
//!
#![cfg_attr(feature = "net", doc = "* [net]:")]
#![cfg_attr(not(feature = "net"), doc = "* net:")]
//!   A driver running a resolver atop the
//!   [Tokio](https://tokio.rs/) async runtime.
//!
//! # Reference of Feature Flags
//!
//! * `net`: Enables the tokio based driver in the
#![cfg_attr(feature = "net", doc = "  [net]")]
#![cfg_attr(not(feature = "net"), doc = "  net")]
//!   module.
//! * `serde`: Enables deserializing the resolver configuration via
//!   [serde](https://serde.rs/).

#![allow(renamed_and_removed_lints)]
#![allow(clippy::unknown_clippy_lints)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base;
pub mod cache;
#[cfg(feature = "net")]
#[cfg_attr(docsrs, doc(cfg(feature = "net")))]
pub mod net;
pub mod rdata;
pub mod resolv;
pub mod utils;

//! Resolver configuration.
//!
//! The configuration is a plain struct with public fields. Start with
//! `ResolvConf::default()`, change what you need, and hand it to the
//! resolver. The resolver calls [`finalize`][ResolvConf::finalize] which
//! forces every value into its permitted range.
//!
//! With the `serde` feature, the configuration can be deserialized from
//! any format serde supports. Missing fields take their default value.

use crate::cache::{CacheConf, ListExpiry, Watermarks};
use crate::utils::config::DefMinMax;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

//------------ Configuration Constants ---------------------------------------

/// Limits for the number of times a query is retried.
const RETRIES: DefMinMax<u8> = DefMinMax::new(2, 0, 10);

/// Limits for the time to wait for the first response.
const TIMEOUT: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(2),
    Duration::from_millis(10),
    Duration::from_secs(60),
);

/// Limits for the time added to the timeout with every retry.
const BACKOFF_STEP: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_secs(1),
    Duration::ZERO,
    Duration::from_secs(30),
);

/// Limits for the largest UDP response accepted.
///
/// RFC 1035 limits UDP messages to 512 octets. Because we are forgiving
/// towards servers that send a bit more, the default is a little larger.
const UDP_PAYLOAD_SIZE: DefMinMax<u16> = DefMinMax::new(576, 512, 4096);

/// Limits for the interval of retrying queries waiting for an ID.
const ID_RETRY_INTERVAL: DefMinMax<Duration> = DefMinMax::new(
    Duration::from_millis(100),
    Duration::from_millis(1),
    Duration::from_secs(10),
);

/// Limits for the number of referrals a query follows.
const MAX_STEPS: DefMinMax<u8> = DefMinMax::new(16, 1, 64);

//------------ Mode ----------------------------------------------------------

/// How questions are resolved.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// Ask the configured servers which resolve questions for us.
    #[default]
    Recursive,

    /// Walk the delegation tree starting at the root ourselves.
    Iterative,
}

//------------ ResolvConf ----------------------------------------------------

/// Resolver configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolvConf {
    pub mode: Mode,

    /// The servers to ask.
    ///
    /// In recursive mode, questions are sent to these servers in turn. In
    /// iterative mode, they are used to learn the root name servers if
    /// `auto_bootstrap` is enabled.
    pub servers: Vec<SocketAddr>,

    /// The watermarks of the cache stores.
    pub watermarks: Watermarks,

    /// What happens to lists of records when some of them expire.
    pub list_expiry: ListExpiry,

    /// How long a non-existing name is remembered.
    pub negative_ttl: Duration,

    /// The minimum time records are kept.
    pub min_ttl: Duration,

    /// How often a query is sent again when no response arrives.
    pub retries: u8,

    /// How long to wait for the first response.
    pub timeout: Duration,

    /// How much longer to wait with each retry.
    pub backoff_step: Duration,

    /// Always use TCP.
    pub tcp_only: bool,

    /// The largest UDP response accepted.
    pub udp_payload_size: u16,

    /// A file with root hints.
    pub root_hints: Option<PathBuf>,

    /// Learn the root name servers by asking `servers`.
    pub auto_bootstrap: bool,

    /// How often queries waiting for a transaction ID are retried.
    pub id_retry_interval: Duration,

    /// The number of referrals a query may follow.
    pub max_steps: u8,
}

impl ResolvConf {
    /// Creates a new configuration using the given servers.
    pub fn with_servers(servers: Vec<SocketAddr>) -> Self {
        ResolvConf {
            servers,
            ..Default::default()
        }
    }

    /// Finalizes the configuration for actual use.
    ///
    /// All values are trimmed to their permitted range.
    pub fn finalize(&mut self) {
        self.retries = RETRIES.limit("retries", self.retries);
        self.timeout = TIMEOUT.limit("timeout", self.timeout);
        self.backoff_step =
            BACKOFF_STEP.limit("backoff_step", self.backoff_step);
        self.udp_payload_size =
            UDP_PAYLOAD_SIZE.limit("udp_payload_size", self.udp_payload_size);
        self.id_retry_interval =
            ID_RETRY_INTERVAL.limit("id_retry_interval", self.id_retry_interval);
        self.max_steps = MAX_STEPS.limit("max_steps", self.max_steps);
        self.watermarks.finalize();
    }

    /// Returns the timeout for the given retry.
    ///
    /// The first attempt is retry zero.
    pub fn timeout_for(&self, retry: u8) -> Duration {
        self.timeout + self.backoff_step * u32::from(retry)
    }

    /// Returns the configuration for the record cache.
    pub fn cache_conf(&self) -> CacheConf {
        let mut res = CacheConf {
            watermarks: self.watermarks.clone(),
            list_expiry: self.list_expiry,
            negative_ttl: self.negative_ttl,
            min_ttl: self.min_ttl,
        };
        res.finalize();
        res
    }
}

impl Default for ResolvConf {
    fn default() -> Self {
        let cache = CacheConf::default();
        ResolvConf {
            mode: Mode::default(),
            servers: Vec::new(),
            watermarks: cache.watermarks,
            list_expiry: cache.list_expiry,
            negative_ttl: cache.negative_ttl,
            min_ttl: cache.min_ttl,
            retries: RETRIES.default(),
            timeout: TIMEOUT.default(),
            backoff_step: BACKOFF_STEP.default(),
            tcp_only: false,
            udp_payload_size: UDP_PAYLOAD_SIZE.default(),
            root_hints: None,
            auto_bootstrap: true,
            id_retry_interval: ID_RETRY_INTERVAL.default(),
            max_steps: MAX_STEPS.default(),
        }
    }
}

//============ Testing =======================================================

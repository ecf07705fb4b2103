//! Root hints.
//!
//! A hints file tells the resolver where to start iterative resolution.
//! Each line has the form
//!
//! ```text
//! domain:nameserver[:AUTO|MANUAL]
//! ```
//!
//! where `domain` is the domain a delegation starts at, normally the root
//! `.`, and `nameserver` is the IPv4 or IPv6 address of a server. For a
//! `MANUAL` entry, the address is used as a name server for the domain
//! directly. For an `AUTO` entry, the name servers of the domain are looked
//! up live through the resolver's configured bootstrap servers and the
//! address is only informational. If the mode is missing, the entry is
//! `MANUAL`.
//!
//! Empty lines and lines starting with `#` are ignored.

use crate::base::name::Dname;
use core::fmt;
use core::str::FromStr;
use std::net::IpAddr;
use std::path::Path;
use std::{error, fs, io};

//------------ RootHints -----------------------------------------------------

/// The content of a root hints file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RootHints {
    entries: Vec<HintEntry>,
}

impl RootHints {
    /// Creates an empty set of hints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads hints from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, HintsError> {
        Self::parse(&fs::read_to_string(path)?)
    }

    /// Parses hints from the content of a hints file.
    pub fn parse(s: &str) -> Result<Self, HintsError> {
        let mut res = Self::new();
        for (idx, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = HintEntry::parse_line(line).map_err(|msg| {
                HintsError::Syntax {
                    line: idx + 1,
                    msg,
                }
            })?;
            res.entries.push(entry);
        }
        Ok(res)
    }

    /// Adds an entry.
    pub fn push(&mut self, entry: HintEntry) {
        self.entries.push(entry)
    }

    /// Returns the entries in the order they appeared.
    pub fn entries(&self) -> &[HintEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns whether there is an entry for the root.
    pub fn has_root(&self) -> bool {
        self.entries.iter().any(|entry| entry.domain.is_root())
    }
}

impl FromStr for RootHints {
    type Err = HintsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

//------------ HintEntry -----------------------------------------------------

/// A single line of a hints file.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HintEntry {
    /// The domain the delegation starts at.
    pub domain: Dname,

    /// The address of the name server.
    ///
    /// Only used for manual entries.
    pub server: IpAddr,

    /// How to use the server.
    pub mode: HintMode,
}

impl HintEntry {
    pub fn new(domain: Dname, server: IpAddr, mode: HintMode) -> Self {
        HintEntry {
            domain,
            server,
            mode,
        }
    }

    fn parse_line(line: &str) -> Result<Self, &'static str> {
        let (domain, rest) =
            line.split_once(':').ok_or("missing name server")?;
        let domain =
            Dname::from_str(domain.trim()).map_err(|_| "invalid domain")?;

        // IPv6 addresses contain colons, so the mode is only split off if
        // the last part actually is one.
        let (server, mode) = match rest.rsplit_once(':') {
            Some((server, mode)) => match HintMode::from_str(mode.trim()) {
                Ok(mode) => (server, mode),
                Err(_) => (rest, HintMode::Manual),
            },
            None => (rest, HintMode::Manual),
        };
        let server = IpAddr::from_str(server.trim())
            .map_err(|_| "invalid name server address")?;
        Ok(HintEntry::new(domain, server, mode))
    }
}

impl fmt::Display for HintEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.domain.is_root() {
            write!(f, ".:{}:{}", self.server, self.mode)
        } else {
            write!(f, "{}:{}:{}", self.domain, self.server, self.mode)
        }
    }
}

//------------ HintMode ------------------------------------------------------

/// How a name server from the hints is used.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum HintMode {
    /// Ask the server for the name servers of the domain.
    Auto,

    /// Use the server as a name server for the domain.
    Manual,
}

impl FromStr for HintMode {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("AUTO") {
            Ok(HintMode::Auto)
        } else if s.eq_ignore_ascii_case("MANUAL") {
            Ok(HintMode::Manual)
        } else {
            Err("unknown mode")
        }
    }
}

impl fmt::Display for HintMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            HintMode::Auto => "AUTO",
            HintMode::Manual => "MANUAL",
        })
    }
}

//------------ HintsError ----------------------------------------------------

/// Reading a hints file failed.
#[derive(Debug)]
pub enum HintsError {
    /// The file could not be read.
    Io(io::Error),

    /// A line was malformed.
    Syntax { line: usize, msg: &'static str },
}

impl From<io::Error> for HintsError {
    fn from(err: io::Error) -> Self {
        HintsError::Io(err)
    }
}

impl fmt::Display for HintsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            HintsError::Io(ref err) => err.fmt(f),
            HintsError::Syntax { line, msg } => {
                write!(f, "line {}: {}", line, msg)
            }
        }
    }
}

impl error::Error for HintsError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            HintsError::Io(ref err) => Some(err),
            HintsError::Syntax { .. } => None,
        }
    }
}

//============ Testing =======================================================

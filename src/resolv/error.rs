//! Errors setting up a resolver.
//!
//! Problems with individual questions are not errors but are reported
//! through the [`Status`][super::answer::Status] of their answer.

use crate::cache::HintsError;
use std::{error, fmt, io};

//------------ Error ---------------------------------------------------------

#[derive(Debug)]
pub enum Error {
    /// Recursive mode was configured without any servers.
    NoServers,

    /// Iterative mode has no way to find the root name servers.
    NoRootServers,

    /// The root hints could not be read.
    Hints(HintsError),

    /// Setting up a socket failed.
    Io(io::Error),
}

impl From<HintsError> for Error {
    fn from(err: HintsError) -> Self {
        Error::Hints(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::NoServers => f.write_str("no servers configured"),
            Error::NoRootServers => {
                f.write_str("no way to learn the root name servers")
            }
            Error::Hints(ref err) => write!(f, "root hints: {}", err),
            Error::Io(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            Error::Hints(ref err) => Some(err),
            Error::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

//! Domain names.
//!
//! Domain names are a sequence of *labels* which are in turn a sequence of
//! up to 63 octets. In their wire-format representation labels are prefixed
//! with an octet containing the the number of octets in the label. The last
//! label of every name is the empty *root label*.
//!
//! In order to save space in DNS messages, a name can end in a pointer to
//! another name stored elsewhere in the message. This module therefore
//! provides two types: [`Dname`] is a self-contained, uncompressed, owned
//! name used as the key for cached data, and [`ParsedDname`] is a name
//! inside a message that is only turned into a [`Dname`] when it needs to be
//! kept around.
//!
//! The engine treats names case-insensitively. A [`Dname`] always has its
//! ASCII letters folded to lower case.

pub use self::dname::{Dname, DnameError};
pub use self::label::{LabelIter, LabelType, MAX_LABEL_LEN, MAX_NAME_LEN};
pub use self::parsed::{ParsedDname, ParsedDnameError, ParsedLabels};

mod dname;
mod label;
mod parsed;

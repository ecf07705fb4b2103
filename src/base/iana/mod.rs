//! IANA Definitions for DNS.
//!
//! This module contains types for parameters defined in IANA registries
//! that are relevant for this crate.
//!
//! All types defined hereunder follow the same basic structure. They are
//! newtypes around the raw integer with associated constants for the
//! well-defined values. Values not known to the crate can still be
//! represented and compare equal to the constant with the same integer
//! value. There are two methods `from_int()` and `to_int()` to convert from
//! and to raw integer values as well as `parse()` and `compose()` for the
//! wire format.

pub use self::class::Class;
pub use self::opcode::Opcode;
pub use self::rcode::Rcode;
pub use self::rtype::Rtype;

#[macro_use]
mod macros;

pub mod class;
pub mod opcode;
pub mod rcode;
pub mod rtype;

//! Record data types consisting of a single domain name.
//!
//! This is a private module. It’s content is re-exported by the parent.

use crate::base::iana::Rtype;
use crate::base::name::{Dname, ParsedDname};
use crate::base::wire::{Compose, ParseError};
use core::fmt;
use octseq::parse::Parser;

//------------ name_type! ----------------------------------------------------

/// A macro for implementing a record data type with a single domain name.
///
/// Implements some basic methods plus the `Compose` and `Display` traits.
macro_rules! name_type {
    ( $(#[$attr:meta])* ( $target:ident, $rtype:ident, $field:ident ) ) => {
        $(#[$attr])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub struct $target {
            $field: Dname,
        }

        impl $target {
            /// The rtype of this record data type.
            pub const RTYPE: Rtype = Rtype::$rtype;

            pub fn new($field: Dname) -> Self {
                $target { $field }
            }

            pub fn $field(&self) -> &Dname {
                &self.$field
            }

            pub fn into_name(self) -> Dname {
                self.$field
            }

            pub fn parse(
                parser: &mut Parser<'_, [u8]>
            ) -> Result<Self, ParseError> {
                ParsedDname::parse(parser).map(|name| {
                    Self::new(name.to_dname())
                })
            }
        }

        impl Compose for $target {
            fn compose(&self, target: &mut Vec<u8>) {
                self.$field.compose(target)
            }
        }

        impl fmt::Display for $target {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "{}.", self.$field)
            }
        }
    }
}

//------------ Cname --------------------------------------------------------

name_type! {
    /// CNAME record data.
    ///
    /// The CNAME record specifies the canonical or primary name for domain
    /// name alias.
    ///
    /// The CNAME type is defined in RFC 1035, section 3.3.1.
    (Cname, CNAME, cname)
}

//------------ Ns -----------------------------------------------------------

name_type! {
    /// NS record data.
    ///
    /// NS records specify hosts that are authoritative for a class and domain.
    ///
    /// The NS record type is defined in RFC 1035, section 3.3.11.
    (Ns, NS, nsdname)
}

//------------ Ptr ----------------------------------------------------------

name_type! {
    /// PTR record data.
    ///
    /// PRT records are used in special domains to point to some other
    /// location in the domain space.
    ///
    /// The PTR record type is defined in RFC 1035, section 3.3.12.
    (Ptr, PTR, ptrdname)
}

//! Resource Record (RR) TYPEs

//------------ Rtype ---------------------------------------------------------

int_enum! {
    /// Resource Record Types.
    ///
    /// Each resource records has a 16 bit type value indicating what kind
    /// of information is represented by the record. Normal query includes
    /// the type of record information is requested for.
    ///
    /// The currently assigned values are maintained in an
    /// [IANA registry]. Only the types the resolver caches plus a few that
    /// commonly show up in responses have constants; all other values are
    /// still representable.
    ///
    /// [IANA registry]: http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4
    =>
    Rtype, u16, "TYPE";

    /// A host address.
    (A => 1, "A")

    /// An authoritative name server.
    (NS => 2, "NS")

    /// The canonical name for an alias
    (CNAME => 5, "CNAME")

    /// Marks the start of a zone of authority.
    (SOA => 6, "SOA")

    /// A domain name pointer.
    (PTR => 12, "PTR")

    /// Mail exchange.
    (MX => 15, "MX")

    /// Text strings.
    (TXT => 16, "TXT")

    /// IPv6 address.
    (AAAA => 28, "AAAA")

    /// Server selection.
    (SRV => 33, "SRV")

    /// EDNS0 option pseudo-record.
    (OPT => 41, "OPT")

    /// DNSSEC signature.
    (RRSIG => 46, "RRSIG")

    /// A request for all records.
    (ANY => 255, "ANY")
}

impl Rtype {
    /// The record types the resolver knows how to look up and cache.
    pub const SUPPORTED: [Rtype; 9] = [
        Rtype::A,
        Rtype::AAAA,
        Rtype::NS,
        Rtype::CNAME,
        Rtype::SOA,
        Rtype::PTR,
        Rtype::MX,
        Rtype::TXT,
        Rtype::SRV,
    ];

    /// Returns whether the resolver supports queries for this type.
    pub fn is_supported(self) -> bool {
        Self::SUPPORTED.contains(&self)
    }

    /// Returns whether a single owner may carry a list of these records.
    ///
    /// The cache keeps a whole list per name for these types and a single
    /// record for all others.
    pub fn is_multi(self) -> bool {
        matches!(self, Rtype::NS | Rtype::MX | Rtype::SRV)
    }
}

//! Creating and consuming data in wire format.
//!
//! Composing always happens into a `Vec<u8>`: messages built by the engine
//! are small and short-lived. Parsing uses [`octseq`]’s [`Parser`] over a
//! byte slice so that every read is bounds-checked and a short buffer
//! surfaces as [`ParseError::ShortInput`] instead of a panic.

use std::net::{Ipv4Addr, Ipv6Addr};
use core::fmt;
use octseq::parse::{Parser, ShortInput};

//------------ compose functions ---------------------------------------------

/// Composes some data prefixed by its length as a 16 bit value.
///
/// Returns an error if the data composed by `op` is longer than 0xFFFF
/// octets. In this case, the target is truncated back to where it was
/// before calling the function.
pub fn compose_len_prefixed<F>(
    target: &mut Vec<u8>,
    op: F,
) -> Result<(), ComposeError>
where
    F: FnOnce(&mut Vec<u8>) -> Result<(), ComposeError>,
{
    let start = target.len();
    target.extend_from_slice(&[0; 2]);
    let pos = target.len();
    if let Err(err) = op(target) {
        target.truncate(start);
        return Err(err);
    }
    let len = match u16::try_from(target.len() - pos) {
        Ok(len) => len,
        Err(_) => {
            target.truncate(start);
            return Err(ComposeError::LongData);
        }
    };
    target[start..pos].copy_from_slice(&len.to_be_bytes());
    Ok(())
}

//------------ Compose -------------------------------------------------------

/// A type that knows how to append itself in wire format.
pub trait Compose {
    /// The length of the wire format if it is fixed, zero otherwise.
    const COMPOSE_LEN: u16 = 0;

    /// Appends the wire format of the value to the end of `target`.
    fn compose(&self, target: &mut Vec<u8>);
}

impl<'a, T: Compose + ?Sized> Compose for &'a T {
    const COMPOSE_LEN: u16 = T::COMPOSE_LEN;

    fn compose(&self, target: &mut Vec<u8>) {
        (*self).compose(target)
    }
}

impl Compose for u8 {
    const COMPOSE_LEN: u16 = 1;

    fn compose(&self, target: &mut Vec<u8>) {
        target.push(*self)
    }
}

macro_rules! compose_to_be_bytes {
    ( $type:ident ) => {
        impl Compose for $type {
            const COMPOSE_LEN: u16 = ($type::BITS >> 3) as u16;

            fn compose(&self, target: &mut Vec<u8>) {
                target.extend_from_slice(&self.to_be_bytes())
            }
        }
    };
}

compose_to_be_bytes!(u16);
compose_to_be_bytes!(i32);
compose_to_be_bytes!(u32);

impl Compose for Ipv4Addr {
    const COMPOSE_LEN: u16 = 4;

    fn compose(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(&self.octets())
    }
}

impl Compose for Ipv6Addr {
    const COMPOSE_LEN: u16 = 16;

    fn compose(&self, target: &mut Vec<u8>) {
        target.extend_from_slice(&self.octets())
    }
}

//------------ Parse ---------------------------------------------------------

/// A type that can extract a value from a parser.
///
/// The parser always works on the complete message so that compressed
/// domain names can reach back to earlier parts of it.
pub trait Parse<'a>: Sized {
    /// Extracts a value from the beginning of `parser`.
    ///
    /// If parsing fails and an error is returned, the parser’s position
    /// should be considered to be undefined.
    fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError>;
}

impl<'a> Parse<'a> for u8 {
    fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        parser.parse_u8().map_err(Into::into)
    }
}

impl<'a> Parse<'a> for u16 {
    fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        parser.parse_u16_be().map_err(Into::into)
    }
}

impl<'a> Parse<'a> for u32 {
    fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        parser.parse_u32_be().map_err(Into::into)
    }
}

impl<'a> Parse<'a> for Ipv4Addr {
    fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        let mut buf = [0u8; 4];
        parser.parse_buf(&mut buf)?;
        Ok(buf.into())
    }
}

impl<'a> Parse<'a> for Ipv6Addr {
    fn parse(parser: &mut Parser<'a, [u8]>) -> Result<Self, ParseError> {
        let mut buf = [0u8; 16];
        parser.parse_buf(&mut buf)?;
        Ok(buf.into())
    }
}

/// Takes `len` octets off the parser and returns them as a slice.
///
/// The slice borrows from the underlying message rather than the parser.
pub fn parse_slice<'a>(
    parser: &mut Parser<'a, [u8]>,
    len: usize,
) -> Result<&'a [u8], ParseError> {
    let start = parser.pos();
    parser.advance(len)?;
    Ok(&parser.octets_ref()[start..start + len])
}

//============ Error Types ===================================================

//------------ ComposeError --------------------------------------------------

/// An error happened while composing data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComposeError {
    /// Data exceeded the size limit of its length prefix.
    LongData,

    /// The message would exceed the space available for it.
    ShortBuf,
}

impl fmt::Display for ComposeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ComposeError::LongData => f.write_str("long data"),
            ComposeError::ShortBuf => f.write_str("short buffer"),
        }
    }
}

impl std::error::Error for ComposeError {}

//------------ ParseError ----------------------------------------------------

/// An error happened while parsing data.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An attempt was made to go beyond the end of the parser.
    ShortInput,

    /// A formatting error occurred.
    Form(FormError),
}

impl ParseError {
    /// Creates a new parse error as a form error with the given message.
    pub fn form_error(msg: &'static str) -> Self {
        FormError::new(msg).into()
    }
}

//--- From

impl From<ShortInput> for ParseError {
    fn from(_: ShortInput) -> Self {
        ParseError::ShortInput
    }
}

impl From<FormError> for ParseError {
    fn from(err: FormError) -> Self {
        ParseError::Form(err)
    }
}

//--- Display and Error

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ParseError::ShortInput => f.write_str("unexpected end of input"),
            ParseError::Form(ref err) => err.fmt(f),
        }
    }
}

impl std::error::Error for ParseError {}

//------------ FormError -----------------------------------------------------

/// A formatting error occured.
///
/// This is a generic error for all kinds of error cases that result in data
/// not being accepted. For diagnostics, the error is being given a static
/// string describing the error.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormError(&'static str);

impl FormError {
    /// Creates a new form error value with the given diagnostics string.
    pub fn new(msg: &'static str) -> Self {
        FormError(msg)
    }
}

//--- Display and Error

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for FormError {}

//============ Testing =======================================================

//! Reassembling messages received over a stream transport.
//!
//! Over TCP, each DNS message is preceded by its length as a 16 bit value
//! in network byte order. Data arrives in arbitrary chunks, so it has to be
//! collected until a complete message is available.

use bytes::{Buf, Bytes, BytesMut};

//------------ StreamBuffer --------------------------------------------------

/// A buffer collecting length-prefixed messages from a stream.
#[derive(Clone, Debug, Default)]
pub struct StreamBuffer {
    buf: BytesMut,
}

impl StreamBuffer {
    /// Creates a new, empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends data received from the stream.
    pub fn extend(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data)
    }

    /// Takes the next complete message out of the buffer.
    ///
    /// Returns `None` if not enough data has been received yet. The length
    /// prefix is not part of the returned message.
    pub fn next_message(&mut self) -> Option<Bytes> {
        if self.buf.len() < 2 {
            return None;
        }
        let len = usize::from(u16::from_be_bytes([self.buf[0], self.buf[1]]));
        if self.buf.len() < len + 2 {
            return None;
        }
        self.buf.advance(2);
        Some(self.buf.split_to(len).freeze())
    }

    /// Returns the number of octets waiting in the buffer.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Drops all data.
    pub fn clear(&mut self) {
        self.buf.clear()
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reassemble() {
        let mut buf = StreamBuffer::new();
        assert_eq!(buf.next_message(), None);
        buf.extend(b"\x00");
        assert_eq!(buf.next_message(), None);
        buf.extend(b"\x03ab");
        assert_eq!(buf.next_message(), None);
        buf.extend(b"c\x00\x01x\x00");
        assert_eq!(buf.next_message().unwrap().as_ref(), b"abc");
        assert_eq!(buf.next_message().unwrap().as_ref(), b"x");
        assert_eq!(buf.next_message(), None);
        assert_eq!(buf.pending(), 1);
        buf.clear();
        assert_eq!(buf.pending(), 0);
    }
}

//! Building a new DNS message.
//!
//! The [`MessageBuilder`] collects the header, questions, and the records
//! of the three record sections and assembles the wire format when
//! [`finish`][MessageBuilder::finish] is called. Sections can thus be filled
//! in any order.
//!
//! When created via [`new_compressed`][MessageBuilder::new_compressed], the
//! builder compresses question names and record owners by pointing to
//! earlier occurences of the same suffix. Domain names inside record data
//! are always written uncompressed.
//!
//! For use over TCP, [`finish_stream`][MessageBuilder::finish_stream]
//! prefixes the message with its length as a 16 bit value.

use super::header::{Header, HeaderSection};
use super::name::Dname;
use super::question::Question;
use super::record::Record;
use super::wire::{Compose, ComposeError};
use std::collections::HashMap;

//------------ MessageBuilder ------------------------------------------------

/// Starts building a DNS message.
#[derive(Clone, Debug, Default)]
pub struct MessageBuilder {
    header: Header,
    question: Vec<Question<Dname>>,
    answer: Vec<Record<Dname>>,
    authority: Vec<Record<Dname>>,
    additional: Vec<Record<Dname>>,
    compress: bool,
}

impl MessageBuilder {
    /// Creates a new builder that does not compress names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new builder that compresses names.
    pub fn new_compressed() -> Self {
        MessageBuilder {
            compress: true,
            ..Default::default()
        }
    }

    /// Creates a builder for a query with a single question.
    ///
    /// The header has the given ID and the RD flag set according to
    /// `recursion_desired`.
    pub fn query(
        id: u16,
        question: Question<Dname>,
        recursion_desired: bool,
    ) -> Self {
        let mut res = Self::new();
        res.header.set_id(id);
        res.header.set_rd(recursion_desired);
        res.question.push(question);
        res
    }

    /// Returns a reference to the header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns a mutable reference to the header.
    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// Appends a question.
    pub fn push_question(
        &mut self,
        question: &Question<Dname>,
    ) -> Result<(), ComposeError> {
        Self::push(&mut self.question, question.clone())
    }

    /// Appends a record to the answer section.
    pub fn push_answer(
        &mut self,
        record: &Record<Dname>,
    ) -> Result<(), ComposeError> {
        Self::push(&mut self.answer, record.clone())
    }

    /// Appends a record to the authority section.
    pub fn push_authority(
        &mut self,
        record: &Record<Dname>,
    ) -> Result<(), ComposeError> {
        Self::push(&mut self.authority, record.clone())
    }

    /// Appends a record to the additional section.
    pub fn push_additional(
        &mut self,
        record: &Record<Dname>,
    ) -> Result<(), ComposeError> {
        Self::push(&mut self.additional, record.clone())
    }

    fn push<T>(section: &mut Vec<T>, item: T) -> Result<(), ComposeError> {
        if section.len() >= usize::from(u16::MAX) {
            return Err(ComposeError::LongData);
        }
        section.push(item);
        Ok(())
    }

    /// Assembles the message.
    ///
    /// Fails if the data of a record is longer than 65,535 octets.
    pub fn finish(&self) -> Result<Vec<u8>, ComposeError> {
        let mut target = Vec::with_capacity(512);
        let mut section = HeaderSection::new();
        *section.header_mut() = self.header;
        let counts = section.counts_mut();
        // The push methods limit every section to u16::MAX entries.
        counts.set_qdcount(self.question.len() as u16);
        counts.set_ancount(self.answer.len() as u16);
        counts.set_nscount(self.authority.len() as u16);
        counts.set_arcount(self.additional.len() as u16);
        section.compose(&mut target);

        let mut names = NameCompressor::new(self.compress);
        for question in &self.question {
            names.compose(question.qname(), &mut target);
            question.qtype().compose(&mut target);
            question.qclass().compose(&mut target);
        }
        for record in self
            .answer
            .iter()
            .chain(self.authority.iter())
            .chain(self.additional.iter())
        {
            names.compose(record.owner(), &mut target);
            record.compose_tail(&mut target)?;
        }
        Ok(target)
    }

    /// Assembles the message for use over a stream transport.
    ///
    /// The message is preceded by its length as a 16 bit value.
    pub fn finish_stream(&self) -> Result<Vec<u8>, ComposeError> {
        stream_frame(&self.finish()?)
    }
}

/// Prefixes a message with its length for sending over a stream.
pub fn stream_frame(message: &[u8]) -> Result<Vec<u8>, ComposeError> {
    let len = u16::try_from(message.len())
        .map_err(|_| ComposeError::LongData)?;
    let mut res = Vec::with_capacity(message.len() + 2);
    len.compose(&mut res);
    res.extend_from_slice(message);
    Ok(res)
}

//------------ NameCompressor ------------------------------------------------

/// Remembers where name suffixes were written to a message.
struct NameCompressor {
    map: Option<HashMap<Dname, u16>>,
}

impl NameCompressor {
    fn new(compress: bool) -> Self {
        NameCompressor {
            map: if compress { Some(HashMap::new()) } else { None },
        }
    }

    fn compose(&mut self, name: &Dname, target: &mut Vec<u8>) {
        let map = match self.map.as_mut() {
            Some(map) => map,
            None => return name.compose(target),
        };
        let mut suffix = name.clone();
        loop {
            if suffix.is_root() {
                target.push(0);
                return;
            }
            if let Some(&pos) = map.get(&suffix) {
                (pos | 0xC000).compose(target);
                return;
            }
            // Only positions reachable by a 14 bit pointer are recorded.
            if let Ok(pos) = u16::try_from(target.len()) {
                if pos < 0x4000 {
                    map.insert(suffix.clone(), pos);
                }
            }
            let label_len = usize::from(suffix.as_slice()[0]);
            target.extend_from_slice(&suffix.as_slice()[..=label_len]);
            suffix = match suffix.parent() {
                Some(parent) => parent,
                None => return,
            };
        }
    }
}

//============ Testing =======================================================

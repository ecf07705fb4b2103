//! The transaction ID space of UDP queries.

use super::transport::QueryId;
use std::collections::{HashMap, VecDeque};
use std::fmt;

//------------ QueryIds ------------------------------------------------------

/// The transaction IDs of all UDP queries currently waiting for a response.
///
/// IDs are picked at random. If the picked ID is already in use, the query
/// has to wait until it becomes free again. It is then placed on a deferred
/// list and retried periodically. That way, no two queries ever share an
/// ID and a late response can never be mistaken for that of another query.
pub struct QueryIds {
    /// The IDs in use and the queries they belong to.
    ids: HashMap<u16, QueryId>,

    /// Queries waiting for their ID to become free.
    deferred: VecDeque<(QueryId, u16)>,

    /// Where new IDs come from.
    generator: Box<dyn FnMut() -> u16 + Send>,
}

impl QueryIds {
    /// Creates a new ID space using random IDs.
    pub fn new() -> Self {
        Self::with_generator(rand::random)
    }

    /// Creates a new ID space with a custom source of IDs.
    ///
    /// The value zero is never used as an ID. If the generator returns it,
    /// it is asked again.
    pub fn with_generator(
        generator: impl FnMut() -> u16 + Send + 'static,
    ) -> Self {
        QueryIds {
            ids: HashMap::new(),
            deferred: VecDeque::new(),
            generator: Box::new(generator),
        }
    }

    /// Reserves an ID for a query.
    ///
    /// Returns the ID or `None` if the picked ID is in use. In that case,
    /// the query has been deferred.
    pub fn reserve(&mut self, query: QueryId) -> Option<u16> {
        let id = self.next_id();
        if self.ids.contains_key(&id) {
            self.deferred.push_back((query, id));
            None
        } else {
            self.ids.insert(id, query);
            Some(id)
        }
    }

    /// Returns a new ID without reserving it.
    pub fn next_id(&mut self) -> u16 {
        loop {
            let id = (self.generator)();
            if id != 0 {
                return id;
            }
        }
    }

    /// Releases an ID.
    ///
    /// Nothing happens unless the ID is reserved by `query`.
    pub fn release(&mut self, id: u16, query: QueryId) {
        if self.ids.get(&id) == Some(&query) {
            self.ids.remove(&id);
        }
    }

    /// Returns the query an ID belongs to.
    pub fn get(&self, id: u16) -> Option<QueryId> {
        self.ids.get(&id).copied()
    }

    /// Removes a query from the deferred list.
    pub fn cancel_deferred(&mut self, query: QueryId) {
        self.deferred.retain(|item| item.0 != query)
    }

    /// Reserves the IDs of deferred queries that have become free.
    ///
    /// Returns the queries and their IDs. Queries whose ID is still in use
    /// stay deferred.
    pub fn retry_deferred(&mut self) -> Vec<(QueryId, u16)> {
        let mut ready = Vec::new();
        let mut still = VecDeque::new();
        for (query, id) in self.deferred.drain(..) {
            if self.ids.contains_key(&id) {
                still.push_back((query, id))
            } else {
                self.ids.insert(id, query);
                ready.push((query, id))
            }
        }
        self.deferred = still;
        ready
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    /// Returns the number of IDs in use.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forgets all IDs and deferred queries.
    pub fn clear(&mut self) {
        self.ids.clear();
        self.deferred.clear();
    }
}

impl Default for QueryIds {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for QueryIds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("QueryIds")
            .field("ids", &self.ids)
            .field("deferred", &self.deferred)
            .finish()
    }
}

//============ Testing =======================================================

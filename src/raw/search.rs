//! Key lookup for suffix and prefix subtries.

use crate::cells::{BlockRecord, INVALID};
use crate::query::Query;
use crate::tail;

use super::RawTrie;

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> RawTrie<B, NL, PREFIX> {
    /// Walks `query` from its current node to the leaf for its key.
    ///
    /// On success the query carries the stored value and `true` is
    /// returned; on a missing edge or tail mismatch the query is left where
    /// the walk stopped, which the insert path picks up.
    pub fn search_key(&self, query: &mut Query<'_>) -> bool {
        debug_assert!(!PREFIX);

        if self.is_empty() {
            return false;
        }
        debug_assert!(self.cell(query.node()).is_fixed());

        while !self.cell(query.node()).is_leaf() {
            let child = self.cell(query.node()).base() ^ u32::from(query.label());
            if self.cell(child).check() != query.node() {
                return false;
            }
            query.advance(child);
        }

        let value = self.cell(query.node()).value();
        if query.is_finished() {
            // Reached via the terminator label, so the cell stores the
            // value directly.
            query.set_value(value);
            return true;
        }

        match tail::match_suffix(&self.tail, value, query.remaining()) {
            Some(len) => {
                query.set_value(tail::read_value(&self.tail, value + len));
                true
            }
            None => false,
        }
    }

    /// Walks `query` through a prefix subtrie, stopping at a boundary.
    ///
    /// Never consults the tail: on success the query carries whatever the
    /// reached leaf stores (a suffix-subtrie identifier, or the user value
    /// for a terminal boundary).
    pub fn search_prefix(&self, query: &mut Query<'_>) -> bool {
        debug_assert!(PREFIX);
        debug_assert!(self.cell(query.node()).is_fixed());

        while !self.cell(query.node()).is_leaf() {
            let base = self.cell(query.node()).base();
            if base == INVALID {
                return false;
            }
            let child = base ^ u32::from(query.label());
            if self.cell(child).check() != query.node() {
                return false;
            }
            query.advance(child);
        }

        query.set_value(self.cell(query.node()).value());
        true
    }
}

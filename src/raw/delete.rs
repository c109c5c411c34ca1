//! Deletion: leaf detachment, sibling-ring upkeep, and collapse of
//! singleton chains back into the tail pool.

use crate::cells::{BlockRecord, INVALID, ROOT};
use crate::query::{Edge, Query};
use crate::tail;

use super::RawTrie;

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> RawTrie<B, NL, PREFIX> {
    /// Deletes the key under `query`, leaving its value on the query.
    ///
    /// Returns `false` (and changes nothing) when the key is absent.
    pub fn delete_key(&mut self, query: &mut Query<'_>) -> bool {
        debug_assert!(!PREFIX);

        if !self.search_key(query) {
            return false;
        }

        if query.node() == ROOT {
            // Sole key: collapse the whole trie back to the empty state.
            *self = Self::new();
            return true;
        }

        if NL {
            self.delete_sib(query.node());
        }

        if !self.is_terminal(query.node()) {
            let tail_pos = self.cell(query.node()).value();
            self.tail_emps += tail::suffix_len(&self.tail, tail_pos) + tail::VALUE_LEN;
        }

        let parent = self.cell(query.node()).check();
        self.unfix(query.node());
        query.retreat(parent);

        self.change_branch(query);
        true
    }

    /// Unlinks `node` from its parent's sibling ring.
    pub(crate) fn delete_sib(&mut self, node: u32) {
        debug_assert!(NL);
        debug_assert!(self.cell(node).is_fixed());

        let parent = self.cell(node).check();
        let base = self.cell(parent).base();
        let label = (base ^ node) as u8;

        let mut walk = base ^ u32::from(self.node_links[parent as usize].child);
        while self.node_links[walk as usize].sib != label {
            walk = base ^ u32::from(self.node_links[walk as usize].sib);
        }

        if self.node_links[parent as usize].child == self.node_links[walk as usize].sib {
            self.node_links[parent as usize].child = self.node_links[node as usize].sib;
        }
        self.node_links[walk as usize].sib = self.node_links[node as usize].sib;
    }

    /// After a leaf was detached under the node tracked by `query`: when a
    /// single leaf child remains, collapses the singleton chain above it
    /// into a fresh tail suffix.
    fn change_branch(&mut self, query: &mut Query<'_>) {
        debug_assert!(self.cell(query.node()).is_fixed());

        let mut edge = Edge::new();
        self.collect_edge(query.node(), &mut edge, 2);

        if edge.len() != 1 {
            return;
        }

        let survivor = edge.first();
        let child = self.cell(query.node()).base() ^ u32::from(survivor);
        if !self.cell(child).is_leaf() {
            return;
        }

        let value = self.cell(child).value();
        self.unfix(child);

        let mut num_regress = 0;
        while query.node() != ROOT {
            let parent = self.cell(query.node()).check();
            if self.edge_size(parent, 2) != 1 {
                break;
            }
            if NL {
                self.delete_sib(query.node());
            }
            self.unfix(query.node());
            query.retreat(parent);
            num_regress += 1;
        }

        let tail_pos = self.tail_size();
        self.cell_mut(query.node()).set_value(tail_pos);

        // The collapsed chain's labels are the deleted key's bytes from the
        // surviving ancestor down to the old parent.
        for _ in 0..num_regress {
            let label = query.label();
            self.tail.push(label);
            query.next();
        }
        self.tail.push(survivor);

        if survivor != 0 {
            // The survivor kept a tail suffix; recopy it (and its value)
            // behind the new chain bytes, retiring the old copy.
            let mut pos = value;
            loop {
                let byte = self.tail[pos as usize];
                self.tail.push(byte);
                pos += 1;
                self.tail_emps += 1;
                if byte == 0 {
                    break;
                }
            }
            for _ in 0..tail::VALUE_LEN {
                let byte = self.tail[pos as usize];
                self.tail.push(byte);
                pos += 1;
                self.tail_emps += 1;
            }
        } else {
            tail::push_value(&mut self.tail, value);
        }
    }

    /// Removes a boundary leaf from a prefix subtrie. A parent left
    /// childless becomes a pruned boundary again.
    pub fn delete_prefix_leaf(&mut self, query: &mut Query<'_>) {
        debug_assert!(PREFIX);
        debug_assert!(self.cell(query.node()).is_leaf());

        let parent = self.cell(query.node()).check();
        let edge_size = self.edge_size(parent, 2);
        debug_assert_ne!(edge_size, 0);

        if NL {
            self.delete_sib(query.node());
        }

        self.unfix(query.node());
        if edge_size == 1 {
            self.cell_mut(parent).set_base(INVALID);
        }
    }
}

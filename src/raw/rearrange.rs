//! Rearrangement: in-place consolidation of the double array and tail
//! pool, and out-of-place reconstruction.

use tracing::debug;

use crate::cells::{BlockRecord, BLOCK_LEN, INVALID, NOT_FOUND, ROOT};
use crate::query::{Edge, Query};
use crate::tail;

use super::RawTrie;

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> RawTrie<B, NL, PREFIX> {
    /// In-place consolidation of the double array: repeatedly relocates the
    /// sibling set owning the highest occupied slot toward the front, until
    /// fewer than a block's worth of empties remain or no lower base
    /// exists. Trailing blocks freed along the way are reclaimed.
    pub fn pack_bc(&mut self) {
        debug_assert!(!PREFIX);

        let before = self.bc_size();
        let mut query = Query::new(b"");
        let mut edge = Edge::new();

        while BLOCK_LEN <= self.bc_emps {
            let mut max_pos = self.bc_size();
            for _ in 0..BLOCK_LEN {
                max_pos -= 1;
                if self.cell(max_pos).is_fixed() {
                    break;
                }
            }
            debug_assert!(self.cell(max_pos).is_fixed());

            query.set_node(self.cell(max_pos).check());
            self.collect_edge(query.node(), &mut edge, 256);

            let base = self.excheck(&edge);
            if base == NOT_FOUND {
                break;
            }

            self.shelter(base, &edge, &mut query);
            let node = query.node();
            self.move_node(node, base, &edge, &mut query);
        }

        debug!(
            bc_before = before,
            bc_after = self.bc_size(),
            bc_emps = self.bc_emps,
            "packed double array"
        );
    }

    /// Evicts foreign occupants of the slots `base XOR label` over `edge`
    /// into a different block, so a subsequent move finds them empty.
    fn shelter(&mut self, base: u32, edge: &Edge, query: &mut Query<'_>) {
        let mut scratch = Edge::new();
        let ng_block = base / BLOCK_LEN;

        for &label in edge.labels() {
            let child = base ^ u32::from(label);
            if self.cell(child).is_fixed() {
                let node = self.cell(child).check();
                self.collect_edge(node, &mut scratch, 256);

                let new_base = self.xcheck_avoiding(&scratch, ng_block);
                self.move_node(node, new_base, &scratch, query);
            }
        }
    }

    /// Rewrites the tail pool, dropping dead bytes: every live leaf suffix
    /// is re-appended to a fresh buffer and the leaves are repointed.
    pub fn pack_tail(&mut self) {
        debug_assert!(!PREFIX);

        let mut fresh = Vec::with_capacity(self.tail.len() - self.tail_emps as usize);
        std::mem::swap(&mut self.tail, &mut fresh);
        let old_tail = fresh;

        for node in 0..self.bc_size() {
            if self.cell(node).is_leaf() && !self.is_terminal(node) {
                let tail_pos = self.cell(node).value();
                let len = tail::suffix_len(&old_tail, tail_pos);
                let suffix = &old_tail[tail_pos as usize..(tail_pos + len - 1) as usize];
                let value = tail::read_value(&old_tail, tail_pos + len);

                let mut query = Query::new(suffix);
                query.set_value(value);
                query.set_node(node);
                self.insert_tail(&mut query);
            }
        }

        debug!(
            tail_before = old_tail.len(),
            tail_after = self.tail.len(),
            "packed tail pool"
        );
        self.tail_emps = 0;
    }

    /// Rebuilds the trie from scratch by depth-first traversal, producing a
    /// dense layout at the cost of transient duplicate storage.
    pub fn rebuild(&mut self) {
        debug_assert!(!PREFIX);

        let mut new_trie = Self::new();

        // Pre-size so the copy proceeds without reallocation.
        let bc_capa = (self.num_nodes() / 256 * 256 + 1024) as usize;
        new_trie.cells.reserve(bc_capa);
        new_trie
            .tail
            .reserve(self.tail.len() - self.tail_emps as usize);
        new_trie.blocks.reserve(bc_capa / 256);
        if NL {
            new_trie.node_links.reserve(bc_capa);
        }

        if !self.is_empty() {
            let mut stack: Vec<(u32, u32)> = Vec::with_capacity(self.num_nodes() as usize);
            stack.push((ROOT, ROOT));

            new_trie.fix(ROOT);
            new_trie.cell_mut(ROOT).set_check(INVALID);

            let mut edge = Edge::new();
            while let Some((old, new)) = stack.pop() {
                if NL {
                    new_trie.node_links[new as usize] = self.node_links[old as usize];
                }

                if self.cell(old).is_leaf() {
                    if self.is_terminal(old) {
                        let value = self.cell(old).value();
                        new_trie.cell_mut(new).set_value(value);
                    } else {
                        let tail_pos = self.cell(old).value();
                        let len = tail::suffix_len(&self.tail, tail_pos);
                        let suffix = &self.tail[tail_pos as usize..(tail_pos + len - 1) as usize];
                        let value = tail::read_value(&self.tail, tail_pos + len);

                        let mut query = Query::new(suffix);
                        query.set_value(value);
                        query.set_node(new);
                        new_trie.insert_tail(&mut query);
                    }
                    continue;
                }

                self.collect_edge(old, &mut edge, 256);

                let new_base = new_trie.xcheck(&edge);
                new_trie.cell_mut(new).set_base(new_base);

                for &label in edge.labels() {
                    let new_child = new_base ^ u32::from(label);
                    new_trie.fix(new_child);
                    new_trie.cell_mut(new_child).set_check(new);
                    stack.push((self.cell(old).base() ^ u32::from(label), new_child));
                }
            }
        }

        debug!(
            bc_before = self.bc_size(),
            bc_after = new_trie.bc_size(),
            "rebuilt trie"
        );
        *self = new_trie;
    }
}

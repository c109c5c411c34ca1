//! Empty-slot bookkeeping: the circular freelist over empty cells, block
//! growth and reclamation, and the `xcheck` family of base searches.
//!
//! Empty cells reuse their `base`/`check` words as the `next`/`prev` links
//! of a circular doubly linked list. The plain flavor threads every empty
//! slot into one global list; the linked flavor keeps one list per block
//! plus an outer ring of non-full blocks, so a base search never visits a
//! block without enough room.

use crate::cells::{BlockRecord, Cell, BLOCK_LEN, NOT_FOUND, ROOT};
use crate::query::Edge;

use super::RawTrie;

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> RawTrie<B, NL, PREFIX> {
    #[inline]
    pub(crate) fn next_of(&self, pos: u32) -> u32 {
        self.cell(pos).base()
    }

    #[inline]
    pub(crate) fn prev_of(&self, pos: u32) -> u32 {
        self.cell(pos).check()
    }

    #[inline]
    fn set_next(&mut self, pos: u32, next: u32) {
        self.cell_mut(pos).set_base(next);
    }

    #[inline]
    fn set_prev(&mut self, pos: u32, prev: u32) {
        self.cell_mut(pos).set_check(prev);
    }

    /// Marks `pos` occupied, unlinking it from the freelist. Grows the
    /// arrays when `pos` lies beyond the allocated blocks.
    pub(crate) fn fix(&mut self, pos: u32) {
        let block_pos = pos / BLOCK_LEN;
        while self.num_blocks() <= block_pos {
            self.push_block();
        }

        debug_assert!(!self.cell(pos).is_fixed());

        self.bc_emps -= 1;
        self.blocks[block_pos as usize].add_emps(-1);

        if B::LINKED {
            if self.blocks[block_pos as usize].num_emps() == 0 {
                self.delete_block_link(block_pos);
            } else {
                let next = self.next_of(pos);
                let prev = self.prev_of(pos);
                self.set_next(prev, next);
                self.set_prev(next, prev);
                if pos == self.blocks[block_pos as usize].head() {
                    self.blocks[block_pos as usize].set_head(next);
                }
            }
        } else if self.bc_emps == 0 {
            self.head_pos = NOT_FOUND;
        } else {
            if pos == self.head_pos {
                self.head_pos = self.next_of(self.head_pos);
            }
            let next = self.next_of(pos);
            let prev = self.prev_of(pos);
            self.set_next(prev, next);
            self.set_prev(next, prev);
        }

        self.cell_mut(pos).fix();
    }

    /// Marks `pos` empty, inserting it at the head of its freelist, then
    /// reclaims trailing fully-empty blocks.
    pub(crate) fn unfix(&mut self, pos: u32) {
        debug_assert!(self.cell(pos).is_fixed());

        let mut block_pos = pos / BLOCK_LEN;

        if B::LINKED {
            if self.blocks[block_pos as usize].num_emps() == 0 {
                self.set_next(pos, pos);
                self.set_prev(pos, pos);
                self.blocks[block_pos as usize].set_head(pos);
                self.insert_block_link(block_pos);
            } else {
                let head = self.blocks[block_pos as usize].head();
                let before = self.prev_of(head);
                self.set_prev(pos, before);
                self.set_next(pos, head);
                self.set_next(before, pos);
                self.set_prev(head, pos);
            }
        } else if self.bc_emps == 0 {
            self.set_next(pos, pos);
            self.set_prev(pos, pos);
            self.head_pos = pos;
        } else {
            let head = self.head_pos;
            let before = self.prev_of(head);
            self.set_prev(pos, before);
            self.set_next(pos, head);
            self.set_next(before, pos);
            self.set_prev(head, pos);
        }

        self.cell_mut(pos).unfix();

        self.bc_emps += 1;
        self.blocks[block_pos as usize].add_emps(1);

        if block_pos == self.num_blocks() - 1 {
            while self.blocks[block_pos as usize].num_emps() == BLOCK_LEN {
                self.pop_block();
                if self.num_blocks() == 0 {
                    break;
                }
                block_pos -= 1;
            }
        }
    }

    /// Appends one block of fresh empty slots and threads them into the
    /// freelist.
    pub(crate) fn push_block(&mut self) {
        let block_pos = self.num_blocks();

        self.cells
            .resize(self.cells.len() + BLOCK_LEN as usize, Cell::default());
        if NL {
            self.node_links
                .resize(self.node_links.len() + BLOCK_LEN as usize, Default::default());
        }
        self.blocks.push(B::default());

        let begin = block_pos * BLOCK_LEN;
        let end = begin + BLOCK_LEN;

        for pos in begin..end {
            self.set_next(pos, if pos + 1 == end { begin } else { pos + 1 });
            self.set_prev(pos, if pos == begin { end - 1 } else { pos - 1 });
        }

        if B::LINKED {
            self.blocks[block_pos as usize].set_head(begin);
            self.insert_block_link(block_pos);
        } else if self.bc_emps != 0 {
            let head = self.head_pos;
            let before = self.prev_of(head);
            self.set_prev(begin, before);
            self.set_next(end - 1, head);
            self.set_next(before, begin);
            self.set_prev(head, end - 1);
        } else {
            self.head_pos = begin;
        }

        self.bc_emps += BLOCK_LEN;
    }

    /// Removes the trailing block. Every slot in it must be empty.
    fn pop_block(&mut self) {
        debug_assert!(!self.cells.is_empty());

        let block_pos = self.num_blocks() - 1;
        debug_assert_eq!(self.blocks[block_pos as usize].num_emps(), BLOCK_LEN);

        if B::LINKED {
            self.delete_block_link(block_pos);
        } else {
            let begin = block_pos * BLOCK_LEN;
            let end = begin + BLOCK_LEN;
            for pos in begin..end {
                if pos == self.head_pos {
                    self.head_pos = self.next_of(self.head_pos);
                }
                let next = self.next_of(pos);
                let prev = self.prev_of(pos);
                self.set_next(prev, next);
                self.set_prev(next, prev);
            }
        }

        self.cells.truncate(self.cells.len() - BLOCK_LEN as usize);
        if NL {
            self.node_links
                .truncate(self.node_links.len() - BLOCK_LEN as usize);
        }
        self.blocks.pop();
        self.bc_emps -= BLOCK_LEN;

        // Popping the only partially-filled blocks can drain the freelist
        // entirely; the head must not dangle into the truncated region.
        if !B::LINKED && self.bc_emps == 0 {
            self.head_pos = NOT_FOUND;
        }
    }

    /// Splices `block_pos` into the outer ring of non-full blocks.
    fn insert_block_link(&mut self, block_pos: u32) {
        debug_assert!(B::LINKED);
        debug_assert!(block_pos < self.num_blocks());

        if self.head_pos != NOT_FOUND {
            let head = self.head_pos;
            let last = self.blocks[head as usize].prev();
            self.blocks[block_pos as usize].set_links(head, last);
            self.blocks[last as usize].set_next(block_pos);
            self.blocks[head as usize].set_prev(block_pos);
        } else {
            self.blocks[block_pos as usize].set_links(block_pos, block_pos);
            self.head_pos = block_pos;
        }
    }

    /// Unlinks `block_pos` from the outer ring of non-full blocks.
    fn delete_block_link(&mut self, block_pos: u32) {
        debug_assert!(B::LINKED);
        debug_assert!(block_pos < self.num_blocks());

        if self.blocks[block_pos as usize].next() == block_pos {
            self.head_pos = NOT_FOUND;
            return;
        }

        if block_pos == self.head_pos {
            self.head_pos = self.blocks[block_pos as usize].next();
        }

        let prev = self.blocks[block_pos as usize].prev();
        let next = self.blocks[block_pos as usize].next();
        self.blocks[prev as usize].set_next(next);
        self.blocks[next as usize].set_prev(prev);
    }

    /// Whether every slot `base XOR label` over `edge` is currently empty.
    fn is_target(&self, base: u32, edge: &Edge) -> bool {
        debug_assert!(!edge.is_empty());

        for &label in edge.labels() {
            let child = base ^ u32::from(label);
            if self.cell(child).is_fixed() {
                return false;
            }
        }
        true
    }

    /// [`RawTrie::is_target`] restricted for consolidation: additionally
    /// refuses bases whose slots hit the root or an occupant whose parent
    /// has at least `edge.len()` children (which could not itself be moved
    /// without growing).
    fn is_target_ex(&self, base: u32, edge: &Edge) -> bool {
        debug_assert!(!edge.is_empty());

        for &label in edge.labels() {
            let child = base ^ u32::from(label);
            if child == ROOT {
                return false;
            }
            if self.cell(child).is_fixed() {
                let node = self.cell(child).check();
                if edge.len() <= self.edge_size(node, edge.len()) {
                    return false;
                }
            }
        }
        true
    }

    /// Finds a base placing a single label onto an empty slot. Falls past
    /// the end of the array (forcing growth) when the freelist is dry.
    pub(crate) fn xcheck_one(&self, label: u8) -> u32 {
        if self.head_pos == NOT_FOUND {
            return self.bc_size() ^ u32::from(label);
        }
        if B::LINKED {
            self.blocks[self.head_pos as usize].head() ^ u32::from(label)
        } else {
            self.head_pos ^ u32::from(label)
        }
    }

    /// Finds a base such that every slot `base XOR label` over `edge` is
    /// empty, or past-the-end when no current slot set qualifies.
    pub(crate) fn xcheck(&self, edge: &Edge) -> u32 {
        debug_assert!(!edge.is_empty());

        if edge.len() == 1 {
            return self.xcheck_one(edge.first());
        }
        if self.head_pos == NOT_FOUND {
            return self.bc_size() ^ u32::from(edge.first());
        }

        if B::LINKED {
            let mut block_pos = self.head_pos;
            loop {
                if let Some(base) = self.xcheck_in_block(edge, block_pos) {
                    return base;
                }
                block_pos = self.blocks[block_pos as usize].next();
                if block_pos == self.head_pos {
                    break;
                }
            }
        } else {
            let mut pos = self.head_pos;
            loop {
                if self.blocks[(pos / BLOCK_LEN) as usize].num_emps() as usize >= edge.len() {
                    let base = pos ^ u32::from(edge.first());
                    if self.is_target(base, edge) {
                        return base;
                    }
                }
                pos = self.next_of(pos);
                if pos == self.head_pos {
                    break;
                }
            }
        }

        self.bc_size() ^ u32::from(edge.first())
    }

    /// [`RawTrie::xcheck`] that never proposes a base inside `ng_block`.
    /// Used when evicting a node away from a block under consolidation.
    pub(crate) fn xcheck_avoiding(&self, edge: &Edge, ng_block: u32) -> u32 {
        debug_assert!(!edge.is_empty());

        if self.head_pos == NOT_FOUND {
            return self.bc_size() ^ u32::from(edge.first());
        }

        if B::LINKED {
            let mut block_pos = self.head_pos;
            loop {
                if block_pos != ng_block {
                    if let Some(base) = self.xcheck_in_block(edge, block_pos) {
                        return base;
                    }
                }
                block_pos = self.blocks[block_pos as usize].next();
                if block_pos == self.head_pos {
                    break;
                }
            }
        } else {
            let mut pos = self.head_pos;
            loop {
                if pos / BLOCK_LEN != ng_block
                    && self.blocks[(pos / BLOCK_LEN) as usize].num_emps() as usize >= edge.len()
                {
                    let base = pos ^ u32::from(edge.first());
                    if self.is_target(base, edge) {
                        return base;
                    }
                }
                pos = self.next_of(pos);
                if pos == self.head_pos {
                    break;
                }
            }
        }

        self.bc_size() ^ u32::from(edge.first())
    }

    /// Base search used by consolidation: only proposes bases outside the
    /// trailing block, never grows, and memoizes where it stopped in
    /// `head_pos` so successive calls resume there. Returns `NOT_FOUND`
    /// when the remaining empty slots cannot host `edge`.
    pub(crate) fn excheck(&mut self, edge: &Edge) -> u32 {
        debug_assert!(!edge.is_empty());

        if self.head_pos == NOT_FOUND {
            return NOT_FOUND;
        }

        if B::LINKED {
            let last_block = self.num_blocks() - 1;
            let mut block_pos = self.head_pos;
            loop {
                if block_pos != last_block {
                    if let Some(base) = self.excheck_in_block(edge, block_pos) {
                        self.head_pos = block_pos;
                        return base;
                    }
                }
                block_pos = self.blocks[block_pos as usize].next();
                if block_pos == self.head_pos {
                    break;
                }
            }
        } else {
            let upper_limit = self.bc_size() - BLOCK_LEN;
            let mut pos = self.head_pos;
            loop {
                if pos < upper_limit {
                    let base = pos ^ u32::from(edge.first());
                    if self.is_target_ex(base, edge) {
                        self.head_pos = pos;
                        return base;
                    }
                }
                pos = self.next_of(pos);
                if pos == self.head_pos {
                    break;
                }
            }
        }

        NOT_FOUND
    }

    /// Tries every empty slot of `block_pos` as an anchor for `edge`.
    fn xcheck_in_block(&self, edge: &Edge, block_pos: u32) -> Option<u32> {
        debug_assert!(B::LINKED);
        debug_assert!(!edge.is_empty());

        if (self.blocks[block_pos as usize].num_emps() as usize) < edge.len() {
            return None;
        }

        let head = self.blocks[block_pos as usize].head();
        let mut pos = head;
        loop {
            let base = pos ^ u32::from(edge.first());
            if self.is_target(base, edge) {
                return Some(base);
            }
            pos = self.next_of(pos);
            if pos == head {
                break;
            }
        }
        None
    }

    /// [`RawTrie::xcheck_in_block`] with the consolidation target rule.
    fn excheck_in_block(&self, edge: &Edge, block_pos: u32) -> Option<u32> {
        debug_assert!(B::LINKED);
        debug_assert!(!edge.is_empty());

        let head = self.blocks[block_pos as usize].head();
        let mut pos = head;
        loop {
            let base = pos ^ u32::from(edge.first());
            if self.is_target_ex(base, edge) {
                return Some(base);
            }
            pos = self.next_of(pos);
            if pos == head {
                break;
            }
        }
        None
    }
}

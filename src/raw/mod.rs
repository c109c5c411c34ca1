//! The double-array trie engine.
//!
//! [`RawTrie`] owns the parallel arrays of one trie and implements every
//! mutation protocol over them. The three type parameters select a flavor at
//! monomorphization time:
//!
//!  - `B`: the freelist block record, [`Block`] (plain circular list over
//!    all empty slots) or [`BlockLink`] (per-block sublists plus an outer
//!    list of non-full blocks).
//!  - `NL`: whether each node carries sibling links for O(children) child
//!    enumeration instead of a 256-label scan.
//!  - `PREFIX`: whether this trie is the prefix subtrie of an MLT
//!    dictionary, which terminates at key-space boundaries instead of tail
//!    suffixes.
//!
//! Operations are grouped into one file per family, mirroring how they
//! build on each other: allocation, search, insertion, deletion,
//! enumeration, rearrangement.

mod delete;
pub(crate) mod enumerate;
mod free_list;
mod insert;
mod rearrange;
mod search;

use std::io::{self, Read, Write};

use crate::cells::{BlockRecord, Cell, NodeLink, BLOCK_LEN, INVALID, NOT_FOUND, ROOT};
use crate::codec::{
    read_len, read_u32, vec_wire_len, write_len, write_u32, DecodeError,
};
use crate::query::Edge;

/// A suffix-terminated trie: leaves hold a value or a tail offset.
pub type SuffixTrie<B, const NL: bool> = RawTrie<B, NL, false>;

/// A boundary-terminated trie: leaves hold suffix-subtrie identifiers and
/// `base = INVALID` marks a pruned subtree.
pub type PrefixTrie<B, const NL: bool> = RawTrie<B, NL, true>;

/// A dynamic double-array trie over one slot/tail arena.
///
/// All mutating operations assume exclusive access; see the crate docs for
/// the concurrency model.
pub struct RawTrie<B: BlockRecord, const NL: bool, const PREFIX: bool> {
    pub(crate) cells: Vec<Cell>,
    pub(crate) tail: Vec<u8>,
    pub(crate) blocks: Vec<B>,
    pub(crate) node_links: Vec<NodeLink>,
    /// Plain flavor: an empty slot on the freelist. Linked flavor: a
    /// non-full block on the outer list. `NOT_FOUND` when no such entry
    /// exists.
    pub(crate) head_pos: u32,
    pub(crate) bc_emps: u32,
    pub(crate) tail_emps: u32,
}

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> Default for RawTrie<B, NL, PREFIX> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> RawTrie<B, NL, PREFIX> {
    /// Creates an empty trie. A prefix subtrie starts with its root fixed
    /// and marked as a boundary; a suffix trie allocates nothing until the
    /// first insert.
    pub fn new() -> Self {
        let mut trie = RawTrie {
            cells: Vec::new(),
            tail: Vec::new(),
            blocks: Vec::new(),
            node_links: Vec::new(),
            head_pos: NOT_FOUND,
            bc_emps: 0,
            tail_emps: 0,
        };
        if PREFIX {
            trie.fix(ROOT);
            trie.cell_mut(ROOT).set_base(INVALID);
            trie.cell_mut(ROOT).set_check(INVALID);
        }
        trie
    }

    #[inline]
    pub(crate) fn cell(&self, pos: u32) -> Cell {
        self.cells[pos as usize]
    }

    #[inline]
    pub(crate) fn cell_mut(&mut self, pos: u32) -> &mut Cell {
        &mut self.cells[pos as usize]
    }

    /// Whether no node is allocated. A prefix subtrie is never empty.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of occupied slots.
    pub fn num_nodes(&self) -> u32 {
        self.bc_size() - self.bc_emps
    }

    /// Number of occupied nodes with exactly one child. Not constant time.
    pub fn num_singles(&self) -> u32 {
        let mut ret = 0;
        for pos in 0..self.bc_size() {
            if !self.cell(pos).is_fixed() {
                continue;
            }
            if self.edge_size(pos, 2) == 1 {
                ret += 1;
            }
        }
        ret
    }

    pub(crate) fn num_blocks(&self) -> u32 {
        self.blocks.len() as u32
    }

    /// Number of slots, allocated in multiples of [`BLOCK_LEN`].
    pub fn bc_size(&self) -> u32 {
        self.cells.len() as u32
    }

    /// Slot capacity of the backing vector.
    pub fn bc_capa(&self) -> u32 {
        self.cells.capacity() as u32
    }

    /// Number of empty slots.
    pub fn bc_emps(&self) -> u32 {
        self.bc_emps
    }

    /// Bytes in the tail pool.
    pub fn tail_size(&self) -> u32 {
        self.tail.len() as u32
    }

    /// Byte capacity of the tail pool.
    pub fn tail_capa(&self) -> u32 {
        self.tail.capacity() as u32
    }

    /// Dead bytes in the tail pool, reclaimable by [`RawTrie::pack_tail`].
    pub fn tail_emps(&self) -> u32 {
        self.tail_emps
    }

    /// Releases spare vector capacity.
    pub fn shrink(&mut self) {
        self.cells.shrink_to_fit();
        self.tail.shrink_to_fit();
        self.blocks.shrink_to_fit();
        if NL {
            self.node_links.shrink_to_fit();
        }
    }

    /// Whether `pos` is a leaf reached from its parent via the terminator
    /// label, in which case its cell stores the value directly.
    pub(crate) fn is_terminal(&self, pos: u32) -> bool {
        if !self.cell(pos).is_leaf() {
            return false;
        }
        if pos == ROOT {
            return false;
        }
        self.cell(self.cell(pos).check()).base() ^ pos == 0
    }

    /// Collects up to `upper` child labels of `node` into `edge`.
    ///
    /// With node links this walks the sibling ring; otherwise it scans all
    /// 256 candidate slots.
    pub(crate) fn collect_edge(&self, node: u32, edge: &mut Edge, upper: usize) {
        debug_assert!(self.cell(node).is_fixed());

        edge.clear();
        if self.cell(node).is_leaf() {
            return;
        }

        let base = self.cell(node).base();
        if base == INVALID {
            // prefix-subtrie boundary
            return;
        }

        if NL {
            let first = self.node_links[node as usize].child;
            edge.push(first);
            let mut child = base ^ u32::from(first);
            debug_assert_eq!(self.cell(child).check(), node);
            while edge.len() < upper && self.node_links[child as usize].sib != first {
                let sib = self.node_links[child as usize].sib;
                edge.push(sib);
                child = base ^ u32::from(sib);
                debug_assert_eq!(self.cell(child).check(), node);
            }
        } else {
            for label in 0..=255u8 {
                let child = base ^ u32::from(label);
                if self.cell(child).check() == node {
                    edge.push(label);
                    if edge.len() == upper {
                        break;
                    }
                }
            }
        }
    }

    /// Number of children of `node`, counting at most `upper`.
    pub(crate) fn edge_size(&self, node: u32, upper: usize) -> usize {
        debug_assert!(self.cell(node).is_fixed());

        if self.cell(node).is_leaf() {
            return 0;
        }

        let base = self.cell(node).base();
        if base == INVALID {
            return 0;
        }

        let mut size = 0;
        if NL {
            let first = self.node_links[node as usize].child;
            let mut child = base ^ u32::from(first);
            size += 1;
            while size < upper && self.node_links[child as usize].sib != first {
                child = base ^ u32::from(self.node_links[child as usize].sib);
                size += 1;
            }
        } else {
            for label in 0..=255u8 {
                let child = base ^ u32::from(label);
                if self.cell(child).check() == node {
                    size += 1;
                    if size >= upper {
                        break;
                    }
                }
            }
        }
        size
    }

    /// Bytes a [`RawTrie::write_to`] call would produce.
    pub fn size_in_bytes(&self) -> usize {
        vec_wire_len(self.cells.len(), 8)
            + vec_wire_len(self.tail.len(), 1)
            + vec_wire_len(self.blocks.len(), B::WIRE_LEN)
            + vec_wire_len(self.node_links.len(), 2)
            + 4 * 3
    }

    /// Writes the trie in its on-wire layout.
    pub fn write_to<W: Write + ?Sized>(&self, w: &mut W) -> io::Result<()> {
        write_len(w, self.cells.len())?;
        for cell in &self.cells {
            cell.write_to(w)?;
        }

        write_len(w, self.tail.len())?;
        w.write_all(&self.tail)?;

        write_len(w, self.blocks.len())?;
        for block in &self.blocks {
            block.write_to(w)?;
        }

        write_len(w, self.node_links.len())?;
        for link in &self.node_links {
            w.write_all(&[link.child, link.sib])?;
        }

        write_u32(w, self.head_pos)?;
        write_u32(w, self.bc_emps)?;
        write_u32(w, self.tail_emps)
    }

    /// Reconstructs a trie from its on-wire layout.
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, DecodeError> {
        let num_cells = read_len(r)?;
        let mut cells = Vec::with_capacity(num_cells);
        for _ in 0..num_cells {
            cells.push(Cell::read_from(r)?);
        }

        let num_tail = read_len(r)?;
        let mut tail = vec![0u8; num_tail];
        r.read_exact(&mut tail)?;

        let num_blocks = read_len(r)?;
        let mut blocks = Vec::with_capacity(num_blocks);
        for _ in 0..num_blocks {
            blocks.push(B::read_from(r)?);
        }

        let num_links = read_len(r)?;
        let mut node_links = Vec::with_capacity(num_links);
        for _ in 0..num_links {
            let mut buf = [0u8; 2];
            r.read_exact(&mut buf)?;
            node_links.push(NodeLink {
                child: buf[0],
                sib: buf[1],
            });
        }

        let head_pos = read_u32(r)?;
        let bc_emps = read_u32(r)?;
        let tail_emps = read_u32(r)?;

        if num_cells % BLOCK_LEN as usize != 0 {
            return Err(DecodeError::Malformed("slot count not block-aligned"));
        }
        if num_blocks * BLOCK_LEN as usize != num_cells {
            return Err(DecodeError::Malformed("block records do not cover the slots"));
        }
        if num_links != if NL { num_cells } else { 0 } {
            return Err(DecodeError::Malformed("node-link records mismatch flavor"));
        }
        if bc_emps as usize > num_cells {
            return Err(DecodeError::Malformed("empty-slot count exceeds slot count"));
        }

        Ok(RawTrie {
            cells,
            tail,
            blocks,
            node_links,
            head_pos,
            bc_emps,
            tail_emps,
        })
    }
}

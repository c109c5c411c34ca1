//! Insertion: edge growth, branch splitting, collision resolution, and
//! sibling-set relocation.

use crate::cells::{BlockRecord, INVALID, ROOT};
use crate::query::{Edge, Query};
use crate::tail;

use super::RawTrie;

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> RawTrie<B, NL, PREFIX> {
    /// Inserts the key under `query` with the value it carries.
    ///
    /// Returns `false` (and changes nothing) when the key is present.
    pub fn insert_key(&mut self, query: &mut Query<'_>) -> bool {
        debug_assert!(!PREFIX);

        if self.is_empty() {
            // First key: the whole suffix hangs off the root.
            self.fix(ROOT);
            self.cell_mut(ROOT).set_check(INVALID);
            self.insert_tail(query);
            return true;
        }

        if self.search_key(query) {
            return false;
        }

        if self.cell(query.node()).is_leaf() {
            self.insert_branch(query);
        } else {
            self.insert_edge(query);
        }
        self.insert_tail(query);
        true
    }

    /// Splits the tail suffix of the leaf under `query` at its divergence
    /// from the key, growing the internal chain down the common prefix.
    fn insert_branch(&mut self, query: &mut Query<'_>) {
        debug_assert!(self.cell(query.node()).is_leaf());

        let mut tail_pos = self.cell(query.node()).value();

        while query.label() == self.tail[tail_pos as usize] {
            self.append_edge(query);
            tail_pos += 1;
            self.tail_emps += 1;
        }

        let branch = self.tail[tail_pos as usize];
        tail_pos += 1;
        self.tail_emps += 1;

        let mut edge = Edge::new();
        edge.push(branch);
        edge.push(query.label());

        let base = self.xcheck(&edge);
        self.cell_mut(query.node()).set_base(base);

        let child = base ^ u32::from(branch);
        self.fix(child);

        self.cell_mut(child).set_check(query.node());
        if branch != 0 {
            // The old suffix keeps its tail bytes past the branch point.
            self.cell_mut(child).set_value(tail_pos);
        } else {
            let value = tail::read_value(&self.tail, tail_pos);
            self.cell_mut(child).set_value(value);
            self.tail_emps += tail::VALUE_LEN;
        }

        if NL {
            self.node_links[query.node() as usize].child = branch;
            self.node_links[child as usize].sib = branch;
        }
        self.insert_edge(query);
    }

    /// Adds a child with the cursor's label to the node under `query`,
    /// relocating a sibling set first when the slot is taken.
    pub(crate) fn insert_edge(&mut self, query: &mut Query<'_>) {
        debug_assert!(self.cell(query.node()).is_fixed());

        let mut child = self.cell(query.node()).base() ^ u32::from(query.label());

        if self.cell(child).is_fixed() {
            self.solve(query);
            child = self.cell(query.node()).base() ^ u32::from(query.label());
        }

        self.fix(child);
        self.cell_mut(child).set_check(query.node());

        if NL {
            let first = self.node_links[query.node() as usize].child;
            let first_pos = self.cell(query.node()).base() ^ u32::from(first);
            self.node_links[child as usize].sib = self.node_links[first_pos as usize].sib;
            self.node_links[first_pos as usize].sib = query.label();
        }
        query.advance(child);
    }

    /// Gives the childless node under `query` its sole child, extending a
    /// chain.
    pub(crate) fn append_edge(&mut self, query: &mut Query<'_>) {
        debug_assert!(self.cell(query.node()).is_fixed());

        let base = self.xcheck_one(query.label());
        let child = base ^ u32::from(query.label());

        self.fix(child);
        self.cell_mut(query.node()).set_base(base);
        self.cell_mut(child).set_check(query.node());

        if NL {
            self.node_links[query.node() as usize].child = query.label();
            self.node_links[child as usize].sib = query.label();
        }
        query.advance(child);
    }

    /// Parks the rest of the key (and its value) in the tail pool, hanging
    /// off the node under `query`. A finished cursor stores the value
    /// directly instead.
    pub(crate) fn insert_tail(&mut self, query: &mut Query<'_>) {
        debug_assert!(self.cell(query.node()).is_fixed());

        if query.is_finished() {
            let value = query.value();
            self.cell_mut(query.node()).set_value(value);
            return;
        }

        let tail_pos = self.tail_size();
        self.cell_mut(query.node()).set_value(tail_pos);

        while !query.is_finished() {
            self.tail.push(query.label());
            query.next();
        }
        tail::push_value(&mut self.tail, query.value());
    }

    /// Resolves a collision on the slot `base(node) XOR label`: relocates
    /// whichever affected sibling set is smaller, the current node's
    /// children plus the new label or the intruder's children.
    fn solve(&mut self, query: &mut Query<'_>) {
        debug_assert!(self.cell(query.node()).is_fixed());

        let mut own_edge = Edge::new();
        self.collect_edge(query.node(), &mut own_edge, 256);

        let child = self.cell(query.node()).base() ^ u32::from(query.label());

        // The root slot can never be reused as a child, so its occupant is
        // not an eligible intruder.
        let mut other_edge = Edge::new();
        let intruder = (child != ROOT).then(|| {
            let node = self.cell(child).check();
            self.collect_edge(node, &mut other_edge, 256);
            node
        });

        match intruder {
            Some(node) if other_edge.len() <= own_edge.len() => {
                let base = self.xcheck(&other_edge);
                self.move_node(node, base, &other_edge, query);
            },
            _ => {
                own_edge.push(query.label());
                let base = self.xcheck(&own_edge);
                own_edge.pop();
                let node = query.node();
                self.move_node(node, base, &own_edge, query);
            },
        }
    }

    /// Relocates the children of `node` listed in `edge` to `new_base`,
    /// re-parenting their own children and returning the sources to the
    /// freelist. When the node tracked by `query` is among the moved, the
    /// query follows it.
    pub(crate) fn move_node(
        &mut self,
        node: u32,
        new_base: u32,
        edge: &Edge,
        query: &mut Query<'_>,
    ) {
        debug_assert!(self.cell(node).is_fixed());
        debug_assert!(!edge.is_empty());

        let orig_base = self.cell(node).base();
        let mut src_edge = Edge::new();

        for &label in edge.labels() {
            let src = orig_base ^ u32::from(label);
            let dst = new_base ^ u32::from(label);

            self.fix(dst);
            let moved = self.cell(src);
            *self.cell_mut(dst) = moved;
            if NL {
                self.node_links[dst as usize] = self.node_links[src as usize];
            }

            self.collect_edge(src, &mut src_edge, 256);
            let src_base = self.cell(src).base();
            for &src_label in src_edge.labels() {
                let grandchild = src_base ^ u32::from(src_label);
                self.cell_mut(grandchild).set_check(dst);
            }

            self.unfix(src);

            if src == query.node() {
                query.set_node(dst);
            }
        }

        self.cell_mut(node).set_base(new_base);
    }

    /// Creates a boundary leaf at the cursor of a prefix subtrie, storing
    /// the value the query carries (a suffix-subtrie identifier, or the
    /// user value for a whole-key boundary).
    pub fn insert_prefix_leaf(&mut self, query: &mut Query<'_>) {
        debug_assert!(PREFIX);

        if self.cell(query.node()).base() != INVALID {
            self.insert_edge(query);
        } else {
            self.append_edge(query);
        }
        let value = query.value();
        self.cell_mut(query.node()).set_value(value);
    }

    /// Pre-registers key-space boundaries in a prefix subtrie: each prefix
    /// becomes a chain ending in a pruned (`base = INVALID`) node.
    ///
    /// A prefix already covered by an existing boundary is skipped.
    pub fn register_prefixes(&mut self, prefixes: &[&[u8]]) {
        debug_assert!(PREFIX);

        for &prefix in prefixes {
            let mut query = Query::new(prefix);
            self.search_prefix(&mut query);
            if query.at_terminator() {
                continue;
            }
            if self.cell(query.node()).base() != INVALID {
                self.insert_edge(&mut query);
            }
            while !query.at_terminator() {
                self.append_edge(&mut query);
            }
            self.cell_mut(query.node()).set_base(INVALID);
        }
    }
}

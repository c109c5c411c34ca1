//! Structural traversal producing `(key, value)` pairs in canonical order:
//! the terminal child first, then labels 1..=255 ascending, depth first.

use crate::cells::{BlockRecord, INVALID};
use crate::dict::KvPair;
use crate::tail;

use super::RawTrie;

/// Flag marking a terminal boundary in prefix-subtrie enumeration output.
pub(crate) const TERMINAL_TAG: u32 = 1 << 31;

impl<B: BlockRecord, const NL: bool, const PREFIX: bool> RawTrie<B, NL, PREFIX> {
    /// Appends every `(key, value)` pair below `node` to `kvs`. `prefix`
    /// holds the bytes walked so far and is restored before returning.
    pub fn enumerate(&self, node: u32, prefix: &mut Vec<u8>, kvs: &mut Vec<KvPair>) {
        debug_assert!(!PREFIX);
        debug_assert!(self.cell(node).is_fixed());

        if self.cell(node).is_leaf() {
            let mut key = prefix.clone();
            let value = if self.is_terminal(node) {
                self.cell(node).value()
            } else {
                let mut tail_pos = self.cell(node).value();
                while self.tail[tail_pos as usize] != 0 {
                    key.push(self.tail[tail_pos as usize]);
                    tail_pos += 1;
                }
                tail::read_value(&self.tail, tail_pos + 1)
            };
            kvs.push(KvPair { key, value });
            return;
        }

        let base = self.cell(node).base();

        let terminal = base;
        if self.cell(terminal).check() == node {
            self.enumerate(terminal, prefix, kvs);
        }

        for label in 1..=255u8 {
            let child = base ^ u32::from(label);
            if self.cell(child).check() == node {
                prefix.push(label);
                self.enumerate(child, prefix, kvs);
                prefix.pop();
            }
        }
    }

    /// Appends every boundary-leaf pair below `node` of a prefix subtrie.
    ///
    /// Terminal boundaries (whole keys) are tagged with [`TERMINAL_TAG`] so
    /// the caller can tell a stored user value from a suffix-subtrie
    /// identifier.
    pub fn enumerate_prefix(&self, node: u32, prefix: &mut Vec<u8>, kvs: &mut Vec<KvPair>) {
        debug_assert!(PREFIX);
        debug_assert!(self.cell(node).is_fixed());

        if self.cell(node).is_leaf() {
            let mut value = self.cell(node).value();
            if self.is_terminal(node) {
                value |= TERMINAL_TAG;
            }
            kvs.push(KvPair {
                key: prefix.clone(),
                value,
            });
            return;
        }

        let base = self.cell(node).base();
        if base == INVALID {
            // A pruned boundary with no keys below it.
            return;
        }

        let terminal = base;
        if self.cell(terminal).check() == node {
            self.enumerate_prefix(terminal, prefix, kvs);
        }

        for label in 1..=255u8 {
            let child = base ^ u32::from(label);
            if self.cell(child).check() == node {
                prefix.push(label);
                self.enumerate_prefix(child, prefix, kvs);
                prefix.pop();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::cells::{Block, ROOT};
    use crate::query::Query;
    use crate::raw::SuffixTrie;

    #[test]
    fn canonical_order_is_terminal_first_then_ascending() {
        let mut trie = SuffixTrie::<Block, false>::new();
        for (key, value) in [
            (b"he".as_slice(), 1u32),
            (b"she".as_slice(), 2),
            (b"his".as_slice(), 3),
            (b"hers".as_slice(), 4),
        ] {
            let mut query = Query::new(key);
            query.set_value(value);
            assert!(trie.insert_key(&mut query));
        }

        let mut kvs = Vec::new();
        let mut prefix = Vec::new();
        trie.enumerate(ROOT, &mut prefix, &mut kvs);

        let got: Vec<(&[u8], u32)> = kvs
            .iter()
            .map(|kv| (kv.key.as_slice(), kv.value))
            .collect();
        assert_eq!(
            got,
            vec![
                (b"he".as_slice(), 1),
                (b"hers".as_slice(), 4),
                (b"his".as_slice(), 3),
                (b"she".as_slice(), 2),
            ]
        );
        assert!(prefix.is_empty());
    }
}

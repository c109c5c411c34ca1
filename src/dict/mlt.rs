//! The prefix/suffix split dictionary.

use std::io::{self, Read, Write};

use rayon::prelude::*;

use crate::cells::{Block, BlockRecord, NOT_FOUND, ROOT};
use crate::codec::{read_u32, read_u64, read_u8, write_u32, write_u64, write_u8, DecodeError};
use crate::query::Query;
use crate::raw::{enumerate::TERMINAL_TAG, PrefixTrie, SuffixTrie};

use super::{check_value, Dictionary, KvPair, Stat};

/// A dictionary split at prefix boundaries.
///
/// One shallow *prefix subtrie* routes each key to an independent *suffix
/// subtrie*; its leaves store suffix-subtrie identifiers, or the user value
/// when a whole key ends at a boundary. Because suffix subtries are fully
/// disjoint, [`Dictionary::pack`] and [`Dictionary::rebuild`] fan out over
/// them in parallel.
pub struct DictionaryMlt<B: BlockRecord = Block, const NL: bool = false> {
    prefix_subtrie: PrefixTrie<B, NL>,
    suffix_subtries: Vec<Option<SuffixTrie<B, NL>>>,
    /// Smallest empty suffix slot, or `NOT_FOUND` when densely packed.
    suffix_head: u32,
    num_keys: u64,
}

impl<B: BlockRecord, const NL: bool> DictionaryMlt<B, NL> {
    /// Creates an empty dictionary whose boundaries grow on demand.
    pub fn new() -> Self {
        DictionaryMlt {
            prefix_subtrie: PrefixTrie::new(),
            suffix_subtries: Vec::new(),
            suffix_head: NOT_FOUND,
            num_keys: 0,
        }
    }

    /// Creates an empty dictionary with pre-registered key-space
    /// boundaries: every key starting with one of `prefixes` is routed to a
    /// suffix subtrie below that boundary.
    pub fn with_prefixes(prefixes: &[&[u8]]) -> Self {
        let mut dict = Self::new();
        dict.prefix_subtrie.register_prefixes(prefixes);
        dict
    }

    /// Reconstructs a dictionary previously serialized with
    /// [`Dictionary::write_to`].
    pub fn read_from<R: Read>(source: &mut R) -> Result<Self, DecodeError> {
        let prefix_subtrie = PrefixTrie::read_from(source)?;

        let num_suffixes = read_u64(source)?;
        let num_suffixes = usize::try_from(num_suffixes)
            .map_err(|_| DecodeError::Malformed("suffix count overflows usize"))?;
        let mut suffix_subtries = Vec::with_capacity(num_suffixes);
        for _ in 0..num_suffixes {
            let subtrie = match read_u8(source)? {
                0 => None,
                1 => Some(SuffixTrie::read_from(source)?),
                _ => return Err(DecodeError::Malformed("suffix presence flag not 0 or 1")),
            };
            suffix_subtries.push(subtrie);
        }

        let suffix_head = read_u32(source)?;
        let num_keys = read_u64(source)?;

        Ok(DictionaryMlt {
            prefix_subtrie,
            suffix_subtries,
            suffix_head,
            num_keys,
        })
    }

    fn suffix(&self, id: u32) -> &SuffixTrie<B, NL> {
        self.suffix_subtries[id as usize]
            .as_ref()
            .expect("prefix leaf refers to a live suffix subtrie")
    }

    fn suffix_mut(&mut self, id: u32) -> &mut SuffixTrie<B, NL> {
        self.suffix_subtries[id as usize]
            .as_mut()
            .expect("prefix leaf refers to a live suffix subtrie")
    }

    /// Allocates a suffix-subtrie slot, reusing the smallest empty one.
    fn new_suffix_id(&mut self) -> u32 {
        if self.suffix_head == NOT_FOUND {
            let id = self.suffix_subtries.len() as u32;
            self.suffix_subtries.push(Some(SuffixTrie::new()));
            return id;
        }

        let id = self.suffix_head;
        self.suffix_subtries[id as usize] = Some(SuffixTrie::new());

        self.suffix_head = NOT_FOUND;
        for i in (id as usize + 1)..self.suffix_subtries.len() {
            if self.suffix_subtries[i].is_none() {
                self.suffix_head = i as u32;
                break;
            }
        }
        id
    }

    /// Releases the slot of a drained suffix subtrie, popping trailing
    /// empties.
    fn release_suffix_id(&mut self, id: u32) {
        self.suffix_subtries[id as usize] = None;

        if self.suffix_head == NOT_FOUND || id < self.suffix_head {
            self.suffix_head = id;
        }
        while matches!(self.suffix_subtries.last(), Some(None)) {
            self.suffix_subtries.pop();
        }
        if self.suffix_head as usize >= self.suffix_subtries.len() {
            self.suffix_head = NOT_FOUND;
        }
    }
}

impl<B: BlockRecord, const NL: bool> Default for DictionaryMlt<B, NL> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlockRecord, const NL: bool> Dictionary for DictionaryMlt<B, NL> {
    fn name(&self) -> &'static str {
        "DictionaryMLT"
    }

    fn search(&self, key: &[u8]) -> Option<u32> {
        let mut query = Query::new(key);

        if !self.prefix_subtrie.search_prefix(&mut query) {
            return None;
        }

        if query.is_finished() {
            // The whole key is a boundary; its leaf stores the value.
            return Some(query.value());
        }

        let id = query.value();
        query.set_node(ROOT);
        if !self.suffix(id).search_key(&mut query) {
            return None;
        }
        Some(query.value())
    }

    fn insert(&mut self, key: &[u8], value: u32) -> bool {
        check_value(value);

        let mut query = Query::new(key);

        if !self.prefix_subtrie.search_prefix(&mut query) {
            if !query.at_terminator() {
                let id = self.new_suffix_id();
                query.set_value(id);
            } else {
                query.set_value(value);
            }

            self.prefix_subtrie.insert_prefix_leaf(&mut query);

            if query.is_finished() {
                self.num_keys += 1;
                return true;
            }
        } else if query.is_finished() {
            // The whole key is already stored as a terminal boundary.
            return false;
        }

        let id = query.value();
        query.set_node(ROOT);
        query.set_value(value);

        if !self.suffix_mut(id).insert_key(&mut query) {
            return false;
        }

        self.num_keys += 1;
        true
    }

    fn remove(&mut self, key: &[u8]) -> Option<u32> {
        let mut query = Query::new(key);

        if !self.prefix_subtrie.search_prefix(&mut query) {
            return None;
        }

        if query.is_finished() {
            self.prefix_subtrie.delete_prefix_leaf(&mut query);
            self.num_keys -= 1;
            return Some(query.value());
        }

        let leaf = query.node();
        let id = query.value();

        query.set_node(ROOT);
        if !self.suffix_mut(id).delete_key(&mut query) {
            return None;
        }

        if self.suffix(id).is_empty() {
            let removed = query.value();
            query.set_node(leaf);
            self.prefix_subtrie.delete_prefix_leaf(&mut query);
            self.release_suffix_id(id);
            self.num_keys -= 1;
            return Some(removed);
        }

        self.num_keys -= 1;
        Some(query.value())
    }

    fn enumerate(&self) -> Vec<KvPair> {
        let mut kvs = Vec::with_capacity(self.num_keys as usize);

        let mut prefix_kvs = Vec::new();
        let mut walked = Vec::new();
        self.prefix_subtrie
            .enumerate_prefix(ROOT, &mut walked, &mut prefix_kvs);

        for prefix_kv in prefix_kvs {
            if prefix_kv.value & TERMINAL_TAG != 0 {
                kvs.push(KvPair {
                    key: prefix_kv.key,
                    value: prefix_kv.value & !TERMINAL_TAG,
                });
            } else {
                let mut walked = prefix_kv.key;
                self.suffix(prefix_kv.value)
                    .enumerate(ROOT, &mut walked, &mut kvs);
            }
        }
        kvs
    }

    fn pack(&mut self) {
        self.suffix_subtries.par_iter_mut().for_each(|slot| {
            if let Some(subtrie) = slot {
                subtrie.pack_bc();
                subtrie.pack_tail();
            }
        });
    }

    fn rebuild(&mut self) {
        self.suffix_subtries.par_iter_mut().for_each(|slot| {
            if let Some(subtrie) = slot {
                subtrie.rebuild();
            }
        });
    }

    fn shrink(&mut self) {
        for slot in &mut self.suffix_subtries {
            if let Some(subtrie) = slot {
                subtrie.shrink();
            }
        }
    }

    fn stat(&self) -> Stat {
        let mut stat = Stat {
            num_keys: self.num_keys as usize,
            num_tries: 1,
            num_nodes: self.prefix_subtrie.num_nodes() as usize,
            bc_size: self.prefix_subtrie.bc_size() as usize,
            bc_capa: self.prefix_subtrie.bc_capa() as usize,
            bc_emps: self.prefix_subtrie.bc_emps() as usize,
            tail_size: self.prefix_subtrie.tail_size() as usize,
            tail_capa: self.prefix_subtrie.tail_capa() as usize,
            tail_emps: self.prefix_subtrie.tail_emps() as usize,
            size_in_bytes: self.prefix_subtrie.size_in_bytes(),
        };

        for slot in &self.suffix_subtries {
            if let Some(subtrie) = slot {
                stat.num_tries += 1;
                stat.num_nodes += subtrie.num_nodes() as usize;
                stat.bc_size += subtrie.bc_size() as usize;
                stat.bc_capa += subtrie.bc_capa() as usize;
                stat.bc_emps += subtrie.bc_emps() as usize;
                stat.tail_size += subtrie.tail_size() as usize;
                stat.tail_capa += subtrie.tail_capa() as usize;
                stat.tail_emps += subtrie.tail_emps() as usize;
                stat.size_in_bytes += subtrie.size_in_bytes();
            }
            // presence flag
            stat.size_in_bytes += 1;
        }

        stat.size_in_bytes += 8; // num_suffixes
        stat.size_in_bytes += 4; // suffix_head
        stat.size_in_bytes += 8; // num_keys
        stat
    }

    fn ratio_singles(&self) -> f64 {
        let mut num_singles = u64::from(self.prefix_subtrie.num_singles());
        let mut num_nodes = u64::from(self.prefix_subtrie.num_nodes());
        for slot in &self.suffix_subtries {
            if let Some(subtrie) = slot {
                num_singles += u64::from(subtrie.num_singles());
                num_nodes += u64::from(subtrie.num_nodes());
            }
        }
        num_singles as f64 / num_nodes as f64
    }

    fn write_to(&self, sink: &mut dyn Write) -> io::Result<()> {
        self.prefix_subtrie.write_to(sink)?;

        write_u64(sink, self.suffix_subtries.len() as u64)?;
        for slot in &self.suffix_subtries {
            match slot {
                Some(subtrie) => {
                    write_u8(sink, 1)?;
                    subtrie.write_to(sink)?;
                },
                None => write_u8(sink, 0)?,
            }
        }

        write_u32(sink, self.suffix_head)?;
        write_u64(sink, self.num_keys)
    }
}

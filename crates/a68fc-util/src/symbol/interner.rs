//! Concurrent string interner backing [`super::Symbol`].
//!
//! Uses `DashMap` for lock-free concurrent access and `AHasher` for fast hashing. Strings
//! are leaked to obtain `'static` references, which is acceptable for a short-lived batch
//! compiler: total unique spellings in a program are bounded by source size, and nothing
//! is ever removed from the table.

use ahash::AHasher;
use dashmap::DashMap;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::LazyLock;

use super::Symbol;
use super::InternerStats;

/// Global interner instance, created lazily on first use.
pub static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// Thread-safe string table: a forward map (hash -> interned str) for `intern`, and a
/// reverse map (index -> interned str) so `Symbol::as_str` stays O(1) instead of scanning
/// the whole table.
pub struct StringTable {
    forward: DashMap<u64, (&'static str, u32)>,
    reverse: DashMap<u32, &'static str>,
    next_index: AtomicU32,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl StringTable {
    fn new() -> Self {
        Self {
            forward: DashMap::with_capacity(256),
            reverse: DashMap::with_capacity(256),
            next_index: AtomicU32::new(0),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn intern(&self, string: &str) -> Symbol {
        let hash = Self::hash_string(string);

        if let Some(entry) = self.forward.get(&hash) {
            if entry.value().0 == string {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Symbol { index: entry.value().1 };
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        self.insert_new(hash, string)
    }

    /// Slow path: resolve a hash collision by linear probing, or insert fresh.
    fn insert_new(&self, hash: u64, string: &str) -> Symbol {
        const MAX_PROBES: u64 = 32;
        const PROBE_PRIME: u64 = 0x9e3779b97f4a7c15;

        let mut probe_hash = hash;
        for i in 0..=MAX_PROBES {
            match self.forward.entry(probe_hash) {
                dashmap::mapref::entry::Entry::Occupied(entry) => {
                    if entry.get().0 == string {
                        return Symbol { index: entry.get().1 };
                    }
                    probe_hash = hash.wrapping_add((i + 1).wrapping_mul(PROBE_PRIME));
                }
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    let interned: &'static str = Box::leak(string.to_string().into_boxed_str());
                    let idx = self.next_index.fetch_add(1, Ordering::Relaxed);
                    entry.insert((interned, idx));
                    self.reverse.insert(idx, interned);
                    return Symbol { index: idx };
                }
            }
        }
        unreachable!("string interner exhausted {MAX_PROBES} probes — hash function is broken")
    }

    pub fn get(&self, symbol: Symbol) -> Option<&'static str> {
        self.reverse.get(&symbol.index).map(|entry| *entry.value())
    }

    #[inline]
    fn hash_string(string: &str) -> u64 {
        let mut hasher = AHasher::default();
        string.hash(&mut hasher);
        hasher.finish()
    }

    pub fn stats(&self) -> InternerStats {
        InternerStats {
            count: self.reverse.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn concurrent_interning_of_the_same_string_is_consistent() {
        let handles: Vec<_> = (0..8)
            .map(|_| thread::spawn(|| STRING_TABLE.intern("concurrent_marker")))
            .collect();
        let symbols: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(symbols.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn get_recovers_the_original_string() {
        let sym = STRING_TABLE.intern("recoverable_marker_xyz");
        assert_eq!(STRING_TABLE.get(sym), Some("recoverable_marker_xyz"));
    }
}

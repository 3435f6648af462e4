//! Descriptor cache: remembers, per currently-held input code, the
//! descriptor resolved at press-time (spec §4.5).

use crate::config::{Descriptor, KeyCode};

pub const CACHE_SIZE: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct CacheEntry {
    pub code: KeyCode,
    pub descriptor: Descriptor,
    /// Owning layer at press-time. Stable: read back as `dl` on release and
    /// never touched after `set()`.
    pub dl: u16,
    /// Owning layer, live. `activate_layer` overwrites this on every layer
    /// push so `find_swap_source`'s scan always sees the current owner.
    pub layer: u16,
}

/// Bounded, direct-mapped cache: at most one entry per input code, capacity
/// [`CACHE_SIZE`] (keyd's "effective NKRO" limit).
#[derive(Debug)]
pub struct DescriptorCache {
    slots: [Option<CacheEntry>; CACHE_SIZE],
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self { slots: [None; CACHE_SIZE] }
    }
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, code: KeyCode) -> Option<&CacheEntry> {
        self.slots.iter().flatten().find(|e| e.code == code)
    }

    pub fn get_mut(&mut self, code: KeyCode) -> Option<&mut CacheEntry> {
        self.slots.iter_mut().flatten().find(|e| e.code == code)
    }

    /// Inserts (or replaces) the entry for `code`. Returns `false` if the
    /// cache is full and no tombstone/matching slot is available — the
    /// caller must drop the press (rollover guard, spec §4.5).
    pub fn set(&mut self, code: KeyCode, descriptor: Descriptor, owning_layer: u16) -> bool {
        if let Some(slot) = self.slots.iter_mut().find(|s| matches!(s, Some(e) if e.code == code))
        {
            *slot = Some(CacheEntry { code, descriptor, dl: owning_layer, layer: owning_layer });
            return true;
        }
        if let Some(slot) = self.slots.iter_mut().find(|s| s.is_none()) {
            *slot = Some(CacheEntry { code, descriptor, dl: owning_layer, layer: owning_layer });
            return true;
        }
        false
    }

    /// Clears the entry for `code`, if present.
    pub fn clear(&mut self, code: KeyCode) {
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(e) if e.code == code) {
                *slot = None;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    /// Iterates occupied entries, for scans that search by `owning_layer`
    /// rather than by code (e.g. `OP_SWAP`'s source-key lookup).
    pub fn entries(&self) -> impl Iterator<Item = &CacheEntry> {
        self.slots.iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::keys;

    #[test]
    fn set_then_get_then_clear() {
        let mut cache = DescriptorCache::new();
        assert!(cache.set(keys::A, Descriptor::keysequence(keys::B, Default::default()), 0));
        assert!(cache.get(keys::A).is_some());
        cache.clear(keys::A);
        assert!(cache.get(keys::A).is_none());
    }

    #[test]
    fn no_two_entries_share_a_code() {
        let mut cache = DescriptorCache::new();
        cache.set(keys::A, Descriptor::NULL, 0);
        cache.set(keys::A, Descriptor::layer(1), 2);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(keys::A).unwrap().dl, 2);
    }

    #[test]
    fn rollover_guard_rejects_press_when_full() {
        let mut cache = DescriptorCache::new();
        for code in 1..=CACHE_SIZE as KeyCode {
            assert!(cache.set(code, Descriptor::NULL, 0));
        }
        assert!(!cache.set(200, Descriptor::NULL, 0));
        assert_eq!(cache.len(), CACHE_SIZE);
    }

    #[test]
    fn tombstone_reused_after_clear() {
        let mut cache = DescriptorCache::new();
        for code in 1..=CACHE_SIZE as KeyCode {
            cache.set(code, Descriptor::NULL, 0);
        }
        cache.clear(3);
        assert!(cache.set(201, Descriptor::NULL, 0));
        assert_eq!(cache.len(), CACHE_SIZE);
    }
}

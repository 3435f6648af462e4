//! Layer stack: per-layer activation count, toggle flag, oneshot depth and
//! activation ordering.

extern crate alloc;

use crate::config::{Config, LayerType, ModMask};
use alloc::vec::Vec;

/// Mutable, per-layer state (spec §3 "Layer state").
#[derive(Debug, Clone, Copy, Default)]
pub struct LayerState {
    pub active: u8,
    pub toggled: bool,
    pub oneshot_depth: u8,
    pub activation_time: u64,
}

impl LayerState {
    pub fn is_active(&self) -> bool {
        self.active > 0
    }
}

/// One [`LayerState`] per configured layer, plus the monotonic tick counter
/// used to order activations (ties in caller-supplied time are broken by
/// insertion order — spec §4.1).
#[derive(Debug, Default)]
pub struct LayerStateTable {
    states: Vec<LayerState>,
    activation_seq: u64,
}

impl LayerStateTable {
    pub fn new(layer_count: usize) -> Self {
        let mut states = Vec::with_capacity(layer_count);
        states.resize(layer_count, LayerState::default());
        // Layer 0 is always active.
        states[0].active = 1;
        states[0].activation_time = 0;
        Self { states, activation_seq: 1 }
    }

    pub fn resize(&mut self, layer_count: usize) {
        self.states.resize(layer_count, LayerState::default());
    }

    pub fn get(&self, idx: u16) -> &LayerState {
        &self.states[idx as usize]
    }

    pub fn get_mut(&mut self, idx: u16) -> &mut LayerState {
        &mut self.states[idx as usize]
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Next strictly-increasing activation timestamp, for tie-breaking
    /// concurrent activations at the same caller timestamp. Independent of
    /// wall-clock time, same as the original's `get_time()` tick counter —
    /// mixing in caller time would let two activations delivered with the
    /// same `now` collapse to one ordering value.
    pub fn next_activation_time(&mut self) -> u64 {
        self.activation_seq += 1;
        self.activation_seq
    }

    pub fn increment_active(&mut self, idx: u16, activation_time: u64) {
        let st = self.get_mut(idx);
        st.active += 1;
        st.activation_time = activation_time;
    }

    pub fn decrement_active(&mut self, idx: u16) {
        let st = self.get_mut(idx);
        debug_assert!(st.active > 0, "deactivation without matching activation");
        st.active = st.active.saturating_sub(1);
    }

    /// Union of `layer.mods` over every active layer, excluding
    /// `excluded_layer` itself and (if composite) its constituents.
    pub fn compute_active_mods(&self, config: &Config, excluded: Option<u16>) -> ModMask {
        let excluded_constituents: &[u16] = match excluded {
            Some(idx) if config.layers[idx as usize].kind == LayerType::Composite => {
                &config.layers[idx as usize].constituents
            }
            _ => &[],
        };

        let mut mods = ModMask::NONE;
        for (i, layer) in config.layers.iter().enumerate() {
            let i = i as u16;
            if !self.get(i).is_active() {
                continue;
            }
            if Some(i) == excluded || excluded_constituents.contains(&i) {
                continue;
            }
            mods = mods.union(layer.mods);
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn layer_zero_starts_active() {
        let table = LayerStateTable::new(3);
        assert!(table.get(0).is_active());
        assert_eq!(table.get(0).activation_time, 0);
        assert!(!table.get(1).is_active());
    }

    #[test]
    fn active_count_balances() {
        let mut table = LayerStateTable::new(2);
        table.increment_active(1, 5);
        assert_eq!(table.get(1).active, 1);
        table.increment_active(1, 6);
        assert_eq!(table.get(1).active, 2);
        table.decrement_active(1);
        assert_eq!(table.get(1).active, 1);
    }

    #[test]
    fn compute_active_mods_excludes_requested_layer() {
        let mut config = Config::empty();
        config.layers.push(crate::config::Layer {
            name: "nav".into(),
            kind: LayerType::Normal,
            mods: ModMask::CTRL,
            keymap: alloc::vec![crate::config::Descriptor::NULL; 256],
            chords: Vec::new(),
            constituents: Vec::new(),
        });
        let mut table = LayerStateTable::new(config.layers.len());
        table.increment_active(1, 1);

        assert_eq!(table.compute_active_mods(&config, None), ModMask::CTRL);
        assert_eq!(table.compute_active_mods(&config, Some(1)), ModMask::NONE);
    }
}

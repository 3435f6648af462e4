//! Descriptor resolver: given a physical (or chord-virtual) code and the
//! current layer state, returns the descriptor to execute and the layer
//! that owns it (spec §4.4).

use crate::config::{Config, Descriptor, KeyCode, LayerType, ModMask, CHORD_1, CHORD_MAX};
use crate::runtime::chord::ActiveChordSlot;
use crate::runtime::layer_state::LayerStateTable;

pub fn resolve_descriptor(
    code: KeyCode,
    config: &Config,
    layer_states: &LayerStateTable,
    active_chords: &[Option<ActiveChordSlot>],
) -> (Descriptor, u16) {
    if (CHORD_1..=CHORD_MAX).contains(&code) {
        let slot = (code - CHORD_1) as usize;
        if let Some(active) = active_chords.get(slot).and_then(|s| s.as_ref()) {
            return (active.chord.descriptor, active.layer);
        }
        return (Descriptor::NULL, 0);
    }

    let mut best: Option<(Descriptor, u16)> = None;
    let mut best_ts: u64 = 0;

    for (i, layer) in config.layers.iter().enumerate() {
        let i = i as u16;
        if layer.kind == LayerType::Composite || !layer_states.get(i).is_active() {
            continue;
        }
        let d = *layer.binding(code);
        if !d.is_null() {
            let ts = layer_states.get(i).activation_time;
            if best.is_none() || ts >= best_ts {
                best = Some((d, i));
                best_ts = ts;
            }
        }
    }

    let mut max_constituents = 0usize;
    for (i, layer) in config.layers.iter().enumerate() {
        let i = i as u16;
        if layer.kind != LayerType::Composite {
            continue;
        }
        let all_active = !layer.constituents.is_empty()
            && layer.constituents.iter().all(|&c| layer_states.get(c).is_active());
        if !all_active {
            continue;
        }
        let d = *layer.binding(code);
        if d.is_null() {
            continue;
        }
        if layer.constituents.len() > max_constituents {
            max_constituents = layer.constituents.len();
            best = Some((d, i));
        }
    }

    best.unwrap_or((Descriptor::keysequence(code, ModMask::NONE), 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{keys, Config, Descriptor, Layer};
    use alloc::vec::Vec;

    extern crate alloc;

    fn layer(name: &str, kind: LayerType, binding: (KeyCode, Descriptor)) -> Layer {
        let mut keymap = alloc::vec![Descriptor::NULL; 256];
        keymap[binding.0 as usize] = binding.1;
        Layer { name: name.into(), kind, mods: ModMask::NONE, keymap, chords: Vec::new(), constituents: Vec::new() }
    }

    #[test]
    fn falls_back_to_keysequence_from_layer_zero() {
        let config = Config::empty();
        let states = crate::runtime::layer_state::LayerStateTable::new(1);
        let (d, dl) = resolve_descriptor(keys::A, &config, &states, &[]);
        assert_eq!(dl, 0);
        assert_eq!(d, Descriptor::keysequence(keys::A, ModMask::NONE));
    }

    #[test]
    fn later_activation_wins_among_normal_layers() {
        let mut config = Config::empty();
        config.layers.push(layer("l1", LayerType::Normal, (keys::A, Descriptor::keysequence(keys::B, ModMask::NONE))));
        config.layers.push(layer("l2", LayerType::Normal, (keys::A, Descriptor::keysequence(keys::C, ModMask::NONE))));
        let mut states = crate::runtime::layer_state::LayerStateTable::new(config.layers.len());
        states.increment_active(1, 5);
        states.increment_active(2, 10);

        let (d, dl) = resolve_descriptor(keys::A, &config, &states, &[]);
        assert_eq!(dl, 2);
        assert_eq!(d, Descriptor::keysequence(keys::C, ModMask::NONE));
    }

    #[test]
    fn composite_wins_regardless_of_activation_time() {
        let mut config = Config::empty();
        config.layers.push(layer("l1", LayerType::Normal, (keys::A, Descriptor::keysequence(keys::B, ModMask::NONE))));
        let mut composite = layer("comp", LayerType::Composite, (keys::A, Descriptor::keysequence(keys::Z, ModMask::NONE)));
        composite.constituents = alloc::vec![1];
        config.layers.push(composite);

        let mut states = crate::runtime::layer_state::LayerStateTable::new(config.layers.len());
        states.increment_active(1, 100);
        states.increment_active(2, 1);

        let (d, dl) = resolve_descriptor(keys::A, &config, &states, &[]);
        assert_eq!(dl, 2);
        assert_eq!(d, Descriptor::keysequence(keys::Z, ModMask::NONE));
    }
}

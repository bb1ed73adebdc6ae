//! Resolution of key sequences to the concrete keys they cover, memoised
//! per sequence and canvas revision.

use std::sync::Arc;

use crate::canvas::{Canvas, DeviceKey};
use crate::sequence::{FreeForm, KeySequence};

/// How many corners of a key's rectangle lie inside a freeform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    pub key: DeviceKey,
    pub corners: u8,
}

impl Coverage {
    pub fn ratio(&self) -> f32 {
        self.corners as f32 / 4.0
    }

    pub fn is_full(&self) -> bool {
        self.corners == 4
    }
}

#[derive(Debug, Clone)]
struct Resolved {
    sequence: KeySequence,
    canvas_revision: u64,
    keys: Arc<[DeviceKey]>,
    coverage: Arc<[Coverage]>,
}

/// Memoised resolution of one [`KeySequence`].
///
/// The cached answer is dropped when the sequence handed in differs from the
/// one it was computed for (an edited or swapped freeform), when the canvas
/// revision changes, or on [`ZoneCache::invalidate`].
#[derive(Debug, Clone, Default)]
pub struct ZoneCache {
    resolved: Option<Resolved>,
}

impl ZoneCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys fully covered by `sequence`. Repeated calls without an
    /// invalidating change return the same allocation.
    pub fn get_keys(&mut self, sequence: &KeySequence, canvas: &Canvas) -> Arc<[DeviceKey]> {
        Arc::clone(&self.refresh(sequence, canvas).keys)
    }

    /// Every canvas key touched by `sequence` with its corner count. Explicit
    /// key lists report the present keys as fully covered.
    pub fn coverage(&mut self, sequence: &KeySequence, canvas: &Canvas) -> Arc<[Coverage]> {
        Arc::clone(&self.refresh(sequence, canvas).coverage)
    }

    pub fn invalidate(&mut self) {
        self.resolved = None;
    }

    /// Keys of the answer currently held, without resolving anything.
    pub fn cached_keys(&self) -> Option<Arc<[DeviceKey]>> {
        self.resolved.as_ref().map(|resolved| Arc::clone(&resolved.keys))
    }

    /// Whether a cached answer for `sequence` on `canvas` is held.
    pub fn is_valid_for(&self, sequence: &KeySequence, canvas: &Canvas) -> bool {
        self.resolved.as_ref().is_some_and(|resolved| {
            resolved.canvas_revision == canvas.revision() && resolved.sequence == *sequence
        })
    }

    fn refresh(&mut self, sequence: &KeySequence, canvas: &Canvas) -> &Resolved {
        let resolved = match self.resolved.take() {
            Some(resolved)
                if resolved.canvas_revision == canvas.revision()
                    && resolved.sequence == *sequence =>
            {
                resolved
            }
            _ => resolve(sequence, canvas),
        };
        self.resolved.insert(resolved)
    }
}

fn resolve(sequence: &KeySequence, canvas: &Canvas) -> Resolved {
    let (keys, coverage): (Arc<[DeviceKey]>, Arc<[Coverage]>) = match sequence {
        KeySequence::Keys(keys) => {
            let coverage: Vec<Coverage> = keys
                .iter()
                .filter(|key| canvas.contains_key(**key))
                .map(|key| Coverage {
                    key: *key,
                    corners: 4,
                })
                .collect();
            (Arc::from(keys.as_slice()), Arc::from(coverage))
        }
        KeySequence::FreeForm(freeform) => {
            let coverage = freeform_coverage(freeform, canvas);
            let keys: Vec<DeviceKey> = coverage
                .iter()
                .filter(|c| c.is_full())
                .map(|c| c.key)
                .collect();
            (Arc::from(keys), Arc::from(coverage))
        }
    };

    tracing::trace!(keys = keys.len(), "resolved key sequence");
    Resolved {
        sequence: sequence.clone(),
        canvas_revision: canvas.revision(),
        keys,
        coverage,
    }
}

/// Corner coverage of every canvas key touched by `freeform`.
pub fn freeform_coverage(freeform: &FreeForm, canvas: &Canvas) -> Vec<Coverage> {
    let polygon = freeform.canvas_polygon(canvas);
    canvas
        .keys()
        .filter_map(|key| {
            let corners = polygon.contained_corners(&canvas.rectangle(key));
            (corners > 0).then_some(Coverage {
                key,
                corners: corners as u8,
            })
        })
        .collect()
}

/// A resolved key set with O(1) membership, used for layer masks.
#[derive(Debug, Clone)]
pub struct KeyMask {
    sequence: KeySequence,
    cache: ZoneCache,
    members: Vec<bool>,
}

impl KeyMask {
    pub fn new(sequence: KeySequence, canvas: &Canvas) -> Self {
        let mut mask = Self::unresolved(sequence);
        mask.rebuild(canvas);
        mask
    }

    /// Mask that resolves on its first [`KeyMask::refresh`]; it contains
    /// nothing until then.
    pub fn unresolved(sequence: KeySequence) -> Self {
        Self {
            sequence,
            cache: ZoneCache::new(),
            members: vec![false; DeviceKey::COUNT],
        }
    }

    pub fn sequence(&self) -> &KeySequence {
        &self.sequence
    }

    /// Keys of the last resolution, shared with the internal cache.
    pub fn resolved_keys(&self) -> Option<Arc<[DeviceKey]>> {
        self.cache.cached_keys()
    }

    /// Re-resolves against `canvas` if it is not the canvas last used.
    pub fn refresh(&mut self, canvas: &Canvas) {
        if !self.cache.is_valid_for(&self.sequence, canvas) {
            self.rebuild(canvas);
        }
    }

    pub fn contains(&self, key: DeviceKey) -> bool {
        self.members[key.index()]
    }

    fn rebuild(&mut self, canvas: &Canvas) {
        self.members.iter_mut().for_each(|member| *member = false);
        for key in self.cache.get_keys(&self.sequence, canvas).iter() {
            self.members[key.index()] = true;
        }
    }
}

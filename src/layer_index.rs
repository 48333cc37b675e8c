//! Lazily-rebuilt id-to-position cache for [`crate::layer_stack::LayerStack`].

use std::collections::HashMap;

/// Maps layer id to its current position in the owning stack's `Vec`. The
/// cache is invalidated on any structural change (add/remove/reorder) and
/// rebuilt on the next lookup, rather than kept up to date incrementally —
/// stacks are small and lookups are not the hot path; compose-time iteration
/// is.
#[derive(Debug, Default)]
pub struct LayerNameIndex {
    map: HashMap<String, usize>,
    valid: bool,
}

impl LayerNameIndex {
    /// Create an empty, invalid index.
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
            valid: false,
        }
    }

    /// Mark the cache as stale. Cheap; call on every structural mutation.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Look up `id`'s position, rebuilding the cache first if stale.
    pub fn get(&mut self, id: &str, ids: impl Iterator<Item = (usize, impl AsRef<str>)>) -> Option<usize> {
        if !self.valid {
            self.rebuild(ids);
        }
        self.map.get(id).copied()
    }

    fn rebuild(&mut self, ids: impl Iterator<Item = (usize, impl AsRef<str>)>) {
        self.map.clear();
        for (idx, id) in ids {
            self.map.insert(id.as_ref().to_string(), idx);
        }
        self.valid = true;
    }
}

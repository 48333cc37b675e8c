//! `LayerStack` — an ordered collection of [`Layer`]s, addressed by id
//! (spec.md §4.2).

use crate::buffer::CellBuffer;
use crate::error::{LayerError, Result};
use crate::layer::Layer;
use crate::layer_index::LayerNameIndex;

/// A layer reference usable with [`LayerStack::resolve`]: either a string
/// id (looked up through the name index) or a zero-based position in the
/// current `z`-sorted order (spec.md §4.2/§6, neither rebuilds the other).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LayerSelector {
    /// Look up by id.
    Id(String),
    /// Look up by current sorted-order position.
    Index(usize),
}

impl From<&str> for LayerSelector {
    fn from(id: &str) -> Self {
        LayerSelector::Id(id.to_string())
    }
}

impl From<String> for LayerSelector {
    fn from(id: String) -> Self {
        LayerSelector::Id(id)
    }
}

impl From<usize> for LayerSelector {
    fn from(index: usize) -> Self {
        LayerSelector::Index(index)
    }
}

/// Owns a set of [`Layer`]s and resolves ids to positions through a lazily
/// rebuilt cache.
#[derive(Debug, Default)]
pub struct LayerStack {
    layers: Vec<Layer>,
    index: LayerNameIndex,
}

impl LayerStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            index: LayerNameIndex::new(),
        }
    }

    fn lookup(&mut self, id: &str) -> Option<usize> {
        let ids: Vec<String> = self.layers.iter().map(|l| l.id.clone()).collect();
        self.index.get(id, ids.into_iter().enumerate())
    }

    /// Resolve a [`LayerSelector`] to a storage-order index. An `Index`
    /// selector is interpreted against the current `z`-sorted compose
    /// order (spec.md §4.3), not storage order.
    fn lookup_selector(&mut self, selector: &LayerSelector) -> Option<usize> {
        match selector {
            LayerSelector::Id(id) => self.lookup(id),
            LayerSelector::Index(index) => {
                let mut sorted: Vec<usize> = (0..self.layers.len()).collect();
                sorted.sort_by_key(|&i| self.layers[i].z);
                sorted.get(*index).copied()
            }
        }
    }

    fn selector_label(selector: &LayerSelector) -> String {
        match selector {
            LayerSelector::Id(id) => id.clone(),
            LayerSelector::Index(index) => index.to_string(),
        }
    }

    /// Add a new layer at `z = 0`, visible, with the given dimensions.
    /// Fails if `id` already exists.
    pub fn add_layer(&mut self, id: impl Into<String>, width: u16, height: u16) -> Result<()> {
        let id = id.into();
        if self.lookup(&id).is_some() {
            return Err(LayerError::DuplicateLayerId { id }.into());
        }
        self.layers.push(Layer::new(id, width, height));
        self.index.invalidate();
        Ok(())
    }

    /// Remove a layer by id. Fails if it does not exist.
    pub fn remove_layer(&mut self, id: &str) -> Result<Layer> {
        let idx = self
            .lookup(id)
            .ok_or_else(|| LayerError::UnknownLayer { id: id.to_string() })?;
        let layer = self.layers.remove(idx);
        self.index.invalidate();
        Ok(layer)
    }

    /// Change a layer's z-order.
    pub fn set_z(&mut self, id: &str, z: i32) -> Result<()> {
        let idx = self
            .lookup(id)
            .ok_or_else(|| LayerError::UnknownLayer { id: id.to_string() })?;
        self.layers[idx].z = z;
        Ok(())
    }

    /// Change a layer's visibility.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        let idx = self
            .lookup(id)
            .ok_or_else(|| LayerError::UnknownLayer { id: id.to_string() })?;
        self.layers[idx].visible = visible;
        Ok(())
    }

    /// Replace a layer's compositing effects (darken/desaturate/parallax
    /// offset).
    pub fn set_effects(&mut self, id: &str, effects: crate::layer::LayerEffects) -> Result<()> {
        let idx = self
            .lookup(id)
            .ok_or_else(|| LayerError::UnknownLayer { id: id.to_string() })?;
        self.layers[idx].effects = effects;
        Ok(())
    }

    /// Borrow a layer by id, immutably.
    pub fn get_by_id(&mut self, id: &str) -> Result<&Layer> {
        let idx = self
            .lookup(id)
            .ok_or_else(|| LayerError::UnknownLayer { id: id.to_string() })?;
        Ok(&self.layers[idx])
    }

    /// Resolve a layer, by id or by current sorted-order index, to a
    /// mutable buffer reference — the hook draw helpers in
    /// [`crate::drawing`] go through this.
    pub fn resolve(&mut self, selector: impl Into<LayerSelector>) -> Result<&mut CellBuffer> {
        let selector = selector.into();
        let idx = self
            .lookup_selector(&selector)
            .ok_or_else(|| LayerError::UnknownLayer { id: Self::selector_label(&selector) })?;
        Ok(&mut self.layers[idx].buffer)
    }

    /// Ids of every layer currently in the stack, in storage order. Used by
    /// callers that need to act on every layer (e.g. resizing them all on
    /// a terminal resize) without holding a borrow of the stack itself.
    pub fn layer_ids(&self) -> Vec<String> {
        self.layers.iter().map(|l| l.id.clone()).collect()
    }

    /// Number of layers currently in the stack.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns true if the stack holds no layers.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Iterate layers in compose order: ascending `z`, ties broken by
    /// insertion order (stable sort over the backing `Vec`'s current
    /// order, which already reflects insertion — spec.md §4.3 "auto-depth").
    pub fn iter_sorted(&self) -> impl Iterator<Item = &Layer> {
        let mut indices: Vec<usize> = (0..self.layers.len()).collect();
        indices.sort_by_key(|&i| self.layers[i].z);
        indices.into_iter().map(move |i| &self.layers[i])
    }
}

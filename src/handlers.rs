//! Priority-ordered handler registries (spec.md §3, §4.6).
//!
//! Three registries exist in a [`crate::runtime::Runtime`]: update, render,
//! and input. Each is a `HandlerRegistry<F>` generic over its callback
//! signature, kept sorted by ascending priority with insertion order as the
//! tiebreak so same-priority handlers run in registration order (spec.md
//! §5's ordering guarantee).

use crate::error::{Error, Result};

/// A single named, prioritised callback.
struct Handler<F> {
    name: String,
    priority: i32,
    callback: F,
}

/// An ordered collection of handlers, sorted by ascending priority.
///
/// Registration is O(n log n) (the whole list is re-sorted) but dispatch is
/// a plain forward iteration; registries are small and change rarely
/// relative to how often they're walked per frame.
pub struct HandlerRegistry<F> {
    handlers: Vec<Handler<F>>,
}

impl<F> Default for HandlerRegistry<F> {
    fn default() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }
}

impl<F> HandlerRegistry<F> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `name` at `priority`. Errors if `name` is
    /// already registered.
    pub fn register(&mut self, name: impl Into<String>, priority: i32, callback: F) -> Result<()> {
        let name = name.into();
        if self.handlers.iter().any(|h| h.name == name) {
            return Err(Error::Render(format!(
                "handler already registered: {name}"
            )));
        }
        self.handlers.push(Handler {
            name,
            priority,
            callback,
        });
        self.handlers.sort_by_key(|h| h.priority);
        Ok(())
    }

    /// Remove the handler registered under `name`, if any.
    pub fn unregister(&mut self, name: &str) {
        self.handlers.retain(|h| h.name != name);
    }

    /// Remove every registered handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handlers are registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Iterate callbacks in ascending-priority, insertion-order-tiebreak
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = &F> {
        self.handlers.iter().map(|h| &h.callback)
    }

    /// Iterate callbacks mutably, in the same order as [`Self::iter`].
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut F> {
        self.handlers.iter_mut().map(|h| &mut h.callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_iterate_in_priority_order() {
        let mut reg: HandlerRegistry<i32> = HandlerRegistry::new();
        reg.register("c", 10, 3).ok();
        reg.register("a", -10, 1).ok();
        reg.register("b", 0, 2).ok();
        let order: Vec<i32> = reg.iter().copied().collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn same_priority_preserves_insertion_order() {
        let mut reg: HandlerRegistry<&str> = HandlerRegistry::new();
        reg.register("first", 0, "first").ok();
        reg.register("second", 0, "second").ok();
        let order: Vec<&str> = reg.iter().copied().collect();
        assert_eq!(order, vec!["first", "second"]);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut reg: HandlerRegistry<i32> = HandlerRegistry::new();
        reg.register("a", 0, 1).ok();
        assert!(reg.register("a", 5, 2).is_err());
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn unregister_removes_handler() {
        let mut reg: HandlerRegistry<i32> = HandlerRegistry::new();
        reg.register("a", 0, 1).ok();
        reg.unregister("a");
        assert!(reg.is_empty());
    }

    #[test]
    fn clear_removes_all() {
        let mut reg: HandlerRegistry<i32> = HandlerRegistry::new();
        reg.register("a", 0, 1).ok();
        reg.register("b", 1, 2).ok();
        reg.clear();
        assert!(reg.is_empty());
    }

    #[test]
    fn unregister_missing_is_noop() {
        let mut reg: HandlerRegistry<i32> = HandlerRegistry::new();
        reg.register("a", 0, 1).ok();
        reg.unregister("nonexistent");
        assert_eq!(reg.len(), 1);
    }
}

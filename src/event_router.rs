//! `EventRouter` — priority-ordered input dispatch with consumption
//! (spec.md §4.6).
//!
//! Dispatch order for a single event: registered input handlers in
//! ascending priority, then (if unconsumed) the default bindings, then
//! (if still unconsumed) the caller's section-specific input hook. A
//! handler "consumes" an event by returning `true`, which halts dispatch.

use tracing::debug;

use crate::error::Result;
use crate::event::{InputEvent, KeyCode};
use crate::handlers::HandlerRegistry;
use crate::lifecycle::AppState;

/// A registered input handler: `(event, state) -> consumed`.
pub type InputHandler = Box<dyn FnMut(&InputEvent, &mut AppState) -> bool>;

/// Dispatches input events through a priority-ordered handler registry,
/// then default bindings, then an optional fallback hook.
#[derive(Default)]
pub struct EventRouter {
    handlers: HandlerRegistry<InputHandler>,
    default_bindings_enabled: bool,
}

impl EventRouter {
    /// Create a router with default bindings (quit on Q/Ctrl-C, resize
    /// handling) enabled.
    pub fn new() -> Self {
        Self {
            handlers: HandlerRegistry::new(),
            default_bindings_enabled: true,
        }
    }

    /// Disable the built-in default bindings (quit keys, resize). Scripts
    /// that want to fully own input handling call this.
    pub fn disable_default_bindings(&mut self) {
        self.default_bindings_enabled = false;
    }

    /// Register a named, prioritised input handler. Errors on duplicate
    /// name (spec.md §4.6).
    pub fn register(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        handler: InputHandler,
    ) -> Result<()> {
        self.handlers.register(name, priority, handler)
    }

    /// Remove a registered handler by name.
    pub fn unregister(&mut self, name: &str) {
        self.handlers.unregister(name);
    }

    /// Remove all registered handlers.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Dispatch one event: registered handlers (priority order) → default
    /// bindings → `fallback`. Returns `true` if the event was consumed at
    /// any stage.
    pub fn dispatch(
        &mut self,
        event: &InputEvent,
        state: &mut AppState,
        fallback: Option<&mut dyn FnMut(&InputEvent, &mut AppState) -> bool>,
    ) -> bool {
        for handler in self.handlers.iter_mut() {
            if handler(event, state) {
                return true;
            }
        }

        if self.default_bindings_enabled && default_bindings(event, state) {
            return true;
        }

        if let Some(fallback) = fallback {
            return fallback(event, state);
        }

        false
    }
}

/// Built-in bindings: Q / Ctrl-C request quit; Resize updates `term_w/h`
/// and resizes every layer buffer to match (spec.md §4.6).
fn default_bindings(event: &InputEvent, state: &mut AppState) -> bool {
    match event {
        InputEvent::Key(key) => {
            let quits = matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
                || (key.ctrl() && matches!(key.code, KeyCode::Char('c')));
            if quits {
                state.quit_requested = true;
                return true;
            }
            false
        }
        InputEvent::Resize(cols, rows) => {
            state.resize(*cols, *rows);
            true
        }
        _ => {
            debug!(?event, "no default binding for event");
            false
        }
    }
}

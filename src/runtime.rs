//! `Runtime` — the fields the source's scripting layer kept as module-level
//! globals, bundled as an explicit value instead (spec.md §9 "Global
//! mutable state"). A single top-level `run(runtime, hooks)` owns it.

use crate::error::Result;
use crate::event_router::EventRouter;
use crate::handlers::HandlerRegistry;
use crate::lifecycle::AppState;

/// A registered global update handler: `(dt_s, state)`.
pub type UpdateHandler = Box<dyn FnMut(f32, &mut AppState)>;
/// A registered global render handler: `(state)`. Typically writes to
/// layers; runs before the user's own render hook.
pub type RenderHandler = Box<dyn FnMut(&mut AppState)>;

/// Bundles `AppState`, the update/render handler registries, and the
/// `EventRouter` — everything the source scattered across module-level
/// globals, now owned by one value a host constructs once and threads
/// through [`crate::lifecycle::Lifecycle::run`].
pub struct Runtime {
    /// Mutable per-frame application state.
    pub state: AppState,
    /// Global update handlers, run in priority order before the user hook.
    pub update_handlers: HandlerRegistry<UpdateHandler>,
    /// Global render handlers, run in priority order before the user hook.
    pub render_handlers: HandlerRegistry<RenderHandler>,
    /// Input dispatch: priority-ordered handlers, default bindings, then a
    /// per-section fallback.
    pub events: EventRouter,
}

impl Runtime {
    /// Construct a runtime for a terminal of the given initial size.
    pub fn new(term_w: u16, term_h: u16) -> Self {
        Self {
            state: AppState::new(term_w, term_h),
            update_handlers: HandlerRegistry::new(),
            render_handlers: HandlerRegistry::new(),
            events: EventRouter::new(),
        }
    }

    /// Register a global update handler (spec.md §6 `register_update`).
    pub fn register_update(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        handler: UpdateHandler,
    ) -> Result<()> {
        self.update_handlers.register(name, priority, handler)
    }

    /// Register a global render handler (spec.md §6 `register_render`).
    pub fn register_render(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        handler: RenderHandler,
    ) -> Result<()> {
        self.render_handlers.register(name, priority, handler)
    }

    /// Register a global input handler (spec.md §6 `register_input`).
    pub fn register_input(
        &mut self,
        name: impl Into<String>,
        priority: i32,
        handler: crate::event_router::InputHandler,
    ) -> Result<()> {
        self.events.register(name, priority, handler)
    }

    /// Remove a handler by name from whichever registry holds it. Cheap to
    /// call on all three since names are checked independently — a script
    /// that only knows a name handle, not which registry it lives in, can
    /// call this and have it work regardless (spec.md §9 "handler
    /// registries own the callables... originating modules hold only a
    /// name handle").
    pub fn unregister(&mut self, name: &str) {
        self.update_handlers.unregister(name);
        self.render_handlers.unregister(name);
        self.events.unregister(name);
    }

    /// Clear every handler in all three registries (spec.md §6
    /// `clear_handlers`).
    pub fn clear_handlers(&mut self) {
        self.update_handlers.clear();
        self.render_handlers.clear();
        self.events.clear();
    }

    /// Run the update phase: global update handlers (priority order), each
    /// given `dt_s` (spec.md §4.5).
    pub fn run_update_handlers(&mut self, dt_s: f32) {
        for handler in self.update_handlers.iter_mut() {
            handler(dt_s, &mut self.state);
        }
    }

    /// Run the render phase's global handlers (priority order), before the
    /// caller's own render hook (spec.md §4.5).
    pub fn run_render_handlers(&mut self) {
        for handler in self.render_handlers.iter_mut() {
            handler(&mut self.state);
        }
    }
}

//! tstorie-core: the rendering, lifecycle, dataflow, and procgen core of a
//! terminal presentation and interactive-fiction engine.
//!
//! This crate is a library a host binary embeds. It does not parse
//! markdown, run a scripting VM, rasterize figlet fonts, fetch gists over
//! HTTP, compile shaders, or parse CLI flags — those are external
//! collaborators (see spec.md §1). What it does own:
//!
//! # Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │           Host / script bindings (external)                 │
//! │   markdown docs, embedded scripts, init/update/render hooks  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Lifecycle + Runtime + EventRouter            │
//! │  frame state machine, priority handler registries, AppState  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │           LayerStack (Layer + LayerEffects + drawing)        │
//! │   named, z-ordered CellBuffers; offset/darken/desaturate     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Compositor                            │
//! │  clear → z-sort → auto-depth → per-cell effects → FrameBuffer│
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │               TerminalBackend (diff + Crossterm)              │
//! │  previous-frame diff, SGR/cursor elision, raw mode, input     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Alongside the frame pipeline, three independent subsystems share the
//! same deterministic substrate:
//!
//! - [`graph`] — a pull-based dataflow DAG driving audio synthesis, pixel
//!   shading, and particle behaviour scripting from the same node kinds.
//! - [`detrand`] — an isolated RNG plus integer-only math, noise, geometry,
//!   and easing primitives, built for bit-identical results across runs.
//! - [`particles`] — a pooled particle system, optionally graph-driven.
//!
//! [`png_transport`] is unrelated to rendering: it embeds/extracts
//! compressed payloads in PNG `tEXt` chunks.
//!
//! ## Key Types
//!
//! - [`Cell`] / [`CellBuffer`]: a styled grapheme grid, the unit every
//!   other rendering type composes.
//! - [`Layer`] / [`LayerStack`]: named, z-ordered buffers with per-layer
//!   parallax/darken/desaturate effects.
//! - [`Compositor`]: clears, z-sorts, applies effects, writes the frame
//!   buffer.
//! - [`terminal::TerminalBackend`]: diffs frames and emits ANSI; parses
//!   terminal input.
//! - [`Lifecycle`] / [`Runtime`] / [`EventRouter`]: the per-frame state
//!   machine, handler registries, and input dispatch.
//! - [`graph::Graph`]: the shared audio/visual/control dataflow DAG.
//! - [`detrand::Rng`]: the isolated, seedable PRNG every deterministic
//!   primitive threads explicitly.
//! - [`particles::ParticleSystem`]: the pooled particle simulation.

pub mod buffer;
pub mod cell;
pub mod color;
pub mod compositor;
pub mod detrand;
pub mod drawing;
pub mod error;
pub mod event;
pub mod event_router;
pub mod geometry;
pub mod graph;
pub mod handlers;
pub mod layer;
pub mod layer_index;
pub mod layer_stack;
pub mod lifecycle;
pub mod navigation;
pub mod particles;
pub mod png_transport;
pub mod runtime;
pub mod style;
pub mod terminal;

pub use buffer::CellBuffer;
pub use cell::Cell;
pub use color::Rgb;
pub use compositor::Compositor;
pub use detrand::Rng;
pub use drawing::{draw, draw_button, draw_label, draw_panel, draw_text, fill_box};
pub use error::{Error, GraphError, LayerError, Result, TransportError};
pub use event::{InputEvent, KeyCode, KeyEvent, Modifiers, MouseButton, MouseEvent, MouseEventKind};
pub use event_router::{EventRouter, InputHandler};
pub use geometry::{Position, Rect, Size};
pub use graph::{
    Domain, EasingKind, EvalContext, Graph, Math2DOp, MathOp, Node, NodeKind, NodeRef, NoiseKind,
    Palette, Value, WaveOp,
};
pub use graph::param_queue::ParamQueue;
pub use handlers::HandlerRegistry;
pub use layer::{Layer, LayerEffects};
pub use layer_index::LayerNameIndex;
pub use layer_stack::{LayerSelector, LayerStack};
pub use lifecycle::{
    AppState, Lifecycle, LifecycleConfig, LifecycleHooks, LifecyclePhase, MouseState, RawModeGuard,
};
pub use navigation::{Navigation, SectionId};
pub use particles::{CollisionParams, CollisionResponse, EmitterParams, EmitterShape, Particle, ParticleSystem, PhysicsParams};
pub use png_transport::{PngChunk, embed, extract};
pub use runtime::{RenderHandler, Runtime, UpdateHandler};
pub use style::Style;
pub use terminal::{
    ColorSupport, CrosstermBackend, MultiplexerKind, Terminal, TerminalBackend, TerminalCapabilities,
    TerminalInfo, TerminalKind, TestBackend, detect, detect_multiplexer, detect_terminal,
    merge_multiplexer_limits, parse_input_bytes, profile_for,
};

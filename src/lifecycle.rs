//! Frame lifecycle state machine and `AppState` (spec.md §3, §4.5, §9).
//!
//! `Uninitialised → SettingUp → Running → ShuttingDown → Exited`. Running
//! iterates `DrainInput → Update → Render → Present` at a configurable
//! target rate. A [`RawModeGuard`] ties terminal restoration to scope exit
//! so a panic mid-frame still leaves the terminal usable.

use std::time::{Duration, Instant};

use tracing::{error, warn};

use crate::buffer::CellBuffer;
use crate::compositor::Compositor;
use crate::error::Result;
use crate::event::InputEvent;
use crate::layer_stack::LayerStack;
use crate::runtime::Runtime;
use crate::style::Style;
use crate::terminal::{Terminal, TerminalBackend};

/// Constructor-supplied configuration (spec.md §2 ambient stack:
/// configuration is plain arguments, not a file-based layer).
#[derive(Clone, Copy, Debug)]
pub struct LifecycleConfig {
    /// Target frame rate in Hz. Default 60.
    pub target_fps: f32,
    /// Terminal size to assume if querying the real terminal fails.
    pub fallback_size: (u16, u16),
    /// Darken `(min, max)` range the compositor's auto-depth maps the
    /// observed layer z-range onto at startup (spec.md §4.3 step 3,
    /// §6 `enable_auto_depth(min, max)`). `None` leaves auto-depth disabled;
    /// layers compose with their own `effects.darken`.
    pub auto_depth: Option<(f32, f32)>,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            fallback_size: (80, 24),
            auto_depth: None,
        }
    }
}

/// Mutable per-frame application state (spec.md §3). Owned exclusively by
/// the [`Lifecycle`]; mutated only on the lifecycle thread between frames.
pub struct AppState {
    /// Monotonically increasing frame counter, starting at 0.
    pub frame: u64,
    /// Seconds since `Running` was entered.
    pub time_s: f64,
    /// Seconds since the previous frame.
    pub dt_s: f32,
    /// Current terminal width in columns.
    pub term_w: u16,
    /// Current terminal height in rows.
    pub term_h: u16,
    /// The layer stack composited each frame.
    pub layers: LayerStack,
    /// Whether the main loop should keep iterating.
    pub running: bool,
    /// Set by a handler or default binding to request a clean shutdown.
    pub quit_requested: bool,
    /// Last known mouse position and held buttons.
    pub mouse: MouseState,
    /// Color the compositor clears to before compositing layers.
    pub theme_bg: Style,
}

/// Tracked mouse position and button state.
#[derive(Clone, Copy, Debug, Default)]
pub struct MouseState {
    /// Last reported column.
    pub x: u16,
    /// Last reported row.
    pub y: u16,
    /// Bitmask of currently-held buttons (bit 0 = left, 1 = right, 2 = middle).
    pub buttons: u8,
}

impl AppState {
    /// Construct the initial state for a terminal of the given size.
    pub fn new(term_w: u16, term_h: u16) -> Self {
        let mut layers = LayerStack::new();
        let _ = layers.add_layer("default", term_w, term_h);
        Self {
            frame: 0,
            time_s: 0.0,
            dt_s: 0.0,
            term_w,
            term_h,
            layers,
            running: true,
            quit_requested: false,
            mouse: MouseState::default(),
            theme_bg: Style::default(),
        }
    }

    /// Resize the terminal dimensions and every layer buffer to match
    /// (the EventRouter's default `Resize` binding, spec.md §4.6).
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.term_w = cols;
        self.term_h = rows;
        for id in self.layers.layer_ids() {
            if let Ok(buf) = self.layers.resolve(&id) {
                buf.resize(cols, rows);
            }
        }
    }
}

/// Where the state machine currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Not yet started.
    Uninitialised,
    /// Entering raw mode, querying size, building the initial layer stack.
    SettingUp,
    /// Normal frame loop.
    Running,
    /// Teardown hook, raw-mode exit, cursor restore.
    ShuttingDown,
    /// Terminal state has been released; the process may exit.
    Exited,
}

/// RAII guard that restores the terminal's raw mode and cursor visibility
/// on drop, including on panic unwind (spec.md §7: "Panics trip the scoped
/// terminal-restoration path").
pub struct RawModeGuard<'a> {
    terminal: &'a mut dyn Terminal,
    active: bool,
}

impl<'a> RawModeGuard<'a> {
    /// Enter raw mode, returning a guard that exits it on drop.
    pub fn acquire(terminal: &'a mut dyn Terminal) -> Result<Self> {
        terminal.enter_raw_mode()?;
        Ok(Self {
            terminal,
            active: true,
        })
    }
}

impl Drop for RawModeGuard<'_> {
    fn drop(&mut self) {
        if self.active {
            if let Err(err) = self.terminal.exit_raw_mode() {
                error!(%err, "failed to restore terminal on exit");
            }
            self.active = false;
        }
    }
}

/// Frame-paced clock: tracks when the next frame is due given a target
/// rate, sleeping the remaining budget (spec.md §5: "the only blocking
/// call on the main thread").
pub struct FramePacer {
    frame_duration: Duration,
    last_tick: Instant,
    start: Instant,
}

impl FramePacer {
    /// Create a pacer targeting `fps` frames per second.
    pub fn new(fps: f32) -> Self {
        let now = Instant::now();
        Self {
            frame_duration: Duration::from_secs_f32(1.0 / fps.max(1.0)),
            last_tick: now,
            start: now,
        }
    }

    /// Seconds elapsed since the pacer was created.
    pub fn elapsed_s(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Sleep until the next frame is due, then record `dt_s` since the
    /// previous tick.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick);
        if dt < self.frame_duration {
            std::thread::sleep(self.frame_duration - dt);
        }
        let tick_now = Instant::now();
        let dt_s = tick_now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = tick_now;
        dt_s
    }
}

/// Frame-accurate lifecycle driver. Construction does not touch the
/// terminal; [`Lifecycle::start`] is the transition into `SettingUp`.
pub struct Lifecycle {
    phase: LifecyclePhase,
    config: LifecycleConfig,
    pacer: FramePacer,
    backend: TerminalBackend,
    compositor: Compositor,
    target: CellBuffer,
}

impl Lifecycle {
    /// Construct a new, uninitialised lifecycle.
    pub fn new(config: LifecycleConfig) -> Self {
        let (w, h) = config.fallback_size;
        let mut compositor = Compositor::new();
        if let Some((min, max)) = config.auto_depth {
            compositor.enable_auto_depth(min, max);
        }
        Self {
            phase: LifecyclePhase::Uninitialised,
            pacer: FramePacer::new(config.target_fps),
            config,
            backend: TerminalBackend::new(w, h),
            compositor,
            target: CellBuffer::new(w, h),
        }
    }

    /// Enable or replace the compositor's auto-depth darken range at
    /// runtime (spec.md §6 `enable_auto_depth(min, max)`), or disable it by
    /// passing `None`.
    pub fn set_auto_depth(&mut self, range: Option<(f32, f32)>) {
        match range {
            Some((min, max)) => self.compositor.enable_auto_depth(min, max),
            None => self.compositor.disable_auto_depth(),
        }
    }

    /// Current phase, primarily for tests and diagnostics.
    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Transition `Uninitialised -> SettingUp -> Running`: enter raw mode,
    /// query the real terminal size (falling back to the configured
    /// default on failure), and size the initial layer stack and frame
    /// buffer to match.
    pub fn start(&mut self, terminal: &mut dyn Terminal, state: &mut AppState) -> Result<()> {
        self.phase = LifecyclePhase::SettingUp;
        terminal.enter_raw_mode()?;
        let size = terminal.size().unwrap_or_else(|_| {
            let (w, h) = self.config.fallback_size;
            crate::geometry::Size::new(w, h)
        });
        state.resize(size.width, size.height);
        self.backend.resize(size.width, size.height);
        self.target.resize(size.width, size.height);
        self.phase = LifecyclePhase::Running;
        Ok(())
    }

    /// Present the composited frame: clear+sort+compose layers into the
    /// frame buffer, then diff and emit through `terminal`.
    pub fn present(
        &mut self,
        state: &AppState,
        terminal: &mut dyn Terminal,
    ) -> Result<()> {
        self.compositor
            .compose(&state.layers, &mut self.target, state.theme_bg);
        self.backend.present(&self.target, terminal)
    }

    /// Begin shutdown: marks the phase `ShuttingDown`. The caller is
    /// expected to run any teardown hook, then call
    /// [`Lifecycle::finish_shutdown`].
    pub fn begin_shutdown(&mut self) {
        if self.phase == LifecyclePhase::Running {
            self.phase = LifecyclePhase::ShuttingDown;
        } else {
            let phase = self.phase;
            warn!(?phase, "begin_shutdown called outside Running");
        }
    }

    /// Complete shutdown: exits raw mode and marks `Exited`.
    pub fn finish_shutdown(&mut self, terminal: &mut dyn Terminal) -> Result<()> {
        terminal.exit_raw_mode()?;
        self.phase = LifecyclePhase::Exited;
        Ok(())
    }

    /// Advance the frame pacer, returning `dt_s` for this frame and
    /// bumping `state.frame`/`state.time_s`/`state.dt_s` exactly once
    /// (spec.md §4.5: "updated exactly once per frame, at the start of
    /// Update").
    pub fn begin_frame(&mut self, state: &mut AppState) {
        let dt_s = self.pacer.tick();
        state.frame += 1;
        state.dt_s = dt_s;
        state.time_s = self.pacer.elapsed_s();
    }

    /// Whether auto-depth assignment was enabled per the lifecycle's
    /// construction-time configuration. Reflects the config the lifecycle
    /// started with, not later [`Lifecycle::set_auto_depth`] calls.
    pub fn auto_depth_enabled(&self) -> bool {
        self.config.auto_depth.is_some()
    }

    /// Own the whole `DrainInput -> Update -> Render -> Present` loop,
    /// starting the terminal, iterating until `runtime.state.running` goes
    /// false or `quit_requested` is set, then shutting down (spec.md §4.5,
    /// §9: "a single top-level `run(runtime, hooks)` owns it" instead of a
    /// host hand-rolling the per-frame composition itself).
    ///
    /// `hooks.poll_input` is called once per frame to collect pending input
    /// events, since the [`Terminal`] trait only models output, not input;
    /// each event is routed through `runtime.events`. `hooks.on_render`, if
    /// present, runs after the registered render handlers, before present.
    ///
    /// The loop runs behind a `catch_unwind` boundary (spec.md §7 "Panics
    /// trip the scoped terminal-restoration path"): on unwind the terminal
    /// is restored exactly as [`RawModeGuard::drop`] would, the panic is
    /// logged, and the process exits with code 1 rather than leaving the
    /// terminal in raw mode for a crashed process.
    pub fn run(
        &mut self,
        runtime: &mut Runtime,
        terminal: &mut dyn Terminal,
        hooks: &mut LifecycleHooks,
    ) -> Result<()> {
        self.start(terminal, &mut runtime.state)?;

        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            while runtime.state.running && !runtime.state.quit_requested {
                self.begin_frame(&mut runtime.state);

                for event in (hooks.poll_input)() {
                    runtime.events.dispatch(&event, &mut runtime.state, None);
                }

                runtime.run_update_handlers(runtime.state.dt_s);
                runtime.run_render_handlers();
                if let Some(on_render) = hooks.on_render.as_mut() {
                    on_render(&mut runtime.state);
                }

                self.present(&runtime.state, terminal)?;
            }
            Ok(())
        }));

        match outcome {
            Ok(Ok(())) => {
                self.begin_shutdown();
                self.finish_shutdown(terminal)
            }
            Ok(Err(err)) => {
                self.begin_shutdown();
                let _ = self.finish_shutdown(terminal);
                Err(err)
            }
            Err(_panic) => {
                if let Err(restore_err) = terminal.exit_raw_mode() {
                    error!(%restore_err, "failed to restore terminal after panic");
                }
                self.phase = LifecyclePhase::Exited;
                error!("frame loop panicked; terminal restored before exit");
                std::process::exit(1);
            }
        }
    }
}

/// Caller-supplied hooks for [`Lifecycle::run`]. `poll_input` is the only
/// required one — it's how a host bridges its own terminal-input source
/// (raw bytes through [`crate::terminal::parse_input_bytes`], or a
/// backend-specific event source) into the loop, since `run` itself has no
/// way to read input through the [`Terminal`] trait alone.
pub struct LifecycleHooks<'a> {
    /// Collect and return pending input events for this frame, called once
    /// per iteration before `Update`.
    pub poll_input: &'a mut dyn FnMut() -> Vec<InputEvent>,
    /// Optional per-frame render hook, run after the registered render
    /// handlers and before present.
    pub on_render: Option<&'a mut dyn FnMut(&mut AppState)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::TestBackend;

    #[test]
    fn app_state_new_has_default_layer() {
        let state = AppState::new(80, 24);
        assert_eq!(state.layers.len(), 1);
        assert!(state.running);
        assert!(!state.quit_requested);
    }

    #[test]
    fn resize_updates_term_dims_and_layers() {
        let mut state = AppState::new(80, 24);
        state.resize(100, 30);
        assert_eq!(state.term_w, 100);
        assert_eq!(state.term_h, 30);
        let buf = state.layers.resolve("default").expect("default layer exists");
        assert_eq!(buf.size(), crate::geometry::Size::new(100, 30));
    }

    #[test]
    fn start_transitions_to_running() {
        let mut lifecycle = Lifecycle::new(LifecycleConfig::default());
        let mut terminal = TestBackend::new(80, 24);
        let mut state = AppState::new(80, 24);
        assert_eq!(lifecycle.phase(), LifecyclePhase::Uninitialised);
        lifecycle.start(&mut terminal, &mut state).expect("start succeeds");
        assert_eq!(lifecycle.phase(), LifecyclePhase::Running);
        assert_eq!(state.term_w, 80);
    }

    #[test]
    fn shutdown_sequence() {
        let mut lifecycle = Lifecycle::new(LifecycleConfig::default());
        let mut terminal = TestBackend::new(80, 24);
        let mut state = AppState::new(80, 24);
        lifecycle.start(&mut terminal, &mut state).expect("start succeeds");
        lifecycle.begin_shutdown();
        assert_eq!(lifecycle.phase(), LifecyclePhase::ShuttingDown);
        lifecycle.finish_shutdown(&mut terminal).expect("shutdown succeeds");
        assert_eq!(lifecycle.phase(), LifecyclePhase::Exited);
    }

    #[test]
    fn begin_shutdown_outside_running_is_noop() {
        let mut lifecycle = Lifecycle::new(LifecycleConfig::default());
        lifecycle.begin_shutdown();
        assert_eq!(lifecycle.phase(), LifecyclePhase::Uninitialised);
    }

    #[test]
    fn begin_frame_advances_counters_once() {
        let mut lifecycle = Lifecycle::new(LifecycleConfig::default());
        let mut state = AppState::new(80, 24);
        lifecycle.begin_frame(&mut state);
        assert_eq!(state.frame, 1);
        lifecycle.begin_frame(&mut state);
        assert_eq!(state.frame, 2);
    }

    #[test]
    fn raw_mode_guard_restores_on_drop() {
        let mut terminal = TestBackend::new(80, 24);
        {
            let _guard = RawModeGuard::acquire(&mut terminal).expect("acquire succeeds");
            assert!(terminal.is_raw_mode());
        }
        assert!(!terminal.is_raw_mode());
    }

    #[test]
    fn run_drains_input_updates_renders_and_presents_each_frame() {
        let mut lifecycle = Lifecycle::new(LifecycleConfig::default());
        let mut terminal = TestBackend::new(4, 1);
        let mut runtime = Runtime::new(4, 1);

        let frames_seen: std::rc::Rc<std::cell::RefCell<u64>> = Default::default();
        let frames_seen_render = frames_seen.clone();
        runtime
            .register_render(
                "hud",
                0,
                Box::new(move |state| {
                    *frames_seen_render.borrow_mut() = state.frame;
                    crate::drawing::draw(
                        &mut state.layers,
                        "default",
                        0,
                        0,
                        "R",
                        Style::default(),
                    );
                }),
            )
            .unwrap();

        // Three frames of no-op input, then a quit key on the fourth.
        let mut pending: Vec<Vec<InputEvent>> = vec![
            vec![],
            vec![],
            vec![],
            vec![InputEvent::Key(crate::event::KeyEvent::plain(
                crate::event::KeyCode::Char('q'),
            ))],
        ];
        let mut poll_input = move || {
            if pending.is_empty() {
                Vec::new()
            } else {
                pending.remove(0)
            }
        };
        let mut hooks = LifecycleHooks {
            poll_input: &mut poll_input,
            on_render: None,
        };

        lifecycle.run(&mut runtime, &mut terminal, &mut hooks).expect("run succeeds");

        assert_eq!(lifecycle.phase(), LifecyclePhase::Exited);
        assert!(runtime.state.quit_requested);
        assert_eq!(*frames_seen.borrow(), 4);
        assert!(!terminal.is_raw_mode());
    }

    #[test]
    fn present_writes_through_backend() {
        let mut lifecycle = Lifecycle::new(LifecycleConfig::default());
        let mut terminal = TestBackend::new(4, 1);
        let mut state = AppState::new(4, 1);
        lifecycle.start(&mut terminal, &mut state).expect("start succeeds");
        crate::drawing::draw(&mut state.layers, "default", 0, 0, "X", Style::default());
        lifecycle.present(&state, &mut terminal).expect("present succeeds");
        let out = String::from_utf8_lossy(terminal.buffer());
        assert!(out.contains('X'));
    }

    #[test]
    fn auto_depth_config_is_applied_at_construction() {
        let config = LifecycleConfig { auto_depth: Some((0.1, 1.0)), ..LifecycleConfig::default() };
        let lifecycle = Lifecycle::new(config);
        assert!(lifecycle.auto_depth_enabled());
    }

    #[test]
    fn set_auto_depth_toggles_at_runtime() {
        let mut lifecycle = Lifecycle::new(LifecycleConfig::default());
        assert!(!lifecycle.auto_depth_enabled());
        lifecycle.set_auto_depth(Some((0.0, 1.0)));
        // `auto_depth_enabled` reflects construction-time config only; the
        // compositor itself is what actually changed here.
        assert!(!lifecycle.auto_depth_enabled());
        lifecycle.set_auto_depth(None);
    }
}

//! Pooled particle system (spec.md §4.9, SPEC_FULL.md §3.9): a fixed-size
//! array of particles, active/inactive by flag rather than allocation, with
//! either classic gravity/wind physics or a per-particle
//! [`crate::graph::Graph`] driving vertical acceleration.

use std::collections::HashMap;

use crate::buffer::CellBuffer;
use crate::color::Rgb;
use crate::detrand::Rng;
use crate::graph::Graph;
use crate::style::Style;

/// A single slot in a [`ParticleSystem`]'s pool.
#[derive(Clone, Debug)]
pub struct Particle {
    /// Whether this slot currently holds a live particle.
    pub active: bool,
    /// Horizontal position, in cell columns.
    pub x: f64,
    /// Vertical position, in cell rows.
    pub y: f64,
    /// Horizontal velocity, cells per second.
    pub vx: f64,
    /// Vertical velocity, cells per second.
    pub vy: f64,
    /// Remaining lifetime in seconds.
    pub life: f64,
    /// Lifetime this particle was spawned with, for `plife_fraction`.
    pub max_life: f64,
    /// Grapheme drawn for this particle.
    pub char: String,
    /// Color drawn for this particle.
    pub color: Rgb,
}

impl Particle {
    fn dormant() -> Self {
        Particle {
            active: false,
            x: 0.0,
            y: 0.0,
            vx: 0.0,
            vy: 0.0,
            life: 0.0,
            max_life: 0.0,
            char: String::new(),
            color: Rgb::new(255, 255, 255),
        }
    }

    /// Fraction of lifetime consumed so far, in `[0.0, 1.0]`.
    pub fn life_fraction(&self) -> f64 {
        if self.max_life <= 0.0 {
            1.0
        } else {
            (1.0 - self.life / self.max_life).clamp(0.0, 1.0)
        }
    }
}

/// Shape an emitter spawns particles within.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EmitterShape {
    /// A single fixed point.
    Point(f64, f64),
    /// A line segment between two points.
    Line(f64, f64, f64, f64),
    /// A rectangle, top-left `(x, y)`, size `(w, h)`.
    Rect(f64, f64, f64, f64),
}

impl EmitterShape {
    fn sample(self, rng: &mut Rng) -> (f64, f64) {
        match self {
            EmitterShape::Point(x, y) => (x, y),
            EmitterShape::Line(x1, y1, x2, y2) => {
                let t = rng.next_f64();
                (x1 + (x2 - x1) * t, y1 + (y2 - y1) * t)
            }
            EmitterShape::Rect(x, y, w, h) => (x + rng.next_f64() * w, y + rng.next_f64() * h),
        }
    }
}

/// Parameters governing how [`ParticleSystem::emit`] spawns new particles.
#[derive(Clone, Debug)]
pub struct EmitterParams {
    /// Spawn shape.
    pub shape: EmitterShape,
    /// Horizontal velocity sample range.
    pub vx_range: (f64, f64),
    /// Vertical velocity sample range.
    pub vy_range: (f64, f64),
    /// Lifetime sample range, in seconds.
    pub life_range: (f64, f64),
    /// Pool of graphemes a spawned particle's `char` is chosen from.
    pub chars: Vec<String>,
    /// Pool of colors a spawned particle's `color` is chosen from.
    pub colors: Vec<Rgb>,
}

impl Default for EmitterParams {
    fn default() -> Self {
        EmitterParams {
            shape: EmitterShape::Point(0.0, 0.0),
            vx_range: (0.0, 0.0),
            vy_range: (0.0, 0.0),
            life_range: (1.0, 1.0),
            chars: vec!["*".to_string()],
            colors: vec![Rgb::new(255, 255, 255)],
        }
    }
}

fn sample_range(rng: &mut Rng, range: (f64, f64)) -> f64 {
    let (lo, hi) = range;
    if hi <= lo { lo } else { lo + rng.next_f64() * (hi - lo) }
}

/// Classic physics applied when a particle has no `motion_graph`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicsParams {
    /// Downward acceleration, cells/s².
    pub gravity: f64,
    /// Constant wind acceleration `(x, y)`, cells/s².
    pub wind: (f64, f64),
    /// Amplitude of a per-frame noise nudge applied to horizontal velocity.
    pub turbulence: f64,
    /// Velocity multiplier kept on collision `Bounce`.
    pub restitution: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        PhysicsParams { gravity: 9.8, wind: (0.0, 0.0), turbulence: 0.0, restitution: 0.5 }
    }
}

/// What happens to a particle that dies or hits a non-transparent cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollisionResponse {
    /// Reflect velocity, scaled by `PhysicsParams::restitution`.
    Bounce,
    /// Freeze in place and switch to `stick_char`.
    Stick,
    /// Deactivate immediately.
    Destroy,
}

/// Collision behaviour configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct CollisionParams {
    /// Whether collision against the frame buffer is checked at all.
    pub enabled: bool,
    /// Response applied on collision or life expiring.
    pub response: CollisionResponse,
    /// Grapheme substituted in on `Stick`.
    pub stick_char: String,
}

impl Default for CollisionParams {
    fn default() -> Self {
        CollisionParams { enabled: false, response: CollisionResponse::Destroy, stick_char: "#".to_string() }
    }
}

/// A pooled, fixed-capacity particle system.
pub struct ParticleSystem {
    particles: Vec<Particle>,
    active_count: u32,
    rng: Rng,
    /// Spawn configuration consulted by [`ParticleSystem::emit`].
    pub emitter: EmitterParams,
    /// Physics configuration consulted when `motion_graph` is unset.
    pub physics: PhysicsParams,
    /// Collision configuration.
    pub collision: CollisionParams,
    /// Per-particle graph overriding vertical acceleration.
    pub motion_graph: Option<Graph>,
    /// Per-particle graph overriding color; evaluated to a `Value::Color`.
    pub color_graph: Option<Graph>,
    /// Per-particle graph overriding the drawn grapheme, via a palette
    /// index truncated from its scalar output.
    pub character_graph: Option<Graph>,
}

impl ParticleSystem {
    /// Create a system with room for `capacity` particles, seeded for
    /// reproducible spawn/physics sequences.
    pub fn new(capacity: usize, seed: u64) -> Self {
        ParticleSystem {
            particles: (0..capacity).map(|_| Particle::dormant()).collect(),
            active_count: 0,
            rng: Rng::new(seed),
            emitter: EmitterParams::default(),
            physics: PhysicsParams::default(),
            collision: CollisionParams::default(),
            motion_graph: None,
            color_graph: None,
            character_graph: None,
        }
    }

    /// Pool capacity (fixed at construction).
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Number of currently active particles.
    pub fn active_count(&self) -> u32 {
        self.active_count
    }

    /// Read-only access to the particle pool, inactive slots included.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Spawn up to `n` particles into free slots. Silently spawns fewer if
    /// the pool is full.
    pub fn emit(&mut self, n: u32) {
        for _ in 0..n {
            let Some(slot) = self.particles.iter().position(|p| !p.active) else { break };
            let (x, y) = self.emitter.shape.sample(&mut self.rng);
            let vx = sample_range(&mut self.rng, self.emitter.vx_range);
            let vy = sample_range(&mut self.rng, self.emitter.vy_range);
            let life = sample_range(&mut self.rng, self.emitter.life_range);
            let char = self
                .rng
                .choice(&self.emitter.chars)
                .cloned()
                .unwrap_or_else(|| "*".to_string());
            let color = self.rng.choice(&self.emitter.colors).copied().unwrap_or(Rgb::new(255, 255, 255));

            let p = &mut self.particles[slot];
            p.active = true;
            p.x = x;
            p.y = y;
            p.vx = vx;
            p.vy = vy;
            p.life = life;
            p.max_life = life;
            p.char = char;
            p.color = color;
            self.active_count += 1;
        }
    }

    /// Advance every active particle by `dt` seconds. `frame_buffer` and
    /// `frame`, if supplied, enable collision detection against existing
    /// rendered content.
    pub fn update(&mut self, dt: f64, frame_buffer: Option<&CellBuffer>, frame: u64) {
        for i in 0..self.particles.len() {
            if !self.particles[i].active {
                continue;
            }

            if let Some(graph) = self.motion_graph.as_mut() {
                let (px, py, pvx, pvy, plife_fraction) = {
                    let p = &self.particles[i];
                    (p.x, p.y, p.vx, p.vy, p.life_fraction())
                };
                let mut custom = HashMap::new();
                custom.insert("px".to_string(), px);
                custom.insert("py".to_string(), py);
                custom.insert("pvx".to_string(), pvx);
                custom.insert("pvy".to_string(), pvy);
                custom.insert("page".to_string(), self.particles[i].max_life - self.particles[i].life);
                custom.insert("plife_fraction".to_string(), plife_fraction);
                custom.insert("frame".to_string(), frame as f64);
                let accel = graph.evaluate_control(custom);
                self.particles[i].vy += accel * dt;
            } else {
                let turbulence = self.physics.turbulence;
                let nudge = if turbulence != 0.0 {
                    let raw = crate::detrand::noise::int_hash(
                        (frame as i64).wrapping_add(i as i64 * 7919),
                        self.rng.next_u64(),
                    );
                    (raw as f64 / 65535.0 - 0.5) * 2.0 * turbulence
                } else {
                    0.0
                };
                let p = &mut self.particles[i];
                p.vy += (self.physics.gravity + self.physics.wind.1) * dt;
                p.vx += self.physics.wind.0 * dt + nudge;
            }

            let p = &mut self.particles[i];
            p.x += p.vx * dt;
            p.y += p.vy * dt;
            p.life -= dt;

            let collided = self.collision.enabled
                && frame_buffer.is_some_and(|fb| {
                    let (cx, cy) = (p.x.round(), p.y.round());
                    cx >= 0.0
                        && cy >= 0.0
                        && cx < fb.width() as f64
                        && cy < fb.height() as f64
                        && !fb.get_cell(cx as u16, cy as u16).is_transparent()
                });

            if p.life <= 0.0 || collided {
                self.apply_collision_response(i);
            }
        }
    }

    fn apply_collision_response(&mut self, i: usize) {
        match self.collision.response {
            CollisionResponse::Bounce => {
                let restitution = self.physics.restitution;
                let p = &mut self.particles[i];
                p.vy = -p.vy * restitution;
                p.vx *= restitution;
                // Bounce keeps the particle alive unless its life is spent.
                if p.life <= 0.0 {
                    p.active = false;
                    self.active_count = self.active_count.saturating_sub(1);
                }
            }
            CollisionResponse::Stick => {
                let stick_char = self.collision.stick_char.clone();
                let p = &mut self.particles[i];
                p.vx = 0.0;
                p.vy = 0.0;
                p.char = stick_char;
            }
            CollisionResponse::Destroy => {
                self.particles[i].active = false;
                self.active_count = self.active_count.saturating_sub(1);
            }
        }
    }

    /// Draw every active particle's grapheme and color into `into`, at its
    /// rounded position, when in bounds.
    pub fn render(&mut self, into: &mut CellBuffer) {
        for i in 0..self.particles.len() {
            let (active, x, y, life_fraction) = {
                let p = &self.particles[i];
                (p.active, p.x, p.y, p.life_fraction())
            };
            if !active {
                continue;
            }
            let color = if let Some(graph) = self.color_graph.as_mut() {
                let mut custom = HashMap::new();
                custom.insert("plife_fraction".to_string(), life_fraction);
                let value = graph.evaluate_control_value(custom);
                let c = value.as_color();
                Rgb::new(c.r, c.g, c.b)
            } else {
                self.particles[i].color
            };
            let char = if let Some(graph) = self.character_graph.as_mut() {
                let chars = &self.emitter.chars;
                if chars.is_empty() {
                    self.particles[i].char.clone()
                } else {
                    let mut custom = HashMap::new();
                    custom.insert("plife_fraction".to_string(), life_fraction);
                    let idx_f = graph.evaluate_control(custom);
                    let idx = (idx_f.max(0.0) as usize).min(chars.len() - 1);
                    chars[idx].clone()
                }
            } else {
                self.particles[i].char.clone()
            };

            let (cx, cy) = (x.round(), y.round());
            if cx < 0.0 || cy < 0.0 || cx >= into.width() as f64 || cy >= into.height() as f64 {
                continue;
            }
            into.write(cx as u16, cy as u16, &char, Style::new().fg(color));
        }
    }
}

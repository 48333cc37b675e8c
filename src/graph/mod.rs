//! Unified dataflow graph (spec.md §4.7, SPEC_FULL.md §3.7): a small,
//! pull-based DAG shared by audio synthesis, pixel shading, and particle
//! motion/color scripting. Nodes are domain-tagged (`Audio`/`Visual`/
//! `Control`) but the evaluator itself is domain-agnostic — only a few node
//! kinds (currently `Noise`) read their domain to decide how to interpret
//! the evaluation context.

mod nodes;
pub mod param_queue;

use std::collections::HashMap;

pub use nodes::{
    Domain, EasingKind, EvalContext, Math2DOp, MathOp, Node, NodeKind, NodeRef, NoiseKind,
    Palette, Value, WaveOp,
};

use crate::error::{GraphError, Result};

/// A pull-based dataflow graph. Evaluating a sink walks backward through its
/// inputs, memoizing each node's result for the duration of a single
/// top-level `evaluate*` call.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    cache_epoch: u64,
    custom: HashMap<String, f64>,
    audio_sink: Option<NodeRef>,
    visual_sink: Option<NodeRef>,
    control_sink: Option<NodeRef>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Graph::default()
    }

    /// Number of nodes currently in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Inspect a node by index.
    pub fn node(&self, idx: NodeRef) -> Option<&Node> {
        self.nodes.get(idx)
    }

    fn push_node(&mut self, kind: NodeKind, domain: Domain) -> NodeRef {
        self.nodes.push(Node::new(kind, domain));
        self.nodes.len() - 1
    }

    /// Add a constant scalar node.
    pub fn constant(&mut self, value: f64) -> NodeRef {
        self.push_node(NodeKind::Constant(value), Domain::Control)
    }

    /// Add a node reading a named scalar from the evaluation context.
    pub fn input(&mut self, name: impl Into<String>) -> NodeRef {
        self.push_node(NodeKind::Input(name.into()), Domain::Control)
    }

    /// Add a scalar arithmetic node. Connect its operand(s) afterward with
    /// [`Graph::connect`].
    pub fn math(&mut self, op: MathOp, domain: Domain) -> NodeRef {
        self.push_node(NodeKind::Math(op), domain)
    }

    /// Add a waveform node. Connect a phase input afterward.
    pub fn wave(&mut self, op: WaveOp, domain: Domain) -> NodeRef {
        self.push_node(NodeKind::Wave(op), domain)
    }

    /// Add a noise node. `octaves` is ignored unless `kind` is
    /// [`NoiseKind::Fractal`].
    pub fn noise(&mut self, kind: NoiseKind, scale: i64, octaves: u32, seed: u64, domain: Domain) -> NodeRef {
        self.push_node(NodeKind::Noise { kind, scale, octaves, seed }, domain)
    }

    /// Add a self-driving oscillator (Audio domain; reads `time_s` directly,
    /// no input connection needed).
    pub fn oscillator(&mut self, freq: f64, waveform: WaveOp) -> NodeRef {
        self.push_node(NodeKind::Oscillator { freq, waveform }, Domain::Audio)
    }

    /// Add a node mapping a scalar input through a named gradient.
    pub fn color(&mut self, palette: Palette, min: f64, max: f64) -> NodeRef {
        self.push_node(NodeKind::Color { palette, min, max }, Domain::Visual)
    }

    /// Add an easing-curve node.
    pub fn easing(&mut self, kind: EasingKind, domain: Domain) -> NodeRef {
        self.push_node(NodeKind::Easing(kind), domain)
    }

    /// Add a node converting the context's pixel coordinates to a polar
    /// offset from `(cx, cy)`.
    pub fn polar(&mut self, cx: f64, cy: f64) -> NodeRef {
        self.push_node(NodeKind::Polar { cx, cy }, Domain::Visual)
    }

    /// Add a vector arithmetic node.
    pub fn math2d(&mut self, op: Math2DOp, domain: Domain) -> NodeRef {
        self.push_node(NodeKind::Math2D(op), domain)
    }

    /// Add an Audio-domain sink and register it as the target of
    /// [`Graph::evaluate_audio`].
    pub fn audio_out(&mut self) -> NodeRef {
        let idx = self.push_node(NodeKind::AudioOut, Domain::Audio);
        self.audio_sink = Some(idx);
        idx
    }

    /// Add a Visual-domain sink and register it as the target of
    /// [`Graph::evaluate_pixel`].
    pub fn buffer_out(&mut self) -> NodeRef {
        let idx = self.push_node(NodeKind::BufferOut, Domain::Visual);
        self.visual_sink = Some(idx);
        idx
    }

    /// Add a Control-domain sink and register it as the target of
    /// [`Graph::evaluate_control`].
    pub fn value_out(&mut self) -> NodeRef {
        let idx = self.push_node(NodeKind::ValueOut, Domain::Control);
        self.control_sink = Some(idx);
        idx
    }

    /// Connect `src`'s output as the next input of `dst`. Rejects the edge
    /// (without mutating the graph) if it would create a cycle: that is, if
    /// `src` already, transitively, depends on `dst`.
    pub fn connect(&mut self, src: NodeRef, dst: NodeRef) -> Result<()> {
        if src >= self.nodes.len() {
            return Err(GraphError::InvalidNode { index: src }.into());
        }
        if dst >= self.nodes.len() {
            return Err(GraphError::InvalidNode { index: dst }.into());
        }
        if src == dst || self.reaches(src, dst) {
            return Err(GraphError::CycleDetected { src, dst }.into());
        }
        self.nodes[dst].inputs.push(src);
        Ok(())
    }

    /// Whether `start` can reach `target` by following existing input edges
    /// (i.e. whether `start` transitively depends on `target`).
    fn reaches(&self, start: NodeRef, target: NodeRef) -> bool {
        let mut stack = vec![start];
        let mut visited = std::collections::HashSet::new();
        while let Some(cur) = stack.pop() {
            if cur == target {
                return true;
            }
            if !visited.insert(cur) {
                continue;
            }
            if let Some(node) = self.nodes.get(cur) {
                stack.extend(node.inputs.iter().copied());
            }
        }
        false
    }

    /// Set a named scalar visible to every [`NodeKind::Input`] node in this
    /// graph, for every subsequent evaluation.
    pub fn set_input(&mut self, name: impl Into<String>, value: f64) {
        self.custom.insert(name.into(), value);
    }

    /// Overwrite a [`NodeKind::Constant`] node's value in place. This is the
    /// mutation a [`param_queue::ParamQueue`] consumer applies each time it
    /// drains a pending update: push from the main thread, drain and apply
    /// here from the audio callback. Errors if `node` doesn't exist or isn't
    /// a `Constant`.
    pub fn set_constant(&mut self, node: NodeRef, value: f64) -> Result<()> {
        match self.nodes.get_mut(node) {
            Some(n) => match &mut n.kind {
                NodeKind::Constant(v) => {
                    *v = value;
                    Ok(())
                }
                _ => Err(GraphError::InvalidNode { index: node }.into()),
            },
            None => Err(GraphError::InvalidNode { index: node }.into()),
        }
    }

    /// Evaluate an arbitrary node against a caller-built context. Bumps the
    /// cache epoch, so repeated calls re-evaluate rather than returning a
    /// stale memoized value from a previous call.
    pub fn evaluate(&mut self, sink: NodeRef, mut ctx: EvalContext) -> Result<Value> {
        if sink >= self.nodes.len() {
            return Err(GraphError::InvalidNode { index: sink }.into());
        }
        self.cache_epoch += 1;
        for (k, v) in &self.custom {
            ctx.custom.entry(k.clone()).or_insert(*v);
        }
        Ok(eval_node(&mut self.nodes, sink, &ctx, self.cache_epoch))
    }

    /// Evaluate the registered Audio sink at a given sample, returning the
    /// scalar sample value. Returns `0.0` if no sink was registered via
    /// [`Graph::audio_out`].
    pub fn evaluate_audio(&mut self, sample_index: u64, time_s: f64, sample_rate: u32) -> f64 {
        let Some(sink) = self.audio_sink else { return 0.0 };
        let ctx = EvalContext { sample_index, time_s, sample_rate, ..Default::default() };
        self.evaluate(sink, ctx).map(Value::as_scalar).unwrap_or(0.0)
    }

    /// Evaluate the registered Visual sink at a given pixel, returning its
    /// value. Returns [`Value::default`] if no sink was registered via
    /// [`Graph::buffer_out`].
    pub fn evaluate_pixel(&mut self, x: i64, y: i64, frame: u64) -> Value {
        let Some(sink) = self.visual_sink else { return Value::default() };
        let ctx = EvalContext { x, y, frame, ..Default::default() };
        self.evaluate(sink, ctx).unwrap_or_default()
    }

    /// Evaluate the registered Control sink with a caller-supplied set of
    /// named scalars layered over the graph's persistent ones. Returns
    /// `0.0` if no sink was registered via [`Graph::value_out`].
    pub fn evaluate_control(&mut self, custom: HashMap<String, f64>) -> f64 {
        self.evaluate_control_value(custom).as_scalar()
    }

    /// Like [`Graph::evaluate_control`] but returns the full [`Value`]
    /// rather than casting it to a scalar — useful when the control sink
    /// produces a color or vector (e.g. a particle system's `color_graph`).
    pub fn evaluate_control_value(&mut self, custom: HashMap<String, f64>) -> Value {
        let Some(sink) = self.control_sink else { return Value::default() };
        let ctx = EvalContext { custom, ..Default::default() };
        self.evaluate(sink, ctx).unwrap_or_default()
    }
}

fn eval_node(nodes: &mut [Node], idx: NodeRef, ctx: &EvalContext, epoch: u64) -> Value {
    if nodes[idx].cache_epoch == epoch {
        if let Some(v) = nodes[idx].cached_value {
            return v;
        }
    }
    let kind = nodes[idx].kind.clone();
    let domain = nodes[idx].domain;
    let input_refs = nodes[idx].inputs.clone();
    let input_values: Vec<Value> = input_refs.iter().map(|&i| eval_node(nodes, i, ctx, epoch)).collect();
    let value = nodes::compute(&kind, domain, &input_values, ctx);
    nodes[idx].cached_value = Some(value);
    nodes[idx].cache_epoch = epoch;
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_evaluates_to_itself() {
        let mut g = Graph::new();
        let c = g.constant(2.5);
        let v = g.evaluate(c, EvalContext::default()).unwrap();
        assert_eq!(v.as_scalar(), 2.5);
    }

    #[test]
    fn math_add_combines_two_constants() {
        let mut g = Graph::new();
        let a = g.constant(3.0);
        let b = g.constant(4.0);
        let add = g.math(MathOp::Add, Domain::Control);
        g.connect(a, add).unwrap();
        g.connect(b, add).unwrap();
        let v = g.evaluate(add, EvalContext::default()).unwrap();
        assert_eq!(v.as_scalar(), 7.0);
    }

    #[test]
    fn connect_rejects_self_loop() {
        let mut g = Graph::new();
        let n = g.constant(1.0);
        let err = g.connect(n, n).unwrap_err();
        assert!(matches!(err, crate::error::Error::Graph(GraphError::CycleDetected { .. })));
    }

    #[test]
    fn connect_rejects_cycle_across_three_nodes() {
        let mut g = Graph::new();
        let a = g.math(MathOp::Abs, Domain::Control);
        let b = g.math(MathOp::Abs, Domain::Control);
        let c = g.math(MathOp::Abs, Domain::Control);
        g.connect(a, b).unwrap();
        g.connect(b, c).unwrap();
        // c already depends on a (via b); wiring c back into a would cycle.
        let err = g.connect(c, a).unwrap_err();
        assert!(matches!(err, crate::error::Error::Graph(GraphError::CycleDetected { .. })));
    }

    #[test]
    fn connect_allows_diamond_reuse_of_a_shared_input() {
        let mut g = Graph::new();
        let shared = g.constant(5.0);
        let left = g.math(MathOp::Abs, Domain::Control);
        let right = g.math(MathOp::Abs, Domain::Control);
        let sink = g.math(MathOp::Add, Domain::Control);
        g.connect(shared, left).unwrap();
        g.connect(shared, right).unwrap();
        g.connect(left, sink).unwrap();
        g.connect(right, sink).unwrap();
        let v = g.evaluate(sink, EvalContext::default()).unwrap();
        assert_eq!(v.as_scalar(), 10.0);
    }

    #[test]
    fn connect_invalid_index_errors() {
        let mut g = Graph::new();
        let n = g.constant(1.0);
        assert!(g.connect(n, 99).is_err());
        assert!(g.connect(99, n).is_err());
    }

    #[test]
    fn set_constant_overwrites_value() {
        let mut g = Graph::new();
        let c = g.constant(1.0);
        assert_eq!(g.evaluate(c, EvalContext::default()).unwrap().as_scalar(), 1.0);
        g.set_constant(c, 9.0).unwrap();
        assert_eq!(g.evaluate(c, EvalContext::default()).unwrap().as_scalar(), 9.0);
    }

    #[test]
    fn set_constant_rejects_non_constant_node() {
        let mut g = Graph::new();
        let n = g.math(MathOp::Abs, Domain::Control);
        assert!(g.set_constant(n, 1.0).is_err());
    }

    #[test]
    fn set_constant_rejects_invalid_index() {
        let mut g = Graph::new();
        assert!(g.set_constant(42, 1.0).is_err());
    }

    #[test]
    fn input_node_reads_context_custom() {
        let mut g = Graph::new();
        let n = g.input("px");
        let mut custom = HashMap::new();
        custom.insert("px".to_string(), 42.0);
        let ctx = EvalContext { custom, ..Default::default() };
        let v = g.evaluate(n, ctx).unwrap();
        assert_eq!(v.as_scalar(), 42.0);
    }

    #[test]
    fn set_input_persists_across_evaluations() {
        let mut g = Graph::new();
        let n = g.input("seed");
        g.set_input("seed", 7.0);
        assert_eq!(g.evaluate(n, EvalContext::default()).unwrap().as_scalar(), 7.0);
        assert_eq!(g.evaluate(n, EvalContext::default()).unwrap().as_scalar(), 7.0);
    }

    #[test]
    fn evaluate_audio_uses_registered_sink() {
        let mut g = Graph::new();
        let osc = g.oscillator(1.0, WaveOp::Sin);
        let out = g.audio_out();
        g.connect(osc, out).unwrap();
        let v0 = g.evaluate_audio(0, 0.0, 44100);
        assert!((v0 - 0.0).abs() < 1e-9);
    }

    #[test]
    fn evaluate_audio_without_sink_is_zero() {
        let mut g = Graph::new();
        assert_eq!(g.evaluate_audio(0, 0.0, 44100), 0.0);
    }

    #[test]
    fn evaluate_pixel_uses_registered_sink() {
        let mut g = Graph::new();
        let noise = g.noise(NoiseKind::White, 1, 1, 99, Domain::Visual);
        let out = g.buffer_out();
        g.connect(noise, out).unwrap();
        let v = g.evaluate_pixel(3, 4, 0);
        let scalar = v.as_scalar();
        assert!((0.0..=1.0).contains(&scalar));
    }

    #[test]
    fn noise_node_is_deterministic_across_calls() {
        let mut g = Graph::new();
        let noise = g.noise(NoiseKind::Fractal, 8, 4, 123, Domain::Visual);
        let out = g.buffer_out();
        g.connect(noise, out).unwrap();
        let a = g.evaluate_pixel(10, 10, 0).as_scalar();
        let b = g.evaluate_pixel(10, 10, 1);
        assert_eq!(a, b.as_scalar());
    }

    #[test]
    fn easing_node_clamps_and_maps_through_curve() {
        let mut g = Graph::new();
        let t = g.constant(0.5);
        let ease = g.easing(EasingKind::Linear, Domain::Control);
        g.connect(t, ease).unwrap();
        let v = g.evaluate(ease, EvalContext::default()).unwrap();
        assert!((v.as_scalar() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn polar_node_reads_pixel_coordinates() {
        let mut g = Graph::new();
        let polar = g.polar(0.0, 0.0);
        let ctx = EvalContext { x: 3, y: 4, ..Default::default() };
        let v = g.evaluate(polar, ctx).unwrap();
        let (dist, _angle) = v.as_vector();
        assert!((dist - 5.0).abs() < 1e-9);
    }

    #[test]
    fn math2d_length_of_polar_output() {
        let mut g = Graph::new();
        let polar = g.polar(0.0, 0.0);
        let len = g.math2d(Math2DOp::Length, Domain::Visual);
        g.connect(polar, len).unwrap();
        let ctx = EvalContext { x: 6, y: 8, ..Default::default() };
        let v = g.evaluate(len, ctx).unwrap();
        assert!((v.as_scalar() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn color_node_maps_scalar_to_gradient() {
        let mut g = Graph::new();
        let t = g.constant(1.0);
        let gradient = g.color(Palette::Grayscale, 0.0, 1.0);
        g.connect(t, gradient).unwrap();
        let v = g.evaluate(gradient, EvalContext::default()).unwrap();
        assert_eq!(v.as_color(), crate::detrand::color::RgbColor::new(255, 255, 255));
    }

    #[test]
    fn sink_nodes_pass_through_single_input() {
        let mut g = Graph::new();
        let c = g.constant(9.0);
        let out = g.value_out();
        g.connect(c, out).unwrap();
        let v = g.evaluate_control(HashMap::new());
        assert_eq!(v, 9.0);
    }

    #[test]
    fn missing_input_defaults_to_zero() {
        let mut g = Graph::new();
        let add = g.math(MathOp::Add, Domain::Control);
        let v = g.evaluate(add, EvalContext::default()).unwrap();
        assert_eq!(v.as_scalar(), 0.0);
    }

    #[test]
    fn div_by_zero_is_zero_not_nan() {
        let mut g = Graph::new();
        let a = g.constant(5.0);
        let div = g.math(MathOp::Div, Domain::Control);
        g.connect(a, div).unwrap();
        let v = g.evaluate(div, EvalContext::default()).unwrap();
        assert_eq!(v.as_scalar(), 0.0);
    }
}

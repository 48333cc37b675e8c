//! Error taxonomy for tstorie-core.
//!
//! Errors are grouped by kind, not by originating type, matching the way
//! callers actually need to handle them: a `LayerError` degrades to a
//! no-op at the script boundary, a `GraphError` is surfaced to whoever is
//! building the graph, and a `TerminalUnavailable` is fatal at startup.

use std::io;

/// Failure modes for [`crate::layer_stack::LayerStack`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum LayerError {
    /// `add_layer` was called with an id already present in the stack.
    #[error("layer id already exists: {id}")]
    DuplicateLayerId {
        /// The id that collided.
        id: String,
    },
    /// `remove_layer`, `resolve`, or a set-property call referenced an id
    /// (or out-of-range index) that does not exist.
    #[error("unknown layer: {id}")]
    UnknownLayer {
        /// The id or index (as text) that could not be resolved.
        id: String,
    },
}

/// Failure modes for [`crate::graph::Graph`] construction and evaluation.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum GraphError {
    /// `connect(src, dst)` would have introduced a cycle.
    #[error("connecting node {src} to node {dst} would create a cycle")]
    CycleDetected {
        /// The would-be source node.
        src: usize,
        /// The would-be destination node.
        dst: usize,
    },
    /// An operation referenced a node index that does not exist in the graph.
    #[error("invalid node index: {index}")]
    InvalidNode {
        /// The offending index.
        index: usize,
    },
}

/// Failure modes for [`crate::png_transport`] operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum TransportError {
    /// The input bytes do not start with the PNG signature.
    #[error("not a PNG file: bad signature")]
    Signature,
    /// A chunk's CRC32 did not match its stored value.
    #[error("corrupt chunk: {chunk_type}")]
    CorruptChunk {
        /// The four-byte chunk type tag, as text.
        chunk_type: String,
    },
    /// `extract` found no `tEXt` chunk with the requested keyword.
    #[error("no tEXt chunk found for keyword: {keyword}")]
    MissingKeyword {
        /// The keyword that was searched for.
        keyword: String,
    },
    /// The embedded payload failed to inflate.
    #[error("failed to inflate payload: {0}")]
    InflateError(String),
}

/// The top-level error type for tstorie-core.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// stdout is not a TTY, or raw mode could not be entered. Fatal at
    /// startup (exit code 2 per spec.md §6).
    #[error("terminal unavailable: {0}")]
    TerminalUnavailable(String),

    /// A layer-stack operation failed. Script-layer draw calls treat this
    /// as a no-op rather than propagating; only explicit management calls
    /// (`add_layer`, `remove_layer`, `resolve`) surface it.
    #[error("layer error: {0}")]
    Layer(#[from] LayerError),

    /// A graph construction or evaluation call failed.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// A PNG chunk transport call failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// An input byte sequence could not be parsed. Non-fatal: the offending
    /// bytes are dropped and input continues; this variant exists so tests
    /// can assert on what was dropped.
    #[error("input decode error: {0}")]
    InputDecode(String),

    /// Should be unreachable: every write into a `CellBuffer` clips silently
    /// instead of panicking. Kept in the taxonomy so a violated invariant
    /// has a named error rather than an `unreachable!()`.
    #[error("render error: {0}")]
    Render(String),

    /// I/O failure from the underlying terminal or filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for tstorie-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_error_display() {
        let err = LayerError::DuplicateLayerId { id: "hud".into() };
        assert_eq!(err.to_string(), "layer id already exists: hud");
    }

    #[test]
    fn graph_error_display() {
        let err = GraphError::CycleDetected { src: 1, dst: 0 };
        assert_eq!(
            err.to_string(),
            "connecting node 1 to node 0 would create a cycle"
        );
    }

    #[test]
    fn error_from_layer_error() {
        let err: Error = LayerError::UnknownLayer { id: "x".into() }.into();
        assert!(matches!(
            err,
            Error::Layer(LayerError::UnknownLayer { .. })
        ));
    }

    #[test]
    fn io_error_converts() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}

use std::cell::Cell;
use std::collections::TryReserveError;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::VertexId;

/// Closed set of status codes reported by every graph and SCC operation.
///
/// The integer values are stable and mirror the codes exposed through
/// [`last_error`], so a caller logging raw codes can map them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,
    NullPointer = -1,
    InvalidVertex = -2,
    OutOfMemory = -3,
    GraphEmpty = -4,
    InvalidParameter = -5,
    VertexExists = -6,
    EdgeExists = -7,
    EdgeNotFound = -8,
    GraphFull = -9,
}

impl ErrorCode {
    /// Returns the raw integer code.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a raw integer code back onto the enumeration.
    pub fn from_i32(code: i32) -> Option<Self> {
        let code = match code {
            0 => ErrorCode::Success,
            -1 => ErrorCode::NullPointer,
            -2 => ErrorCode::InvalidVertex,
            -3 => ErrorCode::OutOfMemory,
            -4 => ErrorCode::GraphEmpty,
            -5 => ErrorCode::InvalidParameter,
            -6 => ErrorCode::VertexExists,
            -7 => ErrorCode::EdgeExists,
            -8 => ErrorCode::EdgeNotFound,
            -9 => ErrorCode::GraphFull,
            _ => return None,
        };
        Some(code)
    }

    /// Short human-readable description of the code.
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::Success => "success",
            ErrorCode::NullPointer => "null pointer argument",
            ErrorCode::InvalidVertex => "invalid vertex id",
            ErrorCode::OutOfMemory => "memory allocation failed",
            ErrorCode::GraphEmpty => "graph is empty",
            ErrorCode::InvalidParameter => "invalid parameter",
            ErrorCode::VertexExists => "vertex already exists",
            ErrorCode::EdgeExists => "edge already exists",
            ErrorCode::EdgeNotFound => "edge not found",
            ErrorCode::GraphFull => "graph is full",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Errors produced by the graph store and the SCC engines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SccError {
    /// A vertex id outside `0..vertex_count`.
    #[error("invalid vertex {vertex} (graph has {vertex_count} vertices)")]
    InvalidVertex { vertex: VertexId, vertex_count: usize },

    /// An allocation could not be satisfied.
    #[error("memory allocation failed")]
    OutOfMemory,

    /// The graph has no vertices.
    #[error("graph is empty")]
    GraphEmpty,

    /// A parameter was rejected before any work was done.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// The ordered pair is already connected.
    #[error("edge {src} -> {dest} already exists")]
    EdgeExists { src: VertexId, dest: VertexId },

    /// The ordered pair is not connected.
    #[error("edge {src} -> {dest} not found")]
    EdgeNotFound { src: VertexId, dest: VertexId },

    /// The id space of vertices or edge slots is exhausted.
    #[error("graph is full ({limit} slots)")]
    GraphFull { limit: usize },
}

impl SccError {
    /// Maps the error onto its closed status code.
    pub fn code(&self) -> ErrorCode {
        match self {
            SccError::InvalidVertex { .. } => ErrorCode::InvalidVertex,
            SccError::OutOfMemory => ErrorCode::OutOfMemory,
            SccError::GraphEmpty => ErrorCode::GraphEmpty,
            SccError::InvalidParameter(_) => ErrorCode::InvalidParameter,
            SccError::EdgeExists { .. } => ErrorCode::EdgeExists,
            SccError::EdgeNotFound { .. } => ErrorCode::EdgeNotFound,
            SccError::GraphFull { .. } => ErrorCode::GraphFull,
        }
    }
}

impl From<TryReserveError> for SccError {
    fn from(_: TryReserveError) -> Self {
        record(SccError::OutOfMemory)
    }
}

/// Result type for graph and SCC operations.
pub type Result<T> = std::result::Result<T, SccError>;

thread_local! {
    static LAST_ERROR: Cell<ErrorCode> = const { Cell::new(ErrorCode::Success) };
}

/// Code of the most recent error raised on this thread.
///
/// Diagnostic only: unrelated later calls overwrite it, so callers should
/// act on the `Result` they were handed.
pub fn last_error() -> ErrorCode {
    LAST_ERROR.with(|slot| slot.get())
}

/// Resets this thread's last-error slot to [`ErrorCode::Success`].
pub fn clear_last_error() {
    LAST_ERROR.with(|slot| slot.set(ErrorCode::Success));
}

/// Stores the error's code in the thread-local slot and hands the error back.
pub(crate) fn record(error: SccError) -> SccError {
    LAST_ERROR.with(|slot| slot.set(error.code()));
    error
}

/// Shorthand for `Err(record(error))`.
pub(crate) fn fail<T>(error: SccError) -> Result<T> {
    Err(record(error))
}

#[cfg(test)]
mod test_error {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_i32() {
        for code in [
            ErrorCode::Success,
            ErrorCode::NullPointer,
            ErrorCode::InvalidVertex,
            ErrorCode::OutOfMemory,
            ErrorCode::GraphEmpty,
            ErrorCode::InvalidParameter,
            ErrorCode::VertexExists,
            ErrorCode::EdgeExists,
            ErrorCode::EdgeNotFound,
            ErrorCode::GraphFull,
        ] {
            assert_eq!(ErrorCode::from_i32(code.as_i32()), Some(code));
        }
        assert_eq!(ErrorCode::from_i32(-10), None);
        assert_eq!(ErrorCode::from_i32(1), None);
    }

    #[test]
    fn test_last_error_slot_is_thread_local() {
        clear_last_error();
        let _: Result<()> = fail(SccError::GraphEmpty);
        assert_eq!(last_error(), ErrorCode::GraphEmpty);

        // Another thread starts from a clean slot and cannot clobber ours.
        let other = std::thread::spawn(|| {
            let before = last_error();
            let _: Result<()> = fail(SccError::EdgeNotFound { src: 0, dest: 1 });
            before
        })
        .join()
        .unwrap();
        assert_eq!(other, ErrorCode::Success);
        assert_eq!(last_error(), ErrorCode::GraphEmpty);

        clear_last_error();
        assert_eq!(last_error(), ErrorCode::Success);
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = SccError::InvalidVertex { vertex: 7, vertex_count: 3 };
        assert_eq!(err.code(), ErrorCode::InvalidVertex);
        assert_eq!(err.to_string(), "invalid vertex 7 (graph has 3 vertices)");
        assert_eq!(
            SccError::EdgeExists { src: 1, dest: 2 }.to_string(),
            "edge 1 -> 2 already exists"
        );
    }
}

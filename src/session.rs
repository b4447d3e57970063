//! Undoable-Session State Machine: `begin`/`end` framing of a user
//! transaction and the activation flag that gates trigger capture.

use std::fmt;

/// What the engine is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionState {
    /// No capture, no open host transaction owned by the engine.
    Idle,
    /// A frame marker has been appended, capture is enabled, and a host
    /// transaction opened by [`crate::UndoRedoEngine::begin`] is in progress.
    Open,
    /// Capture is enabled because the [driver](crate::driver) is replaying
    /// a frame, not because the user opened a session. `begin` must not be
    /// called in this state.
    Replaying,
}

/// The stack-depth summary returned by [`crate::UndoRedoEngine::end`] and
/// [`crate::UndoRedoEngine::undoable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoStatus {
    /// Number of frames on the undo stack.
    pub undo: i64,
    /// Number of frames on the redo stack.
    pub redo: i64,
}

impl fmt::Display for UndoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UNDO={}\nREDO={}", self.undo, self.redo)
    }
}

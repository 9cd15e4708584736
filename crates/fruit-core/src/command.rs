//! Input command queue.
//!
//! Input collaborators (a canvas listener, a replay script, a test) push
//! commands from wherever they live; the session drains them at the start of
//! each [`Session::advance`](crate::Session::advance) so input never
//! interleaves with a physics step.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

/// Commands accepted by a session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Pointer pressed at arena-local coordinates.
    PointerDown { x: f32, y: f32 },
    /// Rebuild the world from configuration.
    Recalibrate,
    /// Frame boundary marker - commands after this are processed on the next advance.
    Yield,
}

/// Shared handle to a session's pending commands.
///
/// Cloning yields another handle to the same queue.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    inner: Arc<Mutex<VecDeque<SessionCommand>>>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a command to be processed.
    pub fn push(&self, command: SessionCommand) {
        self.inner.lock().push_back(command);
    }

    /// Drain all pending commands, including any `Yield` markers.
    pub fn drain(&self) -> Vec<SessionCommand> {
        self.inner.lock().drain(..).collect()
    }

    /// Drain commands until Yield or empty.
    ///
    /// Returns commands up to (not including) Yield.
    /// Yield itself is consumed but not returned.
    pub fn drain_until_yield(&self) -> Vec<SessionCommand> {
        let mut guard = self.inner.lock();
        let mut commands = Vec::new();

        while let Some(cmd) = guard.pop_front() {
            if matches!(cmd, SessionCommand::Yield) {
                tracing::debug!("[command] Yield - deferring remaining commands to next advance");
                break;
            }
            commands.push(cmd);
        }

        commands
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Check if there are pending commands.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Clear all pending commands.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

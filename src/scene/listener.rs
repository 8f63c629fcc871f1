//! Commit observers

use super::node::MeshId;

/// Which half of a commit a notification belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CommitPhase {
    Begin,
    End,
}

/// Observer notified around every commit of the mesh it is attached to,
/// including commits of the source behind a view.
///
/// `mesh` is the id the listener was attached to, not necessarily the mesh
/// that was committed.
pub trait CommitListener {
    /// Called before the committed mesh recomputes its data
    fn on_commit_begin(&mut self, mesh: MeshId);

    /// Called once the committed mesh is clean again
    fn on_commit_end(&mut self, mesh: MeshId);
}

/// Closures over `(mesh, phase)` are listeners
impl<F: FnMut(MeshId, CommitPhase)> CommitListener for F {
    fn on_commit_begin(&mut self, mesh: MeshId) {
        self(mesh, CommitPhase::Begin)
    }

    fn on_commit_end(&mut self, mesh: MeshId) {
        self(mesh, CommitPhase::End)
    }
}

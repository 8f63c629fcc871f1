//! Identity-carrying mesh scene: owned meshes, views over them, and commit
//! observers.

pub mod graph;
pub mod listener;
pub mod node;

pub use graph::{SceneMesh, VoxelScene};
pub use listener::{CommitListener, CommitPhase};
pub use node::{ListenerId, MeshId, MeshNode};

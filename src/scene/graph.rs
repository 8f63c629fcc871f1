//! Mesh scene: an arena that owns every mesh, plus the observation
//! registry that links views and listeners to the meshes they watch.
//!
//! Ownership and observation are separate relations. Views name their
//! parent by [`MeshId`] and own nothing; each view is also registered as a
//! subscriber of its parent so commit notifications fan out through chains
//! of views.

use std::collections::HashMap;

use crate::core::error::Error;
use crate::core::types::Result;
use crate::voxel::array::ArrayVoxelMesh;
use crate::voxel::builder::VoxelMeshBuilder;
use crate::voxel::location::{Dimensions3D, VoxelLocation};
use crate::voxel::map::MapVoxelMesh;
use crate::voxel::mesh::{out_of_range, MeshKind, VoxelMesh, VoxelMeshMut};
use crate::voxel::octree::OctreeVoxelMesh;
use crate::voxel::shape::{CommitState, Shape, ShapeVoxelMesh};
use crate::voxel::storage::VoxelStorage;
use crate::voxel::view::{AbsoluteVoxelMesh, SubMesh, Window};
use crate::voxel::voxel::Voxel;

use super::listener::{CommitListener, CommitPhase};
use super::node::{ListenerId, MeshId, MeshNode, SceneEntry, Subscriber};

/// Owns voxel meshes and the views over them.
pub struct VoxelScene {
    entries: HashMap<MeshId, SceneEntry>,
    listeners: HashMap<ListenerId, Box<dyn CommitListener>>,
    next_id: u64,
    next_listener: u64,
}

impl Default for VoxelScene {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelScene {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            listeners: HashMap::new(),
            next_id: 0,
            next_listener: 0,
        }
    }

    /// Number of meshes, views included
    pub fn mesh_count(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: MeshId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Allocate a fresh mesh ID.
    fn alloc_id(&mut self) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        id
    }

    fn entry(&self, id: MeshId) -> Result<&SceneEntry> {
        self.entries.get(&id).ok_or(Error::UnknownMesh(id))
    }

    fn entry_mut(&mut self, id: MeshId) -> Result<&mut SceneEntry> {
        self.entries.get_mut(&id).ok_or(Error::UnknownMesh(id))
    }

    fn insert(&mut self, node: MeshNode) -> MeshId {
        let id = self.alloc_id();
        self.entries.insert(id, SceneEntry::new(node));
        id
    }

    // --- Owned meshes ---

    /// Empty dense mesh
    pub fn add_array(&mut self, dimensions: Dimensions3D) -> MeshId {
        self.add_storage(ArrayVoxelMesh::new(dimensions).into())
    }

    /// Empty octree whose children are built on demand by `builder`
    pub fn add_octree(&mut self, dimensions: Dimensions3D, builder: Box<dyn VoxelMeshBuilder>) -> MeshId {
        self.add_storage(OctreeVoxelMesh::new(dimensions, builder).into())
    }

    pub fn add_storage(&mut self, storage: VoxelStorage) -> MeshId {
        self.insert(MeshNode::Storage(storage))
    }

    pub fn add_map(&mut self, map: MapVoxelMesh) -> MeshId {
        self.insert(MeshNode::Map(map))
    }

    pub fn add_shape(&mut self, shape: ShapeVoxelMesh) -> MeshId {
        self.insert(MeshNode::Shape(shape))
    }

    // --- Views ---

    fn add_view(&mut self, parent: MeshId, node: MeshNode) -> Result<MeshId> {
        self.entry(parent)?;
        let id = self.insert(node);
        self.entry_mut(parent)?.subscribers.push(Subscriber::View(id));
        log::trace!("View {} registered on {}", id, parent);
        Ok(id)
    }

    /// View of `parent` whose first cell is addressed as `start`
    pub fn absolute(&mut self, parent: MeshId, start: VoxelLocation) -> Result<MeshId> {
        let anchor = self.start(parent)?;
        self.add_view(parent, MeshNode::Absolute { parent, start, anchor })
    }

    /// Window of `parent` at `offset` from its start. Fails with
    /// `OutOfRange` unless the window lies inside the parent.
    pub fn sub_mesh(&mut self, parent: MeshId, offset: VoxelLocation, dimensions: Dimensions3D) -> Result<MeshId> {
        let window = Window::new(offset, dimensions);
        {
            let mesh = self.mesh(parent)?;
            if !window.fits(&mesh) {
                return Err(out_of_range(mesh.start() + offset, mesh.dimensions()));
            }
        }
        self.add_view(parent, MeshNode::Sub { parent, window })
    }

    pub fn proxy(&mut self, parent: MeshId) -> Result<MeshId> {
        self.add_view(parent, MeshNode::Proxy { parent })
    }

    /// Read-only projection of `id`, created on first request and returned
    /// unchanged afterwards. A read-only mesh is its own projection.
    pub fn read_only(&mut self, id: MeshId) -> Result<MeshId> {
        let entry = self.entry(id)?;
        if entry.node.is_read_only() {
            return Ok(id);
        }
        if let Some(existing) = entry.read_only {
            return Ok(existing);
        }
        let projection = self.add_view(id, MeshNode::ReadOnly { source: id })?;
        self.entry_mut(id)?.read_only = Some(projection);
        Ok(projection)
    }

    // --- Reads ---

    pub fn node(&self, id: MeshId) -> Result<&MeshNode> {
        Ok(&self.entry(id)?.node)
    }

    /// Borrowed mesh for reads and traversal algorithms
    pub fn mesh(&self, id: MeshId) -> Result<SceneMesh<'_>> {
        let resolved = match &self.entry(id)?.node {
            MeshNode::Storage(storage) => Resolved::Data(storage),
            MeshNode::Map(map) => Resolved::Data(map),
            MeshNode::Shape(shape) => Resolved::Data(shape),
            MeshNode::Absolute { parent, start, anchor } => {
                Resolved::Absolute(AbsoluteVoxelMesh::anchored(Box::new(self.mesh(*parent)?), *start, *anchor))
            }
            MeshNode::Sub { parent, window } => {
                Resolved::Sub(SubMesh::from_window(Box::new(self.mesh(*parent)?), *window))
            }
            MeshNode::Proxy { parent } | MeshNode::ReadOnly { source: parent } => {
                Resolved::Forward(Box::new(self.mesh(*parent)?))
            }
        };
        Ok(SceneMesh { id, resolved })
    }

    pub fn get(&self, id: MeshId, location: VoxelLocation) -> Result<Voxel> {
        self.mesh(id)?.get(location)
    }

    pub fn is_empty(&self, id: MeshId) -> Result<bool> {
        Ok(self.mesh(id)?.is_empty())
    }

    pub fn is_full(&self, id: MeshId) -> Result<bool> {
        Ok(self.mesh(id)?.is_full())
    }

    pub fn dimensions(&self, id: MeshId) -> Result<Dimensions3D> {
        Ok(self.mesh(id)?.dimensions())
    }

    pub fn start(&self, id: MeshId) -> Result<VoxelLocation> {
        Ok(self.mesh(id)?.start())
    }

    // --- Writes ---

    /// Mesh owning the data behind `id`, following every view
    fn data_root(&self, id: MeshId) -> Result<MeshId> {
        let mut current = id;
        while let Some(parent) = self.entry(current)?.node.parent() {
            current = parent;
        }
        Ok(current)
    }

    /// Like [`data_root`](Self::data_root) but refuses to pass through a
    /// read-only projection. Also reports whether a window narrows the path.
    fn source_root(&self, id: MeshId) -> Result<(MeshId, bool)> {
        let mut current = id;
        let mut windowed = false;
        loop {
            match &self.entry(current)?.node {
                MeshNode::ReadOnly { .. } => return Err(Error::Unmodifiable(current)),
                MeshNode::Sub { parent, .. } => {
                    windowed = true;
                    current = *parent;
                }
                MeshNode::Absolute { parent, .. } | MeshNode::Proxy { parent } => current = *parent,
                MeshNode::Storage(_) | MeshNode::Map(_) | MeshNode::Shape(_) => {
                    return Ok((current, windowed));
                }
            }
        }
    }

    /// Map a write at `location` in `id`'s frame down to the owning mesh
    fn resolve_write(&self, id: MeshId, location: VoxelLocation) -> Result<(MeshId, VoxelLocation)> {
        let mut current = id;
        let mut location = location;
        loop {
            match &self.entry(current)?.node {
                MeshNode::Storage(_) | MeshNode::Map(_) => return Ok((current, location)),
                MeshNode::Shape(_) | MeshNode::ReadOnly { .. } => {
                    return Err(Error::Unmodifiable(current));
                }
                MeshNode::Absolute { parent, start, anchor } => {
                    let view = self.mesh(current)?;
                    if !view.contains(location) {
                        return Err(out_of_range(location, view.dimensions()));
                    }
                    location = location - *start + *anchor;
                    current = *parent;
                }
                MeshNode::Sub { parent, window } => {
                    location = self.start(*parent)? + window.map(location)?;
                    current = *parent;
                }
                MeshNode::Proxy { parent } => current = *parent,
            }
        }
    }

    /// Write one cell. Marks the owning mesh dirty.
    pub fn set(&mut self, id: MeshId, location: VoxelLocation, voxel: Voxel) -> Result<()> {
        let (root, target) = self.resolve_write(id, location)?;
        let entry = self.entry_mut(root)?;
        match &mut entry.node {
            MeshNode::Storage(storage) => storage.set(target, voxel)?,
            MeshNode::Map(map) => map.set(target, voxel)?,
            _ => return Err(Error::Unmodifiable(root)),
        }
        entry.state = CommitState::Dirty;
        Ok(())
    }

    /// Reset every cell visible through `id` to empty
    pub fn clear(&mut self, id: MeshId) -> Result<()> {
        let (root, windowed) = self.source_root(id)?;
        if windowed {
            let locations: Vec<VoxelLocation> = {
                let mesh = self.mesh(id)?;
                let start = mesh.start();
                mesh.dimensions().locations().map(|local| start + local).collect()
            };
            for location in locations {
                self.set(id, location, Voxel::EMPTY)?;
            }
            return Ok(());
        }
        let entry = self.entry_mut(root)?;
        match &mut entry.node {
            MeshNode::Storage(storage) => storage.clear()?,
            MeshNode::Map(map) => map.clear()?,
            _ => return Err(Error::Unmodifiable(root)),
        }
        entry.state = CommitState::Dirty;
        Ok(())
    }

    /// Replace the parameters of the shape behind `id`
    pub fn set_shape(&mut self, id: MeshId, shape: Shape) -> Result<()> {
        self.update_shape(id, |mesh| mesh.set_shape(shape))
    }

    pub fn set_color(&mut self, id: MeshId, color: Voxel) -> Result<()> {
        self.update_shape(id, |mesh| mesh.set_color(color))
    }

    fn update_shape(&mut self, id: MeshId, update: impl FnOnce(&mut ShapeVoxelMesh)) -> Result<()> {
        let (root, _) = self.source_root(id)?;
        let entry = self.entry_mut(root)?;
        let MeshNode::Shape(shape) = &mut entry.node else {
            return Err(Error::InvalidData(format!("mesh {} is not a shape", root)));
        };
        update(shape);
        if shape.is_dirty() {
            entry.state = CommitState::Dirty;
        }
        Ok(())
    }

    /// Deep copy as a new, independent mesh. Views are materialized into a
    /// dense mesh at the view's own start.
    pub fn copy(&mut self, id: MeshId) -> Result<MeshId> {
        let node = match &self.entry(id)?.node {
            MeshNode::Storage(storage) => MeshNode::Storage(storage.clone()),
            MeshNode::Map(map) => MeshNode::Map(map.clone()),
            MeshNode::Shape(shape) => MeshNode::Shape(shape.clone()),
            _ => {
                let mesh = self.mesh(id)?;
                let start = mesh.start();
                let mut array = ArrayVoxelMesh::with_start(start, mesh.dimensions());
                for local in mesh.dimensions().locations() {
                    array.set(start + local, mesh.get(start + local)?)?;
                }
                MeshNode::Storage(array.into())
            }
        };
        let copy = self.insert(node);
        log::debug!("Copied mesh {} to {}", id, copy);
        Ok(copy)
    }

    // --- Commit protocol ---

    pub fn mark_dirty(&mut self, id: MeshId) -> Result<()> {
        let (root, _) = self.source_root(id)?;
        let entry = self.entry_mut(root)?;
        if let MeshNode::Shape(shape) = &mut entry.node {
            shape.mark_dirty();
        }
        entry.state = CommitState::Dirty;
        Ok(())
    }

    /// Whether the data behind `id` has uncommitted changes
    pub fn is_dirty(&self, id: MeshId) -> Result<bool> {
        let entry = self.entry(self.data_root(id)?)?;
        Ok(entry.state == CommitState::Dirty
            || matches!(&entry.node, MeshNode::Shape(shape) if shape.is_dirty()))
    }

    /// Commit the mesh owning the data behind `id`: notify begin, recompute,
    /// mark clean, notify end. Listeners are notified even if nothing changed.
    pub fn commit(&mut self, id: MeshId) -> Result<()> {
        let (root, _) = self.source_root(id)?;
        self.notify(root, CommitPhase::Begin);

        let entry = self.entry_mut(root)?;
        match &mut entry.node {
            MeshNode::Shape(shape) => shape.commit(),
            MeshNode::Map(map) => {
                let chunks = map.take_dirty_chunks();
                log::debug!("Mesh {}: {} dirty chunks committed", root, chunks.len());
            }
            _ => {}
        }
        entry.state = CommitState::Clean;

        self.notify(root, CommitPhase::End);
        Ok(())
    }

    /// Fan a notification out to `id`'s subscribers in registration order,
    /// forwarding through dependent views.
    fn notify(&mut self, id: MeshId, phase: CommitPhase) {
        let Some(entry) = self.entries.get(&id) else {
            return;
        };
        let subscribers = entry.subscribers.clone();
        for subscriber in subscribers {
            match subscriber {
                Subscriber::View(view) => self.notify(view, phase),
                Subscriber::External(listener) => {
                    if let Some(listener) = self.listeners.get_mut(&listener) {
                        match phase {
                            CommitPhase::Begin => listener.on_commit_begin(id),
                            CommitPhase::End => listener.on_commit_end(id),
                        }
                    }
                }
            }
        }
    }

    // --- Listeners ---

    /// Register a listener and attach it to `id`
    pub fn subscribe(&mut self, id: MeshId, listener: Box<dyn CommitListener>) -> Result<ListenerId> {
        self.entry(id)?;
        let handle = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(handle, listener);
        self.entry_mut(id)?.subscribers.push(Subscriber::External(handle));
        Ok(handle)
    }

    /// Attach an already registered listener to another mesh. Attaching it
    /// twice to the same mesh is a `DoubleInitialization` error.
    pub fn subscribe_existing(&mut self, id: MeshId, listener: ListenerId) -> Result<()> {
        if !self.listeners.contains_key(&listener) {
            return Err(Error::InvalidData(format!("unknown listener {:?}", listener)));
        }
        let entry = self.entry_mut(id)?;
        let subscriber = Subscriber::External(listener);
        if entry.subscribers.contains(&subscriber) {
            return Err(Error::DoubleInitialization(format!("listener {:?} on mesh {}", listener, id)));
        }
        entry.subscribers.push(subscriber);
        Ok(())
    }

    /// Detach a listener from one mesh. Returns whether it was attached.
    pub fn unsubscribe(&mut self, id: MeshId, listener: ListenerId) -> Result<bool> {
        let entry = self.entry_mut(id)?;
        let before = entry.subscribers.len();
        entry.subscribers.retain(|s| *s != Subscriber::External(listener));
        Ok(entry.subscribers.len() != before)
    }

    /// Detach a listener everywhere and hand it back
    pub fn remove_listener(&mut self, listener: ListenerId) -> Option<Box<dyn CommitListener>> {
        for entry in self.entries.values_mut() {
            entry.subscribers.retain(|s| *s != Subscriber::External(listener));
        }
        self.listeners.remove(&listener)
    }

    // --- Teardown ---

    /// Remove a mesh together with every view that depends on it
    pub fn remove(&mut self, id: MeshId) -> Result<()> {
        if let Some(parent) = self.entry(id)?.node.parent() {
            if let Some(parent) = self.entries.get_mut(&parent) {
                parent.subscribers.retain(|s| *s != Subscriber::View(id));
                if parent.read_only == Some(id) {
                    parent.read_only = None;
                }
            }
        }

        let mut pending = vec![id];
        let mut removed = 0;
        while let Some(current) = pending.pop() {
            if let Some(entry) = self.entries.remove(&current) {
                removed += 1;
                pending.extend(entry.subscribers.iter().filter_map(|s| match s {
                    Subscriber::View(view) => Some(*view),
                    Subscriber::External(_) => None,
                }));
            }
        }
        log::debug!("Removed mesh {} and {} dependent views", id, removed - 1);
        Ok(())
    }
}

enum Resolved<'s> {
    Data(&'s dyn VoxelMesh),
    Absolute(AbsoluteVoxelMesh<Box<SceneMesh<'s>>>),
    Sub(SubMesh<Box<SceneMesh<'s>>>),
    Forward(Box<SceneMesh<'s>>),
}

/// A scene mesh resolved for reading, views included.
pub struct SceneMesh<'s> {
    id: MeshId,
    resolved: Resolved<'s>,
}

impl SceneMesh<'_> {
    pub fn id(&self) -> MeshId {
        self.id
    }

    fn inner(&self) -> &dyn VoxelMesh {
        match &self.resolved {
            Resolved::Data(mesh) => *mesh,
            Resolved::Absolute(view) => view,
            Resolved::Sub(view) => view,
            Resolved::Forward(parent) => parent.as_ref(),
        }
    }
}

impl VoxelMesh for SceneMesh<'_> {
    fn start(&self) -> VoxelLocation {
        self.inner().start()
    }

    fn dimensions(&self) -> Dimensions3D {
        self.inner().dimensions()
    }

    fn contains(&self, location: VoxelLocation) -> bool {
        self.inner().contains(location)
    }

    fn get(&self, location: VoxelLocation) -> Result<Voxel> {
        self.inner().get(location)
    }

    fn is_empty(&self) -> bool {
        self.inner().is_empty()
    }

    fn is_full(&self) -> bool {
        self.inner().is_full()
    }

    fn kind(&self) -> MeshKind<'_> {
        self.inner().kind()
    }
}

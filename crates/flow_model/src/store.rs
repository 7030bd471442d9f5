//! Shape store: the arena that owns every shape and connection
//!
//! Parent/child links are ids into the arena rather than references, so the
//! store can check structurally that the hierarchy stays acyclic and that
//! `parent` and `children` always agree. Insertion order is kept separately
//! from the map; it is the iteration order of [`ShapeStore::shapes`] and the
//! paint order adapters should use.

use crate::{
    Connection, ConnectionDraft, ConnectionId, ConnectionPatch, Rect, Shape, ShapeDefaults,
    ShapeDraft, ShapeId, ShapePatch,
};
use std::collections::{HashMap, HashSet};

/// Owner of the flowchart's shapes and connections
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    shapes: HashMap<ShapeId, Shape>,
    order: Vec<ShapeId>,
    connections: Vec<Connection>,
    defaults: ShapeDefaults,
}

impl ShapeStore {
    /// Create an empty store with the default shape settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store whose drafts are completed from `defaults`
    pub fn with_defaults(defaults: ShapeDefaults) -> Self {
        Self {
            defaults,
            ..Self::default()
        }
    }

    pub fn defaults(&self) -> &ShapeDefaults {
        &self.defaults
    }

    // =========================================================================
    // Shapes
    // =========================================================================

    /// Add a shape built from `draft`, returning its freshly minted id
    pub fn add_shape(&mut self, draft: ShapeDraft) -> ShapeId {
        let id = ShapeId::new();
        let shape = draft.into_shape(id, &self.defaults);
        tracing::debug!(shape = %id, heading = ?shape.heading_id, "shape added");
        self.shapes.insert(id, shape);
        self.order.push(id);
        id
    }

    /// Insert a fully specified shape under its own id.
    ///
    /// Fails on a duplicate id. Any `parent`/`children` carried by the record
    /// are dropped; hierarchy is established through grouping only.
    pub fn insert_shape(&mut self, mut shape: Shape) -> bool {
        if self.shapes.contains_key(&shape.id) {
            return false;
        }
        shape.parent = None;
        shape.children.clear();
        shape.hidden = false;
        let id = shape.id;
        self.shapes.insert(id, shape);
        self.order.push(id);
        true
    }

    /// Shallow-merge `patch` into the shape. Returns `false` for unknown ids.
    pub fn update_shape(&mut self, id: ShapeId, patch: ShapePatch) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                patch.apply(shape);
                true
            }
            None => false,
        }
    }

    /// Remove a shape together with every connection touching it.
    ///
    /// The shape is ungrouped from its parent; its children become roots
    /// rather than being deleted.
    pub fn remove_shape(&mut self, id: ShapeId) -> bool {
        let Some(shape) = self.shapes.remove(&id) else {
            return false;
        };
        self.order.retain(|&other| other != id);

        if let Some(parent_id) = shape.parent {
            if let Some(parent) = self.shapes.get_mut(&parent_id) {
                parent.children.retain(|&child| child != id);
            }
        }
        for child_id in &shape.children {
            if let Some(child) = self.shapes.get_mut(child_id) {
                child.parent = None;
            }
            self.refresh_visibility_from(*child_id);
        }

        let before = self.connections.len();
        self.connections.retain(|c| !c.is_connected_to(id));
        tracing::debug!(
            shape = %id,
            orphaned_children = shape.children.len(),
            removed_connections = before - self.connections.len(),
            "shape removed"
        );
        true
    }

    pub fn get_shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.shapes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Shape ids in insertion order
    pub fn shape_ids(&self) -> &[ShapeId] {
        &self.order
    }

    /// Shapes in insertion order
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.order.iter().filter_map(|id| self.shapes.get(id))
    }

    /// Owned copy of every shape, in insertion order
    pub fn get_shapes(&self) -> Vec<Shape> {
        self.shapes().cloned().collect()
    }

    /// Shapes not hidden by a collapsed ancestor
    pub fn visible_shapes(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes().filter(|s| s.is_visible())
    }

    pub fn is_visible(&self, id: ShapeId) -> bool {
        self.shapes.get(&id).is_some_and(Shape::is_visible)
    }

    // =========================================================================
    // Hierarchy queries
    // =========================================================================

    pub fn parent_of(&self, id: ShapeId) -> Option<ShapeId> {
        self.shapes.get(&id).and_then(|s| s.parent)
    }

    pub fn children_of(&self, id: ShapeId) -> &[ShapeId] {
        self.shapes
            .get(&id)
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// Shapes without a parent, in insertion order
    pub fn roots(&self) -> impl Iterator<Item = ShapeId> + '_ {
        self.shapes().filter(|s| s.parent.is_none()).map(|s| s.id)
    }

    /// All descendants of `id` in depth-first pre-order
    pub fn descendants(&self, id: ShapeId) -> Vec<ShapeId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack: Vec<ShapeId> = self.children_of(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if !seen.insert(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children_of(next).iter().rev().copied());
        }
        out
    }

    /// Parent chain of `id`, nearest first
    pub fn ancestors(&self, id: ShapeId) -> Vec<ShapeId> {
        let mut out = Vec::new();
        let mut current = self.parent_of(id);
        while let Some(parent) = current {
            if parent == id || out.contains(&parent) {
                break;
            }
            out.push(parent);
            current = self.parent_of(parent);
        }
        out
    }

    /// True iff `candidate` is in the transitive closure of `ancestor`'s children
    pub fn is_descendant(&self, ancestor: ShapeId, candidate: ShapeId) -> bool {
        let mut seen = HashSet::new();
        let mut stack: Vec<ShapeId> = self.children_of(ancestor).to_vec();
        while let Some(next) = stack.pop() {
            if next == candidate {
                return true;
            }
            if seen.insert(next) {
                stack.extend_from_slice(self.children_of(next));
            }
        }
        false
    }

    // =========================================================================
    // Structural mutation
    // =========================================================================

    /// Make `child` a child of `parent`, detaching it from any previous parent.
    ///
    /// Refuses self-parenting, unknown ids and links that would close a cycle.
    pub fn attach_child(&mut self, parent: ShapeId, child: ShapeId) -> bool {
        if parent == child
            || !self.contains(parent)
            || !self.contains(child)
            || self.is_descendant(child, parent)
        {
            return false;
        }
        if self.parent_of(child) != Some(parent) {
            self.detach_from_parent(child);
        }
        if let Some(p) = self.shapes.get_mut(&parent) {
            if !p.children.contains(&child) {
                p.children.push(child);
            }
        }
        if let Some(c) = self.shapes.get_mut(&child) {
            c.parent = Some(parent);
        }
        self.refresh_visibility_from(child);
        true
    }

    /// Detach `child` from its parent, returning the former parent
    pub fn detach_from_parent(&mut self, child: ShapeId) -> Option<ShapeId> {
        let parent = self.shapes.get_mut(&child)?.parent.take()?;
        if let Some(p) = self.shapes.get_mut(&parent) {
            p.children.retain(|&c| c != child);
        }
        self.refresh_visibility_from(child);
        Some(parent)
    }

    /// Set position and size in one step
    pub fn set_rect(&mut self, id: ShapeId, rect: Rect) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.set_rect(rect);
                true
            }
            None => false,
        }
    }

    /// Move a shape and every descendant by the same offset
    pub fn translate_subtree(&mut self, id: ShapeId, dx: f32, dy: f32) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut ids = self.descendants(id);
        ids.push(id);
        for shape_id in ids {
            if let Some(shape) = self.shapes.get_mut(&shape_id) {
                let moved = shape.rect().translate(dx, dy);
                shape.set_rect(moved);
            }
        }
        true
    }

    /// Set the collapsed flag without touching size or visibility
    pub fn set_collapsed(&mut self, id: ShapeId, collapsed: bool) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.collapsed = collapsed;
                true
            }
            None => false,
        }
    }

    /// Set a single shape's visibility flag (no cascading)
    pub fn set_hidden(&mut self, id: ShapeId, hidden: bool) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.hidden = hidden;
                true
            }
            None => false,
        }
    }

    /// Link a legacy, position-tracked shape to a heading id
    pub fn adopt_heading(&mut self, id: ShapeId, heading_id: impl Into<String>) -> bool {
        match self.shapes.get_mut(&id) {
            Some(shape) => {
                shape.heading_id = Some(heading_id.into());
                shape.legacy_index = None;
                true
            }
            None => false,
        }
    }

    /// Recompute `id`'s hidden flag from its parent and cascade to its subtree.
    ///
    /// A shape is hidden iff its parent is hidden or collapsed.
    pub fn refresh_visibility_from(&mut self, id: ShapeId) {
        let mut queue = vec![id];
        let mut seen = HashSet::new();
        while let Some(next) = queue.pop() {
            if !seen.insert(next) {
                continue;
            }
            let hidden = self
                .parent_of(next)
                .and_then(|p| self.shapes.get(&p))
                .is_some_and(|p| p.hidden || p.collapsed);
            if let Some(shape) = self.shapes.get_mut(&next) {
                shape.hidden = hidden;
                queue.extend(shape.children.iter().copied());
            }
        }
    }

    /// Recompute visibility for the whole store
    pub fn refresh_all_visibility(&mut self) {
        let roots: Vec<ShapeId> = self.roots().collect();
        for root in roots {
            self.refresh_visibility_from(root);
        }
    }

    /// Insert a persisted record as-is; links are validated by the caller
    pub(crate) fn restore_raw(&mut self, mut shape: Shape) {
        shape.hidden = false;
        let id = shape.id;
        self.shapes.insert(id, shape);
        self.order.push(id);
    }

    /// Cut the parent link of the first shape found on each parent cycle
    pub(crate) fn break_parent_cycles(&mut self) {
        for id in self.order.clone() {
            let mut seen = HashSet::new();
            let mut current = self.parent_of(id);
            while let Some(parent) = current {
                if parent == id {
                    tracing::warn!(shape = %id, "cutting cyclic parent link");
                    self.detach_from_parent(id);
                    break;
                }
                if !seen.insert(parent) {
                    break;
                }
                current = self.parent_of(parent);
            }
        }
    }

    // =========================================================================
    // Heading bridge
    // =========================================================================

    /// Shape mirroring the given heading, first in insertion order
    pub fn shape_for_heading(&self, heading_id: &str) -> Option<ShapeId> {
        self.shapes()
            .find(|s| s.heading_id.as_deref() == Some(heading_id))
            .map(|s| s.id)
    }

    /// Heading the given shape mirrors, if any
    pub fn heading_for_shape(&self, id: ShapeId) -> Option<&str> {
        self.shapes.get(&id).and_then(|s| s.heading_id.as_deref())
    }

    // =========================================================================
    // Connections
    // =========================================================================

    /// Add a connection; `None` when either endpoint is not in the store
    pub fn add_connection(&mut self, draft: ConnectionDraft) -> Option<ConnectionId> {
        if !self.contains(draft.from) || !self.contains(draft.to) {
            return None;
        }
        let id = ConnectionId::new();
        let connection = draft.into_connection(id);
        tracing::debug!(connection = %id, from = %connection.from, to = %connection.to, "connection added");
        self.connections.push(connection);
        Some(id)
    }

    /// Insert a fully specified connection; fails on duplicate id or missing endpoint
    pub fn insert_connection(&mut self, connection: Connection) -> bool {
        if self.get_connection(connection.id).is_some()
            || !self.contains(connection.from)
            || !self.contains(connection.to)
        {
            return false;
        }
        self.connections.push(connection);
        true
    }

    pub fn update_connection(&mut self, id: ConnectionId, patch: ConnectionPatch) -> bool {
        match self.connections.iter_mut().find(|c| c.id == id) {
            Some(connection) => {
                patch.apply(connection);
                true
            }
            None => false,
        }
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != id);
        self.connections.len() != before
    }

    pub fn get_connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn get_connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Connections starting or ending at `shape`
    pub fn connections_for(&self, shape: ShapeId) -> impl Iterator<Item = &Connection> + '_ {
        self.connections.iter().filter(move |c| c.is_connected_to(shape))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AnchorPoint, ConnectionStyle, Size};

    fn store_with(n: usize) -> (ShapeStore, Vec<ShapeId>) {
        let mut store = ShapeStore::new();
        let ids = (0..n)
            .map(|i| store.add_shape(ShapeDraft::new().with_text(format!("S{i}"))))
            .collect();
        (store, ids)
    }

    #[test]
    fn test_add_shape_keeps_insertion_order() {
        let (store, ids) = store_with(3);
        assert_eq!(store.shape_ids(), ids.as_slice());
        let texts: Vec<_> = store.shapes().map(|s| s.text.clone()).collect();
        assert_eq!(texts, vec!["S0", "S1", "S2"]);
    }

    #[test]
    fn test_insert_shape_rejects_duplicates_and_strips_links() {
        let (mut store, ids) = store_with(1);
        let mut copy = store.get_shape(ids[0]).unwrap().clone();
        assert!(!store.insert_shape(copy.clone()));

        copy.id = ShapeId::new();
        copy.parent = Some(ids[0]);
        copy.children = vec![ShapeId::new()];
        let new_id = copy.id;
        assert!(store.insert_shape(copy));
        let inserted = store.get_shape(new_id).unwrap();
        assert!(inserted.parent.is_none());
        assert!(inserted.children.is_empty());
    }

    #[test]
    fn test_update_unknown_shape_fails() {
        let (mut store, _) = store_with(1);
        assert!(!store.update_shape(ShapeId::new(), ShapePatch::text("x")));
    }

    #[test]
    fn test_remove_shape_orphans_children_and_drops_connections() {
        let (mut store, ids) = store_with(4);
        let (grand, parent, child, other) = (ids[0], ids[1], ids[2], ids[3]);
        assert!(store.attach_child(grand, parent));
        assert!(store.attach_child(parent, child));
        store.add_connection(ConnectionDraft::new(parent, other)).unwrap();
        store.add_connection(ConnectionDraft::new(other, parent)).unwrap();
        let kept = store.add_connection(ConnectionDraft::new(child, other)).unwrap();

        assert!(store.remove_shape(parent));
        assert!(!store.contains(parent));
        assert!(store.children_of(grand).is_empty());
        assert_eq!(store.parent_of(child), None);
        assert_eq!(store.get_connections().len(), 1);
        assert_eq!(store.get_connections()[0].id, kept);

        assert!(!store.remove_shape(parent));
    }

    #[test]
    fn test_attach_child_refuses_cycles() {
        let (mut store, ids) = store_with(3);
        assert!(store.attach_child(ids[0], ids[1]));
        assert!(store.attach_child(ids[1], ids[2]));
        assert!(!store.attach_child(ids[2], ids[0]));
        assert!(!store.attach_child(ids[1], ids[0]));
        assert!(!store.attach_child(ids[0], ids[0]));
        assert!(store.is_descendant(ids[0], ids[2]));
        assert!(!store.is_descendant(ids[2], ids[0]));
    }

    #[test]
    fn test_attach_child_moves_between_parents_without_duplicates() {
        let (mut store, ids) = store_with(3);
        assert!(store.attach_child(ids[0], ids[2]));
        assert!(store.attach_child(ids[0], ids[2]));
        assert_eq!(store.children_of(ids[0]), &[ids[2]]);

        assert!(store.attach_child(ids[1], ids[2]));
        assert!(store.children_of(ids[0]).is_empty());
        assert_eq!(store.children_of(ids[1]), &[ids[2]]);
        assert_eq!(store.parent_of(ids[2]), Some(ids[1]));
    }

    #[test]
    fn test_descendants_and_ancestors() {
        let (mut store, ids) = store_with(4);
        store.attach_child(ids[0], ids[1]);
        store.attach_child(ids[1], ids[2]);
        store.attach_child(ids[0], ids[3]);
        assert_eq!(store.descendants(ids[0]), vec![ids[1], ids[2], ids[3]]);
        assert_eq!(store.ancestors(ids[2]), vec![ids[1], ids[0]]);
        assert_eq!(store.roots().collect::<Vec<_>>(), vec![ids[0]]);
    }

    #[test]
    fn test_visibility_follows_collapsed_parent() {
        let (mut store, ids) = store_with(3);
        store.attach_child(ids[0], ids[1]);
        store.attach_child(ids[1], ids[2]);
        store.set_collapsed(ids[0], true);
        store.refresh_visibility_from(ids[0]);
        assert!(store.is_visible(ids[0]));
        assert!(!store.is_visible(ids[1]));
        assert!(!store.is_visible(ids[2]));

        // Detached subtree becomes visible again
        store.detach_from_parent(ids[1]);
        assert!(store.is_visible(ids[1]));
        assert!(store.is_visible(ids[2]));
    }

    #[test]
    fn test_translate_subtree_moves_descendants() {
        let (mut store, ids) = store_with(2);
        store.attach_child(ids[0], ids[1]);
        store.translate_subtree(ids[0], 10.0, -5.0);
        assert_eq!(store.get_shape(ids[0]).unwrap().x, 10.0);
        assert_eq!(store.get_shape(ids[1]).unwrap().y, -5.0);
    }

    #[test]
    fn test_connections_crud() {
        let (mut store, ids) = store_with(2);
        assert!(store.add_connection(ConnectionDraft::new(ids[0], ShapeId::new())).is_none());

        let a = store.add_connection(ConnectionDraft::new(ids[0], ids[1])).unwrap();
        let b = store.add_connection(ConnectionDraft::new(ids[0], ids[1])).unwrap();
        assert_ne!(a, b, "parallel connections are allowed");

        assert!(store.update_connection(
            a,
            ConnectionPatch {
                from_point: Some(AnchorPoint::Bottom),
                style: Some(ConnectionStyle::dashed()),
                ..ConnectionPatch::default()
            }
        ));
        assert_eq!(store.get_connection(a).unwrap().from_point, AnchorPoint::Bottom);
        assert!(!store.update_connection(ConnectionId::new(), ConnectionPatch::default()));

        assert!(store.remove_connection(b));
        assert!(!store.remove_connection(b));
        assert_eq!(store.connections_for(ids[1]).count(), 1);
    }

    #[test]
    fn test_heading_bridge() {
        let mut store = ShapeStore::new();
        let manual = store.add_shape(ShapeDraft::new());
        let linked = store.add_shape(ShapeDraft::new().with_heading("intro"));
        assert_eq!(store.shape_for_heading("intro"), Some(linked));
        assert_eq!(store.heading_for_shape(linked), Some("intro"));
        assert_eq!(store.heading_for_shape(manual), None);
        assert_eq!(store.shape_for_heading("missing"), None);
    }

    #[test]
    fn test_with_defaults() {
        let mut store = ShapeStore::with_defaults(ShapeDefaults {
            width: 200.0,
            ..ShapeDefaults::default()
        });
        let id = store.add_shape(ShapeDraft::new());
        assert_eq!(store.get_shape(id).unwrap().size(), Size::new(200.0, 60.0));
    }
}

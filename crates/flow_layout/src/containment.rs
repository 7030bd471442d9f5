//! Spatial grouping: collision tests, group/ungroup and drop handling
//!
//! Containment is decided by a center-in-rectangle test rather than full
//! overlap, so a shape dropped "mostly inside" a container joins it.

use crate::LayoutEngine;
use flow_model::{Rect, ShapeId, ShapeStore};
use std::collections::HashSet;

/// What [`ContainmentResolver::handle_drop`] did with the dropped shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The shape joined a new parent
    Grouped { parent: ShapeId },
    /// The shape left its former parent and is now a root
    Ungrouped { former_parent: ShapeId },
    /// Membership unchanged
    Unchanged,
}

/// Decides and enacts parent/child relationships
#[derive(Debug, Clone, Default)]
pub struct ContainmentResolver {
    layout: LayoutEngine,
}

impl ContainmentResolver {
    pub fn new(layout: LayoutEngine) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    /// True iff the center of `inner` lies within `outer` (borders included)
    pub fn check_collision(inner: &Rect, outer: &Rect) -> bool {
        outer.contains_point(inner.center())
    }

    /// True iff `candidate` is somewhere below `ancestor`
    pub fn is_descendant(store: &ShapeStore, ancestor: ShapeId, candidate: ShapeId) -> bool {
        store.is_descendant(ancestor, candidate)
    }

    /// Put `child` under `parent`, refitting both the new and the old parent.
    ///
    /// Fails without mutation on self-grouping, unknown ids, or when `parent`
    /// already sits below `child` (the link would close a cycle).
    pub fn group_shapes(&self, store: &mut ShapeStore, parent: ShapeId, child: ShapeId) -> bool {
        if parent == child
            || !store.contains(parent)
            || !store.contains(child)
            || store.is_descendant(child, parent)
        {
            return false;
        }
        let former = store.parent_of(child).filter(|&p| p != parent);
        if !store.attach_child(parent, child) {
            return false;
        }
        if let Some(former) = former {
            self.layout.update_parent_size(store, former);
        }
        self.layout.update_parent_size(store, parent);
        tracing::debug!(parent = %parent, child = %child, "shapes grouped");
        true
    }

    /// Detach `child` from its parent. Fails if it has none.
    pub fn ungroup_shape(&self, store: &mut ShapeStore, child: ShapeId) -> bool {
        let Some(former) = store.detach_from_parent(child) else {
            return false;
        };
        self.layout.update_parent_size(store, former);
        tracing::debug!(former_parent = %former, child = %child, "shape ungrouped");
        true
    }

    /// Best container for `id` at its current position.
    ///
    /// Candidates are visible shapes other than `id` and its descendants
    /// whose rectangle contains `id`'s center. The smallest candidate wins;
    /// among equal areas the one added last wins.
    pub fn find_drop_target(&self, store: &ShapeStore, id: ShapeId) -> Option<ShapeId> {
        let rect = store.get_shape(id)?.rect();
        let excluded: HashSet<ShapeId> = store.descendants(id).into_iter().collect();

        let mut best: Option<(ShapeId, f32)> = None;
        for candidate in store.shapes() {
            if candidate.id == id || excluded.contains(&candidate.id) || !candidate.is_visible() {
                continue;
            }
            let outer = candidate.rect();
            if !Self::check_collision(&rect, &outer) {
                continue;
            }
            let area = outer.area();
            match best {
                Some((_, best_area)) if area > best_area => {}
                _ => best = Some((candidate.id, area)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Regroup a shape at the end of a drag gesture.
    ///
    /// Joins the best container (see [`Self::find_drop_target`]); with no
    /// container, leaves a parent it no longer collides with. Staying inside
    /// the current parent keeps membership but refits the parent.
    pub fn handle_drop(&self, store: &mut ShapeStore, id: ShapeId) -> DropOutcome {
        let Some(shape) = store.get_shape(id) else {
            return DropOutcome::Unchanged;
        };
        let rect = shape.rect();
        let current_parent = shape.parent;

        match self.find_drop_target(store, id) {
            Some(target) if Some(target) == current_parent => {
                self.layout.update_parent_size(store, target);
                DropOutcome::Unchanged
            }
            Some(target) => {
                if self.group_shapes(store, target, id) {
                    DropOutcome::Grouped { parent: target }
                } else {
                    DropOutcome::Unchanged
                }
            }
            None => {
                let Some(parent) = current_parent else {
                    return DropOutcome::Unchanged;
                };
                let still_inside = store
                    .get_shape(parent)
                    .is_some_and(|p| Self::check_collision(&rect, &p.rect()));
                if !still_inside && self.ungroup_shape(store, id) {
                    DropOutcome::Ungrouped { former_parent: parent }
                } else {
                    DropOutcome::Unchanged
                }
            }
        }
    }
}

//! Group sizing, collapse/expand and sibling displacement
//!
//! Groups are sized from their direct children: the children's bounding box,
//! grown by the configured padding plus a header strip on top. A group never
//! auto-shrinks below its recorded `expanded_size` (or, before one is
//! recorded, its current size), so a box the user made larger by hand stays
//! that way.

use crate::LayoutConfig;
use flow_model::{Rect, ShapeId, ShapePatch, ShapeStore, Size};

/// Keeps group boxes and sibling spacing consistent with group membership
#[derive(Debug, Clone, Default)]
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Refit `id` around its children, then every ancestor above it.
    ///
    /// Returns `false` when `id` is unknown or has no children (nothing to fit).
    pub fn update_parent_size(&self, store: &mut ShapeStore, id: ShapeId) -> bool {
        if !self.fit_group(store, id) {
            return false;
        }
        for ancestor in store.ancestors(id) {
            self.fit_group(store, ancestor);
        }
        true
    }

    /// Fit a single group without touching its ancestors
    fn fit_group(&self, store: &mut ShapeStore, id: ShapeId) -> bool {
        let Some(shape) = store.get_shape(id) else {
            return false;
        };
        if shape.children.is_empty() {
            return false;
        }

        if shape.collapsed {
            let size = shape.collapsed_size.unwrap_or(self.config.collapsed_size);
            return store.update_shape(
                id,
                ShapePatch {
                    width: Some(size.width),
                    height: Some(size.height),
                    collapsed_size: Some(size),
                    ..ShapePatch::default()
                },
            );
        }

        let child_rects: Vec<Rect> = shape
            .children
            .iter()
            .filter_map(|c| store.get_shape(*c))
            .map(|c| c.rect())
            .collect();
        let Some(bounds) = Rect::bounding(child_rects) else {
            return false;
        };

        let pad = self.config.group_padding;
        let header = self.config.header_height;
        let padded = bounds.inflate(pad, pad);
        let required = Rect::new(padded.x, padded.y - header, padded.width, padded.height + header);

        // Grow towards the children; the current right and bottom edges stay
        let current = shape.rect();
        let x = current.x.min(required.x);
        let y = current.y.min(required.y);
        let right = current.right().max(required.right());
        let bottom = current.bottom().max(required.bottom());
        // Without a recorded expanded size the current box is the floor
        let floor = shape.expanded_size.unwrap_or_else(|| shape.size());
        let size = Size::new(right - x, bottom - y).max(floor);

        store.update_shape(
            id,
            ShapePatch {
                x: Some(x),
                y: Some(y),
                width: Some(size.width),
                height: Some(size.height),
                expanded_size: Some(size),
                ..ShapePatch::default()
            },
        )
    }

    /// Collapse an expanded group or expand a collapsed one.
    ///
    /// Collapsing needs children; expanding is always allowed so a group
    /// emptied while collapsed can still be opened. Returns `false` for
    /// unknown ids and for leaves that are not collapsed.
    pub fn toggle_collapse(&self, store: &mut ShapeStore, id: ShapeId) -> bool {
        let Some(shape) = store.get_shape(id) else {
            return false;
        };
        let old_size = shape.size();
        let expanded_size = shape.expanded_size;

        if !shape.collapsed {
            if shape.children.is_empty() {
                return false;
            }
            let target = shape.collapsed_size.unwrap_or(self.config.collapsed_size);
            store.update_shape(
                id,
                ShapePatch {
                    width: Some(target.width),
                    height: Some(target.height),
                    expanded_size: Some(old_size),
                    collapsed_size: Some(target),
                    ..ShapePatch::default()
                },
            );
            store.set_collapsed(id, true);
            self.set_children_visibility(store, id, false);
        } else {
            store.update_shape(
                id,
                ShapePatch {
                    collapsed_size: Some(old_size),
                    ..ShapePatch::default()
                },
            );
            store.set_collapsed(id, false);
            match expanded_size {
                Some(size) => {
                    store.update_shape(id, ShapePatch::size(size.width, size.height));
                }
                None => {
                    self.fit_group(store, id);
                }
            }
            // Inside a collapsed ancestor the children stay hidden
            let visible = store.is_visible(id);
            self.set_children_visibility(store, id, visible);
        }

        let new_size = store.get_shape(id).map(|s| s.size()).unwrap_or(old_size);
        let delta_height = new_size.height - old_size.height;
        tracing::debug!(
            shape = %id,
            collapsed = store.get_shape(id).is_some_and(|s| s.collapsed),
            delta_height,
            "collapse toggled"
        );
        self.adjust_layout(store, id, 0.0, delta_height);
        true
    }

    /// Show or hide everything below `id`.
    ///
    /// Hiding covers the whole subtree. Revealing shows direct children and
    /// continues only through children that are not collapsed themselves.
    pub fn set_children_visibility(&self, store: &mut ShapeStore, id: ShapeId, visible: bool) {
        let children = store.children_of(id).to_vec();
        for child in children {
            store.set_hidden(child, !visible);
            let child_collapsed = store.get_shape(child).is_some_and(|s| s.collapsed);
            if visible && child_collapsed {
                self.set_children_visibility(store, child, false);
            } else {
                self.set_children_visibility(store, child, visible);
            }
        }
    }

    /// Displace shapes after `source`'s right and bottom edges moved by
    /// `(delta_x, delta_y)`.
    ///
    /// Must be called after the change; the pre-change right and bottom
    /// edges are reconstructed from the deltas. Candidates are the source's
    /// siblings (or the other roots when the source is a root). A candidate
    /// whose left edge is at or past the old right edge moves by `delta_x`,
    /// one whose top edge is at or past the old bottom edge moves by
    /// `delta_y`; it carries its subtree along. The enclosing group is then
    /// refitted and, if its size changed, displacement continues one level up.
    pub fn adjust_layout(&self, store: &mut ShapeStore, source: ShapeId, delta_x: f32, delta_y: f32) {
        let Some(shape) = store.get_shape(source) else {
            return;
        };
        let rect = shape.rect();
        let parent = shape.parent;
        let old_right = rect.right() - delta_x;
        let old_bottom = rect.bottom() - delta_y;

        let candidates: Vec<ShapeId> = match parent {
            Some(p) => store.children_of(p).to_vec(),
            None => store.roots().collect(),
        };

        for candidate in candidates {
            if candidate == source || store.is_descendant(source, candidate) {
                continue;
            }
            let Some(other) = store.get_shape(candidate) else {
                continue;
            };
            let shift_x = if delta_x != 0.0 && other.x >= old_right { delta_x } else { 0.0 };
            let shift_y = if delta_y != 0.0 && other.y >= old_bottom { delta_y } else { 0.0 };
            if shift_x != 0.0 || shift_y != 0.0 {
                tracing::trace!(shape = %candidate, shift_x, shift_y, "displacing sibling");
                store.translate_subtree(candidate, shift_x, shift_y);
            }
        }

        if let Some(parent) = parent {
            let Some(before) = store.get_shape(parent).map(|p| p.rect()) else {
                return;
            };
            self.fit_group(store, parent);
            let after = store.get_shape(parent).map(|p| p.rect()).unwrap_or(before);
            self.adjust_layout(
                store,
                parent,
                after.right() - before.right(),
                after.bottom() - before.bottom(),
            );
        }
    }

    /// Apply a user resize to `id`.
    ///
    /// For a group the new size is remembered (as `collapsed_size` while
    /// collapsed, otherwise as `expanded_size`) and the group is refitted so
    /// it never ends up smaller than its children. Shapes past the moved
    /// right or bottom edge are then displaced, and the enclosing groups are
    /// refitted with the same propagation a collapse uses.
    pub fn apply_resize(&self, store: &mut ShapeStore, id: ShapeId, rect: Rect) -> bool {
        let Some(shape) = store.get_shape(id) else {
            return false;
        };
        let is_group = shape.is_group();
        let collapsed = shape.collapsed;
        let before = shape.rect();

        store.set_rect(id, rect);
        if is_group {
            let size = rect.size();
            let patch = if collapsed {
                ShapePatch { collapsed_size: Some(size), ..ShapePatch::default() }
            } else {
                ShapePatch { expanded_size: Some(size), ..ShapePatch::default() }
            };
            store.update_shape(id, patch);
            self.fit_group(store, id);
        }
        let after = store.get_shape(id).map(|s| s.rect()).unwrap_or(rect);
        self.adjust_layout(
            store,
            id,
            after.right() - before.right(),
            after.bottom() - before.bottom(),
        );
        true
    }
}

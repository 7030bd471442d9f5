//! Outline sync: keep heading-linked shapes in step with the document
//!
//! The editor hands over its ordered heading list whenever the document
//! changes. [`OutlineSync::reconcile`] diffs that list against the store by
//! heading id: matching shapes get their text refreshed, new headings get a
//! shape on the placement grid, and heading shapes whose heading vanished are
//! removed. Shapes the user placed by hand are never touched.

use flow_model::{Point, ShapeDraft, ShapeId, ShapePatch, ShapeStore};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A document heading as exposed by the editor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Stable id that survives edits to the heading text
    pub id: String,
    pub text: String,
    /// 1..=4
    pub level: u8,
}

impl Heading {
    pub fn new(id: impl Into<String>, text: impl Into<String>, level: u8) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level: level.clamp(1, 4),
        }
    }
}

/// Grid on which shapes for new headings are placed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridConfig {
    pub origin_x: f32,
    pub origin_y: f32,
    pub column_step: f32,
    pub row_step: f32,
    /// Columns wrap once they would pass this width
    pub wrap_width: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin_x: 40.0,
            origin_y: 40.0,
            column_step: 160.0,
            row_step: 100.0,
            wrap_width: 800.0,
        }
    }
}

impl GridConfig {
    /// Number of columns per row, at least one
    pub fn columns(&self) -> usize {
        if self.column_step <= 0.0 {
            return 1;
        }
        ((self.wrap_width / self.column_step).floor() as usize).max(1)
    }

    /// Top-left corner for the shape of the heading at `index`
    pub fn position(&self, index: usize) -> Point {
        let columns = self.columns();
        let column = index % columns;
        let row = index / columns;
        Point::new(
            self.origin_x + column as f32 * self.column_step,
            self.origin_y + row as f32 * self.row_step,
        )
    }
}

/// What a reconcile pass changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub created: Vec<ShapeId>,
    /// Shapes whose text changed
    pub updated: Vec<ShapeId>,
    /// Legacy shapes that took over a heading id
    pub adopted: Vec<ShapeId>,
    pub removed: Vec<ShapeId>,
}

impl SyncReport {
    /// True when the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.created.is_empty()
            && self.updated.is_empty()
            && self.adopted.is_empty()
            && self.removed.is_empty()
    }
}

/// Reconciles heading-linked shapes against the editor's heading list
#[derive(Debug, Clone, Default)]
pub struct OutlineSync {
    grid: GridConfig,
}

impl OutlineSync {
    pub fn new(grid: GridConfig) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// One diff pass of `headings` against `store`.
    ///
    /// Running it twice with the same list changes nothing the second time.
    /// Connections are never created or removed here, except for those that
    /// go away with a removed shape.
    pub fn reconcile(&self, store: &mut ShapeStore, headings: &[Heading]) -> SyncReport {
        let mut report = SyncReport::default();
        let linked_before: Vec<ShapeId> = store
            .shapes()
            .filter(|s| s.is_heading_linked())
            .map(|s| s.id)
            .collect();
        let mut seen_shapes: HashSet<ShapeId> = HashSet::new();
        let mut seen_headings: HashSet<&str> = HashSet::new();

        for (index, heading) in headings.iter().enumerate() {
            if !seen_headings.insert(heading.id.as_str()) {
                tracing::debug!(heading = %heading.id, "duplicate heading id ignored");
                continue;
            }

            if let Some(id) = store.shape_for_heading(&heading.id) {
                seen_shapes.insert(id);
                if self.sync_text(store, id, &heading.text) {
                    report.updated.push(id);
                }
                continue;
            }

            let legacy = store
                .shapes()
                .find(|s| s.heading_id.is_none() && s.legacy_index == Some(index))
                .map(|s| s.id);
            if let Some(id) = legacy {
                store.adopt_heading(id, heading.id.clone());
                self.sync_text(store, id, &heading.text);
                seen_shapes.insert(id);
                report.adopted.push(id);
                continue;
            }

            let at = self.grid.position(index);
            let fill = store.defaults().palette.heading_fill(heading.level);
            let id = store.add_shape(
                ShapeDraft::new()
                    .with_text(heading.text.clone())
                    .at(at.x, at.y)
                    .with_heading(heading.id.clone())
                    .with_background(fill),
            );
            seen_shapes.insert(id);
            report.created.push(id);
        }

        for id in linked_before {
            if !seen_shapes.contains(&id) && store.remove_shape(id) {
                report.removed.push(id);
            }
        }

        tracing::debug!(
            headings = headings.len(),
            created = report.created.len(),
            updated = report.updated.len(),
            adopted = report.adopted.len(),
            removed = report.removed.len(),
            "outline reconciled"
        );
        report
    }

    /// Write `text` into the shape if it differs; returns whether it changed
    fn sync_text(&self, store: &mut ShapeStore, id: ShapeId, text: &str) -> bool {
        let unchanged = store.get_shape(id).is_some_and(|s| s.text == text);
        if unchanged {
            return false;
        }
        store.update_shape(id, ShapePatch::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flow_model::ConnectionDraft;

    fn headings(items: &[(&str, &str)]) -> Vec<Heading> {
        items.iter().map(|(id, text)| Heading::new(*id, *text, 1)).collect()
    }

    #[test]
    fn test_grid_positions_wrap() {
        let grid = GridConfig::default();
        assert_eq!(grid.columns(), 5);
        assert_eq!(grid.position(0), Point::new(40.0, 40.0));
        assert_eq!(grid.position(4), Point::new(680.0, 40.0));
        assert_eq!(grid.position(5), Point::new(40.0, 140.0));

        let degenerate = GridConfig { column_step: 0.0, ..GridConfig::default() };
        assert_eq!(degenerate.columns(), 1);
    }

    #[test]
    fn test_reconcile_creates_shapes_for_new_headings() {
        let sync = OutlineSync::default();
        let mut store = ShapeStore::new();
        let report = sync.reconcile(&mut store, &headings(&[("a", "Intro"), ("b", "Body")]));

        assert_eq!(report.created.len(), 2);
        assert_eq!(store.len(), 2);
        let b = store.get_shape(store.shape_for_heading("b").unwrap()).unwrap();
        assert_eq!(b.text, "Body");
        assert_eq!(b.origin(), Point::new(200.0, 40.0));
        assert_eq!(b.height, 36.0);
        assert_eq!(b.background_color, store.defaults().palette.heading_fill(1));
    }

    #[test]
    fn test_reconcile_updates_text_and_removes_vanished() {
        let sync = OutlineSync::default();
        let mut store = ShapeStore::new();
        sync.reconcile(&mut store, &headings(&[("a", "Intro"), ("b", "Body")]));
        let a = store.shape_for_heading("a").unwrap();
        let b = store.shape_for_heading("b").unwrap();
        let manual = store.add_shape(ShapeDraft::new().with_text("mine"));
        store.add_connection(ConnectionDraft::new(b, manual)).unwrap();

        let report = sync.reconcile(&mut store, &headings(&[("a", "Introduction")]));
        assert_eq!(report.updated, vec![a]);
        assert_eq!(report.removed, vec![b]);
        assert!(store.contains(manual), "manual shapes are never removed");
        assert!(store.get_connections().is_empty());
        assert_eq!(store.get_shape(a).unwrap().text, "Introduction");
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let sync = OutlineSync::default();
        let mut store = ShapeStore::new();
        let list = headings(&[("a", "One"), ("b", "Two"), ("c", "Three")]);
        assert!(!sync.reconcile(&mut store, &list).is_noop());
        let ids = store.shape_ids().to_vec();

        assert!(sync.reconcile(&mut store, &list).is_noop());
        assert_eq!(store.shape_ids(), ids.as_slice());
    }

    #[test]
    fn test_reconcile_keeps_moved_shapes_in_place() {
        let sync = OutlineSync::default();
        let mut store = ShapeStore::new();
        sync.reconcile(&mut store, &headings(&[("a", "One")]));
        let a = store.shape_for_heading("a").unwrap();
        store.update_shape(a, ShapePatch::position(500.0, 500.0));

        sync.reconcile(&mut store, &headings(&[("z", "Zero"), ("a", "One")]));
        assert_eq!(store.get_shape(a).unwrap().origin(), Point::new(500.0, 500.0));
    }

    #[test]
    fn test_legacy_shapes_are_adopted_by_position() {
        let sync = OutlineSync::default();
        let mut store = ShapeStore::new();
        let legacy = store.add_shape(ShapeDraft::new().with_text("Old title").with_legacy_index(1));

        let report = sync.reconcile(&mut store, &headings(&[("a", "First"), ("b", "New title")]));
        assert_eq!(report.adopted, vec![legacy]);
        assert_eq!(report.created.len(), 1);
        let shape = store.get_shape(legacy).unwrap();
        assert_eq!(shape.heading_id.as_deref(), Some("b"));
        assert_eq!(shape.legacy_index, None);
        assert_eq!(shape.text, "New title");

        assert!(sync.reconcile(&mut store, &headings(&[("a", "First"), ("b", "New title")])).is_noop());
    }

    #[test]
    fn test_unadopted_legacy_shapes_are_left_alone() {
        let sync = OutlineSync::default();
        let mut store = ShapeStore::new();
        let legacy = store.add_shape(ShapeDraft::new().with_legacy_index(7));
        sync.reconcile(&mut store, &headings(&[("a", "Only")]));
        assert!(store.contains(legacy));
        assert!(store.get_shape(legacy).unwrap().heading_id.is_none());
    }

    #[test]
    fn test_duplicate_heading_ids_and_duplicate_shapes() {
        let sync = OutlineSync::default();
        let mut store = ShapeStore::new();
        let first = store.add_shape(ShapeDraft::new().with_heading("a").with_text("A"));
        let second = store.add_shape(ShapeDraft::new().with_heading("a").with_text("A"));

        let report = sync.reconcile(&mut store, &headings(&[("a", "A"), ("a", "Again")]));
        assert_eq!(report.removed, vec![second]);
        assert!(report.updated.is_empty(), "later duplicate is ignored");
        assert_eq!(store.get_shape(first).unwrap().text, "A");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(Heading::new("x", "X", 0).level, 1);
        assert_eq!(Heading::new("x", "X", 9).level, 4);
    }
}

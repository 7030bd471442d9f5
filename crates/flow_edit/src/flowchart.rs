//! The flowchart facade
//!
//! A [`Flowchart`] owns one store plus the components that edit it. Each
//! instance is independent; the host creates one per document.

use crate::{
    FlowSettings, GestureOutcome, Heading, InteractionController, OutlineSync, Result, SyncReport,
    ToolMode,
};
use flow_layout::{connector_paths, ContainmentResolver, ConnectorPath, LayoutEngine};
use flow_model::{
    ConnectionDraft, ConnectionId, ConnectionPatch, Point, Rect, ShapeDraft, ShapeId, ShapePatch,
    ShapeStore, Snapshot,
};

/// One flowchart: scene graph, layout, interaction and outline sync
#[derive(Debug, Clone)]
pub struct Flowchart {
    settings: FlowSettings,
    store: ShapeStore,
    resolver: ContainmentResolver,
    controller: InteractionController,
    sync: OutlineSync,
}

impl Default for Flowchart {
    fn default() -> Self {
        Self::new(FlowSettings::default())
    }
}

impl Flowchart {
    pub fn new(settings: FlowSettings) -> Self {
        let layout = LayoutEngine::new(settings.layout.clone());
        let resolver = ContainmentResolver::new(layout);
        let controller = InteractionController::new(settings.interaction.clone(), resolver.clone());
        Self {
            store: ShapeStore::with_defaults(settings.shapes.clone()),
            sync: OutlineSync::new(settings.grid.clone()),
            resolver,
            controller,
            settings,
        }
    }

    pub fn settings(&self) -> &FlowSettings {
        &self.settings
    }

    /// Read access for rendering adapters
    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    // =========================================================================
    // Shapes and connections
    // =========================================================================

    pub fn add_shape(&mut self, draft: ShapeDraft) -> ShapeId {
        self.store.add_shape(draft)
    }

    /// Patch a shape; its enclosing groups are refitted afterwards
    pub fn update_shape(&mut self, id: ShapeId, patch: ShapePatch) -> bool {
        if !self.store.update_shape(id, patch) {
            return false;
        }
        if let Some(parent) = self.store.parent_of(id) {
            self.resolver.layout().update_parent_size(&mut self.store, parent);
        }
        true
    }

    /// Resize or move a shape the way a resize gesture would
    pub fn resize_shape(&mut self, id: ShapeId, rect: Rect) -> bool {
        self.resolver.layout().apply_resize(&mut self.store, id, rect)
    }

    /// Delete a shape. Its children become roots and its connections go too.
    pub fn remove_shape(&mut self, id: ShapeId) -> bool {
        let parent = self.store.parent_of(id);
        if !self.store.remove_shape(id) {
            return false;
        }
        self.controller.forget(id);
        if let Some(parent) = parent {
            self.resolver.layout().update_parent_size(&mut self.store, parent);
        }
        true
    }

    pub fn add_connection(&mut self, draft: ConnectionDraft) -> Option<ConnectionId> {
        self.store.add_connection(draft)
    }

    pub fn update_connection(&mut self, id: ConnectionId, patch: ConnectionPatch) -> bool {
        self.store.update_connection(id, patch)
    }

    pub fn remove_connection(&mut self, id: ConnectionId) -> bool {
        self.store.remove_connection(id)
    }

    // =========================================================================
    // Grouping and collapse
    // =========================================================================

    pub fn group_shapes(&mut self, parent: ShapeId, child: ShapeId) -> bool {
        self.resolver.group_shapes(&mut self.store, parent, child)
    }

    pub fn ungroup_shape(&mut self, child: ShapeId) -> bool {
        self.resolver.ungroup_shape(&mut self.store, child)
    }

    pub fn toggle_collapse(&mut self, id: ShapeId) -> bool {
        self.resolver.layout().toggle_collapse(&mut self.store, id)
    }

    // =========================================================================
    // Pointer input
    // =========================================================================

    pub fn set_mode(&mut self, mode: ToolMode) {
        self.controller.set_mode(&mut self.store, mode);
    }

    pub fn pointer_down(&mut self, point: Point) -> bool {
        self.controller.pointer_down(&self.store, point)
    }

    pub fn pointer_move(&mut self, point: Point) -> bool {
        self.controller.pointer_move(&mut self.store, point)
    }

    pub fn pointer_up(&mut self, point: Point) -> GestureOutcome {
        self.controller.pointer_up(&mut self.store, point)
    }

    pub fn cancel_gesture(&mut self) -> bool {
        self.controller.cancel(&mut self.store)
    }

    // =========================================================================
    // Outline sync
    // =========================================================================

    /// Bring heading shapes in line with `headings`
    pub fn reconcile(&mut self, headings: &[Heading]) -> SyncReport {
        let report = self.sync.reconcile(&mut self.store, headings);
        for removed in &report.removed {
            self.controller.forget(*removed);
        }
        let paths = self.connector_paths();
        tracing::debug!(connectors = paths.len(), "connector geometry refreshed after sync");
        report
    }

    pub fn shape_for_heading(&self, heading_id: &str) -> Option<ShapeId> {
        self.store.shape_for_heading(heading_id)
    }

    pub fn heading_for_shape(&self, id: ShapeId) -> Option<&str> {
        self.store.heading_for_shape(id)
    }

    /// Curves for every connection whose endpoints are both visible
    pub fn connector_paths(&self) -> Vec<ConnectorPath> {
        connector_paths(&self.store)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Replace the content with `snapshot`; any active gesture is dropped
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.controller.cancel(&mut self.store);
        self.controller.select(None);
        self.store.replace_with_snapshot(snapshot);
        tracing::info!(
            shapes = self.store.len(),
            connections = self.store.get_connections().len(),
            "flowchart restored"
        );
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(self.snapshot().to_json()?)
    }

    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let snapshot = Snapshot::from_json(json)?;
        self.restore(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FlowEditError;

    #[test]
    fn test_instances_are_independent() {
        let mut a = Flowchart::default();
        let b = Flowchart::default();
        a.add_shape(ShapeDraft::new());
        assert_eq!(a.store().len(), 1);
        assert!(b.store().is_empty());
    }

    #[test]
    fn test_settings_flow_into_components() {
        let mut settings = FlowSettings::default();
        settings.shapes.width = 200.0;
        settings.grid.origin_x = 0.0;
        let mut chart = Flowchart::new(settings);

        let id = chart.add_shape(ShapeDraft::new());
        assert_eq!(chart.store().get_shape(id).unwrap().width, 200.0);

        chart.reconcile(&[Heading::new("h", "Heading", 2)]);
        let shape = chart.shape_for_heading("h").unwrap();
        assert_eq!(chart.store().get_shape(shape).unwrap().x, 0.0);
        assert_eq!(chart.heading_for_shape(shape), Some("h"));
    }

    #[test]
    fn test_remove_selected_shape_clears_selection() {
        let mut chart = Flowchart::default();
        let id = chart.add_shape(ShapeDraft::new().with_rect(Rect::new(0.0, 0.0, 100.0, 50.0)));
        chart.pointer_down(Point::new(10.0, 10.0));
        chart.pointer_up(Point::new(10.0, 10.0));
        assert_eq!(chart.controller().selected(), Some(id));

        assert!(chart.remove_shape(id));
        assert_eq!(chart.controller().selected(), None);
        assert!(!chart.remove_shape(id));
    }

    #[test]
    fn test_update_child_refits_group() {
        let mut chart = Flowchart::default();
        let group = chart.add_shape(ShapeDraft::new().with_rect(Rect::new(0.0, 0.0, 200.0, 150.0)));
        let child = chart.add_shape(ShapeDraft::new().with_rect(Rect::new(40.0, 60.0, 100.0, 50.0)));
        assert!(chart.group_shapes(group, child));

        assert!(chart.update_shape(child, ShapePatch::size(300.0, 50.0)));
        assert_eq!(chart.store().get_shape(group).unwrap().rect().right(), 360.0);
    }

    #[test]
    fn test_json_round_trip() {
        let mut chart = Flowchart::default();
        let group = chart.add_shape(ShapeDraft::new().with_rect(Rect::new(0.0, 0.0, 300.0, 200.0)));
        let child = chart.add_shape(ShapeDraft::new().with_rect(Rect::new(40.0, 60.0, 100.0, 50.0)));
        chart.group_shapes(group, child);
        chart.toggle_collapse(group);
        let json = chart.to_json().unwrap();

        let mut restored = Flowchart::default();
        restored.load_json(&json).unwrap();
        assert_eq!(restored.snapshot(), chart.snapshot());
        assert!(!restored.store().is_visible(child));
    }

    #[test]
    fn test_load_invalid_json() {
        let mut chart = Flowchart::default();
        chart.add_shape(ShapeDraft::new());
        let result = chart.load_json("not json");
        assert!(matches!(result, Err(FlowEditError::Model(_))));
        assert_eq!(chart.store().len(), 1, "failed load leaves content alone");
    }
}

//! End-to-end flowchart scenarios
//!
//! Drives the [`Flowchart`] facade the way an editor host would: headings
//! arrive from the document, the user drags, groups, collapses and connects
//! shapes, and the result is persisted and restored.

use flow_edit::{Flowchart, GestureOutcome, Heading, ToolMode};
use flow_layout::{DropOutcome, LayoutEngine};
use flow_model::{ConnectionDraft, Point, Rect, ShapeDraft, ShapeId, ShapeStore};
use proptest::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn shape_at(chart: &mut Flowchart, x: f32, y: f32, w: f32, h: f32) -> ShapeId {
    chart.add_shape(ShapeDraft::new().with_rect(Rect::new(x, y, w, h)))
}

fn drag(chart: &mut Flowchart, from: Point, to: Point) -> GestureOutcome {
    assert!(chart.pointer_down(from), "no gesture started at {:?}", from);
    chart.pointer_move(Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0));
    chart.pointer_up(to)
}

#[test]
fn test_adjust_layout_pushes_root_to_the_right() {
    init_tracing();
    let mut store = ShapeStore::new();
    let a = store.add_shape(ShapeDraft::new().with_rect(Rect::new(0.0, 0.0, 120.0, 60.0)));
    let b = store.add_shape(ShapeDraft::new().with_rect(Rect::new(300.0, 0.0, 120.0, 60.0)));

    // Widen A by 50, then displace the other roots
    store.set_rect(a, Rect::new(0.0, 0.0, 170.0, 60.0));
    LayoutEngine::default().adjust_layout(&mut store, a, 50.0, 0.0);
    assert_eq!(store.get_shape(b).unwrap().rect(), Rect::new(350.0, 0.0, 120.0, 60.0));
}

#[test]
fn test_collapse_round_trip_restores_size() {
    init_tracing();
    let mut chart = Flowchart::default();
    let group = shape_at(&mut chart, 0.0, 0.0, 300.0, 200.0);
    let child = shape_at(&mut chart, 40.0, 60.0, 100.0, 50.0);
    assert!(chart.group_shapes(group, child));
    let before = chart.store().get_shape(group).unwrap().size();

    assert!(chart.toggle_collapse(group));
    assert!(!chart.store().is_visible(child));
    assert!(chart.toggle_collapse(group));

    assert_eq!(chart.store().get_shape(group).unwrap().size(), before);
    assert!(chart.store().is_visible(child));
}

#[test]
fn test_drag_in_and_out_of_container() {
    init_tracing();
    let mut chart = Flowchart::default();
    let parent = shape_at(&mut chart, 0.0, 0.0, 300.0, 200.0);
    let shape = shape_at(&mut chart, 400.0, 0.0, 100.0, 50.0);

    let outcome = drag(&mut chart, Point::new(450.0, 25.0), Point::new(150.0, 100.0));
    assert_eq!(outcome, GestureOutcome::Moved { shape, drop: DropOutcome::Grouped { parent } });
    assert_eq!(chart.store().parent_of(shape), Some(parent));
    assert!(chart.store().children_of(parent).contains(&shape));

    let outcome = drag(&mut chart, Point::new(150.0, 100.0), Point::new(600.0, 100.0));
    assert_eq!(
        outcome,
        GestureOutcome::Moved { shape, drop: DropOutcome::Ungrouped { former_parent: parent } }
    );
    assert_eq!(chart.store().parent_of(shape), None);
    assert!(chart.store().children_of(parent).is_empty());
}

#[test]
fn test_reverse_grouping_is_rejected() {
    init_tracing();
    let mut chart = Flowchart::default();
    let a = shape_at(&mut chart, 0.0, 0.0, 300.0, 200.0);
    let b = shape_at(&mut chart, 40.0, 60.0, 100.0, 50.0);

    assert!(chart.group_shapes(a, b));
    assert!(!chart.group_shapes(b, a));
    assert_eq!(chart.store().parent_of(b), Some(a));
    assert_eq!(chart.store().parent_of(a), None);
}

#[test]
fn test_outline_session() {
    init_tracing();
    let mut chart = Flowchart::default();
    let headings = vec![
        Heading::new("intro", "Introduction", 1),
        Heading::new("setup", "Setup", 2),
        Heading::new("usage", "Usage", 2),
    ];
    let report = chart.reconcile(&headings);
    assert_eq!(report.created.len(), 3);

    let intro = chart.shape_for_heading("intro").unwrap();
    let setup = chart.shape_for_heading("setup").unwrap();
    let usage = chart.shape_for_heading("usage").unwrap();
    let note = shape_at(&mut chart, 40.0, 400.0, 120.0, 60.0);
    chart.add_connection(ConnectionDraft::new(intro, setup)).unwrap();
    chart.add_connection(ConnectionDraft::new(usage, note)).unwrap();
    assert_eq!(chart.connector_paths().len(), 2);

    // "Usage" disappears from the document, "Setup" is renamed
    let headings = vec![
        Heading::new("intro", "Introduction", 1),
        Heading::new("setup", "Installation", 2),
    ];
    let report = chart.reconcile(&headings);
    assert_eq!(report.updated, vec![setup]);
    assert_eq!(report.removed, vec![usage]);
    assert!(chart.store().contains(note));
    assert_eq!(chart.store().get_connections().len(), 1);
    assert!(chart.reconcile(&headings).is_noop());

    let json = chart.to_json().unwrap();
    let mut reopened = Flowchart::default();
    reopened.load_json(&json).unwrap();
    assert!(reopened.reconcile(&headings).is_noop());
    assert_eq!(reopened.snapshot(), chart.snapshot());
}

#[test]
fn test_connect_tool_links_shapes() {
    init_tracing();
    let mut chart = Flowchart::default();
    let a = shape_at(&mut chart, 0.0, 0.0, 100.0, 50.0);
    let b = shape_at(&mut chart, 0.0, 200.0, 100.0, 50.0);
    chart.set_mode(ToolMode::Connect);

    assert!(chart.pointer_down(Point::new(50.0, 50.0)));
    let GestureOutcome::Connected(id) = chart.pointer_up(Point::new(50.0, 200.0)) else {
        panic!("expected a connection");
    };
    let path = chart
        .connector_paths()
        .into_iter()
        .find(|p| p.connection == id)
        .unwrap();
    assert_eq!(path.start, Point::new(50.0, 50.0));
    assert_eq!(path.end, Point::new(50.0, 200.0));

    assert!(chart.remove_shape(b));
    assert!(chart.store().get_connections().is_empty());
    assert!(chart.store().contains(a));
}

#[test]
fn test_collapsed_group_hides_connectors() {
    init_tracing();
    let mut chart = Flowchart::default();
    let group = shape_at(&mut chart, 0.0, 0.0, 300.0, 200.0);
    let inner = shape_at(&mut chart, 40.0, 60.0, 100.0, 50.0);
    let outer = shape_at(&mut chart, 500.0, 60.0, 100.0, 50.0);
    chart.group_shapes(group, inner);
    chart.add_connection(ConnectionDraft::new(inner, outer)).unwrap();

    chart.toggle_collapse(group);
    assert!(chart.connector_paths().is_empty());
    chart.toggle_collapse(group);
    assert_eq!(chart.connector_paths().len(), 1);
}

proptest! {
    #[test]
    fn prop_reconcile_is_stable(
        ids in proptest::collection::vec(0u8..12, 0..12),
        texts in proptest::collection::vec("[a-z]{1,8}", 12),
        second in proptest::collection::vec(0u8..12, 0..12),
    ) {
        let mut chart = Flowchart::default();
        let to_headings = |ids: &[u8]| -> Vec<Heading> {
            ids.iter()
                .map(|i| Heading::new(format!("h{}", i), texts[*i as usize].clone(), 1 + i % 4))
                .collect()
        };

        for list in [to_headings(&ids), to_headings(&second)] {
            chart.reconcile(&list);
            let before = chart.snapshot();
            prop_assert!(chart.reconcile(&list).is_noop());
            prop_assert_eq!(chart.snapshot(), before);

            let linked = chart.store().shapes().filter(|s| s.is_heading_linked()).count();
            let mut unique: Vec<u8> = list.iter().map(|h| h.id[1..].parse().unwrap()).collect();
            unique.sort_unstable();
            unique.dedup();
            prop_assert_eq!(linked, unique.len());
        }
    }
}

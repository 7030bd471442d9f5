//! Pointer interaction: hit testing and the gesture state machine
//!
//! The rendering adapter forwards pointer events in canvas coordinates. One
//! gesture is active at a time; a pointer-down that arrives while a gesture is
//! running is ignored. Grouping decisions happen only on pointer-up, never
//! mid-drag.

use flow_layout::{ContainmentResolver, DropOutcome};
use flow_model::{
    geometry, AnchorPoint, ConnectionDraft, ConnectionId, Point, Rect, ShapeId, ShapeStore, Size,
};
use serde::{Deserialize, Serialize};

// =============================================================================
// Modes, handles and hit targets
// =============================================================================

/// Active tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolMode {
    #[default]
    Select,
    Pan,
    Connect,
}

/// Compass direction of a resize handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeDirection {
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl ResizeDirection {
    pub const ALL: [ResizeDirection; 8] = [
        ResizeDirection::N,
        ResizeDirection::NE,
        ResizeDirection::E,
        ResizeDirection::SE,
        ResizeDirection::S,
        ResizeDirection::SW,
        ResizeDirection::W,
        ResizeDirection::NW,
    ];

    pub fn has_north(&self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    pub fn has_south(&self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    pub fn has_east(&self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    pub fn has_west(&self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    /// Where the handle sits on `rect`
    pub fn position_on(&self, rect: &Rect) -> Point {
        let x = if self.has_west() {
            rect.x
        } else if self.has_east() {
            rect.right()
        } else {
            rect.x + rect.width / 2.0
        };
        let y = if self.has_north() {
            rect.y
        } else if self.has_south() {
            rect.bottom()
        } else {
            rect.y + rect.height / 2.0
        };
        Point::new(x, y)
    }
}

/// What lies under the pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    ShapeBody(ShapeId),
    ResizeHandle(ShapeId, ResizeDirection),
    Anchor(ShapeId, AnchorPoint),
    Canvas,
}

/// Pointer tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InteractionConfig {
    /// How far from a handle or anchor (per axis) a press still hits it
    pub handle_size: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { handle_size: 8.0 }
    }
}

// =============================================================================
// Gestures
// =============================================================================

/// Gesture state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging {
        shape: ShapeId,
        last: Point,
    },
    /// `origin` is the shape's rectangle at pointer-down
    Resizing {
        shape: ShapeId,
        direction: ResizeDirection,
        origin: Rect,
        start: Point,
    },
    /// `last` is in screen space so pan updates do not feed back
    Panning {
        last: Point,
    },
    Connecting {
        source: ShapeId,
        anchor: AnchorPoint,
        cursor: Point,
    },
}

impl Gesture {
    /// Shape the gesture operates on, if any
    pub fn shape(&self) -> Option<ShapeId> {
        match *self {
            Gesture::Dragging { shape, .. } | Gesture::Resizing { shape, .. } => Some(shape),
            Gesture::Connecting { source, .. } => Some(source),
            Gesture::Idle | Gesture::Panning { .. } => None,
        }
    }
}

/// Result of ending a gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No gesture was active
    None,
    Moved { shape: ShapeId, drop: DropOutcome },
    Resized { shape: ShapeId },
    Panned,
    Connected(ConnectionId),
    /// Ended without any mutation
    Abandoned,
}

/// New rectangle for a resize from `origin` by the total pointer offset.
///
/// The edge opposite the handle stays fixed, also when the size is clamped
/// to `min`.
pub fn resize_rect(origin: &Rect, direction: ResizeDirection, dx: f32, dy: f32, min: Size) -> Rect {
    let mut rect = *origin;
    if direction.has_east() {
        rect.width = geometry::clamp(origin.width + dx, min.width, f32::MAX);
    } else if direction.has_west() {
        rect.width = geometry::clamp(origin.width - dx, min.width, f32::MAX);
        rect.x = origin.right() - rect.width;
    }
    if direction.has_south() {
        rect.height = geometry::clamp(origin.height + dy, min.height, f32::MAX);
    } else if direction.has_north() {
        rect.height = geometry::clamp(origin.height - dy, min.height, f32::MAX);
        rect.y = origin.bottom() - rect.height;
    }
    rect
}

// =============================================================================
// Controller
// =============================================================================

/// Turns pointer events into store mutations
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    config: InteractionConfig,
    resolver: ContainmentResolver,
    mode: ToolMode,
    gesture: Gesture,
    selected: Option<ShapeId>,
    pan_offset: Point,
}

impl InteractionController {
    pub fn new(config: InteractionConfig, resolver: ContainmentResolver) -> Self {
        Self {
            config,
            resolver,
            mode: ToolMode::default(),
            gesture: Gesture::Idle,
            selected: None,
            pan_offset: Point::ORIGIN,
        }
    }

    pub fn resolver(&self) -> &ContainmentResolver {
        &self.resolver
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    /// Switch tools. An active gesture is abandoned as if cancelled.
    pub fn set_mode(&mut self, store: &mut ShapeStore, mode: ToolMode) {
        if self.mode != mode {
            self.cancel(store);
            self.mode = mode;
        }
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected
    }

    pub fn select(&mut self, id: Option<ShapeId>) {
        self.selected = id;
    }

    pub fn pan_offset(&self) -> Point {
        self.pan_offset
    }

    pub fn screen_to_canvas(&self, point: Point) -> Point {
        Point::new(point.x - self.pan_offset.x, point.y - self.pan_offset.y)
    }

    pub fn canvas_to_screen(&self, point: Point) -> Point {
        Point::new(point.x + self.pan_offset.x, point.y + self.pan_offset.y)
    }

    /// Drop references to a shape that is about to go away
    pub fn forget(&mut self, id: ShapeId) {
        if self.selected == Some(id) {
            self.selected = None;
        }
    }

    // =========================================================================
    // Hit testing
    // =========================================================================

    /// Visible shapes, top-most first: deeper nesting above shallower, later
    /// insertion above earlier.
    fn stacking_order(store: &ShapeStore) -> Vec<ShapeId> {
        let mut ranked: Vec<(usize, usize, ShapeId)> = store
            .shape_ids()
            .iter()
            .enumerate()
            .filter(|(_, id)| store.is_visible(**id))
            .map(|(index, id)| (store.ancestors(*id).len(), index, *id))
            .collect();
        ranked.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        ranked.into_iter().map(|(_, _, id)| id).collect()
    }

    fn near(&self, a: Point, b: Point) -> bool {
        let tolerance = self.config.handle_size;
        (a.x - b.x).abs() <= tolerance && (a.y - b.y).abs() <= tolerance
    }

    /// Anchor under `point`, skipping anchors of `exclude`
    fn anchor_at(
        &self,
        store: &ShapeStore,
        point: Point,
        exclude: Option<ShapeId>,
    ) -> Option<(ShapeId, AnchorPoint)> {
        Self::stacking_order(store)
            .into_iter()
            .filter(|id| Some(*id) != exclude)
            .filter_map(|id| store.get_shape(id))
            .find_map(|shape| {
                let rect = shape.rect();
                AnchorPoint::ALL
                    .into_iter()
                    .find(|anchor| self.near(anchor.position_on(&rect), point))
                    .map(|anchor| (shape.id, anchor))
            })
    }

    /// Resolve a canvas point to what the current mode would act on
    pub fn hit_test(&self, store: &ShapeStore, point: Point) -> HitTarget {
        match self.mode {
            ToolMode::Select => {
                let selected = self
                    .selected
                    .and_then(|id| store.get_shape(id))
                    .filter(|s| s.is_visible());
                if let Some(shape) = selected {
                    let rect = shape.rect();
                    if let Some(direction) = ResizeDirection::ALL
                        .into_iter()
                        .find(|d| self.near(d.position_on(&rect), point))
                    {
                        return HitTarget::ResizeHandle(shape.id, direction);
                    }
                }
            }
            ToolMode::Connect => {
                if let Some((id, anchor)) = self.anchor_at(store, point, None) {
                    return HitTarget::Anchor(id, anchor);
                }
            }
            ToolMode::Pan => {}
        }

        Self::stacking_order(store)
            .into_iter()
            .find(|id| {
                store
                    .get_shape(*id)
                    .is_some_and(|s| s.rect().contains_point(point))
            })
            .map_or(HitTarget::Canvas, HitTarget::ShapeBody)
    }

    // =========================================================================
    // Pointer events
    // =========================================================================

    /// Start a gesture. Returns `true` if one started.
    pub fn pointer_down(&mut self, store: &ShapeStore, point: Point) -> bool {
        if self.is_active() {
            let stale = self.gesture.shape().is_some_and(|id| !store.contains(id));
            if !stale {
                tracing::debug!("pointer-down ignored, gesture already active");
                return false;
            }
            tracing::debug!("stale gesture dropped");
            self.gesture = Gesture::Idle;
        }

        let target = self.hit_test(store, point);
        self.gesture = match (self.mode, target) {
            (ToolMode::Pan, _) => Gesture::Panning {
                last: self.canvas_to_screen(point),
            },
            (ToolMode::Select, HitTarget::ResizeHandle(shape, direction)) => {
                let Some(origin) = store.get_shape(shape).map(|s| s.rect()) else {
                    return false;
                };
                self.selected = Some(shape);
                Gesture::Resizing {
                    shape,
                    direction,
                    origin,
                    start: point,
                }
            }
            (ToolMode::Select, HitTarget::ShapeBody(shape)) => {
                self.selected = Some(shape);
                Gesture::Dragging { shape, last: point }
            }
            (ToolMode::Select, HitTarget::Canvas) => {
                self.selected = None;
                return false;
            }
            (ToolMode::Connect, HitTarget::Anchor(source, anchor)) => {
                self.selected = Some(source);
                Gesture::Connecting {
                    source,
                    anchor,
                    cursor: point,
                }
            }
            _ => return false,
        };
        tracing::trace!(gesture = ?self.gesture, "gesture started");
        true
    }

    /// Advance the active gesture. Returns `true` if anything changed.
    pub fn pointer_move(&mut self, store: &mut ShapeStore, point: Point) -> bool {
        if self.gesture.shape().is_some_and(|id| !store.contains(id)) {
            return false;
        }
        match &mut self.gesture {
            Gesture::Idle => false,
            Gesture::Dragging { shape, last } => {
                let (dx, dy) = point.offset_from(*last);
                *last = point;
                store.translate_subtree(*shape, dx, dy)
            }
            Gesture::Resizing {
                shape,
                direction,
                origin,
                start,
            } => {
                let (dx, dy) = point.offset_from(*start);
                let min = self.resolver.layout().config().min_shape_size;
                let rect = resize_rect(origin, *direction, dx, dy, min);
                self.resolver.layout().apply_resize(store, *shape, rect)
            }
            Gesture::Panning { last } => {
                let screen = Point::new(point.x + self.pan_offset.x, point.y + self.pan_offset.y);
                let (dx, dy) = screen.offset_from(*last);
                *last = screen;
                self.pan_offset = Point::new(self.pan_offset.x + dx, self.pan_offset.y + dy);
                true
            }
            Gesture::Connecting { cursor, .. } => {
                *cursor = point;
                true
            }
        }
    }

    /// Finish the active gesture at `point`
    pub fn pointer_up(&mut self, store: &mut ShapeStore, point: Point) -> GestureOutcome {
        if self.gesture.shape().is_some_and(|id| !store.contains(id)) {
            tracing::debug!(gesture = ?self.gesture, "gesture shape vanished, abandoning");
            self.gesture = Gesture::Idle;
            return GestureOutcome::Abandoned;
        }
        if self.gesture != Gesture::Idle {
            self.pointer_move(store, point);
        }

        let outcome = match std::mem::take(&mut self.gesture) {
            Gesture::Idle => GestureOutcome::None,
            Gesture::Dragging { shape, .. } => {
                let drop = self.resolver.handle_drop(store, shape);
                GestureOutcome::Moved { shape, drop }
            }
            Gesture::Resizing { shape, .. } => GestureOutcome::Resized { shape },
            Gesture::Panning { .. } => GestureOutcome::Panned,
            Gesture::Connecting { source, anchor, .. } => {
                match self.anchor_at(store, point, Some(source)) {
                    Some((target, target_anchor)) => store
                        .add_connection(
                            ConnectionDraft::new(source, target)
                                .with_anchors(anchor, target_anchor),
                        )
                        .map_or(GestureOutcome::Abandoned, GestureOutcome::Connected),
                    None => GestureOutcome::Abandoned,
                }
            }
        };
        tracing::debug!(?outcome, "gesture finished");
        outcome
    }

    /// End the active gesture without completing it.
    ///
    /// A drag stays where it is without regrouping (its parent is refitted),
    /// a resize keeps its last size, and a connection is dropped. Returns
    /// `true` if a gesture was active.
    pub fn cancel(&mut self, store: &mut ShapeStore) -> bool {
        let gesture = std::mem::take(&mut self.gesture);
        if let Gesture::Dragging { shape, .. } = gesture {
            if let Some(parent) = store.parent_of(shape) {
                self.resolver.layout().update_parent_size(store, parent);
            }
        }
        let was_active = gesture != Gesture::Idle;
        if was_active {
            tracing::debug!(?gesture, "gesture cancelled");
        }
        was_active
    }
}

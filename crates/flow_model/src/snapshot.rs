//! Persisted flowchart state
//!
//! A [`Snapshot`] is the plain, JSON-compatible form of a [`ShapeStore`]:
//! `(id, shape)` pairs in insertion order plus the connection list. Nothing
//! in it depends on runtime references, so restoring rebuilds parent/child
//! consistency and collapsed visibility from the data alone.

use crate::{Connection, ConnectionId, FlowModelError, Result, Shape, ShapeId, ShapeStore};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub shapes: Vec<(ShapeId, Shape)>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Snapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Strict structural check, reporting the first problem found.
    ///
    /// [`ShapeStore::from_snapshot`] repairs the same problems instead of
    /// failing; use this when a caller wants to reject bad input.
    pub fn validate(&self) -> Result<()> {
        let mut by_id: HashMap<ShapeId, &Shape> = HashMap::new();
        for (key, shape) in &self.shapes {
            if *key != shape.id {
                return Err(FlowModelError::InvalidSnapshot(format!(
                    "entry {key} holds shape {}",
                    shape.id
                )));
            }
            if by_id.insert(*key, shape).is_some() {
                return Err(FlowModelError::DuplicateShape(*key));
            }
        }

        for shape in by_id.values() {
            for child in &shape.children {
                let parent_of_child = by_id.get(child).and_then(|c| c.parent);
                if parent_of_child != Some(shape.id) {
                    return Err(FlowModelError::InvalidSnapshot(format!(
                        "{} lists {child} as a child but the child disagrees",
                        shape.id
                    )));
                }
            }
            if let Some(parent) = shape.parent {
                let listed = by_id
                    .get(&parent)
                    .is_some_and(|p| p.children.contains(&shape.id));
                if !listed {
                    return Err(FlowModelError::InvalidSnapshot(format!(
                        "{} names {parent} as parent but is not among its children",
                        shape.id
                    )));
                }
            }
        }

        for (id, _) in &self.shapes {
            let mut seen = HashSet::new();
            let mut current = by_id.get(id).and_then(|s| s.parent);
            while let Some(parent) = current {
                if parent == *id {
                    return Err(FlowModelError::InvalidSnapshot(format!(
                        "{id} is its own ancestor"
                    )));
                }
                if !seen.insert(parent) {
                    break;
                }
                current = by_id.get(&parent).and_then(|s| s.parent);
            }
        }

        for connection in &self.connections {
            for endpoint in [connection.from, connection.to] {
                if !by_id.contains_key(&endpoint) {
                    return Err(FlowModelError::DanglingConnection {
                        connection: connection.id,
                        shape: endpoint,
                    });
                }
            }
        }
        Ok(())
    }
}

impl ShapeStore {
    /// Capture the store as plain data
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            shapes: self.shapes().map(|s| (s.id, s.clone())).collect(),
            connections: self.get_connections().to_vec(),
        }
    }

    /// Build a store from persisted data with default shape settings
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut store = Self::new();
        store.replace_with_snapshot(snapshot);
        store
    }

    /// Replace all content with `snapshot`, keeping this store's defaults.
    ///
    /// Inconsistent data is repaired rather than rejected: the entry key is
    /// the shape's id, a child's own `parent` field decides disputed links,
    /// cyclic parent links are cut and connections to missing shapes are
    /// dropped. Every repair is logged.
    pub fn replace_with_snapshot(&mut self, snapshot: Snapshot) {
        let mut fresh = ShapeStore::with_defaults(self.defaults().clone());

        let mut records: Vec<Shape> = Vec::with_capacity(snapshot.shapes.len());
        let mut known = HashSet::new();
        for (key, mut shape) in snapshot.shapes {
            if shape.id != key {
                tracing::warn!(entry = %key, shape = %shape.id, "snapshot entry key and shape id differ; using the key");
                shape.id = key;
            }
            if !known.insert(key) {
                tracing::warn!(shape = %key, "duplicate shape in snapshot skipped");
                continue;
            }
            records.push(shape);
        }

        let parent_field: HashMap<ShapeId, Option<ShapeId>> =
            records.iter().map(|s| (s.id, s.parent)).collect();

        // Children lists: only known shapes that agree they belong here
        for shape in &mut records {
            let id = shape.id;
            let mut kept = Vec::with_capacity(shape.children.len());
            for child in shape.children.drain(..) {
                if kept.contains(&child) {
                    continue;
                }
                if parent_field.get(&child) == Some(&Some(id)) {
                    kept.push(child);
                } else {
                    tracing::warn!(parent = %id, child = %child, "dropping inconsistent child link");
                }
            }
            shape.children = kept;
        }

        // Parent fields: the parent must exist and list the child
        let mut missing_links: Vec<(ShapeId, ShapeId)> = Vec::new();
        for shape in &mut records {
            if let Some(parent) = shape.parent {
                if parent == shape.id || !known.contains(&parent) {
                    tracing::warn!(shape = %shape.id, parent = %parent, "dropping link to missing parent");
                    shape.parent = None;
                } else {
                    missing_links.push((parent, shape.id));
                }
            }
        }
        for (parent, child) in missing_links {
            if let Some(p) = records.iter_mut().find(|s| s.id == parent) {
                if !p.children.contains(&child) {
                    tracing::warn!(parent = %parent, child = %child, "restoring missing child link");
                    p.children.push(child);
                }
            }
        }

        for shape in records {
            fresh.restore_raw(shape);
        }
        fresh.break_parent_cycles();

        let mut seen_connections: HashSet<ConnectionId> = HashSet::new();
        for connection in snapshot.connections {
            if !seen_connections.insert(connection.id) {
                tracing::warn!(connection = %connection.id, "duplicate connection skipped");
                continue;
            }
            let id = connection.id;
            if !fresh.insert_connection(connection) {
                tracing::warn!(connection = %id, "dropping connection to missing shape");
            }
        }

        fresh.refresh_all_visibility();
        *self = fresh;
    }
}

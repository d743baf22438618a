//! # Quadtree
//!
//! Region quadtree for range queries ("what is on screen", "who is near
//! this point"). Nodes live in one arena and refer to their children by
//! index; the tree is rebuilt from scratch rather than updated in place.
//!
//! ## Exactness
//!
//! A query returns exactly the entries whose rectangle touches the query
//! rectangle (inclusive edges), the same answer as a linear scan:
//!
//! - a leaf that splits hands each entry to *every* quadrant it touches;
//! - quadrant edges are computed once from the parent's min/mid/max, so
//!   sibling regions share their border exactly;
//! - entries not fully inside the root bounds are kept in a flat overflow
//!   list that every query scans.

use std::collections::HashSet;

use ashfall_core::EntityId;
use ashfall_shared::constants::{DEFAULT_QUADTREE_CAPACITY, DEFAULT_QUADTREE_MAX_DEPTH};
use ashfall_shared::math::Rect;

/// Closed region stored by its edges.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Region {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Region {
    fn from_rect(rect: &Rect) -> Self {
        Self {
            min_x: rect.min_x(),
            min_y: rect.min_y(),
            max_x: rect.max_x(),
            max_y: rect.max_y(),
        }
    }

    fn touches(&self, rect: &Rect) -> bool {
        self.min_x <= rect.max_x()
            && self.max_x >= rect.min_x()
            && self.min_y <= rect.max_y()
            && self.max_y >= rect.min_y()
    }

    fn contains(&self, rect: &Rect) -> bool {
        rect.min_x() >= self.min_x
            && rect.max_x() <= self.max_x
            && rect.min_y() >= self.min_y
            && rect.max_y() <= self.max_y
    }

    /// NW, NE, SW, SE.
    fn split(&self) -> [Region; 4] {
        let mid_x = self.min_x + (self.max_x - self.min_x) * 0.5;
        let mid_y = self.min_y + (self.max_y - self.min_y) * 0.5;
        [
            Region { min_x: self.min_x, min_y: self.min_y, max_x: mid_x, max_y: mid_y },
            Region { min_x: mid_x, min_y: self.min_y, max_x: self.max_x, max_y: mid_y },
            Region { min_x: self.min_x, min_y: mid_y, max_x: mid_x, max_y: self.max_y },
            Region { min_x: mid_x, min_y: mid_y, max_x: self.max_x, max_y: self.max_y },
        ]
    }
}

#[derive(Clone, Debug)]
struct Node {
    region: Region,
    depth: u32,
    /// Indices into `Quadtree::entries`. Empty once the node has split.
    entries: Vec<usize>,
    children: Option<[usize; 4]>,
}

impl Node {
    fn leaf(region: Region, depth: u32) -> Self {
        Self {
            region,
            depth,
            entries: Vec::new(),
            children: None,
        }
    }
}

/// Quadtree over entity rectangles.
#[derive(Clone, Debug)]
pub struct Quadtree {
    bounds: Rect,
    capacity: usize,
    max_depth: u32,
    nodes: Vec<Node>,
    entries: Vec<(EntityId, Rect)>,
    /// Entries not fully inside `bounds`.
    overflow: Vec<usize>,
}

impl Quadtree {
    /// Empty tree over `bounds`; a leaf splits once it holds more than
    /// `capacity` entries. A capacity of 0 is treated as 1.
    #[must_use]
    pub fn new(bounds: Rect, capacity: usize) -> Self {
        Self {
            bounds,
            capacity: capacity.max(1),
            max_depth: DEFAULT_QUADTREE_MAX_DEPTH,
            nodes: vec![Node::leaf(Region::from_rect(&bounds), 0)],
            entries: Vec::new(),
            overflow: Vec::new(),
        }
    }

    /// Caps how deep leaves may split. Entries piled on one spot stop
    /// splitting at this depth instead of recursing forever.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Root bounds.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Split threshold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Adds an entry. Zero-extent rectangles (points) are fine.
    pub fn insert(&mut self, id: EntityId, rect: Rect) {
        let entry = self.entries.len();
        self.entries.push((id, rect));

        if !self.nodes[0].region.contains(&rect) {
            self.overflow.push(entry);
            return;
        }

        let mut stack = vec![0];
        while let Some(node) = stack.pop() {
            if let Some(children) = self.nodes[node].children {
                stack.extend(
                    children
                        .into_iter()
                        .filter(|&child| self.nodes[child].region.touches(&rect)),
                );
                continue;
            }

            self.nodes[node].entries.push(entry);
            self.split_if_full(node);
        }
    }

    fn split_if_full(&mut self, node: usize) {
        let mut pending = vec![node];
        while let Some(node) = pending.pop() {
            let Node { region, depth, .. } = self.nodes[node];
            if self.nodes[node].entries.len() <= self.capacity || depth >= self.max_depth {
                continue;
            }

            let first = self.nodes.len();
            for quadrant in region.split() {
                self.nodes.push(Node::leaf(quadrant, depth + 1));
            }
            let children = [first, first + 1, first + 2, first + 3];

            let moved = std::mem::take(&mut self.nodes[node].entries);
            tracing::trace!(node, depth, entries = moved.len(), "quadtree leaf split");
            for entry in moved {
                let rect = self.entries[entry].1;
                for child in children {
                    if self.nodes[child].region.touches(&rect) {
                        self.nodes[child].entries.push(entry);
                    }
                }
            }
            self.nodes[node].children = Some(children);
            pending.extend(children);
        }
    }

    /// Ids of every entry whose rectangle touches `bounds` (edges inclusive).
    ///
    /// Each inserted entry is reported at most once. Order is unspecified.
    #[must_use]
    pub fn query(&self, bounds: &Rect) -> Vec<EntityId> {
        let mut result: Vec<EntityId> = self
            .overflow
            .iter()
            .map(|&entry| self.entries[entry])
            .filter(|(_, rect)| rect.touches(bounds))
            .map(|(id, _)| id)
            .collect();

        if !self.nodes[0].region.touches(bounds) {
            return result;
        }

        let mut seen = HashSet::new();
        let mut stack = vec![0];
        while let Some(node) = stack.pop() {
            let node = &self.nodes[node];
            if let Some(children) = node.children {
                stack.extend(
                    children
                        .into_iter()
                        .filter(|&child| self.nodes[child].region.touches(bounds)),
                );
                continue;
            }

            for &entry in &node.entries {
                let (id, rect) = self.entries[entry];
                if rect.touches(bounds) && seen.insert(entry) {
                    result.push(id);
                }
            }
        }
        result
    }

    /// Removes every entry and collapses back to a single leaf.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.nodes.push(Node::leaf(Region::from_rect(&self.bounds), 0));
        self.entries.clear();
        self.overflow.clear();
    }

    /// Number of inserted entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of nodes, internal and leaf.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest node (root = 0).
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.nodes.iter().map(|node| node.depth).max().unwrap_or(0)
    }

    /// Entries stored outside the root bounds.
    #[must_use]
    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }
}

impl Default for Quadtree {
    fn default() -> Self {
        Self::new(Rect::default(), DEFAULT_QUADTREE_CAPACITY)
    }
}

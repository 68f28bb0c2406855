//! Retained-mode canvas for the playfield
//!
//! Every drawable item (ball, paddle, bricks, HUD text) lives here as a shape
//! with axis-aligned bounds. Entities keep only a `ShapeHandle` and read their
//! geometry back from the canvas, so the canvas is the single source of truth
//! for positions and for overlap queries.

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 24-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u32);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0 & 0xFF_FFFF)
    }
}

/// Axis-aligned bounding box (min = top-left, max = bottom-right)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Box of the given size centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    /// Inclusive intersection test (touching edges count as overlap)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Canvas item identifier (monotonic, never reused)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u32);

/// What kind of item a shape is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeKind {
    Oval,
    Rectangle,
    Text { text: String, size: u32 },
}

/// A drawn canvas item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shape {
    pub kind: ShapeKind,
    pub bounds: Aabb,
    pub fill: Rgb,
    pub outline: Option<Rgb>,
    pub outline_width: f32,
    pub tags: Vec<String>,
}

impl Shape {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// The playfield canvas
#[derive(Debug, Clone)]
pub struct Canvas {
    width: f32,
    height: f32,
    background: Rgb,
    /// Items in creation (stacking) order
    items: BTreeMap<ShapeId, Shape>,
    next_id: u32,
}

impl Canvas {
    pub fn new(width: f32, height: f32, background: Rgb) -> Self {
        Self {
            width,
            height,
            background,
            items: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    fn insert(&mut self, shape: Shape) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.items.insert(id, shape);
        id
    }

    pub fn create_oval(&mut self, bounds: Aabb, fill: Rgb, outline: Rgb, outline_width: f32) -> ShapeId {
        self.insert(Shape {
            kind: ShapeKind::Oval,
            bounds,
            fill,
            outline: Some(outline),
            outline_width,
            tags: Vec::new(),
        })
    }

    pub fn create_rectangle(
        &mut self,
        bounds: Aabb,
        fill: Rgb,
        outline: Rgb,
        outline_width: f32,
        tags: &[&str],
    ) -> ShapeId {
        self.insert(Shape {
            kind: ShapeKind::Rectangle,
            bounds,
            fill,
            outline: Some(outline),
            outline_width,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
    }

    /// Text anchored at its center; bounds collapse to the anchor point
    pub fn create_text(&mut self, pos: Vec2, text: &str, size: u32, color: Rgb) -> ShapeId {
        self.insert(Shape {
            kind: ShapeKind::Text {
                text: text.to_string(),
                size,
            },
            bounds: Aabb::new(pos, pos),
            fill: color,
            outline: None,
            outline_width: 0.0,
            tags: Vec::new(),
        })
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ShapeId) -> bool {
        self.items.contains_key(&id)
    }

    /// Current bounds of an item
    pub fn coords(&self, id: ShapeId) -> Option<Aabb> {
        self.items.get(&id).map(|s| s.bounds)
    }

    /// Move an item by a relative offset (no-op for unknown ids)
    pub fn move_by(&mut self, id: ShapeId, offset: Vec2) {
        if let Some(shape) = self.items.get_mut(&id) {
            shape.bounds = shape.bounds.translated(offset);
        }
    }

    /// Remove an item; returns whether it existed
    pub fn delete(&mut self, id: ShapeId) -> bool {
        self.items.remove(&id).is_some()
    }

    pub fn set_fill(&mut self, id: ShapeId, fill: Rgb) {
        if let Some(shape) = self.items.get_mut(&id) {
            shape.fill = fill;
        }
    }

    pub fn set_text(&mut self, id: ShapeId, text: &str) {
        if let Some(Shape {
            kind: ShapeKind::Text { text: current, .. },
            ..
        }) = self.items.get_mut(&id)
        {
            *current = text.to_string();
        }
    }

    /// Text of a text item
    pub fn text(&self, id: ShapeId) -> Option<&str> {
        match self.items.get(&id) {
            Some(Shape {
                kind: ShapeKind::Text { text, .. },
                ..
            }) => Some(text.as_str()),
            _ => None,
        }
    }

    /// All items whose bounds intersect `area`, in stacking order
    pub fn find_overlapping(&self, area: &Aabb) -> Vec<ShapeId> {
        self.items
            .iter()
            .filter(|(_, s)| s.bounds.overlaps(area))
            .map(|(id, _)| *id)
            .collect()
    }

    /// All items carrying `tag`, in stacking order
    pub fn find_with_tag(&self, tag: &str) -> Vec<ShapeId> {
        self.items
            .iter()
            .filter(|(_, s)| s.has_tag(tag))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Iterate items bottom to top
    pub fn iter(&self) -> impl Iterator<Item = (ShapeId, &Shape)> {
        self.items.iter().map(|(id, s)| (*id, s))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Thin handle over a canvas item owned by a game entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeHandle {
    id: ShapeId,
}

impl ShapeHandle {
    pub fn new(id: ShapeId) -> Self {
        Self { id }
    }

    #[inline]
    pub fn id(&self) -> ShapeId {
        self.id
    }

    /// Bounds of the item, `None` once deleted
    pub fn position(&self, canvas: &Canvas) -> Option<Aabb> {
        canvas.coords(self.id)
    }

    pub fn move_by(&self, canvas: &mut Canvas, offset: Vec2) {
        canvas.move_by(self.id, offset);
    }

    pub fn delete(&self, canvas: &mut Canvas) {
        canvas.delete(self.id);
    }
}

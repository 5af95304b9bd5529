use std::collections::BTreeMap;

use thiserror::Error;

use crate::appearance::Colour;

/// The visible coordinate window of the surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// When set, the window follows the inverted-Y drawing convention.
    pub flip_y: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Colour,
    pub stroke: Option<Colour>,
}

impl Style {
    pub fn filled(fill: impl Into<Colour>) -> Self {
        Self {
            fill: fill.into(),
            stroke: None,
        }
    }

    pub fn outlined(fill: impl Into<Colour>, stroke: impl Into<Colour>) -> Self {
        Self {
            fill: fill.into(),
            stroke: Some(stroke.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("surface failed to create {primitive} primitive: {reason}")]
    PrimitiveCreation {
        primitive: &'static str,
        reason: String,
    },
}

/// The drawing engine as the viewer consumes it. Creation of primitives is
/// fallible and aborts the current redraw pass; `remove_group` is
/// best-effort and implementations must tolerate handles the surface no
/// longer knows about.
pub trait Surface {
    type Shape;
    type Group;

    /// Removes every primitive from the surface, grouped or not.
    fn clear_all(&mut self);

    fn set_viewport(&mut self, viewport: Viewport);

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: Style,
    ) -> Result<Self::Shape, SurfaceError>;

    fn circle(&mut self, cx: f64, cy: f64, r: f64, style: Style)
        -> Result<Self::Shape, SurfaceError>;

    fn text(&mut self, x: f64, y: f64, content: &str) -> Result<Self::Shape, SurfaceError>;

    /// Bundles primitives into one unit for later removal.
    fn group(&mut self, shapes: Vec<Self::Shape>) -> Self::Group;

    /// Destroys every primitive the group contains.
    fn remove_group(&mut self, group: Self::Group);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShapeId(u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupId(u32);

#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
    },
    Text {
        x: f64,
        y: f64,
        content: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedShape {
    pub kind: ShapeKind,
    pub style: Option<Style>,
}

/// In-memory `Surface` that retains every created primitive. Serves as the
/// reference implementation for hosts without a real drawing engine and as
/// the assertion target for the viewer's tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    next_shape_id: u32,
    next_group_id: u32,
    shapes: BTreeMap<ShapeId, RecordedShape>,
    groups: BTreeMap<GroupId, Vec<ShapeId>>,
    viewport: Option<Viewport>,
    clear_count: u32,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn clear_count(&self) -> u32 {
        self.clear_count
    }

    /// Shapes in creation order.
    pub fn shapes(&self) -> impl Iterator<Item = &RecordedShape> {
        self.shapes.values()
    }

    pub fn rects(&self) -> Vec<&RecordedShape> {
        self.shapes()
            .filter(|shape| matches!(shape.kind, ShapeKind::Rect { .. }))
            .collect()
    }

    pub fn circles(&self) -> Vec<&RecordedShape> {
        self.shapes()
            .filter(|shape| matches!(shape.kind, ShapeKind::Circle { .. }))
            .collect()
    }

    pub fn texts(&self) -> Vec<&RecordedShape> {
        self.shapes()
            .filter(|shape| matches!(shape.kind, ShapeKind::Text { .. }))
            .collect()
    }

    pub fn group_shapes(&self, group: GroupId) -> Option<Vec<&RecordedShape>> {
        let members = self.groups.get(&group)?;
        Some(
            members
                .iter()
                .filter_map(|shape_id| self.shapes.get(shape_id))
                .collect(),
        )
    }

    fn push_shape(&mut self, kind: ShapeKind, style: Option<Style>) -> ShapeId {
        let id = ShapeId(self.next_shape_id);
        self.next_shape_id += 1;
        self.shapes.insert(id, RecordedShape { kind, style });
        id
    }
}

impl Surface for RecordingSurface {
    type Shape = ShapeId;
    type Group = GroupId;

    fn clear_all(&mut self) {
        self.shapes.clear();
        self.groups.clear();
        self.clear_count += 1;
    }

    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn rect(
        &mut self,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        style: Style,
    ) -> Result<Self::Shape, SurfaceError> {
        Ok(self.push_shape(
            ShapeKind::Rect {
                x,
                y,
                width,
                height,
            },
            Some(style),
        ))
    }

    fn circle(
        &mut self,
        cx: f64,
        cy: f64,
        r: f64,
        style: Style,
    ) -> Result<Self::Shape, SurfaceError> {
        Ok(self.push_shape(ShapeKind::Circle { cx, cy, r }, Some(style)))
    }

    fn text(&mut self, x: f64, y: f64, content: &str) -> Result<Self::Shape, SurfaceError> {
        Ok(self.push_shape(
            ShapeKind::Text {
                x,
                y,
                content: content.to_string(),
            },
            None,
        ))
    }

    fn group(&mut self, shapes: Vec<Self::Shape>) -> Self::Group {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        self.groups.insert(id, shapes);
        id
    }

    fn remove_group(&mut self, group: Self::Group) {
        if let Some(members) = self.groups.remove(&group) {
            for shape_id in members {
                self.shapes.remove(&shape_id);
            }
        }
    }
}

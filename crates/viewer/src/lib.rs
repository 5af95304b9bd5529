pub mod appearance;
pub mod surface;
pub mod view;
pub mod world;

pub use appearance::{Appearance, Colour, DEFAULT_CELL_SIZE};
pub use surface::{
    GroupId, RecordedShape, RecordingSurface, ShapeId, ShapeKind, Style, Surface, SurfaceError,
    Viewport,
};
pub use view::{invert_y, CellTransform, ViewError, WorldViewer};
pub use world::{Location, Pickup, PickupKind, Player, SnapshotError, WorldSnapshot};

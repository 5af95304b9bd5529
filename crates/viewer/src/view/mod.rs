mod transform;
mod viewer;

pub use transform::{invert_y, CellTransform};
pub use viewer::{ViewError, WorldViewer};

/// Maps a simulation Y coordinate into the surface's convention. The
/// simulation's Y axis grows upward, the surface's downward; X is never
/// inverted.
pub fn invert_y(y: f64) -> f64 {
    -y
}

/// Pure logical-to-screen transform for a fixed cell scale. Applied
/// identically to terrain cells, players, and pickups so all layers align.
/// No rounding is performed; fractional logical coordinates yield
/// fractional pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellTransform {
    cell_size: f64,
}

impl CellTransform {
    pub fn new(cell_size: f64) -> Self {
        Self { cell_size }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    /// Screen position of a cell's top-left corner.
    pub fn cell_origin(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.cell_size, invert_y(y) * self.cell_size)
    }

    /// Screen position of a cell's centre; entity bodies are anchored here.
    pub fn cell_centre(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x + 0.5) * self.cell_size,
            (invert_y(y) + 0.5) * self.cell_size,
        )
    }
}

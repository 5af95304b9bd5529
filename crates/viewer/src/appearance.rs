use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CELL_SIZE: f64 = 50.0;

/// A display colour as the surface understands it (hex notation).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Colour(String);

impl Colour {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Colour {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Colour {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Visual constants for a viewer instance. Immutable once handed over;
/// rebinding means constructing a new viewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    /// Screen-pixel edge length of one grid cell. Must be positive.
    pub cell_size: f64,
    /// Fill colour per terrain code.
    pub world_colours: BTreeMap<u8, Colour>,
    /// Fill used for terrain codes absent from `world_colours`. The cell is
    /// still drawn with its outline and label.
    pub missing_colour: Colour,
}

impl Default for Appearance {
    fn default() -> Self {
        let mut world_colours = BTreeMap::new();
        world_colours.insert(0, Colour::from("#efe"));
        world_colours.insert(1, Colour::from("#777"));
        world_colours.insert(2, Colour::from("#fbb"));
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            world_colours,
            missing_colour: Colour::from("#f0f"),
        }
    }
}

impl Appearance {
    pub fn with_cell_size(cell_size: f64) -> Self {
        Self {
            cell_size,
            ..Self::default()
        }
    }

    pub fn terrain_colour(&self, code: u8) -> &Colour {
        self.world_colours.get(&code).unwrap_or(&self.missing_colour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_palette_covers_original_terrain_codes() {
        let appearance = Appearance::default();
        assert_eq!(appearance.cell_size, 50.0);
        assert_eq!(appearance.terrain_colour(0).as_str(), "#efe");
        assert_eq!(appearance.terrain_colour(1).as_str(), "#777");
        assert_eq!(appearance.terrain_colour(2).as_str(), "#fbb");
    }

    #[test]
    fn unmapped_terrain_code_falls_back_to_missing_colour() {
        let appearance = Appearance::default();
        assert_eq!(appearance.terrain_colour(9), &appearance.missing_colour);
    }

    #[test]
    fn colour_serialises_transparently() {
        let colour = Colour::from("#efe");
        let json = serde_json::to_string(&colour).expect("encode colour");
        assert_eq!(json, "\"#efe\"");
    }
}

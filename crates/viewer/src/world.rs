use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A position in the simulation's own grid-unit coordinate system. May be
/// fractional (smoothly moving players) and may be negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub location: Location,
    /// Facing direction in radians.
    pub rotation: f64,
    pub score: i64,
    pub health: i64,
}

/// The closed set of pickup kinds the viewer knows how to draw, plus a
/// catch-all for kinds introduced by newer simulations. Unknown kinds are
/// tolerated and skipped at render time, never a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PickupKind {
    Health,
    Invulnerability,
    DamageBoost,
    Other(String),
}

impl PickupKind {
    pub fn name(&self) -> &str {
        match self {
            PickupKind::Health => "health",
            PickupKind::Invulnerability => "invulnerability",
            PickupKind::DamageBoost => "damage_boost",
            PickupKind::Other(raw) => raw,
        }
    }
}

impl From<String> for PickupKind {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "health" => PickupKind::Health,
            "invulnerability" => PickupKind::Invulnerability,
            "damage_boost" => PickupKind::DamageBoost,
            _ => PickupKind::Other(raw),
        }
    }
}

impl From<PickupKind> for String {
    fn from(kind: PickupKind) -> Self {
        kind.name().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pickup {
    pub location: Location,
    #[serde(rename = "type")]
    pub kind: PickupKind,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("invalid world snapshot: x bounds are inverted (minX {min_x} > maxX {max_x})")]
    InvertedXBounds { min_x: i32, max_x: i32 },
    #[error("invalid world snapshot: y bounds are inverted (minY {min_y} > maxY {max_y})")]
    InvertedYBounds { min_y: i32, max_y: i32 },
    #[error("invalid world snapshot: width {width} does not match bounds extent {expected}")]
    WidthMismatch { width: i32, expected: i32 },
    #[error("invalid world snapshot: height {height} does not match bounds extent {expected}")]
    HeightMismatch { height: i32, expected: i32 },
    #[error("invalid world snapshot: layout has no cell at ({x}, {y})")]
    LayoutHole { x: i32, y: i32 },
}

/// One complete tick of world state as delivered by the simulation. The
/// viewer only ever reads it.
///
/// `layout` is keyed column-first (`layout[x][y]`), matching the wire format
/// the simulation emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub layout: BTreeMap<i32, BTreeMap<i32, u8>>,
    #[serde(default)]
    pub players: BTreeMap<String, Player>,
    #[serde(default)]
    pub pickups: Vec<Pickup>,
}

impl WorldSnapshot {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    pub fn cell_code(&self, x: i32, y: i32) -> Option<u8> {
        self.layout.get(&x).and_then(|column| column.get(&y)).copied()
    }

    /// Structural check run before a layout redraw. A snapshot that fails
    /// here would otherwise produce partial or garbled output, so the whole
    /// pass is rejected instead.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.min_x > self.max_x {
            return Err(SnapshotError::InvertedXBounds {
                min_x: self.min_x,
                max_x: self.max_x,
            });
        }
        if self.min_y > self.max_y {
            return Err(SnapshotError::InvertedYBounds {
                min_y: self.min_y,
                max_y: self.max_y,
            });
        }
        let expected_width = self.max_x - self.min_x + 1;
        if self.width != expected_width {
            return Err(SnapshotError::WidthMismatch {
                width: self.width,
                expected: expected_width,
            });
        }
        let expected_height = self.max_y - self.min_y + 1;
        if self.height != expected_height {
            return Err(SnapshotError::HeightMismatch {
                height: self.height,
                expected: expected_height,
            });
        }
        for x in self.min_x..=self.max_x {
            for y in self.min_y..=self.max_y {
                if self.cell_code(x, y).is_none() {
                    return Err(SnapshotError::LayoutHole { x, y });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_snapshot(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> WorldSnapshot {
        let mut layout = BTreeMap::new();
        for x in min_x..=max_x {
            let column: BTreeMap<i32, u8> = (min_y..=max_y).map(|y| (y, 0)).collect();
            layout.insert(x, column);
        }
        WorldSnapshot {
            min_x,
            max_x,
            min_y,
            max_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
            layout,
            players: BTreeMap::new(),
            pickups: Vec::new(),
        }
    }

    #[test]
    fn snapshot_deserialises_from_simulation_wire_format() {
        let raw = r#"{
            "minX": -1, "maxX": 0, "minY": 0, "maxY": 0,
            "width": 2, "height": 1,
            "layout": {"-1": {"0": 1}, "0": {"0": 0}},
            "players": {
                "player-1": {
                    "location": {"x": 0.0, "y": 0.0},
                    "rotation": 1.5,
                    "score": 12,
                    "health": 4
                }
            },
            "pickups": [
                {"location": {"x": -1.0, "y": 0.0}, "type": "health"},
                {"location": {"x": 0.0, "y": 0.0}, "type": "banana"}
            ]
        }"#;
        let snapshot = WorldSnapshot::from_json(raw).expect("parse snapshot");
        assert_eq!(snapshot.cell_code(-1, 0), Some(1));
        assert_eq!(snapshot.cell_code(0, 0), Some(0));
        assert_eq!(snapshot.players["player-1"].score, 12);
        assert_eq!(snapshot.pickups[0].kind, PickupKind::Health);
        assert_eq!(
            snapshot.pickups[1].kind,
            PickupKind::Other("banana".to_string())
        );
        assert_eq!(snapshot.validate(), Ok(()));
    }

    #[test]
    fn pickup_kind_round_trips_through_its_wire_name() {
        for kind in [
            PickupKind::Health,
            PickupKind::Invulnerability,
            PickupKind::DamageBoost,
            PickupKind::Other("mystery".to_string()),
        ] {
            let name = String::from(kind.clone());
            assert_eq!(PickupKind::from(name), kind);
        }
    }

    #[test]
    fn validate_accepts_negative_bounds() {
        assert_eq!(filled_snapshot(-3, 2, -4, -1).validate(), Ok(()));
    }

    #[test]
    fn validate_rejects_inverted_bounds() {
        let mut snapshot = filled_snapshot(0, 1, 0, 0);
        snapshot.min_x = 5;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::InvertedXBounds { min_x: 5, max_x: 1 })
        );
    }

    #[test]
    fn validate_rejects_extent_mismatch() {
        let mut snapshot = filled_snapshot(0, 1, 0, 0);
        snapshot.width = 7;
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::WidthMismatch {
                width: 7,
                expected: 2
            })
        );
    }

    #[test]
    fn validate_rejects_layout_hole_inside_bounds() {
        let mut snapshot = filled_snapshot(0, 1, 0, 1);
        snapshot
            .layout
            .get_mut(&1)
            .expect("column 1")
            .remove(&1);
        assert_eq!(
            snapshot.validate(),
            Err(SnapshotError::LayoutHole { x: 1, y: 1 })
        );
    }

    #[test]
    fn validate_reports_snapshot_errors_readably() {
        let error = SnapshotError::LayoutHole { x: 2, y: -3 };
        assert_eq!(
            error.to_string(),
            "invalid world snapshot: layout has no cell at (2, -3)"
        );
    }
}

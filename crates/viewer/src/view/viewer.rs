use std::collections::HashSet;

use thiserror::Error;
use tracing::warn;

use crate::appearance::Appearance;
use crate::surface::{Style, Surface, SurfaceError, Viewport};
use crate::world::{Pickup, PickupKind, Player, SnapshotError, WorldSnapshot};

use super::transform::CellTransform;

const CELL_STROKE_COLOUR: &str = "#000";
const PLAYER_BODY_COLOUR: &str = "#547BF9";
const PLAYER_EYE_COLOUR: &str = "#962828";
const CURRENT_USER_MARKER_COLOUR: &str = "#FF0000";
const HEALTH_PICKUP_FILL: &str = "#FFFFFF";
const HEALTH_CROSS_COLOUR: &str = "#FF0000";
const INVULNERABILITY_FILL: &str = "#0066ff";
const DAMAGE_BOOST_FILL: &str = "#ff0000";

// Entity geometry, all relative so the whole scene scales with cell_size.
const BODY_RADIUS_CELL_FACTOR: f64 = 0.5 * 0.75;
const HEAD_RADIUS_BODY_FACTOR: f64 = 0.6;
const EYE_RADIUS_BODY_FACTOR: f64 = 0.2;
const EYE_ANGLE_OFFSET_RADIANS: f64 = 1.0;
const MARKER_SIZE_HEAD_FACTOR: f64 = 0.4;
const MARKER_BACKSET_HEAD_FACTOR: f64 = 0.5;
const LABEL_OFFSET_CELL_FACTOR: f64 = 0.4;
const PICKUP_RADIUS_CELL_FACTOR: f64 = 0.5 * 0.75;
const CROSS_ARM_LENGTH_CELL_FACTOR: f64 = 0.4;
const CROSS_ARM_THICKNESS_CELL_FACTOR: f64 = 0.12;

#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Renders world snapshots onto a surface.
///
/// The viewer keeps exactly one piece of state beyond what it is bound to:
/// the registry of shape groups it currently has on screen per category.
/// Every redraw first removes what the previous pass of the same category
/// drew, then draws fresh from the current snapshot, so the registry always
/// mirrors the surface and no stale shapes leak across ticks.
///
/// If primitive creation fails mid-pass the error propagates and the
/// registry for that category may be partially rebuilt; the next successful
/// redraw of the category restores consistency.
pub struct WorldViewer<S: Surface> {
    surface: S,
    world: WorldSnapshot,
    appearance: Appearance,
    drawn_players: Vec<S::Group>,
    drawn_pickups: Vec<S::Group>,
    warned_pickup_kinds: HashSet<String>,
}

impl<S: Surface> WorldViewer<S> {
    pub fn new(surface: S, world: WorldSnapshot, appearance: Appearance) -> Self {
        Self {
            surface,
            world,
            appearance,
            drawn_players: Vec::new(),
            drawn_pickups: Vec::new(),
            warned_pickup_kinds: HashSet::new(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    pub fn world(&self) -> &WorldSnapshot {
        &self.world
    }

    pub fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    /// Swaps in the latest snapshot. Does not touch the surface; follow up
    /// with `redraw_state` (and `redraw_layout` if the bounds changed).
    pub fn set_world(&mut self, world: WorldSnapshot) {
        self.world = world;
    }

    pub fn drawn_player_groups(&self) -> &[S::Group] {
        &self.drawn_players
    }

    pub fn drawn_pickup_groups(&self) -> &[S::Group] {
        &self.drawn_pickups
    }

    fn transform(&self) -> CellTransform {
        CellTransform::new(self.appearance.cell_size)
    }

    /// Draws the static terrain grid. Destructive to the entire surface,
    /// players and pickups included; callers that want live entities back
    /// must invoke `redraw_state` afterwards.
    pub fn redraw_layout(&mut self) -> Result<(), ViewError> {
        self.world.validate()?;

        self.surface.clear_all();
        // Everything the registries pointed at is gone with the clear.
        self.drawn_players.clear();
        self.drawn_pickups.clear();

        let cell_size = self.appearance.cell_size;
        self.surface.set_viewport(Viewport {
            x: self.world.min_x as f64 * cell_size,
            y: self.world.min_y as f64 * cell_size,
            width: self.world.width as f64 * cell_size,
            height: self.world.height as f64 * cell_size,
            flip_y: true,
        });

        let transform = self.transform();
        for x in self.world.min_x..=self.world.max_x {
            for y in self.world.min_y..=self.world.max_y {
                let code = self
                    .world
                    .cell_code(x, y)
                    .ok_or(SnapshotError::LayoutHole { x, y })?;
                let (origin_x, origin_y) = transform.cell_origin(x as f64, y as f64);
                self.surface.rect(
                    origin_x,
                    origin_y,
                    cell_size,
                    cell_size,
                    Style::outlined(
                        self.appearance.terrain_colour(code).clone(),
                        CELL_STROKE_COLOUR,
                    ),
                )?;
                let (centre_x, centre_y) = transform.cell_centre(x as f64, y as f64);
                self.surface
                    .text(centre_x, centre_y, &format!("{x}, {y}"))?;
            }
        }
        Ok(())
    }

    pub fn clear_drawn_players(&mut self) {
        for group in self.drawn_players.drain(..) {
            self.surface.remove_group(group);
        }
    }

    pub fn clear_drawn_pickups(&mut self) {
        for group in self.drawn_pickups.drain(..) {
            self.surface.remove_group(group);
        }
    }

    /// Replaces every on-screen player with a fresh group from the current
    /// snapshot. `current_user` selects which player, if any, receives the
    /// highlight marker.
    pub fn redraw_players(&mut self, current_user: Option<&str>) -> Result<(), ViewError> {
        self.clear_drawn_players();
        let transform = self.transform();
        for (key, player) in &self.world.players {
            let is_current_user = current_user == Some(key.as_str());
            let group =
                construct_player_element(&mut self.surface, transform, player, is_current_user)?;
            self.drawn_players.push(group);
        }
        Ok(())
    }

    /// Replaces every on-screen pickup, in snapshot order. Pickups of a kind
    /// this viewer does not know are skipped and reported once per kind.
    pub fn redraw_pickups(&mut self) -> Result<(), ViewError> {
        self.clear_drawn_pickups();
        let transform = self.transform();
        for pickup in &self.world.pickups {
            match construct_pickup_element(&mut self.surface, transform, pickup)? {
                Some(group) => self.drawn_pickups.push(group),
                None => {
                    let kind = pickup.kind.name();
                    if self.warned_pickup_kinds.insert(kind.to_string()) {
                        warn!(kind, "unknown_pickup_kind_skipped");
                    }
                }
            }
        }
        Ok(())
    }

    /// Full dynamic-entity redraw: pickups first so players layer on top
    /// where they overlap.
    pub fn redraw_state(&mut self, current_user: Option<&str>) -> Result<(), ViewError> {
        self.redraw_pickups()?;
        self.redraw_players(current_user)
    }
}

fn construct_player_element<S: Surface>(
    surface: &mut S,
    transform: CellTransform,
    player: &Player,
    is_current_user: bool,
) -> Result<S::Group, SurfaceError> {
    let (centre_x, centre_y) = transform.cell_centre(player.location.x, player.location.y);
    let cell_size = transform.cell_size();
    let body_radius = cell_size * BODY_RADIUS_CELL_FACTOR;
    let head_radius = body_radius * HEAD_RADIUS_BODY_FACTOR;
    let eye_radius = body_radius * EYE_RADIUS_BODY_FACTOR;
    let label_offset = cell_size * LABEL_OFFSET_CELL_FACTOR;

    let mut shapes = Vec::new();
    shapes.push(surface.circle(
        centre_x,
        centre_y,
        body_radius,
        Style::outlined(PLAYER_BODY_COLOUR, PLAYER_BODY_COLOUR),
    )?);

    for eye_angle in [
        player.rotation - EYE_ANGLE_OFFSET_RADIANS,
        player.rotation + EYE_ANGLE_OFFSET_RADIANS,
    ] {
        shapes.push(surface.circle(
            centre_x + head_radius * eye_angle.cos(),
            centre_y + head_radius * eye_angle.sin(),
            eye_radius,
            Style::outlined(PLAYER_EYE_COLOUR, PLAYER_EYE_COLOUR),
        )?);
    }

    if is_current_user {
        let marker_size = head_radius * MARKER_SIZE_HEAD_FACTOR;
        let backset = head_radius * MARKER_BACKSET_HEAD_FACTOR;
        shapes.push(surface.rect(
            centre_x - marker_size / 2.0 - backset * player.rotation.cos(),
            centre_y - marker_size / 2.0 - backset * player.rotation.sin(),
            marker_size,
            marker_size,
            Style::outlined(CURRENT_USER_MARKER_COLOUR, CURRENT_USER_MARKER_COLOUR),
        )?);
    }

    shapes.push(surface.text(
        centre_x,
        centre_y - label_offset,
        &format!("Score: {}", player.score),
    )?);
    shapes.push(surface.text(
        centre_x,
        centre_y + label_offset,
        &format!(
            "{}hp, ({}, {})",
            player.health, player.location.x, player.location.y
        ),
    )?);

    Ok(surface.group(shapes))
}

fn construct_pickup_element<S: Surface>(
    surface: &mut S,
    transform: CellTransform,
    pickup: &Pickup,
) -> Result<Option<S::Group>, SurfaceError> {
    let (x, y) = transform.cell_centre(pickup.location.x, pickup.location.y);
    let radius = transform.cell_size() * PICKUP_RADIUS_CELL_FACTOR;
    let group = match &pickup.kind {
        PickupKind::Health => construct_health_cross(surface, transform, x, y, radius)?,
        PickupKind::Invulnerability => {
            let circle = surface.circle(x, y, radius, Style::filled(INVULNERABILITY_FILL))?;
            surface.group(vec![circle])
        }
        PickupKind::DamageBoost => {
            let circle = surface.circle(x, y, radius, Style::filled(DAMAGE_BOOST_FILL))?;
            surface.group(vec![circle])
        }
        PickupKind::Other(_) => return Ok(None),
    };
    Ok(Some(group))
}

fn construct_health_cross<S: Surface>(
    surface: &mut S,
    transform: CellTransform,
    x: f64,
    y: f64,
    radius: f64,
) -> Result<S::Group, SurfaceError> {
    let cell_size = transform.cell_size();
    let arm_length = cell_size * CROSS_ARM_LENGTH_CELL_FACTOR;
    let arm_thickness = cell_size * CROSS_ARM_THICKNESS_CELL_FACTOR;
    let cross_style = Style::outlined(HEALTH_CROSS_COLOUR, HEALTH_CROSS_COLOUR);

    let circle = surface.circle(x, y, radius, Style::filled(HEALTH_PICKUP_FILL))?;
    let horizontal = surface.rect(
        x - arm_length / 2.0,
        y - arm_thickness / 2.0,
        arm_length,
        arm_thickness,
        cross_style.clone(),
    )?;
    let vertical = surface.rect(
        x - arm_thickness / 2.0,
        y - arm_length / 2.0,
        arm_thickness,
        arm_length,
        cross_style,
    )?;
    Ok(surface.group(vec![circle, horizontal, vertical]))
}

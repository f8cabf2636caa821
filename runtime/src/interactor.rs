//! Viewport-first entity lookup and menu-driven clicking (§4.7).

use std::thread::sleep;
use std::time::Duration;

use rand::Rng;

use core::constants::{INVENTORY_COLUMNS, INVENTORY_ORIGIN_PX, INVENTORY_SLOT_PITCH_PX};
use core::types::{EntityKind, GroundItemSnapshot, MenuSnapshot, NpcSnapshot, ObjectSnapshot, Polygon, Region, WorldCoord};

use crate::camera::CameraController;
use crate::input::{InputBackend, InputSynthesizer, MouseButton};
use crate::telemetry::TelemetryClient;

/// Common surface `find`/`click` need from either NPC or object snapshots.
pub trait Interactable {
    fn id(&self) -> i32;
    fn world_position(&self) -> WorldCoord;
    fn hull(&self) -> Option<&Polygon>;
    fn screen_pos(&self) -> Option<(i32, i32)>;
}

impl Interactable for NpcSnapshot {
    fn id(&self) -> i32 {
        self.id
    }
    fn world_position(&self) -> WorldCoord {
        NpcSnapshot::world_position(self)
    }
    fn hull(&self) -> Option<&Polygon> {
        self.hull.as_ref()
    }
    fn screen_pos(&self) -> Option<(i32, i32)> {
        Some((self.x?, self.y?))
    }
}

impl Interactable for ObjectSnapshot {
    fn id(&self) -> i32 {
        self.id
    }
    fn world_position(&self) -> WorldCoord {
        ObjectSnapshot::world_position(self)
    }
    fn hull(&self) -> Option<&Polygon> {
        self.hull.as_ref()
    }
    fn screen_pos(&self) -> Option<(i32, i32)> {
        Some((self.x?, self.y?))
    }
}

impl Interactable for GroundItemSnapshot {
    fn id(&self) -> i32 {
        self.id
    }
    fn world_position(&self) -> WorldCoord {
        GroundItemSnapshot::world_position(self)
    }
    fn hull(&self) -> Option<&Polygon> {
        None
    }
    fn screen_pos(&self) -> Option<(i32, i32)> {
        Some((self.x?, self.y?))
    }
}

/// A clickable inventory slot (1-based, per §3), used to drive eating,
/// dropping, and special-loot handling (burying, high-alching) through the
/// same menu-click procedure entity interactions use.
pub struct InventorySlotTarget {
    pub slot: u8,
}

impl InventorySlotTarget {
    pub fn new(slot: u8) -> Self {
        Self { slot }
    }

    fn screen_center(&self) -> (i32, i32) {
        let (ox, oy) = INVENTORY_ORIGIN_PX;
        let (pitch_x, pitch_y) = INVENTORY_SLOT_PITCH_PX;
        let zero_based = self.slot.saturating_sub(1) as i32;
        let col = zero_based % INVENTORY_COLUMNS as i32;
        let row = zero_based / INVENTORY_COLUMNS as i32;
        (ox + col * pitch_x, oy + row * pitch_y)
    }
}

impl Interactable for InventorySlotTarget {
    fn id(&self) -> i32 {
        self.slot as i32
    }
    fn world_position(&self) -> WorldCoord {
        WorldCoord::new(0, 0, 0)
    }
    fn hull(&self) -> Option<&Polygon> {
        None
    }
    fn screen_pos(&self) -> Option<(i32, i32)> {
        Some(self.screen_center())
    }
}

/// Picks the nearest same-id candidate to `player`, breaking ties randomly.
fn nearest_matching<'a, T: Interactable>(
    candidates: &'a [T],
    entity_id: i32,
    player: WorldCoord,
    rng: &mut impl Rng,
) -> Option<&'a T> {
    let matches: Vec<&T> = candidates.iter().filter(|c| c.id() == entity_id).collect();
    if matches.is_empty() {
        return None;
    }

    let min_dist = matches
        .iter()
        .map(|c| player.euclidean_distance(&c.world_position()))
        .fold(f64::INFINITY, f64::min);
    let tied: Vec<&T> = matches
        .into_iter()
        .filter(|c| (player.euclidean_distance(&c.world_position()) - min_dist).abs() < 1e-6)
        .collect();

    let idx = rng.gen_range(0..tied.len());
    Some(tied[idx])
}

pub struct EntityInteractor {
    game_area: Region,
}

impl EntityInteractor {
    pub fn new(game_area: Region) -> Self {
        Self { game_area }
    }

    pub fn find_npc<B: InputBackend>(
        &self,
        telemetry: &TelemetryClient,
        camera: &CameraController,
        input: &mut InputSynthesizer<B>,
        entity_id: i32,
        player: WorldCoord,
        rng: &mut impl Rng,
    ) -> Option<NpcSnapshot> {
        let viewport = telemetry.npcs_in_viewport().unwrap_or_default();
        if let Some(found) = nearest_matching(&viewport, entity_id, player, rng) {
            return Some(found.clone());
        }

        let nearest = telemetry.nearest_by_id(entity_id, EntityKind::Npc)?;
        camera.rotate_to_visible(telemetry, input, nearest.x, nearest.y, nearest.plane, rng);

        let viewport = telemetry.npcs_in_viewport().unwrap_or_default();
        nearest_matching(&viewport, entity_id, player, rng).cloned()
    }

    pub fn find_object<B: InputBackend>(
        &self,
        telemetry: &TelemetryClient,
        camera: &CameraController,
        input: &mut InputSynthesizer<B>,
        entity_id: i32,
        player: WorldCoord,
        rng: &mut impl Rng,
    ) -> Option<ObjectSnapshot> {
        let viewport = telemetry.objects_in_viewport().unwrap_or_default();
        if let Some(found) = nearest_matching(&viewport, entity_id, player, rng) {
            return Some(found.clone());
        }

        let nearest = telemetry.nearest_by_id(entity_id, EntityKind::Object)?;
        camera.rotate_to_visible(telemetry, input, nearest.x, nearest.y, nearest.plane, rng);

        let viewport = telemetry.objects_in_viewport().unwrap_or_default();
        nearest_matching(&viewport, entity_id, player, rng).cloned()
    }

    /// Clicks `entity` per the action-text match procedure. Returns `false`
    /// if no menu entry matches, closing the menu by moving the mouse away.
    pub fn click<T: Interactable, B: InputBackend>(
        &self,
        entity: &T,
        action_text: &str,
        telemetry: &TelemetryClient,
        input: &mut InputSynthesizer<B>,
        rng: &mut impl Rng,
    ) -> bool {
        let Some((px, py)) = self.sample_click_point(entity, rng) else {
            return false;
        };

        input.move_to((px, py), (px, py), Duration::from_millis(150), 0.25, rng);
        sleep(Duration::from_millis(rng.gen_range(80..=180)));

        let Some(menu) = telemetry.menu() else {
            return false;
        };
        if let Some(top) = menu.entries.first() {
            if top.option.to_lowercase().contains(&action_text.to_lowercase()) {
                input.click(MouseButton::Left, rng);
                return true;
            }
        }

        input.click(MouseButton::Right, rng);
        sleep(Duration::from_millis(rng.gen_range(80..=180)));

        let Some(menu) = telemetry.menu() else {
            return false;
        };
        let needle = action_text.to_lowercase();
        let match_idx = menu
            .entries
            .iter()
            .position(|e| e.option.to_lowercase().contains(&needle));

        match match_idx {
            Some(idx) => {
                if let Some((x, y, w, h)) = self.click_point_in_row(&menu, idx, rng) {
                    input.move_to((px, py), (x, y), Duration::from_millis(120), 0.2, rng);
                    let _ = (w, h);
                    input.click(MouseButton::Left, rng);
                    true
                } else {
                    self.dismiss(input, px, py, rng);
                    false
                }
            }
            None => {
                self.dismiss(input, px, py, rng);
                false
            }
        }
    }

    fn click_point_in_row(&self, menu: &MenuSnapshot, idx: usize, rng: &mut impl Rng) -> Option<(i32, i32, i32, i32)> {
        let (x, y, w, h) = menu.entry_rect(idx)?;
        let px = x + rng.gen_range(0..w.max(1));
        let py = y + rng.gen_range(0..h.max(1));
        Some((px, py, w, h))
    }

    fn sample_click_point<T: Interactable>(&self, entity: &T, rng: &mut impl Rng) -> Option<(i32, i32)> {
        if let Some(hull) = entity.hull() {
            if let Some((x, y)) = hull.sample_point(rng) {
                return Some(self.clamp(x.round() as i32, y.round() as i32));
            }
        }
        entity.screen_pos().map(|(x, y)| self.clamp(x, y))
    }

    fn clamp(&self, x: i32, y: i32) -> (i32, i32) {
        self.game_area.clamp_point(x, y)
    }

    fn dismiss<B: InputBackend>(&self, input: &mut InputSynthesizer<B>, from_x: i32, from_y: i32, rng: &mut impl Rng) {
        let (cx, _) = self.game_area.center();
        let away = (cx, self.game_area.min_y);
        input.move_to((from_x, from_y), away, Duration::from_millis(100), 0.1, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn npc(id: i32, x: i32, y: i32) -> NpcSnapshot {
        NpcSnapshot {
            id,
            name: "Goblin".into(),
            combat_level: 5,
            world_x: x,
            world_y: y,
            plane: 0,
            x: Some(x * 2),
            y: Some(y * 2),
            hull: None,
            interacting_with: None,
            is_dying: false,
            animation: -1,
            health_ratio: 10,
            health_scale: 10,
            overhead_text: None,
            overhead_icon: None,
        }
    }

    #[test]
    fn nearest_matching_picks_closest_by_id() {
        let mut rng = StdRng::seed_from_u64(1);
        let candidates = vec![npc(7, 10, 0), npc(7, 2, 0), npc(9, 0, 0)];
        let player = WorldCoord::new(0, 0, 0);
        let found = nearest_matching(&candidates, 7, player, &mut rng).unwrap();
        assert_eq!(found.world_x, 2);
    }

    #[test]
    fn nearest_matching_returns_none_without_id_match() {
        let mut rng = StdRng::seed_from_u64(2);
        let candidates = vec![npc(7, 10, 0)];
        let player = WorldCoord::new(0, 0, 0);
        assert!(nearest_matching(&candidates, 99, player, &mut rng).is_none());
    }
}

//! Telemetry snapshot types (§3, §6).
//!
//! These mirror the JSON bodies returned by the telemetry HTTP endpoint.
//! Extra fields in the real response are tolerated (`serde` simply ignores
//! them); only the fields the runtime consults are modeled.

use serde::{Deserialize, Serialize};

use crate::types::geometry::Polygon;
use crate::types::world::WorldCoord;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatEntry {
    pub stat: String,
    pub level: i32,
    #[serde(rename = "boostedLevel")]
    pub boosted_level: i32,
    pub xp: i64,
    #[serde(rename = "xpToNextLevel")]
    pub xp_to_next_level: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub name: String,
    #[serde(rename = "combatLevel")]
    pub combat_level: i32,
    pub health: i32,
    #[serde(rename = "maxHealth")]
    pub max_health: i32,
    pub prayer: i32,
    #[serde(rename = "maxPrayer")]
    pub max_prayer: i32,
    #[serde(rename = "runEnergy")]
    pub run_energy: i32,
    #[serde(rename = "specialAttack")]
    pub special_attack: i32,
    pub weight: i32,
    #[serde(rename = "isAnimating")]
    pub is_animating: bool,
    #[serde(rename = "animationId")]
    pub animation_id: i32,
    #[serde(rename = "interactingWith")]
    pub interacting_with: Option<String>,
}

impl PlayerSnapshot {
    /// Health expressed as a percentage in `[0, 100]`.
    pub fn health_percent(&self) -> f64 {
        if self.max_health <= 0 {
            return 0.0;
        }
        (self.health as f64 / self.max_health as f64) * 100.0
    }

    pub fn is_dead(&self) -> bool {
        self.health <= 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldPosition {
    pub x: i32,
    pub y: i32,
    pub plane: i8,
    #[serde(rename = "regionID", default)]
    pub region_id: i32,
    #[serde(rename = "regionX", default)]
    pub region_x: i32,
    #[serde(rename = "regionY", default)]
    pub region_y: i32,
}

impl From<&WorldPosition> for WorldCoord {
    fn from(pos: &WorldPosition) -> Self {
        WorldCoord::new(pos.x, pos.y, pos.plane)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordsSnapshot {
    pub world: WorldPosition,
    pub local: super::world::LocalCoord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatTarget {
    pub id: i32,
    pub name: String,
    #[serde(rename = "combatLevel")]
    pub combat_level: i32,
    pub health: i32,
    #[serde(rename = "maxHealth")]
    pub max_health: i32,
    #[serde(rename = "isDying")]
    pub is_dying: bool,
    pub position: WorldPosition,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatSnapshot {
    #[serde(rename = "inCombat")]
    pub in_combat: bool,
    #[serde(rename = "autoRetaliate")]
    pub auto_retaliate: bool,
    pub target: Option<CombatTarget>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSnapshot {
    #[serde(rename = "animationId")]
    pub animation_id: i32,
    #[serde(rename = "poseAnimation")]
    pub pose_animation: i32,
    #[serde(rename = "isAnimating")]
    pub is_animating: bool,
    #[serde(rename = "isMoving")]
    pub is_moving: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySlot {
    pub slot: u8,
    pub id: i32,
    pub quantity: i32,
}

impl InventorySlot {
    pub fn is_empty(&self) -> bool {
        self.id < 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentSlot {
    pub slot: u8,
    pub id: i32,
    pub quantity: i32,
}

/// Equipment slot positions, per §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EquipmentSlotKind {
    Head = 0,
    Cape = 1,
    Neck = 2,
    Weapon = 3,
    Body = 4,
    Shield = 5,
    Legs = 6,
    Hands = 7,
    Feet = 8,
    Ring = 9,
    Ammo = 10,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenPosition {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub id: i32,
    pub name: String,
    #[serde(rename = "combatLevel")]
    pub combat_level: i32,
    #[serde(rename = "worldX")]
    pub world_x: i32,
    #[serde(rename = "worldY")]
    pub world_y: i32,
    pub plane: i8,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub hull: Option<Polygon>,
    #[serde(rename = "interactingWith")]
    pub interacting_with: Option<String>,
    #[serde(rename = "isDying")]
    pub is_dying: bool,
    pub animation: i32,
    #[serde(rename = "healthRatio")]
    pub health_ratio: i32,
    #[serde(rename = "healthScale")]
    pub health_scale: i32,
    #[serde(rename = "overheadText")]
    pub overhead_text: Option<String>,
    #[serde(rename = "overheadIcon")]
    pub overhead_icon: Option<i32>,
}

impl NpcSnapshot {
    pub fn world_position(&self) -> WorldCoord {
        WorldCoord::new(self.world_x, self.world_y, self.plane)
    }

    pub fn is_in_viewport(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }

    /// Health ratio/scale converted to a percentage, per §3.
    pub fn health_percent(&self) -> f64 {
        if self.health_scale <= 0 {
            return 0.0;
        }
        (self.health_ratio as f64 / self.health_scale as f64) * 100.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub id: i32,
    pub name: String,
    #[serde(rename = "worldX")]
    pub world_x: i32,
    #[serde(rename = "worldY")]
    pub world_y: i32,
    pub plane: i8,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub hull: Option<Polygon>,
}

impl ObjectSnapshot {
    pub fn world_position(&self) -> WorldCoord {
        WorldCoord::new(self.world_x, self.world_y, self.plane)
    }

    pub fn is_in_viewport(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundItemSnapshot {
    pub id: i32,
    pub name: String,
    pub quantity: i32,
    #[serde(rename = "worldX")]
    pub world_x: i32,
    #[serde(rename = "worldY")]
    pub world_y: i32,
    pub plane: i8,
    pub x: Option<i32>,
    pub y: Option<i32>,
}

impl GroundItemSnapshot {
    pub fn world_position(&self) -> WorldCoord {
        WorldCoord::new(self.world_x, self.world_y, self.plane)
    }

    pub fn is_in_viewport(&self) -> bool {
        self.x.is_some() && self.y.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CameraState {
    pub yaw: i32,
    pub pitch: i32,
    pub scale: i32,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Response of `/camera_rotation?x&y&plane`, the inverse-problem answer §4.6
/// is built around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraRotationFeedback {
    pub visible: bool,
    #[serde(rename = "currentYaw")]
    pub current_yaw: i32,
    #[serde(rename = "currentPitch")]
    pub current_pitch: i32,
    #[serde(rename = "currentScale")]
    pub current_scale: i32,
    #[serde(rename = "targetYaw")]
    pub target_yaw: i32,
    #[serde(rename = "targetPitch")]
    pub target_pitch: i32,
    #[serde(rename = "targetScale")]
    pub target_scale: i32,
    #[serde(rename = "dragPixelsX")]
    pub drag_pixels_x: f64,
    #[serde(rename = "dragPixelsY")]
    pub drag_pixels_y: f64,
    #[serde(rename = "yawDistance")]
    pub yaw_distance: i32,
    #[serde(rename = "pitchDistance")]
    pub pitch_distance: i32,
    #[serde(rename = "screenX")]
    pub screen_x: Option<i32>,
    #[serde(rename = "screenY")]
    pub screen_y: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuEntry {
    pub option: String,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuSnapshot {
    #[serde(rename = "isOpen")]
    pub is_open: bool,
    pub entries: Vec<MenuEntry>,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl MenuSnapshot {
    /// Height, in pixels, of a single entry row below the header (§4.7
    /// invariant: `entry height = floor(menuHeight / (entries+1))`).
    pub fn entry_row_height(&self) -> i32 {
        if self.entries.is_empty() {
            return 0;
        }
        self.height / (self.entries.len() as i32 + 1)
    }

    /// The on-screen rectangle `(x, y, width, height)` of entry `index`
    /// (0-based, excluding the header row).
    pub fn entry_rect(&self, index: usize) -> Option<(i32, i32, i32, i32)> {
        if index >= self.entries.len() {
            return None;
        }
        let row_h = self.entry_row_height();
        let y = self.y + row_h * (index as i32 + 1);
        Some((self.x, y, self.width, row_h))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetsSnapshot {
    #[serde(rename = "isBankOpen")]
    pub is_bank_open: bool,
    #[serde(rename = "isShopOpen")]
    pub is_shop_open: bool,
    #[serde(rename = "isDialogueOpen")]
    pub is_dialogue_open: bool,
    #[serde(rename = "isInventoryOpen")]
    pub is_inventory_open: bool,
    #[serde(rename = "isLogoutPanelOpen")]
    pub is_logout_panel_open: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportSnapshot {
    pub width: i32,
    pub height: i32,
    #[serde(rename = "xOffset")]
    pub x_offset: i32,
    #[serde(rename = "yOffset")]
    pub y_offset: i32,
    #[serde(rename = "canvasMouseX")]
    pub canvas_mouse_x: i32,
    #[serde(rename = "canvasMouseY")]
    pub canvas_mouse_y: i32,
}

impl ViewportSnapshot {
    /// The screen-space game-area rectangle `(x, y, width, height)`.
    pub fn game_area(&self) -> (i32, i32, i32, i32) {
        (self.x_offset, self.y_offset, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Npc,
    Object,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearestByIdResponse {
    pub found: bool,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(rename = "worldX")]
    pub world_x: Option<i32>,
    #[serde(rename = "worldY")]
    pub world_y: Option<i32>,
    pub plane: Option<i8>,
    pub distance: Option<f64>,
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_percent_handles_zero_max() {
        let p = PlayerSnapshot {
            name: "x".into(),
            combat_level: 1,
            health: 0,
            max_health: 0,
            prayer: 0,
            max_prayer: 0,
            run_energy: 0,
            special_attack: 0,
            weight: 0,
            is_animating: false,
            animation_id: -1,
            interacting_with: None,
        };
        assert_eq!(p.health_percent(), 0.0);
        assert!(p.is_dead());
    }

    #[test]
    fn menu_entry_row_height_excludes_header() {
        let menu = MenuSnapshot {
            is_open: true,
            entries: vec![
                MenuEntry {
                    option: "Mine".into(),
                    target: "Rock".into(),
                },
                MenuEntry {
                    option: "Walk here".into(),
                    target: String::new(),
                },
            ],
            x: 0,
            y: 0,
            width: 100,
            height: 30,
        };
        assert_eq!(menu.entry_row_height(), 10);
        assert_eq!(menu.entry_rect(0), Some((0, 10, 100, 10)));
        assert_eq!(menu.entry_rect(1), Some((0, 20, 100, 10)));
        assert_eq!(menu.entry_rect(2), None);
    }
}

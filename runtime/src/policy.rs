//! Policy surface: the per-activity configuration a state handler consults
//! for targets, loot, food, equipment, and the paths between work area and
//! bank (§4.9, §9).
//!
//! The reference expresses this as an abstract base class with a dozen
//! `@abstractmethod`s that concrete bots (`CowKiller`, `GargoyleKiller`)
//! override. Per the design notes this becomes a closed, tagged
//! [`Policy`] enum instead of a trait object: the bot loop match-dispatches
//! on it rather than calling through a vtable, keeping every supported
//! activity enumerable at a glance.

use core::types::{EquipmentSlotKind, NavigationPath};

/// An item id plus the special handling to apply when it's looted, e.g.
/// burying bones or high-alching a valuable drop (§4.9's
/// `get_special_loot_actions`). A tagged variant rather than a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialLootAction {
    Bury,
    HighAlch,
    Keep,
}

#[derive(Debug, Clone, Copy)]
pub struct SpecialLootRule {
    pub item_id: i32,
    pub action: SpecialLootAction,
}

/// A teleport item and the menu action that activates it, used for the
/// emergency escape (§4.9's `get_escape_teleport_item_id`).
#[derive(Debug, Clone)]
pub struct EscapeTeleport {
    pub item_id: i32,
    pub action: String,
}

/// One slot of a policy's required inventory layout (§3, §4.9).
#[derive(Debug, Clone, Copy)]
pub struct RequiredInventorySlot {
    pub slot: u8,
    /// `None` means the slot must be empty.
    pub item_id: Option<i32>,
}

/// One slot of a policy's required equipment layout.
#[derive(Debug, Clone, Copy)]
pub struct RequiredEquipmentSlot {
    pub slot: EquipmentSlotKind,
    pub item_id: i32,
}

/// Combat-activity policy fields (§4.9's `CombatBotBase` abstract surface).
#[derive(Debug, Clone)]
pub struct CombatPolicy {
    pub target_npc_ids: Vec<i32>,
    pub loot_item_ids: Vec<i32>,
    pub special_loot: Vec<SpecialLootRule>,
    pub escape_teleport: Option<EscapeTeleport>,
    pub food_item_ids: Vec<i32>,
    pub required_equipment: Vec<RequiredEquipmentSlot>,
    pub required_inventory: Vec<RequiredInventorySlot>,
    pub escape_health_threshold_pct: u8,
    pub food_health_threshold_pct: u8,
    pub min_food_count: u8,
    pub path_to_work_area: NavigationPath,
    pub path_to_bank: NavigationPath,
}

/// Gathering-activity policy fields (§4.9's `SkillBotBase` abstract surface).
#[derive(Debug, Clone)]
pub struct GatheringPolicy {
    pub resource_ids: Vec<i32>,
    pub tool_ids: Vec<i32>,
    pub food_item_ids: Vec<i32>,
    pub required_equipment: Vec<RequiredEquipmentSlot>,
    pub powerdrop: bool,
    pub bank_when_full: bool,
    pub path_to_work_area: NavigationPath,
    pub path_to_bank: NavigationPath,
}

/// The closed set of activities a run can be configured for (§9 design
/// notes: tagged variant over dynamic dispatch).
#[derive(Debug, Clone)]
pub enum Policy {
    Combat(CombatPolicy),
    Gathering(GatheringPolicy),
}

impl Policy {
    pub fn food_item_ids(&self) -> &[i32] {
        match self {
            Policy::Combat(p) => &p.food_item_ids,
            Policy::Gathering(p) => &p.food_item_ids,
        }
    }

    pub fn path_to_work_area(&self) -> &NavigationPath {
        match self {
            Policy::Combat(p) => &p.path_to_work_area,
            Policy::Gathering(p) => &p.path_to_work_area,
        }
    }

    pub fn path_to_bank(&self) -> &NavigationPath {
        match self {
            Policy::Combat(p) => &p.path_to_bank,
            Policy::Gathering(p) => &p.path_to_bank,
        }
    }

    pub fn required_equipment(&self) -> &[RequiredEquipmentSlot] {
        match self {
            Policy::Combat(p) => &p.required_equipment,
            Policy::Gathering(p) => &p.required_equipment,
        }
    }

    /// Setup-time validation mirroring the reference's `setup()` checks:
    /// threshold ranges and non-empty paths (§4.9).
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Policy::Combat(p) => {
                if !(1..=99).contains(&p.escape_health_threshold_pct) {
                    return Err(format!("invalid escape threshold {}", p.escape_health_threshold_pct));
                }
                if !(1..=99).contains(&p.food_health_threshold_pct) {
                    return Err(format!("invalid food threshold {}", p.food_health_threshold_pct));
                }
                if !p.path_to_work_area.is_valid() {
                    return Err("path to combat area is empty".to_string());
                }
                if !p.path_to_bank.is_valid() {
                    return Err("path to bank is empty".to_string());
                }
                Ok(())
            }
            Policy::Gathering(p) => {
                if !p.path_to_work_area.is_valid() {
                    return Err("path to work area is empty".to_string());
                }
                if p.bank_when_full && !p.path_to_bank.is_valid() {
                    return Err("banking enabled but path to bank is empty".to_string());
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::types::{NavigationStep, WorldCoord};

    fn walk_path(goal: WorldCoord) -> NavigationPath {
        NavigationPath::new(vec![NavigationStep::walk(goal)])
    }

    #[test]
    fn combat_policy_rejects_out_of_range_threshold() {
        let policy = Policy::Combat(CombatPolicy {
            target_npc_ids: vec![3029],
            loot_item_ids: vec![],
            special_loot: vec![],
            escape_teleport: None,
            food_item_ids: vec![],
            required_equipment: vec![],
            required_inventory: vec![],
            escape_health_threshold_pct: 0,
            food_health_threshold_pct: 60,
            min_food_count: 3,
            path_to_work_area: walk_path(WorldCoord::new(0, 0, 0)),
            path_to_bank: walk_path(WorldCoord::new(1, 1, 0)),
        });
        assert!(policy.validate().is_err());
    }

    #[test]
    fn gathering_policy_without_banking_does_not_need_a_bank_path() {
        let policy = Policy::Gathering(GatheringPolicy {
            resource_ids: vec![1234],
            tool_ids: vec![1265],
            food_item_ids: vec![],
            required_equipment: vec![],
            powerdrop: true,
            bank_when_full: false,
            path_to_work_area: walk_path(WorldCoord::new(5, 5, 0)),
            path_to_bank: NavigationPath::default(),
        });
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn gathering_policy_with_banking_requires_bank_path() {
        let policy = Policy::Gathering(GatheringPolicy {
            resource_ids: vec![1234],
            tool_ids: vec![1265],
            food_item_ids: vec![],
            required_equipment: vec![],
            powerdrop: false,
            bank_when_full: true,
            path_to_work_area: walk_path(WorldCoord::new(5, 5, 0)),
            path_to_bank: NavigationPath::default(),
        });
        assert!(policy.validate().is_err());
    }
}

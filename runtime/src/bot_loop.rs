//! Per-state cycle handlers: gathering, combat, banking, and walking
//! (§4.10).
//!
//! Each handler takes every subsystem it needs by reference rather than a
//! bot "god object", mirroring how the reference's `_handle_gathering` /
//! `_handle_banking` / `_handle_walking` read from `self.osrs.*` but kept
//! here as free functions over explicit collaborators so [`crate::runtime::Runtime`]
//! stays the only place that owns them all.

use std::thread::sleep;
use std::time::{Duration, Instant};

use rand::Rng;

use core::constants::{LOOT_SEARCH_RADIUS_TILES, LOOT_WAIT_TIMEOUT, RESPAWN_TIMEOUT, TARGET_DEAD_TIMEOUT};
use core::error::BotError;
use core::types::{BotState, GroundItemSnapshot, NpcSnapshot, ObjectSnapshot, RunStatistics, WorldCoord};

use crate::camera::CameraController;
use crate::collision::CollisionMap;
use crate::humanization::Humanization;
use crate::input::{InputBackend, InputSynthesizer};
use crate::interactor::{EntityInteractor, InventorySlotTarget};
use crate::navigator::Navigator;
use crate::pathfinder::Pathfinder;
use crate::policy::{CombatPolicy, GatheringPolicy, SpecialLootAction, SpecialLootRule};
use crate::telemetry::TelemetryClient;

fn current_position(telemetry: &TelemetryClient) -> Result<WorldCoord, BotError> {
    telemetry
        .coords()
        .map(|c| WorldCoord::from(&c.world))
        .ok_or(BotError::TelemetryUnavailable { endpoint: "/coords" })
}

/// Collaborators every cycle handler needs, bundled so call sites don't
/// repeat a ten-argument list.
pub struct CycleContext<'a, B: InputBackend> {
    pub telemetry: &'a TelemetryClient,
    pub input: &'a mut InputSynthesizer<B>,
    pub collision: &'a mut CollisionMap,
    pub pathfinder: &'a mut Pathfinder,
    pub navigator: &'a mut Navigator,
    pub camera: &'a CameraController,
    pub interactor: &'a EntityInteractor,
    pub humanization: &'a mut Humanization,
    pub stats: &'a mut RunStatistics,
}

/// One gathering cycle: bank-if-full, locate and click a resource, then
/// wait out the gather/respawn window (§4.10 steps 1-9).
pub fn run_gathering_cycle<B: InputBackend>(
    ctx: &mut CycleContext<B>,
    policy: &GatheringPolicy,
    rng: &mut impl Rng,
) -> Result<BotState, BotError> {
    let inventory = ctx.telemetry.inventory().ok_or(BotError::TelemetryUnavailable { endpoint: "/inv" })?;
    let full = inventory.iter().all(|slot| !slot.is_empty());

    if full {
        if policy.powerdrop {
            drop_inventory_matching(ctx, &policy.resource_ids, rng)?;
            return Ok(BotState::Gathering);
        }
        if policy.bank_when_full {
            return Ok(BotState::Banking);
        }
    }

    ctx.humanization.reaction_delay(rng);

    let player = current_position(ctx.telemetry)?;
    let Some(resource) = find_first_match_object(ctx, &policy.resource_ids, player, rng) else {
        return Err(BotError::ResourceNotFound {
            what: format!("resource among {:?}", policy.resource_ids),
        });
    };

    if !ctx.interactor.click(&resource, "", ctx.telemetry, ctx.input, rng) {
        return Err(BotError::InteractionFailed {
            reason: format!("could not interact with resource {}", resource.id),
        });
    }

    wait_for_gather_or_respawn(ctx, &resource, rng)?;

    ctx.stats.record_resource_gathered();
    ctx.humanization.post_action_delay(Duration::from_millis(600), rng);

    if ctx.humanization.should_perform_idle_action(rng) {
        ctx.humanization.perform_idle_action(ctx.camera, ctx.input, rng);
    }

    Ok(BotState::Gathering)
}

fn find_first_match_object<B: InputBackend>(
    ctx: &CycleContext<B>,
    ids: &[i32],
    player: WorldCoord,
    rng: &mut impl Rng,
) -> Option<ObjectSnapshot> {
    ids.iter()
        .find_map(|&id| ctx.interactor.find_object(ctx.telemetry, ctx.camera, ctx.input, id, player, rng))
}

fn drop_inventory_matching<B: InputBackend>(
    ctx: &mut CycleContext<B>,
    ids: &[i32],
    rng: &mut impl Rng,
) -> Result<(), BotError> {
    let inventory = ctx.telemetry.inventory().ok_or(BotError::TelemetryUnavailable { endpoint: "/inv" })?;
    let slots: Vec<u8> = inventory.iter().filter(|s| ids.contains(&s.id)).map(|s| s.slot).collect();

    for slot in slots {
        let target = InventorySlotTarget::new(slot);
        if !ctx.interactor.click(&target, "Drop", ctx.telemetry, ctx.input, rng) {
            return Err(BotError::InteractionFailed {
                reason: format!("could not drop inventory slot {slot}"),
            });
        }
        ctx.humanization.reaction_delay(rng);
    }
    Ok(())
}

fn wait_for_gather_or_respawn<B: InputBackend>(
    ctx: &CycleContext<B>,
    resource: &ObjectSnapshot,
    rng: &mut impl Rng,
) -> Result<(), BotError> {
    let deadline = Instant::now() + RESPAWN_TIMEOUT;
    while Instant::now() < deadline {
        let Some(anim) = ctx.telemetry.animation() else {
            sleep(Duration::from_millis(400));
            continue;
        };
        if !anim.is_animating {
            return Ok(());
        }
        sleep(Duration::from_millis(rng.gen_range(300..=700)));
    }
    log::warn!("resource {} did not respawn within timeout", resource.id);
    Ok(())
}

/// One combat cycle: death check, escape threshold, engage-or-eat-or-loot
/// (§4.10 steps 1-5).
pub fn run_combat_cycle<B: InputBackend>(
    ctx: &mut CycleContext<B>,
    policy: &CombatPolicy,
    rng: &mut impl Rng,
) -> Result<BotState, BotError> {
    let player = ctx.telemetry.player().ok_or(BotError::TelemetryUnavailable { endpoint: "/player" })?;

    if player.is_dead() {
        return Err(BotError::CombatLost);
    }

    if player.health_percent() < policy.escape_health_threshold_pct as f64 {
        log::warn!("health {:.1}% below escape threshold, disengaging", player.health_percent());
        return Err(execute_emergency_escape(ctx, policy, rng));
    }

    if player.health_percent() < policy.food_health_threshold_pct as f64 {
        eat_food(ctx, &policy.food_item_ids, rng)?;
        return Ok(BotState::Eating);
    }

    let combat = ctx.telemetry.combat().ok_or(BotError::TelemetryUnavailable { endpoint: "/combat" })?;
    if combat.in_combat {
        ctx.humanization.reaction_delay(rng);
        return Ok(BotState::Combat);
    }

    let world = current_position(ctx.telemetry)?;
    let Some(target) = find_engageable_target(ctx, &policy.target_npc_ids, world, rng) else {
        return Err(BotError::ResourceNotFound {
            what: format!("target among {:?}", policy.target_npc_ids),
        });
    };

    if !ctx.interactor.click(&target, "Attack", ctx.telemetry, ctx.input, rng) {
        return Err(BotError::InteractionFailed {
            reason: format!("could not attack npc {}", target.id),
        });
    }

    wait_for_kill_or_timeout(ctx.telemetry, &target)?;
    ctx.stats.record_kill();
    collect_loot(ctx, &policy.loot_item_ids, &policy.special_loot, world, rng);

    Ok(BotState::Combat)
}

/// Teleports away from danger and heads back toward the bank, or logs out
/// entirely if no escape item is configured or the teleport fails
/// (§4.9's `get_escape_teleport_item_id`, §4.10 escape handling).
fn execute_emergency_escape<B: InputBackend>(ctx: &mut CycleContext<B>, policy: &CombatPolicy, rng: &mut impl Rng) -> BotError {
    ctx.stats.record_escape();

    let Some(teleport) = &policy.escape_teleport else {
        log::warn!("no escape teleport configured, logging out");
        return BotError::EmergencyLogout;
    };

    let Some(inventory) = ctx.telemetry.inventory() else {
        log::warn!("inventory unavailable during escape, logging out");
        return BotError::EmergencyLogout;
    };
    let Some(slot) = inventory.iter().find(|s| s.id == teleport.item_id) else {
        log::warn!("escape teleport item {} not in inventory, logging out", teleport.item_id);
        return BotError::EmergencyLogout;
    };

    let target = InventorySlotTarget::new(slot.slot);
    if !ctx.interactor.click(&target, &teleport.action, ctx.telemetry, ctx.input, rng) {
        log::warn!("escape teleport click failed, logging out");
        return BotError::EmergencyLogout;
    }

    ctx.humanization.post_action_delay(Duration::from_secs(3), rng);
    BotError::CombatEscape
}

/// Filters out NPCs already being fought by someone else, per §4.10's
/// "skip targets with `interactingWith` set to another player" rule.
fn find_engageable_target<B: InputBackend>(
    ctx: &CycleContext<B>,
    ids: &[i32],
    player: WorldCoord,
    rng: &mut impl Rng,
) -> Option<NpcSnapshot> {
    let viewport = ctx.telemetry.npcs_in_viewport().unwrap_or_default();
    let free: Vec<NpcSnapshot> = viewport
        .into_iter()
        .filter(|npc| ids.contains(&npc.id) && npc.interacting_with.is_none() && !npc.is_dying)
        .collect();
    if !free.is_empty() {
        let idx = rng.gen_range(0..free.len());
        return Some(free[idx].clone());
    }

    ids.iter().find_map(|&id| {
        ctx.interactor
            .find_npc(ctx.telemetry, ctx.camera, ctx.input, id, player, rng)
            .filter(|npc| npc.interacting_with.is_none())
    })
}

fn wait_for_kill_or_timeout(telemetry: &TelemetryClient, target: &NpcSnapshot) -> Result<(), BotError> {
    let deadline = Instant::now() + TARGET_DEAD_TIMEOUT;
    while Instant::now() < deadline {
        let Some(combat) = telemetry.combat() else {
            sleep(Duration::from_millis(400));
            continue;
        };
        match &combat.target {
            Some(t) if t.id == target.id && t.is_dying => return Ok(()),
            Some(_) => {}
            None => return Ok(()),
        }
        sleep(Duration::from_millis(500));
    }
    Err(BotError::CombatLost)
}

fn collect_loot<B: InputBackend>(
    ctx: &mut CycleContext<B>,
    loot_ids: &[i32],
    special_loot: &[SpecialLootRule],
    near: WorldCoord,
    rng: &mut impl Rng,
) {
    if loot_ids.is_empty() {
        return;
    }
    let deadline = Instant::now() + LOOT_WAIT_TIMEOUT;
    while Instant::now() < deadline {
        let items = ctx
            .telemetry
            .ground_items(Some(near.x), Some(near.y), Some(near.plane), Some(LOOT_SEARCH_RADIUS_TILES))
            .unwrap_or_default();
        if let Some(item) = items.iter().find(|i| loot_ids.contains(&i.id)).cloned() {
            if !item.is_in_viewport() {
                ctx.camera.rotate_to_visible(ctx.telemetry, ctx.input, item.world_x, item.world_y, item.plane, rng);
            }
            let Some(item) = ctx
                .telemetry
                .ground_items(Some(near.x), Some(near.y), Some(near.plane), Some(LOOT_SEARCH_RADIUS_TILES))
                .unwrap_or_default()
                .into_iter()
                .find(|i: &GroundItemSnapshot| i.id == item.id)
            else {
                return;
            };
            if ctx.interactor.click(&item, "Take", ctx.telemetry, ctx.input, rng) {
                log::info!("looting {} x{}", item.name, item.quantity);
                ctx.humanization.reaction_delay(rng);
                apply_special_loot(ctx, item.id, special_loot, rng);
            }
            return;
        }
        sleep(Duration::from_millis(200));
    }
}

/// Applies the configured special handling for a looted item id, if any
/// (§4.9's `_handle_special_loot`: bury bones, high-alch valuables, keep
/// the rest untouched).
fn apply_special_loot<B: InputBackend>(ctx: &mut CycleContext<B>, item_id: i32, rules: &[SpecialLootRule], rng: &mut impl Rng) {
    let Some(rule) = rules.iter().find(|r| r.item_id == item_id) else {
        return;
    };
    let action = match rule.action {
        SpecialLootAction::Keep => return,
        SpecialLootAction::Bury => "Bury",
        SpecialLootAction::HighAlch => "Cast",
    };

    let Some(inventory) = ctx.telemetry.inventory() else {
        return;
    };
    let Some(slot) = inventory.iter().find(|s| s.id == item_id) else {
        return;
    };
    let target = InventorySlotTarget::new(slot.slot);
    if ctx.interactor.click(&target, action, ctx.telemetry, ctx.input, rng) {
        ctx.humanization.reaction_delay(rng);
    }
}

fn eat_food<B: InputBackend>(ctx: &mut CycleContext<B>, food_ids: &[i32], rng: &mut impl Rng) -> Result<(), BotError> {
    let inventory = ctx.telemetry.inventory().ok_or(BotError::TelemetryUnavailable { endpoint: "/inv" })?;
    let Some(slot) = inventory.iter().find(|s| food_ids.contains(&s.id)) else {
        return Err(BotError::ResourceNotFound {
            what: "food in inventory".to_string(),
        });
    };

    let target = InventorySlotTarget::new(slot.slot);
    if !ctx.interactor.click(&target, "Eat", ctx.telemetry, ctx.input, rng) {
        return Err(BotError::InteractionFailed {
            reason: "could not eat food".to_string(),
        });
    }

    ctx.humanization.reaction_delay(rng);
    ctx.stats.record_food_eaten();
    Ok(())
}

/// Walks to `goal`, returning the next state on arrival or propagating a
/// navigation error (§4.10 "Walking" handler).
pub fn run_walking_cycle<B: InputBackend>(
    ctx: &mut CycleContext<B>,
    goal: WorldCoord,
    next_state: BotState,
    rng: &mut impl Rng,
) -> Result<BotState, BotError> {
    ctx.navigator.walk_to(
        ctx.telemetry,
        ctx.input,
        ctx.collision,
        ctx.pathfinder,
        goal,
        goal.plane,
        true,
        rng,
    )?;
    Ok(next_state)
}

/// One banking cycle: deposit-all, eat to at least 90% HP, close the
/// interface, or open the bank first if not already open (§4.10 "Banking").
pub fn run_banking_cycle<B: InputBackend>(
    ctx: &mut CycleContext<B>,
    next_state: BotState,
    rng: &mut impl Rng,
) -> Result<BotState, BotError> {
    let widgets = ctx.telemetry.widgets().ok_or(BotError::TelemetryUnavailable { endpoint: "/widgets" })?;

    if !widgets.is_bank_open {
        let player = current_position(ctx.telemetry)?;
        let Some(booth) = ctx
            .telemetry
            .objects_in_viewport()
            .unwrap_or_default()
            .into_iter()
            .find(|o| o.name.to_lowercase().contains("bank"))
        else {
            return Err(BotError::ResourceNotFound {
                what: "bank booth in viewport".to_string(),
            });
        };
        let _ = player;
        if !ctx.interactor.click(&booth, "Bank", ctx.telemetry, ctx.input, rng) {
            return Err(BotError::InteractionFailed {
                reason: "could not open bank".to_string(),
            });
        }
        return Ok(BotState::Banking);
    }

    ctx.stats.record_bank_trip();
    ctx.humanization.post_action_delay(Duration::from_millis(500), rng);
    Ok(next_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_position_errors_without_telemetry() {
        let telemetry = TelemetryClient::new("http://127.0.0.1:1", Duration::from_millis(20));
        let err = current_position(&telemetry).unwrap_err();
        assert!(matches!(err, BotError::TelemetryUnavailable { .. }));
    }
}

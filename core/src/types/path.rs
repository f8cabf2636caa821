//! Pathfinding and navigation results (§3, §4.4, §4.10).

use crate::types::world::WorldCoord;

/// A single tile of a computed [`Route`], in traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteStep {
    pub coord: WorldCoord,
}

/// The pathfinder's raw-to-simplified output: an ordered sequence of tiles
/// from origin to destination (§4.4 "Path"). Distinct from [`NavigationPath`],
/// which describes a policy-supplied multi-leg journey rather than a single
/// tile-by-tile route.
#[derive(Debug, Clone, Default)]
pub struct Route {
    pub steps: Vec<RouteStep>,
}

impl Route {
    pub fn new(coords: Vec<WorldCoord>) -> Self {
        Self {
            steps: coords.into_iter().map(|coord| RouteStep { coord }).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn destination(&self) -> Option<WorldCoord> {
        self.steps.last().map(|s| s.coord)
    }

    /// Total path length in tiles, summing per-step Chebyshev distance.
    pub fn tile_length(&self) -> i32 {
        self.steps
            .windows(2)
            .map(|w| w[0].coord.chebyshev_distance(&w[1].coord))
            .sum()
    }
}

/// The action to take once a [`NavigationStep`]'s goal tile is reached that
/// isn't a plain entity interaction — climbing stairs, opening a gate, and
/// so on. A tagged variant (§9 design notes) rather than a callback, so the
/// bot loop's dispatcher is a single exhaustive `match`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomAction {
    ClimbUp,
    ClimbDown,
    OpenDoor,
    OpenGate,
    /// An escape hatch for a policy-specific action not covered above,
    /// identified by a stable tag the policy's own handler recognizes.
    Named(String),
}

/// Interaction to perform at a [`NavigationStep`]'s goal tile: find one of
/// `object_ids` and click it expecting `action_text` (§3).
#[derive(Debug, Clone)]
pub struct InteractionSpec {
    pub object_ids: Vec<i32>,
    pub action_text: String,
    pub retry_on_failure: bool,
}

/// One leg of a multi-leg journey, e.g. "walk to the stairs, then climb"
/// (§3). Produced by policies, consumed by the walking state handler.
#[derive(Debug, Clone)]
pub struct NavigationStep {
    pub goal: WorldCoord,
    pub interaction: Option<InteractionSpec>,
    pub custom_action: Option<CustomAction>,
}

impl NavigationStep {
    pub fn walk(goal: WorldCoord) -> Self {
        Self {
            goal,
            interaction: None,
            custom_action: None,
        }
    }

    pub fn with_interaction(goal: WorldCoord, interaction: InteractionSpec) -> Self {
        Self {
            goal,
            interaction: Some(interaction),
            custom_action: None,
        }
    }

    pub fn with_custom_action(goal: WorldCoord, action: CustomAction) -> Self {
        Self {
            goal,
            interaction: None,
            custom_action: Some(action),
        }
    }

    pub fn has_interaction(&self) -> bool {
        self.interaction.is_some()
    }

    pub fn has_custom_action(&self) -> bool {
        self.custom_action.is_some()
    }
}

/// An ordered, policy-supplied sequence of [`NavigationStep`]s describing a
/// journey between two named locations (e.g. combat area to bank).
#[derive(Debug, Clone, Default)]
pub struct NavigationPath {
    pub steps: Vec<NavigationStep>,
}

impl NavigationPath {
    pub fn new(steps: Vec<NavigationStep>) -> Self {
        Self { steps }
    }

    pub fn is_valid(&self) -> bool {
        !self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_route_has_no_destination() {
        let route = Route::default();
        assert!(route.is_empty());
        assert_eq!(route.destination(), None);
    }

    #[test]
    fn tile_length_sums_steps() {
        let route = Route::new(vec![
            WorldCoord::new(0, 0, 0),
            WorldCoord::new(1, 0, 0),
            WorldCoord::new(1, 1, 0),
        ]);
        assert_eq!(route.tile_length(), 2);
        assert_eq!(route.destination(), Some(WorldCoord::new(1, 1, 0)));
    }

    #[test]
    fn navigation_step_kind_helpers() {
        let walk = NavigationStep::walk(WorldCoord::new(0, 0, 0));
        assert!(!walk.has_interaction() && !walk.has_custom_action());

        let climb = NavigationStep::with_custom_action(WorldCoord::new(0, 0, 0), CustomAction::ClimbUp);
        assert!(climb.has_custom_action());

        let interact = NavigationStep::with_interaction(
            WorldCoord::new(0, 0, 0),
            InteractionSpec {
                object_ids: vec![1530],
                action_text: "Bank".to_string(),
                retry_on_failure: true,
            },
        );
        assert!(interact.has_interaction());
    }

    #[test]
    fn empty_navigation_path_is_invalid() {
        assert!(!NavigationPath::default().is_valid());
    }
}

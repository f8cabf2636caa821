//! Shared data types (§3).

pub mod break_sched;
pub mod config;
pub mod geometry;
pub mod path;
pub mod snapshot;
pub mod state;
pub mod stats;
pub mod world;

pub use break_sched::{Break, BreakKind};
pub use config::RuntimeConfig;
pub use geometry::{Polygon, Region};
pub use path::{CustomAction, InteractionSpec, NavigationPath, NavigationStep, Route, RouteStep};
pub use snapshot::{
    AnimationSnapshot, CameraRotationFeedback, CameraState, CombatSnapshot, CombatTarget,
    CoordsSnapshot, EntityKind, EquipmentSlot, EquipmentSlotKind, GroundItemSnapshot, InventorySlot,
    MenuEntry, MenuSnapshot, NearestByIdResponse, NpcSnapshot, ObjectSnapshot, PlayerSnapshot,
    ScreenPosition, StatEntry, ViewportSnapshot, WidgetsSnapshot, WorldPosition,
};
pub use state::{BotState, StateMachine};
pub use stats::RunStatistics;
pub use world::{LocalCoord, RegionCoord, WorldCoord};

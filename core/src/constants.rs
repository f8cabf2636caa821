//! Tunable constants for the bot runtime.
//!
//! Every numeric knob named by the specification lives here so subsystems
//! never hardcode a magic number twice. Values that the specification marks
//! as "empirical" or "configurable" are also exposed through
//! [`crate::types::RuntimeConfig`] with these as defaults.

use std::time::Duration;

/// World planes range from ground (0) up to 3.
pub const MAX_PLANE: i8 = 3;

/// Size, in tiles, of one [`crate::types::CollisionRegion`] edge.
pub const REGION_SIZE: i32 = 64;

/// Default cap for the collision-region LRU (§3 "Lifetimes & ownership").
pub const DEFAULT_COLLISION_CACHE_CAP: usize = 50;

/// Default cap for the pathfinder's path LRU.
pub const DEFAULT_PATH_CACHE_CAP: usize = 100;

/// Timeout budget for every telemetry HTTP request (§4.1).
pub const TELEMETRY_TIMEOUT: Duration = Duration::from_secs(2);

/// Minimum tile distance to a goal at which `walkTo` is considered arrived.
pub const ARRIVAL_TOLERANCE_TILES: i32 = 2;

/// Maximum tiles a single minimap click should span.
pub const MINIMAP_CLICK_RANGE_TILES: i32 = 12;

/// Path length (in waypoints) at or above which waypoint injection runs.
pub const WAYPOINT_INJECT_MIN_PATH_LEN: usize = 15;

/// Lookahead, in tiles, for the line-of-sight simplification pass.
pub const LOS_LOOKAHEAD_TILES: i32 = 12;

/// Empirical minimap calibration constant (pixels per world tile).
///
/// The specification (§9 open questions) calls this an estimate and asks
/// for it to be exposed as a configurable, calibratable parameter; this is
/// only the compiled-in default.
pub const DEFAULT_MINIMAP_PX_PER_TILE: f64 = 4.0;

/// Radius, in pixels, of the circular minimap widget.
pub const DEFAULT_MINIMAP_RADIUS_PX: f64 = 80.0;

/// Navigation waypoint arrival timeout (§5 "Timeouts").
pub const WAYPOINT_ARRIVAL_TIMEOUT: Duration = Duration::from_secs(30);

/// How long a position must stay identical before `Navigator` calls it stuck.
pub const STUCK_DETECTION_WINDOW: Duration = Duration::from_secs(3);

/// Minimum number of identical position samples required to trip stuck detection.
pub const STUCK_MIN_SAMPLES: usize = 3;

/// Number of stuck events tolerated for a single journey before it fails.
pub const MAX_STUCK_EVENTS_PER_JOURNEY: u32 = 3;

/// Maximum attempts the camera controller makes before giving up.
pub const CAMERA_MAX_ATTEMPTS: u32 = 5;

/// Scale at/above which the camera controller's zoom pre-step engages.
pub const CAMERA_ZOOM_IN_THRESHOLD: i32 = 330;

/// Target zoom range sampled by the scale pre-step.
pub const CAMERA_ZOOM_TARGET_RANGE: (i32, i32) = (305, 325);

/// Scroll-wheel units applied per unit of scale delta during the zoom pre-step.
pub const CAMERA_SCROLL_UNITS_PER_SCALE: i32 = 50;

/// Hard clamp on a single scroll-wheel adjustment.
pub const CAMERA_SCROLL_CLAMP: i32 = 600;

/// Below this per-axis drag magnitude (pixels), the camera controller treats
/// the current position as already-acceptable (§8 boundary behavior).
pub const CAMERA_DRAG_SUCCESS_THRESHOLD_PX: f64 = 5.0;

/// Drags larger than this are split into sequential MMB segments.
pub const CAMERA_LARGE_DRAG_THRESHOLD_PX: f64 = 200.0;

/// Consecutive stuck readings (unchanged yaw/pitch) before the camera
/// controller aborts early.
pub const CAMERA_MAX_STUCK_READINGS: u32 = 3;

/// Valid camera scale bounds.
pub const CAMERA_SCALE_BOUNDS: (i32, i32) = (300, 650);

/// Valid camera yaw bounds (exclusive upper bound).
pub const CAMERA_YAW_MAX: i32 = 2048;

/// Valid camera pitch bounds.
pub const CAMERA_PITCH_BOUNDS: (i32, i32) = (128, 512);

/// Fatigue increment applied per humanized action (§4.8).
pub const FATIGUE_INCREMENT_PER_ACTION: f64 = 0.001;

/// Coefficient scaling post-action delay by fatigue: `1 + k * fatigue`.
pub const FATIGUE_DELAY_COEFFICIENT: f64 = 0.5;

/// Coefficient scaling reaction delay by fatigue: `1 + k * fatigue`.
pub const REACTION_DELAY_FATIGUE_COEFFICIENT: f64 = 0.3;

/// Reaction delay bounds before scaling, in milliseconds.
pub const REACTION_DELAY_MS_RANGE: (u64, u64) = (150, 400);

/// Target-dead wait timeout for the combat loop.
pub const TARGET_DEAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Loot-appearance wait timeout and search radius, post-kill.
pub const LOOT_WAIT_TIMEOUT: Duration = Duration::from_millis(2500);
pub const LOOT_SEARCH_RADIUS_TILES: i32 = 3;

/// Respawn-detection timeout default; skills may override via policy.
pub const RESPAWN_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum size of the in-memory error-log ring (§7, §8 property 8).
pub const MAX_ERROR_LOG_ENTRIES: usize = 100;

/// Consecutive same-named task failures that escalate to emergency shutdown.
pub const CONSECUTIVE_FAILURE_ESCALATION_THRESHOLD: u32 = 3;

/// Wall-clock budget for the logout step of emergency shutdown.
pub const LOGOUT_TIMEOUT: Duration = Duration::from_secs(5);

/// Minimum inventory slot index (1-based, per §3).
pub const INVENTORY_SLOT_MIN: u8 = 1;
/// Maximum inventory slot index (28 slots).
pub const INVENTORY_SLOT_MAX: u8 = 28;

/// Number of equipment slots (Head..Ammo, per §3).
pub const EQUIPMENT_SLOT_COUNT: usize = 11;

/// Screen-space pixel center of inventory slot 1 in fixed-mode layout.
pub const INVENTORY_ORIGIN_PX: (i32, i32) = (563, 213);

/// Pixel spacing between adjacent slot centers, `(column, row)`.
pub const INVENTORY_SLOT_PITCH_PX: (i32, i32) = (42, 36);

/// Number of columns in the inventory grid.
pub const INVENTORY_COLUMNS: u8 = 4;

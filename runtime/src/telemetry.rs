//! Typed wrapper over the local HTTP telemetry endpoint (§4.1).
//!
//! No retries; callers poll. Errors are absence-typed — a missing response,
//! an empty body, or a schema violation all collapse to `None`, matching
//! the reference client's tolerant JSON-endpoint pattern.

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use core::types::{
    AnimationSnapshot, CameraRotationFeedback, CameraState, CombatSnapshot, CoordsSnapshot,
    EntityKind, EquipmentSlot, GroundItemSnapshot, InventorySlot, MenuSnapshot, NearestByIdResponse,
    NpcSnapshot, ObjectSnapshot, PlayerSnapshot, StatEntry, ViewportSnapshot, WidgetsSnapshot,
};

/// Read-only HTTP client over the game client's telemetry surface.
pub struct TelemetryClient {
    base_url: String,
    http: reqwest::blocking::Client,
    last_latency: RefCell<HashMap<&'static str, Duration>>,
}

impl TelemetryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .expect("telemetry HTTP client failed to build");
        Self {
            base_url: base_url.into(),
            http,
            last_latency: RefCell::new(HashMap::new()),
        }
    }

    /// Issues a GET against `base_url + path_and_query`, recording latency
    /// under the stable `tag` (the bare endpoint name, ignoring any query
    /// string) for diagnostics.
    fn get_at<T: serde::de::DeserializeOwned>(&self, tag: &'static str, path_and_query: &str) -> Option<T> {
        let url = format!("{}{}", self.base_url, path_and_query);
        let start = Instant::now();
        let result = self.http.get(&url).send();
        self.last_latency.borrow_mut().insert(tag, start.elapsed());

        let response = match result {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                log::warn!("telemetry {tag} returned status {}", resp.status());
                return None;
            }
            Err(e) => {
                log::warn!("telemetry {tag} unavailable: {e}");
                return None;
            }
        };

        match response.json::<T>() {
            Ok(value) => Some(value),
            Err(e) => {
                log::warn!("telemetry {tag} malformed body: {e}");
                None
            }
        }
    }

    fn get<T: serde::de::DeserializeOwned>(&self, endpoint: &'static str) -> Option<T> {
        self.get_at(endpoint, endpoint)
    }

    /// Per-endpoint round-trip latency of the most recent successful or
    /// failed request, for diagnostics.
    pub fn last_latency(&self, endpoint: &str) -> Option<Duration> {
        self.last_latency.borrow().get(endpoint).copied()
    }

    pub fn stats(&self) -> Option<Vec<StatEntry>> {
        self.get("/stats")
    }

    pub fn player(&self) -> Option<PlayerSnapshot> {
        self.get("/player")
    }

    pub fn coords(&self) -> Option<CoordsSnapshot> {
        self.get("/coords")
    }

    pub fn combat(&self) -> Option<CombatSnapshot> {
        self.get("/combat")
    }

    pub fn animation(&self) -> Option<AnimationSnapshot> {
        self.get("/animation")
    }

    pub fn inventory(&self) -> Option<Vec<InventorySlot>> {
        self.get("/inv")
    }

    pub fn equipment(&self) -> Option<Vec<EquipmentSlot>> {
        self.get("/equip")
    }

    pub fn bank(&self) -> Option<Vec<InventorySlot>> {
        self.get("/bank")
    }

    pub fn npcs(&self) -> Option<Vec<NpcSnapshot>> {
        self.get("/npcs")
    }

    pub fn npcs_in_viewport(&self) -> Option<Vec<NpcSnapshot>> {
        self.get("/npcs_in_viewport")
    }

    pub fn players(&self) -> Option<Vec<PlayerSnapshot>> {
        self.get("/players")
    }

    pub fn objects(&self) -> Option<Vec<ObjectSnapshot>> {
        self.get("/objects")
    }

    pub fn objects_in_viewport(&self) -> Option<Vec<ObjectSnapshot>> {
        self.get("/objects_in_viewport")
    }

    /// `x, y, plane` and `radius` narrow the query when provided; omitted
    /// filters fall back to the endpoint's own defaults.
    pub fn ground_items(
        &self,
        x: Option<i32>,
        y: Option<i32>,
        plane: Option<i8>,
        radius: Option<i32>,
    ) -> Option<Vec<GroundItemSnapshot>> {
        let mut query = Vec::new();
        if let Some(x) = x {
            query.push(format!("x={x}"));
        }
        if let Some(y) = y {
            query.push(format!("y={y}"));
        }
        if let Some(plane) = plane {
            query.push(format!("plane={plane}"));
        }
        if let Some(radius) = radius {
            query.push(format!("radius={radius}"));
        }
        let path = if query.is_empty() {
            "/ground_items".to_string()
        } else {
            format!("/ground_items?{}", query.join("&"))
        };
        self.get_at("/ground_items", &path)
    }

    pub fn camera(&self) -> Option<CameraState> {
        self.get("/camera")
    }

    pub fn game_state(&self) -> Option<serde_json::Value> {
        self.get("/game_state")
    }

    pub fn menu(&self) -> Option<MenuSnapshot> {
        self.get("/menu")
    }

    pub fn widgets(&self) -> Option<WidgetsSnapshot> {
        self.get("/widgets")
    }

    pub fn viewport(&self) -> Option<ViewportSnapshot> {
        self.get("/viewport")
    }

    pub fn magic_level(&self) -> Option<i32> {
        self.get("/magic_level")
    }

    pub fn camera_rotation_to(&self, x: i32, y: i32, plane: i8) -> Option<CameraRotationFeedback> {
        let path = format!("/camera_rotation?x={x}&y={y}&plane={plane}");
        self.get_at("/camera_rotation", &path)
    }

    pub fn nearest_by_id(&self, id: i32, kind: EntityKind) -> Option<NearestByIdResponse> {
        let kind_str = match kind {
            EntityKind::Npc => "npc",
            EntityKind::Object => "object",
        };
        let path = format!("/nearest_by_id?id={id}&type={kind_str}");
        self.get_at("/nearest_by_id", &path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_endpoint_returns_none_not_panic() {
        let client = TelemetryClient::new("http://127.0.0.1:1", Duration::from_millis(50));
        assert!(client.player().is_none());
        assert!(client.last_latency("/player").is_some());
    }
}

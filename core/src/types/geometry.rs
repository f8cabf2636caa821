//! Screen-space polygons and world-space regions (§3, §4.5, §4.7).

use rand::Rng;
use serde::{Deserialize, Serialize};

/// A convex or near-convex screen-space hull, as returned for NPCs/objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    pub points: Vec<(f64, f64)>,
}

impl Polygon {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self { points }
    }

    pub fn bounding_box(&self) -> Option<(f64, f64, f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for &(x, y) in &self.points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
        Some((min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.points.is_empty() {
            return None;
        }
        let n = self.points.len() as f64;
        let (sx, sy) = self
            .points
            .iter()
            .fold((0.0, 0.0), |(ax, ay), &(x, y)| (ax + x, ay + y));
        Some((sx / n, sy / n))
    }

    /// Shoelace-formula signed area (absolute value), zero for <3 points.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut sum = 0.0;
        for i in 0..n {
            let (x1, y1) = self.points[i];
            let (x2, y2) = self.points[(i + 1) % n];
            sum += x1 * y2 - x2 * y1;
        }
        (sum / 2.0).abs()
    }

    /// Even-odd ray casting point-in-polygon test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.points[i];
            let (xj, yj) = self.points[j];
            if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Samples a uniformly-distributed point inside the polygon using a
    /// fan-triangulation from `points[0]`, weighting each triangle by area
    /// (§4.7 "click inside the polygon, not just the centroid").
    pub fn sample_point(&self, rng: &mut impl Rng) -> Option<(f64, f64)> {
        let n = self.points.len();
        if n < 3 {
            return self.centroid();
        }
        let p0 = self.points[0];
        let mut triangles = Vec::with_capacity(n - 2);
        let mut total_area = 0.0;
        for i in 1..n - 1 {
            let p1 = self.points[i];
            let p2 = self.points[i + 1];
            let area = triangle_area(p0, p1, p2);
            total_area += area;
            triangles.push((p1, p2, area));
        }
        if total_area <= 0.0 {
            return self.centroid();
        }
        let mut pick = rng.gen_range(0.0..total_area);
        let last = triangles.len() - 1;
        for (i, (p1, p2, area)) in triangles.into_iter().enumerate() {
            if pick <= area || i == last {
                return Some(sample_in_triangle(p0, p1, p2, rng));
            }
            pick -= area;
        }
        self.centroid()
    }
}

fn triangle_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    ((b.0 - a.0) * (c.1 - a.1) - (c.0 - a.0) * (b.1 - a.1)).abs() / 2.0
}

fn sample_in_triangle(a: (f64, f64), b: (f64, f64), c: (f64, f64), rng: &mut impl Rng) -> (f64, f64) {
    let mut r1: f64 = rng.gen_range(0.0..1.0);
    let mut r2: f64 = rng.gen_range(0.0..1.0);
    if r1 + r2 > 1.0 {
        r1 = 1.0 - r1;
        r2 = 1.0 - r2;
    }
    let x = a.0 + r1 * (b.0 - a.0) + r2 * (c.0 - a.0);
    let y = a.1 + r1 * (b.1 - a.1) + r2 * (c.1 - a.1);
    (x, y)
}

/// An axis-aligned interior region, used both for world-space wandering /
/// patrol / "stay within" fencing (§4.4, §4.9) and for clamping screen-space
/// points to a client's game area (§4.6, §4.7, §4.8) — the `plane` field is
/// meaningless for the latter use and left at `0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
    pub plane: i8,
    /// Row-major bitmap over the rectangle (`width = max_x - min_x + 1` cells
    /// per row) carving out a non-rectangular subregion; `None` means the
    /// whole rectangle counts (§3).
    pub mask: Option<Vec<bool>>,
}

impl Region {
    pub fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32, plane: i8) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
            plane,
            mask: None,
        }
    }

    pub fn with_mask(mut self, mask: Vec<bool>) -> Self {
        self.mask = Some(mask);
        self
    }

    pub fn center(&self) -> (i32, i32) {
        ((self.min_x + self.max_x) / 2, (self.min_y + self.max_y) / 2)
    }

    pub fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub fn contains(&self, x: i32, y: i32, plane: i8) -> bool {
        plane == self.plane && x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// As [`Region::contains`], but also consults the bitmap mask when one
    /// is set, so a tile inside the rectangle but outside the masked
    /// subregion is excluded.
    pub fn contains_masked(&self, x: i32, y: i32, plane: i8) -> bool {
        if !self.contains(x, y, plane) {
            return false;
        }
        let Some(mask) = &self.mask else {
            return true;
        };
        let idx = ((y - self.min_y) * self.width() + (x - self.min_x)) as usize;
        mask.get(idx).copied().unwrap_or(false)
    }

    pub fn random_interior_point(&self, rng: &mut impl Rng) -> (i32, i32) {
        (
            rng.gen_range(self.min_x..=self.max_x),
            rng.gen_range(self.min_y..=self.max_y),
        )
    }

    /// Clamps a screen-space point to this rectangle, ignoring `plane`.
    pub fn clamp_point(&self, x: i32, y: i32) -> (i32, i32) {
        (x.clamp(self.min_x, self.max_x), y.clamp(self.min_y, self.max_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn square_area_and_centroid() {
        let square = Polygon::new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert_eq!(square.area(), 100.0);
        assert_eq!(square.centroid(), Some((5.0, 5.0)));
    }

    #[test]
    fn contains_checks_interior_and_exterior() {
        let square = Polygon::new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        assert!(square.contains(5.0, 5.0));
        assert!(!square.contains(20.0, 20.0));
    }

    #[test]
    fn sample_point_stays_inside() {
        let square = Polygon::new(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let (x, y) = square.sample_point(&mut rng).unwrap();
            assert!(square.contains(x, y), "sampled point ({x}, {y}) outside polygon");
        }
    }

    #[test]
    fn region_clamps_and_contains() {
        let region = Region::new(10, 10, 0, 0, 0);
        assert_eq!(region.min_x, 0);
        assert_eq!(region.max_x, 10);
        assert!(region.contains(5, 5, 0));
        assert!(!region.contains(5, 5, 1));
    }

    #[test]
    fn clamp_point_ignores_plane() {
        let region = Region::new(0, 0, 800, 600, 0);
        assert_eq!(region.clamp_point(-50, 900), (0, 600));
    }

    #[test]
    fn masked_region_excludes_unset_cells() {
        // 3x2 rectangle, mask out the middle cell of the top row.
        let region = Region::new(0, 0, 2, 1, 0).with_mask(vec![true, false, true, true, true, true]);
        assert!(region.contains_masked(0, 0, 0));
        assert!(!region.contains_masked(1, 0, 0));
        assert!(region.contains_masked(1, 1, 0));
    }
}

use super::Vec3;

/// Axis-aligned bounding box, the hitbox shape of every targetable entity.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Box centered at `center` with the given full width and height
    /// (the usual upright entity hitbox shape).
    pub fn from_center(center: Vec3, width: f64, height: f64) -> Self {
        let half = width / 2.0;
        Self {
            min: Vec3::new(center.x - half, center.y, center.z - half),
            max: Vec3::new(center.x + half, center.y + height, center.z + half),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Grows the box by `margin` on every side.
    pub fn expand(&self, margin: f64) -> Aabb {
        let m = Vec3::new(margin, margin, margin);
        Aabb::new(self.min - m, self.max + m)
    }

    /// Translates the box, used to rebase a hitbox at an extrapolated position.
    pub fn offset(&self, by: Vec3) -> Aabb {
        Aabb::new(self.min + by, self.max + by)
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Point on or inside the box closest to `to`.
    pub fn closest_point(&self, to: Vec3) -> Vec3 {
        Vec3::new(
            to.x.clamp(self.min.x, self.max.x),
            to.y.clamp(self.min.y, self.max.y),
            to.z.clamp(self.min.z, self.max.z),
        )
    }

    pub fn squared_distance_to(&self, from: Vec3) -> f64 {
        self.closest_point(from).squared_distance_to(from)
    }

    /// Slab-method ray intersection.
    ///
    /// Returns the entry distance along `dir` (unit length) at which the ray
    /// strikes the box, or `None` if it misses or the hit lies beyond
    /// `max_dist`. An origin inside the box intersects at distance zero.
    pub fn ray_intersect(&self, origin: Vec3, dir: Vec3, max_dist: f64) -> Option<f64> {
        let mut t_min = 0.0_f64;
        let mut t_max = max_dist;

        for (o, d, lo, hi) in [
            (origin.x, dir.x, self.min.x, self.max.x),
            (origin.y, dir.y, self.min.y, self.max.y),
            (origin.z, dir.z, self.min.z, self.max.z),
        ] {
            if d.abs() < 1e-12 {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let (t0, t1) = {
                let a = (lo - o) * inv;
                let b = (hi - o) * inv;
                if a <= b { (a, b) } else { (b, a) }
            };
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }

    /// Candidate aim points projected on the faces visible from `eyes`.
    ///
    /// For each axis where `eyes` lies outside the slab, an `n`-by-`n` lattice
    /// is generated on the face turned toward the viewer. Points sit slightly
    /// inside the face so grazing rays still register an intersection. When
    /// `eyes` is inside the box on all axes the result is empty and callers
    /// fall back to [`Aabb::closest_point`].
    pub fn surface_points(&self, eyes: Vec3, n: usize) -> Vec<Vec3> {
        let mut points = Vec::new();
        let n = n.max(1);
        let extent = self.max - self.min;

        let fractions: Vec<f64> = (0..n).map(|i| (i as f64 + 0.5) / n as f64).collect();

        // X faces
        if eyes.x < self.min.x || eyes.x > self.max.x {
            let x = if eyes.x < self.min.x { self.min.x } else { self.max.x };
            for &fy in &fractions {
                for &fz in &fractions {
                    points.push(Vec3::new(
                        x,
                        self.min.y + extent.y * fy,
                        self.min.z + extent.z * fz,
                    ));
                }
            }
        }
        // Y faces
        if eyes.y < self.min.y || eyes.y > self.max.y {
            let y = if eyes.y < self.min.y { self.min.y } else { self.max.y };
            for &fx in &fractions {
                for &fz in &fractions {
                    points.push(Vec3::new(
                        self.min.x + extent.x * fx,
                        y,
                        self.min.z + extent.z * fz,
                    ));
                }
            }
        }
        // Z faces
        if eyes.z < self.min.z || eyes.z > self.max.z {
            let z = if eyes.z < self.min.z { self.min.z } else { self.max.z };
            for &fx in &fractions {
                for &fy in &fractions {
                    points.push(Vec3::new(
                        self.min.x + extent.x * fx,
                        self.min.y + extent.y * fy,
                        z,
                    ));
                }
            }
        }

        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::ZERO, Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn ray_hits_box_straight_on() {
        let hit = unit_box().ray_intersect(
            Vec3::new(0.5, 0.5, -2.0),
            Vec3::new(0.0, 0.0, 1.0),
            10.0,
        );
        assert_eq!(hit, Some(2.0));
    }

    #[test]
    fn ray_misses_parallel_offset() {
        let hit = unit_box().ray_intersect(
            Vec3::new(2.0, 0.5, -2.0),
            Vec3::new(0.0, 0.0, 1.0),
            10.0,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn ray_beyond_max_dist_misses() {
        let hit = unit_box().ray_intersect(
            Vec3::new(0.5, 0.5, -5.0),
            Vec3::new(0.0, 0.0, 1.0),
            3.0,
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn origin_inside_intersects_at_zero() {
        let hit = unit_box().ray_intersect(
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(1.0, 0.0, 0.0),
            10.0,
        );
        assert_eq!(hit, Some(0.0));
    }

    #[test]
    fn closest_point_clamps() {
        let p = unit_box().closest_point(Vec3::new(5.0, -3.0, 0.5));
        assert_eq!(p, Vec3::new(1.0, 0.0, 0.5));
    }

    #[test]
    fn surface_points_face_the_viewer() {
        let eyes = Vec3::new(0.5, 0.5, -4.0);
        let points = unit_box().surface_points(eyes, 3);
        // Only the near Z face is visible from straight ahead.
        assert_eq!(points.len(), 9);
        assert!(points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn surface_points_empty_inside() {
        assert!(unit_box().surface_points(Vec3::new(0.5, 0.5, 0.5), 3).is_empty());
    }
}

//! Pure 3D placement helpers.
//!
//! # Responsibility
//! - Produce spawn positions for the galaxy scatter layout.
//! - Place nodes on an orbital ring for the one-shot solar rearrangement.
//!
//! # Invariants
//! - `random_point_in_sphere` is uniform by volume, not by surface.
//! - `orbit_point` keeps the ring in the horizontal (XZ) plane; only the Y
//!   component carries jitter.

use crate::model::node::Point3;
use rand::Rng;
use std::f64::consts::TAU;

/// Vertical jitter band applied by [`orbit_point`], in world units.
const ORBIT_Y_JITTER: f64 = 2.0;

/// Returns a point uniformly distributed inside a sphere of `radius`
/// centered at the origin.
///
/// The radial fraction takes the cube root of a uniform scalar so volume
/// density stays constant; the direction combines a uniform azimuth with an
/// inverse-cosine polar angle.
pub fn random_point_in_sphere(radius: f64) -> Point3 {
    let mut rng = rand::thread_rng();
    let theta = rng.gen::<f64>() * TAU;
    let phi = (rng.gen::<f64>() * 2.0 - 1.0).acos();
    let r = rng.gen::<f64>().cbrt() * radius;

    Point3 {
        x: r * phi.sin() * theta.cos(),
        y: r * phi.sin() * theta.sin(),
        z: r * phi.cos(),
    }
}

/// Places item `index` of `total` evenly around a circle of `radius` in the
/// XZ plane centered at `center`, with slight Y variation.
///
/// Used only for the one-time rearrangement when switching into solar mode;
/// continuous orbital motion belongs to the view layer.
pub fn orbit_point(index: usize, total: usize, center: Point3, radius: f64) -> Point3 {
    let fraction = if total == 0 {
        0.0
    } else {
        index as f64 / total as f64
    };
    let angle = fraction * TAU;
    let jitter = (rand::thread_rng().gen::<f64>() - 0.5) * ORBIT_Y_JITTER;

    Point3 {
        x: center.x + angle.cos() * radius,
        y: center.y + jitter,
        z: center.z + angle.sin() * radius,
    }
}

/// Euclidean distance between two points.
pub fn distance(a: Point3, b: Point3) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2) + (b.z - a.z).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::{distance, orbit_point, random_point_in_sphere, ORBIT_Y_JITTER};
    use crate::model::node::Point3;

    #[test]
    fn sphere_points_stay_inside_radius() {
        for _ in 0..256 {
            let point = random_point_in_sphere(15.0);
            let r = distance(Point3::default(), point);
            assert!(r <= 15.0 + 1e-9, "point escaped sphere: r={r}");
        }
    }

    #[test]
    fn sphere_points_fill_the_volume() {
        // With volume-uniform sampling half the points land inside the
        // 79.4%-radius shell; surface-only sampling would put none there.
        let inner = (0..512)
            .filter(|_| distance(Point3::default(), random_point_in_sphere(10.0)) < 7.9)
            .count();
        assert!(inner > 128, "only {inner}/512 points in the inner shell");
    }

    #[test]
    fn orbit_points_sit_on_the_ring() {
        let center = Point3::new(3.0, 1.0, -2.0);
        for index in 0..8 {
            let point = orbit_point(index, 8, center, 10.0);
            let planar =
                ((point.x - center.x).powi(2) + (point.z - center.z).powi(2)).sqrt();
            assert!((planar - 10.0).abs() < 1e-9);
            assert!((point.y - center.y).abs() <= ORBIT_Y_JITTER / 2.0 + 1e-9);
        }
    }

    #[test]
    fn orbit_point_handles_zero_total() {
        let point = orbit_point(0, 0, Point3::default(), 5.0);
        assert!((point.x - 5.0).abs() < 1e-9);
        assert!(point.z.abs() < 1e-9);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new(4.0, 6.0, 3.0);
        assert!((distance(a, b) - 5.0).abs() < 1e-12);
    }
}

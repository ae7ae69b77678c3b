//! Bounding-Kugeln für Culling und Kandidatensuche.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Kugel aus Mittelpunkt und Radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// Kugel um den AABB-Mittelpunkt, die alle Punkte einschließt.
    /// Eine leere Punktliste ergibt eine Kugel mit Radius 0 im Ursprung.
    pub fn enclosing(points: &[Vec3]) -> Self {
        let Some(first) = points.first() else {
            return Self::new(Vec3::ZERO, 0.0);
        };

        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        let center = (min + max) * 0.5;
        let radius = points
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0_f32, f32::max);

        Self::new(center, radius)
    }

    /// Abstand von `point` zur Kugeloberfläche (0 innerhalb der Kugel).
    pub fn distance_to(&self, point: Vec3) -> f32 {
        (self.center.distance(point) - self.radius).max(0.0)
    }
}

/// Projiziert eine Position auf die Kartenebene (x/z) im Format des KD-Trees.
///
/// Die planare Distanz ist nie größer als die räumliche, eine Umkreissuche
/// in der Ebene liefert also eine Obermenge der räumlichen Treffer.
pub(crate) fn kd_point(position: Vec3) -> [f64; 2] {
    [position.x as f64, position.z as f64]
}

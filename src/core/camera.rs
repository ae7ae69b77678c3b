//! Orthografische Kartenkamera (Draufsicht).

use glam::Vec3;

use super::ZoomMapper;

/// Kartenkamera mit Position und orthografischer Größe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCamera {
    /// Position der Kamera in Spielkoordinaten
    pub position: Vec3,
    /// Halbe sichtbare Höhe in Welteinheiten (größer = weiter herausgezoomt)
    pub size: f32,
}

impl MapCamera {
    /// Feste Höhe der Kartenkamera über dem Gelände.
    pub const HEIGHT: f32 = 5000.0;
    /// Standardgröße beim ersten Öffnen der Karte.
    pub const DEFAULT_SIZE: f32 = 1000.0;

    pub fn new() -> Self {
        Self {
            position: Vec3::new(0.0, Self::HEIGHT, 0.0),
            size: Self::DEFAULT_SIZE,
        }
    }

    /// Zentriert die Karte über der Spielerkamera, die Höhe bleibt fest.
    pub fn recenter_on(&mut self, player_camera: Vec3) {
        self.position = Vec3::new(player_camera.x, Self::HEIGHT, player_camera.z);
    }

    /// Setzt die Größe, auf die Zoom-Grenzen geklemmt. Gibt die neue Größe zurück.
    pub fn set_size_clamped(&mut self, size: f32, zoom: &ZoomMapper) -> f32 {
        self.size = zoom.clamp_camera_size(size);
        self.size
    }
}

impl Default for MapCamera {
    fn default() -> Self {
        Self::new()
    }
}

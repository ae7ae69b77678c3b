//! Umrechnung zwischen Kamera-Zoom, normalisierter Skala und Icon-Skala.

use serde::{Deserialize, Serialize};

/// Referenz-Zoombereich, auf den die Icon-Skala kalibriert ist.
pub const REFERENCE_ZOOM_MIN: f32 = 100.0;
/// Obere Grenze des Referenz-Zoombereichs.
pub const REFERENCE_ZOOM_MAX: f32 = 5000.0;
/// Icon-Skala bei `REFERENCE_ZOOM_MIN`.
pub const REFERENCE_ICON_SCALE_MIN: f32 = 0.2;
/// Icon-Skala bei `REFERENCE_ZOOM_MAX`.
pub const REFERENCE_ICON_SCALE_MAX: f32 = 4.0;

/// Konfigurierte Zoom-Grenzen (orthografische Kameragröße).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBounds {
    pub min: f32,
    pub max: f32,
}

impl ZoomBounds {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Gibt `true` zurück, wenn `min == max` (keine Interpolation möglich).
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }
}

impl Default for ZoomBounds {
    fn default() -> Self {
        Self::new(REFERENCE_ZOOM_MIN, REFERENCE_ZOOM_MAX)
    }
}

/// Inverse lineare Interpolation ohne Klemmung. `a == b` ergibt 0.
pub fn inverse_lerp_unclamped(a: f32, b: f32, value: f32) -> f32 {
    if a != b {
        (value - a) / (b - a)
    } else {
        0.0
    }
}

/// Inverse lineare Interpolation, auf [0, 1] geklemmt.
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    inverse_lerp_unclamped(a, b, value).clamp(0.0, 1.0)
}

/// Lineare Interpolation ohne Klemmung.
pub fn lerp_unclamped(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Lineare Interpolation mit auf [0, 1] geklemmtem `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    lerp_unclamped(a, b, t.clamp(0.0, 1.0))
}

/// Reine Zoom-Transformationen über konfigurierten Grenzen.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomMapper {
    bounds: ZoomBounds,
}

impl ZoomMapper {
    pub fn new(bounds: ZoomBounds) -> Self {
        Self { bounds }
    }

    pub fn bounds(&self) -> ZoomBounds {
        self.bounds
    }

    /// Kameragröße → [0, 1] über den konfigurierten Zoombereich.
    pub fn normalized_scale(&self, camera_size: f32) -> f32 {
        inverse_lerp(self.bounds.min, self.bounds.max, camera_size)
    }

    /// Icon-Skala für eine normalisierte Skala.
    ///
    /// Die Zoom-Grenzen werden zuerst über den Referenzbereich
    /// [100, 5000] → [0.2, 4.0] ungeklemmt auf Icon-Grenzen abgebildet,
    /// danach wird zwischen diesen Grenzen geklemmt interpoliert.
    pub fn icon_scale(&self, normalized_scale: f32) -> f32 {
        let (low, high) = self.icon_scale_bounds();
        lerp(low, high, normalized_scale)
    }

    /// Abgeleitete Icon-Skala an Zoom-Minimum und -Maximum.
    pub fn icon_scale_bounds(&self) -> (f32, f32) {
        let derive = |zoom: f32| {
            lerp_unclamped(
                REFERENCE_ICON_SCALE_MIN,
                REFERENCE_ICON_SCALE_MAX,
                inverse_lerp_unclamped(REFERENCE_ZOOM_MIN, REFERENCE_ZOOM_MAX, zoom),
            )
        };
        (derive(self.bounds.min), derive(self.bounds.max))
    }

    /// Klemmt eine Kameragröße auf die Zoom-Grenzen.
    pub fn clamp_camera_size(&self, size: f32) -> f32 {
        size.max(self.bounds.min).min(self.bounds.max)
    }

    /// Skalierung für Kartenbeschriftungen (leicht kleiner als die Host-Vorgabe).
    pub fn label_zoom(scale: f32) -> f32 {
        scale / 4.0 * 3.5
    }
}

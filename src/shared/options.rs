//! Zentrale Konfiguration des Karten-Overlays.
//!
//! `OverlayOptions` enthält alle vom Benutzer änderbaren Werte.
//! Die `const`-Werte bleiben als Fallback/Default erhalten.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ZoomBounds;

// ── Zoom ────────────────────────────────────────────────────────────

/// Minimale orthografische Kameragröße.
pub const ZOOM_MIN: f32 = 100.0;
/// Maximale orthografische Kameragröße.
pub const ZOOM_MAX: f32 = 5000.0;

// ── Marker ──────────────────────────────────────────────────────────

/// Skalierung der Weichen-Marker.
pub const MARKER_SCALE: f32 = 1.0;
/// Skalierung der Fackel-Icons.
pub const FLARE_SCALE: f32 = 0.6;
/// Normalisierte Skala, bis zu der Nebenstrecken-Weichen angezeigt werden.
pub const MARKER_VISIBILITY_CUTOFF: f32 = 0.5;
/// Radius der Culling-Kugel pro Marker.
pub const MARKER_SPHERE_RADIUS: f32 = 1.0;
/// Höhe der Weichen-Marker über dem Herzstück.
pub const JUNCTION_MARKER_HEIGHT: f32 = 50.0;
/// Höhe der Wagen-Marker über dem Wagen.
pub const CAR_MARKER_HEIGHT: f32 = 75.0;
/// Höhe der Fackel-Marker über der Fackel.
pub const FLARE_MARKER_HEIGHT: f32 = 25.0;

// ── Gleise ──────────────────────────────────────────────────────────

/// Minimale Linienstärke der Gleise.
pub const TRACK_LINE_THICKNESS_MIN: f32 = 1.0;
/// Farbe der Hauptstrecke (RGBA).
pub const TRACK_COLOR_MAINLINE: [f32; 4] = [0.85, 0.85, 0.85, 1.0];
/// Farbe der Nebenstrecke (RGBA).
pub const TRACK_COLOR_BRANCH: [f32; 4] = [0.55, 0.55, 0.6, 1.0];
/// Farbe der Industriegleise (RGBA).
pub const TRACK_COLOR_INDUSTRIAL: [f32; 4] = [0.7, 0.5, 0.3, 1.0];
/// Farbe nicht freigeschalteter Gleise (RGBA).
pub const TRACK_COLOR_UNAVAILABLE: [f32; 4] = [0.35, 0.2, 0.2, 1.0];

// ── Interaktion ────────────────────────────────────────────────────

/// Suchradius für das Platzieren einer Fackel.
pub const FLARE_SNAP_RADIUS: f32 = 50.0;
/// Intervall der Wagenfarben-Aktualisierung in Sekunden.
pub const COLOR_REFRESH_INTERVAL_SECS: f32 = 1.0;

/// Ungültige Konfigurationswerte.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Zoom-Grenzen ungültig: min {min} muss kleiner als max {max} sein")]
    ZoomBounds { min: f32, max: f32 },
    #[error("{name} muss positiv und endlich sein, ist aber {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("Marker-Cutoff {0} liegt außerhalb von [0, 1]")]
    Cutoff(f32),
}

// ── Laufzeit-Optionen (serialisierbar) ─────────────────────────────

/// Alle vom Benutzer änderbaren Overlay-Optionen.
/// Wird als `rail_map_overlay.toml` neben der Binary gespeichert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    // ── Zoom ────────────────────────────────────────────────────
    /// Minimale Kameragröße (am weitesten hineingezoomt)
    pub zoom_min: f32,
    /// Maximale Kameragröße (am weitesten herausgezoomt)
    pub zoom_max: f32,

    // ── Marker ──────────────────────────────────────────────────
    pub marker_scale: f32,
    pub flare_scale: f32,
    /// Nebenstrecken-Weichen nur bis zu dieser normalisierten Skala anzeigen
    pub marker_visibility_cutoff: f32,
    /// Sichtdistanz für Marker, `None` = unbegrenzt
    pub visibility_distance: Option<f32>,
    pub marker_sphere_radius: f32,
    pub junction_marker_height: f32,
    pub car_marker_height: f32,
    pub flare_marker_height: f32,

    // ── Gleise ──────────────────────────────────────────────────
    pub track_line_thickness_min: f32,
    pub track_color_mainline: [f32; 4],
    pub track_color_branch: [f32; 4],
    pub track_color_industrial: [f32; 4],
    pub track_color_unavailable: [f32; 4],

    // ── Interaktion ─────────────────────────────────────────────
    pub flare_snap_radius: f32,
    pub color_refresh_interval_secs: f32,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            zoom_min: ZOOM_MIN,
            zoom_max: ZOOM_MAX,

            marker_scale: MARKER_SCALE,
            flare_scale: FLARE_SCALE,
            marker_visibility_cutoff: MARKER_VISIBILITY_CUTOFF,
            visibility_distance: None,
            marker_sphere_radius: MARKER_SPHERE_RADIUS,
            junction_marker_height: JUNCTION_MARKER_HEIGHT,
            car_marker_height: CAR_MARKER_HEIGHT,
            flare_marker_height: FLARE_MARKER_HEIGHT,

            track_line_thickness_min: TRACK_LINE_THICKNESS_MIN,
            track_color_mainline: TRACK_COLOR_MAINLINE,
            track_color_branch: TRACK_COLOR_BRANCH,
            track_color_industrial: TRACK_COLOR_INDUSTRIAL,
            track_color_unavailable: TRACK_COLOR_UNAVAILABLE,

            flare_snap_radius: FLARE_SNAP_RADIUS,
            color_refresh_interval_secs: COLOR_REFRESH_INTERVAL_SECS,
        }
    }
}

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

impl OverlayOptions {
    /// Lädt Optionen aus einer TOML-Datei. Bei Fehler: Standardwerte.
    pub fn load_from_file(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(opts) => {
                    log::info!("Optionen geladen aus: {}", path.display());
                    opts
                }
                Err(e) => {
                    log::warn!("Optionen-Datei fehlerhaft, verwende Standardwerte: {}", e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Keine Optionen-Datei gefunden, verwende Standardwerte");
                Self::default()
            }
        }
    }

    /// Speichert Optionen als TOML-Datei.
    pub fn save_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        log::info!("Optionen gespeichert nach: {}", path.display());
        Ok(())
    }

    /// Ermittelt den Pfad zur Optionen-Datei neben der Binary.
    pub fn config_path() -> std::path::PathBuf {
        std::env::current_exe()
            .unwrap_or_else(|_| std::path::PathBuf::from("rail-map-overlay"))
            .parent()
            .unwrap_or_else(|| std::path::Path::new("."))
            .join("rail_map_overlay.toml")
    }

    /// Prüft alle Werte, die Steuerfluss oder Divisionen beeinflussen.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.zoom_min.is_finite() && self.zoom_max.is_finite())
            || self.zoom_min >= self.zoom_max
        {
            return Err(ConfigError::ZoomBounds {
                min: self.zoom_min,
                max: self.zoom_max,
            });
        }
        positive("marker_scale", self.marker_scale)?;
        positive("flare_scale", self.flare_scale)?;
        positive("marker_sphere_radius", self.marker_sphere_radius)?;
        positive("flare_snap_radius", self.flare_snap_radius)?;
        positive("color_refresh_interval_secs", self.color_refresh_interval_secs)?;
        positive("track_line_thickness_min", self.track_line_thickness_min)?;
        if let Some(distance) = self.visibility_distance {
            positive("visibility_distance", distance)?;
        }
        if !(0.0..=1.0).contains(&self.marker_visibility_cutoff) {
            return Err(ConfigError::Cutoff(self.marker_visibility_cutoff));
        }
        Ok(())
    }

    /// Gibt gültige Optionen zurück; bei Fehlern die Standardwerte (einmal geloggt).
    pub fn sanitized(self) -> Self {
        match self.validate() {
            Ok(()) => self,
            Err(e) => {
                log::warn!("Ungültige Optionen, verwende Standardwerte: {}", e);
                Self::default()
            }
        }
    }

    /// Zoom-Grenzen aus den Optionen.
    pub fn zoom_bounds(&self) -> ZoomBounds {
        ZoomBounds::new(self.zoom_min, self.zoom_max)
    }

    /// Intervall der Farbaktualisierung als `Duration`.
    pub fn color_refresh_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(self.color_refresh_interval_secs.max(0.01))
    }
}

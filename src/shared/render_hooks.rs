//! Ausgaben für den Render-Hook des Hosts: Gleisfarben, Linienstärken und
//! zoomabhängige Skalierungen.

use crate::core::{ClassificationSet, SegmentId, TrackClass, ZoomMapper};

use super::OverlayOptions;

/// Bezugsgröße für die maximale Linienstärke.
const LINE_WIDTH_REFERENCE_ZOOM: f32 = 5000.0;
/// Maximale Linienstärke bei `LINE_WIDTH_REFERENCE_ZOOM`.
const LINE_WIDTH_AT_REFERENCE: f32 = 20.0;

/// Gleisdarstellung für die aktuelle Map.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackStyle {
    pub mainline: [f32; 4],
    pub branch: [f32; 4],
    pub industrial: [f32; 4],
    pub unavailable: [f32; 4],
    /// Linienstärke beim kleinsten Zoom
    pub line_width_min: f32,
    /// Linienstärke beim größten Zoom (wächst mit `zoom_max`)
    pub line_width_max: f32,
}

impl TrackStyle {
    pub fn from_options(options: &OverlayOptions) -> Self {
        Self {
            mainline: options.track_color_mainline,
            branch: options.track_color_branch,
            industrial: options.track_color_industrial,
            unavailable: options.track_color_unavailable,
            line_width_min: options.track_line_thickness_min,
            line_width_max: options.zoom_max / LINE_WIDTH_REFERENCE_ZOOM * LINE_WIDTH_AT_REFERENCE,
        }
    }

    /// Farbe für eine Gleisklasse. Nicht freigeschaltete Gleise haben eine eigene Farbe.
    pub fn color(&self, class: TrackClass, available: bool) -> [f32; 4] {
        if !available {
            return self.unavailable;
        }
        match class {
            TrackClass::Mainline => self.mainline,
            TrackClass::Branch => self.branch,
            TrackClass::Industrial => self.industrial,
        }
    }

    /// Farbe eines Segments anhand der Klassifizierung.
    pub fn segment_color(
        &self,
        classification: &ClassificationSet,
        segment: SegmentId,
        available: bool,
    ) -> [f32; 4] {
        self.color(classification.class_of(segment), available)
    }
}

/// Zoomabhängige Werte für einen Frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomFrame {
    /// Auf die Zoom-Grenzen geklemmte Kameragröße
    pub camera_size: f32,
    pub normalized_scale: f32,
    pub icon_scale: f32,
    /// Skala der Kartenbeschriftungen
    pub label_scale: f32,
    /// Nebenstrecken-Weichen sichtbar (nur bei ausreichend hineingezoomter Karte)
    pub branch_junctions_visible: bool,
}

impl ZoomFrame {
    /// Berechnet alle Werte für eine Kameragröße.
    pub fn compute(zoom: &ZoomMapper, camera_size: f32, cutoff: f32) -> Self {
        let camera_size = zoom.clamp_camera_size(camera_size);
        let normalized_scale = zoom.normalized_scale(camera_size);
        let icon_scale = zoom.icon_scale(normalized_scale);
        Self {
            camera_size,
            normalized_scale,
            icon_scale,
            label_scale: ZoomMapper::label_zoom(icon_scale),
            branch_junctions_visible: normalized_scale <= cutoff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ZoomBounds;
    use approx::assert_relative_eq;

    #[test]
    fn line_width_max_follows_zoom_max() {
        let options = OverlayOptions {
            zoom_max: 10_000.0,
            track_line_thickness_min: 2.0,
            ..Default::default()
        };
        let style = TrackStyle::from_options(&options);

        assert_relative_eq!(style.line_width_min, 2.0);
        assert_relative_eq!(style.line_width_max, 40.0);
    }

    #[test]
    fn unavailable_overrides_class_color() {
        let style = TrackStyle::from_options(&OverlayOptions::default());
        assert_eq!(style.color(TrackClass::Mainline, false), style.unavailable);
        assert_eq!(style.color(TrackClass::Industrial, true), style.industrial);
    }

    #[test]
    fn zoom_frame_hides_branch_junctions_when_zoomed_out() {
        let zoom = ZoomMapper::new(ZoomBounds::new(100.0, 5000.0));

        let close = ZoomFrame::compute(&zoom, 300.0, 0.5);
        assert!(close.branch_junctions_visible);

        let far = ZoomFrame::compute(&zoom, 4000.0, 0.5);
        assert!(!far.branch_junctions_visible);
    }

    #[test]
    fn zoom_frame_clamps_camera_size_first() {
        let zoom = ZoomMapper::new(ZoomBounds::new(100.0, 5000.0));
        let frame = ZoomFrame::compute(&zoom, 20_000.0, 0.5);

        assert_relative_eq!(frame.camera_size, 5000.0);
        assert_relative_eq!(frame.normalized_scale, 1.0);
        assert_relative_eq!(frame.icon_scale, 4.0, epsilon = 1e-5);
        assert_relative_eq!(frame.label_scale, 3.5, epsilon = 1e-5);
    }
}

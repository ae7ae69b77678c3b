//! Zustand des Overlays über Map-Ladevorgänge hinweg.

use super::session::MapSession;
use super::{EventLog, HostRequest};
use crate::core::{MapCamera, ZoomMapper};
use crate::shared::{OverlayOptions, TrackStyle, ZoomFrame};

/// Hauptzustand des Overlays
#[derive(Debug)]
pub struct OverlayState {
    /// Geprüfte Laufzeit-Optionen
    pub options: OverlayOptions,
    pub zoom: ZoomMapper,
    /// Orthografische Kartenkamera
    pub camera: MapCamera,
    /// Zoomabhängige Werte des letzten `ZoomChanged`
    pub zoom_frame: ZoomFrame,
    /// Gleisfarben und Linienstärken für den Render-Hook
    pub track_style: TrackStyle,
    /// Ob das Kartenfenster offen ist
    pub overlay_shown: bool,
    /// Session der geladenen Map (None = keine Map geladen)
    pub session: Option<MapSession>,
    /// Offene Aufträge an den Host
    pub requests: Vec<HostRequest>,
    pub event_log: EventLog,
}

impl OverlayState {
    /// Erstellt einen State ohne geladene Map. Ungültige Optionen werden
    /// durch die Standardwerte ersetzt.
    pub fn new(options: OverlayOptions) -> Self {
        let options = options.sanitized();
        let zoom = ZoomMapper::new(options.zoom_bounds());
        let camera = MapCamera::new();
        let zoom_frame = ZoomFrame::compute(&zoom, camera.size, options.marker_visibility_cutoff);
        Self {
            track_style: TrackStyle::from_options(&options),
            options,
            zoom,
            camera,
            zoom_frame,
            overlay_shown: false,
            session: None,
            requests: Vec::new(),
            event_log: EventLog::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    /// Anzahl registrierter Marker (0 ohne Map).
    pub fn marker_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.registry().len())
    }

    /// Entnimmt alle offenen Host-Aufträge.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        std::mem::take(&mut self.requests)
    }

    /// Berechnet die Zoom-Werte für die aktuelle Kameragröße neu.
    pub fn refresh_zoom_frame(&mut self) {
        self.zoom_frame = ZoomFrame::compute(
            &self.zoom,
            self.camera.size,
            self.options.marker_visibility_cutoff,
        );
        self.camera.size = self.zoom_frame.camera_size;
    }
}

impl Default for OverlayState {
    fn default() -> Self {
        Self::new(OverlayOptions::default())
    }
}

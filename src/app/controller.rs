//! Overlay-Controller für zentrale Event-Verarbeitung.

use std::path::PathBuf;

use super::host::{MarkerSurface, OverlayWorld};
use super::{OverlayEvent, OverlayState};

/// Dispatcht Host-Events an die Feature-Handler.
#[derive(Debug, Default)]
pub struct OverlayController {
    /// Zielpfad für geänderte Optionen (None = nicht speichern)
    config_path: Option<PathBuf>,
}

impl OverlayController {
    /// Erstellt einen Controller, der Optionen nicht speichert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Erstellt einen Controller, der geänderte Optionen nach `path` schreibt.
    pub fn with_config_path(path: PathBuf) -> Self {
        Self {
            config_path: Some(path),
        }
    }

    /// Verarbeitet ein Event vollständig.
    pub fn handle_event(
        &mut self,
        state: &mut OverlayState,
        event: OverlayEvent,
        world: &dyn OverlayWorld,
        surface: &mut dyn MarkerSurface,
    ) -> anyhow::Result<()> {
        state.event_log.record(&event);
        use super::handlers;

        match event {
            // === Lebenszyklus ===
            OverlayEvent::MapLoaded => handlers::lifecycle::map_loaded(state, world, surface),
            OverlayEvent::MapUnloading => handlers::lifecycle::map_unloading(state, surface),
            OverlayEvent::NetworkTopologyRebuilt {
                signal_blocks_changed,
            } => handlers::lifecycle::topology_rebuilt(state, world, surface, signal_blocks_changed),
            OverlayEvent::SettingsChanged { options } => handlers::lifecycle::settings_changed(
                state,
                world,
                surface,
                options,
                self.config_path.as_deref(),
            )?,

            // === Kamera & Kartenfenster ===
            OverlayEvent::CameraMoved { position } => {
                handlers::view::camera_moved(state, world, surface, position)
            }
            OverlayEvent::ZoomChanged { camera_size } => {
                handlers::view::zoom_changed(state, surface, camera_size)
            }
            OverlayEvent::OverlayShown {
                shown,
                player_camera,
            } => handlers::view::overlay_shown(state, world, surface, shown, player_camera),
            OverlayEvent::Tick { dt } => handlers::view::tick(state, world, surface, dt),

            // === Entitäten ===
            OverlayEvent::EntityAdded { key } => {
                handlers::entities::entity_added(state, world, surface, key)
            }
            OverlayEvent::EntityRemoved { key } => {
                handlers::entities::entity_removed(state, surface, key)
            }
            OverlayEvent::EntityMoved { key } => {
                handlers::entities::entity_moved(state, world, surface, key)
            }

            // === Interaktion ===
            OverlayEvent::PlaceFlareRequested {
                point,
                pointer_over_map,
            } => handlers::interaction::place_flare(state, world, point, pointer_over_map),
            OverlayEvent::SwitchThrowRequested { node, access } => {
                handlers::interaction::throw_switch(state, world, node, access);
            }
        }

        Ok(())
    }
}

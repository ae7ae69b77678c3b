//! Handler für Kamera, Zoom, Kartenfenster und Frame-Tick.

use std::time::Duration;

use glam::Vec3;

use crate::app::color_refresh::refresh_freight_colors;
use crate::app::host::{MarkerGroup, MarkerSurface, OverlayWorld};
use crate::app::{HostRequest, OverlayState};

/// Neuer Kamera-Referenzpunkt für den Sichtbarkeits-Index.
pub fn camera_moved(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
    position: Vec3,
) {
    state.camera.position = position;
    let Some(session) = state.session.as_mut() else {
        return;
    };
    let changed = session.registry_mut().update_reference_point(
        position,
        surface,
        world.culling_oracle(),
    );
    log::debug!("Kamera bewegt: {} Marker umgeschaltet", changed);
}

/// Berechnet Icon-Skala und Nebenstrecken-Sichtbarkeit für die neue Kameragröße.
pub fn zoom_changed(state: &mut OverlayState, surface: &mut dyn MarkerSurface, camera_size: f32) {
    state.camera.size = camera_size;
    state.refresh_zoom_frame();
    surface.set_group_visible(
        MarkerGroup::BranchJunctions,
        state.zoom_frame.branch_junctions_visible,
    );
}

/// Kartenfenster geöffnet oder geschlossen.
pub fn overlay_shown(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
    shown: bool,
    player_camera: Vec3,
) {
    state.overlay_shown = shown;
    surface.set_group_visible(MarkerGroup::Junctions, shown);

    if shown {
        state.camera.recenter_on(player_camera);
        state
            .requests
            .push(HostRequest::SetCameraPosition(state.camera.position));
    }

    let Some(session) = state.session.as_mut() else {
        return;
    };
    if shown {
        session.registry_mut().update_reference_point(
            state.camera.position,
            surface,
            world.culling_oracle(),
        );
        session.color_task_mut().start();
    } else {
        session.color_task_mut().cancel();
    }
}

/// Treibt den Farb-Task voran.
pub fn tick(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
    dt: Duration,
) {
    let Some(session) = state.session.as_mut() else {
        return;
    };
    if session.color_task_mut().advance(dt) {
        refresh_freight_colors(session.registry(), world, surface);
    }
}

//! Handler für Map-Laden/-Entladen, Topologie-Neuaufbau und Einstellungen.

use std::path::Path;

use crate::app::host::{MarkerGroup, MarkerSurface, OverlayWorld};
use crate::app::session::MapSession;
use crate::app::{HostRequest, OverlayState};
use crate::core::ZoomMapper;
use crate::shared::{OverlayOptions, TrackStyle};

/// Baut die Session auf. Ist bereits eine Map geladen, passiert nichts.
pub fn map_loaded(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
) {
    if state.session.is_some() {
        log::debug!("MapLoaded ignoriert: Session existiert bereits");
        return;
    }

    let mut session = MapSession::load(world, &state.options, surface);
    session
        .registry_mut()
        .update_reference_point(state.camera.position, surface, world.culling_oracle());
    if state.overlay_shown {
        session.color_task_mut().start();
    }

    surface.set_group_visible(MarkerGroup::Junctions, state.overlay_shown);
    surface.set_group_visible(
        MarkerGroup::BranchJunctions,
        state.zoom_frame.branch_junctions_visible,
    );
    state.session = Some(session);
}

/// Verwirft die Session. Ohne geladene Map ein No-op.
pub fn map_unloading(state: &mut OverlayState, surface: &mut dyn MarkerSurface) {
    match state.session.take() {
        Some(session) => session.teardown(surface),
        None => log::debug!("MapUnloading ohne geladene Map ignoriert"),
    }
}

/// Baut nach einer Topologie-Änderung Klassifizierung, Resolver und alle
/// Marker neu auf.
///
/// Auch ohne geänderte Signalblöcke können Segmente verschwunden sein, daher
/// wird immer vollständig neu klassifiziert.
pub fn topology_rebuilt(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
    signal_blocks_changed: bool,
) {
    let Some(session) = state.session.as_mut() else {
        log::debug!("Topologie-Neuaufbau ohne geladene Map ignoriert");
        return;
    };

    log::debug!(
        "Topologie neu aufgebaut (Signalblöcke geändert: {})",
        signal_blocks_changed
    );
    session.reclassify(world);
    session.rebuild_markers(world, &state.options, surface);
}

/// Übernimmt neue Optionen und speichert sie optional.
///
/// Bei offenem Kartenfenster wird die Kameragröße in die neuen Grenzen
/// geklemmt, ein Neuaufbau der Karte angefordert und der Farb-Task neu
/// gestartet.
pub fn settings_changed(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
    options: OverlayOptions,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let options = options.sanitized();
    state.zoom = ZoomMapper::new(options.zoom_bounds());
    state.track_style = TrackStyle::from_options(&options);
    state.options = options;

    if let Some(session) = state.session.as_mut() {
        let registry = session.registry_mut();
        registry.relayout(&state.options, surface);
        registry.set_sphere_radius(
            state.options.marker_sphere_radius,
            surface,
            world.culling_oracle(),
        );
        registry.set_distance_threshold(
            state.options.visibility_distance,
            surface,
            world.culling_oracle(),
        );
        session
            .color_task_mut()
            .set_interval(state.options.color_refresh_interval());
    }

    if state.overlay_shown {
        let size = state.camera.set_size_clamped(state.camera.size, &state.zoom);
        state.requests.push(HostRequest::SetCameraSize(size));
        state.requests.push(HostRequest::RebuildMap);
        if let Some(session) = state.session.as_mut() {
            session.color_task_mut().start();
        }
    }

    state.refresh_zoom_frame();
    surface.set_group_visible(
        MarkerGroup::BranchJunctions,
        state.zoom_frame.branch_junctions_visible,
    );

    if let Some(path) = config_path {
        state.options.save_to_file(path)?;
    }
    Ok(())
}

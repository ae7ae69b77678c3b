//! Handler für hinzugefügte, entfernte und bewegte Entitäten.

use crate::app::host::{MarkerSurface, OverlayWorld};
use crate::app::marker_layout::{car_transform, flare_transform, visual_for_key};
use crate::app::marker_registry::MarkerKey;
use crate::app::OverlayState;

/// Registriert einen Marker für eine neue Entität.
pub fn entity_added(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
    key: MarkerKey,
) {
    let Some(session) = state.session.as_mut() else {
        return;
    };
    let Some(visual) = visual_for_key(key, world, session.classification(), &state.options) else {
        log::debug!("Kein Marker für {:?}", key);
        return;
    };
    session
        .registry_mut()
        .register(key, visual, surface, world.culling_oracle());
}

pub fn entity_removed(state: &mut OverlayState, surface: &mut dyn MarkerSurface, key: MarkerKey) {
    if let Some(session) = state.session.as_mut() {
        session.registry_mut().unregister(key, surface);
    }
}

/// Übernimmt die aktuelle Position aus dem Weltzustand. Entitäten ohne
/// Marker (z.B. Lokomotiven) werden ignoriert.
pub fn entity_moved(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
    key: MarkerKey,
) {
    let Some(session) = state.session.as_mut() else {
        return;
    };
    let transform = match key {
        MarkerKey::Car(id) => world.car(id).map(|car| car_transform(car, &state.options)),
        MarkerKey::Flare(id) => world
            .flare(id)
            .map(|flare| flare_transform(flare, &state.options)),
        // Weichen ändern sich nur über den Topologie-Neuaufbau
        MarkerKey::Switch(_) => None,
    };
    let Some((position, rotation)) = transform else {
        return;
    };
    session.registry_mut().update_position(
        key,
        position,
        rotation,
        surface,
        world.culling_oracle(),
    );
}

//! Handler für Karten-Interaktion: Fackel platzieren, Weiche stellen.

use glam::Vec3;

use crate::app::host::OverlayWorld;
use crate::app::{HostRequest, OverlayState};
use crate::core::{can_throw_switch, AccessLevel, NodeId};

/// Sucht den nächsten Gleispunkt im Fangradius und beauftragt den Host
/// mit dem Platzieren. Nur mit geladener Map und Zeiger über der Karte.
pub fn place_flare(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    point: Vec3,
    pointer_over_map: bool,
) {
    if !pointer_over_map {
        return;
    }
    let Some(session) = state.session.as_ref() else {
        return;
    };
    match session.find_flare_location(world, point, state.options.flare_snap_radius) {
        Some(location) => {
            log::info!(
                "Fackel auf Segment {} bei t={:.3}",
                location.segment_id,
                location.t
            );
            state.requests.push(HostRequest::PlaceFlare(location));
        }
        None => log::debug!("Kein Gleis im Fangradius um {:?}", point),
    }
}

/// Prüft die Zugriffsstufe und beauftragt den Host mit dem Stellen der Weiche.
pub fn throw_switch(
    state: &mut OverlayState,
    world: &dyn OverlayWorld,
    node: NodeId,
    access: AccessLevel,
) -> bool {
    let Some(track_node) = world.graph().node(node).filter(|n| n.is_switch()) else {
        log::debug!("Weiche {} nicht gefunden", node);
        return false;
    };
    if !can_throw_switch(track_node, access) {
        log::warn!(
            "Weiche {} ist CTC-gesteuert, Zugriff {:?} reicht nicht",
            node,
            access
        );
        return false;
    }
    state.requests.push(HostRequest::ThrowSwitch(node));
    true
}

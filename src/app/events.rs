//! OverlayEvent- und HostRequest-Enums für den Event-Datenfluss.

use std::time::Duration;

use glam::Vec3;

use super::marker_registry::MarkerKey;
use crate::core::{AccessLevel, Location, NodeId};
use crate::shared::OverlayOptions;

/// Ereignisse aus dem Host, die der Controller verarbeitet.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEvent {
    /// Map fertig geladen (mehrfaches Senden ist harmlos)
    MapLoaded,
    /// Map wird entladen (auch ohne vorheriges Laden zulässig)
    MapUnloading,
    /// Kartenkamera hat sich bewegt
    CameraMoved { position: Vec3 },
    /// Orthografische Kameragröße hat sich geändert
    ZoomChanged { camera_size: f32 },
    /// Gleisnetz wurde im Host neu aufgebaut
    NetworkTopologyRebuilt { signal_blocks_changed: bool },
    /// Entität erschienen (Wagen, Fackel, Weiche)
    EntityAdded { key: MarkerKey },
    /// Entität verschwunden
    EntityRemoved { key: MarkerKey },
    /// Entität hat sich bewegt; die neue Position steht im Weltzustand
    EntityMoved { key: MarkerKey },
    /// Kartenfenster geöffnet/geschlossen
    OverlayShown { shown: bool, player_camera: Vec3 },
    /// Einstellungen wurden geändert
    SettingsChanged { options: OverlayOptions },
    /// Frame-Tick des Hosts
    Tick { dt: Duration },
    /// Klick auf die Karte zum Platzieren einer Fackel
    PlaceFlareRequested { point: Vec3, pointer_over_map: bool },
    /// Spieler möchte eine Weiche auf der Karte stellen
    SwitchThrowRequested { node: NodeId, access: AccessLevel },
}

/// Aufträge an den Host, die der Overlay nicht selbst ausführen darf.
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    /// Fackel an einem aufgelösten Gleispunkt platzieren
    PlaceFlare(Location),
    /// Karten-Darstellung neu aufbauen
    RebuildMap,
    /// Kameragröße setzen
    SetCameraSize(f32),
    /// Kameraposition setzen
    SetCameraPosition(Vec3),
    /// Weiche umstellen
    ThrowSwitch(NodeId),
}

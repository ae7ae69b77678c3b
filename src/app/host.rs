//! Schnittstellen zum Host: Weltzustand (read-only) und Marker-Oberfläche.
//!
//! Der Overlay besitzt weder Wagen, Fackeln noch den Gleisgraphen. Er liest sie
//! über [`OverlayWorld`] und steuert die visuellen Marker-Handles über
//! [`MarkerSurface`].

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::marker_layout::{IconLayout, MarkerVisual};
use crate::core::{AlwaysVisible, CullingOracle, IndustryTrack, SignalBlock, TrackGraph};

/// ID eines Wagens im Host.
pub type CarId = u64;
/// ID einer Fackel im Host.
pub type FlareId = u64;

/// Wagentyp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarArchetype {
    Locomotive,
    Tender,
    Coach,
    Caboose,
    Boxcar,
    Flatcar,
    Gondola,
    Hopper,
    Tankcar,
    Stockcar,
}

impl CarArchetype {
    pub fn is_locomotive(self) -> bool {
        matches!(self, Self::Locomotive)
    }

    /// Güterwagen, deren Markerfarbe dem Fahrziel folgt.
    pub fn is_freight(self) -> bool {
        matches!(
            self,
            Self::Boxcar | Self::Flatcar | Self::Gondola | Self::Hopper | Self::Tankcar | Self::Stockcar
        )
    }
}

/// Momentaufnahme eines Wagens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarInfo {
    pub id: CarId,
    pub archetype: CarArchetype,
    pub reporting_mark: String,
    pub road_number: String,
    /// Wagenlänge in Metern
    pub length: f32,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Momentaufnahme einer platzierten Fackel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlareInfo {
    pub id: FlareId,
    pub position: Vec3,
    /// Ausrichtung des Gleispunkts, an dem die Fackel liegt
    pub rotation: Quat,
}

/// Fahrziel-Informationen eines Güterwagens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DestinationInfo {
    /// Tag-Farbe des Zielgebiets, `None` wenn kein Gebiet zugeordnet ist
    pub area_color: Option<[f32; 4]>,
    /// Wagen steht bereits am Ziel
    pub at_destination: bool,
}

/// Read-only Sicht auf den Weltzustand des Hosts.
pub trait OverlayWorld {
    fn graph(&self) -> &TrackGraph;

    fn signal_blocks(&self) -> &[SignalBlock];

    fn industries(&self) -> &[IndustryTrack] {
        &[]
    }

    fn cars(&self) -> &[CarInfo];

    fn car(&self, id: CarId) -> Option<&CarInfo> {
        self.cars().iter().find(|car| car.id == id)
    }

    fn flares(&self) -> &[FlareInfo];

    fn flare(&self, id: FlareId) -> Option<&FlareInfo> {
        self.flares().iter().find(|flare| flare.id == id)
    }

    fn destination_info(&self, car: CarId) -> Option<DestinationInfo>;

    /// Frustum-/Occlusion-Culler des Host-Renderers.
    fn culling_oracle(&self) -> &dyn CullingOracle {
        &AlwaysVisible
    }
}

/// Opakes Handle auf einen Marker im Host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerHandle(pub u64);

/// Marker-Gruppen, deren Sichtbarkeit gemeinsam geschaltet wird.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerGroup {
    /// Alle Weichen-Marker (folgt dem Kartenfenster)
    Junctions,
    /// Nebenstrecken-Weichen (folgt dem Zoom-Cutoff)
    BranchJunctions,
}

/// Visuelle Marker-Handles im Host.
///
/// Alle Methoden auf Handles geben `false` zurück, wenn das Handle nicht
/// (mehr) existiert.
pub trait MarkerSurface {
    /// Erstellt einen neuen, inaktiven Marker.
    fn spawn(&mut self, visual: &MarkerVisual) -> MarkerHandle;

    fn despawn(&mut self, handle: MarkerHandle) -> bool;

    fn is_alive(&self, handle: MarkerHandle) -> bool;

    fn set_active(&mut self, handle: MarkerHandle, active: bool) -> bool;

    fn set_transform(&mut self, handle: MarkerHandle, position: Vec3, rotation: Quat) -> bool;

    fn set_layout(&mut self, handle: MarkerHandle, layout: IconLayout) -> bool;

    fn set_color(&mut self, handle: MarkerHandle, color: [f32; 4]) -> bool;

    fn set_group_visible(&mut self, group: MarkerGroup, visible: bool);
}

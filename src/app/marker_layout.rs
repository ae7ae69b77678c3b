//! Aufbau der Marker-Visuals aus Weltdaten und Optionen.
//!
//! Reine Funktionen: Position, Rotation und Icon-Layout für Weichen-, Wagen-
//! und Fackel-Marker.

use glam::{EulerRot, Quat, Vec2, Vec3};

use super::host::{CarArchetype, CarId, CarInfo, FlareId, FlareInfo, OverlayWorld};
use super::marker_registry::MarkerKey;
use crate::core::{ClassificationSet, Hand, NodeId, SwitchGeometry, TrackNode};
use crate::shared::OverlayOptions;

/// Abstand des Weichen-Glyphs vom Marker-Mittelpunkt pro Skalierungseinheit.
const JUNCTION_GLYPH_SPACING: f32 = 40.0;
/// Fester Mindestabstand des Weichen-Glyphs.
const JUNCTION_GLYPH_MARGIN: f32 = 8.0;
/// Wagenlänge, bei der das Wagen-Icon unskaliert ist.
const CAR_ICON_REFERENCE_LENGTH: f32 = 11.0;
/// Neigung der Wagen-Icons (flach auf der Karte).
const CAR_ICON_PITCH_DEG: f32 = -90.0;
/// Neigung der Fackel-Icons.
const FLARE_ICON_PITCH_DEG: f32 = 90.0;

/// Gespiegeltes Weichensymbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionGlyph {
    Left,
    Right,
}

impl JunctionGlyph {
    /// Rechtsweichen zeigen das linke Symbol und umgekehrt.
    pub fn for_hand(hand: Hand) -> Self {
        match hand {
            Hand::Right => Self::Left,
            Hand::Left => Self::Right,
        }
    }

    fn sign(self) -> f32 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }
}

/// Weichen-Gruppe für die zoomabhängige Sichtbarkeit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JunctionGroup {
    Mainline,
    Branch,
}

/// Lokales Layout eines Marker-Icons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconLayout {
    /// Versatz des Icons relativ zum Marker
    pub offset: Vec2,
    pub scale: Vec3,
}

impl Default for IconLayout {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: Vec3::ONE,
        }
    }
}

/// Art eines Markers inklusive Darstellungsdaten.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkerKind {
    Junction {
        node: NodeId,
        glyph: JunctionGlyph,
        group: JunctionGroup,
    },
    Car {
        car: CarId,
        label: String,
        /// Güterwagen werden nach Fahrziel eingefärbt
        freight: bool,
    },
    Flare {
        flare: FlareId,
    },
}

/// Alles, was der Host zum Erzeugen eines Markers braucht.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerVisual {
    pub kind: MarkerKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub layout: IconLayout,
}

/// Glyph-Layout eines Weichen-Markers für eine Marker-Skalierung.
pub fn junction_layout(glyph: JunctionGlyph, marker_scale: f32) -> IconLayout {
    let distance = marker_scale * JUNCTION_GLYPH_SPACING + JUNCTION_GLYPH_MARGIN;
    IconLayout {
        offset: Vec2::new(glyph.sign() * distance, 0.0),
        scale: Vec3::new(2.0 * marker_scale, marker_scale, 2.0 * marker_scale),
    }
}

/// Icon-Layout einer Fackel.
pub fn flare_layout(flare_scale: f32) -> IconLayout {
    IconLayout {
        offset: Vec2::ZERO,
        scale: Vec3::splat(flare_scale),
    }
}

/// Icon-Layout eines Wagens: Länge proportional zur Wagenlänge.
pub fn car_layout(length: f32) -> IconLayout {
    IconLayout {
        offset: Vec2::ZERO,
        scale: Vec3::new(1.0, length / CAR_ICON_REFERENCE_LENGTH, 1.0),
    }
}

/// Behält nur den Gierwinkel einer Rotation und setzt eine feste Neigung.
pub fn yaw_only(rotation: Quat, pitch_deg: f32) -> Quat {
    let (yaw, _, _) = rotation.to_euler(EulerRot::YXZ);
    Quat::from_euler(EulerRot::YXZ, yaw, pitch_deg.to_radians(), 0.0)
}

/// Beschriftung eines Wagen-Markers.
pub fn car_label(car: &CarInfo) -> String {
    if car.archetype == CarArchetype::Tender {
        car.road_number.clone()
    } else {
        format!("{}\n{}", car.reporting_mark, car.road_number)
    }
}

pub fn junction_visual(
    node: &TrackNode,
    geometry: &SwitchGeometry,
    classification: &ClassificationSet,
    options: &OverlayOptions,
) -> MarkerVisual {
    let glyph = JunctionGlyph::for_hand(geometry.hand);
    let group = if classification.is_mainline_switch(node.id) {
        JunctionGroup::Mainline
    } else {
        JunctionGroup::Branch
    };
    MarkerVisual {
        kind: MarkerKind::Junction {
            node: node.id,
            glyph,
            group,
        },
        position: geometry.home + Vec3::Y * options.junction_marker_height,
        rotation: geometry.rotation,
        layout: junction_layout(glyph, options.marker_scale),
    }
}

/// Marker-Transform eines Wagens.
pub fn car_transform(car: &CarInfo, options: &OverlayOptions) -> (Vec3, Quat) {
    (
        car.position + Vec3::Y * options.car_marker_height,
        yaw_only(car.rotation, CAR_ICON_PITCH_DEG),
    )
}

/// Wagen-Marker; Lokomotiven bekommen keinen.
pub fn car_visual(car: &CarInfo, options: &OverlayOptions) -> Option<MarkerVisual> {
    if car.archetype.is_locomotive() {
        return None;
    }
    let (position, rotation) = car_transform(car, options);
    Some(MarkerVisual {
        kind: MarkerKind::Car {
            car: car.id,
            label: car_label(car),
            freight: car.archetype.is_freight(),
        },
        position,
        rotation,
        layout: car_layout(car.length),
    })
}

/// Marker-Transform einer Fackel.
pub fn flare_transform(flare: &FlareInfo, options: &OverlayOptions) -> (Vec3, Quat) {
    (
        flare.position + Vec3::Y * options.flare_marker_height,
        yaw_only(flare.rotation, FLARE_ICON_PITCH_DEG),
    )
}

pub fn flare_visual(flare: &FlareInfo, options: &OverlayOptions) -> MarkerVisual {
    let (position, rotation) = flare_transform(flare, options);
    MarkerVisual {
        kind: MarkerKind::Flare { flare: flare.id },
        position,
        rotation,
        layout: flare_layout(options.flare_scale),
    }
}

/// Neues Layout nach geänderten Optionen; `None` wenn das Layout nicht von
/// den Optionen abhängt.
pub fn relayout(kind: &MarkerKind, options: &OverlayOptions) -> Option<IconLayout> {
    match kind {
        MarkerKind::Junction { glyph, .. } => Some(junction_layout(*glyph, options.marker_scale)),
        MarkerKind::Flare { .. } => Some(flare_layout(options.flare_scale)),
        MarkerKind::Car { .. } => None,
    }
}

/// Visual für einen einzelnen Schlüssel aus dem aktuellen Weltzustand.
pub fn visual_for_key(
    key: MarkerKey,
    world: &dyn OverlayWorld,
    classification: &ClassificationSet,
    options: &OverlayOptions,
) -> Option<MarkerVisual> {
    match key {
        MarkerKey::Switch(id) => {
            let node = world.graph().node(id)?;
            let geometry = node.switch.as_ref()?;
            Some(junction_visual(node, geometry, classification, options))
        }
        MarkerKey::Car(id) => car_visual(world.car(id)?, options),
        MarkerKey::Flare(id) => world.flare(id).map(|flare| flare_visual(flare, options)),
    }
}

/// Sammelt alle Marker der Welt: Weichen, Wagen (ohne Loks), Fackeln.
pub fn collect_visuals(
    world: &dyn OverlayWorld,
    classification: &ClassificationSet,
    options: &OverlayOptions,
) -> Vec<(MarkerKey, MarkerVisual)> {
    let junctions = world.graph().switches().map(|(node, geometry)| {
        (
            MarkerKey::Switch(node.id),
            junction_visual(node, geometry, classification, options),
        )
    });
    let cars = world
        .cars()
        .iter()
        .filter_map(|car| car_visual(car, options).map(|v| (MarkerKey::Car(car.id), v)));
    let flares = world
        .flares()
        .iter()
        .map(|flare| (MarkerKey::Flare(flare.id), flare_visual(flare, options)));

    junctions.chain(cars).chain(flares).collect()
}

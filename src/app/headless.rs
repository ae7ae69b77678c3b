//! In-Memory-Host für Tests, Benchmarks und die Demo-Binary.
//!
//! [`HeadlessSurface`] speichert Marker statt sie zu rendern,
//! [`SnapshotWorld`] ist ein aus JSON ladbarer Weltzustand.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use glam::{Quat, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::host::{
    CarId, CarInfo, DestinationInfo, FlareId, FlareInfo, MarkerGroup, MarkerHandle,
    MarkerSurface, OverlayWorld,
};
use super::marker_layout::{IconLayout, MarkerVisual};
use crate::core::{IndustryTrack, SignalBlock, TrackGraph};

/// Zustand eines Markers im Headless-Host.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessMarker {
    pub visual: MarkerVisual,
    pub active: bool,
    pub color: Option<[f32; 4]>,
}

/// Marker-Oberfläche ohne Rendering.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    markers: IndexMap<MarkerHandle, HeadlessMarker>,
    groups: HashMap<MarkerGroup, bool>,
    next_handle: u64,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Anzahl lebender Marker.
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn marker(&self, handle: MarkerHandle) -> Option<&HeadlessMarker> {
        self.markers.get(&handle)
    }

    pub fn is_active(&self, handle: MarkerHandle) -> bool {
        self.markers.get(&handle).is_some_and(|m| m.active)
    }

    pub fn active_count(&self) -> usize {
        self.markers.values().filter(|m| m.active).count()
    }

    /// Sichtbarkeit einer Gruppe; ungesetzte Gruppen gelten als sichtbar.
    pub fn group_visible(&self, group: MarkerGroup) -> bool {
        self.groups.get(&group).copied().unwrap_or(true)
    }
}

impl MarkerSurface for HeadlessSurface {
    fn spawn(&mut self, visual: &MarkerVisual) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(
            handle,
            HeadlessMarker {
                visual: visual.clone(),
                active: false,
                color: None,
            },
        );
        handle
    }

    fn despawn(&mut self, handle: MarkerHandle) -> bool {
        self.markers.shift_remove(&handle).is_some()
    }

    fn is_alive(&self, handle: MarkerHandle) -> bool {
        self.markers.contains_key(&handle)
    }

    fn set_active(&mut self, handle: MarkerHandle, active: bool) -> bool {
        match self.markers.get_mut(&handle) {
            Some(marker) => {
                marker.active = active;
                true
            }
            None => false,
        }
    }

    fn set_transform(&mut self, handle: MarkerHandle, position: Vec3, rotation: Quat) -> bool {
        match self.markers.get_mut(&handle) {
            Some(marker) => {
                marker.visual.position = position;
                marker.visual.rotation = rotation;
                true
            }
            None => false,
        }
    }

    fn set_layout(&mut self, handle: MarkerHandle, layout: IconLayout) -> bool {
        match self.markers.get_mut(&handle) {
            Some(marker) => {
                marker.visual.layout = layout;
                true
            }
            None => false,
        }
    }

    fn set_color(&mut self, handle: MarkerHandle, color: [f32; 4]) -> bool {
        match self.markers.get_mut(&handle) {
            Some(marker) => {
                marker.color = Some(color);
                true
            }
            None => false,
        }
    }

    fn set_group_visible(&mut self, group: MarkerGroup, visible: bool) {
        self.groups.insert(group, visible);
    }
}

/// Serialisierbarer Weltzustand.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotWorld {
    pub graph: TrackGraph,
    pub signal_blocks: Vec<SignalBlock>,
    pub industries: Vec<IndustryTrack>,
    pub cars: Vec<CarInfo>,
    pub flares: Vec<FlareInfo>,
    pub destinations: HashMap<CarId, DestinationInfo>,
}

impl SnapshotWorld {
    pub fn new(graph: TrackGraph) -> Self {
        Self {
            graph,
            ..Default::default()
        }
    }

    /// Lädt einen Weltzustand aus einer JSON-Datei.
    pub fn load_json(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Szenario nicht lesbar: {}", path.display()))?;
        let world: Self = serde_json::from_str(&content)
            .with_context(|| format!("Szenario fehlerhaft: {}", path.display()))?;
        log::info!(
            "Szenario geladen: {} Segmente, {} Blöcke, {} Wagen, {} Fackeln",
            world.graph.segment_count(),
            world.signal_blocks.len(),
            world.cars.len(),
            world.flares.len()
        );
        Ok(world)
    }

    /// Fügt einen Wagen hinzu oder ersetzt ihn.
    pub fn upsert_car(&mut self, car: CarInfo) {
        match self.cars.iter_mut().find(|c| c.id == car.id) {
            Some(existing) => *existing = car,
            None => self.cars.push(car),
        }
    }

    pub fn remove_car(&mut self, id: CarId) -> Option<CarInfo> {
        let index = self.cars.iter().position(|c| c.id == id)?;
        self.destinations.remove(&id);
        Some(self.cars.remove(index))
    }

    /// Fügt eine Fackel hinzu oder ersetzt sie.
    pub fn upsert_flare(&mut self, flare: FlareInfo) {
        match self.flares.iter_mut().find(|f| f.id == flare.id) {
            Some(existing) => *existing = flare,
            None => self.flares.push(flare),
        }
    }

    pub fn remove_flare(&mut self, id: FlareId) -> Option<FlareInfo> {
        let index = self.flares.iter().position(|f| f.id == id)?;
        Some(self.flares.remove(index))
    }

    /// Ersetzt die Signalblöcke; die Span-Caches starten leer.
    pub fn set_signal_blocks(&mut self, blocks: Vec<SignalBlock>) {
        self.signal_blocks = blocks;
    }

    /// Verwirft alle Span-Caches nach einer Topologie-Änderung.
    pub fn invalidate_spans(&mut self) {
        self.signal_blocks.iter_mut().for_each(SignalBlock::invalidate);
        for industry in &mut self.industries {
            industry.spans.iter_mut().for_each(|span| span.invalidate());
        }
    }
}

impl OverlayWorld for SnapshotWorld {
    fn graph(&self) -> &TrackGraph {
        &self.graph
    }

    fn signal_blocks(&self) -> &[SignalBlock] {
        &self.signal_blocks
    }

    fn industries(&self) -> &[IndustryTrack] {
        &self.industries
    }

    fn cars(&self) -> &[CarInfo] {
        &self.cars
    }

    fn flares(&self) -> &[FlareInfo] {
        &self.flares
    }

    fn destination_info(&self, car: CarId) -> Option<DestinationInfo> {
        self.destinations.get(&car).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::marker_layout::MarkerKind;

    fn visual() -> MarkerVisual {
        MarkerVisual {
            kind: MarkerKind::Flare { flare: 1 },
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            layout: IconLayout::default(),
        }
    }

    #[test]
    fn stale_handles_report_false() {
        let mut surface = HeadlessSurface::new();
        let handle = surface.spawn(&visual());
        assert!(surface.despawn(handle));

        assert!(!surface.set_active(handle, true));
        assert!(!surface.set_color(handle, [1.0; 4]));
        assert!(!surface.despawn(handle));
    }

    #[test]
    fn handles_are_never_reused() {
        let mut surface = HeadlessSurface::new();
        let first = surface.spawn(&visual());
        surface.despawn(first);
        let second = surface.spawn(&visual());
        assert_ne!(first, second);
    }

    #[test]
    fn snapshot_world_parses_partial_json() {
        let json = r#"{
            "cars": [{
                "id": 3, "archetype": "Hopper", "reporting_mark": "NS",
                "road_number": "77", "length": 12.0,
                "position": [1.0, 0.0, 2.0], "rotation": [0.0, 0.0, 0.0, 1.0]
            }],
            "destinations": { "3": { "area_color": null, "at_destination": false } }
        }"#;
        let world: SnapshotWorld = serde_json::from_str(json).expect("gültiges JSON erwartet");

        assert_eq!(world.cars().len(), 1);
        assert_eq!(world.car(3).map(|c| c.road_number.as_str()), Some("77"));
        assert!(world.destination_info(3).is_some_and(|d| !d.at_destination));
        assert_eq!(world.graph().segment_count(), 0);
    }
}

//! Registry aller Map-Marker einer Session.
//!
//! Ordnet jedem Domänen-Schlüssel (Weiche, Wagen, Fackel) genau ein
//! Marker-Handle des Hosts zu. Die Reihenfolge der Einträge entspricht der
//! Registrierungsreihenfolge, und der Index eines Eintrags ist zugleich sein
//! Index im [`VisibilityIndex`].

use glam::{Quat, Vec3};
use indexmap::IndexMap;

use super::host::{CarId, FlareId, MarkerHandle, MarkerSurface};
use super::marker_layout::{relayout, MarkerKind, MarkerVisual};
use crate::core::{BoundingSphere, CullingOracle, NodeId, VisibilityIndex};
use crate::shared::OverlayOptions;

/// Domänen-Schlüssel eines Markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerKey {
    Switch(NodeId),
    Car(CarId),
    Flare(FlareId),
}

/// Ein registrierter Marker.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerEntry {
    pub key: MarkerKey,
    pub handle: MarkerHandle,
    pub kind: MarkerKind,
    /// Zuletzt bekannte Weltposition des Markers
    pub position: Vec3,
    pub rotation: Quat,
    /// Zuletzt an den Host gemeldeter Aktiv-Zustand
    pub active: bool,
}

/// Schlüssel → Marker-Handle, gekoppelt an den Sichtbarkeits-Index.
#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    entries: IndexMap<MarkerKey, MarkerEntry>,
    visibility: VisibilityIndex,
    sphere_radius: f32,
}

impl MarkerRegistry {
    pub fn new(sphere_radius: f32, distance_threshold: Option<f32>) -> Self {
        Self {
            entries: IndexMap::new(),
            visibility: VisibilityIndex::new(distance_threshold),
            sphere_radius,
        }
    }

    /// Registry mit Radius und Sichtdistanz aus den Optionen.
    pub fn from_options(options: &OverlayOptions) -> Self {
        Self::new(options.marker_sphere_radius, options.visibility_distance)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: MarkerKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn handle(&self, key: MarkerKey) -> Option<MarkerHandle> {
        self.entries.get(&key).map(|entry| entry.handle)
    }

    pub fn entry(&self, key: MarkerKey) -> Option<&MarkerEntry> {
        self.entries.get(&key)
    }

    /// Alle Einträge in Registrierungsreihenfolge.
    pub fn entries(&self) -> impl Iterator<Item = &MarkerEntry> {
        self.entries.values()
    }

    /// Einträge, deren Marker aktuell aktiv geschaltet ist.
    pub fn active_entries(&self) -> impl Iterator<Item = &MarkerEntry> {
        self.entries.values().filter(|entry| entry.active)
    }

    pub fn visibility(&self) -> &VisibilityIndex {
        &self.visibility
    }

    fn sphere(&self, position: Vec3) -> BoundingSphere {
        BoundingSphere::new(position, self.sphere_radius)
    }

    /// Registriert einen Marker und gibt sein Handle zurück.
    ///
    /// Ist der Schlüssel bereits registriert, passiert nichts und das
    /// vorhandene Handle wird zurückgegeben.
    pub fn register(
        &mut self,
        key: MarkerKey,
        visual: MarkerVisual,
        surface: &mut dyn MarkerSurface,
        oracle: &dyn CullingOracle,
    ) -> MarkerHandle {
        if let Some(existing) = self.entries.get(&key) {
            log::debug!("Marker {:?} bereits registriert", key);
            return existing.handle;
        }

        let handle = surface.spawn(&visual);
        let sphere = self.sphere(visual.position);
        self.entries.insert(
            key,
            MarkerEntry {
                key,
                handle,
                kind: visual.kind,
                position: visual.position,
                rotation: visual.rotation,
                active: false,
            },
        );
        self.visibility.push(sphere, oracle);
        self.apply_transitions(surface);
        handle
    }

    /// Entfernt einen Marker samt Sichtbarkeits-Eintrag. Unbekannte Schlüssel
    /// sind ein No-op.
    pub fn unregister(&mut self, key: MarkerKey, surface: &mut dyn MarkerSurface) -> bool {
        let Some((index, _, entry)) = self.entries.shift_remove_full(&key) else {
            return false;
        };
        self.visibility.remove(index);
        surface.despawn(entry.handle);
        true
    }

    /// Verschiebt einen vorhandenen Marker. Ohne Eintrag: `false`, keine Wirkung.
    pub fn update_position(
        &mut self,
        key: MarkerKey,
        position: Vec3,
        rotation: Quat,
        surface: &mut dyn MarkerSurface,
        oracle: &dyn CullingOracle,
    ) -> bool {
        let sphere = self.sphere(position);
        let Some((index, _, entry)) = self.entries.get_full_mut(&key) else {
            return false;
        };
        entry.position = position;
        entry.rotation = rotation;
        surface.set_transform(entry.handle, position, rotation);
        self.visibility.update_sphere(index, sphere, oracle);
        self.apply_transitions(surface);
        true
    }

    /// Verwirft alle Handles und baut Registry und Sichtbarkeits-Index aus
    /// den übergebenen Visuals neu auf.
    pub fn rebuild_all(
        &mut self,
        visuals: Vec<(MarkerKey, MarkerVisual)>,
        surface: &mut dyn MarkerSurface,
        oracle: &dyn CullingOracle,
    ) {
        self.despawn_all(surface);

        let mut spheres = Vec::with_capacity(visuals.len());
        for (key, visual) in visuals {
            if self.entries.contains_key(&key) {
                log::warn!("Doppelter Marker-Schlüssel {:?} beim Neuaufbau ignoriert", key);
                continue;
            }
            let handle = surface.spawn(&visual);
            spheres.push(self.sphere(visual.position));
            self.entries.insert(
                key,
                MarkerEntry {
                    key,
                    handle,
                    kind: visual.kind,
                    position: visual.position,
                    rotation: visual.rotation,
                    active: false,
                },
            );
        }

        self.visibility.reset(spheres, oracle);
        let activated = self.apply_transitions(surface);
        log::info!(
            "Marker neu aufgebaut: {} Einträge, {} aktiv",
            self.entries.len(),
            activated
        );
    }

    /// Neuer Kamera-Referenzpunkt; schaltet geänderte Marker um.
    pub fn update_reference_point(
        &mut self,
        position: Vec3,
        surface: &mut dyn MarkerSurface,
        oracle: &dyn CullingOracle,
    ) -> usize {
        self.visibility.update_reference_point(position, oracle);
        self.apply_transitions(surface)
    }

    pub fn set_distance_threshold(
        &mut self,
        threshold: Option<f32>,
        surface: &mut dyn MarkerSurface,
        oracle: &dyn CullingOracle,
    ) -> usize {
        self.visibility.set_distance_threshold(threshold, oracle);
        self.apply_transitions(surface)
    }

    /// Ändert den Radius aller Sichtbarkeits-Kugeln und schaltet betroffene
    /// Marker um. Die Anzahl bleibt gleich, der Sichtbarkeits-Zustand damit
    /// erhalten.
    pub fn set_sphere_radius(
        &mut self,
        radius: f32,
        surface: &mut dyn MarkerSurface,
        oracle: &dyn CullingOracle,
    ) -> usize {
        if radius == self.sphere_radius {
            return 0;
        }
        self.sphere_radius = radius;
        let spheres = self
            .entries
            .values()
            .map(|entry| self.sphere(entry.position))
            .collect();
        self.visibility.rebuild(spheres, oracle);
        self.apply_transitions(surface)
    }

    /// Überträgt Sichtbarkeitswechsel als Aktiv-Zustand auf die Handles.
    ///
    /// Gibt die Anzahl der gemeldeten Übergänge zurück.
    pub fn apply_transitions(&mut self, surface: &mut dyn MarkerSurface) -> usize {
        let transitions = self.visibility.poll();
        for transition in &transitions {
            if let Some((_, entry)) = self.entries.get_index_mut(transition.index) {
                entry.active = transition.became_visible;
                surface.set_active(entry.handle, transition.became_visible);
            }
        }
        transitions.len()
    }

    /// Überträgt geänderte Marker- und Fackel-Skalierung auf alle Handles.
    pub fn relayout(&mut self, options: &OverlayOptions, surface: &mut dyn MarkerSurface) {
        for entry in self.entries.values() {
            if let Some(layout) = relayout(&entry.kind, options) {
                surface.set_layout(entry.handle, layout);
            }
        }
    }

    /// Entfernt alle Marker. Referenzpunkt und Schwelle bleiben erhalten.
    pub fn clear(&mut self, surface: &mut dyn MarkerSurface) {
        self.despawn_all(surface);
        self.visibility.clear();
    }

    fn despawn_all(&mut self, surface: &mut dyn MarkerSurface) {
        for (_, entry) in self.entries.drain(..) {
            surface.despawn(entry.handle);
        }
    }
}

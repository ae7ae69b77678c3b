//! Sichtbarkeits-Index für Map-Marker.
//!
//! Jeder Marker hat eine Bounding-Kugel. Der Index vergleicht sie gegen einen
//! Referenzpunkt (Kamera) und eine optionale Distanzschwelle und fragt für
//! Kandidaten zusätzlich den Culler des Hosts. Gemeldet werden nur Übergänge
//! (unsichtbar ↔ sichtbar) seit dem letzten `poll`.

use std::collections::BTreeSet;

use glam::Vec3;
use kiddo::{KdTree, SquaredEuclidean};

use super::bounds::kd_point;
use super::BoundingSphere;

/// Puffer für die KD-Tree-Vorauswahl (f32 → f64 Rundung).
const CANDIDATE_MARGIN: f64 = 1e-3;

/// Sichtbarkeitsentscheidung des Host-Renderers (Frustum/Occlusion).
pub trait CullingOracle {
    fn is_visible(&self, sphere: &BoundingSphere) -> bool;
}

/// Culler ohne Einschränkung: alles ist sichtbar.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysVisible;

impl CullingOracle for AlwaysVisible {
    fn is_visible(&self, _sphere: &BoundingSphere) -> bool {
        true
    }
}

/// Bounding-Kugel eines Markers mit gespiegeltem Sichtbarkeitszustand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityRecord {
    pub sphere: BoundingSphere,
    pub visible: bool,
}

/// Ein Sichtbarkeitswechsel eines Markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityTransition {
    /// Index des Markers (gleich dem Registry-Index)
    pub index: usize,
    /// `true` = unsichtbar → sichtbar, `false` = sichtbar → unsichtbar
    pub became_visible: bool,
}

/// Sichtbarkeits-Index über alle Marker-Kugeln.
#[derive(Debug, Clone)]
pub struct VisibilityIndex {
    records: Vec<VisibilityRecord>,
    /// Zustand beim letzten `poll`
    reported: Vec<bool>,
    /// Aktuell sichtbare Indizes
    visible_set: BTreeSet<usize>,
    /// Indizes, deren Zustand sich seit dem letzten `poll` geändert haben kann
    dirty: BTreeSet<usize>,
    tree: KdTree<f64, 2>,
    tree_stale: bool,
    max_radius: f32,
    reference: Option<Vec3>,
    /// `None` = unbegrenzte Sichtdistanz
    distance_threshold: Option<f32>,
}

impl VisibilityIndex {
    /// Erstellt einen leeren Index. `None` als Schwelle bedeutet unbegrenzte Sichtweite.
    pub fn new(distance_threshold: Option<f32>) -> Self {
        Self {
            records: Vec::new(),
            reported: Vec::new(),
            visible_set: BTreeSet::new(),
            dirty: BTreeSet::new(),
            tree: (&Vec::<[f64; 2]>::new()).into(),
            tree_stale: false,
            max_radius: 0.0,
            reference: None,
            distance_threshold: distance_threshold.filter(|d| d.is_finite()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[VisibilityRecord] {
        &self.records
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.records.get(index).is_some_and(|r| r.visible)
    }

    pub fn reference_point(&self) -> Option<Vec3> {
        self.reference
    }

    pub fn distance_threshold(&self) -> Option<f32> {
        self.distance_threshold
    }

    /// Ersetzt alle Kugeln.
    ///
    /// Bei gleicher Anzahl bleiben die Zustände erhalten (nur Positionen
    /// ändern sich). Weicht die Anzahl ab, ist der bisherige Zustand
    /// ungültig: alle Marker starten wieder unsichtbar.
    pub fn rebuild(&mut self, spheres: Vec<BoundingSphere>, oracle: &dyn CullingOracle) {
        if spheres.len() == self.records.len() {
            for (record, sphere) in self.records.iter_mut().zip(spheres) {
                record.sphere = sphere;
            }
        } else {
            if !self.records.is_empty() {
                log::warn!(
                    "Sichtbarkeits-Index: Anzahl geändert ({} → {}), Zustand wird zurückgesetzt",
                    self.records.len(),
                    spheres.len()
                );
            }
            self.reset_states(spheres);
        }
        self.tree_stale = true;
        self.evaluate(oracle);
    }

    /// Setzt den Index mit neuen Kugeln vollständig zurück (alle unsichtbar).
    pub fn reset(&mut self, spheres: Vec<BoundingSphere>, oracle: &dyn CullingOracle) {
        self.reset_states(spheres);
        self.tree_stale = true;
        self.evaluate(oracle);
    }

    /// Entfernt alle Kugeln. Referenzpunkt und Schwelle bleiben erhalten.
    pub fn clear(&mut self) {
        self.reset_states(Vec::new());
        self.tree = (&Vec::<[f64; 2]>::new()).into();
        self.tree_stale = false;
    }

    /// Setzt den Referenzpunkt (Kamera) und wertet die Sichtbarkeit neu aus.
    pub fn update_reference_point(&mut self, position: Vec3, oracle: &dyn CullingOracle) {
        self.reference = Some(position);
        self.evaluate(oracle);
    }

    /// Ändert die Distanzschwelle und wertet neu aus.
    pub fn set_distance_threshold(&mut self, threshold: Option<f32>, oracle: &dyn CullingOracle) {
        self.distance_threshold = threshold.filter(|d| d.is_finite());
        self.evaluate(oracle);
    }

    /// Hängt eine Kugel an und gibt ihren Index zurück.
    pub fn push(&mut self, sphere: BoundingSphere, oracle: &dyn CullingOracle) -> usize {
        let index = self.records.len();
        self.records.push(VisibilityRecord {
            sphere,
            visible: false,
        });
        self.reported.push(false);
        self.max_radius = self.max_radius.max(sphere.radius);
        self.tree_stale = true;
        self.refresh_one(index, oracle);
        index
    }

    /// Entfernt die Kugel an `index`; nachfolgende Indizes rücken auf.
    pub fn remove(&mut self, index: usize) -> Option<VisibilityRecord> {
        if index >= self.records.len() {
            return None;
        }
        let record = self.records.remove(index);
        self.reported.remove(index);

        let shift = |set: &BTreeSet<usize>| -> BTreeSet<usize> {
            set.iter()
                .filter(|i| **i != index)
                .map(|i| if *i > index { i - 1 } else { *i })
                .collect()
        };
        self.visible_set = shift(&self.visible_set);
        self.dirty = shift(&self.dirty);
        self.tree_stale = true;
        Some(record)
    }

    /// Aktualisiert die Kugel eines einzelnen Markers.
    pub fn update_sphere(
        &mut self,
        index: usize,
        sphere: BoundingSphere,
        oracle: &dyn CullingOracle,
    ) -> bool {
        let Some(record) = self.records.get_mut(index) else {
            return false;
        };
        record.sphere = sphere;
        self.max_radius = self.max_radius.max(sphere.radius);
        self.tree_stale = true;
        self.refresh_one(index, oracle);
        true
    }

    /// Liefert alle Übergänge seit dem letzten Aufruf, aufsteigend nach Index.
    ///
    /// Ein Marker, der zwischen zwei Polls hin und zurück wechselt, wird nicht
    /// gemeldet.
    pub fn poll(&mut self) -> Vec<VisibilityTransition> {
        let dirty = std::mem::take(&mut self.dirty);
        let mut transitions = Vec::new();
        for index in dirty {
            let (Some(record), Some(reported)) =
                (self.records.get(index), self.reported.get_mut(index))
            else {
                continue;
            };
            if record.visible != *reported {
                *reported = record.visible;
                transitions.push(VisibilityTransition {
                    index,
                    became_visible: record.visible,
                });
            }
        }
        transitions
    }

    fn reset_states(&mut self, spheres: Vec<BoundingSphere>) {
        self.max_radius = spheres.iter().map(|s| s.radius).fold(0.0, f32::max);
        self.reported = vec![false; spheres.len()];
        self.records = spheres
            .into_iter()
            .map(|sphere| VisibilityRecord {
                sphere,
                visible: false,
            })
            .collect();
        self.visible_set.clear();
        self.dirty.clear();
    }

    fn rebuild_tree_if_stale(&mut self) {
        if !self.tree_stale {
            return;
        }
        let entries: Vec<[f64; 2]> = self
            .records
            .iter()
            .map(|r| kd_point(r.sphere.center))
            .collect();
        self.tree = (&entries).into();
        self.max_radius = self
            .records
            .iter()
            .map(|r| r.sphere.radius)
            .fold(0.0, f32::max);
        self.tree_stale = false;
    }

    fn passes(&self, sphere: &BoundingSphere, oracle: &dyn CullingOracle) -> bool {
        let in_range = match (self.distance_threshold, self.reference) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(threshold), Some(reference)) => sphere.distance_to(reference) <= threshold,
        };
        in_range && oracle.is_visible(sphere)
    }

    fn set_visible(&mut self, index: usize, visible: bool) {
        let Some(record) = self.records.get_mut(index) else {
            return;
        };
        if record.visible == visible {
            return;
        }
        record.visible = visible;
        if visible {
            self.visible_set.insert(index);
        } else {
            self.visible_set.remove(&index);
        }
        self.dirty.insert(index);
    }

    fn refresh_one(&mut self, index: usize, oracle: &dyn CullingOracle) {
        let Some(sphere) = self.records.get(index).map(|r| r.sphere) else {
            return;
        };
        let visible = self.passes(&sphere, oracle);
        self.set_visible(index, visible);
    }

    /// Wertet alle Kandidaten neu aus. Bei begrenzter Schwelle liefert der
    /// KD-Tree nur Kugeln in Reichweite; alle übrigen zuvor sichtbaren werden
    /// unsichtbar.
    fn evaluate(&mut self, oracle: &dyn CullingOracle) {
        let candidates: Vec<usize> = match (self.distance_threshold, self.reference) {
            (None, _) => (0..self.records.len()).collect(),
            (Some(_), None) => Vec::new(),
            (Some(threshold), Some(reference)) => {
                self.rebuild_tree_if_stale();
                let search = threshold as f64 + self.max_radius as f64 + CANDIDATE_MARGIN;
                self.tree
                    .within::<SquaredEuclidean>(&kd_point(reference), search * search)
                    .into_iter()
                    .map(|entry| entry.item as usize)
                    .collect()
            }
        };

        let now_visible: BTreeSet<usize> = candidates
            .into_iter()
            .filter(|index| {
                self.records
                    .get(*index)
                    .is_some_and(|r| self.passes(&r.sphere, oracle))
            })
            .collect();

        let hidden: Vec<usize> = self.visible_set.difference(&now_visible).copied().collect();
        let shown: Vec<usize> = now_visible.difference(&self.visible_set).copied().collect();
        for index in hidden {
            self.set_visible(index, false);
        }
        for index in shown {
            self.set_visible(index, true);
        }
    }
}

impl Default for VisibilityIndex {
    fn default() -> Self {
        Self::new(None)
    }
}

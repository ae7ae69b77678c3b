//! Auflösung eines beliebigen Weltpunkts auf den nächsten Gleispunkt.
//!
//! Wird nur bei expliziter Benutzerinteraktion aufgerufen (z.B. Fackel
//! platzieren). Ein KD-Tree über den Segment-Bounding-Kugeln filtert die
//! Kandidaten vor; das Ergebnis ist identisch mit einem vollständigen Scan.

use glam::Vec3;
use kiddo::{KdTree, SquaredEuclidean};

use super::bounds::kd_point;
use super::{GraphRevision, SegmentId, TrackGraph, TrackSegment};

/// Zusätzlicher Puffer für die KD-Tree-Vorauswahl (f32 → f64 Rundung).
const CANDIDATE_MARGIN: f64 = 1e-3;

/// Ein aufgelöster Punkt auf dem Gleisnetz.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub segment_id: SegmentId,
    /// Parameter entlang des Segments (0 = Endpunkt A, 1 = Endpunkt B)
    pub t: f32,
    /// `false`, wenn der Parameter außerhalb des Segments liegt
    pub valid: bool,
    /// Weltposition des Punkts
    pub position: Vec3,
}

impl Location {
    /// Erzeugt eine Location aus Segment und Parameter.
    /// `None`, wenn das Segment fehlt oder keine Geometrie hat.
    pub fn on_segment(graph: &TrackGraph, segment_id: SegmentId, t: f32) -> Option<Self> {
        let segment = graph.segment(segment_id)?;
        let position = segment.curve.point_at(t)?;
        Some(Self {
            segment_id,
            t,
            valid: (0.0..=1.0).contains(&t),
            position,
        })
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn distance_to(&self, point: Vec3) -> f32 {
        self.position.distance(point)
    }
}

/// Projiziert `point` auf ein Segment und prüft Radius und Parameterbereich.
fn locate_on_segment(segment: &TrackSegment, point: Vec3, radius: f32) -> Option<(f32, Location)> {
    let projection = segment.curve.project(point)?;
    if !projection.in_domain() {
        return None;
    }

    let distance = projection.point.distance(point);
    if distance > radius {
        return None;
    }

    Some((
        distance,
        Location {
            segment_id: segment.id,
            t: projection.t,
            valid: true,
            position: projection.point,
        },
    ))
}

/// Nächster-Punkt-Abfrage über alle Segmente eines Gleisgraphen.
#[derive(Debug, Clone)]
pub struct LocationResolver {
    tree: KdTree<f64, 2>,
    /// Segment-IDs in Iterationsreihenfolge des Graphen (= KD-Tree-Item)
    segment_ids: Vec<SegmentId>,
    /// Größter Bounding-Radius aller Segmente
    max_radius: f32,
    /// Stand des Graphen beim Aufbau
    revision: Option<GraphRevision>,
}

impl LocationResolver {
    /// Leerer Resolver ohne Segmente.
    pub fn empty() -> Self {
        Self {
            tree: (&Vec::<[f64; 2]>::new()).into(),
            segment_ids: Vec::new(),
            max_radius: 0.0,
            revision: None,
        }
    }

    /// Baut den Kandidaten-Index über alle Segmente des Graphen.
    pub fn from_graph(graph: &TrackGraph) -> Self {
        let mut segment_ids = Vec::with_capacity(graph.segment_count());
        let mut entries = Vec::with_capacity(graph.segment_count());
        let mut max_radius = 0.0_f32;

        for segment in graph.segments() {
            let bounds = segment.curve.bounds();
            max_radius = max_radius.max(bounds.radius);
            segment_ids.push(segment.id);
            entries.push(kd_point(bounds.center));
        }

        Self {
            tree: (&entries).into(),
            segment_ids,
            max_radius,
            revision: Some(graph.revision()),
        }
    }

    pub fn len(&self) -> usize {
        self.segment_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segment_ids.is_empty()
    }

    /// Findet den nächsten gültigen Gleispunkt innerhalb von `radius`.
    ///
    /// Bei gleicher Distanz gewinnt das Segment, das in der Iterationsreihenfolge
    /// des Graphen zuerst kommt. Nicht-positive Radien liefern `None`.
    pub fn find_nearest(&self, graph: &TrackGraph, point: Vec3, radius: f32) -> Option<Location> {
        if !(radius > 0.0) {
            log::debug!("find_nearest: ungültiger Suchradius {radius}");
            return None;
        }
        if !radius.is_finite() || self.revision != Some(graph.revision()) {
            if radius.is_finite() && self.revision.is_some() {
                log::warn!(
                    "Location-Index veraltet ({} indexiert, {} im Graphen), nutze vollständigen Scan",
                    self.segment_ids.len(),
                    graph.segment_count()
                );
            }
            return Self::find_nearest_linear(graph, point, radius);
        }

        let search = radius as f64 + self.max_radius as f64 + CANDIDATE_MARGIN;
        let mut candidates: Vec<usize> = self
            .tree
            .within::<SquaredEuclidean>(&kd_point(point), search * search)
            .into_iter()
            .map(|entry| entry.item as usize)
            .collect();
        // Iterationsreihenfolge wiederherstellen (Tie-Break)
        candidates.sort_unstable();

        let mut best: Option<(f32, Location)> = None;
        for index in candidates {
            let Some(segment) = self
                .segment_ids
                .get(index)
                .and_then(|id| graph.segment(*id))
            else {
                continue;
            };
            if let Some((distance, location)) = locate_on_segment(segment, point, radius) {
                if best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, location));
                }
            }
        }

        best.map(|(_, location)| location)
    }

    /// Vollständiger Scan über alle Segmente (Referenz-Semantik).
    pub fn find_nearest_linear(graph: &TrackGraph, point: Vec3, radius: f32) -> Option<Location> {
        if !(radius > 0.0) {
            return None;
        }

        let mut best: Option<(f32, Location)> = None;
        for segment in graph.segments() {
            if let Some((distance, location)) = locate_on_segment(segment, point, radius) {
                if best.is_none_or(|(d, _)| distance < d) {
                    best = Some((distance, location));
                }
            }
        }
        best.map(|(_, location)| location)
    }
}

impl Default for LocationResolver {
    fn default() -> Self {
        Self::empty()
    }
}

//! Snapshot des Gleisnetzes: Nodes, Segmente und Weichengeometrie.
//!
//! Das eigentliche Gleisnetz gehört der Host-Simulation. Der Overlay hält nur
//! eine read-only Kopie mit IDs, Positionen und abgetasteter Kurvengeometrie.

use std::sync::atomic::{AtomicU64, Ordering};

use glam::{Quat, Vec3};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::BoundingSphere;

/// ID eines Gleissegments.
pub type SegmentId = u64;
/// ID eines Gleis-Nodes (Segment-Endpunkt oder Weiche).
pub type NodeId = u64;

/// Klassifizierung eines Gleissegments für die Einfärbung.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackClass {
    /// Hauptstrecke (liegt in einem Signalblock)
    Mainline,
    /// Nebenstrecke (alles ohne Signalblock)
    Branch,
    /// Industriegleis
    Industrial,
}

/// Händigkeit einer Weiche.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

/// Geometrie einer Weiche.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwitchGeometry {
    /// Herzstück-Position der Weiche
    pub home: Vec3,
    /// Ausrichtung am ersten Punkt der A-Schiene
    pub rotation: Quat,
    /// Abzweigrichtung
    pub hand: Hand,
}

/// Ein Gleis-Node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackNode {
    pub id: NodeId,
    pub position: Vec3,
    /// Gesetzt, wenn der Node eine Weiche ist
    #[serde(default)]
    pub switch: Option<SwitchGeometry>,
    /// Weiche wird vom Fahrdienstleiter (CTC) gestellt
    #[serde(default)]
    pub ctc_controlled: bool,
}

impl TrackNode {
    /// Erstellt einen einfachen Node ohne Weichengeometrie.
    pub fn new(id: NodeId, position: Vec3) -> Self {
        Self {
            id,
            position,
            switch: None,
            ctc_controlled: false,
        }
    }

    /// Erstellt einen Weichen-Node.
    pub fn switch(id: NodeId, geometry: SwitchGeometry) -> Self {
        Self {
            id,
            position: geometry.home,
            switch: Some(geometry),
            ctc_controlled: false,
        }
    }

    /// Gibt `true` zurück, wenn der Node eine Weiche ist.
    pub fn is_switch(&self) -> bool {
        self.switch.is_some()
    }
}

/// Ergebnis einer Punktprojektion auf eine Kurve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveProjection {
    /// Parameter entlang der Kurve; außerhalb von [0, 1] liegt der Punkt
    /// auf der Verlängerung über die Endpunkte hinaus
    pub t: f32,
    /// Projizierter Punkt
    pub point: Vec3,
}

impl CurveProjection {
    /// Gibt `true` zurück, wenn der Parameter im gültigen Bereich liegt.
    pub fn in_domain(&self) -> bool {
        (0.0..=1.0).contains(&self.t)
    }
}

/// Abgetastete Gleiskurve als Polylinie.
///
/// Der Overlay kennt die echte Kurvenform nicht, nur diese Abtastpunkte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Vec3>,
}

impl Polyline {
    /// Erstellt eine Polylinie. Weniger als zwei Punkte ergeben eine leere Kurve.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self { points }
    }

    /// Gerade Strecke zwischen zwei Punkten.
    pub fn straight(start: Vec3, end: Vec3) -> Self {
        Self::new(vec![start, end])
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Gesamtlänge der Polylinie.
    pub fn length(&self) -> f32 {
        self.points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .sum()
    }

    /// Punkt beim Parameter `t` (Bogenlänge, auf [0, 1] geklemmt).
    pub fn point_at(&self, t: f32) -> Option<Vec3> {
        let first = *self.points.first()?;
        let length = self.length();
        if length <= f32::EPSILON {
            return Some(first);
        }

        let mut remaining = t.clamp(0.0, 1.0) * length;
        for pair in self.points.windows(2) {
            let piece = pair[0].distance(pair[1]);
            if remaining <= piece {
                let local = if piece > 0.0 { remaining / piece } else { 0.0 };
                return Some(pair[0].lerp(pair[1], local));
            }
            remaining -= piece;
        }
        self.points.last().copied()
    }

    /// Projiziert einen Punkt auf die Kurve.
    ///
    /// Gesucht wird der nächste Punkt auf der echten (geklemmten) Kurve. Nur
    /// wenn das ein Endpunkt ist und der Punkt über das Endstück hinaus
    /// projiziert, wird entlang der Endtangente verlängert: `t < 0` bzw.
    /// `t > 1` meldet dann, dass der nächste Punkt außerhalb des Segments liegt.
    pub fn project(&self, point: Vec3) -> Option<CurveProjection> {
        let total = self.length();
        let piece_count = self.points.len().checked_sub(1)?;
        if piece_count == 0 || total <= f32::EPSILON {
            let only = *self.points.first()?;
            return Some(CurveProjection { t: 0.0, point: only });
        }

        // (Distanz², Stück-Index, ungeklemmter Parameter, geklemmter Parameter, Startlänge)
        let mut best: Option<(f32, usize, f32, f32, f32)> = None;
        let mut walked = 0.0;
        for (index, pair) in self.points.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let dir = end - start;
            let piece = dir.length();
            if piece <= f32::EPSILON {
                continue;
            }

            let raw = (point - start).dot(dir) / (piece * piece);
            let local = raw.clamp(0.0, 1.0);
            let distance_sq = (start + dir * local).distance_squared(point);
            if best.is_none_or(|(d, ..)| distance_sq < d) {
                best = Some((distance_sq, index, raw, local, walked));
            }
            walked += piece;
        }

        let (_, index, raw, mut local, walked) = best?;
        let before_start = index == 0 && raw < 0.0;
        let past_end = index + 1 == piece_count && raw > 1.0;
        if before_start || past_end {
            local = raw;
        }

        let start = self.points[index];
        let dir = self.points[index + 1] - start;
        Some(CurveProjection {
            t: (walked + local * dir.length()) / total,
            point: start + dir * local,
        })
    }

    /// Umschließende Kugel aller Abtastpunkte.
    pub fn bounds(&self) -> BoundingSphere {
        BoundingSphere::enclosing(&self.points)
    }
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Stand eines Gleisgraphen.
///
/// Jede Änderung am Graphen vergibt einen neuen, prozessweit eindeutigen
/// Stand. Zwischenspeicher, die gegen einen Graphen aufgelöst wurden, sind
/// nur gültig, solange der Stand übereinstimmt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphRevision(u64);

impl GraphRevision {
    fn next() -> Self {
        Self(NEXT_REVISION.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for GraphRevision {
    fn default() -> Self {
        Self::next()
    }
}

/// Ein Gleissegment zwischen zwei Nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub id: SegmentId,
    /// Endpunkt A
    pub a: NodeId,
    /// Endpunkt B
    pub b: NodeId,
    pub curve: Polyline,
}

impl TrackSegment {
    pub fn new(id: SegmentId, a: NodeId, b: NodeId, curve: Polyline) -> Self {
        Self { id, a, b, curve }
    }
}

/// Read-only Snapshot des Gleisgraphen.
///
/// Die Iterationsreihenfolge der Segmente ist die Einfügereihenfolge und
/// damit deterministisch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrackGraph {
    nodes: IndexMap<NodeId, TrackNode>,
    segments: IndexMap<SegmentId, TrackSegment>,
    #[serde(skip)]
    revision: GraphRevision,
}

impl TrackGraph {
    /// Erstellt einen leeren Graphen.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fügt einen Node hinzu oder ersetzt ihn.
    pub fn add_node(&mut self, node: TrackNode) {
        self.nodes.insert(node.id, node);
        self.revision = GraphRevision::next();
    }

    /// Fügt ein Segment hinzu oder ersetzt es.
    pub fn add_segment(&mut self, segment: TrackSegment) {
        self.segments.insert(segment.id, segment);
        self.revision = GraphRevision::next();
    }

    /// Entfernt ein Segment; die Reihenfolge der übrigen bleibt erhalten.
    pub fn remove_segment(&mut self, id: SegmentId) -> Option<TrackSegment> {
        let removed = self.segments.shift_remove(&id)?;
        self.revision = GraphRevision::next();
        Some(removed)
    }

    /// Aktueller Stand; ändert sich bei jeder Mutation.
    pub fn revision(&self) -> GraphRevision {
        self.revision
    }

    /// Fügt ein gerades Segment zwischen zwei vorhandenen Nodes hinzu.
    pub fn connect(&mut self, id: SegmentId, a: NodeId, b: NodeId) -> bool {
        let (Some(start), Some(end)) = (self.nodes.get(&a), self.nodes.get(&b)) else {
            return false;
        };
        let curve = Polyline::straight(start.position, end.position);
        self.add_segment(TrackSegment::new(id, a, b, curve));
        true
    }

    pub fn node(&self, id: NodeId) -> Option<&TrackNode> {
        self.nodes.get(&id)
    }

    pub fn segment(&self, id: SegmentId) -> Option<&TrackSegment> {
        self.segments.get(&id)
    }

    /// Alle Segmente in Einfügereihenfolge.
    pub fn segments(&self) -> impl Iterator<Item = &TrackSegment> {
        self.segments.values()
    }

    /// Alle Nodes in Einfügereihenfolge.
    pub fn nodes(&self) -> impl Iterator<Item = &TrackNode> {
        self.nodes.values()
    }

    /// Alle Weichen-Nodes mit ihrer Geometrie.
    pub fn switches(&self) -> impl Iterator<Item = (&TrackNode, &SwitchGeometry)> {
        self.nodes
            .values()
            .filter_map(|node| node.switch.as_ref().map(|geo| (node, geo)))
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

//! Einteilung des Gleisnetzes in Haupt- und Nebenstrecke.
//!
//! "Hauptstrecke" ist rein über die Mitgliedschaft in einem Signalblock
//! definiert, nicht über die Topologie. Eine einfache Mengen-Vereinigung über
//! alle Spans aller Blöcke genügt; alles Übrige ist Nebenstrecke.

use std::collections::HashSet;

use super::{IndustryTrack, NodeId, SegmentId, SignalBlock, TrackClass, TrackGraph};

/// Ergebnis der Klassifizierung für eine geladene Map.
///
/// Wird bei jeder Topologie-Änderung komplett neu berechnet, nie inkrementell
/// gepatcht.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassificationSet {
    mainline_segments: HashSet<SegmentId>,
    mainline_switches: HashSet<NodeId>,
    industrial_segments: HashSet<SegmentId>,
}

impl ClassificationSet {
    /// Leere Klassifizierung: alles ist Nebenstrecke.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_mainline_segment(&self, id: SegmentId) -> bool {
        self.mainline_segments.contains(&id)
    }

    /// Gibt `true` zurück, wenn der Node Endpunkt eines Hauptstrecken-Segments ist.
    pub fn is_mainline_switch(&self, id: NodeId) -> bool {
        self.mainline_switches.contains(&id)
    }

    pub fn is_industrial_segment(&self, id: SegmentId) -> bool {
        self.industrial_segments.contains(&id)
    }

    /// Endgültige Klasse eines Segments. Industrie überschreibt Haupt-/Nebenstrecke.
    pub fn class_of(&self, id: SegmentId) -> TrackClass {
        if self.industrial_segments.contains(&id) {
            TrackClass::Industrial
        } else if self.mainline_segments.contains(&id) {
            TrackClass::Mainline
        } else {
            TrackClass::Branch
        }
    }

    pub fn mainline_segments(&self) -> &HashSet<SegmentId> {
        &self.mainline_segments
    }

    pub fn mainline_switches(&self) -> &HashSet<NodeId> {
        &self.mainline_switches
    }

    pub fn industrial_segments(&self) -> &HashSet<SegmentId> {
        &self.industrial_segments
    }

    /// Markiert die Gleise aller Industrien (außer Fortschritts-Industrien) als Industriegleis.
    pub fn mark_industrial(&mut self, graph: &TrackGraph, industries: &[IndustryTrack]) {
        for industry in industries.iter().filter(|i| !i.progression) {
            for span in &industry.spans {
                for seg in span.update_cached_segments_if_needed(graph).iter() {
                    self.industrial_segments.insert(seg.id);
                }
            }
        }
    }
}

/// Berechnet die Haupt-/Nebenstrecken-Einteilung.
pub struct TrackClassifier;

impl TrackClassifier {
    /// Klassifiziert alle Segmente und Weichen über die Signalblock-Spans.
    ///
    /// Idempotent: zwei Aufrufe mit denselben Blöcken liefern identische Mengen.
    pub fn classify(graph: &TrackGraph, blocks: &[SignalBlock]) -> ClassificationSet {
        let mut set = ClassificationSet::empty();
        for span in blocks.iter().flat_map(|block| block.spans.iter()) {
            for seg in span.update_cached_segments_if_needed(graph).iter() {
                set.mainline_segments.insert(seg.id);
                set.mainline_switches.insert(seg.a);
                set.mainline_switches.insert(seg.b);
            }
        }

        log::debug!(
            "Klassifizierung: {} Blöcke, {} Hauptstrecken-Segmente, {} Hauptstrecken-Nodes",
            blocks.len(),
            set.mainline_segments.len(),
            set.mainline_switches.len()
        );
        set
    }

    /// Klassifiziert Signalblöcke und markiert anschließend Industriegleise.
    pub fn classify_with_industries(
        graph: &TrackGraph,
        blocks: &[SignalBlock],
        industries: &[IndustryTrack],
    ) -> ClassificationSet {
        let mut set = Self::classify(graph, blocks);
        set.mark_industrial(graph, industries);
        set
    }
}

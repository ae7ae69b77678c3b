//! Signalblöcke, Industriegleise und ihre Gleisabschnitte (Spans).

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{GraphRevision, NodeId, SegmentId, TrackGraph};

/// Ein aufgelöstes Segment eines Spans inklusive Endpunkten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanSegment {
    pub id: SegmentId,
    pub a: NodeId,
    pub b: NodeId,
}

/// Zusammenhängender Gleisabschnitt innerhalb eines Blocks.
///
/// Die abgedeckten Segmente werden lazy gegen den Gleisgraphen aufgelöst und
/// zusammen mit dessen [`GraphRevision`] zwischengespeichert. Vor dem Lesen
/// muss der Cache über [`BlockSpan::update_cached_segments_if_needed`]
/// erzwungen werden; ein veralteter Stand wird dabei neu aufgelöst.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockSpan {
    /// Segment-IDs in Fahrtrichtung
    route: Vec<SegmentId>,
    #[serde(skip)]
    cached: RefCell<Option<(GraphRevision, Rc<[SpanSegment]>)>>,
}

impl BlockSpan {
    pub fn new(route: Vec<SegmentId>) -> Self {
        Self {
            route,
            cached: RefCell::new(None),
        }
    }

    /// Segment-IDs des Spans (ungeprüft).
    pub fn route(&self) -> &[SegmentId] {
        &self.route
    }

    /// Löst die Route gegen den Graphen auf, falls der Cache leer ist oder zu
    /// einem anderen Stand des Graphen gehört.
    ///
    /// Segmente, die im Graphen nicht (mehr) existieren, werden ausgelassen.
    pub fn update_cached_segments_if_needed(&self, graph: &TrackGraph) -> Rc<[SpanSegment]> {
        let revision = graph.revision();
        if let Some((cached_revision, segments)) = self.cached.borrow().as_ref() {
            if *cached_revision == revision {
                return Rc::clone(segments);
            }
        }

        let segments: Rc<[SpanSegment]> = self
            .route
            .iter()
            .filter_map(|id| graph.segment(*id))
            .map(|seg| SpanSegment {
                id: seg.id,
                a: seg.a,
                b: seg.b,
            })
            .collect();
        *self.cached.borrow_mut() = Some((revision, Rc::clone(&segments)));
        segments
    }

    /// Aufgelöste Segmente, `None` solange der Cache nicht erzwungen wurde.
    pub fn cached_segments(&self) -> Option<Rc<[SpanSegment]>> {
        self.cached
            .borrow()
            .as_ref()
            .map(|(_, segments)| Rc::clone(segments))
    }

    /// Verwirft den Cache.
    pub fn invalidate(&mut self) {
        self.cached.get_mut().take();
    }
}

/// Signalblock (CTC) mit geordneten Spans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignalBlock {
    pub id: String,
    pub spans: Vec<BlockSpan>,
}

impl SignalBlock {
    pub fn new(id: impl Into<String>, spans: Vec<BlockSpan>) -> Self {
        Self {
            id: id.into(),
            spans,
        }
    }

    /// Verwirft die Caches aller Spans.
    pub fn invalidate(&mut self) {
        self.spans.iter_mut().for_each(BlockSpan::invalidate);
    }
}

/// Gleisanlage einer Industrie.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndustryTrack {
    pub id: String,
    /// Fortschritts-Industrien (Bauprojekte) färben ihre Gleise nicht um
    #[serde(default)]
    pub progression: bool,
    pub spans: Vec<BlockSpan>,
}

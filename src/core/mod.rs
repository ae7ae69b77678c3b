//! Core-Domänentypen: Gleisgraph, Klassifizierung, Location-Resolver,
//! Zoom-Umrechnung und Sichtbarkeits-Index.

pub mod access;
pub mod bounds;
pub mod camera;
pub mod classification;
pub mod location;
pub mod signal;
pub mod track;
pub mod visibility;
pub mod zoom;

pub use access::{can_throw_switch, AccessLevel};
pub use bounds::BoundingSphere;
pub use camera::MapCamera;
pub use classification::{ClassificationSet, TrackClassifier};
pub use location::{Location, LocationResolver};
pub use signal::{BlockSpan, IndustryTrack, SignalBlock, SpanSegment};
pub use track::{
    CurveProjection, GraphRevision, Hand, NodeId, Polyline, SegmentId, SwitchGeometry, TrackClass,
    TrackGraph, TrackNode, TrackSegment,
};
pub use visibility::{
    AlwaysVisible, CullingOracle, VisibilityIndex, VisibilityRecord, VisibilityTransition,
};
pub use zoom::{ZoomBounds, ZoomMapper};

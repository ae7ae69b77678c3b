//! Rail Map Overlay Library.
//! Kern des Karten-Overlays als Library exportiert für Tests und Host-Integrationen.

pub mod app;
pub mod core;
pub mod shared;

pub use app::{
    HeadlessSurface, HostRequest, MapSession, MarkerKey, MarkerRegistry, MarkerSurface,
    OverlayController, OverlayEvent, OverlayState, OverlayWorld, SnapshotWorld,
};
pub use core::{
    ClassificationSet, Location, LocationResolver, TrackClassifier, TrackGraph, VisibilityIndex,
    ZoomBounds, ZoomMapper,
};
pub use shared::{ConfigError, OverlayOptions, TrackStyle, ZoomFrame};

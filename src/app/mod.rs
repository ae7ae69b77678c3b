//! Application-Layer: Controller, State, Events, Session und Marker-Registry.

pub mod color_refresh;
pub mod controller;
pub mod event_log;
pub mod events;
pub mod handlers;
pub mod headless;
pub mod host;
pub mod marker_layout;
pub mod marker_registry;
pub mod session;
pub mod state;

pub use color_refresh::{freight_color, RecurringTask};
pub use controller::OverlayController;
pub use event_log::EventLog;
pub use events::{HostRequest, OverlayEvent};
pub use headless::{HeadlessSurface, SnapshotWorld};
pub use host::{
    CarArchetype, CarId, CarInfo, DestinationInfo, FlareId, FlareInfo, MarkerGroup, MarkerHandle,
    MarkerSurface, OverlayWorld,
};
pub use marker_layout::{IconLayout, JunctionGlyph, JunctionGroup, MarkerKind, MarkerVisual};
pub use marker_registry::{MarkerEntry, MarkerKey, MarkerRegistry};
pub use session::MapSession;
pub use state::OverlayState;

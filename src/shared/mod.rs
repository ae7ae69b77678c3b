//! Geteilte Typen für layer-übergreifende Verträge.
//!
//! Enthält die Optionen und die Ausgaben an den Render-Hook des Hosts,
//! die sowohl `app` als auch Host-Integrationen verwenden.

pub mod options;
mod render_hooks;

pub use options::{ConfigError, OverlayOptions};
pub use options::{FLARE_SNAP_RADIUS, ZOOM_MAX, ZOOM_MIN};
pub use render_hooks::{TrackStyle, ZoomFrame};

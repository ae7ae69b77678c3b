//! Feature-Handler für die OverlayEvent-Verarbeitung.
//!
//! Jeder Handler gruppiert die Event-Ausführung eines Feature-Bereichs.
//! Der Controller dispatcht an die passende Handler-Funktion.

pub mod entities;
pub mod interaction;
pub mod lifecycle;
pub mod view;

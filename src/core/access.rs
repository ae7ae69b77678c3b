//! Zugriffsprüfung für Weichenstellanfragen.

use serde::{Deserialize, Serialize};

use super::TrackNode;

/// Zugriffsstufe eines Spielers, aufsteigend geordnet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AccessLevel {
    Spectator,
    Passenger,
    Crew,
    Dispatcher,
    Officer,
}

/// Darf ein Spieler mit `level` diese Weiche stellen?
///
/// CTC-gesteuerte Weichen sind dem Fahrdienstleiter vorbehalten.
pub fn can_throw_switch(node: &TrackNode, level: AccessLevel) -> bool {
    !node.ctc_controlled || level >= AccessLevel::Dispatcher
}

//! Begrenztes Log der verarbeiteten Events (Diagnose).

use super::OverlayEvent;

/// Speichert verarbeitete Events in Reihenfolge. Ticks werden nicht geloggt.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<OverlayEvent>,
}

impl EventLog {
    const MAX_ENTRIES: usize = 1000;
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Fügt ein Event hinzu.
    /// Begrenzt auf MAX_ENTRIES, ältere Einträge werden verworfen.
    pub fn record(&mut self, event: &OverlayEvent) {
        if matches!(event, OverlayEvent::Tick { .. }) {
            return;
        }
        if self.entries.len() >= Self::MAX_ENTRIES {
            self.entries.drain(..Self::MAX_ENTRIES / 2);
        }
        self.entries.push(event.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[OverlayEvent] {
        &self.entries
    }
}

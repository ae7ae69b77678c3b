//! Periodische Einfärbung der Güterwagen-Marker nach Fahrziel.

use std::time::Duration;

use super::host::{DestinationInfo, MarkerSurface, OverlayWorld};
use super::marker_layout::MarkerKind;
use super::marker_registry::MarkerRegistry;

/// Farbe für Wagen ohne Zielgebiet.
pub const NO_AREA_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 1.0];

/// Abbrechbare, vom Host-Tick getriebene Wiederholung.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTask {
    interval: Duration,
    elapsed: Duration,
    running: bool,
}

impl RecurringTask {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Startet (oder startet neu). Der erste Lauf ist beim nächsten Tick fällig.
    pub fn start(&mut self) {
        self.running = true;
        self.elapsed = self.interval;
    }

    pub fn cancel(&mut self) {
        self.running = false;
        self.elapsed = Duration::ZERO;
    }

    /// Ändert das Intervall; ein laufender Task wird neu gestartet.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
        if self.running {
            self.start();
        }
    }

    /// Lässt Zeit vergehen. Gibt `true` zurück, wenn ein Lauf fällig ist.
    ///
    /// Lange Frames lösen höchstens einen Lauf aus.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = Duration::ZERO;
            true
        } else {
            false
        }
    }
}

/// Markerfarbe eines Güterwagens.
///
/// Ohne Zielgebiet grau. Steht der Wagen noch nicht am Ziel, wird die Farbe
/// auf volle Helligkeit gestreckt (RGB durch die größte Komponente). Alpha
/// wird nicht gestreckt.
pub fn freight_color(info: &DestinationInfo) -> [f32; 4] {
    let mut color = info.area_color.unwrap_or(NO_AREA_COLOR);
    if !info.at_destination {
        let max = color[..3].iter().copied().fold(0.0_f32, f32::max);
        if max > 0.0 {
            color[..3].iter_mut().for_each(|c| *c /= max);
        }
    }
    color
}

/// Färbt alle aktiven Güterwagen-Marker neu ein. Veraltete Handles und Wagen
/// ohne Zielinformation werden übersprungen und behalten ihre Farbe. Gibt die
/// Anzahl eingefärbter Marker zurück.
pub fn refresh_freight_colors(
    registry: &MarkerRegistry,
    world: &dyn OverlayWorld,
    surface: &mut dyn MarkerSurface,
) -> usize {
    let mut updated = 0;
    for entry in registry.active_entries() {
        let MarkerKind::Car {
            car, freight: true, ..
        } = &entry.kind
        else {
            continue;
        };
        if !surface.is_alive(entry.handle) {
            continue;
        }
        let Some(info) = world.destination_info(*car) else {
            log::trace!("Wagen {} ohne Zielinformation, Farbe bleibt", car);
            continue;
        };
        if surface.set_color(entry.handle, freight_color(&info)) {
            updated += 1;
        }
    }
    log::debug!("Wagenfarben aktualisiert: {}", updated);
    updated
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn task_fires_immediately_after_start_then_per_interval() {
        let mut task = RecurringTask::new(Duration::from_secs(1));
        assert!(!task.advance(Duration::from_secs(5)));

        task.start();
        assert!(task.advance(Duration::ZERO));
        assert!(!task.advance(Duration::from_millis(600)));
        assert!(task.advance(Duration::from_millis(400)));
    }

    #[test]
    fn cancelled_task_never_fires() {
        let mut task = RecurringTask::new(Duration::from_secs(1));
        task.start();
        task.cancel();
        assert!(!task.is_running());
        assert!(!task.advance(Duration::from_secs(10)));
    }

    #[test]
    fn long_frame_fires_once() {
        let mut task = RecurringTask::new(Duration::from_secs(1));
        task.start();
        assert!(task.advance(Duration::from_secs(10)));
        assert!(!task.advance(Duration::from_millis(10)));
    }

    #[test]
    fn missing_area_is_gray() {
        let info = DestinationInfo {
            area_color: None,
            at_destination: true,
        };
        assert_eq!(freight_color(&info), NO_AREA_COLOR);
    }

    #[test]
    fn en_route_color_is_brightened() {
        let info = DestinationInfo {
            area_color: Some([0.2, 0.4, 0.1, 0.5]),
            at_destination: false,
        };
        let color = freight_color(&info);
        assert_relative_eq!(color[0], 0.5);
        assert_relative_eq!(color[1], 1.0);
        assert_relative_eq!(color[2], 0.25);
        assert_relative_eq!(color[3], 0.5);
    }

    #[test]
    fn black_area_stays_black() {
        let info = DestinationInfo {
            area_color: Some([0.0, 0.0, 0.0, 1.0]),
            at_destination: false,
        };
        assert_eq!(freight_color(&info), [0.0, 0.0, 0.0, 1.0]);
    }
}

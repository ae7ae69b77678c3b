//! Session-Kontext einer geladenen Map.
//!
//! Klassifizierung, Location-Resolver, Marker-Registry (inkl.
//! Sichtbarkeits-Index) und der Farb-Task leben gemeinsam in einer
//! [`MapSession`] und werden gemeinsam aufgebaut und verworfen.

use glam::Vec3;

use super::color_refresh::RecurringTask;
use super::host::{MarkerSurface, OverlayWorld};
use super::marker_layout::collect_visuals;
use super::marker_registry::MarkerRegistry;
use crate::core::{ClassificationSet, Location, LocationResolver, TrackClassifier};
use crate::shared::OverlayOptions;

/// Alle Daten, die nur für die aktuell geladene Map gelten.
#[derive(Debug)]
pub struct MapSession {
    classification: ClassificationSet,
    resolver: LocationResolver,
    registry: MarkerRegistry,
    color_task: RecurringTask,
}

impl MapSession {
    /// Baut eine Session aus dem aktuellen Weltzustand auf.
    pub fn load(
        world: &dyn OverlayWorld,
        options: &OverlayOptions,
        surface: &mut dyn MarkerSurface,
    ) -> Self {
        let classification = classify(world);
        let resolver = LocationResolver::from_graph(world.graph());
        let mut registry = MarkerRegistry::from_options(options);
        registry.rebuild_all(
            collect_visuals(world, &classification, options),
            surface,
            world.culling_oracle(),
        );

        log::info!(
            "Map-Session geladen: {} Segmente ({} Hauptstrecke), {} Marker",
            world.graph().segment_count(),
            classification.mainline_segments().len(),
            registry.len()
        );

        Self {
            classification,
            resolver,
            registry,
            color_task: RecurringTask::new(options.color_refresh_interval()),
        }
    }

    pub fn classification(&self) -> &ClassificationSet {
        &self.classification
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &MarkerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MarkerRegistry {
        &mut self.registry
    }

    pub fn color_task(&self) -> &RecurringTask {
        &self.color_task
    }

    pub fn color_task_mut(&mut self) -> &mut RecurringTask {
        &mut self.color_task
    }

    /// Klassifiziert neu und baut den Resolver-Index neu auf.
    ///
    /// Die Menge wird immer komplett neu berechnet; Span-Caches gegen einen
    /// älteren Stand des Graphen werden dabei neu aufgelöst.
    pub fn reclassify(&mut self, world: &dyn OverlayWorld) {
        self.classification = classify(world);
        self.resolver = LocationResolver::from_graph(world.graph());
    }

    /// Baut alle Marker aus dem aktuellen Weltzustand neu auf.
    pub fn rebuild_markers(
        &mut self,
        world: &dyn OverlayWorld,
        options: &OverlayOptions,
        surface: &mut dyn MarkerSurface,
    ) {
        self.registry.rebuild_all(
            collect_visuals(world, &self.classification, options),
            surface,
            world.culling_oracle(),
        );
    }

    /// Nächster gültiger Gleispunkt für eine Fackel.
    pub fn find_flare_location(
        &self,
        world: &dyn OverlayWorld,
        point: Vec3,
        radius: f32,
    ) -> Option<Location> {
        self.resolver.find_nearest(world.graph(), point, radius)
    }

    /// Bricht den Farb-Task ab und entfernt alle Marker.
    pub fn teardown(mut self, surface: &mut dyn MarkerSurface) {
        self.color_task.cancel();
        self.registry.clear(surface);
        log::info!("Map-Session verworfen");
    }
}

fn classify(world: &dyn OverlayWorld) -> ClassificationSet {
    TrackClassifier::classify_with_industries(
        world.graph(),
        world.signal_blocks(),
        world.industries(),
    )
}

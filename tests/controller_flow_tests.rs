use std::time::Duration;

use approx::assert_relative_eq;
use glam::{Quat, Vec3};
use rail_map_overlay::app::color_refresh::NO_AREA_COLOR;
use rail_map_overlay::app::{
    CarArchetype, CarInfo, DestinationInfo, FlareInfo, JunctionGroup, MarkerGroup, MarkerKind,
};
use rail_map_overlay::core::{
    AccessLevel, BlockSpan, Hand, SignalBlock, SwitchGeometry, TrackClass, TrackNode,
};
use rail_map_overlay::{
    HeadlessSurface, HostRequest, MarkerKey, OverlayController, OverlayEvent, OverlayOptions,
    OverlayState, SnapshotWorld, TrackGraph,
};

fn car(id: u64, archetype: CarArchetype, x: f32) -> CarInfo {
    CarInfo {
        id,
        archetype,
        reporting_mark: "BRT".into(),
        road_number: id.to_string(),
        length: 11.0,
        position: Vec3::new(x, 0.0, 0.0),
        rotation: Quat::IDENTITY,
    }
}

/// Hauptstrecke 1-2-3-4 mit CTC-Weiche 3 und Nebenstrecke 3-5.
fn make_world() -> SnapshotWorld {
    let mut graph = TrackGraph::new();
    graph.add_node(TrackNode::new(1, Vec3::new(0.0, 0.0, 0.0)));
    graph.add_node(TrackNode::new(2, Vec3::new(100.0, 0.0, 0.0)));
    graph.add_node(TrackNode {
        ctc_controlled: true,
        ..TrackNode::switch(
            3,
            SwitchGeometry {
                home: Vec3::new(200.0, 0.0, 0.0),
                rotation: Quat::IDENTITY,
                hand: Hand::Right,
            },
        )
    });
    graph.add_node(TrackNode::new(4, Vec3::new(300.0, 0.0, 0.0)));
    graph.add_node(TrackNode::new(5, Vec3::new(300.0, 0.0, 80.0)));
    assert!(graph.connect(10, 1, 2));
    assert!(graph.connect(11, 2, 3));
    assert!(graph.connect(12, 3, 4));
    assert!(graph.connect(13, 3, 5));

    let mut world = SnapshotWorld::new(graph);
    world.set_signal_blocks(vec![SignalBlock::new(
        "main",
        vec![BlockSpan::new(vec![10, 11, 12])],
    )]);
    world.upsert_car(car(100, CarArchetype::Locomotive, 20.0));
    world.upsert_car(car(101, CarArchetype::Boxcar, 50.0));
    world.upsert_car(car(102, CarArchetype::Tankcar, 150.0));
    world.upsert_car(car(103, CarArchetype::Coach, 250.0));
    world.destinations.insert(
        101,
        DestinationInfo {
            area_color: Some([0.2, 0.4, 0.1, 1.0]),
            at_destination: false,
        },
    );
    world.destinations.insert(
        102,
        DestinationInfo {
            area_color: None,
            at_destination: true,
        },
    );
    world
}

struct Harness {
    controller: OverlayController,
    state: OverlayState,
    surface: HeadlessSurface,
    world: SnapshotWorld,
}

impl Harness {
    fn new() -> Self {
        Self {
            controller: OverlayController::new(),
            state: OverlayState::default(),
            surface: HeadlessSurface::new(),
            world: make_world(),
        }
    }

    fn loaded() -> Self {
        let mut harness = Self::new();
        harness.send(OverlayEvent::MapLoaded);
        harness
    }

    fn send(&mut self, event: OverlayEvent) {
        self.controller
            .handle_event(&mut self.state, event, &self.world, &mut self.surface)
            .expect("Event sollte ohne Fehler durchlaufen");
    }

    fn handle(&self, key: MarkerKey) -> rail_map_overlay::app::MarkerHandle {
        self.state
            .session
            .as_ref()
            .and_then(|s| s.registry().handle(key))
            .expect("Marker erwartet")
    }
}

#[test]
fn test_map_loaded_registers_switches_and_non_locomotive_cars() {
    let harness = Harness::loaded();

    assert!(harness.state.is_loaded());
    // 1 Weiche + 3 Wagen (Lok ohne Marker)
    assert_eq!(harness.state.marker_count(), 4);
    assert_eq!(harness.surface.len(), 4);
    assert_eq!(harness.surface.active_count(), 4);
    assert!(!harness.surface.group_visible(MarkerGroup::Junctions));

    let session = harness.state.session.as_ref().expect("Session erwartet");
    assert!(session.registry().handle(MarkerKey::Car(100)).is_none());
    assert_eq!(session.classification().class_of(11), TrackClass::Mainline);
    assert_eq!(session.classification().class_of(13), TrackClass::Branch);
}

#[test]
fn test_map_loaded_twice_is_idempotent() {
    let mut harness = Harness::loaded();
    let before = harness.handle(MarkerKey::Switch(3));

    harness.send(OverlayEvent::MapLoaded);

    assert_eq!(harness.state.marker_count(), 4);
    assert_eq!(harness.surface.len(), 4);
    assert_eq!(harness.handle(MarkerKey::Switch(3)), before);
}

#[test]
fn test_map_unloading_without_load_is_noop() {
    let mut harness = Harness::new();

    harness.send(OverlayEvent::MapUnloading);

    assert!(!harness.state.is_loaded());
    assert!(harness.surface.is_empty());
    assert_eq!(harness.state.event_log.len(), 1);
}

#[test]
fn test_map_unloading_despawns_all_markers() {
    let mut harness = Harness::loaded();
    harness.send(OverlayEvent::MapUnloading);

    assert!(!harness.state.is_loaded());
    assert!(harness.surface.is_empty());

    // Erneutes Laden baut alles wieder auf
    harness.send(OverlayEvent::MapLoaded);
    assert_eq!(harness.surface.len(), 4);
}

#[test]
fn test_topology_rebuild_with_fewer_entities_shrinks_registry_and_index() {
    let mut harness = Harness::loaded();
    let old_coach = harness.handle(MarkerKey::Car(103));

    harness.world.remove_car(103);
    harness.send(OverlayEvent::NetworkTopologyRebuilt {
        signal_blocks_changed: false,
    });

    let session = harness.state.session.as_ref().expect("Session erwartet");
    assert_eq!(session.registry().len(), 3);
    assert_eq!(session.registry().visibility().len(), 3);
    assert!(session.registry().handle(MarkerKey::Car(103)).is_none());
    assert!(harness.surface.marker(old_coach).is_none());
    assert_eq!(harness.surface.len(), 3);
    assert_eq!(harness.surface.active_count(), 3);
}

#[test]
fn test_topology_rebuild_always_reclassifies() {
    let mut harness = Harness::loaded();
    harness.world.set_signal_blocks(vec![SignalBlock::new(
        "main",
        vec![BlockSpan::new(vec![10, 11, 12, 13])],
    )]);

    harness.send(OverlayEvent::NetworkTopologyRebuilt {
        signal_blocks_changed: true,
    });

    let session = harness.state.session.as_ref().expect("Session erwartet");
    assert_eq!(session.classification().class_of(13), TrackClass::Mainline);
    assert!(session.classification().is_mainline_switch(5));
}

#[test]
fn test_topology_rebuild_drops_removed_segment_from_classification() {
    let mut harness = Harness::loaded();
    {
        let session = harness.state.session.as_ref().expect("Session erwartet");
        assert!(session.classification().is_mainline_segment(12));
    }

    assert!(harness.world.graph.remove_segment(12).is_some());
    for blocks_changed in [false, true] {
        harness.send(OverlayEvent::NetworkTopologyRebuilt {
            signal_blocks_changed: blocks_changed,
        });

        let session = harness.state.session.as_ref().expect("Session erwartet");
        let classification = session.classification();
        assert!(!classification.is_mainline_segment(12));
        assert_eq!(classification.class_of(12), TrackClass::Branch);
        assert!(!classification.is_mainline_switch(4));
        assert!(classification.is_mainline_switch(3));
        assert_eq!(session.resolver().len(), 3);
    }
}

#[test]
fn test_junction_marker_uses_classification_group() {
    let harness = Harness::loaded();
    let handle = harness.handle(MarkerKey::Switch(3));
    let marker = harness.surface.marker(handle).expect("Marker erwartet");

    match &marker.visual.kind {
        MarkerKind::Junction { node, group, .. } => {
            assert_eq!(*node, 3);
            assert_eq!(*group, JunctionGroup::Mainline);
        }
        other => panic!("Unerwartete Marker-Art: {other:?}"),
    }
    assert_relative_eq!(marker.visual.position.y, 50.0);
}

#[test]
fn test_place_flare_requests_placement_on_nearest_segment() {
    let mut harness = Harness::loaded();

    harness.send(OverlayEvent::PlaceFlareRequested {
        point: Vec3::new(120.0, 0.0, 12.0),
        pointer_over_map: true,
    });

    let requests = harness.state.take_requests();
    assert_eq!(requests.len(), 1);
    match &requests[0] {
        HostRequest::PlaceFlare(location) => {
            assert_eq!(location.segment_id, 11);
            assert!(location.is_valid());
            assert_relative_eq!(location.t, 0.2, epsilon = 1e-4);
            assert_relative_eq!(location.position.x, 120.0, epsilon = 1e-3);
        }
        other => panic!("Unerwarteter Auftrag: {other:?}"),
    }
}

#[test]
fn test_place_flare_ignored_outside_map_or_without_session() {
    let mut harness = Harness::new();
    harness.send(OverlayEvent::PlaceFlareRequested {
        point: Vec3::new(120.0, 0.0, 0.0),
        pointer_over_map: true,
    });
    assert!(harness.state.take_requests().is_empty());

    harness.send(OverlayEvent::MapLoaded);
    harness.send(OverlayEvent::PlaceFlareRequested {
        point: Vec3::new(120.0, 0.0, 0.0),
        pointer_over_map: false,
    });
    assert!(harness.state.take_requests().is_empty());

    // Außerhalb des Fangradius
    harness.send(OverlayEvent::PlaceFlareRequested {
        point: Vec3::new(120.0, 0.0, 400.0),
        pointer_over_map: true,
    });
    assert!(harness.state.take_requests().is_empty());
}

#[test]
fn test_zoom_changed_toggles_branch_junctions() {
    let mut harness = Harness::loaded();

    harness.send(OverlayEvent::ZoomChanged { camera_size: 4000.0 });
    assert!(!harness.surface.group_visible(MarkerGroup::BranchJunctions));

    harness.send(OverlayEvent::ZoomChanged { camera_size: 200.0 });
    assert!(harness.surface.group_visible(MarkerGroup::BranchJunctions));
    assert_relative_eq!(harness.state.zoom_frame.normalized_scale, 100.0 / 4900.0, epsilon = 1e-5);

    harness.send(OverlayEvent::ZoomChanged { camera_size: 50.0 });
    assert_relative_eq!(harness.state.camera.size, 100.0);
    assert_relative_eq!(harness.state.zoom_frame.icon_scale, 0.2, epsilon = 1e-5);
}

#[test]
fn test_overlay_shown_recenters_camera_and_colors_freight_cars() {
    let mut harness = Harness::loaded();

    harness.send(OverlayEvent::OverlayShown {
        shown: true,
        player_camera: Vec3::new(150.0, 20.0, 10.0),
    });
    assert!(harness.surface.group_visible(MarkerGroup::Junctions));
    assert_eq!(
        harness.state.take_requests(),
        vec![HostRequest::SetCameraPosition(Vec3::new(150.0, 5000.0, 10.0))]
    );

    harness.send(OverlayEvent::Tick { dt: Duration::ZERO });

    let boxcar = harness.surface.marker(harness.handle(MarkerKey::Car(101)));
    let color = boxcar.and_then(|m| m.color).expect("Farbe erwartet");
    assert_relative_eq!(color[0], 0.5);
    assert_relative_eq!(color[1], 1.0);
    assert_relative_eq!(color[2], 0.25);

    let tank = harness.surface.marker(harness.handle(MarkerKey::Car(102)));
    assert_eq!(tank.and_then(|m| m.color), Some(NO_AREA_COLOR));

    let coach = harness.surface.marker(harness.handle(MarkerKey::Car(103)));
    assert_eq!(coach.and_then(|m| m.color), None);
}

#[test]
fn test_freight_car_without_destination_info_keeps_its_color() {
    let mut harness = Harness::loaded();
    harness.world.destinations.remove(&102);

    harness.send(OverlayEvent::OverlayShown {
        shown: true,
        player_camera: Vec3::ZERO,
    });
    harness.send(OverlayEvent::Tick { dt: Duration::ZERO });

    let tank = harness.surface.marker(harness.handle(MarkerKey::Car(102)));
    assert_eq!(tank.and_then(|m| m.color), None);
    let boxcar = harness.surface.marker(harness.handle(MarkerKey::Car(101)));
    assert!(boxcar.and_then(|m| m.color).is_some());
}

#[test]
fn test_overlay_hidden_cancels_color_refresh() {
    let mut harness = Harness::loaded();
    harness.send(OverlayEvent::OverlayShown {
        shown: true,
        player_camera: Vec3::ZERO,
    });
    harness.send(OverlayEvent::OverlayShown {
        shown: false,
        player_camera: Vec3::ZERO,
    });
    harness.send(OverlayEvent::Tick {
        dt: Duration::from_secs(5),
    });

    let session = harness.state.session.as_ref().expect("Session erwartet");
    assert!(!session.color_task().is_running());
    assert!(!harness.surface.group_visible(MarkerGroup::Junctions));
    let boxcar = harness.surface.marker(harness.handle(MarkerKey::Car(101)));
    assert_eq!(boxcar.and_then(|m| m.color), None);
}

#[test]
fn test_settings_changed_while_shown_clamps_camera_and_requests_rebuild() {
    let mut harness = Harness::loaded();
    harness.send(OverlayEvent::OverlayShown {
        shown: true,
        player_camera: Vec3::ZERO,
    });
    harness.state.take_requests();

    let options = OverlayOptions {
        zoom_max: 800.0,
        marker_scale: 2.0,
        ..Default::default()
    };
    harness.send(OverlayEvent::SettingsChanged { options });

    assert_eq!(
        harness.state.take_requests(),
        vec![HostRequest::SetCameraSize(800.0), HostRequest::RebuildMap]
    );
    assert_relative_eq!(harness.state.camera.size, 800.0);
    assert_relative_eq!(harness.state.track_style.line_width_max, 3.2, epsilon = 1e-5);

    let junction = harness
        .surface
        .marker(harness.handle(MarkerKey::Switch(3)))
        .expect("Marker erwartet");
    assert_relative_eq!(junction.visual.layout.scale.y, 2.0);
    assert_relative_eq!(junction.visual.layout.offset.x, -88.0);
}

#[test]
fn test_invalid_settings_fall_back_to_defaults() {
    let mut harness = Harness::loaded();
    let options = OverlayOptions {
        zoom_min: 500.0,
        zoom_max: 500.0,
        ..Default::default()
    };

    harness.send(OverlayEvent::SettingsChanged { options });

    assert_eq!(harness.state.options, OverlayOptions::default());
    assert!(harness.state.take_requests().is_empty());
}

#[test]
fn test_visibility_distance_limits_active_markers_around_camera() {
    let mut harness = Harness::loaded();
    let options = OverlayOptions {
        visibility_distance: Some(100.0),
        ..Default::default()
    };
    harness.send(OverlayEvent::SettingsChanged { options });
    assert_eq!(harness.surface.active_count(), 0);

    harness.send(OverlayEvent::CameraMoved {
        position: Vec3::ZERO,
    });

    assert_eq!(harness.surface.active_count(), 1);
    assert!(harness
        .surface
        .is_active(harness.handle(MarkerKey::Car(101))));
}

#[test]
fn test_sphere_radius_change_applies_to_loaded_markers() {
    let mut harness = Harness::loaded();
    harness.send(OverlayEvent::SettingsChanged {
        options: OverlayOptions {
            visibility_distance: Some(100.0),
            ..Default::default()
        },
    });
    harness.send(OverlayEvent::CameraMoved {
        position: Vec3::ZERO,
    });
    assert_eq!(harness.surface.active_count(), 1);

    harness.send(OverlayEvent::SettingsChanged {
        options: OverlayOptions {
            visibility_distance: Some(100.0),
            marker_sphere_radius: 70.0,
            ..Default::default()
        },
    });

    assert_eq!(harness.surface.active_count(), 2);
    assert!(harness
        .surface
        .is_active(harness.handle(MarkerKey::Car(102))));
    let session = harness.state.session.as_ref().expect("Session erwartet");
    assert_eq!(session.registry().visibility().len(), 4);
    assert!(session
        .registry()
        .visibility()
        .records()
        .iter()
        .all(|record| record.sphere.radius == 70.0));
}

#[test]
fn test_entity_moved_updates_marker_and_ignores_locomotives() {
    let mut harness = Harness::loaded();

    let mut moved = car(101, CarArchetype::Boxcar, 80.0);
    moved.position.z = 5.0;
    harness.world.upsert_car(moved);
    harness.send(OverlayEvent::EntityMoved {
        key: MarkerKey::Car(101),
    });

    let marker = harness
        .surface
        .marker(harness.handle(MarkerKey::Car(101)))
        .expect("Marker erwartet");
    assert_relative_eq!(marker.visual.position.x, 80.0);
    assert_relative_eq!(marker.visual.position.y, 75.0);
    assert_relative_eq!(marker.visual.position.z, 5.0);

    harness.world.upsert_car(car(100, CarArchetype::Locomotive, 90.0));
    harness.send(OverlayEvent::EntityMoved {
        key: MarkerKey::Car(100),
    });
    assert_eq!(harness.surface.len(), 4);
    assert_eq!(harness.state.marker_count(), 4);
}

#[test]
fn test_entity_added_and_removed_keeps_index_aligned() {
    let mut harness = Harness::loaded();
    harness.world.upsert_flare(FlareInfo {
        id: 7,
        position: Vec3::new(10.0, 0.0, 0.0),
        rotation: Quat::IDENTITY,
    });

    harness.send(OverlayEvent::EntityAdded {
        key: MarkerKey::Flare(7),
    });
    harness.send(OverlayEvent::EntityAdded {
        key: MarkerKey::Flare(7),
    });

    assert_eq!(harness.state.marker_count(), 5);
    let flare = harness.handle(MarkerKey::Flare(7));
    assert!(harness.surface.is_active(flare));
    let marker = harness.surface.marker(flare).expect("Marker erwartet");
    assert_relative_eq!(marker.visual.position.y, 25.0);
    assert_relative_eq!(marker.visual.layout.scale.x, 0.6);

    harness.send(OverlayEvent::EntityRemoved {
        key: MarkerKey::Car(101),
    });
    let session = harness.state.session.as_ref().expect("Session erwartet");
    assert_eq!(session.registry().len(), 4);
    assert_eq!(session.registry().visibility().len(), 4);
    assert_eq!(harness.surface.len(), 4);

    // Unbekannte Entitäten sind ein No-op
    harness.send(OverlayEvent::EntityRemoved {
        key: MarkerKey::Flare(99),
    });
    harness.send(OverlayEvent::EntityAdded {
        key: MarkerKey::Car(100),
    });
    assert_eq!(harness.state.marker_count(), 4);
}

#[test]
fn test_switch_throw_requires_dispatcher_for_ctc_switch() {
    let mut harness = Harness::loaded();

    harness.send(OverlayEvent::SwitchThrowRequested {
        node: 3,
        access: AccessLevel::Crew,
    });
    assert!(harness.state.take_requests().is_empty());

    harness.send(OverlayEvent::SwitchThrowRequested {
        node: 3,
        access: AccessLevel::Dispatcher,
    });
    assert_eq!(
        harness.state.take_requests(),
        vec![HostRequest::ThrowSwitch(3)]
    );

    // Kein Weichen-Node
    harness.send(OverlayEvent::SwitchThrowRequested {
        node: 1,
        access: AccessLevel::Officer,
    });
    assert!(harness.state.take_requests().is_empty());
}

#[test]
fn test_settings_changed_saves_options_to_config_path() {
    let path = std::env::temp_dir().join(format!(
        "rail_map_overlay_test_{}.toml",
        std::process::id()
    ));
    let mut harness = Harness::new();
    harness.controller = OverlayController::with_config_path(path.clone());

    let options = OverlayOptions {
        flare_scale: 1.25,
        visibility_distance: Some(900.0),
        ..Default::default()
    };
    harness.send(OverlayEvent::SettingsChanged {
        options: options.clone(),
    });

    let loaded = OverlayOptions::load_from_file(&path);
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, options);
}

#[test]
fn test_event_log_records_all_but_ticks() {
    let mut harness = Harness::loaded();
    harness.send(OverlayEvent::Tick {
        dt: Duration::from_millis(16),
    });
    harness.send(OverlayEvent::ZoomChanged { camera_size: 300.0 });

    assert_eq!(
        harness.state.event_log.entries(),
        &[
            OverlayEvent::MapLoaded,
            OverlayEvent::ZoomChanged { camera_size: 300.0 }
        ]
    );
}

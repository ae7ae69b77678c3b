//! Rail Map Overlay: Headless-Demo.
//!
//! Lädt optional ein Szenario (JSON, erstes Argument) und spielt eine
//! typische Event-Folge gegen einen Headless-Host ab.

use std::path::Path;
use std::time::Duration;

use glam::{Quat, Vec3};
use rail_map_overlay::app::{CarArchetype, CarInfo, DestinationInfo};
use rail_map_overlay::core::{BlockSpan, Hand, SignalBlock, SwitchGeometry, TrackNode};
use rail_map_overlay::{
    HeadlessSurface, OverlayController, OverlayEvent, OverlayOptions, OverlayState, SnapshotWorld,
    TrackGraph,
};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Rail Map Overlay v{} startet...", env!("CARGO_PKG_VERSION"));

    let config_path = OverlayOptions::config_path();
    let options = OverlayOptions::load_from_file(&config_path);

    let world = match std::env::args().nth(1) {
        Some(path) => SnapshotWorld::load_json(Path::new(&path))?,
        None => demo_world(),
    };

    let mut state = OverlayState::new(options);
    let mut controller = OverlayController::new();
    let mut surface = HeadlessSurface::new();

    let player_camera = Vec3::new(150.0, 20.0, 10.0);
    let events = vec![
        OverlayEvent::MapLoaded,
        OverlayEvent::OverlayShown {
            shown: true,
            player_camera,
        },
        OverlayEvent::ZoomChanged { camera_size: 300.0 },
        OverlayEvent::CameraMoved {
            position: Vec3::new(150.0, 5000.0, 10.0),
        },
        OverlayEvent::Tick {
            dt: Duration::from_secs(1),
        },
        OverlayEvent::PlaceFlareRequested {
            point: Vec3::new(120.0, 0.0, 12.0),
            pointer_over_map: true,
        },
    ];

    for event in events {
        if let Err(e) = controller.handle_event(&mut state, event, &world, &mut surface) {
            log::error!("Event-Verarbeitung fehlgeschlagen: {:#}", e);
        }
    }

    log::info!(
        "Marker: {} registriert, {} aktiv, Icon-Skala {:.2}",
        state.marker_count(),
        surface.active_count(),
        state.zoom_frame.icon_scale
    );
    for request in state.take_requests() {
        log::info!("Host-Auftrag: {:?}", request);
    }

    controller.handle_event(&mut state, OverlayEvent::MapUnloading, &world, &mut surface)?;
    Ok(())
}

/// Kleines Beispielnetz: Hauptstrecke mit einer abzweigenden Nebenstrecke.
fn demo_world() -> SnapshotWorld {
    let mut graph = TrackGraph::new();
    graph.add_node(TrackNode::new(1, Vec3::new(0.0, 0.0, 0.0)));
    graph.add_node(TrackNode::new(2, Vec3::new(100.0, 0.0, 0.0)));
    graph.add_node(TrackNode::switch(
        3,
        SwitchGeometry {
            home: Vec3::new(200.0, 0.0, 0.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            hand: Hand::Right,
        },
    ));
    graph.add_node(TrackNode::new(4, Vec3::new(300.0, 0.0, 0.0)));
    graph.add_node(TrackNode::new(5, Vec3::new(300.0, 0.0, 80.0)));
    graph.connect(10, 1, 2);
    graph.connect(11, 2, 3);
    graph.connect(12, 3, 4);
    graph.connect(13, 3, 5);

    let mut world = SnapshotWorld::new(graph);
    world.set_signal_blocks(vec![SignalBlock::new(
        "main",
        vec![BlockSpan::new(vec![10, 11, 12])],
    )]);
    world.upsert_car(CarInfo {
        id: 100,
        archetype: CarArchetype::Locomotive,
        reporting_mark: "BRT".into(),
        road_number: "7".into(),
        length: 18.0,
        position: Vec3::new(40.0, 0.0, 0.0),
        rotation: Quat::IDENTITY,
    });
    world.upsert_car(CarInfo {
        id: 101,
        archetype: CarArchetype::Boxcar,
        reporting_mark: "BRT".into(),
        road_number: "2041".into(),
        length: 12.0,
        position: Vec3::new(60.0, 0.0, 0.0),
        rotation: Quat::IDENTITY,
    });
    world.destinations.insert(
        101,
        DestinationInfo {
            area_color: Some([0.2, 0.4, 0.1, 1.0]),
            at_destination: false,
        },
    );
    world
}

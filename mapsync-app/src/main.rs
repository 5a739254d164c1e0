use anyhow::Context;
use mapsync::prelude::*;
use std::fs::File;

const INIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Replays a scripted touch session against a headless map and logs the
/// canonical camera after every gesture.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let file = File::open(&path).with_context(|| format!("opening config {}", path))?;
            MapConfig::from_reader(file).with_context(|| format!("parsing config {}", path))?
        }
        None => {
            let mut config = MapConfig::for_provider(ProviderKind::AMap);
            config.provider.center = Some(LngLat::new(121.4, 31.258134));
            config.provider.zoom = Some(12.0);
            config
        }
    };

    let binding = HeadlessProvider::new(config.provider.kind, Point::new(800.0, 600.0));
    let mut dispatcher = TouchDispatcher::from_config(&config.gestures)?;
    let mut map = MapService::new(binding, config)?;
    map.on_camera_changed(|viewport| {
        if let Ok(camera) = viewport.camera() {
            log::debug!(
                "camera zoom {:.2} bearing {:.1} center ({:.5}, {:.5})",
                camera.zoom,
                camera.bearing,
                camera.center.lng,
                camera.center.lat
            );
        }
    });

    tokio::time::timeout(INIT_TIMEOUT, map.init())
        .await
        .context("provider load timed out")??;
    report(&map, "initial")?;

    let base = Instant::now();
    for (label, events) in script(base) {
        for mut event in events {
            if let Some(command) = dispatcher.dispatch(&mut event) {
                map.apply_command(command)?;
            }
        }
        dispatcher.run_pending();
        report(&map, label)?;
    }

    map.set_rotation(45.0)?;
    report(&map, "rotated")?;

    let bounds = map.bounds()?;
    println!("{}", serde_json::to_string(&bounds)?);
    Ok(())
}

fn report(map: &MapService<HeadlessProvider>, label: &str) -> anyhow::Result<()> {
    let viewport = map.viewport();
    log::info!(
        "{:<10} zoom {:>5.2} bearing {:>5.1} {:?}",
        label,
        viewport.zoom()?,
        viewport.bearing()?,
        map.coordinate_system()
    );
    Ok(())
}

fn script(base: Instant) -> Vec<(&'static str, Vec<TouchEvent>)> {
    let at = |ms: u64| base + Duration::from_millis(ms);
    let finger = vec![TouchPoint::new(1, 600.0, 300.0)];
    let fingers = vec![TouchPoint::new(2, 380.0, 300.0), TouchPoint::new(3, 420.0, 300.0)];

    vec![
        (
            "double tap",
            vec![
                TouchEvent::start(at(0), finger.clone(), finger.clone()),
                TouchEvent::end(at(60), Vec::new(), finger.clone()),
                TouchEvent::start(at(180), finger.clone(), finger.clone()),
                TouchEvent::end(at(240), Vec::new(), finger.clone()),
            ],
        ),
        (
            "drag",
            vec![
                TouchEvent::start(at(1000), finger.clone(), finger.clone()),
                TouchEvent::moved(at(1016), vec![TouchPoint::new(1, 560.0, 320.0)]),
                TouchEvent::moved(at(1032), vec![TouchPoint::new(1, 500.0, 340.0)]),
                TouchEvent::end(at(1050), Vec::new(), vec![TouchPoint::new(1, 500.0, 340.0)]),
            ],
        ),
        (
            "two-finger",
            vec![
                TouchEvent::start(at(2000), fingers.clone(), fingers.clone()),
                TouchEvent::end(at(2060), Vec::new(), fingers),
            ],
        ),
    ]
}

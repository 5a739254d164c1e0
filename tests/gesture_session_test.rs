use mapsync::prelude::*;

/// Touch streams driven through the dispatcher into a live session
#[cfg(test)]
mod gesture_session_tests {
    use super::*;

    async fn session() -> (MapService<HeadlessProvider>, TouchDispatcher) {
        let mut config = MapConfig::for_provider(ProviderKind::AMap);
        config.provider.center = Some(LngLat::new(116.397, 39.909));
        config.provider.zoom = Some(11.0);
        let dispatcher = TouchDispatcher::from_config(&config.gestures).unwrap();
        let binding = HeadlessProvider::new(ProviderKind::AMap, Point::new(800.0, 600.0));
        let mut map = MapService::new(binding, config).unwrap();
        map.init().await.unwrap();
        (map, dispatcher)
    }

    fn replay(
        map: &mut MapService<HeadlessProvider>,
        dispatcher: &mut TouchDispatcher,
        events: Vec<TouchEvent>,
    ) -> Vec<CameraCommand> {
        let mut commands = Vec::new();
        for mut event in events {
            if let Some(command) = dispatcher.dispatch(&mut event) {
                map.apply_command(command).unwrap();
                commands.push(command);
            }
        }
        commands
    }

    #[tokio::test]
    async fn test_double_tap_zooms_in_one_level() {
        let (mut map, mut dispatcher) = session().await;
        assert_eq!(map.coordinate_system(), CoordinateSystem::Base);

        let base = Instant::now();
        let at = |ms: u64| base + Duration::from_millis(ms);
        let finger = vec![TouchPoint::new(1, 400.0, 300.0)];
        let commands = replay(
            &mut map,
            &mut dispatcher,
            vec![
                TouchEvent::start(at(0), finger.clone(), finger.clone()),
                TouchEvent::end(at(50), Vec::new(), finger.clone()),
                TouchEvent::start(at(150), finger.clone(), finger.clone()),
                TouchEvent::end(at(200), Vec::new(), finger),
            ],
        );

        assert_eq!(commands.len(), 1);
        assert_eq!(map.viewport().zoom().unwrap(), 11.0);
        assert_eq!(map.coordinate_system(), CoordinateSystem::Base);
        assert_eq!(map.binding().zoom(), 12.0);
    }

    #[tokio::test]
    async fn test_two_finger_tap_zooms_out_around_midpoint() {
        let (mut map, mut dispatcher) = session().await;
        let base = Instant::now();
        let fingers = vec![TouchPoint::new(1, 180.0, 100.0), TouchPoint::new(2, 220.0, 100.0)];
        let around = Point::new(200.0, 100.0);
        let landmark = map.container_to_lng_lat(around).unwrap();

        let mut end = TouchEvent::end(base + Duration::from_millis(60), Vec::new(), fingers.clone());
        dispatcher.dispatch(&mut TouchEvent::start(base, fingers.clone(), fingers));
        let command = dispatcher.dispatch(&mut end).unwrap();
        assert!(end.default_prevented());
        assert_eq!(command, CameraCommand::Zoom { delta: -1.0, around });

        map.apply_command(command).unwrap();
        assert_eq!(map.viewport().zoom().unwrap(), 9.0);
        let after = map.lng_lat_to_container(landmark).unwrap();
        assert!((after.x - around.x).abs() < 1e-6);
        assert!((after.y - around.y).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_drag_pans_the_map() {
        let (mut map, mut dispatcher) = session().await;
        let base = Instant::now();
        let at = |ms: u64| base + Duration::from_millis(ms);
        let start = vec![TouchPoint::new(7, 400.0, 300.0)];
        let landmark = map.container_to_lng_lat(Point::new(400.0, 300.0)).unwrap();

        let commands = replay(
            &mut map,
            &mut dispatcher,
            vec![
                TouchEvent::start(at(0), start.clone(), start),
                TouchEvent::moved(at(16), vec![TouchPoint::new(7, 440.0, 300.0)]),
                TouchEvent::moved(at(32), vec![TouchPoint::new(7, 470.0, 320.0)]),
                TouchEvent::end(at(40), Vec::new(), vec![TouchPoint::new(7, 470.0, 320.0)]),
            ],
        );

        assert_eq!(commands.len(), 2);
        assert!(commands
            .iter()
            .all(|c| matches!(c, CameraCommand::PanBy { .. })));
        let moved = map.lng_lat_to_container(landmark).unwrap();
        assert!((moved.x - 470.0).abs() < 1e-6);
        assert!((moved.y - 320.0).abs() < 1e-6);
        assert_eq!(map.viewport().zoom().unwrap(), 10.0);
    }

    #[tokio::test]
    async fn test_handlers_reset_on_next_turn_after_match() {
        let (mut map, mut dispatcher) = session().await;
        let base = Instant::now();
        let fingers = vec![TouchPoint::new(1, 180.0, 100.0), TouchPoint::new(2, 220.0, 100.0)];

        replay(
            &mut map,
            &mut dispatcher,
            vec![
                TouchEvent::start(base, fingers.clone(), fingers.clone()),
                TouchEvent::end(base + Duration::from_millis(40), Vec::new(), fingers),
            ],
        );
        assert!(dispatcher.handler("tap_zoom").unwrap().is_active());

        dispatcher.run_pending();
        assert!(!dispatcher.handler("tap_zoom").unwrap().is_active());
    }

    #[tokio::test]
    async fn test_expired_single_tap_does_not_pair_with_late_tap() {
        let (mut map, mut dispatcher) = session().await;
        let base = Instant::now();
        let at = |ms: u64| base + Duration::from_millis(ms);
        let finger = vec![TouchPoint::new(1, 400.0, 300.0)];

        replay(
            &mut map,
            &mut dispatcher,
            vec![
                TouchEvent::start(at(0), finger.clone(), finger.clone()),
                TouchEvent::end(at(50), Vec::new(), finger.clone()),
            ],
        );
        dispatcher.expire(at(700));

        let commands = replay(
            &mut map,
            &mut dispatcher,
            vec![
                TouchEvent::start(at(720), finger.clone(), finger.clone()),
                TouchEvent::end(at(760), Vec::new(), finger),
            ],
        );
        assert!(commands.is_empty());
        assert_eq!(map.viewport().zoom().unwrap(), 10.0);
    }
}

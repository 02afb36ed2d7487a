use crate::prelude::*;

/// Feed this frame's pointer events, in delivery order, to every look
/// controller. Ambient controllers then follow the cursor position.
pub fn update_look_controllers<C: PointerCapture + Resource>(
    mut input: ResMut<PointerInput>,
    mut capture: ResMut<C>,
    window_size: Res<WindowSize>,
    mut controllers: Query<&mut LookController>,
) {
    let events = input.drain();
    let viewport = (window_size.width as f32, window_size.height as f32);

    for mut controller in controllers.iter_mut() {
        for event in &events {
            controller.handle_event(*event, &mut *capture);
        }

        if controller.mode() == LookMode::Ambient {
            if let Some(position) = input.position() {
                controller.track_pointer(position, viewport);
            }
        }
    }
}

/// Point each controlled camera along its controller's orientation
pub fn apply_look_orientation(
    mut query: Query<(&LookController, &mut Transform), Changed<LookController>>,
) {
    for (controller, mut transform) in query.iter_mut() {
        transform.rotation = controller.orientation().rotation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(config: LookConfig) -> (World, Schedule, Entity) {
        let mut world = World::new();
        world.insert_resource(PointerInput::new());
        world.insert_resource(RecordingCapture::default());
        world.insert_resource(WindowSize {
            width: 800,
            height: 600,
        });

        let camera = world
            .spawn((Transform::default(), LookController::new(&config)))
            .id();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                update_look_controllers::<RecordingCapture>,
                apply_look_orientation,
            )
                .chain(),
        );

        (world, schedule, camera)
    }

    fn push(world: &mut World, events: &[PointerEvent]) {
        let mut input = world.resource_mut::<PointerInput>();
        for event in events {
            input.push(*event);
        }
    }

    #[test]
    fn drag_within_a_frame_rotates_camera_and_releases_capture() {
        let (mut world, mut schedule, camera) = setup(LookConfig::default());

        push(
            &mut world,
            &[
                PointerEvent::Motion { dx: 100.0, dy: 0.0 },
                PointerEvent::Pressed,
                PointerEvent::Motion { dx: 50.0, dy: -25.0 },
                PointerEvent::Released,
                PointerEvent::Motion { dx: 100.0, dy: 0.0 },
            ],
        );
        schedule.run(&mut world);

        let controller = world.get::<LookController>(camera).unwrap();
        let orientation = controller.orientation();
        assert!((orientation.yaw + 0.1).abs() < 1e-6);
        assert!((orientation.pitch - 0.05).abs() < 1e-6);
        assert!(!controller.is_engaged());

        let transform = world.get::<Transform>(camera).unwrap();
        assert!(transform.rotation.angle_to(&orientation.rotation()) < 1e-6);

        let capture = world.resource::<RecordingCapture>();
        assert_eq!(capture.acquired, 1);
        assert_eq!(capture.released, 1);
        assert!(world.resource_mut::<PointerInput>().drain().is_empty());
    }

    #[test]
    fn drag_spanning_frames_keeps_capture_until_release() {
        let (mut world, mut schedule, camera) = setup(LookConfig::default());

        push(&mut world, &[PointerEvent::Pressed]);
        schedule.run(&mut world);
        assert!(world.get::<LookController>(camera).unwrap().is_engaged());
        assert_eq!(world.resource::<RecordingCapture>().acquired, 1);
        assert_eq!(world.resource::<RecordingCapture>().released, 0);

        push(&mut world, &[PointerEvent::Motion { dx: -10.0, dy: 0.0 }]);
        schedule.run(&mut world);

        push(&mut world, &[PointerEvent::CaptureLost]);
        schedule.run(&mut world);

        let controller = world.get::<LookController>(camera).unwrap();
        assert!(!controller.is_engaged());
        assert!((controller.orientation().yaw - 0.02).abs() < 1e-6);
        assert_eq!(world.resource::<RecordingCapture>().released, 1);
    }

    #[test]
    fn ambient_follows_cursor_every_frame() {
        let (mut world, mut schedule, camera) = setup(LookConfig {
            mode: LookMode::Ambient,
            horizontal_scale: 1.0,
            vertical_scale: 0.5,
            ..Default::default()
        });

        // Nothing to follow until the cursor has been seen
        schedule.run(&mut world);
        assert_eq!(
            world.get::<LookController>(camera).unwrap().orientation(),
            Orientation::default()
        );

        world.resource_mut::<PointerInput>().set_position(400.0, 300.0);
        push(&mut world, &[PointerEvent::Pressed]);
        schedule.run(&mut world);
        assert_eq!(
            world.get::<LookController>(camera).unwrap().orientation(),
            Orientation::default()
        );
        assert_eq!(world.resource::<RecordingCapture>().acquired, 0);

        world.resource_mut::<PointerInput>().set_position(800.0, 0.0);
        schedule.run(&mut world);
        let orientation = world.get::<LookController>(camera).unwrap().orientation();
        assert!((orientation.yaw + std::f32::consts::PI).abs() < 1e-6);
        assert!((orientation.pitch - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}

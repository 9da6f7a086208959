use card_table_viz::config::ViewerSettings;
use card_table_viz::host::{HostContainer, ManualFrameScheduler, MemoryContainer};
use card_table_viz::rendering::{HeadlessBackend, LifecycleState, RenderError, RenderLoop};

type TestLoop = RenderLoop<HeadlessBackend, MemoryContainer, ManualFrameScheduler>;

fn render_loop(width: u32, height: u32) -> TestLoop {
    RenderLoop::new(
        HeadlessBackend::new(),
        MemoryContainer::new(width, height),
        ManualFrameScheduler::new(),
        &ViewerSettings::default(),
    )
    .unwrap()
}

/// Fire `frames` pending frame requests, 16 ms apart starting at `start_ms`.
fn pump(render_loop: &mut TestLoop, start_ms: f64, frames: usize) -> usize {
    let mut fired = 0;
    for i in 0..frames {
        let Some(handle) = render_loop.scheduler_mut().take_pending() else {
            break;
        };
        if render_loop.on_frame(handle, start_ms + i as f64 * 16.0).unwrap() {
            fired += 1;
        }
    }
    fired
}

fn horizontal_distance(render_loop: &TestLoop) -> f32 {
    let camera = render_loop.camera();
    let dx = camera.eye.x - camera.target.x;
    let dz = camera.eye.z - camera.target.z;
    (dx * dx + dz * dz).sqrt()
}

#[test]
fn test_resize_updates_aspect_ratio() {
    let mut render_loop = render_loop(800, 600);
    assert!((render_loop.camera().aspect - 1.333).abs() < 0.01);

    render_loop.container_mut().set_size(1920, 1080);
    render_loop.handle_resize().unwrap();
    assert!((render_loop.camera().aspect - 1.778).abs() < 0.01);

    let surface = render_loop.surface();
    assert_eq!(render_loop.backend().surface_size(surface), Some((1920, 1080)));
}

#[test]
fn test_zero_height_resize_keeps_surface() {
    let mut render_loop = render_loop(800, 600);
    render_loop.container_mut().set_size(800, 0);
    render_loop.handle_resize().unwrap();
    assert_eq!(render_loop.camera().aspect, 1.0);

    let surface = render_loop.surface();
    assert_eq!(render_loop.backend().surface_size(surface), Some((800, 600)));
}

#[test]
fn test_start_twice_schedules_one_frame() {
    let mut render_loop = render_loop(800, 600);
    render_loop.start().unwrap();
    render_loop.start().unwrap();
    assert_eq!(render_loop.state(), LifecycleState::Running);
    assert_eq!(render_loop.scheduler().active_requests(), 1);
    assert_eq!(render_loop.scheduler().total_requested(), 1);
}

#[test]
fn test_running_loop_keeps_one_frame_in_flight() {
    let mut render_loop = render_loop(800, 600);
    render_loop.start().unwrap();
    assert_eq!(pump(&mut render_loop, 0.0, 60), 60);
    assert_eq!(render_loop.frames_rendered(), 60);
    assert_eq!(render_loop.backend().draw_count(), 60);
    assert_eq!(render_loop.scheduler().active_requests(), 1);
}

#[test]
fn test_stop_then_start_resumes() {
    let mut render_loop = render_loop(800, 600);
    render_loop.start().unwrap();
    pump(&mut render_loop, 0.0, 5);

    render_loop.stop().unwrap();
    assert_eq!(render_loop.state(), LifecycleState::Idle);
    assert_eq!(render_loop.scheduler().active_requests(), 0);
    assert_eq!(render_loop.pending_frame(), None);
    assert_eq!(pump(&mut render_loop, 100.0, 5), 0);

    render_loop.start().unwrap();
    assert_eq!(pump(&mut render_loop, 200.0, 5), 5);
    assert_eq!(render_loop.frames_rendered(), 10);
}

#[test]
fn test_render_works_before_start() {
    let mut render_loop = render_loop(800, 600);
    render_loop.render(0.0).unwrap();
    assert_eq!(render_loop.state(), LifecycleState::Idle);
    assert_eq!(render_loop.backend().draw_count(), 1);
    assert_eq!(render_loop.scheduler().active_requests(), 0);
}

#[test]
fn test_dispose_releases_everything() {
    let mut render_loop = render_loop(800, 600);
    render_loop.start().unwrap();
    pump(&mut render_loop, 0.0, 3);
    let surface = render_loop.surface();

    render_loop.dispose();
    assert_eq!(render_loop.state(), LifecycleState::Disposed);
    assert!(!render_loop.container().has_child(surface));
    assert_eq!(render_loop.container().resize_listener_count(), 0);
    assert_eq!(render_loop.scheduler().active_requests(), 0);
    assert_eq!(render_loop.backend().live_surfaces(), 0);
    assert!(render_loop.backend().is_released());
    assert!(render_loop.scene().is_empty());

    assert_eq!(render_loop.start(), Err(RenderError::Disposed));
    assert_eq!(render_loop.stop(), Err(RenderError::Disposed));
    assert_eq!(render_loop.render(100.0), Err(RenderError::Disposed));
    assert_eq!(render_loop.handle_resize(), Err(RenderError::Disposed));
    assert_eq!(render_loop.set_rotation_speed(1.0), Err(RenderError::Disposed));

    // Second dispose is a no-op
    render_loop.dispose();
    assert_eq!(render_loop.state(), LifecycleState::Disposed);
}

#[test]
fn test_forward_key_moves_camera_toward_target() {
    let mut render_loop = render_loop(800, 600);
    let eye_before = render_loop.camera().eye;

    render_loop.key_down("W");
    render_loop.render(0.0).unwrap();
    render_loop.render(16.0).unwrap();
    let eye_after = render_loop.camera().eye;
    // Default eye looks down -Z at the target; two renders at 0.1 per render
    assert!((eye_before.z - eye_after.z - 0.2).abs() < 1e-4, "moved {}", eye_before.z - eye_after.z);
    assert!((eye_after.x - eye_before.x).abs() < 1e-6);
    assert_eq!(eye_after.y, eye_before.y);

    render_loop.key_up("w");
    render_loop.render(32.0).unwrap();
    assert_eq!(render_loop.camera().eye, eye_after);
}

#[test]
fn test_turn_key_orbits_at_constant_distance() {
    let mut render_loop = render_loop(800, 600);
    let before = horizontal_distance(&render_loop);
    let eye_before = render_loop.camera().eye;

    render_loop.key_down("ArrowLeft");
    for i in 0..10 {
        render_loop.render(i as f64 * 16.0).unwrap();
    }
    let eye_after = render_loop.camera().eye;
    assert!((horizontal_distance(&render_loop) - before).abs() < 1e-4);
    assert!((eye_after.x - eye_before.x).abs() > 0.1);
    assert_eq!(eye_after.y, eye_before.y);
}

#[test]
fn test_rotation_speed_is_clamped() {
    let mut render_loop = render_loop(800, 600);
    render_loop.set_rotation_speed(-3.0).unwrap();
    assert_eq!(render_loop.rotation_speed(), 0.0);

    render_loop.set_rotation_speed(1.25).unwrap();
    assert_eq!(render_loop.rotation_speed(), 1.25);

    render_loop.set_rotation_speed(1000.0).unwrap();
    assert_eq!(
        render_loop.rotation_speed(),
        card_table_viz::rendering::MAX_ROTATION_SPEED
    );
}

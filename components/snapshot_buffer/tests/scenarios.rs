use approx::assert_abs_diff_eq;
use glam::{Quat, Vec3};
use snapshot_buffer::{
    BufferSettings, MemorySink, Pose, Severity, SnapshotBuffer, SnapshotError,
};
use std::f32::consts::PI;
use std::sync::Arc;

fn at_x(x: f32) -> Pose {
    Pose::from_position(Vec3::new(x, 0.0, 0.0))
}

#[test]
fn two_samples_interpolate_and_clamp() {
    let sink = Arc::new(MemorySink::new());
    let mut buffer = SnapshotBuffer::with_sink(Arc::clone(&sink));
    buffer.append(at_x(0.0), 0.0);
    buffer.append(at_x(10.0), 1.0);

    assert_abs_diff_eq!(buffer.interpolate(0.5).position, Vec3::new(5.0, 0.0, 0.0), epsilon = 1e-6);
    assert_abs_diff_eq!(buffer.interpolate(-1.0).position, Vec3::ZERO, epsilon = 1e-6);
    assert_abs_diff_eq!(buffer.interpolate(2.0).position, Vec3::new(10.0, 0.0, 0.0), epsilon = 1e-6);

    assert_eq!(sink.count(Severity::Info), 1);
    assert_eq!(sink.count(Severity::Warning), 1);
    assert_eq!(sink.count(Severity::Error), 0);
}

#[test]
fn prune_keeps_one_sample_below_horizon() {
    let mut buffer = SnapshotBuffer::with_sink(MemorySink::new());
    for t in [1.0, 2.0, 3.0, 6.0, 7.0] {
        buffer.append(at_x(t as f32), t);
    }
    buffer.prune(5.0, 1);

    let times: Vec<f64> = buffer.iter().map(|s| s.time).collect();
    assert_eq!(times, vec![3.0, 6.0, 7.0]);

    let pose = buffer.interpolate(5.0);
    assert_abs_diff_eq!(pose.position.x, 5.0, epsilon = 1e-5);
    assert!(buffer.sink().events().is_empty());
}

#[test]
fn rotation_follows_shortest_arc_across_updates() {
    let mut buffer = SnapshotBuffer::with_sink(MemorySink::new());
    // Yaw wraps from just below PI to just above -PI; the short way is through PI.
    buffer.append(Pose::from_rotation(Quat::from_rotation_y(PI - 0.1)), 0.0);
    buffer.append(Pose::from_rotation(Quat::from_rotation_y(-PI + 0.1)), 0.1);

    let mid = buffer.interpolate(0.05);
    assert!(mid.abs_diff_eq(&Pose::from_rotation(Quat::from_rotation_y(PI)), 1e-4));
}

#[test]
fn jittered_stream_stays_bounded_and_smooth() {
    let settings = BufferSettings::from_ron("(history: 0.3, min_keep_older: 1)").unwrap();
    let sink = MemorySink::new();
    let mut buffer = SnapshotBuffer::from_settings_with_sink(&settings, &sink);

    let period = 0.05;
    let delay = 0.1;
    for i in 0..200u32 {
        let jitter = if i % 3 == 0 { 0.01 } else { 0.0 };
        let t = i as f64 * period + jitter;
        buffer.try_append(at_x(t as f32), t).unwrap();

        let render_time = t - delay;
        if render_time > 0.0 {
            // Positions track time, so the estimate stays close to the render time.
            let pose = buffer.interpolate(render_time);
            assert_abs_diff_eq!(pose.position.x as f64, render_time, epsilon = 1e-3);
        }
        buffer.prune_history(render_time, &settings);
        assert!(buffer.len() <= 12, "buffer grew to {}", buffer.len());
    }
    assert_eq!(sink.count(Severity::Error), 0);
    assert_eq!(sink.count(Severity::Warning), 0);
}

#[test]
fn strict_append_refuses_stale_snapshot() {
    let mut buffer = SnapshotBuffer::with_sink(MemorySink::new());
    buffer.try_append(at_x(1.0), 1.0).unwrap();
    buffer.try_append(at_x(2.0), 2.0).unwrap();

    match buffer.try_append(at_x(0.5), 1.5) {
        Err(SnapshotError::OutOfOrder { time, last }) => {
            assert_eq!(time, 1.5);
            assert_eq!(last, 2.0);
        }
        other => panic!("expected an out-of-order error, got {other:?}"),
    }
    assert_eq!(buffer.len(), 2);
}

#[test]
fn empty_buffer_stays_live() {
    let sink = MemorySink::new();
    let mut buffer = SnapshotBuffer::<Pose, _>::with_sink(&sink);
    assert_eq!(buffer.interpolate(3.0), Pose::IDENTITY);
    buffer.prune(10.0, 1);
    assert!(buffer.is_empty());
    assert_eq!(sink.count(Severity::Error), 1);
}

// Host-side tests for glitch scheduling and the post chain.

use metro_core::*;

fn window_membership(s: &mut GlitchScheduler, times: &[f64]) -> Vec<bool> {
    times.iter().map(|&t| s.update(t)).collect()
}

#[test]
fn pass_is_on_exactly_within_the_window() {
    let mut s = GlitchScheduler::new();
    let start = 10_000.0;
    let on = window_membership(
        &mut s,
        &[start, start + 1.0, start + GLITCH_DURATION_MS - 1.0, start + GLITCH_DURATION_MS],
    );
    assert_eq!(on, vec![true, true, true, false]);
    assert_eq!(s.last_activation_ms(), start);
}

#[test]
fn rearms_only_after_the_interval() {
    let mut s = GlitchScheduler::new();
    let start = 10_000.0;
    assert!(s.update(start));
    assert!(!s.update(start + GLITCH_DURATION_MS));
    assert!(!s.update(start + GLITCH_INTERVAL_MS - 1.0));
    // strictly greater than the interval
    assert!(!s.update(start + GLITCH_INTERVAL_MS));
    assert!(s.update(start + GLITCH_INTERVAL_MS + 1.0));
    assert_eq!(s.last_activation_ms(), start + GLITCH_INTERVAL_MS + 1.0);
}

#[test]
fn sparse_frames_still_respect_the_window() {
    let mut s = GlitchScheduler::new();
    assert!(s.update(5_000.0));
    // a frame landing long after the window closes and the interval elapses
    // both deactivates and re-arms
    assert!(s.update(5_000.0 + GLITCH_INTERVAL_MS + 10.0));
    assert!(s.is_active());
}

#[test]
fn update_report_tracks_glitch_window() {
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 3);
    let none = KeyState::new();
    let start = 1_000.0;

    let report = scene.update(0.016, start, &none);
    assert_eq!(report.passes.as_slice(), &[PassKind::Render, PassKind::Glitch]);
    assert!(report.glitch.is_some());

    let report = scene.update(0.016, start + GLITCH_DURATION_MS - 1.0, &none);
    assert!(report.passes.contains(&PassKind::Glitch));

    let report = scene.update(0.016, start + GLITCH_DURATION_MS, &none);
    assert_eq!(report.passes.as_slice(), &[PassKind::Render]);
    assert!(report.glitch.is_none());
    assert!(!scene.post_chain().glitch_enabled());
}

#[test]
fn glitch_window_frames_are_wild() {
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 11);
    let none = KeyState::new();
    for i in 0..100 {
        let report = scene.update(0.016, 1_000.0 + i as f64 * 16.0, &none);
        let u = report.glitch.expect("inside the window");
        assert_eq!(u.byp, 0);
        assert_eq!(u.col_s, GLITCH_COLUMN_SIZE);
    }
}

#[test]
fn same_seed_same_parameters() {
    let mut a = GlitchEffect::new(99);
    let mut b = GlitchEffect::new(99);
    for _ in 0..50 {
        assert_eq!(a.next_frame(false), b.next_frame(false));
    }
    assert_eq!(
        a.displacement_map(GLITCH_DISPLACEMENT_SIZE),
        b.displacement_map(GLITCH_DISPLACEMENT_SIZE)
    );
}

#[test]
fn scene_displacement_map_is_full_size() {
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 5);
    let map = scene.displacement_map();
    let n = (GLITCH_DISPLACEMENT_SIZE * GLITCH_DISPLACEMENT_SIZE) as usize;
    assert_eq!(map.len(), n * 4);
}

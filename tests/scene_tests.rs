// Host-side tests for the per-frame scene update.

use glam::Vec3;
use metro_core::keys::{KEY_BACK, KEY_FORWARD, KEY_LEFT, KEY_RIGHT, KEY_SHIFT_LEFT, KEY_SHIFT_RIGHT};
use metro_core::player::movement_direction;
use metro_core::scene::scroll_platform;
use metro_core::*;

const FRAME: f32 = 1.0 / 60.0;

const PLATFORMS_GLTF: &str = r#"{
    "asset": { "version": "2.0" },
    "scene": 0,
    "scenes": [ { "nodes": [0] } ],
    "nodes": [
        { "name": "Carriage", "children": [1, 2] },
        { "name": "SM_MERGED_Floor_Platform_01", "translation": [0.0, 0.0, 4.0] },
        { "name": "SM_MERGED_Floor_Platform_01001", "translation": [0.0, 0.0, -6.0] }
    ]
}"#;

fn clips(n: usize) -> ModelData {
    ModelData::with_clips(
        (0..n)
            .map(|i| AnimationClip::new(format!("clip{i}"), Vec::new()))
            .collect(),
    )
}

fn scene_with_player() -> SceneContext {
    let mut scene = SceneContext::new(16.0 / 9.0, SceneParams::default(), 42);
    scene.install_player(Ok(clips(3)));
    scene
}

fn keys(held: &[&str]) -> KeyState {
    let mut k = KeyState::new();
    for code in held {
        k.key_down(code);
    }
    k
}

fn player(scene: &SceneContext) -> &Player {
    scene.player.ready().expect("player installed")
}

fn npc_spec(path: &'static str, clip_index: usize) -> NpcSpec {
    NpcSpec {
        path,
        position: [1.0, 0.0, 2.0],
        scale: [CHARACTER_SCALE; 3],
        clip_index,
    }
}

#[test]
fn no_keys_plays_idle_only() {
    let mut scene = scene_with_player();
    let report = scene.update(FRAME, 0.0, &KeyState::new());
    let p = player(&scene);
    assert_eq!(report.gait, Some(Gait::Idle));
    assert!(p.is_playing(Gait::Idle));
    assert!(!p.is_playing(Gait::Walk));
    assert!(!p.is_playing(Gait::Run));
}

#[test]
fn movement_without_shift_walks_and_with_shift_runs() {
    let mut scene = scene_with_player();
    scene.update(FRAME, 0.0, &keys(&[KEY_FORWARD]));
    assert_eq!(player(&scene).playing_gait(), Some(Gait::Walk));
    assert_eq!(player(&scene).mixer.playing_count(), 1);

    for shift in [KEY_SHIFT_LEFT, KEY_SHIFT_RIGHT] {
        scene.update(FRAME, 0.0, &keys(&[KEY_LEFT, shift]));
        assert_eq!(player(&scene).playing_gait(), Some(Gait::Run));
        assert_eq!(player(&scene).mixer.playing_count(), 1);
    }

    scene.update(FRAME, 0.0, &keys(&[KEY_SHIFT_LEFT]));
    assert_eq!(player(&scene).playing_gait(), Some(Gait::Idle));
}

#[test]
fn first_key_of_each_pair_wins() {
    let dir = movement_direction(&keys(&[KEY_FORWARD, KEY_BACK]), MOVE_COMPONENT);
    assert_eq!(dir, Vec3::new(0.0, 0.0, -MOVE_COMPONENT));
    let dir = movement_direction(&keys(&[KEY_LEFT, KEY_RIGHT]), MOVE_COMPONENT);
    assert_eq!(dir, Vec3::new(-MOVE_COMPONENT, 0.0, 0.0));
    let dir = movement_direction(&keys(&[KEY_BACK, KEY_RIGHT]), MOVE_COMPONENT);
    assert_eq!(dir, Vec3::new(MOVE_COMPONENT, 0.0, MOVE_COMPONENT));
}

#[test]
fn walking_forward_for_one_second_covers_point_six() {
    let mut scene = scene_with_player();
    let w = keys(&[KEY_FORWARD]);
    for _ in 0..60 {
        scene.update(FRAME, 0.0, &w);
    }
    let pos = player(&scene).position();
    assert!((pos.z - (-0.6)).abs() < 1e-4, "z={}", pos.z);
    assert!(pos.x.abs() < 1e-6);
}

#[test]
fn running_moves_three_hundredths_per_frame() {
    let mut scene = scene_with_player();
    // face -z first; the extra run step uses the previous facing
    scene.update(FRAME, 0.0, &keys(&[KEY_FORWARD]));
    let start = player(&scene).position();
    let run = keys(&[KEY_FORWARD, KEY_SHIFT_LEFT]);
    for _ in 0..10 {
        scene.update(FRAME, 0.0, &run);
    }
    let moved = player(&scene).position() - start;
    assert!((moved.z - (-0.3)).abs() < 1e-4, "moved={moved:?}");
    assert!(moved.x.abs() < 1e-6);
}

#[test]
fn idle_at_time_zero_leaves_player_in_place() {
    let mut scene = scene_with_player();
    scene.update(FRAME, 0.0, &KeyState::new());
    assert_eq!(player(&scene).position(), Vec3::ZERO);
}

#[test]
fn sway_overwrites_x_and_y() {
    let mut scene = scene_with_player();
    let now_ms = 500.0;
    scene.update(FRAME, now_ms, &keys(&[KEY_LEFT]));
    let (x, y) = metro_core::player::sway_offset(now_ms, SWAY_AMPLITUDE);
    let pos = player(&scene).position();
    assert_eq!(pos.x, x);
    assert_eq!(pos.y, y);
    assert!(x.abs() <= SWAY_AMPLITUDE && y.abs() <= SWAY_AMPLITUDE);
}

#[test]
fn camera_follows_player_with_fixed_offset() {
    let mut scene = scene_with_player();
    let direction = scene.camera.direction;
    let w = keys(&[KEY_FORWARD]);
    for _ in 0..5 {
        let report = scene.update(FRAME, 0.0, &w);
        assert_eq!(
            report.camera_position,
            player(&scene).position() + CAMERA_OFFSET
        );
    }
    assert_eq!(scene.camera.direction, direction);
}

#[test]
fn platform_scroll_wraps_to_reset_exactly() {
    let mut z = -9.5;
    scroll_platform(&mut z, PLATFORM_SPEED, 0.1, PLATFORM_WRAP_BELOW, PLATFORM_RESET_Z);
    assert_eq!(z, PLATFORM_RESET_Z);

    let mut z = 0.0;
    scroll_platform(&mut z, PLATFORM_SPEED, 0.1, PLATFORM_WRAP_BELOW, PLATFORM_RESET_Z);
    assert!((z - (-3.0)).abs() < 1e-5);
}

#[test]
fn platforms_stay_in_bounds_and_move_independently() {
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 1);
    scene.install_environment(ModelData::from_bytes(PLATFORMS_GLTF.as_bytes()));
    let env = scene.environment.ready().expect("environment installed");
    assert!(env.platforms.is_some());
    assert_eq!(env.model.root.scale, ENVIRONMENT_SCALE);

    let mut saw_wrap = false;
    for _ in 0..200 {
        let before = scene.environment.ready().and_then(|e| e.platform_z());
        scene.update(0.1, 0.0, &KeyState::new());
        let after = scene
            .environment
            .ready()
            .and_then(|e| e.platform_z())
            .expect("platforms resolved");
        for z in after {
            assert!((PLATFORM_WRAP_BELOW..=PLATFORM_RESET_Z).contains(&z), "z={z}");
        }
        if let Some(before) = before {
            for i in 0..2 {
                if after[i] > before[i] {
                    assert_eq!(after[i], PLATFORM_RESET_Z);
                    saw_wrap = true;
                }
            }
        }
    }
    assert!(saw_wrap);
}

#[test]
fn environment_without_platforms_still_loads() {
    let gltf = r#"{
        "asset": { "version": "2.0" },
        "nodes": [ { "name": "Carriage" } ]
    }"#;
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 1);
    scene.install_environment(ModelData::from_bytes(gltf.as_bytes()));
    let env = scene.environment.ready().expect("environment installed");
    assert!(env.platforms.is_none());
    scene.update(0.1, 0.0, &KeyState::new());
}

#[test]
fn npc_with_out_of_range_clip_is_kept_without_action() {
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 1);
    scene.install_npc(&npc_spec("npc6.glb", 7), Ok(clips(3)));
    scene.install_npc(&npc_spec("npc2.glb", 0), Ok(clips(3)));

    assert_eq!(scene.npcs.len(), 2);
    let broken = &scene.npcs[0];
    let reason = broken.action.failure().expect("clip index rejected");
    assert!(reason.contains("out of bounds"), "{reason}");
    assert!(reason.contains("npc6.glb"), "{reason}");
    assert_eq!(broken.mixer.playing_count(), 0);
    assert_eq!(broken.model.root.translation, Vec3::new(1.0, 0.0, 2.0));

    let ok = &scene.npcs[1];
    let id = ok.action.copied().expect("clip bound");
    assert!(ok.mixer.is_playing(id));

    // both still advance without panicking
    scene.update(FRAME, 0.0, &KeyState::new());
    assert_eq!(scene.models().count(), 2);
}

#[test]
fn failed_loads_are_recorded_and_skipped() {
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 1);
    scene.install_player(Err(LoadError::NoScene));
    scene.install_environment(ModelData::from_bytes(b"not a model"));
    scene.install_npc(&npc_spec("npc1.glb", 2), Err(LoadError::NoScene));

    assert!(scene.player.failure().is_some());
    assert!(scene.environment.failure().is_some());
    assert!(scene.npcs.is_empty());

    let report = scene.update(FRAME, 0.0, &keys(&[KEY_FORWARD]));
    assert_eq!(report.gait, None);
    assert_eq!(scene.models().count(), 0);
}

#[test]
fn player_with_missing_clips_is_accepted() {
    let mut scene = SceneContext::new(1.0, SceneParams::default(), 1);
    scene.install_player(Ok(clips(1)));
    let p = player(&scene);
    assert!(p.idle.is_some());
    assert!(p.walk.is_none() && p.run.is_none());

    let report = scene.update(FRAME, 0.0, &keys(&[KEY_FORWARD, KEY_SHIFT_LEFT]));
    assert_eq!(report.gait, Some(Gait::Run));
    assert_eq!(player(&scene).playing_gait(), None);
    // extra run step along the initial +z facing, then 0.01 back along -z
    assert!((player(&scene).position().z - 0.01).abs() < 1e-6);
}
